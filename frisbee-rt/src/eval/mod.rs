//! The AST-walking evaluator.
//!
//! Single-threaded inside one actor. Activation state is explicit - `this`,
//! the name->value frame, the return slot - and the per-actor runtime
//! context rides in via [`ActorCtx`]; there are no process-wide globals.
//! Evaluation is async because three places suspend: `spawn` (host a new
//! actor), `!` (publish) and `?` (publish, then block on the reply topic).
//! Recursion through expressions is expressed with boxed futures.

mod expr;
mod stmt;

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::actor::object::ActorCtx;
use frisbee_lang::{Declaration, MethodDecl, RuntimeError, Value, WireValue};

/// One method activation: the executing instance, its frame, and the
/// return slot that short-circuits statement lists once set.
#[derive(Debug)]
pub struct Activation {
    this: Value,
    frame: HashMap<String, Value>,
    returned: Option<Value>,
}

impl Activation {
    pub fn new(this: Value, frame: HashMap<String, Value>) -> Self {
        Self {
            this,
            frame,
            returned: None,
        }
    }

    pub fn this(&self) -> Value {
        self.this.clone()
    }

    pub fn lookup(&self, name: &str) -> Result<Value, RuntimeError> {
        self.frame
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UnboundName(name.to_string()))
    }

    pub fn bind(&mut self, name: &str, value: Value) {
        self.frame.insert(name.to_string(), value);
    }

    pub fn set_return(&mut self, value: Value) {
        self.returned = Some(value);
    }

    /// Whether a `return` has fired and enclosing lists should stop.
    pub fn finished(&self) -> bool {
        self.returned.is_some()
    }

    /// The activation's result: the returned value, or void.
    pub fn into_result(self) -> Value {
        self.returned.unwrap_or(Value::Void)
    }
}

/// Walks method bodies in the context of one actor.
pub struct Evaluator<'a, 'c> {
    ctx: &'a mut ActorCtx<'c>,
}

impl<'a, 'c> Evaluator<'a, 'c> {
    pub fn new(ctx: &'a mut ActorCtx<'c>) -> Self {
        Self { ctx }
    }

    /// Run one method: zip arguments into a fresh frame, execute the body
    /// until it returns or runs dry.
    pub async fn call_method(
        &mut self,
        this: Value,
        method: &MethodDecl,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        if args.len() != method.formals.len() {
            return Err(RuntimeError::TypeError(format!(
                "method `{}` takes {} arguments, got {}",
                method.name,
                method.formals.len(),
                args.len()
            )));
        }
        let frame = method
            .formals
            .iter()
            .map(|formal| formal.name.clone())
            .zip(args)
            .collect();

        let mut activation = Activation::new(this, frame);
        for stmt in &method.body {
            self.exec(&mut activation, stmt).await?;
            if activation.finished() {
                break;
            }
        }
        Ok(activation.into_result())
    }

    /// Resolve a declaration and run one of its methods synchronously on
    /// `this` (passive calls, and an active object calling itself).
    async fn invoke_on_decl(
        &mut self,
        module: &str,
        typename: &str,
        method: &str,
        this: Value,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let declaration = self.ctx.runtime.resolve(module, typename)?.clone();
        match declaration {
            Declaration::Object(decl) => {
                let found = decl.method(method).ok_or_else(|| RuntimeError::NoMethod {
                    object: decl.qualified_name(),
                    method: method.to_string(),
                })?;
                self.call_method(this, found, args).await
            }
            Declaration::Builtin { module, typename } => Err(RuntimeError::TypeError(format!(
                "{module}.{typename} accepts messages only"
            ))),
        }
    }
}

/// Deep-copy a value across an isolation boundary.
///
/// Spawn arguments become the new actor's private state; running them
/// through the wire encoding gives the same copy-by-value semantics a
/// process boundary would, and turns the hosting instance into its proxy.
pub(crate) fn isolate(value: Value) -> Value {
    Value::from(WireValue::from(&value.into_sendable()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_frame() {
        let mut activation = Activation::new(Value::Void, HashMap::new());

        activation.bind("x", Value::Int(1));
        assert_eq!(activation.lookup("x").unwrap().as_int().unwrap(), 1);
        assert!(matches!(
            activation.lookup("y").unwrap_err(),
            RuntimeError::UnboundName(_)
        ));
    }

    #[test]
    fn test_activation_result_defaults_to_void() {
        let activation = Activation::new(Value::Void, HashMap::new());
        assert!(activation.into_result().equals(&Value::Void).unwrap());

        let mut activation = Activation::new(Value::Void, HashMap::new());
        activation.set_return(Value::Int(3));
        assert!(activation.finished());
        assert!(activation.into_result().equals(&Value::Int(3)).unwrap());
    }

    #[test]
    fn test_isolate_copies_shared_cells() {
        let original = Value::array(vec![Value::Int(1)]);
        let copy = isolate(original.clone());

        copy.store_index(0, Value::Int(9)).unwrap();
        assert_eq!(original.index(0).unwrap().as_int().unwrap(), 1);
    }
}
