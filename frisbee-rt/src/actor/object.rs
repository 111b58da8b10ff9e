//! The behaviour seam and the object model.
//!
//! [`ActiveObject`] is what the host loop drives: the scripted
//! implementation walks declaration method bodies through the evaluator,
//! and the builtins implement it natively. Passive construction lives here
//! too - it is plain data, no task involved.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use super::host::RuntimeHandle;
use super::lifecycle::ActorLifecycle;
use crate::connector::ActorConnector;
use crate::eval::Evaluator;
use frisbee_lang::value::ActiveRef;
use frisbee_lang::{ObjectDecl, PassiveInstance, RuntimeError, Value};

/// What an actor's host loop hands each dequeued message to.
///
/// `proceed_message` is invoked only inside the actor's own task; there is
/// never concurrent entry.
impl std::fmt::Debug for dyn ActiveObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

#[async_trait]
pub trait ActiveObject: Send {
    /// `module.Type` label for diagnostics.
    fn label(&self) -> String;

    /// One-time setup before the first message.
    async fn on_start(&mut self, _ctx: &mut ActorCtx<'_>) -> Result<(), RuntimeError> {
        Ok(())
    }

    /// Run one message to completion and produce its result.
    async fn proceed_message(
        &mut self,
        name: &str,
        args: Vec<Value>,
        ctx: &mut ActorCtx<'_>,
    ) -> Result<Value, RuntimeError>;
}

/// Everything a message handler may touch: its connector (for send/wait),
/// the runtime (types, spawning, io) and the state tracker.
pub struct ActorCtx<'a> {
    pub connector: &'a mut ActorConnector,
    pub runtime: &'a RuntimeHandle,
    pub lifecycle: &'a mut ActorLifecycle,
}

/// An AST-backed active object: its declaration plus its live instance.
pub struct ScriptedObject {
    decl: Arc<ObjectDecl>,
    instance: ActiveRef,
}

impl ScriptedObject {
    pub fn new(decl: Arc<ObjectDecl>, instance: ActiveRef) -> Self {
        Self { decl, instance }
    }
}

#[async_trait]
impl ActiveObject for ScriptedObject {
    fn label(&self) -> String {
        self.decl.qualified_name()
    }

    async fn proceed_message(
        &mut self,
        name: &str,
        args: Vec<Value>,
        ctx: &mut ActorCtx<'_>,
    ) -> Result<Value, RuntimeError> {
        let decl = Arc::clone(&self.decl);
        let method = decl.method(name).ok_or_else(|| RuntimeError::NoMethod {
            object: decl.qualified_name(),
            method: name.to_string(),
        })?;
        Evaluator::new(ctx)
            .call_method(Value::Active(Arc::clone(&self.instance)), method, args)
            .await
    }
}

/// Zip constructor arguments against the declared field list.
fn field_map(decl: &ObjectDecl, args: Vec<Value>) -> Result<HashMap<String, Value>, RuntimeError> {
    if args.len() != decl.fields.len() {
        return Err(RuntimeError::TypeError(format!(
            "{} has {} fields, constructor got {} arguments",
            decl.qualified_name(),
            decl.fields.len(),
            args.len()
        )));
    }
    Ok(decl
        .field_names()
        .map(str::to_string)
        .zip(args)
        .collect())
}

/// `new T(args)` - build a passive instance from its declaration.
pub fn create_passive(decl: &ObjectDecl, args: Vec<Value>) -> Result<Value, RuntimeError> {
    let module = decl.module.clone().unwrap_or_else(|| "?".to_string());
    let fields = field_map(decl, args)?;
    Ok(Value::passive(PassiveInstance::new(
        module,
        decl.name.clone(),
        fields,
    )))
}

/// Field map for a spawned active instance.
pub(crate) fn active_fields(
    decl: &ObjectDecl,
    args: Vec<Value>,
) -> Result<HashMap<String, Value>, RuntimeError> {
    field_map(decl, args)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use frisbee_lang::{Formal, ObjectKind, TypeNode};

    fn counter_decl() -> ObjectDecl {
        ObjectDecl {
            kind: ObjectKind::Passive,
            name: "Counter".to_string(),
            fields: vec![Formal {
                ty: TypeNode::Int,
                name: "count".to_string(),
            }],
            methods: vec![],
            module: Some("main".to_string()),
        }
    }

    #[test]
    fn test_create_passive_zips_fields() {
        let value = create_passive(&counter_decl(), vec![Value::Int(7)]).unwrap();

        let Value::Passive(cell) = value else {
            panic!("expected passive instance");
        };
        let instance = cell.lock();
        assert_eq!(instance.typename, "Counter");
        assert_eq!(instance.get_field("count").unwrap().as_int().unwrap(), 7);
    }

    #[test]
    fn test_create_passive_checks_arity() {
        assert!(matches!(
            create_passive(&counter_decl(), vec![]).unwrap_err(),
            RuntimeError::TypeError(_)
        ));
    }
}
