//! Expression evaluation.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use futures::future::{BoxFuture, FutureExt};

// Layer 3: Internal module imports
use super::{isolate, Activation, Evaluator};
use crate::actor::object::create_passive;
use frisbee_lang::{BinOp, CmpOp, Declaration, Expr, RuntimeError, Value};

impl Evaluator<'_, '_> {
    /// Evaluate one expression in `activation`.
    pub(crate) fn eval<'s>(
        &'s mut self,
        activation: &'s mut Activation,
        expr: &'s Expr,
    ) -> BoxFuture<'s, Result<Value, RuntimeError>> {
        async move {
            match expr {
                Expr::Int(i) => Ok(Value::Int(*i)),
                Expr::Str(s) => Ok(Value::Str(s.clone())),
                Expr::Bool(b) => Ok(Value::Bool(*b)),
                Expr::Void => Ok(Value::Void),
                Expr::This => Ok(activation.this()),
                Expr::Io => Ok(Value::Io),
                Expr::Ident(name) => activation.lookup(name),

                Expr::Binary { op, left, right } => {
                    let left = self.eval(activation, left).await?;
                    let right = self.eval(activation, right).await?;
                    match op {
                        BinOp::Add => left.add(&right),
                        BinOp::Sub => left.sub(&right),
                        BinOp::Mul => left.mul(&right),
                        BinOp::Div => left.div(&right),
                        BinOp::And => left.logical_and(&right),
                        BinOp::Or => left.logical_or(&right),
                    }
                }

                Expr::Compare { op, left, right } => {
                    let left = self.eval(activation, left).await?;
                    let right = self.eval(activation, right).await?;
                    match op {
                        CmpOp::Lt => left.less(&right),
                        CmpOp::Gt => left.greater(&right),
                        CmpOp::Eq => Ok(Value::Bool(left.equals(&right)?)),
                        CmpOp::Ne => Ok(Value::Bool(left.not_equals(&right)?)),
                    }
                }

                Expr::Not(operand) => self.eval(activation, operand).await?.negate(),

                Expr::Array(items) => {
                    let mut values = Vec::with_capacity(items.len());
                    for item in items {
                        values.push(self.eval(activation, item).await?);
                    }
                    Ok(Value::array(values))
                }

                Expr::Index { array, index } => {
                    let array = self.eval(activation, array).await?;
                    let index = self.eval(activation, index).await?.as_int()?;
                    array.index(index)
                }

                Expr::Field { object, field } => {
                    let object = self.eval(activation, object).await?;
                    match object {
                        Value::Passive(cell) => cell.lock().get_field(field),
                        Value::Active(instance) => instance.get_field(field),
                        Value::Proxy(_) => Err(RuntimeError::TypeError(
                            "field access on a remote actor reference".to_string(),
                        )),
                        other => Err(RuntimeError::TypeError(format!(
                            "field access on {}",
                            other.kind()
                        ))),
                    }
                }

                Expr::Call {
                    object,
                    method,
                    args,
                } => {
                    let target = self.eval(activation, object).await?;
                    let mut argv = Vec::with_capacity(args.len());
                    for arg in args {
                        argv.push(self.eval(activation, arg).await?);
                    }
                    self.call_on(target, method, argv).await
                }

                Expr::NewPassive {
                    module,
                    typename,
                    args,
                } => {
                    let module = resolved_module(module.as_deref(), typename)?;
                    let mut argv = Vec::with_capacity(args.len());
                    for arg in args {
                        argv.push(self.eval(activation, arg).await?);
                    }
                    let declaration = self.ctx.runtime.resolve(module, typename)?.clone();
                    match declaration {
                        Declaration::Object(decl) => create_passive(&decl, argv),
                        Declaration::Builtin { module, typename } => {
                            Err(RuntimeError::TypeError(format!(
                                "{module}.{typename} is an active type; use spawn"
                            )))
                        }
                    }
                }

                Expr::Spawn {
                    module,
                    typename,
                    args,
                } => {
                    let module = resolved_module(module.as_deref(), typename)?;
                    let mut argv = Vec::with_capacity(args.len());
                    for arg in args {
                        // The new actor's state is private: copy, never share.
                        argv.push(isolate(self.eval(activation, arg).await?));
                    }
                    let declaration = self.ctx.runtime.resolve(module, typename)?.clone();
                    let proxy = match declaration {
                        Declaration::Object(decl) => self.ctx.runtime.spawn_active(decl, argv)?,
                        Declaration::Builtin { module, typename } => {
                            self.ctx.runtime.spawn_builtin(&module, &typename, argv)?
                        }
                    };
                    Ok(Value::Proxy(proxy))
                }
            }
        }
        .boxed()
    }

    /// Synchronous method dispatch on an evaluated receiver.
    async fn call_on(
        &mut self,
        target: Value,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        match target {
            Value::Passive(cell) => {
                let (module, typename) = {
                    let instance = cell.lock();
                    (instance.module.clone(), instance.typename.clone())
                };
                self.invoke_on_decl(&module, &typename, method, Value::Passive(cell), args)
                    .await
            }
            // An active object calling its own methods runs them inline,
            // inside its own task.
            Value::Active(instance) => {
                let (module, typename) = (instance.module.clone(), instance.typename.clone());
                self.invoke_on_decl(&module, &typename, method, Value::Active(instance), args)
                    .await
            }
            Value::Array(_) => match method {
                "length" => target.array_length(),
                other => Err(RuntimeError::NoMethod {
                    object: "array".to_string(),
                    method: other.to_string(),
                }),
            },
            Value::Io => self.ctx.runtime.io().call(method, &args),
            Value::Proxy(_) => Err(RuntimeError::TypeError(
                "synchronous call on a remote actor reference; use `!` or `?`".to_string(),
            )),
            other => Err(RuntimeError::TypeError(format!(
                "method call on {}",
                other.kind()
            ))),
        }
    }
}

/// Constructor nodes must have been tagged by the loader before evaluation.
fn resolved_module<'m>(
    module: Option<&'m str>,
    typename: &str,
) -> Result<&'m str, RuntimeError> {
    module.ok_or_else(|| RuntimeError::Protocol(format!(
        "constructor `{typename}` was never resolved to a module"
    )))
}
