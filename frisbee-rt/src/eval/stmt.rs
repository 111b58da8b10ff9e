//! Statement execution.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use futures::future::{BoxFuture, FutureExt};

// Layer 3: Internal module imports
use super::{Activation, Evaluator};
use crate::actor::lifecycle::ActorState;
use crate::util::CorrelationId;
use frisbee_lang::{RuntimeError, Stmt, Value};

impl Evaluator<'_, '_> {
    /// Execute one statement in `activation`.
    pub(crate) fn exec<'s>(
        &'s mut self,
        activation: &'s mut Activation,
        stmt: &'s Stmt,
    ) -> BoxFuture<'s, Result<(), RuntimeError>> {
        async move {
            match stmt {
                Stmt::Block(statements) => {
                    for statement in statements {
                        self.exec(activation, statement).await?;
                        if activation.finished() {
                            break;
                        }
                    }
                    Ok(())
                }

                Stmt::If {
                    condition,
                    then_branch,
                    else_branch,
                } => {
                    if self.eval(activation, condition).await?.as_bool()? {
                        self.exec(activation, then_branch).await
                    } else {
                        self.exec(activation, else_branch).await
                    }
                }

                Stmt::While { condition, body } => {
                    while self.eval(activation, condition).await?.as_bool()? {
                        self.exec(activation, body).await?;
                        if activation.finished() {
                            break;
                        }
                    }
                    Ok(())
                }

                Stmt::Return(expr) => {
                    let value = self.eval(activation, expr).await?;
                    activation.set_return(value);
                    Ok(())
                }

                Stmt::Assign { name, expr, .. } => {
                    let value = self.eval(activation, expr).await?;
                    activation.bind(name, value);
                    Ok(())
                }

                Stmt::AssignField {
                    object,
                    field,
                    expr,
                } => {
                    let target = self.eval(activation, object).await?;
                    let value = self.eval(activation, expr).await?;
                    match target {
                        Value::Passive(cell) => {
                            cell.lock().set_field(field, value);
                            Ok(())
                        }
                        Value::Active(instance) => {
                            instance.set_field(field, value);
                            Ok(())
                        }
                        Value::Proxy(_) => Err(RuntimeError::TypeError(
                            "field store on a remote actor reference".to_string(),
                        )),
                        other => Err(RuntimeError::TypeError(format!(
                            "field store on {}",
                            other.kind()
                        ))),
                    }
                }

                Stmt::AssignIndex { name, index, expr } => {
                    let index = self.eval(activation, index).await?.as_int()?;
                    let value = self.eval(activation, expr).await?;
                    activation.lookup(name)?.store_index(index, value)
                }

                Stmt::VarDecl { .. } => Ok(()),

                Stmt::Send {
                    object,
                    method,
                    args,
                } => {
                    let target = self.eval(activation, object).await?.into_sendable();
                    let mut argv = Vec::with_capacity(args.len());
                    for arg in args {
                        argv.push(self.eval(activation, arg).await?.into_sendable());
                    }
                    match target {
                        Value::Proxy(proxy) => {
                            self.ctx.connector.send_message(&proxy, method, argv, None)
                        }
                        Value::Io => {
                            self.ctx.runtime.io().call(method, &argv)?;
                            Ok(())
                        }
                        other => Err(RuntimeError::TypeError(format!(
                            "cannot send a message to {}",
                            other.kind()
                        ))),
                    }
                }

                Stmt::Wait {
                    binding,
                    object,
                    method,
                    args,
                } => {
                    let target = self.eval(activation, object).await?.into_sendable();
                    let mut argv = Vec::with_capacity(args.len());
                    for arg in args {
                        argv.push(self.eval(activation, arg).await?.into_sendable());
                    }
                    let Value::Proxy(proxy) = target else {
                        return Err(RuntimeError::TypeError(format!(
                            "cannot wait on {}",
                            target.kind()
                        )));
                    };

                    let correlation = CorrelationId::new();
                    self.ctx
                        .connector
                        .send_message(&proxy, method, argv, Some(correlation))?;

                    self.ctx.lifecycle.transition_to(ActorState::AwaitingReply);
                    let value = self
                        .ctx
                        .connector
                        .receive_return_value(correlation)
                        .await
                        .ok_or_else(|| {
                            RuntimeError::Transport("bus closed while awaiting a reply".to_string())
                        })?;
                    self.ctx.lifecycle.transition_to(ActorState::Handling);

                    activation.bind(binding, value);
                    Ok(())
                }

                Stmt::Expr(expr) => {
                    self.eval(activation, expr).await?;
                    Ok(())
                }
            }
        }
        .boxed()
    }
}
