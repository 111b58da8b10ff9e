//! The ambient output singleton.
//!
//! `io.print(args)` from any actor, callable synchronously or by message.
//! Output normally goes to stdout; embedders and tests can capture it
//! through a mailbox instead.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::mailbox::{mailbox, MailboxReceiver, MailboxSender};
use frisbee_lang::{RuntimeError, Value};

/// Where `io.print` lines go.
#[derive(Debug, Clone)]
pub enum IoSink {
    /// Standard output of the environment process.
    Stdout,
    /// Captured lines, one per print.
    Capture(MailboxSender<String>),
}

impl IoSink {
    pub fn stdout() -> Self {
        Self::Stdout
    }

    /// A sink that hands every printed line to the returned receiver.
    pub fn capture() -> (Self, MailboxReceiver<String>) {
        let (tx, rx) = mailbox();
        (Self::Capture(tx), rx)
    }

    /// Dispatch one io message.
    pub fn call(&self, method: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        match method {
            "print" => {
                self.print(args);
                Ok(Value::Void)
            }
            other => Err(RuntimeError::NoMethod {
                object: "io".to_string(),
                method: other.to_string(),
            }),
        }
    }

    /// Print the arguments, space-separated.
    pub fn print(&self, args: &[Value]) {
        let line = args
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        match self {
            Self::Stdout => println!("{line}"),
            Self::Capture(sink) => {
                // Receiver gone means nobody is watching; that is fine.
                let _ = sink.send(line);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_print_formats_and_joins_arguments() {
        let (sink, mut lines) = IoSink::capture();

        sink.call("print", &[Value::Int(3), Value::Str("items".to_string())])
            .unwrap();

        assert_eq!(lines.recv().await.unwrap(), "3 items");
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let (sink, _lines) = IoSink::capture();

        assert!(matches!(
            sink.call("read", &[]).unwrap_err(),
            RuntimeError::NoMethod { .. }
        ));
    }
}
