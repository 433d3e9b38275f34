//! The seam between records and the remote service that stores them

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Keyword arguments for a remote operation, keyed by remote field name
pub type Arguments = Map<String, Value>;

/// Failure raised by a remote collaborator; never interpreted by this crate
pub type RemoteError = Box<dyn std::error::Error + Send + Sync>;

/// A remote service exposing named operations.
///
/// Create, update, and action operations return a single mapping; list
/// operations return an array of mappings. Argument names are remote field
/// names in arbitrary case.
#[async_trait]
pub trait RemoteOperations: Send + Sync {
    async fn call(&self, operation: &str, arguments: Arguments) -> Result<Value, RemoteError>;
}

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockRemote, RecordedCall};

#[cfg(any(test, feature = "mock"))]
mod mock {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedCall {
        pub operation: String,
        pub arguments: Arguments,
    }

    enum Reply {
        Value(Value),
        Error(String),
    }

    /// In-memory collaborator that records calls and replays queued replies.
    ///
    /// Replies are queued per operation. When an operation's queue is empty
    /// the last reply is repeated; an operation that never had a reply yields
    /// an error.
    #[derive(Default)]
    pub struct MockRemote {
        calls: Mutex<Vec<RecordedCall>>,
        replies: Mutex<HashMap<String, VecDeque<Reply>>>,
        sticky: Mutex<HashMap<String, Value>>,
    }

    impl MockRemote {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(&self, operation: &str, value: Value) -> &Self {
            self.push(operation, Reply::Value(value));
            self
        }

        pub fn fail(&self, operation: &str, message: &str) -> &Self {
            self.push(operation, Reply::Error(message.to_string()));
            self
        }

        fn push(&self, operation: &str, reply: Reply) {
            let mut replies = self.replies.lock().unwrap_or_else(|e| e.into_inner());
            replies
                .entry(operation.to_string())
                .or_default()
                .push_back(reply);
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
        }

        pub fn calls_to(&self, operation: &str) -> Vec<RecordedCall> {
            self.calls()
                .into_iter()
                .filter(|call| call.operation == operation)
                .collect()
        }
    }

    #[async_trait]
    impl RemoteOperations for MockRemote {
        async fn call(&self, operation: &str, arguments: Arguments) -> Result<Value, RemoteError> {
            self.calls
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(RecordedCall {
                    operation: operation.to_string(),
                    arguments,
                });

            let next = self
                .replies
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .get_mut(operation)
                .and_then(|queue| queue.pop_front());

            let mut sticky = self.sticky.lock().unwrap_or_else(|e| e.into_inner());
            match next {
                Some(Reply::Value(value)) => {
                    sticky.insert(operation.to_string(), value.clone());
                    Ok(value)
                }
                Some(Reply::Error(message)) => Err(message.into()),
                None => sticky
                    .get(operation)
                    .cloned()
                    .ok_or_else(|| format!("no reply configured for {}", operation).into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn mock_records_calls_and_replays_replies() {
        let remote = MockRemote::new();
        remote
            .respond("linode.list", json!([{"LinodeID": 1}]))
            .fail("linode.boot", "job queue full");

        let mut arguments = Arguments::new();
        arguments.insert("LinodeID".to_string(), json!(1));

        let listed = remote.call("linode.list", arguments.clone()).await.unwrap();
        assert_eq!(listed, json!([{"LinodeID": 1}]));
        // Last reply repeats once the queue drains.
        let again = remote.call("linode.list", Arguments::new()).await.unwrap();
        assert_eq!(again, listed);

        let error = remote.call("linode.boot", arguments.clone()).await.unwrap_err();
        assert_eq!(error.to_string(), "job queue full");

        assert!(remote.call("linode.delete", Arguments::new()).await.is_err());

        let calls = remote.calls_to("linode.list");
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].arguments, arguments);
        assert_eq!(remote.calls().len(), 4);
    }
}
