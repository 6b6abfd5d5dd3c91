// Panic isolation helpers for worker safety
use std::any::Any;
use tokio::task::JoinError;
use tracing::error;

/// Extract a readable message from a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Describe why a spawned executor task did not return an outcome
///
/// Executor calls run in their own task so a panic stays inside that task
/// and the worker loop keeps going.
pub fn describe_join_error(join_err: JoinError) -> String {
    if join_err.is_panic() {
        let payload = join_err.into_panic();
        let msg = panic_message(payload.as_ref());
        error!(panic_msg = %msg, "Transfer task panicked");
        format!("transfer task panicked: {}", msg)
    } else {
        error!("Transfer task cancelled");
        "transfer task cancelled".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_panic_payload_is_reported() {
        let handle = tokio::spawn(async {
            panic!("boom in executor");
        });
        let join_err = handle.await.unwrap_err();
        let msg = describe_join_error(join_err);
        assert!(msg.contains("panicked"));
        assert!(msg.contains("boom in executor"));
    }

    #[test]
    fn test_unknown_payload() {
        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(payload.as_ref()), "Unknown panic");
    }
}
