//! Shared helpers for the runtime and the tasks it spawns.

use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

/// Run `future` to completion, turning a panic inside it into the panic
/// message. Request tasks use this so every submitted request still reports
/// a completion.
///
/// ```ignore
/// let result = catch_task_panic(send_request(&client, &base, &request))
///     .await
///     .unwrap_or_else(|msg| Err(TransportError::TaskPanicked(msg)));
/// ```
pub(crate) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|payload| panic_message(&*payload))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&'static str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passes_through_value() {
        assert_eq!(catch_task_panic(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn test_catches_str_panic() {
        let result = catch_task_panic(async {
            panic!("boom");
        })
        .await;
        assert_eq!(result, Err::<(), _>("boom".to_string()));
    }

    #[tokio::test]
    async fn test_non_string_payload() {
        let result = catch_task_panic(async {
            std::panic::panic_any(42u8);
        })
        .await;
        assert_eq!(result, Err::<(), _>("non-string panic payload".to_string()));
    }

    #[tokio::test]
    async fn test_catches_formatted_panic() {
        let id = 3;
        let result = catch_task_panic(async move {
            if id == 3 {
                panic!("request {} failed", id);
            }
        })
        .await;
        assert_eq!(result, Err("request 3 failed".to_string()));
    }
}
