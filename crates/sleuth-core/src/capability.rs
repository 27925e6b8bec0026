//! Capability call helpers

use crate::error::CapabilityError;
use std::future::Future;
use std::time::Duration;

/// Await a capability call, giving up after `limit` when one is set.
pub(crate) async fn bounded<T, E, F>(
    limit: Option<Duration>,
    call: F,
) -> Result<T, CapabilityError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<CapabilityError>,
{
    let outcome = match limit {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| CapabilityError::Timeout {
                secs: limit.as_secs(),
            })?,
        None => call.await,
    };
    outcome.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_hung_call_times_out() {
        let hung = async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok::<_, sleuth_store::Error>(())
        };

        let result = bounded(Some(Duration::from_secs(5)), hung).await;
        assert!(matches!(result, Err(CapabilityError::Timeout { secs: 5 })));
    }

    #[tokio::test]
    async fn test_errors_convert_into_capability_error() {
        let failing = async { Err::<(), _>(sleuth_store::Error::Execution("interrupted".into())) };

        let result = bounded(None, failing).await;
        assert!(matches!(result, Err(CapabilityError::Store(_))));
    }
}
