//! Batched, rate-limited fan-out.

use std::future::Future;
use std::time::Duration;

use futures::future::join_all;
use tracing::debug;

use super::RepositoryError;
use crate::metrics::RECORDS_DROPPED;

/// Results of a best-effort fan-out.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome<T> {
    /// Successful resolutions, in input order.
    pub resolved: Vec<T>,
    /// Number of inputs that failed and were left out.
    pub dropped: usize,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self {
            resolved: Vec::new(),
            dropped: 0,
        }
    }
}

/// Resolve `ids` in fixed-size batches.
///
/// Every id in a batch is resolved concurrently and the whole batch is awaited
/// before the next one starts. Failures are dropped, not retried. `delay` is
/// slept between batches, never after the last one.
pub async fn resolve_in_batches<T, F, Fut>(
    ids: &[u32],
    batch_size: usize,
    delay: Duration,
    resolve: F,
) -> BatchOutcome<T>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<T, RepositoryError>>,
{
    let batch_size = batch_size.max(1);
    let total_batches = ids.len().div_ceil(batch_size);
    let mut outcome = BatchOutcome {
        resolved: Vec::with_capacity(ids.len()),
        dropped: 0,
    };

    for (index, batch) in ids.chunks(batch_size).enumerate() {
        debug!(
            "Resolving batch {}/{} ({} entries)",
            index + 1,
            total_batches,
            batch.len()
        );

        let results = join_all(batch.iter().map(|&id| resolve(id))).await;

        for (id, result) in batch.iter().zip(results) {
            match result {
                Ok(value) => outcome.resolved.push(value),
                Err(e) => {
                    debug!("Dropping entry {}: {}", id, e);
                    outcome.dropped += 1;
                }
            }
        }

        if index + 1 < total_batches && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    RECORDS_DROPPED.inc_by(outcome.dropped as u64);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    #[tokio::test]
    async fn test_failures_are_dropped_and_counted() {
        let ids: Vec<u32> = (1..=10).collect();
        let outcome = resolve_in_batches(&ids, 3, Duration::ZERO, |id| async move {
            if id % 4 == 0 {
                Err(RepositoryError::NotFound(id))
            } else {
                Ok(id * 10)
            }
        })
        .await;

        assert_eq!(outcome.resolved, vec![10, 20, 30, 50, 60, 70, 90, 100]);
        assert_eq!(outcome.dropped, 2);
    }

    #[tokio::test]
    async fn test_batches_never_exceed_size() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let ids: Vec<u32> = (1..=20).collect();

        let outcome = resolve_in_batches(&ids, 8, Duration::ZERO, |id| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::task::yield_now().await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, RepositoryError>(id)
            }
        })
        .await;

        assert_eq!(outcome.resolved.len(), 20);
        assert!(peak.load(Ordering::SeqCst) <= 8);
    }

    #[tokio::test]
    async fn test_delay_only_between_batches() {
        let ids: Vec<u32> = (1..=17).collect();
        let start = Instant::now();
        let outcome = resolve_in_batches(&ids, 8, Duration::from_millis(50), |id| async move {
            Ok::<_, RepositoryError>(id)
        })
        .await;
        let elapsed = start.elapsed();

        assert_eq!(outcome.resolved.len(), 17);
        // Three batches, two pauses.
        assert!(elapsed >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let outcome: BatchOutcome<u32> =
            resolve_in_batches(&[], 8, Duration::from_millis(50), |id| async move { Ok(id) })
                .await;
        assert!(outcome.resolved.is_empty());
        assert_eq!(outcome.dropped, 0);
    }
}
