//! Order-preserving batched fan-out.

use std::future::Future;

use futures_util::future::join_all;
use tracing::trace;

/// Runs a task over many items, `batch_size` at a time.
///
/// Items within a batch run concurrently; batches run one after another, so
/// at most `batch_size` tasks are in flight. `results[i]` always belongs to
/// `items[i]`. Tasks report their own failures through their output type;
/// one failed item never aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchScheduler {
    batch_size: usize,
}

impl BatchScheduler {
    /// A scheduler running `batch_size` tasks at a time. Zero is read as one.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub async fn run<I, T, F, Fut>(&self, items: I, mut task: F) -> Vec<T>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Fut,
        Fut: Future<Output = T>,
    {
        let mut items = items.into_iter();
        let mut results = Vec::with_capacity(items.size_hint().0);

        loop {
            let chunk: Vec<Fut> = items.by_ref().take(self.batch_size).map(&mut task).collect();
            if chunk.is_empty() {
                break;
            }
            trace!(size = chunk.len(), done = results.len(), "running batch");
            results.extend(join_all(chunk).await);
        }

        results
    }
}

impl Default for BatchScheduler {
    fn default() -> Self {
        Self::new(8)
    }
}
