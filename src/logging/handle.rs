use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

use tracing_appender::non_blocking::WorkerGuard;

/// Counters kept by [`LoggingHandle`].
#[derive(Debug, Default)]
pub struct LoggingMetrics {
    pub flush_count: AtomicU64,
    pub shutdown_in_progress: AtomicBool,
}

/// Snapshot of [`LoggingMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggingStats {
    pub flush_count: u64,
    pub shutdown_in_progress: bool,
    pub file_output: bool,
}

/// Owns the lifecycle of the logging system. Dropping it flushes the file
/// writer; [`shutdown`](Self::shutdown) does the same and logs it.
pub struct LoggingHandle {
    file_guard: Option<WorkerGuard>,
    pub metrics: Arc<LoggingMetrics>,
}

impl LoggingHandle {
    pub fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self {
            file_guard,
            metrics: Arc::new(LoggingMetrics::default()),
        }
    }

    /// Records a flush request. The non-blocking writer flushes on its own
    /// and on drop of the guard.
    pub fn flush(&self) {
        self.metrics.flush_count.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            flush_count = self.metrics.flush_count.load(Ordering::Relaxed),
            "Logging flush requested"
        );
    }

    pub fn shutdown(mut self) {
        self.metrics
            .shutdown_in_progress
            .store(true, Ordering::Release);
        tracing::info!(
            total_flushes = self.metrics.flush_count.load(Ordering::Relaxed),
            "Logging shutdown"
        );
        drop(self.file_guard.take());
    }

    pub fn stats(&self) -> LoggingStats {
        LoggingStats {
            flush_count: self.metrics.flush_count.load(Ordering::Relaxed),
            shutdown_in_progress: self.metrics.shutdown_in_progress.load(Ordering::Acquire),
            file_output: self.file_guard.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_counts() {
        let handle = LoggingHandle::new(None);
        handle.flush();
        handle.flush();
        assert_eq!(
            handle.stats(),
            LoggingStats {
                flush_count: 2,
                shutdown_in_progress: false,
                file_output: false,
            }
        );
    }

    #[test]
    fn test_shutdown_marks_metrics() {
        let handle = LoggingHandle::new(None);
        let metrics = Arc::clone(&handle.metrics);
        handle.shutdown();
        assert!(metrics.shutdown_in_progress.load(Ordering::Acquire));
    }
}
