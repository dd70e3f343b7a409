use crate::core::counter::{Counter, Step};
use crate::core::SequenceSink;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop flag, checked once per iteration.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverOptions {
    /// Stop after this many emitted lines.
    pub max_iterations: Option<u64>,
    /// Never emit a sequence longer than this.
    pub max_length: Option<usize>,
    pub monitor_every: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    MaxIterations,
    MaxLength,
    Cancelled,
    OutputClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub iterations: u64,
    /// Counter state at stop: the last emitted sequence, or `[0]` when
    /// nothing was emitted.
    pub final_digits: Vec<u8>,
    pub stop_reason: StopReason,
}

pub struct Driver<S: SequenceSink> {
    counter: Counter,
    sink: S,
    options: DriverOptions,
    cancel: CancelToken,
    monitor: SystemMonitor,
}

impl<S: SequenceSink> Driver<S> {
    pub fn new(sink: S, options: DriverOptions, cancel: CancelToken) -> Result<Self> {
        Ok(Self {
            counter: Counter::initialize()?,
            sink,
            options,
            cancel,
            monitor: SystemMonitor::default(),
        })
    }

    pub fn with_monitor(mut self, monitor: SystemMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    /// Increments and emits until a bound, cancellation or closed output
    /// stops the loop. Without bounds this only returns on error or cancel.
    pub fn run(&mut self) -> Result<RunSummary> {
        tracing::info!("🚀 Starting sequence generation");
        let mut iterations: u64 = 0;

        let stop_reason = loop {
            if self.cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            if let Some(max) = self.options.max_iterations {
                if iterations >= max {
                    break StopReason::MaxIterations;
                }
            }

            if self.exceeds_max_length() {
                break StopReason::MaxLength;
            }

            if let Step::Grew { len } = self.counter.increment()? {
                tracing::debug!("Sequence grew to {} digits after {} lines", len, iterations);
                self.monitor.log_stats(&format!("length {}", len));
            }

            match self.sink.emit(self.counter.digits()) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::BrokenPipe => break StopReason::OutputClosed,
                Err(e) => return Err(e.into()),
            }
            iterations += 1;

            if let Some(every) = self.options.monitor_every {
                if every > 0 && iterations % every == 0 {
                    self.monitor.log_stats(&format!("{} lines", iterations));
                }
            }
        };

        match self.sink.flush() {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
            Err(e) => return Err(e.into()),
        }
        self.monitor.log_final_stats();

        let summary = RunSummary {
            iterations,
            final_digits: self.counter.digits().to_vec(),
            stop_reason,
        };
        tracing::info!(
            "✅ Stopped after {} lines ({:?}), final length {}",
            summary.iterations,
            summary.stop_reason,
            summary.final_digits.len()
        );
        Ok(summary)
    }

    /// True when the next sequence would be longer than `max_length`.
    fn exceeds_max_length(&self) -> bool {
        let Some(max) = self.options.max_length else {
            return false;
        };
        let next_len = if self.counter.will_grow() {
            self.counter.len() + 1
        } else {
            self.counter.len()
        };
        next_len > max
    }

    pub fn counter(&self) -> &Counter {
        &self.counter
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sink::MemorySink;

    fn bounded(max_iterations: Option<u64>, max_length: Option<usize>) -> DriverOptions {
        DriverOptions {
            max_iterations,
            max_length,
            ..DriverOptions::default()
        }
    }

    #[test]
    fn test_first_line_is_one() {
        let mut driver =
            Driver::new(MemorySink::default(), bounded(Some(3), None), CancelToken::new()).unwrap();
        let summary = driver.run().unwrap();

        assert_eq!(summary.iterations, 3);
        assert_eq!(summary.stop_reason, StopReason::MaxIterations);
        assert_eq!(driver.sink().lines, vec![vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn test_max_length_stops_before_longer_sequence() {
        let mut driver =
            Driver::new(MemorySink::default(), bounded(None, Some(1)), CancelToken::new()).unwrap();
        let summary = driver.run().unwrap();

        assert_eq!(summary.stop_reason, StopReason::MaxLength);
        assert_eq!(summary.iterations, 255);
        assert_eq!(summary.final_digits, vec![255]);
        let sink = driver.into_sink();
        assert_eq!(sink.lines.last(), Some(&vec![255]));
        assert!(sink.lines.iter().all(|line| line.len() == 1));
    }

    #[test]
    fn test_zero_max_length_emits_nothing() {
        let mut driver =
            Driver::new(MemorySink::default(), bounded(None, Some(0)), CancelToken::new()).unwrap();
        let summary = driver.run().unwrap();

        assert_eq!(summary.stop_reason, StopReason::MaxLength);
        assert_eq!(summary.iterations, 0);
        assert_eq!(summary.final_digits, vec![0]);
        assert!(driver.sink().lines.is_empty());
    }

    #[test]
    fn test_max_length_two_includes_all_zero_pair() {
        let mut driver =
            Driver::new(MemorySink::default(), bounded(None, Some(2)), CancelToken::new()).unwrap();
        let summary = driver.run().unwrap();

        assert_eq!(summary.iterations, 255 + 65_536);
        assert_eq!(summary.final_digits, vec![255, 255]);
        assert_eq!(driver.sink().lines[255], vec![0, 0]);
    }

    #[test]
    fn test_cancelled_before_start() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut driver = Driver::new(MemorySink::default(), DriverOptions::default(), cancel).unwrap();
        let summary = driver.run().unwrap();

        assert_eq!(summary.stop_reason, StopReason::Cancelled);
        assert_eq!(summary.iterations, 0);
        assert_eq!(summary.final_digits, vec![0]);
    }

    struct ClosedPipe;

    impl SequenceSink for ClosedPipe {
        fn emit(&mut self, _digits: &[u8]) -> std::io::Result<()> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn test_broken_pipe_ends_run() {
        let mut driver = Driver::new(ClosedPipe, DriverOptions::default(), CancelToken::new()).unwrap();
        let summary = driver.run().unwrap();
        assert_eq!(summary.stop_reason, StopReason::OutputClosed);
        assert_eq!(summary.iterations, 0);
    }

    struct FailingSink;

    impl SequenceSink for FailingSink {
        fn emit(&mut self, _digits: &[u8]) -> std::io::Result<()> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_other_write_errors_propagate() {
        let mut driver = Driver::new(FailingSink, DriverOptions::default(), CancelToken::new()).unwrap();
        assert!(driver.run().is_err());
    }
}
