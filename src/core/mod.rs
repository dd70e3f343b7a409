pub mod counter;
pub mod driver;
pub mod sink;

pub use counter::{Counter, Step};
pub use driver::{CancelToken, Driver, DriverOptions, RunSummary, StopReason};
pub use sink::{MemorySink, OutputFormat, WriterSink};

/// Destination for generated sequences.
pub trait SequenceSink {
    fn emit(&mut self, digits: &[u8]) -> std::io::Result<()>;
    fn flush(&mut self) -> std::io::Result<()>;
}
