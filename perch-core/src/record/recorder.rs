use super::Record;
use anyhow::Result;

/// Writes a record to an output destination.
///
/// Implementations must not panic on I/O failures; they return an error,
/// which the caller logs and discards.
pub trait Recorder {
    /// Write a record to the [`Recorder`].
    fn write(&mut self, record: Record) -> Result<()>;

    /// Flushes buffered output, if any.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
