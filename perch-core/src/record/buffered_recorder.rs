use super::{Record, Recorder};
use anyhow::Result;

/// Keeps every written [`Record`] in memory, in order.
#[derive(Default)]
pub struct BufferedRecorder {
    records: Vec<Record>,
}

impl BufferedRecorder {
    /// Constructs an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records written so far.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records written so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` before the first write.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Recorder for BufferedRecorder {
    fn write(&mut self, record: Record) -> Result<()> {
        self.records.push(record);
        Ok(())
    }
}
