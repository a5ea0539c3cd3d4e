//! Metrics sink writing scalar series to TFRecord.
use anyhow::{anyhow, Result};
use perch_core::record::{Record, RecordValue, Recorder};
use std::{fs, path::Path};
use tensorboard_rs::summary_writer::SummaryWriter;

/// Write records to TFRecord.
///
/// Every record must hold the step index as a [`RecordValue::Step`] under
/// the step key, `"total_steps"` by default.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
    step_key: String,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`, which is created if missing.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Result<Self> {
        fs::create_dir_all(&logdir)?;
        Ok(Self {
            writer: SummaryWriter::new(logdir),
            step_key: "total_steps".to_string(),
        })
    }

    /// Sets the key of the step index.
    pub fn step_key(mut self, v: impl Into<String>) -> Self {
        self.step_key = v.into();
        self
    }
}

impl Recorder for TensorboardRecorder {
    /// Write a given [`Record`] into a TFRecord.
    ///
    /// Every other value becomes a point of the scalar series of its name.
    fn write(&mut self, record: Record) -> Result<()> {
        let step = match record.get(&self.step_key) {
            Some(RecordValue::Step(v)) => *v,
            Some(v) => return Err(anyhow!("Step {:?} is not a step count", v)),
            None => return Err(anyhow!("Record has no step key {}", self.step_key)),
        };

        for (k, v) in record.iter().filter(|(k, _)| **k != self.step_key) {
            let v = match v {
                RecordValue::Scalar(v) => *v,
                RecordValue::Step(v) => *v as f32,
            };
            self.writer.add_scalar(k, v, step);
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush();
        Ok(())
    }
}
