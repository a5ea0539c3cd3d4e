//! Key-value records.
use crate::error::PerchError;
use std::collections::{btree_map, BTreeMap};

/// A value stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A number such as a loss or an exploration rate.
    Scalar(f32),

    /// A step count, kept exact at any magnitude.
    Step(usize),
}

/// Named values produced at one point of a run, ordered by name.
#[derive(Debug, Default, Clone)]
pub struct Record(BTreeMap<String, RecordValue>);

impl Record {
    /// A record without values.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A record holding one scalar.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        let mut record = Self::empty();
        record.insert(name, RecordValue::Scalar(value));
        record
    }

    /// A record holding one step count.
    pub fn from_step(name: impl Into<String>, value: usize) -> Self {
        let mut record = Self::empty();
        record.insert(name, RecordValue::Step(value));
        record
    }

    /// Adds a value, replacing any value of the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: RecordValue) {
        self.0.insert(name.into(), value);
    }

    /// Values in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// The value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&RecordValue> {
        self.0.get(name)
    }

    /// The scalar stored under `name`.
    pub fn get_scalar(&self, name: &str) -> Result<f32, PerchError> {
        match self.get(name) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            Some(_) => Err(PerchError::RecordValueTypeError(format!(
                "{} is not a scalar",
                name
            ))),
            None => Err(PerchError::RecordKeyError(name.to_string())),
        }
    }

    /// The step count stored under `name`.
    pub fn get_step(&self, name: &str) -> Result<usize, PerchError> {
        match self.get(name) {
            Some(RecordValue::Step(v)) => Ok(*v),
            Some(_) => Err(PerchError::RecordValueTypeError(format!(
                "{} is not a step count",
                name
            ))),
            None => Err(PerchError::RecordKeyError(name.to_string())),
        }
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` if the record holds no value.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
