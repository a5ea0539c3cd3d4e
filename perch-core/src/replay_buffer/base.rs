//! Fixed-capacity ring buffer with uniform sampling.
use super::ReplayMemoryConfig;
use crate::error::PerchError;
use rand::{rngs::SmallRng, seq::index, SeedableRng};

/// A fixed-capacity FIFO buffer of items sampled uniformly for learning.
///
/// Items live in a contiguous buffer; `i` points at the slot written next,
/// which is also the oldest item once the buffer is full.
pub struct ReplayMemory<T> {
    capacity: usize,
    i: usize,
    buf: Vec<T>,
    rng: SmallRng,
}

impl<T> ReplayMemory<T> {
    /// Constructs an empty replay memory.
    pub fn build(config: &ReplayMemoryConfig) -> Self {
        Self {
            capacity: config.capacity,
            i: 0,
            buf: Vec::with_capacity(config.capacity),
            rng: SmallRng::seed_from_u64(config.seed),
        }
    }

    /// Inserts an item, evicting the oldest one if the memory is full.
    pub fn push(&mut self, item: T) {
        if self.buf.len() < self.capacity {
            self.buf.push(item);
        } else {
            self.buf[self.i] = item;
        }
        self.i = (self.i + 1) % self.capacity;
    }

    /// Returns `size` distinct items drawn uniformly at random.
    ///
    /// The items are borrowed from the memory, which is left unchanged.
    pub fn sample(&mut self, size: usize) -> Result<Vec<&T>, PerchError> {
        if self.buf.len() < size {
            return Err(PerchError::InsufficientSamples {
                requested: size,
                available: self.buf.len(),
            });
        }

        let ixs = index::sample(&mut self.rng, self.buf.len(), size);
        let buf = &self.buf;
        Ok(ixs.iter().map(|ix| &buf[ix]).collect())
    }

    /// The number of items currently stored.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if nothing has been pushed.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Capacity of the memory.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Items from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let head = if self.buf.len() < self.capacity { 0 } else { self.i };
        self.buf[head..].iter().chain(self.buf[..head].iter())
    }
}
