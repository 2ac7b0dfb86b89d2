//! Identifier service
//!
//! Items, versions, and successor edges all draw ids from one injected
//! generator instance. The generator is constructed once per process and
//! handed by reference to every component that needs ids — never a
//! process-wide static.
//!
//! Ids are partitioned by machine: a generator configured with
//! `(machine_id, machine_count)` only issues ids congruent to `machine_id`
//! modulo `machine_count`, so multiple catalog processes can share one
//! store without coordination. An id is never `0` — that value is reserved
//! as the DAG root sentinel.

use loam_core::{Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};

/// Issues globally unique, never-zero 64-bit ids.
#[derive(Debug)]
pub struct IdGenerator {
    counter: AtomicU64,
    stride: u64,
}

impl IdGenerator {
    /// Create a generator for one machine of a fleet.
    ///
    /// # Errors
    /// Fails if `machine_count` is zero or `machine_id` is out of range.
    pub fn new(machine_id: u64, machine_count: u64) -> Result<Self> {
        if machine_count == 0 {
            return Err(Error::InvalidOperation(
                "machine count must be at least 1".into(),
            ));
        }
        if machine_id >= machine_count {
            return Err(Error::InvalidOperation(format!(
                "machine id {} is out of range for {} machines",
                machine_id, machine_count
            )));
        }
        Ok(Self {
            counter: AtomicU64::new(machine_id),
            stride: machine_count,
        })
    }

    /// The next unique id. Monotonically increasing, never `0`.
    pub fn next_id(&self) -> u64 {
        // counter starts at machine_id, so the first id is machine_id + stride
        self.counter.fetch_add(self.stride, Ordering::SeqCst) + self.stride
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self {
            counter: AtomicU64::new(0),
            stride: 1,
        }
    }
}
