//! Batch-settle barrier.
//!
//! Decode results are recorded by their position in the submitted batch, and
//! the batch only yields its images once every slot has resolved. The
//! committed order is the submission order, whatever order decodes finished in.

use crate::decoder::{DecodeOutcome, ImageHandle};
use crate::error::{DecodeError, DecodeFailure};
use log::warn;

/// A batch whose slots have all resolved.
#[derive(Debug, Default)]
pub struct SettledBatch {
    /// Decoded images in submission order.
    pub images: Vec<ImageHandle>,
    /// Failed files in submission order.
    pub failures: Vec<DecodeFailure>,
}

/// Tracks per-slot outcomes for one in-flight batch.
pub struct BatchSettle {
    files: Vec<String>,
    slots: Vec<Option<DecodeOutcome>>,
    pending: usize,
}

impl BatchSettle {
    /// Starts tracking a batch whose slot `i` is the file named `files[i]`.
    pub fn new(files: Vec<String>) -> Self {
        let pending = files.len();
        let slots = files.iter().map(|_| None).collect();
        Self {
            files,
            slots,
            pending,
        }
    }

    /// Records the outcome for `slot`. The first outcome for a slot wins.
    pub fn record(&mut self, slot: usize, outcome: DecodeOutcome) {
        match self.slots.get_mut(slot) {
            Some(entry) if entry.is_none() => {
                *entry = Some(outcome);
                self.pending -= 1;
            }
            Some(_) => warn!("Ignoring duplicate outcome for batch slot {}", slot),
            None => warn!(
                "Ignoring outcome for slot {} outside batch of {}",
                slot,
                self.slots.len()
            ),
        }
    }

    /// Number of slots still waiting for an outcome.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn is_settled(&self) -> bool {
        self.pending == 0
    }

    /// Resolves every slot that never reported as a lost worker.
    pub fn abandon_pending(&mut self) {
        for (slot, entry) in self.slots.iter_mut().enumerate() {
            if entry.is_none() {
                *entry = Some(Err(DecodeError::WorkerLost {
                    file: self.files[slot].clone(),
                }));
            }
        }
        self.pending = 0;
    }

    /// Splits the batch into images and failures, both in submission
    /// order. Slots that never reported count as lost workers.
    pub fn into_settled(self) -> SettledBatch {
        let mut settled = SettledBatch::default();
        for (slot, (file, entry)) in self.files.into_iter().zip(self.slots).enumerate() {
            match entry {
                Some(Ok(handle)) => settled.images.push(handle),
                Some(Err(error)) => settled.failures.push(DecodeFailure { slot, file, error }),
                None => {
                    let error = DecodeError::WorkerLost { file: file.clone() };
                    settled.failures.push(DecodeFailure { slot, file, error });
                }
            }
        }
        settled
    }
}
