//! Service for ingesting batches of user-selected files.
//!
//! Coordinates the decoder adapter, the batch-settle barrier and the shared
//! image store. Decodes run without holding the store lock; the settled batch
//! is appended in one locked step, so observers never see half a batch.

use crate::decoder::{DecoderAdapter, FileBlob};
use crate::error::DecodeFailure;
use crate::state::{BatchSettle, ImageStore};
use async_std::channel;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, PoisonError};

/// Summary of one ingested batch.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Blobs handed to the decoder.
    pub submitted: usize,
    /// Blobs dropped for not declaring an image media type.
    pub filtered: usize,
    /// Images appended to the collection.
    pub appended: usize,
    /// Files that were submitted but failed to decode, in batch order.
    pub failures: Vec<DecodeFailure>,
}

/// Service for managing batch ingestion.
#[derive(Clone)]
pub struct IngestService {
    store: Arc<Mutex<ImageStore>>,
    decoder: Arc<DecoderAdapter>,
}

impl IngestService {
    /// Creates a new ingest service.
    pub fn new(store: Arc<Mutex<ImageStore>>, decoder: Arc<DecoderAdapter>) -> Self {
        Self { store, decoder }
    }

    /// Decodes every image blob concurrently and appends the successes in
    /// their original order once the whole batch has settled.
    ///
    /// Each call tracks its own batch, so overlapping calls settle and commit
    /// independently of each other.
    pub async fn ingest(&self, blobs: Vec<FileBlob>) -> IngestReport {
        let start = std::time::Instant::now();
        let total = blobs.len();
        let accepted: Vec<FileBlob> = blobs
            .into_iter()
            .filter(|blob| {
                let keep = blob.is_image();
                if !keep {
                    debug!("Skipping {} ({})", blob.name, blob.media_type);
                }
                keep
            })
            .collect();

        let mut report = IngestReport {
            submitted: accepted.len(),
            filtered: total - accepted.len(),
            ..IngestReport::default()
        };
        if accepted.is_empty() {
            debug!("Batch of {} files had nothing to decode", total);
            return report;
        }

        let mut barrier = BatchSettle::new(accepted.iter().map(|b| b.name.clone()).collect());
        let (tx, rx) = channel::unbounded();
        for (slot, blob) in accepted.into_iter().enumerate() {
            self.decoder.submit(slot, blob, tx.clone());
        }
        drop(tx);
        debug!("Submitted batch of {} images", report.submitted);

        while !barrier.is_settled() {
            match rx.recv().await {
                Ok((slot, outcome)) => barrier.record(slot, outcome),
                Err(_) => {
                    warn!(
                        "Decode workers exited with {} slots unresolved",
                        barrier.pending()
                    );
                    barrier.abandon_pending();
                }
            }
        }

        let settled = barrier.into_settled();
        report.appended = {
            let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
            store.append_batch(settled.images)
        };
        report.failures = settled.failures;

        info!(
            "Batch settled in {:?}: {} appended, {} failed, {} filtered",
            start.elapsed(),
            report.appended,
            report.failures.len(),
            report.filtered
        );
        report
    }
}
