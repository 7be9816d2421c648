//! Import orchestration: idempotency check, truncate, batched bulk insert.

use super::source::{EntityStream, SourceReader};
use super::{ImportError, ImportResult};
use crate::repo::BulkStore;
use log::{debug, info, warn};
use std::iter::FusedIterator;
use std::time::Instant;

/// Entities per bulk insert.
pub const DEFAULT_BATCH_SIZE: usize = 5000;

/// Coordinates one import of a source into a store.
pub struct ImportOrchestrator<'a, E> {
    repo: &'a dyn BulkStore<E>,
    source: &'a mut dyn SourceReader<E>,
    batch_size: usize,
    label: &'static str,
}

/// Outcome of [`ImportOrchestrator::execute`].
pub struct ImportRun<'a, E> {
    /// Records that will be imported; zero when the store was already complete.
    pub total_records: u64,
    /// Per-batch insert counts, produced on demand.
    pub batches: ImportBatches<'a, E>,
}

impl<'a, E> ImportOrchestrator<'a, E> {
    pub fn new(repo: &'a dyn BulkStore<E>, source: &'a mut dyn SourceReader<E>) -> Self {
        Self {
            repo,
            source,
            batch_size: DEFAULT_BATCH_SIZE,
            label: "entities",
        }
    }

    /// Overrides the batch size.
    ///
    /// # Errors
    /// - `InvalidBatchSize` when `batch_size` is zero.
    pub fn with_batch_size(mut self, batch_size: usize) -> ImportResult<Self> {
        if batch_size == 0 {
            return Err(ImportError::InvalidBatchSize(batch_size));
        }
        self.batch_size = batch_size;
        Ok(self)
    }

    /// Name used in log lines.
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    /// Prepares the import and returns the lazy batch sequence.
    ///
    /// Nothing is written until the returned batches are pulled, except the
    /// truncate, which happens here when a re-import is needed.
    ///
    /// # Errors
    /// - `EmptyDataset` when the source reports zero records.
    /// - Source and repository errors unchanged.
    pub fn execute(self) -> ImportResult<ImportRun<'a, E>> {
        let label = self.label;
        let mut guard = SourceGuard::new(self.source, label);

        guard.source().ensure_data_is_available()?;
        let total_records = guard.source().count_total_records()?;
        if total_records == 0 {
            warn!("event=import_start module=import status=error label={label} error_code=empty_dataset");
            return Err(ImportError::EmptyDataset);
        }

        let stored = self.repo.count_all()?;
        if stored == total_records {
            info!(
                "event=import_skip module=import status=ok label={label} stored={stored} reason=already_imported"
            );
            guard.cleanup();
            return Ok(ImportRun {
                total_records: 0,
                batches: ImportBatches {
                    repo: self.repo,
                    entities: None,
                    guard,
                    batch_size: self.batch_size,
                    inserted: 0,
                    started_at: Instant::now(),
                },
            });
        }

        info!(
            "event=import_start module=import status=start label={label} total_records={total_records} stored={stored} batch_size={}",
            self.batch_size
        );
        self.repo.truncate()?;
        let entities = guard.source().load_entities()?;

        Ok(ImportRun {
            total_records,
            batches: ImportBatches {
                repo: self.repo,
                entities: Some(entities),
                guard,
                batch_size: self.batch_size,
                inserted: 0,
                started_at: Instant::now(),
            },
        })
    }
}

/// Lazy sequence of per-batch insert counts.
///
/// Yields `Ok(n)` per committed batch. The first error is yielded once and
/// ends the sequence. Dropping the sequence early stops the import; source
/// cleanup still runs.
pub struct ImportBatches<'a, E> {
    repo: &'a dyn BulkStore<E>,
    entities: Option<EntityStream<E>>,
    guard: SourceGuard<'a, E>,
    batch_size: usize,
    inserted: u64,
    started_at: Instant,
}

impl<E> ImportBatches<'_, E> {
    /// Rows committed so far.
    pub fn inserted(&self) -> u64 {
        self.inserted
    }

    fn finish(&mut self) {
        self.entities = None;
        self.guard.cleanup();
    }
}

impl<E> Iterator for ImportBatches<'_, E> {
    type Item = ImportResult<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut batch = Vec::with_capacity(self.batch_size);
        let mut failure = None;
        {
            let entities = self.entities.as_mut()?;
            while batch.len() < self.batch_size {
                match entities.next() {
                    Some(Ok(entity)) => batch.push(entity),
                    Some(Err(err)) => {
                        failure = Some(err);
                        break;
                    }
                    None => break,
                }
            }
        }

        if let Some(err) = failure {
            warn!(
                "event=import_batch module=import status=error label={} inserted={} error_code=source_failed error={}",
                self.guard.label, self.inserted, err
            );
            self.finish();
            return Some(Err(err.into()));
        }

        if batch.is_empty() {
            info!(
                "event=import_done module=import status=ok label={} inserted={} duration_ms={}",
                self.guard.label,
                self.inserted,
                self.started_at.elapsed().as_millis()
            );
            self.finish();
            return None;
        }

        match self.repo.bulk_insert(&batch) {
            Ok(count) => {
                self.inserted += count as u64;
                debug!(
                    "event=import_batch module=import status=ok label={} batch={} inserted={}",
                    self.guard.label, count, self.inserted
                );
                Some(Ok(count))
            }
            Err(err) => {
                warn!(
                    "event=import_batch module=import status=error label={} inserted={} error_code=bulk_insert_failed error={}",
                    self.guard.label, self.inserted, err
                );
                self.finish();
                Some(Err(err.into()))
            }
        }
    }
}

impl<E> FusedIterator for ImportBatches<'_, E> {}

/// Runs source cleanup exactly once: explicitly, or when dropped.
struct SourceGuard<'a, E> {
    source: &'a mut dyn SourceReader<E>,
    label: &'static str,
    cleaned: bool,
}

impl<'a, E> SourceGuard<'a, E> {
    fn new(source: &'a mut dyn SourceReader<E>, label: &'static str) -> Self {
        Self {
            source,
            label,
            cleaned: false,
        }
    }

    fn source(&mut self) -> &mut dyn SourceReader<E> {
        &mut *self.source
    }

    fn cleanup(&mut self) {
        if self.cleaned {
            return;
        }
        self.cleaned = true;
        match self.source.cleanup() {
            Ok(()) => debug!(
                "event=import_cleanup module=import status=ok label={}",
                self.label
            ),
            Err(err) => warn!(
                "event=import_cleanup module=import status=error label={} error={}",
                self.label, err
            ),
        }
    }
}

impl<E> Drop for SourceGuard<'_, E> {
    fn drop(&mut self) {
        self.cleanup();
    }
}
