//! Per-job processing: parse the path, OCR, persist, index. Failures fail
//! the whole job, which the worker then retries as a unit.

use log::debug;
use std::sync::Arc;

use crate::error::JobError;
use crate::service::{OcrService, PagePersister, SearchIndexer};
use crate::types::PageRef;

/// Derive series/chapter/page from the last three non-empty segments of a
/// slash-separated path. Rightmost segment is the page filename, then the
/// chapter, then the series.
pub fn split_page_path(path: &str) -> Result<PageRef, JobError> {
    let normalized = path.replace('\\', "/");
    let parts: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
    if parts.len() < 3 {
        return Err(JobError::PathFormat {
            path: path.to_string(),
            reason: "need series/chapter/page segments",
        });
    }
    Ok(PageRef {
        series: parts[parts.len() - 3].to_string(),
        chapter: parts[parts.len() - 2].to_string(),
        page: parts[parts.len() - 1].to_string(),
    })
}

/// The external collaborators a worker needs for one job.
#[derive(Clone)]
pub struct PageServices {
    pub ocr: Arc<dyn OcrService>,
    pub persister: Arc<dyn PagePersister>,
    pub indexer: Arc<dyn SearchIndexer>,
}

/// Run one attempt: parse, OCR, upsert, index. Persistence and indexing are
/// not committed atomically; a job that persists and then fails indexing is
/// retried whole, which the upsert and overwrite-style indexing tolerate.
pub fn process_one(services: &PageServices, worker_id: u64, path: &str) -> Result<(), JobError> {
    let page = split_page_path(path)?;

    let text = services.ocr.extract_text(path)?;
    debug!(
        "[worker {}] ocr done - {} / {} / {}",
        worker_id, page.series, page.chapter, page.page
    );

    services.persister.upsert(&page, path, &text)?;
    services.indexer.index_page(&page, path, &text)?;
    debug!(
        "[worker {}] indexed {} / {} / {}",
        worker_id, page.series, page.chapter, page.page
    );
    Ok(())
}
