use tracing::{debug, instrument};

use crate::codec;
use crate::error::{Error, ErrorKind, PartialResult, Result};
use crate::types::{BatchGap, BatchInfo, ContentType, Job, Table};
use crate::xml;

impl super::BulkClient {
    /// Download every batch's results and merge them into one table.
    ///
    /// Batches are processed in the order given, which is submission order
    /// when the list comes from [`submit_table`](Self::submit_table). For
    /// ingest jobs each batch contributes the normalized four-column
    /// outcome rows; for query jobs each batch's result pages are fetched
    /// and appended in page order.
    ///
    /// Batches in an error state contribute no rows. When any exist, the
    /// recovered rows are not discarded: the call fails with a
    /// partial-result error carrying the assembled table and one gap
    /// record per missing batch.
    ///
    /// Reading results does not consume them; calling this again against
    /// the same completed job yields the same table.
    #[instrument(skip(self, job, batches), fields(job_id = %job.id, batches = batches.len()))]
    pub async fn fetch_results(&self, job: &Job, batches: &[BatchInfo]) -> Result<Table> {
        let mut assembled = Table::default();
        let mut gaps: Vec<BatchGap> = Vec::new();

        for batch in batches {
            if batch.state.is_error() {
                gaps.push(BatchGap {
                    batch_id: batch.id.clone(),
                    state: batch.state,
                    state_message: batch.state_message.clone(),
                });
                continue;
            }
            let table = if job.operation.is_query() {
                self.fetch_query_batch(job, batch).await?
            } else {
                self.fetch_ingest_batch(job, batch).await?
            };
            append_table(&mut assembled, table)?;
        }

        if gaps.is_empty() {
            Ok(assembled)
        } else {
            debug!(
                job_id = %job.id,
                recovered = assembled.row_count(),
                gaps = gaps.len(),
                "Result fetch is missing batches"
            );
            Err(Error::new(ErrorKind::PartialResult(Box::new(
                PartialResult {
                    recovered: assembled,
                    gaps,
                },
            ))))
        }
    }

    async fn fetch_ingest_batch(&self, job: &Job, batch: &BatchInfo) -> Result<Table> {
        let body = self
            .client
            .get_text(&self.client.batch_result_url(&job.id, &batch.id))
            .await?;
        codec::decode_ingest_results(job.content_type, &body)
    }

    /// A query batch's result endpoint lists page ids; the pages themselves
    /// are downloaded concurrently and appended in the listed order.
    async fn fetch_query_batch(&self, job: &Job, batch: &BatchInfo) -> Result<Table> {
        if job.content_type != ContentType::Csv {
            return Err(Error::new(ErrorKind::InvalidOperation(format!(
                "Query results are fetched as CSV, not {}",
                job.content_type
            ))));
        }

        let list_doc = self
            .client
            .get_text(&self.client.batch_result_url(&job.id, &batch.id))
            .await?;
        let page_ids = xml::extract_elements(&list_doc, "result");
        if page_ids.is_empty() {
            return Err(Error::new(ErrorKind::InvalidResponse(format!(
                "Batch {} listed no result pages",
                batch.id
            ))));
        }
        debug!(batch_id = %batch.id, pages = page_ids.len(), "Downloading result pages");

        let downloads = page_ids.iter().map(|page_id| {
            let url = self.client.page_url(&job.id, &batch.id, page_id);
            async move { self.client.get_text(&url).await }
        });
        let bodies = futures::future::join_all(downloads).await;

        let mut merged = Table::default();
        for body in bodies {
            let page = codec::decode_csv_table(&body?)?;
            append_table(&mut merged, page)?;
        }
        Ok(merged)
    }
}

/// Append a page's rows onto the assembled table. The first non-empty page
/// fixes the column set; later pages must agree on it.
fn append_table(assembled: &mut Table, page: Table) -> Result<()> {
    if page.columns().is_empty() && page.is_empty() {
        return Ok(());
    }
    if assembled.columns().is_empty() {
        *assembled = page;
        return Ok(());
    }
    if assembled.columns() != page.columns() {
        return Err(Error::new(ErrorKind::InvalidResponse(
            "Result pages disagree on columns".to_string(),
        )));
    }
    for row in page.into_rows() {
        assembled.push_row(row);
    }
    Ok(())
}
