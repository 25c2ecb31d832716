use tracing::{debug, instrument};

use hopper_sf_client::security::field;

use crate::error::{Error, ErrorKind, Result};
use crate::types::{Job, JobSpec, JobState, Operation};
use crate::xml;

impl super::BulkClient {
    /// Create a job.
    ///
    /// The spec is validated before any request is made: the object name
    /// must be a plain identifier and upsert jobs must name a usable
    /// external id field.
    #[instrument(skip(self, spec), fields(object = %spec.object_type, operation = %spec.operation))]
    pub async fn create_job(&self, spec: &JobSpec) -> Result<Job> {
        validate_spec(spec)?;
        let doc = xml::create_job_doc(spec);
        let response = self.client.post_xml(&self.client.jobs_url(), &doc).await?;
        let job = xml::parse_job_info(&response)?;
        debug!(job_id = %job.id, "Created job");
        Ok(job)
    }

    /// Re-read a job's control document.
    #[instrument(skip(self))]
    pub async fn refresh_job(&self, job_id: &str) -> Result<Job> {
        let response = self.client.get_text(&self.client.job_url(job_id)).await?;
        xml::parse_job_info(&response)
    }

    /// Close a job so no further batches can be added. Batches already
    /// submitted keep processing.
    ///
    /// Closing a job that is already closed is a no-op, so the close step
    /// can be retried freely.
    #[instrument(skip(self, job), fields(job_id = %job.id))]
    pub async fn close_job(&self, job: &mut Job) -> Result<()> {
        if job.state == JobState::Closed {
            return Ok(());
        }
        let updated = self.set_job_state(&job.id, JobState::Closed).await?;
        *job = updated;
        Ok(())
    }

    /// Abort a job. In-flight batches are abandoned; rows they would have
    /// processed are not applied.
    #[instrument(skip(self, job), fields(job_id = %job.id))]
    pub async fn abort_job(&self, job: &mut Job) -> Result<()> {
        let updated = self.set_job_state(&job.id, JobState::Aborted).await?;
        *job = updated;
        Ok(())
    }

    pub(super) async fn set_job_state(&self, job_id: &str, state: JobState) -> Result<Job> {
        let doc = xml::state_doc(state);
        let response = self.client.post_xml(&self.client.job_url(job_id), &doc).await?;
        xml::parse_job_info(&response)
    }
}

fn validate_spec(spec: &JobSpec) -> Result<()> {
    if !field::is_safe_sobject_name(&spec.object_type) {
        return Err(Error::new(ErrorKind::InvalidOperation(format!(
            "Object name {:?} is not a plain identifier",
            spec.object_type
        ))));
    }
    if spec.operation == Operation::Upsert {
        match spec.external_id_field_name.as_deref() {
            None => {
                return Err(Error::new(ErrorKind::InvalidOperation(
                    "Upsert jobs require an external id field".to_string(),
                )))
            }
            Some(name) if !field::is_safe_field_name(name) => {
                return Err(Error::new(ErrorKind::InvalidOperation(format!(
                    "External id field {name:?} is not a plain identifier"
                ))))
            }
            Some(_) => {}
        }
    }
    Ok(())
}
