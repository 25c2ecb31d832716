//! Building and parsing of the XML control documents (jobInfo, batchInfo).
//!
//! The async API's control plane is small and rigid, so documents are built
//! with format strings and read with targeted element scans rather than a
//! full XML parser. Values are escaped on the way out and unescaped on the
//! way in.

use hopper_sf_client::security::xml::escape;

use crate::error::{Error, ErrorKind, Result};
use crate::types::{BatchInfo, Job, JobSpec, JobState, Operation};

/// Namespace of every async API control document.
pub(crate) const ASYNC_API_XMLNS: &str = "http://www.force.com/2009/06/asyncapi/dataload";

/// Build the jobInfo document that creates a job.
///
/// Child element order follows the service schema: operation, object,
/// externalIdFieldName, concurrencyMode, contentType.
pub(crate) fn create_job_doc(spec: &JobSpec) -> String {
    let external_id = spec
        .external_id_field_name
        .as_deref()
        .map(|field| format!("\n <externalIdFieldName>{}</externalIdFieldName>", escape(field)))
        .unwrap_or_default();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <jobInfo xmlns=\"{xmlns}\">\n \
         <operation>{operation}</operation>\n \
         <object>{object}</object>{external_id}\n \
         <concurrencyMode>{mode}</concurrencyMode>\n \
         <contentType>{content_type}</contentType>\n\
         </jobInfo>",
        xmlns = ASYNC_API_XMLNS,
        operation = spec.operation.api_name(),
        object = escape(&spec.object_type),
        external_id = external_id,
        mode = spec.concurrency_mode.api_name(),
        content_type = spec.content_type.api_name(),
    )
}

/// Build the jobInfo document that moves a job to the given state.
pub(crate) fn state_doc(state: JobState) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <jobInfo xmlns=\"{xmlns}\">\n \
         <state>{state}</state>\n\
         </jobInfo>",
        xmlns = ASYNC_API_XMLNS,
        state = state.api_name(),
    )
}

/// Extract the trimmed, unescaped text of the first `<tag>...</tag>`.
pub(crate) fn extract_element(doc: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = doc.find(&open)? + open.len();
    let end = doc[start..].find(&close)? + start;
    Some(unescape(doc[start..end].trim()))
}

/// Extract the trimmed, unescaped text of every `<tag>...</tag>`, in
/// document order.
pub(crate) fn extract_elements(doc: &str, tag: &str) -> Vec<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let mut values = Vec::new();
    let mut search_from = 0;
    while let Some(found) = doc[search_from..].find(&open) {
        let start = search_from + found + open.len();
        let Some(end_offset) = doc[start..].find(&close) else {
            break;
        };
        let end = start + end_offset;
        values.push(unescape(doc[start..end].trim()));
        search_from = end + close.len();
    }
    values
}

/// Slice out every `<tag>...</tag>` region, tags included, in document
/// order.
pub(crate) fn extract_blocks<'a>(doc: &'a str, tag: &str) -> Vec<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let mut blocks = Vec::new();
    let mut search_from = 0;
    while let Some(found) = doc[search_from..].find(&open) {
        let start = search_from + found;
        let Some(end_offset) = doc[start..].find(&close) else {
            break;
        };
        let end = start + end_offset + close.len();
        blocks.push(&doc[start..end]);
        search_from = end;
    }
    blocks
}

/// Reverse the five XML entity escapes. `&amp;` last so double-escaped
/// input decodes one level only.
pub(crate) fn unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Parse a jobInfo response document.
pub(crate) fn parse_job_info(doc: &str) -> Result<Job> {
    let id = required(doc, "id", "jobInfo")?;
    let operation = required(doc, "operation", "jobInfo")?
        .parse::<Operation>()
        .map_err(|err| {
            Error::new(ErrorKind::InvalidResponse(format!(
                "jobInfo carries an unusable operation: {err}"
            )))
        })?;
    let object_type = required(doc, "object", "jobInfo")?;
    let state = required(doc, "state", "jobInfo")?.parse()?;
    let content_type = extract_element(doc, "contentType")
        .map(|value| value.parse())
        .transpose()?
        .unwrap_or_default();
    let concurrency_mode = extract_element(doc, "concurrencyMode")
        .map(|value| value.parse())
        .transpose()?
        .unwrap_or_default();
    let external_id_field_name =
        extract_element(doc, "externalIdFieldName").filter(|value| !value.is_empty());

    Ok(Job {
        id,
        object_type,
        operation,
        content_type,
        concurrency_mode,
        state,
        external_id_field_name,
    })
}

/// Parse a single batchInfo document.
pub(crate) fn parse_batch_info(doc: &str) -> Result<BatchInfo> {
    let id = required(doc, "id", "batchInfo")?;
    let job_id = required(doc, "jobId", "batchInfo")?;
    let state = required(doc, "state", "batchInfo")?.parse()?;
    let state_message = extract_element(doc, "stateMessage").filter(|value| !value.is_empty());

    Ok(BatchInfo {
        id,
        job_id,
        state,
        state_message,
    })
}

/// Parse a batchInfoList document into its batches, in document order.
pub(crate) fn parse_batch_info_list(doc: &str) -> Result<Vec<BatchInfo>> {
    extract_blocks(doc, "batchInfo")
        .into_iter()
        .map(parse_batch_info)
        .collect()
}

fn required(doc: &str, tag: &str, context: &str) -> Result<String> {
    extract_element(doc, tag).ok_or_else(|| {
        Error::new(ErrorKind::InvalidResponse(format!(
            "{context} document without <{tag}>"
        )))
    })
}
