//! HTTP response handling with async-API error parsing.

use std::time::Duration;

use crate::error::{Error, ErrorKind, Result};

/// Wrapper around an HTTP response with async-API helpers.
#[derive(Debug)]
pub struct Response {
    inner: reqwest::Response,
}

impl Response {
    pub(crate) fn new(inner: reqwest::Response) -> Self {
        Self { inner }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        let status = self.status();
        (200..300).contains(&status)
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name)?.to_str().ok()
    }

    /// Get the Retry-After header as a Duration.
    ///
    /// The async API sends Retry-After in seconds; HTTP-date values are
    /// not parsed and yield `None`.
    pub fn retry_after(&self) -> Option<Duration> {
        let value = self.header("retry-after")?;
        value.parse::<u64>().map(Duration::from_secs).ok()
    }

    /// Get the response body as text.
    pub async fn text(self) -> Result<String> {
        self.inner.text().await.map_err(Into::into)
    }

    /// Get the response body as bytes.
    pub async fn bytes(self) -> Result<bytes::Bytes> {
        self.inner.bytes().await.map_err(Into::into)
    }
}

/// Extension trait for processing async-API responses.
pub trait ResponseExt {
    /// Check for async-API errors and convert to the appropriate error type.
    fn check_async_api_error(self) -> impl std::future::Future<Output = Result<Response>> + Send;
}

impl ResponseExt for Response {
    async fn check_async_api_error(self) -> Result<Response> {
        if self.is_success() {
            return Ok(self);
        }

        let status = self.status();
        let retry_after = self.retry_after();
        let body = self.text().await.unwrap_or_default();
        Err(parse_error_response(status, retry_after, &body))
    }
}

/// Parse an error response body and convert to the appropriate error kind.
///
/// Async-API failures carry an XML error document:
///
/// ```xml
/// <error xmlns="http://www.force.com/2009/06/asyncapi/dataload">
///   <exceptionCode>InvalidSessionId</exceptionCode>
///   <exceptionMessage>Invalid session id</exceptionMessage>
/// </error>
/// ```
fn parse_error_response(status: u16, retry_after: Option<Duration>, body: &str) -> Error {
    if status == 429 {
        return Error::new(ErrorKind::RateLimited { retry_after });
    }

    if let Some(code) = extract_tag(body, "exceptionCode") {
        let message = extract_tag(body, "exceptionMessage").unwrap_or_default();
        return Error::new(ErrorKind::AsyncApi {
            exception_code: code.to_string(),
            message: sanitize_error_message(message),
        });
    }

    // Map status codes to error kinds - use sanitized messages to avoid
    // potentially exposing sensitive data from response bodies
    let sanitized = sanitize_error_message(body);
    let kind = match status {
        401 => ErrorKind::Authentication(sanitized),
        403 => ErrorKind::Authorization(sanitized),
        404 => ErrorKind::NotFound(sanitized),
        _ => ErrorKind::Http {
            status,
            message: sanitized,
        },
    };

    Error::new(kind)
}

/// Extract the text content of the first `<tag>...</tag>` element.
fn extract_tag<'a>(body: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(body[start..end].trim())
}

/// Sanitize an error message to prevent exposing sensitive data.
///
/// This function:
/// - Removes anything that looks like a session token
/// - Removes `sid=` session ID parameters
/// - Truncates messages longer than 500 characters
fn sanitize_error_message(message: &str) -> String {
    const MAX_LENGTH: usize = 500;

    let mut sanitized = message.to_string();

    // Session tokens start with the org ID prefix "00D" followed by "!"
    let token_pattern = regex_lite::Regex::new(r"00[A-Za-z0-9]{13,}[!][A-Za-z0-9_.]+").unwrap();
    sanitized = token_pattern
        .replace_all(&sanitized, "[REDACTED_TOKEN]")
        .to_string();

    let session_pattern = regex_lite::Regex::new(r"sid=[A-Za-z0-9]{20,}").unwrap();
    sanitized = session_pattern
        .replace_all(&sanitized, "sid=[REDACTED]")
        .to_string();

    if sanitized.len() > MAX_LENGTH {
        sanitized.truncate(MAX_LENGTH);
        sanitized.push_str("...[truncated]");
    }

    sanitized
}
