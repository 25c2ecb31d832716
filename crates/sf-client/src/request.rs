//! HTTP request building with async-API headers.

use bytes::Bytes;
use std::collections::HashMap;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl RequestMethod {
    /// Convert to reqwest::Method.
    pub fn to_reqwest(&self) -> reqwest::Method {
        match self {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Patch => reqwest::Method::PATCH,
            RequestMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Builder for HTTP requests with async-API options.
#[derive(Debug)]
pub struct RequestBuilder {
    pub(crate) method: RequestMethod,
    pub(crate) url: String,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) body: Option<RequestBody>,
    /// Session token sent as the X-SFDC-Session header.
    pub(crate) session_token: Option<String>,
}

/// Request body content.
#[derive(Debug)]
pub enum RequestBody {
    Text(String),
    Bytes(Bytes),
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(method: RequestMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            session_token: None,
        }
    }

    /// Set the session token for authentication.
    pub fn session_auth(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set a text body with an explicit content type (batch payloads).
    pub fn payload(mut self, body: impl Into<String>, content_type: &str) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self.headers
            .insert("Content-Type".to_string(), content_type.to_string());
        self
    }

    /// Set bytes body.
    pub fn bytes(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(RequestBody::Bytes(body.into()));
        self
    }

    /// Set an XML body (control documents).
    pub fn xml(mut self, data: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(data.into()));
        self.headers.insert(
            "Content-Type".to_string(),
            "application/xml; charset=UTF-8".to_string(),
        );
        self
    }

    /// Accept gzip compression for the response.
    pub fn accept_gzip(mut self) -> Self {
        self.headers
            .insert("Accept-Encoding".to_string(), "gzip".to_string());
        self
    }
}
