use std::collections::{BTreeMap, HashMap};

use crate::http::json::JsonFields;

/// HTTP request methods.
///
/// The common verbs get their own variant. Any other token is kept verbatim in
/// `Other` so it can still be routed if a handler was registered for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// PATCH - Partial modification of a resource
    PATCH,
    /// Any other method token, case preserved
    Other(String),
}

impl Method {
    /// Parses an HTTP method token.
    ///
    /// Matching is case-sensitive, so `get` becomes `Method::Other("get")`.
    ///
    /// # Example
    ///
    /// ```
    /// # use relay::http::request::Method;
    /// assert_eq!(Method::parse("GET"), Method::GET);
    /// assert_eq!(Method::parse("BREW"), Method::Other("BREW".to_string()));
    /// ```
    pub fn parse(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "HEAD" => Method::HEAD,
            "OPTIONS" => Method::OPTIONS,
            "PATCH" => Method::PATCH,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
            Method::Other(s) => s,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form and file fields decoded from a `multipart/form-data` body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    /// Plain form fields keyed by their `name` attribute
    pub fields: BTreeMap<String, String>,
    /// Uploaded file contents keyed by their `filename` attribute
    pub files: BTreeMap<String, Vec<u8>>,
}

/// The typed view of a request body, chosen once by content-type sniffing.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Neither JSON nor multipart; only `raw_body` is meaningful
    Opaque,
    Json(JsonFields),
    Multipart(FormData),
}

/// Represents a parsed HTTP request from a client.
///
/// Built once per connection and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request path exactly as sent (e.g., "/index.html")
    pub path: String,
    /// HTTP version token, "HTTP/1.1" when the client omitted it
    pub version: String,
    /// Request headers; names are case-sensitive and the last duplicate wins
    pub headers: HashMap<String, String>,
    /// Body decoded as text with surrounding whitespace trimmed
    pub raw_body: String,
    /// Typed body selected from the `Content-Type` header
    pub body: Body,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    version: Option<String>,
    headers: HashMap<String, String>,
    raw_body: String,
    body: Body,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            path: None,
            version: None,
            headers: HashMap::new(),
            raw_body: String::new(),
            body: Body::Opaque,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn raw_body(mut self, raw_body: impl Into<String>) -> Self {
        self.raw_body = raw_body.into();
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            path: self.path.ok_or("path missing")?,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            headers: self.headers,
            raw_body: self.raw_body,
            body: self.body,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Retrieves a header value by its exact name.
    ///
    /// # Arguments
    ///
    /// * `key` - Header name to look up, case-sensitive
    ///
    /// # Returns
    ///
    /// `Some(&str)` with the header value if present, `None` otherwise.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }

    /// The `Content-Type` header, or an empty string when absent.
    pub fn content_type(&self) -> &str {
        self.header("Content-Type").unwrap_or("")
    }

    pub fn is_multipart(&self) -> bool {
        self.content_type().starts_with("multipart/form-data")
    }

    pub fn is_json(&self) -> bool {
        self.content_type().starts_with("application/json")
    }

    /// Retrieves the Content-Length header value and parses it as a usize.
    ///
    /// Returns 0 if the header is missing or not a valid number.
    pub fn content_length(&self) -> usize {
        self.header("Content-Length")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// JSON fields, if the body was sniffed as `application/json`.
    pub fn json_fields(&self) -> Option<&JsonFields> {
        match &self.body {
            Body::Json(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn form_fields(&self) -> Option<&BTreeMap<String, String>> {
        match &self.body {
            Body::Multipart(form) => Some(&form.fields),
            _ => None,
        }
    }

    pub fn file_fields(&self) -> Option<&BTreeMap<String, Vec<u8>>> {
        match &self.body {
            Body::Multipart(form) => Some(&form.files),
            _ => None,
        }
    }
}
