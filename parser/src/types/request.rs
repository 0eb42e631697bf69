use std::collections::{BTreeMap, HashMap};

use super::method::{Method, MethodToken};

pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const REFERER: &str = "Referer";
pub const USER_AGENT: &str = "User-Agent";

const IMAGE_SUFFIXES: [&str; 3] = [".jpg", ".bmp", ".gif"];

/// What the server received on a connection, or the fact that nothing
/// arrived in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Stand-in for a read that hit its deadline. Carries no request data.
    TimedOut,
    Received(HttpRequest),
}

/// How a request must be answered, evaluated in priority order:
/// timeout, then validity, then method support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    TimedOut,
    Malformed,
    NotImplemented,
    Ready(Method),
}

impl Request {
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Request::TimedOut)
    }

    pub fn as_received(&self) -> Option<&HttpRequest> {
        match self {
            Request::Received(request) => Some(request),
            Request::TimedOut => None,
        }
    }

    pub fn classify(&self) -> Classification {
        match self {
            Request::TimedOut => Classification::TimedOut,
            Request::Received(request) if !request.is_valid() => Classification::Malformed,
            Request::Received(request) => match request.method().method() {
                Some(method) => Classification::Ready(method),
                None => Classification::NotImplemented,
            },
        }
    }
}

/// A parsed request. Built once by the parser and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub(crate) method: MethodToken,
    pub(crate) raw_text: Vec<u8>,
    pub(crate) resource_path: String,
    pub(crate) query_parameters: BTreeMap<String, String>,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) body: String,
    pub(crate) valid: bool,
}

impl HttpRequest {
    /// Request for input that could not be read at all.
    pub(crate) fn malformed(raw_text: Vec<u8>) -> Self {
        Self {
            method: MethodToken::Absent,
            raw_text,
            resource_path: String::new(),
            query_parameters: BTreeMap::new(),
            headers: HashMap::new(),
            body: String::new(),
            valid: false,
        }
    }

    pub fn method(&self) -> &MethodToken {
        &self.method
    }

    /// Exact bytes received, head and body.
    pub fn raw_text(&self) -> &[u8] {
        &self.raw_text
    }

    /// Path relative to the document root, with `/` already mapped to the
    /// default page.
    pub fn resource_path(&self) -> &str {
        &self.resource_path
    }

    pub fn query_parameters(&self) -> &BTreeMap<String, String> {
        &self.query_parameters
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Header lookup. Names match exactly, without case folding.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_implemented(&self) -> bool {
        matches!(self.method, MethodToken::Known(_))
    }

    pub fn is_image(&self) -> bool {
        IMAGE_SUFFIXES
            .iter()
            .any(|suffix| self.resource_path.ends_with(suffix))
    }

    pub fn content_length(&self) -> Option<usize> {
        self.header(CONTENT_LENGTH)?.trim().parse().ok()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE)
    }

    pub fn referer(&self) -> Option<&str> {
        self.header(REFERER)
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.header(USER_AGENT)
    }
}
