//! HTTP/1.x request parser
//!
//! Turns the bytes read from a connection into a [`Request`]. Malformed input
//! is never an error: the parser records what it could read and classifies
//! the request, so the response side can map every anomaly to a status code
//! in one place.
//!
//! # Examples
//!
//! ```
//! use parser::{Classification, Method, Request, RequestParser};
//!
//! let parser = RequestParser::new("index.html");
//!
//! let request = parser.parse(b"GET /?lang=en HTTP/1.1\r\nHost: example.com\r\n\r\n");
//! assert_eq!(request.classify(), Classification::Ready(Method::Get));
//!
//! let Request::Received(request) = request else { unreachable!() };
//! assert_eq!(request.resource_path(), "index.html");
//! assert_eq!(request.query_parameters()["lang"], "en");
//!
//! let request = parser.parse(b"BREW /pot HTTP/1.1\r\n\r\n");
//! assert_eq!(request.classify(), Classification::NotImplemented);
//! ```

mod error;
mod grammar;
mod params;
mod target;
mod types;

pub use error::ParseError;
pub use grammar::RequestParser;
pub use types::{
    CONTENT_LENGTH, CONTENT_TYPE, Classification, HttpRequest, Method, MethodToken, REFERER,
    Request, USER_AGENT,
};
