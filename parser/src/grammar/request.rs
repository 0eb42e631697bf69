use std::collections::{BTreeMap, HashMap};

use pest::{Parser, iterators::Pair};
use pest_derive::Parser;
use tracing::debug;

use crate::{
    error::{ParseError, Result},
    params::{FORM_CONTENT_TYPE, parse_pairs},
    target::Target,
    types::{CONTENT_LENGTH, CONTENT_TYPE, HttpRequest, Method, MethodToken, Request},
};

const SUPPORTED_VERSIONS: [&str; 2] = ["HTTP/1.0", "HTTP/1.1"];

#[derive(Parser)]
#[grammar = "./grammar/request.pest"]
struct RequestGrammar;

/// Message split into its lines, before any HTTP semantics are applied.
#[derive(Debug, Default)]
struct RawMessage<'i> {
    request_tokens: Vec<&'i str>,
    headers: Vec<(&'i str, &'i str)>,
    body: Option<&'i str>,
}

/// Turns raw request bytes into a [`Request`].
///
/// Parsing never fails: anything that is not a well-formed request line
/// produces a request whose [`HttpRequest::is_valid`] is false.
#[derive(Debug, Clone)]
pub struct RequestParser {
    default_page: String,
}

impl RequestParser {
    pub fn new(default_page: impl Into<String>) -> Self {
        Self {
            default_page: default_page.into(),
        }
    }

    pub fn default_page(&self) -> &str {
        &self.default_page
    }

    pub fn parse(&self, raw: &[u8]) -> Request {
        if raw.is_empty() {
            return Request::Received(HttpRequest::malformed(Vec::new()));
        }

        let text = String::from_utf8_lossy(raw);
        match Self::split_message(&text) {
            Ok(message) => Request::Received(self.build_request(raw.to_vec(), message)),
            Err(e) => {
                debug!("Treating unreadable request as malformed: {}", e);
                Request::Received(HttpRequest::malformed(raw.to_vec()))
            }
        }
    }

    fn split_message(input: &str) -> Result<RawMessage<'_>> {
        let request = RequestGrammar::parse(Rule::request, input)
            .map_err(|e| ParseError::Unreadable(e.to_string()))?
            .next()
            .ok_or_else(|| ParseError::MissingPart("request"))?;

        let mut message = RawMessage::default();
        for pair in request.into_inner() {
            match pair.as_rule() {
                Rule::request_line => {
                    message.request_tokens = pair.into_inner().map(|token| token.as_str()).collect();
                }
                Rule::header_field => message.headers.push(Self::parse_header(pair)?),
                Rule::other_line => debug!("Ignoring header line '{}'", pair.as_str()),
                Rule::body => message.body = Some(pair.as_str()),
                Rule::EOI => {}
                rule => return Err(ParseError::UnexpectedRule(format!("{rule:?}"))),
            }
        }

        Ok(message)
    }

    fn parse_header<'i>(pair: Pair<'i, Rule>) -> Result<(&'i str, &'i str)> {
        let mut inner = pair.into_inner();
        let name = inner
            .next()
            .ok_or_else(|| ParseError::MissingPart("header name"))?;
        let value = inner
            .next()
            .ok_or_else(|| ParseError::MissingPart("header value"))?;

        Ok((name.as_str(), value.as_str()))
    }

    fn build_request(&self, raw_text: Vec<u8>, message: RawMessage<'_>) -> HttpRequest {
        let headers: HashMap<String, String> = message
            .headers
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        let mut request = HttpRequest {
            headers,
            ..HttpRequest::malformed(raw_text)
        };

        let &[method, target, version] = message.request_tokens.as_slice() else {
            debug!(
                "Request line has {} tokens, expected 3",
                message.request_tokens.len()
            );
            return request;
        };

        request.valid = SUPPORTED_VERSIONS.contains(&version);
        request.method = match method.parse::<Method>() {
            Ok(method) => MethodToken::Known(method),
            Err(_) => MethodToken::Unrecognized(method.to_string()),
        };

        let target = Target::normalize(target, &self.default_page);
        request.resource_path = target.resource_path;

        if request.headers.contains_key(CONTENT_LENGTH) {
            if let Some(body) = message.body {
                request.body = body.to_string();
            }
        }

        request.query_parameters = Self::collect_parameters(&request, target.query.as_deref());
        request
    }

    fn collect_parameters(request: &HttpRequest, query: Option<&str>) -> BTreeMap<String, String> {
        let mut parameters = BTreeMap::new();

        if let Some(query) = query {
            parse_pairs(query, &mut parameters);
        }

        let carries_form = matches!(
            request.method.method(),
            Some(Method::Post) | Some(Method::Get)
        ) && !request.body.is_empty()
            && request
                .headers
                .get(CONTENT_TYPE)
                .is_some_and(|content_type| content_type.contains(FORM_CONTENT_TYPE));

        if carries_form {
            parse_pairs(&request.body, &mut parameters);
        }

        parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Classification;

    fn parse(input: &str) -> HttpRequest {
        match RequestParser::new("index.html").parse(input.as_bytes()) {
            Request::Received(request) => request,
            Request::TimedOut => panic!("parser never produces a timeout"),
        }
    }

    #[test]
    fn test_split_message_lines() {
        let message =
            RequestParser::split_message("GET /a HTTP/1.1\r\nHost: x\r\nnoise\r\n\r\nbody")
                .unwrap();

        assert_eq!(message.request_tokens, vec!["GET", "/a", "HTTP/1.1"]);
        assert_eq!(message.headers, vec![("Host", "x")]);
        assert_eq!(message.body, Some("body"));
    }

    #[test]
    fn test_split_message_without_blank_line() {
        let message = RequestParser::split_message("GET /a HTTP/1.1\r\nHost: x\r\n").unwrap();

        assert_eq!(message.headers, vec![("Host", "x")]);
        assert_eq!(message.body, None);
    }

    #[test]
    fn test_header_value_keeps_later_separators() {
        let request = parse("GET / HTTP/1.1\r\nX-Note: a: b\r\n\r\n");
        assert_eq!(request.header("X-Note"), Some("a: b"));
    }

    #[test]
    fn test_simple_get() {
        let request = parse("GET /page.html HTTP/1.1\r\nHost: example.com\r\n\r\n");

        assert!(request.is_valid());
        assert!(request.is_implemented());
        assert_eq!(request.method(), &MethodToken::Known(Method::Get));
        assert_eq!(request.resource_path(), "page.html");
        assert_eq!(request.header("Host"), Some("example.com"));
        assert_eq!(request.body(), "");
    }

    #[test]
    fn test_invalid_request_still_parses_headers() {
        let request = parse("GET /\r\nHost: example.com\r\n\r\n");

        assert!(!request.is_valid());
        assert_eq!(request.method(), &MethodToken::Absent);
        assert_eq!(request.header("Host"), Some("example.com"));
    }

    #[test]
    fn test_bad_version_keeps_method_and_target() {
        let request = parse("FOO /x.html HTTP/2.0\r\n\r\n");

        assert!(!request.is_valid());
        assert!(!request.is_implemented());
        assert_eq!(request.resource_path(), "x.html");
        assert_eq!(
            Request::Received(request).classify(),
            Classification::Malformed
        );
    }

    #[test]
    fn test_body_requires_content_length() {
        let request = parse("POST /form HTTP/1.1\r\n\r\nname=x");
        assert_eq!(request.body(), "");

        let request = parse("POST /form HTTP/1.1\r\nContent-Length: 6\r\n\r\nname=x");
        assert_eq!(request.body(), "name=x");
        assert_eq!(request.content_length(), Some(6));
    }
}
