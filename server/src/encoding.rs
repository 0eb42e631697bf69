use parser::Request;

use crate::response::{CONTENT_LENGTH, Response, TRANSFER_ENCODING};

/// Request header that asks for a chunked response. Not a standard HTTP
/// mechanism; the value `yes` (any case) enables it.
pub const CHUNKED_HEADER: &str = "chunked";

pub const CHUNK_SIZE: usize = 1000;

pub fn wants_chunked(request: Option<&Request>) -> bool {
    request
        .and_then(Request::as_received)
        .and_then(|request| request.header(CHUNKED_HEADER))
        .is_some_and(|value| value.eq_ignore_ascii_case("yes"))
}

/// Rewrites the body into chunked framing when the request asked for it.
/// Applies to any status.
pub fn apply_transfer_encoding(mut response: Response, request: Option<&Request>) -> Response {
    if !wants_chunked(request) {
        return response;
    }

    response.remove_header(CONTENT_LENGTH);
    response.set_header(TRANSFER_ENCODING, "chunked");
    let body = chunk_body(response.body());
    response.set_body(body);
    response
}

/// `<hex len>\r\n<data>\r\n` per chunk of at most [`CHUNK_SIZE`] bytes,
/// terminated by `0\r\n\r\n`.
pub fn chunk_body(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + body.len() / CHUNK_SIZE * 8 + 16);
    for chunk in body.chunks(CHUNK_SIZE) {
        out.extend_from_slice(format!("{:x}\r\n", chunk.len()).as_bytes());
        out.extend_from_slice(chunk);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"0\r\n\r\n");
    out
}

#[cfg(test)]
mod tests {
    use parser::RequestParser;

    use super::*;
    use crate::{response::CONTENT_TYPE, status::StatusCode};

    fn request(raw: &str) -> Request {
        RequestParser::new("index.html").parse(raw.as_bytes())
    }

    #[test]
    fn test_chunks_of_1000_bytes() {
        let body = vec![b'a'; 2500];
        let response = Response::new(StatusCode::Ok).with_content("text/html", body);
        let request = request("GET / HTTP/1.1\r\nchunked: yes\r\n\r\n");

        let response = apply_transfer_encoding(response, Some(&request));

        assert_eq!(response.header(CONTENT_LENGTH), None);
        assert_eq!(response.header(TRANSFER_ENCODING), Some("chunked"));
        assert_eq!(response.header(CONTENT_TYPE), Some("text/html"));

        let mut expected = Vec::new();
        for size in [1000, 1000, 500] {
            expected.extend_from_slice(format!("{size:x}\r\n").as_bytes());
            expected.extend(std::iter::repeat_n(b'a', size));
            expected.extend_from_slice(b"\r\n");
        }
        expected.extend_from_slice(b"0\r\n\r\n");
        assert_eq!(response.body(), expected.as_slice());
        assert!(response.body().starts_with(b"3e8\r\n"));
    }

    #[test]
    fn test_flag_value_is_case_insensitive() {
        assert!(wants_chunked(Some(&request("GET / HTTP/1.1\r\nchunked: YES\r\n\r\n"))));
        assert!(!wants_chunked(Some(&request("GET / HTTP/1.1\r\nchunked: no\r\n\r\n"))));
        assert!(!wants_chunked(Some(&request("GET / HTTP/1.1\r\nChunked: yes\r\n\r\n"))));
        assert!(!wants_chunked(Some(&Request::TimedOut)));
        assert!(!wants_chunked(None));
    }

    #[test]
    fn test_untouched_without_flag() {
        let response = Response::new(StatusCode::Ok).with_content("text/html", b"hi".to_vec());
        let encoded = apply_transfer_encoding(response.clone(), Some(&request("GET / HTTP/1.1\r\n\r\n")));

        assert_eq!(encoded, response);
    }

    #[test]
    fn test_empty_body_still_gets_terminator() {
        let response = Response::new(StatusCode::NotFound);
        let request = request("GET /nope HTTP/1.1\r\nchunked: yes\r\n\r\n");

        let response = apply_transfer_encoding(response, Some(&request));

        assert_eq!(
            response.to_bytes(),
            b"HTTP/1.1 404 Not Found\r\nTransfer-Encoding: chunked\r\n\r\n0\r\n\r\n"
        );
    }
}
