use crate::status::StatusCode;

pub const HTTP_VERSION: &str = "HTTP/1.1";

pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const TRANSFER_ENCODING: &str = "Transfer-Encoding";

/// Response under construction. Headers keep insertion order and setting an
/// existing name replaces its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.headers.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value,
            None => self.headers.push((name.to_string(), value)),
        }
    }

    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        let index = self.headers.iter().position(|(key, _)| key == name)?;
        Some(self.headers.remove(index).1)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }

    /// Sets the body together with `Content-Type` and a matching
    /// `Content-Length`.
    pub fn with_content(mut self, content_type: &str, body: Vec<u8>) -> Self {
        self.set_header(CONTENT_TYPE, content_type);
        self.set_header(CONTENT_LENGTH, body.len().to_string());
        self.body = body;
        self
    }

    /// Wire form: status line, one line per header, a blank line, the body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(128 + self.body.len());
        out.extend_from_slice(
            format!(
                "{} {} {}\r\n",
                HTTP_VERSION,
                self.status.as_u16(),
                self.status.reason()
            )
            .as_bytes(),
        );
        for (name, value) in &self.headers {
            out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
        }
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_only_wire_form() {
        let response = Response::new(StatusCode::NotFound);
        assert_eq!(response.to_bytes(), b"HTTP/1.1 404 Not Found\r\n\r\n");
    }

    #[test]
    fn test_headers_in_insertion_order_with_replacement() {
        let mut response = Response::new(StatusCode::Ok);
        response.set_header(CONTENT_TYPE, "text/html");
        response.set_header(CONTENT_LENGTH, "1");
        response.set_header(CONTENT_TYPE, "icon");
        response.set_body(b"x".to_vec());

        assert_eq!(
            response.to_bytes(),
            b"HTTP/1.1 200 OK\r\nContent-Type: icon\r\nContent-Length: 1\r\n\r\nx"
        );
    }

    #[test]
    fn test_with_content_sets_length_in_bytes() {
        let response = Response::new(StatusCode::Ok).with_content("text/html", "héllo".into());

        assert_eq!(response.header(CONTENT_TYPE), Some("text/html"));
        assert_eq!(response.header(CONTENT_LENGTH), Some("6"));
    }

    #[test]
    fn test_remove_header() {
        let mut response = Response::new(StatusCode::Ok).with_content("image", vec![0, 1]);

        assert_eq!(response.remove_header(CONTENT_LENGTH), Some("2".to_string()));
        assert_eq!(response.remove_header(CONTENT_LENGTH), None);
        assert_eq!(response.headers().len(), 1);
    }
}
