use std::{path::Path, sync::Arc};

use parser::{Classification, HttpRequest, Method, Request};
use tracing::{debug, error};

use crate::{
    content_type,
    error::BuildError,
    filesystem::{FileSystem, LocalFileSystem},
    resolver::PathResolver,
    response::{CONTENT_TYPE, Response},
    status::StatusCode,
    template::{PARAMS_TEMPLATE, render_params},
};

/// Produces the response for a classified request.
///
/// Error statuses carry neither headers nor a body. Only successful
/// dispatches read from the filesystem.
#[derive(Clone)]
pub struct ResponseBuilder {
    resolver: PathResolver,
    fs: Arc<dyn FileSystem>,
}

impl ResponseBuilder {
    pub fn new(resolver: PathResolver, fs: Arc<dyn FileSystem>) -> Self {
        Self { resolver, fs }
    }

    pub fn with_local_root(root: &str) -> Self {
        Self::new(PathResolver::new(root), Arc::new(LocalFileSystem))
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// `None` stands for a request that could not be produced at all.
    pub fn build(&self, request: Option<&Request>) -> Response {
        let Some(request) = request else {
            return Response::new(StatusCode::InternalServerError);
        };

        match (request.classify(), request.as_received()) {
            (Classification::TimedOut, _) => Response::new(StatusCode::RequestTimeout),
            (Classification::Malformed, _) => Response::new(StatusCode::BadRequest),
            (Classification::NotImplemented, _) => Response::new(StatusCode::NotImplemented),
            (Classification::Ready(method), Some(request)) => {
                self.dispatch(method, request).unwrap_or_else(|e| {
                    error!("Failed to build response for {}: {}", method, e);
                    Response::new(StatusCode::InternalServerError)
                })
            }
            (Classification::Ready(_), None) => Response::new(StatusCode::InternalServerError),
        }
    }

    fn dispatch(&self, method: Method, request: &HttpRequest) -> Result<Response, BuildError> {
        debug!("{} {}", method, request.resource_path());

        match method {
            Method::Get => self.serve_file(request, true),
            Method::Head => self.serve_file(request, false),
            Method::Post if request.resource_path() == PARAMS_TEMPLATE => {
                self.render_template(request)
            }
            Method::Post => self.serve_file(request, true),
            Method::Trace => Ok(Self::trace(request)),
        }
    }

    fn serve_file(&self, request: &HttpRequest, send_body: bool) -> Result<Response, BuildError> {
        let path = self.resolver.resolve(request.resource_path());
        if !self.is_servable(&path) {
            debug!("{} not found", path.display());
            return Ok(Response::new(StatusCode::NotFound));
        }

        let content_type = content_type::for_file_name(request.resource_path());
        if !send_body {
            let mut response = Response::new(StatusCode::Ok);
            response.set_header(CONTENT_TYPE, content_type);
            return Ok(response);
        }

        let bytes = self.fs.read_bytes(&path).map_err(|source| BuildError::Io {
            path: path.clone(),
            source,
        })?;
        let body = if request.is_image() {
            bytes
        } else {
            String::from_utf8_lossy(&bytes).into_owned().into_bytes()
        };

        Ok(Response::new(StatusCode::Ok).with_content(content_type, body))
    }

    fn render_template(&self, request: &HttpRequest) -> Result<Response, BuildError> {
        let path = self.resolver.resolve(PARAMS_TEMPLATE);
        if !self.is_servable(&path) {
            return Err(BuildError::MissingTemplate(path));
        }

        let lines = self.fs.read_lines(&path).map_err(|source| BuildError::Io {
            path: path.clone(),
            source,
        })?;
        let html = render_params(&lines, request.query_parameters());

        Ok(Response::new(StatusCode::Ok).with_content(content_type::HTML, html.into_bytes()))
    }

    fn trace(request: &HttpRequest) -> Response {
        Response::new(StatusCode::Ok)
            .with_content(content_type::MESSAGE_HTTP, request.raw_text().to_vec())
    }

    fn is_servable(&self, path: &Path) -> bool {
        self.fs.exists(path) && self.fs.is_regular_file(path)
    }
}

#[cfg(test)]
mod tests {
    use parser::RequestParser;

    use super::*;
    use crate::{filesystem::memory::MemoryFileSystem, response::CONTENT_LENGTH};

    const TEMPLATE: &str = "<html>\n<body>\n<h1>Submitted</h1>\n</body>\n</html>\n";

    fn builder(fs: MemoryFileSystem) -> ResponseBuilder {
        ResponseBuilder::new(PathResolver::with_home("/www/", None), Arc::new(fs))
    }

    fn site() -> MemoryFileSystem {
        MemoryFileSystem::default()
            .with_file("/www/index.html", "<h1>home</h1>")
            .with_file("/www/photo.jpg", vec![0xff, 0xd8, 0x00, 0x80, 0xfe])
            .with_file("/www/notes.txt", "plain")
            .with_file("/www/favicon.ico", vec![1, 2, 3])
            .with_file("/www/params_info.html", TEMPLATE)
            .with_dir("/www/docs")
    }

    fn respond(builder: &ResponseBuilder, raw: &str) -> Response {
        let request = RequestParser::new("index.html").parse(raw.as_bytes());
        builder.build(Some(&request))
    }

    #[test]
    fn test_absent_request_is_internal_error() {
        let response = builder(site()).build(None);

        assert_eq!(response.status(), StatusCode::InternalServerError);
        assert!(response.headers().is_empty());
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_timeout_sentinel() {
        let response = builder(site()).build(Some(&Request::TimedOut));

        assert_eq!(response.to_bytes(), b"HTTP/1.1 408 Request Timeout\r\n\r\n");
    }

    #[test]
    fn test_error_statuses_have_no_body() {
        let builder = builder(site());

        for (raw, status) in [
            ("GET /\r\n\r\n", StatusCode::BadRequest),
            ("FOO / HTTP/1.1\r\n\r\n", StatusCode::NotImplemented),
            ("GET /missing.html HTTP/1.1\r\n\r\n", StatusCode::NotFound),
            ("HEAD /missing.html HTTP/1.1\r\n\r\n", StatusCode::NotFound),
            ("POST /missing.html HTTP/1.1\r\n\r\n", StatusCode::NotFound),
        ] {
            let response = respond(&builder, raw);
            assert_eq!(response.status(), status, "{raw}");
            assert!(response.headers().is_empty(), "{raw}");
            assert!(response.body().is_empty(), "{raw}");
        }
    }

    #[test]
    fn test_get_default_page() {
        let response = respond(&builder(site()), "GET / HTTP/1.1\r\n\r\n");

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.header(CONTENT_TYPE), Some("text/html"));
        assert_eq!(response.header(CONTENT_LENGTH), Some("13"));
        assert_eq!(response.body(), b"<h1>home</h1>");
    }

    #[test]
    fn test_get_image_is_byte_identical() {
        let response = respond(&builder(site()), "GET /photo.jpg HTTP/1.1\r\n\r\n");

        assert_eq!(response.header(CONTENT_TYPE), Some("image"));
        assert_eq!(response.header(CONTENT_LENGTH), Some("5"));
        assert_eq!(response.body(), &[0xff, 0xd8, 0x00, 0x80, 0xfe]);
    }

    #[test]
    fn test_get_other_types() {
        let builder = builder(site());

        let response = respond(&builder, "GET /notes.txt HTTP/1.1\r\n\r\n");
        assert_eq!(response.header(CONTENT_TYPE), Some("application/octet-stream"));

        let response = respond(&builder, "GET /favicon.ico HTTP/1.1\r\n\r\n");
        assert_eq!(response.header(CONTENT_TYPE), Some("icon"));
        assert_eq!(response.header(CONTENT_LENGTH), Some("3"));
    }

    #[test]
    fn test_directory_is_not_found() {
        let response = respond(&builder(site()), "GET /docs HTTP/1.1\r\n\r\n");
        assert_eq!(response.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_head_omits_body() {
        let response = respond(&builder(site()), "HEAD /index.html HTTP/1.1\r\n\r\n");

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.header(CONTENT_TYPE), Some("text/html"));
        assert_eq!(response.header(CONTENT_LENGTH), None);
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_post_serves_static_file() {
        let response = respond(&builder(site()), "POST /index.html HTTP/1.1\r\n\r\n");

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), b"<h1>home</h1>");
    }

    #[test]
    fn test_post_to_template_renders_parameters() {
        let body = "name=x";
        let raw = format!(
            "POST /params_info.html HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        );
        let response = respond(&builder(site()), &raw);

        let expected = "<html>\n<body>\n<h1>Submitted</h1>\n\
                        <table border=\"1\">\n<tr>\n<th>Parameter Name</th>\n<th>Parameter Value</th>\n</tr>\n\
                        <tr><td>name</td><td>x</td></tr>\n</table>\n\
                        </body>\n</html>\n";
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.header(CONTENT_TYPE), Some("text/html"));
        assert_eq!(
            response.header(CONTENT_LENGTH),
            Some(expected.len().to_string().as_str())
        );
        assert_eq!(std::str::from_utf8(response.body()).unwrap(), expected);
    }

    #[test]
    fn test_missing_template_is_internal_error() {
        let fs = MemoryFileSystem::default().with_file("/www/index.html", "x");
        let response = respond(&builder(fs), "POST /params_info.html?a=1 HTTP/1.1\r\n\r\n");

        assert_eq!(response.status(), StatusCode::InternalServerError);
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_read_failure_is_internal_error() {
        let fs = MemoryFileSystem::default().with_unreadable("/www/locked.html");
        let response = respond(&builder(fs), "GET /locked.html HTTP/1.1\r\n\r\n");

        assert_eq!(response.status(), StatusCode::InternalServerError);
    }

    #[test]
    fn test_trace_echoes_request() {
        let raw = "TRACE / HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let response = respond(&builder(site()), raw);

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.header(CONTENT_TYPE), Some("message/http"));
        assert_eq!(
            response.header(CONTENT_LENGTH),
            Some(raw.len().to_string().as_str())
        );
        assert_eq!(response.body(), raw.as_bytes());
    }

    #[test]
    fn test_invalid_utf8_text_is_replaced() {
        let fs = MemoryFileSystem::default().with_file("/www/bad.html", vec![b'a', 0xff]);
        let response = respond(&builder(fs), "GET /bad.html HTTP/1.1\r\n\r\n");

        assert_eq!(std::str::from_utf8(response.body()).unwrap(), "a\u{fffd}");
    }
}
