use std::time::Duration;

use parser::{Request, RequestParser};
use shared::ServerConfig;

use crate::{builder::ResponseBuilder, encoding::apply_transfer_encoding, response::Response};

/// Everything a connection needs to answer requests. Shared read-only by all
/// connections.
#[derive(Clone)]
pub struct HttpService {
    parser: RequestParser,
    builder: ResponseBuilder,
    pub read_timeout: Duration,
    pub body_timeout: Duration,
    pub write_timeout: Duration,
}

impl HttpService {
    pub fn new(parser: RequestParser, builder: ResponseBuilder, config: &ServerConfig) -> Self {
        Self {
            parser,
            builder,
            read_timeout: config.read_timeout,
            body_timeout: config.body_timeout,
            write_timeout: config.write_timeout,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            RequestParser::new(config.default_page.as_str()),
            ResponseBuilder::with_local_root(&config.root),
            config,
        )
    }

    pub fn parse(&self, raw: &[u8]) -> Request {
        self.parser.parse(raw)
    }

    /// Builds and encodes the response. `None` means no request could be
    /// produced.
    pub fn respond(&self, request: Option<&Request>) -> Response {
        apply_transfer_encoding(self.builder.build(request), request)
    }
}
