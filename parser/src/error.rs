use thiserror::Error;

/// Internal failures while splitting a request. Never returned by
/// [`crate::RequestParser::parse`]; they are folded into an invalid request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Request does not fit the line grammar: {0}")]
    Unreadable(String),

    #[error("Unknown method token '{0}'")]
    UnknownMethod(String),

    #[error("Grammar produced {0} outside a request line, header or body")]
    UnexpectedRule(String),

    #[error("Request is missing its {0}")]
    MissingPart(&'static str),
}

pub type Result<T> = std::result::Result<T, ParseError>;
