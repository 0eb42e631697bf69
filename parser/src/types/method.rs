use std::{fmt, str::FromStr};

use crate::error::ParseError;

/// Methods the server knows how to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Head,
    Trace,
}

impl Method {
    pub const ALL: [Method; 4] = [Method::Get, Method::Post, Method::Head, Method::Trace];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Head => "HEAD",
            Method::Trace => "TRACE",
        }
    }
}

impl FromStr for Method {
    type Err = ParseError;

    /// Method tokens are case-sensitive, `get` is not `GET`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| ParseError::UnknownMethod(s.to_string()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The first token of the request line as far as it could be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodToken {
    Known(Method),
    Unrecognized(String),
    /// The request line did not have three tokens, so no method was read.
    Absent,
}

impl MethodToken {
    pub fn method(&self) -> Option<Method> {
        match self {
            MethodToken::Known(method) => Some(*method),
            _ => None,
        }
    }
}
