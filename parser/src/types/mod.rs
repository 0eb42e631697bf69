mod method;
mod request;

pub use method::{Method, MethodToken};
pub use request::{
    CONTENT_LENGTH, CONTENT_TYPE, Classification, HttpRequest, REFERER, Request, USER_AGENT,
};
