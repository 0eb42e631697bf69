mod request;

pub use request::RequestParser;
