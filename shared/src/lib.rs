mod config;
mod errors;
mod logging;
mod testing;

pub use config::{
    DEFAULT_BODY_TIMEOUT, DEFAULT_READ_TIMEOUT, DEFAULT_WRITE_TIMEOUT, ServerConfig,
};
pub use errors::{ConfigError, SharedError};
pub use logging::{init_logging, init_test_logging};
pub use testing::TestDocumentRoot;
