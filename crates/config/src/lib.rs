mod error;
mod test_config;

pub use error::ConfigError;
pub use test_config::{config, TestConfig};
