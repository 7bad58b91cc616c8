//! Process-wide logging for apikit services

pub mod logging;

pub use logging::{
    LogFormat, LoggingConfig, init_logging, init_logging_from_env, logging_settings, max_field_len,
};
