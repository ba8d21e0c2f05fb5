//! Logging configuration

/// Number of entries kept in the in-memory ring buffer
pub const LOG_BUFFER_ENTRIES: usize = 64;

/// Maximum length of a single log message
pub const MAX_LOG_MESSAGE_LENGTH: usize = 256;

/// Default log level
pub const DEFAULT_LOG_LEVEL: super::level::LogLevel = super::level::LogLevel::Info;

/// Default console level
pub const DEFAULT_CONSOLE_LEVEL: super::level::LogLevel = super::level::LogLevel::Warning;
