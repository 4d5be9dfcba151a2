use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhysicsError {
    #[error("unknown variant '{name}' (valid modes: {})", .valid.join(", "))]
    UnknownVariant {
        name: String,
        valid: Vec<&'static str>,
    },
    #[error("unknown effect group '{name}' (valid groups: {})", .valid.join(", "))]
    UnknownGroup {
        name: String,
        valid: Vec<&'static str>,
    },
    #[error("frame buffer of {len} bytes does not match a {width}x{height} RGB frame")]
    FrameSize { width: usize, height: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("invalid value for '{key}': {message}")]
    Invalid { key: String, message: String },
}
