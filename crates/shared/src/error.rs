use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("unsupported form method '{0}'")]
    UnsupportedMethod(String),
    #[error("unknown field kind '{0}'")]
    UnknownFieldKind(String),
    #[error("invalid pattern for field '{field}': {reason}")]
    InvalidPattern { field: String, reason: String },
}
