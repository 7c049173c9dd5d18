use sitetree_core::TreeError;
use sitetree_runtime::{ConfigError, EditorError, GatewayError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Tree(#[from] TreeError),

    #[error("store error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("{0}")]
    Editor(#[from] EditorError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl CliError {
    /// Process exit code: `2` for refused tree operations, `3` for storage
    /// failures, `4` for bad configuration, `64` for usage errors.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Tree(_) | Self::Editor(EditorError::Rejected(_)) => 2,
            Self::Io(_)
            | Self::Json(_)
            | Self::Gateway(_)
            | Self::Editor(EditorError::Persist(_)) => 3,
            Self::Config(_) => 4,
            Self::InvalidArgument { .. } => 64,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CliError;
    use sitetree_core::{PageId, TreeError};
    use sitetree_runtime::{EditorError, GatewayError};

    #[test]
    fn exit_codes_follow_error_kind() {
        assert_eq!(CliError::invalid("bad").exit_code(), 64);
        assert_eq!(
            CliError::invalid("bad").to_string(),
            "invalid argument: bad"
        );
        assert_eq!(
            CliError::from(TreeError::UnknownPage(PageId::new("x"))).exit_code(),
            2
        );
        let rolled_back = EditorError::Persist(GatewayError::Rejected("no".into()));
        assert_eq!(CliError::from(rolled_back).exit_code(), 3);
    }
}
