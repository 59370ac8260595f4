/// Errors raised by the grid engine.
///
/// Configuration and data-shape errors are wiring mistakes: the controller refuses to accept the
/// headers/rows and the view renders the message instead of the grid. Edit validation failures
/// are recovered locally and only reported through a [`crate::edit::Notifier`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("duplicate header id `{0}`")]
    DuplicateHeader(String),

    #[error("a `check` header is declared but row selection is not enabled")]
    SelectionNotWired,

    #[error("row {index} is missing keys required by the headers: {}", .keys.join(", "))]
    MissingKeys { index: u64, keys: Vec<String> },

    #[error("no row with index {0}")]
    UnknownRow(u64),

    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    #[error("invalid value for `{key}`: {message}")]
    InvalidEditValue { key: String, message: String },
}

pub type Result<T, E = GridError> = std::result::Result<T, E>;
