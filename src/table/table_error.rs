/// Errors returned by [`LoggerTable`](crate::table::LoggerTable) operations.
///
/// All of them are caller input errors; none are retried or logged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// An argument, or an element of one, is not of the expected kind.
    #[error("{actual} does not match {expected}")]
    TypeValidation {
        actual: &'static str,
        expected: &'static str,
    },

    /// Loggers and levels still differ in length after broadcasting.
    #[error("loggers and levels must be the same length (got {loggers} loggers, {levels} levels)")]
    LengthMismatch { loggers: usize, levels: usize },

    /// Removal named a logger that is not registered.
    #[error("no logger registered under {0:?}")]
    KeyNotFound(String),
}
