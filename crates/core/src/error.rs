use thiserror::Error;

/// Errors that can occur in the reversi engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReversiError {
    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("State mismatch: {0}")]
    StateMismatch(String),

    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid board size {0}: must be even and between 4 and 10")]
    InvalidBoardSize(usize),

    #[error("Invalid board diagram: {0}")]
    InvalidDiagram(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience Result type for engine operations
pub type Result<T> = std::result::Result<T, ReversiError>;
