use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid month token {0:?}: expected YYYY-MM")]
    InvalidMonth(String),

    #[error("invalid share type {0:?}: expected FULL or HALF")]
    InvalidShareType(String),

    #[error("invalid identifier: {0:?}")]
    InvalidId(String),

    #[error("invalid amount {0:?}")]
    InvalidAmount(String),
}
