//! Error types for hierarchy construction and tree layout.

use thiserror::Error;

/// Errors raised by [`Hierarchy::build`](crate::hierarchy::Hierarchy::build)
/// and [`TreeLayout::layout`](crate::layout::TreeLayout::layout).
///
/// Both operations fail fast, before any output is produced. There is no
/// partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The root data or the hierarchy handed to the layout engine does not
    /// satisfy the documented preconditions.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl LayoutError {
    /// Create an `InvalidInput` error with the given message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
