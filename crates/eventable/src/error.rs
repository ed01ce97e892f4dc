use thiserror::Error;

// ---------------------------------------------------------------------------
// HandlerError
// ---------------------------------------------------------------------------

/// A failure reported by a user-supplied callback.
///
/// The dispatcher never produces this itself. It only carries whatever the
/// first failing callback returned back to the caller of `trigger`, untouched.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Build a message-only failure.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Wrap any foreign error, for use with `.map_err(HandlerError::other)`.
    pub fn other(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Other(Box::new(err))
    }
}

pub type Result<T, E = HandlerError> = std::result::Result<T, E>;
