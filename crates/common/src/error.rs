use thiserror::Error;

/// Validation errors from the shared model. The message text is part of the
/// protocol surface; callers forward it verbatim in failure responses.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Message(String),
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
