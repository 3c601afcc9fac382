use thiserror::Error;

/// Errors raised while building or exporting a missingness figure.
///
/// Every variant surfaces synchronously to the caller; nothing is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input, detected before any layout or rendering work.
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("{0} is not implemented")]
    Unsupported(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    /// Failure reported by the drawing backend.
    #[error("rendering failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Shorthand for `Err(Error::Validation(..))` with `format!` arguments.
macro_rules! invalid {
    ($($arg:tt)*) => {
        Err($crate::error::Error::Validation(format!($($arg)*)))
    };
}

pub(crate) use invalid;
