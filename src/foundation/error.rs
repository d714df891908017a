/// Convenience result type used across inkframe.
pub type InkframeResult<T> = Result<T, InkframeError>;

/// Top-level error taxonomy used by engine APIs.
///
/// The render path never surfaces these to the host: failed decodes, zero-sized geometry and stale
/// completions all degrade to "nothing drawn". Errors only come out of construction, configuration
/// and blob encoding on commit.
#[derive(thiserror::Error, Debug)]
pub enum InkframeError {
    /// Invalid host-provided data (geometry, tool settings, script input).
    #[error("validation error: {0}")]
    Validation(String),

    /// A blob could not be decoded into a raster.
    #[error("decode error: {0}")]
    Decode(String),

    /// A raster could not be encoded into a blob.
    #[error("encode error: {0}")]
    Encode(String),

    /// Invalid or unreadable engine configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InkframeError {
    /// Build a [`InkframeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`InkframeError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`InkframeError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`InkframeError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
