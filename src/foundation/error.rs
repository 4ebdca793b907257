/// Convenience result type used across maprender.
pub type MapRenderResult<T> = Result<T, MapRenderError>;

/// Top-level error taxonomy used by renderer APIs.
#[derive(thiserror::Error, Debug)]
pub enum MapRenderError {
    /// Invalid user-provided viewport, scene or option data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A required input to a helper routine was missing or empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A geometry kind was handed to a routine that cannot process it.
    #[error("unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    /// Errors while drawing a frame (surface allocation, bitmap preparation).
    #[error("render error: {0}")]
    Render(String),

    /// Errors while encoding a rendered surface into an image format.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing scene data.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MapRenderError {
    /// Build a [`MapRenderError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MapRenderError::InvalidArgument`] value.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Build a [`MapRenderError::UnsupportedGeometry`] value.
    pub fn unsupported_geometry(kind: impl Into<String>) -> Self {
        Self::UnsupportedGeometry(kind.into())
    }

    /// Build a [`MapRenderError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`MapRenderError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`MapRenderError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
