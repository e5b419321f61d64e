/// Convenience result type used across texop.
pub type TexOpResult<T> = Result<T, TexOpError>;

/// Host-side error taxonomy.
///
/// Nothing here crosses the module boundary: module callbacks return plain values, and contract
/// violations by a module are reported through the node's status strings instead.
#[derive(thiserror::Error, Debug)]
pub enum TexOpError {
    /// Invalid host-provided configuration or API arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// The requested output could not be turned into any usable format.
    #[error("negotiation error: {0}")]
    Negotiation(String),

    /// The module could not be loaded or instantiated.
    #[error("setup error: {0}")]
    Setup(String),

    /// The node is disabled or destroyed and can no longer cook.
    #[error("node disabled: {0}")]
    Disabled(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TexOpError {
    /// Build a [`TexOpError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TexOpError::Negotiation`] value.
    pub fn negotiation(msg: impl Into<String>) -> Self {
        Self::Negotiation(msg.into())
    }

    /// Build a [`TexOpError::Setup`] value.
    pub fn setup(msg: impl Into<String>) -> Self {
        Self::Setup(msg.into())
    }

    /// Build a [`TexOpError::Disabled`] value.
    pub fn disabled(msg: impl Into<String>) -> Self {
        Self::Disabled(msg.into())
    }

    /// Build a [`TexOpError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
