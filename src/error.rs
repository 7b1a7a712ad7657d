use thiserror::Error;

/// Errors raised while building a tank or its inhabitants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AquariumError {
    #[error("tank must have positive dimensions, got {width}x{height}")]
    InvalidBounds { width: i32, height: i32 },
    #[error("species {name:?} is invalid: {reason}")]
    InvalidSpecies { name: String, reason: &'static str },
}
