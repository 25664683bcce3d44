use thiserror::Error;

use crate::api::types::BeamTypeId;

/// Errors raised by beam operations.
///
/// None of these are fatal to the host: the subsystem logs them and skips the
/// offending visual effect.
#[derive(Error, Debug)]
pub enum BeamError {
    /// The beam type key does not resolve in the loaded definitions.
    #[error("invalid beam type: {0}")]
    InvalidBeamType(BeamTypeId),

    /// No scene is active to attach beams to.
    #[error("invalid scene to use beams in: no render host")]
    NoRenderHost,

    /// The beam atlas cannot be sliced into equal rows.
    #[error("invalid beam image file: height {height} is not divisible into {rows} rows")]
    InvalidAtlasGeometry {
        /// Atlas height in pixels.
        height: u32,
        /// Declared row count.
        rows: u32,
    },

    /// The beam atlas image has not been reported by the host yet.
    #[error("beam image file not loaded: {0}")]
    AtlasNotLoaded(String),

    /// A function action named an operation (or receiver) that does not exist.
    #[error("no such operation: {0}")]
    UnknownOperation(String),

    /// Arguments given to an operation or script command were malformed.
    #[error("invalid argument for {operation}: {reason}")]
    InvalidArgument {
        /// Operation or command name.
        operation: String,
        /// What was wrong with the arguments.
        reason: String,
    },

    /// The effect-definition file failed to parse.
    #[error("failed to parse beam definitions: {0}")]
    Definitions(#[from] serde_json::Error),
}

impl BeamError {
    pub(crate) fn invalid_argument(operation: &str, reason: impl Into<String>) -> Self {
        BeamError::InvalidArgument {
            operation: operation.to_owned(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = BeamError::InvalidBeamType(BeamTypeId(7));
        assert_eq!(err.to_string(), "invalid beam type: 7");

        let err = BeamError::InvalidAtlasGeometry { height: 33, rows: 2 };
        assert!(err.to_string().contains("33"));

        let err = BeamError::invalid_argument("crackle", "missing segment count");
        assert_eq!(err.to_string(), "invalid argument for crackle: missing segment count");
    }

    #[test]
    fn wraps_json_errors() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: BeamError = json_err.into();
        assert!(matches!(err, BeamError::Definitions(_)));
    }
}
