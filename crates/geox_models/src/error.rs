//! Error types for model configuration and compute.

use geox_common::DomainKind;
use geox_params::ParamError;
use thiserror::Error;

/// Errors raised while configuring or computing a domain model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A parameter could not be read or written.
    #[error(transparent)]
    Param(#[from] ParamError),

    /// The selected option has no implementation.
    #[error("{kind}: option '{option}' is not supported")]
    UnsupportedOption {
        /// The model rejecting the option.
        kind: DomainKind,
        /// The option tag.
        option: String,
    },

    /// A required upstream value was never provided.
    #[error("{kind}: input '{name}' has not been provided")]
    MissingInput {
        /// The model missing the input.
        kind: DomainKind,
        /// The input name.
        name: String,
    },

    /// Inputs are individually valid but cannot be computed together.
    #[error("{kind}: invalid input '{name}': {reason}")]
    InvalidInput {
        /// The model rejecting the input.
        kind: DomainKind,
        /// The offending input.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
}
