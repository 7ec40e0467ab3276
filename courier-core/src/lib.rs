//! Courier core: typed requests, validation fan-out, handler resolution, mediator.

pub mod container;
pub mod handler;
pub mod mediator;
pub mod options;
pub mod request;
pub mod validation;

pub use container::{Container, ContainerError, Resolver};
pub use handler::{BoxError, CommandHandler, RequestHandler, Validator};
pub use mediator::Mediator;
pub use options::{MediatorOptions, ValidationStrategy};
pub use request::{Command, Request};
pub use tokio_util::sync::CancellationToken;
pub use validation::{ValidationError, ValidationResult};

use thiserror::Error;

/// Why a dispatch did not produce a result.
#[derive(Error, Debug)]
pub enum MediatorError {
    /// The request was absent or at least one validator reported errors. Carries every error.
    #[error("validation failed: {0}")]
    Validation(ValidationResult),
    /// Nothing is registered to handle the request type.
    #[error("no handler registered for {0}")]
    HandlerNotFound(&'static str),
    /// A validator failed to run; the original error is passed through.
    #[error(transparent)]
    Validator(BoxError),
    /// The handler itself failed; the original error is passed through.
    #[error(transparent)]
    Handler(BoxError),
}

impl MediatorError {
    /// The aggregated validation outcome, if this is a validation failure.
    pub fn validation_result(&self) -> Option<&ValidationResult> {
        match self {
            MediatorError::Validation(result) => Some(result),
            _ => None,
        }
    }

    pub fn is_handler_not_found(&self) -> bool {
        matches!(self, MediatorError::HandlerNotFound(_))
    }

    /// Take back the handler's own error, e.g. to downcast it.
    pub fn into_handler_error(self) -> Option<BoxError> {
        match self {
            MediatorError::Handler(e) => Some(e),
            _ => None,
        }
    }

    /// Take back a validator's own error.
    pub fn into_validator_error(self) -> Option<BoxError> {
        match self {
            MediatorError::Validator(e) => Some(e),
            _ => None,
        }
    }
}
