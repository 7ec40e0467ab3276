//! Handler and validator contracts, resolved from the container per call.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::request::{Command, Request};
use crate::validation::ValidationResult;

/// Error raised by handler or validator logic. Carried to the caller unchanged.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Handler for command `C`. Register with `Container::add_command_handler`.
#[async_trait]
pub trait CommandHandler<C>: Send + Sync
where
    C: Command,
{
    async fn handle(&self, command: C, cancel: &CancellationToken) -> Result<(), BoxError>;
}

/// Handler for request `R`. Register with `Container::add_request_handler`.
#[async_trait]
pub trait RequestHandler<R>: Send + Sync
where
    R: Request,
{
    async fn handle(&self, request: R, cancel: &CancellationToken) -> Result<R::Response, BoxError>;
}

/// Independent check against a request of type `T`. All validators bound to `T` run.
///
/// Rejections go in the `ValidationResult`; `Err` is for faults (e.g. an unreachable
/// lookup service) and reaches the caller unchanged.
#[async_trait]
pub trait Validator<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    async fn validate(
        &self,
        request: &T,
        cancel: &CancellationToken,
    ) -> Result<ValidationResult, BoxError>;
}
