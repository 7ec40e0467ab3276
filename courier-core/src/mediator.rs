//! Mediator: validate a request against every bound validator, then hand it to its
//! single handler.

use std::any::type_name;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use futures::future::join_all;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::container::{Container, Resolver};
use crate::handler::{BoxError, CommandHandler, RequestHandler, Validator};
use crate::options::{MediatorOptions, ValidationStrategy};
use crate::request::{Command, Request};
use crate::validation::ValidationResult;
use crate::MediatorError;

/// Routes requests through validation to their handler.
///
/// Holds only the resolver and options; cloning is cheap and a single instance can be
/// shared by any number of concurrent callers.
pub struct Mediator<Rs: Resolver = Container> {
    resolver: Arc<Rs>,
    options: MediatorOptions,
}

impl<Rs: Resolver> Mediator<Rs> {
    pub fn new(resolver: Rs) -> Self {
        Self::from_arc(Arc::new(resolver))
    }

    pub fn from_arc(resolver: Arc<Rs>) -> Self {
        Self {
            resolver,
            options: MediatorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: MediatorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &MediatorOptions {
        &self.options
    }

    pub fn resolver(&self) -> &Rs {
        &self.resolver
    }

    /// Send a command. Fails with `Validation` before the handler is looked up when the
    /// command is absent or rejected.
    ///
    /// An absent command needs its type named: `mediator.send_command::<CreateOrder>(None, &cancel)`.
    pub async fn send_command<C: Command>(
        &self,
        command: impl Into<Option<C>>,
        cancel: &CancellationToken,
    ) -> Result<(), MediatorError> {
        let command = self.admit(command.into(), cancel).await?;
        let handler = self
            .resolver
            .resolve_one::<Arc<dyn CommandHandler<C>>>()
            .ok_or_else(handler_not_found::<C>)?;
        debug!(request = type_name::<C>(), "dispatching command");
        handler
            .handle(command, cancel)
            .await
            .map_err(MediatorError::Handler)
    }

    /// Send a request and return its handler's response.
    ///
    /// An absent request needs its type named: `mediator.send::<GetOrder>(None, &cancel)`.
    pub async fn send<R: Request>(
        &self,
        request: impl Into<Option<R>>,
        cancel: &CancellationToken,
    ) -> Result<R::Response, MediatorError> {
        let request = self.admit(request.into(), cancel).await?;
        let handler = self
            .resolver
            .resolve_one::<Arc<dyn RequestHandler<R>>>()
            .ok_or_else(handler_not_found::<R>)?;
        debug!(request = type_name::<R>(), "dispatching request");
        handler
            .handle(request, cancel)
            .await
            .map_err(MediatorError::Handler)
    }

    /// Run the validators bound to `T` without invoking any handler.
    ///
    /// `Err` carries the first validator fault in resolution order, unchanged.
    pub async fn validate<'a, T>(
        &self,
        request: impl Into<Option<&'a T>>,
        cancel: &CancellationToken,
    ) -> Result<ValidationResult, BoxError>
    where
        T: Send + Sync + 'static,
    {
        match request.into() {
            Some(request) => self.run_validators(request, cancel).await,
            None => Ok(ValidationResult::null_request()),
        }
    }

    async fn admit<T>(&self, request: Option<T>, cancel: &CancellationToken) -> Result<T, MediatorError>
    where
        T: Send + Sync + 'static,
    {
        let Some(request) = request else {
            warn!(request = type_name::<T>(), "rejected absent request");
            return Err(MediatorError::Validation(ValidationResult::null_request()));
        };
        let result = self
            .run_validators(&request, cancel)
            .await
            .map_err(MediatorError::Validator)?;
        if !result.is_valid() {
            warn!(
                request = type_name::<T>(),
                errors = result.len(),
                "request failed validation"
            );
            return Err(MediatorError::Validation(result));
        }
        Ok(request)
    }

    /// Every validator runs to completion even when a sibling fails or panics. Afterwards the
    /// first fault in resolution order wins: a panic is resumed, an error is returned.
    async fn run_validators<T>(
        &self,
        request: &T,
        cancel: &CancellationToken,
    ) -> Result<ValidationResult, BoxError>
    where
        T: Send + Sync + 'static,
    {
        let validators = self.resolver.resolve_all::<Arc<dyn Validator<T>>>();
        if validators.is_empty() {
            return Ok(ValidationResult::success());
        }
        debug!(
            request = type_name::<T>(),
            validators = validators.len(),
            strategy = ?self.options.validation,
            "running validators"
        );
        let outcomes = match self.options.validation {
            ValidationStrategy::Concurrent => {
                join_all(validators.iter().map(|v| guarded(v.as_ref(), request, cancel))).await
            }
            ValidationStrategy::Sequential => {
                let mut outcomes = Vec::with_capacity(validators.len());
                for v in &validators {
                    outcomes.push(guarded(v.as_ref(), request, cancel).await);
                }
                outcomes
            }
        };

        let mut results = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                Ok(Ok(result)) => results.push(result),
                Ok(Err(fault)) => {
                    warn!(request = type_name::<T>(), error = %fault, "validator failed");
                    return Err(fault);
                }
                Err(payload) => {
                    warn!(request = type_name::<T>(), "validator panicked");
                    panic::resume_unwind(payload);
                }
            }
        }
        let result: ValidationResult = results.into_iter().collect();
        debug!(
            request = type_name::<T>(),
            valid = result.is_valid(),
            errors = result.len(),
            "validation finished"
        );
        Ok(result)
    }
}

impl<Rs: Resolver> Clone for Mediator<Rs> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            options: self.options.clone(),
        }
    }
}

/// Runs one validator, turning a panic into a value so siblings keep running.
fn guarded<'a, T>(
    validator: &'a dyn Validator<T>,
    request: &'a T,
    cancel: &'a CancellationToken,
) -> impl Future<Output = thread::Result<Result<ValidationResult, BoxError>>> + Send + 'a
where
    T: Send + Sync + 'static,
{
    AssertUnwindSafe(validator.validate(request, cancel)).catch_unwind()
}

fn handler_not_found<T>() -> MediatorError {
    let name = type_name::<T>();
    warn!(request = name, "no handler registered");
    MediatorError::HandlerNotFound(name)
}
