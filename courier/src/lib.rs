//! Courier for Rust: mediator facade. Register modules on an `Application`, then dispatch
//! commands and requests through the resulting `Mediator`.

pub mod core;
pub mod scaffold;

pub use async_trait::async_trait;
pub use crate::core::{Application, HandlerModule, Module};
pub use courier_core::{
    BoxError, CancellationToken, Command, CommandHandler, Container, ContainerError, Mediator,
    MediatorError, MediatorOptions, Request, RequestHandler, Resolver, ValidationError,
    ValidationResult, ValidationStrategy, Validator,
};
pub use courier_macros::{Command, Request};
