//! Core: Application, Module, HandlerModule.

pub mod app;
pub mod module;

pub use app::Application;
pub use module::{HandlerModule, Module};
