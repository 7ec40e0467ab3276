//! Module: a bundle of handler and validator registrations applied to a container.

use std::any::{type_name, TypeId};
use std::collections::HashSet;
use std::sync::Arc;

use courier_core::{
    Command, CommandHandler, Container, ContainerError, Request, RequestHandler, Validator,
};
use tracing::{debug, warn};

/// Registers its handlers and validators into a container. See `Application::register`.
pub trait Module {
    fn register_into(&mut self, container: &mut Container) -> Result<(), ContainerError>;
}

type Apply = Box<dyn FnOnce(&mut Container) -> Result<(), ContainerError> + Send>;

/// Single-slot key claimed by a registration: its `TypeId` and a name for errors.
type Key = (TypeId, &'static str);

struct Registration {
    key: Option<Key>,
    apply: Apply,
}

fn key<T: 'static>() -> Option<Key> {
    Some((TypeId::of::<T>(), type_name::<T>()))
}

/// Module assembled with a builder: `.command()`, `.request()`, `.validator()`, then
/// `app.register(&mut module)`.
///
/// Registration is all or nothing: if any handler or instance would collide with one already
/// in the container (or with another in the same module), nothing is applied and the module
/// keeps its registrations.
pub struct HandlerModule {
    pub(crate) name: String,
    registrations: Vec<Registration>,
}

impl HandlerModule {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            registrations: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Bind the handler for command `C`.
    pub fn command<C, H>(mut self, handler: H) -> Self
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        self.push(key::<Arc<dyn CommandHandler<C>>>(), move |c| {
            c.add_command_handler::<C, H>(handler)
        })
    }

    /// Bind a handler for command `C` built per dispatch; the factory may resolve dependencies.
    pub fn command_factory<C, H, F>(mut self, f: F) -> Self
    where
        C: Command,
        H: CommandHandler<C> + 'static,
        F: Fn(&Container) -> H + Send + Sync + 'static,
    {
        self.push(key::<Arc<dyn CommandHandler<C>>>(), move |c| {
            c.add_command_handler_factory::<C, H, F>(f)
        })
    }

    /// Bind the handler for request `R`.
    pub fn request<R, H>(mut self, handler: H) -> Self
    where
        R: Request,
        H: RequestHandler<R> + 'static,
    {
        self.push(key::<Arc<dyn RequestHandler<R>>>(), move |c| {
            c.add_request_handler::<R, H>(handler)
        })
    }

    pub fn request_factory<R, H, F>(mut self, f: F) -> Self
    where
        R: Request,
        H: RequestHandler<R> + 'static,
        F: Fn(&Container) -> H + Send + Sync + 'static,
    {
        self.push(key::<Arc<dyn RequestHandler<R>>>(), move |c| {
            c.add_request_handler_factory::<R, H, F>(f)
        })
    }

    /// Add a validator for `T`. Validators of one module run in the order they were added.
    pub fn validator<T, V>(mut self, validator: V) -> Self
    where
        T: Send + Sync + 'static,
        V: Validator<T> + 'static,
    {
        self.push(None, move |c| {
            c.add_validator::<T, V>(validator);
            Ok(())
        })
    }

    /// Register a shared dependency (e.g. a store) that factories resolve.
    pub fn instance<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.push(key::<T>(), move |c| c.register_instance(value))
    }

    fn push<F>(mut self, key: Option<Key>, apply: F) -> Self
    where
        F: FnOnce(&mut Container) -> Result<(), ContainerError> + Send + 'static,
    {
        self.registrations.push(Registration {
            key,
            apply: Box::new(apply),
        });
        self
    }

    /// First single-slot key that is already taken in `container` or claimed twice here.
    fn conflict(&self, container: &Container) -> Option<&'static str> {
        let mut seen = HashSet::new();
        self.registrations
            .iter()
            .filter_map(|r| r.key)
            .find(|&(id, _)| container.contains_id(id) || !seen.insert(id))
            .map(|(_, name)| name)
    }
}

impl Module for HandlerModule {
    fn register_into(&mut self, container: &mut Container) -> Result<(), ContainerError> {
        if let Some(name) = self.conflict(container) {
            warn!(module = %self.name, registration = name, "module conflicts with container");
            return Err(ContainerError::AlreadyRegistered(name));
        }
        debug!(module = %self.name, registrations = self.registrations.len(), "registering module");
        for registration in self.registrations.drain(..) {
            (registration.apply)(container)?;
        }
        Ok(())
    }
}
