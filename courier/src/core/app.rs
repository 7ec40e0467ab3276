//! Application: collects modules into a container and builds the mediator from it.

use courier_core::{Container, ContainerError, Mediator, MediatorOptions};

use super::Module;

/// Registration front door. Register modules, then call `into_mediator`.
pub struct Application {
    pub(crate) container: Container,
    pub(crate) options: MediatorOptions,
}

impl Application {
    pub fn new() -> Self {
        Self {
            container: Container::new(),
            options: MediatorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: MediatorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// For registrations that do not fit a module.
    pub fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }

    /// Register a module. A handler already bound by an earlier module is a configuration error.
    pub fn register(&mut self, module: &mut dyn Module) -> Result<(), ContainerError> {
        module.register_into(&mut self.container)
    }

    pub fn into_mediator(self) -> Mediator {
        Mediator::new(self.container).with_options(self.options)
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}
