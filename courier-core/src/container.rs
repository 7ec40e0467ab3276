//! Type-keyed container: register instances or factories, resolve by type.
//! The default `Resolver` the mediator looks handlers and validators up in.

use std::any::{type_name, Any, TypeId};
use std::collections::hash_map::Entry as MapEntry;
use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::handler::{CommandHandler, RequestHandler, Validator};
use crate::request::{Command, Request};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContainerError {
    #[error("no registration for type {0}")]
    NotFound(&'static str),
    #[error("type {0} is already registered")]
    AlreadyRegistered(&'static str),
}

/// Lookup capability consumed by the mediator.
///
/// `resolve_one` yields at most one value per key; `resolve_all` yields every value
/// registered under the key, in registration order.
pub trait Resolver: Send + Sync {
    fn resolve_one<T: Clone + Send + Sync + 'static>(&self) -> Option<T>;

    fn resolve_all<T: Clone + Send + Sync + 'static>(&self) -> Vec<T>;
}

type FactoryFn = Box<dyn Fn(&Container) -> Box<dyn Any + Send + Sync> + Send + Sync>;

enum Slot {
    Instance(Box<dyn Any + Send + Sync>),
    /// Transient: runs on every resolve.
    Factory(FactoryFn),
}

impl Slot {
    fn instance<T: Send + Sync + 'static>(value: T) -> Self {
        Slot::Instance(Box::new(value))
    }

    fn factory<T, F>(f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> T + Send + Sync + 'static,
    {
        Slot::Factory(Box::new(move |c: &Container| {
            Box::new(f(c)) as Box<dyn Any + Send + Sync>
        }))
    }

    fn produce<T: Clone + 'static>(&self, container: &Container) -> Option<T> {
        match self {
            Slot::Instance(boxed) => boxed.downcast_ref::<T>().cloned(),
            Slot::Factory(factory) => factory(container).downcast::<T>().ok().map(|b| *b),
        }
    }
}

/// Container keyed by `TypeId`. Single slots hold at most one registration per type;
/// multi slots hold any number, kept in registration order.
pub struct Container {
    single: HashMap<TypeId, Slot>,
    many: HashMap<TypeId, Vec<Slot>>,
}

impl Container {
    pub fn new() -> Self {
        Self {
            single: HashMap::new(),
            many: HashMap::new(),
        }
    }

    fn insert_single<T: 'static>(&mut self, slot: Slot) -> Result<(), ContainerError> {
        match self.single.entry(TypeId::of::<T>()) {
            MapEntry::Occupied(_) => Err(ContainerError::AlreadyRegistered(type_name::<T>())),
            MapEntry::Vacant(v) => {
                v.insert(slot);
                Ok(())
            }
        }
    }

    fn push_many<T: 'static>(&mut self, slot: Slot) {
        self.many.entry(TypeId::of::<T>()).or_default().push(slot);
    }

    /// Register a ready-made instance. A second registration for `T` is rejected.
    pub fn register_instance<T: Send + Sync + 'static>(&mut self, value: T) -> Result<(), ContainerError> {
        self.insert_single::<T>(Slot::instance(value))
    }

    /// Register a factory that builds a fresh `T` on every resolve. It may resolve its own
    /// dependencies from the container.
    pub fn register_factory<T, F>(&mut self, f: F) -> Result<(), ContainerError>
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> T + Send + Sync + 'static,
    {
        self.insert_single::<T>(Slot::factory(f))
    }

    /// Add an instance to the multi slot for `T`.
    pub fn register_many_instance<T: Send + Sync + 'static>(&mut self, value: T) {
        self.push_many::<T>(Slot::instance(value));
    }

    /// Add a factory to the multi slot for `T`.
    pub fn register_many_factory<T, F>(&mut self, f: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> T + Send + Sync + 'static,
    {
        self.push_many::<T>(Slot::factory(f));
    }

    /// Resolve the single registration for `T`.
    pub fn resolve<T: Clone + Send + Sync + 'static>(&self) -> Result<T, ContainerError> {
        self.resolve_one::<T>()
            .ok_or(ContainerError::NotFound(type_name::<T>()))
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.contains_id(TypeId::of::<T>())
    }

    /// Whether the single slot keyed by `id` is taken.
    pub fn contains_id(&self, id: TypeId) -> bool {
        self.single.contains_key(&id)
    }

    pub fn count_many<T: 'static>(&self) -> usize {
        self.many.get(&TypeId::of::<T>()).map_or(0, Vec::len)
    }

    /// Bind the handler for command `C`. At most one per command type.
    pub fn add_command_handler<C, H>(&mut self, handler: H) -> Result<(), ContainerError>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        let handler: Arc<dyn CommandHandler<C>> = Arc::new(handler);
        self.register_instance(handler)
    }

    pub fn add_command_handler_factory<C, H, F>(&mut self, f: F) -> Result<(), ContainerError>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
        F: Fn(&Container) -> H + Send + Sync + 'static,
    {
        self.register_factory(move |c: &Container| -> Arc<dyn CommandHandler<C>> { Arc::new(f(c)) })
    }

    /// Bind the handler for request `R`. At most one per request type.
    pub fn add_request_handler<R, H>(&mut self, handler: H) -> Result<(), ContainerError>
    where
        R: Request,
        H: RequestHandler<R> + 'static,
    {
        let handler: Arc<dyn RequestHandler<R>> = Arc::new(handler);
        self.register_instance(handler)
    }

    pub fn add_request_handler_factory<R, H, F>(&mut self, f: F) -> Result<(), ContainerError>
    where
        R: Request,
        H: RequestHandler<R> + 'static,
        F: Fn(&Container) -> H + Send + Sync + 'static,
    {
        self.register_factory(move |c: &Container| -> Arc<dyn RequestHandler<R>> { Arc::new(f(c)) })
    }

    /// Add a validator for `T`. Validators run in the order they are added.
    pub fn add_validator<T, V>(&mut self, validator: V)
    where
        T: Send + Sync + 'static,
        V: Validator<T> + 'static,
    {
        let validator: Arc<dyn Validator<T>> = Arc::new(validator);
        self.register_many_instance(validator);
    }

    pub fn add_validator_factory<T, V, F>(&mut self, f: F)
    where
        T: Send + Sync + 'static,
        V: Validator<T> + 'static,
        F: Fn(&Container) -> V + Send + Sync + 'static,
    {
        self.register_many_factory(move |c: &Container| -> Arc<dyn Validator<T>> { Arc::new(f(c)) });
    }
}

impl Resolver for Container {
    fn resolve_one<T: Clone + Send + Sync + 'static>(&self) -> Option<T> {
        self.single
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.produce::<T>(self))
    }

    fn resolve_all<T: Clone + Send + Sync + 'static>(&self) -> Vec<T> {
        self.many
            .get(&TypeId::of::<T>())
            .map(|slots| slots.iter().filter_map(|s| s.produce::<T>(self)).collect())
            .unwrap_or_default()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Settings {
        name: String,
    }

    #[test]
    fn register_and_resolve_instance() {
        let mut c = Container::new();
        c.register_instance(Settings { name: "a".into() }).unwrap();
        assert_eq!(c.resolve::<Settings>().unwrap().name, "a");
        assert!(c.contains::<Settings>());
    }

    #[test]
    fn missing_type_is_not_found() {
        let c = Container::new();
        match c.resolve::<Settings>() {
            Err(ContainerError::NotFound(name)) => assert!(name.ends_with("Settings")),
            other => panic!("expected NotFound, got {:?}", other),
        }
        assert!(c.resolve_one::<Settings>().is_none());
        assert!(c.resolve_all::<Settings>().is_empty());
    }

    #[test]
    fn second_single_registration_is_rejected() {
        let mut c = Container::new();
        c.register_instance(Settings { name: "first".into() }).unwrap();
        let err = c
            .register_factory(|_| Settings { name: "second".into() })
            .unwrap_err();
        assert!(matches!(err, ContainerError::AlreadyRegistered(_)));
        assert_eq!(c.resolve::<Settings>().unwrap().name, "first");
    }

    #[test]
    fn factory_runs_on_every_resolve() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut c = Container::new();
        c.register_factory(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Settings { name: "built".into() }
        })
        .unwrap();
        c.resolve::<Settings>().unwrap();
        c.resolve::<Settings>().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn factory_resolves_dependencies() {
        let mut c = Container::new();
        c.register_instance(String::from("dep")).unwrap();
        c.register_factory(|c: &Container| Settings {
            name: c.resolve::<String>().unwrap_or_default(),
        })
        .unwrap();
        assert_eq!(c.resolve::<Settings>().unwrap().name, "dep");
    }

    #[test]
    fn many_keeps_registration_order() {
        let mut c = Container::new();
        c.register_many_instance(Settings { name: "one".into() });
        c.register_many_factory(|_| Settings { name: "two".into() });
        c.register_many_instance(Settings { name: "three".into() });
        let names: Vec<_> = c.resolve_all::<Settings>().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["one", "two", "three"]);
        assert_eq!(c.count_many::<Settings>(), 3);
        assert!(!c.contains::<Settings>());
    }
}
