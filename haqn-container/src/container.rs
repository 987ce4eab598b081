//! # The Container — heart of Haqn
//!
//! A registry of abstract types (interfaces and structs) bound to concrete
//! producers (instances and factories), plus field injection on top.
//!
//! # Architecture
//! ```text
//! ContainerBuilder ──build()──> Container ──bind()──> Registry (TypeKey → Binding)
//!                                   │
//!                     resolve() / inject()
//!                                   │
//!                                   ▼
//!                        TypeTable (interfaces, structs)
//! ```
//!
//! # Examples
//! ```rust
//! use haqn_container::prelude::*;
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, msg: &str) -> String;
//! }
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, msg: &str) -> String { format!("[console] {msg}") }
//! }
//!
//! let mut container = Container::new();
//! container.implement::<dyn Logger, ConsoleLogger>(|l: Arc<ConsoleLogger>| -> Arc<dyn Logger> { l });
//!
//! container
//!     .bind(&interface::<dyn Logger>(), Arc::new(ConsoleLogger))
//!     .expect("ConsoleLogger implements Logger");
//!
//! let logger: Arc<dyn Logger> = container.make().expect("Logger is bound");
//! assert_eq!(logger.log("hi"), "[console] hi");
//! ```

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use haqn_support::rendering::shorten_type_name;
use tracing::{debug, instrument, trace};

use crate::descriptor::{Classified, Interface, Kind, is_dynamic};
use crate::error::{HaqnError, Result};
use crate::factory::{Arg, Factory};
use crate::inject::Injectable;
use crate::key::TypeKey;
use crate::provider::Provider;
use crate::registry::{Binding, Registry};
use crate::types::TypeTable;

/// A shared, type-erased value.
pub type Value = Arc<dyn Any + Send + Sync>;

// ═══════════════════════════════════════════
// Resolved / Concrete
// ═══════════════════════════════════════════

/// A value produced by [`Container::resolve`].
///
/// Instances bound to an interface `I` or a struct `S` resolve to a value
/// holding `Arc<I>` / `Arc<S>`, read back with [`get`](Self::get). Factory
/// results hold whatever the factory returned, read with
/// [`downcast_ref`](Self::downcast_ref).
#[derive(Clone)]
pub struct Resolved {
    value: Value,
    type_name: &'static str,
    /// The bound `Arc<T>` itself, before any interface cast.
    origin: Option<Value>,
}

impl Resolved {
    /// Wraps a freshly produced value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: type_name::<T>(),
            origin: None,
        }
    }

    fn bound(value: Value, type_name: &'static str, origin: Value) -> Self {
        Self {
            value,
            type_name,
            origin: Some(origin),
        }
    }

    /// Returns the held `Arc<T>`, if this value holds one.
    pub fn get<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        self.value.downcast_ref::<Arc<T>>().cloned()
    }

    /// Returns a reference to the held value if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// The erased value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Fully qualified name of the concrete type behind this value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// What recursive injection walks: the bound concrete value when there
    /// is one, the produced value otherwise.
    fn injection_target(&self) -> &dyn Any {
        match &self.origin {
            Some(origin) => &**origin,
            None => &*self.value,
        }
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resolved({})", self.type_name)
    }
}

/// A concrete instance handed to [`Container::bind`].
pub struct Instance {
    raw: Value,
    shared: Value,
    type_name: &'static str,
}

impl Instance {
    pub fn new<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            shared: Arc::new(value.clone()),
            raw: value,
            type_name: type_name::<T>(),
        }
    }

    /// Fully qualified name of `T`.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// The "how" of a binding: a ready instance or a factory.
pub enum Concrete {
    Instance(Instance),
    Factory(Factory),
}

impl<T: Any + Send + Sync> From<Arc<T>> for Concrete {
    fn from(value: Arc<T>) -> Self {
        Concrete::Instance(Instance::new(value))
    }
}

impl From<Instance> for Concrete {
    fn from(instance: Instance) -> Self {
        Concrete::Instance(instance)
    }
}

impl From<Factory> for Concrete {
    fn from(factory: Factory) -> Self {
        Concrete::Factory(factory)
    }
}

// ============================================================
// ContainerBuilder
// ============================================================

/// Builds a [`Container`].
///
/// # Examples
/// ```rust
/// use haqn_container::prelude::*;
///
/// let container = Container::builder().auto_register(false).build();
/// assert!(container.is_empty());
/// assert_eq!(container.types().struct_count(), 0);
/// ```
pub struct ContainerBuilder {
    auto_register: bool,
    types: TypeTable,
}

impl ContainerBuilder {
    fn new() -> Self {
        Self {
            auto_register: true,
            types: TypeTable::new(),
        }
    }

    /// Whether the container starts from the link-time type registrations
    /// (`#[derive(Injectable)]`, `implement!`, `interface!`). Default: `true`.
    pub fn auto_register(mut self, enabled: bool) -> Self {
        self.auto_register = enabled;
        self
    }

    /// Adds the registrations of `types` on top of the link-time ones.
    pub fn types(mut self, types: &TypeTable) -> Self {
        self.types.extend(types);
        self
    }

    /// Build the container. Nothing is bound yet.
    pub fn build(self) -> Container {
        let mut types = if self.auto_register {
            TypeTable::linked()
        } else {
            TypeTable::new()
        };
        types.extend(&self.types);

        debug!(
            interfaces = types.interface_count(),
            structs = types.struct_count(),
            "Container built"
        );
        Container {
            types,
            registry: Registry::new(),
        }
    }
}

// ═══════════════════════════════════════════
// Container
// ═══════════════════════════════════════════

/// The dependency injection container.
///
/// Binding needs `&mut self`; resolving and injecting only need `&self`.
/// The container does no locking of its own: share it across threads
/// behind your own lock if bindings change while others resolve.
pub struct Container {
    types: TypeTable,
    registry: Registry,
}

impl Container {
    /// An empty container, seeded with the link-time type registrations.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new builder.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// The types this container knows about.
    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    // ── Type registration ──

    /// Registers `I` (usually `dyn Trait`) as an interface.
    pub fn register_interface<I>(&mut self) -> &mut Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.types.register_interface::<I>();
        self
    }

    /// Declares that `T` implements `I`, see [`TypeTable::implement`].
    pub fn implement<I, T>(&mut self, cast: fn(Arc<T>) -> Arc<I>) -> &mut Self
    where
        I: ?Sized + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        self.types.implement::<I, T>(cast);
        self
    }

    /// Registers `S` as an injectable struct.
    pub fn register_struct<S: Injectable>(&mut self) -> &mut Self {
        self.types.register_struct::<S>();
        self
    }

    // ── Bind ──

    /// Binds `concrete` under the abstract named by `descriptor`.
    ///
    /// `descriptor` is either an interface marker
    /// ([`interface::<dyn I>()`](crate::descriptor::interface)), registered
    /// or not, or a value of a registered struct. A previous binding under
    /// the same abstract is replaced.
    ///
    /// # Errors
    /// - [`HaqnError::InvalidArguments`] — `descriptor` is neither
    /// - [`HaqnError::InvalidInstance`] — the instance does not implement
    ///   the interface
    /// - [`HaqnError::InvalidStruct`] — struct abstract passed as `Arc<S>`,
    ///   or a factory bound to a struct
    /// - [`HaqnError::InvalidStructConcrete`] — concrete is an `Arc` of any
    ///   type other than the struct
    pub fn bind(&mut self, descriptor: &dyn Any, concrete: impl Into<Concrete>) -> Result<()> {
        let concrete = concrete.into();

        let (key, binding) = match self.types.classify(descriptor) {
            Some(Classified::Interface(key)) => (key, self.interface_binding(key, concrete)?),
            Some(Classified::Struct(key)) => (key, self.struct_binding(key, concrete)?),
            Some(Classified::StructPointer(_)) => return Err(HaqnError::InvalidStruct),
            None => return Err(HaqnError::InvalidArguments),
        };

        self.registry.insert(key, binding);
        Ok(())
    }

    fn interface_binding(&self, interface: TypeKey, concrete: Concrete) -> Result<Binding> {
        let instance = match concrete {
            Concrete::Factory(factory) => return Ok(Binding::Factory(factory)),
            Concrete::Instance(instance) => instance,
        };

        let value = self.types.cast(interface, &instance.raw).ok_or_else(|| {
            HaqnError::InvalidInstance {
                concrete: shorten_type_name(instance.type_name),
                abstract_type: interface.to_string(),
            }
        })?;

        Ok(Binding::Instance(Resolved::bound(
            value,
            instance.type_name,
            instance.raw,
        )))
    }

    fn struct_binding(&self, expected: TypeKey, concrete: Concrete) -> Result<Binding> {
        let Concrete::Instance(instance) = concrete else {
            return Err(HaqnError::InvalidStruct);
        };

        let actual = (*instance.raw).type_id();
        if actual == expected.type_id() {
            return Ok(Binding::Instance(Resolved::bound(
                instance.shared,
                instance.type_name,
                instance.raw,
            )));
        }

        Err(HaqnError::InvalidStructConcrete {
            expected: expected.to_string(),
            actual: shorten_type_name(instance.type_name),
        })
    }

    // ── Resolve ──

    /// Resolves the abstract named by `descriptor`.
    ///
    /// Instances are returned as bound and `args` is ignored; factories are
    /// called with `args` assigned to their parameters by position.
    ///
    /// # Errors
    /// - [`HaqnError::InvalidArgument`] — `descriptor` is not an interface
    ///   marker, a registered struct value or an `Arc` of one
    /// - [`HaqnError::NotExistAbstract`] — nothing is bound
    /// - [`HaqnError::InsufficientArguments`],
    ///   [`HaqnError::ArgumentTypeMismatch`],
    ///   [`HaqnError::NonValuesReturned`] — from the factory call
    pub fn resolve(&self, descriptor: &dyn Any, args: Vec<Arg>) -> Result<Resolved> {
        let key = self
            .types
            .classify(descriptor)
            .map(|classified| classified.key())
            .ok_or(HaqnError::InvalidArgument)?;

        self.resolve_key(key, args)
    }

    /// Resolves `T` (a trait object, a registered interface or a registered
    /// struct) as an `Arc<T>`.
    ///
    /// ```rust,ignore
    /// let logger: Arc<dyn Logger> = container.make()?;
    /// ```
    pub fn make<T>(&self) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.make_with::<T>(Vec::new())
    }

    /// [`make`](Self::make) with factory arguments.
    pub fn make_with<T>(&self, args: Vec<Arg>) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        if !is_dynamic::<T>() && !self.types.is_interface::<T>() && !self.types.is_struct::<T>() {
            return Err(HaqnError::InvalidArgument);
        }

        let key = TypeKey::of::<T>();
        let resolved = self.resolve_key(key, args)?;
        resolved
            .get::<T>()
            .ok_or_else(|| HaqnError::UnassignableValue {
                expected: format!("Arc<{key}>"),
                actual: shorten_type_name(resolved.type_name()),
            })
    }

    pub(crate) fn resolve_key(&self, key: TypeKey, args: Vec<Arg>) -> Result<Resolved> {
        let binding = self
            .registry
            .get(&key)
            .ok_or_else(|| self.not_bound(key))?;

        match binding {
            Binding::Instance(instance) => {
                trace!(key = %key, "Resolved instance");
                Ok(instance.clone())
            }
            Binding::Factory(factory) => {
                trace!(key = %key, args = args.len(), "Calling factory");
                factory.invoke(args)
            }
        }
    }

    fn not_bound(&self, key: TypeKey) -> HaqnError {
        let suggestions: Vec<String> = key
            .similar(self.registry.keys(), 3)
            .iter()
            .map(TypeKey::to_string)
            .collect();
        if !suggestions.is_empty() {
            debug!(key = %key, ?suggestions, "Not bound; did you mean one of these?");
        }
        HaqnError::NotExistAbstract { key }
    }

    // ── Inject ──

    /// Fills the marked fields of `target`, a registered injectable struct
    /// or an `Arc` of one.
    ///
    /// Fields are handled in declaration order. A field is filled only if
    /// it is `pub`, carries the `#[inject]` marker, and is an `Injected<T>`
    /// whose `T` is a trait object, a registered interface or a registered
    /// struct; other fields are left untouched. Resolved structs (and
    /// interface instances whose concrete type is a registered struct) are
    /// injected recursively before being assigned.
    ///
    /// The first failing field aborts the call; fields filled before it
    /// stay filled.
    ///
    /// # Errors
    /// - [`HaqnError::InvalidTargetType`] — `target` is not an injectable
    ///   struct; the kind is `interface` for markers, `struct` otherwise
    /// - anything [`resolve`](Self::resolve) returns for a field's type
    /// - [`HaqnError::UnassignableValue`] — a factory produced something
    ///   other than `Arc<T>` for an `Injected<T>` field
    #[instrument(skip_all, name = "container_inject", fields(target = %TypeKey::of::<T>()))]
    pub fn inject<T: Any>(&self, target: &T) -> Result<()> {
        let target: &dyn Any = target;

        match self.types.structure(target.type_id()) {
            Some(structure) => (structure.inject)(self, target),
            None if target.is::<Interface>() => Err(HaqnError::InvalidTargetType {
                kind: Kind::Interface,
            }),
            None => Err(HaqnError::InvalidTargetType { kind: Kind::Struct }),
        }
    }

    /// Fills the marked fields of `target`; `S` need not be registered.
    pub fn inject_struct<S: Injectable>(&self, target: &S) -> Result<()> {
        for field in S::fields() {
            if !field.is_injectable() {
                trace!(field = field.name(), "Skipping unmarked or private field");
                continue;
            }

            let Some(slot) = field.slot() else {
                trace!(field = field.name(), "Marked field is not an Injected slot");
                continue;
            };

            let Some(classified) = self.types.classify_field(slot.target, slot.dynamic) else {
                trace!(
                    field = field.name(),
                    target = %slot.target,
                    "Marked field type is neither interface nor struct"
                );
                continue;
            };

            let resolved = self.resolve_key(classified.key(), Vec::new())?;
            self.inject_resolved(&resolved)?;

            if !slot.assign(target, &resolved) {
                return Err(HaqnError::UnassignableValue {
                    expected: format!("Arc<{}>", slot.target),
                    actual: shorten_type_name(resolved.type_name()),
                });
            }
            trace!(field = field.name(), dependency = %classified.key(), "Injected field");
        }
        Ok(())
    }

    fn inject_resolved(&self, resolved: &Resolved) -> Result<()> {
        let target = resolved.injection_target();
        match self.types.structure(target.type_id()) {
            Some(structure) => (structure.inject)(self, target),
            None => Ok(()),
        }
    }

    // ── Providers & introspection ──

    /// Runs `provider`'s registrations against this container.
    pub fn add_provider(&mut self, provider: &dyn Provider) -> Result<()> {
        debug!(provider = provider.name(), "Adding provider");
        provider.register(self)
    }

    /// Returns `true` if something is bound under `descriptor`.
    pub fn is_bound(&self, descriptor: &dyn Any) -> bool {
        self.types
            .classify(descriptor)
            .is_some_and(|classified| self.registry.contains(&classified.key()))
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Returns `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("bindings", &self.registry.len())
            .field("interfaces", &self.types.interface_count())
            .field("structs", &self.types.struct_count())
            .finish()
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{Concrete, Container, ContainerBuilder, Instance, Resolved};
    pub use crate::args;
    pub use crate::descriptor::{Interface, interface};
    pub use crate::error::{HaqnError, Result};
    pub use crate::factory::{Arg, Factory};
    pub use crate::inject::{Field, INJECT_TAG, Injectable, Injected, Visibility};
    pub use crate::provider::Provider;
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
