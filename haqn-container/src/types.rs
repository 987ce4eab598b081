//! The type table: what the container knows about Rust types.
//!
//! Binding and injection need to answer questions that other languages
//! answer with runtime reflection: is this value a struct? does this
//! concrete type implement that interface? which fields does this struct
//! have? The [`TypeTable`] answers them from explicit registrations:
//!
//! - interfaces, with one cast per implementing concrete type
//!   ([`TypeTable::implement`]), which doubles as the "implements"
//!   predicate;
//! - injectable structs ([`TypeTable::register_struct`]), with an erased
//!   field walker.
//!
//! Registrations are either made on a container directly or submitted at
//! link time through `inventory` (`#[derive(Injectable)]`, [`implement!`],
//! [`interface!`]); every auto-registering container starts from the
//! link-time table.
//!
//! [`implement!`]: crate::implement
//! [`interface!`]: crate::interface

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{debug, trace};

use crate::container::{Container, Value};
use crate::descriptor::{Classified, Interface};
use crate::error::Result;
use crate::inject::Injectable;
use crate::key::TypeKey;

type Cast = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;
type InjectFn = Arc<dyn Fn(&Container, &dyn Any) -> Result<()> + Send + Sync>;

#[derive(Clone)]
struct InterfaceType {
    key: TypeKey,
    /// Keyed by the `TypeId` of the implementing concrete type.
    casts: HashMap<TypeId, Cast>,
}

#[derive(Clone)]
pub(crate) struct StructType {
    pub key: TypeKey,
    pub inject: InjectFn,
}

/// Registered interfaces and injectable structs.
#[derive(Clone, Default)]
pub struct TypeTable {
    /// Keyed by `TypeId::of::<I>()`.
    interfaces: HashMap<TypeId, InterfaceType>,
    /// Keyed by `TypeId::of::<S>()`.
    structs: HashMap<TypeId, StructType>,
    /// `Arc<S>` → `S`.
    pointers: HashMap<TypeId, TypeId>,
}

impl TypeTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the table built from link-time registrations.
    pub fn linked() -> Self {
        LINKED.clone()
    }

    /// Registers `I` (usually `dyn Trait`) as an interface.
    ///
    /// Idempotent: existing implementor casts are kept.
    pub fn register_interface<I>(&mut self) -> &mut Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let key = TypeKey::of::<I>();
        self.interfaces
            .entry(key.type_id())
            .or_insert_with(|| {
                trace!(interface = %key, "Registered interface");
                InterfaceType {
                    key,
                    casts: HashMap::new(),
                }
            });
        self
    }

    /// Declares that `T` implements the interface `I`; `cast` performs the
    /// unsizing coercion (`|t: Arc<T>| -> Arc<dyn I> { t }`).
    ///
    /// Registers `I` if needed.
    pub fn implement<I, T>(&mut self, cast: fn(Arc<T>) -> Arc<I>) -> &mut Self
    where
        I: ?Sized + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        self.register_interface::<I>();

        let cast: Cast = Arc::new(move |raw: &Value| {
            raw.clone()
                .downcast::<T>()
                .ok()
                .map(|concrete| Arc::new(cast(concrete)) as Value)
        });

        if let Some(interface) = self.interfaces.get_mut(&TypeId::of::<I>()) {
            trace!(
                interface = %interface.key,
                concrete = %TypeKey::of::<T>(),
                "Registered implementation"
            );
            interface.casts.insert(TypeId::of::<T>(), cast);
        }
        self
    }

    /// Registers `S` as an injectable struct.
    pub fn register_struct<S: Injectable>(&mut self) -> &mut Self {
        let key = TypeKey::of::<S>();
        let inject: InjectFn = Arc::new(|container: &Container, target: &dyn Any| {
            if let Some(target) = target.downcast_ref::<S>() {
                return container.inject_struct(target);
            }
            if let Some(target) = target.downcast_ref::<Arc<S>>() {
                return container.inject_struct(target.as_ref());
            }
            Ok(())
        });

        trace!(structure = %key, "Registered struct");
        self.pointers
            .insert(TypeId::of::<Arc<S>>(), key.type_id());
        self.structs
            .insert(key.type_id(), StructType { key, inject });
        self
    }

    /// Adds every registration of `other` to this table.
    pub fn extend(&mut self, other: &TypeTable) {
        for (id, interface) in &other.interfaces {
            let entry = self
                .interfaces
                .entry(*id)
                .or_insert_with(|| InterfaceType {
                    key: interface.key,
                    casts: HashMap::new(),
                });
            entry
                .casts
                .extend(interface.casts.iter().map(|(k, v)| (*k, v.clone())));
        }
        self.structs
            .extend(other.structs.iter().map(|(k, v)| (*k, v.clone())));
        self.pointers
            .extend(other.pointers.iter().map(|(k, v)| (*k, *v)));
    }

    /// Returns `true` if `I` is a registered interface.
    pub fn is_interface<I: ?Sized + 'static>(&self) -> bool {
        self.interfaces.contains_key(&TypeId::of::<I>())
    }

    /// Returns `true` if `S` is a registered struct.
    pub fn is_struct<S: ?Sized + 'static>(&self) -> bool {
        self.structs.contains_key(&TypeId::of::<S>())
    }

    /// Returns `true` if `T` is registered as implementing `I`.
    pub fn implements<I: ?Sized + 'static, T: ?Sized + 'static>(&self) -> bool {
        self.interfaces
            .get(&TypeId::of::<I>())
            .is_some_and(|interface| interface.casts.contains_key(&TypeId::of::<T>()))
    }

    pub fn interface_count(&self) -> usize {
        self.interfaces.len()
    }

    pub fn struct_count(&self) -> usize {
        self.structs.len()
    }

    /// Classifies a descriptor value passed to bind/resolve.
    ///
    /// Interface markers need no registration; structs do.
    pub(crate) fn classify(&self, value: &dyn Any) -> Option<Classified> {
        if let Some(marker) = value.downcast_ref::<Interface>() {
            return Some(Classified::Interface(marker.key()));
        }
        if let Some(structure) = self.structs.get(&value.type_id()) {
            return Some(Classified::Struct(structure.key));
        }
        self.pointers
            .get(&value.type_id())
            .and_then(|s| self.structs.get(s))
            .map(|structure| Classified::StructPointer(structure.key))
    }

    /// Classifies the declared type `T` of an `Injected<T>` field.
    ///
    /// Registered structs come first; trait objects (`dynamic`) and
    /// registered interfaces are interfaces; anything else is neither.
    pub(crate) fn classify_field(&self, target: TypeKey, dynamic: bool) -> Option<Classified> {
        if let Some(structure) = self.structs.get(&target.type_id()) {
            return Some(Classified::Struct(structure.key));
        }
        if dynamic || self.interfaces.contains_key(&target.type_id()) {
            return Some(Classified::Interface(target));
        }
        None
    }

    /// Casts `raw` (an erased `Arc<T>`) to the interface `interface`, if
    /// `T` implements it.
    pub(crate) fn cast(&self, interface: TypeKey, raw: &Value) -> Option<Value> {
        let concrete = (**raw).type_id();
        self.interfaces
            .get(&interface.type_id())
            .and_then(|i| i.casts.get(&concrete))
            .and_then(|cast| cast(raw))
    }

    /// Looks up a struct by the `TypeId` of `S` or of `Arc<S>`.
    pub(crate) fn structure(&self, id: TypeId) -> Option<&StructType> {
        self.structs
            .get(&id)
            .or_else(|| self.pointers.get(&id).and_then(|s| self.structs.get(s)))
    }
}

impl fmt::Debug for TypeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeTable")
            .field("interfaces", &self.interfaces.len())
            .field("structs", &self.structs.len())
            .finish()
    }
}

/// A link-time registration, collected with `inventory`.
///
/// Produced by `#[derive(Injectable)]`, [`implement!`](crate::implement)
/// and [`interface!`](crate::interface); rarely written by hand.
pub struct TypeRegistration {
    register: fn(&mut TypeTable),
}

impl TypeRegistration {
    pub const fn new(register: fn(&mut TypeTable)) -> Self {
        Self { register }
    }

    pub fn apply(&self, table: &mut TypeTable) {
        (self.register)(table)
    }
}

inventory::collect!(TypeRegistration);

static LINKED: Lazy<TypeTable> = Lazy::new(|| {
    let mut table = TypeTable::new();
    for registration in inventory::iter::<TypeRegistration> {
        registration.apply(&mut table);
    }
    debug!(
        interfaces = table.interface_count(),
        structs = table.struct_count(),
        "Collected link-time type registrations"
    );
    table
});

/// Registers concrete types as implementations of an interface at link
/// time.
///
/// ```rust,ignore
/// haqn::implement!(dyn Logger => ConsoleLogger, FileLogger);
/// ```
#[macro_export]
macro_rules! implement {
    ($interface:ty => $($concrete:ty),+ $(,)?) => {
        $(
            const _: () = {
                fn register(types: &mut $crate::types::TypeTable) {
                    types.implement::<$interface, $concrete>(
                        |concrete: ::std::sync::Arc<$concrete>| -> ::std::sync::Arc<$interface> {
                            concrete
                        },
                    );
                }
                $crate::inventory::submit! {
                    $crate::types::TypeRegistration::new(register)
                }
            };
        )+
    };
}

/// Registers interfaces at link time, for interfaces that are only ever
/// bound to factories.
///
/// ```rust,ignore
/// haqn::interface!(dyn std::error::Error + Send + Sync);
/// ```
#[macro_export]
macro_rules! interface {
    ($($interface:ty),+ $(,)?) => {
        $(
            const _: () = {
                fn register(types: &mut $crate::types::TypeTable) {
                    types.register_interface::<$interface>();
                }
                $crate::inventory::submit! {
                    $crate::types::TypeRegistration::new(register)
                }
            };
        )+
    };
}
