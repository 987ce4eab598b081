//! Field injection: injectable structs and their field tables.
//!
//! A struct opts into field injection by implementing [`Injectable`],
//! which lists its fields as [`Field`] descriptors. Fields that the
//! container may fill are typed [`Injected<T>`]; the container only fills
//! them when they are `pub` and carry the [`INJECT_TAG`] marker.
//!
//! `#[derive(Injectable)]` (from the `haqn` facade) writes the table:
//!
//! ```rust,ignore
//! #[derive(Default, Injectable)]
//! struct UserService {
//!     #[inject]
//!     pub logger: Injected<dyn Logger>,
//!     #[inject]
//!     pub repo: Injected<UserRepository>,
//!     name: String,
//! }
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::container::Resolved;
use crate::descriptor::is_dynamic;
use crate::key::TypeKey;

/// Sentinel value of the injection marker: `#[inject]` is shorthand for
/// `#[inject = "*"]`.
pub const INJECT_TAG: &str = "*";

/// A field slot the container fills during injection.
///
/// Holds an optional `Arc<T>` behind a lock, so injecting only needs a
/// shared reference to the owning struct. This is what lets the container
/// populate instances that are already shared through an `Arc`.
pub struct Injected<T: ?Sized> {
    slot: RwLock<Option<Arc<T>>>,
}

impl<T: ?Sized> Injected<T> {
    /// An empty slot.
    pub const fn empty() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// A slot pre-filled with `value`.
    pub fn with(value: Arc<T>) -> Self {
        Self {
            slot: RwLock::new(Some(value)),
        }
    }

    /// Returns the injected value, if any.
    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.read().clone()
    }

    /// Returns `true` once a value has been injected.
    pub fn is_set(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Stores `value`, replacing any previous one.
    pub fn set(&self, value: Arc<T>) {
        *self.slot.write() = Some(value);
    }

    /// Removes and returns the current value.
    pub fn take(&self) -> Option<Arc<T>> {
        self.slot.write().take()
    }
}

impl<T: ?Sized> Default for Injected<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: ?Sized + 'static> fmt::Debug for Injected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_set() { "set" } else { "empty" };
        write!(f, "Injected<{}>({state})", TypeKey::of::<T>())
    }
}

/// Whether a field can be written from outside its module.
///
/// Only [`Visibility::Public`] fields are injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
}

type Assign<S> = Box<dyn Fn(&S, &Resolved) -> bool + Send + Sync>;

/// Access to an [`Injected<T>`] field, with `T` erased.
pub(crate) struct Slot<S> {
    /// The declared type `T`.
    pub target: TypeKey,
    /// `T` is a trait object, hence an interface.
    pub dynamic: bool,
    assign: Assign<S>,
}

impl<S> Slot<S> {
    /// Stores `value` into the slot of `owner`. Returns `false` when the
    /// value does not hold an `Arc<T>`.
    pub fn assign(&self, owner: &S, value: &Resolved) -> bool {
        (self.assign)(owner, value)
    }
}

/// One entry of a struct's field table.
pub struct Field<S> {
    name: &'static str,
    visibility: Visibility,
    tag: Option<&'static str>,
    slot: Option<Slot<S>>,
}

impl<S: 'static> Field<S> {
    /// An [`Injected<T>`] field reachable through `access`.
    pub fn injected<T>(
        name: &'static str,
        visibility: Visibility,
        tag: Option<&'static str>,
        access: fn(&S) -> &Injected<T>,
    ) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let assign: Assign<S> = Box::new(move |owner: &S, value: &Resolved| {
            match value.get::<T>() {
                Some(value) => {
                    access(owner).set(value);
                    true
                }
                None => false,
            }
        });

        Self {
            name,
            visibility,
            tag,
            slot: Some(Slot {
                target: TypeKey::of::<T>(),
                dynamic: is_dynamic::<T>(),
                assign,
            }),
        }
    }

    /// A field the container can never assign (not an [`Injected<T>`]).
    ///
    /// Listed so that markers on such fields are tolerated rather than
    /// silently lost.
    pub fn plain(name: &'static str, visibility: Visibility, tag: Option<&'static str>) -> Self {
        Self {
            name,
            visibility,
            tag,
            slot: None,
        }
    }
}

impl<S> Field<S> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn tag(&self) -> Option<&'static str> {
        self.tag
    }

    /// `true` when the field carries the injection marker.
    pub fn is_marked(&self) -> bool {
        self.tag == Some(INJECT_TAG)
    }

    /// `true` when the container should try to fill this field.
    pub fn is_injectable(&self) -> bool {
        self.visibility == Visibility::Public && self.is_marked()
    }

    pub(crate) fn slot(&self) -> Option<&Slot<S>> {
        self.slot.as_ref()
    }
}

impl<S> fmt::Debug for Field<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .field("tag", &self.tag)
            .field("target", &self.slot.as_ref().map(|s| s.target))
            .finish()
    }
}

/// A struct whose fields the container can walk.
///
/// The default field table is empty, which is enough for structs that are
/// only ever bound and resolved.
pub trait Injectable: Any + Send + Sync + Sized {
    /// The struct's fields, in declaration order.
    fn fields() -> Vec<Field<Self>> {
        Vec::new()
    }
}
