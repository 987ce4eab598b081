//! Abstract descriptors: how callers name *what* they bind and resolve.
//!
//! An abstract is either
//! - an interface, named by an [`Interface`] marker
//!   (`interface::<dyn Trait>()`), or
//! - a struct, named by any value of that struct (`MyStruct::default()`).
//!
//! Both are passed as `&dyn Any`. Markers are recognised on their own;
//! structs are classified against the container's
//! [`TypeTable`](crate::types::TypeTable).

use std::fmt;
use std::mem::size_of;

use crate::key::TypeKey;

/// Marker value naming the interface `I` (usually `dyn Trait`).
///
/// Carries only the key of `I`, so any marker is recognised as an
/// interface abstract whether or not `I` was ever registered.
///
/// ```
/// use haqn_container::descriptor::{Interface, interface};
///
/// trait Logger: Send + Sync {}
///
/// let abstract_logger: Interface = interface::<dyn Logger>();
/// assert_eq!(abstract_logger.key().to_string(), "dyn Logger");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interface {
    key: TypeKey,
}

impl Interface {
    /// Returns the marker for `I`.
    pub fn of<I: ?Sized + 'static>() -> Self {
        Self {
            key: TypeKey::of::<I>(),
        }
    }

    /// Key of the interface itself.
    pub fn key(&self) -> TypeKey {
        self.key
    }
}

impl fmt::Debug for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Interface({})", self.key)
    }
}

/// Shorthand for [`Interface::of`].
pub fn interface<I: ?Sized + 'static>() -> Interface {
    Interface::of::<I>()
}

/// `true` when `T` is a trait object (or another dynamically sized type):
/// a pointer to it is wide.
pub(crate) fn is_dynamic<T: ?Sized>() -> bool {
    size_of::<*const T>() != size_of::<*const ()>()
}

/// What a descriptor names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A trait object type registered as an interface.
    Interface,
    /// A registered [`Injectable`](crate::inject::Injectable) struct.
    Struct,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Interface => write!(f, "interface"),
            Kind::Struct => write!(f, "struct"),
        }
    }
}

/// Result of classifying a runtime value against the type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Classified {
    /// [`Interface`] marker.
    Interface(TypeKey),
    /// A struct value `S`.
    Struct(TypeKey),
    /// An `Arc<S>` pointing at a registered struct.
    StructPointer(TypeKey),
}

impl Classified {
    /// The registry key the classified value stands for.
    pub(crate) fn key(&self) -> TypeKey {
        match self {
            Classified::Interface(key)
            | Classified::Struct(key)
            | Classified::StructPointer(key) => *key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::{Any, TypeId};

    trait Fooer {}
    trait Barer {}

    #[test]
    fn markers_are_one_type() {
        let a: &dyn Any = &interface::<dyn Fooer>();
        let b: &dyn Any = &Interface::of::<dyn Barer>();
        assert_eq!(a.type_id(), b.type_id());
        assert_eq!(a.type_id(), TypeId::of::<Interface>());
        assert_ne!(interface::<dyn Fooer>(), interface::<dyn Barer>());
    }

    #[test]
    fn marker_key_is_the_interface() {
        assert_eq!(interface::<dyn Fooer>().key(), TypeKey::of::<dyn Fooer>());
        assert_eq!(format!("{:?}", interface::<dyn Fooer>()), "Interface(dyn Fooer)");
    }

    #[test]
    fn trait_objects_are_dynamic() {
        assert!(is_dynamic::<dyn Fooer>());
        assert!(is_dynamic::<dyn std::error::Error + Send + Sync>());
        assert!(!is_dynamic::<String>());
        assert!(!is_dynamic::<u8>());
    }

    #[test]
    fn kind_display() {
        assert_eq!(Kind::Interface.to_string(), "interface");
        assert_eq!(Kind::Struct.to_string(), "struct");
    }

    #[test]
    fn classified_key() {
        let key = TypeKey::of::<String>();
        assert_eq!(Classified::StructPointer(key).key(), key);
    }
}
