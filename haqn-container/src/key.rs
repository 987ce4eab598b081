//! Type identification keys.
//!
//! [`TypeKey`] identifies an abstract type inside the container: the
//! registry of bindings and the type table are both keyed by it.

use std::any::{TypeId, type_name};
use std::cmp::Reverse;
use std::fmt;
use std::hash::{Hash, Hasher};

use haqn_support::rendering::shorten_type_name;

/// Identifies a Rust type by its [`TypeId`], keeping the type name around
/// for error messages.
///
/// Two keys are equal iff their `TypeId`s are equal.
///
/// # Examples
/// ```
/// use haqn_container::key::TypeKey;
///
/// let key = TypeKey::of::<String>();
/// assert_eq!(key.type_name(), "alloc::string::String");
/// assert_eq!(key.to_string(), "String");
/// ```
#[derive(Clone, Copy)]
pub struct TypeKey {
    type_id: TypeId,
    type_name: &'static str,
}

impl TypeKey {
    /// Creates a key for type `T`.
    ///
    /// Trait objects work too: `TypeKey::of::<dyn Logger>()`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    /// Returns the [`TypeId`] of this type.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the fully qualified type name.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the type name with module paths stripped.
    pub fn short_name(&self) -> String {
        shorten_type_name(self.type_name)
    }

    /// Up to `max` of `candidates` whose short names resemble this key's,
    /// closest first. Never returns this key itself.
    ///
    /// A namesake from another module ranks first, then names containing
    /// one another, then names sharing a prefix of at least three chars.
    pub fn similar<'a>(
        &self,
        candidates: impl IntoIterator<Item = &'a TypeKey>,
        max: usize,
    ) -> Vec<TypeKey> {
        let wanted = self.short_name().to_lowercase();

        let mut ranked: Vec<(usize, TypeKey)> = candidates
            .into_iter()
            .filter(|candidate| *candidate != self)
            .filter_map(|candidate| {
                let name = candidate.short_name().to_lowercase();
                let rank = if name == wanted {
                    usize::MAX
                } else if name.contains(&wanted) || wanted.contains(&name) {
                    usize::MAX - 1
                } else {
                    name.chars()
                        .zip(wanted.chars())
                        .take_while(|(a, b)| a == b)
                        .count()
                };
                (rank >= 3).then_some((rank, *candidate))
            })
            .collect();

        ranked.sort_by_key(|(rank, _)| Reverse(*rank));
        ranked.into_iter().take(max).map(|(_, key)| key).collect()
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.type_name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_name())
    }
}
