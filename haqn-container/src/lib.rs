//! Core container implementation for Haqn.

pub mod container;
pub mod descriptor;
pub mod error;
pub mod factory;
pub mod inject;
pub mod key;
pub mod provider;
mod registry;
pub mod types;

pub use container::{Concrete, Container, ContainerBuilder, Instance, Resolved, Value, prelude};
pub use descriptor::{Interface, Kind, interface};
pub use error::{HaqnError, Result};
pub use factory::{Arg, Callable, Factory, Returns};
pub use inject::{Field, INJECT_TAG, Injectable, Injected, Visibility};
pub use key::TypeKey;
pub use provider::Provider;
pub use types::{TypeRegistration, TypeTable};

#[doc(hidden)]
pub use inventory;
