//! # Haqn — Dependency Injection Container for Rust
//!
//! A runtime IoC container: bind interfaces (trait objects) and structs to
//! concrete instances or factories, resolve them by their abstract type,
//! and fill the marked fields of a struct in one call.
//!
//! ```rust
//! use haqn::{Container, Injectable, Injected, interface};
//! use std::sync::Arc;
//!
//! pub trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! pub struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".into()
//!     }
//! }
//!
//! haqn::implement!(dyn Greeter => English);
//!
//! #[derive(Default, Injectable)]
//! pub struct Welcome {
//!     #[inject]
//!     pub greeter: Injected<dyn Greeter>,
//! }
//!
//! fn main() -> haqn::Result<()> {
//!     let mut container = Container::new();
//!     container.bind(&interface::<dyn Greeter>(), Arc::new(English))?;
//!
//!     let welcome = Welcome::default();
//!     container.inject(&welcome)?;
//!     assert_eq!(welcome.greeter.get().unwrap().greet(), "hello");
//!     Ok(())
//! }
//! ```

pub use haqn_container::*;
pub use haqn_derive::*;
pub use haqn_support::*;
