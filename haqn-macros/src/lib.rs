//! Procedural macros for Haqn. Use them through the `haqn` crate.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod injectable;

/// Implements `Injectable` for a struct with named fields (or a unit struct)
/// and registers it with every auto-registering container.
///
/// Field attributes:
/// - `#[inject]` (same as `#[inject = "*"]`) marks an `Injected<T>` field
///   for injection; only `pub` fields are ever filled
/// - `#[inject = "name"]` / `#[inject(tag = "name")]` attach another tag,
///   which the container ignores
///
/// Container attribute:
/// - `#[injectable(crate = "path")]` when `haqn` is not reachable as `::haqn`
///
/// ```rust,ignore
/// #[derive(Default, Injectable)]
/// pub struct UserService {
///     #[inject]
///     pub logger: Injected<dyn Logger>,
///     name: String,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(inject, injectable))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    injectable::expand(&input)
        .unwrap_or_else(|err| err.write_errors())
        .into()
}
