//! Derive macros for Haqn.

pub use haqn_macros::Injectable;
