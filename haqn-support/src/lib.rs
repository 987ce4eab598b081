//! # Haqn Support
//!
//! Shared utilities for the Haqn DI framework.
//!
//! This crate provides type-name rendering for error messages and logs.

pub mod rendering;
