//! Provider trait — a group of related bindings.
//!
//! Instead of one long block of `bind` calls, split bindings by concern and
//! hand each group to [`Container::add_provider`].
//!
//! # Examples
//! ```rust
//! use haqn_container::prelude::*;
//! use std::sync::Arc;
//!
//! trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! struct FixedClock(u64);
//! impl Clock for FixedClock {
//!     fn now(&self) -> u64 { self.0 }
//! }
//!
//! struct ClockProvider;
//!
//! impl Provider for ClockProvider {
//!     fn register(&self, container: &mut Container) -> Result<()> {
//!         container.implement::<dyn Clock, FixedClock>(|c: Arc<FixedClock>| -> Arc<dyn Clock> { c });
//!         container.bind(&interface::<dyn Clock>(), Arc::new(FixedClock(42)))
//!     }
//! }
//!
//! let mut container = Container::new();
//! container.add_provider(&ClockProvider).unwrap();
//! assert_eq!(container.make::<dyn Clock>().unwrap().now(), 42);
//! ```

use crate::container::Container;
use crate::error::Result;

/// A module that registers related types and bindings into a container.
pub trait Provider: Send + Sync {
    /// Registers types and bindings. The first failing bind aborts.
    fn register(&self, container: &mut Container) -> Result<()>;

    /// Human-readable name, used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
