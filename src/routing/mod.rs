//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route registration (at startup):
//!     template "/items/{id}" + method
//!     → template.rs (validate segments, normalize to "/items/{}")
//!     → router.rs (store under RouteKey "/items/{}:GET")
//!
//! Request lookup:
//!     path "/items/42"
//!     → matcher.rs (integer segments become "{}", values collected)
//!     → router.rs (O(1) key lookup)
//!     → Return: handler + [42], or no match
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in the hot path
//! - Deterministic: same input always matches same route

pub mod matcher;
pub mod router;
pub mod template;

pub use router::{Resolved, RouteTable, SharedRoutes};
pub use template::{RouteError, RouteKey, RouteTemplate};
