//! cryptid-middleware
//!
//! Client-side handlers for the middleware programs that ship with Cryptid,
//! plus a catalog describing them.
//!
//! Handlers plug into [`cryptid_core::middleware::MiddlewareRegistry`]; the
//! catalog is data only and is used by the CLI to resolve names such as
//! `time-delay` to program ids.

pub mod registry;
pub mod spec;

#[cfg(feature = "builtin")]
pub mod builtin;

pub use crate::registry::MiddlewareCatalog;
pub use crate::spec::{MiddlewareId, MiddlewareSpec};

#[cfg(feature = "builtin")]
pub use crate::builtin::{register_builtins, BuiltinOptions};
