//! Random record fabricator for the dbstep acceptance-testing library.
//!
//! Given a shape registered in a [`step_core::ShapeRegistry`], the
//! [`Fabricator`] produces a random, type-valid [`step_core::Record`]:
//!
//! - computed fields are never assigned;
//! - per-column overrides registered in an [`OverrideRegistry`] win over
//!   the default kind-based generators;
//! - decimal precision/scale and string max-length constraints are honored;
//! - nested and self-referential shapes expand up to a configurable depth
//!   cap, so fabrication always terminates.
//!
//! Fabrication is seeded: the same seed, shapes, and overrides produce the
//! same records, which keeps scenario failures reproducible. The primitive
//! generators under [`generators`] are exposed for override functions and
//! test authors.

pub mod fabricator;
pub mod generators;
pub mod overrides;

// Re-exports for convenience
pub use self::fabricator::{FabricateError, Fabricator, DEFAULT_MAX_DEPTH};
pub use self::overrides::{OverrideFn, OverrideRegistry, TableContext};
