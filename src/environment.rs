//! Test-run environment.
//!
//! [`TestEnvironment`] is the explicit context object holding everything
//! scenarios share: shape descriptors, fabrication overrides, named
//! scripts, connection configuration, and the base scenario config. It is
//! mutated during test-run setup, then frozen behind an `Arc`; every
//! scenario session reads the same immutable state, so scenarios can run
//! in parallel without sharing mutable registries.

use crate::catalog::CatalogFactory;
use crate::config::ScenarioConfig;
use crate::scripts::ScriptRegistry;
use crate::session::ScenarioSession;
use fabricator::{Fabricator, OverrideRegistry};
use std::sync::Arc;
use step_core::ShapeRegistry;

/// Shared state for one test run.
#[derive(Default)]
pub struct TestEnvironment {
    /// Declarative shape descriptors
    pub shapes: ShapeRegistry,

    /// Per-column fabrication overrides
    pub overrides: OverrideRegistry,

    /// Named SQL scripts
    pub scripts: ScriptRegistry,

    /// Connection configuration and product drivers
    pub factory: CatalogFactory,

    /// Base configuration cloned into each scenario
    pub base_config: ScenarioConfig,
}

impl TestEnvironment {
    /// Create an environment with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an environment with the given base configuration.
    pub fn with_config(base_config: ScenarioConfig) -> Self {
        Self {
            base_config,
            ..Self::default()
        }
    }

    /// Start a scenario session sharing this environment. The session's
    /// configuration is a clone of the base config, so per-scenario
    /// overrides never leak back.
    pub fn start_scenario(self: &Arc<Self>) -> ScenarioSession {
        ScenarioSession::new(Arc::clone(self))
    }

    /// Create a seeded fabricator over this environment's shapes and
    /// overrides.
    pub fn fabricator(&self, seed: u64) -> Fabricator<'_> {
        Fabricator::new(&self.shapes, &self.overrides, seed)
    }
}
