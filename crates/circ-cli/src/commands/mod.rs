//! Command handler modules for circ-cli.
//!
//! Shared utilities used by multiple command paths live here.

pub mod run;
pub mod validate;

use anyhow::Result;
use circ_config::{LoadedConfig, ScenarioConfig, UnusedKeyPolicy};

/// Load the scenario through `circ_config::load_scenario` and log every
/// unused key. With `fail_on_unused_keys` they are an error instead.
pub fn load_scenario(
    config_paths: &[String],
    fail_on_unused_keys: bool,
) -> Result<(LoadedConfig, ScenarioConfig, usize)> {
    let refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
    let policy = if fail_on_unused_keys {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let (loaded, scenario, report) = circ_config::load_scenario(&refs, policy)?;
    for pointer in &report.unused_leaf_pointers {
        tracing::warn!(pointer = %pointer, "config key is not used by the scenario");
    }
    Ok((loaded, scenario, report.unused_leaf_pointers.len()))
}
