//! circ-config
//!
//! Layered YAML configuration for circuit scenarios.
//!
//! - Documents merge in order; later documents override earlier ones key by key.
//! - The merged document is canonicalised to JSON and hashed (SHA-256, hex) so a
//!   run can record exactly which configuration produced it.
//! - [`ScenarioConfig`] is the typed view the loader reads; anything in the YAML
//!   it does not read is reported by [`report_unused_keys`].

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;

mod scenario;

pub use scenario::{
    ClassConfig, CommodityConfig, ConsumptionConfig, GlobalConfig, IndustryConfig, InputConfig,
    ProjectConfig, SalesConfig, ScenarioConfig,
};

// ---------------------------------------------------------------------------
// Layered loading + hashing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    // Earlier docs are the base, later docs override.
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    let canonical_json = canonicalize_json(&merged)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

/// Load, deserialize and validate a scenario, then run the unused-key
/// guard under `policy`.
pub fn load_scenario(
    paths: &[&str],
    policy: UnusedKeyPolicy,
) -> Result<(LoadedConfig, ScenarioConfig, UnusedKeyReport)> {
    let loaded = load_layered_yaml(paths)?;
    let scenario = ScenarioConfig::from_json(&loaded.config_json)?;
    scenario.validate()?;
    let report = report_unused_keys(&loaded.config_json, &scenario, policy)?;
    Ok((loaded, scenario, report))
}

/// Objects merge recursively; any other value (arrays included) is replaced.
fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn canonicalize_json(v: &Value) -> Result<String> {
    // serde_json's default Map is ordered by key, so key order in the YAML
    // does not reach the hash.
    let s = serde_json::to_string(v).context("canonical json serialize failed")?;
    Ok(s)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let out = hasher.finalize();
    hex::encode(out)
}

// ---------------------------------------------------------------------------
// Unused-key guard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    /// Number of leaf keys the scenario loader read.
    pub consumed_leaf_count: usize,
    /// Leaf pointers present in the YAML but never read (sorted, unique).
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Compare the raw merged config against what the scenario loader consumed.
///
/// A leaf of `config_json` is consumed if the typed scenario, serialized
/// back to JSON, has a value at the same pointer (or below it, for leaves
/// such as empty lists that the scenario fills with defaults).
///
/// With `UnusedKeyPolicy::Fail` an unclean report is an error.
pub fn report_unused_keys(
    config_json: &Value,
    scenario: &ScenarioConfig,
    policy: UnusedKeyPolicy,
) -> Result<UnusedKeyReport> {
    let consumed_json =
        serde_json::to_value(scenario).context("scenario re-serialization failed")?;

    let mut consumed: Vec<String> = Vec::new();
    collect_leaf_pointers(&consumed_json, "", &mut consumed);
    let consumed: BTreeSet<String> = consumed.into_iter().collect();

    let mut leaves: Vec<String> = Vec::new();
    collect_leaf_pointers(config_json, "", &mut leaves);

    let mut unused: Vec<String> = leaves
        .into_iter()
        .filter(|leaf| {
            !consumed.contains(leaf) && !consumed.iter().any(|c| is_prefix_pointer(leaf, c))
        })
        .collect();
    unused.sort();
    unused.dedup();

    let report = UnusedKeyReport {
        consumed_leaf_count: consumed.len(),
        unused_leaf_pointers: unused,
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        bail!(
            "CONFIG_UNUSED_KEYS: {} unused config leaf key(s) detected. \
            Remove them or fix their spelling. First few: {}",
            report.unused_leaf_pointers.len(),
            preview_list(&report.unused_leaf_pointers, 12)
        );
    }

    Ok(report)
}

/// Return true if `prefix` is a JSON-pointer prefix of `leaf`.
///
/// "/a/b" covers "/a/b/c" but not "/a/bc"; "/" covers everything.
fn is_prefix_pointer(prefix: &str, leaf: &str) -> bool {
    if prefix == "/" || leaf == prefix {
        return true;
    }
    if leaf.starts_with(prefix) {
        return leaf
            .get(prefix.len()..prefix.len() + 1)
            .map(|c| c == "/")
            .unwrap_or(false);
    }
    false
}

fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) if !map.is_empty() => {
            for (k, vv) in map.iter() {
                let next = format!("{}/{}", prefix, escape_pointer_token(k));
                collect_leaf_pointers(vv, &next, out);
            }
        }
        Value::Array(arr) if !arr.is_empty() => {
            for (i, vv) in arr.iter().enumerate() {
                let next = format!("{}/{}", prefix, i);
                collect_leaf_pointers(vv, &next, out);
            }
        }
        _ => {
            let p = if prefix.is_empty() {
                "/".to_string()
            } else {
                prefix.to_string()
            };
            out.push(p);
        }
    }
}

fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

fn preview_list(items: &[String], n: usize) -> String {
    let take = items.iter().take(n).cloned().collect::<Vec<_>>();
    format!("{:?}", take)
}
