//! Pipeline configuration.
//!
//! A config file is camelCase JSON. Every field is optional; a file may
//! `extends` another (resolved relative to the extending file), and the
//! extending file's fields win.
//!
//! ```json
//! {
//!   "extends": "./base.json",
//!   "memberNaming": "camelCase",
//!   "viewPrefix": "As_",
//!   "extraFlattenExceptions": [
//!     { "typeName": "Demo.Half", "ancestor": "Demo.INumber`1", "reason": "width" }
//!   ]
//! }
//! ```

use anyhow::{Context, Result, anyhow, bail};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tsb_common::limits::MAX_SUFFIX_ATTEMPTS;
use tsb_names::{LedgerOptions, MemberNaming, NamingOptions};
use tsb_shape::{FlattenException, ShapeOptions};

/// A config file as written.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TsbConfig {
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub member_naming: Option<MemberNaming>,
    #[serde(default)]
    pub reserved_word_marker: Option<String>,
    #[serde(default)]
    pub max_suffix_attempts: Option<u32>,
    #[serde(default)]
    pub view_prefix: Option<String>,
    #[serde(default)]
    pub parallel: Option<bool>,
    #[serde(default)]
    pub extra_flatten_exceptions: Option<Vec<FlattenException>>,
}

/// Resolved options the pipeline runs with.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOptions {
    pub member_naming: MemberNaming,
    pub reserved_word_marker: String,
    pub max_suffix_attempts: u32,
    pub view_prefix: String,
    pub parallel: bool,
    /// Appended to the built-in flatten exception table.
    pub extra_flatten_exceptions: Vec<FlattenException>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            member_naming: MemberNaming::None,
            reserved_word_marker: "_".to_string(),
            max_suffix_attempts: MAX_SUFFIX_ATTEMPTS,
            view_prefix: "As_".to_string(),
            parallel: true,
            extra_flatten_exceptions: Vec::new(),
        }
    }
}

impl PipelineOptions {
    pub fn shape_options(&self) -> ShapeOptions {
        let mut flatten_exceptions = FlattenException::builtin();
        flatten_exceptions.extend(self.extra_flatten_exceptions.iter().cloned());
        ShapeOptions {
            parallel: self.parallel,
            flatten_exceptions,
        }
    }

    pub fn ledger_options(&self) -> LedgerOptions {
        LedgerOptions {
            reserved_word_marker: self.reserved_word_marker.clone(),
            max_suffix_attempts: self.max_suffix_attempts,
        }
    }

    pub fn naming_options(&self) -> NamingOptions {
        NamingOptions {
            member_naming: self.member_naming,
            view_prefix: self.view_prefix.clone(),
        }
    }
}

fn is_identifier_part(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Apply `config` over the defaults and check the result.
pub fn resolve_options(config: &TsbConfig) -> Result<PipelineOptions> {
    let mut options = PipelineOptions::default();

    if let Some(naming) = config.member_naming {
        options.member_naming = naming;
    }
    if let Some(marker) = &config.reserved_word_marker {
        if !is_identifier_part(marker) {
            bail!("reservedWordMarker '{marker}' must be a non-empty identifier fragment");
        }
        options.reserved_word_marker = marker.clone();
    }
    if let Some(attempts) = config.max_suffix_attempts {
        if attempts == 0 {
            bail!("maxSuffixAttempts must be at least 1");
        }
        options.max_suffix_attempts = attempts;
    }
    if let Some(prefix) = &config.view_prefix {
        if !is_identifier_part(prefix) {
            bail!("viewPrefix '{prefix}' must be a non-empty identifier fragment");
        }
        options.view_prefix = prefix.clone();
    }
    if let Some(parallel) = config.parallel {
        options.parallel = parallel;
    }
    if let Some(exceptions) = &config.extra_flatten_exceptions {
        options.extra_flatten_exceptions = exceptions.clone();
    }

    Ok(options)
}

pub fn parse_config(source: &str) -> Result<TsbConfig> {
    let config = serde_json::from_str(source).context("failed to parse tsb config JSON")?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<TsbConfig> {
    let mut visited = FxHashSet::default();
    load_config_inner(path, &mut visited)
}

fn load_config_inner(path: &Path, visited: &mut FxHashSet<PathBuf>) -> Result<TsbConfig> {
    let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical.clone()) {
        bail!("config extends cycle detected at {}", canonical.display());
    }

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let mut config = parse_config(&source)
        .with_context(|| format!("failed to parse config: {}", path.display()))?;

    if let Some(extends) = config.extends.take() {
        let base_path = resolve_extends_path(path, &extends)?;
        let base = load_config_inner(&base_path, visited)?;
        config = merge_configs(base, config);
    }

    visited.remove(&canonical);
    Ok(config)
}

fn resolve_extends_path(current: &Path, extends: &str) -> Result<PathBuf> {
    let base_dir = current
        .parent()
        .ok_or_else(|| anyhow!("config has no parent directory"))?;
    let mut candidate = PathBuf::from(extends);
    if candidate.extension().is_none() {
        candidate.set_extension("json");
    }
    if candidate.is_absolute() {
        Ok(candidate)
    } else {
        Ok(base_dir.join(candidate))
    }
}

fn merge_configs(base: TsbConfig, child: TsbConfig) -> TsbConfig {
    TsbConfig {
        extends: None,
        member_naming: child.member_naming.or(base.member_naming),
        reserved_word_marker: child.reserved_word_marker.or(base.reserved_word_marker),
        max_suffix_attempts: child.max_suffix_attempts.or(base.max_suffix_attempts),
        view_prefix: child.view_prefix.or(base.view_prefix),
        parallel: child.parallel.or(base.parallel),
        extra_flatten_exceptions: child
            .extra_flatten_exceptions
            .or(base.extra_flatten_exceptions),
    }
}

pub fn parse_options(source: &str) -> Result<PipelineOptions> {
    resolve_options(&parse_config(source)?)
}

pub fn load_options(path: &Path) -> Result<PipelineOptions> {
    let config = load_config(path)?;
    resolve_options(&config).with_context(|| format!("invalid config: {}", path.display()))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod config_tests;
