//! Tracing setup for debugging structural decisions.
//!
//! `TSB_LOG` (or `RUST_LOG` when it is unset) holds the filter directives;
//! `TSB_LOG_FORMAT` picks `text` (default), `tree` or `json` output.
//!
//! ```bash
//! TSB_LOG=debug TSB_LOG_FORMAT=tree cargo test -p tsb-core
//! TSB_LOG="tsb_shape::diamond=trace,tsb_names=debug" cargo test -p tsb-core
//! ```
//!
//! Nothing is installed when no filter is given. Output goes to stderr.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Tree,
    Json,
}

impl LogFormat {
    /// Unknown values fall back to [`LogFormat::Text`].
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Filter directives and output format for one subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingSettings {
    pub directives: Option<String>,
    pub format: LogFormat,
}

impl TracingSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; `TSB_LOG` wins over `RUST_LOG`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            directives: lookup("TSB_LOG").or_else(|| lookup("RUST_LOG")),
            format: lookup("TSB_LOG_FORMAT")
                .map(|value| LogFormat::parse(&value))
                .unwrap_or(LogFormat::Text),
        }
    }

    /// Install the global subscriber. Returns `false` when there is nothing
    /// to install or another subscriber is already in place.
    pub fn install(&self) -> bool {
        let Some(directives) = &self.directives else {
            return false;
        };
        let filter = EnvFilter::builder().parse_lossy(directives);
        let installed = match self.format {
            LogFormat::Tree => {
                let tree = tracing_tree::HierarchicalLayer::default()
                    .with_indent_amount(2)
                    .with_indent_lines(true)
                    .with_deferred_spans(true)
                    .with_span_retrace(true)
                    .with_targets(true);
                Registry::default().with(filter).with(tree).try_init().is_ok()
            }
            LogFormat::Json => {
                let json = fmt::layer().json().with_writer(std::io::stderr);
                Registry::default().with(filter).with(json).try_init().is_ok()
            }
            LogFormat::Text => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .is_ok(),
        };
        installed
    }
}

/// Install the subscriber described by the environment, if any.
pub fn init_tracing() {
    TracingSettings::from_env().install();
}
