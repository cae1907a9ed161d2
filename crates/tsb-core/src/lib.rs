//! Pipeline driver for the tsb declaration-surface engine.
//!
//! - [`config`]: JSON configuration with `extends`, resolved to [`PipelineOptions`]
//! - [`pipeline`]: structural passes, name reservation and the validation gate in one run
//! - [`validate`]: post-naming checks that block planning and emission
//! - [`surface`]: serializable snapshot of final names and emit scopes
//! - [`tracing_config`]: `TSB_LOG` subscriber setup

pub mod config;
pub mod pipeline;
pub mod surface;
pub mod tracing_config;
pub mod validate;

pub use config::{PipelineOptions, TsbConfig, load_config, load_options, parse_config, parse_options};
pub use pipeline::{ImportSet, Pipeline, PipelineOutput};
pub use surface::{MemberReport, NamespaceReport, SurfaceReport, TypeReport, ViewReport};
pub use tracing_config::{LogFormat, TracingSettings, init_tracing};
pub use validate::validate;

#[cfg(test)]
#[path = "tests/fixtures.rs"]
pub(crate) mod test_fixtures;
