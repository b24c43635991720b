//! Extension configuration
//!
//! Resolves an extension's config from three layers:
//! 1. Built-in defaults supplied by the extension
//! 2. Primary file (`extensions/{name}.{vendor}.yml`), bootstrapped from the
//!    extension's `config.yml.dist` on first use
//! 3. Local override (`extensions/{name}.{vendor}_local.yml`)
//!
//! Mappings deep-merge by key; every other value is replaced by the
//! higher-precedence layer.

mod layout;
mod resolver;

pub use extconf_merge::{as_document, merge_documents, merge_layers, merge_values, ConfigDocument};
pub use layout::ConfigLayout;
pub use resolver::{ConfigError, ConfigOrigin, LayeredConfigResolver};
