//! Extension Config - layered YAML configuration for extensions
//!
//! This crate resolves the configuration of an installed extension from its
//! built-in defaults, a user config file (seeded from the extension's bundled
//! `config.yml.dist` on first use) and an optional local override file.

pub mod config;
pub mod extension;
pub mod logger;
pub mod logging;
pub mod parser;
pub mod settings;
pub mod store;

pub use config::{ConfigDocument, ConfigError, ConfigLayout, ConfigOrigin, LayeredConfigResolver};
pub use extension::{ExtensionInfo, ExtensionManifest};
pub use logger::{ConfigLogger, LogContext, RecordingLogger, TracingLogger};
pub use parser::{DocumentParser, ParseError, YamlParser};
pub use settings::Settings;
pub use store::{DocumentStore, FsStore, MemoryStore, StoreError};
