//! Extension metadata
//!
//! The resolver only needs an extension's identity, its install location and
//! an optional set of built-in defaults. Hosts implement `ExtensionInfo` on
//! their own extension type, or use `ExtensionManifest`.

use std::path::{Path, PathBuf};

use extconf_merge::ConfigDocument;

/// Capabilities the resolver needs from the owning extension
pub trait ExtensionInfo: Send + Sync {
    /// Extension name (lowercased for file naming)
    fn name(&self) -> &str;

    /// Vendor name (lowercased for file naming)
    fn vendor(&self) -> &str;

    /// Install location, absolute or relative to the extensions area
    fn path(&self) -> &Path;

    /// Built-in defaults, used in the absence of any config file.
    ///
    /// Override to provide defaults; the base layer is empty otherwise.
    fn default_config(&self) -> ConfigDocument {
        ConfigDocument::new()
    }
}

/// Plain extension description
#[derive(Debug, Clone)]
pub struct ExtensionManifest {
    pub name: String,
    pub vendor: String,
    pub path: PathBuf,
    pub defaults: ConfigDocument,
}

impl ExtensionManifest {
    pub fn new(
        name: impl Into<String>,
        vendor: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            vendor: vendor.into(),
            path: path.into(),
            defaults: ConfigDocument::new(),
        }
    }

    /// Set the built-in defaults
    pub fn with_defaults(mut self, defaults: ConfigDocument) -> Self {
        self.defaults = defaults;
        self
    }
}

impl ExtensionInfo for ExtensionManifest {
    fn name(&self) -> &str {
        &self.name
    }

    fn vendor(&self) -> &str {
        &self.vendor
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn default_config(&self) -> ConfigDocument {
        self.defaults.clone()
    }
}
