//! File naming conventions for extension config
//!
//! Defaults:
//! - `{config}/extensions/{name}.{vendor}.yml` (primary)
//! - `{config}/extensions/{name}.{vendor}_local.yml` (local override)
//! - `{extensions}/{install path}/config.yml.dist` (bundled template)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::store::{CONFIG_AREA, EXTENSIONS_AREA};

/// Where config files live and how they are named
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigLayout {
    /// Area holding user config files (default: "config")
    pub config_area: String,

    /// Directory inside the config area for extension files (default: "extensions")
    pub extensions_dir: String,

    /// Area extensions are installed under (default: "extensions")
    pub extensions_area: String,

    /// Config file extension, without the dot (default: "yml")
    pub file_extension: String,

    /// Suffix inserted before the extension for the local override (default: "_local")
    pub local_suffix: String,

    /// Bundled template file name inside the install directory (default: "config.yml.dist")
    pub dist_file: String,
}

impl Default for ConfigLayout {
    fn default() -> Self {
        Self {
            config_area: CONFIG_AREA.to_string(),
            extensions_dir: "extensions".to_string(),
            extensions_area: EXTENSIONS_AREA.to_string(),
            file_extension: "yml".to_string(),
            local_suffix: "_local".to_string(),
            dist_file: "config.yml.dist".to_string(),
        }
    }
}

impl ConfigLayout {
    /// Base file name shared by the primary and local files: `{name}.{vendor}`
    pub fn base_name(&self, name: &str, vendor: &str) -> String {
        format!("{}.{}", name.to_lowercase(), vendor.to_lowercase())
    }

    /// Primary config path, relative to the config area
    pub fn primary_path(&self, name: &str, vendor: &str) -> PathBuf {
        Path::new(&self.extensions_dir).join(format!(
            "{}.{}",
            self.base_name(name, vendor),
            self.file_extension
        ))
    }

    /// Local override path for a given primary path (same directory).
    ///
    /// `extensions/seo.acme.yml` becomes `extensions/seo.acme_local.yml`.
    pub fn local_path(&self, primary: &Path) -> PathBuf {
        let stem = primary
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dotted = format!(".{}", self.file_extension);
        let stem = stem.strip_suffix(&dotted).unwrap_or(&stem);
        let file_name = format!("{}{}{}", stem, self.local_suffix, dotted);

        match primary.parent() {
            Some(parent) => parent.join(file_name),
            None => PathBuf::from(file_name),
        }
    }

    /// Bundled template path, relative to the extensions area
    pub fn dist_path(&self, install_relative: &Path) -> PathBuf {
        install_relative.join(&self.dist_file)
    }
}
