//! Test fixtures for on-disk resolution
//!
//! Builds a throwaway tree with the two standard areas:
//! - `<tmp>/config/extensions/` for user config files
//! - `<tmp>/extensions/acme/seo/` as the install directory of one extension

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use extension_config::{ConfigDocument, ExtensionManifest, FsStore};
use tempfile::TempDir;

pub const NAME: &str = "Seo";
pub const VENDOR: &str = "Acme";

/// Temporary config and extensions areas
pub struct Sandbox {
    temp: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("config")).unwrap();
        fs::create_dir_all(temp.path().join("extensions/acme/seo")).unwrap();
        Self { temp }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root().join("config")
    }

    pub fn extensions_dir(&self) -> PathBuf {
        self.root().join("extensions")
    }

    pub fn install_dir(&self) -> PathBuf {
        self.extensions_dir().join("acme/seo")
    }

    pub fn primary_path(&self) -> PathBuf {
        self.config_dir().join("extensions/seo.acme.yml")
    }

    pub fn local_path(&self) -> PathBuf {
        self.config_dir().join("extensions/seo.acme_local.yml")
    }

    pub fn dist_path(&self) -> PathBuf {
        self.install_dir().join("config.yml.dist")
    }

    pub fn store(&self) -> Arc<FsStore> {
        Arc::new(
            FsStore::new()
                .with_area("config", self.config_dir())
                .with_area("extensions", self.extensions_dir()),
        )
    }

    pub fn manifest(&self, defaults: &str) -> ExtensionManifest {
        ExtensionManifest::new(NAME, VENDOR, self.install_dir()).with_defaults(doc(defaults))
    }

    pub fn write_primary(&self, contents: &str) {
        write(&self.primary_path(), contents);
    }

    pub fn write_local(&self, contents: &str) {
        write(&self.local_path(), contents);
    }

    pub fn write_dist(&self, contents: &str) {
        write(&self.dist_path(), contents);
    }
}

/// Parse a YAML mapping literal
pub fn doc(yaml: &str) -> ConfigDocument {
    serde_yaml::from_str(yaml).unwrap()
}

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}
