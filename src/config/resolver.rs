//! Layered extension config resolution
//!
//! Builds one merged document per extension from, in increasing precedence:
//! 1. Built-in defaults (`ExtensionInfo::default_config`)
//! 2. Primary file (`extensions/{name}.{vendor}.yml`), seeded from the
//!    bundled `config.yml.dist` when missing
//! 3. Local override (`extensions/{name}.{vendor}_local.yml`)
//!
//! The result is computed once per resolver and shared afterwards.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use extconf_merge::{as_document, merge_documents, ConfigDocument};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::layout::ConfigLayout;
use crate::extension::ExtensionInfo;
use crate::logger::{ConfigLogger, LogContext, TracingLogger};
use crate::parser::{DocumentParser, ParseError, YamlParser};
use crate::store::{DocumentStore, StoreError};

/// Origin of a configuration layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Default,
    Dist,
    Primary,
    Local,
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::Default => write!(f, "default"),
            ConfigOrigin::Dist => write!(f, "dist"),
            ConfigOrigin::Primary => write!(f, "primary"),
            ConfigOrigin::Local => write!(f, "local"),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolves and memoizes the merged config of one extension
pub struct LayeredConfigResolver<E> {
    extension: E,
    store: Arc<dyn DocumentStore>,
    parser: Arc<dyn DocumentParser>,
    logger: Arc<dyn ConfigLogger>,
    layout: ConfigLayout,
    cache: Mutex<Option<Arc<ConfigDocument>>>,
}

impl<E: ExtensionInfo> LayeredConfigResolver<E> {
    /// Create a resolver with the YAML parser, the tracing logger and the
    /// default file layout
    pub fn new(extension: E, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            extension,
            store,
            parser: Arc::new(YamlParser),
            logger: Arc::new(TracingLogger),
            layout: ConfigLayout::default(),
            cache: Mutex::new(None),
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn DocumentParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConfigLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_layout(mut self, layout: ConfigLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn extension(&self) -> &E {
        &self.extension
    }

    pub fn layout(&self) -> &ConfigLayout {
        &self.layout
    }

    /// Whether a merged config has been cached
    pub fn is_resolved(&self) -> bool {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Full path of the primary config file
    pub fn primary_path(&self) -> Result<PathBuf, ConfigError> {
        let relative = self
            .layout
            .primary_path(self.extension.name(), self.extension.vendor());
        Ok(self.store.path_in(&self.layout.config_area, &relative)?)
    }

    /// Full path of the local override file
    pub fn local_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.layout.local_path(&self.primary_path()?))
    }

    /// Full path of the bundled template, or `None` when the extension is
    /// installed outside the extensions area
    pub fn dist_path(&self) -> Result<Option<PathBuf>, ConfigError> {
        let area = &self.layout.extensions_area;
        let relative = match self.store.relative_to_area(area, self.extension.path()) {
            Ok(relative) => relative,
            Err(StoreError::OutsideArea { path, .. }) => {
                warn!(
                    path = %path.display(),
                    area = %area,
                    "Extension installed outside its area, no dist file"
                );
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let dist = self.store.path_in(area, &self.layout.dist_path(&relative))?;
        Ok(Some(dist))
    }

    /// Return the merged config, computing it on first use.
    ///
    /// The lock is held for the whole first resolution, so concurrent first
    /// callers share one result. A failed resolution caches nothing, not even
    /// the layers merged before the failure, so the next call re-reads every
    /// file instead of returning a partial config.
    pub fn resolve(&self) -> Result<Arc<ConfigDocument>, ConfigError> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(config) = cache.as_ref() {
            return Ok(Arc::clone(config));
        }

        let config = Arc::new(self.load()?);
        *cache = Some(Arc::clone(&config));
        Ok(config)
    }

    fn load(&self) -> Result<ConfigDocument, ConfigError> {
        let mut config = self.extension.default_config();
        debug!(
            extension = %self.extension.name(),
            origin = %ConfigOrigin::Default,
            keys = config.len(),
            "Seeded config"
        );

        let primary = self.primary_path()?;
        if !self.store.exists(&primary) {
            self.copy_dist_file(&primary)?;
        }
        self.add_config(&mut config, &primary, ConfigOrigin::Primary)?;

        let local = self.layout.local_path(&primary);
        if self.store.exists(&local) {
            self.add_config(&mut config, &local, ConfigOrigin::Local)?;
        }

        Ok(config)
    }

    /// Merge one file into `config`. A missing file is a no-op; a parse
    /// failure is reported on both log channels and returned.
    fn add_config(
        &self,
        config: &mut ConfigDocument,
        path: &Path,
        origin: ConfigOrigin,
    ) -> Result<(), ConfigError> {
        if !self.store.exists(path) {
            debug!(origin = %origin, path = %path.display(), "No config file");
            return Ok(());
        }

        let bytes = self.store.read(path)?;
        let value = match self.parser.parse(&bytes) {
            Ok(value) => value,
            Err(source) => {
                let err = ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                };
                let message = err.to_string();
                self.logger.flash_error(&message);
                self.logger
                    .system_error(&message, &LogContext::exception(&err));
                return Err(err);
            }
        };

        match as_document(value) {
            Some(document) => {
                debug!(
                    origin = %origin,
                    path = %path.display(),
                    digest = %sha256_hex(&bytes),
                    keys = document.len(),
                    "Merging config layer"
                );
                let base = std::mem::take(config);
                *config = merge_documents(base, document);
            }
            None => {
                debug!(
                    origin = %origin,
                    path = %path.display(),
                    "Config file has no top-level mapping, skipped"
                );
            }
        }

        Ok(())
    }

    /// Seed `target` with the extension's bundled template, if it ships one
    fn copy_dist_file(&self, target: &Path) -> Result<(), ConfigError> {
        let Some(dist) = self.dist_path()? else {
            return Ok(());
        };
        if !self.store.exists(&dist) {
            debug!(origin = %ConfigOrigin::Dist, path = %dist.display(), "No dist file");
            return Ok(());
        }

        let contents = self.store.read(&dist)?;
        self.store.write(target, &contents)?;
        self.logger.system_info(
            &format!("Copied {} to {}", dist.display(), target.display()),
            &LogContext::event("extensions"),
        );
        Ok(())
    }
}

impl<E: ExtensionInfo> fmt::Debug for LayeredConfigResolver<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayeredConfigResolver")
            .field("name", &self.extension.name())
            .field("vendor", &self.extension.vendor())
            .field("layout", &self.layout)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// SHA-256 of raw file bytes, hex encoded
fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::ExtensionManifest;
    use crate::logger::{Channel, Level, RecordingLogger};
    use crate::store::MemoryStore;
    use serde_yaml::Value;

    const PRIMARY: &str = "/srv/config/extensions/seo.acme.yml";
    const LOCAL: &str = "/srv/config/extensions/seo.acme_local.yml";
    const DIST: &str = "/srv/extensions/acme/seo/config.yml.dist";

    fn doc(yaml: &str) -> ConfigDocument {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_area("config", "/srv/config")
            .with_area("extensions", "/srv/extensions")
    }

    fn manifest(defaults: &str) -> ExtensionManifest {
        ExtensionManifest::new("Seo", "Acme", "/srv/extensions/acme/seo")
            .with_defaults(doc(defaults))
    }

    fn resolver(
        store: Arc<MemoryStore>,
        defaults: &str,
    ) -> (LayeredConfigResolver<ExtensionManifest>, Arc<RecordingLogger>) {
        let logger = Arc::new(RecordingLogger::new());
        let resolver = LayeredConfigResolver::new(manifest(defaults), store)
            .with_logger(logger.clone());
        (resolver, logger)
    }

    #[test]
    fn test_paths() {
        let (resolver, _) = resolver(Arc::new(store()), "{}");

        assert_eq!(resolver.primary_path().unwrap(), PathBuf::from(PRIMARY));
        assert_eq!(resolver.local_path().unwrap(), PathBuf::from(LOCAL));
        assert_eq!(resolver.dist_path().unwrap(), Some(PathBuf::from(DIST)));
    }

    #[test]
    fn test_missing_everything_returns_defaults() {
        let store = Arc::new(store());
        let (resolver, logger) = resolver(store.clone(), "title: Default\nlimit: 10");

        let config = resolver.resolve().unwrap();

        assert_eq!(*config, doc("title: Default\nlimit: 10"));
        assert_eq!(store.write_count(), 0);
        assert!(logger.records().is_empty());
    }

    #[test]
    fn test_primary_over_defaults() {
        let store = Arc::new(store().with_file(PRIMARY, "limit: 20\nextra: yes"));
        let (resolver, _) = resolver(store, "title: Default\nlimit: 10");

        let config = resolver.resolve().unwrap();

        assert_eq!(*config, doc("title: Default\nlimit: 20\nextra: yes"));
    }

    #[test]
    fn test_local_over_primary() {
        let store = Arc::new(
            store()
                .with_file(PRIMARY, "db: {host: prod, port: 5432}")
                .with_file(LOCAL, "db: {host: localhost}"),
        );
        let (resolver, _) = resolver(store, "db: {user: app}");

        let config = resolver.resolve().unwrap();

        assert_eq!(
            *config,
            doc("db: {user: app, host: localhost, port: 5432}")
        );
    }

    #[test]
    fn test_dist_bootstrap_copies_verbatim() {
        let dist = "# Seo settings\nx: 1\n";
        let store = Arc::new(store().with_file(DIST, dist));
        let (resolver, logger) = resolver(store.clone(), "y: 2");

        let config = resolver.resolve().unwrap();

        assert_eq!(*config, doc("y: 2\nx: 1"));
        assert_eq!(store.contents(Path::new(PRIMARY)).unwrap(), dist.as_bytes());

        let records = logger.on(Channel::System);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::Info);
        assert_eq!(records[0].message, format!("Copied {} to {}", DIST, PRIMARY));
        assert_eq!(records[0].context, Some(LogContext::event("extensions")));
    }

    #[test]
    fn test_existing_primary_is_not_overwritten_by_dist() {
        let store = Arc::new(
            store()
                .with_file(PRIMARY, "x: user")
                .with_file(DIST, "x: dist"),
        );
        let (resolver, _) = resolver(store.clone(), "{}");

        let config = resolver.resolve().unwrap();

        assert_eq!(config["x"], Value::from("user"));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_memoized_result_is_shared() {
        let store = Arc::new(store().with_file(PRIMARY, "x: 1").with_file(LOCAL, "y: 2"));
        let (resolver, _) = resolver(store.clone(), "{}");

        assert!(!resolver.is_resolved());
        let first = resolver.resolve().unwrap();
        let reads = store.read_count();

        // Changes on disk are not picked up once cached
        store.insert(PRIMARY, "x: 100");
        let second = resolver.resolve().unwrap();

        assert!(resolver.is_resolved());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.read_count(), reads);
        assert_eq!(second["x"], Value::from(1));
    }

    #[test]
    fn test_parse_failure_stops_resolution() {
        let store = Arc::new(
            store()
                .with_file(PRIMARY, "key: [unclosed\n")
                .with_file(LOCAL, "y: 2"),
        );
        let (resolver, logger) = resolver(store.clone(), "{}");

        let err = resolver.resolve().unwrap_err();

        assert!(matches!(err, ConfigError::Parse { ref path, .. } if path == Path::new(PRIMARY)));
        // Only the primary file was read
        assert_eq!(store.read_count(), 1);
        assert!(!resolver.is_resolved());

        let flash = logger.on(Channel::Flash);
        assert_eq!(flash.len(), 1);
        assert!(flash[0].message.contains(PRIMARY));

        let system = logger.on(Channel::System);
        assert_eq!(system.len(), 1);
        assert_eq!(system[0].level, Level::Error);
        assert_eq!(system[0].message, flash[0].message);
        let context = system[0].context.as_ref().unwrap();
        assert_eq!(context.event, "exception");
        assert!(context.exception.is_some());
    }

    #[test]
    fn test_parse_failure_in_local_override() {
        let store = Arc::new(
            store()
                .with_file(PRIMARY, "x: 1")
                .with_file(LOCAL, "x: [oops"),
        );
        let (resolver, logger) = resolver(store, "{}");

        let err = resolver.resolve().unwrap_err();

        assert!(err.to_string().contains(LOCAL));
        assert_eq!(logger.on(Channel::Flash).len(), 1);
    }

    #[test]
    fn test_failed_resolution_is_retried() {
        let store = Arc::new(store().with_file(PRIMARY, "x: [oops"));
        let (resolver, _) = resolver(store.clone(), "{}");

        assert!(resolver.resolve().is_err());
        store.insert(PRIMARY, "x: fixed");

        assert_eq!(resolver.resolve().unwrap()["x"], Value::from("fixed"));
    }

    #[test]
    fn test_non_mapping_documents_are_ignored() {
        let store = Arc::new(
            store()
                .with_file(PRIMARY, "- just\n- a list\n")
                .with_file(LOCAL, "plain scalar"),
        );
        let (resolver, logger) = resolver(store, "kept: true");

        let config = resolver.resolve().unwrap();

        assert_eq!(*config, doc("kept: true"));
        assert!(logger.records().is_empty());
    }

    #[test]
    fn test_empty_dist_yields_defaults() {
        let store = Arc::new(store().with_file(DIST, ""));
        let (resolver, _) = resolver(store.clone(), "a: 1");

        let config = resolver.resolve().unwrap();

        assert_eq!(*config, doc("a: 1"));
        assert!(store.contents(Path::new(PRIMARY)).unwrap().is_empty());
    }

    #[test]
    fn test_extension_outside_area_skips_dist() {
        let store = Arc::new(store());
        let extension = ExtensionManifest::new("Seo", "Acme", "/opt/bundles/seo");
        let resolver = LayeredConfigResolver::new(extension, store.clone());

        assert_eq!(resolver.dist_path().unwrap(), None);
        assert!(resolver.resolve().unwrap().is_empty());
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_relative_install_path() {
        let store = Arc::new(store().with_file(DIST, "x: 1"));
        let extension = ExtensionManifest::new("Seo", "Acme", "acme/seo");
        let resolver = LayeredConfigResolver::new(extension, store);

        assert_eq!(resolver.resolve().unwrap()["x"], Value::from(1));
    }

    #[test]
    fn test_unknown_area_is_an_error() {
        let store = Arc::new(MemoryStore::new());
        let (resolver, _) = resolver(store, "{}");

        let err = resolver.resolve().unwrap_err();
        assert!(matches!(err, ConfigError::Store(StoreError::UnknownArea(_))));
    }

    #[test]
    fn test_custom_layout() {
        let store = Arc::new(
            store()
                .with_file("/srv/config/ext/seo.acme.yaml", "x: 1")
                .with_file("/srv/config/ext/seo.acme.dev.yaml", "x: 2"),
        );
        let layout = ConfigLayout {
            extensions_dir: "ext".to_string(),
            file_extension: "yaml".to_string(),
            local_suffix: ".dev".to_string(),
            ..Default::default()
        };
        let (resolver, _) = resolver(store, "{}");
        let resolver = resolver.with_layout(layout);

        assert_eq!(resolver.resolve().unwrap()["x"], Value::from(2));
    }

    #[test]
    fn test_origin_display() {
        assert_eq!(ConfigOrigin::Primary.to_string(), "primary");
        assert_eq!(
            serde_json::to_string(&ConfigOrigin::Local).unwrap(),
            "\"local\""
        );
    }
}
