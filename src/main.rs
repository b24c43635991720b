//! Extension Config CLI
//!
//! Entry point for the `extconf` command-line tool.

use clap::{Args, Parser, Subcommand};
use extension_config::config::{as_document, merge_layers};
use extension_config::logging::init_logging;
use extension_config::settings::DEFAULT_SETTINGS_FILE;
use extension_config::store::{absolute_path, CONFIG_AREA, EXTENSIONS_AREA};
use extension_config::{
    ConfigDocument, ConfigError, DocumentParser, DocumentStore, ExtensionManifest, FsStore,
    LayeredConfigResolver, Settings, YamlParser,
};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "extconf")]
#[command(about = "Inspect layered extension configuration", version)]
struct Cli {
    /// Path to settings file (default: ./extconf.toml)
    #[arg(long, short = 's', global = true)]
    settings: Option<PathBuf>,

    /// Root of the config area (overrides settings)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Root of the extensions area (overrides settings)
    #[arg(long, global = true)]
    extensions_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Identifies the extension to resolve
#[derive(Args)]
struct ExtensionArgs {
    /// Extension name
    #[arg(long)]
    name: String,

    /// Extension vendor
    #[arg(long)]
    vendor: String,

    /// Install path of the extension (absolute, or relative to the working directory)
    #[arg(long)]
    path: PathBuf,
}

impl ExtensionArgs {
    fn into_manifest(self) -> ExtensionManifest {
        ExtensionManifest::new(self.name, self.vendor, absolute_path(&self.path))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and print an extension's merged config
    Show {
        #[command(flatten)]
        extension: ExtensionArgs,

        /// YAML file with built-in defaults
        #[arg(long)]
        defaults: Option<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show where an extension's config files live
    Paths {
        #[command(flatten)]
        extension: ExtensionArgs,
    },

    /// Deep-merge YAML files in order (later files win)
    Merge {
        /// Files to merge
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let settings = match load_settings(&cli) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(&settings.logging) {
        eprintln!("Error initializing logging: {}", e);
        process::exit(1);
    }

    match cli.command {
        Commands::Show {
            extension,
            defaults,
            json,
        } => {
            run_show(&settings, extension, defaults, json);
        }
        Commands::Paths { extension } => {
            run_paths(&settings, extension);
        }
        Commands::Merge { files, json } => {
            run_merge(&files, json);
        }
    }
}

fn load_settings(cli: &Cli) -> Result<Settings, String> {
    let mut settings = match &cli.settings {
        Some(path) => Settings::load(path),
        None => Settings::load_or_default(Path::new(DEFAULT_SETTINGS_FILE)),
    }
    .map_err(|e| e.to_string())?;

    if let Some(dir) = &cli.config_dir {
        settings.set_area(CONFIG_AREA, dir.clone());
    }
    if let Some(dir) = &cli.extensions_dir {
        settings.set_area(EXTENSIONS_AREA, dir.clone());
    }

    Ok(settings)
}

fn build_resolver(
    settings: &Settings,
    store: Arc<FsStore>,
    extension: ExtensionManifest,
) -> LayeredConfigResolver<ExtensionManifest> {
    LayeredConfigResolver::new(extension, store).with_layout(settings.layout.clone())
}

fn fs_store(settings: &Settings) -> Arc<FsStore> {
    Arc::new(FsStore::from_areas(settings.areas.clone()))
}

fn run_show(settings: &Settings, args: ExtensionArgs, defaults: Option<PathBuf>, json: bool) {
    let mut extension = args.into_manifest();

    if let Some(path) = defaults {
        match load_document(&path) {
            Ok(Some(doc)) => extension = extension.with_defaults(doc),
            Ok(None) => {
                eprintln!("Defaults file has no top-level mapping: {}", path.display());
                process::exit(1);
            }
            Err(e) => {
                eprintln!("Error loading defaults: {}", e);
                process::exit(1);
            }
        }
    }

    let resolver = build_resolver(settings, fs_store(settings), extension);
    match resolver.resolve() {
        Ok(config) => print_document(&config, json),
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    }
}

fn run_paths(settings: &Settings, args: ExtensionArgs) {
    let extension = args.into_manifest();
    let store = fs_store(settings);
    let resolver = build_resolver(settings, store.clone(), extension);

    let (primary, local, dist) = match config_paths(&resolver) {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    let mark = |path: &Path| if store.exists(path) { "✓" } else { "✗" };

    println!("Configuration paths:");
    println!();
    println!("  Primary: {} {}", mark(&primary), primary.display());
    println!("  Local:   {} {}", mark(&local), local.display());
    match dist {
        Some(dist) => println!("  Dist:    {} {}", mark(&dist), dist.display()),
        None => println!("  Dist:    (extension installed outside the extensions area)"),
    }
}

fn config_paths(
    resolver: &LayeredConfigResolver<ExtensionManifest>,
) -> Result<(PathBuf, PathBuf, Option<PathBuf>), ConfigError> {
    Ok((
        resolver.primary_path()?,
        resolver.local_path()?,
        resolver.dist_path()?,
    ))
}

fn run_merge(files: &[PathBuf], json: bool) {
    let mut layers: Vec<ConfigDocument> = Vec::new();

    for path in files {
        match load_document(path) {
            Ok(Some(doc)) => layers.push(doc),
            Ok(None) => {}
            Err(e) => {
                eprintln!("Error loading {}: {}", path.display(), e);
                process::exit(1);
            }
        }
    }

    print_document(&merge_layers(layers), json);
}

/// Read and parse a YAML file; `None` if it has no top-level mapping
fn load_document(path: &Path) -> Result<Option<ConfigDocument>, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    let value = YamlParser.parse(&bytes).map_err(|e| e.to_string())?;
    Ok(as_document(value))
}

fn print_document(doc: &ConfigDocument, json: bool) {
    let rendered = if json {
        serde_json::to_string_pretty(doc).map_err(|e| e.to_string())
    } else {
        serde_yaml::to_string(doc).map_err(|e| e.to_string())
    };

    match rendered {
        Ok(text) => println!("{}", text.trim_end()),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}
