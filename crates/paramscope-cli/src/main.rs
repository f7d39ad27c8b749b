use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use paramscope_core::{write_catalog, CatalogBuilder};
use paramscope_dts::flatten_exports;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod diagnostic;

use config::{manifest_folder, ParamscopeConfig};
use diagnostic::report_error;

#[derive(Parser, Debug)]
#[command(
    name = "paramscope",
    version,
    about = "Extract constructor-parameter schemas from TypeScript declaration files"
)]
struct Cli {
    /// Enable verbose debug logging (or set PARAMSCOPE_LOG=debug)
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build every configured catalog (materials and geometries by default)
    Build {
        /// Configuration file (default: ./paramscope.toml when present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// three.js source tree used when no catalogs are configured
        #[arg(long, default_value = "node_modules/three/src")]
        three_src: PathBuf,
        /// Output directory (overrides the configured one)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Build a single catalog from a manifest file
    Catalog {
        /// Manifest (barrel) file listing the entities
        manifest: PathBuf,
        /// Folder holding the entity declaration files (default: the manifest's folder)
        #[arg(long)]
        base: Option<PathBuf>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Strip `export` modifiers from a declaration file
    Flatten {
        /// Declaration file to flatten
        file: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(debug: bool) {
    // PARAMSCOPE_LOG wins unless --debug is given; default is "info"
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("PARAMSCOPE_LOG").unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(false)
                .with_target(true)
                .with_level(true),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match cli.command {
        Command::Build {
            config,
            three_src,
            out_dir,
        } => run_build(config.as_deref(), &three_src, out_dir.as_deref()),
        Command::Catalog {
            manifest,
            base,
            output,
        } => run_catalog(&manifest, base.as_deref(), output.as_deref()),
        Command::Flatten { file, output } => run_flatten(&file, output.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn run_build(config_path: Option<&Path>, three_src: &Path, out_dir: Option<&Path>) -> Result<()> {
    let mut config = match config_path {
        Some(path) => ParamscopeConfig::load_from_path(path)?,
        None => ParamscopeConfig::load()?.unwrap_or_default(),
    };
    if config.catalog.is_empty() {
        debug!(three_src = %three_src.display(), "no catalogs configured, using three.js defaults");
        config.catalog = ParamscopeConfig::three_defaults(three_src).catalog;
    }

    let out_dir = out_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(config.options.output_dir()));
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let builder = CatalogBuilder::new().declaration_suffix(config.options.declaration_suffix());
    for entry in &config.catalog {
        // The output file is only truncated once the catalog is complete.
        let catalog = builder.build(&entry.manifest_path(), &entry.base_dir())?;

        let out_path = out_dir.join(entry.output_file());
        let file = fs::File::create(&out_path)
            .with_context(|| format!("failed to create {}", out_path.display()))?;
        write_catalog(&catalog, BufWriter::new(file))
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        info!(
            catalog = %entry.name,
            entities = catalog.len(),
            path = %out_path.display(),
            "wrote catalog"
        );
    }
    Ok(())
}

fn run_catalog(manifest: &Path, base: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let base = base
        .map(Path::to_path_buf)
        .unwrap_or_else(|| manifest_folder(manifest));
    let catalog = CatalogBuilder::new().build(manifest, &base)?;

    match output {
        Some(path) => {
            let file = fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_catalog(&catalog, BufWriter::new(file))
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(entities = catalog.len(), path = %path.display(), "wrote catalog");
        }
        None => write_catalog(&catalog, io::stdout().lock()).context("failed to write catalog")?,
    }
    Ok(())
}

fn run_flatten(path: &Path, output: Option<&Path>) -> Result<()> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let flattened = flatten_exports(&content);

    match output {
        Some(out) => {
            fs::write(out, &flattened)
                .with_context(|| format!("failed to write {}", out.display()))?;
            debug!(path = %out.display(), "wrote flattened declarations");
        }
        None => io::stdout()
            .lock()
            .write_all(flattened.as_bytes())
            .context("failed to write to stdout")?,
    }
    Ok(())
}
