use crate::config::GeneratorConfig;
use crate::generator::{
    assemble, schema_file_name, write_schema, FieldLayout, ProtocCompiler, SchemaCompiler,
    ServiceDescriptor, WellKnownTypes,
};
use crate::manifest::ServiceManifest;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Command-line interface for protoroot
///
/// Derives proto3 schemas from service manifests and optionally runs the
/// schema compiler on the result.
#[derive(Parser, Debug)]
#[command(name = "protoroot-gen", version)]
#[command(about = "Derive proto3 schemas from handler manifests", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the schema file for a manifest
    Generate {
        /// Path to the service manifest (YAML or JSON)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Generator config file (YAML, TOML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory; overrides the config and PROTOROOT_OUT_DIR
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Field line layout; overrides the config
        #[arg(long, value_enum)]
        layout: Option<Layout>,

        /// Print the schema to stdout instead of writing it
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Run the schema compiler on the written file
        #[arg(long, default_value_t = false, conflicts_with = "dry_run")]
        compile: bool,
    },
    /// Print handlers and discovered records as JSON
    Describe {
        /// Path to the service manifest (YAML or JSON)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Generator config file (YAML, TOML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Field line layout selectable on the command line
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Layout {
    /// `name wireType = ordinal;`
    NameFirst,
    /// `wireType name = ordinal;`
    TypeFirst,
}

impl From<Layout> for FieldLayout {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::NameFirst => FieldLayout::NameFirst,
            Layout::TypeFirst => FieldLayout::TypeFirst,
        }
    }
}

/// Parse the process arguments and execute the command, printing to stdout.
///
/// # Errors
///
/// Returns an error if:
/// - The manifest or config cannot be read or parsed
/// - A handler or record cannot be resolved
/// - The schema cannot be written
/// - The schema compiler fails
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    run(cli, &mut stdout.lock())
}

/// Execute `cli`, writing command output to `out`.
pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    match cli.command {
        Commands::Generate {
            manifest,
            config,
            out: out_dir,
            layout,
            dry_run,
            compile,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(dir) = out_dir {
                config.output_dir = dir;
            }
            if let Some(layout) = layout {
                config.field_layout = layout.into();
            }
            let well_known = config.well_known_types();
            let service = load_service(&manifest, &well_known)?;
            let text = assemble(&service, &config.assembler_options(&well_known))?;

            if dry_run {
                info!(
                    file = %schema_file_name(&service.info.name),
                    "Dry run, schema not written"
                );
                out.write_all(text.as_bytes())?;
                return Ok(());
            }

            let path = write_schema(&config.output_dir, &service.info.name, &text)?;
            writeln!(out, "{}", path.display())?;

            if compile {
                let output = ProtocCompiler::from_config(&config.compiler).compile(&path)?;
                out.write_all(output.stdout.as_bytes())?;
            }
            Ok(())
        }
        Commands::Describe { manifest, config } => {
            let config = load_config(config.as_deref())?;
            let well_known = config.well_known_types();
            let service = load_service(&manifest, &well_known)?;
            let handlers = service
                .handlers
                .iter()
                .map(|h| {
                    json!({
                        "name": h.name,
                        "method": h.method,
                        "route": h.route,
                        "request": h.request.name,
                        "response": h.response.name,
                        "permissions": h.permission_claims,
                    })
                })
                .collect::<Vec<_>>();
            let document = json!({
                "service": service.info,
                "package": service.info.package(),
                "handlers": handlers,
                "records": service.records,
            });
            serde_json::to_writer_pretty(&mut *out, &document)?;
            writeln!(out)?;
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    let mut config = match path {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    config.apply_env();
    Ok(config)
}

fn load_service(path: &Path, well_known: &WellKnownTypes) -> Result<ServiceDescriptor> {
    let manifest = ServiceManifest::load(path)?;
    manifest
        .service_descriptor(well_known)
        .with_context(|| format!("failed to resolve manifest {}", path.display()))
}
