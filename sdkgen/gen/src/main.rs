//! sdkgen
//!
//! Generates a typed REST client crate from a schema description.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sdkgen_define::parse_file;
use sdkgen_gen::errors::GeneratorError;
use sdkgen_gen::options::{EmitOptions, OutputMode, RuntimeDependency};
use sdkgen_gen::output::{generate, generate_and_write};
use sdkgen_gen::report::render_failure;
use tracing::info;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// sdkgen - turns a schema description into a typed REST client crate
#[derive(Parser, Debug)]
#[command(name = "sdkgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Schema description file (.json, .yaml or .yml)
    #[arg(short, long)]
    schema: PathBuf,

    /// Output directory for the generated crate
    #[arg(short, long, default_value = "sdk-client")]
    output: PathBuf,

    /// Emit source only, or also build a loadable library
    #[arg(long, value_enum, default_value_t = OutputMode::Source)]
    mode: OutputMode,

    /// Emit even when unsupported schema features are present
    #[arg(long)]
    force: bool,

    /// Parse every generated file and fail on any diagnostic
    #[arg(long)]
    strict_check: bool,

    /// Write the schema description as read to <output>/schema.json
    #[arg(long)]
    debug: bool,

    /// Mark the crate as compatible with the downstream UI toolkit
    #[arg(long)]
    ui_compat: bool,

    /// Leave unsupported features out instead of emitting compile errors
    #[arg(long)]
    skip_unsupported: bool,

    /// Package name of the generated crate
    #[arg(long, default_value = "sdk-client")]
    name: String,

    /// Depend on a local sdkgen-runtime checkout instead of the registry
    #[arg(long, conflicts_with = "runtime_version")]
    runtime_path: Option<PathBuf>,

    /// Registry version requirement for sdkgen-runtime
    #[arg(long, default_value = "0.1")]
    runtime_version: String,

    /// Print the generated files without writing them
    #[arg(long)]
    dry_run: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> EmitOptions {
        let runtime = match &self.runtime_path {
            Some(path) => RuntimeDependency::Path(path.clone()),
            None => RuntimeDependency::Version(self.runtime_version.clone()),
        };
        EmitOptions {
            include_unsupported_as_errors: !self.skip_unsupported,
            strict_compile_check: self.strict_check,
            force: self.force,
            debug: self.debug,
            ui_compat: self.ui_compat,
            crate_name: self.name.clone(),
            runtime,
            ..EmitOptions::default()
        }
        .with_mode(self.mode)
    }
}

fn init_tracing(verbose: u8) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,sdkgen_gen=info".to_string(),
            2 => "info,sdkgen_gen=debug,sdkgen_define=debug".to_string(),
            _ => "debug,sdkgen_gen=trace,sdkgen_define=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(verbose >= 3)
                .with_line_number(verbose >= 3)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn run(cli: &Cli) -> Result<(), GeneratorError> {
    let model = parse_file(&cli.schema)?;
    info!(schema = %model.name, entities = model.entities.len(), "parsed schema");
    let options = cli.options();

    if cli.dry_run {
        let client = generate(&model, &options)?;
        for file in &client.files {
            println!("=== {} ===\n{}\n", file.path.display(), file.contents);
        }
        return Ok(());
    }

    let report = generate_and_write(&model, &cli.output, &options)?;
    print!("{}", report.render());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprint!("{}", render_failure(&e));
            ExitCode::FAILURE
        }
    }
}
