//! Single-shot `ripple` CLI: load a workspace document (from disk or one of
//! the bundled samples), optionally run one simulation, and print the
//! result as JSON. Each invocation owns one `Engine` for the
//! lifetime of the process; there is no cross-invocation state, which is
//! why `history` isn't a subcommand here, only on `ripple-server`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ripple::loader;
use ripple_engine::EffectModule;

#[derive(Parser)]
#[command(name = "ripple", version, arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a workspace document and print the load summary.
    Load(LoadArgs),
    /// Load a workspace, run one simulation, and print the result.
    LoadAndRun(LoadAndRunArgs),
    /// Load a workspace, reset it immediately, and print the graph.
    Reset(LoadArgs),
}

#[derive(Parser)]
struct LoadArgs {
    /// Path to a workspace JSON document.
    #[arg(long, conflicts_with = "sample")]
    file: Option<PathBuf>,

    /// Name of a bundled sample workspace (see `ripple-server`'s `/samples`).
    #[arg(long, conflicts_with = "file")]
    sample: Option<String>,

    /// Name of a statically linked custom effect module to register.
    #[arg(long)]
    effects: Option<String>,
}

#[derive(Parser)]
struct LoadAndRunArgs {
    #[command(flatten)]
    load: LoadArgs,

    /// Action ID to trigger.
    #[arg(long)]
    action: String,

    /// Target node ID the action runs against.
    #[arg(long)]
    node: String,
}

/// Resolves `--effects <name>` to a statically linked module, the same
/// convention `ripple-server`'s `?effects=` query parameter uses.
fn resolve_effect_module(name: &str) -> Option<&'static dyn EffectModule> {
    match name {
        "private_banking" | "private-banking-effects" => Some(&private_banking_effects::PrivateBankingEffects),
        _ => None,
    }
}

fn load_config(args: &LoadArgs) -> anyhow::Result<ripple_types::WorkspaceConfig> {
    match (&args.file, &args.sample) {
        (Some(path), _) => loader::load_workspace_file(path),
        (None, Some(name)) => loader::load_sample(name),
        (None, None) => anyhow::bail!("either --file or --sample is required"),
    }
}

fn build_engine(args: &LoadArgs) -> anyhow::Result<(ripple::Engine, ripple::LoadSummary)> {
    let config = load_config(args)?;

    let mut custom_modules: Vec<&dyn EffectModule> = Vec::new();
    if let Some(name) = args.effects.as_deref() {
        match resolve_effect_module(name) {
            Some(module) => custom_modules.push(module),
            None => tracing::warn!(effects = name, "requested custom effect module is not statically linked, ignoring"),
        }
    }

    let mut engine = ripple::Engine::new();
    let summary = engine.load_workspace(config, &custom_modules)?;
    Ok((engine, summary))
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    use std::io::Write;
    stdout.write_all(b"\n")?;
    Ok(())
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Load(args) => {
            let (_engine, summary) = build_engine(&args)?;
            print_json(&summary)?;
        }
        Commands::LoadAndRun(args) => {
            let (mut engine, _summary) = build_engine(&args.load)?;
            let result = engine.execute_action(&args.action, &args.node)?;
            print_json(&result)?;
        }
        Commands::Reset(args) => {
            let (mut engine, _summary) = build_engine(&args)?;
            let graph = engine.reset()?;
            print_json(&graph)?;
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt::init();
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
