use agentlint_graph::{
    render_chain, Builtins, ChainTracer, CycleDetector, GraphBuilder, Linter, NodeId,
};
use agentlint_indexer::{ComponentIndex, FileScanner};
use agentlint_protocol::{report_schema, serialize_json_pretty, ComponentKind};
use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use config::Config;
use report::OutputFormat;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

mod config;
mod report;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "agentlint")]
#[command(about = "Cross-reference linter for agent, skill and command definitions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every reference and report diagnostics
    Check(CheckArgs),

    /// List delegation and usage cycles
    Cycles(RootArgs),

    /// Show what a component pulls in, as a tree
    Trace(TraceArgs),

    /// Print the JSON Schema of the check report
    Schema,
}

#[derive(Args)]
struct RootArgs {
    /// Directory holding agents/, skills/ and commands/ (defaults to current directory)
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Config file (defaults to <ROOT>/agentlint.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct CheckArgs {
    #[command(flatten)]
    root: RootArgs,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Args)]
struct TraceArgs {
    /// Component to start from, as kind:name (e.g. command:deploy)
    target: String,

    #[command(flatten)]
    root: RootArgs,

    /// Print the tree as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Check(args) => run_check(args),
        Commands::Cycles(args) => run_cycles(args),
        Commands::Trace(args) => run_trace(args),
        Commands::Schema => {
            print_stdout(&serialize_json_pretty(&report_schema()?)?)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Everything a command needs after discovery.
struct Workspace {
    root: PathBuf,
    config: Config,
    index: ComponentIndex,
}

impl Workspace {
    fn load(args: &RootArgs) -> Result<Self> {
        let root = args.root.clone();
        if !root.is_dir() {
            return Err(anyhow!("Root {} is not a directory", root.display()));
        }
        let config = Config::load(&root, args.config.as_deref())?;
        let files = FileScanner::new(&root)
            .with_excludes(&config.exclude)
            .context("Invalid exclude pattern")?
            .scan()
            .with_context(|| format!("Failed to scan {}", root.display()))?;
        let index = ComponentIndex::from_discovered(files);
        log::info!(
            "Indexed {} agents, {} skills, {} commands",
            index.count(ComponentKind::Agent),
            index.count(ComponentKind::Skill),
            index.count(ComponentKind::Command)
        );
        Ok(Self {
            root,
            config,
            index,
        })
    }

    fn builtins(&self) -> Builtins {
        Builtins::with_extra(self.config.builtin_agents.iter().cloned())
    }

    fn root_label(&self) -> String {
        self.root.display().to_string()
    }
}

fn run_check(args: CheckArgs) -> Result<ExitCode> {
    let workspace = Workspace::load(&args.root)?;
    let fail_on = workspace.config.fail_on()?;
    let builtins = workspace.builtins();

    let outcome = Linter::new(
        &workspace.index,
        &builtins,
        workspace.config.check_options(),
    )
    .run(&workspace.root_label());

    print_stdout(&report::render_report(&outcome.report, args.format)?)?;

    if outcome.report.has_at_least(fail_on) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_cycles(args: RootArgs) -> Result<ExitCode> {
    let workspace = Workspace::load(&args)?;
    let graph = GraphBuilder::new().build(&workspace.index);
    let cycles = CycleDetector::new(&graph).find_cycles();

    print_stdout(&report::render_cycles(&cycles))?;

    if cycles.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn run_trace(args: TraceArgs) -> Result<ExitCode> {
    let target = NodeId::parse(&args.target).ok_or_else(|| {
        anyhow!(
            "Invalid target '{}': expected kind:name with kind agent, skill or command",
            args.target
        )
    })?;
    let workspace = Workspace::load(&args.root)?;

    let chain = ChainTracer::new(&workspace.index)
        .trace(target.kind, &target.name)
        .ok_or_else(|| {
            anyhow!(
                "Component {target} not found under {}",
                workspace.root_label()
            )
        })?;

    if args.json {
        print_stdout(&serialize_json_pretty(&chain)?)?;
    } else {
        print_stdout(render_chain(&chain).trim_end())?;
    }
    Ok(ExitCode::SUCCESS)
}
