use clap::{Parser, Subcommand};
use hv_core::StateIndex;
use hv_results::{StoreError, load_manifest, load_model, save_model};
use hv_sim::{HarvesterConfig, ResultTable, SimError, UnifiedModel};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Sim(#[from] SimError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid expression argument '{0}' (expected name=expression)")]
    BadExpr(String),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "hv-cli")]
#[command(about = "Harvester CLI - solve and inspect electromechanical harvester models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a harvester config parses and builds
    Check {
        /// Path to the harvester YAML file
        config_path: PathBuf,
    },
    /// Solve a harvester config
    Solve {
        /// Path to the harvester YAML file
        config_path: PathBuf,
        /// Save the solved model to this (new) directory
        #[arg(long)]
        save: Option<PathBuf>,
        /// Derived signal to export, as name=expression (repeatable)
        #[arg(short, long = "expr")]
        exprs: Vec<String>,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show a saved model
    Show {
        /// Directory written by `solve --save`
        model_dir: PathBuf,
    },
    /// Export derived signals from a saved model
    Export {
        /// Directory written by `solve --save`
        model_dir: PathBuf,
        /// Derived signal to export, as name=expression (repeatable)
        #[arg(short, long = "expr", required = true)]
        exprs: Vec<String>,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { config_path } => cmd_check(&config_path),
        Commands::Solve {
            config_path,
            save,
            exprs,
            output,
        } => cmd_solve(&config_path, save.as_deref(), &exprs, output.as_deref()),
        Commands::Show { model_dir } => cmd_show(&model_dir),
        Commands::Export {
            model_dir,
            exprs,
            output,
        } => {
            let model = load_model(&model_dir)?;
            export(&model, &exprs, output.as_deref())
        }
    }
}

fn cmd_check(config_path: &Path) -> CliResult<()> {
    let config = HarvesterConfig::from_path(config_path)?;
    config.build()?;
    println!("✓ Config is valid");
    Ok(())
}

fn cmd_solve(
    config_path: &Path,
    save: Option<&Path>,
    exprs: &[String],
    output: Option<&Path>,
) -> CliResult<()> {
    let config = HarvesterConfig::from_path(config_path)?;
    info!(
        config = %config_path.display(),
        t_start = config.solve.t_start,
        t_end = config.solve.t_end,
        method = %config.solve.method,
        "solving"
    );

    let started = Instant::now();
    let model = config.run()?;
    eprintln!("✓ Solved in {:.3}s", started.elapsed().as_secs_f64());
    print_summary(&model);

    if let Some(dir) = save {
        let manifest = save_model(dir, &model)?;
        eprintln!("✓ Saved to {} ({})", dir.display(), manifest.model_id);
    }
    if !exprs.is_empty() {
        export(&model, exprs, output)?;
    }
    Ok(())
}

fn cmd_show(model_dir: &Path) -> CliResult<()> {
    let manifest = load_manifest(model_dir)?;
    let model = load_model(model_dir)?;

    println!("Model: {}", model_dir.display());
    println!("  Format version: {}", manifest.format_version);
    println!("  Saved at: {}", manifest.saved_at);
    println!("  Model id: {}", manifest.model_id);
    println!("  Fields: {}", manifest.fields.join(", "));
    let pipelines: Vec<&str> = model.post_processing_pipeline().names().collect();
    if !pipelines.is_empty() {
        println!("  Pipelines: {}", pipelines.join(", "));
    }
    print_summary(&model);
    Ok(())
}

fn print_summary(model: &UnifiedModel) {
    let (Some(time), Some(solution)) = (model.time(), model.raw_solution()) else {
        println!("  Not solved");
        return;
    };
    println!("  Time points: {}", time.len());
    if let (Some(first), Some(last)) = (time.first(), time.last()) {
        println!("  Time range: {:.4} - {:.4} s", first, last);
    }
    if let Some(final_state) = solution.column(solution.n_samples().saturating_sub(1)) {
        println!("  Final state:");
        for idx in StateIndex::ALL {
            println!("    {} = {:.6e}", idx.symbol(), final_state.get(idx));
        }
    }
}

fn parse_exprs(exprs: &[String]) -> CliResult<Vec<(&str, &str)>> {
    exprs
        .iter()
        .map(|arg| {
            arg.split_once('=')
                .map(|(name, expr)| (name.trim(), expr.trim()))
                .filter(|(name, expr)| !name.is_empty() && !expr.is_empty())
                .ok_or_else(|| CliError::BadExpr(arg.clone()))
        })
        .collect()
}

fn export(model: &UnifiedModel, exprs: &[String], output: Option<&Path>) -> CliResult<()> {
    let pairs = parse_exprs(exprs)?;
    let table = model.get_result(&pairs)?;
    let csv = to_csv(&table);
    match output {
        Some(path) => {
            std::fs::write(path, csv)?;
            eprintln!("✓ Wrote {} rows to {}", table.n_rows(), path.display());
        }
        None => io::stdout().write_all(csv.as_bytes())?,
    }
    Ok(())
}

fn to_csv(table: &ResultTable) -> String {
    let mut out = table.names().collect::<Vec<_>>().join(",");
    out.push('\n');
    let columns: Vec<&[f64]> = table.iter().map(|(_, v)| v).collect();
    for row in 0..table.n_rows() {
        let line: Vec<String> = columns.iter().map(|c| format!("{:e}", c[row])).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}
