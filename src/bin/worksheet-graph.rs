//! Draw print-quality graphs for worksheets.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use worksheet_kit::graph::presets;
use worksheet_kit::{GraphRenderer, GraphSpec, GraphStyle};

const AFTER_HELP: &str = r#"EXAMPLES:
  # Distance-from-home motion graph, points A-G
  worksheet-graph motion

  # y = 2x - 1 for x = 0..6
  worksheet-graph linear --slope 2 --intercept=-1 --x-max 6

  # Any graph described in JSON
  worksheet-graph spec my_graph.json --output-dir assets/graphs/grade-8
"#;

/// Render annotated graphs as verified high-DPI PNGs.
#[derive(Parser, Debug)]
#[command(
    name = "worksheet-graph",
    version,
    about = "Render annotated worksheet graphs as verified high-DPI PNGs",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    graph: GraphCommand,

    /// Directory the PNG is written to.
    #[arg(long, global = true, env = "WORKSHEET_GRAPH_DIR", default_value = "assets/graphs")]
    output_dir: PathBuf,

    /// Override the output file name.
    #[arg(long, global = true)]
    filename: Option<String>,

    /// Rendering resolution.
    #[arg(long, global = true, env = "WORKSHEET_GRAPH_DPI",
          value_parser = clap::value_parser!(u32).range(50..=1200))]
    dpi: Option<u32>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "WORKSHEET_VERBOSE")]
    verbose: bool,

    /// Suppress everything except errors.
    #[arg(short, long, global = true, env = "WORKSHEET_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum GraphCommand {
    /// The distance-over-time motion graph.
    Motion,
    /// A straight line y = slope·x + intercept at integer x.
    Linear {
        #[arg(long, default_value_t = 3, allow_hyphen_values = true)]
        slope: i32,
        #[arg(long, default_value_t = 3, allow_hyphen_values = true)]
        intercept: i32,
        /// Last sampled x value.
        #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..=1000))]
        x_max: u32,
    },
    /// A graph described by a JSON file.
    Spec {
        /// JSON graph description.
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ שגיאה / Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<PathBuf> {
    let mut spec: GraphSpec = match &cli.graph {
        GraphCommand::Motion => presets::motion_graph(),
        GraphCommand::Linear {
            slope,
            intercept,
            x_max,
        } => presets::linear_function(*slope, *intercept, *x_max),
        GraphCommand::Spec { file } => GraphSpec::from_json_file(file)?,
    };
    if let Some(name) = &cli.filename {
        spec.filename = name.clone();
    }

    let mut style = GraphStyle::default();
    if let Some(dpi) = cli.dpi {
        style.dpi = dpi;
    }

    GraphRenderer::with_style(style, &cli.output_dir)
        .render(&spec)
        .with_context(|| format!("failed to draw {}", spec.filename))
}
