//! gradebook CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gradebook", version, about = "Course grade aggregation and GPA")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current standings for one or every course
    Report {
        /// Path to a gradebook .toml file
        #[arg(long)]
        gradebook: PathBuf,

        /// Only report this course
        #[arg(long)]
        course: Option<String>,

        /// Output format: text, json, markdown (default from config)
        #[arg(long)]
        format: Option<String>,

        /// Output directory for json reports (default from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a gradebook file
    Validate {
        /// Path to a gradebook .toml file
        #[arg(long)]
        gradebook: PathBuf,
    },

    /// Complete a course for every enrolled learner
    Finalize {
        /// Path to a gradebook .toml file
        #[arg(long)]
        gradebook: PathBuf,

        /// Course to finalize
        #[arg(long)]
        course: String,
    },

    /// Show GPA over completed courses
    Gpa {
        /// Path to a gradebook .toml file
        #[arg(long)]
        gradebook: PathBuf,

        /// Only show this learner
        #[arg(long)]
        learner: Option<String>,
    },

    /// Print the letter-grade scale or convert a value
    Scale {
        /// Percentage to convert to a letter
        #[arg(long, allow_negative_numbers = true)]
        percentage: Option<f64>,

        /// Letter to convert to GPA points
        #[arg(long)]
        letter: Option<String>,
    },

    /// Compare two JSON course reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Change threshold in percentage points (default from config)
        #[arg(long)]
        threshold: Option<f64>,

        /// Exit code 1 if any learner declined
        #[arg(long)]
        fail_on_decline: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create starter config and example gradebook
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gradebook=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Report {
            gradebook,
            course,
            format,
            output,
            config,
        } => commands::report::execute(gradebook, course, format, output, config),
        Commands::Validate { gradebook } => commands::validate::execute(gradebook),
        Commands::Finalize { gradebook, course } => commands::finalize::execute(gradebook, course),
        Commands::Gpa { gradebook, learner } => commands::gpa::execute(gradebook, learner),
        Commands::Scale { percentage, letter } => commands::scale::execute(percentage, letter),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_decline,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_decline, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
