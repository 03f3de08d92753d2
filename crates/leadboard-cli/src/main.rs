mod commands;
mod output;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use leadboard_core::model::Qualification;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "leadboard",
    version,
    about = "Lead funnel dashboard for WhatsApp campaign spreadsheets"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Path to an xlsx workbook or a JSON file of cell values
    input_file: PathBuf,

    /// Worksheet to read from an xlsx workbook (overrides the config)
    #[arg(long, value_name = "NAME")]
    sheet: Option<String>,

    /// JSON config file (sheet name, column names, cache TTL, top N)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
struct FilterArgs {
    /// First day included (YYYY-MM-DD); defaults to the earliest lead
    #[arg(long, value_name = "DATE")]
    from: Option<NaiveDate>,

    /// Last day included (YYYY-MM-DD); defaults to the latest lead
    #[arg(long, value_name = "DATE")]
    to: Option<NaiveDate>,

    /// Qualification(s) to keep, e.g. "Qualificado" (default: all)
    #[arg(short, long = "qualification", value_name = "Q", value_parser = parse_qualification)]
    qualification: Vec<Qualification>,

    /// Campaign(s) to keep (default: every campaign in the data)
    #[arg(long = "campaign", value_name = "NAME")]
    campaign: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize the sheet and print the lead records
    Records {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the records to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Print every dashboard section for a filter
    Report {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Postal codes shown in the top-N breakdown (5..=50, steps of 5)
        #[arg(long, value_name = "N")]
        top_n: Option<usize>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Interactive session: change filters line by line on stdin
    Explore {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Inspect and validate config files
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the default config as JSON
    Show,
    /// Validate a config file
    Validate {
        /// Path to JSON config file
        file: PathBuf,
    },
}

fn parse_qualification(s: &str) -> Result<Qualification, String> {
    Qualification::from_label(s).ok_or_else(|| {
        let labels: Vec<&str> = Qualification::ALL.iter().map(|q| q.label()).collect();
        format!("unknown qualification '{s}', expected one of: {}", labels.join(", "))
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("leadboard=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Records {
            source,
            output,
            out,
        } => commands::records::run(&source.into(), &output, out),
        Commands::Report {
            source,
            filter,
            top_n,
            output,
        } => commands::report::run(&source.into(), filter.into(), top_n, &output),
        Commands::Explore { source } => commands::explore::run(&source.into()),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(),
            ConfigAction::Validate { file } => commands::config::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

impl From<SourceArgs> for commands::Input {
    fn from(args: SourceArgs) -> Self {
        commands::Input {
            path: args.input_file,
            sheet: args.sheet,
            config: args.config,
        }
    }
}

impl From<FilterArgs> for commands::FilterOverrides {
    fn from(args: FilterArgs) -> Self {
        commands::FilterOverrides {
            from: args.from,
            to: args.to,
            qualifications: (!args.qualification.is_empty()).then_some(args.qualification),
            campaigns: (!args.campaign.is_empty()).then_some(args.campaign),
        }
    }
}
