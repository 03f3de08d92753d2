use chrono::NaiveDate;
use leadboard_core::config::validate_top_n;
use leadboard_core::dashboard::{build_dashboard, DashboardOptions};
use leadboard_core::error::LeadError;
use leadboard_core::model::Qualification;
use leadboard_core::refresh::CachedSource;
use std::io::{BufRead, Write};
use std::time::Duration;

use super::{FilterOverrides, Input};
use crate::output;

const HELP: &str = "\
Commands:
  show                   print the dashboard again
  from <YYYY-MM-DD|->    set or clear the first day
  to <YYYY-MM-DD|->      set or clear the last day
  qual <Q,...|all>       keep only these qualifications
  campaign <C,...|all>   keep only these campaigns
  top <N>                postal codes in the top-N table
  reset                  clear every filter
  refresh                drop the cached sheet and fetch again
  quit                   leave";

#[derive(Debug, PartialEq)]
enum Command {
    Show,
    From(Option<NaiveDate>),
    To(Option<NaiveDate>),
    Qualifications(Option<Vec<Qualification>>),
    Campaigns(Option<Vec<String>>),
    TopN(usize),
    Reset,
    Refresh,
    Help,
    Quit,
}

pub fn run(input: &Input) -> Result<(), LeadError> {
    let config = input.load_config()?;
    let mut options = DashboardOptions::from(&config);
    let mut overrides = FilterOverrides::default();
    let mut cache = CachedSource::new(input.open(&config), Duration::from_secs(config.cache_ttl_secs));

    render(&mut cache, &config.columns, &overrides, &options)?;
    eprintln!("Type 'help' for commands.");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        eprint!("> ");
        std::io::stderr().flush()?;
        let Some(line) = lines.next() else {
            break;
        };

        let command = match parse_command(&line?) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => {
                eprintln!("{HELP}");
                continue;
            }
            Command::Show => {}
            Command::From(date) => overrides.from = date,
            Command::To(date) => overrides.to = date,
            Command::Qualifications(q) => overrides.qualifications = q,
            Command::Campaigns(c) => overrides.campaigns = c,
            Command::TopN(n) => {
                if let Err(e) = validate_top_n(n) {
                    eprintln!("Error: {e}");
                    continue;
                }
                options.top_n = n;
            }
            Command::Reset => overrides = FilterOverrides::default(),
            Command::Refresh => cache.invalidate(),
        }

        if let Err(e) = render(&mut cache, &config.columns, &overrides, &options) {
            eprintln!("Error: {e}");
        }
    }

    Ok(())
}

fn render<S: leadboard_core::source::LeadSource>(
    cache: &mut CachedSource<S>,
    columns: &leadboard_core::config::ColumnMap,
    overrides: &FilterOverrides,
    options: &DashboardOptions,
) -> Result<(), LeadError> {
    let (dataset, from_cache) = leadboard_core::load_cached(cache, columns)?;
    let filter = overrides.apply(&dataset.records);
    let report = build_dashboard(&dataset.records, &filter, options);
    output::table::print_report(&report);
    if !from_cache {
        eprintln!(
            "Fetched {} lead(s) from {} ({} row(s) skipped)",
            dataset.records.len(),
            cache.source().name(),
            dataset.rejected_count()
        );
    }
    Ok(())
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, arg) = match line.split_once(char::is_whitespace) {
        Some((word, arg)) => (word, arg.trim()),
        None => (line, ""),
    };

    match word {
        "" | "show" => Ok(Command::Show),
        "from" => parse_date_arg(arg).map(Command::From),
        "to" => parse_date_arg(arg).map(Command::To),
        "qual" => {
            let Some(labels) = list_arg(arg) else {
                return Ok(Command::Qualifications(None));
            };
            labels
                .iter()
                .map(|l| Qualification::from_label(l).ok_or_else(|| format!("unknown qualification '{l}'")))
                .collect::<Result<Vec<_>, _>>()
                .map(|q| Command::Qualifications(Some(q)))
        }
        "campaign" => Ok(Command::Campaigns(list_arg(arg))),
        "top" => arg
            .parse()
            .map(Command::TopN)
            .map_err(|_| format!("expected a number, got '{arg}'")),
        "reset" => Ok(Command::Reset),
        "refresh" => Ok(Command::Refresh),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}', type 'help'")),
    }
}

fn parse_date_arg(arg: &str) -> Result<Option<NaiveDate>, String> {
    if arg == "-" {
        return Ok(None);
    }
    NaiveDate::parse_from_str(arg, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| format!("invalid date '{arg}': {e}"))
}

/// Comma separated values; `all` means no restriction.
fn list_arg(arg: &str) -> Option<Vec<String>> {
    if arg.eq_ignore_ascii_case("all") {
        return None;
    }
    Some(
        arg.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
    )
}
