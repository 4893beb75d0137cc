use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use csv_stat_view::{ProcessorError, RowFilter, StatMethod, StatView, Table};
use log::debug;

#[cfg(not(target_env = "msvc"))]
use jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

const DEFAULT_DATA: &str = "data/soccer_performance_data.csv";

#[derive(Parser)]
#[command(name = "csv-stat-view")]
#[command(version)]
#[command(about = "Grouped mean/median/mode statistics over a CSV file")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the player session report
    Report {
        /// Session data CSV
        #[arg(default_value = DEFAULT_DATA)]
        input: PathBuf,

        /// Number of players listed with the worst sleep quality
        #[arg(short = 'n', long, default_value_t = 3)]
        bottom_n: usize,
    },

    /// Print one stat view
    View {
        input: PathBuf,

        #[command(flatten)]
        stat: ViewArgs,

        /// Only rows where COLUMN equals VALUE
        #[arg(short, long, value_name = "COLUMN=VALUE", value_parser = parse_filter)]
        filter: Option<(String, String)>,
    },

    /// Print keys whose statistic under the left filter exceeds the right one
    Compare {
        input: PathBuf,

        #[command(flatten)]
        stat: ViewArgs,

        /// Column both filters test
        #[arg(long)]
        filter_column: String,

        /// Filter value of the view being tested
        #[arg(long)]
        left: String,

        /// Filter value of the view compared against
        #[arg(long)]
        right: String,
    },

    /// Print the N keys with the lowest statistic
    Bottom {
        input: PathBuf,

        #[command(flatten)]
        stat: ViewArgs,

        #[arg(short = 'n', long, default_value_t = 3)]
        count: usize,
    },
}

#[derive(clap::Args)]
struct ViewArgs {
    /// Group key column
    #[arg(short, long)]
    key: String,

    /// Numeric column to reduce
    #[arg(short, long)]
    data: String,

    /// mean, median or mode
    #[arg(short, long, default_value = "mean")]
    method: StatMethod,
}

fn parse_filter(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(col, val)| (col.to_string(), val.to_string()))
        .ok_or_else(|| format!("expected COLUMN=VALUE, got {s:?}"))
}

fn write_keys<W: Write>(out: &mut W, keys: &[String]) -> std::io::Result<()> {
    for key in keys {
        writeln!(out, "{key}")?;
    }
    Ok(())
}

fn print_keys(keys: &[String]) {
    for key in keys {
        println!("{key}");
    }
}

/// Render the player session report.
///
/// Every view and query is computed before anything is written, so a
/// failing query leaves `out` untouched.
fn report<W: Write>(input: &Path, bottom_n: usize, mut out: W) -> Result<(), ProcessorError> {
    let stats = Table::load_csv(input)?;

    let speed_in = |session: &str| -> Result<StatView, ProcessorError> {
        stats.to_stat_view_filtered(
            "Name",
            "Max_Speed",
            StatMethod::Mean,
            &RowFilter::equals("Session_Type", session),
        )
    };

    let avg_max_speed_p = speed_in("Practice")?;
    let avg_max_speed_g = speed_in("Game")?;
    let mode_sleep_quality = stats.to_stat_view("Name", "Sleep_Quality", StatMethod::Mode)?;
    let median_sleep_quality = stats.to_stat_view("Name", "Sleep_Quality", StatMethod::Median)?;
    let avg_sleep_quality = stats.to_stat_view("Name", "Sleep_Quality", StatMethod::Mean)?;
    let faster_in_game = avg_max_speed_g.gt(&avg_max_speed_p);
    let worst_sleep = avg_sleep_quality.bottom_n(bottom_n)?;

    writeln!(out, "Player Average Session Max Speed (Practice)")?;
    write!(out, "{avg_max_speed_p}")?;
    writeln!(out, "\nPlayer Average Session Max Speed (Game)")?;
    write!(out, "{avg_max_speed_g}")?;
    writeln!(out, "\nPlayer Mode Sleep Quality")?;
    write!(out, "{mode_sleep_quality}")?;
    writeln!(out, "\nPlayer Median Sleep Quality")?;
    write!(out, "{median_sleep_quality}")?;
    writeln!(out, "\nPlayer Mean Sleep Quality")?;
    write!(out, "{avg_sleep_quality}")?;

    writeln!(out, "\nPlayers Faster in Game than Practice:")?;
    write_keys(&mut out, &faster_in_game)?;

    writeln!(out, "\nN = {bottom_n} Players with worst average Sleep Quality:")?;
    write_keys(&mut out, &worst_sleep)?;

    out.flush()?;
    Ok(())
}

fn run(cli: Cli) -> Result<(), ProcessorError> {
    match cli.command {
        Commands::Report { input, bottom_n } => {
            report(&input, bottom_n, std::io::stdout().lock())
        }

        Commands::View {
            input,
            stat,
            filter,
        } => {
            let table = Table::load_csv(&input)?;
            let filter = match filter {
                Some((col, val)) => RowFilter::equals(&col, &val),
                None => RowFilter::PassThrough,
            };
            let view = table.to_stat_view_filtered(&stat.key, &stat.data, stat.method, &filter)?;
            print!("{view}");
            Ok(())
        }

        Commands::Compare {
            input,
            stat,
            filter_column,
            left,
            right,
        } => {
            let table = Table::load_csv(&input)?;
            let view_for = |value: &str| {
                table.to_stat_view_filtered(
                    &stat.key,
                    &stat.data,
                    stat.method,
                    &RowFilter::equals(&filter_column, value),
                )
            };
            let left = view_for(left.as_str())?;
            let right = view_for(right.as_str())?;
            print_keys(&left.gt(&right));
            Ok(())
        }

        Commands::Bottom { input, stat, count } => {
            let table = Table::load_csv(&input)?;
            let view = table.to_stat_view(&stat.key, &stat.data, stat.method)?;
            print_keys(&view.bottom_n(count)?);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("{e:?}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
