use clap::Parser;
use rand::Rng;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

const PLAYERS: [&str; 8] = [
    "Alvarez", "Baker", "Chen", "Diallo", "Eriksen", "Fofana", "Garcia", "Haaland",
];

/// Generate a synthetic player session CSV
#[derive(Parser)]
struct Args {
    /// Output file
    #[arg(default_value = "data/sessions_generated.csv")]
    output: PathBuf,

    /// Number of data rows
    #[arg(short, long, default_value_t = 1_000_000)]
    rows: usize,
}

fn generate(args: &Args) -> std::io::Result<()> {
    let file = File::create(&args.output)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "Name,Session_Type,Max_Speed,Sleep_Quality,Distance")?;

    let mut rng = rand::rng();
    for _ in 0..args.rows {
        let name = PLAYERS[rng.random_range(0..PLAYERS.len())];
        let session = ["Practice", "Game"][rng.random_range(0..2)];
        let max_speed: f64 = rng.random_range(24.0..36.0);
        let sleep_quality = rng.random_range(1..=5);
        let distance: f64 = rng.random_range(3.0..13.0);
        writeln!(
            writer,
            "{name},{session},{max_speed:.1},{sleep_quality},{distance:.2}"
        )?;
    }
    writer.flush()
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    match generate(&args) {
        Ok(()) => {
            log::info!("wrote {} rows to {}", args.rows, args.output.display());
            println!("Sample CSV generated: {}", args.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: cannot write {}: {e}", args.output.display());
            ExitCode::FAILURE
        }
    }
}
