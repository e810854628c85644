
use load_inspector::postprocess::*;
use clap::Parser;
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;

/// Summarize a statistics report written by `inspect-trace`.
#[derive(Parser)]
#[command(name = "summarize-stats")]
struct Cli {
    /// Input statistics report
    #[arg(short, long, default_value = "stable-load.stats.txt")]
    input: PathBuf,
}

fn print_breakdown(b: &Breakdown) {
    println!("[*] {}", b.title);
    for (share, frac) in b.shares.iter().zip(b.fractions()) {
        println!("  {:<12} | {:>14} | {:>6.1}%", share.label, share.count, frac * 100.0);
    }
    println!();
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();
    let cli = Cli::parse();

    let res = StatsFile::from_file(&cli.input)
        .and_then(|stats| breakdowns(&stats));
    match res {
        Ok(breakdowns) => {
            breakdowns.iter().for_each(print_breakdown);
            ExitCode::SUCCESS
        },
        Err(e) => {
            error!("{}: {}", cli.input.display(), e);
            ExitCode::FAILURE
        },
    }
}
