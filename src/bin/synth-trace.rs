
use load_inspector::*;
use load_inspector::synth::*;
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

/// Write a synthetic load trace with a mix of stable and unstable loads.
#[derive(Parser)]
#[command(name = "synth-trace")]
struct Cli {
    /// Output trace file
    output: PathBuf,

    /// Number of loop iterations
    #[arg(short, long, default_value_t = 1000)]
    iters: usize,

    /// Seed for randomly-valued loads
    #[arg(short, long, default_value_t = 0)]
    seed: u64,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();
    let cli = Cli::parse();

    let mut a = TraceAssembler::new(0x0040_1000, cli.seed);
    a.load(0x0060_1000, 8, BaseRole::ProgramCounter, LoadPattern::Stable(0x42));
    a.load(0x0060_1008, 4, BaseRole::ProgramCounter, LoadPattern::Stable(0x7));
    a.load(0x7ffe_ff00, 8, BaseRole::StackPointer, LoadPattern::Stable(0x0040_2000));
    a.load(0x7ffe_ff08, 8, BaseRole::StackPointer, LoadPattern::ChangesAt((cli.iters / 2).max(2)));
    a.pad_align(0x40);
    a.load(0x1000_0000, 8, BaseRole::Other, LoadPattern::Strided(8));
    a.load(0x1000_8000, 1, BaseRole::Other, LoadPattern::Random);
    a.load(0x1001_0000, 32, BaseRole::Other, LoadPattern::Stable(0));

    let records = a.compile(cli.iters);
    let trace = BinaryTrace::from_records("synth", &records);
    match trace.write_to(&cli.output) {
        Ok(()) => {
            info!("[*] Wrote {} records to '{}'", records.len(), cli.output.display());
            ExitCode::SUCCESS
        },
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        },
    }
}
