
use load_inspector::*;
use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

/// Replay load traces and report which load sites are stable.
#[derive(Parser)]
#[command(name = "inspect-trace")]
struct Cli {
    /// Trace files, replayed in order into a single run
    #[arg(required = true)]
    traces: Vec<String>,

    #[command(flatten)]
    cfg: InspectorConfig,
}

fn run(cli: &Cli) -> InspectorResult<()> {
    let insp = Inspector::new();
    for trace in BinaryTraceSet::new_from_slice(&cli.traces) {
        let trace = trace?;
        info!("[*] Loaded {} records from '{}'", trace.num_entries(), trace.name());
        replay(&trace, &insp)?;
    }

    let summary = insp.finish();
    info!("[*] {} load sites, {} stable ({} stable loads of {} trackable)",
        summary.num_sites,
        summary.num_stable_sites(),
        summary.num_stable_loads(),
        summary.trackable_loads.total(),
    );
    write_reports(&summary, &cli.cfg)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        },
    }
}
