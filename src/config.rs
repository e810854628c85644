//! Output configuration.

use std::path::PathBuf;
use clap::Args;

/// Where (and whether) reports are written at the end of a run.
#[derive(Args, Clone, Debug, PartialEq, Eq)]
pub struct InspectorConfig {
    /// Output file for the statistics report
    #[arg(long = "statf", default_value = InspectorConfig::STATS_PATH)]
    pub stats_path: PathBuf,

    /// Also dump the program counter of every stable load
    #[arg(long = "dsl")]
    pub dump_stable_loads: bool,

    /// Output file for the stable load dump
    #[arg(long = "slf", default_value = InspectorConfig::STABLE_LOADS_PATH)]
    pub stable_loads_path: PathBuf,
}
impl InspectorConfig {
    pub const STATS_PATH: &'static str = "stable-load.stats.txt";
    pub const STABLE_LOADS_PATH: &'static str = "stable-load.ips.txt";
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            stats_path: Self::STATS_PATH.into(),
            dump_stable_loads: false,
            stable_loads_path: Self::STABLE_LOADS_PATH.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        cfg: InspectorConfig,
    }

    #[test]
    fn defaults_match_the_cli() {
        let cli = Cli::parse_from(["inspect"]);
        assert_eq!(cli.cfg, InspectorConfig::default());
    }

    #[test]
    fn flags() {
        let cli = Cli::parse_from([
            "inspect", "--statf", "a.txt", "--dsl", "--slf", "b.txt"
        ]);
        assert_eq!(cli.cfg.stats_path, PathBuf::from("a.txt"));
        assert!(cli.cfg.dump_stable_loads);
        assert_eq!(cli.cfg.stable_loads_path, PathBuf::from("b.txt"));
    }
}
