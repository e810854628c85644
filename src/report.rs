//! Writing the statistics report and the stable load dump.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use log::info;

use crate::config::*;
use crate::error::*;
use crate::stats::*;

/// Header of the stable load dump.
pub const STABLE_LOADS_HEADER: &str = "stable_load_ip,occurence,load_type";

fn write_table(w: &mut impl Write, prefix: &str, table: &LoadTable)
    -> io::Result<()>
{
    for (kind, size, n) in table.iter() {
        writeln!(w, "{}.{}.{} {}", prefix, kind, size, n)?;
    }
    Ok(())
}

/// Write the statistics report: one `key value` pair per line, with blank
/// lines between sections.
pub fn write_stats(w: &mut impl Write, s: &Summary) -> io::Result<()> {
    writeln!(w, "icount.total {}", s.icount.total)?;
    writeln!(w, "icount.inside_roi {}", s.icount.inside_roi)?;
    writeln!(w, "icount.agen {}", s.icount.agen)?;
    writeln!(w)?;

    writeln!(w, "load.total {}", s.loads.total())?;
    writeln!(w, "load.non_vector {}", s.loads.total_non_vector())?;
    writeln!(w, "load.vector {}", s.loads.total_vector())?;
    write_table(w, "load", &s.loads)?;
    writeln!(w)?;

    writeln!(w, "trackable_load.total {}", s.trackable_loads.total())?;
    write_table(w, "trackable_load", &s.trackable_loads)?;
    writeln!(w)?;

    writeln!(w, "load_ips.total {}", s.num_sites)?;
    writeln!(w, "load_ips.tracked {}", s.num_tracked)?;
    writeln!(w, "load_ips.blacklisted {}", s.num_blacklisted)?;
    writeln!(w, "stable_load_ips.total {}", s.num_stable_sites())?;
    write_table(w, "stable_load_ips", &s.stable_sites)?;
    writeln!(w)?;

    writeln!(w, "stable_loads.total {}", s.num_stable_loads())?;
    write_table(w, "stable_loads", &s.stable_loads)?;
    Ok(())
}

/// Write every stable site, most frequent first.
pub fn write_stable_loads(w: &mut impl Write, s: &Summary) -> io::Result<()> {
    writeln!(w, "{}", STABLE_LOADS_HEADER)?;
    for site in s.ranked.iter() {
        writeln!(w, "{:#x},{},{}", site.pc, site.occ, site.kind)?;
    }
    Ok(())
}

fn create(path: &Path) -> InspectorResult<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| InspectorError::Create {
            path: path.to_path_buf(), source
        })
}

/// Write all reports requested by `cfg`.
pub fn write_reports(s: &Summary, cfg: &InspectorConfig) -> InspectorResult<()> {
    let mut w = create(&cfg.stats_path)?;
    write_stats(&mut w, s)?;
    w.flush()?;
    info!("wrote statistics to '{}'", cfg.stats_path.display());

    if cfg.dump_stable_loads {
        let mut w = create(&cfg.stable_loads_path)?;
        write_stable_loads(&mut w, s)?;
        w.flush()?;
        info!("wrote {} stable loads to '{}'",
            s.ranked.len(), cfg.stable_loads_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::*;
    use crate::tracker::*;

    fn summary() -> Summary {
        let mut t = SiteTracker::new();
        for _ in 0..3 {
            t.observe(&LoadEvent::new(0x401000, 0x601000, 4, BaseRole::ProgramCounter, 9));
        }
        t.observe(&LoadEvent::new(0x401010, 0x7ff0, 8, BaseRole::StackPointer, 1));
        t.observe(&LoadEvent::new(0x401020, 0x9000, 64, BaseRole::Other, 0));
        Summary::collect(&t, InstructionCounts { total: 100, inside_roi: 40, agen: 2 })
    }

    #[test]
    fn stats_layout() {
        let mut buf = Vec::new();
        write_stats(&mut buf, &summary()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(&lines[..4], &["icount.total 100", "icount.inside_roi 40", "icount.agen 2", ""]);
        assert_eq!(&lines[4..7], &["load.total 5", "load.non_vector 4", "load.vector 1"]);
        assert_eq!(lines[7], "load.RIP.1B 0");
        assert!(lines.contains(&"load.RIP.4B 3"));
        assert!(lines.contains(&"load.REG.64B 1"));
        assert!(lines.contains(&"trackable_load.total 4"));
        assert!(lines.contains(&"trackable_load.REG.64B 0"));
        assert!(lines.contains(&"load_ips.total 2"));
        assert!(lines.contains(&"stable_load_ips.total 1"));
        assert!(lines.contains(&"stable_load_ips.RIP.4B 1"));
        assert!(lines.contains(&"stable_loads.total 3"));
        assert!(lines.contains(&"stable_loads.STACK.8B 0"));
        assert_eq!(lines.iter().filter(|l| l.is_empty()).count(), 4);
        assert_eq!(lines.last(), Some(&"stable_loads.REG.UNCATEGORIZED 0"));
    }

    #[test]
    fn stable_load_dump() {
        let mut buf = Vec::new();
        write_stable_loads(&mut buf, &summary()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "stable_load_ip,occurence,load_type\n0x401000,3,RIP\n");
    }

    #[test]
    fn reports_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = InspectorConfig {
            stats_path: dir.path().join("stats.txt"),
            dump_stable_loads: false,
            stable_loads_path: dir.path().join("ips.txt"),
        };
        write_reports(&summary(), &cfg).unwrap();
        assert!(cfg.stats_path.exists());
        assert!(!cfg.stable_loads_path.exists());

        let cfg = InspectorConfig { dump_stable_loads: true, ..cfg };
        write_reports(&summary(), &cfg).unwrap();
        assert!(cfg.stable_loads_path.exists());
    }

    #[test]
    fn unwritable_report_path() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = InspectorConfig {
            stats_path: dir.path().join("missing").join("stats.txt"),
            ..InspectorConfig::default()
        };
        let err = write_reports(&summary(), &cfg);
        assert!(matches!(err, Err(InspectorError::Create { .. })));
    }
}
