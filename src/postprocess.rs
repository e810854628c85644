//! Reading a statistics report back and summarizing it.

use std::fs;
use std::path::Path;
use itertools::*;

use crate::error::*;
use crate::load::*;

/// The `key value` pairs of a statistics report, in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatsFile {
    entries: Vec<(String, u64)>,
}
impl StatsFile {
    pub fn parse(text: &str) -> InspectorResult<Self> {
        let mut entries = Vec::new();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let malformed = || InspectorError::MalformedStats {
                line: line.to_string()
            };
            let (key, value) = line.split_once(' ').ok_or_else(malformed)?;
            let value = value.trim().parse::<u64>().map_err(|_| malformed())?;
            entries.push((key.to_string(), value));
        }
        Ok(Self { entries })
    }

    pub fn from_file(path: impl AsRef<Path>) -> InspectorResult<Self> {
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    /// Like [StatsFile::get], but a missing key is an error.
    pub fn require(&self, key: &str) -> InspectorResult<u64> {
        self.get(key).ok_or_else(|| InspectorError::MissingStat {
            key: key.to_string()
        })
    }

    /// Sum of `<prefix>.<KIND>.<SIZE>` over the given kinds and sizes.
    fn sum(&self, prefix: &str, kinds: &[LoadKind], sizes: &[SizeBucket])
        -> InspectorResult<u64>
    {
        iproduct!(kinds, sizes)
            .map(|(k, s)| self.require(&format!("{}.{}.{}", prefix, k, s)))
            .sum()
    }
}

/// One slice of a [Breakdown].
#[derive(Clone, Debug, PartialEq)]
pub struct Share {
    pub label: String,
    pub count: u64,
}

/// A set of counts that partition some population of loads.
#[derive(Clone, Debug, PartialEq)]
pub struct Breakdown {
    pub title: &'static str,
    pub shares: Vec<Share>,
}
impl Breakdown {
    fn new(title: &'static str,
        shares: impl IntoIterator<Item = (String, u64)>) -> Self
    {
        let shares = shares.into_iter()
            .map(|(label, count)| Share { label, count })
            .collect();
        Self { title, shares }
    }

    pub fn total(&self) -> u64 {
        self.shares.iter().map(|s| s.count).sum()
    }

    /// Fraction of the total held by each share (zero for an empty total).
    pub fn fractions(&self) -> Vec<f64> {
        let total = self.total();
        self.shares.iter().map(|s| {
            if total == 0 { 0.0 } else { s.count as f64 / total as f64 }
        }).collect()
    }
}

/// Derive the usual summaries from a statistics report.
///
/// Sizes and kinds only cover the power-of-two buckets; uncategorized loads
/// only appear in the vector/non-vector split.
pub fn breakdowns(stats: &StatsFile) -> InspectorResult<Vec<Breakdown>> {
    let sizes: Vec<SizeBucket> = SizeBucket::all()
        .filter(|s| *s != SizeBucket::UNCATEGORIZED)
        .collect();

    let by_kind = |prefix: &str| -> InspectorResult<Vec<(String, u64)>> {
        LoadKind::ALL.iter()
            .map(|k| Ok((k.label().to_string(), stats.sum(prefix, &[*k], &sizes)?)))
            .collect()
    };

    let mut res = Vec::new();
    res.push(Breakdown::new("Vector load fraction", [
        ("Vector".to_string(), stats.require("load.vector")?),
        ("Non-vector".to_string(), stats.require("load.non_vector")?),
    ]));

    let by_size: Vec<(String, u64)> = sizes.iter()
        .map(|s| Ok((s.label().to_string(), stats.sum("load", &LoadKind::ALL, &[*s])?)))
        .collect::<InspectorResult<_>>()?;
    res.push(Breakdown::new("Loads by size", by_size));

    res.push(Breakdown::new("Loads by addressing mode", by_kind("load")?));

    // Only trackable loads can be stable.
    let stable = stats.require("stable_loads.total")?;
    let trackable = stats.require("trackable_load.total")?;
    res.push(Breakdown::new("Stable loads", [
        ("Stable".to_string(), stable),
        ("Non-stable".to_string(), trackable.saturating_sub(stable)),
    ]));

    res.push(Breakdown::new("Stable loads by addressing mode", by_kind("stable_loads")?));
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::*;
    use crate::stats::*;
    use crate::tracker::*;

    #[test]
    fn parse_skips_blank_lines() {
        let f = StatsFile::parse("a.b 1\n\n  c 22 \n").unwrap();
        assert_eq!(f.len(), 2);
        assert_eq!(f.get("a.b"), Some(1));
        assert_eq!(f.get("c"), Some(22));
        assert_eq!(f.get("d"), None);
        assert!(matches!(f.require("d"), Err(InspectorError::MissingStat { .. })));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            StatsFile::parse("a.b\n"),
            Err(InspectorError::MalformedStats { .. })
        ));
        assert!(matches!(
            StatsFile::parse("a.b twelve\n"),
            Err(InspectorError::MalformedStats { .. })
        ));
    }

    #[test]
    fn breakdowns_of_a_report() {
        let mut t = SiteTracker::new();
        for _ in 0..3 {
            t.observe(&LoadEvent::new(0x10, 0x1000, 8, BaseRole::ProgramCounter, 1));
        }
        t.observe(&LoadEvent::new(0x20, 0x2000, 2, BaseRole::Other, 1));
        t.observe(&LoadEvent::new(0x30, 0x3000, 32, BaseRole::StackPointer, 0));

        let mut buf = Vec::new();
        write_stats(&mut buf, &Summary::collect(&t, InstructionCounts::default())).unwrap();
        let stats = StatsFile::parse(&String::from_utf8(buf).unwrap()).unwrap();
        let res = breakdowns(&stats).unwrap();
        assert_eq!(res.len(), 5);

        assert_eq!(res[0].shares[0].count, 1);
        assert_eq!(res[0].shares[1].count, 4);
        assert_eq!(res[1].total(), 5);
        assert_eq!(res[1].shares[3], Share { label: "8B".to_string(), count: 3 });
        assert_eq!(res[2].shares.iter().map(|s| s.count).collect::<Vec<_>>(), vec![3, 1, 1]);
        assert_eq!(res[3].shares[0].count, 3);
        assert_eq!(res[3].shares[1].count, 1);
        assert_eq!(res[3].fractions(), vec![0.75, 0.25]);
        assert_eq!(res[4].shares[0].count, 3);
    }
}
