//! Helpers for collecting statistics.

use itertools::*;

use crate::load::*;
use crate::tracker::*;

/// Counters indexed by [LoadKind] and [SizeBucket].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadTable {
    data: [[u64; SizeBucket::NUM]; LoadKind::NUM],
}
impl LoadTable {
    pub fn new() -> Self { Self::default() }

    pub fn inc(&mut self, kind: LoadKind, size: SizeBucket) {
        self.add(kind, size, 1);
    }

    pub fn add(&mut self, kind: LoadKind, size: SizeBucket, n: u64) {
        self.data[kind.index()][size.index()] += n;
    }

    pub fn get(&self, kind: LoadKind, size: SizeBucket) -> u64 {
        self.data[kind.index()][size.index()]
    }

    /// Iterate over every cell, kinds in the outer loop.
    pub fn iter(&self) -> impl Iterator<Item = (LoadKind, SizeBucket, u64)> + '_ {
        iproduct!(LoadKind::ALL, SizeBucket::all())
            .map(move |(kind, size)| (kind, size, self.get(kind, size)))
    }

    /// Sum of all cells.
    pub fn total(&self) -> u64 {
        self.iter().map(|(_, _, n)| n).sum()
    }

    /// Sum of all cells for one kind.
    pub fn total_kind(&self, kind: LoadKind) -> u64 {
        self.data[kind.index()].iter().sum()
    }

    /// Sum of all cells for one size bucket.
    pub fn total_size(&self, size: SizeBucket) -> u64 {
        LoadKind::ALL.iter().map(|k| self.get(*k, size)).sum()
    }

    /// Sum of the buckets holding vector-width loads.
    pub fn total_vector(&self) -> u64 {
        self.iter().filter(|(_, s, _)| s.is_vector()).map(|(_, _, n)| n).sum()
    }

    /// Sum of the buckets holding scalar loads.
    pub fn total_non_vector(&self) -> u64 {
        self.total() - self.total_vector()
    }
}

/// Instruction counts gathered alongside the loads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InstructionCounts {
    /// Every executed instruction
    pub total: u64,
    /// Instructions executed inside the region of interest
    pub inside_roi: u64,
    /// Instructions inside the region that needed address generation
    pub agen: u64,
}

/// A site that read the same value from the same address every time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StableSite {
    pub pc: u64,
    pub occ: u64,
    pub kind: LoadKind,
    pub size: SizeBucket,
}

/// Everything reported at the end of a run.
#[derive(Clone, Debug, Default)]
pub struct Summary {
    pub icount: InstructionCounts,

    /// Every observed load
    pub loads: LoadTable,
    /// Observed loads narrow enough to track
    pub trackable_loads: LoadTable,

    /// Distinct sites observed with a trackable load
    pub num_sites: u64,
    /// Sites that never diverged
    pub num_tracked: u64,
    /// Sites proven unstable
    pub num_blacklisted: u64,

    /// Number of stable sites
    pub stable_sites: LoadTable,
    /// Number of dynamic loads performed by stable sites
    pub stable_loads: LoadTable,

    /// Stable sites, most frequent first
    pub ranked: Vec<StableSite>,
}
impl Summary {
    /// Aggregate the final state of a tracker.
    ///
    /// Sites observed only once are neither stable nor unstable and are
    /// left out of the stable tallies.
    pub fn collect(tracker: &SiteTracker, icount: InstructionCounts) -> Self {
        let mut stable_sites = LoadTable::new();
        let mut stable_loads = LoadTable::new();

        let ranked: Vec<StableSite> = tracker.sites()
            .filter(|(_, rec)| rec.occ > 1)
            .sorted_by_key(|(_, rec)| rec.seq)
            .sorted_by(|x, y| y.1.occ.cmp(&x.1.occ))
            .map(|(pc, rec)| {
                stable_sites.inc(rec.kind, rec.size);
                stable_loads.add(rec.kind, rec.size, rec.occ);
                StableSite { pc, occ: rec.occ, kind: rec.kind, size: rec.size }
            })
            .collect();

        Self {
            icount,
            loads: tracker.loads().clone(),
            trackable_loads: tracker.trackable_loads().clone(),
            num_sites: tracker.num_sites() as u64,
            num_tracked: tracker.num_tracked() as u64,
            num_blacklisted: tracker.num_blacklisted() as u64,
            stable_sites,
            stable_loads,
            ranked,
        }
    }

    /// Total number of stable sites.
    pub fn num_stable_sites(&self) -> u64 { self.stable_sites.total() }

    /// Total number of dynamic loads performed by stable sites.
    pub fn num_stable_loads(&self) -> u64 { self.stable_loads.total() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observe_n(t: &mut SiteTracker, pc: u64, n: usize) {
        for _ in 0..n {
            t.observe(&LoadEvent::new(pc, 0x1000 + pc, 4, BaseRole::Other, 1));
        }
    }

    #[test]
    fn table_totals() {
        let mut t = LoadTable::new();
        t.add(LoadKind::Rip, SizeBucket::from_width(8), 3);
        t.add(LoadKind::Reg, SizeBucket::from_width(16), 2);
        t.inc(LoadKind::Reg, SizeBucket::UNCATEGORIZED);
        assert_eq!(t.total(), 6);
        assert_eq!(t.total_kind(LoadKind::Reg), 3);
        assert_eq!(t.total_size(SizeBucket::from_width(8)), 3);
        assert_eq!(t.total_vector(), 3);
        assert_eq!(t.total_non_vector(), 3);
        assert_eq!(t.iter().count(), LoadKind::NUM * SizeBucket::NUM);
    }

    #[test]
    fn ranking_is_stable() {
        let mut t = SiteTracker::new();
        observe_n(&mut t, 0xa, 5);
        observe_n(&mut t, 0xb, 9);
        observe_n(&mut t, 0xc, 9);
        observe_n(&mut t, 0xd, 2);
        let s = Summary::collect(&t, InstructionCounts::default());
        let order: Vec<(u64, u64)> = s.ranked.iter().map(|s| (s.pc, s.occ)).collect();
        assert_eq!(order, vec![(0xb, 9), (0xc, 9), (0xa, 5), (0xd, 2)]);
    }

    #[test]
    fn single_observations_are_not_stable() {
        let mut t = SiteTracker::new();
        observe_n(&mut t, 0xa, 1);
        observe_n(&mut t, 0xb, 3);
        let s = Summary::collect(&t, InstructionCounts::default());
        assert_eq!(s.num_sites, 2);
        assert_eq!(s.num_stable_sites(), 1);
        assert_eq!(s.num_stable_loads(), 3);
        assert_eq!(s.ranked.len(), 1);
    }
}
