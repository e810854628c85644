//! Per-site stability tracking.
//!
//! Every static load site moves through three states: unseen, tracked, and
//! blacklisted. A site becomes tracked on its first trackable observation
//! and stays tracked for as long as every later observation reads the same
//! value from the same address. The first divergence moves it to the
//! blacklist, which is terminal.

use std::collections::*;
use log::trace;

use crate::load::*;
use crate::memory::*;
use crate::stats::*;

/// A single dynamic load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadEvent {
    /// Address of the load instruction
    pub pc: u64,
    /// Effective address of the access
    pub addr: u64,
    /// Width of the access in bytes
    pub width: u32,
    /// Value read, zero-extended (always zero for wide loads)
    pub value: u64,
    pub kind: LoadKind,
    pub size: SizeBucket,
}
impl LoadEvent {
    /// Build an event from an already-captured value.
    pub fn new(pc: u64, addr: u64, width: u32, role: BaseRole, value: u64)
        -> Self
    {
        let (kind, size) = classify(role, width);
        let value = if is_trackable(width) {
            truncate_value(value, width)
        } else {
            0
        };
        Self { pc, addr, width, value, kind, size }
    }

    /// Build an event, reading the loaded value from `mem`.
    pub fn capture(pc: u64, addr: u64, width: u32, role: BaseRole,
        mem: &impl MemorySource) -> Self
    {
        let value = if is_trackable(width) {
            load_value(mem, addr, width)
        } else {
            0
        };
        Self::new(pc, addr, width, role, value)
    }

    pub fn is_trackable(&self) -> bool { is_trackable(self.width) }
}

/// State kept for a site that has not (yet) diverged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SiteRecord {
    pub kind: LoadKind,
    pub size: SizeBucket,
    /// Effective address of every observation so far
    pub addr: u64,
    /// Value read by every observation so far
    pub value: u64,
    /// Number of observations
    pub occ: u64,
    /// Order in which this site started being tracked
    pub(crate) seq: u64,
}

/// What a call to [SiteTracker::observe] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Observation {
    /// Too wide to track; only counted.
    Wide,
    /// The site was already blacklisted.
    Blacklisted,
    /// First observation of the site; it is now tracked.
    Tracked,
    /// Matched the tracked address and value (the new occurrence count).
    Repeated(u64),
    /// Diverged from the tracked address or value; now blacklisted.
    Diverged,
}

/// Container for all state built up while observing loads.
#[derive(Debug, Default)]
pub struct SiteTracker {
    /// Every observed load
    loads: LoadTable,
    /// Every observed load narrow enough to track
    trackable: LoadTable,
    /// Sites that have been stable so far (indexed by program counter value)
    sites: HashMap<u64, SiteRecord>,
    /// Sites proven unstable
    blacklist: HashSet<u64>,
    next_seq: u64,
}
impl SiteTracker {
    pub fn new() -> Self { Self::default() }

    /// Account for a single dynamic load.
    pub fn observe(&mut self, ev: &LoadEvent) -> Observation {
        self.loads.inc(ev.kind, ev.size);
        if !ev.is_trackable() {
            return Observation::Wide;
        }
        self.trackable.inc(ev.kind, ev.size);

        if self.blacklist.contains(&ev.pc) {
            return Observation::Blacklisted;
        }

        match self.sites.entry(ev.pc) {
            hash_map::Entry::Vacant(e) => {
                e.insert(SiteRecord {
                    kind: ev.kind,
                    size: ev.size,
                    addr: ev.addr,
                    value: ev.value,
                    occ: 1,
                    seq: self.next_seq,
                });
                self.next_seq += 1;
                Observation::Tracked
            },
            hash_map::Entry::Occupied(mut e) => {
                let rec = e.get_mut();
                if rec.addr == ev.addr && rec.value == ev.value {
                    rec.occ += 1;
                    Observation::Repeated(rec.occ)
                } else {
                    let (pc, rec) = e.remove_entry();
                    trace!("blacklist {:#x} after {} occurrences \
                        (addr {:#x} -> {:#x}, value {:#x} -> {:#x})",
                        pc, rec.occ, rec.addr, ev.addr, rec.value, ev.value);
                    self.blacklist.insert(pc);
                    Observation::Diverged
                }
            },
        }
    }

    /// Counts of every observed load.
    pub fn loads(&self) -> &LoadTable { &self.loads }

    /// Counts of every observed load narrow enough to track.
    pub fn trackable_loads(&self) -> &LoadTable { &self.trackable }

    /// Returns the record for a tracked site.
    pub fn get(&self, pc: u64) -> Option<&SiteRecord> {
        self.sites.get(&pc)
    }

    /// Iterate over all tracked sites (in no particular order).
    pub fn sites(&self) -> impl Iterator<Item = (u64, &SiteRecord)> {
        self.sites.iter().map(|(pc, rec)| (*pc, rec))
    }

    /// Returns 'true' if the site has been proven unstable.
    pub fn is_blacklisted(&self, pc: u64) -> bool {
        self.blacklist.contains(&pc)
    }

    /// Number of sites still being tracked.
    pub fn num_tracked(&self) -> usize { self.sites.len() }

    /// Number of sites proven unstable.
    pub fn num_blacklisted(&self) -> usize { self.blacklist.len() }

    /// Number of distinct sites observed with a trackable load.
    pub fn num_sites(&self) -> usize {
        self.num_tracked() + self.num_blacklisted()
    }
}
