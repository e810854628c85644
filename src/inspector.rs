//! The per-run inspector shared by every instrumented thread.

use std::sync::atomic::{AtomicU64, Ordering};
use parking_lot::Mutex;
use log::info;

use crate::load::*;
use crate::memory::*;
use crate::region::*;
use crate::stats::*;
use crate::tracker::*;

/// Owns all state for one run.
///
/// Every method takes `&self`, so a single [Inspector] can be shared between
/// threads. Each load is accounted for inside one critical section, which
/// means a divergence seen by any thread blacklists the site for all of them.
#[derive(Debug)]
pub struct Inspector<G: RegionGate = RoiFlag> {
    gate: G,
    tracker: Mutex<SiteTracker>,
    icount_total: AtomicU64,
    icount_roi: AtomicU64,
    icount_agen: AtomicU64,
}

impl Inspector<RoiFlag> {
    /// Create an inspector that starts outside of the region of interest.
    pub fn new() -> Self { Self::with_gate(RoiFlag::new()) }

    /// Handle an event from the region controller.
    pub fn control(&self, ev: ControlEvent, tid: u32, pc: u64) {
        self.gate.apply(ev);
        info!("{} tid {} pc {:#x} global_ins_count {}",
            ev.name(), tid, pc, self.icount_total.load(Ordering::Relaxed));
    }
}

impl Default for Inspector<RoiFlag> {
    fn default() -> Self { Self::new() }
}

impl<G: RegionGate> Inspector<G> {
    pub fn with_gate(gate: G) -> Self {
        Self {
            gate,
            tracker: Mutex::new(SiteTracker::new()),
            icount_total: AtomicU64::new(0),
            icount_roi: AtomicU64::new(0),
            icount_agen: AtomicU64::new(0),
        }
    }

    pub fn gate(&self) -> &G { &self.gate }

    pub fn is_observing(&self) -> bool { self.gate.is_observing() }

    /// Account for a block of `n` executed instructions.
    pub fn count_instructions(&self, n: u64) {
        self.icount_total.fetch_add(n, Ordering::Relaxed);
        if self.is_observing() {
            self.icount_roi.fetch_add(n, Ordering::Relaxed);
        }
    }

    /// Account for an instruction whose memory operands needed explicit
    /// address generation.
    pub fn count_agen(&self) {
        if self.is_observing() {
            self.icount_agen.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Account for a load event.
    ///
    /// Returns `None` when outside of the region of interest, in which case
    /// nothing is recorded.
    pub fn observe(&self, ev: &LoadEvent) -> Option<Observation> {
        if !self.is_observing() {
            return None;
        }
        Some(self.tracker.lock().observe(ev))
    }

    /// Account for a load whose value was already captured.
    pub fn capture_load(&self, pc: u64, addr: u64, width: u32, role: BaseRole,
        value: u64) -> Option<Observation>
    {
        self.observe(&LoadEvent::new(pc, addr, width, role, value))
    }

    /// Account for a load, reading its value from `mem`.
    pub fn capture_load_from(&self, pc: u64, addr: u64, width: u32,
        role: BaseRole, mem: &impl MemorySource) -> Option<Observation>
    {
        if !self.is_observing() {
            return None;
        }
        self.observe(&LoadEvent::capture(pc, addr, width, role, mem))
    }

    /// Run `f` with the tracker locked.
    pub fn with_tracker<R>(&self, f: impl FnOnce(&SiteTracker) -> R) -> R {
        f(&self.tracker.lock())
    }

    /// Current instruction counts.
    pub fn icount(&self) -> InstructionCounts {
        InstructionCounts {
            total: self.icount_total.load(Ordering::Relaxed),
            inside_roi: self.icount_roi.load(Ordering::Relaxed),
            agen: self.icount_agen.load(Ordering::Relaxed),
        }
    }

    /// End the run and aggregate everything that was observed.
    pub fn finish(self) -> Summary {
        let icount = self.icount();
        let tracker = self.tracker.into_inner();
        Summary::collect(&tracker, icount)
    }
}
