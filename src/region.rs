//! The region of interest.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Interface to whatever decides whether loads are currently observed.
pub trait RegionGate {
    fn is_observing(&self) -> bool;
}

impl<G: RegionGate + ?Sized> RegionGate for Arc<G> {
    fn is_observing(&self) -> bool { (**self).is_observing() }
}

impl<G: RegionGate + ?Sized> RegionGate for &G {
    fn is_observing(&self) -> bool { (**self).is_observing() }
}

/// A region gate that never changes.
#[derive(Clone, Copy, Debug)]
pub struct Always(pub bool);
impl RegionGate for Always {
    fn is_observing(&self) -> bool { self.0 }
}

/// Events delivered by the region controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlEvent {
    /// Enter the region of interest.
    Start,
    /// Leave the region of interest.
    Stop,
    WarmupStart,
    WarmupStop,
    ThreadId,
}
impl ControlEvent {
    /// Name used when logging the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start       => "Sim-Start",
            Self::Stop        => "Sim-End",
            Self::WarmupStart => "Warmup-Start",
            Self::WarmupStop  => "Warmup-Stop",
            Self::ThreadId    => "ThreadID",
        }
    }
}

/// A flag toggled by [ControlEvent]s.
///
/// Stores use release ordering and loads use acquire ordering, so every
/// load dispatched after a [ControlEvent::Stop] is seen outside the region.
#[derive(Debug, Default)]
pub struct RoiFlag {
    inside: AtomicBool,
}
impl RoiFlag {
    /// Create a flag outside of the region.
    pub fn new() -> Self { Self::default() }

    /// Create a flag that starts inside the region.
    pub fn inside() -> Self {
        Self { inside: AtomicBool::new(true) }
    }

    pub fn start(&self) { self.inside.store(true, Ordering::Release); }
    pub fn stop(&self) { self.inside.store(false, Ordering::Release); }

    /// Apply a control event. Only start and stop change the flag.
    pub fn apply(&self, ev: ControlEvent) {
        match ev {
            ControlEvent::Start => self.start(),
            ControlEvent::Stop => self.stop(),
            _ => {},
        }
    }
}

impl RegionGate for RoiFlag {
    fn is_observing(&self) -> bool {
        self.inside.load(Ordering::Acquire)
    }
}
