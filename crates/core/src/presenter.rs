//! Presenter boundary - everything the core asks of the outside world
//!
//! Rendering, effects, scoring widgets and staging visuals live behind this
//! trait. The core only ever issues notifications and move requests; it never
//! waits on the presenter inside a call. Completion of a move comes back
//! either through the task timers advanced by [`Session::tick`] or early via
//! [`Session::complete`].
//!
//! [`Session::tick`]: crate::Session::tick
//! [`Session::complete`]: crate::Session::complete

use crate::staging::StagingSlots;
use crate::types::{Color, Coord, GroupId, SlotId, TaskId};

/// Area a notification refers to: a square of `extent` cells anchored at `origin`.
///
/// Presentation places effects at the square's centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Footprint {
    pub origin: Coord,
    pub extent: u8,
}

impl Footprint {
    pub fn cell(pos: Coord) -> Self {
        Self {
            origin: pos,
            extent: 1,
        }
    }

    pub fn quad(origin: Coord) -> Self {
        Self { origin, extent: 2 }
    }
}

/// A resolved match worth reporting to scoring/goal tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collected {
    pub color: Color,
    pub at: Footprint,
    /// Staging slot reserved for the collected piece, if one was free
    pub slot: Option<SlotId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// The group slides onto the square of `into` and is absorbed when the move completes
    Merge { into: GroupId },
    /// Rigid gravity shift; the board already holds the new position
    Shift { delta: Coord },
    /// A freshly spawned group drops into place
    FallIn,
    /// Quarter turn clockwise; the board already holds the rotated cells
    Rotate,
}

/// Ask presentation to animate one group toward `target` (the corner it ends up at)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    pub ticket: TaskId,
    pub group: GroupId,
    pub target: Coord,
    pub motion: Motion,
    pub duration_ms: u32,
}

pub trait Presenter {
    fn on_collected(&mut self, collected: Collected);

    fn on_spawn_effect(&mut self, at: Footprint);

    fn request_move(&mut self, request: MoveRequest);

    fn acquire_staging_slot(&mut self) -> Option<SlotId> {
        None
    }

    fn release_staging_slot(&mut self, _slot: SlotId) {}
}

/// Presenter that ignores everything (headless runs, benchmarks)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn on_collected(&mut self, _collected: Collected) {}

    fn on_spawn_effect(&mut self, _at: Footprint) {}

    fn request_move(&mut self, _request: MoveRequest) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenterEvent {
    Collected(Collected),
    SpawnEffect(Footprint),
    Move(MoveRequest),
}

/// Presenter that records every call, optionally backed by a staging pool
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    events: Vec<PresenterEvent>,
    staging: Option<StagingSlots>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_staging(capacity: u8) -> Self {
        Self {
            events: Vec::new(),
            staging: Some(StagingSlots::new(capacity)),
        }
    }

    pub fn events(&self) -> &[PresenterEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<PresenterEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn collected(&self) -> impl Iterator<Item = &Collected> {
        self.events.iter().filter_map(|e| match e {
            PresenterEvent::Collected(c) => Some(c),
            _ => None,
        })
    }

    pub fn moves(&self) -> impl Iterator<Item = &MoveRequest> {
        self.events.iter().filter_map(|e| match e {
            PresenterEvent::Move(m) => Some(m),
            _ => None,
        })
    }

    pub fn spawn_effects(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PresenterEvent::SpawnEffect(_)))
            .count()
    }

    pub fn staging(&self) -> Option<&StagingSlots> {
        self.staging.as_ref()
    }
}

impl Presenter for RecordingPresenter {
    fn on_collected(&mut self, collected: Collected) {
        self.events.push(PresenterEvent::Collected(collected));
    }

    fn on_spawn_effect(&mut self, at: Footprint) {
        self.events.push(PresenterEvent::SpawnEffect(at));
    }

    fn request_move(&mut self, request: MoveRequest) {
        self.events.push(PresenterEvent::Move(request));
    }

    fn acquire_staging_slot(&mut self) -> Option<SlotId> {
        self.staging.as_mut()?.acquire()
    }

    fn release_staging_slot(&mut self, slot: SlotId) {
        if let Some(staging) = self.staging.as_mut() {
            staging.release(slot);
        }
    }
}
