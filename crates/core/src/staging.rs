//! Staging slots - a small pool of places where collected pieces wait
//!
//! Presenters embed a pool to back [`Presenter::acquire_staging_slot`]. Running
//! out of slots is not an error: the match still resolves, the collected
//! piece just has nowhere to be staged.
//!
//! [`Presenter::acquire_staging_slot`]: crate::Presenter::acquire_staging_slot

use crate::types::SlotId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingSlots {
    occupied: Vec<bool>,
}

impl StagingSlots {
    pub fn new(capacity: u8) -> Self {
        Self {
            occupied: vec![false; capacity as usize],
        }
    }

    pub fn capacity(&self) -> usize {
        self.occupied.len()
    }

    pub fn free_count(&self) -> usize {
        self.occupied.iter().filter(|o| !**o).count()
    }

    /// Claim the first free slot
    pub fn acquire(&mut self) -> Option<SlotId> {
        let idx = self.occupied.iter().position(|o| !*o)?;
        self.occupied[idx] = true;
        Some(SlotId(idx as u8))
    }

    /// Free a slot. Returns false for an unknown or already free slot.
    pub fn release(&mut self, slot: SlotId) -> bool {
        match self.occupied.get_mut(slot.0 as usize) {
            Some(o) if *o => {
                *o = false;
                true
            }
            _ => false,
        }
    }

    pub fn is_occupied(&self, slot: SlotId) -> bool {
        self.occupied.get(slot.0 as usize).copied().unwrap_or(false)
    }
}
