use super::{Clip, ClipId};

struct Slot {
    generation: u32,
    clip: Option<Box<dyn Clip>>,
}

/// Stable storage for live clips plus their explicit traversal order.
///
/// Vacated slots go on a free list and are reused by later inserts with a
/// bumped generation, so the slot count is bounded by the peak number of
/// live clips and a stale `ClipId` never reaches a newer clip.
#[derive(Default)]
pub struct ClipArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    order: Vec<ClipId>,
}

impl ClipArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a clip at the tail of the traversal order.
    pub fn insert(&mut self, clip: Box<dyn Clip>) -> ClipId {
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.clip = Some(clip);
                ClipId::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    clip: Some(clip),
                });
                ClipId::new(index, 0)
            }
        };
        self.order.push(id);
        id
    }

    /// Unlinks a clip without invoking its destroy hook.
    pub fn remove(&mut self, id: ClipId) -> Option<Box<dyn Clip>> {
        let clip = self.take_slot(id)?;
        self.order.retain(|live| *live != id);
        Some(clip)
    }

    #[must_use]
    pub fn contains(&self, id: ClipId) -> bool {
        self.slot(id).is_some_and(|slot| slot.clip.is_some())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Live clip ids, head to tail.
    #[must_use]
    pub fn ids(&self) -> &[ClipId] {
        &self.order
    }

    /// Number of allocated slots, live or vacant.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Drops every clip. Destroy hooks are not invoked: the clips did not finish.
    pub fn clear(&mut self) {
        for id in std::mem::take(&mut self.order) {
            drop(self.take_slot(id));
        }
    }

    pub(crate) fn take_order(&mut self) -> Vec<ClipId> {
        std::mem::take(&mut self.order)
    }

    pub(crate) fn restore_order(&mut self, order: Vec<ClipId>) {
        debug_assert!(self.order.is_empty(), "order restored over a live list");
        self.order = order;
    }

    pub(crate) fn get_mut(&mut self, id: ClipId) -> Option<&mut Box<dyn Clip>> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.clip.as_mut()
    }

    /// Vacates the slot behind `id`. The order list is left to the caller.
    pub(crate) fn take_slot(&mut self, id: ClipId) -> Option<Box<dyn Clip>> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        let clip = slot.clip.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        Some(clip)
    }

    fn slot(&self, id: ClipId) -> Option<&Slot> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
    }
}

impl std::fmt::Debug for ClipArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipArena")
            .field("order", &self.order)
            .field("slots", &self.slots.len())
            .field("free", &self.free.len())
            .finish()
    }
}
