//! Three-slot CPU buffer rotation.
//!
//! The host lends three [`PixelBuffer`]s to a CPU-mode module every cook. At the end of the cook
//! the module's [`CpuSlots::set_upload_slot`] choice is applied:
//!
//! - `0..=2`: that slot is uploaded and retired. Its buffer moves into the displayed texture and
//!   the slot gets a fresh allocation before the next cook.
//! - `-1` (default): nothing is uploaded; the previous texture stays on display.
//! - anything else: contract violation, nothing is uploaded.
//!
//! The two slots not uploaded keep their allocations across cooks, so a module can fill them
//! ahead of time. Handing a buffer to a background thread is done with [`CpuSlots::take`] and
//! [`CpuSlots::restore`]: ownership enforces the single-writer-per-slot rule without locks.

use crate::buffers::pixel::{BufferId, PixelBuffer};
use crate::foundation::core::PixelType;

/// Number of rotating slots.
pub const SLOT_COUNT: usize = 3;

/// `upload_slot` value meaning "keep the previously uploaded texture".
pub const NO_UPLOAD: i32 = -1;

/// Host-side state of one slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    /// The slot's allocation stays valid across cook boundaries.
    ValidForReuse,
    /// The slot was uploaded and its allocation reclaimed; a replacement is pending.
    Retired,
}

#[derive(Debug)]
struct Slot {
    state: SlotState,
    /// `None` while retired or while the module has the buffer checked out.
    buffer: Option<PixelBuffer>,
    /// Id of the buffer the module checked out with [`CpuSlots::take`].
    lent: Option<BufferId>,
}

impl Slot {
    fn fresh(width: u32, height: u32, pixel_type: PixelType) -> Self {
        Self {
            state: SlotState::ValidForReuse,
            buffer: Some(PixelBuffer::new(width, height, pixel_type)),
            lent: None,
        }
    }

    fn id(&self) -> Option<BufferId> {
        self.buffer.as_ref().map(PixelBuffer::id).or(self.lent)
    }
}

/// Result of applying the module's upload choice.
#[derive(Debug)]
pub(crate) enum UploadOutcome {
    /// `slot` was uploaded; its buffer is handed to the texture.
    Uploaded { slot: usize, buffer: PixelBuffer },
    /// `-1`: nothing uploaded.
    Retained,
    /// A value outside `-1..=2`.
    OutOfRange(i32),
    /// A valid index whose buffer is checked out by the module.
    NotResident(usize),
}

/// The three CPU slots of one operator instance, plus the module's upload choice.
#[derive(Debug)]
pub struct CpuSlots {
    slots: [Slot; SLOT_COUNT],
    width: u32,
    height: u32,
    pixel_type: PixelType,
    upload_slot: i32,
}

impl CpuSlots {
    pub(crate) fn new(width: u32, height: u32, pixel_type: PixelType) -> Self {
        Self {
            slots: std::array::from_fn(|_| Slot::fresh(width, height, pixel_type)),
            width,
            height,
            pixel_type,
            upload_slot: NO_UPLOAD,
        }
    }

    /// Prepare the slots for a cook.
    ///
    /// Retired slots get fresh allocations. A geometry change reallocates all three slots; buffers
    /// the module still has checked out become stale and can no longer be restored.
    pub(crate) fn begin_cook(&mut self, width: u32, height: u32, pixel_type: PixelType) {
        if (width, height, pixel_type) != (self.width, self.height, self.pixel_type) {
            tracing::debug!(width, height, ?pixel_type, "cpu slot geometry changed, reallocating");
            *self = Self::new(width, height, pixel_type);
            return;
        }

        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.state == SlotState::Retired {
                *slot = Slot::fresh(width, height, pixel_type);
                tracing::debug!(slot = i, id = ?slot.id(), "replaced retired slot");
            }
        }
        self.upload_slot = NO_UPLOAD;
    }

    /// Apply the module's upload choice. Called once, right after `execute` returns.
    pub(crate) fn end_cook(&mut self) -> UploadOutcome {
        let choice = std::mem::replace(&mut self.upload_slot, NO_UPLOAD);
        if choice == NO_UPLOAD {
            return UploadOutcome::Retained;
        }
        let Some(index) = usize::try_from(choice).ok().filter(|&i| i < SLOT_COUNT) else {
            return UploadOutcome::OutOfRange(choice);
        };

        let slot = &mut self.slots[index];
        match slot.buffer.take() {
            Some(buffer) => {
                slot.state = SlotState::Retired;
                tracing::debug!(slot = index, id = ?buffer.id(), "slot uploaded and retired");
                UploadOutcome::Uploaded {
                    slot: index,
                    buffer,
                }
            }
            None => UploadOutcome::NotResident(index),
        }
    }

    /// Slot width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Slot height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Slot pixel layout.
    pub fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    /// Host-side state of slot `index`.
    pub fn state(&self, index: usize) -> Option<SlotState> {
        self.slots.get(index).map(|s| s.state)
    }

    /// Allocation id of slot `index`, including a buffer that is currently checked out.
    pub fn id(&self, index: usize) -> Option<BufferId> {
        self.slots.get(index).and_then(Slot::id)
    }

    /// `true` when slot `index` holds its buffer (not retired, not checked out).
    pub fn is_resident(&self, index: usize) -> bool {
        self.slots
            .get(index)
            .is_some_and(|s| s.buffer.is_some())
    }

    /// Borrow slot `index`.
    pub fn slot(&self, index: usize) -> Option<&PixelBuffer> {
        self.slots.get(index).and_then(|s| s.buffer.as_ref())
    }

    /// Borrow slot `index` for writing.
    pub fn slot_mut(&mut self, index: usize) -> Option<&mut PixelBuffer> {
        self.slots.get_mut(index).and_then(|s| s.buffer.as_mut())
    }

    /// `true` while slot `index` is checked out with [`CpuSlots::take`].
    pub fn is_lent(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|s| s.lent.is_some())
    }

    /// Check out slot `index` so another thread can fill it.
    ///
    /// The slot keeps its allocation id while checked out. Hand the buffer back with
    /// [`CpuSlots::restore`] in this or a later cook before selecting the slot for upload.
    /// A dropped buffer leaves the slot empty until [`CpuSlots::reclaim`] or a geometry change.
    pub fn take(&mut self, index: usize) -> Option<PixelBuffer> {
        let slot = self.slots.get_mut(index)?;
        if slot.state != SlotState::ValidForReuse {
            return None;
        }
        let buffer = slot.buffer.take()?;
        slot.lent = Some(buffer.id());
        Some(buffer)
    }

    /// Return a buffer obtained from [`CpuSlots::take`]. Yields the slot index it went back to.
    ///
    /// Buffers that no longer belong to any slot (for example after a resize) are handed back
    /// unchanged in `Err`.
    pub fn restore(&mut self, buffer: PixelBuffer) -> Result<usize, PixelBuffer> {
        let id = buffer.id();
        let Some(index) = self.slots.iter().position(|s| s.lent == Some(id)) else {
            return Err(buffer);
        };
        if !buffer.matches(self.width, self.height, self.pixel_type) {
            return Err(buffer);
        }
        let slot = &mut self.slots[index];
        slot.lent = None;
        slot.buffer = Some(buffer);
        Ok(index)
    }

    /// Give a checked-out slot a fresh allocation, abandoning the lent buffer.
    ///
    /// Returns `false` when the slot is not checked out. A later [`CpuSlots::restore`] of the
    /// abandoned buffer fails.
    pub fn reclaim(&mut self, index: usize) -> bool {
        let (width, height, pixel_type) = (self.width, self.height, self.pixel_type);
        match self.slots.get_mut(index) {
            Some(slot) if slot.lent.is_some() => {
                *slot = Slot::fresh(width, height, pixel_type);
                tracing::debug!(slot = index, id = ?slot.id(), "reclaimed lent slot");
                true
            }
            _ => false,
        }
    }

    /// Choose what the host does after `execute` returns. See the module docs for values.
    ///
    /// Resets to [`NO_UPLOAD`] at the start of every cook.
    pub fn set_upload_slot(&mut self, slot: i32) {
        self.upload_slot = slot;
    }

    /// Current upload choice.
    pub fn upload_slot(&self) -> i32 {
        self.upload_slot
    }
}

#[cfg(test)]
#[path = "../../tests/unit/buffers/slots.rs"]
mod tests;
