//! Pooled, fixed-capacity row buffers for allocation-free streaming.
//!
//! A frame holds one row's worth of encoded wire values: a slot per value
//! plus a fixed byte arena the encoded bytes are copied into. Frames are
//! acquired from a shared pool, exclusively owned until returned, and
//! reused across rows via `clear`.

use crate::error::Result;
use crate::rows::Row;
use crate::types::{TypeRef, WireType, WireValue};
use smallvec::SmallVec;
use std::sync::Mutex;

/// Size of each frame's fixed byte arena.
pub const FRAME_ARENA_SIZE: usize = 1024;

/// Value slots held inline before the slot array spills to the heap.
pub const FRAME_VALUE_SLOTS: usize = 16;

enum Slot {
    /// Bytes live in the frame arena at [start, start+len).
    Arena {
        wire_type: WireType,
        start: u32,
        len: u32,
    },
    /// Bytes that did not fit the arena get a dedicated buffer.
    Heap {
        wire_type: WireType,
        bytes: Box<[u8]>,
    },
}

pub struct RowFrame {
    slots: SmallVec<[Slot; FRAME_VALUE_SLOTS]>,
    arena: Box<[u8; FRAME_ARENA_SIZE]>,
    off: usize,
}

impl Default for RowFrame {
    fn default() -> Self {
        RowFrame {
            slots: SmallVec::new(),
            arena: Box::new([0u8; FRAME_ARENA_SIZE]),
            off: 0,
        }
    }
}

impl RowFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Copy one encoded value into the frame. Values that fit the
    /// remaining arena land there; larger ones degrade gracefully to a
    /// dedicated heap buffer. Never fails.
    pub fn append(&mut self, v: &WireValue) {
        let len = v.bytes.len();
        if self.off + len <= FRAME_ARENA_SIZE {
            self.arena[self.off..self.off + len].copy_from_slice(&v.bytes);
            self.slots.push(Slot::Arena {
                wire_type: v.wire_type,
                start: self.off as u32,
                len: len as u32,
            });
            self.off += len;
        } else {
            self.slots.push(Slot::Heap {
                wire_type: v.wire_type,
                bytes: v.bytes.clone().into_boxed_slice(),
            });
        }
    }

    /// Encode each column of a row via its type and append the results.
    pub fn append_row(&mut self, types: &[TypeRef], row: &Row) -> Result<()> {
        for (ty, v) in types.iter().zip(row.iter()) {
            let wire = ty.sql(v)?;
            self.append(&wire);
        }
        Ok(())
    }

    /// Zero-copy read of one value. The returned slice aliases frame
    /// storage and is only valid until the next `clear`; the borrow
    /// checker scopes it accordingly.
    pub fn value(&self, i: usize) -> Option<(WireType, &[u8])> {
        self.slots.get(i).map(|slot| match slot {
            Slot::Arena {
                wire_type,
                start,
                len,
            } => (
                *wire_type,
                &self.arena[*start as usize..(*start + *len) as usize],
            ),
            Slot::Heap { wire_type, bytes } => (*wire_type, &bytes[..]),
        })
    }

    /// Zero-copy view over all values, in append order.
    pub fn iter(&self) -> impl Iterator<Item = (WireType, &[u8])> + '_ {
        (0..self.slots.len()).filter_map(|i| self.value(i))
    }

    /// Deep-copying view, safe to retain across `clear` and pool reuse.
    pub fn to_wire_row(&self) -> Vec<WireValue> {
        self.iter()
            .map(|(wire_type, bytes)| WireValue::new(wire_type, bytes.to_vec()))
            .collect()
    }

    /// Reset value count and arena cursor without erasing prior byte
    /// contents; subsequent appends overwrite.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.off = 0;
    }
}

/// Shared concurrent pool of row frames. A frame handed out by `get` is
/// exclusively owned by the holder until `put` returns it.
#[derive(Default)]
pub struct FramePool {
    frames: Mutex<Vec<Box<RowFrame>>>,
}

impl FramePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cleared frame, reused when one is available.
    pub fn get(&self) -> Box<RowFrame> {
        let reused = self.frames.lock().expect("frame pool poisoned").pop();
        match reused {
            Some(mut frame) => {
                frame.clear();
                frame
            }
            None => {
                tracing::trace!("frame pool empty, allocating a new frame");
                Box::new(RowFrame::new())
            }
        }
    }

    pub fn put(&self, frame: Box<RowFrame>) {
        self.frames.lock().expect("frame pool poisoned").push(frame);
    }
}
