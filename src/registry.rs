//! Process-wide descriptor registry.
//!
//! Descriptors are expensive enough to build (and referenced often enough by
//! a bare slot id, mirroring the original's `void*` handles) that the crate
//! keeps a small fixed-capacity table of live ones rather than handing every
//! caller its own independently-owned copy. A descriptor with an identical
//! shape is reused rather than rebuilt, found by a linear scan — the table
//! is capped at [`CAPACITY`] entries, so the scan is cheap and a `HashMap`
//! would be overkill.

use std::sync::{Mutex, OnceLock};

use crate::error::RegistryError;
use crate::mono::Ord;

pub const CAPACITY: usize = 100;

/// The subset of a descriptor's construction parameters that determine
/// whether two requests can share one registry slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub nmv: usize,
    pub var_ords: Vec<Ord>,
    pub map_ords: Vec<Ord>,
    pub ko: Ord,
    pub mo: Ord,
}

struct Slot {
    shape: Shape,
    refcount: usize,
}

struct Table {
    slots: Vec<Option<Slot>>,
}

impl Table {
    fn new() -> Self {
        Table { slots: (0..CAPACITY).map(|_| None).collect() }
    }
}

fn table() -> &'static Mutex<Table> {
    static TABLE: OnceLock<Mutex<Table>> = OnceLock::new();
    TABLE.get_or_init(|| Mutex::new(Table::new()))
}

/// Finds a live slot matching `shape` and bumps its refcount, or claims the
/// first empty slot for a new one. Returns the slot id.
pub fn acquire(shape: Shape) -> Result<usize, RegistryError> {
    let mut t = table().lock().unwrap();
    if let Some(id) = t.slots.iter().position(|s| s.as_ref().is_some_and(|s| s.shape == shape)) {
        t.slots[id].as_mut().unwrap().refcount += 1;
        return Ok(id);
    }
    if let Some(id) = t.slots.iter().position(|s| s.is_none()) {
        t.slots[id] = Some(Slot { shape, refcount: 1 });
        return Ok(id);
    }
    Err(RegistryError::Exhausted { capacity: CAPACITY })
}

/// Drops a reference to `id`, freeing the slot once nothing references it.
pub fn release(id: usize) {
    let mut t = table().lock().unwrap();
    if let Some(slot) = t.slots.get_mut(id).and_then(|s| s.as_mut()) {
        slot.refcount -= 1;
        if slot.refcount == 0 {
            t.slots[id] = None;
        }
    }
}

pub fn shape_of(id: usize) -> Result<Shape, RegistryError> {
    let t = table().lock().unwrap();
    t.slots
        .get(id)
        .and_then(|s| s.as_ref())
        .map(|s| s.shape.clone())
        .ok_or(RegistryError::InvalidSlot { id })
}
