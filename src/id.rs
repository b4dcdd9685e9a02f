//! Generational-index arena used by the topology store.
//!
//! The mesh is a graph of cycles -- a triangle references its edges, which
//! reference the triangle back; parents reference children; midpoint nodes
//! reference four sibling triangles and four sibling edges. Rather than
//! fight the borrow checker with `Rc<RefCell<_>>` everywhere we store every
//! entity by value in an arena and refer to it elsewhere by a small `Copy`
//! handle. A handle that outlives its entity (a stale `NodeId` held by some
//! other entity after a coarsen) is caught by the generation check instead
//! of silently aliasing a reused slot.
//!
//! Slots are never recycled: removing an entity tombstones its slot but
//! does not free the index for reuse. Every algorithm in this crate walks
//! entities in the stable insertion order the source's intrusive linked
//! list gave it "for free"; a recycling arena would let a later `insert`
//! reappear in an earlier iteration position and break that guarantee.

use std::fmt;
use std::marker::PhantomData;

/// A stable handle into an [`Arena`]. Carries a generation so that a handle
/// to a removed entity cannot alias whatever (nothing, with this arena)
/// later occupies its slot.
pub struct Id<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}
impl<T> Eq for Id<T> {}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({}#{})", self.index, self.generation)
    }
}

impl<T> Id<T> {
    /// The dense slot index at the time this handle was minted. Only valid
    /// to use directly once the leaf-index refresh has run; before that it
    /// is just the raw arena slot and is exposed for diagnostics only.
    pub fn slot(self) -> usize {
        self.index as usize
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Owns every entity of one kind (nodes, edges, triangles or boundaries)
/// and hands out generational [`Id`]s. Mirrors the source's `icfList` in
/// role -- insertion-ordered, O(1) removal given the handle -- without the
/// void-pointer duck typing.
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    live_count: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Arena {
            slots: Vec::new(),
            live_count: 0,
        }
    }

    pub fn insert(&mut self, value: T) -> Id<T> {
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        self.live_count += 1;
        Id {
            index,
            generation: 0,
            _marker: PhantomData,
        }
    }

    /// Removes the entity. Removing a handle that is not a current member
    /// (already removed, or from a different arena) is a programming error
    /// and panics -- the source treats this the same way (`free` on a
    /// dangling stack position is not a recoverable condition).
    pub fn remove(&mut self, id: Id<T>) -> T {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .expect("removed entity id out of range");
        assert_eq!(
            slot.generation, id.generation,
            "removed entity id refers to a stale/already-removed slot"
        );
        let value = slot.value.take().expect("entity already removed");
        slot.generation = slot.generation.wrapping_add(1);
        self.live_count -= 1;
        value
    }

    pub fn get(&self, id: Id<T>) -> &T {
        let slot = &self.slots[id.index as usize];
        assert_eq!(slot.generation, id.generation, "stale entity id");
        slot.value.as_ref().expect("entity already removed")
    }

    pub fn get_mut(&mut self, id: Id<T>) -> &mut T {
        let slot = &mut self.slots[id.index as usize];
        assert_eq!(slot.generation, id.generation, "stale entity id");
        slot.value.as_mut().expect("entity already removed")
    }

    pub fn contains(&self, id: Id<T>) -> bool {
        self.slots
            .get(id.index as usize)
            .map(|s| s.generation == id.generation && s.value.is_some())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.live_count
    }

    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Iterates live entities in stable insertion order, pairing each with
    /// its id. Every refinement/coarsening/leaf-index pass relies on this
    /// order for determinism (R2, R3).
    pub fn iter(&self) -> impl Iterator<Item = (Id<T>, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.value.as_ref().map(|v| {
                (
                    Id {
                        index: i as u32,
                        generation: slot.generation,
                        _marker: PhantomData,
                    },
                    v,
                )
            })
        })
    }

    pub fn ids(&self) -> impl Iterator<Item = Id<T>> + '_ {
        self.iter().map(|(id, _)| id)
    }
}
