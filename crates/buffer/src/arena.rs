// Chunk: docs/chunks/slot_arena - Generation-checked slot arena

//! Generation-checked slot arena.
//!
//! Lines, groups, marks and frames refer to each other by [`Handle`] rather
//! than by reference. A handle is a slot index plus the generation the slot
//! had when the value was stored; freeing a slot bumps its generation, so a
//! handle that outlives its value is detected instead of silently aliasing
//! whatever reuses the slot.
//!
//! Vacant slots are kept on a free stack. [`Arena::refill`] pre-creates a batch
//! of vacant slots so pooled allocation grows in fixed steps.

use std::collections::TryReserveError;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// A stable, copyable reference to a value stored in an [`Arena`].
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Returns the slot index this handle addresses.
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

// Manual impls: derives would demand `T: Clone` etc. for a handle that never
// owns a `T`.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug)]
enum Slot<T> {
    Occupied { generation: u32, value: T },
    Vacant { generation: u32 },
}

/// Slot storage with an explicit free stack.
#[derive(Debug)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Arena<T> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Returns the number of live values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no values are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of vacant slots ready for reuse.
    pub fn free_slots(&self) -> usize {
        self.free.len()
    }

    /// Makes sure `additional` insertions can proceed without allocating.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let needed = additional.saturating_sub(self.free.len());
        self.slots.try_reserve(needed)?;
        self.free.try_reserve(needed)
    }

    /// Appends `batch` vacant slots to the free stack.
    ///
    /// Slots are handed out lowest index first.
    pub fn refill(&mut self, batch: usize) -> Result<(), TryReserveError> {
        self.slots.try_reserve(batch)?;
        self.free.try_reserve(batch)?;
        let start = self.slots.len();
        self.slots
            .extend((0..batch).map(|_| Slot::Vacant { generation: 0 }));
        self.free
            .extend((start..start + batch).rev().map(|index| index as u32));
        Ok(())
    }

    /// Returns the handle the next insertion will be given.
    ///
    /// Lets a value be built that refers to its own handle through other
    /// arenas before it is stored.
    pub fn next_handle(&self) -> Handle<T> {
        match self.free.last() {
            Some(&index) => match &self.slots[index as usize] {
                Slot::Vacant { generation } => Handle::new(index, *generation),
                Slot::Occupied { .. } => unreachable!("free stack points at an occupied slot"),
            },
            None => Handle::new(self.slots.len() as u32, 0),
        }
    }

    /// Stores a value, returning its handle.
    ///
    /// Aborts on allocation failure like `Vec::push`; callers that must fail
    /// gracefully call [`Arena::try_reserve`] first.
    pub fn insert(&mut self, value: T) -> Handle<T> {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            let generation = match slot {
                Slot::Vacant { generation } => *generation,
                Slot::Occupied { .. } => unreachable!("free stack points at an occupied slot"),
            };
            *slot = Slot::Occupied { generation, value };
            return Handle::new(index, generation);
        }

        debug_assert!(self.slots.len() < u32::MAX as usize, "arena exhausted");
        let handle = Handle::new(self.slots.len() as u32, 0);
        self.slots.push(Slot::Occupied {
            generation: 0,
            value,
        });
        handle
    }

    /// Removes and returns the value behind `handle`.
    ///
    /// Returns `None` for a stale handle; the slot is left untouched.
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        match slot {
            Slot::Occupied { generation, .. } if *generation == handle.generation => {
                let next = generation.wrapping_add(1);
                let old = std::mem::replace(slot, Slot::Vacant { generation: next });
                self.free.push(handle.index);
                self.len -= 1;
                match old {
                    Slot::Occupied { value, .. } => Some(value),
                    Slot::Vacant { .. } => None,
                }
            }
            _ => None,
        }
    }

    /// Returns true if `handle` still refers to a live value.
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        match self.slots.get(handle.index as usize)? {
            Slot::Occupied { generation, value } if *generation == handle.generation => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        match self.slots.get_mut(handle.index as usize)? {
            Slot::Occupied { generation, value } if *generation == handle.generation => Some(value),
            _ => None,
        }
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<Handle<T>> for Arena<T> {
    type Output = T;

    fn index(&self, handle: Handle<T>) -> &T {
        match self.get(handle) {
            Some(value) => value,
            None => panic!("stale or foreign handle {handle:?}"),
        }
    }
}

impl<T> IndexMut<Handle<T>> for Arena<T> {
    fn index_mut(&mut self, handle: Handle<T>) -> &mut T {
        match self.get_mut(handle) {
            Some(value) => value,
            None => panic!("stale or foreign handle {handle:?}"),
        }
    }
}
