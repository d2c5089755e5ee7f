use std::fmt::{Debug, Display};

use crate::error::Error;

/// Identifier of an object owned by a [`Context`](crate::Context).
///
/// An id is only valid in the context that issued it, and only until the
/// object is destroyed. The slot of a destroyed object may be reused, but
/// with a new generation, so stale ids are always rejected.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct ObjectId {
    context: u32,
    index: u32,
    generation: u32,
}

impl ObjectId {
    /// Dense index of the slot holding the object.
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Object({}/{}#{})",
            self.context, self.index, self.generation
        )
    }
}

impl Debug for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot map of objects, addressed by generation checked [`ObjectId`]s.
#[derive(Debug, Clone)]
pub(crate) struct Registry<T> {
    context: u32,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> Registry<T> {
    pub fn new(context: u32) -> Self {
        Registry {
            context,
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn insert(&mut self, value: T) -> ObjectId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.value = Some(value);
                ObjectId {
                    context: self.context,
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    value: Some(value),
                });
                ObjectId {
                    context: self.context,
                    index,
                    generation: 0,
                }
            }
        }
    }

    fn slot(&self, id: ObjectId) -> Option<&Slot<T>> {
        if id.context != self.context {
            return None;
        }
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.slot(id).is_some_and(|s| s.value.is_some())
    }

    pub fn get(&self, id: ObjectId) -> Result<&T, Error> {
        self.slot(id)
            .and_then(|s| s.value.as_ref())
            .ok_or(Error::InvalidObject(id))
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Result<&mut T, Error> {
        if id.context != self.context {
            return Err(Error::InvalidObject(id));
        }
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.value.as_mut())
            .ok_or(Error::InvalidObject(id))
    }

    /// Remove the object, invalidating its id.
    pub fn remove(&mut self, id: ObjectId) -> Result<T, Error> {
        if !self.contains(id) {
            return Err(Error::InvalidObject(id));
        }
        let slot = &mut self.slots[id.index as usize];
        let value = slot.value.take().ok_or(Error::InvalidObject(id))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Ok(value)
    }

    /// Ids of all live objects, in slot order.
    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + use<'_, T> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.value.as_ref().map(|_| ObjectId {
                context: self.context,
                index: i as u32,
                generation: s.generation,
            })
        })
    }
}
