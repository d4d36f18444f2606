//! Reusable stream storage.
//!
//! Boolean operations need short-lived scratch streams. Instead of allocating
//! them per call they are checked out of a generational [`Arena`]: every slot
//! carries a generation counter that is bumped on check-in, so a key that
//! outlives its claim is detected as stale instead of aliasing whoever owns
//! the slot now.

use std::mem;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::errors::StreamError;
use crate::stream::csg_stream::CsgPolyStream;
use crate::stream::{PolyStream, ReadablePolyStream};

/// A stream type that can be parked in an [`Arena`] and handed out again.
pub trait Recycle: Sized {
    /// A fresh, empty value with room for `capacity` polygons
    fn with_capacity(capacity: usize) -> Self;

    /// Reset to the freshly-created state, keeping allocations
    fn recycle(&mut self);
}

/// Identifies one claim of one arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    index: u32,
    generation: u32,
}

impl SlotKey {
    pub const fn index(&self) -> u32 {
        self.index
    }

    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Slot and claim counters of an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArenaStats {
    pub slots: usize,
    pub free: usize,
    pub claimed: usize,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    /// `Some` while the slot is free
    parked: Option<T>,
}

#[derive(Debug)]
struct ArenaState<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    claimed: usize,
}

/// Generational arena of recyclable values, safe to share between threads.
#[derive(Debug)]
pub struct Arena<T> {
    state: Mutex<ArenaState<T>>,
    capacity: usize,
}

impl<T: Recycle> Arena<T> {
    /// Create an arena holding `preallocate` parked values, each with room
    /// for `capacity` polygons.
    pub fn new(preallocate: usize, capacity: usize) -> Self {
        let slots = (0..preallocate)
            .map(|_| Slot {
                generation: 0,
                parked: Some(T::with_capacity(capacity)),
            })
            .collect();
        let free = (0..preallocate as u32).rev().collect();
        Self {
            state: Mutex::new(ArenaState {
                slots,
                free,
                claimed: 0,
            }),
            capacity,
        }
    }

    // A panic while the lock is held cannot leave the bookkeeping half
    // updated, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, ArenaState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take a value out of the arena, growing it if every slot is claimed.
    pub fn checkout(&self) -> (SlotKey, T) {
        let mut state = self.lock();
        state.claimed += 1;
        if let Some(index) = state.free.pop() {
            let slot = &mut state.slots[index as usize];
            if let Some(item) = slot.parked.take() {
                return (
                    SlotKey {
                        index,
                        generation: slot.generation,
                    },
                    item,
                );
            }
        }

        let index = state.slots.len() as u32;
        state.slots.push(Slot {
            generation: 0,
            parked: None,
        });
        drop(state);
        (
            SlotKey {
                index,
                generation: 0,
            },
            T::with_capacity(self.capacity),
        )
    }

    /// Return a value claimed under `key`. The value is recycled before it
    /// is parked, and the slot's generation moves on so `key` goes stale.
    pub fn checkin(&self, key: SlotKey, mut item: T) -> Result<(), StreamError> {
        item.recycle();

        let mut state = self.lock();
        let Some(slot) = state.slots.get_mut(key.index as usize) else {
            return Err(StreamError::UnknownSlot { index: key.index });
        };
        if slot.parked.is_some() && slot.generation == key.generation.wrapping_add(1) {
            return Err(StreamError::DoubleRelease { index: key.index });
        }
        if slot.parked.is_some() || slot.generation != key.generation {
            return Err(StreamError::StaleHandle {
                index: key.index,
                generation: key.generation,
            });
        }

        slot.generation = slot.generation.wrapping_add(1);
        slot.parked = Some(item);
        state.free.push(key.index);
        state.claimed -= 1;
        Ok(())
    }

    /// `true` while `key` names a value that is checked out.
    pub fn is_live(&self, key: SlotKey) -> bool {
        self.lock()
            .slots
            .get(key.index as usize)
            .is_some_and(|slot| slot.parked.is_none() && slot.generation == key.generation)
    }

    pub fn stats(&self) -> ArenaStats {
        let state = self.lock();
        ArenaStats {
            slots: state.slots.len(),
            free: state.free.len(),
            claimed: state.claimed,
        }
    }
}

/// A value checked out of an [`Arena`].
///
/// Dereferences to the value. Hand it back with [`Claimed::release`] to
/// observe release errors; dropping the guard releases it as well and only
/// logs a failure.
#[derive(Debug)]
pub struct Claimed<'pool, T: Recycle> {
    item: T,
    key: SlotKey,
    arena: &'pool Arena<T>,
    returned: bool,
}

impl<'pool, T: Recycle> Claimed<'pool, T> {
    fn new(arena: &'pool Arena<T>) -> Self {
        let (key, item) = arena.checkout();
        log::trace!("claimed slot {} (generation {})", key.index, key.generation);
        Self {
            item,
            key,
            arena,
            returned: false,
        }
    }

    pub const fn key(&self) -> SlotKey {
        self.key
    }

    /// Give the value back to its arena.
    pub fn release(mut self) -> Result<(), StreamError> {
        self.give_back()
    }

    fn give_back(&mut self) -> Result<(), StreamError> {
        self.returned = true;
        let item = mem::replace(&mut self.item, T::with_capacity(0));
        log::trace!("releasing slot {} (generation {})", self.key.index, self.key.generation);
        self.arena.checkin(self.key, item)
    }
}

impl<T: Recycle> Deref for Claimed<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.item
    }
}

impl<T: Recycle> DerefMut for Claimed<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.item
    }
}

impl<T: Recycle> Drop for Claimed<'_, T> {
    fn drop(&mut self) {
        if self.returned {
            return;
        }
        if let Err(err) = self.give_back() {
            log::warn!("dropped stream could not be returned to its pool: {err}");
        }
    }
}

/// Sizing of a [`StreamPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Streams of each kind created up front
    pub preallocate: usize,
    /// Polygon capacity of each new stream
    pub polygon_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            preallocate: 4,
            polygon_capacity: 64,
        }
    }
}

/// Counters for both kinds of pooled stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    pub csg: ArenaStats,
    pub plain: ArenaStats,
}

/// Pool of reusable streams shared by boolean operations.
///
/// The pool may be shared between threads: every operation takes `&self`,
/// and a claimed stream is exclusively owned by its guard until released.
///
/// ```
/// use polycsg::stream::{StreamPool, ReadablePolyStream, WritablePolyStream};
/// use polycsg::mesh::shapes::cuboid;
/// use nalgebra::Point3;
///
/// let pool = StreamPool::<()>::new();
/// let cube = cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0), None);
/// let stream = pool.claim_copy(&cube);
/// assert_eq!(stream.len(), 6);
/// stream.release().unwrap();
/// assert_eq!(pool.stats().csg.claimed, 0);
/// ```
#[derive(Debug)]
pub struct StreamPool<S: Clone> {
    csg: Arena<CsgPolyStream<S>>,
    plain: Arena<PolyStream<S>>,
}

impl<S: Clone> Default for StreamPool<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone> StreamPool<S> {
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            csg: Arena::new(config.preallocate, config.polygon_capacity),
            plain: Arena::new(config.preallocate, config.polygon_capacity),
        }
    }

    /// Claim an empty, writable [`CsgPolyStream`].
    pub fn claim(&self) -> Claimed<'_, CsgPolyStream<S>> {
        Claimed::new(&self.csg)
    }

    /// Claim a [`CsgPolyStream`] pre-populated with copies of `source`.
    pub fn claim_copy<R: ReadablePolyStream<S> + ?Sized>(&self, source: &R) -> Claimed<'_, CsgPolyStream<S>> {
        let mut stream = self.claim();
        stream.extend_unsealed(source.polygons().cloned());
        stream
    }

    /// Claim an empty [`PolyStream`].
    pub fn claim_plain(&self) -> Claimed<'_, PolyStream<S>> {
        Claimed::new(&self.plain)
    }

    /// Give a claimed stream back. Same as [`Claimed::release`].
    pub fn release<T: Recycle>(&self, stream: Claimed<'_, T>) -> Result<(), StreamError> {
        stream.release()
    }

    /// The arena backing [`StreamPool::claim`], for callers that manage keys
    /// themselves.
    pub const fn csg_arena(&self) -> &Arena<CsgPolyStream<S>> {
        &self.csg
    }

    pub const fn plain_arena(&self) -> &Arena<PolyStream<S>> {
        &self.plain
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            csg: self.csg.stats(),
            plain: self.plain.stats(),
        }
    }
}
