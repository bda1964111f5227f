//! Object pools for obstacles and items
//!
//! Slots are never freed. `release` parks a slot on a per-kind free list so
//! steady-state spawning reuses memory instead of allocating; the pool only
//! grows while the peak concurrent population of a kind is still rising.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Implemented by pooled entity types
pub trait PoolEntity {
    type Kind: Copy + Eq + Hash + Debug;

    fn kind(&self) -> Self::Kind;
    fn in_use(&self) -> bool;
}

#[derive(Debug)]
pub struct Pool<E: PoolEntity> {
    slots: Vec<E>,
    free: HashMap<E::Kind, Vec<usize>>,
}

impl<E: PoolEntity> Default for Pool<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: PoolEntity> Pool<E> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: HashMap::new(),
        }
    }

    /// Total slots ever allocated (the pool never shrinks)
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Claim a slot of `kind`: pops the free list, or appends via `make`
    /// when no inactive slot of that kind exists. The caller reconfigures
    /// the returned slot in place.
    pub fn acquire(&mut self, kind: E::Kind, make: impl FnOnce() -> E) -> usize {
        if let Some(idx) = self.free.get_mut(&kind).and_then(|slots| slots.pop()) {
            idx
        } else {
            self.slots.push(make());
            self.slots.len() - 1
        }
    }

    /// Return an inactive slot to its kind's free list
    pub fn release(&mut self, idx: usize) {
        debug_assert!(!self.slots[idx].in_use(), "released an in-use slot");
        let kind = self.slots[idx].kind();
        self.free.entry(kind).or_default().push(idx);
    }

    pub fn get(&self, idx: usize) -> &E {
        &self.slots[idx]
    }

    pub fn get_mut(&mut self, idx: usize) -> &mut E {
        &mut self.slots[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.slots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug)]
    struct Slot {
        kind: u8,
        active: bool,
    }

    impl PoolEntity for Slot {
        type Kind = u8;

        fn kind(&self) -> u8 {
            self.kind
        }

        fn in_use(&self) -> bool {
            self.active
        }
    }

    fn acquire_active(pool: &mut Pool<Slot>, kind: u8) -> usize {
        let idx = pool.acquire(kind, || Slot { kind, active: false });
        pool.get_mut(idx).active = true;
        idx
    }

    #[test]
    fn test_acquire_reuses_same_kind() {
        let mut pool: Pool<Slot> = Pool::new();
        let a = acquire_active(&mut pool, 1);
        pool.get_mut(a).active = false;
        pool.release(a);

        let b = acquire_active(&mut pool, 1);
        assert_eq!(a, b);
        assert_eq!(pool.len(), 1);

        // A different kind gets a fresh slot even while kind 1 is free
        pool.get_mut(b).active = false;
        pool.release(b);
        let c = acquire_active(&mut pool, 2);
        assert_ne!(c, b);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_pool_never_exceeds_peak() {
        let mut pool: Pool<Slot> = Pool::new();
        // Peak of 3 concurrently active slots
        for _ in 0..100 {
            let held: Vec<usize> = (0..3).map(|_| acquire_active(&mut pool, 7)).collect();
            for idx in held {
                pool.get_mut(idx).active = false;
                pool.release(idx);
            }
        }
        assert_eq!(pool.len(), 3);
    }

    proptest! {
        #[test]
        fn prop_pool_growth_bounded_by_peak(ops in prop::collection::vec(0u8..2, 1..200)) {
            let mut pool: Pool<Slot> = Pool::new();
            let mut held: Vec<usize> = Vec::new();
            let mut peak = 0usize;
            for op in ops {
                if op == 0 || held.is_empty() {
                    held.push(acquire_active(&mut pool, 3));
                    peak = peak.max(held.len());
                } else {
                    let idx = held.pop().unwrap();
                    pool.get_mut(idx).active = false;
                    pool.release(idx);
                }
            }
            prop_assert_eq!(pool.len(), peak);
        }
    }
}
