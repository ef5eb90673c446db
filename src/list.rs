//! Arena-backed circular doubly linked list with a sentinel slot.
//!
//! All nodes live in a single `Vec` arena and are addressed by stable integer
//! handles; `prev`/`next` are slot indices rather than owning pointers, so the
//! structure has no reference cycles and removal is a plain slot
//! invalidation. Slot 0 is reserved for the sentinel, which closes the list
//! into a ring (`sentinel.next` is the head, `sentinel.prev` is the tail) and
//! removes every head/tail special case from splicing.
//!
//! All operations the caches rely on are O(1): attach at head, detach by
//! handle, move to head, pop the tail. Freed slots are recycled through a
//! free list so a cache that has reached capacity stops allocating.
//!
//! This module is internal infrastructure; the high-level cache types are the
//! supported API.

use alloc::vec::Vec;
use core::fmt;

extern crate alloc;

/// Sentinel slot index. Never handed out as a [`Handle`].
const SENTINEL: usize = 0;

/// Stable identifier for a live entry in a [`List`].
///
/// A handle stays valid until the entry it names is removed from the list.
/// A stale handle is rejected only while its slot remains free; once the
/// slot is recycled the handle names the new occupant. The cache segments
/// never hold a handle across a removal: the index map is the sole source
/// of handles and is updated on every removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Handle(usize);

impl Handle {
    /// Returns the underlying arena index.
    #[cfg(test)]
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// One arena slot. `value` is `None` for the sentinel and for freed slots.
struct Slot<T> {
    value: Option<T>,
    prev: usize,
    next: usize,
}

/// A doubly linked list whose nodes live in a slot arena.
///
/// Maintains most-recent-first order: `push_front` inserts at the head,
/// `pop_back` removes the tail. The list itself imposes no capacity; the
/// cache segments enforce their capacity bound before inserting.
pub(crate) struct List<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> List<T> {
    /// Creates an empty list containing only the sentinel slot.
    pub(crate) fn new() -> Self {
        let mut slots = Vec::new();
        slots.push(Slot {
            value: None,
            prev: SENTINEL,
            next: SENTINEL,
        });
        List {
            slots,
            free: Vec::new(),
            len: 0,
        }
    }

    /// Creates an empty list with arena space reserved for `cap` entries.
    pub(crate) fn with_capacity(cap: usize) -> Self {
        let mut list = List::new();
        list.slots.reserve(cap);
        list
    }

    /// Returns the current number of entries (sentinel excluded).
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list contains no entries.
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Unlinks `idx` from the ring. The slot itself is left untouched.
    fn detach(&mut self, idx: usize) {
        let prev = self.slots[idx].prev;
        let next = self.slots[idx].next;
        self.slots[prev].next = next;
        self.slots[next].prev = prev;
    }

    /// Links `idx` directly after the sentinel, making it the head.
    fn attach_front(&mut self, idx: usize) {
        let head = self.slots[SENTINEL].next;
        self.slots[idx].prev = SENTINEL;
        self.slots[idx].next = head;
        self.slots[head].prev = idx;
        self.slots[SENTINEL].next = idx;
    }

    /// Returns `true` if `handle` names a live entry in this list.
    fn is_live(&self, handle: Handle) -> bool {
        handle.0 != SENTINEL
            && self
                .slots
                .get(handle.0)
                .map(|slot| slot.value.is_some())
                .unwrap_or(false)
    }

    /// Inserts a value at the head and returns its handle.
    pub(crate) fn push_front(&mut self, value: T) -> Handle {
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx].value = Some(value);
                idx
            }
            None => {
                self.slots.push(Slot {
                    value: Some(value),
                    prev: SENTINEL,
                    next: SENTINEL,
                });
                self.slots.len() - 1
            }
        };
        self.attach_front(idx);
        self.len += 1;
        Handle(idx)
    }

    /// Removes and returns the tail entry, if any.
    pub(crate) fn pop_back(&mut self) -> Option<T> {
        let tail = self.slots[SENTINEL].prev;
        if tail == SENTINEL {
            return None;
        }
        self.remove(Handle(tail))
    }

    /// Removes the entry named by `handle` and returns its value.
    ///
    /// Returns `None` if the handle is stale or names the sentinel.
    pub(crate) fn remove(&mut self, handle: Handle) -> Option<T> {
        if !self.is_live(handle) {
            return None;
        }
        self.detach(handle.0);
        let value = self.slots[handle.0].value.take();
        self.free.push(handle.0);
        self.len -= 1;
        value
    }

    /// Moves an existing entry to the head; returns `false` for stale handles.
    pub(crate) fn move_to_front(&mut self, handle: Handle) -> bool {
        if !self.is_live(handle) {
            return false;
        }
        if self.slots[SENTINEL].next == handle.0 {
            return true;
        }
        self.detach(handle.0);
        self.attach_front(handle.0);
        true
    }

    /// Returns a reference to the value named by `handle`, if live.
    pub(crate) fn get(&self, handle: Handle) -> Option<&T> {
        if handle.0 == SENTINEL {
            return None;
        }
        self.slots.get(handle.0).and_then(|slot| slot.value.as_ref())
    }

    /// Returns a mutable reference to the value named by `handle`, if live.
    pub(crate) fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        if handle.0 == SENTINEL {
            return None;
        }
        self.slots
            .get_mut(handle.0)
            .and_then(|slot| slot.value.as_mut())
    }

    /// Iterates values from head (most recent) to tail (least recent).
    #[cfg(test)]
    pub(crate) fn iter(&self) -> ListIter<'_, T> {
        ListIter {
            list: self,
            current: self.slots[SENTINEL].next,
        }
    }

    /// Iterates `(Handle, &T)` pairs from head to tail.
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn iter_entries(&self) -> ListEntryIter<'_, T> {
        ListEntryIter {
            list: self,
            current: self.slots[SENTINEL].next,
        }
    }

    /// Clears the list, dropping all entries and recycling the arena.
    pub(crate) fn clear(&mut self) {
        self.slots.truncate(1);
        self.slots[SENTINEL].prev = SENTINEL;
        self.slots[SENTINEL].next = SENTINEL;
        self.free.clear();
        self.len = 0;
    }

    /// Walks the ring in both directions and asserts structural consistency.
    ///
    /// Panics with a description of the first violated invariant.
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn debug_validate(&self) {
        let mut count = 0usize;
        let mut prev = SENTINEL;
        let mut current = self.slots[SENTINEL].next;
        while current != SENTINEL {
            let slot = &self.slots[current];
            assert!(slot.value.is_some(), "linked slot {} has no value", current);
            assert_eq!(slot.prev, prev, "broken back-link at slot {}", current);
            prev = current;
            current = slot.next;
            count += 1;
            assert!(count <= self.len, "cycle detected in list");
        }
        assert_eq!(self.slots[SENTINEL].prev, prev, "tail link mismatch");
        assert_eq!(count, self.len, "length does not match linked entries");
        let live = self.slots.iter().filter(|s| s.value.is_some()).count();
        assert_eq!(live, self.len, "arena holds orphaned values");
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        List::new()
    }
}

impl<T> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("len", &self.len)
            .field("slots", &self.slots.len())
            .finish()
    }
}

#[cfg(test)]
pub(crate) struct ListIter<'a, T> {
    list: &'a List<T>,
    current: usize,
}

#[cfg(test)]
impl<'a, T> Iterator for ListIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == SENTINEL {
            return None;
        }
        let slot = &self.list.slots[self.current];
        self.current = slot.next;
        slot.value.as_ref()
    }
}

#[cfg(any(test, debug_assertions))]
pub(crate) struct ListEntryIter<'a, T> {
    list: &'a List<T>,
    current: usize,
}

#[cfg(any(test, debug_assertions))]
impl<'a, T> Iterator for ListEntryIter<'a, T> {
    type Item = (Handle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == SENTINEL {
            return None;
        }
        let idx = self.current;
        let slot = &self.list.slots[idx];
        self.current = slot.next;
        slot.value.as_ref().map(|value| (Handle(idx), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;
    use alloc::vec;

    #[test]
    fn test_new_list_is_empty() {
        let list: List<u32> = List::new();
        assert_eq!(list.len(), 0);
        assert!(list.is_empty());
        assert!(list.iter().next().is_none());
        list.debug_validate();
    }

    #[test]
    fn test_push_front_orders_most_recent_first() {
        let mut list = List::new();
        list.push_front(10);
        list.push_front(20);
        list.push_front(30);
        let values: Vec<_> = list.iter().copied().collect();
        assert_eq!(values, vec![30, 20, 10]);
        list.debug_validate();
    }

    #[test]
    fn test_pop_back_returns_oldest() {
        let mut list = List::new();
        list.push_front(1);
        list.push_front(2);
        list.push_front(3);

        assert_eq!(list.pop_back(), Some(1));
        assert_eq!(list.pop_back(), Some(2));
        assert_eq!(list.pop_back(), Some(3));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_remove_by_handle() {
        let mut list = List::new();
        let a = list.push_front("a");
        let b = list.push_front("b");
        let c = list.push_front("c");

        assert_eq!(list.remove(b), Some("b"));
        assert_eq!(list.len(), 2);
        let values: Vec<_> = list.iter().copied().collect();
        assert_eq!(values, vec!["c", "a"]);

        // Stale handle is rejected.
        assert_eq!(list.remove(b), None);
        assert_eq!(list.len(), 2);

        assert_eq!(list.remove(a), Some("a"));
        assert_eq!(list.remove(c), Some("c"));
        assert!(list.is_empty());
        list.debug_validate();
    }

    #[test]
    fn test_move_to_front() {
        let mut list = List::new();
        let a = list.push_front(1);
        let _b = list.push_front(2);
        let c = list.push_front(3);

        assert!(list.move_to_front(a));
        let values: Vec<_> = list.iter().copied().collect();
        assert_eq!(values, vec![1, 3, 2]);

        // Moving the head is a no-op that still succeeds.
        assert!(list.move_to_front(a));
        let values: Vec<_> = list.iter().copied().collect();
        assert_eq!(values, vec![1, 3, 2]);

        assert!(list.move_to_front(c));
        assert_eq!(list.pop_back(), Some(2));
        list.debug_validate();
    }

    #[test]
    fn test_move_to_front_stale_handle() {
        let mut list = List::new();
        let a = list.push_front(1);
        assert_eq!(list.remove(a), Some(1));
        assert!(!list.move_to_front(a));
    }

    #[test]
    fn test_slot_reuse_after_remove() {
        let mut list = List::new();
        let a = list.push_front(1);
        list.push_front(2);
        assert_eq!(list.remove(a), Some(1));

        // The freed slot is recycled for the next insertion.
        let c = list.push_front(3);
        assert_eq!(c.index(), a.index());
        assert_eq!(list.len(), 2);
        list.debug_validate();
    }

    #[test]
    fn test_get_and_get_mut() {
        let mut list = List::new();
        let h = list.push_front(String::from("value"));

        assert_eq!(list.get(h).map(String::as_str), Some("value"));
        if let Some(v) = list.get_mut(h) {
            v.push_str("-changed");
        }
        assert_eq!(list.get(h).map(String::as_str), Some("value-changed"));

        list.remove(h);
        assert_eq!(list.get(h), None);
        assert!(list.get_mut(h).is_none());
    }

    #[test]
    fn test_iter_entries_yields_live_handles() {
        let mut list = List::new();
        let a = list.push_front("a");
        let b = list.push_front("b");

        let entries: Vec<_> = list.iter_entries().map(|(h, v)| (h, *v)).collect();
        assert_eq!(entries, vec![(b, "b"), (a, "a")]);
    }

    #[test]
    fn test_clear_resets_arena() {
        let mut list = List::with_capacity(4);
        list.push_front(1);
        list.push_front(2);
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.pop_back(), None);

        list.push_front(3);
        assert_eq!(list.len(), 1);
        assert_eq!(list.pop_back(), Some(3));
        list.debug_validate();
    }

    #[test]
    fn test_interleaved_operations_keep_invariants() {
        let mut list = List::new();
        let mut handles = Vec::new();
        for i in 0..8 {
            handles.push(list.push_front(i));
        }
        list.move_to_front(handles[0]);
        list.move_to_front(handles[4]);
        list.remove(handles[2]);
        list.remove(handles[7]);
        list.pop_back();
        list.push_front(100);
        list.debug_validate();
        assert_eq!(list.len(), 6);
    }
}
