//! The list engine: an unrolled linked list over an arena of segments.
//!
//! # Overview
//!
//! [`UnrolledList`] is a random-access sequence stored as a doubly linked
//! chain of fixed-capacity array segments. Reads walk at most half the chain
//! (resolution starts from whichever end is closer), while mid-sequence
//! insertion and removal touch a single segment plus, occasionally, a spawned
//! or unlinked neighbor — far cheaper than shifting the tail of one large
//! contiguous array.
//!
//! The segment chain is realized as an arena: segments live in a slab of
//! stable slots and refer to their neighbors by index, never by owning
//! references, so the doubly linked structure stays cycle-free in ownership
//! terms.
//!
//! # Interior mutability and fail-fast handles
//!
//! Every operation takes `&self`; the engine state lives behind a [`RefCell`].
//! This is what makes the fail-fast contract *meaningful*: an iterator,
//! cursor, or range view is a plain borrow of the list carrying a snapshot of
//! the list's modification counter, and the list can still be mutated while
//! such a handle is alive. The next use of a stale handle — including a pure
//! read — panics instead of returning stale data. With exclusive-borrow
//! mutators none of those interleavings would compile and the counter would
//! protect nothing.
//!
//! The price is that reads hand out clones (`T: Clone` on reading methods):
//! no reference into the engine may outlive its `RefCell` guard.
//!
//! # Examples
//!
//! ```rust
//! use unrolled_list::UnrolledList;
//!
//! let list: UnrolledList<i32> = (0..10).collect();
//! assert_eq!(list.len(), 10);
//! assert_eq!(list.get(7), 7);
//!
//! list.insert(3, 100);
//! list.remove_range(5..8);
//! assert_eq!(list.to_vec(), vec![0, 1, 2, 100, 3, 7, 8, 9]);
//! ```

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;

use crate::cursor::{
    UnrolledListCursor, UnrolledListDescendingIterator, UnrolledListIntoIterator,
    UnrolledListIterator,
};
use crate::segment::{DEFAULT_DEGREE, MINIMUM_DEGREE, Scratch, SegmentKind, SegmentStore};
use crate::view::RangeView;

// =============================================================================
// Fault reporting
// =============================================================================

/// Panics when a handle's counter snapshot has diverged from the live value.
#[inline]
pub(crate) fn check_snapshot(expected: u64, live: u64) {
    if expected != live {
        panic!("concurrent structural modification detected");
    }
}

#[inline]
pub(crate) fn check_access_index(index: usize, len: usize) {
    if index >= len {
        panic!("index out of bounds: the index is {index} but the length is {len}");
    }
}

#[inline]
pub(crate) fn check_insertion_index(index: usize, len: usize) {
    if index > len {
        panic!("insertion index out of bounds: the index is {index} but the length is {len}");
    }
}

/// Validates a sub-range of a sequence of length `len`, reporting a reversed
/// range distinctly from an out-of-bounds one.
pub(crate) fn check_range(from: usize, to: usize, len: usize) {
    if from > to {
        panic!("invalid range: the start is {from} but the end is {to}");
    }
    if to > len {
        panic!("range end out of bounds: the end is {to} but the length is {len}");
    }
}

// =============================================================================
// Arena
// =============================================================================

/// One link of the segment chain.
pub(crate) struct Segment<T> {
    pub(crate) prev: Option<usize>,
    pub(crate) next: Option<usize>,
    pub(crate) store: SegmentStore<T>,
}

/// The engine state: the segment arena plus the cached size and the
/// modification counter every fail-fast handle snapshots.
pub(crate) struct ListCore<T> {
    slots: Vec<Option<Segment<T>>>,
    free: Vec<usize>,
    pub(crate) head: usize,
    pub(crate) tail: usize,
    pub(crate) len: usize,
    pub(crate) mod_count: u64,
    degree: usize,
    kind: SegmentKind,
}

impl<T> ListCore<T> {
    fn new(degree: usize, kind: SegmentKind) -> Self {
        if degree < MINIMUM_DEGREE {
            panic!("segment capacity {degree} is below the minimum of {MINIMUM_DEGREE}");
        }

        let store = SegmentStore::new(degree, kind);
        let effective_degree = store.degree();
        Self {
            slots: vec![Some(Segment {
                prev: None,
                next: None,
                store,
            })],
            free: Vec::new(),
            head: 0,
            tail: 0,
            len: 0,
            mod_count: 0,
            degree: effective_degree,
            kind,
        }
    }

    #[inline]
    pub(crate) fn seg(&self, index: usize) -> &Segment<T> {
        self.slots[index].as_ref().expect("arena slot must be occupied")
    }

    #[inline]
    pub(crate) fn seg_mut(&mut self, index: usize) -> &mut Segment<T> {
        self.slots[index].as_mut().expect("arena slot must be occupied")
    }

    /// Places a store into the arena, reusing a free slot when one exists.
    fn adopt(&mut self, store: SegmentStore<T>) -> usize {
        let segment = Segment {
            prev: None,
            next: None,
            store,
        };
        if let Some(slot) = self.free.pop() {
            self.slots[slot] = Some(segment);
            slot
        } else {
            self.slots.push(Some(segment));
            self.slots.len() - 1
        }
    }

    pub(crate) fn spawn_empty_segment(&mut self) -> usize {
        let store = self.seg(self.head).store.spawn_empty();
        self.adopt(store)
    }

    /// Splices `index` into the chain immediately after `predecessor`,
    /// advancing `tail` when the new segment becomes the last one.
    pub(crate) fn link_after(&mut self, predecessor: usize, index: usize) {
        let successor = self.seg(predecessor).next;
        {
            let segment = self.seg_mut(index);
            segment.prev = Some(predecessor);
            segment.next = successor;
        }
        self.seg_mut(predecessor).next = Some(index);

        if let Some(successor) = successor {
            self.seg_mut(successor).prev = Some(index);
        } else {
            self.tail = index;
        }
    }

    /// Removes `index` from the chain and returns its slot to the free list.
    ///
    /// The sole segment of the list is never unlinked; an empty list keeps
    /// exactly one (empty) segment.
    pub(crate) fn unlink(&mut self, index: usize) {
        let (prev, next) = {
            let segment = self.seg(index);
            (segment.prev, segment.next)
        };

        match (prev, next) {
            (None, None) => return,
            (None, Some(next)) => {
                self.head = next;
                self.seg_mut(next).prev = None;
            }
            (Some(prev), None) => {
                self.tail = prev;
                self.seg_mut(prev).next = None;
            }
            (Some(prev), Some(next)) => {
                self.seg_mut(prev).next = Some(next);
                self.seg_mut(next).prev = Some(prev);
            }
        }

        self.slots[index] = None;
        self.free.push(index);
    }

    /// Resolves a global index to `(segment, local index)`, walking from
    /// whichever end of the chain is closer.
    pub(crate) fn locate(&self, index: usize) -> (usize, usize) {
        if index < self.len / 2 {
            let mut segment = self.head;
            let mut remaining = index;
            while remaining >= self.seg(segment).store.len() {
                remaining -= self.seg(segment).store.len();
                segment = self.seg(segment).next.expect("index must be inside the chain");
            }
            (segment, remaining)
        } else {
            let mut segment = self.tail;
            let mut remaining = self.len - index - 1;
            while remaining >= self.seg(segment).store.len() {
                remaining -= self.seg(segment).store.len();
                segment = self.seg(segment).prev.expect("index must be inside the chain");
            }
            let local = self.seg(segment).store.len() - remaining - 1;
            (segment, local)
        }
    }

    /// Appends one element, spawning a new tail segment first when the
    /// current tail is full.
    pub(crate) fn push_back_element(&mut self, element: T) {
        if self.seg(self.tail).store.is_full() {
            let spawned = self.spawn_empty_segment();
            self.link_after(self.tail, spawned);
        }
        self.seg_mut(self.tail).store.push(element);
        self.len += 1;
        self.mod_count += 1;
    }

    /// Inserts into a resolved `(segment, local)` position, splitting the
    /// segment when it is full. After a split the moved tail `[local, len)`
    /// lives in a spawned sibling spliced right after `segment`, and the new
    /// element is the last element of the truncated original segment.
    ///
    /// No accounting: callers update `len` and `mod_count`.
    pub(crate) fn insert_in_segment(&mut self, segment: usize, local: usize, element: T) {
        if self.seg(segment).store.is_full() {
            let sibling_store = self.seg_mut(segment).store.split_tail_to_new(local);
            self.seg_mut(segment).store.push(element);
            let sibling = self.adopt(sibling_store);
            self.link_after(segment, sibling);
        } else {
            self.seg_mut(segment).store.insert(local, element);
        }
    }

    fn insert_at(&mut self, index: usize, element: T) {
        if index == self.len {
            self.push_back_element(element);
            return;
        }

        let (segment, local) = self.locate(index);
        self.insert_in_segment(segment, local, element);
        self.len += 1;
        self.mod_count += 1;
    }

    /// Appends a batch at the tail, spawning segments as needed.
    fn append_batch(&mut self, items: Vec<T>) {
        let count = items.len();
        let mut current = self.tail;
        for element in items {
            if self.seg(current).store.is_full() {
                let spawned = self.spawn_empty_segment();
                self.link_after(current, spawned);
                current = spawned;
            }
            self.seg_mut(current).store.push(element);
        }
        self.len += count;
        self.mod_count += count as u64;
    }

    /// Inserts a non-empty batch before `index < len`.
    ///
    /// When the batch fits the owning segment's spare capacity it is shifted
    /// in place. Otherwise the segment's tail `[local, len)` moves to a
    /// scratch buffer, the segment fills up from the batch, and as many
    /// trailing segments as needed are spawned for the remainder of the batch
    /// followed by the scratch contents, spliced in right after it.
    fn insert_batch_at(&mut self, index: usize, items: Vec<T>) {
        let count = items.len();
        let (segment, local) = self.locate(index);

        if count <= self.degree - self.seg(segment).store.len() {
            self.seg_mut(segment).store.insert_batch(local, items);
        } else {
            let mut scratch = Scratch::new();
            self.seg_mut(segment).store.split_off_tail(local, &mut scratch);

            let mut current = segment;
            for element in items.into_iter().chain(scratch) {
                if self.seg(current).store.is_full() {
                    let spawned = self.spawn_empty_segment();
                    self.link_after(current, spawned);
                    current = spawned;
                }
                self.seg_mut(current).store.push(element);
            }
        }

        self.len += count;
        self.mod_count += count as u64;
    }

    /// Removes at a resolved `(segment, local)` position with counter and
    /// size accounting, but without unlinking: callers decide how to
    /// reposition around an emptied segment.
    pub(crate) fn remove_at_local(&mut self, segment: usize, local: usize) -> T {
        let removed = self.seg_mut(segment).store.remove_at(local);
        self.len -= 1;
        self.mod_count += 1;
        removed
    }

    fn remove_at_index(&mut self, index: usize) -> T {
        let (segment, local) = self.locate(index);
        let removed = self.remove_at_local(segment, local);
        if self.seg(segment).store.is_empty() {
            self.unlink(segment);
        }
        removed
    }

    /// Removes `[from, to)`: trailing elements of the owning segment first,
    /// then whole or partial subsequent segments until the range is consumed.
    fn remove_range_impl(&mut self, from: usize, to: usize) {
        let count = to - from;
        if count == 0 {
            return;
        }

        let (segment, local) = self.locate(from);
        let available = self.seg(segment).store.len() - local;
        let taken = count.min(available);
        self.seg_mut(segment).store.remove_range(local, local + taken);

        let mut next = self.seg(segment).next;
        if self.seg(segment).store.is_empty() {
            self.unlink(segment);
        }

        let mut left = count - taken;
        while left > 0 {
            let current = next.expect("range must be inside the chain");
            let taken = left.min(self.seg(current).store.len());
            self.seg_mut(current).store.remove_range(0, taken);

            next = self.seg(current).next;
            if self.seg(current).store.is_empty() {
                self.unlink(current);
            }
            left -= taken;
        }

        self.len -= count;
        self.mod_count += count as u64;
    }

    /// Drops everything, leaving a single fresh empty segment.
    fn clear_impl(&mut self) {
        let removed = self.len;
        self.slots.clear();
        self.free.clear();
        let store = SegmentStore::new(self.degree, self.kind);
        self.slots.push(Some(Segment {
            prev: None,
            next: None,
            store,
        }));
        self.head = 0;
        self.tail = 0;
        self.len = 0;
        self.mod_count += removed as u64;
    }

    /// Walks the chain in order, yielding every element by reference.
    pub(crate) fn iter_refs(&self) -> CoreIter<'_, T> {
        CoreIter {
            core: self,
            segment: Some(self.head),
            local: 0,
        }
    }

    fn segment_count_impl(&self) -> usize {
        let mut count = 0;
        let mut segment = Some(self.head);
        while let Some(current) = segment {
            count += 1;
            segment = self.seg(current).next;
        }
        count
    }

    fn check_health_impl(&self) {
        if self.head == self.tail {
            let segment = self.seg(self.head);
            assert!(
                segment.store.is_healthy_head(),
                "the only segment of the list is unhealthy"
            );
            assert!(
                segment.prev.is_none() && segment.next.is_none(),
                "the only segment of the list must not have neighbors"
            );
            assert_eq!(
                segment.store.len(),
                self.len,
                "segment sizes do not sum to the recorded length"
            );
            return;
        }

        let mut accumulated = 0;
        let mut visited = 0;
        let mut previous: Option<usize> = None;
        let mut segment = Some(self.head);

        while let Some(current) = segment {
            visited += 1;
            assert!(
                visited <= self.slots.len(),
                "the segment chain contains a cycle"
            );

            let link = self.seg(current);
            assert!(link.store.is_healthy(), "unhealthy segment encountered");
            assert_eq!(
                link.prev, previous,
                "segment back-link disagrees with the forward walk"
            );

            accumulated += link.store.len();
            previous = Some(current);
            segment = link.next;
        }

        assert_eq!(
            previous,
            Some(self.tail),
            "the forward walk must end at the tail segment"
        );
        assert_eq!(
            accumulated, self.len,
            "segment sizes do not sum to the recorded length"
        );
    }

    /// Consumes the arena, draining every element into a flat buffer.
    fn drain_to_vec(mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len);
        let mut segment = Some(self.head);
        while let Some(current) = segment {
            let next = self.seg(current).next;
            self.seg_mut(current).store.drain_into(&mut out);
            segment = next;
        }
        out
    }
}

impl<T: PartialEq> ListCore<T> {
    fn remove_first_occurrence_impl(&mut self, target: &T) -> bool {
        let mut segment = Some(self.head);
        while let Some(current) = segment {
            if let Some(local) = self.seg(current).store.first_match(target) {
                self.remove_at_local(current, local);
                if self.seg(current).store.is_empty() {
                    self.unlink(current);
                }
                return true;
            }
            segment = self.seg(current).next;
        }
        false
    }

    fn remove_last_occurrence_impl(&mut self, target: &T) -> bool {
        let mut segment = Some(self.tail);
        while let Some(current) = segment {
            if let Some(local) = self.seg(current).store.last_match(target) {
                self.remove_at_local(current, local);
                if self.seg(current).store.is_empty() {
                    self.unlink(current);
                }
                return true;
            }
            segment = self.seg(current).prev;
        }
        false
    }

    fn last_index_of_impl(&self, target: &T) -> Option<usize> {
        let mut index = self.len;
        let mut segment = Some(self.tail);
        while let Some(current) = segment {
            let store = &self.seg(current).store;
            for local in (0..store.len()).rev() {
                index -= 1;
                if store.get(local) == target {
                    return Some(index);
                }
            }
            segment = self.seg(current).prev;
        }
        None
    }
}

impl<T: Eq + Hash> ListCore<T> {
    /// One reverse pass tail→head deleting every element whose membership in
    /// `members` equals `mode`, unlinking segments as they empty.
    fn remove_by_membership(&mut self, members: &HashSet<T>, mode: bool) -> bool {
        let mut changed = false;
        let mut segment = Some(self.tail);

        while let Some(current) = segment {
            let previous = self.seg(current).prev;

            let mut local = self.seg(current).store.len();
            while local > 0 {
                local -= 1;
                if members.contains(self.seg(current).store.get(local)) == mode {
                    self.remove_at_local(current, local);
                    changed = true;
                }
            }

            if self.seg(current).store.is_empty() {
                self.unlink(current);
            }
            segment = previous;
        }

        changed
    }
}

/// In-order element walk over the engine, by reference.
///
/// Internal only: it performs no freshness validation and must not outlive
/// the `RefCell` guard it was created under.
pub(crate) struct CoreIter<'a, T> {
    core: &'a ListCore<T>,
    segment: Option<usize>,
    local: usize,
}

impl<'a, T> Iterator for CoreIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let current = self.segment?;
            let segment = self.core.seg(current);
            if self.local < segment.store.len() {
                let element = segment.store.get(self.local);
                self.local += 1;
                return Some(element);
            }
            self.segment = segment.next;
            self.local = 0;
        }
    }
}

// =============================================================================
// UnrolledList
// =============================================================================

/// A random-access sequence backed by a chain of fixed-capacity array
/// segments.
///
/// Compared to a contiguous growable array, mid-sequence insertion and
/// removal shift at most one segment (splitting or unlinking it when
/// necessary) instead of the whole tail; compared to a node-per-element
/// linked list, elements stay dense and index resolution hops segments
/// rather than elements.
///
/// Every operation takes `&self` (see the [module docs](self) for why), so a
/// list can be mutated while iterators or [views](crate::RangeView) over it
/// exist; any such handle detects the structural change on its next use and
/// panics rather than yielding stale data.
///
/// # Time Complexity
///
/// With degree *d* and length *n*:
///
/// | Operation        | Complexity                     |
/// |------------------|--------------------------------|
/// | `push_back`      | O(1) amortized                 |
/// | `get` / `set`    | O(n / (2·d)) segment hops      |
/// | `insert`         | O(n / (2·d)) hops + O(d) shift |
/// | `remove_at`      | O(n / (2·d)) hops + O(d) shift |
/// | `remove_range`   | O(hops + segments in range)    |
/// | `len` / `is_empty` | O(1)                         |
///
/// # Examples
///
/// ```rust
/// use unrolled_list::{SegmentKind, UnrolledList};
///
/// let list = UnrolledList::with_config(4, SegmentKind::Shifting);
/// for value in 0..10 {
///     list.push_back(value);
/// }
///
/// list.insert(5, 42);
/// assert_eq!(list.get(5), 42);
/// assert_eq!(list.remove_at(5), 42);
/// assert_eq!(list.to_vec(), (0..10).collect::<Vec<_>>());
/// ```
pub struct UnrolledList<T> {
    core: RefCell<ListCore<T>>,
}

impl<T> UnrolledList<T> {
    /// Creates an empty list with the default degree (16) and the circular
    /// segment layout.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use unrolled_list::UnrolledList;
    ///
    /// let list: UnrolledList<i32> = UnrolledList::new();
    /// assert!(list.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_DEGREE, SegmentKind::Circular)
    }

    /// Creates an empty list with the given degree and the circular segment
    /// layout.
    ///
    /// # Panics
    ///
    /// Panics if `degree` is below 2.
    #[must_use]
    pub fn with_degree(degree: usize) -> Self {
        Self::with_config(degree, SegmentKind::Circular)
    }

    /// Creates an empty list with the default degree and the given segment
    /// layout.
    #[must_use]
    pub fn with_segment_kind(kind: SegmentKind) -> Self {
        Self::with_config(DEFAULT_DEGREE, kind)
    }

    /// Creates an empty list with the given degree and segment layout.
    ///
    /// The circular layout rounds the degree up to the next power of two;
    /// [`Self::degree`] reports the effective value.
    ///
    /// # Panics
    ///
    /// Panics if `degree` is below 2.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use unrolled_list::{SegmentKind, UnrolledList};
    ///
    /// let list: UnrolledList<i32> = UnrolledList::with_config(5, SegmentKind::Circular);
    /// assert_eq!(list.degree(), 8);
    /// ```
    #[must_use]
    pub fn with_config(degree: usize, kind: SegmentKind) -> Self {
        Self {
            core: RefCell::new(ListCore::new(degree, kind)),
        }
    }

    pub(crate) const fn core(&self) -> &RefCell<ListCore<T>> {
        &self.core
    }

    /// Returns the number of elements in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.core.borrow().len
    }

    /// Returns `true` if the list contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the effective per-segment capacity.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.core.borrow().degree
    }

    /// Returns the segment layout this list was constructed with.
    #[must_use]
    pub fn segment_kind(&self) -> SegmentKind {
        self.core.borrow().kind
    }

    /// Returns the current modification counter.
    ///
    /// The counter increases by the number of elements structurally added or
    /// removed per operation (bulk operations count the whole batch), and is
    /// the value iterators, cursors, and views snapshot for fail-fast
    /// detection. Overwrites via [`Self::set`] are not structural.
    #[must_use]
    pub fn modification_count(&self) -> u64 {
        self.core.borrow().mod_count
    }

    /// Returns the number of segments in the chain. Diagnostic.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.core.borrow().segment_count_impl()
    }

    /// Verifies the structural invariants of the list.
    ///
    /// Checks that no segment other than the sole segment of an empty list is
    /// empty, that no segment exceeds its capacity (and, for the circular
    /// layout, that no vacated slot retains an element), that forward and
    /// back links agree, and that segment sizes sum to the recorded length.
    ///
    /// This is a diagnostic for tests, not part of any hot path.
    ///
    /// # Panics
    ///
    /// Panics if any invariant is violated.
    pub fn check_health(&self) {
        self.core.borrow().check_health_impl();
    }

    /// Appends an element to the end of the list.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use unrolled_list::UnrolledList;
    ///
    /// let list = UnrolledList::new();
    /// list.push_back(1);
    /// list.push_back(2);
    /// assert_eq!(list.to_vec(), vec![1, 2]);
    /// ```
    pub fn push_back(&self, element: T) {
        self.core.borrow_mut().push_back_element(element);
    }

    /// Prepends an element to the front of the list.
    pub fn push_front(&self, element: T) {
        let mut core = self.core.borrow_mut();
        core.insert_at(0, element);
    }

    /// Inserts an element between positions `index - 1` and `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&self, index: usize, element: T) {
        let mut core = self.core.borrow_mut();
        check_insertion_index(index, core.len);
        core.insert_at(index, element);
    }

    /// Appends every element of `items`, in order.
    ///
    /// Returns `true` if the list changed, i.e. if `items` was non-empty.
    /// The input is materialized before the engine is touched, so the batch
    /// counts as a single structural operation of its full size.
    pub fn append_all<I: IntoIterator<Item = T>>(&self, items: I) -> bool {
        let batch: Vec<T> = items.into_iter().collect();
        if batch.is_empty() {
            return false;
        }
        self.core.borrow_mut().append_batch(batch);
        true
    }

    /// Inserts every element of `items` before position `index`, in order.
    ///
    /// Returns `true` if the list changed, i.e. if `items` was non-empty.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_all<I: IntoIterator<Item = T>>(&self, index: usize, items: I) -> bool {
        let batch: Vec<T> = items.into_iter().collect();
        let mut core = self.core.borrow_mut();
        check_insertion_index(index, core.len);
        if batch.is_empty() {
            return false;
        }
        if index == core.len {
            core.append_batch(batch);
        } else {
            core.insert_batch_at(index, batch);
        }
        true
    }

    /// Overwrites the element at `index`, returning the previous value.
    ///
    /// Not a structural modification: open iterators and views stay valid.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn set(&self, index: usize, element: T) -> T {
        let mut core = self.core.borrow_mut();
        check_access_index(index, core.len);
        let (segment, local) = core.locate(index);
        core.seg_mut(segment).store.set(local, element)
    }

    /// Removes and returns the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove_at(&self, index: usize) -> T {
        let mut core = self.core.borrow_mut();
        check_access_index(index, core.len);
        core.remove_at_index(index)
    }

    /// Removes and returns the first element, or `None` if the list is empty.
    pub fn pop_front(&self) -> Option<T> {
        let mut core = self.core.borrow_mut();
        if core.len == 0 {
            return None;
        }
        Some(core.remove_at_index(0))
    }

    /// Removes and returns the last element, or `None` if the list is empty.
    pub fn pop_back(&self) -> Option<T> {
        let mut core = self.core.borrow_mut();
        if core.len == 0 {
            return None;
        }
        let index = core.len - 1;
        Some(core.remove_at_index(index))
    }

    /// Removes the elements in `range`.
    ///
    /// # Panics
    ///
    /// Panics if the range is reversed or extends past the end of the list.
    pub fn remove_range(&self, range: Range<usize>) {
        let mut core = self.core.borrow_mut();
        check_range(range.start, range.end, core.len);
        core.remove_range_impl(range.start, range.end);
    }

    /// Drops every element, leaving a single fresh empty segment.
    pub fn clear(&self) {
        self.core.borrow_mut().clear_impl();
    }
}

impl<T: Clone> UnrolledList<T> {
    /// Returns a clone of the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[must_use]
    pub fn get(&self, index: usize) -> T {
        let core = self.core.borrow();
        check_access_index(index, core.len);
        let (segment, local) = core.locate(index);
        core.seg(segment).store.get(local).clone()
    }

    /// Returns a clone of the first element, or `None` if the list is empty.
    #[must_use]
    pub fn front(&self) -> Option<T> {
        let core = self.core.borrow();
        if core.len == 0 {
            return None;
        }
        Some(core.seg(core.head).store.get(0).clone())
    }

    /// Returns a clone of the last element, or `None` if the list is empty.
    #[must_use]
    pub fn back(&self) -> Option<T> {
        let core = self.core.borrow();
        if core.len == 0 {
            return None;
        }
        let store = &core.seg(core.tail).store;
        Some(store.get(store.len() - 1).clone())
    }

    /// Collects the elements into a `Vec`, in order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        let core = self.core.borrow();
        core.iter_refs().cloned().collect()
    }

    /// Copies up to `target.len()` leading elements into `target`, returning
    /// how many were written.
    pub fn copy_into_slice(&self, target: &mut [T]) -> usize {
        let core = self.core.borrow();
        let count = core.len.min(target.len());
        for (slot, element) in target.iter_mut().zip(core.iter_refs()) {
            *slot = element.clone();
        }
        count
    }

    /// Returns a fail-fast iterator over clones of the elements.
    ///
    /// The iterator panics on its next use if the list is structurally
    /// modified behind its back; its own [`remove`](UnrolledListIterator::remove)
    /// never trips it.
    #[must_use]
    pub fn iter(&self) -> UnrolledListIterator<'_, T> {
        UnrolledListIterator::new(self)
    }
}

impl<T> UnrolledList<T> {
    /// Returns a fail-fast iterator walking the list tail to head.
    #[must_use]
    pub fn descending_iter(&self) -> UnrolledListDescendingIterator<'_, T> {
        UnrolledListDescendingIterator::new(self)
    }

    /// Returns a bidirectional cursor positioned before the first element.
    #[must_use]
    pub fn cursor(&self) -> UnrolledListCursor<'_, T> {
        UnrolledListCursor::new(self, 0)
    }

    /// Returns a bidirectional cursor positioned before the element at
    /// `index` (or after the last element when `index == len`).
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    #[must_use]
    pub fn cursor_at(&self, index: usize) -> UnrolledListCursor<'_, T> {
        UnrolledListCursor::new(self, index)
    }

    /// Returns a non-copying view over `range`.
    ///
    /// The view translates every operation onto this list and detects
    /// structural modifications that bypass it; see [`RangeView`].
    ///
    /// # Panics
    ///
    /// Panics if the range is reversed or extends past the end of the list.
    #[must_use]
    pub fn view(&self, range: Range<usize>) -> RangeView<'_, T> {
        RangeView::over_list(self, range)
    }
}

impl<T: PartialEq> UnrolledList<T> {
    /// Returns `true` if the list contains an element equal to `target`.
    #[must_use]
    pub fn contains(&self, target: &T) -> bool {
        self.index_of(target).is_some()
    }

    /// Returns `true` if the list contains every element of `items`.
    #[must_use]
    pub fn contains_all(&self, items: &[T]) -> bool {
        items.iter().all(|item| self.contains(item))
    }

    /// Returns the index of the first element equal to `target`.
    #[must_use]
    pub fn index_of(&self, target: &T) -> Option<usize> {
        let core = self.core.borrow();
        core.iter_refs().position(|element| element == target)
    }

    /// Returns the index of the last element equal to `target`.
    #[must_use]
    pub fn last_index_of(&self, target: &T) -> Option<usize> {
        self.core.borrow().last_index_of_impl(target)
    }

    /// Removes the first element equal to `target`, returning whether one was
    /// found.
    pub fn remove_first_occurrence(&self, target: &T) -> bool {
        self.core.borrow_mut().remove_first_occurrence_impl(target)
    }

    /// Removes the last element equal to `target`, returning whether one was
    /// found.
    pub fn remove_last_occurrence(&self, target: &T) -> bool {
        self.core.borrow_mut().remove_last_occurrence_impl(target)
    }
}

impl<T: Eq + Hash> UnrolledList<T> {
    /// Removes every element contained in `items`.
    ///
    /// Builds a membership set from `items` and deletes matches in one
    /// reverse pass over the chain. Returns `true` if anything was removed.
    pub fn remove_all<I: IntoIterator<Item = T>>(&self, items: I) -> bool {
        let members: HashSet<T> = items.into_iter().collect();
        self.core.borrow_mut().remove_by_membership(&members, true)
    }

    /// Retains only the elements contained in `items`, removing the rest.
    ///
    /// Returns `true` if anything was removed.
    pub fn retain_all<I: IntoIterator<Item = T>>(&self, items: I) -> bool {
        let members: HashSet<T> = items.into_iter().collect();
        self.core.borrow_mut().remove_by_membership(&members, false)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<T> Default for UnrolledList<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for UnrolledList<T> {
    /// Returns a structurally independent list with the same degree, segment
    /// layout, and element sequence, rebuilt by re-batching elements in
    /// groups of the degree.
    fn clone(&self) -> Self {
        let core = self.core.borrow();
        let cloned = Self::with_config(core.degree, core.kind);

        let mut batch = Vec::with_capacity(core.degree);
        for element in core.iter_refs() {
            batch.push(element.clone());
            if batch.len() == core.degree {
                cloned.append_all(std::mem::replace(
                    &mut batch,
                    Vec::with_capacity(core.degree),
                ));
            }
        }
        cloned.append_all(batch);
        cloned
    }
}

impl<T> FromIterator<T> for UnrolledList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let list = Self::new();
        list.append_all(iter);
        list
    }
}

impl<T> Extend<T> for UnrolledList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.append_all(iter);
    }
}

impl<T> IntoIterator for UnrolledList<T> {
    type Item = T;
    type IntoIter = UnrolledListIntoIterator<T>;

    /// Consumes the list, draining the segments in order.
    fn into_iter(self) -> Self::IntoIter {
        let elements = self.core.into_inner().drain_to_vec();
        UnrolledListIntoIterator::new(elements)
    }
}

impl<'a, T: Clone> IntoIterator for &'a UnrolledList<T> {
    type Item = T;
    type IntoIter = UnrolledListIterator<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for UnrolledList<T> {
    /// Ordered pairwise comparison. Degree and segment layout do not
    /// participate: two lists with equal element sequences are equal.
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        let ours = self.core.borrow();
        let theirs = other.core.borrow();
        if ours.len != theirs.len {
            return false;
        }
        ours.iter_refs().zip(theirs.iter_refs()).all(|(a, b)| a == b)
    }
}

impl<T: Eq> Eq for UnrolledList<T> {}

impl<T: Hash> Hash for UnrolledList<T> {
    /// Hashes the length, then each element in order, so that equal sequences
    /// hash equally regardless of degree or segment layout.
    fn hash<H: Hasher>(&self, state: &mut H) {
        let core = self.core.borrow();
        core.len.hash(state);
        for element in core.iter_refs() {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for UnrolledList<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.core.borrow();
        formatter.debug_list().entries(core.iter_refs()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for UnrolledList<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.core.borrow();
        write!(formatter, "[")?;
        let mut first = true;
        for element in core.iter_refs() {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "]")
    }
}

// =============================================================================
// Tests
// =============================================================================
