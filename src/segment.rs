//! Fixed-capacity array segments backing [`UnrolledList`](crate::UnrolledList).
//!
//! A segment stores a contiguous run of the sequence in a small array whose
//! capacity is the list's *degree*. Two interchangeable layout strategies are
//! provided:
//!
//! - [`ShiftingStore`]: elements are packed at the front of the array and
//!   insertion/removal shifts the right partition. The simplest possible
//!   layout; its observable behavior is the reference for the other variant.
//! - [`CircularStore`]: a ring buffer whose capacity is rounded up to the next
//!   power of two so that logical indices map to physical slots with a single
//!   mask. Insertion and removal shift whichever partition is shorter by
//!   wraparound distance.
//!
//! Both are wrapped by the [`SegmentStore`] tagged enum; the variant is chosen
//! once, at list construction, via [`SegmentKind`].
//!
//! Segments trust caller-validated indices. An out-of-range local index is a
//! contract violation by the caller, not a condition these methods check for.

use smallvec::SmallVec;

/// The smallest permitted segment capacity.
pub(crate) const MINIMUM_DEGREE: usize = 2;

/// The segment capacity used when none is specified.
pub(crate) const DEFAULT_DEGREE: usize = 16;

/// Scratch buffer used while redistributing elements during bulk insertion.
///
/// Inline up to the default degree; spills to the heap for larger degrees.
pub(crate) type Scratch<T> = SmallVec<[T; DEFAULT_DEGREE]>;

// =============================================================================
// SegmentKind
// =============================================================================

/// Selects the in-segment storage strategy of an
/// [`UnrolledList`](crate::UnrolledList).
///
/// The two strategies are observably identical for every sequence operation;
/// they differ only in how elements are laid out inside a segment and in how
/// much shifting an in-segment insertion or removal performs.
///
/// # Examples
///
/// ```rust
/// use unrolled_list::{SegmentKind, UnrolledList};
///
/// let list: UnrolledList<i32> = UnrolledList::with_config(8, SegmentKind::Shifting);
/// assert_eq!(list.segment_kind(), SegmentKind::Shifting);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Elements packed at the front of the segment array; insertion and
    /// removal shift the right partition.
    Shifting,
    /// Ring-buffer layout with a power-of-two capacity and masked index
    /// arithmetic; insertion and removal shift the shorter partition.
    Circular,
}

// =============================================================================
// ShiftingStore
// =============================================================================

/// Front-packed segment storage.
///
/// Element `i` of the segment lives at offset `i` of the backing buffer, so
/// reads are direct and every structural edit shifts the elements to the
/// right of the edit point.
#[derive(Clone, Debug)]
pub(crate) struct ShiftingStore<T> {
    elements: Vec<T>,
    degree: usize,
}

impl<T> ShiftingStore<T> {
    pub(crate) fn new(degree: usize) -> Self {
        Self {
            elements: Vec::with_capacity(degree),
            degree,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub(crate) const fn degree(&self) -> usize {
        self.degree
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.elements.len() == self.degree
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> &T {
        &self.elements[index]
    }

    /// Replaces the element at `index`, returning the previous value.
    #[inline]
    pub(crate) fn set(&mut self, index: usize, element: T) -> T {
        std::mem::replace(&mut self.elements[index], element)
    }

    /// Appends to the tail. Requires spare capacity.
    #[inline]
    pub(crate) fn push(&mut self, element: T) {
        debug_assert!(!self.is_full());
        self.elements.push(element);
    }

    /// Inserts at `index`, shifting the right partition. Requires spare
    /// capacity; a full segment must go through [`Self::split_tail_to_new`].
    pub(crate) fn insert(&mut self, index: usize, element: T) {
        debug_assert!(!self.is_full());
        self.elements.insert(index, element);
    }

    /// Removes and returns the element at `index`, shifting the right
    /// remainder left.
    pub(crate) fn remove_at(&mut self, index: usize) -> T {
        self.elements.remove(index)
    }

    /// Removes the elements in `[from, to)`.
    pub(crate) fn remove_range(&mut self, from: usize, to: usize) {
        self.elements.drain(from..to);
    }

    /// Inserts a batch at `index`. The batch must fit the spare capacity.
    pub(crate) fn insert_batch(&mut self, index: usize, items: Vec<T>) {
        debug_assert!(self.elements.len() + items.len() <= self.degree);
        self.elements.splice(index..index, items);
    }

    /// Moves `[index, len)` into a freshly spawned sibling store and
    /// truncates this one.
    pub(crate) fn split_tail_to_new(&mut self, index: usize) -> Self {
        let mut sibling = Self::new(self.degree);
        sibling.elements.extend(self.elements.drain(index..));
        sibling
    }

    /// Moves `[index, len)` into `sink` (preserving order) and truncates.
    pub(crate) fn split_off_tail(&mut self, index: usize, sink: &mut Scratch<T>) {
        sink.extend(self.elements.drain(index..));
    }

    /// Drains every element into `sink` in order.
    pub(crate) fn drain_into(&mut self, sink: &mut Vec<T>) {
        sink.append(&mut self.elements);
    }

    pub(crate) fn is_healthy(&self) -> bool {
        !self.elements.is_empty() && self.is_healthy_head()
    }

    /// Like [`Self::is_healthy`] but tolerates emptiness, for the sole
    /// segment of an empty list.
    pub(crate) fn is_healthy_head(&self) -> bool {
        self.elements.len() <= self.degree
    }
}

impl<T: PartialEq> ShiftingStore<T> {
    pub(crate) fn first_match(&self, target: &T) -> Option<usize> {
        self.elements.iter().position(|element| element == target)
    }

    pub(crate) fn last_match(&self, target: &T) -> Option<usize> {
        self.elements.iter().rposition(|element| element == target)
    }
}

// =============================================================================
// CircularStore
// =============================================================================

/// Ring-buffer segment storage.
///
/// The slot array length is a power of two, so a logical index maps to a
/// physical slot as `(head + index) & mask`. Structural edits shift whichever
/// partition is shorter, moving at most half the segment. Vacated slots are
/// reset to `None` immediately; a slot outside the logical range never
/// retains an element.
#[derive(Clone, Debug)]
pub(crate) struct CircularStore<T> {
    slots: Vec<Option<T>>,
    head: usize,
    len: usize,
}

impl<T> CircularStore<T> {
    pub(crate) fn new(degree: usize) -> Self {
        let capacity = degree.next_power_of_two();
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            head: 0,
            len: 0,
        }
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn degree(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    #[inline]
    fn mask(&self) -> usize {
        self.slots.len() - 1
    }

    /// Maps a logical index to its physical slot.
    #[inline]
    fn physical(&self, index: usize) -> usize {
        (self.head + index) & self.mask()
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> &T {
        self.slots[self.physical(index)]
            .as_ref()
            .expect("logical slot must be occupied")
    }

    pub(crate) fn set(&mut self, index: usize, element: T) -> T {
        let slot = self.physical(index);
        self.slots[slot]
            .replace(element)
            .expect("logical slot must be occupied")
    }

    pub(crate) fn push(&mut self, element: T) {
        debug_assert!(!self.is_full());
        let slot = self.physical(self.len);
        self.slots[slot] = Some(element);
        self.len += 1;
    }

    /// Takes the element out of a logical slot, leaving `None`.
    fn take(&mut self, index: usize) -> T {
        let slot = self.physical(index);
        self.slots[slot]
            .take()
            .expect("logical slot must be occupied")
    }

    /// Moves the element in logical slot `from` into logical slot `to`.
    fn shift(&mut self, from: usize, to: usize) {
        let source = self.physical(from);
        let moved = self.slots[source].take();
        let target = self.physical(to);
        self.slots[target] = moved;
    }

    /// Inserts at `index`, shifting the shorter partition. Requires spare
    /// capacity; a full segment must go through [`Self::split_tail_to_new`].
    pub(crate) fn insert(&mut self, index: usize, element: T) {
        debug_assert!(!self.is_full());
        let left = index;
        let right = self.len - index;

        if left < right {
            // Rotate the head back one slot and pull the left partition after
            // it, opening a hole at `index`.
            self.head = self.head.wrapping_sub(1) & self.mask();
            for logical in 0..index {
                self.shift(logical + 1, logical);
            }
        } else {
            for logical in (index..self.len).rev() {
                self.shift(logical, logical + 1);
            }
        }

        let slot = self.physical(index);
        self.slots[slot] = Some(element);
        self.len += 1;
    }

    /// Removes and returns the element at `index`, closing the gap from the
    /// shorter side.
    pub(crate) fn remove_at(&mut self, index: usize) -> T {
        let removed = self.take(index);
        let left = index;
        let right = self.len - index - 1;

        if left < right {
            for logical in (0..index).rev() {
                self.shift(logical, logical + 1);
            }
            self.head = (self.head + 1) & self.mask();
        } else {
            for logical in index + 1..self.len {
                self.shift(logical, logical - 1);
            }
        }

        self.len -= 1;
        removed
    }

    /// Removes the elements in `[from, to)`, closing the gap from the
    /// shorter side.
    pub(crate) fn remove_range(&mut self, from: usize, to: usize) {
        let count = to - from;
        if count == 0 {
            return;
        }

        for logical in from..to {
            self.take(logical);
        }

        let left = from;
        let right = self.len - to;

        if left < right {
            for logical in (0..from).rev() {
                self.shift(logical, logical + count);
            }
            self.head = (self.head + count) & self.mask();
        } else {
            for logical in to..self.len {
                self.shift(logical, logical - count);
            }
        }

        self.len -= count;
    }

    /// Inserts a batch at `index`, shifting the shorter partition once by the
    /// batch length. The batch must fit the spare capacity.
    pub(crate) fn insert_batch(&mut self, index: usize, items: Vec<T>) {
        let count = items.len();
        debug_assert!(self.len + count <= self.slots.len());
        if count == 0 {
            return;
        }

        let left = index;
        let right = self.len - index;

        if left < right {
            self.head = self.head.wrapping_sub(count) & self.mask();
            for logical in 0..index {
                self.shift(logical + count, logical);
            }
        } else {
            for logical in (index..self.len).rev() {
                self.shift(logical, logical + count);
            }
        }

        for (offset, element) in items.into_iter().enumerate() {
            let slot = self.physical(index + offset);
            self.slots[slot] = Some(element);
        }
        self.len += count;
    }

    /// Moves `[index, len)` into a freshly spawned sibling store and
    /// truncates this one.
    pub(crate) fn split_tail_to_new(&mut self, index: usize) -> Self {
        let mut sibling = Self::new(self.slots.len());
        for logical in index..self.len {
            let element = self.take(logical);
            sibling.push(element);
        }
        self.len = index;
        sibling
    }

    /// Moves `[index, len)` into `sink` (preserving order) and truncates.
    pub(crate) fn split_off_tail(&mut self, index: usize, sink: &mut Scratch<T>) {
        for logical in index..self.len {
            let element = self.take(logical);
            sink.push(element);
        }
        self.len = index;
    }

    /// Drains every element into `sink` in order.
    pub(crate) fn drain_into(&mut self, sink: &mut Vec<T>) {
        for logical in 0..self.len {
            let element = self.take(logical);
            sink.push(element);
        }
        self.len = 0;
        self.head = 0;
    }

    pub(crate) fn is_healthy(&self) -> bool {
        self.len > 0 && self.is_healthy_head()
    }

    /// Like [`Self::is_healthy`] but tolerates emptiness, for the sole
    /// segment of an empty list.
    ///
    /// Beyond the size bound, this verifies the slot discipline: every slot
    /// inside the logical range holds an element and every slot outside it
    /// holds `None`.
    pub(crate) fn is_healthy_head(&self) -> bool {
        if self.len > self.slots.len() {
            return false;
        }

        for logical in 0..self.len {
            if self.slots[self.physical(logical)].is_none() {
                return false;
            }
        }
        for logical in self.len..self.slots.len() {
            if self.slots[self.physical(logical)].is_some() {
                return false;
            }
        }

        true
    }
}

impl<T: PartialEq> CircularStore<T> {
    pub(crate) fn first_match(&self, target: &T) -> Option<usize> {
        (0..self.len).find(|&logical| self.get(logical) == target)
    }

    pub(crate) fn last_match(&self, target: &T) -> Option<usize> {
        (0..self.len).rev().find(|&logical| self.get(logical) == target)
    }
}

// =============================================================================
// SegmentStore
// =============================================================================

/// A segment's element storage, tagged by layout strategy.
///
/// Every method dispatches to the active variant; the two variants share one
/// capability set and identical observable behavior.
#[derive(Clone, Debug)]
pub(crate) enum SegmentStore<T> {
    Shifting(ShiftingStore<T>),
    Circular(CircularStore<T>),
}

impl<T> SegmentStore<T> {
    /// Creates an empty store of the requested kind.
    ///
    /// The circular variant rounds `degree` up to the next power of two.
    pub(crate) fn new(degree: usize, kind: SegmentKind) -> Self {
        match kind {
            SegmentKind::Shifting => Self::Shifting(ShiftingStore::new(degree)),
            SegmentKind::Circular => Self::Circular(CircularStore::new(degree)),
        }
    }

    /// Creates an empty store with this store's kind and degree.
    pub(crate) fn spawn_empty(&self) -> Self {
        match self {
            Self::Shifting(store) => Self::Shifting(ShiftingStore::new(store.degree())),
            Self::Circular(store) => Self::Circular(CircularStore::new(store.degree())),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Shifting(store) => store.len(),
            Self::Circular(store) => store.len(),
        }
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub(crate) fn degree(&self) -> usize {
        match self {
            Self::Shifting(store) => store.degree(),
            Self::Circular(store) => store.degree(),
        }
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        match self {
            Self::Shifting(store) => store.is_full(),
            Self::Circular(store) => store.is_full(),
        }
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> &T {
        match self {
            Self::Shifting(store) => store.get(index),
            Self::Circular(store) => store.get(index),
        }
    }

    pub(crate) fn set(&mut self, index: usize, element: T) -> T {
        match self {
            Self::Shifting(store) => store.set(index, element),
            Self::Circular(store) => store.set(index, element),
        }
    }

    pub(crate) fn push(&mut self, element: T) {
        match self {
            Self::Shifting(store) => store.push(element),
            Self::Circular(store) => store.push(element),
        }
    }

    pub(crate) fn insert(&mut self, index: usize, element: T) {
        match self {
            Self::Shifting(store) => store.insert(index, element),
            Self::Circular(store) => store.insert(index, element),
        }
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> T {
        match self {
            Self::Shifting(store) => store.remove_at(index),
            Self::Circular(store) => store.remove_at(index),
        }
    }

    pub(crate) fn remove_range(&mut self, from: usize, to: usize) {
        match self {
            Self::Shifting(store) => store.remove_range(from, to),
            Self::Circular(store) => store.remove_range(from, to),
        }
    }

    pub(crate) fn insert_batch(&mut self, index: usize, items: Vec<T>) {
        match self {
            Self::Shifting(store) => store.insert_batch(index, items),
            Self::Circular(store) => store.insert_batch(index, items),
        }
    }

    pub(crate) fn split_tail_to_new(&mut self, index: usize) -> Self {
        match self {
            Self::Shifting(store) => Self::Shifting(store.split_tail_to_new(index)),
            Self::Circular(store) => Self::Circular(store.split_tail_to_new(index)),
        }
    }

    pub(crate) fn split_off_tail(&mut self, index: usize, sink: &mut Scratch<T>) {
        match self {
            Self::Shifting(store) => store.split_off_tail(index, sink),
            Self::Circular(store) => store.split_off_tail(index, sink),
        }
    }

    pub(crate) fn drain_into(&mut self, sink: &mut Vec<T>) {
        match self {
            Self::Shifting(store) => store.drain_into(sink),
            Self::Circular(store) => store.drain_into(sink),
        }
    }

    pub(crate) fn is_healthy(&self) -> bool {
        match self {
            Self::Shifting(store) => store.is_healthy(),
            Self::Circular(store) => store.is_healthy(),
        }
    }

    pub(crate) fn is_healthy_head(&self) -> bool {
        match self {
            Self::Shifting(store) => store.is_healthy_head(),
            Self::Circular(store) => store.is_healthy_head(),
        }
    }
}

impl<T: PartialEq> SegmentStore<T> {
    pub(crate) fn first_match(&self, target: &T) -> Option<usize> {
        match self {
            Self::Shifting(store) => store.first_match(target),
            Self::Circular(store) => store.first_match(target),
        }
    }

    pub(crate) fn last_match(&self, target: &T) -> Option<usize> {
        match self {
            Self::Shifting(store) => store.last_match(target),
            Self::Circular(store) => store.last_match(target),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
