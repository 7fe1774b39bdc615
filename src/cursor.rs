//! Fail-fast iteration handles for [`UnrolledList`].
//!
//! Every handle here is a plain borrow of the list plus a snapshot of the
//! list's modification counter. A structural change that bypasses the handle
//! — an insertion, removal, or clear performed directly on the list or
//! through another handle — makes the *next* use of this handle panic, reads
//! included. A handle's own mutating methods refresh its snapshot and never
//! trip it.
//!
//! Exhaustion is not an error: `next()` and `previous()` return [`None`] at
//! the ends, like every Rust iterator. The panics are reserved for genuine
//! contract violations: stale handles and missequenced mutator calls.

use crate::list::{UnrolledList, check_insertion_index, check_snapshot};

// =============================================================================
// UnrolledListIterator
// =============================================================================

/// A fail-fast forward iterator over an [`UnrolledList`].
///
/// Yields clones of the elements. Beyond the [`Iterator`] surface it supports
/// [`remove`](Self::remove), deleting the element most recently returned by
/// [`next`](Iterator::next) without invalidating the iterator itself.
///
/// # Examples
///
/// ```rust
/// use unrolled_list::UnrolledList;
///
/// let list: UnrolledList<i32> = (0..5).collect();
/// let mut iterator = list.iter();
///
/// while let Some(value) = iterator.next() {
///     if value % 2 == 1 {
///         iterator.remove();
///     }
/// }
/// assert_eq!(list.to_vec(), vec![0, 2, 4]);
/// ```
pub struct UnrolledListIterator<'a, T> {
    list: &'a UnrolledList<T>,
    /// Segment holding the next element to yield; `None` once the walk has
    /// run off the end of the chain.
    segment: Option<usize>,
    /// Slot of the next element within `segment`.
    local: usize,
    iterated: usize,
    /// Element count at creation; every element present then is yielded
    /// exactly once, removals through this iterator included.
    total: usize,
    expected_mod_count: u64,
    last_removed: bool,
}

impl<'a, T> UnrolledListIterator<'a, T> {
    pub(crate) fn new(list: &'a UnrolledList<T>) -> Self {
        let core = list.core().borrow();
        Self {
            list,
            segment: Some(core.head),
            local: 0,
            iterated: 0,
            total: core.len,
            expected_mod_count: core.mod_count,
            last_removed: false,
        }
    }

    /// Removes the element most recently returned by `next`.
    ///
    /// The deletion counts as a structural modification of the list (other
    /// open handles will fail fast), but this iterator's own snapshot is
    /// refreshed, so iteration continues seamlessly over the closed gap.
    ///
    /// # Panics
    ///
    /// Panics if `next` has not been called yet, if the element was already
    /// removed, or if the list was structurally modified behind this
    /// iterator's back.
    pub fn remove(&mut self) {
        if self.last_removed {
            panic!("the current element was already removed");
        }
        if self.iterated == 0 {
            panic!("no current element: call next() first");
        }

        let mut core = self.list.core().borrow_mut();
        check_snapshot(self.expected_mod_count, core.mod_count);

        let segment = self.segment.expect("a yielded element must have a segment");
        self.local -= 1;
        core.remove_at_local(segment, self.local);

        if core.seg(segment).store.is_empty() {
            let next = core.seg(segment).next;
            core.unlink(segment);
            self.segment = next;
            self.local = 0;
        }

        self.expected_mod_count = core.mod_count;
        self.last_removed = true;
    }
}

impl<T: Clone> Iterator for UnrolledListIterator<'_, T> {
    type Item = T;

    /// # Panics
    ///
    /// Panics if the list was structurally modified behind this iterator's
    /// back, even when the iterator is already exhausted.
    fn next(&mut self) -> Option<Self::Item> {
        let core = self.list.core().borrow();
        check_snapshot(self.expected_mod_count, core.mod_count);

        if self.iterated == self.total {
            return None;
        }

        let mut segment = self.segment.expect("segment chain ended before the recorded size");
        if self.local == core.seg(segment).store.len() {
            segment = core
                .seg(segment)
                .next
                .expect("segment chain ended before the recorded size");
            self.segment = Some(segment);
            self.local = 0;
        }

        let element = core.seg(segment).store.get(self.local).clone();
        self.local += 1;
        self.iterated += 1;
        self.last_removed = false;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.iterated;
        (remaining, Some(remaining))
    }
}

impl<T: Clone> ExactSizeIterator for UnrolledListIterator<'_, T> {}

// =============================================================================
// UnrolledListCursor
// =============================================================================

/// The cursor's position in the mutate-permission state machine.
///
/// Only `Positioned` (a `next`/`previous` call whose element is still
/// current) permits `set` and `remove`; `insert` moves to `Added`, which
/// requires a fresh directional call before the next `set`/`remove`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CursorState {
    Clean,
    Positioned,
    Added,
}

/// A fail-fast bidirectional cursor over an [`UnrolledList`].
///
/// The cursor sits *between* elements: position `i` is before the element at
/// index `i` and after the one at `i - 1`. [`next`](Self::next) and
/// [`previous`](Self::previous) move it one element and return what they
/// crossed; alternating the two yields each boundary element repeatedly.
///
/// # Examples
///
/// ```rust
/// use unrolled_list::UnrolledList;
///
/// let list: UnrolledList<i32> = (0..10).collect();
/// let mut cursor = list.cursor_at(4);
///
/// assert_eq!(cursor.previous(), Some(3));
/// assert_eq!(cursor.next(), Some(3));
/// assert_eq!(cursor.next(), Some(4));
/// assert_eq!(cursor.next_index(), 5);
/// ```
pub struct UnrolledListCursor<'a, T> {
    list: &'a UnrolledList<T>,
    /// Index of the element a `next()` call would return.
    global: usize,
    segment: usize,
    local: usize,
    last_segment: usize,
    last_local: usize,
    last_was_next: bool,
    state: CursorState,
    expected_mod_count: u64,
}

impl<'a, T> UnrolledListCursor<'a, T> {
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub(crate) fn new(list: &'a UnrolledList<T>, index: usize) -> Self {
        let core = list.core().borrow();
        check_insertion_index(index, core.len);

        let (segment, local) = if index == core.len {
            (core.tail, core.seg(core.tail).store.len())
        } else {
            let mut segment = core.head;
            let mut remaining = index;
            while remaining >= core.seg(segment).store.len() {
                remaining -= core.seg(segment).store.len();
                segment = core
                    .seg(segment)
                    .next
                    .expect("cursor index must be inside the chain");
            }
            (segment, remaining)
        };

        Self {
            list,
            global: index,
            segment,
            local,
            last_segment: segment,
            last_local: 0,
            last_was_next: false,
            state: CursorState::Clean,
            expected_mod_count: core.mod_count,
        }
    }

    /// Returns `true` if a `next()` call would return an element.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.global != self.list.core().borrow().len
    }

    /// Returns `true` if a `previous()` call would return an element.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.global != 0
    }

    /// Index of the element a `next()` call would return (the list length
    /// when the cursor is at the end).
    #[must_use]
    pub const fn next_index(&self) -> usize {
        self.global
    }

    /// Index of the element a `previous()` call would return, or `None` at
    /// the front. Wherever it is `Some(p)`, `p + 1 == next_index()`.
    #[must_use]
    pub const fn previous_index(&self) -> Option<usize> {
        self.global.checked_sub(1)
    }

    /// Inserts an element immediately before the `next()` position.
    ///
    /// Both cursor indices advance past the new element, so a following
    /// `previous()` returns it and a following `next()` is unaffected.
    /// `set` and `remove` require a fresh `next()`/`previous()` afterwards.
    ///
    /// # Panics
    ///
    /// Panics if the list was structurally modified behind this cursor's
    /// back.
    pub fn insert(&mut self, element: T) {
        let mut core = self.list.core().borrow_mut();
        check_snapshot(self.expected_mod_count, core.mod_count);

        if core.len == 0 {
            // The empty list keeps a sole segment; fill its first slot.
            let head = core.head;
            core.seg_mut(head).store.insert(0, element);
            core.len = 1;
            core.mod_count += 1;
            self.segment = head;
            self.global = 1;
            self.local = 1;
            self.expected_mod_count = core.mod_count;
            self.state = CursorState::Added;
            return;
        }

        // A cursor parked at a segment boundary inserts into the next
        // segment.
        if self.local == core.seg(self.segment).store.len()
            && let Some(next) = core.seg(self.segment).next
        {
            self.segment = next;
            self.local = 0;
        }

        if self.local == core.seg(self.segment).store.len() {
            // Exhausted tail: append in place while it has room, otherwise
            // grow the chain by one segment.
            if core.seg(self.segment).store.is_full() {
                let spawned = core.spawn_empty_segment();
                core.link_after(self.segment, spawned);
                self.segment = spawned;
                self.local = 0;
                core.seg_mut(spawned).store.push(element);
            } else {
                let (segment, local) = (self.segment, self.local);
                core.seg_mut(segment).store.insert(local, element);
            }
        } else {
            core.insert_in_segment(self.segment, self.local, element);
        }

        core.len += 1;
        core.mod_count += 1;
        self.expected_mod_count = core.mod_count;
        self.local += 1;
        self.global += 1;
        self.state = CursorState::Added;
    }

    /// Overwrites the element most recently returned by `next()` or
    /// `previous()`, returning the previous value.
    ///
    /// Not a structural modification; may be called repeatedly.
    ///
    /// # Panics
    ///
    /// Panics if no element is positioned (no directional call yet, or an
    /// `insert`/`remove` since the last one), or if the list was structurally
    /// modified behind this cursor's back.
    pub fn set(&mut self, element: T) -> T {
        if self.state != CursorState::Positioned {
            panic!("set() requires a positioned element: call next() or previous() first");
        }
        let mut core = self.list.core().borrow_mut();
        check_snapshot(self.expected_mod_count, core.mod_count);
        core.seg_mut(self.last_segment).store.set(self.last_local, element)
    }

    /// Removes the element most recently returned by `next()` or
    /// `previous()`.
    ///
    /// # Panics
    ///
    /// Panics if no element is positioned, or if the list was structurally
    /// modified behind this cursor's back.
    pub fn remove(&mut self) {
        if self.state != CursorState::Positioned {
            panic!("remove() requires a positioned element: call next() or previous() first");
        }
        let mut core = self.list.core().borrow_mut();
        check_snapshot(self.expected_mod_count, core.mod_count);

        core.remove_at_local(self.last_segment, self.last_local);
        let emptied = core.seg(self.last_segment).store.is_empty();
        let sole = core.head == self.last_segment && core.tail == self.last_segment;

        if emptied && !sole {
            let previous = core.seg(self.last_segment).prev;
            let next = core.seg(self.last_segment).next;
            core.unlink(self.last_segment);

            if let Some(previous) = previous {
                self.segment = previous;
                self.local = core.seg(previous).store.len();
            } else {
                self.segment = next.expect("a non-sole segment has a neighbor");
                self.local = 0;
            }
        }

        if self.last_was_next {
            self.global -= 1;
            if !emptied {
                self.local -= 1;
            }
        }

        self.expected_mod_count = core.mod_count;
        self.state = CursorState::Clean;
    }
}

// `next`/`previous` are cursor vocabulary, not an `Iterator` implementation:
// the cursor is bidirectional and its methods validate before every move.
#[allow(clippy::should_implement_trait)]
impl<T: Clone> UnrolledListCursor<'_, T> {
    /// Moves the cursor forward, returning a clone of the element crossed,
    /// or `None` at the end.
    ///
    /// # Panics
    ///
    /// Panics if the list was structurally modified behind this cursor's
    /// back.
    pub fn next(&mut self) -> Option<T> {
        let core = self.list.core().borrow();
        check_snapshot(self.expected_mod_count, core.mod_count);

        if self.global == core.len {
            return None;
        }

        if self.local == core.seg(self.segment).store.len() {
            self.segment = core
                .seg(self.segment)
                .next
                .expect("cursor must have a next segment");
            self.local = 0;
        }

        self.last_segment = self.segment;
        self.last_local = self.local;
        self.last_was_next = true;
        self.state = CursorState::Positioned;
        self.global += 1;

        let element = core.seg(self.segment).store.get(self.local).clone();
        self.local += 1;
        Some(element)
    }

    /// Moves the cursor backward, returning a clone of the element crossed,
    /// or `None` at the front.
    ///
    /// # Panics
    ///
    /// Panics if the list was structurally modified behind this cursor's
    /// back.
    pub fn previous(&mut self) -> Option<T> {
        let core = self.list.core().borrow();
        check_snapshot(self.expected_mod_count, core.mod_count);

        if self.global == 0 {
            return None;
        }

        if self.local == 0 {
            self.segment = core
                .seg(self.segment)
                .prev
                .expect("cursor must have a previous segment");
            self.local = core.seg(self.segment).store.len();
        }

        self.local -= 1;
        self.global -= 1;
        self.last_segment = self.segment;
        self.last_local = self.local;
        self.last_was_next = false;
        self.state = CursorState::Positioned;

        Some(core.seg(self.segment).store.get(self.local).clone())
    }
}

// =============================================================================
// UnrolledListDescendingIterator
// =============================================================================

/// A fail-fast iterator walking an [`UnrolledList`] tail to head.
///
/// A thin proxy over a cursor parked at the end of the list; each step yields
/// `previous()`. Supports [`remove`](Self::remove) like the forward iterator.
pub struct UnrolledListDescendingIterator<'a, T> {
    cursor: UnrolledListCursor<'a, T>,
}

impl<'a, T> UnrolledListDescendingIterator<'a, T> {
    pub(crate) fn new(list: &'a UnrolledList<T>) -> Self {
        let end = list.len();
        Self {
            cursor: UnrolledListCursor::new(list, end),
        }
    }
}

impl<T: Clone> UnrolledListDescendingIterator<'_, T> {
    /// Removes the element most recently returned.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as
    /// [`UnrolledListCursor::remove`].
    pub fn remove(&mut self) {
        self.cursor.remove();
    }
}

impl<T: Clone> Iterator for UnrolledListDescendingIterator<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.previous()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cursor.next_index();
        (remaining, Some(remaining))
    }
}

// =============================================================================
// UnrolledListIntoIterator
// =============================================================================

/// A consuming iterator over an [`UnrolledList`].
///
/// The list is drained segment by segment into a flat buffer up front; no
/// fail-fast machinery is needed once the list is owned.
pub struct UnrolledListIntoIterator<T> {
    inner: std::vec::IntoIter<T>,
}

impl<T> UnrolledListIntoIterator<T> {
    pub(crate) fn new(elements: Vec<T>) -> Self {
        Self {
            inner: elements.into_iter(),
        }
    }
}

impl<T> Iterator for UnrolledListIntoIterator<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for UnrolledListIntoIterator<T> {}

impl<T> DoubleEndedIterator for UnrolledListIntoIterator<T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{SegmentKind, UnrolledList};
    use rstest::rstest;

    fn sample(degree: usize, kind: SegmentKind, count: i32) -> UnrolledList<i32> {
        let list = UnrolledList::with_config(degree, kind);
        for value in 0..count {
            list.push_back(value);
        }
        list
    }

    // =========================================================================
    // Forward iterator
    // =========================================================================

    #[rstest]
    #[case(SegmentKind::Shifting)]
    #[case(SegmentKind::Circular)]
    fn test_iterator_yields_in_order(#[case] kind: SegmentKind) {
        let list = sample(3, kind, 10);
        let collected: Vec<i32> = list.iter().collect();
        assert_eq!(collected, (0..10).collect::<Vec<_>>());
    }

    #[rstest]
    fn test_iterator_exhaustion_returns_none() {
        let list = sample(3, SegmentKind::Shifting, 2);
        let mut iterator = list.iter();
        assert_eq!(iterator.next(), Some(0));
        assert_eq!(iterator.next(), Some(1));
        assert_eq!(iterator.next(), None);
        assert_eq!(iterator.next(), None);
    }

    #[rstest]
    fn test_iterator_len_tracks_remaining() {
        let list = sample(3, SegmentKind::Circular, 5);
        let mut iterator = list.iter();
        assert_eq!(iterator.len(), 5);
        iterator.next();
        assert_eq!(iterator.len(), 4);
    }

    #[rstest]
    #[case(SegmentKind::Shifting)]
    #[case(SegmentKind::Circular)]
    fn test_iterator_remove_every_element(#[case] kind: SegmentKind) {
        let list = sample(2, kind, 7);
        let mut iterator = list.iter();
        while iterator.next().is_some() {
            iterator.remove();
        }
        assert!(list.is_empty());
        list.check_health();
    }

    #[rstest]
    fn test_iterator_remove_reads_gap_fill() {
        let list = sample(4, SegmentKind::Shifting, 4);
        let mut iterator = list.iter();
        assert_eq!(iterator.next(), Some(0));
        iterator.remove();
        // The gap closed; the following element is yielded next.
        assert_eq!(iterator.next(), Some(1));
        assert_eq!(list.to_vec(), vec![1, 2, 3]);
    }

    #[rstest]
    #[should_panic(expected = "no current element")]
    fn test_iterator_remove_before_next_panics() {
        let list = sample(3, SegmentKind::Shifting, 3);
        let mut iterator = list.iter();
        iterator.remove();
    }

    #[rstest]
    #[should_panic(expected = "already removed")]
    fn test_iterator_double_remove_panics() {
        let list = sample(3, SegmentKind::Shifting, 3);
        let mut iterator = list.iter();
        iterator.next();
        iterator.remove();
        iterator.remove();
    }

    #[rstest]
    #[should_panic(expected = "concurrent structural modification")]
    fn test_iterator_fails_fast_after_push() {
        let list = sample(3, SegmentKind::Shifting, 3);
        let mut iterator = list.iter();
        iterator.next();
        list.push_back(99);
        iterator.next();
    }

    #[rstest]
    #[should_panic(expected = "concurrent structural modification")]
    fn test_exhausted_iterator_still_fails_fast() {
        let list = sample(3, SegmentKind::Shifting, 1);
        let mut iterator = list.iter();
        assert_eq!(iterator.next(), Some(0));
        assert_eq!(iterator.next(), None);
        list.clear();
        iterator.next();
    }

    // =========================================================================
    // Cursor
    // =========================================================================

    #[rstest]
    #[case(SegmentKind::Shifting)]
    #[case(SegmentKind::Circular)]
    fn test_cursor_forward_then_backward(#[case] kind: SegmentKind) {
        let list = sample(3, kind, 8);
        let mut cursor = list.cursor();

        let mut forward = Vec::new();
        while let Some(value) = cursor.next() {
            forward.push(value);
        }
        let mut backward = Vec::new();
        while let Some(value) = cursor.previous() {
            backward.push(value);
        }

        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[rstest]
    fn test_cursor_index_identity() {
        let list = sample(3, SegmentKind::Circular, 6);
        let mut cursor = list.cursor_at(3);
        loop {
            if let Some(previous) = cursor.previous_index() {
                assert_eq!(previous + 1, cursor.next_index());
            }
            if cursor.next().is_none() {
                break;
            }
        }
    }

    #[rstest]
    fn test_cursor_symmetric_pairs() {
        let list = sample(3, SegmentKind::Shifting, 10);
        let mut cursor = list.cursor_at(4);
        for expected in [3, 2, 1, 0] {
            assert_eq!(cursor.previous(), Some(expected));
        }
        for expected in [0, 1, 2, 3] {
            assert_eq!(cursor.next(), Some(expected));
        }
        assert_eq!(cursor.next_index(), 4);
    }

    #[rstest]
    fn test_cursor_insert_into_empty_list() {
        let list: UnrolledList<i32> = UnrolledList::with_degree(3);
        let mut cursor = list.cursor();
        cursor.insert(42);
        assert_eq!(list.to_vec(), vec![42]);
        assert_eq!(cursor.next_index(), 1);
        assert_eq!(cursor.previous(), Some(42));
        list.check_health();
    }

    #[rstest]
    #[case(SegmentKind::Shifting)]
    #[case(SegmentKind::Circular)]
    fn test_cursor_insert_mid_walk(#[case] kind: SegmentKind) {
        let list = sample(2, kind, 4);
        let mut cursor = list.cursor();
        cursor.next();
        cursor.next();
        cursor.insert(99);
        assert_eq!(list.to_vec(), vec![0, 1, 99, 2, 3]);
        // The cursor passed the insertion; the walk continues where it was.
        assert_eq!(cursor.next(), Some(2));
        list.check_health();
    }

    #[rstest]
    fn test_cursor_append_run_densely_fills_tail() {
        let list: UnrolledList<i32> = UnrolledList::with_config(4, SegmentKind::Shifting);
        let mut cursor = list.cursor();
        for value in 0..8 {
            cursor.insert(value);
        }
        assert_eq!(list.to_vec(), (0..8).collect::<Vec<_>>());
        assert_eq!(list.segment_count(), 2);
        list.check_health();
    }

    #[rstest]
    fn test_cursor_set_after_next_and_previous() {
        let list = sample(3, SegmentKind::Circular, 5);
        let mut cursor = list.cursor();
        cursor.next();
        assert_eq!(cursor.set(100), 0);
        assert_eq!(cursor.set(200), 100);

        cursor.next();
        cursor.previous();
        assert_eq!(cursor.set(300), 1);
        assert_eq!(list.to_vec(), vec![200, 300, 2, 3, 4]);
    }

    #[rstest]
    fn test_cursor_remove_after_next_steps_back() {
        let list = sample(3, SegmentKind::Shifting, 5);
        let mut cursor = list.cursor();
        assert_eq!(cursor.next(), Some(0));
        assert_eq!(cursor.next(), Some(1));
        cursor.remove();
        assert_eq!(cursor.next_index(), 1);
        assert_eq!(cursor.next(), Some(2));
        assert_eq!(list.to_vec(), vec![0, 2, 3, 4]);
    }

    #[rstest]
    fn test_cursor_remove_after_previous_keeps_index() {
        let list = sample(3, SegmentKind::Shifting, 5);
        let mut cursor = list.cursor_at(3);
        assert_eq!(cursor.previous(), Some(2));
        cursor.remove();
        assert_eq!(cursor.next_index(), 2);
        assert_eq!(cursor.next(), Some(3));
        assert_eq!(list.to_vec(), vec![0, 1, 3, 4]);
    }

    #[rstest]
    fn test_cursor_remove_unlinks_emptied_segment() {
        let list = sample(2, SegmentKind::Shifting, 6);
        assert_eq!(list.segment_count(), 3);
        let mut cursor = list.cursor_at(2);
        cursor.next();
        cursor.remove();
        cursor.next();
        cursor.remove();
        assert_eq!(list.segment_count(), 2);
        assert_eq!(list.to_vec(), vec![0, 1, 4, 5]);
        list.check_health();
    }

    #[rstest]
    #[should_panic(expected = "requires a positioned element")]
    fn test_cursor_remove_without_position_panics() {
        let list = sample(3, SegmentKind::Shifting, 3);
        let mut cursor = list.cursor();
        cursor.remove();
    }

    #[rstest]
    #[should_panic(expected = "requires a positioned element")]
    fn test_cursor_set_after_insert_panics() {
        let list = sample(3, SegmentKind::Shifting, 3);
        let mut cursor = list.cursor();
        cursor.next();
        cursor.insert(9);
        cursor.set(10);
    }

    #[rstest]
    #[should_panic(expected = "requires a positioned element")]
    fn test_cursor_double_remove_panics() {
        let list = sample(3, SegmentKind::Shifting, 3);
        let mut cursor = list.cursor();
        cursor.next();
        cursor.remove();
        cursor.remove();
    }

    #[rstest]
    #[should_panic(expected = "concurrent structural modification")]
    fn test_cursor_fails_fast_after_direct_removal() {
        let list = sample(3, SegmentKind::Shifting, 5);
        let mut cursor = list.cursor();
        cursor.next();
        list.remove_at(4);
        cursor.next();
    }

    #[rstest]
    fn test_cursor_own_mutations_do_not_fault_it() {
        let list = sample(2, SegmentKind::Circular, 4);
        let mut cursor = list.cursor();
        cursor.next();
        cursor.remove();
        cursor.next();
        cursor.insert(7);
        assert_eq!(cursor.previous(), Some(7));
        list.check_health();
    }

    #[rstest]
    #[should_panic(expected = "insertion index out of bounds")]
    fn test_cursor_at_past_end_panics() {
        let list = sample(3, SegmentKind::Shifting, 3);
        let _cursor = list.cursor_at(4);
    }

    // =========================================================================
    // Descending iterator
    // =========================================================================

    #[rstest]
    fn test_descending_iterator_reverses() {
        let list = sample(3, SegmentKind::Circular, 6);
        let collected: Vec<i32> = list.descending_iter().collect();
        assert_eq!(collected, vec![5, 4, 3, 2, 1, 0]);
    }

    #[rstest]
    fn test_descending_iterator_remove() {
        let list = sample(3, SegmentKind::Shifting, 6);
        let mut iterator = list.descending_iter();
        while let Some(value) = iterator.next() {
            if value % 2 == 0 {
                iterator.remove();
            }
        }
        assert_eq!(list.to_vec(), vec![1, 3, 5]);
        list.check_health();
    }

    #[rstest]
    #[should_panic(expected = "concurrent structural modification")]
    fn test_descending_iterator_fails_fast() {
        let list = sample(3, SegmentKind::Shifting, 6);
        let mut iterator = list.descending_iter();
        iterator.next();
        list.push_front(9);
        iterator.next();
    }
}
