//! Non-copying range views over an [`UnrolledList`].
//!
//! A [`RangeView`] projects a sub-range of its parent — the list itself or
//! another view — by shifting indices by a fixed offset. Nothing is copied:
//! every operation is the parent's same-named operation on translated
//! indices, performed after checking that the parent has not been
//! structurally modified behind the view's back.
//!
//! # The nested freshness protocol
//!
//! Each view snapshots its *immediate* parent's modification counter: a view
//! over the list snapshots the engine counter, a view over a view snapshots
//! that view's own (snapshot) counter. Operations the view itself performs —
//! or relays from a child — refresh the snapshot chain from the engine
//! outwards, so a view's own channel never trips it. A structural change
//! that bypasses a view leaves some link of that chain stale, and because
//! reads delegate parent-by-parent, any descendant view faults on its first
//! subsequent access, before it can return a stale result.

use std::cell::Cell;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::ops::Range;

use crate::cursor::UnrolledListCursor;
use crate::list::{
    UnrolledList, check_access_index, check_insertion_index, check_range, check_snapshot,
};

// =============================================================================
// ViewParent
// =============================================================================

/// The structure a view projects: the engine itself or an enclosing view.
///
/// Indices passed through here are parent-relative; each level adds its own
/// offset, so nesting composes additively.
enum ViewParent<'a, T> {
    List(&'a UnrolledList<T>),
    View(&'a RangeView<'a, T>),
}

impl<'a, T> ViewParent<'a, T> {
    /// The counter value children snapshot and validate against.
    ///
    /// For the engine this is the live modification counter. For a view it is
    /// the view's own snapshot cell: it moves exactly when that view performs
    /// (or relays) a structural operation, which is precisely the set of
    /// changes a child is allowed to survive.
    fn live_counter(&self) -> u64 {
        match self {
            Self::List(list) => list.modification_count(),
            Self::View(view) => view.expected_parent_mod_count.get(),
        }
    }

    fn set(&self, index: usize, element: T) -> T {
        match self {
            Self::List(list) => list.set(index, element),
            Self::View(view) => view.set(index, element),
        }
    }

    fn insert(&self, index: usize, element: T) {
        match self {
            Self::List(list) => list.insert(index, element),
            Self::View(view) => view.insert(index, element),
        }
    }

    fn insert_all(&self, index: usize, items: Vec<T>) -> bool {
        match self {
            Self::List(list) => list.insert_all(index, items),
            Self::View(view) => view.insert_all(index, items),
        }
    }

    fn remove_at(&self, index: usize) -> T {
        match self {
            Self::List(list) => list.remove_at(index),
            Self::View(view) => view.remove_at(index),
        }
    }

    fn remove_range(&self, range: Range<usize>) {
        match self {
            Self::List(list) => list.remove_range(range),
            Self::View(view) => view.remove_range(range),
        }
    }

    fn cursor_at(&self, index: usize) -> AnyCursor<'a, T> {
        match self {
            Self::List(list) => AnyCursor::List(list.cursor_at(index)),
            Self::View(view) => AnyCursor::View(Box::new(view.cursor_at(index))),
        }
    }
}

impl<T: Clone> ViewParent<'_, T> {
    fn get(&self, index: usize) -> T {
        match self {
            Self::List(list) => list.get(index),
            Self::View(view) => view.get(index),
        }
    }
}

// =============================================================================
// RangeView
// =============================================================================

/// A non-copying, index-shifted projection over a sub-range of an
/// [`UnrolledList`] or of another `RangeView`.
///
/// Every operation validates the view's freshness against its immediate
/// parent before doing anything — a structural modification of any ancestor
/// that bypassed this view makes the operation panic instead of touching
/// stale state. Reads included: a stale view cannot even report its length.
///
/// Structural operations performed *through* the view (or through a view
/// nested inside it) keep the whole ancestor chain fresh and adjust each
/// level's cached length.
///
/// # Examples
///
/// ```rust
/// use unrolled_list::UnrolledList;
///
/// let list: UnrolledList<i32> = (0..10).collect();
/// let middle = list.view(2..7);
///
/// assert_eq!(middle.to_vec(), vec![2, 3, 4, 5, 6]);
/// middle.remove_at(0);
/// assert_eq!(middle.len(), 4);
/// assert_eq!(list.len(), 9);
///
/// let inner = middle.view(1..3);
/// assert_eq!(inner.to_vec(), vec![4, 5]);
/// ```
pub struct RangeView<'a, T> {
    parent: ViewParent<'a, T>,
    offset: usize,
    length: Cell<usize>,
    expected_parent_mod_count: Cell<u64>,
}

impl<'a, T> RangeView<'a, T> {
    pub(crate) fn over_list(list: &'a UnrolledList<T>, range: Range<usize>) -> Self {
        check_range(range.start, range.end, list.len());
        Self {
            parent: ViewParent::List(list),
            offset: range.start,
            length: Cell::new(range.end - range.start),
            expected_parent_mod_count: Cell::new(list.modification_count()),
        }
    }

    fn validate(&self) {
        check_snapshot(self.expected_parent_mod_count.get(), self.parent.live_counter());
    }

    /// Re-snapshots the parent counter after a structural operation relayed
    /// through this view.
    fn refresh(&self) {
        self.expected_parent_mod_count.set(self.parent.live_counter());
    }

    fn grow(&self, count: usize) {
        self.length.set(self.length.get() + count);
        self.refresh();
    }

    fn shrink(&self, count: usize) {
        self.length.set(self.length.get() - count);
        self.refresh();
    }

    /// Returns the number of elements in the view.
    ///
    /// # Panics
    ///
    /// Panics if an ancestor was structurally modified behind this view's
    /// back.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validate();
        self.length.get()
    }

    /// Returns `true` if the view is empty.
    ///
    /// # Panics
    ///
    /// Panics if an ancestor was structurally modified behind this view's
    /// back.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrites the element at view-relative `index`, returning the
    /// previous value.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`, or if the view is stale.
    pub fn set(&self, index: usize, element: T) -> T {
        self.validate();
        check_access_index(index, self.length.get());
        self.parent.set(self.offset + index, element)
    }

    /// Appends an element at the end of the view (not of the parent).
    ///
    /// # Panics
    ///
    /// Panics if the view is stale.
    pub fn push_back(&self, element: T) {
        self.validate();
        self.parent.insert(self.offset + self.length.get(), element);
        self.grow(1);
    }

    /// Inserts an element before view-relative `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`, or if the view is stale.
    pub fn insert(&self, index: usize, element: T) {
        self.validate();
        check_insertion_index(index, self.length.get());
        self.parent.insert(self.offset + index, element);
        self.grow(1);
    }

    /// Appends every element of `items` at the end of the view.
    ///
    /// Returns `true` if anything was inserted.
    ///
    /// # Panics
    ///
    /// Panics if the view is stale.
    pub fn append_all<I: IntoIterator<Item = T>>(&self, items: I) -> bool {
        let length = self.len();
        self.insert_all(length, items)
    }

    /// Inserts every element of `items` before view-relative `index`.
    ///
    /// Returns `true` if anything was inserted.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`, or if the view is stale.
    pub fn insert_all<I: IntoIterator<Item = T>>(&self, index: usize, items: I) -> bool {
        self.validate();
        check_insertion_index(index, self.length.get());
        let batch: Vec<T> = items.into_iter().collect();
        let count = batch.len();
        if count == 0 {
            return false;
        }
        self.parent.insert_all(self.offset + index, batch);
        self.grow(count);
        true
    }

    /// Removes and returns the element at view-relative `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`, or if the view is stale.
    pub fn remove_at(&self, index: usize) -> T {
        self.validate();
        check_access_index(index, self.length.get());
        let removed = self.parent.remove_at(self.offset + index);
        self.shrink(1);
        removed
    }

    /// Removes the elements in the view-relative `range`.
    ///
    /// # Panics
    ///
    /// Panics if the range is reversed or extends past the view, or if the
    /// view is stale.
    pub fn remove_range(&self, range: Range<usize>) {
        self.validate();
        check_range(range.start, range.end, self.length.get());
        let count = range.end - range.start;
        self.parent
            .remove_range(self.offset + range.start..self.offset + range.end);
        self.shrink(count);
    }

    /// Removes every element of the view from the parent.
    ///
    /// # Panics
    ///
    /// Panics if the view is stale.
    pub fn clear(&self) {
        self.validate();
        let length = self.length.get();
        self.parent.remove_range(self.offset..self.offset + length);
        self.length.set(0);
        self.refresh();
    }

    /// Returns a nested view over a view-relative `range`.
    ///
    /// Offsets compose: the nested view addresses the parent list through
    /// this view, and validates against this view alone.
    ///
    /// # Panics
    ///
    /// Panics if the range is reversed or extends past this view, or if this
    /// view is stale.
    #[must_use]
    pub fn view(&self, range: Range<usize>) -> RangeView<'_, T> {
        self.validate();
        check_range(range.start, range.end, self.length.get());
        RangeView {
            parent: ViewParent::View(self),
            offset: range.start,
            length: Cell::new(range.end - range.start),
            expected_parent_mod_count: Cell::new(self.expected_parent_mod_count.get()),
        }
    }

    /// Returns a bidirectional cursor over the view positioned before
    /// view-relative `index`.
    ///
    /// The cursor proxies a cursor of the immediate parent positioned at the
    /// translated index, bounded by the view's length; its mutators keep the
    /// view chain fresh.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`, or if the view is stale.
    #[must_use]
    pub fn cursor_at(&self, index: usize) -> RangeViewCursor<'_, T> {
        self.validate();
        check_insertion_index(index, self.length.get());
        RangeViewCursor {
            view: self,
            inner: self.parent.cursor_at(self.offset + index),
            cursor: index,
            length: self.length.get(),
            last_was_next: false,
        }
    }

    /// Returns a bidirectional cursor positioned before the first element of
    /// the view.
    ///
    /// # Panics
    ///
    /// Panics if the view is stale.
    #[must_use]
    pub fn cursor(&self) -> RangeViewCursor<'_, T> {
        self.cursor_at(0)
    }

    /// Returns a fail-fast iterator over the view.
    ///
    /// # Panics
    ///
    /// Panics if the view is stale.
    #[must_use]
    pub fn iter(&self) -> RangeViewIterator<'_, T> {
        self.validate();
        RangeViewIterator {
            view: self,
            inner: self.parent.cursor_at(self.offset),
            iterated: 0,
            total: self.length.get(),
            last_removed: false,
        }
    }
}

impl<T: Clone> RangeView<'_, T> {
    /// Returns a clone of the element at view-relative `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`, or if the view is stale.
    #[must_use]
    pub fn get(&self, index: usize) -> T {
        self.validate();
        check_access_index(index, self.length.get());
        self.parent.get(self.offset + index)
    }

    /// Collects the view's elements into a `Vec`, in order.
    ///
    /// # Panics
    ///
    /// Panics if the view is stale.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.validate();
        (0..self.length.get())
            .map(|index| self.parent.get(self.offset + index))
            .collect()
    }
}

impl<T: Clone + PartialEq> RangeView<'_, T> {
    /// Returns the view-relative index of the first element equal to
    /// `target`.
    ///
    /// # Panics
    ///
    /// Panics if the view is stale.
    #[must_use]
    pub fn index_of(&self, target: &T) -> Option<usize> {
        self.validate();
        (0..self.length.get()).find(|&index| self.parent.get(self.offset + index) == *target)
    }

    /// Returns the view-relative index of the last element equal to
    /// `target`.
    ///
    /// # Panics
    ///
    /// Panics if the view is stale.
    #[must_use]
    pub fn last_index_of(&self, target: &T) -> Option<usize> {
        self.validate();
        (0..self.length.get())
            .rev()
            .find(|&index| self.parent.get(self.offset + index) == *target)
    }

    /// Returns `true` if the view contains an element equal to `target`.
    ///
    /// # Panics
    ///
    /// Panics if the view is stale.
    #[must_use]
    pub fn contains(&self, target: &T) -> bool {
        self.index_of(target).is_some()
    }

    /// Returns `true` if the view contains every element of `items`.
    ///
    /// # Panics
    ///
    /// Panics if the view is stale.
    #[must_use]
    pub fn contains_all(&self, items: &[T]) -> bool {
        items.iter().all(|item| self.contains(item))
    }

    /// Removes the first element of the view equal to `target`, returning
    /// whether one was found.
    ///
    /// # Panics
    ///
    /// Panics if the view is stale.
    pub fn remove_first_occurrence(&self, target: &T) -> bool {
        match self.index_of(target) {
            Some(index) => {
                self.parent.remove_at(self.offset + index);
                self.shrink(1);
                true
            }
            None => false,
        }
    }
}

impl<T: Clone + Eq + Hash> RangeView<'_, T> {
    /// Removes every element of the view contained in `items`.
    ///
    /// Returns `true` if anything was removed.
    ///
    /// # Panics
    ///
    /// Panics if the view is stale.
    pub fn remove_all<I: IntoIterator<Item = T>>(&self, items: I) -> bool {
        let members: HashSet<T> = items.into_iter().collect();
        self.remove_by_membership(&members, true)
    }

    /// Retains only the elements of the view contained in `items`, removing
    /// the rest from the parent.
    ///
    /// Returns `true` if anything was removed.
    ///
    /// # Panics
    ///
    /// Panics if the view is stale.
    pub fn retain_all<I: IntoIterator<Item = T>>(&self, items: I) -> bool {
        let members: HashSet<T> = items.into_iter().collect();
        self.remove_by_membership(&members, false)
    }

    fn remove_by_membership(&self, members: &HashSet<T>, mode: bool) -> bool {
        self.validate();
        let mut changed = false;
        let mut index = self.length.get();
        while index > 0 {
            index -= 1;
            if members.contains(&self.parent.get(self.offset + index)) == mode {
                self.parent.remove_at(self.offset + index);
                self.shrink(1);
                changed = true;
            }
        }
        changed
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for RangeView<'_, T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.to_vec()).finish()
    }
}

impl<T: Clone + fmt::Display> fmt::Display for RangeView<'_, T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[")?;
        let mut first = true;
        for index in 0..self.len() {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{}", self.get(index))?;
        }
        write!(formatter, "]")
    }
}

impl<T: Clone + PartialEq> PartialEq for RangeView<'_, T> {
    /// Ordered pairwise comparison of the projected ranges.
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        (0..self.len()).all(|index| self.get(index) == other.get(index))
    }
}

// =============================================================================
// Proxy cursors
// =============================================================================

/// A cursor of a view's immediate parent: the engine cursor at the bottom of
/// a view chain, or the enclosing view's proxy anywhere above it.
enum AnyCursor<'a, T> {
    List(UnrolledListCursor<'a, T>),
    View(Box<RangeViewCursor<'a, T>>),
}

impl<T> AnyCursor<'_, T> {
    fn insert(&mut self, element: T) {
        match self {
            Self::List(cursor) => cursor.insert(element),
            Self::View(cursor) => cursor.insert(element),
        }
    }

    fn set(&mut self, element: T) -> T {
        match self {
            Self::List(cursor) => cursor.set(element),
            Self::View(cursor) => cursor.set(element),
        }
    }

    fn remove(&mut self) {
        match self {
            Self::List(cursor) => cursor.remove(),
            Self::View(cursor) => cursor.remove(),
        }
    }
}

impl<T: Clone> AnyCursor<'_, T> {
    fn next(&mut self) -> Option<T> {
        match self {
            Self::List(cursor) => cursor.next(),
            Self::View(cursor) => cursor.next(),
        }
    }

    fn previous(&mut self) -> Option<T> {
        match self {
            Self::List(cursor) => cursor.previous(),
            Self::View(cursor) => cursor.previous(),
        }
    }
}

/// A fail-fast bidirectional cursor over a [`RangeView`].
///
/// Wraps a cursor obtained from the view's immediate parent, positioned at
/// the translated index and bounded by the view's length. Mutations forward
/// to the wrapped cursor — bottoming out at an engine cursor — and then
/// adjust the cached length and counter snapshot of every view on the chain,
/// so the handles stay mutually consistent.
pub struct RangeViewCursor<'a, T> {
    view: &'a RangeView<'a, T>,
    inner: AnyCursor<'a, T>,
    /// View-relative index of the element a `next()` call would return.
    cursor: usize,
    /// This cursor's own copy of the view length, maintained across its own
    /// mutations.
    length: usize,
    last_was_next: bool,
}

impl<T> RangeViewCursor<'_, T> {
    /// Returns `true` if a `next()` call would return an element.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.cursor != self.length
    }

    /// Returns `true` if a `previous()` call would return an element.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.cursor != 0
    }

    /// View-relative index of the element a `next()` call would return.
    #[must_use]
    pub const fn next_index(&self) -> usize {
        self.cursor
    }

    /// View-relative index of the element a `previous()` call would return,
    /// or `None` at the front of the view.
    #[must_use]
    pub const fn previous_index(&self) -> Option<usize> {
        self.cursor.checked_sub(1)
    }

    /// Inserts an element immediately before the `next()` position.
    ///
    /// # Panics
    ///
    /// Panics if any handle on the chain is stale.
    pub fn insert(&mut self, element: T) {
        self.inner.insert(element);
        self.cursor += 1;
        self.length += 1;
        self.view.grow(1);
    }

    /// Overwrites the element most recently returned by `next()` or
    /// `previous()`, returning the previous value.
    ///
    /// # Panics
    ///
    /// Panics if no element is positioned or any handle on the chain is
    /// stale.
    pub fn set(&mut self, element: T) -> T {
        self.inner.set(element)
    }

    /// Removes the element most recently returned by `next()` or
    /// `previous()`, shrinking the view.
    ///
    /// # Panics
    ///
    /// Panics if no element is positioned or any handle on the chain is
    /// stale.
    pub fn remove(&mut self) {
        self.inner.remove();
        if self.last_was_next {
            self.cursor -= 1;
        }
        self.length -= 1;
        self.view.shrink(1);
    }
}

#[allow(clippy::should_implement_trait)]
impl<T: Clone> RangeViewCursor<'_, T> {
    /// Moves the cursor forward, returning a clone of the element crossed,
    /// or `None` at the end of the view.
    ///
    /// # Panics
    ///
    /// Panics if any handle on the chain is stale.
    pub fn next(&mut self) -> Option<T> {
        if self.cursor == self.length {
            return None;
        }
        let element = self.inner.next()?;
        self.cursor += 1;
        self.last_was_next = true;
        Some(element)
    }

    /// Moves the cursor backward, returning a clone of the element crossed,
    /// or `None` at the front of the view.
    ///
    /// # Panics
    ///
    /// Panics if any handle on the chain is stale.
    pub fn previous(&mut self) -> Option<T> {
        if self.cursor == 0 {
            return None;
        }
        let element = self.inner.previous()?;
        self.cursor -= 1;
        self.last_was_next = false;
        Some(element)
    }
}

/// A fail-fast forward iterator over a [`RangeView`].
///
/// A length-bounded proxy over a cursor of the view's immediate parent.
/// Supports [`remove`](Self::remove) like the list iterator; a removal also
/// shrinks the view it came from (and every view above it).
pub struct RangeViewIterator<'a, T> {
    view: &'a RangeView<'a, T>,
    inner: AnyCursor<'a, T>,
    iterated: usize,
    total: usize,
    last_removed: bool,
}

impl<T> RangeViewIterator<'_, T> {
    /// Removes the element most recently returned by `next`.
    ///
    /// # Panics
    ///
    /// Panics if `next` has not been called yet, if the element was already
    /// removed, or if any handle on the chain is stale.
    pub fn remove(&mut self) {
        if self.last_removed {
            panic!("the current element was already removed");
        }
        if self.iterated == 0 {
            panic!("no current element: call next() first");
        }
        self.inner.remove();
        self.view.shrink(1);
        self.last_removed = true;
    }
}

impl<T: Clone> Iterator for RangeViewIterator<'_, T> {
    type Item = T;

    /// # Panics
    ///
    /// Panics if any handle on the chain is stale.
    fn next(&mut self) -> Option<Self::Item> {
        if self.iterated == self.total {
            return None;
        }
        let element = self.inner.next()?;
        self.iterated += 1;
        self.last_removed = false;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.iterated;
        (remaining, Some(remaining))
    }
}

impl<T: Clone> ExactSizeIterator for RangeViewIterator<'_, T> {}

// =============================================================================
// Tests
// =============================================================================
