//! # unrolled-list
//!
//! A random-access sequence container backed by a chain of fixed-capacity
//! array segments (an *unrolled linked list*), with fail-fast iterators and
//! nested non-copying range views.
//!
//! ## Overview
//!
//! An [`UnrolledList`] keeps its elements in small arrays of a configurable
//! capacity (the *degree*) linked into a doubly linked chain. It sits
//! between a contiguous growable array and a node-per-element linked list:
//!
//! - Reads resolve a global index by hopping segments from the closer end of
//!   the chain — near-array locality once inside a segment.
//! - Mid-sequence insertion and removal shift at most one segment, splitting
//!   a full segment or unlinking an emptied one instead of moving the whole
//!   tail of the sequence.
//!
//! Two interchangeable segment layouts are provided, chosen at construction
//! via [`SegmentKind`]: a *shifting* layout (elements packed at the front,
//! edits shift the right partition) and a *circular* layout (a power-of-two
//! ring buffer that shifts whichever side is shorter). Their observable
//! behavior is identical.
//!
//! ## Fail-fast handles
//!
//! Iterators ([`UnrolledListIterator`], [`UnrolledListDescendingIterator`]),
//! bidirectional cursors ([`UnrolledListCursor`]), and range views
//! ([`RangeView`], nestable to any depth) are plain borrows of the list
//! carrying a snapshot of its modification counter. Structurally modifying
//! the list while such a handle is open is allowed — every operation takes
//! `&self` — but the handle detects the change on its next use and panics
//! instead of yielding stale data. A handle's own mutating methods keep it
//! (and, for views, the whole ancestor chain) fresh.
//!
//! This is a single-threaded protocol against interleaved use of handles,
//! not a thread-safety mechanism; the container is `!Sync` by construction.
//!
//! ## Example
//!
//! ```rust
//! use unrolled_list::{SegmentKind, UnrolledList};
//!
//! let list = UnrolledList::with_config(4, SegmentKind::Circular);
//! list.append_all(0..10);
//!
//! // Random access and mid-sequence edits.
//! assert_eq!(list.get(6), 6);
//! list.insert(3, 100);
//! list.remove_range(5..8);
//! assert_eq!(list.to_vec(), vec![0, 1, 2, 100, 3, 7, 8, 9]);
//!
//! // A non-copying view over a sub-range.
//! let view = list.view(2..6);
//! assert_eq!(view.to_vec(), vec![2, 100, 3, 7]);
//! view.remove_at(1);
//! assert_eq!(list.len(), 7);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod cursor;
mod list;
mod segment;
mod view;

pub use cursor::UnrolledListCursor;
pub use cursor::UnrolledListDescendingIterator;
pub use cursor::UnrolledListIntoIterator;
pub use cursor::UnrolledListIterator;
pub use list::UnrolledList;
pub use segment::SegmentKind;
pub use view::RangeView;
pub use view::RangeViewCursor;
pub use view::RangeViewIterator;
