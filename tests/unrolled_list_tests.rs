//! Black-box tests for [`UnrolledList`].
//!
//! Exercises the sequence contract across both segment layouts and a range
//! of degrees, mirroring operations against `Vec`/`VecDeque` references
//! where that sharpens the assertion.

use std::collections::VecDeque;

use rstest::rstest;
use unrolled_list::{SegmentKind, UnrolledList};

fn filled(degree: usize, kind: SegmentKind, count: i32) -> UnrolledList<i32> {
    let list = UnrolledList::with_config(degree, kind);
    for value in 0..count {
        list.push_back(value);
    }
    list
}

const KINDS: [SegmentKind; 2] = [SegmentKind::Shifting, SegmentKind::Circular];
const DEGREES: [usize; 4] = [2, 3, 5, 16];

// =============================================================================
// Construction and configuration
// =============================================================================

#[rstest]
fn test_default_configuration() {
    let list: UnrolledList<i32> = UnrolledList::default();
    assert_eq!(list.degree(), 16);
    assert_eq!(list.segment_kind(), SegmentKind::Circular);
    assert!(list.is_empty());
    assert_eq!(list.segment_count(), 1);
    list.check_health();
}

#[rstest]
#[case(2, 2)]
#[case(3, 4)]
#[case(16, 16)]
#[case(17, 32)]
fn test_circular_degree_rounding(#[case] requested: usize, #[case] effective: usize) {
    let list: UnrolledList<i32> = UnrolledList::with_config(requested, SegmentKind::Circular);
    assert_eq!(list.degree(), effective);
}

#[rstest]
#[should_panic(expected = "segment capacity 1 is below the minimum of 2")]
fn test_degree_one_is_rejected() {
    let _list: UnrolledList<i32> = UnrolledList::with_degree(1);
}

#[rstest]
fn test_degree_two_is_accepted() {
    let list: UnrolledList<i32> = UnrolledList::with_degree(2);
    list.append_all(0..100);
    assert_eq!(list.len(), 100);
    list.check_health();
}

// =============================================================================
// Reference scenarios
// =============================================================================

#[rstest]
fn test_remove_range_scenario() {
    // degree 3, shifting layout: append 0..9, then cut [2, 7).
    let list = filled(3, SegmentKind::Shifting, 10);
    list.remove_range(2..7);
    assert_eq!(list.to_vec(), vec![0, 1, 7, 8, 9]);
    list.check_health();
}

#[rstest]
fn test_insert_split_scenario() {
    // degree 4, circular layout: two full segments, one mid-segment insert.
    let list = filled(4, SegmentKind::Circular, 8);
    assert_eq!(list.segment_count(), 2);
    list.insert(3, 100);
    assert_eq!(list.to_vec(), vec![0, 1, 2, 100, 3, 4, 5, 6, 7]);
    assert_eq!(list.segment_count(), 3);
    list.check_health();
}

#[rstest]
fn test_cursor_symmetry_scenario() {
    // Four previous() calls then four next() calls return to the original
    // position, each symmetric pair yielding the same element.
    let list = filled(16, SegmentKind::Circular, 10);
    let mut cursor = list.cursor_at(4);

    let backward: Vec<i32> = std::iter::from_fn(|| cursor.previous()).take(4).collect();
    let forward: Vec<i32> = std::iter::from_fn(|| cursor.next()).take(4).collect();

    assert_eq!(backward, vec![3, 2, 1, 0]);
    let mut mirrored = backward.clone();
    mirrored.reverse();
    assert_eq!(forward, mirrored);
    assert_eq!(cursor.next_index(), 4);
}

// =============================================================================
// Contents are invariant to degree and layout
// =============================================================================

#[rstest]
fn test_interleaved_edits_match_reference_for_every_configuration() {
    for kind in KINDS {
        for degree in DEGREES {
            let list = UnrolledList::with_config(degree, kind);
            let mut mirror: Vec<i32> = Vec::new();

            for step in 0i32..120 {
                match step % 5 {
                    0 | 1 => {
                        list.push_back(step);
                        mirror.push(step);
                    }
                    2 => {
                        let at = (step as usize * 7) % (mirror.len() + 1);
                        list.insert(at, step);
                        mirror.insert(at, step);
                    }
                    3 if !mirror.is_empty() => {
                        let at = (step as usize * 3) % mirror.len();
                        assert_eq!(list.remove_at(at), mirror.remove(at));
                    }
                    _ => {
                        list.push_front(step);
                        mirror.insert(0, step);
                    }
                }

                assert_eq!(list.len(), mirror.len());
                assert_eq!(list.to_vec(), mirror);
                list.check_health();
            }

            for (index, expected) in mirror.iter().enumerate() {
                assert_eq!(list.get(index), *expected);
            }
        }
    }
}

// =============================================================================
// Bulk operations
// =============================================================================

#[rstest]
fn test_insert_all_at_every_index() {
    for kind in KINDS {
        for at in 0..=6 {
            let list = filled(3, kind, 6);
            let mut mirror: Vec<i32> = (0..6).collect();

            assert!(list.insert_all(at, vec![100, 101, 102, 103, 104]));
            mirror.splice(at..at, [100, 101, 102, 103, 104]);

            assert_eq!(list.to_vec(), mirror);
            list.check_health();
        }
    }
}

#[rstest]
#[case(SegmentKind::Shifting)]
#[case(SegmentKind::Circular)]
fn test_small_batch_fits_in_place(#[case] kind: SegmentKind) {
    let list = filled(8, kind, 4);
    let before = list.segment_count();
    assert!(list.insert_all(2, vec![90, 91]));
    assert_eq!(list.to_vec(), vec![0, 1, 90, 91, 2, 3]);
    assert_eq!(list.segment_count(), before);
    list.check_health();
}

#[rstest]
fn test_append_all_then_push_continues_at_tail() {
    let list: UnrolledList<i32> = UnrolledList::with_config(2, SegmentKind::Shifting);
    assert!(list.append_all(0..5));
    list.push_back(5);
    assert_eq!(list.to_vec(), vec![0, 1, 2, 3, 4, 5]);
    list.check_health();
}

#[rstest]
fn test_empty_bulk_inputs_return_false() {
    let list = filled(3, SegmentKind::Circular, 4);
    assert!(!list.append_all(std::iter::empty()));
    assert!(!list.insert_all(2, std::iter::empty()));
    assert_eq!(list.to_vec(), vec![0, 1, 2, 3]);
}

// =============================================================================
// Removal surfaces
// =============================================================================

#[rstest]
#[case(SegmentKind::Shifting)]
#[case(SegmentKind::Circular)]
fn test_remove_range_consumes_whole_and_partial_segments(#[case] kind: SegmentKind) {
    for (from, to) in [(0, 10), (0, 4), (3, 9), (5, 10), (4, 4)] {
        let list = filled(3, kind, 10);
        let mut mirror: Vec<i32> = (0..10).collect();
        list.remove_range(from..to);
        mirror.drain(from..to);
        assert_eq!(list.to_vec(), mirror);
        list.check_health();
    }
}

#[rstest]
fn test_remove_all_is_one_structural_batch_per_element() {
    let list = filled(3, SegmentKind::Shifting, 10);
    let before = list.modification_count();
    assert!(list.remove_all(vec![0, 2, 4, 6, 8]));
    assert_eq!(list.modification_count(), before + 5);
    assert_eq!(list.to_vec(), vec![1, 3, 5, 7, 9]);
}

#[rstest]
fn test_retain_all_empty_membership_clears() {
    let list = filled(3, SegmentKind::Circular, 10);
    assert!(list.retain_all(std::iter::empty()));
    assert!(list.is_empty());
    assert_eq!(list.segment_count(), 1);
    list.check_health();
}

#[rstest]
fn test_remove_occurrences_duplicate_heavy() {
    let list: UnrolledList<i32> = UnrolledList::with_degree(2);
    list.append_all(vec![9, 1, 9, 9, 2, 9]);
    assert!(list.remove_first_occurrence(&9));
    assert!(list.remove_last_occurrence(&9));
    assert_eq!(list.to_vec(), vec![1, 9, 9, 2]);
    assert_eq!(list.index_of(&9), Some(1));
    assert_eq!(list.last_index_of(&9), Some(2));
    list.check_health();
}

// =============================================================================
// Equality, hash, rendering, cloning
// =============================================================================

#[rstest]
fn test_equality_and_hash_across_configurations() {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let fingerprint = |list: &UnrolledList<i32>| {
        let mut hasher = DefaultHasher::new();
        list.hash(&mut hasher);
        hasher.finish()
    };

    let reference = filled(16, SegmentKind::Circular, 25);
    for kind in KINDS {
        for degree in DEGREES {
            let other = filled(degree, kind, 25);
            assert_eq!(reference, other);
            assert_eq!(fingerprint(&reference), fingerprint(&other));
        }
    }

    let shorter = filled(16, SegmentKind::Circular, 24);
    assert_ne!(reference, shorter);
}

#[rstest]
fn test_clone_preserves_configuration_and_contents() {
    let list = filled(3, SegmentKind::Shifting, 17);
    let cloned = list.clone();

    assert_eq!(cloned.to_vec(), list.to_vec());
    assert_eq!(cloned.degree(), 3);
    assert_eq!(cloned.segment_kind(), SegmentKind::Shifting);
    cloned.check_health();

    cloned.push_back(99);
    assert_eq!(list.len(), 17);
    assert_eq!(cloned.len(), 18);
}

#[rstest]
fn test_display_matches_sequence_notation() {
    let list = filled(2, SegmentKind::Shifting, 4);
    assert_eq!(list.to_string(), "[0, 1, 2, 3]");
}

#[rstest]
fn test_to_vec_and_copy_into_slice_agree() {
    let list = filled(3, SegmentKind::Circular, 9);
    let collected = list.to_vec();

    let mut buffer = vec![0; 12];
    let written = list.copy_into_slice(&mut buffer);
    assert_eq!(written, 9);
    assert_eq!(&buffer[..9], collected.as_slice());
}

#[rstest]
fn test_from_iterator_and_extend() {
    let mut list: UnrolledList<i32> = (0..5).collect();
    list.extend(5..8);
    assert_eq!(list.to_vec(), (0..8).collect::<Vec<_>>());
}

// =============================================================================
// Fail-fast interplay between handles
// =============================================================================

#[rstest]
#[should_panic(expected = "concurrent structural modification")]
fn test_one_iterators_removal_faults_another() {
    let list = filled(3, SegmentKind::Shifting, 6);
    let mut first = list.iter();
    let mut second = list.iter();
    first.next();
    first.remove();
    second.next();
}

#[rstest]
#[should_panic(expected = "concurrent structural modification")]
fn test_cursor_insert_faults_open_iterator() {
    let list = filled(3, SegmentKind::Shifting, 6);
    let mut iterator = list.iter();
    iterator.next();
    let mut cursor = list.cursor();
    cursor.insert(42);
    iterator.next();
}

#[rstest]
#[should_panic(expected = "concurrent structural modification")]
fn test_clear_faults_open_cursor() {
    let list = filled(3, SegmentKind::Shifting, 6);
    let mut cursor = list.cursor();
    cursor.next();
    list.clear();
    cursor.next();
}

#[rstest]
fn test_set_does_not_fault_open_handles() {
    let list = filled(3, SegmentKind::Shifting, 6);
    let mut iterator = list.iter();
    iterator.next();
    list.set(5, 50);
    assert_eq!(iterator.next(), Some(1));
}

#[rstest]
fn test_fresh_handle_after_mutation_works() {
    let list = filled(3, SegmentKind::Shifting, 6);
    let mut stale = list.iter();
    stale.next();
    list.push_back(6);
    let fresh: Vec<i32> = list.iter().collect();
    assert_eq!(fresh, vec![0, 1, 2, 3, 4, 5, 6]);
}

// =============================================================================
// Deque-flavored parity
// =============================================================================

#[rstest]
#[case(SegmentKind::Shifting)]
#[case(SegmentKind::Circular)]
fn test_front_back_parity_with_vecdeque(#[case] kind: SegmentKind) {
    let list = UnrolledList::with_config(3, kind);
    let mut reference: VecDeque<i32> = VecDeque::new();

    for step in 0i32..40 {
        match step % 4 {
            0 => {
                list.push_back(step);
                reference.push_back(step);
            }
            1 => {
                list.push_front(step);
                reference.push_front(step);
            }
            2 => {
                assert_eq!(list.pop_front(), reference.pop_front());
            }
            _ => {
                assert_eq!(list.pop_back(), reference.pop_back());
            }
        }
        assert_eq!(list.front(), reference.front().copied());
        assert_eq!(list.back(), reference.back().copied());
        assert_eq!(list.len(), reference.len());
        list.check_health();
    }
}

#[rstest]
fn test_descending_iterator_matches_reversed_contents() {
    let list = filled(4, SegmentKind::Circular, 11);
    let descending: Vec<i32> = list.descending_iter().collect();
    let mut expected = list.to_vec();
    expected.reverse();
    assert_eq!(descending, expected);
}

// =============================================================================
// Modification counter discipline
// =============================================================================

#[rstest]
fn test_counter_tracks_batch_sizes() {
    let list: UnrolledList<i32> = UnrolledList::with_degree(4);

    list.append_all(0..7);
    assert_eq!(list.modification_count(), 7);

    list.insert_all(3, vec![70, 71, 72]);
    assert_eq!(list.modification_count(), 10);

    list.remove_range(0..4);
    assert_eq!(list.modification_count(), 14);

    assert!(list.remove_first_occurrence(&72));
    assert_eq!(list.modification_count(), 15);

    let survivors = list.len() as u64;
    list.clear();
    assert_eq!(list.modification_count(), 15 + survivors);
}
