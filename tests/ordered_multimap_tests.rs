//! Unit tests for OrderedMultiMap.

use delta_cache::delta::OrderedMultiMap;
use rstest::{fixture, rstest};

type HashesByTime = OrderedMultiMap<u32, [u8; 4]>;

fn hash(seed: u8) -> [u8; 4] {
    [seed, seed.wrapping_mul(3), seed.wrapping_add(7), 0xAB]
}

/// Six pairs spread over three keys.
#[fixture]
fn three_keys() -> HashesByTime {
    let map = HashesByTime::new();
    map.put(0, hash(1));
    map.put(1, hash(2));
    map.put(1, hash(3));
    map.put(2, hash(4));
    map.put(2, hash(5));
    map.put(2, hash(6));
    map
}

// =============================================================================
// Construction / Clear Tests
// =============================================================================

#[rstest]
fn test_new_creates_empty_map() {
    let map = HashesByTime::new();
    assert_eq!(map.len(), 0);
    assert!(map.is_empty());
}

#[rstest]
fn test_from_iterator_collects_pairs() {
    let map: HashesByTime = [(0, hash(1)), (0, hash(1)), (3, hash(2))]
        .into_iter()
        .collect();
    assert_eq!(map.len(), 2);
    assert_eq!(map.key_count(), 2);
}

#[rstest]
fn test_clear_removes_all_pairs(three_keys: HashesByTime) {
    assert_eq!(three_keys.len(), 6);
    three_keys.clear();
    assert_eq!(three_keys.len(), 0);
    assert!(three_keys.is_empty());
}

// =============================================================================
// Contains Tests
// =============================================================================

#[rstest]
fn test_contains_known_pair(three_keys: HashesByTime) {
    assert!(three_keys.contains(&1, &hash(3)));
    assert!(three_keys.contains_key(&2));
}

#[rstest]
fn test_contains_unknown_pair(three_keys: HashesByTime) {
    assert!(!three_keys.contains(&0, &hash(9)));
    assert!(!three_keys.contains(&1, &hash(1)));
    assert!(!three_keys.contains_key(&3));
}

// =============================================================================
// Put Tests
// =============================================================================

#[rstest]
fn test_put_with_unknown_key() {
    let map = HashesByTime::new();
    map.put(0, hash(1));

    assert_eq!(map.len(), 1);
    assert!(map.contains(&0, &hash(1)));
}

#[rstest]
fn test_put_with_known_key_extends_set() {
    let map = HashesByTime::new();
    map.put(0, hash(1));
    map.put(0, hash(2));

    assert_eq!(map.len(), 2);
    assert_eq!(map.key_count(), 1);
}

#[rstest]
fn test_put_of_duplicate_pair_is_ignored() {
    let map = HashesByTime::new();
    map.put(0, hash(1));
    map.put(0, hash(1));

    assert_eq!(map.len(), 1);
}

#[rstest]
fn test_put_set_with_known_key() {
    let map = HashesByTime::new();
    map.put(0, hash(9));
    map.put_set(0, [hash(1), hash(2), hash(3)]);

    assert_eq!(map.len(), 4);
    assert_eq!(map.get(&0).len(), 4);
}

#[rstest]
fn test_put_set_of_nothing_registers_no_key() {
    let map = HashesByTime::new();
    map.put_set(0, std::iter::empty());

    assert!(map.is_empty());
    assert!(!map.contains_key(&0));
}

#[rstest]
fn test_put_all_copies_every_pair(three_keys: HashesByTime) {
    let target = HashesByTime::new();
    target.put(9, hash(9));
    target.put_all(&three_keys);

    assert_eq!(target.len(), 7);
    three_keys.for_each(|key, value| assert!(target.contains(key, value)));
}

// =============================================================================
// Remove Tests
// =============================================================================

#[rstest]
fn test_remove_drops_single_pair() {
    let map = HashesByTime::new();
    map.put_set(0, [hash(1), hash(2), hash(3)]);

    assert!(map.remove(&0, &hash(1)));
    assert!(map.remove(&0, &hash(3)));

    assert_eq!(map.len(), 1);
    assert!(map.contains(&0, &hash(2)));
    assert!(!map.contains(&0, &hash(1)));
}

#[rstest]
fn test_remove_all_drops_given_pairs(three_keys: HashesByTime) {
    let removals = HashesByTime::new();
    removals.put(1, hash(2));
    removals.put(2, hash(4));
    removals.put(2, hash(6));

    three_keys.remove_all(&removals);

    assert_eq!(three_keys.len(), 3);
    assert_eq!(three_keys.get(&1), vec![hash(3)]);
    assert_eq!(three_keys.get(&2), vec![hash(5)]);
    assert_eq!(removals.len(), 3);
}

// =============================================================================
// Range Query Tests
// =============================================================================

#[rstest]
fn test_values_before_returns_values_of_earlier_keys() {
    let map = HashesByTime::new();
    map.put(0, hash(1));
    map.put_set(5, [hash(2), hash(3)]);
    map.put_set(6, [hash(4), hash(5)]);

    assert_eq!(map.get_values_before(&5), vec![hash(1)]);

    let mut found = map.get_values_before(&6);
    found.sort_unstable();
    let mut expected = vec![hash(1), hash(2), hash(3)];
    expected.sort_unstable();
    assert_eq!(found, expected);
}

#[rstest]
fn test_for_each_before_visits_keys_in_order(three_keys: HashesByTime) {
    let mut keys = Vec::new();
    three_keys.for_each_before(&2, |key, _| keys.push(*key));
    assert_eq!(keys, vec![0, 1, 1]);
}

// =============================================================================
// Entries / Copy Tests
// =============================================================================

#[rstest]
fn test_entries_are_sorted_by_key() {
    let map = HashesByTime::new();
    map.put(1, hash(2));
    map.put(1, hash(3));
    map.put(0, hash(1));

    let entries = map.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], (0, vec![hash(1)]));
    assert_eq!(entries[1].0, 1);
    assert_eq!(entries[1].1.len(), 2);
}

#[rstest]
fn test_duplicate_is_independent(three_keys: HashesByTime) {
    let copy = three_keys.duplicate();
    copy.remove(&0, &hash(1));
    copy.put(7, hash(7));

    assert_eq!(three_keys.len(), 6);
    assert!(three_keys.contains(&0, &hash(1)));
    assert!(!three_keys.contains_key(&7));
}

#[rstest]
fn test_replace_with_discards_previous_pairs(three_keys: HashesByTime) {
    let target = HashesByTime::new();
    target.put(9, hash(9));
    target.replace_with(&three_keys);

    assert_eq!(target.entries(), three_keys.entries());
}
