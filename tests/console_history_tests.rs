//! History scanning tests

use buspirate_console::console::history::{entry_bytes, find_entry, EntryStarts};
use buspirate_console::console::{CommandRing, History, Recall};

/// Commit each line back to back and leave an empty live line after them.
fn ring_with_lines<const N: usize>(start: usize, lines: &[&str]) -> CommandRing<N> {
    let mut ring = CommandRing::new();
    ring.reset_to(start);
    for line in lines {
        for b in line.bytes() {
            assert!(ring.push(b));
        }
        ring.commit();
        let next = ring.end();
        ring.reset_to(next);
    }
    ring
}

fn text<const N: usize>(ring: &CommandRing<N>, from: usize, to: usize) -> String {
    String::from_utf8(ring.bytes(from, to).collect()).unwrap()
}

#[test]
fn test_empty_ring_has_no_history() {
    let ring = CommandRing::<32>::new();
    let mut history = History::new();

    assert_eq!(find_entry(&ring, 1), None);
    assert_eq!(history.get_prev(&ring), Recall::Exhausted);
    assert_eq!(history.get_next(&ring), Recall::Exhausted);
}

#[test]
fn test_find_entry_newest_first() {
    let ring = ring_with_lines::<64>(0, &["A", "BB", "CCC"]);

    let (from, to) = find_entry(&ring, 1).unwrap();
    assert_eq!(text(&ring, from, to), "CCC");
    let (from, to) = find_entry(&ring, 3).unwrap();
    assert_eq!(text(&ring, from, to), "A");
    assert_eq!(find_entry(&ring, 4), None);
    assert_eq!(find_entry(&ring, 0), None);
}

#[test]
fn test_entries_across_wrap() {
    let ring = ring_with_lines::<16>(12, &["abc", "de"]);

    // "abc\0" fills 12..16, "de\0" lands at 0..3
    assert_eq!(ring.start(), 3);
    let (from, to) = find_entry(&ring, 2).unwrap();
    assert_eq!((from, to), (12, 15));
    assert_eq!(text(&ring, from, to), "abc");
}

#[test]
fn test_overwritten_entry_is_unavailable() {
    // Third line wraps onto the start of the first one
    let ring = ring_with_lines::<16>(0, &["abcdef", "ghij", "klmnop"]);

    let (from, to) = find_entry(&ring, 1).unwrap();
    assert_eq!(text(&ring, from, to), "klmnop");
    let (from, to) = find_entry(&ring, 2).unwrap();
    assert_eq!(text(&ring, from, to), "ghij");
    assert_eq!(find_entry(&ring, 3), None);
}

#[test]
fn test_navigation_round_trip() {
    let ring = ring_with_lines::<64>(0, &["A", "B", "C"]);
    let mut history = History::new();

    let mut seen = Vec::new();
    while let Recall::Entry { from, to } = history.get_prev(&ring) {
        seen.push(text(&ring, from, to));
    }
    assert_eq!(seen, ["C", "B", "A"]);
    assert_eq!(history.position(), 3);

    assert!(matches!(history.get_next(&ring), Recall::Entry { .. }));
    assert!(matches!(history.get_next(&ring), Recall::Entry { .. }));
    assert_eq!(history.get_next(&ring), Recall::Live);
    assert_eq!(history.get_next(&ring), Recall::Exhausted);
}

#[test]
fn test_entry_starts_lists_current_line_first() {
    let mut ring = ring_with_lines::<64>(0, &["[", "r:2"]);
    let origin = ring.start();
    ring.push(b'h');
    ring.commit();

    let entries: Vec<String> = EntryStarts::new(&ring, origin)
        .map(|from| String::from_utf8(entry_bytes(&ring, from).collect()).unwrap())
        .collect();

    assert_eq!(entries, ["h", "r:2", "["]);
}
