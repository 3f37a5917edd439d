// marks.rs - Persistent list of capture marks.
//
// Every MARK instruction conses a new node onto the list it was given.
// Nodes are never mutated, so a saved head pointer is a complete snapshot
// and backtracking is just dropping the newer head.

use std::rc::Rc;

use smallvec::SmallVec;

/// One recorded `(gid, position)` pair.
#[derive(Debug)]
pub struct Mark {
    gid: usize,
    position: usize,
    prev: Marks,
}

/// Head of a mark list, most recent mark first. `None` is the empty list.
pub type Marks = Option<Rc<Mark>>;

/// Slot table produced by [`flatten`]: `2 * groups` entries.
pub type FlatMarks = SmallVec<[Option<usize>; 16]>;

impl Mark {
    pub fn gid(&self) -> usize {
        self.gid
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn prev(&self) -> &Marks {
        &self.prev
    }
}

impl Drop for Mark {
    // Unlink iteratively; long lists would otherwise recurse once per node.
    fn drop(&mut self) {
        let mut next = self.prev.take();
        while let Some(rc) = next {
            match Rc::try_unwrap(rc) {
                Ok(mut mark) => next = mark.prev.take(),
                Err(_) => break,
            }
        }
    }
}

/// Return a new list with `(gid, position)` in front of `marks`.
pub fn push(marks: &Marks, gid: usize, position: usize) -> Marks {
    Some(Rc::new(Mark {
        gid,
        position,
        prev: marks.clone(),
    }))
}

/// Iterate from the most recent mark to the oldest.
pub fn iter(marks: &Marks) -> impl Iterator<Item = &Mark> {
    let mut cur = marks.as_deref();
    std::iter::from_fn(move || {
        let mark = cur?;
        cur = mark.prev.as_deref();
        Some(mark)
    })
}

/// Most recent position recorded for `gid`.
pub fn get_mark(marks: &Marks, gid: usize) -> Option<usize> {
    iter(marks).find(|m| m.gid == gid).map(|m| m.position)
}

/// Expand the list into a slot table for `groups` capture groups; each slot
/// holds the most recent position for its gid.
pub fn flatten(marks: &Marks, groups: usize) -> FlatMarks {
    let size = groups * 2;
    let mut flat: FlatMarks = SmallVec::from_elem(None, size);
    for mark in iter(marks) {
        if mark.gid < size && flat[mark.gid].is_none() {
            flat[mark.gid] = Some(mark.position);
        }
    }
    flat
}

/// Index of the group whose closing mark was recorded last.
pub fn last_index(marks: &Marks) -> Option<usize> {
    iter(marks).find(|m| m.gid % 2 == 1).map(|m| m.gid / 2 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn most_recent_wins() {
        let m = push(&None, 0, 1);
        let m = push(&m, 1, 3);
        let m = push(&m, 0, 5);
        assert_eq!(get_mark(&m, 0), Some(5));
        assert_eq!(get_mark(&m, 1), Some(3));
        assert_eq!(get_mark(&m, 2), None);
    }

    #[test]
    fn snapshots_are_unaffected_by_later_pushes() {
        let base = push(&None, 0, 2);
        let snapshot = base.clone();
        let _newer = push(&base, 0, 9);
        assert_eq!(get_mark(&snapshot, 0), Some(2));
    }

    #[test]
    fn flatten_fills_each_slot_once() {
        let m = push(&None, 0, 0);
        let m = push(&m, 1, 1);
        let m = push(&m, 0, 4);
        let m = push(&m, 7, 8);
        let flat = flatten(&m, 2);
        assert_eq!(flat.as_slice(), &[Some(4), Some(1), None, None]);
    }

    #[test]
    fn last_index_tracks_closing_marks() {
        assert_eq!(last_index(&None), None);
        // (a(b)): inner group closes before the outer one
        let m = push(&None, 0, 0);
        let m = push(&m, 2, 1);
        let m = push(&m, 3, 2);
        assert_eq!(last_index(&m), Some(2));
        let m = push(&m, 1, 2);
        assert_eq!(last_index(&m), Some(1));
    }

    #[test]
    fn long_lists_drop_without_recursion() {
        let mut m: Marks = None;
        for i in 0..200_000 {
            m = push(&m, i % 4, i);
        }
        drop(m);
    }
}
