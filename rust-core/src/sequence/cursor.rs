//! Bidirectional position within a sequence
//!
//! A cursor points at one sample or at the end sentinel. Moving past the
//! last sample of a group continues at the first sample of the next
//! group; running off either end of the sequence yields the sentinel.
//! All sentinels compare equal, whichever sequence they came from.

use super::SampleSequence;

struct Position<'a, T> {
    seq: &'a SampleSequence<T>,
    group: usize,
    offset: usize,
}

impl<T> Clone for Position<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Position<'_, T> {}

pub struct Cursor<'a, T> {
    position: Option<Position<'a, T>>,
}

impl<'a, T> Cursor<'a, T> {
    /// The end sentinel
    pub fn end() -> Self {
        Self { position: None }
    }

    pub(super) fn front(seq: &'a SampleSequence<T>) -> Self {
        let position = (0..seq.group_count())
            .find(|&group| seq.group(group).map_or(false, |g| !g.is_empty()))
            .map(|group| Position {
                seq,
                group,
                offset: 0,
            });
        Self { position }
    }

    pub(super) fn back(seq: &'a SampleSequence<T>) -> Self {
        let position = (0..seq.group_count())
            .rev()
            .find_map(|group| {
                let len = seq.group(group)?.len();
                (len > 0).then(|| Position {
                    seq,
                    group,
                    offset: len - 1,
                })
            });
        Self { position }
    }

    pub fn is_end(&self) -> bool {
        self.position.is_none()
    }

    /// Sample under the cursor, `None` at the end sentinel
    pub fn current(&self) -> Option<&'a T> {
        let position = self.position?;
        position.seq.group(position.group)?.get(position.offset)
    }

    /// Linear index of the sample under the cursor
    pub fn index(&self) -> Option<usize> {
        self.position.map(|position| {
            position.group * position.seq.metadata().group_capacity() + position.offset
        })
    }

    /// Advance by one sample; the sentinel stays where it is
    pub fn move_next(&mut self) {
        let Some(mut position) = self.position else {
            return;
        };

        let seq = position.seq;
        let group_len = seq.group(position.group).map_or(0, Vec::len);
        if position.offset + 1 < group_len {
            position.offset += 1;
            self.position = Some(position);
            return;
        }

        self.position = (position.group + 1..seq.group_count())
            .find(|&group| seq.group(group).map_or(false, |g| !g.is_empty()))
            .map(|group| Position {
                seq,
                group,
                offset: 0,
            });
    }

    /// Step back by one sample; the sentinel stays where it is
    pub fn move_prev(&mut self) {
        let Some(mut position) = self.position else {
            return;
        };

        if position.offset > 0 {
            position.offset -= 1;
            self.position = Some(position);
            return;
        }

        let seq = position.seq;
        self.position = (0..position.group).rev().find_map(|group| {
            let len = seq.group(group)?.len();
            (len > 0).then(|| Position {
                seq,
                group,
                offset: len - 1,
            })
        });
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        Self {
            position: self.position,
        }
    }
}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.position, &other.position) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                std::ptr::eq(a.seq, b.seq) && a.group == b.group && a.offset == b.offset
            }
            _ => false,
        }
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T> std::fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.position {
            Some(position) => f
                .debug_struct("Cursor")
                .field("group", &position.group)
                .field("offset", &position.offset)
                .finish(),
            None => f.write_str("Cursor(end)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::sequence::{Cursor, Metadata, SampleSequence};

    fn sequence(groups: &[&[i32]]) -> SampleSequence<i32> {
        SampleSequence::from_groups(
            Metadata::new(8000, 1, 2).unwrap(),
            groups.iter().map(|g| g.to_vec()),
        )
    }

    #[test]
    fn test_forward_walk_crosses_groups() {
        let seq = sequence(&[&[1, 2], &[3, 4], &[5]]);
        let mut cursor = seq.cursor_front();
        let mut seen = Vec::new();

        while let Some(&value) = cursor.current() {
            assert_eq!(seq[cursor.index().unwrap()], value);
            seen.push(value);
            cursor.move_next();
        }

        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
        assert_eq!(cursor, Cursor::end());
    }

    #[test]
    fn test_backward_walk_ends_at_sentinel() {
        let seq = sequence(&[&[1, 2], &[3]]);
        let mut cursor = seq.cursor_back();
        assert_eq!(cursor.current(), Some(&3));

        cursor.move_prev();
        assert_eq!(cursor.current(), Some(&2));
        cursor.move_prev();
        assert_eq!(cursor.current(), Some(&1));
        cursor.move_prev();
        assert!(cursor.is_end());
    }

    #[test]
    fn test_next_then_prev_round_trips() {
        let seq = sequence(&[&[1, 2], &[3, 4]]);
        let start = {
            let mut cursor = seq.cursor_front();
            cursor.move_next();
            cursor
        };

        let mut cursor = start.clone();
        cursor.move_next();
        assert_eq!(cursor.current(), Some(&3));
        cursor.move_prev();
        assert_eq!(cursor, start);
    }

    #[test]
    fn test_empty_sequence_front_is_end() {
        let seq = sequence(&[]);
        assert!(seq.cursor_front().is_end());
        assert!(seq.cursor_back().is_end());
    }

    #[test]
    fn test_equality_depends_on_sequence() {
        let a = sequence(&[&[1, 2]]);
        let b = a.clone();

        assert_eq!(a.cursor_front(), a.cursor_front());
        assert_ne!(a.cursor_front(), b.cursor_front());

        let mut end_a = a.cursor_back();
        end_a.move_next();
        let mut end_b = b.cursor_back();
        end_b.move_next();
        assert_eq!(end_a, end_b);
    }

    #[test]
    fn test_sentinel_does_not_move() {
        let mut cursor: Cursor<'_, i32> = Cursor::end();
        cursor.move_next();
        cursor.move_prev();
        assert!(cursor.is_end());
        assert_eq!(cursor.current(), None);
    }
}
