//! Flat iteration across group boundaries

use std::collections::vec_deque;
use std::collections::VecDeque;
use std::iter::{Flatten, FusedIterator};

fn total_len<T>(groups: &VecDeque<Vec<T>>) -> usize {
    groups.iter().map(Vec::len).sum()
}

/// Borrowing iterator over every sample of a sequence
pub struct Iter<'a, T> {
    inner: Flatten<vec_deque::Iter<'a, Vec<T>>>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(super) fn new(groups: &'a VecDeque<Vec<T>>) -> Self {
        Self {
            remaining: total_len(groups),
            inner: groups.iter().flatten(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let item = self.inner.next()?;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        let item = self.inner.next_back()?;
        self.remaining -= 1;
        Some(item)
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            remaining: self.remaining,
        }
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Mutable iterator over every sample of a sequence
pub struct IterMut<'a, T> {
    inner: Flatten<vec_deque::IterMut<'a, Vec<T>>>,
    remaining: usize,
}

impl<'a, T> IterMut<'a, T> {
    pub(super) fn new(groups: &'a mut VecDeque<Vec<T>>) -> Self {
        let remaining = total_len(groups);
        Self {
            inner: groups.iter_mut().flatten(),
            remaining,
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        let item = self.inner.next()?;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
    fn next_back(&mut self) -> Option<&'a mut T> {
        let item = self.inner.next_back()?;
        self.remaining -= 1;
        Some(item)
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

/// Owning iterator, consuming the groups front to back
pub struct IntoIter<T> {
    inner: Flatten<vec_deque::IntoIter<Vec<T>>>,
    remaining: usize,
}

impl<T> IntoIter<T> {
    pub(super) fn new(groups: VecDeque<Vec<T>>) -> Self {
        Self {
            remaining: total_len(&groups),
            inner: groups.into_iter().flatten(),
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let item = self.inner.next()?;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        let item = self.inner.next_back()?;
        self.remaining -= 1;
        Some(item)
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}
