//! Chunked sample container
//!
//! Samples arrive one group per device callback. A `SampleSequence` keeps
//! those groups in production order while still behaving like one flat,
//! indexable and iterable buffer.

pub mod cursor;
pub mod iter;
pub mod metadata;

pub use cursor::Cursor;
pub use iter::{IntoIter, Iter, IterMut};
pub use metadata::{Metadata, MetadataError};

use std::collections::VecDeque;
use std::ops::{Index, IndexMut};
use std::time::Duration;

/// Ordered queue of fixed-capacity sample groups
///
/// Every group except possibly the last holds exactly
/// `metadata.group_capacity()` samples. `push` does not check this;
/// `extend_from_slice` keeps it by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSequence<T> {
    metadata: Metadata,
    groups: VecDeque<Vec<T>>,
}

impl<T> SampleSequence<T> {
    /// Create an empty sequence
    pub fn new(metadata: Metadata) -> Self {
        Self {
            metadata,
            groups: VecDeque::new(),
        }
    }

    /// Create a sequence from already captured groups
    pub fn from_groups<I>(metadata: Metadata, groups: I) -> Self
    where
        I: IntoIterator<Item = Vec<T>>,
    {
        Self {
            metadata,
            groups: groups.into_iter().collect(),
        }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Append one group to the back
    pub fn push(&mut self, group: Vec<T>) {
        self.groups.push_back(group);
    }

    /// Remove and return the front group
    ///
    /// `None` means the producer has not supplied more data yet.
    pub fn pop(&mut self) -> Option<Vec<T>> {
        self.groups.pop_front()
    }

    /// Number of groups currently queued
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Logical number of samples across all groups
    pub fn len(&self) -> usize {
        match self.groups.back() {
            Some(last) => (self.groups.len() - 1) * self.metadata.group_capacity() + last.len(),
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the back group is full (an empty sequence counts as full)
    pub fn last_group_is_full(&self) -> bool {
        self.groups
            .back()
            .map_or(true, |last| last.len() >= self.metadata.group_capacity())
    }

    /// Playback length of all groups
    ///
    /// Integer milliseconds: `group_count * group_capacity / (sample_rate / 1000)`,
    /// truncated. The last group counts as full.
    pub fn duration(&self) -> Duration {
        let samples = self.groups.len() as u64 * self.metadata.group_capacity() as u64;
        let samples_per_ms = (self.metadata.sample_rate() / 1000) as u64;
        Duration::from_millis(samples / samples_per_ms)
    }

    /// Split a linear index into (group, offset)
    fn locate(&self, index: usize) -> (usize, usize) {
        let capacity = self.metadata.group_capacity();
        (index / capacity, index % capacity)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        let (group, offset) = self.locate(index);
        self.groups.get(group).and_then(|samples| samples.get(offset))
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        let (group, offset) = self.locate(index);
        self.groups
            .get_mut(group)
            .and_then(|samples| samples.get_mut(offset))
    }

    /// Iterate over the groups in production order
    pub fn groups(&self) -> impl DoubleEndedIterator<Item = &[T]> + ExactSizeIterator {
        self.groups.iter().map(Vec::as_slice)
    }

    pub fn groups_mut(
        &mut self,
    ) -> impl DoubleEndedIterator<Item = &mut [T]> + ExactSizeIterator {
        self.groups.iter_mut().map(Vec::as_mut_slice)
    }

    /// Take all groups out, leaving an empty sequence with the same metadata
    pub fn take(&mut self) -> Self {
        Self {
            metadata: self.metadata,
            groups: std::mem::take(&mut self.groups),
        }
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.groups)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(&mut self.groups)
    }

    /// Cursor on the first sample, or the end sentinel if empty
    pub fn cursor_front(&self) -> Cursor<'_, T> {
        Cursor::front(self)
    }

    /// Cursor on the last sample, or the end sentinel if empty
    pub fn cursor_back(&self) -> Cursor<'_, T> {
        Cursor::back(self)
    }

    pub(crate) fn group(&self, index: usize) -> Option<&Vec<T>> {
        self.groups.get(index)
    }

    /// Reverse the samples inside each group, keeping group order
    pub fn reverse_samples(&mut self) {
        for group in self.groups.iter_mut() {
            group.reverse();
        }
    }

    /// Reverse the order of the groups, keeping each group's samples
    pub fn reverse_groups(&mut self) {
        self.groups.make_contiguous().reverse();
    }

    /// Reverse the whole sequence sample by sample
    pub fn reverse(&mut self) {
        self.reverse_samples();
        self.reverse_groups();
    }
}

impl<T: Clone> SampleSequence<T> {
    /// Append samples, topping up the back group before starting new ones
    pub fn extend_from_slice(&mut self, mut samples: &[T]) {
        let capacity = self.metadata.group_capacity();

        if let Some(last) = self.groups.back_mut() {
            let room = capacity.saturating_sub(last.len());
            let take = room.min(samples.len());
            last.extend_from_slice(&samples[..take]);
            samples = &samples[take..];
        }

        for chunk in samples.chunks(capacity) {
            let mut group = Vec::with_capacity(capacity);
            group.extend_from_slice(chunk);
            self.groups.push_back(group);
        }
    }
}

impl<T: bytemuck::Pod> SampleSequence<T> {
    /// Reinterpret raw callback bytes as one group of samples
    ///
    /// Reads `bytes.len() / size_of::<T>()` samples; trailing partial
    /// sample bytes are ignored. No alignment is required.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        let whole = bytes.len() - bytes.len() % std::mem::size_of::<T>();
        self.push(bytemuck::pod_collect_to_vec(&bytes[..whole]));
    }
}

impl<T> Default for SampleSequence<T> {
    fn default() -> Self {
        Self::new(Metadata::default())
    }
}

impl<T> Index<usize> for SampleSequence<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        let (group, offset) = self.locate(index);
        &self.groups[group][offset]
    }
}

impl<T> IndexMut<usize> for SampleSequence<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let (group, offset) = self.locate(index);
        &mut self.groups[group][offset]
    }
}

impl<T: Clone> Extend<T> for SampleSequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let samples: Vec<T> = iter.into_iter().collect();
        self.extend_from_slice(&samples);
    }
}

impl<'a, T> IntoIterator for &'a SampleSequence<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut SampleSequence<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

impl<T> IntoIterator for SampleSequence<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter::new(self.groups)
    }
}
