//! Sample exchange between device callbacks and the controlling thread
//!
//! A stream callback gets exclusive access to its sequence through a
//! `Handoff` only while the stream runs. The controlling thread touches
//! the contents again only after pausing the stream.

use crate::sequence::SampleSequence;
use cpal::SampleFormat;
use std::sync::{Arc, Mutex, PoisonError};

/// Sample types the device layer can stream as raw bytes
///
/// All-zero bytes must encode silence.
pub trait DeviceSample: bytemuck::Pod + Send + 'static {
    const FORMAT: SampleFormat;
}

impl DeviceSample for f32 {
    const FORMAT: SampleFormat = SampleFormat::F32;
}

impl DeviceSample for f64 {
    const FORMAT: SampleFormat = SampleFormat::F64;
}

impl DeviceSample for i16 {
    const FORMAT: SampleFormat = SampleFormat::I16;
}

impl DeviceSample for i32 {
    const FORMAT: SampleFormat = SampleFormat::I32;
}

/// State shared between a stream callback and its owner
pub struct Handoff<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> Handoff<S> {
    pub fn new(state: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    /// Run `f` with exclusive access to the state
    pub fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl<S> Clone for Handoff<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Append one capture callback's bytes to a sequence
///
/// Whole groups go in as-is; anything else is split so every group but
/// the last stays at full capacity.
pub fn ingest<T: DeviceSample>(seq: &mut SampleSequence<T>, bytes: &[u8]) {
    let group_bytes = seq.metadata().group_capacity() * std::mem::size_of::<T>();

    if bytes.len() == group_bytes && seq.last_group_is_full() {
        seq.push_bytes(bytes);
    } else {
        let whole = bytes.len() - bytes.len() % std::mem::size_of::<T>();
        let samples: Vec<T> = bytemuck::pod_collect_to_vec(&bytes[..whole]);
        seq.extend_from_slice(&samples);
    }
}

/// Playback source draining a sequence group by group
pub struct PlaybackFeed<T> {
    seq: Option<SampleSequence<T>>,
    pending: Vec<T>,
    offset: usize,
}

impl<T: DeviceSample> PlaybackFeed<T> {
    pub fn new() -> Self {
        Self {
            seq: None,
            pending: Vec::new(),
            offset: 0,
        }
    }

    /// Replace whatever is queued with `seq`
    pub fn load(&mut self, seq: SampleSequence<T>) {
        self.seq = Some(seq);
        self.pending.clear();
        self.offset = 0;
    }

    /// Drop everything not yet played
    pub fn clear(&mut self) {
        self.seq = None;
        self.pending.clear();
        self.offset = 0;
    }

    pub fn is_exhausted(&self) -> bool {
        self.offset >= self.pending.len()
            && self.seq.as_ref().map_or(true, |seq| seq.group_count() == 0)
    }

    /// Fill a device buffer completely
    ///
    /// Copies queued samples and writes zero bytes (silence) for any
    /// shortfall. A group larger than the request carries over to the
    /// next call.
    ///
    /// # Returns
    /// Number of bytes taken from the sequence
    pub fn fill(&mut self, out: &mut [u8]) -> usize {
        let sample_size = std::mem::size_of::<T>();
        let mut written = 0;

        while out.len() - written >= sample_size {
            if self.offset >= self.pending.len() {
                match self.seq.as_mut().and_then(SampleSequence::pop) {
                    Some(group) => {
                        self.pending = group;
                        self.offset = 0;
                        continue;
                    }
                    None => break,
                }
            }

            let room = (out.len() - written) / sample_size;
            let count = room.min(self.pending.len() - self.offset);
            let samples = &self.pending[self.offset..self.offset + count];
            let src: &[u8] = bytemuck::cast_slice(samples);
            out[written..written + src.len()].copy_from_slice(src);

            written += src.len();
            self.offset += count;
        }

        out[written..].fill(0);
        written
    }
}

impl<T: DeviceSample> Default for PlaybackFeed<T> {
    fn default() -> Self {
        Self::new()
    }
}
