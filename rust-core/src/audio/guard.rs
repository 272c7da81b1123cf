//! Process-wide audio subsystem lifetime
//!
//! The first live guard selects and checks the host, the last one to be
//! dropped releases it. A single mutex protects the count.

use super::input::AudioError;
use cpal::HostId;
use std::sync::{Mutex, PoisonError};

/// Reference counted resource, initialized on first acquire
struct Subsystem<R> {
    count: usize,
    resource: Option<R>,
}

impl<R: Copy> Subsystem<R> {
    const fn new() -> Self {
        Self {
            count: 0,
            resource: None,
        }
    }

    fn acquire(&mut self, init: impl FnOnce() -> Result<R, AudioError>) -> Result<R, AudioError> {
        let resource = match self.resource {
            Some(resource) => resource,
            None => {
                let resource = init()?;
                self.resource = Some(resource);
                resource
            }
        };
        self.count += 1;
        Ok(resource)
    }

    /// Returns true when the last reference was released
    fn release(&mut self) -> bool {
        self.count = self.count.saturating_sub(1);
        if self.count == 0 {
            self.resource = None;
            true
        } else {
            false
        }
    }
}

static SUBSYSTEM: Mutex<Subsystem<HostId>> = Mutex::new(Subsystem::new());

fn init_host() -> Result<HostId, AudioError> {
    let host_id = cpal::default_host().id();
    cpal::host_from_id(host_id).map_err(|e| AudioError::Init(e.to_string()))?;
    log::info!("Audio subsystem initialized ({})", host_id.name());
    Ok(host_id)
}

/// Keeps the audio subsystem alive while held
pub struct AudioGuard {
    host_id: HostId,
}

impl AudioGuard {
    pub fn acquire() -> Result<Self, AudioError> {
        let mut subsystem = SUBSYSTEM.lock().unwrap_or_else(PoisonError::into_inner);
        let host_id = subsystem.acquire(init_host)?;
        Ok(Self { host_id })
    }

    /// Host selected when the subsystem was initialized
    pub fn host(&self) -> Result<cpal::Host, AudioError> {
        cpal::host_from_id(self.host_id).map_err(|e| AudioError::Init(e.to_string()))
    }

    /// Number of live guards in this process
    pub fn instance_count() -> usize {
        SUBSYSTEM
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .count
    }
}

impl Drop for AudioGuard {
    fn drop(&mut self) {
        let mut subsystem = SUBSYSTEM.lock().unwrap_or_else(PoisonError::into_inner);
        if subsystem.release() {
            log::info!("Audio subsystem shut down ({})", self.host_id.name());
        }
    }
}
