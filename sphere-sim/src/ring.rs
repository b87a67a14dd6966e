// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! A depth-10 single-producer/single-publisher snapshot ring.
//!
//! The simulator thread writes the next frame into a working buffer and
//! raises a commit flag; a publisher thread polls that flag, copies the
//! working buffer into the next ring slot, and advances the published
//! index. A renderer thread reads [`SnapshotRing::latest`] whenever it
//! wants a frame, independent of both the simulator's and publisher's
//! cadence.
//!
//! Ported from the original `util::RingBuffer` (a `shared_ptr`-guarded
//! working buffer plus a `volatile` commit flag polled by a detached
//! thread). The hand-off here uses [`Mutex`] rather than raw atomics on the
//! buffers themselves: the single-writer/single-publisher protocol means
//! neither lock is ever contended, so it gives the same effective
//! behavior as the original's scheme without `unsafe` — only the commit
//! flag and published index need the release/acquire memory ordering the
//! protocol actually depends on.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use tracing::trace;

use crate::particle::Particle;
use crate::scalar::Scalar;

/// Number of published snapshots the ring retains.
pub const DEPTH: usize = 10;

/// The publisher thread's poll cadence between commit-flag checks.
pub const POLL_INTERVAL: Duration = Duration::from_micros(50);

/// Returned by [`SnapshotRing::get_writeable`] when the previous frame has
/// not yet been picked up by the publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingNotReady;

/// A read-only capability over the ring's most recently published frame.
///
/// This is the narrow interface handed to the physics repair path instead
/// of a reference back to the owning simulation loop: it can read the last
/// published snapshot but cannot advance the ring, request a commit, or
/// otherwise affect the producer/publisher protocol.
pub trait SnapshotView<S: Scalar> {
    /// A clone of the currently published frame.
    fn last_published(&self) -> Vec<Particle<S>>;
}

/// The snapshot ring itself.
pub struct SnapshotRing<S: Scalar> {
    slots: Vec<Mutex<Vec<Particle<S>>>>,
    working: Mutex<Vec<Particle<S>>>,
    published_index: AtomicUsize,
    commit_requested: AtomicBool,
}

/// A handle to the simulator-side half of the ring's working buffer,
/// returned by [`SnapshotRing::get_writeable`].
///
/// Holding this guard across a tick and dropping it without calling
/// [`SnapshotRing::put`] leaves the commit flag unset; the frame currently
/// in the working buffer is simply overwritten next tick.
pub struct WriteGuard<'a, S: Scalar> {
    guard: MutexGuard<'a, Vec<Particle<S>>>,
}

impl<'a, S: Scalar> std::ops::Deref for WriteGuard<'a, S> {
    type Target = Vec<Particle<S>>;
    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl<'a, S: Scalar> std::ops::DerefMut for WriteGuard<'a, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}

impl<S: Scalar> SnapshotRing<S> {
    /// Builds an empty ring with `DEPTH` slots, all starting as an empty
    /// frame.
    pub fn new() -> Self {
        let slots = (0..DEPTH).map(|_| Mutex::new(Vec::new())).collect();
        SnapshotRing {
            slots,
            working: Mutex::new(Vec::new()),
            published_index: AtomicUsize::new(0),
            commit_requested: AtomicBool::new(false),
        }
    }

    /// Seeds the ring with an initial frame, mirroring it into both the
    /// working buffer and the first published slot so the very first
    /// [`SnapshotRing::latest`] call (before any tick has run) returns the
    /// initial particle set rather than an empty frame.
    pub fn seed(&self, particles: Vec<Particle<S>>) {
        *self.working.lock().expect("ring working buffer poisoned") = particles.clone();
        *self.slots[0].lock().expect("ring slot poisoned") = particles;
        self.published_index.store(0, Ordering::Release);
    }

    /// Attempts to acquire the working buffer for writing the next frame.
    /// Returns [`RingNotReady`] if the previous frame's commit has not yet
    /// been picked up by the publisher — the simulator should back off and
    /// retry rather than overwrite an un-published frame.
    pub fn get_writeable(&self) -> Result<WriteGuard<'_, S>, RingNotReady> {
        if self.commit_requested.load(Ordering::Acquire) {
            return Err(RingNotReady);
        }
        Ok(WriteGuard {
            guard: self.working.lock().expect("ring working buffer poisoned"),
        })
    }

    /// Marks the working buffer as ready for publication.
    pub fn put(&self) {
        self.commit_requested.store(true, Ordering::Release);
    }

    /// Performs one publisher iteration: if a commit is pending, copies the
    /// working buffer into the next slot, advances the published index,
    /// and clears the commit flag. Returns whether it actually published a
    /// frame.
    pub fn try_publish(&self) -> bool {
        if !self.commit_requested.load(Ordering::Acquire) {
            return false;
        }
        let current = self.published_index.load(Ordering::Acquire);
        let next = (current + 1) % DEPTH;
        {
            let working = self.working.lock().expect("ring working buffer poisoned");
            let mut slot = self.slots[next].lock().expect("ring slot poisoned");
            slot.clone_from(&working);
        }
        self.published_index.store(next, Ordering::Release);
        self.commit_requested.store(false, Ordering::Release);
        trace!(slot = next, "published snapshot");
        true
    }

    /// A clone of the currently published frame.
    pub fn latest(&self) -> Vec<Particle<S>> {
        let idx = self.published_index.load(Ordering::Acquire);
        self.slots[idx]
            .lock()
            .expect("ring slot poisoned")
            .clone()
    }
}

impl<S: Scalar> Default for SnapshotRing<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scalar> SnapshotView<S> for SnapshotRing<S> {
    fn last_published(&self) -> Vec<Particle<S>> {
        self.latest()
    }
}

impl<S: Scalar, T: SnapshotView<S>> SnapshotView<S> for Arc<T> {
    fn last_published(&self) -> Vec<Particle<S>> {
        T::last_published(self)
    }
}

/// Runs the publisher loop on the calling thread until `should_stop`
/// returns `true`, polling at [`POLL_INTERVAL`] whenever nothing is ready
/// to publish.
///
/// Intended to be handed to a `std::thread::Builder` named
/// `"sphere-sim-publisher"` by the binary assembling a simulation.
pub fn run_publisher<S: Scalar>(ring: &SnapshotRing<S>, should_stop: impl Fn() -> bool) {
    while !should_stop() {
        if !ring.try_publish() {
            thread::sleep(POLL_INTERVAL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vector3;

    fn particle(uid: u64) -> Particle<f64> {
        let mut p = Particle::new(Vector3::zero(), Vector3::zero(), 1.0, 1.0);
        p.set_uid(uid);
        p
    }

    #[test]
    fn seed_is_visible_before_any_publish() {
        let ring = SnapshotRing::<f64>::new();
        ring.seed(vec![particle(1), particle(2)]);
        assert_eq!(ring.latest().len(), 2);
    }

    #[test]
    fn put_then_publish_advances_latest() {
        let ring = SnapshotRing::<f64>::new();
        ring.seed(vec![particle(1)]);
        {
            let mut w = ring.get_writeable().unwrap();
            w.push(particle(2));
        }
        ring.put();
        assert!(ring.try_publish());
        assert_eq!(ring.latest().len(), 2);
    }

    #[test]
    fn get_writeable_blocked_while_commit_pending() {
        let ring = SnapshotRing::<f64>::new();
        ring.seed(vec![]);
        ring.put();
        assert_eq!(ring.get_writeable().err(), Some(RingNotReady));
    }

    #[test]
    fn try_publish_is_a_no_op_without_a_pending_commit() {
        let ring = SnapshotRing::<f64>::new();
        ring.seed(vec![particle(1)]);
        assert!(!ring.try_publish());
        assert_eq!(ring.latest().len(), 1);
    }

    #[test]
    fn wraps_around_after_depth_publications() {
        let ring = SnapshotRing::<f64>::new();
        ring.seed(vec![]);
        for i in 0..(DEPTH * 2) {
            {
                let mut w = ring.get_writeable().unwrap();
                w.clear();
                w.push(particle(i as u64 + 1));
            }
            ring.put();
            assert!(ring.try_publish());
        }
        assert_eq!(ring.latest()[0].uid(), Some((DEPTH * 2) as u64));
    }
}
