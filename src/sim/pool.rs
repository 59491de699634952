//! Capped live collections
//!
//! Every burst-prone collection (projectiles, particles, hostiles, pickups)
//! lives in a `Pool`. The cap is the only backpressure in the simulation:
//! a saturated pool rejects new items instead of growing, and warns once per
//! level so the host can surface telemetry without log spam.

use serde::Serialize;

use crate::presentation::{Presentation, Visual};

/// Identity shared by every entity and pooled item
pub type EntityId = u32;

/// Anything that can live in a pool
pub trait Pooled {
    fn id(&self) -> EntityId;
    fn visual(&self) -> Visual;
    /// Cleared once the item is expired, consumed or killed
    fn is_active(&self) -> bool;
}

/// Pooled items that move on their own each tick
pub trait Drifting: Pooled {
    fn advance(&mut self, dt: f32);
}

/// Which collection a pool holds (for telemetry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PoolKind {
    FriendlyProjectiles,
    HostileProjectiles,
    Particles,
    Hostiles,
    Pickups,
}

impl PoolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolKind::FriendlyProjectiles => "friendly projectiles",
            PoolKind::HostileProjectiles => "hostile projectiles",
            PoolKind::Particles => "particles",
            PoolKind::Hostiles => "hostiles",
            PoolKind::Pickups => "pickups",
        }
    }
}

/// Result of offering an item to a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// Rejected at capacity; this level's warning was already raised
    Rejected,
    /// Rejected at capacity and this is the first rejection this level
    RejectedFirst,
}

impl AddOutcome {
    #[inline]
    pub fn is_added(self) -> bool {
        self == AddOutcome::Added
    }

    /// True exactly once per pool per level
    #[inline]
    pub fn raised_warning(self) -> bool {
        self == AddOutcome::RejectedFirst
    }
}

/// A capped live set with a one-shot capacity warning
#[derive(Debug, Clone)]
pub struct Pool<T> {
    kind: PoolKind,
    cap: usize,
    live: Vec<T>,
    warned: bool,
    rejected: u64,
}

impl<T: Pooled> Pool<T> {
    pub fn new(kind: PoolKind, cap: usize) -> Self {
        Self {
            kind,
            cap,
            live: Vec::with_capacity(cap.min(1024)),
            warned: false,
            rejected: 0,
        }
    }

    /// Append `item` and show it, or reject it if the pool is full
    pub fn add(&mut self, item: T, presentation: &mut dyn Presentation) -> AddOutcome {
        if self.is_full() {
            return self.note_rejection();
        }
        presentation.show(item.id(), item.visual());
        self.live.push(item);
        AddOutcome::Added
    }

    /// Record a production attempt dropped because the pool is full
    ///
    /// Producers that check `is_full` before building an item call this
    /// instead of `add` so the warning path is shared.
    pub fn note_rejection(&mut self) -> AddOutcome {
        self.rejected += 1;
        if self.warned {
            return AddOutcome::Rejected;
        }
        self.warned = true;
        log::warn!(
            "{} pool at capacity ({}), dropping new items until next level",
            self.kind.as_str(),
            self.cap
        );
        AddOutcome::RejectedFirst
    }

    /// Remove inactive items and hand them back for teardown
    pub fn sweep(&mut self, presentation: &mut dyn Presentation) -> usize {
        let before = self.live.len();
        self.live.retain(|item| {
            if item.is_active() {
                true
            } else {
                presentation.hide(item.id());
                false
            }
        });
        before - self.live.len()
    }

    /// Tear down everything (level transitions)
    pub fn clear(&mut self, presentation: &mut dyn Presentation) {
        for item in self.live.drain(..) {
            presentation.hide(item.id());
        }
    }

    /// Re-arm the one-shot warning (called on level start)
    pub fn reset_warning(&mut self) {
        self.warned = false;
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.live.len() >= self.cap
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    #[inline]
    pub fn cap(&self) -> usize {
        self.cap
    }

    #[inline]
    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    /// Total rejected additions over the pool's lifetime
    #[inline]
    pub fn rejected_total(&self) -> u64 {
        self.rejected
    }

    #[inline]
    pub fn warned_this_level(&self) -> bool {
        self.warned
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.live.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.live.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.live
    }
}

impl<T: Drifting> Pool<T> {
    /// Advance every item one tick, then sweep the ones that went inactive
    pub fn update(&mut self, dt: f32, presentation: &mut dyn Presentation) -> usize {
        for item in self.live.iter_mut() {
            item.advance(dt);
        }
        self.sweep(presentation)
    }
}
