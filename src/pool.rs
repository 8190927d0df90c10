//! Lock-free context pools and reference-counted idle collection.
//!
//! A [`PoolRegistry`] owns one free-list of idle [`Compressor`]s per
//! pooled compression level plus a single level-less free-list of
//! [`Decompressor`]s.  The free-lists are `crossbeam_queue::SegQueue`s:
//! concurrent acquire/release never blocks, and a popped handle is moved
//! out of the queue, so the same context can never be issued to two
//! concurrent acquirers.
//!
//! The registry is an explicitly constructed object with no process-wide
//! statics; callers own it (typically behind an `Arc`) and pass it by
//! reference.  All level slots are created eagerly at construction.
//!
//! Idle collection bounds the native memory held by idle contexts
//! without a TTL: each pool class carries a counter of outstanding
//! consumers, and when the last consumer of a class ends its unit of
//! work, every idle context of that class is drained and freed on the
//! calling thread.  Draining is best-effort — see [`PoolRegistry::end_use`].

use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_queue::SegQueue;

use crate::compressor::Compressor;
use crate::decompressor::Decompressor;
use crate::error::Result;
use crate::format::Format;

/// Number of pooled compressor free-lists.  The pool serves levels
/// `1..=POOLED_LEVELS`; level-0 (stored, no compression) contexts are
/// cheap enough to construct directly via [`Compressor::new`].
pub const POOLED_LEVELS: usize = 12;

/// The two independently collected pool classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolClass {
    Compressors,
    Decompressors,
}

/// Free-lists of idle contexts plus the idle-collection counters.
pub struct PoolRegistry {
    compressors: [SegQueue<Compressor>; POOLED_LEVELS],
    decompressors: SegQueue<Decompressor>,
    compressor_uses: AtomicUsize,
    decompressor_uses: AtomicUsize,
}

impl PoolRegistry {
    /// Creates a registry with every level slot eagerly initialised and
    /// all free-lists empty.
    pub fn new() -> PoolRegistry {
        PoolRegistry {
            compressors: std::array::from_fn(|_| SegQueue::new()),
            decompressors: SegQueue::new(),
            compressor_uses: AtomicUsize::new(0),
            decompressor_uses: AtomicUsize::new(0),
        }
    }

    fn slot_for(level: i32) -> usize {
        assert!(
            (1..=POOLED_LEVELS as i32).contains(&level),
            "pooled compression level {level} outside 1..={POOLED_LEVELS}"
        );
        (level - 1) as usize
    }

    /// Pops an idle compressor for `level`, or allocates one when the
    /// free-list is empty.  The handle's container format is set to
    /// `format` either way; it is per-checkout state, not identity.
    ///
    /// # Panics
    /// If `level` is outside `1..=12` (see [`POOLED_LEVELS`]).
    pub fn acquire_compressor(&self, level: i32, format: Format) -> Result<Compressor> {
        match self.compressors[Self::slot_for(level)].pop() {
            Some(mut compressor) => {
                compressor.set_format(format);
                Ok(compressor)
            }
            None => Compressor::new(level, format),
        }
    }

    /// Returns a compressor to its level's free-list.  The handle is
    /// consumed; using it again after release is unrepresentable.
    pub fn release_compressor(&self, compressor: Compressor) {
        self.compressors[Self::slot_for(compressor.level())].push(compressor);
    }

    /// Pops an idle decompressor, or allocates one.
    pub fn acquire_decompressor(&self, format: Format) -> Result<Decompressor> {
        match self.decompressors.pop() {
            Some(mut decompressor) => {
                decompressor.set_format(format);
                Ok(decompressor)
            }
            None => Decompressor::new(format),
        }
    }

    pub fn release_decompressor(&self, decompressor: Decompressor) {
        self.decompressors.push(decompressor);
    }

    /// Number of idle compressors pooled for `level`.
    pub fn idle_compressors(&self, level: i32) -> usize {
        self.compressors[Self::slot_for(level)].len()
    }

    /// Number of idle decompressors pooled.
    pub fn idle_decompressors(&self) -> usize {
        self.decompressors.len()
    }

    fn counter(&self, class: PoolClass) -> &AtomicUsize {
        match class {
            PoolClass::Compressors => &self.compressor_uses,
            PoolClass::Decompressors => &self.decompressor_uses,
        }
    }

    /// Marks the start of a unit of work that may acquire from `class`.
    /// Must be paired with exactly one [`end_use`](Self::end_use); prefer
    /// [`usage_scope`](Self::usage_scope) to get the pairing for free.
    pub fn begin_use(&self, class: PoolClass) {
        self.counter(class).fetch_add(1, Ordering::AcqRel);
    }

    /// Marks the end of a unit of work.  When this decrement takes the
    /// class counter to zero, every free-list of the class is drained
    /// synchronously on the calling thread and each drained handle is
    /// freed.
    ///
    /// Collection is best-effort: a `begin_use` racing between the
    /// decrement and the drain can observe the counter go 0→1 while the
    /// drain is still running, so a just-released context may be freed
    /// early or a freshly released one may land on a list mid-drain.
    /// Ownership still moves into the drain, so a context is freed at
    /// most once; the race costs at most an extra allocation later.
    /// The counter saturates at zero — a stray unpaired `end_use` is a
    /// caller bug but never underflows.
    pub fn end_use(&self, class: PoolClass) {
        let counter = self.counter(class);
        let mut current = counter.load(Ordering::Acquire);
        loop {
            if current == 0 {
                return;
            }
            match counter.compare_exchange_weak(
                current,
                current - 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    if current == 1 {
                        self.drain(class);
                    }
                    return;
                }
                Err(observed) => current = observed,
            }
        }
    }

    /// RAII form of [`begin_use`](Self::begin_use)/[`end_use`](Self::end_use).
    pub fn usage_scope(&self, class: PoolClass) -> UsageScope<'_> {
        self.begin_use(class);
        UsageScope {
            registry: self,
            class,
        }
    }

    fn drain(&self, class: PoolClass) {
        // Popping moves each handle out; dropping it runs the native free.
        match class {
            PoolClass::Compressors => {
                for free_list in &self.compressors {
                    while free_list.pop().is_some() {}
                }
            }
            PoolClass::Decompressors => while self.decompressors.pop().is_some() {},
        }
    }
}

impl Default for PoolRegistry {
    fn default() -> Self {
        PoolRegistry::new()
    }
}

/// Guard returned by [`PoolRegistry::usage_scope`]; ends the unit of
/// work (and possibly triggers a drain) on drop.
pub struct UsageScope<'a> {
    registry: &'a PoolRegistry,
    class: PoolClass,
}

impl Drop for UsageScope<'_> {
    fn drop(&mut self) {
        self.registry.end_use(self.class);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_eagerly_initialised() {
        let registry = PoolRegistry::new();
        for level in 1..=POOLED_LEVELS as i32 {
            assert_eq!(registry.idle_compressors(level), 0);
        }
        assert_eq!(registry.idle_decompressors(), 0);
    }

    #[test]
    fn release_then_acquire_reuses_context() {
        let registry = PoolRegistry::new();
        let compressor = registry.acquire_compressor(6, Format::Zlib).unwrap();
        let id = compressor.handle_id();
        registry.release_compressor(compressor);
        assert_eq!(registry.idle_compressors(6), 1);

        let reused = registry.acquire_compressor(6, Format::Gzip).unwrap();
        assert_eq!(reused.handle_id(), id);
        assert_eq!(reused.format(), Format::Gzip);
        assert_eq!(reused.level(), 6);
        registry.release_compressor(reused);
    }

    #[test]
    fn end_use_saturates_at_zero() {
        let registry = PoolRegistry::new();
        // Unpaired end_use must not underflow the counter.
        registry.end_use(PoolClass::Compressors);
        registry.begin_use(PoolClass::Compressors);
        let compressor = registry.acquire_compressor(3, Format::Deflate).unwrap();
        registry.release_compressor(compressor);
        registry.end_use(PoolClass::Compressors);
        assert_eq!(registry.idle_compressors(3), 0);
    }

    #[test]
    fn nested_uses_defer_drain_to_last_end() {
        let registry = PoolRegistry::new();
        registry.begin_use(PoolClass::Decompressors);
        registry.begin_use(PoolClass::Decompressors);
        let decompressor = registry.acquire_decompressor(Format::Deflate).unwrap();
        registry.release_decompressor(decompressor);

        registry.end_use(PoolClass::Decompressors);
        assert_eq!(registry.idle_decompressors(), 1);
        registry.end_use(PoolClass::Decompressors);
        assert_eq!(registry.idle_decompressors(), 0);
    }

    #[test]
    #[should_panic(expected = "pooled compression level")]
    fn level_zero_is_not_pooled() {
        let registry = PoolRegistry::new();
        let _ = registry.acquire_compressor(0, Format::Deflate);
    }
}
