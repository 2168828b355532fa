//! Run-time field scale factors.
//!
//! The scale factor is an external input, typically refreshed by a
//! conditions service between event batches. Queries read it only when they
//! refill their cache, so a cache hit keeps returning values computed with
//! the factor that was current at the last miss. The version number makes
//! that staleness observable.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A scale factor together with the version of the input it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor {
    /// Multiplicative factor applied to field samples.
    pub value: f64,
    /// Monotonic version of the input that produced `value`.
    pub version: u64,
}

impl ScaleFactor {
    /// A factor with version 0.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self { value, version: 0 }
    }

    /// A factor with an explicit version.
    #[must_use]
    pub const fn versioned(value: f64, version: u64) -> Self {
        Self { value, version }
    }

    /// The identity factor.
    #[must_use]
    pub const fn unit() -> Self {
        Self::new(1.0)
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self::unit()
    }
}

/// Something a field query can read the current scale factor from.
pub trait ScaleSource {
    /// The scale factor in effect now.
    fn current(&self) -> ScaleFactor;
}

impl ScaleSource for ScaleFactor {
    fn current(&self) -> ScaleFactor {
        *self
    }
}

impl<S: ScaleSource + ?Sized> ScaleSource for &S {
    fn current(&self) -> ScaleFactor {
        (**self).current()
    }
}

impl<S: ScaleSource + ?Sized> ScaleSource for Arc<S> {
    fn current(&self) -> ScaleFactor {
        (**self).current()
    }
}

#[derive(Debug)]
struct SharedInner {
    bits: AtomicU64,
    version: AtomicU64,
}

/// A scale factor shared between one updater and many query contexts.
///
/// Clones share the same value. Updates are lock-free; a query that races an
/// update may see either the old or the new factor, which is acceptable
/// because updates happen between batches.
///
/// # Example
///
/// ```
/// use field_map::{ScaleSource, SharedScaleFactor};
///
/// let shared = SharedScaleFactor::new(1.0);
/// let reader = shared.clone();
///
/// shared.set(-1.0);
/// assert_eq!(reader.current().value, -1.0);
/// assert_eq!(reader.current().version, 1);
/// ```
#[derive(Debug, Clone)]
pub struct SharedScaleFactor {
    inner: Arc<SharedInner>,
}

impl SharedScaleFactor {
    /// Creates a shared factor at version 0.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self {
            inner: Arc::new(SharedInner {
                bits: AtomicU64::new(value.to_bits()),
                version: AtomicU64::new(0),
            }),
        }
    }

    /// Replace the factor and bump the version.
    ///
    /// Returns the new version.
    pub fn set(&self, value: f64) -> u64 {
        self.inner.bits.store(value.to_bits(), Ordering::Release);
        self.inner.version.fetch_add(1, Ordering::AcqRel) + 1
    }
}

impl Default for SharedScaleFactor {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ScaleSource for SharedScaleFactor {
    fn current(&self) -> ScaleFactor {
        let version = self.inner.version.load(Ordering::Acquire);
        let value = f64::from_bits(self.inner.bits.load(Ordering::Acquire));
        ScaleFactor { value, version }
    }
}
