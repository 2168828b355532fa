//! Uniform-probe lookup tables over non-uniform break-point arrays.
//!
//! A break-point array `b[0] < b[1] < ... < b[n-1]` is probed with a uniform
//! step `q` strictly finer than the smallest interval `b[i+1] - b[i]`. Entry
//! `k` of the table holds the interval index containing the probe coordinate
//! `b[0] + k*q`. A query coordinate `x` then maps to probe `floor((x - b[0]) / q)`
//! and, because no interval is shorter than a probe step, the table entry is
//! either the containing interval or the one just before it. One comparison
//! against the next break-point settles which.

// Probe indices are bounded by the table length
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

/// Lookup table for one axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct AxisLut {
    /// First break-point.
    origin: f64,
    /// Reciprocal of the probe step.
    inv_unit: f64,
    /// Interval index per probe.
    table: Vec<usize>,
}

impl AxisLut {
    /// Build a table for `breaks`.
    ///
    /// The caller guarantees at least two strictly increasing, finite
    /// break-points.
    pub(crate) fn build(breaks: &[f64]) -> Self {
        debug_assert!(breaks.len() >= 2);
        let front = breaks[0];
        let back = breaks[breaks.len() - 1];
        let width = back - front;

        let min_gap = breaks
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold(width, f64::min);

        // The half step keeps the probe strictly finer than the smallest gap
        let n = (width / min_gap) as usize + 1;
        let unit = width / (n as f64 + 0.5);

        let last_interval = breaks.len() - 2;
        let mut table = Vec::with_capacity(n);
        let mut m = 0;
        for k in 0..n {
            let x = (k as f64).mul_add(unit, front);
            if m < last_interval && x >= breaks[m + 1] {
                m += 1;
            }
            table.push(m);
        }

        Self {
            origin: front,
            inv_unit: 1.0 / unit,
            table,
        }
    }

    /// Interval index `i` with `breaks[i] <= x <= breaks[i + 1]`.
    ///
    /// `x` must lie within `[breaks[0], breaks[n-1]]` and `breaks` must be the
    /// array the table was built from. A coordinate exactly on an interior
    /// break-point may resolve to either adjacent interval.
    #[inline]
    pub(crate) fn locate(&self, breaks: &[f64], x: f64) -> usize {
        let probe = (((x - self.origin) * self.inv_unit) as usize).min(self.table.len() - 1);
        let i = self.table[probe];
        if x > breaks[i + 1] { i + 1 } else { i }
    }

    /// Number of probe entries.
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if the table has not been built.
    #[must_use]
    pub(crate) fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Heap bytes held by the table.
    #[must_use]
    pub(crate) fn memory_size(&self) -> usize {
        self.table.capacity() * std::mem::size_of::<usize>()
    }
}
