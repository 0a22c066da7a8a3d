// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the accumulators collecting statistics across frames.
//!
//! All accumulators have their size fixed at construction and are updated
//! once per frame by an analysis. Out-of-range samples are dropped silently
//! (a counter of dropped samples is kept); a single boundary atom must never
//! abort a run.

use ndarray::Array2;

use crate::errors::HistogramError;

/// Validate a histogram axis specification.
fn check_axis(n_bins: usize, min: f64, max: f64) -> Result<(), HistogramError> {
    if n_bins == 0 {
        return Err(HistogramError::InvalidBinCount);
    }

    if !min.is_finite() || !max.is_finite() || max <= min {
        return Err(HistogramError::InvalidRange(min, max));
    }

    Ok(())
}

/// A binned axis of a histogram. The reported coordinate of bin `i` is its
/// **lower** edge, `min + i * width`.
#[derive(Debug, Clone, PartialEq)]
pub struct BinAxis {
    n_bins: usize,
    min: f64,
    max: f64,
    width: f64,
}

impl BinAxis {
    fn new(n_bins: usize, min: f64, max: f64) -> Result<Self, HistogramError> {
        check_axis(n_bins, min, max)?;

        Ok(BinAxis {
            n_bins,
            min,
            max,
            width: (max - min) / n_bins as f64,
        })
    }

    /// Get the number of bins of the axis.
    #[inline]
    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Get the lower boundary of the binned range.
    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Get the upper boundary of the binned range (exclusive).
    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Get the width of a single bin.
    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Get the lower edge of bin `i`.
    #[inline]
    pub fn lower_edge(&self, i: usize) -> f64 {
        self.min + i as f64 * self.width
    }

    /// Get the bin containing `value`, or `None` if the value lies outside
    /// the `[min, max)` range or is not finite.
    #[inline]
    pub fn bin_index(&self, value: f64) -> Option<usize> {
        if !value.is_finite() {
            return None;
        }

        let relative = value - self.min;
        if relative < 0.0 {
            return None;
        }

        let index = (relative / self.width) as usize;
        if index < self.n_bins {
            Some(index)
        } else {
            None
        }
    }
}

/// One-dimensional histogram with a fixed range.
///
/// ## Example
/// ```
/// # use trajan_rs::prelude::*;
/// # use float_cmp::assert_approx_eq;
/// #
/// let mut histogram = Histogram1D::new(10, 0.0, 5.0).unwrap();
/// histogram.add(0.7, 1.0);
/// histogram.add(0.9, 2.0);
/// histogram.add(17.4, 1.0);   // outside the range, dropped silently
///
/// assert_approx_eq!(f64, histogram.value(1), 3.0);
/// assert_eq!(histogram.dropped(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Histogram1D {
    axis: BinAxis,
    bins: Vec<f64>,
    dropped: u64,
}

impl Histogram1D {
    /// Create a new histogram covering the `[min, max)` range.
    ///
    /// ## Returns
    /// - `HistogramError::InvalidBinCount` if `n_bins` is zero.
    /// - `HistogramError::InvalidRange` if `max <= min` or the range is not finite.
    pub fn new(n_bins: usize, min: f64, max: f64) -> Result<Self, HistogramError> {
        let axis = BinAxis::new(n_bins, min, max)?;

        Ok(Histogram1D {
            bins: vec![0.0; axis.n_bins()],
            axis,
            dropped: 0,
        })
    }

    /// Get the binning axis of the histogram.
    #[inline]
    pub fn axis(&self) -> &BinAxis {
        &self.axis
    }

    /// Add a sample with the given weight. Samples outside the histogram
    /// range are dropped silently and counted.
    #[inline]
    pub fn add(&mut self, value: f64, weight: f64) {
        match self.axis.bin_index(value) {
            Some(index) => self.bins[index] += weight,
            None => self.dropped += 1,
        }
    }

    /// Get the accumulated weight of bin `i`.
    ///
    /// ## Panics
    /// Panics if the bin index is out of range.
    #[inline]
    pub fn value(&self, i: usize) -> f64 {
        self.bins[i]
    }

    /// Get the accumulated weights of all bins.
    #[inline]
    pub fn bins(&self) -> &[f64] {
        &self.bins
    }

    /// Get the total accumulated weight.
    pub fn total(&self) -> f64 {
        self.bins.iter().sum()
    }

    /// Get the number of samples dropped because they were out of range.
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Calculate the running (cumulative) sum of the bins.
    /// Element `i` of the result is the sum of bins `0..=i`.
    pub fn cumulative(&self) -> Vec<f64> {
        let mut sum = 0.0;
        self.bins
            .iter()
            .map(|value| {
                sum += value;
                sum
            })
            .collect()
    }

    /// Normalize the bins with a callback which receives the bin index and
    /// the current value and returns the new value.
    pub fn normalize<F: FnMut(usize, f64) -> f64>(&mut self, mut function: F) {
        for (i, value) in self.bins.iter_mut().enumerate() {
            *value = function(i, *value);
        }
    }
}

/// Two-dimensional histogram: the cross product of two independent binned axes.
#[derive(Debug, Clone)]
pub struct Histogram2D {
    x: BinAxis,
    y: BinAxis,
    data: Array2<f64>,
    dropped: u64,
}

impl Histogram2D {
    /// Create a new two-dimensional histogram.
    /// The first axis indexes rows of the data array, the second axis columns.
    pub fn new(
        n_bins_x: usize,
        min_x: f64,
        max_x: f64,
        n_bins_y: usize,
        min_y: f64,
        max_y: f64,
    ) -> Result<Self, HistogramError> {
        let x = BinAxis::new(n_bins_x, min_x, max_x)?;
        let y = BinAxis::new(n_bins_y, min_y, max_y)?;

        Ok(Histogram2D {
            data: Array2::zeros((x.n_bins(), y.n_bins())),
            x,
            y,
            dropped: 0,
        })
    }

    /// Get the first binning axis.
    #[inline]
    pub fn x_axis(&self) -> &BinAxis {
        &self.x
    }

    /// Get the second binning axis.
    #[inline]
    pub fn y_axis(&self) -> &BinAxis {
        &self.y
    }

    /// Add a sample with the given weight. Samples outside the range of
    /// either axis are dropped silently and counted.
    #[inline]
    pub fn add(&mut self, value_x: f64, value_y: f64, weight: f64) {
        match (self.x.bin_index(value_x), self.y.bin_index(value_y)) {
            (Some(i), Some(j)) => self.data[(i, j)] += weight,
            _ => self.dropped += 1,
        }
    }

    /// Get the accumulated weight of bin `(i, j)`.
    ///
    /// ## Panics
    /// Panics if either bin index is out of range.
    #[inline]
    pub fn value(&self, i: usize, j: usize) -> f64 {
        self.data[(i, j)]
    }

    /// Get the underlying data array.
    #[inline]
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Get the total accumulated weight.
    pub fn total(&self) -> f64 {
        self.data.sum()
    }

    /// Get the number of samples dropped because they were out of range.
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Normalize the bins with a callback which receives the bin indices and
    /// the current value and returns the new value.
    pub fn normalize<F: FnMut(usize, usize, f64) -> f64>(&mut self, mut function: F) {
        for ((i, j), value) in self.data.indexed_iter_mut() {
            *value = function(i, j, *value);
        }
    }
}

/// Per-frame bookkeeping for pair analyses.
///
/// For role-asymmetric pair selections the number of first-role atoms and
/// second-role atoms within a frame generally differ, and so do the two
/// coordination numbers (an oxygen typically has many more hydrogen
/// neighbors within a cutoff than vice versa). The counter therefore tracks
/// both reference sums separately.
#[derive(Debug, Clone, Default)]
pub struct PairCounter {
    refs_first: f64,
    refs_second: f64,
    pair_norm: f64,
    frames: u64,
}

impl PairCounter {
    /// Create an empty pair counter.
    pub fn new() -> Self {
        PairCounter::default()
    }

    /// Record one frame of a role-asymmetric pair selection with `n_first`
    /// atoms matched in the first role and `n_second` in the second.
    pub fn add_frame(&mut self, n_first: usize, n_second: usize) {
        self.refs_first += n_first as f64;
        self.refs_second += n_second as f64;
        self.pair_norm += n_first as f64 * n_second as f64;
        self.frames += 1;
    }

    /// Record one frame of a symmetric single-set selection with `n` matched
    /// atoms. Each unordered pair is assumed to be counted once.
    pub fn add_frame_symmetric(&mut self, n: usize) {
        let n = n as f64;
        self.refs_first += n;
        self.refs_second += n;
        self.pair_norm += n * (n - 1.0) / 2.0;
        self.frames += 1;
    }

    /// Total number of first-role reference atoms summed over frames.
    #[inline]
    pub fn refs_first(&self) -> f64 {
        self.refs_first
    }

    /// Total number of second-role reference atoms summed over frames.
    #[inline]
    pub fn refs_second(&self) -> f64 {
        self.refs_second
    }

    /// Ideal-gas pair normalization: Σ over frames of nᵢ·nⱼ
    /// (or n(n−1)/2 for symmetric selections).
    #[inline]
    pub fn pair_norm(&self) -> f64 {
        self.pair_norm
    }

    /// Number of frames recorded.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// A scalar time series sampled once per frame.
#[derive(Debug, Clone, Default)]
pub struct TimeSeries {
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create an empty time series.
    pub fn new() -> Self {
        TimeSeries::default()
    }

    /// Create a time series from raw values.
    pub fn from_values(values: Vec<f64>) -> Self {
        TimeSeries { values }
    }

    /// Append a sample.
    #[inline]
    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    /// Get the number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the series contains no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the samples.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Calculate the raw discrete autocorrelation of the series for lags
    /// `0..n_lags`, averaging over all valid time origins:
    /// `c(τ) = Σ_t v(t)·v(t+τ) / (n − τ)`.
    ///
    /// ## Panics
    /// Panics if `n_lags` exceeds the length of the series.
    pub fn autocorrelation(&self, n_lags: usize) -> Vec<f64> {
        if n_lags > self.values.len() {
            panic!(
                "FATAL TRAJAN ERROR | TimeSeries::autocorrelation | Requested {} lags from a series of {} samples.",
                n_lags,
                self.values.len()
            );
        }

        let n = self.values.len();
        (0..n_lags)
            .map(|lag| {
                let sum: f64 = (0..n - lag)
                    .map(|t| self.values[t] * self.values[t + lag])
                    .sum();
                sum / (n - lag) as f64
            })
            .collect()
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
