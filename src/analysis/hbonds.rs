// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of hydrogen-bond detection and its time autocorrelation.

use getset::CopyGetters;
use hashbrown::HashSet;
use indexmap::IndexMap;

use crate::analysis::traj::Analysis;
use crate::errors::AnalysisError;
use crate::output::Table;
use crate::structures::cell::{angle, distance};
use crate::structures::frame::Frame;
use crate::structures::histogram::{Histogram2D, TimeSeries};
use crate::topology::bonds::BondGraph;

/// Default maximum donor–acceptor distance (in angstroms) for a hydrogen bond.
pub const DEFAULT_HBOND_DISTANCE: f64 = 3.0;

/// Default maximum deviation of the donor–H–acceptor angle from linearity
/// (in degrees) for a hydrogen bond.
pub const DEFAULT_HBOND_ANGLE: f64 = 30.0;

/// Geometric criteria of a hydrogen bond.
#[derive(Debug, Clone, Copy)]
pub struct HBondCriteria {
    /// Maximum donor–acceptor distance in angstroms.
    max_distance: f64,
    /// Maximum deviation of the donor–H–acceptor angle from 180° in degrees.
    max_angle_deviation: f64,
}

impl Default for HBondCriteria {
    fn default() -> Self {
        HBondCriteria {
            max_distance: DEFAULT_HBOND_DISTANCE,
            max_angle_deviation: DEFAULT_HBOND_ANGLE,
        }
    }
}

impl HBondCriteria {
    /// Create hydrogen-bond criteria from a maximum donor–acceptor distance
    /// (in angstroms) and a maximum deviation of the donor–H–acceptor angle
    /// from linearity (in degrees).
    pub fn new(max_distance: f64, max_angle_deviation: f64) -> Self {
        HBondCriteria {
            max_distance,
            max_angle_deviation,
        }
    }

    /// Get the maximum donor–acceptor distance.
    #[inline]
    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    /// Get the maximum deviation of the donor–H–acceptor angle from 180°.
    #[inline]
    pub fn max_angle_deviation(&self) -> f64 {
        self.max_angle_deviation
    }
}

/// A hydrogen bond identified in a single frame.
#[derive(Debug, Clone, CopyGetters)]
pub struct HydrogenBond {
    /// Index of the donor heavy atom. Atoms are indexed starting from 0.
    #[getset(get_copy = "pub")]
    donor: usize,
    /// Index of the hydrogen.
    #[getset(get_copy = "pub")]
    hydrogen: usize,
    /// Index of the acceptor heavy atom.
    #[getset(get_copy = "pub")]
    acceptor: usize,
    /// Donor–acceptor distance (in angstroms).
    #[getset(get_copy = "pub")]
    distance: f64,
    /// Donor–hydrogen–acceptor angle (in degrees).
    #[getset(get_copy = "pub")]
    angle: f64,
}

/// Find all hydrogen bonds in a frame given its bond topology.
///
/// Every hydrogen bonded to a heavy donor atom is tested against every
/// other heavy atom as an acceptor: the donor–acceptor distance must not
/// exceed the distance cutoff and the donor–H–acceptor angle must not
/// deviate from linearity by more than the angle cutoff. Distances and
/// angles respect the periodic cell of the frame.
///
/// The returned list is ordered by hydrogen index, then by acceptor index.
pub fn detect_hydrogen_bonds(
    frame: &Frame,
    bonds: &BondGraph,
    criteria: &HBondCriteria,
) -> Vec<HydrogenBond> {
    let cell = frame.cell();
    let mut hbonds = Vec::new();

    for (hydrogen, atom) in frame.atoms().iter().enumerate() {
        if !atom.is_hydrogen() {
            continue;
        }

        for &donor in bonds.bonded(hydrogen) {
            if frame.atoms()[donor].is_hydrogen() {
                continue;
            }

            let donor_position = frame.atoms()[donor].position();

            for (acceptor, acceptor_atom) in frame.atoms().iter().enumerate() {
                if acceptor == donor || acceptor == hydrogen || acceptor_atom.is_hydrogen() {
                    continue;
                }

                let da_distance = distance(cell, donor_position, acceptor_atom.position());
                if da_distance > criteria.max_distance {
                    continue;
                }

                let dha_angle = angle(
                    cell,
                    donor_position,
                    atom.position(),
                    acceptor_atom.position(),
                );
                if 180.0 - dha_angle > criteria.max_angle_deviation {
                    continue;
                }

                hbonds.push(HydrogenBond {
                    donor,
                    hydrogen,
                    acceptor,
                    distance: da_distance,
                    angle: dha_angle,
                });
            }
        }
    }

    hbonds
}

/// Streaming hydrogen-bond analysis.
///
/// For every frame, hydrogen bonds are detected from the frame's bond
/// topology (attach bonds in the trajectory source or enable bond guessing
/// in the [`AnalysisRunner`](crate::analysis::traj::AnalysisRunner)) and
/// aggregated into a donor–acceptor-distance × angle-deviation histogram.
///
/// With autocorrelation enabled, a binary existence series is additionally
/// tracked for every unique (donor, hydrogen, acceptor) identity. Note
/// that this retains one sample per tracked bond per frame, so the memory
/// cost grows with trajectory length.
#[derive(Debug)]
pub struct HBonds {
    criteria: HBondCriteria,
    histogram: Histogram2D,
    counts: Vec<f64>,
    series: Option<IndexMap<(usize, usize, usize), Vec<bool>>>,
    frames: usize,
}

impl HBonds {
    /// Create a new hydrogen-bond analysis aggregating a
    /// distance × angle-deviation histogram with the given bin counts.
    /// Autocorrelation tracking is disabled.
    pub fn new(
        criteria: HBondCriteria,
        n_distance_bins: usize,
        n_angle_bins: usize,
    ) -> Result<Self, AnalysisError> {
        let histogram = Histogram2D::new(
            n_distance_bins,
            0.0,
            criteria.max_distance,
            n_angle_bins,
            0.0,
            criteria.max_angle_deviation,
        )?;

        Ok(HBonds {
            criteria,
            histogram,
            counts: Vec::new(),
            series: None,
            frames: 0,
        })
    }

    /// Enable tracking of per-bond existence series for autocorrelation.
    pub fn with_autocorrelation(mut self) -> Self {
        self.series = Some(IndexMap::new());
        self
    }
}

impl Analysis for HBonds {
    type Output = HBondsResult;

    fn process_frame(&mut self, frame: &Frame) -> Result<(), AnalysisError> {
        let bonds = frame.bonds().ok_or(AnalysisError::MissingBonds)?;
        let hbonds = detect_hydrogen_bonds(frame, bonds, &self.criteria);

        for hbond in &hbonds {
            self.histogram
                .add(hbond.distance, 180.0 - hbond.angle, 1.0);
        }
        self.counts.push(hbonds.len() as f64);

        if let Some(series) = &mut self.series {
            let previous_frames = self.frames;
            let current: HashSet<(usize, usize, usize)> = hbonds
                .iter()
                .map(|hb| (hb.donor, hb.hydrogen, hb.acceptor))
                .collect();

            // extend every known series by this frame's state
            for (key, existence) in series.iter_mut() {
                existence.push(current.contains(key));
            }

            // start series for identities seen for the first time
            for key in current {
                series.entry(key).or_insert_with(|| {
                    let mut existence = vec![false; previous_frames];
                    existence.push(true);
                    existence
                });
            }
        }

        self.frames += 1;
        Ok(())
    }

    fn finish(self) -> Result<HBondsResult, AnalysisError> {
        if self.frames == 0 {
            return Err(AnalysisError::NoFrames);
        }

        let mean_per_frame = self.counts.iter().sum::<f64>() / self.frames as f64;

        // normalized autocorrelation averaged over all tracked identities
        let autocorrelation = self.series.map(|series| {
            let mut raw = vec![0.0; self.frames];

            for existence in series.values() {
                let samples: Vec<f64> =
                    existence.iter().map(|&e| if e { 1.0 } else { 0.0 }).collect();
                let correlation = TimeSeries::from_values(samples).autocorrelation(self.frames);

                for (total, value) in raw.iter_mut().zip(correlation) {
                    *total += value;
                }
            }

            // lag 0 is normalized to 1
            if raw[0] > 0.0 {
                let norm = raw[0];
                raw.iter_mut().for_each(|value| *value /= norm);
            }

            raw
        });

        Ok(HBondsResult {
            histogram: self.histogram,
            counts: self.counts,
            autocorrelation,
            mean_per_frame,
            frames: self.frames,
        })
    }
}

/// Result of a hydrogen-bond analysis.
#[derive(Debug, Clone, CopyGetters)]
pub struct HBondsResult {
    /// Aggregate histogram of donor–acceptor distance × angle deviation
    /// from linearity.
    histogram: Histogram2D,
    /// Number of hydrogen bonds in each processed frame.
    counts: Vec<f64>,
    /// Normalized existence autocorrelation, if tracking was enabled.
    autocorrelation: Option<Vec<f64>>,
    /// Mean number of hydrogen bonds per frame.
    #[getset(get_copy = "pub")]
    mean_per_frame: f64,
    /// Number of frames contributing to the analysis.
    #[getset(get_copy = "pub")]
    frames: usize,
}

impl HBondsResult {
    /// Get the aggregate distance × angle-deviation histogram.
    pub fn histogram(&self) -> &Histogram2D {
        &self.histogram
    }

    /// Get the number of hydrogen bonds in each processed frame.
    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    /// Get the normalized existence autocorrelation, if it was tracked.
    pub fn autocorrelation(&self) -> Option<&[f64]> {
        self.autocorrelation.as_deref()
    }

    /// Convert the aggregate histogram into an output table.
    pub fn histogram_table(&self) -> Table {
        let mut table = Table::new();
        table.comment("Hydrogen bond geometry histogram");
        table.comment(&format!("frames: {}", self.frames));
        table.comment(&format!("mean bonds per frame: {:.6}", self.mean_per_frame));
        table.set_columns(&["distance", "angle_deviation", "count"]);

        for i in 0..self.histogram.x_axis().n_bins() {
            for j in 0..self.histogram.y_axis().n_bins() {
                table.push_row(vec![
                    self.histogram.x_axis().lower_edge(i),
                    self.histogram.y_axis().lower_edge(j),
                    self.histogram.value(i, j),
                ]);
            }
        }

        table
    }

    /// Convert the existence autocorrelation into an output table.
    /// Returns `None` if autocorrelation tracking was not enabled.
    pub fn autocorrelation_table(&self) -> Option<Table> {
        let correlation = self.autocorrelation.as_ref()?;

        let mut table = Table::new();
        table.comment("Hydrogen bond existence autocorrelation");
        table.comment(&format!("frames: {}", self.frames));
        table.set_columns(&["lag", "correlation"]);

        for (lag, value) in correlation.iter().enumerate() {
            table.push_row(vec![lag as f64, *value]);
        }

        Some(table)
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
