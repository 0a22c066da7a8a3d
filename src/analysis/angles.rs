// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the angle distribution analysis.

use getset::{CopyGetters, Getters};

use crate::analysis::traj::Analysis;
use crate::errors::AnalysisError;
use crate::output::Table;
use crate::selections::select::CompiledSelection;
use crate::structures::cell::angle;
use crate::structures::frame::Frame;
use crate::structures::histogram::Histogram1D;

/// Normalization mode of an angle distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleNormalization {
    /// The peak bin is reported as exactly 1.
    MaxNormalized,
    /// Bins are scaled by the bin width so that the histogram integrates
    /// to 1 over the full range.
    ProbabilityDensity,
}

/// Streaming distribution of angles over matched atom triples.
///
/// For every matched ordered triple, the angle at the middle atom (role
/// `#2`) is calculated with minimum-image arms and binned over [0°, 180°).
/// Role bindings keep role-asymmetric angles (e.g. H–O–H versus O–H–O)
/// from being accidentally symmetrized.
#[derive(Debug)]
pub struct AngleDistribution {
    selection: CompiledSelection,
    histogram: Histogram1D,
    mode: AngleNormalization,
    frames: u64,
}

impl AngleDistribution {
    /// Create a new angle distribution with `n_bins` bins over [0°, 180°).
    ///
    /// ## Returns
    /// - `AnalysisError::UnsupportedArity` if the selection arity is not 3.
    /// - `AnalysisError::Histogram` if the bin count is zero.
    pub fn new(
        selection: CompiledSelection,
        n_bins: usize,
        mode: AngleNormalization,
    ) -> Result<Self, AnalysisError> {
        if selection.arity() != 3 {
            return Err(AnalysisError::UnsupportedArity {
                analysis: "angles",
                arity: selection.arity(),
            });
        }

        Ok(AngleDistribution {
            selection,
            histogram: Histogram1D::new(n_bins, 0.0, 180.0)?,
            mode,
            frames: 0,
        })
    }
}

impl Analysis for AngleDistribution {
    type Output = AngleProfile;

    fn process_frame(&mut self, frame: &Frame) -> Result<(), AnalysisError> {
        for (i, j, k) in self.selection.evaluate_triples(frame)? {
            let value = angle(
                frame.cell(),
                frame.atoms()[i].position(),
                frame.atoms()[j].position(),
                frame.atoms()[k].position(),
            );

            self.histogram.add(value, 1.0);
        }

        self.frames += 1;
        Ok(())
    }

    fn finish(self) -> Result<AngleProfile, AnalysisError> {
        if self.frames == 0 {
            return Err(AnalysisError::NoFrames);
        }

        let mut histogram = self.histogram;

        match self.mode {
            AngleNormalization::MaxNormalized => {
                let max = histogram.bins().iter().cloned().fold(0.0, f64::max);
                if max > 0.0 {
                    histogram.normalize(|_, value| value / max);
                }
            }
            AngleNormalization::ProbabilityDensity => {
                let total = histogram.total();
                let width = histogram.axis().width();
                if total > 0.0 {
                    histogram.normalize(|_, value| value / (total * width));
                }
            }
        }

        let n_bins = histogram.axis().n_bins();
        let angle = (0..n_bins).map(|i| histogram.axis().lower_edge(i)).collect();
        let value = histogram.bins().to_vec();

        Ok(AngleProfile {
            angle,
            value,
            mode: self.mode,
            query: self.selection.query().to_string(),
            frames: self.frames,
        })
    }
}

/// Result of an angle distribution analysis.
#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct AngleProfile {
    /// Lower edges of the angle bins in degrees.
    #[getset(get = "pub")]
    angle: Vec<f64>,
    /// Normalized bin values.
    #[getset(get = "pub")]
    value: Vec<f64>,
    /// Normalization mode used.
    #[getset(get_copy = "pub")]
    mode: AngleNormalization,
    /// Selection query used for the analysis.
    #[getset(get = "pub")]
    query: String,
    /// Number of frames contributing to the distribution.
    #[getset(get_copy = "pub")]
    frames: u64,
}

impl AngleProfile {
    /// Convert the profile into an output table.
    pub fn into_table(self) -> Table {
        let mut table = Table::new();
        table.comment("Angle distribution");
        table.comment(&format!("selection: {}", self.query));
        table.comment(&format!("frames: {}", self.frames));
        table.set_columns(&["angle", "value"]);

        for i in 0..self.angle.len() {
            table.push_row(vec![self.angle[i], self.value[i]]);
        }

        table
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
