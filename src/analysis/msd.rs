// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the mean-squared displacement analysis.

use getset::{CopyGetters, Getters};

use crate::analysis::traj::Analysis;
use crate::errors::AnalysisError;
use crate::output::Table;
use crate::selections::select::CompiledSelection;
use crate::structures::cell::displacement;
use crate::structures::frame::Frame;
use crate::structures::vector3d::Vector3D;

/// Streaming mean-squared displacement.
///
/// The tracked atom set is fixed by the first processed frame; the
/// selection must match the identical atom list in every following frame,
/// otherwise the analysis aborts (selections whose matches drift over time
/// have no well-defined per-atom displacement).
///
/// When a periodic cell is present, positions are unwrapped by adding the
/// minimum-image displacement from the previous frame's position, never
/// the raw wrapped delta. This reconstructs continuous trajectories across
/// periodic boundary crossings, provided no atom moves by more than half a
/// cell vector between consecutive frames. Without a cell, unwrapping is a
/// no-op and the MSD is still computed.
///
/// This is the one analysis that cannot run in constant memory: the full
/// unwrapped position history of every tracked atom is retained, so memory
/// grows as O(frames × tracked atoms). This is a documented scaling limit,
/// fundamental to averaging over all time origins.
#[derive(Debug)]
pub struct Msd {
    selection: CompiledSelection,
    tracked: Option<Vec<usize>>,
    tracks: Vec<Vec<Vector3D>>,
    previous_raw: Vec<Vector3D>,
    frames: usize,
}

impl Msd {
    /// Create a new MSD analysis.
    ///
    /// ## Returns
    /// `AnalysisError::UnsupportedArity` if the selection arity is not 1.
    pub fn new(selection: CompiledSelection) -> Result<Self, AnalysisError> {
        if selection.arity() != 1 {
            return Err(AnalysisError::UnsupportedArity {
                analysis: "msd",
                arity: selection.arity(),
            });
        }

        Ok(Msd {
            selection,
            tracked: None,
            tracks: Vec::new(),
            previous_raw: Vec::new(),
            frames: 0,
        })
    }
}

impl Analysis for Msd {
    type Output = MsdProfile;

    fn process_frame(&mut self, frame: &Frame) -> Result<(), AnalysisError> {
        let matched = self.selection.evaluate_atoms(frame)?;

        match &self.tracked {
            None => {
                // the first frame fixes the tracked atom set
                self.tracks = matched
                    .iter()
                    .map(|&index| vec![*frame.atoms()[index].position()])
                    .collect();
                self.previous_raw = matched
                    .iter()
                    .map(|&index| *frame.atoms()[index].position())
                    .collect();
                self.tracked = Some(matched);
            }
            Some(tracked) => {
                if matched != *tracked {
                    return Err(AnalysisError::SelectionChanged {
                        query: self.selection.query().to_string(),
                        expected: tracked.len(),
                        found: matched.len(),
                        frame: self.frames,
                    });
                }

                for (slot, &index) in tracked.iter().enumerate() {
                    let raw = *frame.atoms()[index].position();

                    // minimum-image step from the previous raw position,
                    // never the raw periodic-wrapped delta
                    let step = displacement(frame.cell(), &self.previous_raw[slot], &raw);
                    let last = *self.tracks[slot].last().expect(
                        "FATAL TRAJAN ERROR | Msd::process_frame | Track should never be empty.",
                    );

                    self.tracks[slot].push(last + step);
                    self.previous_raw[slot] = raw;
                }
            }
        }

        self.frames += 1;
        Ok(())
    }

    fn finish(self) -> Result<MsdProfile, AnalysisError> {
        if self.frames == 0 {
            return Err(AnalysisError::NoFrames);
        }

        let n = self.frames;
        let n_atoms = self.tracks.len();

        let mut lag = Vec::new();
        let mut msd = Vec::new();

        // average over all valid time origins and all tracked atoms
        for tau in 1..n {
            let mut sum = 0.0;
            for track in &self.tracks {
                for origin in 0..n - tau {
                    sum += (track[origin + tau] - track[origin]).len_squared();
                }
            }

            lag.push(tau as f64);
            msd.push(sum / (n_atoms * (n - tau)) as f64);
        }

        Ok(MsdProfile {
            lag,
            msd,
            query: self.selection.query().to_string(),
            n_atoms,
            frames: n,
        })
    }
}

/// Result of a mean-squared displacement analysis.
#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct MsdProfile {
    /// Time lags in frames.
    #[getset(get = "pub")]
    lag: Vec<f64>,
    /// Mean-squared displacement at each lag.
    #[getset(get = "pub")]
    msd: Vec<f64>,
    /// Selection query used for the analysis.
    #[getset(get = "pub")]
    query: String,
    /// Number of tracked atoms.
    #[getset(get_copy = "pub")]
    n_atoms: usize,
    /// Number of frames contributing to the analysis.
    #[getset(get_copy = "pub")]
    frames: usize,
}

impl MsdProfile {
    /// Convert the profile into an output table.
    pub fn into_table(self) -> Table {
        let mut table = Table::new();
        table.comment("Mean squared displacement");
        table.comment(&format!("selection: {}", self.query));
        table.comment(&format!("atoms: {}, frames: {}", self.n_atoms, self.frames));
        table.set_columns(&["lag", "msd"]);

        for i in 0..self.lag.len() {
            table.push_row(vec![self.lag[i], self.msd[i]]);
        }

        table
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
