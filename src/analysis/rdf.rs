// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the radial distribution function analysis.

use getset::{CopyGetters, Getters};
use hashbrown::HashSet;

use crate::analysis::traj::Analysis;
use crate::errors::AnalysisError;
use crate::output::Table;
use crate::selections::select::CompiledSelection;
use crate::structures::cell::distance;
use crate::structures::frame::Frame;
use crate::structures::histogram::{Histogram1D, PairCounter};
use crate::structures::vector3d::Vector3D;
use crate::warnings;

/// Shell volume convention used to normalize the pair histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfGeometry {
    /// Three-dimensional system; bins are normalized by spherical shell
    /// volumes 4π/3·((r+Δr)³ − r³).
    Spatial,
    /// Quasi-two-dimensional system in the xy-plane; pair distances are
    /// projected into the plane and bins are normalized by annulus areas
    /// π·((r+Δr)² − r²).
    Planar,
}

/// Streaming radial distribution function g(r) with cumulative
/// coordination numbers.
///
/// The selection decides the counting mode:
/// - an arity-1 selection is **symmetric**: every unordered pair of matched
///   atoms is counted once and the factor of two is folded into the
///   normalization;
/// - an arity-2 (`pairs:`) selection is **asymmetric**: every matched
///   ordered pair contributes, and the two coordination numbers n₁₂(r)
///   (second-role atoms around a first-role atom) and n₂₁(r) are reported
///   separately.
///
/// Without a periodic cell the ideal-gas reference density is unknown;
/// the histogram is then left unnormalized (unit volume) and a warning is
/// printed.
#[derive(Debug)]
pub struct Rdf {
    selection: CompiledSelection,
    histogram: Histogram1D,
    pairs: PairCounter,
    geometry: RdfGeometry,
    volume_sum: f64,
    missing_cell: bool,
    frames: u64,
}

impl Rdf {
    /// Create a new RDF analysis binning pair distances into `n_bins` bins
    /// over `[0, r_max)`.
    ///
    /// ## Returns
    /// - `AnalysisError::UnsupportedArity` if the selection arity is 3.
    /// - `AnalysisError::Histogram` if the binning parameters are invalid.
    pub fn new(
        selection: CompiledSelection,
        n_bins: usize,
        r_max: f64,
        geometry: RdfGeometry,
    ) -> Result<Self, AnalysisError> {
        if selection.arity() > 2 {
            return Err(AnalysisError::UnsupportedArity {
                analysis: "rdf",
                arity: selection.arity(),
            });
        }

        Ok(Rdf {
            selection,
            histogram: Histogram1D::new(n_bins, 0.0, r_max)?,
            pairs: PairCounter::new(),
            geometry,
            volume_sum: 0.0,
            missing_cell: false,
            frames: 0,
        })
    }

    /// Returns `true` if the analysis uses symmetric single-set counting.
    #[inline]
    pub fn is_symmetric(&self) -> bool {
        self.selection.arity() == 1
    }

    /// Pair distance respecting the geometry convention.
    fn pair_distance(&self, frame: &Frame, a: &Vector3D, b: &Vector3D) -> f64 {
        match self.geometry {
            RdfGeometry::Spatial => distance(frame.cell(), a, b),
            RdfGeometry::Planar => {
                let shift = crate::structures::cell::displacement(frame.cell(), a, b);
                (shift.x * shift.x + shift.y * shift.y).sqrt()
            }
        }
    }

    /// Reference volume (or area, for planar geometry) of a frame.
    fn reference_volume(&self, frame: &Frame) -> Option<f64> {
        let cell = frame.cell()?;

        match self.geometry {
            RdfGeometry::Spatial => Some(cell.volume()),
            RdfGeometry::Planar => {
                let height = cell.extent_along(&Vector3D::new(0.0, 0.0, 1.0));
                Some(cell.volume() / height)
            }
        }
    }

    /// Shell volume (or annulus area) of bin `i`.
    fn shell_volume(&self, i: usize) -> f64 {
        let r_low = self.histogram.axis().lower_edge(i);
        let r_high = r_low + self.histogram.axis().width();

        match self.geometry {
            RdfGeometry::Spatial => {
                4.0 / 3.0 * std::f64::consts::PI * (r_high.powi(3) - r_low.powi(3))
            }
            RdfGeometry::Planar => std::f64::consts::PI * (r_high.powi(2) - r_low.powi(2)),
        }
    }
}

impl Analysis for Rdf {
    type Output = RdfProfile;

    fn process_frame(&mut self, frame: &Frame) -> Result<(), AnalysisError> {
        match self.reference_volume(frame) {
            Some(volume) => self.volume_sum += volume,
            None => {
                if !self.missing_cell {
                    warnings::warn(
                        "frame has no periodic cell; the RDF will not be normalized by density",
                    );
                }
                self.missing_cell = true;
            }
        }

        if self.is_symmetric() {
            let atoms = self.selection.evaluate_atoms(frame)?;

            for (index, &i) in atoms.iter().enumerate() {
                for &j in &atoms[index + 1..] {
                    let d = self.pair_distance(
                        frame,
                        frame.atoms()[i].position(),
                        frame.atoms()[j].position(),
                    );
                    self.histogram.add(d, 1.0);
                }
            }

            self.pairs.add_frame_symmetric(atoms.len());
        } else {
            let matched = self.selection.evaluate_pairs(frame)?;

            let mut first_members = HashSet::new();
            let mut second_members = HashSet::new();

            for &(i, j) in &matched {
                first_members.insert(i);
                second_members.insert(j);

                let d = self.pair_distance(
                    frame,
                    frame.atoms()[i].position(),
                    frame.atoms()[j].position(),
                );
                self.histogram.add(d, 1.0);
            }

            self.pairs
                .add_frame(first_members.len(), second_members.len());
        }

        self.frames += 1;
        Ok(())
    }

    fn finish(self) -> Result<RdfProfile, AnalysisError> {
        if self.frames == 0 {
            return Err(AnalysisError::NoFrames);
        }

        // without a cell the reference density is unknown; use unit volume
        let volume = if self.missing_cell {
            1.0
        } else {
            self.volume_sum / self.frames as f64
        };

        let n_bins = self.histogram.axis().n_bins();
        let pair_norm = self.pairs.pair_norm();

        let mut g = Vec::with_capacity(n_bins);
        let mut r = Vec::with_capacity(n_bins);
        for i in 0..n_bins {
            r.push(self.histogram.axis().lower_edge(i));

            let ideal = pair_norm * self.shell_volume(i) / volume;
            if ideal > 0.0 {
                g.push(self.histogram.value(i) / ideal);
            } else {
                g.push(0.0);
            }
        }

        // coordination numbers integrate the raw pair histogram, not g(r)
        let cumulative = self.histogram.cumulative();
        let symmetric = self.is_symmetric();

        let coordination = |refs: f64, factor: f64| -> Vec<f64> {
            cumulative
                .iter()
                .map(|&count| if refs > 0.0 { factor * count / refs } else { 0.0 })
                .collect()
        };

        let factor = if symmetric { 2.0 } else { 1.0 };
        let coordination_first = coordination(self.pairs.refs_first(), factor);
        let coordination_second = coordination(self.pairs.refs_second(), factor);

        Ok(RdfProfile {
            r,
            g,
            coordination_first,
            coordination_second,
            query: self.selection.query().to_string(),
            symmetric,
            frames: self.frames,
        })
    }
}

/// Result of a radial distribution function analysis.
#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct RdfProfile {
    /// Lower edges of the distance bins.
    #[getset(get = "pub")]
    r: Vec<f64>,
    /// Radial distribution function g(r).
    #[getset(get = "pub")]
    g: Vec<f64>,
    /// Cumulative coordination number around a first-role atom.
    #[getset(get = "pub")]
    coordination_first: Vec<f64>,
    /// Cumulative coordination number around a second-role atom.
    /// Identical to `coordination_first` for symmetric selections.
    #[getset(get = "pub")]
    coordination_second: Vec<f64>,
    /// Selection query used for the analysis.
    #[getset(get = "pub")]
    query: String,
    /// Whether symmetric single-set counting was used.
    #[getset(get_copy = "pub")]
    symmetric: bool,
    /// Number of frames contributing to the profile.
    #[getset(get_copy = "pub")]
    frames: u64,
}

impl RdfProfile {
    /// Convert the profile into an output table.
    pub fn into_table(self) -> Table {
        let mut table = Table::new();
        table.comment("Radial distribution function");
        table.comment(&format!("selection: {}", self.query));
        table.comment(&format!("frames: {}", self.frames));
        table.set_columns(&["r", "g(r)", "n_12(r)", "n_21(r)"]);

        for i in 0..self.r.len() {
            table.push_row(vec![
                self.r[i],
                self.g[i],
                self.coordination_first[i],
                self.coordination_second[i],
            ]);
        }

        table
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::traj::{AnalysisRunner, FrameWindow};
    use crate::structures::atom::Atom;
    use crate::structures::cell::Cell;
    use crate::test_utilities::{water_chain_frame, VecTraj};
    use crate::topology::elements::Elements;
    use float_cmp::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Frames of an ideal gas: uniformly random atoms in a cubic cell.
    fn ideal_gas(n_atoms: usize, n_frames: usize, length: f64, seed: u64) -> VecTraj {
        let mut rng = StdRng::seed_from_u64(seed);

        let frames = (0..n_frames)
            .map(|_| {
                let atoms = (0..n_atoms)
                    .map(|_| {
                        Atom::new(
                            "AR",
                            Vector3D::new(
                                rng.gen::<f64>() * length,
                                rng.gen::<f64>() * length,
                                rng.gen::<f64>() * length,
                            ),
                        )
                    })
                    .collect();
                Frame::new(atoms, Some(Cell::cubic(length).unwrap()))
            })
            .collect();

        VecTraj::new(frames)
    }

    #[test]
    fn ideal_gas_converges_to_one() {
        let selection = CompiledSelection::compile("all", 1).unwrap();
        let mut rdf = Rdf::new(selection, 50, 5.0, RdfGeometry::Spatial).unwrap();

        AnalysisRunner::new()
            .run(&mut ideal_gas(125, 20, 10.0, 1984), &mut rdf)
            .unwrap();

        let profile = rdf.finish().unwrap();

        // g(r) averaged over the upper half of the range must converge to 1
        let upper_half: Vec<f64> = profile.g()[25..].to_vec();
        let mean = upper_half.iter().sum::<f64>() / upper_half.len() as f64;

        assert_approx_eq!(f64, mean, 1.0, epsilon = 0.1);
    }

    /// One frame of a simple cubic lattice with the given spacing.
    fn cubic_lattice(cells_per_side: usize, spacing: f64) -> Frame {
        let mut atoms = Vec::new();
        for i in 0..cells_per_side {
            for j in 0..cells_per_side {
                for k in 0..cells_per_side {
                    atoms.push(Atom::new(
                        "AR",
                        Vector3D::new(
                            i as f64 * spacing,
                            j as f64 * spacing,
                            k as f64 * spacing,
                        ),
                    ));
                }
            }
        }

        let length = cells_per_side as f64 * spacing;
        Frame::new(atoms, Some(Cell::cubic(length).unwrap()))
    }

    #[test]
    fn simple_cubic_coordination() {
        let selection = CompiledSelection::compile("all", 1).unwrap();
        let mut rdf = Rdf::new(selection, 25, 2.5, RdfGeometry::Spatial).unwrap();

        let mut source = VecTraj::new(vec![cubic_lattice(4, 2.0)]);
        AnalysisRunner::new().run(&mut source, &mut rdf).unwrap();

        let profile = rdf.finish().unwrap();

        // every lattice site has exactly 6 nearest neighbors at the lattice
        // spacing; the next shell (at spacing·√2) lies beyond the range
        let last = profile.coordination_first().last().unwrap();
        assert_approx_eq!(f64, *last, 6.0, epsilon = 1e-9);

        // symmetric counting reports identical coordination for both roles
        assert_eq!(profile.coordination_first(), profile.coordination_second());
    }

    #[test]
    fn pair_swap_symmetry() {
        let elements = Elements::default();
        let mut frame = water_chain_frame();
        let _ = elements.assign(&mut frame);

        let forward =
            CompiledSelection::compile("pairs: element(#1) O and element(#2) H", 2).unwrap();
        let backward =
            CompiledSelection::compile("pairs: element(#1) H and element(#2) O", 2).unwrap();

        let mut rdf_forward = Rdf::new(forward, 40, 4.0, RdfGeometry::Spatial).unwrap();
        let mut rdf_backward = Rdf::new(backward, 40, 4.0, RdfGeometry::Spatial).unwrap();

        rdf_forward.process_frame(&frame).unwrap();
        rdf_backward.process_frame(&frame).unwrap();

        let forward = rdf_forward.finish().unwrap();
        let backward = rdf_backward.finish().unwrap();

        // swapping the roles swaps the coordination numbers and keeps g(r)
        for i in 0..forward.r().len() {
            assert_approx_eq!(f64, forward.g()[i], backward.g()[i], epsilon = 1e-9);
            assert_approx_eq!(
                f64,
                forward.coordination_first()[i],
                backward.coordination_second()[i],
                epsilon = 1e-9
            );
            assert_approx_eq!(
                f64,
                forward.coordination_second()[i],
                backward.coordination_first()[i],
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn oxygen_hydrogen_coordination() {
        let elements = Elements::default();
        let mut frame = water_chain_frame();
        let _ = elements.assign(&mut frame);

        let selection =
            CompiledSelection::compile("pairs: element(#1) O and element(#2) H", 2).unwrap();
        let mut rdf = Rdf::new(selection, 15, 1.5, RdfGeometry::Spatial).unwrap();
        rdf.process_frame(&frame).unwrap();

        let profile = rdf.finish().unwrap();

        // within 1.5 angstroms every oxygen sees exactly its two hydrogens,
        // and every hydrogen exactly its one oxygen
        assert_approx_eq!(f64, *profile.coordination_first().last().unwrap(), 2.0);
        assert_approx_eq!(f64, *profile.coordination_second().last().unwrap(), 1.0);
    }

    #[test]
    fn planar_ideal_gas_converges_to_one() {
        let selection = CompiledSelection::compile("all", 1).unwrap();
        let mut rdf = Rdf::new(selection, 40, 4.0, RdfGeometry::Planar).unwrap();

        AnalysisRunner::new()
            .run(&mut ideal_gas(100, 20, 10.0, 7), &mut rdf)
            .unwrap();

        let profile = rdf.finish().unwrap();

        let upper_half: Vec<f64> = profile.g()[20..].to_vec();
        let mean = upper_half.iter().sum::<f64>() / upper_half.len() as f64;

        assert_approx_eq!(f64, mean, 1.0, epsilon = 0.1);
    }

    #[test]
    fn windowed_run_keeps_grid_layout() {
        let selection = CompiledSelection::compile("all", 1).unwrap();

        let mut full = Rdf::new(selection.clone(), 30, 3.0, RdfGeometry::Spatial).unwrap();
        let mut windowed = Rdf::new(selection, 30, 3.0, RdfGeometry::Spatial).unwrap();

        AnalysisRunner::new()
            .run(&mut ideal_gas(50, 10, 8.0, 11), &mut full)
            .unwrap();
        AnalysisRunner::new()
            .with_window(FrameWindow::new(5, None, 1).unwrap())
            .run(&mut ideal_gas(50, 10, 8.0, 11), &mut windowed)
            .unwrap();

        let full = full.finish().unwrap();
        let windowed = windowed.finish().unwrap();

        // the bin grid is identical regardless of the frame window
        assert_eq!(full.r(), windowed.r());
        assert_eq!(full.frames(), 10);
        assert_eq!(windowed.frames(), 5);
    }

    #[test]
    fn triple_selection_rejected() {
        let selection = CompiledSelection::compile("angles: all", 3).unwrap();

        assert!(matches!(
            Rdf::new(selection, 10, 5.0, RdfGeometry::Spatial),
            Err(AnalysisError::UnsupportedArity { analysis: "rdf", arity: 3 })
        ));
    }

    #[test]
    fn no_frames() {
        let selection = CompiledSelection::compile("all", 1).unwrap();
        let rdf = Rdf::new(selection, 10, 5.0, RdfGeometry::Spatial).unwrap();

        assert!(matches!(rdf.finish(), Err(AnalysisError::NoFrames)));
    }

    #[test]
    fn table_conversion() {
        let selection = CompiledSelection::compile("all", 1).unwrap();
        let mut rdf = Rdf::new(selection, 10, 5.0, RdfGeometry::Spatial).unwrap();

        let mut source = VecTraj::new(vec![cubic_lattice(3, 2.0)]);
        AnalysisRunner::new().run(&mut source, &mut rdf).unwrap();

        let table = rdf.finish().unwrap().into_table();
        assert_eq!(table.n_rows(), 10);
    }
}
