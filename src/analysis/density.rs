// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of one- and two-dimensional density profiles.

use getset::{CopyGetters, Getters};

use crate::analysis::traj::Analysis;
use crate::errors::{AnalysisError, GeometryError};
use crate::output::Table;
use crate::selections::select::CompiledSelection;
use crate::structures::axis::Axis;
use crate::structures::cell::displacement;
use crate::structures::frame::Frame;
use crate::structures::histogram::{Histogram1D, Histogram2D};
use crate::structures::vector3d::Vector3D;
use crate::warnings;

/// Coordinate onto which atom positions are projected in a 1-D profile.
#[derive(Debug, Clone)]
pub enum ProfileAxis {
    /// Projection onto an axis. Positions are wrapped into the cell first
    /// (when a cell is present).
    Linear(Axis),
    /// Radial distance from an axis line passing through `origin`.
    Radial { axis: Axis, origin: Vector3D },
}

impl ProfileAxis {
    /// Calculate the profile coordinate of a position.
    fn coordinate(&self, frame: &Frame, position: &Vector3D) -> f64 {
        match self {
            ProfileAxis::Linear(axis) => {
                let wrapped = match frame.cell() {
                    Some(cell) => cell.wrap_position(position),
                    None => *position,
                };
                axis.projection(&wrapped)
            }
            ProfileAxis::Radial { axis, origin } => {
                let relative = displacement(frame.cell(), origin, position);
                axis.radial(&relative)
            }
        }
    }
}

/// Streaming 1-D number density profile.
///
/// Each matched atom contributes its projected coordinate to a histogram;
/// after the last frame, every bin is normalized by its volume and the
/// number of contributing frames, yielding a number density. Densities of
/// disjoint selections are exactly additive: for any partition of atoms
/// into type selections, the per-bin sum of the type densities equals the
/// density of all atoms.
///
/// Without a periodic cell the bin volume is unknown; the profile then
/// degrades to a per-length density (counts per unit of the projected
/// coordinate) and a warning is printed.
#[derive(Debug)]
pub struct DensityProfile {
    selection: CompiledSelection,
    axis: ProfileAxis,
    histogram: Histogram1D,
    norm_sum: f64,
    missing_cell: bool,
    frames: u64,
}

impl DensityProfile {
    /// Create a new 1-D density profile with `n_bins` bins over `[min, max)`.
    ///
    /// ## Returns
    /// - `AnalysisError::UnsupportedArity` if the selection arity is not 1.
    /// - `AnalysisError::Histogram` if the binning parameters are invalid.
    ///   For radial profiles, `min` must not be negative.
    pub fn new(
        selection: CompiledSelection,
        axis: ProfileAxis,
        n_bins: usize,
        min: f64,
        max: f64,
    ) -> Result<Self, AnalysisError> {
        if selection.arity() != 1 {
            return Err(AnalysisError::UnsupportedArity {
                analysis: "density",
                arity: selection.arity(),
            });
        }

        if matches!(axis, ProfileAxis::Radial { .. }) && min < 0.0 {
            return Err(crate::errors::HistogramError::InvalidRange(min, max).into());
        }

        Ok(DensityProfile {
            selection,
            axis,
            histogram: Histogram1D::new(n_bins, min, max)?,
            norm_sum: 0.0,
            missing_cell: false,
            frames: 0,
        })
    }

    /// Per-frame normalization factor: the volume of a bin divided by the
    /// bin-dependent part of its volume.
    fn frame_norm(&mut self, frame: &Frame) -> f64 {
        let Some(cell) = frame.cell() else {
            if !self.missing_cell {
                warnings::warn(
                    "frame has no periodic cell; the density profile degrades to counts per unit length",
                );
            }
            self.missing_cell = true;
            return 1.0;
        };

        match &self.axis {
            // slab volume per unit of the projected coordinate
            ProfileAxis::Linear(axis) => cell.volume() / cell.extent_along(axis.vector()),
            // cylinder height; the annulus area is added per bin at the end
            ProfileAxis::Radial { axis, .. } => cell.extent_along(axis.vector()),
        }
    }

    /// Bin-dependent part of the bin volume.
    fn bin_norm(&self, i: usize) -> f64 {
        match &self.axis {
            ProfileAxis::Linear(_) => self.histogram.axis().width(),
            ProfileAxis::Radial { .. } => {
                let r_low = self.histogram.axis().lower_edge(i);
                let r_high = r_low + self.histogram.axis().width();
                std::f64::consts::PI * (r_high.powi(2) - r_low.powi(2))
            }
        }
    }
}

impl Analysis for DensityProfile {
    type Output = DensityResult;

    fn process_frame(&mut self, frame: &Frame) -> Result<(), AnalysisError> {
        let norm = self.frame_norm(frame);
        self.norm_sum += norm;

        for index in self.selection.evaluate_atoms(frame)? {
            let coordinate = self.axis.coordinate(frame, frame.atoms()[index].position());
            self.histogram.add(coordinate, 1.0);
        }

        self.frames += 1;
        Ok(())
    }

    fn finish(self) -> Result<DensityResult, AnalysisError> {
        if self.frames == 0 {
            return Err(AnalysisError::NoFrames);
        }

        let n_bins = self.histogram.axis().n_bins();
        let mut coordinate = Vec::with_capacity(n_bins);
        let mut density = Vec::with_capacity(n_bins);

        for i in 0..n_bins {
            coordinate.push(self.histogram.axis().lower_edge(i));

            let norm = self.norm_sum * self.bin_norm(i);
            if norm > 0.0 {
                density.push(self.histogram.value(i) / norm);
            } else {
                density.push(0.0);
            }
        }

        Ok(DensityResult {
            coordinate,
            density,
            query: self.selection.query().to_string(),
            frames: self.frames,
        })
    }
}

/// Result of a 1-D density profile analysis.
#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct DensityResult {
    /// Lower edges of the coordinate bins.
    #[getset(get = "pub")]
    coordinate: Vec<f64>,
    /// Number density in each bin.
    #[getset(get = "pub")]
    density: Vec<f64>,
    /// Selection query used for the analysis.
    #[getset(get = "pub")]
    query: String,
    /// Number of frames contributing to the profile.
    #[getset(get_copy = "pub")]
    frames: u64,
}

impl DensityResult {
    /// Convert the profile into an output table.
    pub fn into_table(self) -> Table {
        let mut table = Table::new();
        table.comment("Density profile");
        table.comment(&format!("selection: {}", self.query));
        table.comment(&format!("frames: {}", self.frames));
        table.set_columns(&["coordinate", "density"]);

        for i in 0..self.coordinate.len() {
            table.push_row(vec![self.coordinate[i], self.density[i]]);
        }

        table
    }
}

/// Streaming 2-D (axial × radial) number density profile.
///
/// The first coordinate is the projection of the (wrapped) position onto
/// the axial axis; the second is the radial distance from the axis line
/// through `origin`. Bins are normalized by their annular volume and the
/// frame count. Bins in geometrically inaccessible regions report exactly
/// zero.
///
/// This profile is wrap-aware and strictly requires a periodic cell;
/// finishing a run during which no frame carried a cell is an error.
#[derive(Debug)]
pub struct DensityProfile2D {
    selection: CompiledSelection,
    axial: Axis,
    radial: ProfileAxis,
    histogram: Histogram2D,
    saw_cell: bool,
    frames: u64,
}

impl DensityProfile2D {
    /// Create a new 2-D density profile. The first (axial) axis bins the
    /// projection onto `axial` into `n_bins_axial` bins over
    /// `[min_axial, max_axial)`; the second bins the radial distance from
    /// the axis through `origin` into `n_bins_radial` bins over
    /// `[0, max_radial)`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        selection: CompiledSelection,
        axial: Axis,
        origin: Vector3D,
        n_bins_axial: usize,
        min_axial: f64,
        max_axial: f64,
        n_bins_radial: usize,
        max_radial: f64,
    ) -> Result<Self, AnalysisError> {
        if selection.arity() != 1 {
            return Err(AnalysisError::UnsupportedArity {
                analysis: "density2d",
                arity: selection.arity(),
            });
        }

        Ok(DensityProfile2D {
            selection,
            radial: ProfileAxis::Radial {
                axis: axial.clone(),
                origin,
            },
            axial,
            histogram: Histogram2D::new(
                n_bins_axial,
                min_axial,
                max_axial,
                n_bins_radial,
                0.0,
                max_radial,
            )?,
            saw_cell: false,
            frames: 0,
        })
    }
}

impl Analysis for DensityProfile2D {
    type Output = Density2DResult;

    fn process_frame(&mut self, frame: &Frame) -> Result<(), AnalysisError> {
        if frame.cell().is_some() {
            self.saw_cell = true;
        }

        for index in self.selection.evaluate_atoms(frame)? {
            let position = frame.atoms()[index].position();

            let wrapped = match frame.cell() {
                Some(cell) => cell.wrap_position(position),
                None => *position,
            };
            let axial = self.axial.projection(&wrapped);
            let radial = self.radial.coordinate(frame, position);

            self.histogram.add(axial, radial, 1.0);
        }

        self.frames += 1;
        Ok(())
    }

    fn finish(self) -> Result<Density2DResult, AnalysisError> {
        if self.frames == 0 {
            return Err(AnalysisError::NoFrames);
        }

        if !self.saw_cell {
            return Err(GeometryError::MissingCell("2-D density profile".to_string()).into());
        }

        let axial_width = self.histogram.x_axis().width();
        let radial_axis = self.histogram.y_axis().clone();
        let frames = self.frames as f64;

        let mut histogram = self.histogram;
        histogram.normalize(|_, j, count| {
            let r_low = radial_axis.lower_edge(j);
            let r_high = r_low + radial_axis.width();
            let volume = std::f64::consts::PI * (r_high.powi(2) - r_low.powi(2)) * axial_width;

            count / (frames * volume)
        });

        Ok(Density2DResult {
            histogram,
            query: self.selection.query().to_string(),
            frames: self.frames,
        })
    }
}

/// Result of a 2-D density profile analysis.
#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct Density2DResult {
    /// Normalized densities; rows are axial bins, columns radial bins.
    #[getset(get = "pub")]
    histogram: Histogram2D,
    /// Selection query used for the analysis.
    #[getset(get = "pub")]
    query: String,
    /// Number of frames contributing to the profile.
    #[getset(get_copy = "pub")]
    frames: u64,
}

impl Density2DResult {
    /// Convert the profile into an output table with one row per bin pair.
    pub fn into_table(self) -> Table {
        let mut table = Table::new();
        table.comment("2D density profile (axial x radial)");
        table.comment(&format!("selection: {}", self.query));
        table.comment(&format!("frames: {}", self.frames));
        table.set_columns(&["axial", "radial", "density"]);

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
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::traj::AnalysisRunner;
    use crate::structures::atom::Atom;
    use crate::structures::cell::Cell;
    use crate::test_utilities::VecTraj;
    use float_cmp::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn z_axis() -> ProfileAxis {
        ProfileAxis::Linear(Axis::from_name("z").unwrap())
    }

    fn radial_z_axis() -> ProfileAxis {
        ProfileAxis::Radial {
            axis: Axis::from_name("z").unwrap(),
            origin: Vector3D::new(5.0, 5.0, 0.0),
        }
    }

    /// A frame with randomly placed atoms alternately named A and B.
    fn mixed_frame(n_atoms: usize, length: f64, rng: &mut StdRng) -> Frame {
        let atoms = (0..n_atoms)
            .map(|i| {
                let name = if i % 2 == 0 { "A" } else { "B" };
                Atom::new(
                    name,
                    Vector3D::new(
                        rng.gen::<f64>() * length,
                        rng.gen::<f64>() * length,
                        rng.gen::<f64>() * length,
                    ),
                )
            })
            .collect();

        Frame::new(atoms, Some(Cell::cubic(length).unwrap()))
    }

    fn profile_for(query: &str, source: &mut VecTraj) -> DensityResult {
        let selection = CompiledSelection::compile(query, 1).unwrap();
        let mut profile =
            DensityProfile::new(selection, z_axis(), 20, 0.0, 10.0).unwrap();

        AnalysisRunner::new().run(source, &mut profile).unwrap();
        profile.finish().unwrap()
    }

    #[test]
    fn additivity() {
        let mut rng = StdRng::seed_from_u64(42);
        let frames: Vec<Frame> = (0..5).map(|_| mixed_frame(60, 10.0, &mut rng)).collect();

        let all = profile_for("all", &mut VecTraj::new(frames.clone()));
        let a = profile_for("name A", &mut VecTraj::new(frames.clone()));
        let b = profile_for("name B", &mut VecTraj::new(frames));

        for i in 0..all.density().len() {
            let sum = a.density()[i] + b.density()[i];
            assert_approx_eq!(f64, all.density()[i], sum, epsilon = 1e-12);
        }
    }

    #[test]
    fn linear_density_matches_bulk() {
        // ten atoms evenly spread along z in a 10x10x10 cell
        let atoms: Vec<Atom> = (0..10)
            .map(|i| Atom::new("A", Vector3D::new(5.0, 5.0, i as f64 + 0.5)))
            .collect();
        let frame = Frame::new(atoms, Some(Cell::cubic(10.0).unwrap()));

        let selection = CompiledSelection::compile("all", 1).unwrap();
        let mut profile = DensityProfile::new(selection, z_axis(), 10, 0.0, 10.0).unwrap();
        AnalysisRunner::new()
            .run(&mut VecTraj::new(vec![frame]), &mut profile)
            .unwrap();
        let result = profile.finish().unwrap();

        // one atom per slab of volume 100 * 1.0; the profile reproduces N/V
        for density in result.density() {
            assert_approx_eq!(f64, *density, 10.0 / 1000.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn radial_single_atom_normalization() {
        // a single atom at radial distance 2.25 from the z-axis through (5, 5, 0)
        let frame = Frame::new(
            vec![Atom::new("A", Vector3D::new(7.25, 5.0, 3.0))],
            Some(Cell::cubic(10.0).unwrap()),
        );

        let selection = CompiledSelection::compile("all", 1).unwrap();
        let mut profile =
            DensityProfile::new(selection, radial_z_axis(), 10, 0.0, 5.0).unwrap();

        AnalysisRunner::new()
            .run(&mut VecTraj::new(vec![frame]), &mut profile)
            .unwrap();
        let result = profile.finish().unwrap();

        // the atom falls into bin [2.0, 2.5); annulus area times cylinder height
        let volume = std::f64::consts::PI * (2.5f64.powi(2) - 2.0f64.powi(2)) * 10.0;
        assert_approx_eq!(f64, result.density()[4], 1.0 / volume, epsilon = 1e-12);

        // all other bins are exactly zero
        for (i, density) in result.density().iter().enumerate() {
            if i != 4 {
                assert_eq!(*density, 0.0);
            }
        }
    }

    #[test]
    fn radial_exclusion_zone_is_exactly_zero() {
        // atoms on a ring of radius 6.2 around the z-axis; the region r < 5 is empty
        let mut atoms = Vec::new();
        for i in 0..32 {
            let angle = i as f64 * std::f64::consts::PI / 16.0;
            atoms.push(Atom::new(
                "A",
                Vector3D::new(
                    5.0 + 6.2 * angle.cos(),
                    5.0 + 6.2 * angle.sin(),
                    (i % 8) as f64,
                ),
            ));
        }
        let frames = vec![Frame::new(atoms, Some(Cell::cubic(20.0).unwrap())); 3];

        let selection = CompiledSelection::compile("all", 1).unwrap();
        let mut profile =
            DensityProfile::new(selection, radial_z_axis(), 16, 0.0, 8.0).unwrap();

        AnalysisRunner::new()
            .run(&mut VecTraj::new(frames), &mut profile)
            .unwrap();
        let result = profile.finish().unwrap();

        // every bin below r = 5 reports exactly zero, never a rounding artifact
        for i in 0..10 {
            assert_eq!(result.density()[i], 0.0);
        }
        assert!(result.density()[12] > 0.0);
    }

    #[test]
    fn radial_rejects_negative_min() {
        let selection = CompiledSelection::compile("all", 1).unwrap();

        assert!(matches!(
            DensityProfile::new(selection, radial_z_axis(), 10, -1.0, 5.0),
            Err(AnalysisError::Histogram(_))
        ));
    }

    #[test]
    fn pair_selection_rejected() {
        let selection = CompiledSelection::compile("pairs: all", 2).unwrap();

        assert!(matches!(
            DensityProfile::new(selection, z_axis(), 10, 0.0, 5.0),
            Err(AnalysisError::UnsupportedArity { analysis: "density", arity: 2 })
        ));
    }

    #[test]
    fn no_cell_degrades_to_per_length() {
        let atoms = vec![Atom::new("A", Vector3D::new(0.0, 0.0, 2.25))];
        let frame = Frame::new(atoms, None);

        let selection = CompiledSelection::compile("all", 1).unwrap();
        let mut profile = DensityProfile::new(selection, z_axis(), 10, 0.0, 5.0).unwrap();

        AnalysisRunner::new()
            .run(&mut VecTraj::new(vec![frame]), &mut profile)
            .unwrap();
        let result = profile.finish().unwrap();

        // one atom per frame in bin [2.0, 2.5), normalized by bin length only
        assert_approx_eq!(f64, result.density()[4], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn density2d_hollow_cylinder() {
        // atoms on a cylindrical shell of radius 6.2 spanning all axial bins
        let mut atoms = Vec::new();
        for i in 0..64 {
            let angle = i as f64 * std::f64::consts::PI / 32.0;
            atoms.push(Atom::new(
                "A",
                Vector3D::new(
                    10.0 + 6.2 * angle.cos(),
                    10.0 + 6.2 * angle.sin(),
                    (i % 16) as f64 + 0.5,
                ),
            ));
        }
        let frame = Frame::new(atoms, Some(Cell::cubic(20.0).unwrap()));

        let selection = CompiledSelection::compile("all", 1).unwrap();
        let mut profile = DensityProfile2D::new(
            selection,
            Axis::from_name("z").unwrap(),
            Vector3D::new(10.0, 10.0, 0.0),
            16,
            0.0,
            16.0,
            8,
            8.0,
        )
        .unwrap();

        AnalysisRunner::new()
            .run(&mut VecTraj::new(vec![frame]), &mut profile)
            .unwrap();
        let result = profile.finish().unwrap();

        // the inaccessible core (r < 5) is exactly zero in every axial bin
        for i in 0..16 {
            for j in 0..5 {
                assert_eq!(result.histogram().value(i, j), 0.0);
            }
        }

        // the shell bin (r in [6, 7)) is populated in every axial bin
        for i in 0..16 {
            assert!(result.histogram().value(i, 6) > 0.0);
        }
    }

    #[test]
    fn density2d_requires_cell() {
        let frame = Frame::new(vec![Atom::new("A", Vector3D::new(1.0, 1.0, 1.0))], None);

        let selection = CompiledSelection::compile("all", 1).unwrap();
        let mut profile = DensityProfile2D::new(
            selection,
            Axis::from_name("z").unwrap(),
            Vector3D::default(),
            4,
            0.0,
            4.0,
            4,
            4.0,
        )
        .unwrap();

        AnalysisRunner::new()
            .run(&mut VecTraj::new(vec![frame]), &mut profile)
            .unwrap();

        assert!(matches!(
            profile.finish(),
            Err(AnalysisError::Geometry(GeometryError::MissingCell(_)))
        ));
    }

    #[test]
    fn table_conversion() {
        let mut rng = StdRng::seed_from_u64(3);
        let frame = mixed_frame(10, 10.0, &mut rng);

        let result = profile_for("all", &mut VecTraj::new(vec![frame]));
        let table = result.into_table();

        assert_eq!(table.n_rows(), 20);
    }
}
