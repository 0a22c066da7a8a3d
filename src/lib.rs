// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! # trajan_rs: Trajectory Analysis Library for Rust
//!
//! Rust library for computing statistical structural and dynamical
//! properties of molecular trajectories: radial distribution functions,
//! 1-D and 2-D density profiles, hydrogen-bond geometry and its time
//! autocorrelation, mean-squared displacement, and angle distributions.
//!
//! The library is a streaming engine: it consumes frames one at a time
//! from any trajectory source implementing the [`TrajRead`](crate::analysis::traj::TrajRead)
//! trait, keeps bounded per-frame memory for all analyses except MSD, and
//! converts the accumulated counts into physical quantities only after the
//! last frame. Parsing of trajectory file formats is intentionally out of
//! scope; pair `trajan_rs` with your favourite trajectory-I/O crate.
//!
//! ## Usage
//!
//! Run
//!
//! ```bash
//! $ cargo add trajan_rs
//! ```
//!
//! Import the crate in your Rust code:
//! ```
//! use trajan_rs::prelude::*;
//! ```
//!
//! ## Examples
//!
//! #### Computing a radial distribution function
//!
//! Compute the oxygen-hydrogen g(r) with separate coordination numbers
//! for both roles, and write the result as a text table.
//!
//! ```no_run
//! use trajan_rs::prelude::*;
//! use std::error::Error;
//!
//! fn compute_rdf(source: &mut impl TrajRead) -> Result<(), Box<dyn Error>> {
//!     // compile a pair selection; `#1` and `#2` bind the two roles
//!     let selection = CompiledSelection::compile("pairs: name(#1) OW and name(#2) HW1", 2)?;
//!
//!     // 200 bins between 0 and 10 angstroms
//!     let mut rdf = Rdf::new(selection, 200, 10.0, RdfGeometry::Spatial)?;
//!
//!     // stream the trajectory through the analysis
//!     AnalysisRunner::new().run(source, &mut rdf)?;
//!
//!     // normalize and write the profile
//!     rdf.finish()?.into_table().write_to_file("water.rdf")?;
//!
//!     Ok(())
//! }
//! ```
//!
//! #### Detecting hydrogen bonds with guessed bonds
//!
//! Bond topologies may be provided by the trajectory source; when they are
//! not, the runner can guess covalent bonds from interatomic distances,
//! rebuilding the topology for every frame.
//!
//! ```no_run
//! use trajan_rs::prelude::*;
//! use trajan_rs::topology::bonds::DEFAULT_BOND_TOLERANCE;
//! use std::error::Error;
//!
//! fn hydrogen_bonds(source: &mut impl TrajRead) -> Result<(), Box<dyn Error>> {
//!     let mut analysis = HBonds::new(HBondCriteria::default(), 100, 100)?
//!         .with_autocorrelation();
//!
//!     AnalysisRunner::new()
//!         .with_bond_guessing(DEFAULT_BOND_TOLERANCE)
//!         .run(source, &mut analysis)?;
//!
//!     let result = analysis.finish()?;
//!     result.histogram_table().write_to_file("hbonds.dat")?;
//!     if let Some(table) = result.autocorrelation_table() {
//!         table.write_to_file("hbonds_acf.dat")?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! #### Restricting an analysis to a frame window
//!
//! ```no_run
//! use trajan_rs::prelude::*;
//! use std::error::Error;
//!
//! fn windowed_msd(source: &mut impl TrajRead) -> Result<(), Box<dyn Error>> {
//!     let selection = CompiledSelection::compile("name LI", 1)?;
//!     let mut msd = Msd::new(selection)?;
//!
//!     // frames [50, end) with a stride of 2
//!     AnalysisRunner::new()
//!         .with_window(FrameWindow::parse("50::2")?)
//!         .run(source, &mut msd)?;
//!
//!     msd.finish()?.into_table().write_to_file("li.msd")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Selection language
//!
//! Atoms and atom tuples are selected with a small query language.
//!
//! **Headers and arity**
//!
//! A query may start with a header declaring the tuple size: `atoms:`
//! (single atoms, the default), `pairs:` (ordered pairs), or `angles:`
//! (ordered triples). The header must match the arity required by the
//! analysis.
//!
//! **Basic queries**
//!
//! You can select atoms based on:
//! - Their **atom names** using `name XYZ`. For instance, `name OW` will
//!   select all atoms named OW. Multiple names can be given: `name OW HW1 HW2`.
//! - Their **element symbols** using `element X`. For instance `element O H`
//!   selects all oxygens and hydrogens. Elements must be provided by the
//!   trajectory source or assigned with [`Elements::assign`](crate::topology::elements::Elements::assign).
//! - Their **indices** using `index`. Indices are 0-based and ranges are
//!   written with `to` or `-`: `index 1 3-6 17` expands to atoms 1, 3, 4,
//!   5, 6, and 17.
//!
//! You can select all atoms of the frame using `all`.
//!
//! **Regular expressions**
//!
//! Atom names can be matched by regular expressions enclosed in a block
//! starting with `r'` and ending with `'`. For instance, all hydrogens can
//! usually be selected using `name r'^[0-9]?H.*'`. Regular expressions are
//! evaluated using the `regex` crate.
//!
//! **Operators**
//!
//! Sub-queries can be combined with `and` (`&&`), `or` (`||`), negated
//! with `not` (`!`), and grouped with parentheses. Operators are evaluated
//! from left to right; parenthesized expressions are evaluated first.
//!
//! **Roles**
//!
//! In `pairs:` and `angles:` selections, every predicate must be bound to
//! one member of the tuple using a role annotation directly after the
//! keyword: `pairs: name(#1) O and name(#2) H` matches all ordered pairs
//! with an O-named atom in the first role and an H-named atom in the
//! second. Role bindings make role-asymmetric analyses (donor versus
//! acceptor, O versus H coordination) possible without accidental
//! symmetrization. The only predicate that needs no role is `all`.
//!
//! **Bond topology**
//!
//! The `bonded(#i,#j)` relation is true when the atoms in roles `i` and
//! `j` are bonded in the current frame. Bonds are re-read from every frame,
//! so selections stay correct when bonds break or reform during the
//! trajectory. For instance, the water bending angle is selected with:
//!
//! ```text
//! angles: name(#1) HW1 and name(#2) OW and name(#3) HW2 and bonded(#1,#2) and bonded(#2,#3)
//! ```
//!
//! ## Error handling
//!
//! The individual error types provided by `trajan_rs` are not exported
//! into the `prelude` module. If you want to match on a specific error
//! type, include it explicitly from the `errors` module:
//! ```
//! use trajan_rs::errors::SelectError;
//! ```
//!
//! ## Features
//! - [x] streaming frame-at-a-time analysis with bounded memory
//! - [x] selection language with role bindings and per-frame bond predicates
//! - [x] minimum-image geometry for orthorhombic and triclinic cells
//! - [x] radial distribution functions with coordination numbers
//! - [x] 1-D and 2-D density profiles
//! - [x] bond guessing and hydrogen-bond detection with autocorrelation
//! - [x] mean-squared displacement with trajectory unwrapping
//! - [x] angle distributions
//! - [ ] trajectory file parsing (out of scope by design)
//!
//! ## Limitations
//! The MSD analysis keeps the full unwrapped position history of every
//! tracked atom in memory; its memory cost grows linearly with trajectory
//! length. This is fundamental to averaging over all time origins and is
//! documented on [`Msd`](crate::analysis::msd::Msd).
//!
//! ## License
//! This library is released under the MIT License.

/// Current version of the `trajan_rs` library.
pub const TRAJAN_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod errors;
pub mod output;
pub mod selections {
    pub(crate) mod numbers;
    pub mod select;
}
pub mod structures {
    pub mod atom;
    pub mod axis;
    pub mod cell;
    pub mod frame;
    pub mod histogram;
    pub mod vector3d;
}
pub mod topology {
    pub mod bonds;
    pub mod elements;
}
pub mod analysis {
    pub mod angles;
    pub mod density;
    pub mod hbonds;
    pub mod msd;
    pub mod rdf;
    pub mod traj;
}
mod warnings;

#[cfg(test)]
pub(crate) mod test_utilities;

/// Reexported basic `trajan_rs` structures and traits.
pub mod prelude {
    pub use crate::analysis::angles::{AngleDistribution, AngleNormalization, AngleProfile};
    pub use crate::analysis::density::{
        Density2DResult, DensityProfile, DensityProfile2D, DensityResult, ProfileAxis,
    };
    pub use crate::analysis::hbonds::{
        detect_hydrogen_bonds, HBondCriteria, HBonds, HBondsResult, HydrogenBond,
    };
    pub use crate::analysis::msd::{Msd, MsdProfile};
    pub use crate::analysis::rdf::{Rdf, RdfGeometry, RdfProfile};
    pub use crate::analysis::traj::{Analysis, AnalysisRunner, FrameWindow, TrajRead};
    pub use crate::output::Table;
    pub use crate::selections::select::CompiledSelection;
    pub use crate::structures::atom::Atom;
    pub use crate::structures::axis::Axis;
    pub use crate::structures::cell::Cell;
    pub use crate::structures::frame::Frame;
    pub use crate::structures::histogram::{Histogram1D, Histogram2D, PairCounter, TimeSeries};
    pub use crate::structures::vector3d::Vector3D;
    pub use crate::topology::bonds::BondGraph;
    pub use crate::topology::elements::Elements;
}
