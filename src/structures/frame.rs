// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the Frame structure, a single trajectory snapshot.

use crate::structures::{atom::Atom, cell::Cell};
use crate::topology::bonds::BondGraph;

/// One snapshot of a trajectory: an ordered sequence of atoms, an optional
/// periodic cell, and an optional bond topology.
///
/// Frames are produced one at a time by a trajectory source (see
/// [`TrajRead`](crate::analysis::traj::TrajRead)). The analyses never modify
/// a frame; the only mutation performed by this library is the attachment of
/// guessed bonds by the analysis runner.
#[derive(Debug, Clone)]
pub struct Frame {
    atoms: Vec<Atom>,
    cell: Option<Cell>,
    bonds: Option<BondGraph>,
}

impl Frame {
    /// Create a new frame from atoms and an optional periodic cell.
    pub fn new(atoms: Vec<Atom>, cell: Option<Cell>) -> Self {
        Frame {
            atoms,
            cell,
            bonds: None,
        }
    }

    /// Attach a bond topology to the frame, builder-style.
    ///
    /// ## Panics
    /// Panics if the bond graph was constructed for a different number of atoms.
    pub fn with_bonds(mut self, bonds: BondGraph) -> Self {
        self.set_bonds(bonds);
        self
    }

    /// Attach a bond topology to the frame.
    ///
    /// ## Panics
    /// Panics if the bond graph was constructed for a different number of atoms.
    pub fn set_bonds(&mut self, bonds: BondGraph) {
        if bonds.n_atoms() != self.atoms.len() {
            panic!(
                "FATAL TRAJAN ERROR | Frame::set_bonds | Bond graph covers {} atoms but the frame has {}.",
                bonds.n_atoms(),
                self.atoms.len()
            );
        }

        self.bonds = Some(bonds);
    }

    /// Get the number of atoms in the frame.
    #[inline]
    pub fn n_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// Get the atoms of the frame.
    #[inline]
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Get mutable access to the atoms of the frame.
    #[inline]
    pub fn atoms_mut(&mut self) -> &mut [Atom] {
        &mut self.atoms
    }

    /// Get the atom with the given index.
    #[inline]
    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    /// Get the periodic cell of the frame, if any.
    #[inline]
    pub fn cell(&self) -> Option<&Cell> {
        self.cell.as_ref()
    }

    /// Get the bond topology of the frame, if any.
    #[inline]
    pub fn bonds(&self) -> Option<&BondGraph> {
        self.bonds.as_ref()
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
