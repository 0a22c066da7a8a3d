// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the bond graph and distance-based bond guessing.

use crate::errors::BondError;
use crate::structures::cell::distance;
use crate::structures::frame::Frame;
use crate::topology::elements::Elements;
use crate::warnings;

/// Default tolerance factor applied to the sum of covalent radii
/// when guessing bonds between atoms.
pub const DEFAULT_BOND_TOLERANCE: f64 = 1.15;

/// Bond topology of a single frame stored as adjacency lists.
///
/// A bond graph is only ever valid for the frame it was built from. When
/// bond guessing is enabled, the graph is rebuilt from scratch for every
/// frame; bonds may break and reform between frames and stale adjacency
/// must never leak from one frame to the next.
#[derive(Debug, Clone)]
pub struct BondGraph {
    adjacency: Vec<Vec<usize>>,
    n_bonds: usize,
}

impl BondGraph {
    /// Create a bond graph with no bonds.
    pub fn empty(n_atoms: usize) -> Self {
        BondGraph {
            adjacency: vec![Vec::new(); n_atoms],
            n_bonds: 0,
        }
    }

    /// Create a bond graph from a list of bonded index pairs.
    ///
    /// ## Returns
    /// - `BondError::InvalidAtomIndex` if any index is out of range.
    /// - `BondError::SelfBond` if any pair bonds an atom to itself.
    pub fn from_pairs(n_atoms: usize, pairs: &[(usize, usize)]) -> Result<Self, BondError> {
        let mut graph = BondGraph::empty(n_atoms);

        for &(i, j) in pairs {
            if i >= n_atoms || j >= n_atoms {
                return Err(BondError::InvalidAtomIndex(i.max(j)));
            }

            if i == j {
                return Err(BondError::SelfBond(i));
            }

            graph.add_bond(i, j);
        }

        Ok(graph)
    }

    /// Add a bond between two valid, distinct atom indices.
    /// Duplicate bonds are ignored.
    fn add_bond(&mut self, i: usize, j: usize) {
        if self.adjacency[i].contains(&j) {
            return;
        }

        self.adjacency[i].push(j);
        self.adjacency[j].push(i);
        self.n_bonds += 1;
    }

    /// Get the number of atoms the graph was constructed for.
    #[inline]
    pub fn n_atoms(&self) -> usize {
        self.adjacency.len()
    }

    /// Get the number of bonds in the graph.
    #[inline]
    pub fn n_bonds(&self) -> usize {
        self.n_bonds
    }

    /// Check whether two atoms are bonded.
    ///
    /// ## Panics
    /// Panics if either index is out of range.
    #[inline]
    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.adjacency[i].contains(&j)
    }

    /// Get the indices of all atoms bonded to atom `i`.
    ///
    /// ## Panics
    /// Panics if the index is out of range.
    #[inline]
    pub fn bonded(&self, i: usize) -> &[usize] {
        &self.adjacency[i]
    }
}

/// Guess bonds between the atoms of a frame from interatomic distances.
///
/// A bond is declared between two atoms when their minimum-image distance
/// is positive and does not exceed `tolerance` times the sum of their
/// covalent radii. Distances respect the periodic cell of the frame if one
/// is present; without a cell, bonds across periodic boundaries cannot be
/// found.
///
/// Atoms whose element is unknown or has no covalent radius in the
/// provided `Elements` table are not assigned any bonds; a warning listing
/// their count is printed once per call.
///
/// ## Returns
/// - The guessed `BondGraph`.
/// - `BondError::InvalidTolerance` if the tolerance is not positive.
///
/// ## Example
/// ```no_run
/// # use trajan_rs::prelude::*;
/// # use trajan_rs::topology::bonds::{guess_bonds, DEFAULT_BOND_TOLERANCE};
/// #
/// # let mut frame: Frame = todo!();
/// let elements = Elements::default();
/// let bonds = guess_bonds(&frame, &elements, DEFAULT_BOND_TOLERANCE).unwrap();
/// frame.set_bonds(bonds);
/// ```
///
/// ## Notes
/// - Asymptotic time complexity is O(n²) in the number of atoms.
pub fn guess_bonds(
    frame: &Frame,
    elements: &Elements,
    tolerance: f64,
) -> Result<BondGraph, BondError> {
    if tolerance <= 0.0 || !tolerance.is_finite() {
        return Err(BondError::InvalidTolerance(tolerance));
    }

    // covalent radius per atom; atoms with no usable element get None
    let radii: Vec<Option<f64>> = frame
        .atoms()
        .iter()
        .map(|atom| {
            atom.element()
                .as_deref()
                .and_then(|symbol| elements.covalent_radius(symbol))
        })
        .collect();

    let missing = radii.iter().filter(|r| r.is_none()).count();
    if missing > 0 {
        warnings::warn(&format!(
            "{} atom(s) have no known covalent radius; they were not assigned any bonds",
            missing
        ));
    }

    let mut graph = BondGraph::empty(frame.n_atoms());
    let cell = frame.cell();

    for i in 0..frame.n_atoms() {
        let Some(radius_i) = radii[i] else { continue };

        for j in (i + 1)..frame.n_atoms() {
            let Some(radius_j) = radii[j] else { continue };

            let cutoff = tolerance * (radius_i + radius_j);
            let d = distance(
                cell,
                frame.atoms()[i].position(),
                frame.atoms()[j].position(),
            );

            if d > 0.0 && d <= cutoff {
                graph.add_bond(i, j);
            }
        }
    }

    Ok(graph)
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::{atom::Atom, cell::Cell, vector3d::Vector3D};

    #[test]
    fn from_pairs() {
        let graph = BondGraph::from_pairs(4, &[(0, 1), (1, 2), (0, 1)]).unwrap();

        assert_eq!(graph.n_atoms(), 4);
        assert_eq!(graph.n_bonds(), 2);
        assert!(graph.contains(0, 1));
        assert!(graph.contains(1, 0));
        assert!(graph.contains(1, 2));
        assert!(!graph.contains(0, 2));
        assert_eq!(graph.bonded(1), &[0, 2]);
        assert!(graph.bonded(3).is_empty());
    }

    #[test]
    fn from_pairs_invalid_index() {
        assert!(matches!(
            BondGraph::from_pairs(2, &[(0, 2)]),
            Err(BondError::InvalidAtomIndex(2))
        ));
    }

    #[test]
    fn from_pairs_self_bond() {
        assert!(matches!(
            BondGraph::from_pairs(2, &[(1, 1)]),
            Err(BondError::SelfBond(1))
        ));
    }

    /// A single water: O at the origin, hydrogens 0.96 angstroms away.
    fn water() -> Vec<Atom> {
        vec![
            Atom::new("OW", Vector3D::new(0.0, 0.0, 0.0)).with_element("O"),
            Atom::new("HW1", Vector3D::new(0.96, 0.0, 0.0)).with_element("H"),
            Atom::new("HW2", Vector3D::new(-0.24, 0.93, 0.0)).with_element("H"),
        ]
    }

    #[test]
    fn guess_water() {
        let frame = Frame::new(water(), Some(Cell::cubic(15.0).unwrap()));
        let graph = guess_bonds(&frame, &Elements::default(), DEFAULT_BOND_TOLERANCE).unwrap();

        assert_eq!(graph.n_bonds(), 2);
        assert!(graph.contains(0, 1));
        assert!(graph.contains(0, 2));
        assert!(!graph.contains(1, 2));
    }

    #[test]
    fn guess_across_boundary() {
        let atoms = vec![
            Atom::new("OW", Vector3D::new(0.3, 5.0, 5.0)).with_element("O"),
            Atom::new("HW1", Vector3D::new(14.6, 5.0, 5.0)).with_element("H"),
        ];

        let frame = Frame::new(atoms.clone(), Some(Cell::cubic(15.0).unwrap()));
        let graph = guess_bonds(&frame, &Elements::default(), DEFAULT_BOND_TOLERANCE).unwrap();
        assert!(graph.contains(0, 1));

        // without a cell, the bond across the boundary cannot be found
        let frame = Frame::new(atoms, None);
        let graph = guess_bonds(&frame, &Elements::default(), DEFAULT_BOND_TOLERANCE).unwrap();
        assert_eq!(graph.n_bonds(), 0);
    }

    #[test]
    fn guess_skips_unknown_elements() {
        let atoms = vec![
            Atom::new("OW", Vector3D::new(0.0, 0.0, 0.0)).with_element("O"),
            Atom::new("??", Vector3D::new(0.9, 0.0, 0.0)),
        ];

        let frame = Frame::new(atoms, None);
        let graph = guess_bonds(&frame, &Elements::default(), DEFAULT_BOND_TOLERANCE).unwrap();

        assert_eq!(graph.n_bonds(), 0);
    }

    #[test]
    fn guess_invalid_tolerance() {
        let frame = Frame::new(water(), None);

        assert!(matches!(
            guess_bonds(&frame, &Elements::default(), 0.0),
            Err(BondError::InvalidTolerance(_))
        ));
    }

    #[test]
    fn guess_tolerance_matters() {
        let frame = Frame::new(water(), None);

        // with a tiny tolerance nothing is within reach
        let graph = guess_bonds(&frame, &Elements::default(), 0.1).unwrap();
        assert_eq!(graph.n_bonds(), 0);
    }
}
