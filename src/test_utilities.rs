// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Utility structures and functions used in tests.

use crate::errors::ReadTrajError;
use crate::structures::{atom::Atom, cell::Cell, frame::Frame, vector3d::Vector3D};
use crate::analysis::traj::TrajRead;

/// Create an atom with the given name and position.
pub(crate) fn atom_at(name: &str, x: f64, y: f64, z: f64) -> Atom {
    Atom::new(name, Vector3D::new(x, y, z))
}

/// In-memory trajectory source used to drive analyses in tests.
pub(crate) struct VecTraj {
    frames: Vec<Frame>,
    cursor: usize,
    fail_after: Option<usize>,
}

impl VecTraj {
    /// Create a trajectory source from pre-built frames.
    pub(crate) fn new(frames: Vec<Frame>) -> Self {
        VecTraj {
            frames,
            cursor: 0,
            fail_after: None,
        }
    }

    /// Make the source fail after reading the given number of frames.
    pub(crate) fn failing_after(mut self, n_frames: usize) -> Self {
        self.fail_after = Some(n_frames);
        self
    }
}

impl TrajRead for VecTraj {
    fn next_frame(&mut self) -> Result<Option<Frame>, ReadTrajError> {
        if self.fail_after == Some(self.cursor) {
            return Err(ReadTrajError::ReadFailed("simulated failure".to_string()));
        }

        match self.frames.get(self.cursor) {
            Some(frame) => {
                self.cursor += 1;
                Ok(Some(frame.clone()))
            }
            None => Ok(None),
        }
    }

    fn frame_count(&self) -> Option<usize> {
        Some(self.frames.len())
    }
}

/// A chain of three water molecules in a 15-angstrom cubic cell.
///
/// The first water donates a perfectly linear hydrogen bond to the second
/// and the second donates one to the third; oxygen-oxygen distances along
/// the chain are 2.86 angstroms. Elements are not assigned.
pub(crate) fn water_chain_frame() -> Frame {
    let atoms = vec![
        atom_at("OW", 2.00, 2.00, 2.00),
        atom_at("HW1", 2.96, 2.00, 2.00),
        atom_at("HW2", 1.76, 2.93, 2.00),
        atom_at("OW", 4.86, 2.00, 2.00),
        atom_at("HW1", 5.82, 2.00, 2.00),
        atom_at("HW2", 4.62, 2.93, 2.00),
        atom_at("OW", 7.72, 2.00, 2.00),
        atom_at("HW1", 8.68, 2.00, 2.00),
        atom_at("HW2", 7.48, 2.93, 2.00),
    ];

    Frame::new(atoms, Some(Cell::cubic(15.0).unwrap()))
}
