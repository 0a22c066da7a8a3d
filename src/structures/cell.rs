// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the periodic cell and minimum-image geometry.

use nalgebra::Matrix3;

use crate::errors::CellError;
use crate::structures::vector3d::Vector3D;

/// Periodic simulation cell. Columns of the matrix are the cell vectors.
///
/// Distances and displacements calculated with a `Cell` use the
/// minimum-image convention. Orthorhombic cells use a fast component-wise
/// path; general triclinic cells are resolved through the cell matrix.
#[derive(Debug, Clone)]
pub struct Cell {
    matrix: Matrix3<f64>,
    inverse: Matrix3<f64>,
    orthorhombic: bool,
}

impl Cell {
    /// Create a cubic cell with the given edge length.
    ///
    /// ## Returns
    /// `CellError::InvalidLength` if the length is not positive.
    pub fn cubic(length: f64) -> Result<Self, CellError> {
        Cell::orthorhombic(length, length, length)
    }

    /// Create an orthorhombic cell from three edge lengths.
    ///
    /// ## Returns
    /// `CellError::InvalidLength` if any of the lengths is not positive.
    pub fn orthorhombic(a: f64, b: f64, c: f64) -> Result<Self, CellError> {
        for length in [a, b, c] {
            if length <= 0.0 || !length.is_finite() {
                return Err(CellError::InvalidLength(length));
            }
        }

        let matrix = Matrix3::from_diagonal(&nalgebra::Vector3::new(a, b, c));
        let inverse = Matrix3::from_diagonal(&nalgebra::Vector3::new(1.0 / a, 1.0 / b, 1.0 / c));

        Ok(Cell {
            matrix,
            inverse,
            orthorhombic: true,
        })
    }

    /// Create a cell from lengths and angles (angles in degrees).
    /// Angles are expected in the order (α, β, γ) where α is the angle
    /// between the b and c vectors, β between a and c, and γ between a and b.
    ///
    /// ## Returns
    /// - `CellError::InvalidLength` if any length is not positive.
    /// - `CellError::InvalidAngle` if any angle lies outside (0°, 180°).
    ///
    /// ## Example
    /// ```
    /// # use trajan_rs::prelude::*;
    /// # use float_cmp::assert_approx_eq;
    /// #
    /// let cell = Cell::from_lengths_angles([5.0, 4.0, 3.0], [80.0, 70.0, 120.0]).unwrap();
    /// let lengths = cell.lengths();
    ///
    /// assert_approx_eq!(f64, lengths[0], 5.0, epsilon = 1e-10);
    /// assert_approx_eq!(f64, lengths[1], 4.0, epsilon = 1e-10);
    /// assert_approx_eq!(f64, lengths[2], 3.0, epsilon = 1e-10);
    /// ```
    ///
    /// ## Notes
    /// - Adapted from Tsjerk Wassenaar's `triclinic` function:
    ///   <https://www.mail-archive.com/gmx-users@gromacs.org/msg28032.html>
    pub fn from_lengths_angles(lengths: [f64; 3], angles: [f64; 3]) -> Result<Self, CellError> {
        for length in lengths {
            if length <= 0.0 || !length.is_finite() {
                return Err(CellError::InvalidLength(length));
            }
        }

        for angle in angles {
            if angle <= 0.0 || angle >= 180.0 || !angle.is_finite() {
                return Err(CellError::InvalidAngle(angle));
            }
        }

        if angles == [90.0, 90.0, 90.0] {
            return Cell::orthorhombic(lengths[0], lengths[1], lengths[2]);
        }

        let alpha = angles[0].to_radians();
        let beta = angles[1].to_radians();
        let gamma = angles[2].to_radians();

        let v2x = lengths[1] * gamma.cos();
        let v2y = lengths[1] * gamma.sin();

        let v3x = lengths[2] * beta.cos();
        let v3y = lengths[2] * (alpha.cos() - beta.cos() * gamma.cos()) / gamma.sin();
        let v3z = (lengths[2] * lengths[2] - v3x * v3x - v3y * v3y).sqrt();

        let matrix = Matrix3::new(
            lengths[0], v2x, v3x, //
            0.0, v2y, v3y, //
            0.0, 0.0, v3z,
        );

        Cell::from_matrix(matrix)
    }

    /// Create a cell from a general cell matrix with cell vectors as columns.
    ///
    /// ## Returns
    /// `CellError::NotInvertible` if the matrix is singular or its
    /// determinant is not positive.
    pub fn from_matrix(matrix: Matrix3<f64>) -> Result<Self, CellError> {
        if matrix.determinant() <= 0.0 || !matrix.determinant().is_finite() {
            return Err(CellError::NotInvertible);
        }

        let inverse = matrix.try_inverse().ok_or(CellError::NotInvertible)?;

        let orthorhombic = matrix.m12 == 0.0
            && matrix.m13 == 0.0
            && matrix.m21 == 0.0
            && matrix.m23 == 0.0
            && matrix.m31 == 0.0
            && matrix.m32 == 0.0;

        Ok(Cell {
            matrix,
            inverse,
            orthorhombic,
        })
    }

    /// Check whether the cell is orthorhombic.
    #[inline]
    pub fn is_orthorhombic(&self) -> bool {
        self.orthorhombic
    }

    /// Get the cell matrix. Columns are the cell vectors.
    #[inline]
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Calculate the volume of the cell.
    #[inline]
    pub fn volume(&self) -> f64 {
        self.matrix.determinant()
    }

    /// Calculate the lengths of the three cell vectors.
    pub fn lengths(&self) -> [f64; 3] {
        [
            self.matrix.column(0).magnitude(),
            self.matrix.column(1).magnitude(),
            self.matrix.column(2).magnitude(),
        ]
    }

    /// Calculate the cell angles (α, β, γ) in degrees.
    pub fn angles(&self) -> [f64; 3] {
        let a = self.matrix.column(0).into_owned();
        let b = self.matrix.column(1).into_owned();
        let c = self.matrix.column(2).into_owned();

        let angle = |u: &nalgebra::Vector3<f64>, v: &nalgebra::Vector3<f64>| {
            (u.dot(v) / (u.magnitude() * v.magnitude()))
                .clamp(-1.0, 1.0)
                .acos()
                .to_degrees()
        };

        [angle(&b, &c), angle(&a, &c), angle(&a, &b)]
    }

    /// Extent of the cell along a unit direction, i.e. the width of the
    /// support of the cell projected onto the direction.
    pub fn extent_along(&self, direction: &Vector3D) -> f64 {
        (0..3)
            .map(|i| {
                let column = self.matrix.column(i);
                (direction.x * column[0] + direction.y * column[1] + direction.z * column[2]).abs()
            })
            .sum()
    }

    /// Apply the minimum-image convention to a displacement vector.
    pub fn wrap_displacement(&self, displacement: &Vector3D) -> Vector3D {
        if self.orthorhombic {
            Vector3D::new(
                min_image(displacement.x, self.matrix.m11),
                min_image(displacement.y, self.matrix.m22),
                min_image(displacement.z, self.matrix.m33),
            )
        } else {
            // resolve through fractional coordinates for a general cell
            let mut fractional = self.inverse * displacement.0;
            fractional.x -= fractional.x.round();
            fractional.y -= fractional.y.round();
            fractional.z -= fractional.z.round();
            Vector3D(self.matrix * fractional)
        }
    }

    /// Wrap a position into the primary cell image.
    pub fn wrap_position(&self, position: &Vector3D) -> Vector3D {
        let mut fractional = self.inverse * position.0;
        fractional.x -= fractional.x.floor();
        fractional.y -= fractional.y.floor();
        fractional.z -= fractional.z.floor();
        Vector3D(self.matrix * fractional)
    }
}

/// Takes a single coordinate of a displacement and returns a new coordinate
/// modified according to the minimum image convention.
///
/// ## Panics
/// Panics if `box_len` is exactly equal to zero.
fn min_image(dx: f64, box_len: f64) -> f64 {
    if box_len == 0.0 {
        panic!("FATAL TRAJAN ERROR | cell::min_image | Box len should not be zero.")
    }

    let half_box = box_len / 2.0;
    let mut new_dx = dx;

    while new_dx > half_box {
        new_dx -= box_len;
    }

    while new_dx < -half_box {
        new_dx += box_len;
    }

    new_dx
}

/// Calculate the shortest vector from point `a` to point `b`.
/// Takes periodic boundary conditions into consideration if a cell is provided.
///
/// ## Example
/// ```
/// # use trajan_rs::prelude::*;
/// # use trajan_rs::structures::cell::displacement;
/// # use float_cmp::assert_approx_eq;
/// #
/// let cell = Cell::cubic(10.0).unwrap();
/// let a = Vector3D::new(1.0, 5.0, 5.0);
/// let b = Vector3D::new(9.0, 5.0, 5.0);
///
/// let shift = displacement(Some(&cell), &a, &b);
/// assert_approx_eq!(f64, shift.x, -2.0);
/// ```
#[inline]
pub fn displacement(cell: Option<&Cell>, a: &Vector3D, b: &Vector3D) -> Vector3D {
    let raw = *b - *a;
    match cell {
        Some(cell) => cell.wrap_displacement(&raw),
        None => raw,
    }
}

/// Calculate the minimum-image distance between two points.
/// Plain Euclidean distance is used if no cell is provided.
#[inline]
pub fn distance(cell: Option<&Cell>, a: &Vector3D, b: &Vector3D) -> f64 {
    displacement(cell, a, b).len()
}

/// Calculate the angle a–b–c at the vertex `b`. Returns degrees in [0, 180].
///
/// ## Notes
/// - Both arms of the angle are minimum-image displacements if a cell is provided.
/// - Returns 0 if either arm of the angle has zero length.
pub fn angle(cell: Option<&Cell>, a: &Vector3D, b: &Vector3D, c: &Vector3D) -> f64 {
    let ba = displacement(cell, b, a);
    let bc = displacement(cell, b, c);

    if ba.is_zero() || bc.is_zero() {
        return 0.0;
    }

    ba.angle(&bc).to_degrees()
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn cubic() {
        let cell = Cell::cubic(15.0).unwrap();
        assert!(cell.is_orthorhombic());
        assert_approx_eq!(f64, cell.volume(), 3375.0);
        assert_eq!(cell.lengths(), [15.0, 15.0, 15.0]);
        for angle in cell.angles() {
            assert_approx_eq!(f64, angle, 90.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn cubic_invalid() {
        assert!(matches!(Cell::cubic(0.0), Err(CellError::InvalidLength(_))));
        assert!(matches!(Cell::cubic(-3.0), Err(CellError::InvalidLength(_))));
    }

    #[test]
    fn from_lengths_angles_orthorhombic() {
        let cell = Cell::from_lengths_angles([5.297, 4.863, 2.976], [90.0, 90.0, 90.0]).unwrap();

        assert!(cell.is_orthorhombic());
        assert_approx_eq!(f64, cell.matrix().m11, 5.297);
        assert_approx_eq!(f64, cell.matrix().m22, 4.863);
        assert_approx_eq!(f64, cell.matrix().m33, 2.976);
    }

    #[test]
    fn from_lengths_angles_triclinic() {
        let cell = Cell::from_lengths_angles([5.297, 4.863, 2.976], [120.0, 70.0, 80.0]).unwrap();

        assert!(!cell.is_orthorhombic());

        let lengths = cell.lengths();
        assert_approx_eq!(f64, lengths[0], 5.297, epsilon = 1e-10);
        assert_approx_eq!(f64, lengths[1], 4.863, epsilon = 1e-10);
        assert_approx_eq!(f64, lengths[2], 2.976, epsilon = 1e-10);

        let angles = cell.angles();
        assert_approx_eq!(f64, angles[0], 120.0, epsilon = 1e-8);
        assert_approx_eq!(f64, angles[1], 70.0, epsilon = 1e-8);
        assert_approx_eq!(f64, angles[2], 80.0, epsilon = 1e-8);
    }

    #[test]
    fn from_lengths_angles_invalid_angle() {
        assert!(matches!(
            Cell::from_lengths_angles([5.0, 5.0, 5.0], [90.0, 180.0, 90.0]),
            Err(CellError::InvalidAngle(_))
        ));
        assert!(matches!(
            Cell::from_lengths_angles([5.0, 5.0, 5.0], [0.0, 90.0, 90.0]),
            Err(CellError::InvalidAngle(_))
        ));
    }

    #[test]
    fn from_matrix_singular() {
        let matrix = Matrix3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0);
        assert!(matches!(
            Cell::from_matrix(matrix),
            Err(CellError::NotInvertible)
        ));
    }

    #[test]
    fn wrap_displacement_orthorhombic() {
        let cell = Cell::cubic(4.0).unwrap();

        let wrapped = cell.wrap_displacement(&Vector3D::new(2.5, -3.8, 0.4));
        assert_approx_eq!(f64, wrapped.x, -1.5, epsilon = 1e-12);
        assert_approx_eq!(f64, wrapped.y, 0.2, epsilon = 1e-12);
        assert_approx_eq!(f64, wrapped.z, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn wrap_displacement_triclinic() {
        let cell = Cell::from_lengths_angles([10.0, 10.0, 10.0], [90.0, 90.0, 60.0]).unwrap();

        // displacement of one full b-vector must wrap to zero
        let b = Vector3D::new(cell.matrix().m12, cell.matrix().m22, 0.0);
        let wrapped = cell.wrap_displacement(&b);

        assert_approx_eq!(f64, wrapped.len(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn wrap_position() {
        let cell = Cell::cubic(2.0).unwrap();

        let wrapped = cell.wrap_position(&Vector3D::new(-54.2, 77.8, 124.5));
        assert_approx_eq!(f64, wrapped.x, 1.8, epsilon = 1e-9);
        assert_approx_eq!(f64, wrapped.y, 1.8, epsilon = 1e-9);
        assert_approx_eq!(f64, wrapped.z, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn distance_minimum_image() {
        let cell = Cell::cubic(4.0).unwrap();
        let a = Vector3D::new(0.5, 2.0, 2.0);
        let b = Vector3D::new(3.5, 2.0, 2.0);

        assert_approx_eq!(f64, distance(Some(&cell), &a, &b), 1.0, epsilon = 1e-12);
        assert_approx_eq!(f64, distance(None, &a, &b), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn displacement_no_cell() {
        let a = Vector3D::new(1.0, 2.0, 3.0);
        let b = Vector3D::new(4.0, 0.0, 3.0);

        let shift = displacement(None, &a, &b);
        assert_eq!(shift, Vector3D::new(3.0, -2.0, 0.0));
    }

    #[test]
    fn angle_right() {
        let a = Vector3D::new(1.0, 0.0, 0.0);
        let b = Vector3D::new(0.0, 0.0, 0.0);
        let c = Vector3D::new(0.0, 1.0, 0.0);

        assert_approx_eq!(f64, angle(None, &a, &b, &c), 90.0);
    }

    #[test]
    fn angle_linear() {
        let a = Vector3D::new(-1.0, 0.0, 0.0);
        let b = Vector3D::new(0.0, 0.0, 0.0);
        let c = Vector3D::new(2.0, 0.0, 0.0);

        assert_approx_eq!(f64, angle(None, &a, &b, &c), 180.0);
    }

    #[test]
    fn angle_degenerate() {
        let a = Vector3D::new(1.0, 0.0, 0.0);
        let b = Vector3D::new(1.0, 0.0, 0.0);
        let c = Vector3D::new(0.0, 1.0, 0.0);

        assert_approx_eq!(f64, angle(None, &a, &b, &c), 0.0);
    }

    #[test]
    fn angle_across_boundary() {
        let cell = Cell::cubic(10.0).unwrap();
        let a = Vector3D::new(9.5, 5.0, 5.0);
        let b = Vector3D::new(0.5, 5.0, 5.0);
        let c = Vector3D::new(0.5, 6.0, 5.0);

        // the a-b arm crosses the boundary; minimum image keeps the angle at 90 degrees
        assert_approx_eq!(f64, angle(Some(&cell), &a, &b, &c), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn extent_along_axis() {
        let cell = Cell::orthorhombic(3.0, 4.0, 5.0).unwrap();

        assert_approx_eq!(f64, cell.extent_along(&Vector3D::new(1.0, 0.0, 0.0)), 3.0);
        assert_approx_eq!(f64, cell.extent_along(&Vector3D::new(0.0, 0.0, 1.0)), 5.0);
    }
}
