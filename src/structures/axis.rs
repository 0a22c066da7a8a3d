// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the Axis structure used by density profiles.

use crate::errors::AxisError;
use crate::structures::vector3d::Vector3D;

/// A normalized direction in space onto which positions are projected.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    vector: Vector3D,
}

impl Axis {
    /// Create an axis from an arbitrary vector. The vector is normalized.
    ///
    /// ## Returns
    /// `AxisError::NullAxis` if the vector is a null vector.
    pub fn new(x: f64, y: f64, z: f64) -> Result<Self, AxisError> {
        let vector = Vector3D::new(x, y, z);
        if vector.is_zero() {
            return Err(AxisError::NullAxis);
        }

        Ok(Axis {
            vector: vector.to_unit(),
        })
    }

    /// Create an axis from a name (`x`, `y`, or `z`, case-insensitive).
    ///
    /// ## Returns
    /// `AxisError::UnknownName` if the name is not recognized.
    pub fn from_name(name: &str) -> Result<Self, AxisError> {
        match name {
            "X" | "x" => Axis::new(1.0, 0.0, 0.0),
            "Y" | "y" => Axis::new(0.0, 1.0, 0.0),
            "Z" | "z" => Axis::new(0.0, 0.0, 1.0),
            _ => Err(AxisError::UnknownName(name.to_owned())),
        }
    }

    /// Parse an axis from a string. Accepts either an axis name (`x`, `y`, `z`)
    /// or three colon-separated coordinates (e.g. `1:1:0`).
    ///
    /// ## Example
    /// ```
    /// # use trajan_rs::structures::axis::Axis;
    /// #
    /// let axis = Axis::parse("z").unwrap();
    /// assert_eq!(axis, Axis::parse("0:0:1").unwrap());
    /// ```
    pub fn parse(string: &str) -> Result<Self, AxisError> {
        let fields: Vec<&str> = string.split(':').collect();

        match fields.len() {
            1 => Axis::from_name(string),
            3 => {
                let mut coordinates = [0.0; 3];
                for (i, field) in fields.iter().enumerate() {
                    coordinates[i] = field
                        .trim()
                        .parse::<f64>()
                        .map_err(|_| AxisError::CouldNotParse(string.to_owned()))?;
                }

                Axis::new(coordinates[0], coordinates[1], coordinates[2])
            }
            _ => Err(AxisError::CouldNotParse(string.to_owned())),
        }
    }

    /// Get the unit vector of the axis.
    #[inline]
    pub fn vector(&self) -> &Vector3D {
        &self.vector
    }

    /// Projection of a position onto the axis. May be negative.
    #[inline]
    pub fn projection(&self, position: &Vector3D) -> f64 {
        self.vector.dot(position)
    }

    /// Radial distance of a position from the axis line passing through the origin.
    #[inline]
    pub fn radial(&self, position: &Vector3D) -> f64 {
        let along = self.projection(position);
        // guard against tiny negative values from rounding
        (position.len_squared() - along * along).max(0.0).sqrt()
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
