// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the Atom structure and its methods.

use getset::{Getters, Setters};

use crate::structures::vector3d::Vector3D;

/// A single atom record of a trajectory frame.
#[derive(Debug, Clone, Getters, Setters)]
pub struct Atom {
    /// Name of the atom (e.g. `OW`, `HW1`).
    #[getset(get = "pub")]
    name: String,
    /// Element symbol of the atom (e.g. `O`), if known.
    #[getset(get = "pub")]
    element: Option<String>,
    /// Position of the atom in space.
    #[getset(get = "pub", set = "pub")]
    position: Vector3D,
}

impl Atom {
    /// Create a new atom with no element assigned.
    pub fn new(name: &str, position: Vector3D) -> Self {
        Atom {
            name: name.to_owned(),
            element: None,
            position,
        }
    }

    /// Assign an element symbol to the atom, builder-style.
    ///
    /// ## Example
    /// ```
    /// # use trajan_rs::prelude::*;
    /// #
    /// let atom = Atom::new("OW", Vector3D::new(1.0, 2.0, 3.0)).with_element("O");
    /// assert_eq!(atom.element().as_deref(), Some("O"));
    /// ```
    pub fn with_element(mut self, element: &str) -> Self {
        self.element = Some(element.to_owned());
        self
    }

    /// Set the element symbol of the atom.
    pub fn set_element(&mut self, element: Option<String>) {
        self.element = element;
    }

    /// Returns `true` if the atom is a hydrogen.
    /// Decided from the element symbol if assigned, otherwise from the atom name.
    pub fn is_hydrogen(&self) -> bool {
        match &self.element {
            Some(element) => element == "H",
            None => {
                // first alphabetic character of the name decides
                self.name
                    .chars()
                    .find(|c| c.is_alphabetic())
                    .map(|c| c.eq_ignore_ascii_case(&'h'))
                    .unwrap_or(false)
            }
        }
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
