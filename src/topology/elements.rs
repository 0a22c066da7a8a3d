// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the Elements table and element guessing.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::errors::ElementError;
use crate::structures::frame::Frame;

/// Properties of a single element.
#[derive(Debug, Clone, Deserialize)]
pub struct Element {
    /// Covalent radius of the element in angstroms.
    #[serde(default)]
    covalent: Option<f64>,
    /// Atomic mass of the element in amu (daltons).
    #[serde(default)]
    mass: Option<f64>,
}

impl Element {
    /// Get the covalent radius of the element in angstroms.
    #[inline]
    pub fn covalent(&self) -> Option<f64> {
        self.covalent
    }

    /// Get the atomic mass of the element in amu.
    #[inline]
    pub fn mass(&self) -> Option<f64> {
        self.mass
    }

    /// Update fields of `self` based on another `Element` structure.
    fn update(&mut self, element: Element) {
        if element.covalent.is_some() {
            self.covalent = element.covalent;
        }

        if element.mass.is_some() {
            self.mass = element.mass;
        }
    }
}

/// Table of all elements recognized by the library, keyed by element symbol.
#[derive(Debug, Clone)]
pub struct Elements {
    elements: IndexMap<String, Element>,
}

impl Default for Elements {
    /// Construct the default `Elements` table.
    ///
    /// ## Notes
    /// - This function parses YAML content from `src/config/elements.yaml`
    ///   which is included in the library at compile time.
    /// - This is a relatively slow operation and there is no reason to call
    ///   it multiple times in a program. If you need the table for multiple
    ///   analyses, clone it.
    fn default() -> Self {
        let yaml = include_str!("../config/elements.yaml");

        Elements::from_str(yaml)
            .expect("FATAL TRAJAN ERROR | Elements::default | Default `elements.yaml` file could not be read or parsed.")
    }
}

impl Elements {
    /// Construct a new `Elements` table from the provided YAML file.
    ///
    /// The file should map element symbols to their properties:
    /// ```yaml
    /// ---
    /// O:
    ///   covalent: 0.66
    ///   mass: 15.999
    /// ```
    /// All properties are optional.
    pub fn from_file(filename: impl AsRef<Path>) -> Result<Self, ElementError> {
        let mut yaml = String::new();
        File::open(&filename)
            .map_err(|_| ElementError::FileNotFound(Box::from(filename.as_ref())))?
            .read_to_string(&mut yaml)
            .map_err(|_| ElementError::FileNotFound(Box::from(filename.as_ref())))?;

        Elements::from_str(&yaml)
    }

    /// Parse a YAML string into an `Elements` table.
    fn from_str(yaml: &str) -> Result<Self, ElementError> {
        let elements: IndexMap<String, Element> =
            serde_yaml::from_str(yaml).map_err(ElementError::CouldNotParseYaml)?;

        Ok(Elements { elements })
    }

    /// Update the table using data from another `Elements` structure.
    /// Fields present in `other` overwrite fields of `self`; missing fields
    /// are kept.
    pub fn update(&mut self, other: Elements) {
        for (symbol, element) in other.elements {
            match self.elements.get_mut(&symbol) {
                Some(existing) => existing.update(element),
                None => {
                    self.elements.insert(symbol, element);
                }
            }
        }
    }

    /// Get the properties of an element by its symbol.
    #[inline]
    pub fn get(&self, symbol: &str) -> Option<&Element> {
        self.elements.get(symbol)
    }

    /// Get the covalent radius of an element in angstroms.
    #[inline]
    pub fn covalent_radius(&self, symbol: &str) -> Option<f64> {
        self.elements.get(symbol).and_then(|e| e.covalent)
    }

    /// Guess the element symbol corresponding to an atom name.
    ///
    /// Leading digits are stripped (`1HW2` → `HW2`) and the leading
    /// alphabetic run of the name is considered. A two-letter symbol is
    /// matched case-insensitively if the whole run is at most two letters
    /// (`CL` → `Cl`); otherwise the first letter decides (`HW1` → `H`).
    pub fn guess_symbol(&self, name: &str) -> Option<&str> {
        let run: String = name
            .chars()
            .skip_while(|c| !c.is_alphabetic())
            .take_while(|c| c.is_alphabetic())
            .collect();

        if run.is_empty() {
            return None;
        }

        if run.chars().count() <= 2 {
            let candidate = title_case(&run);
            if let Some((symbol, _)) = self.elements.get_key_value(candidate.as_str()) {
                return Some(symbol.as_str());
            }
        }

        let candidate: String = run.chars().take(1).map(|c| c.to_ascii_uppercase()).collect();
        self.elements
            .get_key_value(candidate.as_str())
            .map(|(symbol, _)| symbol.as_str())
    }

    /// Assign element symbols to all atoms of a frame which do not have an
    /// element assigned yet. Atoms with an already assigned element are not
    /// touched.
    ///
    /// ## Returns
    /// - `Ok` if every atom ended up with an element.
    /// - `ElementError::GuessWarning` listing the indices of atoms whose
    ///   element could not be guessed. This does not indicate failure:
    ///   all other atoms have been assigned an element.
    pub fn assign(&self, frame: &mut Frame) -> Result<(), ElementError> {
        let mut unknown = Vec::new();

        for index in 0..frame.n_atoms() {
            if frame.atoms()[index].element().is_some() {
                continue;
            }

            let name = frame.atoms()[index].name().clone();
            match self.guess_symbol(&name) {
                Some(symbol) => {
                    let symbol = symbol.to_owned();
                    frame.atoms_mut()[index].set_element(Some(symbol));
                }
                None => unknown.push(index),
            }
        }

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(ElementError::GuessWarning(unknown))
        }
    }
}

/// Uppercase the first character of a string, lowercase the rest.
fn title_case(string: &str) -> String {
    string
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if i == 0 {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

/******************************/
/*         UNIT TESTS         */
/******************************/
