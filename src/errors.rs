// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Error types that can be returned by the `trajan_rs` library.

use std::path::Path;
use thiserror::Error;

/// Errors that can occur when constructing a periodic cell.
#[derive(Error, Debug, PartialEq)]
pub enum CellError {
    #[error("Cell length `{0}` is not positive.")]
    InvalidLength(f64),
    #[error("Cell angle `{0}` does not lie in the open interval (0°, 180°).")]
    InvalidAngle(f64),
    #[error("Cell matrix is singular or does not have a positive determinant.")]
    NotInvertible,
}

/// Errors that can occur when constructing an axis.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AxisError {
    #[error("Axis must not be a null vector.")]
    NullAxis,
    #[error("`{0}` is not a recognized axis name. Use `x`, `y`, or `z`.")]
    UnknownName(String),
    #[error("Could not parse `{0}` as an axis. Use an axis name or three colon-separated coordinates.")]
    CouldNotParse(String),
}

/// Errors that can occur when constructing a histogram.
#[derive(Error, Debug, PartialEq)]
pub enum HistogramError {
    #[error("Histogram must have at least one bin.")]
    InvalidBinCount,
    #[error("Histogram range [{0}, {1}) is invalid.")]
    InvalidRange(f64, f64),
}

/// Errors that can occur when compiling or evaluating a selection query.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectError {
    #[error("Selection query is empty.")]
    EmptyQuery,
    #[error("Selection query `{0}` has unbalanced parentheses.")]
    InvalidParentheses(String),
    #[error("Selection query `{0}` has unbalanced quotes.")]
    InvalidQuotes(String),
    #[error("Selection query `{0}` contains an invalid operator.")]
    InvalidOperator(String),
    #[error("Selection query `{0}` is missing an argument of a binary operator.")]
    MissingArgument(String),
    #[error("Selection query `{0}` contains a keyword with no arguments.")]
    EmptyArgument(String),
    #[error("Could not parse `{0}` as a number or a number range.")]
    InvalidNumber(String),
    #[error("`{0}` is not a recognized selection keyword.")]
    UnknownKeyword(String),
    #[error("Token `{0}` is malformed.")]
    InvalidToken(String),
    #[error("Could not compile `{0}` as a regular expression.")]
    InvalidRegex(String),
    #[error("Token `{0}` carries an invalid role binding.")]
    InvalidRole(String),
    #[error("Selection query `{0}` must bind every predicate to a role (`#1`, `#2`, `#3`).")]
    MissingRole(String),
    #[error("Selection query `{query}` has arity {found} but arity {expected} is required.")]
    ArityMismatch {
        query: String,
        expected: usize,
        found: usize,
    },
    #[error("Selection arity must be 1, 2, or 3, got {0}.")]
    InvalidArity(usize),
    #[error("Selection references bonds but the frame has no bond topology.")]
    MissingBonds,
}

/// Errors that can occur when working with the element table.
#[derive(Error, Debug)]
pub enum ElementError {
    #[error("File `{0}` could not be read.")]
    FileNotFound(Box<Path>),
    #[error("Could not parse element table: {0}.")]
    CouldNotParseYaml(serde_yaml::Error),
    /// Elements could not be guessed for the listed atom indices.
    /// This is a warning: all other atoms have been assigned an element.
    #[error("Could not guess elements for {} atom(s).", .0.len())]
    GuessWarning(Vec<usize>),
}

/// Errors that can occur when working with bond topologies.
#[derive(Error, Debug, PartialEq)]
pub enum BondError {
    #[error("Atom index `{0}` does not exist in the frame.")]
    InvalidAtomIndex(usize),
    #[error("Atom `{0}` can not be bonded to itself.")]
    SelfBond(usize),
    #[error("Bond tolerance `{0}` is not positive.")]
    InvalidTolerance(f64),
}

/// Errors raised when a periodic feature is requested but no cell is available.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GeometryError {
    #[error("`{0}` requires a periodic cell but no frame provided one.")]
    MissingCell(String),
}

/// Errors propagated from an external trajectory source.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReadTrajError {
    #[error("Could not read trajectory frame: {0}.")]
    ReadFailed(String),
    #[error("Could not skip trajectory frame: {0}.")]
    SkipFailed(String),
}

/// Errors that can occur when specifying a frame window.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WindowError {
    #[error("Frame step must not be zero.")]
    InvalidStep,
    #[error("Frame window start `{0}` is larger than its end `{1}`.")]
    InvalidRange(usize, usize),
    #[error("Could not parse `{0}` as a frame window. Use `start:stop:step`.")]
    CouldNotParse(String),
}

/// Errors that can occur while running an analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("{0}")]
    Select(#[from] SelectError),
    #[error("{0}")]
    Histogram(#[from] HistogramError),
    #[error("{0}")]
    Bond(#[from] BondError),
    #[error("{0}")]
    Geometry(#[from] GeometryError),
    #[error("{0}")]
    Traj(#[from] ReadTrajError),
    #[error("{0}")]
    Window(#[from] WindowError),
    #[error("Error in frame {index}: {source}")]
    Frame {
        index: usize,
        #[source]
        source: Box<AnalysisError>,
    },
    #[error("Selection `{query}` matched {found} atoms in frame {frame} but {expected} atoms in the first frame.")]
    SelectionChanged {
        query: String,
        expected: usize,
        found: usize,
        frame: usize,
    },
    #[error("Analysis `{analysis}` can not use a selection of arity {arity}.")]
    UnsupportedArity {
        analysis: &'static str,
        arity: usize,
    },
    #[error("Frame carries no bond topology. Provide bonds in the trajectory source or enable bond guessing.")]
    MissingBonds,
    #[error("No frames were processed by the analysis.")]
    NoFrames,
}

/// Errors that can occur when writing an output table.
#[derive(Error, Debug)]
pub enum WriteTableError {
    #[error("Could not create the output file `{0}`.")]
    CouldNotCreate(Box<Path>),
    #[error("Could not write to the output file `{0}`.")]
    CouldNotWrite(Box<Path>),
}
