// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Trajectory source interface and the analysis driver.

use crate::errors::{AnalysisError, ReadTrajError, WindowError};
use crate::structures::frame::Frame;
use crate::topology::bonds::{self, DEFAULT_BOND_TOLERANCE};
use crate::topology::elements::Elements;

/// Interface to an external trajectory source.
///
/// Parsing of trajectory file formats is intentionally not part of this
/// library; any reader producing [`Frame`] structures one at a time can
/// drive the analyses.
pub trait TrajRead {
    /// Read the next frame of the trajectory.
    ///
    /// ## Returns
    /// - `Ok(Some(frame))` if a frame was read.
    /// - `Ok(None)` at the end of the trajectory.
    /// - `Err` if the frame could not be read. This aborts the analysis.
    fn next_frame(&mut self) -> Result<Option<Frame>, ReadTrajError>;

    /// Total number of frames of the trajectory, if the source knows it
    /// upfront. Some sources cannot report this.
    fn frame_count(&self) -> Option<usize> {
        None
    }

    /// Skip the next frame without fully reading it. Sources that support
    /// cheap seeking should override this method.
    ///
    /// ## Returns
    /// - `Ok(true)` if a frame was skipped.
    /// - `Ok(false)` at the end of the trajectory.
    fn skip_frame(&mut self) -> Result<bool, ReadTrajError> {
        match self.next_frame() {
            Ok(frame) => Ok(frame.is_some()),
            Err(ReadTrajError::ReadFailed(e)) => Err(ReadTrajError::SkipFailed(e)),
            Err(e) => Err(e),
        }
    }
}

/// Restriction of an analysis to a subset of trajectory frames.
///
/// The window never reorders frames: it only decides which frames are fed
/// to the analysis. Frame indices are 0-based; `stop` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameWindow {
    start: usize,
    stop: Option<usize>,
    step: usize,
}

impl Default for FrameWindow {
    /// Create a window covering every frame of the trajectory.
    fn default() -> Self {
        FrameWindow {
            start: 0,
            stop: None,
            step: 1,
        }
    }
}

impl FrameWindow {
    /// Create a new frame window.
    ///
    /// ## Returns
    /// - `WindowError::InvalidStep` if the step is zero.
    /// - `WindowError::InvalidRange` if `start` exceeds `stop`.
    pub fn new(start: usize, stop: Option<usize>, step: usize) -> Result<Self, WindowError> {
        if step == 0 {
            return Err(WindowError::InvalidStep);
        }

        if let Some(stop) = stop {
            if start > stop {
                return Err(WindowError::InvalidRange(start, stop));
            }
        }

        Ok(FrameWindow { start, stop, step })
    }

    /// Parse a frame window from a `start:stop:step` string.
    /// All three fields are optional; empty fields keep their defaults
    /// (start 0, no stop, step 1).
    ///
    /// ## Example
    /// ```
    /// # use trajan_rs::analysis::traj::FrameWindow;
    /// #
    /// assert_eq!(FrameWindow::parse("50").unwrap(), FrameWindow::new(50, None, 1).unwrap());
    /// assert_eq!(FrameWindow::parse("50:100").unwrap(), FrameWindow::new(50, Some(100), 1).unwrap());
    /// assert_eq!(FrameWindow::parse("::2").unwrap(), FrameWindow::new(0, None, 2).unwrap());
    /// ```
    pub fn parse(string: &str) -> Result<Self, WindowError> {
        let fields: Vec<&str> = string.split(':').collect();
        if fields.len() > 3 {
            return Err(WindowError::CouldNotParse(string.to_string()));
        }

        let parse_field = |field: Option<&&str>| -> Result<Option<usize>, WindowError> {
            match field {
                None => Ok(None),
                Some(s) if s.trim().is_empty() => Ok(None),
                Some(s) => s
                    .trim()
                    .parse::<usize>()
                    .map(Some)
                    .map_err(|_| WindowError::CouldNotParse(string.to_string())),
            }
        };

        let start = parse_field(fields.first())?.unwrap_or(0);
        let stop = parse_field(fields.get(1))?;
        let step = parse_field(fields.get(2))?.unwrap_or(1);

        FrameWindow::new(start, stop, step)
    }

    /// Get the index of the first frame of the window.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Get the exclusive end of the window, if any.
    #[inline]
    pub fn stop(&self) -> Option<usize> {
        self.stop
    }

    /// Get the stride of the window.
    #[inline]
    pub fn step(&self) -> usize {
        self.step
    }

    /// Check whether the frame with the given index belongs to the window.
    pub fn contains(&self, index: usize) -> bool {
        if index < self.start || self.ended(index) {
            return false;
        }

        (index - self.start) % self.step == 0
    }

    /// Check whether the window ends at or before the given frame index.
    pub fn ended(&self, index: usize) -> bool {
        match self.stop {
            Some(stop) => index >= stop,
            None => false,
        }
    }
}

/// A streaming analysis consuming trajectory frames.
///
/// Frames are provided strictly in trajectory order, once each. Mutable
/// state of the analysis is scoped to a single run; `finish` consumes the
/// analysis and performs the final normalization.
pub trait Analysis {
    /// Result type produced when the analysis is finished.
    type Output;

    /// Process a single trajectory frame.
    fn process_frame(&mut self, frame: &Frame) -> Result<(), AnalysisError>;

    /// Finish the analysis, converting accumulated counts into the final
    /// physical quantities.
    fn finish(self) -> Result<Self::Output, AnalysisError>;
}

/// Driver feeding trajectory frames to an analysis.
///
/// The runner handles the frame window and, optionally, per-frame bond
/// guessing. Bond guessing assigns elements to atoms that lack them (using
/// the configured [`Elements`] table) and attaches a freshly built bond
/// graph to every processed frame, so dynamic topologies stay correct when
/// bonds break or reform during the trajectory.
#[derive(Debug, Clone)]
pub struct AnalysisRunner {
    window: FrameWindow,
    guess_bonds: bool,
    bond_tolerance: f64,
    elements: Elements,
}

impl Default for AnalysisRunner {
    fn default() -> Self {
        AnalysisRunner::new()
    }
}

impl AnalysisRunner {
    /// Create a runner processing every frame, with bond guessing disabled.
    pub fn new() -> Self {
        AnalysisRunner {
            window: FrameWindow::default(),
            guess_bonds: false,
            bond_tolerance: DEFAULT_BOND_TOLERANCE,
            elements: Elements::default(),
        }
    }

    /// Restrict the runner to a frame window.
    pub fn with_window(mut self, window: FrameWindow) -> Self {
        self.window = window;
        self
    }

    /// Enable per-frame bond guessing with the given tolerance factor.
    pub fn with_bond_guessing(mut self, tolerance: f64) -> Self {
        self.guess_bonds = true;
        self.bond_tolerance = tolerance;
        self
    }

    /// Use a custom element table for bond guessing.
    pub fn with_elements(mut self, elements: Elements) -> Self {
        self.elements = elements;
        self
    }

    /// Feed the frames of a trajectory source to an analysis.
    ///
    /// ## Returns
    /// - The number of frames processed.
    /// - `AnalysisError` if the source fails or the analysis rejects a
    ///   frame. Errors raised while processing a frame carry the index of
    ///   the offending frame.
    pub fn run<A: Analysis>(
        &self,
        source: &mut dyn TrajRead,
        analysis: &mut A,
    ) -> Result<usize, AnalysisError> {
        let mut index = 0;
        let mut processed = 0;

        loop {
            if self.window.ended(index) {
                break;
            }

            if !self.window.contains(index) {
                if !source.skip_frame()? {
                    break;
                }
                index += 1;
                continue;
            }

            let Some(mut frame) = source.next_frame()? else {
                break;
            };

            if self.guess_bonds {
                // atoms with unguessable elements are reported by `guess_bonds`
                let _ = self.elements.assign(&mut frame);

                let graph = bonds::guess_bonds(&frame, &self.elements, self.bond_tolerance)
                    .map_err(|e| AnalysisError::Frame {
                        index,
                        source: Box::new(e.into()),
                    })?;
                frame.set_bonds(graph);
            }

            analysis
                .process_frame(&frame)
                .map_err(|e| AnalysisError::Frame {
                    index,
                    source: Box::new(e),
                })?;

            processed += 1;
            index += 1;
        }

        Ok(processed)
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utilities::{atom_at, VecTraj};

    #[test]
    fn window_parse() {
        assert_eq!(FrameWindow::parse("").unwrap(), FrameWindow::default());
        assert_eq!(
            FrameWindow::parse("5").unwrap(),
            FrameWindow::new(5, None, 1).unwrap()
        );
        assert_eq!(
            FrameWindow::parse("5:20").unwrap(),
            FrameWindow::new(5, Some(20), 1).unwrap()
        );
        assert_eq!(
            FrameWindow::parse("5:20:3").unwrap(),
            FrameWindow::new(5, Some(20), 3).unwrap()
        );
        assert_eq!(
            FrameWindow::parse(":20").unwrap(),
            FrameWindow::new(0, Some(20), 1).unwrap()
        );
        assert_eq!(
            FrameWindow::parse("::2").unwrap(),
            FrameWindow::new(0, None, 2).unwrap()
        );
    }

    #[test]
    fn window_parse_invalid() {
        assert!(matches!(
            FrameWindow::parse("a:b"),
            Err(WindowError::CouldNotParse(_))
        ));
        assert!(matches!(
            FrameWindow::parse("1:2:3:4"),
            Err(WindowError::CouldNotParse(_))
        ));
        assert!(matches!(
            FrameWindow::parse("::0"),
            Err(WindowError::InvalidStep)
        ));
        assert!(matches!(
            FrameWindow::parse("10:5"),
            Err(WindowError::InvalidRange(10, 5))
        ));
    }

    #[test]
    fn window_contains() {
        let window = FrameWindow::new(2, Some(10), 3).unwrap();

        assert!(!window.contains(0));
        assert!(!window.contains(1));
        assert!(window.contains(2));
        assert!(!window.contains(3));
        assert!(window.contains(5));
        assert!(window.contains(8));
        assert!(!window.contains(10));
        assert!(!window.contains(11));
    }

    /// Analysis recording the number of atoms of each processed frame.
    struct CountingAnalysis {
        counts: Vec<usize>,
    }

    impl Analysis for CountingAnalysis {
        type Output = Vec<usize>;

        fn process_frame(&mut self, frame: &Frame) -> Result<(), AnalysisError> {
            self.counts.push(frame.n_atoms());
            Ok(())
        }

        fn finish(self) -> Result<Vec<usize>, AnalysisError> {
            Ok(self.counts)
        }
    }

    /// Ten frames, frame `i` contains `i + 1` atoms.
    fn counting_source() -> VecTraj {
        VecTraj::new(
            (0..10)
                .map(|i| Frame::new((0..=i).map(|a| atom_at("X", a as f64, 0.0, 0.0)).collect(), None))
                .collect(),
        )
    }

    #[test]
    fn runner_processes_all_frames() {
        let mut analysis = CountingAnalysis { counts: Vec::new() };
        let processed = AnalysisRunner::new()
            .run(&mut counting_source(), &mut analysis)
            .unwrap();

        assert_eq!(processed, 10);
        assert_eq!(analysis.finish().unwrap(), (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn runner_respects_window() {
        let mut analysis = CountingAnalysis { counts: Vec::new() };
        let processed = AnalysisRunner::new()
            .with_window(FrameWindow::new(2, Some(9), 3).unwrap())
            .run(&mut counting_source(), &mut analysis)
            .unwrap();

        assert_eq!(processed, 3);
        assert_eq!(analysis.finish().unwrap(), vec![3, 6, 9]);
    }

    #[test]
    fn runner_window_beyond_end() {
        let mut analysis = CountingAnalysis { counts: Vec::new() };
        let processed = AnalysisRunner::new()
            .with_window(FrameWindow::new(8, Some(100), 1).unwrap())
            .run(&mut counting_source(), &mut analysis)
            .unwrap();

        assert_eq!(processed, 2);
        assert_eq!(analysis.finish().unwrap(), vec![9, 10]);
    }

    #[test]
    fn runner_propagates_source_error() {
        let mut source = VecTraj::new(vec![Frame::new(Vec::new(), None)]).failing_after(0);
        let mut analysis = CountingAnalysis { counts: Vec::new() };

        assert!(matches!(
            AnalysisRunner::new().run(&mut source, &mut analysis),
            Err(AnalysisError::Traj(_))
        ));
    }
}
