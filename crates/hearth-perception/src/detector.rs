//! Object detection boundary.
//!
//! A detector turns one [`CameraFrame`] into the labels of the objects it
//! found, one entry per detection. Repeats are expected (two cats → two
//! `"cat"` entries); de-duplication happens when the prompt is composed.

use hearth_types::HearthError;

use crate::camera::CameraFrame;

/// Anything that can label the objects in a frame.
pub trait ObjectDetector: Send {
    /// Short model name used in logs, e.g. `"yolov8n"`.
    fn name(&self) -> &str;

    /// Return one label per detection in `frame` (possibly empty).
    ///
    /// # Errors
    ///
    /// Returns [`HearthError::Perception`] if inference fails.
    fn detect(&mut self, frame: &CameraFrame) -> Result<Vec<String>, HearthError>;
}

/// Detector that reports a fixed, operator-supplied label list.
///
/// Useful for terminal sessions without a camera and for tests. The frame is
/// ignored.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDetector {
    labels: Vec<String>,
}

impl ScriptedDetector {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a comma-separated list such as `"cat, dog,cup"`.
    ///
    /// Blank entries are skipped.
    pub fn from_csv(csv: &str) -> Self {
        Self::new(
            csv.split(',')
                .map(str::trim)
                .filter(|l| !l.is_empty()),
        )
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl ObjectDetector for ScriptedDetector {
    fn name(&self) -> &str {
        "scripted"
    }

    fn detect(&mut self, _frame: &CameraFrame) -> Result<Vec<String>, HearthError> {
        Ok(self.labels.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_detector_reports_its_labels() {
        let mut det = ScriptedDetector::new(["cat", "cat", "dog"]);
        let labels = det.detect(&CameraFrame::default()).unwrap();
        assert_eq!(labels, ["cat", "cat", "dog"]);
    }

    #[test]
    fn from_csv_trims_and_skips_blanks() {
        let det = ScriptedDetector::from_csv(" cat, dog ,, cup ,");
        assert_eq!(det.labels(), ["cat", "dog", "cup"]);
    }

    #[test]
    fn from_empty_csv_sees_nothing() {
        let mut det = ScriptedDetector::from_csv("   ");
        assert!(det.detect(&CameraFrame::default()).unwrap().is_empty());
    }

    #[test]
    fn scripted_detector_name() {
        assert_eq!(ScriptedDetector::default().name(), "scripted");
    }
}
