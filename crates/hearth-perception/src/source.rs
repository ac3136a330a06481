//! [`PerceptionSource`] – one perceptual context per turn.
//!
//! # Example
//!
//! ```rust
//! use hearth_perception::{NullCamera, PerceptionSource, ScriptedDetector};
//! use hearth_types::PerceptualContext;
//!
//! let mut vision = PerceptionSource::vision(
//!     Box::new(NullCamera::default()),
//!     Box::new(ScriptedDetector::new(["cat", "dog"])),
//! );
//! assert_eq!(vision.observe().unwrap(), PerceptualContext::objects(["cat", "dog"]));
//!
//! let mut form = PerceptionSource::ImageForm { provided: false };
//! assert_eq!(form.observe().unwrap(), PerceptualContext::Image { provided: false });
//! ```

use hearth_types::{HearthError, PerceptualContext};
use tracing::debug;

use crate::camera::{Camera, NullCamera};
use crate::detector::{ObjectDetector, ScriptedDetector};

/// Where the current turn's perceptual context comes from.
pub enum PerceptionSource {
    /// Capture a frame and run the detector over it.
    Vision {
        camera: Box<dyn Camera>,
        detector: Box<dyn ObjectDetector>,
    },
    /// Form front end: only whether an image was attached is known.
    ImageForm { provided: bool },
}

impl PerceptionSource {
    pub fn vision(camera: Box<dyn Camera>, detector: Box<dyn ObjectDetector>) -> Self {
        PerceptionSource::Vision { camera, detector }
    }

    /// Vision source without a device, reporting `labels` every turn.
    pub fn scripted(detector: ScriptedDetector) -> Self {
        Self::vision(Box::new(NullCamera::default()), Box::new(detector))
    }

    /// Produce the context for the current turn.
    ///
    /// # Errors
    ///
    /// Propagates capture or detection failures from the collaborators.
    pub fn observe(&mut self) -> Result<PerceptualContext, HearthError> {
        match self {
            PerceptionSource::Vision { camera, detector } => {
                let frame = camera.capture()?;
                let labels = detector.detect(&frame)?;
                debug!(
                    camera = camera.id(),
                    detector = detector.name(),
                    detections = labels.len(),
                    "frame observed"
                );
                Ok(PerceptualContext::Objects(labels))
            }
            PerceptionSource::ImageForm { provided } => {
                Ok(PerceptualContext::Image { provided: *provided })
            }
        }
    }

    /// Short human-readable description for status output.
    pub fn describe(&self) -> String {
        match self {
            PerceptionSource::Vision { camera, detector } => {
                format!("camera `{}` + detector `{}`", camera.id(), detector.name())
            }
            PerceptionSource::ImageForm { provided: true } => "image form (image attached)".into(),
            PerceptionSource::ImageForm { provided: false } => "image form (no image)".into(),
        }
    }
}

impl Default for PerceptionSource {
    fn default() -> Self {
        Self::scripted(ScriptedDetector::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraFrame;

    struct UnpluggedCamera;

    impl Camera for UnpluggedCamera {
        fn id(&self) -> &str {
            "webcam0"
        }

        fn capture(&mut self) -> Result<CameraFrame, HearthError> {
            Err(HearthError::Perception {
                component: "webcam0".into(),
                details: "device not found".into(),
            })
        }
    }

    #[test]
    fn default_source_sees_nothing() {
        let mut src = PerceptionSource::default();
        assert_eq!(src.observe().unwrap(), PerceptualContext::nothing_seen());
    }

    #[test]
    fn scripted_source_reports_detections_with_repeats() {
        let mut src = PerceptionSource::scripted(ScriptedDetector::new(["cat", "cat"]));
        assert_eq!(src.observe().unwrap(), PerceptualContext::objects(["cat", "cat"]));
    }

    #[test]
    fn image_form_reports_flag() {
        let mut src = PerceptionSource::ImageForm { provided: true };
        assert_eq!(src.observe().unwrap(), PerceptualContext::Image { provided: true });
        assert!(src.describe().contains("attached"));
    }

    #[test]
    fn capture_failure_propagates() {
        let mut src = PerceptionSource::vision(
            Box::new(UnpluggedCamera),
            Box::new(ScriptedDetector::default()),
        );
        let err = src.observe().unwrap_err();
        assert!(err.to_string().contains("webcam0"));
    }

    #[test]
    fn describe_names_camera_and_detector() {
        let src = PerceptionSource::default();
        assert_eq!(src.describe(), "camera `null` + detector `scripted`");
    }
}
