//! Frame capture boundary for vision perception.
//!
//! A [`Camera`] hands frames to an object detector once per turn. Hearth
//! ships only [`NullCamera`]; real devices plug in behind the same trait.

use hearth_types::HearthError;

/// One captured frame. Empty when no device is attached.
#[derive(Debug, Clone, Default)]
pub struct CameraFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Raw pixel data (e.g. RGB24 or greyscale).
    pub data: Vec<u8>,
}

/// A camera or image-capture device.
pub trait Camera: Send {
    /// Identifier shown in `/status`, e.g. `"kitchen"`.
    fn id(&self) -> &str;

    /// Grab the frame for the current turn.
    ///
    /// # Errors
    ///
    /// Returns [`HearthError::Perception`] if the frame cannot be captured
    /// (e.g. the device is disconnected or busy).
    fn capture(&mut self) -> Result<CameraFrame, HearthError>;
}

/// Stand-in camera for drivers without a capture device.
///
/// Always yields an empty frame, which pairs with detectors that do not look
/// at pixels (such as [`ScriptedDetector`][crate::detector::ScriptedDetector]).
#[derive(Debug, Clone)]
pub struct NullCamera {
    id: String,
}

impl NullCamera {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Default for NullCamera {
    fn default() -> Self {
        Self::new("null")
    }
}

impl Camera for NullCamera {
    fn id(&self) -> &str {
        &self.id
    }

    fn capture(&mut self) -> Result<CameraFrame, HearthError> {
        Ok(CameraFrame::default())
    }
}
