//! `hearth-perception` – What the assistant can see.
//!
//! Defines the boundary to the perception collaborators and turns their
//! output into a [`PerceptualContext`][hearth_types::PerceptualContext] once
//! per turn. No detection model lives here; drivers plug one in.
//!
//! # Modules
//!
//! - [`camera`] – [`Camera`][camera::Camera] trait and
//!   [`CameraFrame`][camera::CameraFrame] for image-capture devices.
//! - [`detector`] – [`ObjectDetector`][detector::ObjectDetector] trait plus
//!   [`ScriptedDetector`][detector::ScriptedDetector], which reports an
//!   operator-supplied label list.
//! - [`source`] – [`PerceptionSource`][source::PerceptionSource]: either a
//!   camera + detector pair or the image-upload flag of a form front end.

pub mod camera;
pub mod detector;
pub mod source;

pub use camera::{Camera, CameraFrame, NullCamera};
pub use detector::{ObjectDetector, ScriptedDetector};
pub use source::PerceptionSource;
