//! Bounding-box detection camera.
//!
//! Extends the camera with a typed object-detection output: once per
//! detection pass the backend replaces the box vector wholesale and notifies
//! subscribers. Boxes carry a semantic label and, for the 3D variant, an
//! orientation.

use std::sync::Arc;
use glam::{Quat, Vec3};
use super::camera::Camera;
use super::dispatcher::{Connection, Dispatcher};

/// Bounding-box listener, invoked with the full box vector of a detection
/// pass.
pub type BoundingBoxListener = dyn Fn(&[BoundingBox]) + Send + Sync;

/// RAII subscription handle for bounding-box listeners
pub type BoundingBoxConnection = Connection<BoundingBoxListener>;

/// A detected object box.
///
/// 2D variants use screen-space center/size with identity orientation; the
/// 3D variant is an oriented box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Box center (screen space for 2D variants, world space for 3D)
    pub center: Vec3,
    /// Box extents along each axis
    pub size: Vec3,
    /// Box orientation (identity for 2D variants)
    pub orientation: Quat,
    /// Semantic label of the detected object
    pub label: u32,
}

impl BoundingBox {
    /// Create an axis-aligned box with the given label
    pub fn new(center: Vec3, size: Vec3, label: u32) -> Self {
        Self {
            center,
            size,
            orientation: Quat::IDENTITY,
            label,
        }
    }

    /// Create an oriented 3D box with the given label
    pub fn oriented(center: Vec3, size: Vec3, orientation: Quat, label: u32) -> Self {
        Self {
            center,
            size,
            orientation,
            label,
        }
    }
}

/// Detection variant: how the backend computes box extents and occlusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundingBoxType {
    /// 2D box around the full object, including occluded and off-screen
    /// parts
    FullBox2D,
    /// 2D box around only the visible portion of the object
    VisibleBox2D,
    /// Oriented 3D box in world space
    Box3D,
}

/// Shared detection state: the selected variant, the most recent box
/// vector, and the subscriber registry.
pub struct BoundingBoxCameraCore {
    box_type: BoundingBoxType,
    boxes: Vec<BoundingBox>,
    new_boxes: Dispatcher<BoundingBoxListener>,
}

impl BoundingBoxCameraCore {
    /// Create a core defaulting to full 2D boxes
    pub fn new() -> Self {
        Self {
            box_type: BoundingBoxType::FullBox2D,
            boxes: Vec::new(),
            new_boxes: Dispatcher::new(),
        }
    }

    /// Selected detection variant
    pub fn box_type(&self) -> BoundingBoxType {
        self.box_type
    }

    /// Select the detection variant
    pub fn set_box_type(&mut self, box_type: BoundingBoxType) {
        self.box_type = box_type;
    }

    /// The most recently computed boxes
    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    /// Replace the box vector wholesale (one detection pass)
    pub fn set_boxes(&mut self, boxes: Vec<BoundingBox>) {
        self.boxes = boxes;
    }

    /// Register a bounding-box listener
    pub fn connect_new_bounding_boxes(
        &self,
        listener: Arc<BoundingBoxListener>,
    ) -> BoundingBoxConnection {
        self.new_boxes.connect(listener)
    }

    /// Notify subscribers with the current box vector.
    ///
    /// Called by the backend after each detection pass.
    pub fn dispatch_boxes(&self) {
        if !self.new_boxes.has_listeners() {
            return;
        }
        self.new_boxes.for_each(|listener| listener(&self.boxes));
    }
}

impl Default for BoundingBoxCameraCore {
    fn default() -> Self {
        Self::new()
    }
}

/// The detection-camera interface: a [`Camera`] with typed bounding-box
/// output.
pub trait BoundingBoxCamera: Camera {
    /// Shared detection state
    fn boxes_core(&self) -> &BoundingBoxCameraCore;

    /// Shared detection state, mutable
    fn boxes_core_mut(&mut self) -> &mut BoundingBoxCameraCore;

    /// Rasterize a box outline into a caller-provided pixel buffer.
    ///
    /// `buffer` holds one frame in the camera's image format; the backend
    /// decides line placement and thickness.
    fn draw_bounding_box(&self, buffer: &mut [u8], color: [u8; 3], bounding_box: &BoundingBox);

    /// Boxes from the most recent detection pass (overwritten wholesale
    /// each pass)
    fn bounding_box_data(&self) -> &[BoundingBox] {
        self.boxes_core().boxes()
    }

    /// Selected detection variant
    fn bounding_box_type(&self) -> BoundingBoxType {
        self.boxes_core().box_type()
    }

    /// Select the detection variant
    fn set_bounding_box_type(&mut self, box_type: BoundingBoxType) {
        self.boxes_core_mut().set_box_type(box_type);
    }

    /// Register a bounding-box listener; the connection unsubscribes on drop
    fn connect_new_bounding_boxes(
        &self,
        listener: Arc<BoundingBoxListener>,
    ) -> BoundingBoxConnection {
        self.boxes_core().connect_new_bounding_boxes(listener)
    }
}

#[cfg(test)]
#[path = "bounding_box_camera_tests.rs"]
mod tests;
