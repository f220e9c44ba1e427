//! Camera sensors and their frame-loop contract
//!
//! The shared camera logic lives in composable cores ([`CameraCore`],
//! [`GpuRaysCore`], [`BoundingBoxCameraCore`]); backend sensor types hold a
//! core and implement the matching trait ([`Camera`], [`GpuRays`],
//! [`BoundingBoxCamera`]), whose provided methods carry all
//! backend-independent behavior.

mod bounding_box_camera;
mod camera;
mod dispatcher;
mod gpu_rays;
mod projection;

pub use bounding_box_camera::{
    BoundingBox, BoundingBoxCamera, BoundingBoxCameraCore, BoundingBoxConnection,
    BoundingBoxListener, BoundingBoxType,
};
pub use camera::{Camera, CameraCore, ImageFrameConnection, ImageFrameListener};
pub use dispatcher::{Connection, Dispatcher, ListenerKey};
pub use gpu_rays::{
    GpuRays, GpuRaysCore, GpuRaysFrameConnection, GpuRaysFrameListener, RAY_CHANNELS,
};
pub use projection::{look_at_rotation, perspective_matrix, view_matrix};
