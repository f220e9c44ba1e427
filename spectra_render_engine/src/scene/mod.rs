//! Scene-side contracts consumed by cameras
//!
//! The camera layer never owns or mutates the scene graph. It reads target
//! node poses for tracking/following and asks the scene to pre-render once
//! per frame. The visual/geometry/material object model lives behind the
//! backend; only the surfaces below cross into this crate.

mod node;
mod scene;

pub use node::{Node, Pose};
pub use scene::{Scene, VisualId};
