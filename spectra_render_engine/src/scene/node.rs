//! Scene node contract and rigid pose type
//!
//! World convention throughout the engine: Z-up, X-forward, right-handed.

use glam::{Quat, Vec3};

/// Rigid transform: world position plus orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// World position
    pub position: Vec3,
    /// World orientation
    pub rotation: Quat,
}

impl Pose {
    /// Identity pose (origin, no rotation)
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Create a pose from position and rotation
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Create a pose from a position with identity rotation
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Transform a local-frame point into the world frame.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.position
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A node in the scene graph, as seen by a camera.
///
/// Cameras hold weak references to their track/follow targets and only ever
/// read the target's world pose during `pre_render()`; the node is never
/// mutated through this trait.
pub trait Node: Send + Sync {
    /// World pose of the node
    fn world_pose(&self) -> Pose;

    /// World position of the node
    fn world_position(&self) -> Vec3 {
        self.world_pose().position
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
