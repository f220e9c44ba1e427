//! Headless scene: node registry, analytic sensor content, and the sensor
//! factory.
//!
//! The scene holds no real geometry. Ray sensors scan analytic sphere
//! obstacles; detection cameras read labeled boxes. That keeps every sensor
//! output exactly computable, which is the point of this backend.

use std::sync::{Arc, Mutex, Weak};
use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;
use spectra_render_engine::spectra::{Error, Result};
use spectra_render_engine::camera::Camera;
use spectra_render_engine::log::LogSink;
use spectra_render_engine::scene::{Node, Pose, Scene};
use crate::headless_camera::HeadlessCamera;
use crate::headless_gpu_rays::HeadlessGpuRays;
use crate::headless_bounding_box_camera::HeadlessBoundingBoxCamera;

/// A scene node with a settable pose.
///
/// Sensors bind these as track/follow targets; test code moves them between
/// frames.
pub struct HeadlessNode {
    name: String,
    pose: Mutex<Pose>,
}

impl HeadlessNode {
    fn new(name: &str, pose: Pose) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            pose: Mutex::new(pose),
        })
    }

    /// Node name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the node's world pose
    pub fn set_pose(&self, pose: Pose) {
        if let Ok(mut current) = self.pose.lock() {
            *current = pose;
        }
    }

    /// Move the node, keeping its orientation
    pub fn set_position(&self, position: Vec3) {
        if let Ok(mut current) = self.pose.lock() {
            current.position = position;
        }
    }
}

impl Node for HeadlessNode {
    fn world_pose(&self) -> Pose {
        self.pose.lock().map(|pose| *pose).unwrap_or_default()
    }
}

/// Analytic sphere scanned by ray sensors.
#[derive(Debug, Clone, Copy)]
pub struct SphereObstacle {
    /// Sphere center in world coordinates
    pub center: Vec3,
    /// Sphere radius
    pub radius: f32,
    /// Retro-reflectivity reported for rays hitting this sphere
    pub retro: f32,
}

/// Labeled world-space box detected by bounding-box cameras.
#[derive(Debug, Clone, Copy)]
pub struct LabeledBox {
    /// Box center in world coordinates
    pub center: Vec3,
    /// Box extents
    pub size: Vec3,
    /// Box orientation
    pub orientation: Quat,
    /// Semantic label
    pub label: u32,
}

impl LabeledBox {
    /// Create an axis-aligned labeled box
    pub fn new(center: Vec3, size: Vec3, label: u32) -> Self {
        Self {
            center,
            size,
            orientation: Quat::IDENTITY,
            label,
        }
    }
}

/// The headless scene.
///
/// Created behind `Arc<Mutex<...>>`; sensors keep a weak handle and the
/// factory methods run the two-phase `load()` → `init()` contract before
/// returning a usable sensor.
pub struct HeadlessScene {
    id: u64,
    name: String,
    log: LogSink,
    background: [u8; 3],
    nodes: FxHashMap<String, Arc<HeadlessNode>>,
    obstacles: Vec<SphereObstacle>,
    labeled_boxes: Vec<LabeledBox>,
    next_sensor_id: u64,
    frame: u64,
}

impl HeadlessScene {
    /// Create a scene handle
    pub fn new(id: u64, name: &str, log: LogSink) -> Arc<Mutex<Self>> {
        log.info(
            "spectra::headless::Scene",
            format!("scene '{}' created", name),
        );
        Arc::new(Mutex::new(Self {
            id,
            name: name.to_string(),
            log,
            background: [0, 0, 0],
            nodes: FxHashMap::default(),
            obstacles: Vec::new(),
            labeled_boxes: Vec::new(),
            next_sensor_id: 1,
            frame: 0,
        }))
    }

    /// Background color rendered by color cameras
    pub fn background(&self) -> [u8; 3] {
        self.background
    }

    /// Set the background color
    pub fn set_background(&mut self, color: [u8; 3]) {
        self.background = color;
    }

    /// Register a node. An existing node with the same name is replaced.
    pub fn create_node(scene: &Arc<Mutex<Self>>, name: &str, pose: Pose) -> Result<Arc<HeadlessNode>> {
        let mut guard = lock_scene(scene)?;
        let node = HeadlessNode::new(name, pose);
        guard.nodes.insert(name.to_string(), node.clone());
        Ok(node)
    }

    /// Look up a node by name
    pub fn node(&self, name: &str) -> Option<Arc<HeadlessNode>> {
        self.nodes.get(name).cloned()
    }

    /// Add a sphere obstacle for ray sensors
    pub fn add_obstacle(&mut self, obstacle: SphereObstacle) {
        self.obstacles.push(obstacle);
    }

    /// Sphere obstacles scanned by ray sensors
    pub fn obstacles(&self) -> &[SphereObstacle] {
        &self.obstacles
    }

    /// Add a labeled box for detection cameras
    pub fn add_labeled_box(&mut self, labeled_box: LabeledBox) {
        self.labeled_boxes.push(labeled_box);
    }

    /// Labeled boxes read by detection cameras
    pub fn labeled_boxes(&self) -> &[LabeledBox] {
        &self.labeled_boxes
    }

    /// Number of completed `pre_render()` calls
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    fn next_sensor_id(&mut self) -> u64 {
        let id = self.next_sensor_id;
        self.next_sensor_id += 1;
        id
    }

    // ===== SENSOR FACTORY =====

    /// Create a color camera: construct, `load()`, `init()`.
    pub fn create_camera(scene: &Arc<Mutex<Self>>, name: &str) -> Result<HeadlessCamera> {
        let (id, log) = {
            let mut guard = lock_scene(scene)?;
            (guard.next_sensor_id(), guard.log.clone())
        };
        let mut camera = HeadlessCamera::new(id, name, log, scene);
        camera.load()?;
        camera.init()?;
        Ok(camera)
    }

    /// Create a ray sensor: construct, `load()`, `init()`.
    ///
    /// `init()` validates the angle ranges, so an inverted configuration is
    /// surfaced here, not at render time.
    pub fn create_gpu_rays(
        scene: &Arc<Mutex<Self>>,
        name: &str,
        configure: impl FnOnce(&mut HeadlessGpuRays),
    ) -> Result<HeadlessGpuRays> {
        let (id, log) = {
            let mut guard = lock_scene(scene)?;
            (guard.next_sensor_id(), guard.log.clone())
        };
        let mut sensor = HeadlessGpuRays::new(id, name, log, scene);
        sensor.load()?;
        configure(&mut sensor);
        sensor.init()?;
        Ok(sensor)
    }

    /// Create a bounding-box detection camera: construct, `load()`, `init()`.
    pub fn create_bounding_box_camera(
        scene: &Arc<Mutex<Self>>,
        name: &str,
    ) -> Result<HeadlessBoundingBoxCamera> {
        let (id, log) = {
            let mut guard = lock_scene(scene)?;
            (guard.next_sensor_id(), guard.log.clone())
        };
        let mut camera = HeadlessBoundingBoxCamera::new(id, name, log, scene);
        camera.load()?;
        camera.init()?;
        Ok(camera)
    }
}

fn lock_scene(scene: &Arc<Mutex<HeadlessScene>>) -> Result<std::sync::MutexGuard<'_, HeadlessScene>> {
    scene
        .lock()
        .map_err(|_| Error::BackendError("scene lock poisoned".to_string()))
}

/// Downgrade a concrete scene handle to the trait-object handle cameras bind.
pub(crate) fn scene_handle(scene: &Arc<Mutex<HeadlessScene>>) -> Weak<Mutex<dyn Scene>> {
    let weak: Weak<Mutex<HeadlessScene>> = Arc::downgrade(scene);
    weak
}

impl Scene for HeadlessScene {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn pre_render(&mut self) {
        self.frame += 1;
    }
}
