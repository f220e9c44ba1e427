//! Camera state core and the Camera trait.
//!
//! Backend camera types compose a [`CameraCore`] (the shared state and
//! control-loop logic) and implement [`Camera`] by handing out
//! `core()`/`core_mut()`. The trait's provided methods carry all
//! backend-independent behavior; backends supply `init()` (create the render
//! target) and `render()` (fill it).
//!
//! The frame loop is synchronous and single-threaded per scene:
//! `pre_render() -> render() -> post_render()`, with `update()` as the
//! canonical per-frame entry point.

use std::sync::{Arc, Mutex, Weak};
use glam::{Mat4, Vec3};
use crate::error::Result;
use crate::image::{Image, PixelFormat};
use crate::log::LogSink;
use crate::scene::{Node, Pose, Scene, VisualId};
use crate::sink_error;
use crate::target::{RenderPass, RenderTarget};
use super::dispatcher::{Connection, Dispatcher};
use super::projection;

const SOURCE: &str = "spectra::Camera";

/// Image-frame listener: `(pixels, width, height, channels, format)`.
///
/// Invoked synchronously on the rendering thread whenever a new frame is
/// ready. Invocation order among listeners is unspecified.
pub type ImageFrameListener = dyn Fn(&[u8], u32, u32, u32, PixelFormat) + Send + Sync;

/// RAII subscription handle for image-frame listeners
pub type ImageFrameConnection = Connection<ImageFrameListener>;

/// Weak reference to a node the camera tracks or follows.
///
/// The camera only reads the target's world pose each `pre_render()`; a
/// target that has been dropped simply stops influencing the camera.
struct TargetBinding {
    node: Weak<dyn Node>,
    offset: Vec3,
    world_frame: bool,
}

impl TargetBinding {
    /// Resolve the bound point in world coordinates, if the node is alive.
    ///
    /// The offset is interpreted in the world frame or the target's local
    /// frame depending on `world_frame`.
    fn resolve(&self) -> Option<Vec3> {
        let node = self.node.upgrade()?;
        let pose = node.world_pose();
        if self.world_frame {
            Some(pose.position + self.offset)
        } else {
            Some(pose.transform_point(self.offset))
        }
    }
}

/// Shared camera state: render configuration, pose, tracking/following
/// bindings, frame listeners, and the exclusively-owned render target.
pub struct CameraCore {
    id: u64,
    name: String,
    log: LogSink,
    scene: Option<Weak<Mutex<dyn Scene>>>,
    pose: Pose,

    image_width: u32,
    image_height: u32,
    image_format: PixelFormat,
    hfov: f32,
    aspect_ratio: f32,
    near_clip: f32,
    far_clip: f32,
    anti_aliasing: u32,

    render_target: Option<Box<dyn RenderTarget>>,

    track: Option<TargetBinding>,
    follow: Option<TargetBinding>,
    track_p_gain: f32,
    follow_p_gain: f32,

    new_frame: Dispatcher<ImageFrameListener>,
    // Reused between frames so listener dispatch does not reallocate
    frame_scratch: Option<Image>,
}

impl CameraCore {
    /// Create an unloaded core. `Camera::load()` composes the defaults.
    pub fn new(id: u64, name: impl Into<String>, log: LogSink) -> Self {
        Self {
            id,
            name: name.into(),
            log,
            scene: None,
            pose: Pose::IDENTITY,
            image_width: 0,
            image_height: 0,
            image_format: PixelFormat::R8G8B8,
            hfov: 0.0,
            aspect_ratio: 0.0,
            near_clip: 0.0,
            far_clip: 0.0,
            anti_aliasing: 0,
            render_target: None,
            track: None,
            follow: None,
            track_p_gain: 1.0,
            follow_p_gain: 1.0,
            new_frame: Dispatcher::new(),
            frame_scratch: None,
        }
    }

    /// Compose backend-agnostic defaults.
    ///
    /// After this call `image_width`/`image_height` are positive,
    /// `near < far`, and `aspect_ratio()` is positive.
    pub fn reset(&mut self) {
        self.image_width = 640;
        self.image_height = 480;
        self.image_format = PixelFormat::R8G8B8;
        self.hfov = 1.047;
        self.aspect_ratio = 0.0;
        self.near_clip = 0.01;
        self.far_clip = 1000.0;
        self.anti_aliasing = 4;
        self.track_p_gain = 1.0;
        self.follow_p_gain = 1.0;
        self.sync_target();
    }

    /// Unique sensor id assigned by the factory
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Sensor name assigned by the factory
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logging sink this camera was constructed with
    pub fn log(&self) -> &LogSink {
        &self.log
    }

    // ===== SCENE =====

    /// Bind the scene whose `pre_render()` runs inside `update()`
    pub fn set_scene(&mut self, scene: Weak<Mutex<dyn Scene>>) {
        self.scene = Some(scene);
    }

    /// Run the bound scene's pre-render step, if the scene is still alive.
    pub fn scene_pre_render(&self) {
        let Some(scene) = self.scene.as_ref().and_then(Weak::upgrade) else {
            return;
        };
        match scene.lock() {
            Ok(mut scene) => scene.pre_render(),
            Err(_) => self
                .log
                .warn(SOURCE, "scene lock poisoned; skipping scene pre-render"),
        };
    }

    // ===== POSE =====

    /// World pose of the camera
    pub fn world_pose(&self) -> Pose {
        self.pose
    }

    /// Set the world pose of the camera
    pub fn set_world_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    /// World position of the camera
    pub fn world_position(&self) -> Vec3 {
        self.pose.position
    }

    /// Set the world position of the camera, keeping orientation
    pub fn set_world_position(&mut self, position: Vec3) {
        self.pose.position = position;
    }

    // ===== IMAGE CONFIGURATION =====

    /// Image width in pixels
    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    /// Set the image width, forwarding to the owned render target
    pub fn set_image_width(&mut self, width: u32) {
        self.image_width = width;
        if let Some(target) = self.render_target.as_mut() {
            target.set_width(width);
        }
    }

    /// Image height in pixels
    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    /// Set the image height, forwarding to the owned render target
    pub fn set_image_height(&mut self, height: u32) {
        self.image_height = height;
        if let Some(target) = self.render_target.as_mut() {
            target.set_height(height);
        }
    }

    /// Pixel format of captured frames
    pub fn image_format(&self) -> PixelFormat {
        self.image_format
    }

    /// Set the pixel format, forwarding to the owned render target
    pub fn set_image_format(&mut self, format: PixelFormat) {
        self.image_format = format;
        if let Some(target) = self.render_target.as_mut() {
            target.set_format(format);
        }
    }

    /// Size of one captured frame in bytes:
    /// `bytes_per_pixel(format) * width * height`
    pub fn image_memory_size(&self) -> usize {
        self.image_format.bytes_per_pixel() as usize
            * self.image_width as usize
            * self.image_height as usize
    }

    // ===== PROJECTION STATE =====

    /// Horizontal field of view in radians
    pub fn hfov(&self) -> f32 {
        self.hfov
    }

    /// Set the horizontal field of view in radians (no clamping)
    pub fn set_hfov(&mut self, hfov: f32) {
        self.hfov = hfov;
    }

    /// Aspect ratio. A stored value of zero means "derive from the image
    /// dimensions", which keeps the ratio positive without explicit setup.
    pub fn aspect_ratio(&self) -> f32 {
        if self.aspect_ratio > 0.0 {
            self.aspect_ratio
        } else if self.image_height > 0 {
            self.image_width as f32 / self.image_height as f32
        } else {
            1.0
        }
    }

    /// Set an explicit aspect ratio; zero restores derive-from-image
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.aspect_ratio = aspect;
    }

    /// Near clip plane distance
    pub fn near_clip_plane(&self) -> f32 {
        self.near_clip
    }

    /// Set the near clip plane distance (no clamping)
    pub fn set_near_clip_plane(&mut self, near: f32) {
        self.near_clip = near;
    }

    /// Far clip plane distance
    pub fn far_clip_plane(&self) -> f32 {
        self.far_clip
    }

    /// Set the far clip plane distance (no clamping)
    pub fn set_far_clip_plane(&mut self, far: f32) {
        self.far_clip = far;
    }

    /// Anti-aliasing sample count
    pub fn anti_aliasing(&self) -> u32 {
        self.anti_aliasing
    }

    /// Set the anti-aliasing sample count
    pub fn set_anti_aliasing(&mut self, samples: u32) {
        self.anti_aliasing = samples;
    }

    /// Perspective projection matrix for the current FOV, aspect ratio, and
    /// clip planes
    pub fn projection_matrix(&self) -> Mat4 {
        projection::perspective_matrix(
            self.hfov,
            self.aspect_ratio(),
            self.near_clip,
            self.far_clip,
        )
    }

    /// View matrix for the current world pose
    pub fn view_matrix(&self) -> Mat4 {
        projection::view_matrix(&self.pose)
    }

    // ===== RENDER TARGET =====

    /// Hand the exclusively-owned render target to the core.
    ///
    /// Called by the backend during `init()`. The current image
    /// configuration is pushed into the target.
    pub fn set_render_target(&mut self, target: Box<dyn RenderTarget>) {
        self.render_target = Some(target);
        self.sync_target();
    }

    /// The owned render target, if initialized
    pub fn render_target(&self) -> Option<&dyn RenderTarget> {
        self.render_target.as_deref()
    }

    /// Mutable access to the owned render target
    pub fn render_target_mut(&mut self) -> Option<&mut dyn RenderTarget> {
        self.render_target.as_deref_mut()
    }

    fn sync_target(&mut self) {
        if let Some(target) = self.render_target.as_mut() {
            target.set_width(self.image_width);
            target.set_height(self.image_height);
            target.set_format(self.image_format);
        }
    }

    // ===== TRACKING / FOLLOWING =====

    /// Rotate toward `target` each `pre_render()` without changing position.
    ///
    /// The look point is `target + offset`, with `offset` in the world frame
    /// or the target's local frame depending on `world_frame`. Passing `None`
    /// disables tracking.
    pub fn set_track_target(
        &mut self,
        target: Option<Arc<dyn Node>>,
        offset: Vec3,
        world_frame: bool,
    ) {
        self.track = target.map(|node| TargetBinding {
            node: Arc::downgrade(&node),
            offset,
            world_frame,
        });
    }

    /// True while a live track target is bound
    pub fn has_track_target(&self) -> bool {
        self.track
            .as_ref()
            .map(|binding| binding.node.strong_count() > 0)
            .unwrap_or(false)
    }

    /// Tracking proportional gain in [0, 1]
    pub fn track_p_gain(&self) -> f32 {
        self.track_p_gain
    }

    /// Set the tracking gain. Out-of-domain input is silently clamped into
    /// [0, 1]. The clamp is a documented contract, not an accident.
    pub fn set_track_p_gain(&mut self, gain: f32) {
        self.track_p_gain = gain.clamp(0.0, 1.0);
    }

    /// Translate toward `target + offset` each `pre_render()` without
    /// changing orientation. Passing `None` disables following.
    pub fn set_follow_target(
        &mut self,
        target: Option<Arc<dyn Node>>,
        offset: Vec3,
        world_frame: bool,
    ) {
        self.follow = target.map(|node| TargetBinding {
            node: Arc::downgrade(&node),
            offset,
            world_frame,
        });
    }

    /// True while a live follow target is bound
    pub fn has_follow_target(&self) -> bool {
        self.follow
            .as_ref()
            .map(|binding| binding.node.strong_count() > 0)
            .unwrap_or(false)
    }

    /// Following proportional gain in [0, 1]
    pub fn follow_p_gain(&self) -> f32 {
        self.follow_p_gain
    }

    /// Set the following gain. Out-of-domain input is silently clamped into
    /// [0, 1].
    pub fn set_follow_p_gain(&mut self, gain: f32) {
        self.follow_p_gain = gain.clamp(0.0, 1.0);
    }

    fn update_follow(&mut self) {
        let Some(desired) = self.follow.as_ref().and_then(TargetBinding::resolve) else {
            return;
        };
        let current = self.pose.position;
        self.pose.position = current + (desired - current) * self.follow_p_gain;
    }

    fn update_track(&mut self) {
        let Some(point) = self.track.as_ref().and_then(TargetBinding::resolve) else {
            return;
        };
        let desired = projection::look_at_rotation(self.pose.position, point);
        self.pose.rotation = if self.track_p_gain >= 1.0 {
            desired
        } else {
            self.pose.rotation.slerp(desired, self.track_p_gain)
        };
    }

    // ===== FRAME LOOP =====

    /// Per-frame step before the backend renders: target pre-render, then
    /// the follow translation, then the track rotation.
    pub fn pre_render(&mut self) {
        if let Some(target) = self.render_target.as_mut() {
            target.pre_render();
        }
        self.update_follow();
        self.update_track();
    }

    /// Per-frame step after the backend renders: flush the target and notify
    /// frame listeners.
    pub fn post_render(&mut self) {
        if let Some(target) = self.render_target.as_mut() {
            target.post_render();
        }
        self.dispatch_new_frame();
    }

    fn dispatch_new_frame(&mut self) {
        if !self.new_frame.has_listeners() {
            return;
        }
        let Some(target) = self.render_target.as_ref() else {
            return;
        };

        let mut image = match self.frame_scratch.take() {
            Some(image)
                if image.width() == target.width()
                    && image.height() == target.height()
                    && image.format() == target.format() =>
            {
                image
            }
            _ => Image::new(target.width(), target.height(), target.format()),
        };

        if let Err(err) = target.copy(&mut image) {
            self.log
                .warn(SOURCE, format!("skipping frame dispatch, copy failed: {}", err));
            return;
        }

        let format = image.format();
        self.new_frame.for_each(|listener| {
            listener(
                image.data(),
                image.width(),
                image.height(),
                format.channel_count(),
                format,
            )
        });
        self.frame_scratch = Some(image);
    }

    /// Copy the rendered frame into `image`.
    ///
    /// Silently returns if no render target exists; callers that need
    /// failure visibility must check for a target themselves.
    pub fn copy_to(&self, image: &mut Image) {
        let Some(target) = self.render_target.as_ref() else {
            return;
        };
        if let Err(err) = target.copy(image) {
            self.log.warn(SOURCE, format!("frame copy failed: {}", err));
        }
    }

    /// Allocate an image matching the current width/height/format.
    ///
    /// No pixel data is copied.
    pub fn create_image(&self) -> Image {
        Image::new(self.image_width, self.image_height, self.image_format)
    }

    /// Register an image-frame listener
    pub fn connect_new_image_frame(&self, listener: Arc<ImageFrameListener>) -> ImageFrameConnection {
        self.new_frame.connect(listener)
    }

    // ===== RENDER PASS DELEGATION =====

    /// Append a render pass to the target's list
    pub fn add_render_pass(&mut self, pass: Arc<dyn RenderPass>) {
        match self.render_target.as_mut() {
            Some(target) => target.add_render_pass(pass),
            None => sink_error!(self.log, SOURCE, "add_render_pass: no render target"),
        }
    }

    /// Remove a render pass from the target's list
    pub fn remove_render_pass(&mut self, pass: &Arc<dyn RenderPass>) {
        match self.render_target.as_mut() {
            Some(target) => target.remove_render_pass(pass),
            None => sink_error!(self.log, SOURCE, "remove_render_pass: no render target"),
        }
    }

    /// Number of render passes attached to the target
    pub fn render_pass_count(&self) -> usize {
        self.render_target
            .as_ref()
            .map(|target| target.render_pass_count())
            .unwrap_or(0)
    }

    /// Render pass at `index` in the target's list
    pub fn render_pass_by_index(&self, index: usize) -> Option<Arc<dyn RenderPass>> {
        self.render_target
            .as_ref()
            .and_then(|target| target.render_pass_by_index(index))
    }
}

/// The camera sensor interface.
///
/// Backends implement `core()`/`core_mut()` plus the two hooks (`init()`,
/// `render()`); everything else is provided on top of [`CameraCore`].
/// Capabilities not every backend has (`visual_at`, `save_frame`,
/// `set_material`) default to logged failure rather than panicking, so
/// generic code can call them uniformly.
pub trait Camera: Send {
    /// Shared camera state
    fn core(&self) -> &CameraCore;

    /// Shared camera state, mutable
    fn core_mut(&mut self) -> &mut CameraCore;

    /// Backend init phase: create the render target and any backend
    /// resources. Runs after `load()`.
    fn init(&mut self) -> Result<()>;

    /// Render one frame into the target (backend hook)
    fn render(&mut self);

    // ===== TWO-PHASE INIT =====

    /// Load phase: compose backend-agnostic defaults
    fn load(&mut self) -> Result<()> {
        self.core_mut().reset();
        Ok(())
    }

    // ===== FRAME LOOP =====

    /// Update tracking/following transforms and render-target state.
    /// Call once per frame before the scene renders.
    fn pre_render(&mut self) {
        self.core_mut().pre_render();
    }

    /// Flush the render target and notify frame listeners
    fn post_render(&mut self) {
        self.core_mut().post_render();
    }

    /// Canonical per-frame entry point:
    /// scene pre-render, then `render()`, then `post_render()`.
    fn update(&mut self) {
        self.core().scene_pre_render();
        self.render();
        self.post_render();
    }

    /// `update()` then copy the new frame into `image`
    fn capture(&mut self, image: &mut Image) {
        self.update();
        self.copy_to(image);
    }

    /// Copy the most recent frame into `image`.
    /// Silently returns if no render target exists.
    fn copy_to(&self, image: &mut Image) {
        self.core().copy_to(image);
    }

    /// Allocate an image matching the camera's dimensions and format
    fn create_image(&self) -> Image {
        self.core().create_image()
    }

    // ===== IDENTITY =====

    /// Unique sensor id
    fn id(&self) -> u64 {
        self.core().id()
    }

    /// Sensor name
    fn name(&self) -> &str {
        self.core().name()
    }

    // ===== IMAGE CONFIGURATION =====

    /// Image width in pixels
    fn image_width(&self) -> u32 {
        self.core().image_width()
    }

    /// Set the image width
    fn set_image_width(&mut self, width: u32) {
        self.core_mut().set_image_width(width);
    }

    /// Image height in pixels
    fn image_height(&self) -> u32 {
        self.core().image_height()
    }

    /// Set the image height
    fn set_image_height(&mut self, height: u32) {
        self.core_mut().set_image_height(height);
    }

    /// Pixel format of captured frames
    fn image_format(&self) -> PixelFormat {
        self.core().image_format()
    }

    /// Set the pixel format
    fn set_image_format(&mut self, format: PixelFormat) {
        self.core_mut().set_image_format(format);
    }

    /// Size of one captured frame in bytes
    fn image_memory_size(&self) -> usize {
        self.core().image_memory_size()
    }

    // ===== PROJECTION =====

    /// Horizontal field of view in radians
    fn hfov(&self) -> f32 {
        self.core().hfov()
    }

    /// Set the horizontal field of view in radians
    fn set_hfov(&mut self, hfov: f32) {
        self.core_mut().set_hfov(hfov);
    }

    /// Aspect ratio (explicit, or derived from the image dimensions)
    fn aspect_ratio(&self) -> f32 {
        self.core().aspect_ratio()
    }

    /// Set an explicit aspect ratio
    fn set_aspect_ratio(&mut self, aspect: f32) {
        self.core_mut().set_aspect_ratio(aspect);
    }

    /// Near clip plane distance
    fn near_clip_plane(&self) -> f32 {
        self.core().near_clip_plane()
    }

    /// Set the near clip plane distance
    fn set_near_clip_plane(&mut self, near: f32) {
        self.core_mut().set_near_clip_plane(near);
    }

    /// Far clip plane distance
    fn far_clip_plane(&self) -> f32 {
        self.core().far_clip_plane()
    }

    /// Set the far clip plane distance
    fn set_far_clip_plane(&mut self, far: f32) {
        self.core_mut().set_far_clip_plane(far);
    }

    /// Anti-aliasing sample count
    fn anti_aliasing(&self) -> u32 {
        self.core().anti_aliasing()
    }

    /// Set the anti-aliasing sample count
    fn set_anti_aliasing(&mut self, samples: u32) {
        self.core_mut().set_anti_aliasing(samples);
    }

    /// Perspective projection matrix
    fn projection_matrix(&self) -> Mat4 {
        self.core().projection_matrix()
    }

    /// View matrix for the current world pose
    fn view_matrix(&self) -> Mat4 {
        self.core().view_matrix()
    }

    // ===== POSE =====

    /// World pose of the camera
    fn world_pose(&self) -> Pose {
        self.core().world_pose()
    }

    /// Set the world pose of the camera
    fn set_world_pose(&mut self, pose: Pose) {
        self.core_mut().set_world_pose(pose);
    }

    /// World position of the camera
    fn world_position(&self) -> Vec3 {
        self.core().world_position()
    }

    /// Set the world position of the camera
    fn set_world_position(&mut self, position: Vec3) {
        self.core_mut().set_world_position(position);
    }

    // ===== TRACKING / FOLLOWING =====

    /// Set or clear the track target (rotate-to-face control loop)
    fn set_track_target(&mut self, target: Option<Arc<dyn Node>>, offset: Vec3, world_frame: bool) {
        self.core_mut().set_track_target(target, offset, world_frame);
    }

    /// Tracking proportional gain in [0, 1]
    fn track_p_gain(&self) -> f32 {
        self.core().track_p_gain()
    }

    /// Set the tracking gain (silently clamped into [0, 1])
    fn set_track_p_gain(&mut self, gain: f32) {
        self.core_mut().set_track_p_gain(gain);
    }

    /// Set or clear the follow target (translate-to-offset control loop)
    fn set_follow_target(&mut self, target: Option<Arc<dyn Node>>, offset: Vec3, world_frame: bool) {
        self.core_mut().set_follow_target(target, offset, world_frame);
    }

    /// Following proportional gain in [0, 1]
    fn follow_p_gain(&self) -> f32 {
        self.core().follow_p_gain()
    }

    /// Set the following gain (silently clamped into [0, 1])
    fn set_follow_p_gain(&mut self, gain: f32) {
        self.core_mut().set_follow_p_gain(gain);
    }

    // ===== LISTENERS =====

    /// Register an image-frame listener; the connection unsubscribes on drop
    fn connect_new_image_frame(&self, listener: Arc<ImageFrameListener>) -> ImageFrameConnection {
        self.core().connect_new_image_frame(listener)
    }

    // ===== RENDER PASSES =====

    /// Append a render pass to the target's list
    fn add_render_pass(&mut self, pass: Arc<dyn RenderPass>) {
        self.core_mut().add_render_pass(pass);
    }

    /// Remove a render pass from the target's list
    fn remove_render_pass(&mut self, pass: &Arc<dyn RenderPass>) {
        self.core_mut().remove_render_pass(pass);
    }

    /// Number of render passes attached to the target
    fn render_pass_count(&self) -> usize {
        self.core().render_pass_count()
    }

    /// Render pass at `index` in the target's list
    fn render_pass_by_index(&self, index: usize) -> Option<Arc<dyn RenderPass>> {
        self.core().render_pass_by_index(index)
    }

    // ===== OPTIONAL CAPABILITIES =====

    /// Visual under the given screen position.
    ///
    /// Requires backend-specific picking; the default reports failure.
    fn visual_at(&self, screen_x: u32, screen_y: u32) -> Option<VisualId> {
        sink_error!(
            self.core().log(),
            SOURCE,
            "visual_at({}, {}): picking is not supported by this backend",
            screen_x,
            screen_y
        );
        None
    }

    /// Write the most recent frame to `path`.
    ///
    /// The default reports failure (not supported by this backend).
    fn save_frame(&self, path: &str) -> bool {
        sink_error!(
            self.core().log(),
            SOURCE,
            "save_frame('{}'): not supported by this backend",
            path
        );
        false
    }

    /// Apply a material override to everything this camera renders.
    ///
    /// The default is a logged no-op (not supported by this backend).
    fn set_material(&mut self, material_name: &str) {
        sink_error!(
            self.core().log(),
            SOURCE,
            "set_material('{}'): not supported by this backend",
            material_name
        );
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
