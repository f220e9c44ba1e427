//! GPU ray sensor: camera extended with angular ray geometry.
//!
//! A GpuRays sensor simulates range sensors (LIDAR) on top of the camera
//! frame loop. Instead of color pixels it produces `channels()` floats per
//! sample (depth, retro-reflectivity, and a reserved slot) across a
//! curvilinear grid defined by horizontal/vertical angle ranges, ray counts,
//! and fractional resolutions.

use std::sync::Arc;
use crate::error::{Error, Result};
use crate::image::PixelFormat;
use super::camera::Camera;
use super::dispatcher::{Connection, Dispatcher};

/// Floats per ray sample: depth, retro-reflectivity, reserved.
pub const RAY_CHANNELS: u32 = 3;

/// Ray-frame listener: `(frame, width, height, channels, format)`.
///
/// `width` is the horizontal range count, `height` the vertical range count.
pub type GpuRaysFrameListener = dyn Fn(&[f32], u32, u32, u32, PixelFormat) + Send + Sync;

/// RAII subscription handle for ray-frame listeners
pub type GpuRaysFrameConnection = Connection<GpuRaysFrameListener>;

/// Shared ray-sensor state: angle ranges, sample counts, resolutions, and
/// the out-of-range clamping policy.
pub struct GpuRaysCore {
    angle_min: f32,
    angle_max: f32,
    vertical_angle_min: f32,
    vertical_angle_max: f32,
    ray_count: u32,
    vertical_ray_count: u32,
    horizontal_resolution: f32,
    vertical_resolution: f32,
    vfov: f32,
    clamp: bool,
    data_min: f32,
    data_max: f32,
    channels: u32,
    new_frame: Dispatcher<GpuRaysFrameListener>,
}

impl GpuRaysCore {
    /// Create a core with scan defaults: a single centered ray, unit
    /// resolutions, unclamped reporting.
    pub fn new() -> Self {
        Self {
            angle_min: 0.0,
            angle_max: 0.0,
            vertical_angle_min: 0.0,
            vertical_angle_max: 0.0,
            ray_count: 1,
            vertical_ray_count: 1,
            horizontal_resolution: 1.0,
            vertical_resolution: 1.0,
            vfov: 0.0,
            clamp: false,
            data_min: f32::NEG_INFINITY,
            data_max: f32::INFINITY,
            channels: RAY_CHANNELS,
            new_frame: Dispatcher::new(),
        }
    }

    // ===== ANGLE RANGES =====

    /// Horizontal scan start angle in radians
    pub fn angle_min(&self) -> f32 {
        self.angle_min
    }

    /// Set the horizontal scan start angle.
    ///
    /// Stored raw; `min <= max` is validated at `init()` so the two setters
    /// may run in either order while configuring.
    pub fn set_angle_min(&mut self, angle: f32) {
        self.angle_min = angle;
    }

    /// Horizontal scan end angle in radians
    pub fn angle_max(&self) -> f32 {
        self.angle_max
    }

    /// Set the horizontal scan end angle (stored raw, validated at `init()`)
    pub fn set_angle_max(&mut self, angle: f32) {
        self.angle_max = angle;
    }

    /// Vertical scan start angle in radians
    pub fn vertical_angle_min(&self) -> f32 {
        self.vertical_angle_min
    }

    /// Set the vertical scan start angle (stored raw, validated at `init()`)
    pub fn set_vertical_angle_min(&mut self, angle: f32) {
        self.vertical_angle_min = angle;
    }

    /// Vertical scan end angle in radians
    pub fn vertical_angle_max(&self) -> f32 {
        self.vertical_angle_max
    }

    /// Set the vertical scan end angle (stored raw, validated at `init()`)
    pub fn set_vertical_angle_max(&mut self, angle: f32) {
        self.vertical_angle_max = angle;
    }

    /// Reject inverted angle ranges.
    ///
    /// An inverted range is an explicit precondition violation, not a scan
    /// configuration the sensor attempts to interpret.
    ///
    /// # Errors
    ///
    /// Returns `InvalidResource` if `angle_min > angle_max` on either axis.
    pub fn validate_ranges(&self) -> Result<()> {
        if self.angle_min > self.angle_max {
            return Err(Error::InvalidResource(format!(
                "inverted horizontal angle range: min {} > max {}",
                self.angle_min, self.angle_max
            )));
        }
        if self.vertical_angle_min > self.vertical_angle_max {
            return Err(Error::InvalidResource(format!(
                "inverted vertical angle range: min {} > max {}",
                self.vertical_angle_min, self.vertical_angle_max
            )));
        }
        Ok(())
    }

    // ===== SAMPLE COUNTS =====

    /// Horizontal ray count
    pub fn ray_count(&self) -> u32 {
        self.ray_count
    }

    /// Set the horizontal ray count
    pub fn set_ray_count(&mut self, count: u32) {
        self.ray_count = count;
    }

    /// Vertical ray count
    pub fn vertical_ray_count(&self) -> u32 {
        self.vertical_ray_count
    }

    /// Set the vertical ray count
    pub fn set_vertical_ray_count(&mut self, count: u32) {
        self.vertical_ray_count = count;
    }

    /// Horizontal resolution multiplier
    pub fn horizontal_resolution(&self) -> f32 {
        self.horizontal_resolution
    }

    /// Set the horizontal resolution multiplier.
    ///
    /// Negative input is silently sign-flipped (`abs`), not rejected.
    pub fn set_horizontal_resolution(&mut self, resolution: f32) {
        self.horizontal_resolution = resolution.abs();
    }

    /// Vertical resolution multiplier
    pub fn vertical_resolution(&self) -> f32 {
        self.vertical_resolution
    }

    /// Set the vertical resolution multiplier (silently sign-flipped)
    pub fn set_vertical_resolution(&mut self, resolution: f32) {
        self.vertical_resolution = resolution.abs();
    }

    /// Number of horizontal range samples:
    /// `ray_count * horizontal_resolution`, truncated toward zero.
    ///
    /// Truncation (not rounding) is part of the sensor output contract.
    pub fn range_count(&self) -> u32 {
        (f64::from(self.ray_count) * f64::from(self.horizontal_resolution)) as u32
    }

    /// Number of vertical range samples:
    /// `vertical_ray_count * vertical_resolution`, truncated toward zero.
    pub fn vertical_range_count(&self) -> u32 {
        (f64::from(self.vertical_ray_count) * f64::from(self.vertical_resolution)) as u32
    }

    // ===== CLAMP POLICY =====

    /// Set how out-of-range returns are reported.
    ///
    /// Clamped: returns below the near clip report `near`, beyond the far
    /// clip report `far`. Unclamped: they report -inf / +inf. Repeated
    /// identical calls are idempotent.
    pub fn set_clamp(&mut self, clamp: bool, near_clip: f32, far_clip: f32) {
        self.clamp = clamp;
        if clamp {
            self.data_min = near_clip;
            self.data_max = far_clip;
        } else {
            self.data_min = f32::NEG_INFINITY;
            self.data_max = f32::INFINITY;
        }
    }

    /// True if out-of-range returns are clamped to the clip planes
    pub fn clamp_enabled(&self) -> bool {
        self.clamp
    }

    /// Reported value for returns below the minimum range
    pub fn data_min(&self) -> f32 {
        self.data_min
    }

    /// Reported value for returns beyond the maximum range
    pub fn data_max(&self) -> f32 {
        self.data_max
    }

    // ===== CHANNELS / VFOV =====

    /// Floats per ray sample (depth, retro, reserved)
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Vertical field of view in radians, derived by the backend from the
    /// vertical angle range
    pub fn vfov(&self) -> f32 {
        self.vfov
    }

    /// Set the vertical field of view in radians
    pub fn set_vfov(&mut self, vfov: f32) {
        self.vfov = vfov;
    }

    // ===== LISTENERS =====

    /// Register a ray-frame listener
    pub fn connect_new_gpu_rays_frame(
        &self,
        listener: Arc<GpuRaysFrameListener>,
    ) -> GpuRaysFrameConnection {
        self.new_frame.connect(listener)
    }

    /// Notify ray-frame listeners with the finished sample buffer.
    ///
    /// Called by the backend after filling its ray buffer each frame.
    pub fn dispatch_frame(&self, frame: &[f32]) {
        if !self.new_frame.has_listeners() {
            return;
        }
        self.new_frame.for_each(|listener| {
            listener(
                frame,
                self.range_count(),
                self.vertical_range_count(),
                self.channels,
                PixelFormat::R32G32B32_SFLOAT,
            )
        });
    }
}

impl Default for GpuRaysCore {
    fn default() -> Self {
        Self::new()
    }
}

/// The ray-sensor interface: a [`Camera`] extended with angular sample
/// geometry.
///
/// Backends implement `rays_core()`/`rays_core_mut()` and override
/// `ray_data()`/`copy_ray_data()` to expose their sample buffer; the base
/// defaults report "no data" so the interface can be consumed uniformly
/// before a backend renders.
pub trait GpuRays: Camera {
    /// Shared ray-sensor state
    fn rays_core(&self) -> &GpuRaysCore;

    /// Shared ray-sensor state, mutable
    fn rays_core_mut(&mut self) -> &mut GpuRaysCore;

    /// The most recent ray buffer, `channels()` floats per sample.
    /// Base default: no data until a backend overrides.
    fn ray_data(&self) -> Option<&[f32]> {
        None
    }

    /// Copy the most recent ray buffer into `dest`.
    /// Base default: no-op.
    fn copy_ray_data(&self, _dest: &mut [f32]) {}

    // ===== ANGLE RANGES =====

    /// Horizontal scan start angle in radians
    fn angle_min(&self) -> f32 {
        self.rays_core().angle_min()
    }

    /// Set the horizontal scan start angle
    fn set_angle_min(&mut self, angle: f32) {
        self.rays_core_mut().set_angle_min(angle);
    }

    /// Horizontal scan end angle in radians
    fn angle_max(&self) -> f32 {
        self.rays_core().angle_max()
    }

    /// Set the horizontal scan end angle
    fn set_angle_max(&mut self, angle: f32) {
        self.rays_core_mut().set_angle_max(angle);
    }

    /// Vertical scan start angle in radians
    fn vertical_angle_min(&self) -> f32 {
        self.rays_core().vertical_angle_min()
    }

    /// Set the vertical scan start angle
    fn set_vertical_angle_min(&mut self, angle: f32) {
        self.rays_core_mut().set_vertical_angle_min(angle);
    }

    /// Vertical scan end angle in radians
    fn vertical_angle_max(&self) -> f32 {
        self.rays_core().vertical_angle_max()
    }

    /// Set the vertical scan end angle
    fn set_vertical_angle_max(&mut self, angle: f32) {
        self.rays_core_mut().set_vertical_angle_max(angle);
    }

    // ===== SAMPLE COUNTS =====

    /// Horizontal ray count
    fn ray_count(&self) -> u32 {
        self.rays_core().ray_count()
    }

    /// Set the horizontal ray count
    fn set_ray_count(&mut self, count: u32) {
        self.rays_core_mut().set_ray_count(count);
    }

    /// Vertical ray count
    fn vertical_ray_count(&self) -> u32 {
        self.rays_core().vertical_ray_count()
    }

    /// Set the vertical ray count
    fn set_vertical_ray_count(&mut self, count: u32) {
        self.rays_core_mut().set_vertical_ray_count(count);
    }

    /// Horizontal resolution multiplier
    fn horizontal_resolution(&self) -> f32 {
        self.rays_core().horizontal_resolution()
    }

    /// Set the horizontal resolution multiplier (negative input is silently
    /// sign-flipped)
    fn set_horizontal_resolution(&mut self, resolution: f32) {
        self.rays_core_mut().set_horizontal_resolution(resolution);
    }

    /// Vertical resolution multiplier
    fn vertical_resolution(&self) -> f32 {
        self.rays_core().vertical_resolution()
    }

    /// Set the vertical resolution multiplier (silently sign-flipped)
    fn set_vertical_resolution(&mut self, resolution: f32) {
        self.rays_core_mut().set_vertical_resolution(resolution);
    }

    /// Number of horizontal range samples (truncating product)
    fn range_count(&self) -> u32 {
        self.rays_core().range_count()
    }

    /// Number of vertical range samples (truncating product)
    fn vertical_range_count(&self) -> u32 {
        self.rays_core().vertical_range_count()
    }

    // ===== CLAMP POLICY =====

    /// Set the out-of-range reporting policy using the camera's current
    /// clip planes
    fn set_clamp(&mut self, clamp: bool) {
        let near = self.core().near_clip_plane();
        let far = self.core().far_clip_plane();
        self.rays_core_mut().set_clamp(clamp, near, far);
    }

    /// True if out-of-range returns are clamped to the clip planes
    fn clamp_enabled(&self) -> bool {
        self.rays_core().clamp_enabled()
    }

    /// Reported value for returns below the minimum range
    fn data_min(&self) -> f32 {
        self.rays_core().data_min()
    }

    /// Reported value for returns beyond the maximum range
    fn data_max(&self) -> f32 {
        self.rays_core().data_max()
    }

    // ===== CHANNELS / VFOV =====

    /// Floats per ray sample
    fn channels(&self) -> u32 {
        self.rays_core().channels()
    }

    /// Vertical field of view in radians
    fn vfov(&self) -> f32 {
        self.rays_core().vfov()
    }

    // ===== LISTENERS =====

    /// Register a ray-frame listener; the connection unsubscribes on drop
    fn connect_new_gpu_rays_frame(
        &self,
        listener: Arc<GpuRaysFrameListener>,
    ) -> GpuRaysFrameConnection {
        self.rays_core().connect_new_gpu_rays_frame(listener)
    }
}

#[cfg(test)]
#[path = "gpu_rays_tests.rs"]
mod tests;
