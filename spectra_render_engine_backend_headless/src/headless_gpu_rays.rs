//! Headless ray sensor.
//!
//! Casts the configured angular grid against the scene's analytic sphere
//! obstacles. Each sample yields three floats (depth, retro-reflectivity,
//! reserved); out-of-range returns follow the sensor's clamp policy by
//! reporting `data_min()` / `data_max()`.

use std::sync::{Arc, Mutex, Weak};
use glam::Vec3;
use spectra_render_engine::spectra::Result;
use spectra_render_engine::camera::{Camera, CameraCore, GpuRays, GpuRaysCore};
use spectra_render_engine::image::PixelFormat;
use spectra_render_engine::log::LogSink;
use crate::headless_render_target::HeadlessRenderTarget;
use crate::headless_scene::{scene_handle, HeadlessScene, SphereObstacle};

/// Ray/range sensor scanning analytic spheres.
pub struct HeadlessGpuRays {
    core: CameraCore,
    rays: GpuRaysCore,
    scene: Weak<Mutex<HeadlessScene>>,
    data: Vec<f32>,
}

impl HeadlessGpuRays {
    /// Created by `HeadlessScene::create_gpu_rays`
    pub(crate) fn new(
        id: u64,
        name: &str,
        log: LogSink,
        scene: &Arc<Mutex<HeadlessScene>>,
    ) -> Self {
        let mut core = CameraCore::new(id, name, log);
        core.set_scene(scene_handle(scene));
        Self {
            core,
            rays: GpuRaysCore::new(),
            scene: Arc::downgrade(scene),
            data: Vec::new(),
        }
    }

    fn scene_obstacles(&self) -> Vec<SphereObstacle> {
        self.scene
            .upgrade()
            .and_then(|scene| scene.lock().ok().map(|scene| scene.obstacles().to_vec()))
            .unwrap_or_default()
    }
}

/// Scan angle of sample `index` in a `count`-sample sweep over [min, max].
/// A single sample sits at the sweep center.
fn sample_angle(min: f32, max: f32, index: usize, count: usize) -> f32 {
    if count <= 1 {
        0.5 * (min + max)
    } else {
        min + (max - min) * index as f32 / (count - 1) as f32
    }
}

/// Sensor-frame ray direction for a horizontal/vertical angle pair
/// (X-forward, Z-up).
fn ray_direction(h_angle: f32, v_angle: f32) -> Vec3 {
    Vec3::new(
        v_angle.cos() * h_angle.cos(),
        v_angle.cos() * h_angle.sin(),
        v_angle.sin(),
    )
}

/// Distance along the unit-direction ray to the sphere surface, if hit.
fn intersect_sphere(origin: Vec3, direction: Vec3, sphere: &SphereObstacle) -> Option<f32> {
    let oc = origin - sphere.center;
    let b = oc.dot(direction);
    let c = oc.length_squared() - sphere.radius * sphere.radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_discriminant = discriminant.sqrt();
    let t0 = -b - sqrt_discriminant;
    if t0 > 0.0 {
        return Some(t0);
    }
    let t1 = -b + sqrt_discriminant;
    if t1 > 0.0 {
        return Some(t1);
    }
    None
}

impl Camera for HeadlessGpuRays {
    fn core(&self) -> &CameraCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CameraCore {
        &mut self.core
    }

    fn init(&mut self) -> Result<()> {
        self.rays.validate_ranges()?;
        self.rays
            .set_vfov(self.rays.vertical_angle_max() - self.rays.vertical_angle_min());

        // The target holds one float triplet per range sample
        self.core.set_image_width(self.rays.range_count());
        self.core.set_image_height(self.rays.vertical_range_count().max(1));
        self.core.set_image_format(PixelFormat::R32G32B32_SFLOAT);
        let target = HeadlessRenderTarget::new(
            self.core.image_width(),
            self.core.image_height(),
            self.core.image_format(),
        );
        self.core.set_render_target(Box::new(target));
        Ok(())
    }

    fn render(&mut self) {
        let width = self.rays.range_count() as usize;
        let height = self.rays.vertical_range_count().max(1) as usize;
        let channels = self.rays.channels() as usize;
        self.data.clear();
        self.data.resize(width * height * channels, 0.0);

        let obstacles = self.scene_obstacles();
        let pose = self.core.world_pose();
        let near = self.core.near_clip_plane();
        let far = self.core.far_clip_plane();
        let h_min = self.rays.angle_min();
        let h_max = self.rays.angle_max();
        let v_min = self.rays.vertical_angle_min();
        let v_max = self.rays.vertical_angle_max();

        for v in 0..height {
            let v_angle = sample_angle(v_min, v_max, v, height);
            for h in 0..width {
                let h_angle = sample_angle(h_min, h_max, h, width);
                let direction = pose.rotation * ray_direction(h_angle, v_angle);

                let mut nearest: Option<(f32, f32)> = None;
                for obstacle in &obstacles {
                    if let Some(distance) = intersect_sphere(pose.position, direction, obstacle) {
                        if nearest.map(|(d, _)| distance < d).unwrap_or(true) {
                            nearest = Some((distance, obstacle.retro));
                        }
                    }
                }

                let index = (v * width + h) * channels;
                match nearest {
                    Some((distance, _)) if distance < near => {
                        self.data[index] = self.rays.data_min();
                    }
                    Some((distance, _)) if distance > far => {
                        self.data[index] = self.rays.data_max();
                    }
                    Some((distance, retro)) => {
                        self.data[index] = distance;
                        self.data[index + 1] = retro;
                    }
                    None => {
                        self.data[index] = self.rays.data_max();
                    }
                }
            }
        }

        // Mirror the sample buffer into the render target so the generic
        // copy/capture path sees the same frame
        if let Some(target) = self
            .core
            .render_target_mut()
            .and_then(|target| target.as_any_mut().downcast_mut::<HeadlessRenderTarget>())
        {
            let bytes: &[u8] = bytemuck::cast_slice(&self.data);
            let buffer = target.buffer_mut();
            if buffer.len() == bytes.len() {
                buffer.copy_from_slice(bytes);
            }
        }
    }

    fn post_render(&mut self) {
        self.core.post_render();
        self.rays.dispatch_frame(&self.data);
    }
}

impl GpuRays for HeadlessGpuRays {
    fn rays_core(&self) -> &GpuRaysCore {
        &self.rays
    }

    fn rays_core_mut(&mut self) -> &mut GpuRaysCore {
        &mut self.rays
    }

    fn ray_data(&self) -> Option<&[f32]> {
        if self.data.is_empty() {
            None
        } else {
            Some(&self.data)
        }
    }

    fn copy_ray_data(&self, dest: &mut [f32]) {
        let count = dest.len().min(self.data.len());
        dest[..count].copy_from_slice(&self.data[..count]);
    }
}
