//! Headless bounding-box detection camera.
//!
//! Each frame the camera reads the scene's labeled boxes and produces one
//! [`BoundingBox`] per label, according to the selected detection variant:
//! 3D boxes pass through in world space; 2D variants project the eight box
//! corners through the camera and take the screen-space bounds, with the
//! visible variant additionally clipped to the viewport.
//!
//! This backend performs no occlusion testing: every labeled box in front of
//! the camera is reported.

use std::sync::{Arc, Mutex, Weak};
use glam::Vec3;
use spectra_render_engine::spectra::Result;
use spectra_render_engine::camera::{
    BoundingBox, BoundingBoxCamera, BoundingBoxCameraCore, BoundingBoxType, Camera, CameraCore,
};
use spectra_render_engine::image::PixelFormat;
use spectra_render_engine::log::LogSink;
use spectra_render_engine::sink_error;
use crate::headless_render_target::HeadlessRenderTarget;
use crate::headless_scene::{scene_handle, HeadlessScene, LabeledBox};

const SOURCE: &str = "spectra::headless::BoundingBoxCamera";

/// Detection camera producing boxes from scene-registered labels.
pub struct HeadlessBoundingBoxCamera {
    core: CameraCore,
    boxes: BoundingBoxCameraCore,
    scene: Weak<Mutex<HeadlessScene>>,
}

impl HeadlessBoundingBoxCamera {
    /// Created by `HeadlessScene::create_bounding_box_camera`
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
            boxes: BoundingBoxCameraCore::new(),
            scene: Arc::downgrade(scene),
        }
    }

    fn scene_content(&self) -> ([u8; 3], Vec<LabeledBox>) {
        self.scene
            .upgrade()
            .and_then(|scene| {
                scene
                    .lock()
                    .ok()
                    .map(|scene| (scene.background(), scene.labeled_boxes().to_vec()))
            })
            .unwrap_or(([0, 0, 0], Vec::new()))
    }

    /// Screen-space bounds of a labeled box, or None when fully behind the
    /// camera (and, for the clipped variant, fully outside the viewport).
    fn project_box(&self, labeled: &LabeledBox, clip_to_viewport: bool) -> Option<BoundingBox> {
        let view_projection = self.core.projection_matrix() * self.core.view_matrix();
        let width = self.core.image_width() as f32;
        let height = self.core.image_height() as f32;
        let half = labeled.size * 0.5;

        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        let mut visible = false;

        for i in 0..8u32 {
            let corner = Vec3::new(
                if i & 1 == 0 { -half.x } else { half.x },
                if i & 2 == 0 { -half.y } else { half.y },
                if i & 4 == 0 { -half.z } else { half.z },
            );
            let world = labeled.center + labeled.orientation * corner;
            let clip = view_projection * world.extend(1.0);
            if clip.w <= 0.0 {
                // Corner behind the camera
                continue;
            }
            let ndc = clip.truncate() / clip.w;
            let screen_x = (ndc.x * 0.5 + 0.5) * width;
            let screen_y = (1.0 - (ndc.y * 0.5 + 0.5)) * height;

            min_x = min_x.min(screen_x);
            min_y = min_y.min(screen_y);
            max_x = max_x.max(screen_x);
            max_y = max_y.max(screen_y);
            visible = true;
        }

        if !visible {
            return None;
        }

        if clip_to_viewport {
            min_x = min_x.max(0.0);
            min_y = min_y.max(0.0);
            max_x = max_x.min(width);
            max_y = max_y.min(height);
            if min_x >= max_x || min_y >= max_y {
                return None;
            }
        }

        Some(BoundingBox::new(
            Vec3::new(0.5 * (min_x + max_x), 0.5 * (min_y + max_y), 0.0),
            Vec3::new(max_x - min_x, max_y - min_y, 0.0),
            labeled.label,
        ))
    }

    fn detect(&self, labeled_boxes: &[LabeledBox]) -> Vec<BoundingBox> {
        match self.boxes.box_type() {
            BoundingBoxType::Box3D => labeled_boxes
                .iter()
                .map(|labeled| {
                    BoundingBox::oriented(
                        labeled.center,
                        labeled.size,
                        labeled.orientation,
                        labeled.label,
                    )
                })
                .collect(),
            BoundingBoxType::FullBox2D => labeled_boxes
                .iter()
                .filter_map(|labeled| self.project_box(labeled, false))
                .collect(),
            BoundingBoxType::VisibleBox2D => labeled_boxes
                .iter()
                .filter_map(|labeled| self.project_box(labeled, true))
                .collect(),
        }
    }
}

impl Camera for HeadlessBoundingBoxCamera {
    fn core(&self) -> &CameraCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CameraCore {
        &mut self.core
    }

    fn init(&mut self) -> Result<()> {
        let target = HeadlessRenderTarget::new(
            self.core.image_width(),
            self.core.image_height(),
            self.core.image_format(),
        );
        self.core.set_render_target(Box::new(target));
        Ok(())
    }

    fn render(&mut self) {
        let (background, labeled_boxes) = self.scene_content();
        let detected = self.detect(&labeled_boxes);
        self.boxes.set_boxes(detected);

        if let Some(target) = self
            .core
            .render_target_mut()
            .and_then(|target| target.as_any_mut().downcast_mut::<HeadlessRenderTarget>())
        {
            target.fill_solid(background);
        }
    }

    fn post_render(&mut self) {
        self.core.post_render();
        self.boxes.dispatch_boxes();
    }
}

impl BoundingBoxCamera for HeadlessBoundingBoxCamera {
    fn boxes_core(&self) -> &BoundingBoxCameraCore {
        &self.boxes
    }

    fn boxes_core_mut(&mut self) -> &mut BoundingBoxCameraCore {
        &mut self.boxes
    }

    fn draw_bounding_box(&self, buffer: &mut [u8], color: [u8; 3], bounding_box: &BoundingBox) {
        let width = self.core.image_width() as i64;
        let height = self.core.image_height() as i64;
        if width == 0 || height == 0 {
            return;
        }
        let format = self.core.image_format();
        let bytes_per_pixel = format.bytes_per_pixel() as usize;

        let (channel_count, rgb_order) = match format {
            PixelFormat::R8G8B8 => (3, true),
            PixelFormat::R8G8B8A8 => (4, true),
            PixelFormat::B8G8R8 => (3, false),
            PixelFormat::B8G8R8A8 => (4, false),
            _ => {
                sink_error!(
                    self.core.log(),
                    SOURCE,
                    "draw_bounding_box: unsupported pixel format {}",
                    format.name()
                );
                return;
            }
        };
        if buffer.len() < (width * height) as usize * bytes_per_pixel {
            sink_error!(
                self.core.log(),
                SOURCE,
                "draw_bounding_box: buffer too small for {}x{} {}",
                width,
                height,
                format.name()
            );
            return;
        }

        let [r, g, b] = color;
        let pixel: [u8; 4] = if rgb_order {
            [r, g, b, 255]
        } else {
            [b, g, r, 255]
        };

        let x0 = ((bounding_box.center.x - 0.5 * bounding_box.size.x) as i64).clamp(0, width - 1);
        let x1 = ((bounding_box.center.x + 0.5 * bounding_box.size.x) as i64).clamp(0, width - 1);
        let y0 = ((bounding_box.center.y - 0.5 * bounding_box.size.y) as i64).clamp(0, height - 1);
        let y1 = ((bounding_box.center.y + 0.5 * bounding_box.size.y) as i64).clamp(0, height - 1);

        let mut put = |x: i64, y: i64| {
            let offset = (y * width + x) as usize * bytes_per_pixel;
            buffer[offset..offset + channel_count].copy_from_slice(&pixel[..channel_count]);
        };

        for x in x0..=x1 {
            put(x, y0);
            put(x, y1);
        }
        for y in y0..=y1 {
            put(x0, y);
            put(x1, y);
        }
    }
}
