//! Headless color camera.
//!
//! Renders the scene background as a solid frame: deterministic output for
//! exercising the full camera contract (frame loop, capture, listeners,
//! tracking) without a GPU.

use std::sync::{Arc, Mutex, Weak};
use spectra_render_engine::spectra::Result;
use spectra_render_engine::camera::{Camera, CameraCore};
use spectra_render_engine::log::LogSink;
use crate::headless_render_target::HeadlessRenderTarget;
use crate::headless_scene::{scene_handle, HeadlessScene};

/// Color camera rendering into a CPU buffer.
pub struct HeadlessCamera {
    core: CameraCore,
    scene: Weak<Mutex<HeadlessScene>>,
}

impl HeadlessCamera {
    /// Created by `HeadlessScene::create_camera`
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
            scene: Arc::downgrade(scene),
        }
    }

    fn scene_background(&self) -> [u8; 3] {
        self.scene
            .upgrade()
            .and_then(|scene| scene.lock().ok().map(|scene| scene.background()))
            .unwrap_or([0, 0, 0])
    }
}

impl Camera for HeadlessCamera {
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
        let background = self.scene_background();
        if let Some(target) = self
            .core
            .render_target_mut()
            .and_then(|target| target.as_any_mut().downcast_mut::<HeadlessRenderTarget>())
        {
            target.fill_solid(background);
        }
    }
}
