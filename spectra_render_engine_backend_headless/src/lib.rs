/*!
# Spectra Render Engine - Headless Backend

Deterministic CPU implementation of the Spectra sensor traits. No GPU, no
window: color cameras render the scene background into a byte buffer, ray
sensors scan analytic sphere obstacles, and detection cameras project
labeled boxes through the camera.

Sensor outputs are exactly computable, which makes this backend the
reference for integration tests and CI.

## Example

```no_run
use spectra_render_engine::camera::Camera;
use spectra_render_engine::log::LogSink;
use spectra_render_engine_backend_headless::HeadlessScene;

let scene = HeadlessScene::new(1, "demo", LogSink::default());
let mut camera = HeadlessScene::create_camera(&scene, "main")?;
let mut image = camera.create_image();
camera.capture(&mut image);
# Ok::<(), spectra_render_engine::spectra::Error>(())
```
*/

mod headless_bounding_box_camera;
mod headless_camera;
mod headless_gpu_rays;
mod headless_render_target;
mod headless_scene;

pub use headless_bounding_box_camera::HeadlessBoundingBoxCamera;
pub use headless_camera::HeadlessCamera;
pub use headless_gpu_rays::HeadlessGpuRays;
pub use headless_render_target::HeadlessRenderTarget;
pub use headless_scene::{HeadlessNode, HeadlessScene, LabeledBox, SphereObstacle};
