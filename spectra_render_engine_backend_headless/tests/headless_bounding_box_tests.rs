//! Integration tests for the headless bounding-box camera: detection
//! variants, screen-space projection, listeners, and outline drawing.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use glam::{Quat, Vec3};
use approx::assert_relative_eq;
use spectra_render_engine::camera::{BoundingBox, BoundingBoxCamera, BoundingBoxType, Camera};
use spectra_render_engine::image::PixelFormat;
use spectra_render_engine::log::LogSink;
use spectra_render_engine_backend_headless::{HeadlessScene, LabeledBox};

fn test_scene() -> Arc<Mutex<HeadlessScene>> {
    HeadlessScene::new(3, "bbox_tests", LogSink::null())
}

// ============================================================================
// 3D DETECTION
// ============================================================================

#[test]
fn test_box3d_passes_world_boxes_through() {
    let scene = test_scene();
    let orientation = Quat::from_rotation_z(0.3);
    scene.lock().unwrap().add_labeled_box(LabeledBox {
        center: Vec3::new(4.0, 1.0, 0.5),
        size: Vec3::new(2.0, 1.0, 1.5),
        orientation,
        label: 42,
    });

    let mut camera = HeadlessScene::create_bounding_box_camera(&scene, "detector").unwrap();
    camera.set_bounding_box_type(BoundingBoxType::Box3D);
    camera.update();

    let boxes = camera.bounding_box_data();
    assert_eq!(boxes.len(), 1);
    assert_eq!(boxes[0].label, 42);
    assert_eq!(boxes[0].center, Vec3::new(4.0, 1.0, 0.5));
    assert_eq!(boxes[0].size, Vec3::new(2.0, 1.0, 1.5));
    assert_eq!(boxes[0].orientation, orientation);
}

#[test]
fn test_detection_overwrites_each_pass() {
    let scene = test_scene();
    let mut camera = HeadlessScene::create_bounding_box_camera(&scene, "detector").unwrap();
    camera.set_bounding_box_type(BoundingBoxType::Box3D);

    camera.update();
    assert!(camera.bounding_box_data().is_empty());

    scene
        .lock()
        .unwrap()
        .add_labeled_box(LabeledBox::new(Vec3::new(5.0, 0.0, 0.0), Vec3::ONE, 7));
    camera.update();
    assert_eq!(camera.bounding_box_data().len(), 1);

    camera.update();
    // Replaced wholesale, not appended
    assert_eq!(camera.bounding_box_data().len(), 1);
}

// ============================================================================
// 2D PROJECTION
// ============================================================================

#[test]
fn test_full_box2d_centered_object_projects_to_screen_center() {
    let scene = test_scene();
    scene
        .lock()
        .unwrap()
        .add_labeled_box(LabeledBox::new(Vec3::new(10.0, 0.0, 0.0), Vec3::splat(2.0), 1));

    let mut camera = HeadlessScene::create_bounding_box_camera(&scene, "detector").unwrap();
    camera.set_bounding_box_type(BoundingBoxType::FullBox2D);
    camera.update();

    let boxes = camera.bounding_box_data();
    assert_eq!(boxes.len(), 1);
    let detected = boxes[0];

    let center_x = camera.image_width() as f32 * 0.5;
    let center_y = camera.image_height() as f32 * 0.5;
    assert_relative_eq!(detected.center.x, center_x, epsilon = 1.0);
    assert_relative_eq!(detected.center.y, center_y, epsilon = 1.0);
    assert!(detected.size.x > 0.0);
    assert!(detected.size.y > 0.0);
    assert_eq!(detected.orientation, Quat::IDENTITY);
}

#[test]
fn test_box_behind_camera_not_detected() {
    let scene = test_scene();
    scene
        .lock()
        .unwrap()
        .add_labeled_box(LabeledBox::new(Vec3::new(-10.0, 0.0, 0.0), Vec3::ONE, 1));

    let mut camera = HeadlessScene::create_bounding_box_camera(&scene, "detector").unwrap();
    camera.set_bounding_box_type(BoundingBoxType::FullBox2D);
    camera.update();

    assert!(camera.bounding_box_data().is_empty());
}

#[test]
fn test_visible_box2d_clips_to_viewport() {
    let scene = test_scene();
    // Object straddling the left edge of the frustum
    scene
        .lock()
        .unwrap()
        .add_labeled_box(LabeledBox::new(Vec3::new(5.0, 2.8, 0.0), Vec3::splat(2.0), 1));

    let mut camera = HeadlessScene::create_bounding_box_camera(&scene, "detector").unwrap();

    camera.set_bounding_box_type(BoundingBoxType::FullBox2D);
    camera.update();
    let full = camera.bounding_box_data()[0];

    camera.set_bounding_box_type(BoundingBoxType::VisibleBox2D);
    camera.update();
    let visible = camera.bounding_box_data()[0];

    // Clipping can only shrink the box
    assert!(visible.size.x <= full.size.x);
    let min_x = visible.center.x - 0.5 * visible.size.x;
    let max_x = visible.center.x + 0.5 * visible.size.x;
    assert!(min_x >= 0.0);
    assert!(max_x <= camera.image_width() as f32);
}

#[test]
fn test_visible_box2d_drops_offscreen_objects() {
    let scene = test_scene();
    // Far off to the side, outside the horizontal FOV
    scene
        .lock()
        .unwrap()
        .add_labeled_box(LabeledBox::new(Vec3::new(2.0, 40.0, 0.0), Vec3::ONE, 1));

    let mut camera = HeadlessScene::create_bounding_box_camera(&scene, "detector").unwrap();
    camera.set_bounding_box_type(BoundingBoxType::VisibleBox2D);
    camera.update();

    assert!(camera.bounding_box_data().is_empty());
}

// ============================================================================
// LISTENERS
// ============================================================================

#[test]
fn test_box_listener_end_to_end() {
    let scene = test_scene();
    scene
        .lock()
        .unwrap()
        .add_labeled_box(LabeledBox::new(Vec3::new(6.0, 0.0, 0.0), Vec3::ONE, 9));

    let mut camera = HeadlessScene::create_bounding_box_camera(&scene, "detector").unwrap();
    camera.set_bounding_box_type(BoundingBoxType::Box3D);

    let passes = Arc::new(AtomicUsize::new(0));
    let passes_clone = passes.clone();
    let _connection = camera.connect_new_bounding_boxes(Arc::new(
        move |boxes: &[BoundingBox]| {
            assert_eq!(boxes.len(), 1);
            assert_eq!(boxes[0].label, 9);
            passes_clone.fetch_add(1, Ordering::Relaxed);
        },
    ));

    camera.update();
    assert_eq!(passes.load(Ordering::Relaxed), 1);
}

// ============================================================================
// OUTLINE DRAWING
// ============================================================================

#[test]
fn test_draw_bounding_box_outline() {
    let scene = test_scene();
    let mut camera = HeadlessScene::create_bounding_box_camera(&scene, "detector").unwrap();
    camera.set_image_width(32);
    camera.set_image_height(32);
    camera.set_image_format(PixelFormat::R8G8B8);

    let mut buffer = vec![0u8; 32 * 32 * 3];
    let outline = BoundingBox::new(Vec3::new(16.0, 16.0, 0.0), Vec3::new(10.0, 10.0, 0.0), 1);
    camera.draw_bounding_box(&mut buffer, [255, 0, 0], &outline);

    let pixel = |x: usize, y: usize| {
        let offset = (y * 32 + x) * 3;
        [buffer[offset], buffer[offset + 1], buffer[offset + 2]]
    };

    // Corners of the outline carry the color
    assert_eq!(pixel(11, 11), [255, 0, 0]);
    assert_eq!(pixel(21, 21), [255, 0, 0]);
    // Edge midpoints carry the color
    assert_eq!(pixel(16, 11), [255, 0, 0]);
    assert_eq!(pixel(11, 16), [255, 0, 0]);
    // The interior stays untouched
    assert_eq!(pixel(16, 16), [0, 0, 0]);
    // Outside the outline stays untouched
    assert_eq!(pixel(5, 5), [0, 0, 0]);
}

#[test]
fn test_draw_bounding_box_bgr_channel_order() {
    let scene = test_scene();
    let mut camera = HeadlessScene::create_bounding_box_camera(&scene, "detector").unwrap();
    camera.set_image_width(8);
    camera.set_image_height(8);
    camera.set_image_format(PixelFormat::B8G8R8);

    let mut buffer = vec![0u8; 8 * 8 * 3];
    let outline = BoundingBox::new(Vec3::new(4.0, 4.0, 0.0), Vec3::new(4.0, 4.0, 0.0), 1);
    camera.draw_bounding_box(&mut buffer, [255, 0, 0], &outline);

    // B8G8R8 stores blue first; pure red lands in the third byte
    let offset = (2 * 8 + 2) * 3;
    assert_eq!(&buffer[offset..offset + 3], &[0, 0, 255]);
}
