//! Unit tests for image.rs

use crate::image::{Image, PixelFormat};

// ============================================================================
// PIXEL FORMAT TESTS
// ============================================================================

#[test]
fn test_bytes_per_pixel() {
    assert_eq!(PixelFormat::L8.bytes_per_pixel(), 1);
    assert_eq!(PixelFormat::L16.bytes_per_pixel(), 2);
    assert_eq!(PixelFormat::R8G8B8.bytes_per_pixel(), 3);
    assert_eq!(PixelFormat::B8G8R8.bytes_per_pixel(), 3);
    assert_eq!(PixelFormat::R8G8B8A8.bytes_per_pixel(), 4);
    assert_eq!(PixelFormat::B8G8R8A8.bytes_per_pixel(), 4);
    assert_eq!(PixelFormat::R32_SFLOAT.bytes_per_pixel(), 4);
    assert_eq!(PixelFormat::R32G32B32_SFLOAT.bytes_per_pixel(), 12);
}

#[test]
fn test_channel_count() {
    assert_eq!(PixelFormat::L8.channel_count(), 1);
    assert_eq!(PixelFormat::R8G8B8.channel_count(), 3);
    assert_eq!(PixelFormat::B8G8R8A8.channel_count(), 4);
    assert_eq!(PixelFormat::R32G32B32_SFLOAT.channel_count(), 3);
}

#[test]
fn test_is_float() {
    assert!(PixelFormat::R32_SFLOAT.is_float());
    assert!(PixelFormat::R32G32B32_SFLOAT.is_float());
    assert!(!PixelFormat::R8G8B8.is_float());
    assert!(!PixelFormat::L16.is_float());
}

#[test]
fn test_format_names() {
    assert_eq!(PixelFormat::B8G8R8.name(), "B8G8R8");
    assert_eq!(PixelFormat::R32G32B32_SFLOAT.name(), "R32G32B32_SFLOAT");
}

// ============================================================================
// IMAGE TESTS
// ============================================================================

#[test]
fn test_image_new_allocates_zeroed() {
    let image = Image::new(100, 80, PixelFormat::B8G8R8);
    assert_eq!(image.width(), 100);
    assert_eq!(image.height(), 80);
    assert_eq!(image.format(), PixelFormat::B8G8R8);
    // The memory-size contract: bytes_per_pixel * width * height
    assert_eq!(image.memory_size(), 100 * 80 * 3);
    assert!(image.data().iter().all(|&b| b == 0));
}

#[test]
fn test_image_zero_dimensions() {
    let image = Image::new(0, 0, PixelFormat::R8G8B8A8);
    assert_eq!(image.memory_size(), 0);
    assert!(image.data().is_empty());
}

#[test]
fn test_image_data_mut() {
    let mut image = Image::new(2, 2, PixelFormat::L8);
    image.data_mut()[0] = 255;
    assert_eq!(image.data()[0], 255);
    assert_eq!(image.data()[1], 0);
}

#[test]
fn test_image_set_data_size_checked() {
    let mut image = Image::new(2, 2, PixelFormat::L8);
    assert!(image.set_data(vec![1, 2, 3, 4]).is_ok());
    assert_eq!(image.data(), &[1, 2, 3, 4]);

    // Wrong size is rejected, buffer unchanged
    assert!(image.set_data(vec![1, 2, 3]).is_err());
    assert_eq!(image.data(), &[1, 2, 3, 4]);
}

#[test]
fn test_image_float_data() {
    let mut image = Image::new(2, 1, PixelFormat::R32_SFLOAT);
    let bytes: Vec<u8> = [1.5f32, -2.0f32]
        .iter()
        .flat_map(|f| f.to_ne_bytes())
        .collect();
    image.set_data(bytes).unwrap();

    let floats = image.float_data().unwrap();
    assert_eq!(floats, &[1.5, -2.0]);
}

#[test]
fn test_image_float_data_rejects_byte_formats() {
    let image = Image::new(2, 2, PixelFormat::R8G8B8);
    assert!(image.float_data().is_none());
}
