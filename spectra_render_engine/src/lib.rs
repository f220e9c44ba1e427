/*!
# Spectra Render Engine

Core traits and types for the Spectra sensor-rendering engine.

This crate provides the backend-agnostic API for simulating camera-like
sensors (color cameras, GPU ray/range sensors, bounding-box detection
cameras) over a 3D scene, using trait-based polymorphism. Backend
implementations (headless CPU reference, GPU rasterizers, ray tracers)
compose the shared cores and implement the sensor traits.

## Architecture

- **Camera / CameraCore**: projection and view math, frame loop,
  capture/copy, tracking and following control loops, render-pass delegation
- **GpuRays / GpuRaysCore**: angular ray geometry for range-sensor simulation
- **BoundingBoxCamera / BoundingBoxCameraCore**: typed object-detection output
- **RenderTarget**: the pixel surface a camera owns and renders into
- **Scene / Node**: the contracts the camera consumes from the scene graph

Backend crates provide concrete types that implement these traits; the
`spectra_render_engine_backend_headless` crate is the deterministic CPU
reference.

There are no global singletons: every component is constructed with an
injected [`log::LogSink`].
*/

// Internal modules
mod error;
pub mod camera;
pub mod image;
pub mod log;
pub mod scene;
pub mod target;

// Main spectra namespace module
pub mod spectra {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging sub-module
    pub mod log {
        pub use crate::log::{
            CapturingLogger, DefaultLogger, LogEntry, LogSeverity, LogSink, Logger, NullLogger,
        };
    }

    // Render sub-module with camera, target, and image types
    pub mod render {
        pub use crate::camera::*;
        pub use crate::image::*;
        pub use crate::target::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
