//! Render targets and render-pass composition
//!
//! A render target is the pixel buffer a camera renders into. The camera owns
//! exactly one target (created by the backend during `init()`) and delegates
//! its image-size, format, and pass-list operations to it.

mod render_target;

pub use render_target::{PassList, RenderPass, RenderTarget};
