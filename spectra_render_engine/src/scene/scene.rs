//! Scene contract consumed by the camera frame loop.

/// Opaque handle to a visual in the backend scene graph.
///
/// Returned by picking queries (`Camera::visual_at`). The visual object model
/// itself is backend territory; this crate only passes the handle through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualId(pub u64);

/// The scene a camera renders.
///
/// `Camera::update()` calls `pre_render()` exactly once per frame before the
/// backend renders. Scenes are shared behind `Arc<Mutex<dyn Scene>>` and
/// accessed from one thread at a time; the engine provides no internal
/// locking beyond that handle.
pub trait Scene: Send {
    /// Unique scene id assigned at creation
    fn id(&self) -> u64;

    /// Scene name assigned at creation
    fn name(&self) -> &str;

    /// Flush pending scene-graph state before rendering a frame
    fn pre_render(&mut self);
}
