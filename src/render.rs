use std::path::Path;

use crate::{
    error::FxStudioResult,
    scene::ActorId,
};

pub mod headless;

pub use headless::{HeadlessBackend, HeadlessProbe, RendererCall};

/// Invoked by the renderer with the moved actor's XML after an interactive drag.
pub type MoveCallback = Box<dyn FnMut(&str) + Send>;

/// Native window the render instance draws into. Opaque to the editor core.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowHandle(pub u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PickResult {
    /// 0 when nothing was hit.
    pub actor_id: ActorId,
    /// Mesh slot under the cursor, -1 when not applicable.
    pub mesh: i32,
}

/// Capability surface of the external rendering engine.
///
/// Calls are issued from one thread, strictly in user-action order; implementations need not
/// be reentrant.
pub trait RenderBackend {
    fn create_instance(
        &mut self,
        window: WindowHandle,
        width: u32,
        height: u32,
    ) -> FxStudioResult<()>;

    fn destroy_instance(&mut self) -> FxStudioResult<()>;

    fn resize(&mut self, width: u32, height: u32) -> FxStudioResult<()>;

    fn open_project(&mut self, project_file: &Path) -> FxStudioResult<()>;

    /// Adds the actor described by `actor_xml`. Returns the new id; zero or negative means
    /// the renderer rejected it.
    fn add_actor(&mut self, actor_xml: &str) -> i64;

    fn modify_actor(&mut self, patch_xml: &str) -> FxStudioResult<()>;

    fn pick_actor(&mut self, x: i32, y: i32) -> PickResult;

    /// Highlights an actor; 0 clears the highlight.
    fn set_picked_actor(&mut self, actor_id: ActorId);

    fn set_move_callback(&mut self, callback: MoveCallback);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// In-process stand-in that validates and records every call.
    Headless,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderSettings {
    /// Initial viewport size in pixels.
    pub width: u32,
    pub height: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

pub fn create_backend(
    kind: BackendKind,
    settings: &RenderSettings,
) -> FxStudioResult<Box<dyn RenderBackend>> {
    match kind {
        BackendKind::Headless => Ok(Box::new(HeadlessBackend::new(*settings))),
    }
}
