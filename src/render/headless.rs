use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    error::{FxStudioError, FxStudioResult},
    project::scene_element,
    render::{MoveCallback, PickResult, RenderBackend, RenderSettings, WindowHandle},
    scene::ActorId,
    xml::XmlDocument,
};

/// One recorded call into the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RendererCall {
    CreateInstance { width: u32, height: u32 },
    DestroyInstance,
    Resize { width: u32, height: u32 },
    OpenProject(PathBuf),
    AddActor(String),
    ModifyActor(String),
    PickActor { x: i32, y: i32 },
    SetPickedActor(ActorId),
}

#[derive(Default)]
struct HeadlessState {
    viewport: Option<(u32, u32)>,
    next_id: i64,
    reject_adds: usize,
    actors: BTreeMap<ActorId, String>,
    calls: Vec<RendererCall>,
    pick: PickResult,
    picked: ActorId,
    move_callback: Option<MoveCallback>,
}

/// Renderer stand-in: parses every payload, hands out sequential ids and records calls.
///
/// Obtain a [`HeadlessProbe`] before boxing the backend to inspect it or drive scripted
/// behaviour from tests.
pub struct HeadlessBackend {
    settings: RenderSettings,
    state: Arc<Mutex<HeadlessState>>,
}

/// Shared view into a [`HeadlessBackend`].
#[derive(Clone)]
pub struct HeadlessProbe {
    state: Arc<Mutex<HeadlessState>>,
}

fn lock(state: &Mutex<HeadlessState>) -> MutexGuard<'_, HeadlessState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl HeadlessBackend {
    pub fn new(settings: RenderSettings) -> Self {
        let state = HeadlessState {
            next_id: 1,
            ..HeadlessState::default()
        };
        Self {
            settings,
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe {
            state: Arc::clone(&self.state),
        }
    }

    fn require_instance(state: &HeadlessState) -> FxStudioResult<()> {
        if state.viewport.is_none() {
            return Err(FxStudioError::renderer("no render instance has been created"));
        }
        Ok(())
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_instance(
        &mut self,
        _window: WindowHandle,
        width: u32,
        height: u32,
    ) -> FxStudioResult<()> {
        let mut s = lock(&self.state);
        if s.viewport.is_some() {
            return Err(FxStudioError::renderer("render instance already exists"));
        }
        let (width, height) = if width == 0 || height == 0 {
            (self.settings.width, self.settings.height)
        } else {
            (width, height)
        };
        s.calls.push(RendererCall::CreateInstance { width, height });
        s.viewport = Some((width, height));
        Ok(())
    }

    fn destroy_instance(&mut self) -> FxStudioResult<()> {
        let mut s = lock(&self.state);
        Self::require_instance(&s)?;
        s.calls.push(RendererCall::DestroyInstance);
        s.viewport = None;
        s.actors.clear();
        s.move_callback = None;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> FxStudioResult<()> {
        let mut s = lock(&self.state);
        Self::require_instance(&s)?;
        if width == 0 || height == 0 {
            return Err(FxStudioError::renderer("viewport size must be non-zero"));
        }
        s.calls.push(RendererCall::Resize { width, height });
        s.viewport = Some((width, height));
        Ok(())
    }

    fn open_project(&mut self, project_file: &Path) -> FxStudioResult<()> {
        let mut s = lock(&self.state);
        Self::require_instance(&s)?;
        s.calls.push(RendererCall::OpenProject(project_file.to_path_buf()));

        let text = std::fs::read_to_string(project_file).map_err(|e| {
            FxStudioError::renderer(format!(
                "cannot open project '{}': {e}",
                project_file.display()
            ))
        })?;
        let doc = XmlDocument::parse(&text)?;
        let scene = scene_element(&doc).ok_or_else(|| {
            FxStudioError::renderer(format!(
                "project '{}' has no scene",
                project_file.display()
            ))
        })?;

        // Scene actors are loaded in document order and take the first ids.
        s.actors.clear();
        let mut next: ActorId = 1;
        for actor in doc.child_elements(scene) {
            s.actors.insert(next, doc.to_xml_string(actor)?);
            next += 1;
        }
        s.next_id = i64::from(next);
        Ok(())
    }

    fn add_actor(&mut self, actor_xml: &str) -> i64 {
        let mut s = lock(&self.state);
        s.calls.push(RendererCall::AddActor(actor_xml.to_string()));
        if s.viewport.is_none() {
            return -1;
        }
        if s.reject_adds > 0 {
            s.reject_adds -= 1;
            return 0;
        }
        if XmlDocument::parse(actor_xml).is_err() {
            return 0;
        }
        let id = s.next_id;
        let Ok(key) = ActorId::try_from(id) else {
            return -1;
        };
        s.actors.insert(key, actor_xml.to_string());
        s.next_id += 1;
        id
    }

    fn modify_actor(&mut self, patch_xml: &str) -> FxStudioResult<()> {
        let mut s = lock(&self.state);
        Self::require_instance(&s)?;
        s.calls.push(RendererCall::ModifyActor(patch_xml.to_string()));

        let doc = XmlDocument::parse(patch_xml)?;
        let root = doc
            .root_element()
            .ok_or_else(|| FxStudioError::renderer("empty actor patch"))?;
        let id: ActorId = doc
            .attribute(root, "id")
            .ok_or_else(|| FxStudioError::renderer("actor patch has no id"))?
            .parse()
            .map_err(|e| FxStudioError::renderer(format!("actor patch id: {e}")))?;
        if id != 0 && !s.actors.contains_key(&id) {
            return Err(FxStudioError::renderer(format!("no actor with id {id}")));
        }
        Ok(())
    }

    fn pick_actor(&mut self, x: i32, y: i32) -> PickResult {
        let mut s = lock(&self.state);
        s.calls.push(RendererCall::PickActor { x, y });
        s.pick
    }

    fn set_picked_actor(&mut self, actor_id: ActorId) {
        let mut s = lock(&self.state);
        s.calls.push(RendererCall::SetPickedActor(actor_id));
        s.picked = actor_id;
    }

    fn set_move_callback(&mut self, callback: MoveCallback) {
        lock(&self.state).move_callback = Some(callback);
    }
}

impl HeadlessProbe {
    pub fn calls(&self) -> Vec<RendererCall> {
        lock(&self.state).calls.clone()
    }

    pub fn actor_xml(&self, id: ActorId) -> Option<String> {
        lock(&self.state).actors.get(&id).cloned()
    }

    pub fn actor_count(&self) -> usize {
        lock(&self.state).actors.len()
    }

    pub fn viewport(&self) -> Option<(u32, u32)> {
        lock(&self.state).viewport
    }

    pub fn picked(&self) -> ActorId {
        lock(&self.state).picked
    }

    /// The next `n` `add_actor` calls return 0.
    pub fn reject_next_adds(&self, n: usize) {
        lock(&self.state).reject_adds = n;
    }

    pub fn script_pick(&self, result: PickResult) {
        lock(&self.state).pick = result;
    }

    /// Plays back an interactive move: fires the registered callback with `actor_xml`.
    /// Returns false when no callback is registered.
    pub fn simulate_move(&self, actor_xml: &str) -> bool {
        // Run the callback outside the lock so it may call back into the probe.
        let Some(mut callback) = lock(&self.state).move_callback.take() else {
            return false;
        };
        callback(actor_xml);
        let mut s = lock(&self.state);
        if s.move_callback.is_none() {
            s.move_callback = Some(callback);
        }
        true
    }
}
