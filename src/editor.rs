//! Application context: owns the renderer, the open project and the selection, and routes
//! editor events to subscribed panels.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use crossbeam_channel::{Receiver, Sender};

use crate::{
    config::EditorSettings,
    error::{FxStudioError, FxStudioResult},
    import::{ImportHandle, ImportJob, ImportOutcome, ModelConverter, spawn_import},
    project::Project,
    render::{PickResult, RenderBackend, WindowHandle},
    scene::{
        ActorId, ActorKind, Vec3, build_material_assignment, build_model_actor,
        build_primitive_actor, build_transform_edit, material_reference, model_display_name,
        model_tag, wire_actor_id,
    },
    xml::{NodeId, XmlDocument},
};

#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
    ProjectOpened { project_file: PathBuf },
    ActorAdded { id: ActorId, kind: ActorKind },
    /// The renderer refused an actor; the project was left untouched.
    ActorRejected { kind: ActorKind, code: i64 },
    ActorMoved { id: ActorId },
    SelectionChanged { id: Option<ActorId> },
    MaterialAssigned { id: ActorId, mesh: i32, material: String },
    TransformEdited { id: ActorId, component: String, attribute: String, value: Vec3 },
    ProjectSaved,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    ProjectOpened,
    ActorAdded,
    ActorRejected,
    ActorMoved,
    SelectionChanged,
    MaterialAssigned,
    TransformEdited,
    ProjectSaved,
}

impl EditorEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ProjectOpened { .. } => EventKind::ProjectOpened,
            Self::ActorAdded { .. } => EventKind::ActorAdded,
            Self::ActorRejected { .. } => EventKind::ActorRejected,
            Self::ActorMoved { .. } => EventKind::ActorMoved,
            Self::SelectionChanged { .. } => EventKind::SelectionChanged,
            Self::MaterialAssigned { .. } => EventKind::MaterialAssigned,
            Self::TransformEdited { .. } => EventKind::TransformEdited,
            Self::ProjectSaved => EventKind::ProjectSaved,
        }
    }
}

pub type Listener = Box<dyn FnMut(&EditorEvent)>;

pub struct EditorContext {
    backend: Box<dyn RenderBackend>,
    settings: EditorSettings,
    project: Option<Project>,
    selection: Option<ActorId>,
    listeners: BTreeMap<EventKind, Vec<Listener>>,
    moves_tx: Sender<String>,
    moves_rx: Receiver<String>,
    running: bool,
}

impl EditorContext {
    pub fn new(backend: Box<dyn RenderBackend>, settings: EditorSettings) -> Self {
        let (moves_tx, moves_rx) = crossbeam_channel::unbounded();
        Self {
            backend,
            settings,
            project: None,
            selection: None,
            listeners: BTreeMap::new(),
            moves_tx,
            moves_rx,
            running: false,
        }
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    pub fn selection(&self) -> Option<ActorId> {
        self.selection
    }

    pub fn subscribe(&mut self, kind: EventKind, listener: Listener) {
        self.listeners.entry(kind).or_default().push(listener);
    }

    pub fn dispatch(&mut self, event: &EditorEvent) {
        if let Some(listeners) = self.listeners.get_mut(&event.kind()) {
            for l in listeners.iter_mut() {
                l(event);
            }
        }
    }

    fn require_project(&self) -> FxStudioResult<&Project> {
        self.project
            .as_ref()
            .ok_or_else(|| FxStudioError::project("no project is open"))
    }

    fn require_project_mut(&mut self) -> FxStudioResult<&mut Project> {
        self.project
            .as_mut()
            .ok_or_else(|| FxStudioError::project("no project is open"))
    }

    /// Creates the render instance. A failure here is fatal to the session.
    #[tracing::instrument(skip(self))]
    pub fn start(&mut self, window: WindowHandle, width: u32, height: u32) -> FxStudioResult<()> {
        self.backend.create_instance(window, width, height)?;
        if width != 0 && height != 0 {
            self.backend.resize(width, height)?;
        }
        self.running = true;
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> FxStudioResult<()> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.backend.resize(width, height)
    }

    pub fn shutdown(&mut self) -> FxStudioResult<()> {
        if !self.running {
            return Ok(());
        }
        self.running = false;
        self.backend.destroy_instance()
    }

    /// Writes a fresh project named `name` into `dir` and opens it.
    #[tracing::instrument(skip(self))]
    pub fn new_project(&mut self, dir: &Path, name: &str) -> FxStudioResult<()> {
        let project = Project::create(dir, name)?;
        let file = project.project_file().to_path_buf();
        drop(project);
        self.open_project(&file)
    }

    #[tracing::instrument(skip(self))]
    pub fn open_project(&mut self, project_file: &Path) -> FxStudioResult<()> {
        let project = Project::open(project_file)?;
        self.backend.open_project(project_file)?;

        let tx = self.moves_tx.clone();
        self.backend.set_move_callback(Box::new(move |xml| {
            // The editor may have been dropped; late notifications are discarded.
            let _ = tx.send(xml.to_string());
        }));

        self.project = Some(project);
        self.selection = None;
        self.dispatch(&EditorEvent::ProjectOpened {
            project_file: project_file.to_path_buf(),
        });
        Ok(())
    }

    /// Adds a primitive actor. `Ok(None)` means the renderer rejected it.
    #[tracing::instrument(skip(self))]
    pub fn add_primitive(&mut self, kind: ActorKind) -> FxStudioResult<Option<ActorId>> {
        if !kind.is_primitive() {
            return Err(FxStudioError::project(
                "models are added from an imported .model file",
            ));
        }
        let mut doc = XmlDocument::new();
        let actor = build_primitive_actor(&mut doc, kind);
        self.add_actor_document(&doc, actor, kind)
    }

    /// Adds an actor for an already converted `.model` file and lists it in the asset catalog.
    #[tracing::instrument(skip(self))]
    pub fn add_model(&mut self, model_file: &Path) -> FxStudioResult<Option<ActorId>> {
        let mut doc = XmlDocument::new();
        let actor = build_model_actor(&mut doc, model_file)?;
        let id = self.add_actor_document(&doc, actor, ActorKind::Model)?;
        if id.is_some()
            && let (Some(stem), Some(file)) = (
                model_file.file_stem().and_then(|s| s.to_str()),
                model_file.file_name().and_then(|s| s.to_str()),
            )
        {
            let name = model_display_name(stem);
            self.require_project_mut()?
                .assets_mut()
                .add_model(&name, &format!(r"Models\{file}"));
        }
        Ok(id)
    }

    fn add_actor_document(
        &mut self,
        doc: &XmlDocument,
        actor: NodeId,
        kind: ActorKind,
    ) -> FxStudioResult<Option<ActorId>> {
        self.require_project()?;
        let xml = doc.to_xml_string(actor)?;
        let code = self.backend.add_actor(&xml);
        let Some(id) = ActorId::try_from(code).ok().filter(|&id| id > 0) else {
            tracing::warn!(%kind, code, "renderer rejected actor");
            self.dispatch(&EditorEvent::ActorRejected { kind, code });
            return Ok(None);
        };
        self.require_project_mut()?.register_actor(id, doc, actor)?;
        self.dispatch(&EditorEvent::ActorAdded { id, kind });
        Ok(Some(id))
    }

    /// Starts converting `source` into the project's `Models` directory.
    pub fn import_model(
        &self,
        source: &Path,
        converter: Arc<dyn ModelConverter>,
    ) -> FxStudioResult<ImportHandle> {
        // The actor tag comes from the source stem; reject it before anything is written.
        model_tag(source)?;
        let dest = self.require_project()?.model_destination(source)?;
        spawn_import(
            ImportJob {
                source: source.to_path_buf(),
                dest,
            },
            converter,
        )
    }

    /// Applies a finished import on the editor thread: completed conversions become actors.
    pub fn complete_import(
        &mut self,
        outcome: ImportOutcome,
    ) -> FxStudioResult<Option<ActorId>> {
        match outcome {
            ImportOutcome::Completed(model_file) => self.add_model(&model_file),
            ImportOutcome::Cancelled => Ok(None),
            ImportOutcome::Failed(msg) => Err(FxStudioError::import(msg)),
        }
    }

    /// Assigns material `name` to `actor_id` (mesh slot `mesh` on models).
    #[tracing::instrument(skip(self))]
    pub fn assign_material(
        &mut self,
        name: &str,
        actor_id: ActorId,
        mesh: i32,
    ) -> FxStudioResult<()> {
        self.select_actor(actor_id);
        let kind = self.require_project()?.actor_kind(actor_id)?;

        let mut doc = XmlDocument::new();
        let patch = build_material_assignment(&mut doc, actor_id, kind, name, mesh);
        self.backend.modify_actor(&doc.to_xml_string(patch)?)?;

        let reference = material_reference(name);
        self.require_project_mut()?
            .apply_material(actor_id, mesh, &reference)?;
        self.dispatch(&EditorEvent::MaterialAssigned {
            id: actor_id,
            mesh,
            material: reference,
        });
        Ok(())
    }

    /// Pushes one edited transform attribute of the selected actor to the renderer.
    #[tracing::instrument(skip(self))]
    pub fn edit_transform(
        &mut self,
        component: &str,
        attribute: &str,
        value: Vec3,
    ) -> FxStudioResult<()> {
        let id = self
            .selection
            .ok_or_else(|| FxStudioError::project("no actor selected"))?;

        let mut doc = XmlDocument::new();
        let patch = build_transform_edit(&mut doc, id, component, attribute, value);
        self.backend.modify_actor(&doc.to_xml_string(patch)?)?;

        // System actors are addressed as id 0, which the renderer ignores; their saved
        // transform stays as loaded.
        if wire_actor_id(id) == 0 {
            tracing::debug!(id, "transform edit on system actor not mirrored");
        } else {
            self.require_project_mut()?
                .apply_transform_edit(id, component, attribute, value)?;
        }
        self.dispatch(&EditorEvent::TransformEdited {
            id,
            component: component.to_string(),
            attribute: attribute.to_string(),
            value,
        });
        Ok(())
    }

    /// Selects whatever the renderer reports under the cursor.
    pub fn pick_actor(&mut self, x: i32, y: i32) -> PickResult {
        let pick = self.backend.pick_actor(x, y);
        self.select_actor(pick.actor_id);
        pick
    }

    /// Selects a registered actor; unknown ids and 0 clear the selection. System actors can
    /// be selected but are never highlighted in the renderer.
    pub fn select_actor(&mut self, id: ActorId) {
        let known = self
            .project
            .as_ref()
            .is_some_and(|p| p.actor(id).is_some());
        self.selection = known.then_some(id);
        let highlight = self.selection.map(wire_actor_id).unwrap_or(0);
        self.backend.set_picked_actor(highlight);
        self.dispatch(&EditorEvent::SelectionChanged { id: self.selection });
    }

    /// Applies move notifications the renderer queued since the last call. Returns how many
    /// were applied; unparseable ones are logged and dropped.
    pub fn pump_renderer_events(&mut self) -> usize {
        let pending: Vec<String> = self.moves_rx.try_iter().collect();
        let mut applied = 0;
        for xml in pending {
            let Some(project) = self.project.as_mut() else {
                break;
            };
            match project.apply_transform_xml(&xml) {
                Ok(id) => {
                    applied += 1;
                    self.dispatch(&EditorEvent::ActorMoved { id });
                }
                Err(e) => tracing::warn!(error = %e, "dropping actor move notification"),
            }
        }
        applied
    }

    #[tracing::instrument(skip(self))]
    pub fn save_all(&mut self) -> FxStudioResult<()> {
        self.require_project()?.save_all()?;
        self.dispatch(&EditorEvent::ProjectSaved);
        Ok(())
    }
}
