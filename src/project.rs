//! The `.fxsproj`/`.asset` file pair backing one editor project.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{
    error::{FxStudioError, FxStudioResult},
    scene::{
        ActorId, ActorKind, DEFAULT_ASSET_XML, DEFAULT_PROJECT_XML, Vec3, create_attribute,
    },
    xml::{NodeId, XmlDocument},
};

pub const PROJECT_EXTENSION: &str = "fxsproj";
pub const ASSET_EXTENSION: &str = "asset";
pub const MODEL_EXTENSION: &str = "model";
pub const MODELS_DIR: &str = "Models";

/// First element under the project root whose `type` is `Scene`.
pub fn scene_element(doc: &XmlDocument) -> Option<NodeId> {
    let root = doc.root_element()?;
    doc.child_elements(root)
        .find(|&c| doc.attribute(c, "type") == Some("Scene"))
}

/// `<dir>/<stem>.asset` next to a project file.
pub fn asset_file_for(project_file: &Path) -> PathBuf {
    project_file.with_extension(ASSET_EXTENSION)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetSection {
    Effects,
    Materials,
    Models,
    Textures,
}

impl AssetSection {
    pub const ALL: [AssetSection; 4] = [
        AssetSection::Effects,
        AssetSection::Materials,
        AssetSection::Models,
        AssetSection::Textures,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Effects => "Effects",
            Self::Materials => "Materials",
            Self::Models => "Models",
            Self::Textures => "Textures",
        }
    }

    pub fn entry_name(self) -> &'static str {
        match self {
            Self::Effects => "Effect",
            Self::Materials => "Material",
            Self::Models => "Model",
            Self::Textures => "Texture",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetEntry {
    pub name: String,
    pub path: String,
}

/// The `<Assets>` catalog: flat named lists of relative paths per section.
#[derive(Clone, Debug)]
pub struct AssetCatalog {
    doc: XmlDocument,
}

impl AssetCatalog {
    pub fn parse(text: &str) -> FxStudioResult<Self> {
        let doc = XmlDocument::parse(text)?;
        let root = doc.root_element();
        if root.and_then(|r| doc.name(r)) != Some("Assets") {
            return Err(FxStudioError::project("asset file root must be <Assets>"));
        }
        Ok(Self { doc })
    }

    pub fn document(&self) -> &XmlDocument {
        &self.doc
    }

    fn root(&self) -> NodeId {
        self.doc.root_element().unwrap_or(self.doc.document_node())
    }

    pub fn entries(&self, section: AssetSection) -> Vec<AssetEntry> {
        let Some(sec) = self.doc.first_child_named(self.root(), section.as_str()) else {
            return Vec::new();
        };
        self.doc
            .child_elements_named(sec, section.entry_name())
            .map(|e| AssetEntry {
                name: self.doc.attribute(e, "name").unwrap_or_default().to_string(),
                path: self.doc.text(e),
            })
            .collect()
    }

    /// Adds an entry, or repoints an existing entry of the same name.
    pub fn add_entry(&mut self, section: AssetSection, name: &str, path: &str) {
        let root = self.root();
        let sec = match self.doc.first_child_named(root, section.as_str()) {
            Some(sec) => sec,
            None => {
                let sec = self.doc.create_element(section.as_str());
                self.doc.append_child(root, sec);
                sec
            }
        };
        let existing = self
            .doc
            .child_elements_named(sec, section.entry_name())
            .find(|&e| self.doc.attribute(e, "name") == Some(name));
        let entry = match existing {
            Some(e) => e,
            None => {
                let e = self.doc.create_element(section.entry_name());
                self.doc.set_attribute(e, create_attribute("name", name));
                self.doc.append_child(sec, e);
                e
            }
        };
        self.doc.set_text(entry, path);
    }

    pub fn add_model(&mut self, name: &str, path: &str) {
        self.add_entry(AssetSection::Models, name, path);
    }
}

/// An open project: the scene document, its asset catalog, and the renderer ids of the
/// scene's actors.
#[derive(Debug)]
pub struct Project {
    project_file: PathBuf,
    asset_file: PathBuf,
    doc: XmlDocument,
    scene: NodeId,
    assets: AssetCatalog,
    actors: BTreeMap<ActorId, NodeId>,
}

impl Project {
    /// Writes the default project and asset files into `dir` and opens them.
    pub fn create(dir: &Path, name: &str) -> FxStudioResult<Self> {
        if name.trim().is_empty() || name.contains(['/', '\\']) {
            return Err(FxStudioError::project(format!(
                "invalid project name '{name}'"
            )));
        }
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create project directory '{}'", dir.display()))?;

        let project_file = dir.join(format!("{name}.{PROJECT_EXTENSION}"));
        if project_file.exists() {
            return Err(FxStudioError::project(format!(
                "project '{}' already exists",
                project_file.display()
            )));
        }
        let asset_file = asset_file_for(&project_file);

        std::fs::write(&project_file, DEFAULT_PROJECT_XML)
            .with_context(|| format!("write '{}'", project_file.display()))?;
        std::fs::write(&asset_file, DEFAULT_ASSET_XML)
            .with_context(|| format!("write '{}'", asset_file.display()))?;
        tracing::info!(project = %project_file.display(), "created project");

        Self::open(&project_file)
    }

    /// Loads a project file and its sibling asset file.
    ///
    /// Scene actors are numbered 1, 2, ... in document order, matching the order in which
    /// the renderer instantiates them.
    pub fn open(project_file: &Path) -> FxStudioResult<Self> {
        let text = std::fs::read_to_string(project_file)
            .with_context(|| format!("read project '{}'", project_file.display()))?;
        let doc = XmlDocument::parse(&text)?;
        let scene = scene_element(&doc).ok_or_else(|| {
            FxStudioError::project(format!(
                "project '{}' has no scene",
                project_file.display()
            ))
        })?;

        let asset_file = asset_file_for(project_file);
        let asset_text = std::fs::read_to_string(&asset_file)
            .with_context(|| format!("read assets '{}'", asset_file.display()))?;
        let assets = AssetCatalog::parse(&asset_text)?;

        let actors = doc
            .child_elements(scene)
            .zip(1..)
            .map(|(node, id)| (id, node))
            .collect::<BTreeMap<_, _>>();

        tracing::info!(
            project = %project_file.display(),
            actors = actors.len(),
            "opened project"
        );
        Ok(Self {
            project_file: project_file.to_path_buf(),
            asset_file,
            doc,
            scene,
            assets,
            actors,
        })
    }

    pub fn project_file(&self) -> &Path {
        &self.project_file
    }

    pub fn asset_file(&self) -> &Path {
        &self.asset_file
    }

    pub fn project_dir(&self) -> &Path {
        self.project_file.parent().unwrap_or(Path::new("."))
    }

    pub fn document(&self) -> &XmlDocument {
        &self.doc
    }

    pub fn scene(&self) -> NodeId {
        self.scene
    }

    pub fn assets(&self) -> &AssetCatalog {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut AssetCatalog {
        &mut self.assets
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    pub fn actor_ids(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.actors.keys().copied()
    }

    pub fn actor(&self, id: ActorId) -> Option<NodeId> {
        self.actors.get(&id).copied()
    }

    /// Id of the actor element `node`, if it is one of the registered actors.
    pub fn actor_id_of(&self, node: NodeId) -> Option<ActorId> {
        self.actors
            .iter()
            .find_map(|(&id, &n)| (n == node).then_some(id))
    }

    pub fn actor_kind(&self, id: ActorId) -> FxStudioResult<ActorKind> {
        ActorKind::of_element(&self.doc, self.require_actor(id)?)
    }

    fn require_actor(&self, id: ActorId) -> FxStudioResult<NodeId> {
        self.actor(id)
            .ok_or_else(|| FxStudioError::project(format!("no actor with id {id}")))
    }

    /// Copies `element` from `src` into the scene under renderer id `id`.
    pub fn register_actor(
        &mut self,
        id: ActorId,
        src: &XmlDocument,
        element: NodeId,
    ) -> FxStudioResult<NodeId> {
        if self.actors.contains_key(&id) {
            return Err(FxStudioError::project(format!(
                "actor id {id} is already registered"
            )));
        }
        let node = self.doc.import_subtree(src, element);
        self.doc.append_child(self.scene, node);
        self.actors.insert(id, node);
        tracing::debug!(id, "registered actor");
        Ok(node)
    }

    /// Syncs a renderer move notification: `<.. id="N"><TransformComponent>..` replaces the
    /// actor's transform.
    pub fn apply_transform_xml(&mut self, actor_xml: &str) -> FxStudioResult<ActorId> {
        let incoming = XmlDocument::parse(actor_xml)?;
        let root = incoming
            .root_element()
            .ok_or_else(|| FxStudioError::project("empty actor xml"))?;
        let id: ActorId = incoming
            .attribute(root, "id")
            .ok_or_else(|| FxStudioError::project("moved actor has no id"))?
            .parse()
            .map_err(|e| FxStudioError::project(format!("moved actor id: {e}")))?;
        let transform = incoming
            .first_child_named(root, "TransformComponent")
            .ok_or_else(|| FxStudioError::project("moved actor has no TransformComponent"))?;

        let actor = self.require_actor(id)?;
        let copy = self.doc.import_subtree(&incoming, transform);
        match self.doc.first_child_named(actor, "TransformComponent") {
            Some(old) => {
                self.doc.replace_child(actor, copy, old);
            }
            None => self.doc.append_child(actor, copy),
        }
        Ok(id)
    }

    /// Mirrors a property-panel edit of one xyz attribute.
    pub fn apply_transform_edit(
        &mut self,
        id: ActorId,
        component: &str,
        attribute: &str,
        value: Vec3,
    ) -> FxStudioResult<()> {
        let actor = self.require_actor(id)?;
        let c = self.child_or_insert(actor, component);
        let a = self.child_or_insert(c, attribute);
        let [x, y, z] = value.to_strings();
        self.doc.set_attribute(a, create_attribute("x", &x));
        self.doc.set_attribute(a, create_attribute("y", &y));
        self.doc.set_attribute(a, create_attribute("z", &z));
        Ok(())
    }

    /// Mirrors a material assignment. `mesh` picks the slot on models and is ignored on
    /// primitives.
    pub fn apply_material(
        &mut self,
        id: ActorId,
        mesh: i32,
        material_ref: &str,
    ) -> FxStudioResult<()> {
        let actor = self.require_actor(id)?;
        let kind = ActorKind::of_element(&self.doc, actor)?;
        let component = self.child_or_insert(actor, kind.render_component_name());

        let material = if kind == ActorKind::Model {
            let slots = self.child_or_insert(component, "Materials");
            let index = mesh.to_string();
            let existing = self
                .doc
                .child_elements_named(slots, "Material")
                .find(|&m| self.doc.attribute(m, "index") == Some(index.as_str()));
            match existing {
                Some(m) => m,
                None => {
                    let m = self.doc.create_element("Material");
                    self.doc.set_attribute(m, create_attribute("index", &index));
                    self.doc.append_child(slots, m);
                    m
                }
            }
        } else {
            self.child_or_insert(component, "Material")
        };
        self.doc.set_text(material, material_ref);
        Ok(())
    }

    fn child_or_insert(&mut self, parent: NodeId, name: &str) -> NodeId {
        if let Some(c) = self.doc.first_child_named(parent, name) {
            return c;
        }
        let c = self.doc.create_element(name);
        self.doc.append_child(parent, c);
        c
    }

    /// Where an imported model is written: `<project dir>/Models/<stem>.model`.
    pub fn model_destination(&self, source: &Path) -> FxStudioResult<PathBuf> {
        let stem = source.file_stem().ok_or_else(|| {
            FxStudioError::import(format!("'{}' has no file name", source.display()))
        })?;
        let mut file = PathBuf::from(stem);
        file.set_extension(MODEL_EXTENSION);
        Ok(self.project_dir().join(MODELS_DIR).join(file))
    }

    /// Rewrites both the project and the asset file.
    pub fn save_all(&self) -> FxStudioResult<()> {
        let project = self.doc.to_pretty_string()?;
        std::fs::write(&self.project_file, project)
            .with_context(|| format!("write '{}'", self.project_file.display()))?;
        let assets = self.assets.doc.to_pretty_string()?;
        std::fs::write(&self.asset_file, assets)
            .with_context(|| format!("write '{}'", self.asset_file.display()))?;
        tracing::info!(project = %self.project_file.display(), "saved project");
        Ok(())
    }
}
