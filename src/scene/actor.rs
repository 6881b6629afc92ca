use std::{fmt, path::Path, str::FromStr};

use crate::{
    error::{FxStudioError, FxStudioResult},
    scene::factory::{
        TransformSpec, create_attribute, create_model_render_component, create_render_component,
        create_transform_component,
    },
    xml::{NodeId, XmlDocument, is_xml_name},
};

/// Renderer-assigned actor identifier.
pub type ActorId = u32;

/// Ids at or below this are the scene's built-in actors (skybox, grid) and are never
/// addressed directly.
pub const SYSTEM_ACTOR_MAX_ID: ActorId = 2;

/// Id written into outgoing fragments: system actors collapse to 0.
pub fn wire_actor_id(id: ActorId) -> ActorId {
    if id > SYSTEM_ACTOR_MAX_ID { id } else { 0 }
}

/// Value of an actor's `type` attribute, mapped once at parse time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActorKind {
    Teapot,
    Sphere,
    Torus,
    Plane,
    Cube,
    Cylinder,
    Model,
}

impl ActorKind {
    pub const PRIMITIVES: [ActorKind; 6] = [
        ActorKind::Teapot,
        ActorKind::Sphere,
        ActorKind::Torus,
        ActorKind::Plane,
        ActorKind::Cube,
        ActorKind::Cylinder,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Teapot => "Teapot",
            Self::Sphere => "Sphere",
            Self::Torus => "Torus",
            Self::Plane => "Plane",
            Self::Cube => "Cube",
            Self::Cylinder => "Cylinder",
            Self::Model => "Model",
        }
    }

    pub fn render_component_name(self) -> &'static str {
        match self {
            Self::Teapot => "TeapotRenderComponent",
            Self::Sphere => "SphereRenderComponent",
            Self::Torus => "TorusRenderComponent",
            Self::Plane => "PlaneRenderComponent",
            Self::Cube => "CubeRenderComponent",
            Self::Cylinder => "CylinderRenderComponent",
            Self::Model => "ModelRenderComponent",
        }
    }

    pub fn is_primitive(self) -> bool {
        self != Self::Model
    }

    /// Reads the `type` attribute of an actor element.
    pub fn of_element(doc: &XmlDocument, actor: NodeId) -> FxStudioResult<Self> {
        let ty = doc.attribute(actor, "type").ok_or_else(|| {
            FxStudioError::project(format!(
                "actor element '{}' has no type attribute",
                doc.name(actor).unwrap_or_default()
            ))
        })?;
        ty.parse()
    }
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActorKind {
    type Err = FxStudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Teapot" => Ok(Self::Teapot),
            "Sphere" => Ok(Self::Sphere),
            "Torus" => Ok(Self::Torus),
            "Plane" => Ok(Self::Plane),
            "Cube" => Ok(Self::Cube),
            "Cylinder" => Ok(Self::Cylinder),
            "Model" => Ok(Self::Model),
            other => Err(FxStudioError::project(format!(
                "unknown actor type '{other}'"
            ))),
        }
    }
}

/// `<Kind type="Kind">` with a default transform and the shape's render component.
///
/// `kind` must be a primitive; a `Model` is built with [`build_model_actor`].
pub fn build_primitive_actor(doc: &mut XmlDocument, kind: ActorKind) -> NodeId {
    debug_assert!(kind.is_primitive());
    let actor = doc.create_element(kind.as_str());
    doc.set_attribute(actor, create_attribute("type", kind.as_str()));
    let transform = create_transform_component(doc, &TransformSpec::default());
    doc.append_child(actor, transform);
    let render = create_render_component(doc, kind);
    doc.append_child(actor, render);
    tracing::debug!(kind = %kind, "built primitive actor");
    actor
}

/// Element tag for a model file: the file stem with its first letter upper-cased.
///
/// Stems that do not form an XML name (spaces, a leading digit, ...) are rejected.
pub fn model_tag(model_path: &Path) -> FxStudioResult<String> {
    let stem = model_path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            FxStudioError::import(format!(
                "model path '{}' has no usable file name",
                model_path.display()
            ))
        })?;
    let tag = model_display_name(stem);
    if !is_xml_name(&tag) {
        return Err(FxStudioError::import(format!(
            "model name '{stem}' is not a valid XML element name"
        )));
    }
    Ok(tag)
}

/// Actor for an imported `.model` file, tagged with [`model_tag`].
pub fn build_model_actor(doc: &mut XmlDocument, model_path: &Path) -> FxStudioResult<NodeId> {
    let tag = model_tag(model_path)?;
    let file_name = model_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(tag.as_str());

    let actor = doc.create_element(tag.as_str());
    doc.set_attribute(actor, create_attribute("type", ActorKind::Model.as_str()));
    let transform = create_transform_component(doc, &TransformSpec::default());
    doc.append_child(actor, transform);
    let render = create_model_render_component(doc, file_name);
    doc.append_child(actor, render);
    tracing::debug!(model = file_name, "built model actor");
    Ok(actor)
}

pub fn model_display_name(stem: &str) -> String {
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
