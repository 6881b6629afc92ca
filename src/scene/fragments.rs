//! Transient `<Actor id=..>` patches pushed to the renderer after an edit.

use std::path::Path;

use crate::{
    scene::{
        actor::{ActorId, ActorKind, wire_actor_id},
        factory::create_attribute,
    },
    xml::{NodeId, XmlDocument},
};

pub const MATERIALS_DIR_PREFIX: &str = r"Materials\";

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Shortest decimal form of each component; never exponent notation.
    pub fn to_strings(self) -> [String; 3] {
        [self.x.to_string(), self.y.to_string(), self.z.to_string()]
    }
}

/// `Materials\<file name of material>`.
pub fn material_reference(material: &str) -> String {
    let file_name = Path::new(&material.replace('\\', "/"))
        .file_name()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| material.to_string());
    format!("{MATERIALS_DIR_PREFIX}{file_name}")
}

/// Material patch for one actor.
///
/// Models address a mesh slot: `<ModelRenderComponent><Materials><Material index=..>`.
/// Primitives get `<Material>` directly under their render component and ignore `mesh`.
pub fn build_material_assignment(
    doc: &mut XmlDocument,
    actor_id: ActorId,
    kind: ActorKind,
    material: &str,
    mesh: i32,
) -> NodeId {
    let actor = doc.create_element("Actor");
    doc.set_attribute(
        actor,
        create_attribute("id", &wire_actor_id(actor_id).to_string()),
    );

    let mat = doc.create_element("Material");
    doc.set_text(mat, material_reference(material));

    let component = doc.create_element(kind.render_component_name());
    if kind == ActorKind::Model {
        doc.set_attribute(mat, create_attribute("index", &mesh.to_string()));
        let slots = doc.create_element("Materials");
        doc.append_child(slots, mat);
        doc.append_child(component, slots);
    } else {
        doc.append_child(component, mat);
    }
    doc.append_child(actor, component);
    actor
}

/// `<Actor id=..><component><attribute x y z/></component></Actor>` for a single edited
/// property, e.g. `TransformComponent`/`Translation`.
pub fn build_transform_edit(
    doc: &mut XmlDocument,
    actor_id: ActorId,
    component: &str,
    attribute: &str,
    value: Vec3,
) -> NodeId {
    let actor = doc.create_element("Actor");
    doc.set_attribute(
        actor,
        create_attribute("id", &wire_actor_id(actor_id).to_string()),
    );
    let c = doc.create_element(component);
    let [x, y, z] = value.to_strings();
    let a = doc.create_element(attribute);
    doc.set_attribute(a, create_attribute("x", &x));
    doc.set_attribute(a, create_attribute("y", &y));
    doc.set_attribute(a, create_attribute("z", &z));
    doc.append_child(c, a);
    doc.append_child(actor, c);
    actor
}
