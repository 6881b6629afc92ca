//! Pure builders for actor component subtrees.
//!
//! Every value is emitted as the literal string the native renderer expects (`"1.0"`,
//! `"0"`); nothing here formats numbers.

use crate::{
    scene::actor::ActorKind,
    xml::{Attribute, NodeId, XmlDocument},
};

pub const DEFAULT_MATERIAL_PATH: &str = r"Materials\DefaultMaterial.mat";
pub const MODELS_DIR_PREFIX: &str = r"Models\";

pub fn create_attribute(name: &str, value: &str) -> Attribute {
    Attribute::new(name, value)
}

/// Translation, scale and rotation as literal attribute strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransformSpec {
    pub translation: [String; 3],
    pub scale: [String; 3],
    pub rotation: [String; 3],
}

impl Default for TransformSpec {
    fn default() -> Self {
        Self::at("0", "0", "0")
    }
}

impl TransformSpec {
    /// Given translation, unit scale, no rotation.
    pub fn at(tx: &str, ty: &str, tz: &str) -> Self {
        Self {
            translation: [tx.to_string(), ty.to_string(), tz.to_string()],
            scale: ["1".to_string(), "1".to_string(), "1".to_string()],
            rotation: ["0".to_string(), "0".to_string(), "0".to_string()],
        }
    }
}

pub fn create_transform_component(doc: &mut XmlDocument, spec: &TransformSpec) -> NodeId {
    let transform = doc.create_element("TransformComponent");
    for (name, xyz) in [
        ("Translation", &spec.translation),
        ("Scale", &spec.scale),
        ("Rotation", &spec.rotation),
    ] {
        let e = create_xyz_element(doc, name, xyz);
        doc.append_child(transform, e);
    }
    transform
}

pub(crate) fn create_xyz_element(doc: &mut XmlDocument, name: &str, xyz: &[String; 3]) -> NodeId {
    let e = doc.create_element(name);
    doc.set_attribute(e, create_attribute("x", &xyz[0]));
    doc.set_attribute(e, create_attribute("y", &xyz[1]));
    doc.set_attribute(e, create_attribute("z", &xyz[2]));
    e
}

fn create_color_element(doc: &mut XmlDocument) -> NodeId {
    let color = doc.create_element("Color");
    for channel in ["r", "g", "b", "a"] {
        doc.set_attribute(color, create_attribute(channel, "1"));
    }
    color
}

/// Geometry attributes of each primitive, in emission order.
fn geometry_attributes(kind: ActorKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        ActorKind::Cube => &[("size", "1.0"), ("rhcoords", "1")],
        ActorKind::Sphere => &[("diameter", "1.0"), ("tessellation", "3"), ("rhcoords", "1")],
        ActorKind::Cylinder => &[
            ("height", "1.0"),
            ("diameter", "1.0"),
            ("tessellation", "32"),
            ("rhcoords", "1"),
        ],
        ActorKind::Teapot => &[("size", "1.0"), ("tessellation", "8"), ("rhcoords", "1")],
        ActorKind::Torus => &[
            ("diameter", "1.0"),
            ("thickness", "0.333"),
            ("tessellation", "32"),
            ("rhcoords", "1"),
        ],
        ActorKind::Plane => &[("width", "1.0"), ("height", "1.0"), ("rhcoords", "1")],
        ActorKind::Model => &[],
    }
}

/// `<KindRenderComponent>` holding `Color`, the geometry element and the default `Material`.
pub fn create_render_component(doc: &mut XmlDocument, kind: ActorKind) -> NodeId {
    let component = doc.create_element(kind.render_component_name());
    let color = create_color_element(doc);
    doc.append_child(component, color);

    let geometry = doc.create_element(kind.as_str());
    for (name, value) in geometry_attributes(kind) {
        doc.set_attribute(geometry, create_attribute(name, value));
    }
    doc.append_child(component, geometry);

    let material = doc.create_element("Material");
    doc.set_text(material, DEFAULT_MATERIAL_PATH);
    doc.append_child(component, material);
    component
}

pub fn create_cube_render_component(doc: &mut XmlDocument) -> NodeId {
    create_render_component(doc, ActorKind::Cube)
}

pub fn create_sphere_render_component(doc: &mut XmlDocument) -> NodeId {
    create_render_component(doc, ActorKind::Sphere)
}

pub fn create_cylinder_render_component(doc: &mut XmlDocument) -> NodeId {
    create_render_component(doc, ActorKind::Cylinder)
}

pub fn create_teapot_render_component(doc: &mut XmlDocument) -> NodeId {
    create_render_component(doc, ActorKind::Teapot)
}

pub fn create_torus_render_component(doc: &mut XmlDocument) -> NodeId {
    create_render_component(doc, ActorKind::Torus)
}

pub fn create_plane_render_component(doc: &mut XmlDocument) -> NodeId {
    create_render_component(doc, ActorKind::Plane)
}

/// Like the primitive components, but the `Model` element carries `Models\<file_name>` as text.
pub fn create_model_render_component(doc: &mut XmlDocument, file_name: &str) -> NodeId {
    let component = create_render_component(doc, ActorKind::Model);
    if let Some(model) = doc.first_child_named(component, ActorKind::Model.as_str()) {
        doc.set_text(model, format!("{MODELS_DIR_PREFIX}{file_name}"));
    }
    component
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_matches_renderer_layout() {
        let mut doc = XmlDocument::new();
        let c = create_cube_render_component(&mut doc);
        assert_eq!(
            doc.to_xml_string(c).unwrap(),
            concat!(
                r#"<CubeRenderComponent><Color r="1" g="1" b="1" a="1"/>"#,
                r#"<Cube size="1.0" rhcoords="1"/>"#,
                r#"<Material>Materials\DefaultMaterial.mat</Material></CubeRenderComponent>"#
            )
        );
    }

    #[test]
    fn sphere_geometry_order_is_stable() {
        let mut doc = XmlDocument::new();
        let c = create_sphere_render_component(&mut doc);
        let g = doc.first_child_named(c, "Sphere").unwrap();
        let attrs: Vec<_> = doc
            .attributes(g)
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_str()))
            .collect();
        assert_eq!(
            attrs,
            [("diameter", "1.0"), ("tessellation", "3"), ("rhcoords", "1")]
        );
    }

    #[test]
    fn builders_are_deterministic() {
        let mut a = XmlDocument::new();
        let mut b = XmlDocument::new();
        let x = create_teapot_render_component(&mut a);
        let y = create_teapot_render_component(&mut b);
        assert_eq!(a.to_xml_string(x).unwrap(), b.to_xml_string(y).unwrap());
    }

    #[test]
    fn transform_can_carry_scale_and_rotation() {
        let mut doc = XmlDocument::new();
        let spec = TransformSpec {
            scale: ["2".into(), "2".into(), "2".into()],
            rotation: ["0".into(), "90".into(), "0".into()],
            ..TransformSpec::at("1.5", "0", "-3")
        };
        let t = create_transform_component(&mut doc, &spec);
        let scale = doc.first_child_named(t, "Scale").unwrap();
        let rot = doc.first_child_named(t, "Rotation").unwrap();
        let tr = doc.first_child_named(t, "Translation").unwrap();
        assert_eq!(doc.attribute(scale, "x"), Some("2"));
        assert_eq!(doc.attribute(rot, "y"), Some("90"));
        assert_eq!(doc.attribute(tr, "z"), Some("-3"));
    }
}
