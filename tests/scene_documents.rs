use fxstudio::{
    ActorKind, TransformSpec, XmlDocument,
    scene::{
        DEFAULT_MATERIAL_PATH, build_material_assignment, create_cube_render_component,
        create_cylinder_render_component, create_model_render_component,
        create_plane_render_component, create_sphere_render_component,
        create_teapot_render_component, create_torus_render_component,
        create_transform_component,
    },
};

#[test]
fn every_render_component_has_white_color_and_default_material() {
    let mut doc = XmlDocument::new();
    let components = [
        create_cube_render_component(&mut doc),
        create_sphere_render_component(&mut doc),
        create_cylinder_render_component(&mut doc),
        create_teapot_render_component(&mut doc),
        create_torus_render_component(&mut doc),
        create_plane_render_component(&mut doc),
        create_model_render_component(&mut doc, "ship.model"),
    ];

    for c in components {
        let colors: Vec<_> = doc.child_elements_named(c, "Color").collect();
        assert_eq!(colors.len(), 1, "{:?}", doc.name(c));
        for ch in ["r", "g", "b", "a"] {
            assert_eq!(doc.attribute(colors[0], ch), Some("1"));
        }

        let materials: Vec<_> = doc.child_elements_named(c, "Material").collect();
        assert_eq!(materials.len(), 1);
        assert_eq!(doc.text(materials[0]), DEFAULT_MATERIAL_PATH);
    }
}

#[test]
fn transform_defaults_survive_serialize_and_parse() {
    for (tx, ty, tz) in [("0", "0", "0"), ("1.50", "-0", "2.5e0"), ("3.535533", "10", "0.0")] {
        let mut doc = XmlDocument::new();
        let t = create_transform_component(&mut doc, &TransformSpec::at(tx, ty, tz));
        let text = doc.to_xml_string(t).unwrap();

        let back = XmlDocument::parse(&text).unwrap();
        let root = back.root_element().unwrap();
        let tr = back.first_child_named(root, "Translation").unwrap();
        assert_eq!(back.attribute(tr, "x"), Some(tx));
        assert_eq!(back.attribute(tr, "y"), Some(ty));
        assert_eq!(back.attribute(tr, "z"), Some(tz));

        let scale = back.first_child_named(root, "Scale").unwrap();
        let rot = back.first_child_named(root, "Rotation").unwrap();
        for axis in ["x", "y", "z"] {
            assert_eq!(back.attribute(scale, axis), Some("1"));
            assert_eq!(back.attribute(rot, axis), Some("0"));
        }
    }
}

#[test]
fn model_assignment_wraps_material_in_slot_list() {
    let mut doc = XmlDocument::new();
    let actor = build_material_assignment(&mut doc, 7, ActorKind::Model, "Steel.mat", 2);
    assert_eq!(
        doc.to_xml_string(actor).unwrap(),
        concat!(
            r#"<Actor id="7"><ModelRenderComponent><Materials>"#,
            r#"<Material index="2">Materials\Steel.mat</Material>"#,
            r#"</Materials></ModelRenderComponent></Actor>"#
        )
    );
}

#[test]
fn sphere_assignment_attaches_material_directly() {
    let mut doc = XmlDocument::new();
    let actor = build_material_assignment(&mut doc, 7, ActorKind::Sphere, "Steel.mat", 2);
    let comp = doc.first_child_named(actor, "SphereRenderComponent").unwrap();
    assert!(doc.first_child_named(comp, "Materials").is_none());
    let mat = doc.first_child_named(comp, "Material").unwrap();
    assert_eq!(doc.attribute(mat, "index"), None);
    assert_eq!(doc.text(mat), r"Materials\Steel.mat");
}

#[test]
fn system_actor_assignment_uses_zero_id() {
    let mut doc = XmlDocument::new();
    let actor = build_material_assignment(&mut doc, 2, ActorKind::Plane, "Grid.mat", 0);
    assert_eq!(doc.attribute(actor, "id"), Some("0"));
}
