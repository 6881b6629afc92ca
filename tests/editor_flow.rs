use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use fxstudio::{
    ActorId, ActorKind, CopyConverter, EditorContext, EditorSettings, FxStudioResult,
    HeadlessBackend, MoveCallback, PickResult, RenderBackend, RenderSettings, RendererCall,
    Vec3, WindowHandle,
};

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "fxstudio_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn settings(dir: &Path) -> EditorSettings {
    EditorSettings {
        projects_dir: dir.to_path_buf(),
        show_start_page: false,
    }
}

/// Renderer that refuses every actor.
struct RejectingBackend {
    code: i64,
}

impl RenderBackend for RejectingBackend {
    fn create_instance(&mut self, _: WindowHandle, _: u32, _: u32) -> FxStudioResult<()> {
        Ok(())
    }
    fn destroy_instance(&mut self) -> FxStudioResult<()> {
        Ok(())
    }
    fn resize(&mut self, _: u32, _: u32) -> FxStudioResult<()> {
        Ok(())
    }
    fn open_project(&mut self, _: &Path) -> FxStudioResult<()> {
        Ok(())
    }
    fn add_actor(&mut self, _: &str) -> i64 {
        self.code
    }
    fn modify_actor(&mut self, _: &str) -> FxStudioResult<()> {
        Ok(())
    }
    fn pick_actor(&mut self, _: i32, _: i32) -> PickResult {
        PickResult::default()
    }
    fn set_picked_actor(&mut self, _: ActorId) {}
    fn set_move_callback(&mut self, _: MoveCallback) {}
}

#[test]
fn rejected_actor_leaves_project_unchanged() {
    for code in [0, -1, -42] {
        let dir = temp_dir("rejected_actor");
        let mut ed = EditorContext::new(Box::new(RejectingBackend { code }), settings(&dir));
        ed.start(WindowHandle(1), 800, 600).unwrap();
        ed.new_project(&dir, "Demo").unwrap();

        let before = ed.project().unwrap().actor_count();
        assert_eq!(ed.add_primitive(ActorKind::Teapot).unwrap(), None);
        assert_eq!(ed.project().unwrap().actor_count(), before);

        let scene = ed.project().unwrap().scene();
        assert_eq!(
            ed.project().unwrap().document().child_elements(scene).count(),
            before
        );
        std::fs::remove_dir_all(&dir).ok();
    }
}

#[test]
fn added_actor_xml_reaches_renderer_and_project() {
    let dir = temp_dir("added_actor");
    let backend = HeadlessBackend::new(RenderSettings::default());
    let probe = backend.probe();
    let mut ed = EditorContext::new(Box::new(backend), settings(&dir));
    ed.start(WindowHandle(1), 800, 600).unwrap();
    ed.new_project(&dir, "Demo").unwrap();

    let id = ed.add_primitive(ActorKind::Sphere).unwrap().unwrap();
    let sent = probe.actor_xml(id).unwrap();
    assert!(sent.starts_with(r#"<Sphere type="Sphere"><TransformComponent>"#));

    let project = ed.project().unwrap();
    let local = project.document().to_xml_string(project.actor(id).unwrap()).unwrap();
    assert_eq!(local, sent);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn renderer_moves_are_applied_on_pump() {
    let dir = temp_dir("renderer_moves");
    let backend = HeadlessBackend::new(RenderSettings::default());
    let probe = backend.probe();
    let mut ed = EditorContext::new(Box::new(backend), settings(&dir));
    ed.start(WindowHandle(1), 800, 600).unwrap();
    ed.new_project(&dir, "Demo").unwrap();
    let id = ed.add_primitive(ActorKind::Cube).unwrap().unwrap();

    assert!(probe.simulate_move(&format!(
        r#"<Cube id="{id}"><TransformComponent><Translation x="9" y="8" z="7"/><Scale x="1" y="1" z="1"/><Rotation x="0" y="0" z="0"/></TransformComponent></Cube>"#
    )));
    assert!(probe.simulate_move("<broken"));
    assert_eq!(ed.pump_renderer_events(), 1);
    assert_eq!(ed.pump_renderer_events(), 0);

    let project = ed.project().unwrap();
    let doc = project.document();
    let t = doc
        .first_child_named(project.actor(id).unwrap(), "TransformComponent")
        .unwrap();
    let tr = doc.first_child_named(t, "Translation").unwrap();
    assert_eq!(doc.attribute(tr, "x"), Some("9"));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn transform_edit_and_material_go_out_as_patches() {
    let dir = temp_dir("patches");
    let backend = HeadlessBackend::new(RenderSettings::default());
    let probe = backend.probe();
    let mut ed = EditorContext::new(Box::new(backend), settings(&dir));
    ed.start(WindowHandle(1), 800, 600).unwrap();
    ed.new_project(&dir, "Demo").unwrap();
    let id = ed.add_primitive(ActorKind::Plane).unwrap().unwrap();

    ed.assign_material(r"C:\lib\Marble.mat", id, 0).unwrap();
    ed.edit_transform("TransformComponent", "Translation", Vec3::new(0.25, 1.0, 0.0))
        .unwrap();

    let patches: Vec<_> = probe
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            RendererCall::ModifyActor(xml) => Some(xml),
            _ => None,
        })
        .collect();
    assert_eq!(
        patches,
        [
            format!(
                r#"<Actor id="{id}"><PlaneRenderComponent><Material>Materials\Marble.mat</Material></PlaneRenderComponent></Actor>"#
            ),
            format!(
                r#"<Actor id="{id}"><TransformComponent><Translation x="0.25" y="1" z="0"/></TransformComponent></Actor>"#
            ),
        ]
    );
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn imported_model_becomes_actor_and_asset() {
    let dir = temp_dir("import_flow");
    let backend = HeadlessBackend::new(RenderSettings::default());
    let mut ed = EditorContext::new(Box::new(backend), settings(&dir));
    ed.start(WindowHandle(1), 800, 600).unwrap();
    ed.new_project(&dir, "Demo").unwrap();

    let source = dir.join("robot.obj");
    std::fs::write(&source, b"v 0 0 0\n").unwrap();
    let handle = ed
        .import_model(&source, Arc::new(CopyConverter::default()))
        .unwrap();
    let id = ed.complete_import(handle.wait()).unwrap().unwrap();

    assert!(dir.join("Models").join("robot.model").is_file());
    let project = ed.project().unwrap();
    assert_eq!(project.actor_kind(id).unwrap(), ActorKind::Model);
    assert_eq!(project.document().name(project.actor(id).unwrap()), Some("Robot"));
    let models = project.assets().entries(fxstudio::AssetSection::Models);
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].path, r"Models\robot.model");
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn model_names_that_are_not_xml_tags_are_refused_up_front() {
    let dir = temp_dir("import_bad_name");
    let backend = HeadlessBackend::new(RenderSettings::default());
    let probe = backend.probe();
    let mut ed = EditorContext::new(Box::new(backend), settings(&dir));
    ed.start(WindowHandle(1), 800, 600).unwrap();
    ed.new_project(&dir, "Demo").unwrap();

    let source = dir.join("my ship.obj");
    std::fs::write(&source, b"v 0 0 0\n").unwrap();
    let err = ed
        .import_model(&source, Arc::new(CopyConverter::default()))
        .err()
        .unwrap();
    assert!(matches!(err, fxstudio::FxStudioError::Import(_)));
    assert!(!dir.join("Models").join("my ship.model").exists());

    let model = dir.join("Models").join("3dcube.model");
    std::fs::create_dir_all(model.parent().unwrap()).unwrap();
    std::fs::write(&model, b"m").unwrap();
    assert!(ed.add_model(&model).is_err());
    assert_eq!(probe.actor_count(), 2);

    ed.save_all().unwrap();
    let reopened = fxstudio::Project::open(ed.project().unwrap().project_file()).unwrap();
    assert_eq!(reopened.actor_count(), 2);
    std::fs::remove_dir_all(&dir).ok();
}
