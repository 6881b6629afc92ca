pub mod actor;
pub mod factory;
pub mod fragments;
pub mod templates;

pub use actor::{
    ActorId, ActorKind, SYSTEM_ACTOR_MAX_ID, build_model_actor, build_primitive_actor,
    model_display_name, model_tag, wire_actor_id,
};
pub use factory::{
    DEFAULT_MATERIAL_PATH, TransformSpec, create_attribute, create_cube_render_component,
    create_cylinder_render_component, create_model_render_component,
    create_plane_render_component, create_render_component, create_sphere_render_component,
    create_teapot_render_component, create_torus_render_component, create_transform_component,
};
pub use fragments::{Vec3, build_material_assignment, build_transform_edit, material_reference};
pub use templates::{DEFAULT_ASSET_XML, DEFAULT_PROJECT_XML};
