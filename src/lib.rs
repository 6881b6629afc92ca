#![forbid(unsafe_code)]

pub mod config;
pub mod editor;
pub mod error;
pub mod import;
pub mod project;
pub mod render;
pub mod scene;
pub mod xml;

pub use config::EditorSettings;
pub use editor::{EditorContext, EditorEvent, EventKind, Listener};
pub use error::{FxStudioError, FxStudioResult};
pub use import::{
    CopyConverter, ImportHandle, ImportJob, ImportOutcome, ModelConverter, is_supported_format,
    spawn_import,
};
pub use project::{AssetCatalog, AssetEntry, AssetSection, Project, asset_file_for};
pub use render::{
    BackendKind, HeadlessBackend, HeadlessProbe, MoveCallback, PickResult, RenderBackend,
    RenderSettings, RendererCall, WindowHandle, create_backend,
};
pub use scene::{ActorId, ActorKind, TransformSpec, Vec3};
pub use xml::{Attribute, NodeId, XmlDocument, XmlNode, resolve_path};
