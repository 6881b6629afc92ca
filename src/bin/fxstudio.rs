use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fxstudio", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a project from the default templates.
    New(NewArgs),
    /// Add a primitive actor to a project.
    Add(AddArgs),
    /// Import a model file and place it in the scene.
    Import(ImportArgs),
    /// Assign a material to an actor.
    Material(MaterialArgs),
    /// List the actors of a project with their renderer ids.
    Actors(ProjectArg),
    /// Print the positional path of every element and attribute of an XML file.
    Paths(PathsArgs),
}

#[derive(Parser, Debug)]
struct NewArgs {
    /// Project name (file stem of the .fxsproj/.asset pair).
    #[arg(long)]
    name: String,

    /// Target directory. Defaults to `<projects dir>/<name>` from the editor settings.
    #[arg(long)]
    dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ProjectArg {
    /// Path to the .fxsproj file.
    #[arg(long)]
    project: PathBuf,
}

#[derive(Parser, Debug)]
struct AddArgs {
    #[command(flatten)]
    project: ProjectArg,

    #[arg(long, value_enum)]
    shape: Shape,
}

#[derive(Parser, Debug)]
struct ImportArgs {
    #[command(flatten)]
    project: ProjectArg,

    /// Source model (fbx, dae, blend, 3ds, ase, obj, ply, x, ms3d).
    #[arg(long)]
    source: PathBuf,
}

#[derive(Parser, Debug)]
struct MaterialArgs {
    #[command(flatten)]
    project: ProjectArg,

    #[arg(long)]
    actor: u32,

    /// Material file name, e.g. `Red.mat`.
    #[arg(long)]
    name: String,

    /// Mesh slot (models only).
    #[arg(long, default_value_t = 0)]
    mesh: i32,
}

#[derive(Parser, Debug)]
struct PathsArgs {
    #[arg(long)]
    file: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Shape {
    Teapot,
    Sphere,
    Torus,
    Plane,
    Cube,
    Cylinder,
}

impl From<Shape> for fxstudio::ActorKind {
    fn from(s: Shape) -> Self {
        match s {
            Shape::Teapot => Self::Teapot,
            Shape::Sphere => Self::Sphere,
            Shape::Torus => Self::Torus,
            Shape::Plane => Self::Plane,
            Shape::Cube => Self::Cube,
            Shape::Cylinder => Self::Cylinder,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::New(args) => cmd_new(args),
        Command::Add(args) => cmd_add(args),
        Command::Import(args) => cmd_import(args),
        Command::Material(args) => cmd_material(args),
        Command::Actors(args) => cmd_actors(args),
        Command::Paths(args) => cmd_paths(args),
    }
}

fn settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("FX Studio")
        .join(fxstudio::config::SETTINGS_FILE_NAME)
}

fn open_editor(project: &Path) -> anyhow::Result<fxstudio::EditorContext> {
    let backend = fxstudio::create_backend(
        fxstudio::BackendKind::Headless,
        &fxstudio::RenderSettings::default(),
    )?;
    let mut editor = fxstudio::EditorContext::new(backend, fxstudio::EditorSettings::default());
    editor
        .start(fxstudio::WindowHandle::default(), 0, 0)
        .context("create render instance")?;
    editor
        .open_project(project)
        .with_context(|| format!("open project '{}'", project.display()))?;
    Ok(editor)
}

fn cmd_new(args: NewArgs) -> anyhow::Result<()> {
    let dir = match args.dir {
        Some(dir) => dir,
        None => {
            let settings = fxstudio::EditorSettings::load_or_default(&settings_path())?;
            settings.ensure_projects_dir()?.join(&args.name)
        }
    };
    let project = fxstudio::Project::create(&dir, &args.name)?;
    eprintln!("wrote {}", project.project_file().display());
    Ok(())
}

fn cmd_add(args: AddArgs) -> anyhow::Result<()> {
    let mut editor = open_editor(&args.project.project)?;
    match editor.add_primitive(args.shape.into())? {
        Some(id) => println!("{id}"),
        None => anyhow::bail!("renderer rejected the {:?} actor", args.shape),
    }
    editor.save_all()?;
    Ok(())
}

fn cmd_import(args: ImportArgs) -> anyhow::Result<()> {
    let mut editor = open_editor(&args.project.project)?;
    let converter = Arc::new(fxstudio::CopyConverter::default());
    let mut handle = editor.import_model(&args.source, converter)?;
    while !handle.is_finished() {
        eprint!("\rimporting... {:>5.1}%", handle.try_progress());
        std::thread::sleep(std::time::Duration::from_millis(50));
    }
    eprintln!();
    let outcome = handle.wait();
    match editor.complete_import(outcome)? {
        Some(id) => println!("{id}"),
        None => anyhow::bail!("import of '{}' did not produce an actor", args.source.display()),
    }
    editor.save_all()?;
    Ok(())
}

fn cmd_material(args: MaterialArgs) -> anyhow::Result<()> {
    let mut editor = open_editor(&args.project.project)?;
    editor.assign_material(&args.name, args.actor, args.mesh)?;
    editor.save_all()?;
    Ok(())
}

fn cmd_actors(args: ProjectArg) -> anyhow::Result<()> {
    let project = fxstudio::Project::open(&args.project)?;
    let doc = project.document();
    for id in project.actor_ids() {
        let Some(node) = project.actor(id) else {
            continue;
        };
        println!(
            "{id}\t{}\t{}",
            doc.name(node).unwrap_or_default(),
            doc.attribute(node, "type").unwrap_or_default()
        );
    }
    Ok(())
}

fn cmd_paths(args: PathsArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("read '{}'", args.file.display()))?;
    let doc = fxstudio::XmlDocument::parse(&text)?;
    for node in doc.descendants(doc.document_node()) {
        let Some(name) = doc.name(node) else {
            continue;
        };
        let path = fxstudio::resolve_path(&doc, fxstudio::XmlNode::Element(node))?;
        println!("{path}\t<{name}>");
        for (index, attr) in doc.attributes(node).iter().enumerate() {
            let path = fxstudio::resolve_path(
                &doc,
                fxstudio::XmlNode::Attribute { owner: node, index },
            )?;
            println!("{path}\t@{}={}", attr.name, attr.value);
        }
    }
    Ok(())
}
