use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use doc_model::{
    AnnotationElement, ContentKind, DocumentId, DocumentRecord, ElementId, ElementKind,
    ElementPatch,
};
use docnote_core::{EditorConfig, EditorSession, OverlayEngine, PropertyField, SaveOutcome};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use storage::{DirStore, DocumentStore};
use tracing_subscriber::EnvFilter;
use viewer_core::{DisplayPoint, RenderedBox};

#[derive(Debug, Parser)]
#[command(name = "docnote")]
#[command(about = "Annotate stored documents from the command line")]
pub struct Cli {
    /// Document store directory. Overrides config and DOCNOTE_STORE_DIR.
    #[arg(long, global = true, value_name = "DIR")]
    store: Option<PathBuf>,
    /// Editor configuration file (TOML).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Add a file to the store.
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Record id; defaults to the file stem.
        #[arg(long)]
        id: Option<String>,
    },
    /// Print document summaries as JSON.
    List,
    /// Print a document's stored annotations as JSON.
    Show {
        id: String,
        /// Only elements on this page.
        #[arg(long)]
        page: Option<u32>,
    },
    /// Create an element with default geometry and save.
    Add {
        id: String,
        #[arg(long)]
        kind: ElementKind,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Seed for the random initial placement.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Drop an element at a display position, as a finished drag would.
    Move {
        id: String,
        element: u64,
        #[arg(long, allow_negative_numbers = true)]
        x: f32,
        #[arg(long, allow_negative_numbers = true)]
        y: f32,
        #[arg(long, default_value_t = 1.0)]
        scale: f32,
    },
    /// Apply a rendered box, as a finished resize would.
    Resize {
        id: String,
        element: u64,
        #[arg(long)]
        width: f32,
        #[arg(long)]
        height: f32,
        #[arg(long, allow_negative_numbers = true)]
        x: Option<f32>,
        #[arg(long, allow_negative_numbers = true)]
        y: Option<f32>,
        #[arg(long, default_value_t = 1.0)]
        scale: f32,
    },
    /// Edit a property-panel field or text content.
    Set {
        id: String,
        element: u64,
        #[arg(long, requires = "value", conflicts_with = "content")]
        field: Option<PropertyField>,
        #[arg(long, allow_hyphen_values = true)]
        value: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete an element and save.
    Remove { id: String, element: u64 },
    /// Delete a whole document record.
    Delete { id: String },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Serialize)]
struct AddOutput {
    id: ElementId,
    kind: ElementKind,
    page: u32,
}

#[derive(Debug, Serialize)]
struct DeleteOutput<'a> {
    id: &'a str,
    deleted: bool,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    if let Commands::Version = cli.command {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = EditorConfig::load(cli.config.as_deref()).context("failed to load config")?;
    init_tracing(&config.log_filter);

    let mut store = open_store(cli.store.as_deref(), &config)?;
    tracing::debug!(root = %store.root().display(), "using document store");

    match cli.command {
        Commands::Import { file, id } => run_import(&mut store, &file, id),
        Commands::List => print_json(&store.list()?),
        Commands::Show { id, page } => run_show(&store, config, &id, page),
        Commands::Add { id, kind, page, seed } => run_add(&mut store, config, &id, kind, page, seed),
        Commands::Move { id, element, x, y, scale } => {
            finite("x", x)?;
            finite("y", y)?;
            positive_scale(scale)?;
            let mut session = open_session(&store, config, &id)?;
            session.viewport_mut().set_scale(scale);
            let (engine, viewport) = session.parts_mut();
            let element = ElementId(element);
            ensure_element(engine, element, &id)?;
            engine.drag_stop(element, DisplayPoint::new(x, y), viewport);
            save_and_print(&mut session, &mut store, element)
        }
        Commands::Resize { id, element, width, height, x, y, scale } => {
            whole_pixel("width", width)?;
            whole_pixel("height", height)?;
            x.map(|x| finite("x", x)).transpose()?;
            y.map(|y| finite("y", y)).transpose()?;
            positive_scale(scale)?;
            let mut session = open_session(&store, config, &id)?;
            session.viewport_mut().set_scale(scale);
            let (engine, viewport) = session.parts_mut();
            let element = ElementId(element);
            let current = ensure_element(engine, element, &id)?;
            let origin = viewport.transform().to_display_point(current.position);
            let rendered =
                RenderedBox::new(x.unwrap_or(origin.x), y.unwrap_or(origin.y), width, height);
            engine.resize_stop(element, rendered, viewport);
            save_and_print(&mut session, &mut store, element)
        }
        Commands::Set { id, element, field, value, content } => {
            let mut session = open_session(&store, config, &id)?;
            let engine = session.engine_mut();
            let element = ElementId(element);
            ensure_element(engine, element, &id)?;

            match (field, value, content) {
                (Some(field), Some(value), None) => {
                    engine.apply_property_input(element, field, &value)?;
                }
                (None, None, Some(content)) => {
                    engine.update_element(element, &ElementPatch::content(content));
                }
                _ => bail!("pass either --field with --value, or --content"),
            }
            save_and_print(&mut session, &mut store, element)
        }
        Commands::Remove { id, element } => {
            let mut session = open_session(&store, config, &id)?;
            let removed = session
                .engine_mut()
                .remove_element(ElementId(element))
                .with_context(|| format!("element {element} not found in document {id}"))?;
            session.save(&mut store)?;
            print_json(&removed)
        }
        Commands::Delete { id } => {
            let deleted = store.delete(&DocumentId::new(id.as_str()))?;
            if !deleted {
                bail!("document not found: {id}");
            }
            print_json(&DeleteOutput { id: &id, deleted })
        }
        Commands::Version => Ok(()),
    }
}

fn finite(flag: &str, value: f32) -> Result<f32> {
    if !value.is_finite() {
        bail!("--{flag} must be a finite number, got {value}");
    }
    Ok(value)
}

/// Rendered sizes are truncated to whole pixels, so anything under one pixel
/// would be dropped.
fn whole_pixel(flag: &str, value: f32) -> Result<f32> {
    if finite(flag, value)? < 1.0 {
        bail!("--{flag} must be at least 1 pixel, got {value}");
    }
    Ok(value)
}

fn positive_scale(scale: f32) -> Result<f32> {
    if finite("scale", scale)? <= 0.0 {
        bail!("--scale must be positive, got {scale}");
    }
    Ok(scale)
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn open_store(flag: Option<&Path>, config: &EditorConfig) -> Result<DirStore> {
    match flag.or(config.store_dir.as_deref()) {
        Some(root) => Ok(DirStore::with_root(root)),
        None => DirStore::from_default_project().context("failed to locate document store"),
    }
}

fn open_session(store: &DirStore, config: EditorConfig, id: &str) -> Result<EditorSession> {
    let mut session = EditorSession::new(config);
    session
        .open(store, &DocumentId::new(id))
        .with_context(|| format!("failed to open document {id}"))?;
    Ok(session)
}

fn ensure_element<'a>(
    engine: &'a OverlayEngine,
    element: ElementId,
    document: &str,
) -> Result<&'a AnnotationElement> {
    engine
        .element(element)
        .with_context(|| format!("element {element} not found in document {document}"))
}

fn save_and_print(
    session: &mut EditorSession,
    store: &mut DirStore,
    element: ElementId,
) -> Result<()> {
    let outcome = session.save(store).context("failed to save annotations")?;
    tracing::debug!(?outcome, "save finished");
    match session.engine().element(element) {
        Some(element) => print_json(element),
        None => bail!("element {element} disappeared after save"),
    }
}

fn run_import(store: &mut DirStore, file: &Path, id: Option<String>) -> Result<()> {
    if !file.is_file() {
        bail!("file does not exist: {}", file.display());
    }

    let extension = file.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
    let Some(mime_type) = ContentKind::mime_for_extension(extension) else {
        bail!("unsupported file type: {}", file.display());
    };

    let name = file.file_name().and_then(|name| name.to_str()).unwrap_or("document").to_owned();
    let id = match id {
        Some(id) => id,
        None => file
            .file_stem()
            .and_then(|stem| stem.to_str())
            .context("cannot derive a document id from the file name")?
            .to_owned(),
    };

    let content =
        fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let record = DocumentRecord::new(DocumentId::new(id), name, mime_type, content);
    let summary = record.summary();
    store.put(record).context("failed to store document")?;
    print_json(&summary)
}

fn run_show(store: &DirStore, config: EditorConfig, id: &str, page: Option<u32>) -> Result<()> {
    let session = open_session(store, config, id)?;
    let engine = session.engine();
    let elements: Vec<&AnnotationElement> = match page {
        Some(page) => engine.page_elements(page).collect(),
        None => engine.elements().iter().collect(),
    };
    print_json(&elements)
}

fn run_add(
    store: &mut DirStore,
    config: EditorConfig,
    id: &str,
    kind: ElementKind,
    page: u32,
    seed: Option<u64>,
) -> Result<()> {
    let engine = match seed {
        Some(seed) => OverlayEngine::seeded(&config, seed),
        None => OverlayEngine::new(&config),
    };
    let mut session = EditorSession::with_engine(config, engine);
    session
        .open(store, &DocumentId::new(id))
        .with_context(|| format!("failed to open document {id}"))?;

    let element = session.engine_mut().add_element(kind, page);
    if let SaveOutcome::NoDocument = session.save(store).context("failed to save annotations")? {
        bail!("no document open");
    }

    let page = session.engine().element(element).map_or(page, |el| el.page);
    print_json(&AddOutput { id: element, kind, page })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
