use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use scenerep_cache::{BinaryRep, MAGIC, VERSION};
use scenerep_common::Transform;
use scenerep_geometry::{Mesh, Representation};
use scenerep_scene::{Occurrence, Reference, SelectionEvent, SelectionMode, World};
use scenerep_view::{DebugTextRenderer, Renderer, ViewSettings, Viewport};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scenerep-cli", about = "CLI tool for scenerep binary representation caches")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON file with viewport settings
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and cache format info
    Info,
    /// Build a demo representation and save it to a cache file
    Bake {
        path: PathBuf,
        /// Number of bodies in the representation
        #[arg(short, long, default_value = "3")]
        bodies: usize,
    },
    /// Check whether a cache file is up to date
    Check {
        path: PathBuf,
        /// Modification time of the source (RFC 3339); defaults to now
        #[arg(long)]
        source_time: Option<String>,
    },
    /// Load a cache file and print a summary
    Load { path: PathBuf },
    /// Build a demo world, select half of it and render it as text
    World {
        /// Number of occurrences to instance
        #[arg(short, long, default_value = "4")]
        occurrences: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let settings = load_settings(cli.settings.as_deref())?;

    match cli.command {
        Commands::Info => {
            println!("scenerep-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("cache: suffix={} version={} magic={}", BinaryRep::suffix(), VERSION, MAGIC);
            println!(
                "view: fov={} clip=[{}, {}] window={}x{}",
                settings.fov_degrees, settings.dist_min, settings.dist_max, settings.width, settings.height
            );
        }
        Commands::Bake { path, bodies } => {
            let rep = demo_representation(bodies);
            let mut cache = BinaryRep::new(&path);
            cache
                .try_save(&rep)
                .with_context(|| format!("saving {}", cache.path().display()))?;
            println!(
                "Baked {}: bodies={}, vertices={}, hash={}",
                cache.path().display(),
                rep.number_of_body(),
                rep.vertex_count(),
                &rep.content_hash()[..16]
            );
        }
        Commands::Check { path, source_time } => {
            let reference = match source_time {
                Some(text) => DateTime::parse_from_rfc3339(&text)
                    .with_context(|| format!("invalid --source-time {text:?}"))?
                    .with_timezone(&Utc),
                None => Utc::now(),
            };
            let mut cache = BinaryRep::new(&path);
            let fresh = cache.rep_is_up_to_date(reference)?;
            println!(
                "{}: {}",
                cache.path().display(),
                if fresh { "up to date" } else { "stale" }
            );
        }
        Commands::Load { path } => {
            let mut cache = BinaryRep::new(&path);
            let rep = cache.load_rep()?;
            let bbox = rep.bounding_box();
            println!("{}: {}", cache.path().display(), rep.name());
            println!("  modified: {}", rep.last_modified().to_rfc3339());
            println!(
                "  bodies={}, vertices={}, faces={}",
                rep.number_of_body(),
                rep.vertex_count(),
                rep.face_count()
            );
            if !bbox.is_empty() {
                println!("  bounds: {:?} .. {:?}", bbox.min(), bbox.max());
            }
            for body in rep.bodies() {
                println!("  - {} ({} faces)", body.name, body.face_count());
            }
        }
        Commands::World { occurrences } => run_world(occurrences, &settings)?,
    }

    Ok(())
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<ViewSettings> {
    let Some(path) = path else {
        return Ok(ViewSettings::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings {}", path.display()))?;
    let settings: ViewSettings = serde_json::from_str(&text)
        .with_context(|| format!("parsing settings {}", path.display()))?;
    if !(settings.fov_degrees > 0.0 && settings.fov_degrees < 180.0) {
        bail!("fov_degrees must lie in (0, 180), got {}", settings.fov_degrees);
    }
    if settings.dist_min.abs() >= settings.dist_max.abs() {
        bail!("dist_min must be below dist_max");
    }
    if settings.eye == settings.target {
        bail!("eye and target must differ");
    }
    tracing::debug!(?settings, "view settings loaded");
    Ok(settings)
}

fn demo_representation(bodies: usize) -> Representation {
    let mut rep = Representation::new("demo");
    for i in 0..bodies {
        let mut mesh = Mesh::cube(format!("body-{i}"), 1.0 + i as f32 * 0.5);
        let offset = glam::Vec3::new(i as f32 * 2.0, 0.0, 0.0);
        for p in &mut mesh.positions {
            *p += offset;
        }
        rep.add_body(mesh);
    }
    rep
}

fn run_world(occurrences: usize, settings: &ViewSettings) -> anyhow::Result<()> {
    let world = World::new();
    let root_id = world
        .root()
        .map(|root| root.borrow().id())
        .context("fresh world has no root")?;
    let part = Reference::with_representation("part", demo_representation(1));

    let mut ids = Vec::with_capacity(occurrences);
    for i in 0..occurrences {
        let occ = Occurrence::with_reference(format!("part-{i}"), Rc::clone(&part))
            .with_transform(Transform::from_translation(glam::Vec3::new(
                0.0,
                i as f32 * 3.0,
                0.0,
            )))
            .into_shared();
        ids.push(occ.borrow().id());
        world.add_child(root_id, occ)?;
    }

    let selected: Vec<_> = ids.iter().copied().step_by(2).collect();
    world
        .handle_mut()
        .update_selection(&SelectionEvent::new(SelectionMode::Replace, selected));

    let mut viewport = Viewport::from_settings(settings);
    let scene = world.bounding_box();
    if settings.reframe && !scene.is_empty() {
        viewport.reframe(&scene);
    }
    viewport.set_dist_min_and_max(&scene);

    let handle = world.handle();
    print!("{}", DebugTextRenderer::new().render(&handle, &viewport));
    println!(
        "references={}, bodies={}, part instances={}",
        handle.references().len(),
        handle.number_of_body(),
        world.reference_count(&part)
    );
    Ok(())
}
