mod api;
mod args;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use healthmap::background::BackgroundCommand;
use healthmap::consts::{LOGICAL_HEIGHT, LOGICAL_WIDTH};
use healthmap::engine::Action;
use healthmap::export::{self, ExportError};
use healthmap::gateway::{self, GatewayError};
use healthmap::input::{Mode, PointerKind};
use healthmap::mapper::{FixedViewport, FracPoint, Point, ScreenRect};
use healthmap::marker::{MarkerId, PetId, encode_marker_list};
use healthmap::render::legend;
use healthmap::session::{Flushed, Services, Session};
use healthmap::store::{Mutation, OpState};
use serde_json::{Value, json};
use tracing::info;

use crate::api::ApiClient;
use crate::args::{CanvasArg, PixelArg, parse_canvas, parse_fraction, parse_pixel};
use crate::config::{ApiConfig, ConfigError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("canvas {0}x{1} cannot be measured")]
    Unmeasurable(f64, f64),
    #[error("marker {0} not found")]
    UnknownMarker(MarkerId),
    #[error("change to marker {0} was rolled back by the marker service")]
    RolledBack(MarkerId),
    #[error("cannot write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "pawbook", about = "Pet health map command-line client")]
struct Cli {
    #[arg(long, env = "PAWBOOK_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "PAWBOOK_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Markers(MarkersCommand),
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct MarkersCommand {
    #[command(subcommand)]
    command: MarkersSubcommand,
}

#[derive(Subcommand, Debug)]
enum MarkersSubcommand {
    /// Print the marker list and its numbered legend.
    List { pet_id: PetId },
    /// Place a marker at a fractional position on the logical canvas.
    Place {
        pet_id: PetId,
        #[arg(long, value_parser = parse_fraction)]
        x: f64,
        #[arg(long, value_parser = parse_fraction)]
        y: f64,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Tap a canvas of the given on-screen size, as a pointer would.
    Tap {
        pet_id: PetId,
        #[arg(long, value_parser = parse_pixel, help = "Pixel position as X,Y")]
        at: PixelArg,
        #[arg(long, value_parser = parse_canvas, help = "On-screen canvas size as WxH")]
        canvas: CanvasArg,
        #[arg(long)]
        note: Option<String>,
    },
    /// Replace a marker's note.
    Note {
        pet_id: PetId,
        marker_id: MarkerId,
        #[arg(long)]
        note: String,
    },
    /// Delete a marker.
    Remove { pet_id: PetId, marker_id: MarkerId },
}

#[derive(Args, Debug)]
struct ExportArgs {
    pet_id: PetId,

    #[arg(long, help = "Flatten over this photo instead of the silhouette")]
    photo: Option<String>,

    #[arg(long, help = "Also write the PNG to this path")]
    write: Option<PathBuf>,

    #[arg(long, default_value_t = false, help = "Flatten without uploading")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = ApiConfig::from_env()?.with_overrides(cli.api_url.as_deref(), cli.token)?;
    let client = Arc::new(ApiClient::new(&config)?);
    let services = Services { markers: client.clone(), photos: client.clone(), loader: client };

    match cli.command {
        Command::Markers(markers) => run_markers(services, markers).await,
        Command::Export(args) => run_export(services, args).await,
    }
}

// =============================================================================
// MARKERS
// =============================================================================

fn logical_canvas() -> FixedViewport {
    FixedViewport::mounted(ScreenRect::sized(LOGICAL_WIDTH, LOGICAL_HEIGHT))
}

async fn run_markers(services: Services, markers: MarkersCommand) -> Result<(), CliError> {
    match markers.command {
        MarkersSubcommand::List { pet_id } => {
            let session = Session::open(pet_id, logical_canvas(), services).await?;
            let list = session.engine().markers();
            let rows: Vec<Value> = legend(list)
                .into_iter()
                .map(|e| json!({ "number": e.number, "id": e.id, "note": e.note }))
                .collect();
            print_json(&json!({ "markers": encode_marker_list(list)?, "legend": rows }))
        }
        MarkersSubcommand::Place { pet_id, x, y, note } => {
            let mut session = Session::open(pet_id, logical_canvas(), services).await?;
            let actions = session.engine_mut().place_marker(FracPoint { fx: x, fy: y }, note);
            let (_, flushed) = session.settle(actions).await;
            print_settled(&flushed)
        }
        MarkersSubcommand::Tap { pet_id, at, canvas, note } => {
            let viewport = FixedViewport::mounted(ScreenRect::sized(canvas.width, canvas.height));
            let mut session = Session::open(pet_id, viewport, services).await?;
            run_tap(&mut session, at, canvas, note).await
        }
        MarkersSubcommand::Note { pet_id, marker_id, note } => {
            let mut session = Session::open(pet_id, logical_canvas(), services).await?;
            let actions = session.engine_mut().update_marker(&marker_id, note);
            if actions.is_empty() {
                return Err(CliError::UnknownMarker(marker_id));
            }
            let (_, flushed) = session.settle(actions).await;
            print_settled(&flushed)
        }
        MarkersSubcommand::Remove { pet_id, marker_id } => {
            let mut session = Session::open(pet_id, logical_canvas(), services).await?;
            let actions = session.engine_mut().remove_marker(&marker_id);
            if actions.is_empty() {
                return Err(CliError::UnknownMarker(marker_id));
            }
            let (_, flushed) = session.settle(actions).await;
            print_settled(&flushed)
        }
    }
}

/// Drive the pointer path: a tap on empty canvas places, a tap on a pin selects it.
async fn run_tap(
    session: &mut Session<FixedViewport>,
    at: PixelArg,
    canvas: CanvasArg,
    note: Option<String>,
) -> Result<(), CliError> {
    let engine = session.engine_mut();
    let opened = engine.on_pointer_down(Point::new(at.x, at.y), PointerKind::Touch);
    if !opened.iter().any(|a| matches!(a, Action::OpenEditor { .. })) {
        return Err(CliError::Unmeasurable(canvas.width, canvas.height));
    }

    if let Mode::Selected { id, note: current } = engine.mode().clone() {
        match note {
            Some(text) if text != current => engine.set_draft_note(text),
            _ => {
                engine.cancel();
                return print_json(&json!({ "selected": id, "note": current }));
            }
        }
    } else if let Some(text) = note {
        engine.set_draft_note(text);
    }

    let actions = session.engine_mut().save();
    let (_, flushed) = session.settle(actions).await;
    print_settled(&flushed)
}

fn print_settled(flushed: &Flushed) -> Result<(), CliError> {
    if let Some(op) = flushed.settled.iter().find(|op| op.state == OpState::RolledBack) {
        return Err(CliError::RolledBack(op.mutation.marker_id()));
    }
    let rows: Vec<Value> = flushed
        .settled
        .iter()
        .map(|op| json!({ "op": op.id, "marker": op.mutation.marker_id(), "kind": mutation_kind(&op.mutation) }))
        .collect();
    print_json(&Value::Array(rows))
}

fn mutation_kind(mutation: &Mutation) -> &'static str {
    match mutation {
        Mutation::Place { .. } => "placed",
        Mutation::Update { .. } => "updated",
        Mutation::Remove { .. } => "removed",
    }
}

// =============================================================================
// EXPORT
// =============================================================================

async fn run_export(services: Services, args: ExportArgs) -> Result<(), CliError> {
    let mut session = Session::open(args.pet_id, logical_canvas(), services.clone()).await?;
    if let Some(url) = args.photo {
        session.engine_mut().apply_background(BackgroundCommand::UsePhoto(url));
    }

    if args.write.is_none() && !args.dry_run {
        let photo = session.export().await?;
        return print_json(&serde_json::to_value(photo)?);
    }

    let engine = session.engine();
    let png = export::flatten(engine.markers(), engine.background(), services.loader.as_ref()).await?;
    if let Some(path) = &args.write {
        std::fs::write(path, &png).map_err(|source| CliError::Write { path: path.clone(), source })?;
        info!(path = %path.display(), bytes = png.len(), "wrote health map png");
    }
    if args.dry_run {
        return print_json(&json!({ "bytes": png.len(), "uploaded": false }));
    }
    let photo = gateway::upload(services.photos.as_ref(), args.pet_id, png).await.map_err(ExportError::Upload)?;
    print_json(&serde_json::to_value(photo)?)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
