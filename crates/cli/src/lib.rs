use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mapsketch_core::{MapCoordinate, Overlay, OverlayHost, OverlayId, ToolsConfig};
use mapsketch_ui::{ModeController, PointerEvent, ScriptedPrompt, TextPrompt, ToolId};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mapsketch")]
#[command(about = "Replay map drawing and measuring sessions")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Feed a recorded input script to the mode controller.
    Replay {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
        /// Tool configuration JSON; MAPSKETCH_* variables apply on top.
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Print a JSON summary of the final state.
        #[arg(long)]
        summary: bool,
    },
    /// Print CLI version.
    Version,
}

/// One recorded input
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Toggle(ToolId),
    Click([f64; 2]),
    ContextMenu([f64; 2]),
    PointerDown([f64; 2]),
    PointerMove([f64; 2]),
    PointerUp([f64; 2]),
    WaitMs(u64),
    /// Answer for the next text prompt
    Prompt(String),
    ClearMeasurements,
    ClearDrawings,
}

/// Errors loading a replay script
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("failed to read script {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed script: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parse a script from JSON text
pub fn parse_script(json: &str) -> Result<Vec<Step>, ScriptError> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a script file
pub fn load_script(path: &Path) -> Result<Vec<Step>, ScriptError> {
    let json = fs::read_to_string(path).map_err(|source| ScriptError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_script(&json)
}

#[derive(Debug, Serialize)]
struct ReplaySummary {
    active_tool: Option<ToolId>,
    features: usize,
    measurements: usize,
    visible_overlays: usize,
}

/// Overlay host that traces overlay changes
#[derive(Debug, Default)]
struct TracingOverlays;

impl OverlayHost for TracingOverlays {
    fn add_overlay(&mut self, overlay: &Overlay) {
        tracing::info!(overlay = %overlay.id(), class = overlay.options().class_name, "overlay added");
    }

    fn update_overlay(&mut self, overlay: &Overlay) {
        tracing::info!(
            overlay = %overlay.id(),
            content = overlay.content(),
            position = ?overlay.position(),
            "overlay updated"
        );
    }

    fn remove_overlay(&mut self, id: OverlayId) {
        tracing::info!(overlay = %id, "overlay removed");
    }
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    init_tracing();

    match cli.command {
        Commands::Replay { script, config, summary } => {
            run_replay(&script, config.as_deref(), summary)
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_tracing() {
    // A subscriber may already be installed when run is called repeatedly
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<ToolsConfig> {
    let config = match path {
        Some(path) => ToolsConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?
            .with_env_overrides(),
        None => ToolsConfig::from_env(),
    };
    config.context("invalid tool configuration")
}

fn run_replay(script: &Path, config: Option<&Path>, summary: bool) -> Result<()> {
    let config = load_config(config)?;
    let steps = load_script(script)?;
    tracing::debug!(steps = steps.len(), ?config, "replaying script");

    let answers = Rc::new(RefCell::new(ScriptedPrompt::new()));
    let prompt = {
        let answers = Rc::clone(&answers);
        move |message: &str| answers.borrow_mut().request_text(message)
    };

    let mut controller = ModeController::new(config, Box::new(|message: &str| println!("{message}")))
        .with_overlay_host(Box::new(TracingOverlays))
        .with_prompt(Box::new(prompt));

    for step in steps {
        apply_step(&mut controller, &answers, step);
    }

    if summary {
        let payload = ReplaySummary {
            active_tool: controller.mode().tool(),
            features: controller.source().len(),
            measurements: controller.measurements().len(),
            visible_overlays: controller.measurements().visible_count(),
        };
        println!("{}", serde_json::to_string(&payload)?);
    }

    Ok(())
}

fn apply_step(controller: &mut ModeController, answers: &RefCell<ScriptedPrompt>, step: Step) {
    tracing::trace!(?step, "step");
    match step {
        Step::Toggle(tool) => controller.toggle_tool(tool),
        Step::Click(point) => controller.on_primary_click(event(point)),
        Step::ContextMenu(point) => {
            controller.on_context_menu(event(point));
        }
        Step::PointerDown(point) => {
            controller.on_pointer_down(event(point));
        }
        Step::PointerMove(point) => controller.on_pointer_move(event(point)),
        Step::PointerUp(point) => controller.on_pointer_up(event(point)),
        Step::WaitMs(ms) => controller.update(Duration::from_millis(ms)),
        Step::Prompt(text) => answers.borrow_mut().push(Some(text)),
        Step::ClearMeasurements => controller.clear_all_measurements(),
        Step::ClearDrawings => controller.clear_all_drawings(),
    }
}

fn event(point: [f64; 2]) -> PointerEvent {
    PointerEvent::new(MapCoordinate::from(point), 1.0)
}
