//! Interaction mode controller
//!
//! Exactly one interaction mode observes map input at a time. Each mode's
//! transient state (the sketch being drawn, the vertex being dragged, the
//! settle countdown after a completed draw) lives inside the `Session`
//! value, so leaving a mode is a matter of replacing that value.

use std::fmt;
use std::time::Duration;

use mapsketch_core::{
    DrawSession, DrawnFeature, FeatureId, Geometry, MapCoordinate, MeasureKind,
    MeasurementEngine, OverlayHost, SketchKind, SketchProgress, StatusSink, ToolsConfig,
    VectorSource, VertexHandle,
};

use crate::input::{ContextMenu, PointerButton, PointerEvent};
use crate::prompt::{NoPrompt, TextPrompt};
use crate::toolbar::{ToolId, Toolbar, ToolbarConfig};

/// What the draw mode produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawKind {
    Line,
    Polygon,
    Circle,
    Text,
}

impl DrawKind {
    /// Toolbar button for this kind
    pub fn tool(&self) -> ToolId {
        match self {
            DrawKind::Line => ToolId::Line,
            DrawKind::Polygon => ToolId::Polygon,
            DrawKind::Circle => ToolId::Circle,
            DrawKind::Text => ToolId::Text,
        }
    }

    /// Sketch driven by this kind, `None` for one-shot text placement
    fn sketch_kind(&self) -> Option<SketchKind> {
        match self {
            DrawKind::Line => Some(SketchKind::Line),
            DrawKind::Polygon => Some(SketchKind::Polygon),
            DrawKind::Circle => Some(SketchKind::Circle),
            DrawKind::Text => None,
        }
    }
}

/// The active interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InteractionMode {
    #[default]
    None,
    Draw(DrawKind),
    Edit,
    SelectDelete,
    Measure(MeasureKind),
}

impl InteractionMode {
    /// Toolbar button that represents this mode
    pub fn tool(&self) -> Option<ToolId> {
        match self {
            InteractionMode::None => None,
            InteractionMode::Draw(kind) => Some(kind.tool()),
            InteractionMode::Edit => Some(ToolId::Edit),
            InteractionMode::SelectDelete => Some(ToolId::SelectDelete),
            InteractionMode::Measure(MeasureKind::Distance) => Some(ToolId::MeasureDistance),
            InteractionMode::Measure(MeasureKind::Area) => Some(ToolId::MeasureArea),
        }
    }

    pub fn is_none(&self) -> bool {
        *self == InteractionMode::None
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InteractionMode::None => "No tool",
            InteractionMode::Draw(DrawKind::Line) => "Line drawing",
            InteractionMode::Draw(DrawKind::Polygon) => "Polygon drawing",
            InteractionMode::Draw(DrawKind::Circle) => "Circle drawing",
            InteractionMode::Draw(DrawKind::Text) => "Text placement",
            InteractionMode::Edit => "Edit mode",
            InteractionMode::SelectDelete => "Select delete mode",
            InteractionMode::Measure(MeasureKind::Distance) => "Distance measurement",
            InteractionMode::Measure(MeasureKind::Area) => "Area measurement",
        };
        f.write_str(name)
    }
}

impl ToolId {
    /// Mode toggled by this tool's button
    pub fn mode(&self) -> InteractionMode {
        match self {
            ToolId::Line => InteractionMode::Draw(DrawKind::Line),
            ToolId::Polygon => InteractionMode::Draw(DrawKind::Polygon),
            ToolId::Circle => InteractionMode::Draw(DrawKind::Circle),
            ToolId::Text => InteractionMode::Draw(DrawKind::Text),
            ToolId::Edit => InteractionMode::Edit,
            ToolId::SelectDelete => InteractionMode::SelectDelete,
            ToolId::MeasureDistance => InteractionMode::Measure(MeasureKind::Distance),
            ToolId::MeasureArea => InteractionMode::Measure(MeasureKind::Area),
        }
    }
}

/// Vertex grabbed by an edit-mode drag
#[derive(Debug, Clone, Copy, PartialEq)]
struct VertexDrag {
    feature: FeatureId,
    handle: VertexHandle,
}

/// State owned by the active mode
#[derive(Debug)]
enum Session {
    Idle,
    Draw {
        kind: DrawKind,
        sketch: Option<DrawSession>,
        /// Time left before leaving draw mode after a completed shape
        settling: Option<Duration>,
    },
    Edit {
        drag: Option<VertexDrag>,
    },
    SelectDelete,
    Measure(MeasureKind),
}

impl Session {
    fn mode(&self) -> InteractionMode {
        match self {
            Session::Idle => InteractionMode::None,
            Session::Draw { kind, .. } => InteractionMode::Draw(*kind),
            Session::Edit { .. } => InteractionMode::Edit,
            Session::SelectDelete => InteractionMode::SelectDelete,
            Session::Measure(kind) => InteractionMode::Measure(*kind),
        }
    }
}

/// What a context-menu click does in the current draw session
enum DrawExit {
    Finish(DrawSession),
    Abort,
}

/// Owns the active mode, the drawn features and the measurement overlays
pub struct ModeController {
    config: ToolsConfig,
    session: Session,
    source: VectorSource,
    measurements: MeasurementEngine,
    toolbar: Toolbar,
    status: Box<dyn StatusSink>,
    prompt: Box<dyn TextPrompt>,
}

impl ModeController {
    /// Create a controller with every tool mounted and no overlay host
    pub fn new(config: ToolsConfig, status: Box<dyn StatusSink>) -> Self {
        Self {
            config,
            session: Session::Idle,
            source: VectorSource::new(),
            measurements: MeasurementEngine::detached(),
            toolbar: Toolbar::full(ToolbarConfig::default()),
            status,
            prompt: Box::new(NoPrompt),
        }
    }

    /// Render measurement overlays through `host`
    pub fn with_overlay_host(mut self, host: Box<dyn OverlayHost>) -> Self {
        self.measurements = MeasurementEngine::new(host);
        self
    }

    /// Ask `prompt` for text labels
    pub fn with_prompt(mut self, prompt: Box<dyn TextPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    /// Use a custom toolbar
    pub fn with_toolbar(mut self, toolbar: Toolbar) -> Self {
        self.toolbar = toolbar;
        self
    }

    /// Currently active mode
    pub fn mode(&self) -> InteractionMode {
        self.session.mode()
    }

    pub fn source(&self) -> &VectorSource {
        &self.source
    }

    pub fn measurements(&self) -> &MeasurementEngine {
        &self.measurements
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    pub fn config(&self) -> &ToolsConfig {
        &self.config
    }

    /// Vertices of the shape being drawn, if any
    pub fn sketch(&self) -> Option<&DrawSession> {
        match &self.session {
            Session::Draw { sketch, .. } => sketch.as_ref(),
            _ => None,
        }
    }

    /// Whether a completed draw is waiting to leave draw mode
    pub fn is_settling(&self) -> bool {
        matches!(self.session, Session::Draw { settling: Some(_), .. })
    }

    pub fn is_distance_measure_active(&self) -> bool {
        self.mode() == InteractionMode::Measure(MeasureKind::Distance)
    }

    /// Toggle the mode behind a toolbar button
    pub fn toggle_tool(&mut self, tool: ToolId) {
        match tool.mode() {
            InteractionMode::Draw(kind) => self.toggle_draw_tool(kind),
            InteractionMode::Edit => self.toggle_edit_mode(),
            InteractionMode::SelectDelete => self.toggle_select_delete_mode(),
            InteractionMode::Measure(kind) => self.toggle_measure_mode(kind),
            InteractionMode::None => {}
        }
    }

    /// Enter draw mode for `kind`, or leave it if already drawing that kind
    pub fn toggle_draw_tool(&mut self, kind: DrawKind) {
        if self.mode() == InteractionMode::Draw(kind) {
            self.deactivate_all();
            return;
        }
        self.deactivate_all();
        self.session = Session::Draw {
            kind,
            sketch: None,
            settling: None,
        };
        self.enter(InteractionMode::Draw(kind));

        let hint = match kind {
            DrawKind::Line => "Line tool active - click to add points, right-click to finish",
            DrawKind::Polygon => {
                "Polygon tool active - click to add points, click the first point to close"
            }
            DrawKind::Circle => "Circle tool active - click the center, then a point on the rim",
            DrawKind::Text => "Text tool active - click where the label goes",
        };
        self.report(hint);
    }

    pub fn toggle_edit_mode(&mut self) {
        if self.mode() == InteractionMode::Edit {
            self.deactivate_all();
            return;
        }
        self.deactivate_all();
        self.session = Session::Edit { drag: None };
        self.enter(InteractionMode::Edit);
        self.report("Edit mode on - select a shape, then drag its vertices");
    }

    pub fn toggle_select_delete_mode(&mut self) {
        if self.mode() == InteractionMode::SelectDelete {
            self.deactivate_all();
            return;
        }
        self.deactivate_all();
        self.session = Session::SelectDelete;
        self.enter(InteractionMode::SelectDelete);
        self.report("Select delete mode on - click a shape to delete it, right-click to exit");
    }

    /// Enter the measure mode for `kind`; the other measure kind is left first
    pub fn toggle_measure_mode(&mut self, kind: MeasureKind) {
        if self.mode() == InteractionMode::Measure(kind) {
            self.deactivate_all();
            return;
        }
        self.deactivate_all();
        self.session = Session::Measure(kind);
        self.enter(InteractionMode::Measure(kind));
        let hint = match kind {
            MeasureKind::Distance => "Distance measurement on - click a shape to measure it",
            MeasureKind::Area => "Area measurement on - click a polygon or circle to measure it",
        };
        self.report(hint);
    }

    /// Leave the active mode and reset every toolbar button
    ///
    /// Safe to call when no mode is active.
    pub fn deactivate_all(&mut self) {
        let previous = std::mem::replace(&mut self.session, Session::Idle);
        let mode = previous.mode();

        match previous {
            Session::Draw {
                sketch: Some(sketch),
                ..
            } => sketch.abort(),
            Session::Measure(_) => self.measurements.hide_all(),
            _ => {}
        }
        self.toolbar.reset_all();

        if !mode.is_none() {
            tracing::debug!(%mode, "mode deactivated");
            self.report(&format!("{mode} off"));
        }
    }

    /// Route a click by button
    pub fn on_click(&mut self, button: PointerButton, event: PointerEvent) -> ContextMenu {
        match button {
            PointerButton::Primary => {
                self.on_primary_click(event);
                ContextMenu::Default
            }
            PointerButton::Secondary => self.on_context_menu(event),
        }
    }

    /// Handle a primary click on the map
    pub fn on_primary_click(&mut self, event: PointerEvent) {
        let mode = self.mode();
        if let InteractionMode::Draw(kind) = mode {
            self.draw_click(kind, event);
            return;
        }

        let tolerance = event.tolerance(self.config.hit_tolerance_px);
        let hit = self.source.feature_at(&event.coordinate, tolerance);
        self.source.select_only(hit);

        match mode {
            InteractionMode::Edit => {
                if hit.is_some() {
                    self.report("Shape selected - drag a vertex to reshape it");
                }
            }
            InteractionMode::SelectDelete => {
                if let Some(id) = hit {
                    self.source.remove(id);
                    tracing::debug!(feature = %id, "feature deleted");
                    self.report("Shape deleted");
                }
            }
            InteractionMode::Measure(kind) => {
                let outcome = hit.and_then(|id| self.source.get(id)).map(|feature| {
                    self.measurements
                        .toggle_display(feature, event.coordinate, kind)
                });
                match outcome {
                    Some(outcome) => self.report(&outcome.status_message(kind)),
                    None => tracing::debug!("measure click hit no feature"),
                }
            }
            InteractionMode::None | InteractionMode::Draw(_) => {}
        }
    }

    /// Handle a secondary click; the result says whether to suppress the
    /// default context menu
    pub fn on_context_menu(&mut self, _event: PointerEvent) -> ContextMenu {
        match &mut self.session {
            Session::Draw {
                kind,
                sketch,
                settling: None,
            } => {
                let exit = match (*kind, sketch.take()) {
                    (DrawKind::Line, Some(sketch)) => DrawExit::Finish(sketch),
                    (_, Some(sketch)) => {
                        sketch.abort();
                        DrawExit::Abort
                    }
                    (_, None) => DrawExit::Abort,
                };
                match exit {
                    DrawExit::Finish(sketch) => match sketch.finish() {
                        Some(geometry) => self.complete_draw(geometry),
                        None => {
                            self.report("A line needs at least two points");
                            self.deactivate_all();
                        }
                    },
                    DrawExit::Abort => self.deactivate_all(),
                }
                ContextMenu::Suppress
            }
            Session::Draw { .. } => ContextMenu::Suppress,
            Session::SelectDelete => {
                self.deactivate_all();
                ContextMenu::Suppress
            }
            Session::Idle | Session::Edit { .. } | Session::Measure(_) => ContextMenu::Default,
        }
    }

    /// Press on the map; returns true when an edit drag starts and map
    /// panning should be suppressed
    pub fn on_pointer_down(&mut self, event: PointerEvent) -> bool {
        if !matches!(self.session, Session::Edit { .. }) {
            return false;
        }
        let tolerance = event.tolerance(self.config.vertex_tolerance_px);
        let grabbed = self.source.selected().and_then(|id| {
            let feature = self.source.get(id)?;
            let handle = feature.geometry().vertex_at(&event.coordinate, tolerance)?;
            Some(VertexDrag {
                feature: id,
                handle,
            })
        });

        if let Session::Edit { drag } = &mut self.session {
            *drag = grabbed;
        }
        if let Some(grab) = grabbed {
            tracing::debug!(feature = %grab.feature, handle = ?grab.handle, "vertex drag started");
        }
        grabbed.is_some()
    }

    /// Pointer moved over the map
    pub fn on_pointer_move(&mut self, event: PointerEvent) {
        match &mut self.session {
            Session::Draw {
                sketch: Some(sketch),
                ..
            } => sketch.move_pointer(event.coordinate),
            Session::Edit { drag: Some(drag) } => {
                let moved = self
                    .source
                    .get_mut(drag.feature)
                    .is_some_and(|f| f.geometry_mut().move_vertex(drag.handle, event.coordinate));
                if !moved {
                    tracing::warn!(feature = %drag.feature, "dragged vertex no longer exists");
                }
            }
            _ => {}
        }
    }

    /// Release on the map; ends any vertex drag
    pub fn on_pointer_up(&mut self, event: PointerEvent) {
        let finished = match &mut self.session {
            Session::Edit { drag } => drag.take(),
            _ => None,
        };
        if let Some(drag) = finished {
            if let Some(feature) = self.source.get_mut(drag.feature) {
                feature
                    .geometry_mut()
                    .move_vertex(drag.handle, event.coordinate);
                self.report("Shape modified");
            }
        }
    }

    /// Advance time; leaves draw mode once the post-draw delay has elapsed
    pub fn update(&mut self, elapsed: Duration) {
        let expired = match &mut self.session {
            Session::Draw {
                settling: Some(remaining),
                ..
            } => {
                *remaining = remaining.saturating_sub(elapsed);
                remaining.is_zero()
            }
            _ => false,
        };
        if expired {
            self.deactivate_all();
        }
    }

    /// Remove every measurement overlay and record
    pub fn clear_all_measurements(&mut self) {
        let count = self.measurements.clear_all();
        self.report(&format!("Cleared {count} measurement(s)"));
    }

    /// Remove every drawn feature
    pub fn clear_all_drawings(&mut self) {
        if let Session::Edit { drag } = &mut self.session {
            *drag = None;
        }
        let count = self.source.len();
        self.source.clear();
        tracing::debug!(count, "drawings cleared");
        self.report(&format!("Cleared {count} drawing(s)"));
    }

    fn enter(&mut self, mode: InteractionMode) {
        if let Some(tool) = mode.tool() {
            self.toolbar.activate(tool);
        }
        tracing::debug!(%mode, "mode activated");
    }

    fn draw_click(&mut self, kind: DrawKind, event: PointerEvent) {
        if self.is_settling() {
            tracing::debug!("click ignored while the finished shape settles");
            return;
        }
        let Some(sketch_kind) = kind.sketch_kind() else {
            self.place_text(event.coordinate);
            return;
        };

        let snap = event.tolerance(self.config.vertex_tolerance_px);
        let progress = match &mut self.session {
            Session::Draw {
                sketch: Some(sketch),
                ..
            } => sketch.add_vertex(event.coordinate),
            Session::Draw { sketch, .. } => {
                *sketch = Some(DrawSession::start(sketch_kind, event.coordinate, snap));
                SketchProgress::Continue
            }
            _ => return,
        };

        if let SketchProgress::Complete(geometry) = progress {
            self.complete_draw(geometry);
        }
    }

    fn complete_draw(&mut self, geometry: Geometry) {
        let delay = self.config.draw_settle_delay();
        if let Session::Draw {
            sketch, settling, ..
        } = &mut self.session
        {
            *sketch = None;
            *settling = Some(delay);
        }

        let kind = geometry.kind();
        let id = self.source.add(DrawnFeature::new(geometry));
        tracing::debug!(feature = %id, %kind, "feature drawn");
        self.report(&format!("Drew a {kind}"));

        if delay.is_zero() {
            self.deactivate_all();
        }
    }

    fn place_text(&mut self, position: MapCoordinate) {
        let label = self
            .prompt
            .request_text("Enter label text")
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        if let Some(label) = label {
            let id = self.source.add(DrawnFeature::text(position, label.as_str()));
            tracing::debug!(feature = %id, "text placed");
            self.report(&format!("Added text \"{label}\""));
        }
        self.deactivate_all();
    }

    fn report(&mut self, message: &str) {
        self.status.status(message);
    }
}

impl fmt::Debug for ModeController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeController")
            .field("config", &self.config)
            .field("session", &self.session)
            .field("source", &self.source)
            .field("measurements", &self.measurements)
            .field("toolbar", &self.toolbar)
            .finish_non_exhaustive()
    }
}
