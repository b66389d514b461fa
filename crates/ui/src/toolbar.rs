//! Tool buttons
//!
//! Every button carries the [`ToolId`] of the tool it toggles, assigned when
//! the button is mounted. The mode controller uses it to relabel and restyle
//! buttons as modes change.

use std::collections::HashMap;

/// Identifies the tool a button toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolId {
    // Drawing section
    Line,
    Polygon,
    Circle,
    Text,

    // Editing section
    Edit,
    SelectDelete,

    // Measuring section
    MeasureDistance,
    MeasureArea,
}

impl ToolId {
    /// All tools in toolbar order
    pub const ALL: [ToolId; 8] = [
        ToolId::Line,
        ToolId::Polygon,
        ToolId::Circle,
        ToolId::Text,
        ToolId::Edit,
        ToolId::SelectDelete,
        ToolId::MeasureDistance,
        ToolId::MeasureArea,
    ];

    /// Label shown while the tool is inactive
    fn default_idle_label(&self) -> &'static str {
        match self {
            ToolId::Line => "Line",
            ToolId::Polygon => "Polygon",
            ToolId::Circle => "Circle",
            ToolId::Text => "Text",
            ToolId::Edit => "Edit mode",
            ToolId::SelectDelete => "Select delete",
            ToolId::MeasureDistance => "Measure distance",
            ToolId::MeasureArea => "Measure area",
        }
    }

    /// Label shown while the tool is active
    fn default_active_label(&self) -> &'static str {
        match self {
            ToolId::Line | ToolId::Polygon | ToolId::Circle | ToolId::Text => "Cancel",
            ToolId::Edit => "Finish editing",
            ToolId::SelectDelete => "Cancel delete",
            ToolId::MeasureDistance => "Stop distance",
            ToolId::MeasureArea => "Stop area",
        }
    }
}

/// Visual state of a button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Normal,
    Active,
}

/// Label pair for one tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonLabels {
    pub idle: String,
    pub active: String,
}

/// Configuration for toolbar labels
#[derive(Debug, Clone)]
pub struct ToolbarConfig {
    labels: HashMap<ToolId, ButtonLabels>,
}

impl Default for ToolbarConfig {
    fn default() -> Self {
        let labels = ToolId::ALL
            .iter()
            .map(|&tool| {
                (
                    tool,
                    ButtonLabels {
                        idle: tool.default_idle_label().to_string(),
                        active: tool.default_active_label().to_string(),
                    },
                )
            })
            .collect();
        Self { labels }
    }
}

impl ToolbarConfig {
    /// Override the labels of one tool
    pub fn with_labels(
        mut self,
        tool: ToolId,
        idle: impl Into<String>,
        active: impl Into<String>,
    ) -> Self {
        self.labels.insert(
            tool,
            ButtonLabels {
                idle: idle.into(),
                active: active.into(),
            },
        );
        self
    }

    /// Labels for a tool
    pub fn labels(&self, tool: ToolId) -> ButtonLabels {
        self.labels.get(&tool).cloned().unwrap_or_else(|| ButtonLabels {
            idle: tool.default_idle_label().to_string(),
            active: tool.default_active_label().to_string(),
        })
    }
}

/// A mounted tool button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolButton {
    id: ToolId,
    labels: ButtonLabels,
    state: ButtonState,
}

impl ToolButton {
    fn new(id: ToolId, labels: ButtonLabels) -> Self {
        Self {
            id,
            labels,
            state: ButtonState::Normal,
        }
    }

    pub fn id(&self) -> ToolId {
        self.id
    }

    /// Text currently shown on the button
    pub fn label(&self) -> &str {
        match self.state {
            ButtonState::Normal => &self.labels.idle,
            ButtonState::Active => &self.labels.active,
        }
    }

    /// The label the button was mounted with
    pub fn idle_label(&self) -> &str {
        &self.labels.idle
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ButtonState::Active
    }
}

/// Registry of mounted tool buttons
#[derive(Debug, Clone, Default)]
pub struct Toolbar {
    config: ToolbarConfig,
    /// Mounted buttons in mount order
    buttons: Vec<ToolButton>,
}

impl Toolbar {
    /// Create an empty toolbar with default labels
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty toolbar with custom labels
    pub fn with_config(config: ToolbarConfig) -> Self {
        Self {
            config,
            buttons: Vec::new(),
        }
    }

    /// Create a toolbar with every tool mounted
    pub fn full(config: ToolbarConfig) -> Self {
        let mut toolbar = Self::with_config(config);
        for tool in ToolId::ALL {
            toolbar.mount(tool);
        }
        toolbar
    }

    /// Mount the button for a tool; mounting twice is a no-op
    pub fn mount(&mut self, tool: ToolId) {
        if self.button(tool).is_none() {
            let labels = self.config.labels(tool);
            self.buttons.push(ToolButton::new(tool, labels));
        }
    }

    /// Get the button for a tool, if mounted
    pub fn button(&self, tool: ToolId) -> Option<&ToolButton> {
        self.buttons.iter().find(|b| b.id == tool)
    }

    /// Iterate mounted buttons
    pub fn buttons(&self) -> impl Iterator<Item = &ToolButton> {
        self.buttons.iter()
    }

    /// Show a tool's button as active
    ///
    /// A missing button is logged and otherwise ignored.
    pub fn activate(&mut self, tool: ToolId) {
        match self.buttons.iter_mut().find(|b| b.id == tool) {
            Some(button) => button.state = ButtonState::Active,
            None => tracing::warn!(?tool, "tool button not mounted"),
        }
    }

    /// Restore every button's idle label and clear active styling
    pub fn reset_all(&mut self) {
        for button in &mut self.buttons {
            button.state = ButtonState::Normal;
        }
    }

    /// Tools whose buttons are currently shown as active
    pub fn active_tools(&self) -> Vec<ToolId> {
        self.buttons
            .iter()
            .filter(|b| b.is_active())
            .map(|b| b.id)
            .collect()
    }
}
