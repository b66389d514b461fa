//! Map Sketch UI Library
//!
//! Toolbar, pointer input and the interaction mode controller that routes
//! map input to drawing, editing and measuring.

pub mod input;
pub mod mode;
pub mod prompt;
pub mod toolbar;

pub use input::{ContextMenu, PointerButton, PointerEvent};
pub use mode::{DrawKind, InteractionMode, ModeController};
pub use prompt::{NoPrompt, ScriptedPrompt, TextPrompt};
pub use toolbar::{ButtonLabels, ButtonState, ToolButton, ToolId, Toolbar, ToolbarConfig};
