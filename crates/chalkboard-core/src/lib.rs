//! Chalkboard Core Library
//!
//! Platform-agnostic scene graph, tool state machine, gesture handling and
//! undo history for the Chalkboard whiteboard.

pub mod board;
pub mod config;
pub mod document;
pub mod gesture;
pub mod history;
pub mod input;
pub mod scene;
pub mod selection;
pub mod shapes;
pub mod storage;
pub mod tools;
pub mod transform;
pub mod viewport;

pub use board::{Board, EntryKind, EntryRequest};
pub use config::{BoardConfig, GestureConfig};
pub use document::{DocumentError, DocumentResult, SceneDocument};
pub use gesture::{GestureNormalizer, GestureOutput};
pub use history::History;
pub use input::{InputEvent, KeyCommand, Modifiers, MouseButton, PointerEvent, TouchEvent, TouchPhase};
pub use scene::Scene;
pub use selection::{Handle, HandleKind, ResizeAnchor, Selection};
pub use shapes::{Drawable, SerializableColor, ShapeId, ShapeKind, ShapeStyle};
pub use tools::{Interaction, ToolError, ToolKind, ToolManager};
pub use viewport::Viewport;
