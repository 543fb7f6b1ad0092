//! Renderer trait abstraction.

use chalkboard_core::Board;
use chalkboard_core::shapes::ShapeId;
use kurbo::Size;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The board to render.
    pub board: &'a Board,
    /// Surface size in canvas pixels.
    pub viewport_size: Size,
    /// Background color.
    pub background_color: Color,
    /// Selection highlight color.
    pub selection_color: Color,
    /// Object hidden while the host shows an edit overlay for it.
    pub editing_id: Option<ShapeId>,
}

impl<'a> RenderContext<'a> {
    /// Create a context sized to the board's canvas.
    pub fn new(board: &'a Board) -> Self {
        Self {
            board,
            viewport_size: board.viewport().canvas_size(),
            background_color: Color::from_rgba8(250, 250, 250, 255),
            selection_color: Color::from_rgba8(59, 130, 246, 255), // Blue
            editing_id: None,
        }
    }

    pub fn with_viewport_size(mut self, size: Size) -> Self {
        self.viewport_size = size;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }

    /// Skip an object (e.g. a sticky note under a text-edit overlay).
    pub fn with_editing(mut self, id: Option<ShapeId>) -> Self {
        self.editing_id = id;
        self
    }
}

/// Trait for rendering backends.
///
/// Every call rebuilds the whole frame from the board; there is no diffing.
pub trait Renderer: Send + Sync {
    /// Build the command buffer for a frame.
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()>;

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}
