//! Tools and the interaction state machine.

use crate::shapes::{Drawable, Shape, ShapeKind, ShapeStyle, Stroke};
use crate::transform::{MoveState, ResizeState, RotateState};
use kurbo::{Point, Rect};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Shapes whose start and end are closer than this are not committed.
pub const MIN_SHAPE_EXTENT: f64 = 1.0;

/// Tool errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Pen,
    Eraser,
    Shape(ShapeKind),
    Text,
    Note,
    Hand,
}

impl ToolKind {
    /// Toolbar identifier.
    pub fn id(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Pen => "pen",
            ToolKind::Eraser => "eraser",
            ToolKind::Shape(kind) => kind.id(),
            ToolKind::Text => "text",
            ToolKind::Note => "note",
            ToolKind::Hand => "hand",
        }
    }
}

impl FromStr for ToolKind {
    type Err = ToolError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        match id {
            "select" => Ok(ToolKind::Select),
            "pen" => Ok(ToolKind::Pen),
            "eraser" => Ok(ToolKind::Eraser),
            "text" => Ok(ToolKind::Text),
            "note" => Ok(ToolKind::Note),
            "hand" => Ok(ToolKind::Hand),
            other => ShapeKind::from_id(other)
                .map(ToolKind::Shape)
                .ok_or_else(|| ToolError::UnknownTool(other.to_string())),
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// What the controller is doing between pointer-down and pointer-up.
///
/// At most one gesture is active; a pointer-down outside `Idle` is ignored.
#[derive(Debug, Clone, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// Panning the viewport; `last` is the previous device position.
    Panning { last: Point },
    DrawingStroke(Stroke),
    DrawingShape(Shape),
    Erasing,
    Dragging(MoveState),
    Resizing(ResizeState),
    Rotating(RotateState),
    /// Rubber-band selection in scene coordinates.
    BoxSelecting { start: Point, current: Point },
}

impl Interaction {
    pub fn name(&self) -> &'static str {
        match self {
            Interaction::Idle => "idle",
            Interaction::Panning { .. } => "panning",
            Interaction::DrawingStroke(_) => "drawing-stroke",
            Interaction::DrawingShape(_) => "drawing-shape",
            Interaction::Erasing => "erasing",
            Interaction::Dragging(_) => "dragging",
            Interaction::Resizing(_) => "resizing",
            Interaction::Rotating(_) => "rotating",
            Interaction::BoxSelecting { .. } => "box-selecting",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }
}

/// Manages the current tool, its interaction state and the style for new objects.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current interaction.
    pub state: Interaction,
    /// Style applied to new objects.
    pub current_style: ShapeStyle,
}

impl ToolManager {
    pub fn new(current_style: ShapeStyle) -> Self {
        Self {
            current_style,
            ..Self::default()
        }
    }

    /// Set the current tool. Any draft in progress is discarded.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.state = Interaction::Idle;
    }

    /// Check if a gesture is active.
    pub fn is_active(&self) -> bool {
        !self.state.is_idle()
    }

    /// Take the interaction, leaving the manager idle.
    pub fn take_state(&mut self) -> Interaction {
        std::mem::take(&mut self.state)
    }

    /// Start a pen or shape draft at a scene point. Returns false for other tools.
    pub fn begin(&mut self, point: Point) -> bool {
        self.state = match self.current_tool {
            ToolKind::Pen => {
                let mut stroke = Stroke::from_points(vec![point]);
                stroke.style = self.current_style.clone();
                Interaction::DrawingStroke(stroke)
            }
            ToolKind::Shape(kind) => {
                let mut shape = Shape::new(kind, point, point);
                shape.style = self.current_style.clone();
                Interaction::DrawingShape(shape)
            }
            _ => return false,
        };
        true
    }

    /// Extend the current draft.
    pub fn update(&mut self, point: Point) {
        match &mut self.state {
            Interaction::DrawingStroke(stroke) => stroke.add_point(point),
            Interaction::DrawingShape(shape) => shape.end = point,
            _ => {}
        }
    }

    /// Finish the current draft, returning the object to commit if it is not degenerate.
    pub fn end(&mut self, point: Point) -> Option<Drawable> {
        match self.take_state() {
            Interaction::DrawingStroke(mut stroke) => {
                if stroke.points.last() != Some(&point) {
                    stroke.add_point(point);
                }
                (stroke.len() >= 2).then_some(Drawable::Stroke(stroke))
            }
            Interaction::DrawingShape(mut shape) => {
                shape.end = point;
                (shape.start.distance(shape.end) >= MIN_SHAPE_EXTENT).then_some(Drawable::Shape(shape))
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// The draft being drawn, for live preview.
    pub fn preview(&self) -> Option<Drawable> {
        match &self.state {
            Interaction::DrawingStroke(stroke) => Some(Drawable::Stroke(stroke.clone())),
            Interaction::DrawingShape(shape) => Some(Drawable::Shape(shape.clone())),
            _ => None,
        }
    }

    /// The rubber-band rectangle, while box-selecting.
    pub fn selection_box(&self) -> Option<Rect> {
        match self.state {
            Interaction::BoxSelecting { start, current } => Some(Rect::from_points(start, current)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_ids() {
        assert_eq!("pen".parse::<ToolKind>(), Ok(ToolKind::Pen));
        assert_eq!(
            "rounded-rectangle".parse::<ToolKind>(),
            Ok(ToolKind::Shape(ShapeKind::RoundedRectangle))
        );
        assert_eq!(ToolKind::Shape(ShapeKind::Star).to_string(), "star");
        assert_eq!(
            "lasso".parse::<ToolKind>(),
            Err(ToolError::UnknownTool("lasso".to_string()))
        );
    }

    #[test]
    fn test_shape_draft() {
        let mut tm = ToolManager::default();
        tm.set_tool(ToolKind::Shape(ShapeKind::Rectangle));

        assert!(!tm.is_active());
        assert!(tm.begin(Point::new(0.0, 0.0)));
        assert!(tm.is_active());

        tm.update(Point::new(50.0, 50.0));
        assert!(tm.preview().is_some());

        let shape = tm.end(Point::new(100.0, 100.0));
        assert_eq!(shape.map(|s| s.bounds()), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
        assert!(!tm.is_active());
    }

    #[test]
    fn test_degenerate_drafts_are_dropped() {
        let mut tm = ToolManager::default();
        tm.set_tool(ToolKind::Pen);
        tm.begin(Point::new(5.0, 5.0));
        assert!(tm.end(Point::new(5.0, 5.0)).is_none());

        tm.set_tool(ToolKind::Shape(ShapeKind::Oval));
        tm.begin(Point::new(5.0, 5.0));
        assert!(tm.end(Point::new(5.2, 5.0)).is_none());
        assert!(!tm.is_active());
    }

    #[test]
    fn test_stroke_uses_current_style() {
        let mut style = ShapeStyle::default();
        style.stroke_width = 6.0;
        let mut tm = ToolManager::new(style);
        tm.set_tool(ToolKind::Pen);

        tm.begin(Point::new(0.0, 0.0));
        tm.update(Point::new(10.0, 0.0));
        let stroke = tm.end(Point::new(20.0, 0.0));
        assert_eq!(stroke.as_ref().map(|s| s.style().stroke_width), Some(6.0));
        assert_eq!(stroke.and_then(|s| s.as_stroke().map(Stroke::len)), Some(3));
    }

    #[test]
    fn test_select_tool_has_no_draft() {
        let mut tm = ToolManager::default();
        assert!(!tm.begin(Point::new(0.0, 0.0)));
        assert!(tm.end(Point::new(100.0, 100.0)).is_none());
    }
}
