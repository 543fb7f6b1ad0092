//! Immediate-mode display-list renderer.
//!
//! Each frame is rebuilt from scratch: background, objects in z-order, the
//! draft of the gesture in progress, then selection affordances on top.

use crate::renderer::{RenderContext, RenderResult, Renderer, RendererError};
use chalkboard_core::selection::HandleKind;
use chalkboard_core::shapes::{Drawable, StickyNote, apply_opacity};
use chalkboard_core::{Board, Handle};
use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape as KurboShape};
use peniko::Color;

/// Inset of sticky-note text from the note edge.
const NOTE_PADDING: f64 = 12.0;
/// Font size of sticky-note text.
const NOTE_FONT_SIZE: f64 = 16.0;
const NOTE_LINE_HEIGHT: f64 = 1.25;

/// What part of the frame a command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Background,
    Object,
    /// Draft of the stroke or shape being drawn.
    Preview,
    /// Selection outlines.
    Selection,
    Handle,
    /// Rubber-band selection box.
    Marquee,
}

/// A single drawing operation. Paths and points are in the coordinate
/// frame established by the enclosing transforms.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// Fill the whole surface.
    Clear(Color),
    /// Multiply the current transform by `Affine` until the matching pop.
    PushTransform(Affine),
    PopTransform,
    FillPath {
        path: BezPath,
        color: Color,
        layer: Layer,
    },
    StrokePath {
        path: BezPath,
        color: Color,
        width: f64,
        dashed: bool,
        layer: Layer,
    },
    /// One line of text; `origin` is the left end of the baseline.
    Text {
        origin: Point,
        content: String,
        font_size: f64,
        color: Color,
        layer: Layer,
    },
}

impl DrawCommand {
    pub fn layer(&self) -> Option<Layer> {
        match self {
            DrawCommand::Clear(_) => Some(Layer::Background),
            DrawCommand::PushTransform(_) | DrawCommand::PopTransform => None,
            DrawCommand::FillPath { layer, .. }
            | DrawCommand::StrokePath { layer, .. }
            | DrawCommand::Text { layer, .. } => Some(*layer),
        }
    }
}

/// Recorded frame.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Commands on one layer, in drawing order.
    pub fn on_layer(&self, layer: Layer) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(move |c| c.layer() == Some(layer))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Renderer that records a [`DisplayList`].
#[derive(Debug, Clone)]
pub struct DisplayListRenderer {
    list: DisplayList,
    selection_color: Color,
    /// Scene units per device pixel, so affordances keep a constant screen size.
    pixel: f64,
}

impl Default for DisplayListRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayListRenderer {
    pub fn new() -> Self {
        Self {
            list: DisplayList::new(),
            selection_color: Color::from_rgba8(59, 130, 246, 255),
            pixel: 1.0,
        }
    }

    /// The last frame built.
    pub fn display_list(&self) -> &DisplayList {
        &self.list
    }

    pub fn take_display_list(&mut self) -> DisplayList {
        std::mem::take(&mut self.list)
    }

    fn with_rotation(&mut self, object: &Drawable, draw: impl FnOnce(&mut Self)) {
        let rotation = object.rotation_transform();
        let rotated = rotation != Affine::IDENTITY;
        if rotated {
            self.list.push(DrawCommand::PushTransform(rotation));
        }
        draw(self);
        if rotated {
            self.list.push(DrawCommand::PopTransform);
        }
    }

    fn render_object(&mut self, object: &Drawable, layer: Layer) {
        self.with_rotation(object, |this| match object {
            Drawable::Stroke(_) | Drawable::Shape(_) => {
                let style = object.style();
                this.list.push(DrawCommand::StrokePath {
                    path: object.to_path(),
                    color: style.color_with_opacity(),
                    width: style.stroke_width,
                    dashed: false,
                    layer,
                });
            }
            Drawable::Text(text) => {
                this.list.push(DrawCommand::Text {
                    origin: text.anchor,
                    content: text.content.clone(),
                    font_size: text.font_size,
                    color: text.style.color_with_opacity(),
                    layer,
                });
            }
            Drawable::StickyNote(note) => this.render_note(note, layer),
        });
    }

    fn render_note(&mut self, note: &StickyNote, layer: Layer) {
        let bounds = Rect::from_origin_size(note.anchor, note.size());
        self.list.push(DrawCommand::FillPath {
            path: bounds.to_path(0.1),
            color: apply_opacity(note.background, note.style.opacity),
            layer,
        });

        let color = note.style.color_with_opacity();
        let line_height = NOTE_FONT_SIZE * NOTE_LINE_HEIGHT;
        let mut baseline = bounds.y0 + NOTE_PADDING + NOTE_FONT_SIZE;
        for line in note.content.lines() {
            if baseline > bounds.y1 - NOTE_PADDING {
                break;
            }
            self.list.push(DrawCommand::Text {
                origin: Point::new(bounds.x0 + NOTE_PADDING, baseline),
                content: line.to_string(),
                font_size: NOTE_FONT_SIZE,
                color,
                layer,
            });
            baseline += line_height;
        }
    }

    fn render_selection_outline(&mut self, object: &Drawable) {
        let path = object.bounds().to_path(0.1);
        let color = self.selection_color;
        let width = self.pixel;
        self.with_rotation(object, |this| {
            this.list.push(DrawCommand::StrokePath {
                path,
                color,
                width,
                dashed: true,
                layer: Layer::Selection,
            });
        });
    }

    fn render_handles(&mut self, board: &Board, object: &Drawable) {
        let handles = board.handles();
        let size = 2.0 * board.viewport().device_dist_to_scene(board.config().handle_radius);

        // Connector from the top edge to the rotate handle
        if let Some(rotate) = handles.iter().find(|h| h.kind == HandleKind::Rotate) {
            let bounds = object.bounds();
            let top = object.rotation_transform() * Point::new(bounds.center().x, bounds.y0);
            let mut path = BezPath::new();
            path.move_to(top);
            path.line_to(rotate.position);
            self.list.push(DrawCommand::StrokePath {
                path,
                color: self.selection_color,
                width: self.pixel,
                dashed: false,
                layer: Layer::Handle,
            });
        }

        for handle in &handles {
            self.render_handle(handle, size);
        }
    }

    fn render_handle(&mut self, handle: &Handle, size: f64) {
        let half = size / 2.0;
        let pos = handle.position;
        let path = match handle.kind {
            HandleKind::Rotate => Circle::new(pos, half).to_path(0.1),
            HandleKind::Resize(_) => {
                Rect::new(pos.x - half, pos.y - half, pos.x + half, pos.y + half).to_path(0.1)
            }
        };

        self.list.push(DrawCommand::FillPath {
            path: path.clone(),
            color: Color::WHITE,
            layer: Layer::Handle,
        });
        self.list.push(DrawCommand::StrokePath {
            path,
            color: self.selection_color,
            width: 1.5 * self.pixel,
            dashed: false,
            layer: Layer::Handle,
        });
    }

    fn render_marquee(&mut self, rect: Rect) {
        let path = rect.to_path(0.1);
        self.list.push(DrawCommand::FillPath {
            path: path.clone(),
            color: Color::from_rgba8(59, 130, 246, 25),
            layer: Layer::Marquee,
        });
        self.list.push(DrawCommand::StrokePath {
            path,
            color: self.selection_color,
            width: self.pixel,
            dashed: true,
            layer: Layer::Marquee,
        });
    }
}

impl Renderer for DisplayListRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        self.list.clear();
        let size = ctx.viewport_size;
        if size.width <= 0.0 || size.height <= 0.0 {
            return Err(RendererError::Surface(format!(
                "empty surface {}x{}",
                size.width, size.height
            )));
        }

        let board = ctx.board;
        let viewport = board.viewport();
        self.selection_color = ctx.selection_color;
        self.pixel = viewport.device_dist_to_scene(1.0);

        self.list.push(DrawCommand::Clear(self.background_color(ctx)));
        self.list.push(DrawCommand::PushTransform(viewport.transform()));

        for object in board.scene().objects_in_z_order() {
            if ctx.editing_id == Some(object.id()) {
                continue;
            }
            self.render_object(object, Layer::Object);
        }

        if let Some(preview) = board.tools().preview() {
            self.render_object(&preview, Layer::Preview);
        }

        let selection = board.selection();
        for id in selection.ids() {
            if let Some(object) = board.scene().get(*id) {
                self.render_selection_outline(object);
            }
        }
        if let Some(object) = selection.single().and_then(|id| board.scene().get(id)) {
            self.render_handles(board, object);
        }

        if let Some(rect) = board.tools().selection_box() {
            self.render_marquee(rect);
        }

        self.list.push(DrawCommand::PopTransform);
        log::trace!("built frame with {} commands", self.list.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chalkboard_core::shapes::{Shape, ShapeKind, Text};
    use chalkboard_core::{PointerEvent, SerializableColor};
    use kurbo::Size;
    use std::f64::consts::FRAC_PI_4;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Drawable {
        Shape::new(ShapeKind::Rectangle, Point::new(x0, y0), Point::new(x1, y1)).into()
    }

    fn build(board: &Board) -> DisplayList {
        let mut renderer = DisplayListRenderer::new();
        renderer.build_scene(&RenderContext::new(board)).unwrap();
        renderer.take_display_list()
    }

    #[test]
    fn test_empty_board() {
        let list = build(&Board::default());
        assert_eq!(list.len(), 3);
        assert!(matches!(list.commands()[0], DrawCommand::Clear(_)));
        assert!(matches!(list.commands()[1], DrawCommand::PushTransform(_)));
        assert!(matches!(list.commands()[2], DrawCommand::PopTransform));
    }

    #[test]
    fn test_objects_in_z_order() {
        let mut board = Board::default();
        board.add_object(rect(0.0, 0.0, 10.0, 10.0));
        board.create_text_at(Point::new(0.0, 50.0), "on top");

        let list = build(&board);
        let objects: Vec<_> = list.on_layer(Layer::Object).collect();
        assert_eq!(objects.len(), 2);
        assert!(matches!(objects[0], DrawCommand::StrokePath { .. }));
        assert!(matches!(objects[1], DrawCommand::Text { content, .. } if content == "on top"));
    }

    #[test]
    fn test_rotation_wraps_object() {
        let mut board = Board::default();
        let mut object = rect(0.0, 0.0, 100.0, 100.0);
        object.set_rotation(FRAC_PI_4);
        board.add_object(object);

        let list = build(&board);
        let pushes = list
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::PushTransform(_)))
            .count();
        let pops = list
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::PopTransform))
            .count();
        assert_eq!(pushes, 2);
        assert_eq!(pops, 2);
    }

    #[test]
    fn test_opacity_scales_alpha() {
        let mut board = Board::default();
        let mut text = Text::new(Point::new(0.0, 20.0), "faded".to_string(), 20.0);
        text.style.opacity = 0.5;
        board.add_object(text.into());

        let list = build(&board);
        let alpha = list.on_layer(Layer::Object).find_map(|c| match c {
            DrawCommand::Text { color, .. } => Some(color.components[3]),
            _ => None,
        });
        assert!(alpha.is_some_and(|a| (a - 0.5).abs() < 0.01));
    }

    #[test]
    fn test_single_selection_draws_handles() {
        let mut board = Board::default();
        let id = board.add_object(rect(0.0, 0.0, 100.0, 100.0));
        board.select(id);

        let list = build(&board);
        assert_eq!(list.on_layer(Layer::Selection).count(), 1);
        let fills = list
            .on_layer(Layer::Handle)
            .filter(|c| matches!(c, DrawCommand::FillPath { .. }))
            .count();
        assert_eq!(fills, 9);
    }

    #[test]
    fn test_multi_selection_outlines_only() {
        let mut board = Board::default();
        board.add_object(rect(0.0, 0.0, 10.0, 10.0));
        board.add_object(rect(20.0, 0.0, 30.0, 10.0));
        board.select_all();

        let list = build(&board);
        assert_eq!(list.on_layer(Layer::Selection).count(), 2);
        assert_eq!(list.on_layer(Layer::Handle).count(), 0);
    }

    #[test]
    fn test_preview_and_marquee() {
        let mut board = Board::default();
        board.set_tool("star").unwrap();
        board.handle_pointer(PointerEvent::down(Point::new(0.0, 0.0)));
        board.handle_pointer(PointerEvent::moved(Point::new(40.0, 40.0)));
        assert_eq!(build(&board).on_layer(Layer::Preview).count(), 1);
        board.handle_pointer(PointerEvent::up(Point::new(40.0, 40.0)));

        board.set_tool("select").unwrap();
        board.handle_pointer(PointerEvent::down(Point::new(200.0, 200.0)));
        board.handle_pointer(PointerEvent::moved(Point::new(260.0, 240.0)));
        let list = build(&board);
        assert_eq!(list.on_layer(Layer::Preview).count(), 0);
        assert_eq!(list.on_layer(Layer::Marquee).count(), 2);
    }

    #[test]
    fn test_note_background_and_lines() {
        let mut board = Board::default();
        let yellow = SerializableColor::note_yellow();
        let id = board.create_note_at(Point::new(100.0, 100.0), "first\nsecond", Some(yellow));

        let list = build(&board);
        let objects: Vec<_> = list.on_layer(Layer::Object).collect();
        assert_eq!(objects.len(), 3);
        assert!(matches!(objects[0], DrawCommand::FillPath { .. }));

        let mut renderer = DisplayListRenderer::new();
        renderer
            .build_scene(&RenderContext::new(&board).with_editing(Some(id)))
            .unwrap();
        assert_eq!(renderer.display_list().on_layer(Layer::Object).count(), 0);
    }

    #[test]
    fn test_empty_surface_is_an_error() {
        let board = Board::default();
        let mut renderer = DisplayListRenderer::new();
        let ctx = RenderContext::new(&board).with_viewport_size(Size::ZERO);
        assert!(matches!(renderer.build_scene(&ctx), Err(RendererError::Surface(_))));
        assert!(renderer.display_list().is_empty());
    }
}
