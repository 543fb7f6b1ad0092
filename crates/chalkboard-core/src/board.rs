//! The board: one scene, its history, selection, viewport and tool controller.
//!
//! Raw input flows through the [`GestureNormalizer`] into the tool state
//! machine, which mutates the scene and commits one history snapshot per
//! completed action. Hosts read the scene, selection and viewport back out
//! to render.

use crate::config::BoardConfig;
use crate::document::{DocumentResult, SceneDocument};
use crate::gesture::{GestureNormalizer, GestureOutput};
use crate::history::History;
use crate::input::{InputEvent, KeyCommand, Modifiers, MouseButton, PointerEvent};
use crate::scene::Scene;
use crate::selection::{Handle, HandleKind, Selection, get_handles, hit_test_handles};
use crate::shapes::{Drawable, SerializableColor, ShapeId, StickyNote, Text};
use crate::storage::{Storage, StorageResult, read_document, write_document};
use crate::tools::{Interaction, ToolError, ToolKind, ToolManager};
use crate::transform::{MoveState, ResizeState, RotateState, resize_to_pixels};
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Size, Vec2};
use std::time::Duration;

/// Which entry dialog the host should open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Text,
    Note,
}

/// Returned when the text or note tool is clicked: the host collects the
/// content and calls [`Board::create_text_at`] or [`Board::create_note_at`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryRequest {
    pub kind: EntryKind,
    /// Scene point that was clicked.
    pub position: Point,
}

/// A whiteboard.
#[derive(Debug, Clone)]
pub struct Board {
    config: BoardConfig,
    scene: Scene,
    history: History,
    selection: Selection,
    viewport: Viewport,
    tools: ToolManager,
    gestures: GestureNormalizer,
    clipboard: Vec<Drawable>,
    paste_count: u32,
    needs_redraw: bool,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

impl Board {
    pub fn new(config: BoardConfig) -> Self {
        Self {
            scene: Scene::new(),
            history: History::new(Vec::new(), config.history_cap),
            selection: Selection::new(),
            viewport: Viewport::new(config.min_scale, config.max_scale),
            tools: ToolManager::new(config.default_style.clone()),
            gestures: GestureNormalizer::new(config.gestures.clone()),
            clipboard: Vec::new(),
            paste_count: 0,
            needs_redraw: true,
            config,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        self.needs_redraw = true;
        &mut self.viewport
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    pub fn current_tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    /// The interaction in progress.
    pub fn interaction(&self) -> &Interaction {
        &self.tools.state
    }

    /// Whether anything changed since the last [`Board::mark_drawn`].
    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    pub fn mark_drawn(&mut self) {
        self.needs_redraw = false;
    }

    /// Update the surface sizes after the host canvas resizes.
    pub fn set_surface(&mut self, canvas_size: Size, client_size: Size) {
        self.viewport.set_surface(canvas_size, client_size);
        self.needs_redraw = true;
    }

    // --- Tools ---

    /// Select a tool by its toolbar id.
    pub fn set_tool(&mut self, id: &str) -> Result<(), ToolError> {
        let tool = id.parse::<ToolKind>().inspect_err(|err| log::warn!("{err}"))?;
        self.set_tool_kind(tool);
        Ok(())
    }

    pub fn set_tool_kind(&mut self, tool: ToolKind) {
        if tool == self.tools.current_tool {
            return;
        }
        self.abandon_gesture();
        log::debug!("tool: {} -> {}", self.tools.current_tool, tool);
        self.tools.set_tool(tool);
    }

    // --- Input ---

    /// Feed one raw input event. Returns an entry request when the text or
    /// note tool was clicked.
    pub fn handle_input(&mut self, event: InputEvent) -> Option<EntryRequest> {
        let outputs = self.gestures.handle(event);
        self.apply_gestures(outputs)
    }

    /// Let pending gesture timers fire. Call periodically with the host clock,
    /// on the same timeline as touch event timestamps.
    pub fn poll(&mut self, now: Duration) {
        let outputs = self.gestures.poll(now);
        self.apply_gestures(outputs);
    }

    fn apply_gestures(&mut self, outputs: Vec<GestureOutput>) -> Option<EntryRequest> {
        let mut request = None;
        for output in outputs {
            match output {
                GestureOutput::Pointer(event) => {
                    request = self.handle_pointer(event).or(request);
                }
                GestureOutput::Cancel => self.abandon_gesture(),
                GestureOutput::Zoom { focal, factor } => {
                    self.viewport.zoom_by(focal, factor);
                    self.needs_redraw = true;
                }
                GestureOutput::Pan { delta } => {
                    self.viewport.pan(delta);
                    self.needs_redraw = true;
                }
                GestureOutput::Tap { position } => {
                    log::debug!("tap at {position:?}");
                }
                GestureOutput::DoubleTap { position } => {
                    let target = if self.viewport.scale() > 1.0 + f64::EPSILON {
                        1.0
                    } else {
                        2.0
                    };
                    self.viewport.zoom_at(position, target);
                    self.needs_redraw = true;
                }
                GestureOutput::LongPress { position } => {
                    self.abandon_gesture();
                    let point = self.viewport.to_scene(position);
                    self.select_at(point);
                }
            }
        }
        request
    }

    /// Drive the tool state machine with a pointer event in device coordinates.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<EntryRequest> {
        match event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => self.pointer_down(position, button, modifiers),
            PointerEvent::Move { position, .. } => {
                self.pointer_move(position);
                None
            }
            PointerEvent::Up { position, .. } => {
                self.pointer_up(position);
                None
            }
        }
    }

    fn pointer_down(
        &mut self,
        device: Point,
        button: MouseButton,
        modifiers: Modifiers,
    ) -> Option<EntryRequest> {
        if self.tools.is_active() {
            log::debug!(
                "pointer-down ignored while {}",
                self.tools.state.name()
            );
            return None;
        }
        if button == MouseButton::Right {
            return None;
        }

        if self.tools.current_tool == ToolKind::Hand
            || button == MouseButton::Middle
            || modifiers.ctrl
        {
            self.tools.state = Interaction::Panning { last: device };
            return None;
        }

        let point = self.viewport.to_scene(device);
        match self.tools.current_tool {
            ToolKind::Select => self.select_down(point, modifiers),
            ToolKind::Pen | ToolKind::Shape(_) => {
                self.tools.begin(point);
                self.needs_redraw = true;
            }
            ToolKind::Eraser => {
                self.tools.state = Interaction::Erasing;
                self.erase_at(point);
            }
            ToolKind::Text => {
                return Some(EntryRequest {
                    kind: EntryKind::Text,
                    position: point,
                });
            }
            ToolKind::Note => {
                return Some(EntryRequest {
                    kind: EntryKind::Note,
                    position: point,
                });
            }
            ToolKind::Hand => {}
        }
        None
    }

    fn select_down(&mut self, point: Point, modifiers: Modifiers) {
        if let Some(handle) = self.handle_at(point) {
            let Some(object) = self.selection.single().and_then(|id| self.scene.get(id)).cloned()
            else {
                return;
            };
            self.tools.state = match handle {
                HandleKind::Resize(anchor) => {
                    Interaction::Resizing(ResizeState::new(object, anchor, self.config.min_resize))
                }
                HandleKind::Rotate => Interaction::Rotating(RotateState::new(object, point)),
            };
            return;
        }

        self.needs_redraw = true;
        match self.scene.hit_test(point) {
            Some(id) if modifiers.shift => self.selection.toggle(id),
            Some(id) => {
                if !self.selection.contains(id) {
                    self.selection.select(id);
                }
                let originals = self.selected_objects();
                self.tools.state = Interaction::Dragging(MoveState::new(point, originals));
            }
            None => {
                if !modifiers.shift {
                    self.selection.clear();
                }
                self.tools.state = Interaction::BoxSelecting {
                    start: point,
                    current: point,
                };
            }
        }
    }

    fn pointer_move(&mut self, device: Point) {
        let point = self.viewport.to_scene(device);
        match self.tools.state {
            Interaction::Idle => return,
            Interaction::DrawingStroke(_) | Interaction::DrawingShape(_) => self.tools.update(point),
            Interaction::Erasing => self.erase_at(point),
            _ => self.drive_gesture(device, point),
        }
        self.needs_redraw = true;
    }

    fn drive_gesture(&mut self, device: Point, point: Point) {
        match &mut self.tools.state {
            Interaction::Panning { last } => {
                let delta = device - *last;
                *last = device;
                self.viewport.pan(delta);
            }
            Interaction::Dragging(state) => state.update(&mut self.scene, point),
            Interaction::Resizing(state) => state.update(&mut self.scene, point),
            Interaction::Rotating(state) => state.update(&mut self.scene, point),
            Interaction::BoxSelecting { current, .. } => *current = point,
            _ => {}
        }
    }

    fn pointer_up(&mut self, device: Point) {
        let point = self.viewport.to_scene(device);
        if let Some(object) = self.tools.end(point) {
            let kind = object.kind_name();
            self.scene.add(object);
            self.commit(kind);
            return;
        }

        match self.tools.take_state() {
            Interaction::Dragging(mut state) => {
                state.update(&mut self.scene, point);
                if state.has_moved() {
                    self.commit("move");
                }
            }
            Interaction::Resizing(state) if state.has_changed() => self.commit("resize"),
            Interaction::Rotating(state) if state.has_changed() => self.commit("rotate"),
            Interaction::BoxSelecting { start, .. } => {
                if start != point {
                    let area = Rect::from_points(start, point);
                    let hits = self.scene.objects_overlapping(area);
                    log::debug!("box select: {} object(s)", hits.len());
                    for id in hits {
                        self.selection.add(id);
                    }
                }
            }
            _ => {}
        }
        self.needs_redraw = true;
    }

    /// Remove every stroke with a recorded point within its hit radius of `point`.
    fn erase_at(&mut self, point: Point) {
        let doomed: Vec<ShapeId> = self
            .scene
            .objects_in_z_order()
            .iter()
            .filter_map(Drawable::as_stroke)
            .filter(|stroke| stroke.has_point_within(point, stroke.hit_radius()))
            .map(|stroke| stroke.id)
            .collect();
        if doomed.is_empty() {
            return;
        }
        self.scene.remove_all(&doomed);
        self.selection.retain_existing(&self.scene);
        self.commit("erase");
    }

    /// Abandon the gesture in progress, restoring anything it moved.
    fn abandon_gesture(&mut self) {
        match self.tools.take_state() {
            Interaction::Idle => return,
            Interaction::Dragging(state) => state.restore(&mut self.scene),
            Interaction::Resizing(state) => state.restore(&mut self.scene),
            Interaction::Rotating(state) => state.restore(&mut self.scene),
            other => log::debug!("abandoned {}", other.name()),
        }
        self.needs_redraw = true;
    }

    /// Hit-test the single selection's handles at a scene point.
    fn handle_at(&self, point: Point) -> Option<HandleKind> {
        let object = self.selection.single().and_then(|id| self.scene.get(id))?;
        hit_test_handles(
            object,
            point,
            self.viewport.device_dist_to_scene(self.config.handle_radius),
            self.viewport.device_dist_to_scene(self.config.rotate_handle_offset),
        )
    }

    /// Handles of the single selection in scene coordinates.
    pub fn handles(&self) -> Vec<Handle> {
        self.selection
            .single()
            .and_then(|id| self.scene.get(id))
            .map(|object| {
                get_handles(
                    object,
                    self.viewport.device_dist_to_scene(self.config.rotate_handle_offset),
                )
            })
            .unwrap_or_default()
    }

    // --- History ---

    fn commit(&mut self, action: &str) {
        self.history.save_state(self.scene.snapshot());
        self.needs_redraw = true;
        log::debug!(
            "commit {action}: {} object(s), step {}",
            self.scene.len(),
            self.history.step()
        );
    }

    pub fn undo(&mut self) -> bool {
        self.abandon_gesture();
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.scene.replace(snapshot.to_vec());
        self.selection.clear();
        self.needs_redraw = true;
        true
    }

    pub fn redo(&mut self) -> bool {
        self.abandon_gesture();
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.scene.replace(snapshot.to_vec());
        self.selection.clear();
        self.needs_redraw = true;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // --- Keyboard commands ---

    /// Map a key press to a command and run it. Returns false if the key is unbound.
    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> bool {
        match KeyCommand::from_key(key, modifiers) {
            Some(command) => {
                self.execute(command);
                true
            }
            None => false,
        }
    }

    pub fn execute(&mut self, command: KeyCommand) {
        match command {
            KeyCommand::Undo => {
                self.undo();
            }
            KeyCommand::Redo => {
                self.redo();
            }
            KeyCommand::Copy => self.copy(),
            KeyCommand::Cut => self.cut(),
            KeyCommand::Paste => {
                self.paste();
            }
            KeyCommand::SelectAll => self.select_all(),
            KeyCommand::Delete => self.delete_selected(),
            KeyCommand::Escape => self.escape(),
        }
    }

    /// Copy the selection to the board clipboard.
    pub fn copy(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.clipboard = self.selected_objects();
        self.paste_count = 0;
    }

    pub fn cut(&mut self) {
        self.copy();
        self.delete_selected();
    }

    /// Paste the clipboard, offset further on each repeat, and select the copies.
    pub fn paste(&mut self) -> Vec<ShapeId> {
        if self.clipboard.is_empty() {
            return Vec::new();
        }
        self.abandon_gesture();
        self.paste_count += 1;
        let offset = self.config.paste_offset * f64::from(self.paste_count);

        let mut ids = Vec::with_capacity(self.clipboard.len());
        for original in &self.clipboard {
            let mut copy = original.clone();
            copy.regenerate_id();
            copy.translate(Vec2::new(offset, offset));
            ids.push(self.scene.add(copy));
        }
        self.selection.set(ids.iter().copied());
        self.commit("paste");
        ids
    }

    pub fn select_all(&mut self) {
        self.selection.set(self.scene.ids());
        self.needs_redraw = true;
    }

    /// Delete the selection as one action.
    pub fn delete_selected(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.abandon_gesture();
        let removed = self.scene.remove_all(self.selection.ids());
        self.selection.clear();
        if removed > 0 {
            self.commit("delete");
        }
    }

    /// Abandon the active gesture, or clear the selection when idle.
    pub fn escape(&mut self) {
        if self.tools.is_active() {
            self.abandon_gesture();
        } else {
            self.clear_selection();
        }
    }

    // --- Selection ---

    pub fn select(&mut self, id: ShapeId) {
        if self.scene.contains(id) {
            self.selection.select(id);
            self.needs_redraw = true;
        }
    }

    /// Select the topmost object at a scene point, or clear if there is none.
    pub fn select_at(&mut self, point: Point) -> Option<ShapeId> {
        let hit = self.scene.hit_test(point);
        match hit {
            Some(id) => self.selection.select(id),
            None => self.selection.clear(),
        }
        self.needs_redraw = true;
        hit
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.needs_redraw = true;
    }

    /// Selected objects in z-order.
    fn selected_objects(&self) -> Vec<Drawable> {
        self.scene
            .objects_in_z_order()
            .iter()
            .filter(|object| self.selection.contains(object.id()))
            .cloned()
            .collect()
    }

    fn single_selected(&self) -> Option<&Drawable> {
        self.selection.single().and_then(|id| self.scene.get(id))
    }

    // --- Object creation ---

    /// Add an object on top of the scene as one action.
    pub fn add_object(&mut self, object: Drawable) -> ShapeId {
        let kind = object.kind_name();
        let id = self.scene.add(object);
        self.commit(kind);
        id
    }

    /// Add a text object with its baseline starting at `point`. Empty text is ignored.
    pub fn create_text_at(&mut self, point: Point, content: &str) -> Option<ShapeId> {
        if content.trim().is_empty() {
            return None;
        }
        let mut text = Text::new(point, content.to_string(), self.config.default_font_size);
        text.style = self.tools.current_style.clone();
        Some(self.add_object(text.into()))
    }

    /// Add text at the centre of the visible area.
    pub fn create_text_at_center(&mut self, content: &str) -> Option<ShapeId> {
        self.create_text_at(self.viewport.visible_center(), content)
    }

    /// Add a sticky note centred on `point`.
    pub fn create_note_at(
        &mut self,
        point: Point,
        content: &str,
        background: Option<SerializableColor>,
    ) -> ShapeId {
        let size = self.config.note_size;
        let anchor = point - Vec2::new(size.width / 2.0, size.height / 2.0);
        let background = background.unwrap_or(self.config.note_background);
        let mut note = StickyNote::new(anchor, size, content.to_string(), background);
        note.style = self.tools.current_style.clone();
        self.add_object(note.into())
    }

    pub fn create_note_at_center(
        &mut self,
        content: &str,
        background: Option<SerializableColor>,
    ) -> ShapeId {
        self.create_note_at(self.viewport.visible_center(), content, background)
    }

    // --- Properties ---

    /// Apply `edit` to every selected object; commits once if anything changed.
    fn modify_selected(&mut self, action: &str, mut edit: impl FnMut(&mut Drawable)) {
        let mut changed = false;
        for id in self.selection.ids() {
            if let Some(object) = self.scene.get_mut(*id) {
                let before = object.clone();
                edit(object);
                changed |= *object != before;
            }
        }
        if changed {
            self.commit(action);
        }
    }

    pub fn color(&self) -> Option<SerializableColor> {
        self.single_selected().map(|object| object.style().color)
    }

    /// Set the color for new objects and the selection.
    pub fn set_color(&mut self, color: SerializableColor) {
        self.tools.current_style.color = color;
        self.modify_selected("color", |object| object.style_mut().color = color);
    }

    pub fn stroke_width(&self) -> Option<f64> {
        self.single_selected().map(|object| object.style().stroke_width)
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        if !width.is_finite() || width <= 0.0 {
            return;
        }
        self.tools.current_style.stroke_width = width;
        self.modify_selected("stroke width", |object| object.style_mut().stroke_width = width);
    }

    pub fn opacity(&self) -> Option<f64> {
        self.single_selected().map(|object| object.style().opacity)
    }

    /// Set opacity, clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f64) {
        if opacity.is_nan() {
            return;
        }
        let opacity = opacity.clamp(0.0, 1.0);
        self.tools.current_style.opacity = opacity;
        self.modify_selected("opacity", |object| object.style_mut().opacity = opacity);
    }

    /// Pixel size of the single selection.
    pub fn size(&self) -> Option<Size> {
        self.single_selected().map(|object| object.bounds().size())
    }

    pub fn set_size(&mut self, size: Size) {
        let Some(id) = self.selection.single() else {
            return;
        };
        if !size.width.is_finite() || !size.height.is_finite() {
            return;
        }
        let min = self.config.min_resize;
        let Some(object) = self.scene.get_mut(id) else {
            return;
        };
        let before = object.clone();
        resize_to_pixels(object, size, min);
        if *object != before {
            self.commit("resize");
        }
    }

    /// Font size of the single selection, when it is text.
    pub fn font_size(&self) -> Option<f64> {
        self.single_selected()
            .and_then(Drawable::as_text)
            .map(|text| text.font_size)
    }

    pub fn set_font_size(&mut self, size: f64) {
        if !size.is_finite() || self.selection.single().is_none() {
            return;
        }
        self.modify_selected("font size", |object| {
            if let Some(text) = object.as_text_mut() {
                text.set_font_size(size);
            }
        });
    }

    // --- Persistence ---

    /// Snapshot the scene and viewport as a document.
    pub fn to_document(&self) -> SceneDocument {
        SceneDocument {
            objects: self.scene.snapshot(),
            scale: self.viewport.scale(),
            offset_x: self.viewport.offset.x,
            offset_y: self.viewport.offset.y,
        }
    }

    pub fn save_json(&self) -> DocumentResult<String> {
        self.to_document().to_json()
    }

    /// Replace the scene and viewport, clearing history and selection.
    /// An invalid document leaves the board untouched.
    pub fn load_document(&mut self, document: SceneDocument) -> DocumentResult<()> {
        if let Err(err) = document.validate() {
            log::warn!("load rejected: {err}");
            return Err(err);
        }
        self.abandon_gesture();
        self.scene.replace(document.objects);
        self.viewport.set_scale(document.scale);
        self.viewport.offset = Vec2::new(document.offset_x, document.offset_y);
        self.history.reset(self.scene.snapshot());
        self.selection.clear();
        self.needs_redraw = true;
        log::info!("loaded board with {} object(s)", self.scene.len());
        Ok(())
    }

    pub fn load_json(&mut self, json: &str) -> DocumentResult<()> {
        let document = SceneDocument::from_json(json).inspect_err(|err| log::warn!("load failed: {err}"))?;
        self.load_document(document)
    }

    /// Save the board into a storage slot.
    pub async fn save_to(&self, storage: &dyn Storage, slot: &str) -> StorageResult<()> {
        write_document(storage, slot, &self.to_document()).await
    }

    /// Load the board from a storage slot. Failures leave the board untouched.
    pub async fn load_from(&mut self, storage: &dyn Storage, slot: &str) -> StorageResult<()> {
        let document = read_document(storage, slot).await?;
        self.load_document(document)?;
        Ok(())
    }
}
