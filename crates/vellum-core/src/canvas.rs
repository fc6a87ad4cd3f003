//! The editing session: one document, its history, the camera and the
//! pointer state machine that turns input into commands.

use crate::camera::Camera;
use crate::capture::StrokeCapture;
use crate::commands::{Command, CommandStack};
use crate::config::EditorConfig;
use crate::document::{Document, DocumentChange, SubscriptionId, ViewMode};
use crate::hit_test::{erase_at, hit_test_text_box};
use crate::model::{InkColor, StrokeId, StrokePoint, StrokeShape, TextBox, TextBoxId};
use crate::recognize::ShapeRecognizer;
use crate::storage::{DocumentFile, Storage, StorageResult};
use crate::text_edit::TextEditSession;
use crate::tools::{InteractionMode, PointerButton, ToolKind, dragged_rect, resized_rect};
use kurbo::{Point, Rect, Size, Vec2};
use std::time::Instant;

/// One pointer sample in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    /// Position in view pixels.
    pub position: Point,
    pub button: PointerButton,
    /// Pen pressure; mice report none and count as full pressure.
    pub pressure: Option<f64>,
    /// Monotonic timestamp in milliseconds.
    pub time_ms: u64,
}

impl PointerInput {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            button: PointerButton::Primary,
            pressure: None,
            time_ms: 0,
        }
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = Some(pressure);
        self
    }

    pub fn at(mut self, time_ms: u64) -> Self {
        self.time_ms = time_ms;
        self
    }

    fn pressure(&self) -> f64 {
        self.pressure.unwrap_or(1.0).clamp(0.0, 1.0)
    }
}

/// Runtime state of one editing session (not persisted).
#[derive(Debug)]
pub struct Canvas {
    document: Document,
    history: CommandStack,
    /// Camera for the view transform.
    pub camera: Camera,
    /// Viewport size in view pixels.
    pub viewport_size: Size,
    capture: StrokeCapture,
    recognizer: ShapeRecognizer,
    config: EditorConfig,
    tool: ToolKind,
    mode: InteractionMode,
    /// Color of new strokes.
    pub pen_color: InkColor,
    /// Base width of new strokes.
    pub pen_width: f64,
    /// Snap finished strokes to recognized shapes.
    pub smart_shapes: bool,
    text_edit: Option<TextEditSession>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Create a session with default settings and an empty document.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            document: Document::new(),
            history: CommandStack::new(config.history_limit),
            camera: config.camera(),
            viewport_size: Size::new(800.0, 600.0),
            capture: StrokeCapture::new(config.min_sample_distance),
            recognizer: ShapeRecognizer::new(config.recognizer.clone()),
            tool: ToolKind::default(),
            mode: InteractionMode::Idle,
            pen_color: config.pen_color,
            pen_width: config.pen_width,
            smart_shapes: config.smart_shapes,
            text_edit: None,
            config,
        }
    }

    // --- Read access ---

    /// Read-only view of the document for renderers and exporters.
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history(&self) -> &CommandStack {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn mode(&self) -> &InteractionMode {
        &self.mode
    }

    /// The open draft, if any.
    pub fn capture(&self) -> &StrokeCapture {
        &self.capture
    }

    /// Text box currently being edited.
    pub fn editing_text_box(&self) -> Option<TextBoxId> {
        self.text_edit.as_ref().map(TextEditSession::id)
    }

    /// Whether the document differs from the last save or load.
    pub fn is_modified(&self) -> bool {
        !self.history.is_clean() || self.text_edit.as_ref().is_some_and(TextEditSession::is_pending)
    }

    /// World rectangle currently on screen.
    pub fn visible_world_rect(&self) -> Rect {
        self.camera.visible_world_rect(self.viewport_size)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&DocumentChange) + 'static) -> SubscriptionId {
        self.document.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.document.unsubscribe(id)
    }

    // --- Tools and modes ---

    /// Change tool. Any interaction in progress is terminated without a
    /// command and an open text edit is committed.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if tool == self.tool {
            return;
        }
        self.terminate_mode();
        self.finish_text_edit();
        self.tool = tool;
        log::debug!("Tool: {}", tool.name());
    }

    /// Abort the current interaction without producing a command.
    pub fn cancel(&mut self) {
        self.terminate_mode();
    }

    /// Leave the current mode cleanly: drafts are discarded and a drag or
    /// resize puts the box back where it started.
    fn terminate_mode(&mut self) {
        match std::mem::take(&mut self.mode) {
            InteractionMode::Drafting => self.capture.cancel(),
            InteractionMode::Dragging { id, start_rect, .. }
            | InteractionMode::Resizing { id, start_rect, .. } => {
                self.document.set_text_box_rect_by_id(id, start_rect);
            }
            InteractionMode::Idle | InteractionMode::Erasing | InteractionMode::Panning { .. } => {}
        }
    }

    // --- Pointer input ---

    pub fn pointer_down(&mut self, input: PointerInput) {
        if input.button != PointerButton::Primary {
            self.terminate_mode();
            self.mode = InteractionMode::Panning { last: input.position };
            return;
        }

        // A second primary press without a release replaces whatever was going on.
        self.terminate_mode();
        let world = self.camera.view_to_world(input.position);

        match self.tool {
            ToolKind::Pen => {
                self.finish_text_edit();
                self.capture.begin(
                    StrokePoint::new(world, input.pressure(), input.time_ms),
                    self.pen_color,
                    self.pen_width,
                );
                self.mode = InteractionMode::Drafting;
            }
            ToolKind::Eraser => {
                self.finish_text_edit();
                self.mode = InteractionMode::Erasing;
                self.erase(world);
            }
            ToolKind::Text => self.text_press(world),
            ToolKind::Select => self.select_press(input.position, world),
        }
    }

    pub fn pointer_move(&mut self, input: PointerInput) {
        let world = self.camera.view_to_world(input.position);
        match self.mode {
            InteractionMode::Idle => {}
            InteractionMode::Drafting => {
                self.capture
                    .append(StrokePoint::new(world, input.pressure(), input.time_ms));
            }
            InteractionMode::Erasing => self.erase(world),
            InteractionMode::Dragging { id, grab, start_rect } => {
                self.document
                    .set_text_box_rect_by_id(id, dragged_rect(start_rect, grab, world));
            }
            InteractionMode::Resizing { id, grab, start_rect } => {
                self.document
                    .set_text_box_rect_by_id(id, resized_rect(start_rect, grab, world));
            }
            InteractionMode::Panning { last } => {
                self.camera.pan_by(input.position - last);
                self.mode = InteractionMode::Panning { last: input.position };
            }
        }
    }

    /// Finish the current interaction. Returns the id of a newly committed
    /// stroke, if the pen produced one.
    pub fn pointer_up(&mut self, input: PointerInput) -> Option<StrokeId> {
        match std::mem::take(&mut self.mode) {
            InteractionMode::Drafting => {
                let world = self.camera.view_to_world(input.position);
                self.capture
                    .append(StrokePoint::new(world, input.pressure(), input.time_ms));
                self.commit_draft()
            }
            InteractionMode::Dragging { id, start_rect, .. }
            | InteractionMode::Resizing { id, start_rect, .. } => {
                let after = self.document.text_box_by_id(id)?.rect;
                if after != start_rect {
                    self.history.push(
                        &mut self.document,
                        Command::SetTextBoxRect { id, before: start_rect, after },
                    );
                }
                None
            }
            InteractionMode::Idle | InteractionMode::Erasing | InteractionMode::Panning { .. } => None,
        }
    }

    /// Wheel input. With the zoom modifier held the view zooms around
    /// `anchor`; otherwise it pans, preferring pixel deltas when present.
    pub fn wheel(&mut self, anchor: Point, angle_delta: Vec2, pixel_delta: Vec2, zoom_modifier: bool) {
        if zoom_modifier {
            self.camera
                .zoom_at(anchor, angle_delta.y / self.config.wheel_units_per_step);
            return;
        }
        let delta = if pixel_delta != Vec2::ZERO {
            pixel_delta
        } else {
            angle_delta / self.config.wheel_pan_divisor
        };
        self.camera.pan_by(-delta);
    }

    /// Commit the open draft as a stroke, then snap it if it looks like a shape.
    fn commit_draft(&mut self) -> Option<StrokeId> {
        let draft = self.capture.end()?;
        let id = self.document.next_stroke_id();
        let stroke = draft.into_stroke(id);

        let snap = if self.smart_shapes {
            self.recognizer
                .recognize_stroke(&stroke)
                .filter(|m| m.score >= self.config.shape_accept_threshold)
        } else {
            None
        };

        self.history.push(&mut self.document, Command::add_stroke(stroke));
        if let Some(m) = snap {
            log::debug!("Stroke {} recognized as {} ({:.2})", id, m.kind(), m.score);
            if let Some(cmd) = Command::set_stroke_shape(&self.document, id, StrokeShape::Snapped(m.geometry)) {
                self.history.push(&mut self.document, cmd);
            }
        }
        Some(id)
    }

    fn erase(&mut self, world: Point) {
        let radius = self.camera.view_length_to_world(self.config.eraser_radius_px);
        if let Some(index) = erase_at(&self.document, world, radius) {
            self.history.push(&mut self.document, Command::remove_stroke(index));
        }
    }

    fn text_press(&mut self, world: Point) {
        if let Some(id) = hit_test_text_box(&self.document, world) {
            self.start_text_edit(id);
            return;
        }
        self.finish_text_edit();
        let id = self.document.next_text_box_id();
        let rect = Rect::from_origin_size(
            world,
            Size::new(self.config.text_box_width, self.config.text_box_height),
        );
        self.history
            .push(&mut self.document, Command::add_text_box(TextBox::new(id, rect, "")));
        self.start_text_edit(id);
    }

    fn select_press(&mut self, view: Point, world: Point) {
        self.finish_text_edit();
        let Some(id) = hit_test_text_box(&self.document, world) else {
            return;
        };
        let Some(start_rect) = self.document.text_box_by_id(id).map(|t| t.rect) else {
            return;
        };
        let corner = self.camera.world_to_view(Point::new(start_rect.x1, start_rect.y1));
        self.mode = if corner.distance(view) <= self.config.resize_handle_px {
            InteractionMode::Resizing { id, grab: world, start_rect }
        } else {
            InteractionMode::Dragging { id, grab: world, start_rect }
        };
    }

    // --- Text editing ---

    /// Begin editing `id`, committing any edit on another box first.
    pub fn start_text_edit(&mut self, id: TextBoxId) -> bool {
        if self.editing_text_box() == Some(id) {
            return true;
        }
        self.finish_text_edit();
        self.text_edit = TextEditSession::begin(&self.document, id, self.config.text_debounce());
        self.text_edit.is_some()
    }

    /// Replace the content of the box being edited. The store updates at once;
    /// the undo step follows once typing settles (see [`Self::tick`]).
    pub fn edit_text(&mut self, text: &str, now: Instant) -> bool {
        match self.text_edit.as_mut() {
            Some(session) => session.edit(&mut self.document, text, now),
            None => false,
        }
    }

    /// Push a settled text edit. Call periodically; returns true if a command
    /// was pushed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(cmd) = self
            .text_edit
            .as_mut()
            .and_then(|s| s.poll(&self.document, now))
        else {
            return false;
        };
        self.history.push(&mut self.document, cmd);
        true
    }

    /// Commit any pending text edit and stop editing.
    pub fn finish_text_edit(&mut self) {
        if let Some(mut session) = self.text_edit.take() {
            if let Some(cmd) = session.flush(&self.document) {
                self.history.push(&mut self.document, cmd);
            }
        }
    }

    // --- History ---

    /// Undo the last command. A pending text edit is committed first so it
    /// is what gets undone.
    pub fn undo(&mut self) -> bool {
        self.terminate_mode();
        self.finish_text_edit();
        self.history.undo(&mut self.document)
    }

    pub fn redo(&mut self) -> bool {
        self.terminate_mode();
        self.finish_text_edit();
        self.history.redo(&mut self.document)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo() || self.text_edit.as_ref().is_some_and(TextEditSession::is_pending)
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Push a command built by the caller.
    pub fn execute(&mut self, command: Command) {
        self.finish_text_edit();
        self.history.push(&mut self.document, command);
    }

    // --- Document lifecycle ---

    /// Start over with an empty document and no history.
    pub fn new_document(&mut self) {
        self.terminate_mode();
        self.text_edit = None;
        self.document.clear();
        self.document.set_view_mode(ViewMode::default());
        self.history.clear();
        self.camera.reset();
    }

    /// Switch between infinite canvas and A4 pages. Not an undoable edit.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.document.set_view_mode(mode);
    }

    /// Fit the view to the document's content.
    pub fn fit_to_content(&mut self) {
        if let Some(bounds) = self.document.content_bounds() {
            self.camera.fit_to_bounds(bounds, self.viewport_size, 50.0);
        }
    }

    /// Save to `storage` under `key`. On success the history is marked clean.
    pub fn save(&mut self, storage: &dyn Storage, key: &str) -> StorageResult<()> {
        self.finish_text_edit();
        storage.save(key, &self.document.snapshot())?;
        self.history.set_clean();
        Ok(())
    }

    /// Load `key` from `storage`, replacing the document and history.
    /// On failure the session is unchanged.
    pub fn load(&mut self, storage: &dyn Storage, key: &str) -> StorageResult<()> {
        let file = storage.load(key)?;
        file.validate()?;
        self.load_file(file);
        Ok(())
    }

    /// Replace the document with an already parsed file.
    pub fn load_file(&mut self, file: DocumentFile) {
        self.terminate_mode();
        self.text_edit = None;
        file.populate(&mut self.document);
        self.history.clear();
        log::info!(
            "Loaded document: {} strokes, {} text boxes",
            self.document.strokes().len(),
            self.document.text_boxes().len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShapeKind;
    use crate::storage::MemoryStorage;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn at(x: f64, y: f64) -> PointerInput {
        PointerInput::new(Point::new(x, y))
    }

    fn draw(canvas: &mut Canvas, points: &[(f64, f64)]) -> Option<StrokeId> {
        let (first, rest) = points.split_first()?;
        canvas.pointer_down(at(first.0, first.1));
        let last = rest.last().unwrap_or(first);
        for &(x, y) in rest.iter().take(rest.len().saturating_sub(1)) {
            canvas.pointer_move(at(x, y));
        }
        canvas.pointer_up(at(last.0, last.1))
    }

    fn wobbly(n: usize) -> Vec<(f64, f64)> {
        (0..n)
            .map(|i| {
                let x = i as f64 * 4.0;
                (x, if i % 2 == 0 { 0.0 } else { 12.0 })
            })
            .collect()
    }

    #[test]
    fn test_pen_commits_freehand_stroke() {
        let mut canvas = Canvas::new();
        let id = draw(&mut canvas, &wobbly(10)).unwrap();
        let stroke = canvas.document().stroke_by_id(id).unwrap();
        assert_eq!(stroke.len(), 10);
        assert!(!stroke.shape.is_shape());
        assert_eq!(canvas.history().undo_count(), 1);
        assert!(canvas.mode().is_idle());
    }

    #[test]
    fn test_single_click_makes_no_stroke() {
        let mut canvas = Canvas::new();
        assert!(draw(&mut canvas, &[(5.0, 5.0), (5.0, 5.0)]).is_none());
        assert!(canvas.document().strokes().is_empty());
        assert!(!canvas.can_undo());
    }

    #[test]
    fn test_straight_stroke_snaps_to_line() {
        let mut canvas = Canvas::new();
        let id = draw(&mut canvas, &[(0.0, 0.0), (25.0, 0.0), (50.0, 0.0)]).unwrap();
        let stroke = canvas.document().stroke_by_id(id).unwrap();
        assert_eq!(stroke.shape.kind(), Some(ShapeKind::Line));
        assert_eq!(canvas.history().undo_count(), 2);

        // undo removes the snap first, then the stroke
        canvas.undo();
        assert!(!canvas.document().stroke_by_id(id).unwrap().shape.is_shape());
        canvas.undo();
        assert!(canvas.document().strokes().is_empty());
    }

    #[test]
    fn test_smart_shapes_disabled() {
        let mut canvas = Canvas::new();
        canvas.smart_shapes = false;
        let id = draw(&mut canvas, &[(0.0, 0.0), (50.0, 0.0)]).unwrap();
        assert!(!canvas.document().stroke_by_id(id).unwrap().shape.is_shape());
        assert_eq!(canvas.history().undo_count(), 1);
    }

    #[test]
    fn test_pen_pressure_is_clamped() {
        let mut canvas = Canvas::new();
        canvas.smart_shapes = false;
        canvas.pointer_down(at(0.0, 0.0).with_pressure(0.4));
        canvas.pointer_move(at(10.0, 5.0).with_pressure(1.7));
        let id = canvas.pointer_up(at(20.0, 0.0).with_pressure(-0.2)).unwrap();

        let stroke = canvas.document().stroke_by_id(id).unwrap();
        let pressures: Vec<f64> = stroke.points.iter().map(|p| p.pressure).collect();
        assert_eq!(pressures, vec![0.4, 1.0, 0.0]);
    }

    #[test]
    fn test_pen_uses_world_coordinates() {
        let mut canvas = Canvas::new();
        canvas.smart_shapes = false;
        canvas.camera.set_zoom(2.0);
        canvas.camera.pan = Vec2::new(10.0, 10.0);
        let id = draw(&mut canvas, &[(10.0, 10.0), (50.0, 30.0)]).unwrap();
        let stroke = canvas.document().stroke_by_id(id).unwrap();
        assert_eq!(stroke.points[0].position, Point::new(0.0, 0.0));
        assert_eq!(stroke.points[1].position, Point::new(20.0, 10.0));
    }

    #[test]
    fn test_pen_color_snapshotted_at_press() {
        let mut canvas = Canvas::new();
        canvas.smart_shapes = false;
        canvas.pen_color = InkColor::new(255, 0, 0, 255);
        canvas.pointer_down(at(0.0, 0.0));
        canvas.pen_color = InkColor::black();
        let id = canvas.pointer_up(at(30.0, 30.0)).unwrap();
        assert_eq!(canvas.document().stroke_by_id(id).unwrap().color, InkColor::new(255, 0, 0, 255));
    }

    #[test]
    fn test_tool_switch_discards_draft() {
        let mut canvas = Canvas::new();
        canvas.pointer_down(at(0.0, 0.0));
        canvas.pointer_move(at(30.0, 0.0));
        canvas.set_tool(ToolKind::Select);
        assert!(canvas.pointer_up(at(60.0, 0.0)).is_none());
        assert!(canvas.document().strokes().is_empty());
        assert!(!canvas.capture().is_active());
    }

    #[test]
    fn test_panning_discards_draft() {
        let mut canvas = Canvas::new();
        canvas.pointer_down(at(0.0, 0.0));
        canvas.pointer_move(at(30.0, 0.0));
        canvas.pointer_down(at(30.0, 0.0).with_button(PointerButton::Middle));
        canvas.pointer_move(at(50.0, 10.0));
        canvas.pointer_up(at(50.0, 10.0));
        assert!(canvas.document().strokes().is_empty());
        assert_eq!(canvas.camera.pan, Vec2::new(20.0, 10.0));
    }

    #[test]
    fn test_eraser_removes_topmost_and_undoes() {
        let mut canvas = Canvas::new();
        canvas.smart_shapes = false;
        let a = draw(&mut canvas, &[(0.0, 0.0), (100.0, 0.0)]).unwrap();
        let b = draw(&mut canvas, &[(0.0, 4.0), (100.0, 4.0)]).unwrap();
        canvas.set_tool(ToolKind::Eraser);
        canvas.pointer_down(at(50.0, 2.0));
        canvas.pointer_up(at(50.0, 2.0));
        let ids: Vec<_> = canvas.document().strokes().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![a]);

        canvas.undo();
        let ids: Vec<_> = canvas.document().strokes().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn test_eraser_radius_scales_with_zoom() {
        let mut canvas = Canvas::new();
        canvas.smart_shapes = false;
        draw(&mut canvas, &[(0.0, 0.0), (100.0, 0.0)]).unwrap();
        canvas.set_tool(ToolKind::Eraser);
        canvas.camera.set_zoom(4.0);
        // 8 world units away is 32 px at this zoom, outside the 10 px radius
        canvas.pointer_down(at(200.0, 32.0));
        canvas.pointer_up(at(200.0, 32.0));
        assert_eq!(canvas.document().strokes().len(), 1);
        // 2 world units away is 8 px
        canvas.pointer_down(at(200.0, 8.0));
        assert!(canvas.document().strokes().is_empty());
    }

    #[test]
    fn test_text_tool_creates_box_and_debounces() {
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Text);
        canvas.pointer_down(at(10.0, 20.0));
        canvas.pointer_up(at(10.0, 20.0));
        let id = canvas.editing_text_box().unwrap();
        assert_eq!(
            canvas.document().text_box_by_id(id).unwrap().rect,
            Rect::new(10.0, 20.0, 270.0, 140.0)
        );

        let t0 = Instant::now();
        canvas.edit_text("a", t0);
        canvas.edit_text("ab", t0 + Duration::from_millis(100));
        assert!(!canvas.tick(t0 + Duration::from_millis(200)));
        assert!(canvas.is_modified());
        assert!(canvas.tick(t0 + Duration::from_millis(500)));
        assert_eq!(canvas.history().undo_count(), 2);

        canvas.undo();
        assert_eq!(canvas.document().text_box_by_id(id).unwrap().markdown, "");
        assert_eq!(canvas.editing_text_box(), None);
    }

    #[test]
    fn test_undo_mid_edit_commits_first() {
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Text);
        canvas.pointer_down(at(0.0, 0.0));
        let id = canvas.editing_text_box().unwrap();
        canvas.edit_text("draft", Instant::now());
        assert!(canvas.undo());
        assert_eq!(canvas.document().text_box_by_id(id).unwrap().markdown, "");
        assert!(canvas.redo());
        assert_eq!(canvas.document().text_box_by_id(id).unwrap().markdown, "draft");
    }

    #[test]
    fn test_drag_text_box_single_command() {
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Text);
        canvas.pointer_down(at(0.0, 0.0));
        let id = canvas.editing_text_box().unwrap();
        canvas.set_tool(ToolKind::Select);
        let before = canvas.history().undo_count();

        canvas.pointer_down(at(50.0, 50.0));
        canvas.pointer_move(at(60.0, 55.0));
        canvas.pointer_move(at(80.0, 70.0));
        canvas.pointer_up(at(80.0, 70.0));
        assert_eq!(
            canvas.document().text_box_by_id(id).unwrap().rect,
            Rect::new(30.0, 20.0, 290.0, 140.0)
        );
        assert_eq!(canvas.history().undo_count(), before + 1);

        canvas.undo();
        assert_eq!(
            canvas.document().text_box_by_id(id).unwrap().rect,
            Rect::new(0.0, 0.0, 260.0, 120.0)
        );
    }

    #[test]
    fn test_click_without_move_pushes_nothing() {
        let mut canvas = Canvas::new();
        canvas.execute(Command::add_text_box(TextBox::new(1, Rect::new(0.0, 0.0, 100.0, 100.0), "")));
        canvas.set_tool(ToolKind::Select);
        canvas.pointer_down(at(50.0, 50.0));
        canvas.pointer_up(at(50.0, 50.0));
        assert_eq!(canvas.history().undo_count(), 1);
    }

    #[test]
    fn test_resize_from_corner_and_cancel() {
        let mut canvas = Canvas::new();
        canvas.execute(Command::add_text_box(TextBox::new(1, Rect::new(0.0, 0.0, 100.0, 100.0), "")));
        canvas.set_tool(ToolKind::Select);
        canvas.pointer_down(at(98.0, 98.0));
        assert_eq!(canvas.mode().name(), "resizing");
        canvas.pointer_move(at(148.0, 118.0));
        assert_eq!(
            canvas.document().text_box_by_id(1).unwrap().rect,
            Rect::new(0.0, 0.0, 150.0, 120.0)
        );
        canvas.cancel();
        assert_eq!(
            canvas.document().text_box_by_id(1).unwrap().rect,
            Rect::new(0.0, 0.0, 100.0, 100.0)
        );
        assert!(canvas.pointer_up(at(148.0, 118.0)).is_none());
        assert_eq!(canvas.history().undo_count(), 1);
    }

    #[test]
    fn test_wheel_pan_and_zoom() {
        let mut canvas = Canvas::new();
        canvas.wheel(Point::ZERO, Vec2::new(0.0, -120.0), Vec2::ZERO, false);
        assert_eq!(canvas.camera.pan, Vec2::new(0.0, 20.0));
        canvas.wheel(Point::ZERO, Vec2::new(0.0, -120.0), Vec2::new(3.0, 4.0), false);
        assert_eq!(canvas.camera.pan, Vec2::new(-3.0, 16.0));

        let anchor = Point::new(200.0, 150.0);
        let world = canvas.camera.view_to_world(anchor);
        canvas.wheel(anchor, Vec2::new(0.0, 240.0), Vec2::ZERO, true);
        assert!((canvas.camera.zoom() - 1.15f64.powi(2)).abs() < 1e-12);
        let back = canvas.camera.world_to_view(world);
        assert!((back - anchor).hypot() < 1e-9);
    }

    #[test]
    fn test_notifications_reach_subscriber() {
        let mut canvas = Canvas::new();
        canvas.smart_shapes = false;
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        canvas.subscribe(move |c| sink.borrow_mut().push(c.clone()));
        draw(&mut canvas, &[(0.0, 0.0), (40.0, 40.0)]);
        assert_eq!(seen.borrow().len(), 1);
        assert!(matches!(seen.borrow()[0], DocumentChange::StrokeInserted { index: 0, .. }));
    }

    #[test]
    fn test_save_load_marks_clean() {
        let storage = MemoryStorage::new();
        let mut canvas = Canvas::new();
        draw(&mut canvas, &wobbly(6));
        canvas.set_view_mode(ViewMode::A4Notebook);
        assert!(canvas.is_modified());
        canvas.save(&storage, "notes").unwrap();
        assert!(!canvas.is_modified());

        let mut other = Canvas::new();
        other.load(&storage, "notes").unwrap();
        assert_eq!(other.document().strokes(), canvas.document().strokes());
        assert_eq!(other.document().view_mode(), ViewMode::A4Notebook);
        assert!(!other.can_undo());

        assert!(other.load(&storage, "missing").is_err());
        assert_eq!(other.document().strokes().len(), 1);
    }

    #[test]
    fn test_new_document_resets() {
        let mut canvas = Canvas::new();
        draw(&mut canvas, &wobbly(6));
        canvas.camera.set_zoom(3.0);
        canvas.new_document();
        assert!(canvas.document().is_empty());
        assert!(!canvas.can_undo());
        assert_eq!(canvas.camera.zoom(), 1.0);
        let id = draw(&mut canvas, &wobbly(6)).unwrap();
        assert_eq!(id, 1);
    }
}
