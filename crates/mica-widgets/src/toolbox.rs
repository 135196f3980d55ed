//! Collapsible, draggable toolbox container
//!
//! A toolbox is a header bar with a minimize control plus a body that hosts
//! caller content. Collapsing is two-phase: the body fades out, then a
//! deferred display flip removes it from layout once the fade completes.
//! Expanding cancels any pending flip before making the body visible again,
//! so rapid collapse/expand sequences always settle on the expanded state.

use glam::Vec2;
use mica::{
    Animation, AnimationHandle, BuildError, Callback, Display, ElementId, Point, PointerEvent,
    PointerKind, Rect, Scope, Stage, TaskId, Template, ToggleMachine, Widget, WidgetCore,
};

/// Header bar height in pixels
pub const HEADER_HEIGHT: f32 = 16.0;
/// Width of the minimize control at the right edge of the header
const HIDE_CONTROL_WIDTH: f32 = 16.0;
/// Body fade duration in seconds
pub const BODY_FADE_SECS: f32 = 0.3;

const CHROME_TEMPLATE: &str = "<g>\
<g class=\"header\">\
<rect x=\"0\" y=\"0\" width=\"$width\" height=\"$header\" fill=\"#3a3a3a\" stroke=\"#222222\"/>\
<g class=\"minus\">\
<line x1=\"{width - 12}\" y1=\"{header / 2}\" x2=\"{width - 4}\" y2=\"{header / 2}\" \
stroke=\"#dddddd\" stroke-width=\"2\"/>\
</g>\
<g class=\"plus\" display=\"none\">\
<line x1=\"{width - 12}\" y1=\"{header / 2}\" x2=\"{width - 4}\" y2=\"{header / 2}\" \
stroke=\"#dddddd\" stroke-width=\"2\"/>\
<line x1=\"{width - 8}\" y1=\"{header / 2 - 4}\" x2=\"{width - 8}\" y2=\"{header / 2 + 4}\" \
stroke=\"#dddddd\" stroke-width=\"2\"/>\
</g>\
</g>\
<g class=\"body\">\
<rect x=\"0\" y=\"$header\" width=\"$width\" height=\"$height\" \
fill=\"#2d2d2d\" stroke=\"#222222\"/>\
<g class=\"content\"/>\
</g>\
</g>";

/// Collapsible container with a draggable header
pub struct Toolbox {
    core: WidgetCore,
    width: f32,
    height: f32,
    close_on_minimize: bool,
    expanded: bool,
    callback: Option<Callback<bool>>,

    body: Option<ElementId>,
    frame: Option<ElementId>,
    content: Option<ElementId>,
    glyphs: Option<ToggleMachine>,
    fade_in: Option<AnimationHandle>,
    fade_out: Option<AnimationHandle>,
    pending: Vec<TaskId>,
    drag_grab: Option<Vec2>,
}

impl Toolbox {
    /// Create a toolbox at `(x, y)` whose body is `width` by `height`
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            core: WidgetCore::new(x, y),
            width,
            height,
            close_on_minimize: false,
            expanded: true,
            callback: None,
            body: None,
            frame: None,
            content: None,
            glyphs: None,
            fade_in: None,
            fade_out: None,
            pending: Vec::new(),
            drag_grab: None,
        }
    }

    /// Hide the entire toolbox, header included, once minimized
    pub fn with_close_on_minimize(mut self) -> Self {
        self.close_on_minimize = true;
        self
    }

    /// Set the expand/collapse callback (receives the expanded state)
    pub fn with_callback(mut self, callback: Callback<bool>) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Body dimensions as constructed
    ///
    /// The header chrome (and with it the drag region and minimize control)
    /// is laid out from these once and never moves afterwards.
    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Whether the body is (or is becoming) visible
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Group callers parent their content under
    pub fn content(&self) -> Option<ElementId> {
        self.content
    }

    /// The body group (background frame plus content)
    pub(crate) fn body(&self) -> Option<ElementId> {
        self.body
    }

    /// The body background rect
    pub(crate) fn frame(&self) -> Option<ElementId> {
        self.frame
    }

    fn cancel_pending(&mut self, stage: &mut Stage) {
        for task in self.pending.drain(..) {
            stage.cancel(task);
        }
    }

    /// Collapse the body: fade now, display flip when the fade completes
    pub fn hide(&mut self, stage: &mut Stage, no_callback: bool) {
        let (Some(body), Some(fade_out)) = (self.body, self.fade_out) else {
            return;
        };
        self.expanded = false;
        self.cancel_pending(stage);
        if let Some(glyphs) = &mut self.glyphs {
            glyphs.set_state(stage, false, true);
        }

        stage.trigger(fade_out);
        let delay = stage.animations.duration(fade_out);
        self.pending.push(stage.schedule_display(delay, body, Display::None));
        if self.close_on_minimize {
            if let Some(root) = self.core.root() {
                self.pending
                    .push(stage.schedule_display(delay, root, Display::None));
            }
        }

        if !no_callback {
            if let Some(callback) = &mut self.callback {
                callback.invoke(false);
            }
        }
    }

    /// Expand the body: visible immediately, fading in
    ///
    /// Any pending display flip from an in-flight collapse is cancelled
    /// first, so the body cannot vanish after this returns.
    pub fn unhide(&mut self, stage: &mut Stage, no_callback: bool) {
        let (Some(body), Some(fade_in)) = (self.body, self.fade_in) else {
            return;
        };
        self.expanded = true;
        self.cancel_pending(stage);
        if let Some(glyphs) = &mut self.glyphs {
            glyphs.set_state(stage, true, true);
        }

        if let Some(root) = self.core.root() {
            stage.scene.set_display(root, Display::Inline);
        }
        stage.scene.set_display(body, Display::Inline);
        stage.trigger(fade_in);

        if !no_callback {
            if let Some(callback) = &mut self.callback {
                callback.invoke(true);
            }
        }
    }

    /// Flip between expanded and collapsed (the minimize-control path)
    pub fn toggle_expanded(&mut self, stage: &mut Stage) {
        if self.expanded {
            self.hide(stage, false);
        } else {
            self.unhide(stage, false);
        }
    }

    fn header_rect(&self) -> Rect {
        Rect::from_min_size([0.0, 0.0], [self.width, HEADER_HEIGHT])
    }

    fn hide_control_rect(&self) -> Rect {
        Rect::from_min_size(
            [self.width - HIDE_CONTROL_WIDTH, 0.0],
            [HIDE_CONTROL_WIDTH, HEADER_HEIGHT],
        )
    }

    fn local(&self, stage: &Stage, global: Point) -> Option<Point> {
        self.core.root().map(|root| stage.global_to_local(root, global))
    }
}

impl Widget for Toolbox {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn build_structure(&mut self, stage: &mut Stage, parent: ElementId) -> Result<(), BuildError> {
        let scope = Scope::new()
            .with("width", self.width)
            .with("height", self.height)
            .with("header", HEADER_HEIGHT);
        let built = Template::new(CHROME_TEMPLATE).instantiate(
            &mut stage.scene,
            &mut stage.animations,
            parent,
            &scope,
        )?;
        self.core.adopt_root(&mut stage.scene, built.root);

        // Chrome layout: [header [rect, minus, plus], body [frame, content]]
        let header = stage.scene.children(built.root)[0];
        let body = stage.scene.children(built.root)[1];
        let minus = stage.scene.children(header)[1];
        let plus = stage.scene.children(header)[2];
        self.frame = Some(stage.scene.children(body)[0]);
        self.content = Some(stage.scene.children(body)[1]);
        self.body = Some(body);

        self.glyphs = Some(
            ToggleMachine::new(&mut stage.animations, minus, &[], self.expanded)
                .with_off_side(&mut stage.animations, plus, &[]),
        );
        self.fade_in = Some(
            stage
                .animations
                .register(Animation::fade_in(body, BODY_FADE_SECS)),
        );
        self.fade_out = Some(
            stage
                .animations
                .register(Animation::fade_out(body, BODY_FADE_SECS)),
        );
        Ok(())
    }

    /// Builds the chrome first so the label lands above it in paint order
    fn realize(&mut self, stage: &mut Stage, parent: ElementId) -> Result<(), BuildError> {
        self.build_structure(stage, parent)?;
        self.core_mut()
            .attach_pending_label(&mut stage.scene, parent);
        self.core_mut().mark_realized();
        Ok(())
    }

    fn listened_events(&self) -> &'static [PointerKind] {
        &[
            PointerKind::Click,
            PointerKind::MouseDown,
            PointerKind::MouseMove,
            PointerKind::MouseUp,
        ]
    }

    fn on_click(&mut self, stage: &mut Stage, event: &PointerEvent) {
        let Some(local) = self.local(stage, event.position) else {
            return;
        };
        if self.hide_control_rect().contains(local) {
            self.toggle_expanded(stage);
        }
    }

    fn on_mouse_down(&mut self, stage: &mut Stage, event: &PointerEvent) {
        let Some(local) = self.local(stage, event.position) else {
            return;
        };
        // The minimize control claims its own presses
        if self.header_rect().contains(local) && !self.hide_control_rect().contains(local) {
            let position = self.core.position();
            self.drag_grab = Some(event.position.to_vec2() - position.to_vec2());
        }
    }

    fn on_mouse_move(&mut self, stage: &mut Stage, event: &PointerEvent) {
        if let Some(grab) = self.drag_grab {
            let target = event.position.to_vec2() - grab;
            self.core.move_to(&mut stage.scene, target.x, target.y);
        }
    }

    fn on_mouse_up(&mut self, _stage: &mut Stage, _event: &PointerEvent) {
        self.drag_grab = None;
    }
}
