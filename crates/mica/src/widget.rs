//! Widget lifecycle contract
//!
//! Every control follows the same lifecycle: construct with geometry,
//! `realize` into a live scene (which resolves templates and registers
//! animations), then receive pointer events through `dispatch`. Concrete
//! controls override the two build hooks - `build_structure` and the event
//! handlers they need - and never `realize` itself. The toolbox is the one
//! documented exception: it overrides `realize` to place its label after the
//! structure exists.
//!
//! Widgets MUST NOT render before `realize`; after `realize` returns the
//! widget is live, interactive, and every declared animation is attached and
//! triggerable.

use glam::Vec2;

use crate::error::BuildError;
use crate::primitives::Point;
use crate::scene::{ElementId, Scene};
use crate::stage::Stage;

/// Closed set of pointer event kinds routed to widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Click,
    MouseOver,
    MouseOut,
    MouseDown,
    MouseUp,
    MouseMove,
}

/// A pointer event in global scene coordinates
#[derive(Debug, Clone, Copy)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: Point,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, position: Point) -> Self {
        Self { kind, position }
    }
}

/// Geometry, node registry, and label shared by every widget
pub struct WidgetCore {
    x: f32,
    y: f32,
    root: Option<ElementId>,
    label: Option<ElementId>,
    pending_label: Option<(f32, f32, String)>,
    realized: bool,
}

impl WidgetCore {
    /// Initialize with a position in the parent's coordinate space
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            root: None,
            label: None,
            pending_label: None,
            realized: false,
        }
    }

    /// Widget position in parent space
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Whether `realize` has completed
    pub fn is_realized(&self) -> bool {
        self.realized
    }

    /// Root element of the widget's rendered subtree, once built
    pub fn root(&self) -> Option<ElementId> {
        self.root
    }

    /// Adopt `id` as the widget's root and move it to the widget position
    ///
    /// Called from `build_structure` after instantiating the skin template.
    pub fn adopt_root(&mut self, scene: &mut Scene, id: ElementId) {
        scene.set_translation(id, Vec2::new(self.x, self.y));
        self.root = Some(id);
    }

    /// Mark the lifecycle complete; done by the default `realize`
    pub fn mark_realized(&mut self) {
        self.realized = true;
    }

    /// Move the widget (and its label) to a new absolute position
    ///
    /// Direct, unanimated - this is the drag path.
    pub fn move_to(&mut self, scene: &mut Scene, x: f32, y: f32) {
        let (dx, dy) = (x - self.x, y - self.y);
        self.x = x;
        self.y = y;
        if let Some(root) = self.root {
            scene.set_translation(root, Vec2::new(x, y));
        }
        if let Some(label) = self.label {
            let lx = scene.attr_f32(label, "x").unwrap_or(0.0) + dx;
            let ly = scene.attr_f32(label, "y").unwrap_or(0.0) + dy;
            scene.set_attr_f32(label, "x", lx);
            scene.set_attr_f32(label, "y", ly);
        }
    }

    /// Set the label text at `(x, y)` relative to the widget position
    ///
    /// Lazily creates the text element on first call once realized; before
    /// realization the label is stored and attached by `realize`.
    pub fn set_label(
        &mut self,
        scene: &mut Scene,
        parent: Option<ElementId>,
        x: f32,
        y: f32,
        text: impl Into<String>,
    ) {
        let text = text.into();
        if let Some(label) = self.label {
            scene.set_text(label, text);
            return;
        }
        match parent {
            Some(parent) => self.create_label(scene, parent, x, y, text),
            None => self.pending_label = Some((x, y, text)),
        }
    }

    /// The label element, if one was created
    pub fn get_label(&self) -> Option<ElementId> {
        self.label
    }

    /// Attach a pending label under `parent`; no-op without one
    pub fn attach_pending_label(&mut self, scene: &mut Scene, parent: ElementId) {
        if let Some((x, y, text)) = self.pending_label.take() {
            self.create_label(scene, parent, x, y, text);
        }
    }

    fn create_label(&mut self, scene: &mut Scene, parent: ElementId, x: f32, y: f32, text: String) {
        let label = scene.create_under(parent, "text");
        scene.set_attr_f32(label, "x", self.x + x);
        scene.set_attr_f32(label, "y", self.y + y);
        scene.set_text(label, text);
        self.label = Some(label);
    }
}

/// The lifecycle and event contract every control implements
pub trait Widget {
    /// Shared core state
    fn core(&self) -> &WidgetCore;
    /// Shared core state, mutable
    fn core_mut(&mut self) -> &mut WidgetCore;

    /// Populate the node registry and parent the subtree under `parent`
    ///
    /// Build hook; called exactly once, from `realize`.
    fn build_structure(&mut self, stage: &mut Stage, parent: ElementId) -> Result<(), BuildError>;

    /// Pointer event kinds this widget wants routed to it
    fn listened_events(&self) -> &'static [PointerKind] {
        &[]
    }

    /// Attach into a live scene: label, structure, listeners
    ///
    /// Default order: pending label first, then `build_structure`. Only the
    /// toolbox overrides this, to reverse that order.
    fn realize(&mut self, stage: &mut Stage, parent: ElementId) -> Result<(), BuildError> {
        self.core_mut()
            .attach_pending_label(&mut stage.scene, parent);
        self.build_structure(stage, parent)?;
        self.core_mut().mark_realized();
        Ok(())
    }

    /// Single event entry point; routes by kind to the matching handler
    ///
    /// Kinds not in `listened_events` are ignored. Unrealized widgets
    /// receive nothing.
    fn dispatch(&mut self, stage: &mut Stage, event: &PointerEvent) {
        if !self.core().is_realized() || !self.listened_events().contains(&event.kind) {
            return;
        }
        match event.kind {
            PointerKind::Click => self.on_click(stage, event),
            PointerKind::MouseOver => self.on_mouse_over(stage, event),
            PointerKind::MouseOut => self.on_mouse_out(stage, event),
            PointerKind::MouseDown => self.on_mouse_down(stage, event),
            PointerKind::MouseUp => self.on_mouse_up(stage, event),
            PointerKind::MouseMove => self.on_mouse_move(stage, event),
        }
    }

    fn on_click(&mut self, _stage: &mut Stage, _event: &PointerEvent) {}
    fn on_mouse_over(&mut self, _stage: &mut Stage, _event: &PointerEvent) {}
    fn on_mouse_out(&mut self, _stage: &mut Stage, _event: &PointerEvent) {}
    fn on_mouse_down(&mut self, _stage: &mut Stage, _event: &PointerEvent) {}
    fn on_mouse_up(&mut self, _stage: &mut Stage, _event: &PointerEvent) {}
    fn on_mouse_move(&mut self, _stage: &mut Stage, _event: &PointerEvent) {}

    /// Ambient coordinate-system change (zoom, scroll, resize)
    ///
    /// The host owns the viewport: after changing pan or zoom it calls this
    /// on every widget whose rendering depends on viewport placement. The
    /// stage never invokes it on its own.
    fn on_viewport_change(&mut self, _stage: &mut Stage) {}

    /// Convert a global pointer position to `id`'s local space
    fn local_point(&self, stage: &Stage, id: ElementId, global: Point) -> Point {
        stage.global_to_local(id, global)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        core: WidgetCore,
        clicks: usize,
        moves: usize,
    }

    impl Probe {
        fn new() -> Self {
            Self {
                core: WidgetCore::new(10.0, 20.0),
                clicks: 0,
                moves: 0,
            }
        }
    }

    impl Widget for Probe {
        fn core(&self) -> &WidgetCore {
            &self.core
        }
        fn core_mut(&mut self) -> &mut WidgetCore {
            &mut self.core
        }
        fn build_structure(
            &mut self,
            stage: &mut Stage,
            parent: ElementId,
        ) -> Result<(), BuildError> {
            let root = stage.scene.create_under(parent, "g");
            self.core.adopt_root(&mut stage.scene, root);
            Ok(())
        }
        fn listened_events(&self) -> &'static [PointerKind] {
            &[PointerKind::Click]
        }
        fn on_click(&mut self, _stage: &mut Stage, _event: &PointerEvent) {
            self.clicks += 1;
        }
        fn on_mouse_move(&mut self, _stage: &mut Stage, _event: &PointerEvent) {
            self.moves += 1;
        }
    }

    #[test]
    fn test_dispatch_routes_only_listened_kinds() {
        let mut stage = Stage::new();
        let root = stage.scene.root();
        let mut probe = Probe::new();
        probe.realize(&mut stage, root).unwrap();

        let click = PointerEvent::new(PointerKind::Click, Point::zero());
        let mv = PointerEvent::new(PointerKind::MouseMove, Point::zero());
        probe.dispatch(&mut stage, &click);
        probe.dispatch(&mut stage, &mv);
        assert_eq!(probe.clicks, 1);
        // MouseMove is not listened for, so the handler is never probed
        assert_eq!(probe.moves, 0);
    }

    #[test]
    fn test_no_dispatch_before_realize() {
        let mut stage = Stage::new();
        let mut probe = Probe::new();
        let click = PointerEvent::new(PointerKind::Click, Point::zero());
        probe.dispatch(&mut stage, &click);
        assert_eq!(probe.clicks, 0);
    }

    #[test]
    fn test_pending_label_attached_at_realize() {
        let mut stage = Stage::new();
        let root = stage.scene.root();
        let mut probe = Probe::new();
        probe
            .core_mut()
            .set_label(&mut stage.scene, None, 5.0, -2.0, "Scale");
        assert!(probe.core().get_label().is_none());

        probe.realize(&mut stage, root).unwrap();
        let label = probe.core().get_label().unwrap();
        // Label coordinates are relative to the widget position (10, 20)
        assert_eq!(stage.scene.attr_f32(label, "x"), Some(15.0));
        assert_eq!(stage.scene.attr_f32(label, "y"), Some(18.0));
        assert_eq!(stage.scene.text(label), Some("Scale"));
    }

    #[test]
    fn test_set_label_mutates_text_after_creation() {
        let mut stage = Stage::new();
        let root = stage.scene.root();
        let mut probe = Probe::new();
        probe.realize(&mut stage, root).unwrap();

        probe
            .core_mut()
            .set_label(&mut stage.scene, Some(root), 0.0, 0.0, "first");
        let label = probe.core().get_label().unwrap();
        probe
            .core_mut()
            .set_label(&mut stage.scene, Some(root), 9.0, 9.0, "second");
        assert_eq!(probe.core().get_label(), Some(label));
        assert_eq!(stage.scene.text(label), Some("second"));
    }

    #[test]
    fn test_move_to_carries_label() {
        let mut stage = Stage::new();
        let root = stage.scene.root();
        let mut probe = Probe::new();
        probe
            .core_mut()
            .set_label(&mut stage.scene, None, 0.0, 0.0, "lbl");
        probe.realize(&mut stage, root).unwrap();

        probe.core_mut().move_to(&mut stage.scene, 50.0, 60.0);
        let widget_root = probe.core().root().unwrap();
        assert_eq!(stage.scene.translation(widget_root).x, 50.0);
        let label = probe.core().get_label().unwrap();
        assert_eq!(stage.scene.attr_f32(label, "x"), Some(50.0));
        assert_eq!(stage.scene.attr_f32(label, "y"), Some(60.0));
    }
}
