//! Multipane toolbox
//!
//! Extends the [`Toolbox`] with keyed content layers, exactly one of which
//! is visible at a time. Switching layers resizes the body frame with a
//! width/height tween whose endpoints are measured fresh from the outgoing
//! and incoming layers, so successive switches always animate between the
//! real rendered sizes.

use mica::{
    ease_in_out, AnimatedAttr, Animation, AnimationHandle, BuildError, Display, ElementId,
    PointerEvent, PointerKind, Rect, Stage, Widget, WidgetCore,
};

use crate::toolbox::{Toolbox, HEADER_HEIGHT};

/// Frame resize tween duration in seconds
pub const RESIZE_SECS: f32 = 0.3;

/// A toolbox hosting named, switchable content layers
pub struct MultipaneToolbox {
    toolbox: Toolbox,
    layers: Vec<(String, ElementId)>,
    active: Option<usize>,
    /// Current frame dimensions; layer switches update these, the header
    /// chrome stays at the construction width
    frame_size: (f32, f32),
    resize_width: Option<AnimationHandle>,
    resize_height: Option<AnimationHandle>,
}

impl MultipaneToolbox {
    /// Create at `(x, y)`; `width`/`height` size the initial (empty) frame
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            toolbox: Toolbox::new(x, y, width, height),
            layers: Vec::new(),
            active: None,
            frame_size: (width, height),
            resize_width: None,
            resize_height: None,
        }
    }

    /// The wrapped toolbox
    pub fn toolbox(&self) -> &Toolbox {
        &self.toolbox
    }

    /// The wrapped toolbox, mutable
    pub fn toolbox_mut(&mut self) -> &mut Toolbox {
        &mut self.toolbox
    }

    /// Key of the currently visible layer
    pub fn active_layer(&self) -> Option<&str> {
        self.active.map(|idx| self.layers[idx].0.as_str())
    }

    /// Add an empty layer group under `key` and return it
    ///
    /// The first layer added becomes visible; later ones start hidden.
    /// Callers populate the returned group before (or after) switching to
    /// it.
    pub fn add_layer(
        &mut self,
        stage: &mut Stage,
        key: impl Into<String>,
    ) -> Result<ElementId, BuildError> {
        let content = self
            .toolbox
            .content()
            .ok_or(BuildError::Unrealized("multipane toolbox"))?;
        let layer = stage.scene.create_under(content, "g");
        if self.layers.is_empty() {
            self.active = Some(0);
        } else {
            stage.scene.set_display(layer, Display::None);
        }
        self.layers.push((key.into(), layer));
        Ok(layer)
    }

    /// Switch the visible layer to `key`
    ///
    /// Unknown keys are a logged no-op returning `None`. Otherwise the
    /// outgoing layer is hidden, the incoming one shown, and the frame
    /// tweens from the outgoing layer's measured bounds to the incoming
    /// one's.
    pub fn change_layer(&mut self, stage: &mut Stage, key: &str) -> Option<ElementId> {
        let Some(idx) = self.layers.iter().position(|(k, _)| k == key) else {
            log::warn!("change_layer: unknown layer {key:?}");
            return None;
        };
        let incoming = self.layers[idx].1;
        if self.active == Some(idx) {
            return Some(incoming);
        }

        let old_bounds = self
            .active
            .and_then(|i| stage.scene.bounding_box(self.layers[i].1))
            .unwrap_or_else(|| self.frame_bounds());
        let new_bounds = stage
            .scene
            .bounding_box(incoming)
            .unwrap_or_else(|| self.frame_bounds());

        if let Some(i) = self.active {
            stage.scene.set_display(self.layers[i].1, Display::None);
        }
        stage.scene.set_display(incoming, Display::Inline);
        self.active = Some(idx);

        if let (Some(width), Some(height)) = (self.resize_width, self.resize_height) {
            stage
                .animations
                .retarget(width, old_bounds.width(), new_bounds.width());
            stage
                .animations
                .retarget(height, old_bounds.height(), new_bounds.height());
            stage.trigger(width);
            stage.trigger(height);
        }
        self.frame_size = (new_bounds.width(), new_bounds.height());

        Some(incoming)
    }

    fn frame_bounds(&self) -> Rect {
        let (width, height) = self.frame_size;
        Rect::from_min_size([0.0, HEADER_HEIGHT], [width, height])
    }
}

impl Widget for MultipaneToolbox {
    fn core(&self) -> &WidgetCore {
        self.toolbox.core()
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        self.toolbox.core_mut()
    }

    fn build_structure(&mut self, stage: &mut Stage, parent: ElementId) -> Result<(), BuildError> {
        self.toolbox.build_structure(stage, parent)?;

        // Resize tweens on the frame rect; endpoints are retargeted per
        // switch so the registered values are placeholders
        let frame = self
            .toolbox
            .frame()
            .ok_or(BuildError::Unrealized("multipane toolbox frame"))?;
        let (width, height) = self.toolbox.size();
        self.resize_width = Some(stage.animations.register(
            Animation::new(frame, AnimatedAttr::Width, width, width, RESIZE_SECS)
                .with_easing(ease_in_out),
        ));
        self.resize_height = Some(stage.animations.register(
            Animation::new(frame, AnimatedAttr::Height, height, height, RESIZE_SECS)
                .with_easing(ease_in_out),
        ));
        Ok(())
    }

    /// Same ordering exception as [`Toolbox::realize`]: chrome before label
    fn realize(&mut self, stage: &mut Stage, parent: ElementId) -> Result<(), BuildError> {
        self.build_structure(stage, parent)?;
        self.core_mut()
            .attach_pending_label(&mut stage.scene, parent);
        self.core_mut().mark_realized();
        Ok(())
    }

    fn listened_events(&self) -> &'static [PointerKind] {
        self.toolbox.listened_events()
    }

    fn on_click(&mut self, stage: &mut Stage, event: &PointerEvent) {
        self.toolbox.on_click(stage, event);
    }

    fn on_mouse_down(&mut self, stage: &mut Stage, event: &PointerEvent) {
        self.toolbox.on_mouse_down(stage, event);
    }

    fn on_mouse_move(&mut self, stage: &mut Stage, event: &PointerEvent) {
        self.toolbox.on_mouse_move(stage, event);
    }

    fn on_mouse_up(&mut self, stage: &mut Stage, event: &PointerEvent) {
        self.toolbox.on_mouse_up(stage, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mica::Point;

    fn rect_layer(stage: &mut Stage, layer: ElementId, width: f32, height: f32) {
        let rect = stage.scene.create_under(layer, "rect");
        stage.scene.set_attr_f32(rect, "x", 0.0);
        stage.scene.set_attr_f32(rect, "y", 0.0);
        stage.scene.set_attr_f32(rect, "width", width);
        stage.scene.set_attr_f32(rect, "height", height);
    }

    fn with_two_layers() -> (Stage, MultipaneToolbox) {
        let mut stage = Stage::new();
        let root = stage.scene.root();
        let mut pane = MultipaneToolbox::new(0.0, 0.0, 100.0, 60.0);
        pane.realize(&mut stage, root).unwrap();

        let a = pane.add_layer(&mut stage, "channels").unwrap();
        rect_layer(&mut stage, a, 100.0, 60.0);
        let b = pane.add_layer(&mut stage, "scale").unwrap();
        rect_layer(&mut stage, b, 40.0, 120.0);
        (stage, pane)
    }

    #[test]
    fn test_first_layer_visible_rest_hidden() {
        let (stage, pane) = with_two_layers();
        let a = pane.layers[0].1;
        let b = pane.layers[1].1;
        assert_eq!(pane.active_layer(), Some("channels"));
        assert_eq!(stage.scene.display(a), Display::Inline);
        assert_eq!(stage.scene.display(b), Display::None);
    }

    #[test]
    fn test_change_layer_flips_visibility() {
        let (mut stage, mut pane) = with_two_layers();
        let a = pane.layers[0].1;
        let b = pane.layers[1].1;

        let shown = pane.change_layer(&mut stage, "scale");
        assert_eq!(shown, Some(b));
        assert_eq!(pane.active_layer(), Some("scale"));
        assert_eq!(stage.scene.display(a), Display::None);
        assert_eq!(stage.scene.display(b), Display::Inline);
    }

    #[test]
    fn test_resize_tween_endpoints_are_measured_bounds() {
        let (mut stage, mut pane) = with_two_layers();
        pane.change_layer(&mut stage, "scale").unwrap();

        let width = stage.animations.get(pane.resize_width.unwrap()).unwrap();
        assert_eq!((width.from, width.to), (100.0, 40.0));
        let height = stage.animations.get(pane.resize_height.unwrap()).unwrap();
        assert_eq!((height.from, height.to), (60.0, 120.0));

        // The frame lands exactly on the incoming layer's size
        stage.advance(RESIZE_SECS + 0.05);
        let frame = pane.toolbox.frame().unwrap();
        assert_eq!(stage.scene.attr_f32(frame, "width"), Some(40.0));
        assert_eq!(stage.scene.attr_f32(frame, "height"), Some(120.0));
    }

    #[test]
    fn test_unknown_key_is_a_no_op() {
        let (mut stage, mut pane) = with_two_layers();
        assert_eq!(pane.change_layer(&mut stage, "missing"), None);
        assert_eq!(pane.active_layer(), Some("channels"));
        assert!(!stage.animations.is_running(pane.resize_width.unwrap()));
    }

    #[test]
    fn test_minimize_control_stays_on_header_after_layer_switch() {
        let (mut stage, mut pane) = with_two_layers();
        pane.change_layer(&mut stage, "scale").unwrap();

        // 100-wide header: the control still answers clicks where it is
        // drawn, even though the new layer is only 40 wide
        let on_control = PointerEvent::new(PointerKind::Click, Point::new(92.0, 8.0));
        pane.dispatch(&mut stage, &on_control);
        assert!(!pane.toolbox().is_expanded());
    }

    #[test]
    fn test_change_to_active_layer_is_idempotent() {
        let (mut stage, mut pane) = with_two_layers();
        let a = pane.layers[0].1;
        assert_eq!(pane.change_layer(&mut stage, "channels"), Some(a));
        assert_eq!(stage.scene.display(a), Display::Inline);
        assert!(!stage.animations.is_running(pane.resize_width.unwrap()));
    }
}
