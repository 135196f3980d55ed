//! Templated toggle button
//!
//! A button is skinned by caller-supplied markup (the "on" appearance) and
//! driven by the shared [`ToggleMachine`]. If the skin declares exactly two
//! `<animate>` elements they become the press/release transition pair;
//! otherwise default fades are synthesized. An optional highlight overlay
//! provides hover feedback; without one, an invisible hit-region rect is
//! measured from the realized "on" geometry so the whole rendered bounds
//! stay clickable.

use mica::{
    BuildError, Callback, ElementId, Point, PointerEvent, PointerKind, Rect, Scope, Stage,
    Template, ToggleMachine, Widget, WidgetCore,
};

/// Fallback skin: a rounded rectangle sized by the scope's
/// `width`/`height` properties
pub const DEFAULT_SKIN: &str = "<g>\
<rect x=\"0\" y=\"0\" width=\"$width\" height=\"$height\" rx=\"{height / 4}\" \
fill=\"#4a4a4a\" stroke=\"#222222\"/>\
</g>";

/// A click-to-toggle control with declarative skin and animations
pub struct Button {
    core: WidgetCore,
    skin: Template,
    off_skin: Option<Template>,
    highlight_skin: Option<Template>,
    scope: Scope,
    initial: bool,
    toggle: Option<ToggleMachine>,
    callback: Option<Callback<bool>>,
    highlight: Option<ElementId>,
    hit_region: Option<ElementId>,
}

impl Button {
    /// Create a button at `(x, y)` with default skin and scope
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            core: WidgetCore::new(x, y),
            skin: Template::new(DEFAULT_SKIN),
            off_skin: None,
            highlight_skin: None,
            scope: Scope::new().with("width", width).with("height", height),
            initial: false,
            toggle: None,
            callback: None,
            highlight: None,
            hit_region: None,
        }
    }

    /// Replace the "on" appearance markup
    pub fn with_skin(mut self, skin: Template) -> Self {
        self.skin = skin;
        self
    }

    /// Supply a distinct "off" appearance (two-sided toggle)
    pub fn with_off_skin(mut self, skin: Template) -> Self {
        self.off_skin = Some(skin);
        self
    }

    /// Supply a hover highlight overlay
    pub fn with_highlight(mut self, skin: Template) -> Self {
        self.highlight_skin = Some(skin);
        self
    }

    /// Extend the template scope
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Set the initial toggle state
    pub fn with_state(mut self, on: bool) -> Self {
        self.initial = on;
        self
    }

    /// Set the state-change callback
    pub fn with_callback(mut self, callback: Callback<bool>) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Current toggle state
    pub fn state(&self) -> bool {
        self.toggle.as_ref().map(ToggleMachine::state).unwrap_or(self.initial)
    }

    /// Programmatic state change; `no_callback` suppresses notification
    /// when synchronizing from an external model
    pub fn set_state(&mut self, stage: &mut Stage, value: bool, no_callback: bool) {
        if let Some(toggle) = &mut self.toggle {
            toggle.set_state(stage, value, no_callback);
        }
    }

    /// Whether a global point falls inside the button's hit bounds
    pub fn contains(&self, stage: &Stage, global: Point) -> bool {
        let Some(root) = self.core.root() else {
            return false;
        };
        let local = stage.global_to_local(root, global);
        self.hit_bounds(stage)
            .map(|bounds| bounds.contains(local))
            .unwrap_or(false)
    }

    fn hit_bounds(&self, stage: &Stage) -> Option<Rect> {
        if let Some(hit) = self.hit_region {
            let x = stage.scene.attr_f32(hit, "x")?;
            let y = stage.scene.attr_f32(hit, "y")?;
            let w = stage.scene.attr_f32(hit, "width")?;
            let h = stage.scene.attr_f32(hit, "height")?;
            Some(Rect::from_min_size([x, y], [w, h]))
        } else {
            self.core.root().and_then(|root| stage.scene.bounding_box(root))
        }
    }

    /// The invisible hit-region element, when one was synthesized
    pub fn hit_region(&self) -> Option<ElementId> {
        self.hit_region
    }
}

impl Widget for Button {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn build_structure(&mut self, stage: &mut Stage, parent: ElementId) -> Result<(), BuildError> {
        let root = stage.scene.create_under(parent, "g");
        self.core.adopt_root(&mut stage.scene, root);

        // Visible subtree first: the hit region is measured from it
        let on = self.skin.instantiate(
            &mut stage.scene,
            &mut stage.animations,
            root,
            &self.scope,
        )?;

        let mut toggle =
            ToggleMachine::new(&mut stage.animations, on.root, &on.animations, self.initial);

        if let Some(off_skin) = &self.off_skin {
            let off = off_skin.instantiate(
                &mut stage.scene,
                &mut stage.animations,
                root,
                &self.scope,
            )?;
            toggle = toggle.with_off_side(&mut stage.animations, off.root, &off.animations);
        }
        if let Some(callback) = self.callback.take() {
            toggle = toggle.with_callback(callback);
        }
        toggle.sync_display(stage);

        match &self.highlight_skin {
            Some(highlight_skin) => {
                let highlight = highlight_skin.instantiate(
                    &mut stage.scene,
                    &mut stage.animations,
                    root,
                    &self.scope,
                )?;
                stage.scene.set_attr_f32(highlight.root, "opacity", 0.0);
                self.highlight = Some(highlight.root);
            }
            None => {
                // No highlight: synthesize an invisible hit region covering
                // the realized bounds of the "on" appearance
                if let Some(bounds) = stage.scene.bounding_box(on.root) {
                    let hit = stage.scene.create_under(root, "rect");
                    stage.scene.set_attr_f32(hit, "x", bounds.min[0]);
                    stage.scene.set_attr_f32(hit, "y", bounds.min[1]);
                    stage.scene.set_attr_f32(hit, "width", bounds.width());
                    stage.scene.set_attr_f32(hit, "height", bounds.height());
                    stage.scene.set_attr(hit, "fill", "none");
                    stage.scene.set_attr(hit, "pointer-events", "all");
                    self.hit_region = Some(hit);
                }
            }
        }

        self.toggle = Some(toggle);
        Ok(())
    }

    fn listened_events(&self) -> &'static [PointerKind] {
        &[
            PointerKind::Click,
            PointerKind::MouseOver,
            PointerKind::MouseOut,
        ]
    }

    fn on_click(&mut self, stage: &mut Stage, _event: &PointerEvent) {
        if let Some(toggle) = &mut self.toggle {
            toggle.toggle(stage);
        }
    }

    fn on_mouse_over(&mut self, stage: &mut Stage, _event: &PointerEvent) {
        if let Some(highlight) = self.highlight {
            stage.scene.set_attr_f32(highlight, "opacity", 1.0);
        }
    }

    fn on_mouse_out(&mut self, stage: &mut Stage, _event: &PointerEvent) {
        if let Some(highlight) = self.highlight {
            stage.scene.set_attr_f32(highlight, "opacity", 0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mica::Display;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn click() -> PointerEvent {
        PointerEvent::new(PointerKind::Click, Point::zero())
    }

    #[test]
    fn test_click_toggles_and_notifies() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();

        let mut stage = Stage::new();
        let root = stage.scene.root();
        let mut button = Button::new(10.0, 10.0, 40.0, 16.0)
            .with_callback(Callback::function(move |v: bool| sink.borrow_mut().push(v)));
        button.realize(&mut stage, root).unwrap();

        button.dispatch(&mut stage, &click());
        button.dispatch(&mut stage, &click());
        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn test_programmatic_set_state_suppresses_callback() {
        let count = Rc::new(RefCell::new(0));
        let sink = count.clone();

        let mut stage = Stage::new();
        let root = stage.scene.root();
        let mut button = Button::new(0.0, 0.0, 40.0, 16.0)
            .with_callback(Callback::function(move |_: bool| *sink.borrow_mut() += 1));
        button.realize(&mut stage, root).unwrap();

        button.set_state(&mut stage, true, true);
        assert!(button.state());
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn test_hit_region_matches_on_geometry() {
        let mut stage = Stage::new();
        let root = stage.scene.root();
        let mut button = Button::new(0.0, 0.0, 40.0, 16.0);
        button.realize(&mut stage, root).unwrap();

        let hit = button.hit_region().expect("hit region synthesized");
        assert_eq!(stage.scene.attr_f32(hit, "width"), Some(40.0));
        assert_eq!(stage.scene.attr_f32(hit, "height"), Some(16.0));
    }

    #[test]
    fn test_highlight_suppresses_hit_region_and_tracks_hover() {
        let mut stage = Stage::new();
        let root = stage.scene.root();
        let mut button = Button::new(0.0, 0.0, 40.0, 16.0).with_highlight(Template::new(
            "<rect x=\"0\" y=\"0\" width=\"$width\" height=\"$height\" fill=\"#ffffff\"/>",
        ));
        button.realize(&mut stage, root).unwrap();
        assert!(button.hit_region().is_none());

        let highlight = button.highlight.unwrap();
        let over = PointerEvent::new(PointerKind::MouseOver, Point::zero());
        let out = PointerEvent::new(PointerKind::MouseOut, Point::zero());
        button.dispatch(&mut stage, &over);
        assert_eq!(stage.scene.attr_f32(highlight, "opacity"), Some(1.0));
        button.dispatch(&mut stage, &out);
        assert_eq!(stage.scene.attr_f32(highlight, "opacity"), Some(0.0));
    }

    #[test]
    fn test_two_sided_button_flips_displays() {
        let mut stage = Stage::new();
        let root = stage.scene.root();
        let mut button = Button::new(0.0, 0.0, 20.0, 20.0)
            .with_off_skin(Template::new(
                "<g><rect x=\"0\" y=\"0\" width=\"$width\" height=\"$height\" fill=\"#900000\"/></g>",
            ))
            .with_state(true);
        button.realize(&mut stage, root).unwrap();

        let (on, off) = button.toggle.as_ref().unwrap().subtrees();
        let off = off.unwrap();
        assert_eq!(stage.scene.display(on), Display::Inline);
        assert_eq!(stage.scene.display(off), Display::None);

        button.dispatch(&mut stage, &click());
        assert_eq!(stage.scene.display(on), Display::None);
        assert_eq!(stage.scene.display(off), Display::Inline);
    }

    #[test]
    fn test_skin_animations_adopted_as_pair() {
        let mut stage = Stage::new();
        let root = stage.scene.root();
        let skin = Template::new(
            "<g><rect x=\"0\" y=\"0\" width=\"$width\" height=\"$height\" fill=\"#333333\"/>\
             <animate attributeName=\"opacity\" from=\"0\" to=\"1\" dur=\"0.4s\"/>\
             <animate attributeName=\"opacity\" from=\"1\" to=\"0\" dur=\"0.4s\"/></g>",
        );
        let mut button = Button::new(0.0, 0.0, 40.0, 16.0).with_skin(skin);
        button.realize(&mut stage, root).unwrap();

        // Immediately safe to flip state: the pair is attached before
        // realize returns
        button.set_state(&mut stage, true, true);
        stage.advance(0.2);
        let on = button.toggle.as_ref().unwrap().subtrees().0;
        let opacity = stage.scene.attr_f32(on, "opacity").unwrap();
        assert!(opacity > 0.0 && opacity < 1.0, "adopted 0.4s fade mid-flight");
    }

    #[test]
    fn test_contains_uses_widget_position() {
        let mut stage = Stage::new();
        let root = stage.scene.root();
        let mut button = Button::new(100.0, 50.0, 40.0, 16.0);
        button.realize(&mut stage, root).unwrap();

        assert!(button.contains(&stage, Point::new(120.0, 58.0)));
        assert!(!button.contains(&stage, Point::new(50.0, 58.0)));
    }
}
