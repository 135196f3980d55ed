//! Draggable slider control
//!
//! Maps a value in `[min, max]` linearly onto a pixel offset in `[0, size]`
//! along the track. Reversed sliders (min > max) are supported; out-of-range
//! values are clamped to the nearest bound, never rejected.

use mica::{
    BuildError, Callback, ElementId, PointerEvent, PointerKind, Scope, Stage, Template,
    TemplateError, Widget, WidgetCore,
};

const TRACK_TEMPLATE: &str = "<g>\
<line x1=\"0\" y1=\"{thickness / 2}\" x2=\"$size\" y2=\"{thickness / 2}\" \
stroke=\"#888888\" stroke-width=\"2\"/>\
<rect class=\"thumb\" x=\"{0 - thumb / 2}\" y=\"0\" width=\"$thumb\" height=\"$thickness\" \
rx=\"{thumb / 4}\" fill=\"#cccccc\" stroke=\"#444444\"/>\
</g>";

/// A continuous-value draggable slider
pub struct Slider {
    core: WidgetCore,
    min: f32,
    max: f32,
    /// Track length in pixels
    size: f32,
    thickness: f32,
    value: f32,
    thumb: Option<ElementId>,
    active: bool,
    callback: Option<Callback<f32>>,
}

impl Slider {
    /// Create a slider at `(x, y)` with the given track length and bounds
    pub fn new(x: f32, y: f32, size: f32, min: f32, max: f32) -> Self {
        Self {
            core: WidgetCore::new(x, y),
            min,
            max,
            size: size.max(1.0),
            thickness: 12.0,
            value: min,
            thumb: None,
            active: false,
            callback: None,
        }
    }

    /// Set the change callback (receives the new value)
    pub fn with_callback(mut self, callback: Callback<f32>) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Current value
    pub fn get_value(&self) -> f32 {
        self.value
    }

    /// Lower/upper bound as constructed (may be reversed)
    pub fn minmax(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    /// Whether a drag is in progress
    pub fn is_active(&self) -> bool {
        self.active
    }

    fn clamp_value(&self, value: f32) -> f32 {
        // Direction-aware: reversed sliders have min > max
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        value.clamp(lo, hi)
    }

    fn value_to_position(&self, value: f32) -> f32 {
        let span = self.max - self.min;
        if span == 0.0 {
            return 0.0;
        }
        ((value - self.min) / span * self.size).clamp(0.0, self.size)
    }

    fn position_to_value(&self, position: f32) -> f32 {
        let position = position.clamp(0.0, self.size);
        self.min + (self.max - self.min) * position / self.size
    }

    fn move_thumb(&self, stage: &mut Stage, position: f32) {
        if let Some(thumb) = self.thumb {
            let t = stage.scene.translation(thumb);
            stage
                .scene
                .set_translation(thumb, glam::Vec2::new(position, t.y));
        }
    }

    /// Update bounds; the value is re-clamped into the new range
    ///
    /// With `redraw` the thumb is moved to the re-clamped value's position.
    pub fn set_minmax(&mut self, stage: &mut Stage, min: f32, max: f32, redraw: bool) {
        self.min = min;
        self.max = max;
        self.value = self.clamp_value(self.value);
        if redraw {
            let position = self.value_to_position(self.value);
            self.move_thumb(stage, position);
        }
    }

    /// Set the value, clamped into bounds, and move the thumb
    pub fn set_value(&mut self, stage: &mut Stage, value: f32, notify: bool) {
        self.value = self.clamp_value(value);
        let position = self.value_to_position(self.value);
        self.move_thumb(stage, position);
        if notify {
            if let Some(callback) = &mut self.callback {
                callback.invoke(self.value);
            }
        }
    }

    /// Set by pixel position (inverse mapping, the drag path)
    pub fn set_position(&mut self, stage: &mut Stage, position: f32, notify: bool) {
        let position = position.clamp(0.0, self.size);
        self.value = self.position_to_value(position);
        self.move_thumb(stage, position);
        if notify {
            if let Some(callback) = &mut self.callback {
                callback.invoke(self.value);
            }
        }
    }

    /// Current thumb pixel offset along the track
    pub fn get_position(&self, stage: &Stage) -> f32 {
        self.thumb
            .map(|thumb| stage.scene.translation(thumb).x)
            .unwrap_or(0.0)
    }

    fn seek_to_pointer(&mut self, stage: &mut Stage, event: &PointerEvent) {
        let Some(root) = self.core.root() else {
            return;
        };
        let local = self.local_point(stage, root, event.position);
        self.set_position(stage, local.x, true);
    }
}

impl Widget for Slider {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn build_structure(&mut self, stage: &mut Stage, parent: ElementId) -> Result<(), BuildError> {
        let scope = Scope::new()
            .with("size", self.size)
            .with("thickness", self.thickness)
            .with("thumb", 8.0);
        let built = Template::new(TRACK_TEMPLATE).instantiate(
            &mut stage.scene,
            &mut stage.animations,
            parent,
            &scope,
        )?;
        self.core.adopt_root(&mut stage.scene, built.root);

        // Last child of the track group is the thumb
        let thumb = stage
            .scene
            .children(built.root)
            .last()
            .copied()
            .ok_or_else(|| TemplateError::Markup("slider track has no thumb".into()))?;
        self.thumb = Some(thumb);

        let position = self.value_to_position(self.value);
        self.move_thumb(stage, position);
        Ok(())
    }

    fn listened_events(&self) -> &'static [PointerKind] {
        &[
            PointerKind::MouseDown,
            PointerKind::MouseMove,
            PointerKind::MouseUp,
        ]
    }

    fn on_mouse_down(&mut self, stage: &mut Stage, event: &PointerEvent) {
        self.active = true;
        self.seek_to_pointer(stage, event);
    }

    fn on_mouse_move(&mut self, stage: &mut Stage, event: &PointerEvent) {
        if self.active {
            self.seek_to_pointer(stage, event);
        }
    }

    fn on_mouse_up(&mut self, _stage: &mut Stage, _event: &PointerEvent) {
        self.active = false;
    }
}
