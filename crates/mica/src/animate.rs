//! Declarative attribute animations
//!
//! Animations are registered once (usually while a widget builds its
//! subtree) and triggered later. Triggering is synchronous but completion is
//! not: the engine progresses on its own clock via [`Animations::advance`],
//! which is why multi-phase operations schedule their second phase through
//! the [`crate::Scheduler`] rather than waiting. Retriggering a running
//! animation restarts it from the beginning.

use glam::Vec2;

use crate::scene::{ElementId, Scene};

/// Easing function type: takes progress (0.0 to 1.0) and returns eased value (0.0 to 1.0)
pub type EasingFn = fn(f32) -> f32;

/// Linear interpolation (no easing)
pub fn linear(t: f32) -> f32 {
    t
}

/// Ease in (quadratic) - slow start, accelerating
pub fn ease_in(t: f32) -> f32 {
    t * t
}

/// Ease out (quadratic) - fast start, decelerating
pub fn ease_out(t: f32) -> f32 {
    t * (2.0 - t)
}

/// Ease in-out (quadratic) - slow start and end, fast middle
pub fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

/// Linearly interpolate between two f32 values
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Attribute an animation writes into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatedAttr {
    /// `opacity` attribute
    Opacity,
    /// `width` attribute
    Width,
    /// `height` attribute
    Height,
    /// `x` attribute
    X,
    /// `y` attribute
    Y,
    /// X component of the element's local translation
    TranslateX,
    /// Y component of the element's local translation
    TranslateY,
}

impl AnimatedAttr {
    /// Parse an SVG `attributeName` value
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "opacity" => Some(Self::Opacity),
            "width" => Some(Self::Width),
            "height" => Some(Self::Height),
            "x" => Some(Self::X),
            "y" => Some(Self::Y),
            "translate-x" => Some(Self::TranslateX),
            "translate-y" => Some(Self::TranslateY),
            _ => None,
        }
    }

    fn apply(self, scene: &mut Scene, target: ElementId, value: f32) {
        match self {
            Self::Opacity => scene.set_attr_f32(target, "opacity", value),
            Self::Width => scene.set_attr_f32(target, "width", value),
            Self::Height => scene.set_attr_f32(target, "height", value),
            Self::X => scene.set_attr_f32(target, "x", value),
            Self::Y => scene.set_attr_f32(target, "y", value),
            Self::TranslateX => {
                let t = scene.translation(target);
                scene.set_translation(target, Vec2::new(value, t.y));
            }
            Self::TranslateY => {
                let t = scene.translation(target);
                scene.set_translation(target, Vec2::new(t.x, value));
            }
        }
    }
}

/// A single declarative animation
#[derive(Debug, Clone)]
pub struct Animation {
    /// Element whose attribute is written
    pub target: ElementId,
    /// Attribute being animated
    pub attr: AnimatedAttr,
    /// Start value
    pub from: f32,
    /// End value
    pub to: f32,
    /// Duration in seconds
    pub duration: f32,
    /// Easing function
    pub easing: EasingFn,
}

impl Animation {
    /// Create a linear animation
    pub fn new(target: ElementId, attr: AnimatedAttr, from: f32, to: f32, duration: f32) -> Self {
        Self {
            target,
            attr,
            from,
            to,
            duration,
            easing: linear,
        }
    }

    /// Set the easing function
    pub fn with_easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Default fade-in (opacity 0 -> 1)
    pub fn fade_in(target: ElementId, duration: f32) -> Self {
        Self::new(target, AnimatedAttr::Opacity, 0.0, 1.0, duration).with_easing(ease_out)
    }

    /// Default fade-out (opacity 1 -> 0)
    pub fn fade_out(target: ElementId, duration: f32) -> Self {
        Self::new(target, AnimatedAttr::Opacity, 1.0, 0.0, duration).with_easing(ease_in)
    }
}

/// Handle to a registered animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationHandle(usize);

struct Registered {
    animation: Animation,
    /// Seconds elapsed since the last trigger; None while idle
    elapsed: Option<f32>,
}

/// The animation engine
///
/// Owns every registered animation; widgets hold [`AnimationHandle`]s and
/// trigger them from event handlers.
pub struct Animations {
    entries: Vec<Registered>,
}

impl Animations {
    /// Create an empty engine
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register an animation in the idle state
    pub fn register(&mut self, animation: Animation) -> AnimationHandle {
        let handle = AnimationHandle(self.entries.len());
        self.entries.push(Registered {
            animation,
            elapsed: None,
        });
        handle
    }

    /// Start (or restart) an animation
    ///
    /// The start value is written to the target on the next `advance`.
    /// Triggering an already-running animation interrupts and restarts it.
    pub fn trigger(&mut self, handle: AnimationHandle) {
        if let Some(entry) = self.entries.get_mut(handle.0) {
            entry.elapsed = Some(0.0);
        }
    }

    /// Replace the endpoints of a registered animation
    ///
    /// Used by resize tweens, whose endpoints are measured fresh before each
    /// trigger.
    pub fn retarget(&mut self, handle: AnimationHandle, from: f32, to: f32) {
        if let Some(entry) = self.entries.get_mut(handle.0) {
            entry.animation.from = from;
            entry.animation.to = to;
        }
    }

    /// Whether an animation is currently running
    pub fn is_running(&self, handle: AnimationHandle) -> bool {
        self.entries
            .get(handle.0)
            .map(|e| e.elapsed.is_some())
            .unwrap_or(false)
    }

    /// Duration of a registered animation in seconds
    pub fn duration(&self, handle: AnimationHandle) -> f32 {
        self.entries
            .get(handle.0)
            .map(|e| e.animation.duration)
            .unwrap_or(0.0)
    }

    /// The animation behind a handle
    pub fn get(&self, handle: AnimationHandle) -> Option<&Animation> {
        self.entries.get(handle.0).map(|e| &e.animation)
    }

    /// Progress every running animation by `dt` seconds, writing eased
    /// values into the scene
    ///
    /// Completed animations freeze at their end value and return to idle.
    pub fn advance(&mut self, dt: f32, scene: &mut Scene) {
        for entry in &mut self.entries {
            let Some(elapsed) = entry.elapsed else {
                continue;
            };
            if !scene.is_alive(entry.animation.target) {
                entry.elapsed = None;
                continue;
            }

            let elapsed = elapsed + dt;
            let animation = &entry.animation;
            if elapsed >= animation.duration || animation.duration <= 0.0 {
                animation.attr.apply(scene, animation.target, animation.to);
                entry.elapsed = None;
            } else {
                let t = (animation.easing)(elapsed / animation.duration);
                let value = lerp_f32(animation.from, animation.to, t);
                animation.attr.apply(scene, animation.target, value);
                entry.elapsed = Some(elapsed);
            }
        }
    }
}

impl Default for Animations {
    fn default() -> Self {
        Self::new()
    }
}
