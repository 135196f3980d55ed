//! Animated dual-state toggle pattern
//!
//! Shared by buttons, on/off switches, and show/hide controls. The boolean
//! is the authoritative state; the four animations (forward/backward per
//! side) are best-effort visual transitions layered on top. Flipping state
//! also flips the display switches so that, whenever both subtrees exist,
//! exactly one of them is visible - regardless of where any animation
//! happens to be.

use crate::animate::{Animation, AnimationHandle, Animations};
use crate::callback::Callback;
use crate::scene::{Display, ElementId};
use crate::stage::Stage;

/// Default fade duration when a skin declares no animations, in seconds
pub const DEFAULT_FADE_SECS: f32 = 0.25;

/// The four transition animations of a toggle
#[derive(Debug, Clone, Copy)]
pub struct TogglePair {
    /// Plays when this side becomes current
    pub forward: AnimationHandle,
    /// Plays when this side stops being current
    pub backward: AnimationHandle,
}

/// Dual-state machine with paired forward/backward animations
pub struct ToggleMachine {
    on: bool,
    on_subtree: ElementId,
    on_pair: TogglePair,
    off_subtree: Option<ElementId>,
    off_pair: Option<TogglePair>,
    callback: Option<Callback<bool>>,
}

impl ToggleMachine {
    /// Build the "on" side from an instantiated skin
    ///
    /// Adoption policy: if the skin markup declared exactly two `<animate>`
    /// elements they become the forward/backward pair; otherwise default
    /// fade-in/fade-out animations are synthesized and attached. Either way
    /// the pair is registered before this returns, so `set_state` is safe
    /// immediately - there is no attach race to work around.
    pub fn new(
        animations: &mut Animations,
        on_subtree: ElementId,
        declared: &[AnimationHandle],
        initial: bool,
    ) -> Self {
        let on_pair = Self::adopt_or_synthesize(animations, on_subtree, declared);
        Self {
            on: initial,
            on_subtree,
            on_pair,
            off_subtree: None,
            off_pair: None,
            callback: None,
        }
    }

    /// Attach an "off" side with its own animation pair
    pub fn with_off_side(
        mut self,
        animations: &mut Animations,
        off_subtree: ElementId,
        declared: &[AnimationHandle],
    ) -> Self {
        self.off_pair = Some(Self::adopt_or_synthesize(animations, off_subtree, declared));
        self.off_subtree = Some(off_subtree);
        self
    }

    /// Set the external notification callback
    pub fn with_callback(mut self, callback: Callback<bool>) -> Self {
        self.callback = Some(callback);
        self
    }

    fn adopt_or_synthesize(
        animations: &mut Animations,
        subtree: ElementId,
        declared: &[AnimationHandle],
    ) -> TogglePair {
        if let [forward, backward] = declared {
            TogglePair {
                forward: *forward,
                backward: *backward,
            }
        } else {
            TogglePair {
                forward: animations.register(Animation::fade_in(subtree, DEFAULT_FADE_SECS)),
                backward: animations.register(Animation::fade_out(subtree, DEFAULT_FADE_SECS)),
            }
        }
    }

    /// Authoritative boolean state
    pub fn state(&self) -> bool {
        self.on
    }

    /// Element ids of the on/off subtrees
    pub fn subtrees(&self) -> (ElementId, Option<ElementId>) {
        (self.on_subtree, self.off_subtree)
    }

    /// Apply the current state's display switches without animating
    ///
    /// Used at build time so the skin starts out consistent.
    pub fn sync_display(&self, stage: &mut Stage) {
        if let Some(off) = self.off_subtree {
            let (on_display, off_display) = if self.on {
                (Display::Inline, Display::None)
            } else {
                (Display::None, Display::Inline)
            };
            stage.scene.set_display(self.on_subtree, on_display);
            stage.scene.set_display(off, off_display);
        }
    }

    /// Transition to `value`
    ///
    /// Triggers the entering side's forward animation and the leaving
    /// side's backward animation, flips the display switches, and fires the
    /// callback with the new state - unless `no_callback` suppresses it for
    /// a programmatic, model-driven change.
    pub fn set_state(&mut self, stage: &mut Stage, value: bool, no_callback: bool) {
        log::debug!("toggle set_state {} -> {}", self.on, value);
        self.on = value;

        if value {
            stage.trigger(self.on_pair.forward);
            if let Some(off_pair) = self.off_pair {
                stage.trigger(off_pair.backward);
            }
        } else {
            stage.trigger(self.on_pair.backward);
            if let Some(off_pair) = self.off_pair {
                stage.trigger(off_pair.forward);
            }
        }
        self.sync_display(stage);

        if !no_callback {
            if let Some(callback) = &mut self.callback {
                callback.invoke(value);
            }
        }
    }

    /// User-path flip (click); never suppresses the callback
    pub fn toggle(&mut self, stage: &mut Stage) {
        let next = !self.on;
        self.set_state(stage, next, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn two_sided(stage: &mut Stage) -> ToggleMachine {
        let root = stage.scene.root();
        let on = stage.scene.create_under(root, "g");
        let off = stage.scene.create_under(root, "g");
        ToggleMachine::new(&mut stage.animations, on, &[], false)
            .with_off_side(&mut stage.animations, off, &[])
    }

    #[test]
    fn test_exactly_one_subtree_visible() {
        let mut stage = Stage::new();
        let mut toggle = two_sided(&mut stage);
        let (on, off) = toggle.subtrees();
        let off = off.unwrap();

        toggle.set_state(&mut stage, true, true);
        assert_eq!(stage.scene.display(on), Display::Inline);
        assert_eq!(stage.scene.display(off), Display::None);

        toggle.set_state(&mut stage, false, true);
        assert_eq!(stage.scene.display(on), Display::None);
        assert_eq!(stage.scene.display(off), Display::Inline);
    }

    #[test]
    fn test_state_is_authoritative_mid_animation() {
        let mut stage = Stage::new();
        let mut toggle = two_sided(&mut stage);
        toggle.set_state(&mut stage, true, true);
        // Animations have not advanced at all, state is already settled
        assert!(toggle.state());
        let (on, off) = toggle.subtrees();
        assert_eq!(stage.scene.display(on), Display::Inline);
        assert_eq!(stage.scene.display(off.unwrap()), Display::None);
    }

    #[test]
    fn test_callback_suppression() {
        let mut stage = Stage::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();

        let root = stage.scene.root();
        let on = stage.scene.create_under(root, "g");
        let mut toggle = ToggleMachine::new(&mut stage.animations, on, &[], false)
            .with_callback(Callback::function(move |v: bool| {
                sink.borrow_mut().push(v)
            }));

        toggle.set_state(&mut stage, true, true); // programmatic sync
        toggle.set_state(&mut stage, false, false); // user path
        toggle.toggle(&mut stage); // user path
        assert_eq!(*seen.borrow(), vec![false, true]);
    }

    #[test]
    fn test_adopts_exactly_two_declared_animations() {
        let mut stage = Stage::new();
        let root = stage.scene.root();
        let on = stage.scene.create_under(root, "g");

        let a = stage
            .animations
            .register(Animation::fade_in(on, 0.5));
        let b = stage
            .animations
            .register(Animation::fade_out(on, 0.5));
        let toggle = ToggleMachine::new(&mut stage.animations, on, &[a, b], false);
        assert_eq!(toggle.on_pair.forward, a);
        assert_eq!(toggle.on_pair.backward, b);
    }

    #[test]
    fn test_synthesizes_fades_otherwise() {
        let mut stage = Stage::new();
        let root = stage.scene.root();
        let on = stage.scene.create_under(root, "g");
        let lone = stage.animations.register(Animation::fade_in(on, 0.5));

        // One declared animation is not a pair; defaults are synthesized
        let toggle = ToggleMachine::new(&mut stage.animations, on, &[lone], false);
        assert_ne!(toggle.on_pair.forward, lone);
        assert_eq!(
            stage.animations.duration(toggle.on_pair.forward),
            DEFAULT_FADE_SECS
        );
    }

    #[test]
    fn test_set_state_safe_immediately_after_construction() {
        let mut stage = Stage::new();
        let mut toggle = two_sided(&mut stage);
        // No advance, no realize dance - must not panic and must settle
        toggle.set_state(&mut stage, true, true);
        stage.advance(1.0);
        assert!(toggle.state());
    }
}
