//! Central coordinator for the toolkit
//!
//! The stage owns the three shared pieces every widget touches: the scene
//! graph, the animation engine, and the deferred-action scheduler. Widgets
//! receive `&mut Stage` in their build hooks and event handlers; all
//! interaction happens from a single-threaded event loop, so call order is
//! the only ordering guarantee (and the only one needed).

use glam::Vec2;

use crate::animate::{AnimationHandle, Animations};
use crate::primitives::Point;
use crate::scene::{Display, ElementId, Scene};
use crate::schedule::{DeferredAction, Scheduler, TaskId};

/// Scene + animations + scheduler, advanced by one clock
pub struct Stage {
    pub scene: Scene,
    pub animations: Animations,
    pub scheduler: Scheduler,
}

impl Stage {
    /// Create a stage with an empty scene
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            animations: Animations::new(),
            scheduler: Scheduler::new(),
        }
    }

    /// Trigger a registered animation now
    pub fn trigger(&mut self, handle: AnimationHandle) {
        self.animations.trigger(handle);
    }

    /// Schedule a display flip after `delay` seconds
    pub fn schedule_display(&mut self, delay: f32, target: ElementId, display: Display) -> TaskId {
        self.scheduler
            .schedule(delay, DeferredAction::SetDisplay(target, display))
    }

    /// Cancel a pending scheduled phase
    pub fn cancel(&mut self, task: TaskId) {
        self.scheduler.cancel(task);
    }

    /// Convert a global pointer coordinate to `id`'s local space
    pub fn global_to_local(&self, id: ElementId, global: Point) -> Point {
        self.scene.global_to_local(id, global)
    }

    /// Set the viewport pan offset
    pub fn set_pan(&mut self, pan: Vec2) {
        self.scene.set_pan(pan);
    }

    /// Set the viewport zoom factor
    pub fn set_zoom(&mut self, zoom: f32) {
        self.scene.set_zoom(zoom);
    }

    /// Advance the clock by `dt` seconds
    ///
    /// Applies deferred actions that came due, then progresses running
    /// animations. Handlers scheduled nothing blocking; this is the only
    /// place time passes.
    pub fn advance(&mut self, dt: f32) {
        for action in self.scheduler.advance(dt) {
            match action {
                DeferredAction::SetDisplay(target, display) => {
                    if self.scene.is_alive(target) {
                        self.scene.set_display(target, display);
                    }
                }
                DeferredAction::Trigger(handle) => self.animations.trigger(handle),
            }
        }
        self.animations.advance(dt, &mut self.scene);
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animate::{AnimatedAttr, Animation};

    #[test]
    fn test_deferred_display_flip() {
        let mut stage = Stage::new();
        let root = stage.scene.root();
        let body = stage.scene.create_under(root, "g");

        stage.schedule_display(0.3, body, Display::None);
        stage.advance(0.1);
        assert_eq!(stage.scene.display(body), Display::Inline);
        stage.advance(0.25);
        assert_eq!(stage.scene.display(body), Display::None);
    }

    #[test]
    fn test_deferred_trigger_starts_animation() {
        let mut stage = Stage::new();
        let root = stage.scene.root();
        let rect = stage.scene.create_under(root, "rect");
        let handle = stage
            .animations
            .register(Animation::new(rect, AnimatedAttr::Opacity, 0.0, 1.0, 0.5));

        stage
            .scheduler
            .schedule(0.2, DeferredAction::Trigger(handle));
        stage.advance(0.1);
        assert!(!stage.animations.is_running(handle));
        stage.advance(0.15);
        assert!(stage.animations.is_running(handle));
    }
}
