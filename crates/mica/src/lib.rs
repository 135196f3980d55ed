//! # mica
//!
//! Retained SVG widget toolkit core.
//!
//! This crate provides the scene graph, template renderer, animation engine,
//! and widget lifecycle contract that every concrete control builds on.
//! Concrete controls (buttons, toolboxes, sliders, popup lists) live in
//! `mica-widgets`.
//!
//! ## Core Types
//!
//! - [`Scene`] - The single live SVG scene graph, arena-allocated
//! - [`Template`] - Declarative markup with `$var` / `{expr}` substitution
//! - [`Stage`] - Central coordinator owning scene, animations, and scheduler
//! - [`Widget`] / [`WidgetCore`] - The widget lifecycle contract
//!
//! ## Animation & Scheduling
//!
//! - [`Animations`] - Declarative attribute animations with restart semantics
//! - [`Scheduler`] - Timed deferred actions for two-phase state transitions
//! - [`ToggleMachine`] - The dual-state toggle pattern shared by all switches
//!
//! ## Interaction
//!
//! - [`PointerEvent`] / [`PointerKind`] - Closed event set routed to widgets
//! - [`Callback`] - Typed function-or-bound-method callback

mod animate;
mod callback;
mod error;
mod primitives;
mod scene;
mod schedule;
mod stage;
mod template;
mod toggle;
mod widget;

pub use animate::*;
pub use callback::*;
pub use error::*;
pub use primitives::*;
pub use scene::*;
pub use schedule::*;
pub use stage::*;
pub use template::*;
pub use toggle::*;
pub use widget::*;
