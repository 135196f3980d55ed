//! # mica-widgets
//!
//! Interactive controls built on the `mica` core: the templated button with
//! its dual-state toggle, the collapsible toolbox and its multipane
//! extension, the popup list selector, and the draggable slider.
//!
//! Every control follows the [`mica::Widget`] lifecycle: construct with
//! geometry, `realize` into a stage, then feed pointer events through
//! `dispatch`.

mod button;
mod multipane;
mod popup_list;
mod slider;
mod toolbox;

pub use button::*;
pub use multipane::*;
pub use popup_list::*;
pub use slider::*;
pub use toolbox::*;
