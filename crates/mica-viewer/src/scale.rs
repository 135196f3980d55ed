//! Scale selector panel
//!
//! A popup list of named zoom scales. The callback writes the chosen factor
//! into the shared [`ViewerContext`]; `sync_from_context` flows the other
//! way, with both notification and animation suppressed.

use std::cell::RefCell;
use std::rc::Rc;

use mica::{BuildError, Callback, ElementId, PointerEvent, Stage, Widget};
use mica_widgets::PopupList;

use crate::context::ViewerContext;

/// Named zoom factors offered by the selector
pub const SCALES: &[(&str, f32)] = &[
    ("25%", 0.25),
    ("50%", 0.5),
    ("100%", 1.0),
    ("200%", 2.0),
    ("400%", 4.0),
];

/// Popup selector over the named zoom scales
pub struct ScalePanel {
    context: Rc<RefCell<ViewerContext>>,
    popup: PopupList,
}

impl ScalePanel {
    pub fn new(
        x: f32,
        y: f32,
        context: Rc<RefCell<ViewerContext>>,
    ) -> Result<Self, BuildError> {
        let labels = SCALES.iter().map(|(name, _)| name.to_string()).collect();
        let keys = SCALES.iter().map(|(_, factor)| *factor).collect();
        let sink = context.clone();
        let popup = PopupList::new(x, y, 60.0, labels, keys)?.with_callback(
            Callback::function(move |factor: f32| {
                log::debug!("scale -> {factor}");
                sink.borrow_mut().scale = factor;
            }),
        );
        Ok(Self { context, popup })
    }

    /// The underlying popup list
    pub fn popup(&self) -> &PopupList {
        &self.popup
    }

    pub fn realize(&mut self, stage: &mut Stage, parent: ElementId) -> Result<(), BuildError> {
        self.popup
            .core_mut()
            .set_label(&mut stage.scene, None, -4.0, 12.0, "Scale");
        self.popup.realize(stage, parent)?;
        self.sync_from_context(stage);
        Ok(())
    }

    pub fn dispatch(&mut self, stage: &mut Stage, event: &PointerEvent) {
        self.popup.dispatch(stage, event);
    }

    /// Point the popup at the context's current scale
    ///
    /// Model-driven: no callback (the value just came from the model) and no
    /// slide animation (nothing the user did is being confirmed). Unknown
    /// factors leave the selection alone.
    pub fn sync_from_context(&mut self, stage: &mut Stage) {
        let scale = self.context.borrow().scale;
        if let Some(index) = SCALES.iter().position(|(_, factor)| *factor == scale) {
            self.popup.set_selection(stage, index as f32, false, false);
        } else {
            log::warn!("no named scale for factor {scale}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mica::{Point, PointerKind};
    use mica_widgets::ITEM_HEIGHT;

    fn panel() -> (Stage, ScalePanel, Rc<RefCell<ViewerContext>>) {
        let context = Rc::new(RefCell::new(ViewerContext::new(&["gray"])));
        let mut stage = Stage::new();
        let root = stage.scene.root();
        let mut panel = ScalePanel::new(0.0, 0.0, context.clone()).unwrap();
        panel.realize(&mut stage, root).unwrap();
        (stage, panel, context)
    }

    #[test]
    fn test_realize_syncs_to_context_scale() {
        let context = Rc::new(RefCell::new(ViewerContext::new(&["gray"])));
        context.borrow_mut().scale = 2.0;
        let mut stage = Stage::new();
        let root = stage.scene.root();
        let mut panel = ScalePanel::new(0.0, 0.0, context).unwrap();
        panel.realize(&mut stage, root).unwrap();
        assert_eq!(panel.popup().get_selection(), 2.0);
    }

    #[test]
    fn test_selection_writes_scale_into_context() {
        let (mut stage, mut panel, context) = panel();
        let open = PointerEvent::new(PointerKind::Click, Point::new(10.0, 8.0));
        panel.dispatch(&mut stage, &open);
        // Fifth slot: 400%
        let pick = PointerEvent::new(PointerKind::Click, Point::new(10.0, ITEM_HEIGHT * 5.5));
        panel.dispatch(&mut stage, &pick);
        assert_eq!(context.borrow().scale, 4.0);
    }

    #[test]
    fn test_sync_does_not_write_back_or_animate() {
        let (mut stage, mut panel, context) = panel();
        context.borrow_mut().scale = 0.5;
        panel.sync_from_context(&mut stage);
        assert_eq!(panel.popup().get_selection(), 0.5);
        assert_eq!(context.borrow().scale, 0.5);
        assert!(!panel.popup().is_open());
    }

    #[test]
    fn test_unknown_factor_leaves_selection() {
        let (mut stage, mut panel, context) = panel();
        context.borrow_mut().scale = 3.0;
        panel.sync_from_context(&mut stage);
        assert_eq!(panel.popup().get_selection(), 1.0);
    }
}
