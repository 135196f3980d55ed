//! Popup list selector
//!
//! A collapsed anchor shows the selected entry; clicking it unfolds the full
//! list below, items sliding into their slots. Entries pair a display label
//! with a numeric key, and the callback reports keys, not indices - the keys
//! may be sparse (`[0, 2, 5]`) or otherwise meaningful to the caller.

use mica::{
    AnimationHandle, BuildError, Callback, Display, ElementId, Point, PointerEvent, PointerKind,
    Rect, Scope, Stage, Template, Widget, WidgetCore,
};

/// Height of the anchor and of each unfolded item
pub const ITEM_HEIGHT: f32 = 16.0;

const ANCHOR_TEMPLATE: &str = "<g>\
<rect x=\"0\" y=\"0\" width=\"$width\" height=\"$height\" fill=\"#3a3a3a\" stroke=\"#222222\"/>\
<text x=\"4\" y=\"{height - 4}\" fill=\"#dddddd\">$label</text>\
</g>";

const ITEM_TEMPLATE: &str = "<g>\
<rect x=\"0\" y=\"0\" width=\"$width\" height=\"$height\" fill=\"#2d2d2d\" stroke=\"#222222\"/>\
<text x=\"4\" y=\"{height - 4}\" fill=\"#cccccc\">$label</text>\
<animate attributeName=\"translate-y\" from=\"0\" to=\"$slot\" dur=\"0.2s\"/>\
</g>";

/// Drop-down selector over labelled numeric keys
pub struct PopupList {
    core: WidgetCore,
    width: f32,
    labels: Vec<String>,
    keys: Vec<f32>,
    selection: usize,
    active: bool,
    callback: Option<Callback<f32>>,

    anchor_text: Option<ElementId>,
    items: Option<ElementId>,
    item_slides: Vec<AnimationHandle>,
}

impl PopupList {
    /// Create a popup at `(x, y)`; `labels` and `keys` must pair up
    pub fn new(
        x: f32,
        y: f32,
        width: f32,
        labels: Vec<String>,
        keys: Vec<f32>,
    ) -> Result<Self, BuildError> {
        if labels.len() != keys.len() || labels.is_empty() {
            return Err(BuildError::MismatchedArguments {
                expected: labels.len().max(1),
                got: keys.len(),
            });
        }
        Ok(Self {
            core: WidgetCore::new(x, y),
            width,
            labels,
            keys,
            selection: 0,
            active: false,
            callback: None,
            anchor_text: None,
            items: None,
            item_slides: Vec::new(),
        })
    }

    /// Set the selection callback (receives the selected key)
    pub fn with_callback(mut self, callback: Callback<f32>) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Key of the current selection
    pub fn get_selection(&self) -> f32 {
        self.keys[self.selection]
    }

    /// Index of the current selection
    pub fn selected_index(&self) -> usize {
        self.selection
    }

    /// Whether the list is unfolded
    pub fn is_open(&self) -> bool {
        self.active
    }

    /// Select by (possibly fractional) index
    ///
    /// The index is rounded, then clamped into range. The anchor label
    /// updates immediately; `notify` controls the callback and `animate`
    /// controls whether an open list re-slides its items.
    pub fn set_selection(&mut self, stage: &mut Stage, index: f32, notify: bool, animate: bool) {
        let idx = (index.round().max(0.0) as usize).min(self.labels.len() - 1);
        self.selection = idx;

        if let Some(anchor_text) = self.anchor_text {
            stage.scene.set_text(anchor_text, self.labels[idx].clone());
        }
        if self.active && animate {
            for &slide in &self.item_slides {
                stage.trigger(slide);
            }
        }
        if notify {
            let key = self.keys[idx];
            if let Some(callback) = &mut self.callback {
                callback.invoke(key);
            }
        }
    }

    /// Unfold the list above everything else in its parent
    pub fn open(&mut self, stage: &mut Stage) {
        let Some(items) = self.items else {
            return;
        };
        self.active = true;
        if let Some(root) = self.core.root() {
            stage.scene.raise(root);
        }
        stage.scene.set_display(items, Display::Inline);
        for &slide in &self.item_slides {
            stage.trigger(slide);
        }
    }

    /// Fold the list back to just the anchor
    pub fn close(&mut self, stage: &mut Stage) {
        let Some(items) = self.items else {
            return;
        };
        self.active = false;
        stage.scene.set_display(items, Display::None);
        // Snap items home so the next open slides from the anchor again
        for child in stage.scene.children(items).to_vec() {
            stage.scene.set_translation(child, glam::Vec2::ZERO);
        }
    }

    fn anchor_rect(&self) -> Rect {
        Rect::from_min_size([0.0, 0.0], [self.width, ITEM_HEIGHT])
    }

    /// Item index under a local point, when the list is open
    fn item_at(&self, local: Point) -> Option<usize> {
        if local.x < 0.0 || local.x > self.width || local.y < ITEM_HEIGHT {
            return None;
        }
        let idx = ((local.y - ITEM_HEIGHT) / ITEM_HEIGHT) as usize;
        (idx < self.labels.len()).then_some(idx)
    }
}

impl Widget for PopupList {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn build_structure(&mut self, stage: &mut Stage, parent: ElementId) -> Result<(), BuildError> {
        let root = stage.scene.create_under(parent, "g");
        self.core.adopt_root(&mut stage.scene, root);

        let anchor_scope = Scope::new()
            .with("width", self.width)
            .with("height", ITEM_HEIGHT)
            .with("label", self.labels[self.selection].as_str());
        let anchor = Template::new(ANCHOR_TEMPLATE).instantiate(
            &mut stage.scene,
            &mut stage.animations,
            root,
            &anchor_scope,
        )?;
        self.anchor_text = Some(stage.scene.children(anchor.root)[1]);

        let items = stage.scene.create_under(root, "g");
        stage.scene.set_display(items, Display::None);
        let item_template = Template::new(ITEM_TEMPLATE);
        for (i, label) in self.labels.iter().enumerate() {
            let scope = Scope::new()
                .with("width", self.width)
                .with("height", ITEM_HEIGHT)
                .with("label", label.as_str())
                .with("slot", (i as f32 + 1.0) * ITEM_HEIGHT);
            let item = item_template.instantiate(
                &mut stage.scene,
                &mut stage.animations,
                items,
                &scope,
            )?;
            self.item_slides.extend(item.animations);
        }
        self.items = Some(items);
        Ok(())
    }

    fn listened_events(&self) -> &'static [PointerKind] {
        &[PointerKind::Click]
    }

    fn on_click(&mut self, stage: &mut Stage, event: &PointerEvent) {
        let Some(root) = self.core.root() else {
            return;
        };
        let local = self.local_point(stage, root, event.position);

        if !self.active {
            if self.anchor_rect().contains(local) {
                self.open(stage);
            }
            return;
        }
        if let Some(idx) = self.item_at(local) {
            self.set_selection(stage, idx as f32, true, false);
        }
        self.close(stage);
    }

    /// An open list's slot placement is stale once the viewport moves
    fn on_viewport_change(&mut self, stage: &mut Stage) {
        if self.active {
            self.close(stage);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn labelled(keys: &[f32]) -> PopupList {
        let labels = keys.iter().map(|k| format!("option {k}")).collect();
        PopupList::new(0.0, 0.0, 60.0, labels, keys.to_vec()).unwrap()
    }

    fn realized(keys: &[f32]) -> (Stage, PopupList) {
        let mut stage = Stage::new();
        let root = stage.scene.root();
        let mut popup = labelled(keys);
        popup.realize(&mut stage, root).unwrap();
        (stage, popup)
    }

    #[test]
    fn test_mismatched_labels_and_keys_rejected() {
        let err = PopupList::new(
            0.0,
            0.0,
            60.0,
            vec!["a".into(), "b".into()],
            vec![1.0],
        )
        .err()
        .unwrap();
        assert!(matches!(
            err,
            BuildError::MismatchedArguments {
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn test_sparse_keys_reported_by_selection() {
        let (mut stage, mut popup) = realized(&[0.0, 2.0, 5.0]);
        popup.set_selection(&mut stage, 1.0, false, false);
        assert_eq!(popup.get_selection(), 2.0);
    }

    #[test]
    fn test_selection_rounds_and_clamps() {
        let (mut stage, mut popup) = realized(&[0.0, 2.0, 5.0]);
        popup.set_selection(&mut stage, 1.4, false, false);
        assert_eq!(popup.selected_index(), 1);
        popup.set_selection(&mut stage, 99.0, false, false);
        assert_eq!(popup.selected_index(), 2);
        popup.set_selection(&mut stage, -3.0, false, false);
        assert_eq!(popup.selected_index(), 0);
    }

    #[test]
    fn test_anchor_label_tracks_selection() {
        let (mut stage, mut popup) = realized(&[0.0, 2.0, 5.0]);
        popup.set_selection(&mut stage, 2.0, false, false);
        let anchor_text = popup.anchor_text.unwrap();
        assert_eq!(stage.scene.text(anchor_text), Some("option 5"));
    }

    #[test]
    fn test_open_raises_root_and_unfolds() {
        let mut stage = Stage::new();
        let root = stage.scene.root();
        let sibling = stage.scene.create_under(root, "g");
        let mut popup = labelled(&[0.0, 1.0]);
        popup.realize(&mut stage, root).unwrap();
        let popup_root = popup.core().root().unwrap();

        // Realized after `sibling`, then raised above it again on open
        stage.scene.raise(sibling);
        popup.open(&mut stage);
        assert_eq!(*stage.scene.children(root).last().unwrap(), popup_root);
        assert_eq!(stage.scene.display(popup.items.unwrap()), Display::Inline);

        // Items slide into their slots
        stage.advance(0.3);
        let items = stage.scene.children(popup.items.unwrap()).to_vec();
        assert_eq!(stage.scene.translation(items[0]).y, ITEM_HEIGHT);
        assert_eq!(stage.scene.translation(items[1]).y, 2.0 * ITEM_HEIGHT);
    }

    #[test]
    fn test_click_flow_selects_and_closes() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();

        let mut stage = Stage::new();
        let root = stage.scene.root();
        let mut popup = labelled(&[0.0, 2.0, 5.0])
            .with_callback(Callback::function(move |k: f32| sink.borrow_mut().push(k)));
        popup.realize(&mut stage, root).unwrap();

        // Click the anchor: opens without selecting
        let on_anchor = PointerEvent::new(PointerKind::Click, Point::new(10.0, 8.0));
        popup.dispatch(&mut stage, &on_anchor);
        assert!(popup.is_open());
        assert!(seen.borrow().is_empty());

        // Click the second item slot: selects key 2 and closes
        let on_item = PointerEvent::new(PointerKind::Click, Point::new(10.0, ITEM_HEIGHT * 2.5));
        popup.dispatch(&mut stage, &on_item);
        assert!(!popup.is_open());
        assert_eq!(popup.get_selection(), 2.0);
        assert_eq!(*seen.borrow(), vec![2.0]);
        assert_eq!(stage.scene.display(popup.items.unwrap()), Display::None);
    }

    #[test]
    fn test_viewport_change_closes_open_list() {
        let (mut stage, mut popup) = realized(&[0.0, 2.0]);
        popup.open(&mut stage);

        stage.set_zoom(2.0);
        popup.on_viewport_change(&mut stage);
        assert!(!popup.is_open());
        assert_eq!(stage.scene.display(popup.items.unwrap()), Display::None);
    }

    #[test]
    fn test_click_outside_open_list_just_closes() {
        let (mut stage, mut popup) = realized(&[0.0, 2.0]);
        popup.open(&mut stage);
        let outside = PointerEvent::new(PointerKind::Click, Point::new(500.0, 500.0));
        popup.dispatch(&mut stage, &outside);
        assert!(!popup.is_open());
        assert_eq!(popup.get_selection(), 0.0);
    }
}
