//! Channel contrast panel
//!
//! A toolbox holding one visibility toggle per channel plus black-level and
//! white-level sliders editing the selected channel. Control callbacks write
//! straight into the shared [`ViewerContext`]; selecting another channel
//! syncs the sliders *from* the context with notification suppressed.

use std::cell::RefCell;
use std::rc::Rc;

use mica::{BuildError, Callback, ElementId, Point, PointerEvent, PointerKind, Stage, Widget};
use mica_widgets::{Button, Slider, Toolbox, HEADER_HEIGHT};

use crate::context::ViewerContext;

const ROW_HEIGHT: f32 = 24.0;
const BUTTON_WIDTH: f32 = 60.0;
const BUTTON_HEIGHT: f32 = 16.0;
const SLIDER_SIZE: f32 = 100.0;
const PADDING: f32 = 8.0;

/// Toolbox of per-channel toggles and contrast sliders
pub struct ChannelsPanel {
    context: Rc<RefCell<ViewerContext>>,
    toolbox: Toolbox,
    buttons: Vec<Button>,
    black: Slider,
    white: Slider,
}

impl ChannelsPanel {
    /// Lay out the panel at `(x, y)` for the context's channels
    ///
    /// A context with no channels is a construction-time error: the panel
    /// has nothing to show and the sliders nothing to edit.
    pub fn new(
        x: f32,
        y: f32,
        context: Rc<RefCell<ViewerContext>>,
    ) -> Result<Self, BuildError> {
        let channel_count = context.borrow().channels.len();
        if channel_count == 0 {
            return Err(BuildError::MismatchedArguments {
                expected: 1,
                got: 0,
            });
        }
        let height = (channel_count as f32 + 2.0) * ROW_HEIGHT + PADDING;
        let width = PADDING * 3.0 + BUTTON_WIDTH + SLIDER_SIZE;

        let buttons = (0..channel_count)
            .map(|i| {
                let sink = context.clone();
                Button::new(
                    PADDING,
                    HEADER_HEIGHT + PADDING + i as f32 * ROW_HEIGHT,
                    BUTTON_WIDTH,
                    BUTTON_HEIGHT,
                )
                .with_state(true)
                .with_callback(Callback::function(move |visible: bool| {
                    sink.borrow_mut().set_visible(i, visible);
                }))
            })
            .collect();

        let slider_y = HEADER_HEIGHT + PADDING + channel_count as f32 * ROW_HEIGHT + 4.0;
        let black_sink = context.clone();
        let black = Slider::new(PADDING * 2.0 + BUTTON_WIDTH, slider_y, SLIDER_SIZE, 0.0, 255.0)
            .with_callback(Callback::function(move |level: f32| {
                let selected = black_sink.borrow().selected;
                black_sink.borrow_mut().set_black(selected, level);
            }));
        let white_sink = context.clone();
        let white = Slider::new(
            PADDING * 2.0 + BUTTON_WIDTH,
            slider_y + ROW_HEIGHT,
            SLIDER_SIZE,
            0.0,
            255.0,
        )
        .with_callback(Callback::function(move |level: f32| {
            let selected = white_sink.borrow().selected;
            white_sink.borrow_mut().set_white(selected, level);
        }));

        Ok(Self {
            context,
            toolbox: Toolbox::new(x, y, width, height),
            buttons,
            black,
            white,
        })
    }

    /// The underlying toolbox (collapse, drag, labelling)
    pub fn toolbox(&self) -> &Toolbox {
        &self.toolbox
    }

    /// Realize the toolbox, then every control inside its content group
    pub fn realize(&mut self, stage: &mut Stage, parent: ElementId) -> Result<(), BuildError> {
        self.toolbox
            .core_mut()
            .set_label(&mut stage.scene, None, 4.0, 12.0, "Channels");
        self.toolbox.realize(stage, parent)?;
        let content = self
            .toolbox
            .content()
            .ok_or(BuildError::Unrealized("channels panel toolbox"))?;

        for (i, button) in self.buttons.iter_mut().enumerate() {
            let name = self.context.borrow().channels[i].name.clone();
            button
                .core_mut()
                .set_label(&mut stage.scene, None, -4.0, 12.0, name);
            button.realize(stage, content)?;
        }
        self.black
            .core_mut()
            .set_label(&mut stage.scene, None, -44.0, 10.0, "black");
        self.black.realize(stage, content)?;
        self.white
            .core_mut()
            .set_label(&mut stage.scene, None, -44.0, 10.0, "white");
        self.white.realize(stage, content)?;
        self.sync_sliders(stage);
        Ok(())
    }

    /// Point the sliders at another channel and sync them from the context
    pub fn select_channel(&mut self, stage: &mut Stage, channel: usize) {
        let channel = channel.min(self.context.borrow().channels.len().saturating_sub(1));
        self.context.borrow_mut().selected = channel;
        self.sync_sliders(stage);
    }

    /// Model-driven slider update: never notifies, or the sliders would
    /// write the freshly-read values straight back
    fn sync_sliders(&mut self, stage: &mut Stage) {
        let (black, white) = {
            let context = self.context.borrow();
            let settings = context.selected_channel();
            (settings.black, settings.white)
        };
        self.black.set_value(stage, black, false);
        self.white.set_value(stage, white, false);
    }

    /// Route a pointer event to the control under it
    pub fn dispatch(&mut self, stage: &mut Stage, event: &PointerEvent) {
        self.toolbox.dispatch(stage, event);
        if !self.toolbox.is_expanded() {
            return;
        }

        if event.kind == PointerKind::Click {
            let mut selected = None;
            for (i, button) in self.buttons.iter_mut().enumerate() {
                if button.contains(stage, event.position) {
                    button.dispatch(stage, event);
                    selected = Some(i);
                }
            }
            if let Some(channel) = selected {
                self.select_channel(stage, channel);
            }
            return;
        }

        // Sliders gate moves on their own drag state; only presses need
        // hit-testing here
        if event.kind != PointerKind::MouseDown
            || Self::slider_hit(stage, &self.black, event.position)
        {
            self.black.dispatch(stage, event);
        }
        if event.kind != PointerKind::MouseDown
            || Self::slider_hit(stage, &self.white, event.position)
        {
            self.white.dispatch(stage, event);
        }
    }

    fn slider_hit(stage: &Stage, slider: &Slider, global: Point) -> bool {
        let Some(root) = slider.core().root() else {
            return false;
        };
        let local = stage.global_to_local(root, global);
        stage
            .scene
            .bounding_box(root)
            .map(|bounds| bounds.contains(local))
            .unwrap_or(false)
    }
}
