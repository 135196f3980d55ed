//! Shared viewer configuration
//!
//! One [`ViewerContext`] instance is shared by every panel through
//! `Rc<RefCell<_>>`; panels write the fields they own and read the rest.
//! Control callbacks are the only writers, so a model-driven sync into a
//! control always passes `notify = false` to avoid a write-back loop.

/// Per-channel display settings
#[derive(Debug, Clone)]
pub struct ChannelSettings {
    pub name: String,
    pub visible: bool,
    /// Contrast black level, in sample units
    pub black: f32,
    /// Contrast white level, in sample units
    pub white: f32,
}

impl ChannelSettings {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            black: 0.0,
            white: 255.0,
        }
    }
}

/// Viewer-wide configuration shared by all panels
#[derive(Debug)]
pub struct ViewerContext {
    pub channels: Vec<ChannelSettings>,
    /// Channel the contrast sliders currently edit
    pub selected: usize,
    /// Zoom scale factor
    pub scale: f32,
}

impl ViewerContext {
    /// Create a context with one default-visible channel per name
    pub fn new(channel_names: &[&str]) -> Self {
        Self {
            channels: channel_names
                .iter()
                .map(|name| ChannelSettings::new(*name))
                .collect(),
            selected: 0,
            scale: 1.0,
        }
    }

    /// Settings of the channel the sliders edit
    pub fn selected_channel(&self) -> &ChannelSettings {
        &self.channels[self.selected]
    }

    pub fn set_visible(&mut self, channel: usize, visible: bool) {
        if let Some(settings) = self.channels.get_mut(channel) {
            log::debug!("channel {} visible -> {visible}", settings.name);
            settings.visible = visible;
        }
    }

    pub fn set_black(&mut self, channel: usize, level: f32) {
        if let Some(settings) = self.channels.get_mut(channel) {
            settings.black = level;
        }
    }

    pub fn set_white(&mut self, channel: usize, level: f32) {
        if let Some(settings) = self.channels.get_mut(channel) {
            settings.white = level;
        }
    }
}
