// src/environment.rs

use serde::{Deserialize, Serialize};

/// Snapshot of the page environment, probed once by the caller and injected
/// into every build call. The adapter itself never touches ambient state.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EnvSnapshot {
    pub screen_width: u32,
    pub screen_height: u32,
    pub color_depth: u32,
    /// Viewport `(width, height)` of the top-level window. `None` when the
    /// cross-origin probe failed; the corresponding parameter is then omitted.
    pub viewport: Option<(u32, u32)>,
    pub user_agent: String,
    /// BCP 47 language tag, e.g. "en-US".
    pub language: String,
    /// Do-not-track signal.
    pub dnt: bool,
    /// Whether the page runs inside an iframe.
    pub in_iframe: bool,
    /// Timezone offset in minutes, as reported by the page.
    pub timezone_offset: i32,
    /// Document character set.
    pub charset: Option<String>,
}

impl EnvSnapshot {
    /// Two-letter language prefix used by the structured protocol.
    pub fn language_prefix(&self) -> String {
        self.language
            .split('-')
            .next()
            .unwrap_or_default()
            .to_string()
    }

    /// `{width}x{height}x{colorDepth}` screen string for the legacy protocol.
    pub fn screen_resolution(&self) -> String {
        format!(
            "{}x{}x{}",
            self.screen_width, self.screen_height, self.color_depth
        )
    }

    /// `{width}x{height}` viewport string, absent when the probe failed.
    pub fn viewport_dimensions(&self) -> Option<String> {
        self.viewport.map(|(w, h)| format!("{}x{}", w, h))
    }
}

impl Default for EnvSnapshot {
    fn default() -> Self {
        Self {
            screen_width: 1920,
            screen_height: 1080,
            color_depth: 24,
            viewport: Some((1920, 1080)),
            user_agent: String::new(),
            language: "en-US".to_string(),
            dnt: false,
            in_iframe: false,
            timezone_offset: 0,
            charset: Some("UTF-8".to_string()),
        }
    }
}
