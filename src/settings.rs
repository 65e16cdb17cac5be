use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::data::{MelParams, PoolingMethod, WindowType};
use crate::rendering::FigureStyle;

/// All application settings, loaded from INI file or defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    // ── Server ──
    pub host: String,
    pub port: u16,

    // ── Upload ──
    pub max_upload_mb: usize,

    // ── Analysis ──
    pub n_fft: usize,
    pub hop_length: usize,
    pub n_mels: usize,
    pub window_type: String, // "Hann", "Hamming", "Blackman"
    pub top_db: f32,

    // ── Display ──
    pub colorscale: String, // any Plotly colorscale name
    pub cursor_color: String,
    pub cursor_width: f32,
    pub max_display_frames: usize,
    pub pooling: String, // "Max", "Average"

    // ── Playback ──
    pub tick_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8050,

            max_upload_mb: 50,

            n_fft: 2048,
            hop_length: 512,
            n_mels: 128,
            window_type: "Hann".to_string(),
            top_db: 80.0,

            colorscale: "Plasma".to_string(),
            cursor_color: "white".to_string(),
            cursor_width: 4.0,
            max_display_frames: 2000,
            pooling: "Max".to_string(),

            tick_interval_ms: 100,
        }
    }
}

impl Settings {
    pub const FILE_NAME: &'static str = "spectroclip.ini";

    /// Load settings from an INI file, or create it with defaults if it
    /// doesn't exist.
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => {
                    let mut settings = Self::default();
                    settings.parse_ini(&content);
                    log::info!("[Settings] Loaded {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Could not read {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            }
        } else {
            let settings = Self::default();
            settings.save(path);
            settings
        }
    }

    /// Save current settings to an INI file.
    pub fn save(&self, path: &Path) {
        match fs::write(path, self.to_ini()) {
            Ok(()) => log::info!("[Settings] Wrote defaults to {}", path.display()),
            Err(e) => log::warn!("Could not save {}: {}", path.display(), e),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    pub fn mel_params(&self) -> MelParams {
        let window_type = WindowType::from_name(&self.window_type).unwrap_or_else(|| {
            log::warn!("Unknown window_type {:?}, using Hann", self.window_type);
            WindowType::Hann
        });
        MelParams {
            n_fft: self.n_fft.max(16),
            hop_length: self.hop_length.max(1),
            n_mels: self.n_mels.max(1),
            window_type,
            use_center: true,
            top_db: self.top_db.abs(),
        }
    }

    pub fn figure_style(&self) -> FigureStyle {
        FigureStyle {
            colorscale: self.colorscale.clone(),
            cursor_color: self.cursor_color.clone(),
            cursor_width: self.cursor_width,
            max_display_frames: self.max_display_frames,
            pooling: PoolingMethod::from_name(&self.pooling).unwrap_or_else(|| {
                log::warn!("Unknown pooling {:?}, using Max", self.pooling);
                PoolingMethod::Max
            }),
        }
    }

    fn to_ini(&self) -> String {
        let mut s = String::new();
        s.push_str("# spectroclip Settings\n");
        s.push_str("# Edit values below. Delete this file to reset to defaults.\n\n");

        s.push_str("[Server]\n");
        s.push_str(&format!("host = {}\n", self.host));
        s.push_str(&format!("port = {}\n", self.port));
        s.push('\n');

        s.push_str("[Upload]\n");
        s.push_str(&format!("max_upload_mb = {}\n", self.max_upload_mb));
        s.push('\n');

        s.push_str("[Analysis]\n");
        s.push_str(&format!("n_fft = {}\n", self.n_fft));
        s.push_str(&format!("hop_length = {}\n", self.hop_length));
        s.push_str(&format!("n_mels = {}\n", self.n_mels));
        s.push_str("# Windows: Hann, Hamming, Blackman\n");
        s.push_str(&format!("window_type = {}\n", self.window_type));
        s.push_str(&format!("top_db = {}\n", self.top_db));
        s.push('\n');

        s.push_str("[Display]\n");
        s.push_str("# Any Plotly colorscale name: Plasma, Viridis, Magma, Inferno, Greys, ...\n");
        s.push_str(&format!("colorscale = {}\n", self.colorscale));
        s.push_str(&format!("cursor_color = {}\n", self.cursor_color));
        s.push_str(&format!("cursor_width = {}\n", self.cursor_width));
        s.push_str("# Longer spectrograms are pooled down to this many columns\n");
        s.push_str(&format!("max_display_frames = {}\n", self.max_display_frames));
        s.push_str("# Pooling: Max (keeps peaks), Average (smoother)\n");
        s.push_str(&format!("pooling = {}\n", self.pooling));
        s.push('\n');

        s.push_str("[Playback]\n");
        s.push_str(&format!("tick_interval_ms = {}\n", self.tick_interval_ms));

        s
    }

    fn parse_ini(&mut self, content: &str) {
        let map = parse_ini_to_map(content);

        // Server
        if let Some(v) = map.get("host") {
            self.host = v.clone();
        }
        set_parsed(&map, "port", &mut self.port);

        // Upload
        set_parsed(&map, "max_upload_mb", &mut self.max_upload_mb);

        // Analysis
        set_parsed(&map, "n_fft", &mut self.n_fft);
        set_parsed(&map, "hop_length", &mut self.hop_length);
        set_parsed(&map, "n_mels", &mut self.n_mels);
        if let Some(v) = map.get("window_type") {
            self.window_type = v.clone();
        }
        set_parsed(&map, "top_db", &mut self.top_db);

        // Display
        if let Some(v) = map.get("colorscale") {
            self.colorscale = v.clone();
        }
        if let Some(v) = map.get("cursor_color") {
            self.cursor_color = v.clone();
        }
        set_parsed(&map, "cursor_width", &mut self.cursor_width);
        set_parsed(&map, "max_display_frames", &mut self.max_display_frames);
        if let Some(v) = map.get("pooling") {
            self.pooling = v.clone();
        }

        // Playback
        set_parsed(&map, "tick_interval_ms", &mut self.tick_interval_ms);
    }
}

/// Overwrite `target` only when the key is present and parses.
fn set_parsed<T: std::str::FromStr>(map: &HashMap<String, String>, key: &str, target: &mut T) {
    if let Some(v) = map.get(key) {
        match v.parse() {
            Ok(n) => *target = n,
            Err(_) => log::warn!("[Settings] Ignoring invalid {} = {:?}", key, v),
        }
    }
}

/// Parse INI content into a flat key-value map (section headers are ignored,
/// keys are globally unique in our format).
fn parse_ini_to_map(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
            continue;
        }
        if let Some((key, val)) = line.split_once('=') {
            map.insert(key.trim().to_string(), val.trim().to_string());
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_ini_text() {
        let defaults = Settings::default();
        let mut restored = Settings::default();
        restored.port = 1;
        restored.colorscale = "Greys".to_string();
        restored.parse_ini(&defaults.to_ini());

        assert_eq!(restored, defaults);
    }

    #[test]
    fn partial_ini_keeps_other_defaults() {
        let ini = "[Server]
port = 9000

[Analysis]
n_mels = 64
window_type = Hamming
";
        let mut settings = Settings::default();
        settings.parse_ini(ini);

        assert_eq!(settings.port, 9000);
        assert_eq!(settings.n_mels, 64);
        assert_eq!(settings.mel_params().window_type, WindowType::Hamming);
        assert_eq!(settings.n_fft, 2048);
        assert_eq!(settings.tick_interval_ms, 100);
    }

    #[test]
    fn invalid_values_fall_back() {
        let ini = "port = not-a-port\ntick_interval_ms = -5\nwindow_type = Kaiser\n";
        let mut settings = Settings::default();
        settings.parse_ini(ini);

        assert_eq!(settings.port, 8050);
        assert_eq!(settings.tick_interval_ms, 100);
        assert_eq!(settings.mel_params().window_type, WindowType::Hann);
    }

    #[test]
    fn display_pooling_setting() {
        let mut settings = Settings::default();
        settings.parse_ini("[Display]\npooling = Average\n");
        assert_eq!(settings.figure_style().pooling, PoolingMethod::Average);

        settings.parse_ini("pooling = Median\n");
        assert_eq!(settings.figure_style().pooling, PoolingMethod::Max);
    }

    #[test]
    fn derived_values() {
        let settings = Settings::default();
        assert_eq!(settings.bind_address(), "127.0.0.1:8050");
        assert_eq!(settings.max_upload_bytes(), 50 * 1024 * 1024);
        assert_eq!(settings.figure_style().colorscale, "Plasma");
        assert_eq!(settings.figure_style().pooling, PoolingMethod::Max);
        assert_eq!(settings.mel_params().n_mels, 128);
    }
}
