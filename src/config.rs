use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    /// Load `config.toml` from the config directory. Missing file means
    /// defaults; a malformed file is an error so typos are not silently
    /// ignored.
    pub fn load_config(&self) -> Result<AppConfig> {
        let path = self.config_path("config.toml");
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let contents = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| eyre!("Could not parse {}: {}", path.display(), e))?;
        Ok(config)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Rows per page when neither CLI nor construction options set one.
    #[serde(default = "default_per_page")]
    pub per_page: usize,
    /// Page sizes the per-page key cycles through.
    #[serde(default = "default_per_page_options")]
    pub per_page_options: Vec<usize>,
}

fn default_per_page() -> usize {
    10
}

fn default_per_page_options() -> Vec<usize> {
    vec![5, 10, 25, 50, 100]
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            per_page_options: default_per_page_options(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Milliseconds of keyboard silence before a search query is applied.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(default = "default_header_bg")]
    pub header_bg: String,
    #[serde(default = "default_header_fg")]
    pub header_fg: String,
    #[serde(default = "default_controls_bg")]
    pub controls_bg: String,
    #[serde(default = "default_key_hints")]
    pub key_hints: String,
    #[serde(default = "default_labels")]
    pub labels: String,
    /// Background for odd rows; empty disables alternate shading.
    #[serde(default)]
    pub alternate_row_bg: String,
}

fn default_header_bg() -> String {
    "indexed(236)".to_string()
}

fn default_header_fg() -> String {
    "white".to_string()
}

fn default_controls_bg() -> String {
    "indexed(236)".to_string()
}

fn default_key_hints() -> String {
    "cyan".to_string()
}

fn default_labels() -> String {
    "white".to_string()
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            header_bg: default_header_bg(),
            header_fg: default_header_fg(),
            controls_bg: default_controls_bg(),
            key_hints: default_key_hints(),
            labels: default_labels(),
            alternate_row_bg: String::new(),
        }
    }
}

impl ThemeConfig {
    pub fn header_bg(&self) -> Color {
        parse_color(&self.header_bg).unwrap_or(Color::Indexed(236))
    }

    pub fn header_fg(&self) -> Color {
        parse_color(&self.header_fg).unwrap_or(Color::White)
    }

    pub fn controls_bg(&self) -> Color {
        parse_color(&self.controls_bg).unwrap_or(Color::Indexed(236))
    }

    pub fn key_hints(&self) -> Color {
        parse_color(&self.key_hints).unwrap_or(Color::Cyan)
    }

    pub fn labels(&self) -> Color {
        parse_color(&self.labels).unwrap_or(Color::White)
    }

    pub fn alternate_row_bg(&self) -> Option<Color> {
        if self.alternate_row_bg.is_empty() {
            None
        } else {
            parse_color(&self.alternate_row_bg)
        }
    }
}

/// Parse a color spec: named ANSI colors, `indexed(N)`, or `#rrggbb`.
pub fn parse_color(spec: &str) -> Option<Color> {
    let s = spec.trim().to_lowercase();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() == 6 {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            return Some(Color::Rgb(r, g, b));
        }
        return None;
    }
    if let Some(rest) = s.strip_prefix("indexed(") {
        let n = rest.strip_suffix(')')?.trim().parse::<u8>().ok()?;
        return Some(Color::Indexed(n));
    }
    match s.as_str() {
        "default" | "reset" => Some(Color::Reset),
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "gray" | "grey" => Some(Color::Gray),
        "darkgray" | "darkgrey" => Some(Color::DarkGray),
        "lightred" => Some(Color::LightRed),
        "lightgreen" => Some(Color::LightGreen),
        "lightyellow" => Some(Color::LightYellow),
        "lightblue" => Some(Color::LightBlue),
        "lightmagenta" => Some(Color::LightMagenta),
        "lightcyan" => Some(Color::LightCyan),
        "white" => Some(Color::White),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_config_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_dir(dir.path().to_path_buf());
        let config = manager.load_config().unwrap();
        assert_eq!(config.display.per_page, 10);
        assert_eq!(config.search.debounce_ms, 300);
        assert_eq!(config.display.per_page_options, vec![5, 10, 25, 50, 100]);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "[display]\nper_page = 25\n\n[search]\ndebounce_ms = 100\n",
        )
        .unwrap();
        let manager = ConfigManager::with_dir(dir.path().to_path_buf());
        let config = manager.load_config().unwrap();
        assert_eq!(config.display.per_page, 25);
        assert_eq!(config.search.debounce_ms, 100);
        assert_eq!(config.theme.header_fg, "white");
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "not toml [").unwrap();
        let manager = ConfigManager::with_dir(dir.path().to_path_buf());
        assert!(manager.load_config().is_err());
    }

    #[test]
    fn parse_color_specs() {
        assert_eq!(parse_color("cyan"), Some(Color::Cyan));
        assert_eq!(parse_color("Indexed(236)"), Some(Color::Indexed(236)));
        assert_eq!(parse_color("#ff8800"), Some(Color::Rgb(255, 136, 0)));
        assert_eq!(parse_color("default"), Some(Color::Reset));
        assert_eq!(parse_color("nope"), None);
        assert_eq!(parse_color("#ff88"), None);
    }
}
