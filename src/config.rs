//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults
//! describe the complete site; a user file in the site directory overrides
//! just the values it names.
//!
//! ## Config File Location
//!
//! ```text
//! site/
//! ├── config.toml      # Optional, sparse overrides
//! └── public/          # Static assets served under /images and /assets
//!     └── images/
//!         ├── hero.jpg
//!         └── gallery1.jpg
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [hero.timings]
//! slideshow_interval = 5000
//!
//! [colors.dark]
//! background = "#050505"
//! ```
//!
//! Unknown keys are rejected to catch typos early. Run `lenscraft gen-config`
//! for a fully commented file.

use crate::sequencer::HeroSequence;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Names and copy shared by every page.
    pub site: SiteInfo,
    /// Footer contact details.
    pub contact: ContactInfo,
    /// Footer social links.
    pub social: Vec<SocialLink>,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    /// Theme preference storage and defaults.
    pub theme: ThemeConfig,
    /// Home page capture sequence.
    pub hero: HeroSequence,
    /// Portfolio grid.
    pub gallery: GalleryConfig,
    /// About page content.
    pub about: AboutConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site: SiteInfo::default(),
            contact: ContactInfo::default(),
            social: default_social(),
            colors: ColorConfig::default(),
            theme: ThemeConfig::default(),
            hero: HeroSequence::default(),
            gallery: GalleryConfig::default(),
            about: AboutConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hero.timings.slideshow_interval == 0 {
            return Err(ConfigError::Validation(
                "hero.timings.slideshow_interval must be greater than 0".into(),
            ));
        }
        if self.hero.lens_positions.is_empty() {
            return Err(ConfigError::Validation(
                "hero.lens_positions must not be empty".into(),
            ));
        }
        if self.theme.storage_key.is_empty() {
            return Err(ConfigError::Validation(
                "theme.storage_key must not be empty".into(),
            ));
        }
        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "server.bind is not a socket address: {}",
                self.server.bind
            )));
        }
        Ok(())
    }

    /// Public directory resolved against the site directory.
    pub fn public_dir(&self, site_dir: &Path) -> PathBuf {
        site_dir.join(&self.server.public_dir)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    /// Document `<title>`.
    pub title: String,
    /// Wordmark in the navigation bar.
    pub brand: String,
    /// Studio name used in the footer and copyright line.
    pub owner: String,
    /// Meta description.
    pub description: String,
    /// Hero line under the LENS / CRAFT heading.
    pub tagline: String,
    /// Footer blurb.
    pub blurb: String,
    /// Short "About Me" teaser on the home page.
    pub teaser: String,
    /// Canonical URL for social cards.
    pub base_url: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "JD | Professional Photographer".to_string(),
            brand: "JD Photography".to_string(),
            owner: "John Doe Photography".to_string(),
            description: "Photography portfolio showcasing portraits, landscapes, and events."
                .to_string(),
            tagline: "Every click captures a universe of stories waiting to be told".to_string(),
            blurb: "Capturing life's precious moments through the lens of creativity and passion. \
                    Available for weddings, events, and portrait sessions."
                .to_string(),
            teaser: "I am a professional photographer with a passion for capturing the beauty \
                     of the world through my lens."
                .to_string(),
            base_url: "https://johndoephotography.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
    pub location: String,
}

impl Default for ContactInfo {
    fn default() -> Self {
        Self {
            email: "contact@johndoe.com".to_string(),
            phone: "+123 456 7890".to_string(),
            location: "New York, NY 10001".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SocialLink {
    pub label: String,
    pub href: String,
}

/// Default footer links; a user `[[social]]` list replaces them entirely.
fn default_social() -> Vec<SocialLink> {
    [
        ("Instagram", "https://instagram.com"),
        ("Facebook", "https://facebook.com"),
        ("Twitter", "https://twitter.com"),
    ]
    .into_iter()
    .map(|(label, href)| SocialLink {
        label: label.to_string(),
        href: href.to_string(),
    })
    .collect()
}

/// Theme preference settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Key the preference is stored under.
    pub storage_key: String,
    /// Used when nothing is stored and the platform gives no signal.
    pub fallback_dark: bool,
    /// How often to re-check the desktop setting; 0 disables following it.
    pub platform_poll_secs: u64,
    /// Preferences file. Defaults to the per-user data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<String>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: "theme".to_string(),
            fallback_dark: true,
            platform_poll_secs: 5,
            store_path: None,
        }
    }
}

/// Portfolio grid settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Image paths, in display order.
    pub images: Vec<String>,
    /// Delay between consecutive tiles fading in.
    pub reveal_step_ms: u64,
    /// Gap between tiles (CSS value).
    pub gap: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            images: (1..=6).map(|i| format!("/images/gallery{i}.jpg")).collect(),
            reveal_step_ms: 100,
            gap: "1rem".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Stat {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Specialty {
    pub title: String,
    pub description: String,
}

/// About page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AboutConfig {
    pub headline: String,
    pub intro: String,
    pub portrait: String,
    /// Markdown.
    pub body: String,
    pub stats: Vec<Stat>,
    pub specialties: Vec<Specialty>,
}

impl Default for AboutConfig {
    fn default() -> Self {
        let stat = |value: &str, label: &str| Stat {
            value: value.to_string(),
            label: label.to_string(),
        };
        let specialty = |title: &str, description: &str| Specialty {
            title: title.to_string(),
            description: description.to_string(),
        };
        Self {
            headline: "Capturing Life's Beautiful Moments".to_string(),
            intro: "Hi, I'm John Doe, a professional photographer with over a decade of \
                    experience in turning fleeting moments into timeless memories."
                .to_string(),
            portrait: "/images/about.jpg".to_string(),
            body: "## My Journey\n\n\
                   My passion for photography began when I received my first camera at age 12. \
                   Since then, I've dedicated myself to mastering the art of visual storytelling, \
                   working across various photography styles and techniques.\n"
                .to_string(),
            stats: vec![
                stat("10+", "Years Experience"),
                stat("500+", "Projects Completed"),
                stat("100+", "Happy Clients"),
            ],
            specialties: vec![
                specialty(
                    "Portrait Photography",
                    "Capturing personalities and emotions in stunning detail.",
                ),
                specialty(
                    "Wedding Photography",
                    "Documenting your special day with elegance and style.",
                ),
                specialty(
                    "Event Photography",
                    "Preserving the energy and excitement of your events.",
                ),
                specialty(
                    "Travel Photography",
                    "Sharing the beauty of destinations worldwide.",
                ),
            ],
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen address.
    pub bind: String,
    /// Static asset directory, relative to the site directory.
    pub public_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            public_dir: "public".to_string(),
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Page background.
    pub background: String,
    /// Cards, form fields, the about-page tiles.
    pub surface: String,
    /// Primary text color.
    pub text: String,
    /// Muted/secondary text color (captions, footer copy).
    pub text_muted: String,
    /// Border color.
    pub border: String,
    /// Buttons and the active slideshow dot.
    pub accent: String,
    /// Text on accent backgrounds.
    pub accent_text: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            surface: "#f3f4f6".to_string(),
            text: "#111827".to_string(),
            text_muted: "#4b5563".to_string(),
            border: "#e5e7eb".to_string(),
            accent: "#000000".to_string(),
            accent_text: "#ffffff".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#000000".to_string(),
            surface: "#1f2937".to_string(),
            text: "#f3f4f6".to_string(),
            text_muted: "#9ca3af".to_string(),
            border: "#374151".to_string(),
            accent: "#ffffff".to_string(),
            accent_text: "#000000".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay (arrays included) replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given site directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(site_dir: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(site_dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Lenscraft Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.
# Lists (images, social links, stats, ...) replace the default list as a whole.

# ---------------------------------------------------------------------------
# Site identity and copy
# ---------------------------------------------------------------------------
[site]
title = "JD | Professional Photographer"
brand = "JD Photography"
owner = "John Doe Photography"
description = "Photography portfolio showcasing portraits, landscapes, and events."
tagline = "Every click captures a universe of stories waiting to be told"
blurb = "Capturing life's precious moments through the lens of creativity and passion. Available for weddings, events, and portrait sessions."
teaser = "I am a professional photographer with a passion for capturing the beauty of the world through my lens."
base_url = "https://johndoephotography.com"

# ---------------------------------------------------------------------------
# Footer contact details and social links
# ---------------------------------------------------------------------------
[contact]
email = "contact@johndoe.com"
phone = "+123 456 7890"
location = "New York, NY 10001"

[[social]]
label = "Instagram"
href = "https://instagram.com"

[[social]]
label = "Facebook"
href = "https://facebook.com"

[[social]]
label = "Twitter"
href = "https://twitter.com"

# ---------------------------------------------------------------------------
# Theme preference
# ---------------------------------------------------------------------------
[theme]
# Key the light/dark choice is stored under ("dark" or "light").
storage_key = "theme"
# Used when nothing is stored and the desktop reports no preference.
fallback_dark = true
# Seconds between checks of the desktop light/dark setting (0 = don't follow).
platform_poll_secs = 5
# Preferences file; defaults to the per-user data directory.
# store_path = "/var/lib/lenscraft/preferences.json"

# ---------------------------------------------------------------------------
# Home page capture sequence
# ---------------------------------------------------------------------------
[hero]
# Captured in this order, then cycled in the slideshow.
images = [
    "/images/hero.jpg",
    "/images/hero2.jpg",
    "/images/gallery3.jpg",
    "/images/gallery6.jpg",
    "/images/gallery5.jpg",
]

# One lens-ring transform per shot (repeats if there are more images).
[[hero.lens_positions]]
x = 0.0
y = 0.0
rotation = 0.0
scale = 1.0

[[hero.lens_positions]]
x = -20.0
y = 10.0
rotation = -5.0
scale = 1.1

[[hero.lens_positions]]
x = 15.0
y = -15.0
rotation = 3.0
scale = 0.95

[[hero.lens_positions]]
x = -10.0
y = 20.0
rotation = -2.0
scale = 1.05

[[hero.lens_positions]]
x = 25.0
y = -5.0
rotation = 4.0
scale = 0.9

# Delays in milliseconds.
[hero.timings]
preload_settle = 2500
lens_move = 150
flash = 100
inter_shot = 250
slideshow_settle = 800
slideshow_interval = 3000

# ---------------------------------------------------------------------------
# Portfolio grid
# ---------------------------------------------------------------------------
[gallery]
images = [
    "/images/gallery1.jpg",
    "/images/gallery2.jpg",
    "/images/gallery3.jpg",
    "/images/gallery4.jpg",
    "/images/gallery5.jpg",
    "/images/gallery6.jpg",
]
# Stagger between tiles fading in.
reveal_step_ms = 100
gap = "1rem"

# ---------------------------------------------------------------------------
# About page
# ---------------------------------------------------------------------------
[about]
headline = "Capturing Life's Beautiful Moments"
intro = "Hi, I'm John Doe, a professional photographer with over a decade of experience in turning fleeting moments into timeless memories."
portrait = "/images/about.jpg"
# Markdown.
body = """
## My Journey

My passion for photography began when I received my first camera at age 12. Since then, I've dedicated myself to mastering the art of visual storytelling, working across various photography styles and techniques.
"""

[[about.stats]]
value = "10+"
label = "Years Experience"

[[about.stats]]
value = "500+"
label = "Projects Completed"

[[about.stats]]
value = "100+"
label = "Happy Clients"

[[about.specialties]]
title = "Portrait Photography"
description = "Capturing personalities and emotions in stunning detail."

[[about.specialties]]
title = "Wedding Photography"
description = "Documenting your special day with elegance and style."

[[about.specialties]]
title = "Event Photography"
description = "Preserving the energy and excitement of your events."

[[about.specialties]]
title = "Travel Photography"
description = "Sharing the beauty of destinations worldwide."

# ---------------------------------------------------------------------------
# Colors - Light mode
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
surface = "#f3f4f6"
text = "#111827"
text_muted = "#4b5563"
border = "#e5e7eb"
accent = "#000000"
accent_text = "#ffffff"

# ---------------------------------------------------------------------------
# Colors - Dark mode (applied when the page root carries the `dark` class)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#000000"
surface = "#1f2937"
text = "#f3f4f6"
text_muted = "#9ca3af"
border = "#374151"
accent = "#ffffff"
accent_text = "#000000"

# ---------------------------------------------------------------------------
# HTTP server
# ---------------------------------------------------------------------------
[server]
bind = "127.0.0.1:3000"
# Relative to the site directory; served under /images and /assets.
public_dir = "public"
"##
}

/// Generate CSS custom properties from color config.
///
/// Light values sit on `:root`; dark values apply once the root element
/// carries the `dark` class.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    let vars = |scheme: &ColorScheme, indent: &str| {
        format!(
            "{indent}--color-bg: {};\n\
             {indent}--color-surface: {};\n\
             {indent}--color-text: {};\n\
             {indent}--color-text-muted: {};\n\
             {indent}--color-border: {};\n\
             {indent}--color-accent: {};\n\
             {indent}--color-accent-text: {};\n",
            scheme.background,
            scheme.surface,
            scheme.text,
            scheme.text_muted,
            scheme.border,
            scheme.accent,
            scheme.accent_text,
        )
    };
    format!(
        ":root {{\n{}}}\n\n:root.dark {{\n{}}}",
        vars(&colors.light, "    "),
        vars(&colors.dark, "    "),
    )
}

/// Generate CSS custom properties for the portfolio grid.
pub fn generate_gallery_css(gallery: &GalleryConfig) -> String {
    format!(
        ":root {{\n    --gallery-gap: {};\n    --reveal-step: {}ms;\n}}",
        gallery.gap, gallery.reveal_step_ms
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_colors() {
        let config = SiteConfig::default();
        assert_eq!(config.colors.light.background, "#ffffff");
        assert_eq!(config.colors.dark.background, "#000000");
    }

    #[test]
    fn default_config_matches_site_content() {
        let config = SiteConfig::default();
        assert_eq!(config.site.brand, "JD Photography");
        assert_eq!(config.hero.images.len(), 5);
        assert_eq!(config.hero.lens_positions.len(), 5);
        assert_eq!(config.gallery.images.len(), 6);
        assert_eq!(config.theme.storage_key, "theme");
        assert_eq!(config.social.len(), 3);
    }

    #[test]
    fn stock_config_toml_matches_defaults() {
        let parsed: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(parsed, SiteConfig::default());
    }

    #[test]
    fn stock_defaults_round_trip_through_toml() {
        let value = stock_defaults_value().unwrap();
        let config: SiteConfig = value.try_into().unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[colors.light]
background = "#fafafa"
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        // Overridden value
        assert_eq!(config.colors.light.background, "#fafafa");
        // Default values preserved
        assert_eq!(config.colors.light.text, "#111827");
        assert_eq!(config.colors.dark.background, "#000000");
        assert_eq!(config.hero.timings.slideshow_interval, 3000);
    }

    #[test]
    fn parse_hero_timings() {
        let toml = r#"
[hero.timings]
slideshow_interval = 5000
flash = 60
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.hero.timings.slideshow_interval, 5000);
        assert_eq!(config.hero.timings.flash, 60);
        // Unspecified defaults preserved
        assert_eq!(config.hero.timings.preload_settle, 2500);
        assert_eq!(config.hero.images.len(), 5);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml = r#"
[hero.timings]
slideshow_intervall = 5000
"#;
        assert!(toml::from_str::<SiteConfig>(toml).is_err());
    }

    #[test]
    fn merge_replaces_lists_wholesale() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[gallery]
images = ["/images/only.jpg"]
"#,
        )
        .unwrap();
        let config = resolve_config(base, Some(overlay)).unwrap();
        assert_eq!(config.gallery.images, vec!["/images/only.jpg"]);
        assert_eq!(config.gallery.reveal_step_ms, 100);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r##"
[site]
brand = "Studio North"

[server]
bind = "0.0.0.0:8080"
"##,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.brand, "Studio North");
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        // Unspecified values should be defaults
        assert_eq!(config.site.owner, "John Doe Photography");
        assert_eq!(config.server.public_dir, "public");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_rejects_zero_interval() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[hero.timings]\nslideshow_interval = 0\n",
        )
        .unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_bad_bind_and_empty_key() {
        let mut config = SiteConfig::default();
        config.server.bind = "localhost".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = SiteConfig::default();
        config.theme.storage_key.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = SiteConfig::default();
        config.hero.lens_positions.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn public_dir_is_relative_to_site() {
        let config = SiteConfig::default();
        assert_eq!(
            config.public_dir(Path::new("/srv/site")),
            PathBuf::from("/srv/site/public")
        );
    }

    // =========================================================================
    // CSS generation tests
    // =========================================================================

    #[test]
    fn generate_css_uses_config_colors() {
        let mut colors = ColorConfig::default();
        colors.light.background = "#f0f0f0".to_string();
        colors.dark.background = "#1a1a1a".to_string();

        let css = generate_color_css(&colors);
        assert!(css.contains("--color-bg: #f0f0f0"));
        assert!(css.contains("--color-bg: #1a1a1a"));
    }

    #[test]
    fn generate_css_keys_dark_palette_off_root_class() {
        let css = generate_color_css(&ColorConfig::default());
        let dark_block = css.split(":root.dark").nth(1).unwrap();
        assert!(dark_block.contains("--color-bg: #000000"));
        assert!(!css.contains("prefers-color-scheme"));
    }

    #[test]
    fn generate_css_includes_all_variables() {
        let css = generate_color_css(&ColorConfig::default());
        for var in [
            "--color-bg:",
            "--color-surface:",
            "--color-text:",
            "--color-text-muted:",
            "--color-border:",
            "--color-accent:",
            "--color-accent-text:",
        ] {
            assert_eq!(css.matches(var).count(), 2, "{var}");
        }
    }

    #[test]
    fn generate_gallery_css_variables() {
        let css = generate_gallery_css(&GalleryConfig::default());
        assert!(css.contains("--gallery-gap: 1rem"));
        assert!(css.contains("--reveal-step: 100ms"));
    }
}
