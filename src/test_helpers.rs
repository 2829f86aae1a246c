//! Shared test utilities.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = setup_site();
//! let config = load_site_config(site.path());
//! assert_eq!(config.site.brand, "Test Studio");
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::config::{self, SiteConfig};

/// Written to `config.toml` by [`setup_site`]. Keeps the preference file
/// inside the temp dir so tests never touch the user's data directory.
pub const TEST_CONFIG: &str = r#"
[site]
brand = "Test Studio"

[theme]
store_path = "state/preferences.json"
fallback_dark = false
platform_poll_secs = 0
"#;

/// A site directory with a config and an empty file for every image the
/// stock config references.
pub fn setup_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), TEST_CONFIG).unwrap();

    let defaults = SiteConfig::default();
    let public = defaults.public_dir(tmp.path());
    let images = defaults
        .hero
        .images
        .iter()
        .chain(&defaults.gallery.images)
        .chain(std::iter::once(&defaults.about.portrait));
    for src in images {
        write_public_file(&public, src);
    }
    tmp
}

/// Create an empty file at a URL-style path under `public`.
pub fn write_public_file(public: &Path, src: &str) {
    let path = public.join(src.trim_start_matches('/'));
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"").unwrap();
}

pub fn load_site_config(site_dir: &Path) -> SiteConfig {
    config::load_config(site_dir).unwrap()
}
