//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Hero
//!
//! One block per published transition of the capture sequence:
//!
//! ```text
//! Preloading 5 images
//! Capturing 1/5
//!     Lens: x -30, y 20, rotate -10°, scale 1.2
//!     Flash
//!     001 /images/hero1.jpg
//! Slideshow 1/5
//!     /images/hero1.jpg
//! ```
//!
//! ## Build
//!
//! ```text
//! Home → index.html
//! About → about/index.html
//! Portfolio → portfolio/index.html
//! Contact → contact/index.html
//!
//! Built 4 pages, copied 12 assets
//! ```
//!
//! ## Check
//!
//! ```text
//! Config
//!     site/config.toml
//! Hero (5 images)
//!     missing: /images/hero3.jpg
//! Gallery (6 images)
//!
//! 1 asset missing
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure, no I/O.

use crate::sequencer::{Phase, SequencerSnapshot};
use crate::site::{BuildReport, CheckReport};
use crate::theme::ThemeState;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Hero sequence
// ============================================================================

/// Lines describing the step from `prev` to `next`. Empty when nothing a
/// viewer would notice changed (e.g. only the flash turning off).
pub fn format_hero_transition(prev: &SequencerSnapshot, next: &SequencerSnapshot, total: usize) -> Vec<String> {
    let mut lines = Vec::new();

    if prev.phase != next.phase {
        lines.push(match next.phase {
            Phase::Idle => "Idle".to_string(),
            Phase::Preloading => format!("Preloading {}", plural(total, "image", "images")),
            Phase::Capturing(i) => format!("Capturing {}/{}", i + 1, total),
            Phase::Slideshow(i) => {
                format!("Slideshow {}/{}", i + 1, next.captured.len().max(1))
            }
        });
    }

    if !prev.assets_ready && next.assets_ready {
        lines.push(format!("{}Assets ready", indent(1)));
    }

    if prev.lens != next.lens && matches!(next.phase, Phase::Capturing(_)) {
        let lens = next.lens;
        lines.push(format!(
            "{}Lens: x {}, y {}, rotate {}°, scale {}",
            indent(1),
            lens.x,
            lens.y,
            lens.rotation,
            lens.scale
        ));
    }

    if !prev.flash && next.flash {
        lines.push(format!("{}Flash", indent(1)));
    }

    for shot in next.captured.iter().skip(prev.captured.len()) {
        lines.push(format!(
            "{}{} {}",
            indent(1),
            format_index(shot.sequence_index + 1),
            shot.source
        ));
    }

    let slide_changed = prev.current_slide().map(|s| s.id) != next.current_slide().map(|s| s.id);
    if let Some(slide) = next.current_slide().filter(|_| slide_changed) {
        lines.push(format!("{}{}", indent(1), slide.source));
    }

    lines
}

pub fn print_hero_transition(prev: &SequencerSnapshot, next: &SequencerSnapshot, total: usize) {
    for line in format_hero_transition(prev, next, total) {
        println!("{}", line);
    }
}

/// A slide that stayed on screen for another interval.
pub fn format_held_slide(snapshot: &SequencerSnapshot) -> Option<String> {
    match snapshot.phase {
        Phase::Slideshow(i) => Some(format!(
            "Slideshow {}/{} (held)",
            i + 1,
            snapshot.captured.len().max(1)
        )),
        _ => None,
    }
}

pub fn print_held_slide(snapshot: &SequencerSnapshot) {
    if let Some(line) = format_held_slide(snapshot) {
        println!("{}", line);
    }
}

// ============================================================================
// Static build
// ============================================================================

/// Pages written by `build`, relative to the output directory.
pub fn format_build_output(report: &BuildReport, output_dir: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for (route, path) in &report.pages {
        let shown = path.strip_prefix(output_dir).unwrap_or(path);
        lines.push(format!("{} → {}", route.title(), shown.display()));
    }
    lines.push(String::new());
    lines.push(format!(
        "Built {}, copied {}",
        plural(report.pages.len(), "page", "pages"),
        plural(report.assets_copied, "asset", "assets")
    ));
    lines
}

pub fn print_build_output(report: &BuildReport, output_dir: &Path) {
    for line in format_build_output(report, output_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Theme
// ============================================================================

pub fn format_theme_state(state: ThemeState, stored: bool) -> Vec<String> {
    let source = if stored { "stored preference" } else { "default" };
    vec![format!("Theme: {} ({})", state.mode(), source)]
}

pub fn print_theme_state(state: ThemeState, stored: bool) {
    for line in format_theme_state(state, stored) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_output(report: &CheckReport) -> Vec<String> {
    let mut lines = vec!["Config".to_string()];
    lines.push(match &report.config_file {
        Some(path) => format!("{}{}", indent(1), path),
        None => format!("{}(stock defaults)", indent(1)),
    });

    lines.push(format!("Hero ({})", plural(report.hero_images, "image", "images")));
    for src in &report.missing_hero {
        lines.push(format!("{}missing: {}", indent(1), src));
    }
    lines.push(format!("Gallery ({})", plural(report.gallery_images, "image", "images")));
    for src in &report.missing_gallery {
        lines.push(format!("{}missing: {}", indent(1), src));
    }

    lines.push(String::new());
    lines.push(match report.missing() {
        0 => "All assets present".to_string(),
        n => format!("{} missing", plural(n, "asset", "assets")),
    });
    lines
}

pub fn print_check_output(report: &CheckReport) {
    for line in format_check_output(report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::LensPosition;
    use crate::types::Route;
    use std::path::PathBuf;

    fn snapshot(phase: Phase) -> SequencerSnapshot {
        SequencerSnapshot {
            phase,
            ..SequencerSnapshot::default()
        }
    }

    #[test]
    fn index_is_zero_padded() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
    }

    #[test]
    fn phase_changes_get_headers() {
        let lines = format_hero_transition(&snapshot(Phase::Idle), &snapshot(Phase::Preloading), 5);
        assert_eq!(lines, vec!["Preloading 5 images"]);

        let lines = format_hero_transition(&snapshot(Phase::Preloading), &snapshot(Phase::Capturing(0)), 5);
        assert_eq!(lines[0], "Capturing 1/5");
    }

    #[test]
    fn lens_and_flash_are_reported_while_capturing() {
        let prev = snapshot(Phase::Capturing(0));
        let mut next = prev.clone();
        next.lens = LensPosition::new(-30.0, 20.0, -10.0, 1.2);
        next.flash = true;

        let lines = format_hero_transition(&prev, &next, 5);
        assert_eq!(
            lines,
            vec!["    Lens: x -30, y 20, rotate -10°, scale 1.2", "    Flash"]
        );
    }

    #[test]
    fn flash_off_is_silent() {
        let mut prev = snapshot(Phase::Capturing(1));
        prev.flash = true;
        let next = snapshot(Phase::Capturing(1));
        assert!(format_hero_transition(&prev, &next, 5).is_empty());
    }

    #[test]
    fn held_slide_only_reported_in_slideshow() {
        assert_eq!(
            format_held_slide(&snapshot(Phase::Slideshow(0))).as_deref(),
            Some("Slideshow 1/1 (held)")
        );
        assert_eq!(format_held_slide(&snapshot(Phase::Capturing(0))), None);
    }

    #[test]
    fn build_output_lists_pages_relative_to_output() {
        let out = PathBuf::from("/tmp/dist");
        let report = BuildReport {
            pages: vec![
                (Route::Home, out.join("index.html")),
                (Route::About, out.join("about/index.html")),
            ],
            assets_copied: 1,
        };
        let lines = format_build_output(&report, &out);
        assert_eq!(lines[0], "Home → index.html");
        assert_eq!(lines[1], "About → about/index.html");
        assert_eq!(lines.last().unwrap(), "Built 2 pages, copied 1 asset");
    }

    #[test]
    fn theme_state_names_source() {
        assert_eq!(
            format_theme_state(ThemeState { is_dark: true }, true),
            vec!["Theme: dark (stored preference)"]
        );
        assert_eq!(
            format_theme_state(ThemeState { is_dark: false }, false),
            vec!["Theme: light (default)"]
        );
    }

    #[test]
    fn check_output_lists_missing_assets() {
        let report = CheckReport {
            config_file: None,
            hero_images: 5,
            gallery_images: 6,
            missing_hero: vec!["/images/hero3.jpg".to_string()],
            missing_gallery: vec![],
        };
        let lines = format_check_output(&report);
        assert_eq!(lines[1], "    (stock defaults)");
        assert!(lines.contains(&"    missing: /images/hero3.jpg".to_string()));
        assert_eq!(lines.last().unwrap(), "1 asset missing");
    }
}
