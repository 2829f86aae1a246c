//! HTML page rendering and static export.
//!
//! ## Pages
//!
//! - **Home** (`/`): capture-sequence hero, portfolio grid, about teaser, contact form
//! - **About** (`/about`): headline, portrait, markdown body, stats, specialties
//! - **Portfolio** (`/portfolio`): grid with lightbox
//! - **Contact** (`/contact`): the contact form
//!
//! Every page shares the navigation bar (brand, links, theme toggle) and the
//! footer. The root element carries `class="dark"` when the theme
//! preference is dark; the generated CSS keys the dark palette off it.
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time and inlined into each page:
//! - `static/style.css`: base styles (colors and grid spacing injected from config)
//! - `static/theme.js`: theme toggle button
//! - `static/hero.js`: renders hero snapshots streamed from `/api/hero/events`
//! - `static/gallery.js`: lightbox over the portfolio grid
//! - `static/contact.js`: form submission and status line
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping.

use crate::config::{self, SiteConfig};
use crate::contact::{STATUS_FAILED, STATUS_SENT};
use crate::gallery::{self, GalleryImage, Lightbox};
use crate::sequencer::FileAssetLoader;
use crate::types::{self, Route};
use chrono::Datelike;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const THEME_JS: &str = include_str!("../static/theme.js");
const HERO_JS: &str = include_str!("../static/hero.js");
const GALLERY_JS: &str = include_str!("../static/gallery.js");
const CONTACT_JS: &str = include_str!("../static/contact.js");

/// Endpoint the hero subscribes to.
pub const HERO_EVENTS_PATH: &str = "/api/hero/events";
pub const CONTACT_PATH: &str = "/api/contact";
pub const THEME_TOGGLE_PATH: &str = "/api/theme/toggle";

/// Everything a page needs besides its route.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub config: &'a SiteConfig,
    /// Current theme preference.
    pub dark: bool,
    /// Copyright year in the footer.
    pub year: i32,
}

impl<'a> PageContext<'a> {
    pub fn new(config: &'a SiteConfig, dark: bool) -> Self {
        Self {
            config,
            dark,
            year: chrono::Local::now().year(),
        }
    }

    fn css(&self) -> String {
        format!(
            "{}\n\n{}\n\n{}",
            config::generate_color_css(&self.config.colors),
            config::generate_gallery_css(&self.config.gallery),
            CSS_STATIC
        )
    }
}

/// Render one page.
pub fn render(route: Route, ctx: &PageContext) -> Markup {
    match route {
        Route::Home => render_home(ctx),
        Route::About => render_about(ctx),
        Route::Portfolio => render_portfolio(ctx),
        Route::Contact => render_contact(ctx),
    }
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(ctx: &PageContext, title: &str, current: Option<Route>, content: Markup) -> Markup {
    let site = &ctx.config.site;
    let og_image = format!(
        "{}{}",
        site.base_url.trim_end_matches('/'),
        ctx.config.hero.images.first().map(String::as_str).unwrap_or("")
    );
    html! {
        (DOCTYPE)
        html lang="en" class=[ctx.dark.then_some("dark")] {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                meta name="description" content=(site.description);
                meta property="og:title" content=(site.owner);
                meta property="og:description" content=(site.description);
                meta property="og:url" content=(site.base_url);
                meta property="og:image" content=(og_image);
                meta name="twitter:card" content="summary_large_image";
                link rel="icon" href="/assets/favicon.ico";
                style { (PreEscaped(ctx.css())) }
            }
            body {
                (navbar(ctx, current))
                main.site-main { (content) }
                (footer(ctx))
                script { (PreEscaped(THEME_JS)) }
            }
        }
    }
}

/// Brand, page links, theme toggle. Collapses behind a checkbox on narrow screens.
fn navbar(ctx: &PageContext, current: Option<Route>) -> Markup {
    let current_path = current.map(Route::path);
    html! {
        header.site-header {
            nav.site-nav {
                a.brand href="/" { (ctx.config.site.brand) }
                input.nav-toggle type="checkbox" id="nav-toggle";
                label.nav-hamburger for="nav-toggle" aria-label="Menu" { "☰" }
                div.nav-links {
                    @for item in types::navigation() {
                        @let is_current = current_path == Some(item.path.as_str());
                        a class=[is_current.then_some("current")] href=(item.path) { (item.title) }
                    }
                    (theme_toggle(ctx.dark, &ctx.config.theme.storage_key))
                    label.nav-close for="nav-toggle" { "× Close" }
                }
            }
        }
    }
}

fn theme_toggle(dark: bool, storage_key: &str) -> Markup {
    let (target, label) = if dark { ("light", "Light") } else { ("dark", "Dark") };
    html! {
        button.theme-toggle type="button" data-storage-key=(storage_key)
            aria-label={ "Switch to " (target) " mode" } {
            span.theme-icon aria-hidden="true" { @if dark { "☀" } @else { "☾" } }
            span.theme-label { (label) }
        }
    }
}

fn footer(ctx: &PageContext) -> Markup {
    let config = ctx.config;
    html! {
        footer.site-footer {
            div.footer-columns {
                section.reveal style="--reveal-delay: 0ms" {
                    h3 { (config.site.owner) }
                    p.muted { (config.site.blurb) }
                }
                section.reveal style="--reveal-delay: 200ms" {
                    h3 { "Quick Links" }
                    nav.footer-links {
                        @for item in types::navigation() {
                            a href=(item.path) { (item.title) }
                        }
                    }
                }
                section.reveal style="--reveal-delay: 400ms" {
                    h3 { "Get in Touch" }
                    a href={ "mailto:" (config.contact.email) } { (config.contact.email) }
                    a href={ "tel:" (config.contact.phone.replace(' ', "")) } { (config.contact.phone) }
                    span.muted { (config.contact.location) }
                }
            }
            div.footer-bottom {
                p.muted { "© " (ctx.year) " " (config.site.owner) ". All rights reserved." }
                div.social-links {
                    @for link in &config.social {
                        a href=(link.href) target="_blank" rel="noopener noreferrer" aria-label=(link.label) {
                            (link.label)
                        }
                    }
                }
            }
        }
    }
}

/// Capture-sequence hero. The stage is filled in by `hero.js` from the
/// snapshot stream; without scripts or a server the first hero image is shown.
fn hero(ctx: &PageContext) -> Markup {
    let hero = &ctx.config.hero;
    html! {
        section.hero data-events=(HERO_EVENTS_PATH) data-total=(hero.images.len())
            data-fallback=[hero.images.first()] {
            div.hero-backdrop {}
            div.hero-flash {}
            div.hero-lens hidden {}
            div.hero-content {
                div.hero-text {
                    h1 {
                        span { "LENS" }
                        span.muted { "CRAFT" }
                    }
                    p.hero-tagline { (ctx.config.site.tagline) }
                    p.hero-progress hidden {
                        span.rec-dot {}
                        span.hero-progress-text {}
                    }
                }
                div.hero-stage {
                    div.hero-stack {}
                    div.hero-slide hidden {}
                    div.hero-dots {}
                    noscript {
                        @if let Some(first) = hero.images.first() {
                            img src=(first) alt="Portfolio highlight";
                        }
                    }
                }
            }
        }
        script { (PreEscaped(HERO_JS)) }
    }
}

/// Serialize for an inline `<script type="application/json">` block.
fn json_for_script<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_default()
        .replace("</", "<\\/")
}

fn gallery_grid(images: &[GalleryImage]) -> Markup {
    let lightbox = Lightbox::new(images);
    html! {
        div.gallery-grid {
            @for (idx, image) in images.iter().enumerate() {
                button.gallery-tile.reveal type="button" data-index=(idx)
                    style={ "--reveal-delay: " (image.reveal_delay_ms) "ms" } {
                    img src=(image.src) alt=(image.alt) width="500" height="500" loading="lazy";
                }
            }
        }
        script type="application/json" id="lightbox-data" { (PreEscaped(json_for_script(&lightbox))) }
        div.lightbox hidden {
            button.lightbox-close type="button" aria-label="Close" { "×" }
            button.lightbox-prev type="button" aria-label="Previous" { "‹" }
            img.lightbox-image alt="";
            button.lightbox-next type="button" aria-label="Next" { "›" }
            div.lightbox-thumbs {}
        }
        script { (PreEscaped(GALLERY_JS)) }
    }
}

fn contact_form() -> Markup {
    html! {
        form.contact-form data-endpoint=(CONTACT_PATH) data-sent=(STATUS_SENT) data-failed=(STATUS_FAILED) {
            input name="name" placeholder="Name" required;
            input name="email" type="email" placeholder="Email" required;
            textarea name="message" placeholder="Message" required {}
            button type="submit" { "Send" }
            p.form-status role="status" aria-live="polite" {}
        }
        script { (PreEscaped(CONTACT_JS)) }
    }
}

fn portfolio_images(config: &SiteConfig) -> Vec<GalleryImage> {
    gallery::gallery_images(&config.gallery.images, config.gallery.reveal_step_ms)
}

// ============================================================================
// Page Renderers
// ============================================================================

fn render_home(ctx: &PageContext) -> Markup {
    let config = ctx.config;
    let content = html! {
        (hero(ctx))
        section.container {
            h2.section-title { "Portfolio" }
            (gallery_grid(&portfolio_images(config)))
        }
        section.band {
            div.container.centered {
                h2 { "About Me" }
                p.lead { (config.site.teaser) }
                a.text-link href=(Route::About.path()) { "Learn More" }
            }
        }
        section.container {
            h2 { "Contact Me" }
            (contact_form())
        }
    };
    base_document(ctx, &config.site.title, Some(Route::Home), content)
}

fn render_about(ctx: &PageContext) -> Markup {
    let about = &ctx.config.about;

    // Convert markdown to HTML
    let parser = Parser::new(&about.body);
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);

    let content = html! {
        section.container.about-hero {
            div.reveal {
                h1 { (about.headline) }
                p.lead { (about.intro) }
            }
            div.about-portrait.reveal style="--reveal-delay: 100ms" {
                img src=(about.portrait) alt={ (ctx.config.site.owner) " - portrait" };
            }
        }
        section.container.narrow {
            article.about-body.reveal { (PreEscaped(body_html)) }
            div.stat-grid {
                @for (idx, stat) in about.stats.iter().enumerate() {
                    div.card.reveal style={ "--reveal-delay: " (idx * 100) "ms" } {
                        h3 { (stat.value) }
                        p.muted { (stat.label) }
                    }
                }
            }
        }
        @if !about.specialties.is_empty() {
            section.container.narrow {
                h2 { "My Specialties" }
                div.specialty-grid {
                    @for (idx, specialty) in about.specialties.iter().enumerate() {
                        div.card.reveal style={ "--reveal-delay: " (idx * 100) "ms" } {
                            h3 { (specialty.title) }
                            p.muted { (specialty.description) }
                        }
                    }
                }
            }
        }
    };
    let title = format!("About | {}", ctx.config.site.brand);
    base_document(ctx, &title, Some(Route::About), content)
}

fn render_portfolio(ctx: &PageContext) -> Markup {
    let content = html! {
        section.container {
            h1.section-title { "Portfolio" }
            (gallery_grid(&portfolio_images(ctx.config)))
        }
    };
    let title = format!("Portfolio | {}", ctx.config.site.brand);
    base_document(ctx, &title, Some(Route::Portfolio), content)
}

fn render_contact(ctx: &PageContext) -> Markup {
    let content = html! {
        section.container {
            h1 { "Contact Me" }
            (contact_form())
        }
    };
    let title = format!("Contact | {}", ctx.config.site.brand);
    base_document(ctx, &title, Some(Route::Contact), content)
}

/// Page for unknown paths.
pub fn render_not_found(ctx: &PageContext) -> Markup {
    let content = html! {
        section.container.centered {
            h1 { "Page not found" }
            p.lead { "The page you're looking for isn't here." }
            a.text-link href="/" { "Back to the home page" }
        }
    };
    base_document(ctx, "Not found", None, content)
}

// ============================================================================
// Static export
// ============================================================================

/// What a static export wrote.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub pages: Vec<(Route, PathBuf)>,
    pub assets_copied: usize,
}

/// Write every page as static HTML and copy the public directory alongside.
///
/// The exported pages have no server behind them: the hero shows its
/// fallback image and the theme toggle stays client-side.
pub fn build(
    config: &SiteConfig,
    public_dir: &Path,
    output_dir: &Path,
    dark: bool,
) -> Result<BuildReport, BuildError> {
    fs::create_dir_all(output_dir)?;
    let ctx = PageContext::new(config, dark);
    let mut report = BuildReport::default();

    for route in Route::ALL {
        let path = output_dir.join(route.output_file());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, render(route, &ctx).into_string())?;
        tracing::debug!(page = route.title(), path = %path.display(), "page written");
        report.pages.push((route, path));
    }

    report.assets_copied = copy_public(public_dir, output_dir)?;
    Ok(report)
}

/// Copy the public directory into the output, preserving layout. A missing
/// public directory copies nothing.
fn copy_public(src: &Path, dst: &Path) -> Result<usize, BuildError> {
    if !src.is_dir() {
        tracing::warn!(path = %src.display(), "public directory not found, no assets copied");
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Result of checking a site's configured images against its public directory.
#[derive(Debug, Default)]
pub struct CheckReport {
    /// Config file that was read, or `None` when running on stock defaults.
    pub config_file: Option<String>,
    pub hero_images: usize,
    pub gallery_images: usize,
    pub missing_hero: Vec<String>,
    pub missing_gallery: Vec<String>,
}

impl CheckReport {
    pub fn missing(&self) -> usize {
        self.missing_hero.len() + self.missing_gallery.len()
    }
}

/// Look up every hero and gallery image under the public directory.
pub fn check_assets(config: &SiteConfig, public_dir: &Path, config_file: Option<String>) -> CheckReport {
    let loader = FileAssetLoader::new(public_dir);
    let missing = |sources: &[String]| -> Vec<String> {
        sources
            .iter()
            .filter(|src| !loader.resolve(src).is_ok_and(|path| path.is_file()))
            .cloned()
            .collect()
    };
    CheckReport {
        config_file,
        hero_images: config.hero.images.len(),
        gallery_images: config.gallery.images.len(),
        missing_hero: missing(&config.hero.images),
        missing_gallery: missing(&config.gallery.images),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn page(route: Route, dark: bool) -> String {
        let config = SiteConfig::default();
        let ctx = PageContext {
            config: &config,
            dark,
            year: 2026,
        };
        render(route, &ctx).into_string()
    }

    #[test]
    fn dark_theme_marks_root_element() {
        assert!(page(Route::Home, true).contains(r#"<html lang="en" class="dark">"#));
        assert!(page(Route::Home, false).contains(r#"<html lang="en">"#));
    }

    #[test]
    fn toggle_offers_the_other_mode() {
        assert!(page(Route::About, true).contains("Switch to light mode"));
        assert!(page(Route::About, false).contains("Switch to dark mode"));
    }

    #[test]
    fn nav_marks_current_page() {
        let html = page(Route::Portfolio, false);
        assert!(html.contains(r#"<a class="current" href="/portfolio">Portfolio</a>"#));
        assert!(html.contains(r#"<a href="/about">About</a>"#));
    }

    #[test]
    fn home_wires_hero_to_event_stream() {
        let html = page(Route::Home, false);
        assert!(html.contains(r#"data-events="/api/hero/events""#));
        assert!(html.contains(r#"data-total="5""#));
        assert!(html.contains("LENS"));
        assert!(html.contains("Every click captures a universe"));
    }

    #[test]
    fn portfolio_grid_is_staggered_and_feeds_lightbox() {
        let html = page(Route::Portfolio, false);
        assert_eq!(html.matches("data-index=").count(), 6);
        assert!(html.contains("--reveal-delay: 500ms"));
        assert!(html.contains(r#"{"open":false,"index":0,"slides":[{"src":"/images/gallery1.jpg"}"#));
    }

    #[test]
    fn contact_form_carries_status_messages() {
        let html = page(Route::Contact, false);
        assert!(html.contains(r#"data-endpoint="/api/contact""#));
        assert!(html.contains(r#"data-sent="Message sent!""#));
        assert!(html.contains(r#"data-failed="Error sending message.""#));
    }

    #[test]
    fn about_renders_markdown_and_stats() {
        let html = page(Route::About, false);
        assert!(html.contains("<h2>My Journey</h2>"));
        assert!(html.contains("500+"));
        assert!(html.contains("Wedding Photography"));
    }

    #[test]
    fn footer_has_year_and_socials() {
        let html = page(Route::Home, false);
        assert!(html.contains("© 2026 John Doe Photography. All rights reserved."));
        assert!(html.contains(r#"href="tel:+1234567890""#));
        assert!(html.contains(r#"aria-label="Instagram""#));
    }

    #[test]
    fn config_text_is_escaped() {
        let mut config = SiteConfig::default();
        config.site.brand = "<script>alert(1)</script>".to_string();
        let ctx = PageContext::new(&config, false);
        let html = render(Route::Home, &ctx).into_string();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn lightbox_json_cannot_close_script_tag() {
        let json = json_for_script(&serde_json::json!({"src": "</script>"}));
        assert!(!json.contains("</script>"));
    }

    #[test]
    fn build_writes_pages_and_copies_assets() {
        let tmp = TempDir::new().unwrap();
        let public = tmp.path().join("public");
        fs::create_dir_all(public.join("images")).unwrap();
        fs::write(public.join("images/hero.jpg"), b"jpeg").unwrap();
        fs::write(public.join("robots.txt"), b"User-agent: *").unwrap();
        let out = tmp.path().join("dist");

        let report = build(&SiteConfig::default(), &public, &out, true).unwrap();
        assert_eq!(report.pages.len(), 4);
        assert_eq!(report.assets_copied, 2);
        assert!(out.join("index.html").exists());
        assert!(out.join("about/index.html").exists());
        assert!(out.join("portfolio/index.html").exists());
        assert!(out.join("contact/index.html").exists());
        assert!(out.join("images/hero.jpg").exists());

        let index = fs::read_to_string(out.join("index.html")).unwrap();
        assert!(index.contains(r#"class="dark""#));
    }

    #[test]
    fn build_without_public_dir_still_writes_pages() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("dist");
        let report = build(&SiteConfig::default(), &tmp.path().join("missing"), &out, false).unwrap();
        assert_eq!(report.assets_copied, 0);
        assert_eq!(report.pages.len(), 4);
    }

    #[test]
    fn check_reports_missing_and_escaping_images() {
        let tmp = TempDir::new().unwrap();
        let public = tmp.path().join("public");
        fs::create_dir_all(public.join("images")).unwrap();
        fs::write(public.join("images/hero1.jpg"), b"jpeg").unwrap();

        let mut config = SiteConfig::default();
        config.hero.images = vec!["/images/hero1.jpg".to_string(), "/images/hero2.jpg".to_string()];
        config.gallery.images = vec!["/../secret.jpg".to_string()];

        let report = check_assets(&config, &public, None);
        assert_eq!(report.hero_images, 2);
        assert_eq!(report.missing_hero, vec!["/images/hero2.jpg"]);
        assert_eq!(report.missing_gallery, vec!["/../secret.jpg"]);
        assert_eq!(report.missing(), 2);
    }

    #[test]
    fn check_passes_on_complete_site() {
        let site = setup_site();
        let config = load_site_config(site.path());
        assert_eq!(config.site.brand, "Test Studio");

        let report = check_assets(&config, &config.public_dir(site.path()), None);
        assert_eq!(report.missing(), 0);
        assert_eq!(report.gallery_images, 6);
    }
}
