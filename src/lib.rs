//! # Lenscraft
//!
//! Portfolio website for a photography studio: four pages (home, about,
//! portfolio, contact), a contact form endpoint, a light/dark preference,
//! and an animated "capture sequence" hero that frames, flashes, and stacks
//! a handful of photos before settling into a slideshow.
//!
//! # Architecture
//!
//! ```text
//! site/config.toml ─► config ─► SiteConfig
//!                                  │
//!        ┌─────────────┬───────────┼──────────────┬───────────────┐
//!        ▼             ▼           ▼              ▼               ▼
//!      theme       sequencer     site          contact        gallery
//!   (preference)  (hero state)  (maud pages)  (form check)  (grid, lightbox)
//!        └─────────────┴───────────┼──────────────┘
//!                                  ▼
//!                               server  (axum: pages, JSON API, SSE)
//! ```
//!
//! The theme preference and the hero sequencer are the two pieces of live
//! state. Both publish through `tokio::sync::watch`: readers take the
//! current value or subscribe to changes, and exactly one component writes.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `config.toml` loading over stock defaults, validation, CSS variable generation |
//! | [`theme`] | Light/dark preference: stored choice, platform signal, toggle, persistence |
//! | [`sequencer`] | Hero capture-sequence state machine with cancellable timers |
//! | [`contact`] | Contact form presence checks and JSON replies |
//! | [`gallery`] | Portfolio grid tiles and lightbox state |
//! | [`site`] | Page rendering with Maud, static export, asset check |
//! | [`server`] | HTTP routes, hero event stream, static files |
//! | [`types`] | Routes and navigation entries shared by rendering and the server |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## Server-Driven Hero
//!
//! The capture sequence runs in Rust, not in the browser. Each visitor's
//! `/api/hero/events` connection gets its own sequencer and receives every
//! snapshot it publishes; the page script only draws what it is told. The
//! same sequencer drives the `lenscraft hero` terminal preview, and its
//! timing is tested against a paused Tokio clock.
//!
//! ## Theme Preference
//!
//! The server holds one preference as the site default; it comes from the
//! store, the desktop setting or config, and only `lenscraft theme toggle`
//! writes it back. Each browser keeps its own choice in local storage and a
//! cookie, so one visitor's toggle never changes another's pages.
//!
//! ## Static Export
//!
//! `lenscraft build` renders the same pages to plain HTML. Without a server
//! the hero falls back to a still image and the theme toggle keeps its
//! choice in the browser.

pub mod config;
pub mod contact;
pub mod gallery;
pub mod logging;
pub mod output;
pub mod sequencer;
pub mod server;
pub mod site;
pub mod theme;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
