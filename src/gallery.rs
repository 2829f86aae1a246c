//! Portfolio grid and lightbox data.
//!
//! The lightbox itself is a client-side widget. All this module owes it is
//! a correctly shaped slide list, the index to open at, and an open flag.

use serde::Serialize;

/// One tile of the portfolio grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryImage {
    pub src: String,
    pub alt: String,
    /// Staggered fade-in: tile `i` waits `i * reveal_step_ms`.
    pub reveal_delay_ms: u64,
}

/// Slide descriptor in the shape the lightbox widget expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slide {
    pub src: String,
}

/// Build grid tiles from the configured image paths.
pub fn gallery_images(sources: &[String], reveal_step_ms: u64) -> Vec<GalleryImage> {
    sources
        .iter()
        .enumerate()
        .map(|(i, src)| GalleryImage {
            src: src.clone(),
            alt: format!("Gallery Image {}", i + 1),
            reveal_delay_ms: i as u64 * reveal_step_ms,
        })
        .collect()
}

/// Open/close state of the lightbox over a fixed slide list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lightbox {
    pub open: bool,
    pub index: usize,
    pub slides: Vec<Slide>,
}

impl Lightbox {
    pub fn new(images: &[GalleryImage]) -> Self {
        Self {
            open: false,
            index: 0,
            slides: images
                .iter()
                .map(|img| Slide {
                    src: img.src.clone(),
                })
                .collect(),
        }
    }

    /// Open at `index`. Out-of-range indices leave the lightbox untouched.
    pub fn open_at(&mut self, index: usize) -> bool {
        if index >= self.slides.len() {
            return false;
        }
        self.index = index;
        self.open = true;
        true
    }

    /// Close, keeping the last index so reopening lands on the same slide.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn current(&self) -> Option<&Slide> {
        if self.open { self.slides.get(self.index) } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("/images/gallery{i}.jpg")).collect()
    }

    #[test]
    fn tiles_are_staggered() {
        let tiles = gallery_images(&sources(3), 100);
        let delays: Vec<u64> = tiles.iter().map(|t| t.reveal_delay_ms).collect();
        assert_eq!(delays, vec![0, 100, 200]);
        assert_eq!(tiles[2].alt, "Gallery Image 3");
    }

    #[test]
    fn lightbox_opens_on_clicked_tile() {
        let mut lightbox = Lightbox::new(&gallery_images(&sources(6), 100));
        assert!(!lightbox.open);
        assert!(lightbox.current().is_none());

        assert!(lightbox.open_at(4));
        assert_eq!(lightbox.current().unwrap().src, "/images/gallery5.jpg");

        lightbox.close();
        assert!(!lightbox.open);
        assert_eq!(lightbox.index, 4);
    }

    #[test]
    fn out_of_range_open_is_ignored() {
        let mut lightbox = Lightbox::new(&gallery_images(&sources(2), 100));
        assert!(!lightbox.open_at(2));
        assert!(!lightbox.open);

        let mut empty = Lightbox::new(&[]);
        assert!(!empty.open_at(0));
    }

    #[test]
    fn slides_serialize_as_src_objects() {
        let lightbox = Lightbox::new(&gallery_images(&sources(1), 0));
        assert_eq!(
            serde_json::to_value(&lightbox.slides).unwrap(),
            serde_json::json!([{"src": "/images/gallery1.jpg"}])
        );
    }
}
