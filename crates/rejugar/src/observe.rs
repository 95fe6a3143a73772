//! Page observation: generic element snapshots and tile extraction.
//!
//! The harness never depends on game-specific selectors. One JS evaluation
//! enumerates every `div`, `span` and `button` with its text, bounding box
//! and opacity; everything else — which elements are tiles, which are
//! controls — is decided on this side of the wire.
//!
//! Tiles are ephemeral: the DOM mutates after every click, so a snapshot is
//! rebuilt from the live page before each move selection and never cached.

use serde::{Deserialize, Serialize};

/// Minimum bounding-box extent (px) for an element to count as interactive
pub const MIN_ELEMENT_EXTENT: f64 = 5.0;

/// Centers closer than this (px, per axis) belong to the same physical tile
const DUPLICATE_CENTER_EPSILON: f64 = 3.0;

/// JavaScript evaluated in the page to enumerate candidate elements.
///
/// Returns a JSON array of records; filtering happens on the Rust side so
/// the page script stays a dumb enumerator.
pub(crate) const ELEMENT_SNAPSHOT_JS: &str = r"JSON.stringify(
    Array.from(document.querySelectorAll('div, span, button')).map((el) => {
        const box = el.getBoundingClientRect();
        const style = window.getComputedStyle(el);
        return {
            text: (el.textContent || '').trim(),
            x: box.x,
            y: box.y,
            width: box.width,
            height: box.height,
            opacity: parseFloat(style.opacity) || 0
        };
    })
)";

/// One visible element as observed on the live page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibleElement {
    /// Trimmed text content (includes descendant text)
    pub text: String,
    /// Bounding box left edge
    pub x: f64,
    /// Bounding box top edge
    pub y: f64,
    /// Bounding box width
    pub width: f64,
    /// Bounding box height
    pub height: f64,
    /// Computed opacity in [0, 1]
    pub opacity: f64,
}

impl VisibleElement {
    /// Center point of the bounding box
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether the element occupies enough screen space to be clickable
    #[must_use]
    pub fn has_usable_box(&self) -> bool {
        self.width > MIN_ELEMENT_EXTENT && self.height > MIN_ELEMENT_EXTENT
    }
}

/// One numbered tile reconstructed from a page snapshot
///
/// `(x, y)` is the element center, which is also the click target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    /// Digit shown on the tile (0–9)
    pub value: u8,
    /// Center x
    pub x: f64,
    /// Center y
    pub y: f64,
    /// Whether the tile is currently playable
    pub active: bool,
}

/// Extract tiles from an element snapshot.
///
/// A tile is any element whose text is a single digit and whose box is
/// usable. Fully transparent tiles are kept but marked inactive — the game
/// fades out consumed tiles without removing them from the DOM.
///
/// Because `textContent` includes descendant text, markup like
/// `<div><span>5</span></div>` enumerates as two digit elements centered
/// on the same spot; such coinciding candidates collapse to the first one,
/// so one physical tile never produces a zero-distance pair with itself.
#[must_use]
pub fn tiles_from_elements(elements: &[VisibleElement]) -> Vec<Tile> {
    let mut tiles: Vec<Tile> = Vec::new();

    for el in elements {
        if !el.has_usable_box() {
            continue;
        }
        let Some(value) = single_digit(&el.text) else {
            continue;
        };

        let (x, y) = el.center();
        let coincides = tiles.iter().any(|t| {
            (t.x - x).abs() < DUPLICATE_CENTER_EPSILON && (t.y - y).abs() < DUPLICATE_CENTER_EPSILON
        });
        if coincides {
            continue;
        }

        tiles.push(Tile {
            value,
            x,
            y,
            active: el.opacity > 0.0,
        });
    }

    tiles
}

/// Find a generic control by its exact text, if present.
///
/// Absence is normal — tutorials, language pickers and reshuffle buttons
/// come and go — so this is a query, not an assertion.
#[must_use]
pub fn find_control<'a>(elements: &'a [VisibleElement], label: &str) -> Option<&'a VisibleElement> {
    elements
        .iter()
        .find(|el| el.text == label && el.has_usable_box() && el.opacity > 0.0)
}

fn single_digit(text: &str) -> Option<u8> {
    let mut chars = text.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    c.to_digit(10).map(|d| d as u8)
}
