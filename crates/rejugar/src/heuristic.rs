//! Move selection over a tile snapshot.
//!
//! The pairing rule was inferred empirically from the game and is not
//! configurable: two distinct tiles pair when their values are equal or sum
//! to ten. Among valid pairs the heuristic picks the geometrically closest
//! one; ties resolve to the first pair encountered under ascending-index
//! enumeration. That fixed order makes repeated runs over identical
//! snapshots choose identical moves, which the dual-attempt comparison
//! depends on.
//!
//! This is a query: it never touches the page.

use crate::observe::Tile;

/// A selected move: ordered pair of snapshot indices of two distinct tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    /// Index of the tile to click first
    pub first: usize,
    /// Index of the tile to click second
    pub second: usize,
}

/// Check the pairing rule for two tiles
#[must_use]
pub const fn is_valid_pair(a: &Tile, b: &Tile) -> bool {
    a.value == b.value || a.value + b.value == 10
}

/// Select one move from a snapshot, or `None` when no valid pair exists.
///
/// Only active tiles are eligible. With fewer than two active tiles, or no
/// pair satisfying the rule, the caller must fall back to a reshuffle or
/// stop.
#[must_use]
pub fn select_move(tiles: &[Tile]) -> Option<Move> {
    let mut best: Option<(Move, f64)> = None;

    for i in 0..tiles.len() {
        if !tiles[i].active {
            continue;
        }
        for j in (i + 1)..tiles.len() {
            if !tiles[j].active || !is_valid_pair(&tiles[i], &tiles[j]) {
                continue;
            }
            let d = distance(&tiles[i], &tiles[j]);
            // Strict comparison keeps the first-encountered pair on ties
            let closer = best.map_or(true, |(_, best_d)| d < best_d);
            if closer {
                best = Some((Move { first: i, second: j }, d));
            }
        }
    }

    best.map(|(mv, _)| mv)
}

fn distance(a: &Tile, b: &Tile) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}
