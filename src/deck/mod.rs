//! Deck construction: pick the first N source images, pair them, shuffle, label.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Largest supported column count, one letter per column.
pub const MAX_COLS: u32 = 26;

/// An `(id, url)` entry supplied by the image source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceImage {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub url: String,
    pub coord: String,
    pub is_flipped: bool,
    pub is_matched: bool,
}

impl Card {
    pub fn pairs_with(&self, other: &Card) -> bool {
        self.id == other.id
    }

    pub fn is_hidden(&self) -> bool {
        !self.is_flipped && !self.is_matched
    }
}

/// Column letter for a zero-based column index: 0 -> 'A', 1 -> 'B', ...
pub fn column_label(col: u32) -> char {
    char::from(b'A' + (col % MAX_COLS) as u8)
}

/// Board address for the card at presentation position `index`.
pub fn coord_for(index: usize, cols: u32) -> String {
    let cols = cols as usize;
    format!("{}{}", column_label((index % cols) as u32), index / cols + 1)
}

/// Check the board shape against the available images.
pub fn validate(rows: u32, cols: u32, available: usize) -> Result<usize, GameError> {
    let cells = rows
        .checked_mul(cols)
        .ok_or_else(|| GameError::board(format!("{rows}x{cols} board is too large")))?;
    if cells == 0 {
        return Err(GameError::board("board must have at least one cell"));
    }
    if cells % 2 != 0 {
        return Err(GameError::board(format!("{rows}x{cols} has an odd number of cells")));
    }
    if cols > MAX_COLS {
        return Err(GameError::board(format!("at most {MAX_COLS} columns are supported")));
    }
    let pairs = (cells / 2) as usize;
    if pairs > available {
        return Err(GameError::board(format!(
            "{rows}x{cols} needs {pairs} images but only {available} are available"
        )));
    }
    Ok(pairs)
}

/// Build a shuffled deck using the thread-local RNG.
pub fn build(rows: u32, cols: u32, images: &[SourceImage]) -> Result<Vec<Card>, GameError> {
    build_with_rng(rows, cols, images, &mut rand::thread_rng())
}

pub fn build_with_rng<R: Rng + ?Sized>(
    rows: u32,
    cols: u32,
    images: &[SourceImage],
    rng: &mut R,
) -> Result<Vec<Card>, GameError> {
    let pairs = validate(rows, cols, images.len())?;
    let chosen = &images[..pairs];

    let mut deck: Vec<&SourceImage> = chosen.iter().chain(chosen.iter()).collect();
    deck.shuffle(rng);

    Ok(deck
        .into_iter()
        .enumerate()
        .map(|(i, img)| Card {
            id: img.id.clone(),
            url: img.url.clone(),
            coord: coord_for(i, cols),
            is_flipped: false,
            is_matched: false,
        })
        .collect())
}
