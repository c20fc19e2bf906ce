//! Typed view of one engine observation.
//!
//! The engine hands over fixed-size, NUL-padded byte buffers. Fields are named
//! here once instead of being looked up by key on every step.

use serde::{Deserialize, Serialize};

use crate::actions::CompassDirection;
use crate::EngineError;

pub const MESSAGE_LENGTH: usize = 256;
pub const BLSTATS_LENGTH: usize = 27;
pub const DESCRIPTION_LENGTH: usize = 80;
pub const SCREEN_ROWS: usize = 21;
pub const SCREEN_COLS: usize = 79;

/// blstats slots.
pub const BL_X: usize = 0;
pub const BL_Y: usize = 1;
pub const BL_TIME: usize = 20;

/// Slot of `internal` that is set while the agent stands on the down staircase.
pub const INTERNAL_STAIRS_DOWN: usize = 4;

fn trim_nul(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}

/// Decode a NUL-padded buffer. An all-NUL buffer is the empty string.
pub fn decode_nul_padded(bytes: &[u8]) -> Result<&str, EngineError> {
    Ok(std::str::from_utf8(trim_nul(bytes))?)
}

/// Write `text` into a zeroed buffer of `len` bytes, keeping at least one trailing NUL.
/// Long text is cut on a character boundary so the buffer always decodes.
pub fn encode_nul_padded(text: &str, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    let mut n = text.len().min(len.saturating_sub(1));
    while !text.is_char_boundary(n) {
        n -= 1;
    }
    out[..n].copy_from_slice(&text.as_bytes()[..n]);
    out
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() { return true; }
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Per-tile textual descriptions of the screen, `rows x cols` cells of
/// `DESCRIPTION_LENGTH` bytes each, row-major.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenDescriptions {
    rows: usize,
    cols: usize,
    data: Vec<u8>,
}

impl Default for ScreenDescriptions {
    fn default() -> Self { Self::new(SCREEN_ROWS, SCREEN_COLS) }
}

impl ScreenDescriptions {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols, data: vec![0; rows * cols * DESCRIPTION_LENGTH] }
    }

    pub fn rows(&self) -> usize { self.rows }
    pub fn cols(&self) -> usize { self.cols }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.cols || y >= self.rows { return None; }
        Some((y * self.cols + x) * DESCRIPTION_LENGTH)
    }

    /// Raw NUL-trimmed bytes of one tile; `None` off the grid.
    pub fn raw(&self, x: usize, y: usize) -> Option<&[u8]> {
        let start = self.offset(x, y)?;
        Some(trim_nul(&self.data[start..start + DESCRIPTION_LENGTH]))
    }

    /// Description at `(x, y)`. Tiles off the grid read as empty.
    pub fn description(&self, x: usize, y: usize) -> Result<&str, EngineError> {
        match self.raw(x, y) {
            Some(bytes) => Ok(std::str::from_utf8(bytes)?),
            None => Ok(""),
        }
    }

    pub fn set(&mut self, x: usize, y: usize, text: &str) -> Result<(), EngineError> {
        let start = self
            .offset(x, y)
            .ok_or_else(|| EngineError::Validation(format!("tile ({x}, {y}) outside {}x{} screen", self.cols, self.rows)))?;
        let cell = encode_nul_padded(text, DESCRIPTION_LENGTH);
        self.data[start..start + DESCRIPTION_LENGTH].copy_from_slice(&cell);
        Ok(())
    }

    pub fn clear(&mut self, x: usize, y: usize) {
        if let Some(start) = self.offset(x, y) {
            self.data[start..start + DESCRIPTION_LENGTH].fill(0);
        }
    }

    /// Whether any tile's description contains `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.data
            .chunks_exact(DESCRIPTION_LENGTH)
            .any(|cell| contains_bytes(trim_nul(cell), name.as_bytes()))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub message: Vec<u8>,
    pub blstats: Vec<i64>,
    pub screen_descriptions: ScreenDescriptions,
    #[serde(default)]
    pub inv_strs: Vec<Vec<u8>>,
    #[serde(default)]
    pub inv_letters: Vec<u8>,
    #[serde(default)]
    pub internal: Vec<i32>,
}

impl Default for Observation {
    fn default() -> Self { Self::blank() }
}

impl Observation {
    /// Full-size observation with every buffer zeroed.
    pub fn blank() -> Self {
        Self::with_screen(SCREEN_ROWS, SCREEN_COLS)
    }

    pub fn with_screen(rows: usize, cols: usize) -> Self {
        Self {
            message: vec![0; MESSAGE_LENGTH],
            blstats: vec![0; BLSTATS_LENGTH],
            screen_descriptions: ScreenDescriptions::new(rows, cols),
            inv_strs: Vec::new(),
            inv_letters: Vec::new(),
            internal: vec![0; 9],
        }
    }

    /// The turn's message, NUL-trimmed.
    pub fn message_text(&self) -> Result<&str, EngineError> {
        decode_nul_padded(&self.message)
    }

    pub fn set_message(&mut self, text: &str) {
        self.message = encode_nul_padded(text, MESSAGE_LENGTH);
    }

    /// Agent position `(x, y)` from blstats.
    pub fn position(&self) -> Option<(i64, i64)> {
        match (self.blstats.get(BL_X), self.blstats.get(BL_Y)) {
            (Some(&x), Some(&y)) => Some((x, y)),
            _ => None,
        }
    }

    pub fn set_position(&mut self, x: i64, y: i64) {
        if self.blstats.len() < 2 { self.blstats.resize(BLSTATS_LENGTH, 0); }
        self.blstats[BL_X] = x;
        self.blstats[BL_Y] = y;
    }

    pub fn time(&self) -> i64 {
        self.blstats.get(BL_TIME).copied().unwrap_or(0)
    }

    pub fn set_time(&mut self, time: i64) {
        if self.blstats.len() <= BL_TIME { self.blstats.resize(BLSTATS_LENGTH, 0); }
        self.blstats[BL_TIME] = time;
    }

    pub fn on_stairs_down(&self) -> bool {
        self.internal.get(INTERNAL_STAIRS_DOWN).map_or(false, |&v| v != 0)
    }

    /// Descriptions of the nine tiles around the agent, row-major from north-west.
    /// Tiles off the screen read as empty.
    pub fn neighbor_descriptions(&self) -> Result<Vec<&str>, EngineError> {
        let (x, y) = self
            .position()
            .ok_or_else(|| EngineError::Validation("blstats carry no position".into()))?;
        let mut out = Vec::with_capacity(9);
        for j in (y - 1)..=(y + 1) {
            for i in (x - 1)..=(x + 1) {
                if i < 0 || j < 0 {
                    out.push("");
                } else {
                    out.push(self.screen_descriptions.description(i as usize, j as usize)?);
                }
            }
        }
        Ok(out)
    }

    /// Direction of the first neighbouring tile whose description contains `name`.
    /// The agent's own tile never yields a direction.
    pub fn direction_of(&self, name: &str) -> Result<Option<CompassDirection>, EngineError> {
        for (i, description) in self.neighbor_descriptions()?.iter().enumerate() {
            if description.contains(name) {
                if let Some(dir) = CompassDirection::from_neighbor_index(i) {
                    return Ok(Some(dir));
                }
            }
        }
        Ok(None)
    }

    /// Inventory letter of the first item whose line contains `name`.
    pub fn key_in_inventory(&self, name: &str) -> Result<Option<char>, EngineError> {
        for (letter, line) in self.inv_letters.iter().zip(&self.inv_strs) {
            if line.iter().all(|&b| b == 0) { break; }
            if decode_nul_padded(line)?.contains(name) {
                return Ok(Some(*letter as char));
            }
        }
        Ok(None)
    }

    pub fn push_inventory(&mut self, letter: char, text: &str) {
        self.inv_letters.push(letter as u8);
        self.inv_strs.push(encode_nul_padded(text, 80));
    }
}
