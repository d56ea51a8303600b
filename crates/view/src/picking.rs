//! Color-id picking.
//!
//! In selection mode every instance is drawn flat in a color encoding its id.
//! The pixels around the cursor are then read back and the dominant id wins.

use scenerep_common::OccurrenceId;

/// Side of the square read around the cursor, in pixels.
pub const PICK_SIZE: u32 = 5;

const PICK_BYTES: usize = (PICK_SIZE * PICK_SIZE * 4) as usize;

/// Spread the low 24 bits of `id` over red, green and blue.
pub fn encode_rgb_id(id: OccurrenceId) -> [u8; 3] {
    let [r, g, b, _] = id.0.to_le_bytes();
    [r, g, b]
}

/// Rebuild an id from the first three bytes of a pixel; alpha is ignored.
///
/// Returns `None` when `pixel` holds fewer than three bytes.
pub fn decode_rgb_id(pixel: &[u8]) -> Option<OccurrenceId> {
    match *pixel {
        [r, g, b, ..] => Some(OccurrenceId(u32::from_le_bytes([r, g, b, 0]))),
        _ => None,
    }
}

/// Lower-left corner of the pick square for a cursor at `(x, y)`, window
/// origin top left. The corner is clamped to the window.
pub fn pick_origin(x: u32, y: u32, win_height: u32) -> (u32, u32) {
    let flipped = win_height.saturating_sub(y);
    (x.saturating_sub(PICK_SIZE / 2), flipped.saturating_sub(PICK_SIZE / 2))
}

/// Most frequent non-null id in a 5x5 RGBA block, or [`OccurrenceId::NULL`].
///
/// Ties go to the id met first.
///
/// # Panics
/// If `rgba` is not exactly 100 bytes.
pub fn pick_from_samples(rgba: &[u8]) -> OccurrenceId {
    assert_eq!(
        rgba.len(),
        PICK_BYTES,
        "pick block must hold {PICK_SIZE}x{PICK_SIZE} RGBA pixels"
    );
    let mut weights: Vec<(OccurrenceId, usize)> = Vec::new();
    for pixel in rgba.chunks_exact(4) {
        let Some(id) = decode_rgb_id(pixel).filter(|id| !id.is_null()) else {
            continue;
        };
        match weights.iter_mut().find(|(seen, _)| *seen == id) {
            Some((_, weight)) => *weight += 1,
            None => weights.push((id, 1)),
        }
    }
    let mut best = (OccurrenceId::NULL, 0);
    for (id, weight) in weights {
        if weight > best.1 {
            best = (id, weight);
        }
    }
    best.0
}
