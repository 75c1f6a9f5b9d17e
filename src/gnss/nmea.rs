//! NMEA text protocol decoder
//!
//! The only sentence consumed is GGA, and the only field of interest is the
//! fix-quality digit after the 6th comma. Everything else on the text
//! channel is ignored.

use crate::gnss::types::FixType;

/// Sentence name matched on the text channel
pub const GGA_SENTENCE: &[u8; 5] = b"GNGGA";

/// Consecutive empty/unparsable sentences before the fix is forced Invalid
pub const NO_FIX_LIMIT: u8 = 10;

/// Extract the fix quality from a GGA sentence.
///
/// Scans for the 6th comma and classifies the following character; returns
/// `None` for a short sentence, an empty quality field, or the reserved
/// digit 3.
pub fn parse_gga_quality(sentence: &[u8]) -> Option<FixType> {
    let mut commas = 0usize;
    let mut iter = sentence.iter();

    for &b in iter.by_ref() {
        if b == b',' {
            commas += 1;
            if commas == 6 {
                break;
            }
        }
    }
    if commas < 6 {
        return None;
    }

    match iter.next() {
        Some(&c) if c.is_ascii_digit() => FixType::from_quality_digit(c - b'0'),
        _ => None,
    }
}

/// Tracks fix quality across sentences.
///
/// A successful parse resets the miss counter; every miss (empty field,
/// malformed sentence, reserved digit) increments it, and hitting the limit
/// forces the fix to Invalid so stale quality can never persist through a
/// signal outage.
#[derive(Debug, Default)]
pub struct FixTracker {
    misses: u8,
}

impl FixTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one sentence; returns the new fix type when it changes the
    /// tracked state, `None` when the previous fix type should stand.
    pub fn update(&mut self, sentence: &[u8]) -> Option<FixType> {
        match parse_gga_quality(sentence) {
            Some(fix) => {
                self.misses = 0;
                Some(fix)
            }
            None => {
                self.misses = self.misses.saturating_add(1);
                if self.misses >= NO_FIX_LIMIT {
                    self.misses = 0;
                    Some(FixType::Invalid)
                } else {
                    None
                }
            }
        }
    }

    /// Reset the miss counter (on stop/restart)
    pub fn reset(&mut self) {
        self.misses = 0;
    }
}
