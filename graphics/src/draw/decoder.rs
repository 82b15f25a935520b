//! Draw list decoding.

use super::{BoundState, DrawField, DrawFields, DrawRange, RANGE_WORDS};

/// A decoded draw: the full bound state and which fields changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedDraw {
    /// Fields rebound by this draw.
    pub changed: DrawFields,
    /// Complete state in effect for this draw.
    pub state: BoundState,
    /// Draw range.
    pub range: DrawRange,
}

/// Iterator over the draws of an encoded stream.
///
/// Streams only come from [`DrawListBuilder`](super::DrawListBuilder); a
/// truncated or malformed stream panics.
#[derive(Debug, Clone)]
pub struct DrawCommandIter<'a> {
    words: &'a [u32],
    cursor: usize,
    state: BoundState,
}

impl<'a> DrawCommandIter<'a> {
    /// Decode `words` starting from [`BoundState::INITIAL`].
    pub fn new(words: &'a [u32]) -> Self {
        Self {
            words,
            cursor: 0,
            state: BoundState::INITIAL,
        }
    }

    fn next_word(&mut self) -> u32 {
        let Some(&word) = self.words.get(self.cursor) else {
            panic!("truncated draw command list at word {}", self.cursor);
        };
        self.cursor += 1;
        word
    }
}

impl Iterator for DrawCommandIter<'_> {
    type Item = DecodedDraw;

    fn next(&mut self) -> Option<DecodedDraw> {
        if self.cursor >= self.words.len() {
            return None;
        }
        let mask = self.next_word();
        let Some(changed) = DrawFields::from_bits(mask) else {
            panic!("corrupt draw command mask {mask:#x}");
        };
        for field in DrawField::ALL {
            if changed.contains(field.flag()) {
                let value = self.next_word();
                self.state.set(field, value);
            }
        }
        let end = self.cursor + RANGE_WORDS;
        assert!(
            end <= self.words.len(),
            "truncated draw command list at word {}",
            self.cursor
        );
        let range = DrawRange::from_words(&self.words[self.cursor..end]);
        self.cursor = end;
        Some(DecodedDraw {
            changed,
            state: self.state,
            range,
        })
    }
}
