//! Word-level bitmap helpers.
//!
//! Bitmaps are stored as slices of little-endian `u64` words: bit `i` lives
//! in word `i / 64` at position `i % 64`. This module contains the location
//! arithmetic shared by fixed-width bitmaps and [`BitsIterator`] that walks
//! set bits in ascending order.

/// Number of bits in a single storage word.
pub const WORD_BITS: usize = u64::BITS as usize;

/// Returns the number of words required to hold `width` bits.
#[inline]
pub const fn words_for(width: usize) -> usize {
    width.div_ceil(WORD_BITS)
}

/// Returns the word index and the single-bit mask addressing `bit`.
#[inline]
pub const fn location(bit: usize) -> (usize, u64) {
    (bit / WORD_BITS, 1 << (bit % WORD_BITS))
}

/// Returns the mask of meaningful bits in the last word of a `width`-bit
/// bitmap.
///
/// All ones when `width` is a multiple of [`WORD_BITS`].
#[inline]
pub const fn tail_mask(width: usize) -> u64 {
    match width % WORD_BITS {
        0 => u64::MAX,
        rem => (1 << rem) - 1,
    }
}

/// Iterator over indices of set bits in a word slice.
///
/// Iteration is performed from the least significant bit of the first word
/// to the most significant bit of the last one, so indices come out in
/// ascending order.
#[derive(Debug, Clone)]
pub struct BitsIterator<'a> {
    words: &'a [u64],
    base: usize,
    word: u64,
}

impl<'a> BitsIterator<'a> {
    /// Constructs a new [`BitsIterator`] over the given words.
    #[inline]
    pub fn new(words: &'a [u64]) -> Self {
        match words.split_first() {
            Some((&word, rest)) => Self { words: rest, base: 0, word },
            None => Self { words, base: 0, word: 0 },
        }
    }
}

impl Iterator for BitsIterator<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        while self.word == 0 {
            let (&word, rest) = self.words.split_first()?;
            self.words = rest;
            self.base += WORD_BITS;
            self.word = word;
        }

        let r = self.word.trailing_zeros() as usize;
        // Isolates the lowest set bit. Combined with the `xor` below this
        // compiles to a single `blsr` instead of a shift.
        let t = self.word & self.word.wrapping_neg();
        self.word ^= t;

        Some(self.base + r)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest: usize = self.words.iter().map(|w| w.count_ones() as usize).sum();
        let len = rest + self.word.count_ones() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for BitsIterator<'_> {}
