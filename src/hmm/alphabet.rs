//! Amino acid alphabet shared by the profile estimator, the aligner and the
//! consensus generator.
//!
//! The order of [`AMINO_ACIDS`] defines the emission matrix columns and is
//! also the tie-breaking order used when picking the most probable residue.

pub const ALPHABET_SIZE: usize = 20;

/// Amino acids in emission column order
pub const AMINO_ACIDS: [u8; ALPHABET_SIZE] = *b"ACDEFGHIKLMNPQRSTVWY";

pub const GAP: u8 = b'-';

/// Ambiguous residue; allowed in training alignments but never counted
pub const UNKNOWN: u8 = b'X';

const NOT_IN_ALPHABET: u8 = u8::MAX;

const SYMBOL_TO_INDEX: [u8; 256] = {
    let mut table = [NOT_IN_ALPHABET; 256];
    let mut index = 0;
    while index < ALPHABET_SIZE {
        table[AMINO_ACIDS[index] as usize] = index as u8;
        index += 1;
    }
    table
};

/// Emission column of an amino acid, `None` for anything outside the alphabet
/// (including the gap and `X`).
#[inline]
pub fn amino_acid_index(symbol: u8) -> Option<usize> {
    match SYMBOL_TO_INDEX[symbol as usize] {
        NOT_IN_ALPHABET => None,
        index => Some(index as usize),
    }
}

#[inline]
pub fn amino_acid_symbol(index: usize) -> u8 {
    AMINO_ACIDS[index]
}

/// Symbols accepted in a training alignment column
#[inline]
pub fn is_alignment_symbol(symbol: u8) -> bool {
    symbol == GAP || symbol == UNKNOWN || amino_acid_index(symbol).is_some()
}
