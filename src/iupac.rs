//! IUPAC nucleotide ambiguity codes.
//!
//! Each symbol stands for a set of concrete bases, stored as a 4-bit mask
//! (`A = 0b0001`, `C = 0b0010`, `G = 0b0100`, `T = 0b1000`). Two symbols are
//! compatible when their masks intersect.

use crate::errors::*;

/// The recognized alphabet, in uppercase.
pub static IUPAC_SYMBOLS: [u8; 15] = *b"ACGTRYSWKMBDHVN";

static NUC: [u8; 4] = [b'A', b'C', b'G', b'T'];

const A: u8 = 0b0001;
const C: u8 = 0b0010;
const G: u8 = 0b0100;
const T: u8 = 0b1000;

// 0 marks a byte outside the alphabet
static MASK_LUT: [u8; 256] = {
    let mut l = [0u8; 256];
    let pairs: [(u8, u8); 15] = [
        (b'A', A),
        (b'C', C),
        (b'G', G),
        (b'T', T),
        (b'R', A | G),
        (b'Y', C | T),
        (b'S', C | G),
        (b'W', A | T),
        (b'K', G | T),
        (b'M', A | C),
        (b'B', C | G | T),
        (b'D', A | G | T),
        (b'H', A | C | T),
        (b'V', A | C | G),
        (b'N', A | C | G | T),
    ];

    let mut i = 0;
    while i < pairs.len() {
        let (c, m) = pairs[i];
        l[c as usize] = m;
        l[c.to_ascii_lowercase() as usize] = m;
        i += 1;
    }

    l
};

static COMP_LUT: [u8; 256] = {
    let mut l = [0u8; 256];
    let pairs: [(u8, u8); 8] = [
        (b'A', b'T'),
        (b'C', b'G'),
        (b'R', b'Y'),
        (b'K', b'M'),
        (b'B', b'V'),
        (b'D', b'H'),
        (b'S', b'S'),
        (b'W', b'W'),
    ];

    let mut i = 0;
    while i < pairs.len() {
        let (a, b) = pairs[i];
        l[a as usize] = b;
        l[b as usize] = a;
        l[a.to_ascii_lowercase() as usize] = b.to_ascii_lowercase();
        l[b.to_ascii_lowercase() as usize] = a.to_ascii_lowercase();
        i += 1;
    }

    l[b'N' as usize] = b'N';
    l[b'n' as usize] = b'n';
    l
};

/// A non-empty subset of `{A, C, G, T}`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BaseSet(u8);

impl BaseSet {
    pub fn intersects(self, other: BaseSet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn contains(self, base: u8) -> bool {
        bases_of(base).is_some_and(|b| b.0 & !self.0 == 0)
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Swap `A`/`T` and `C`/`G`.
    pub fn complement(self) -> BaseSet {
        let m = self.0;
        BaseSet(((m & A) << 3) | ((m & T) >> 3) | ((m & C) << 1) | ((m & G) >> 1))
    }

    /// Concrete bases in `ACGT` order.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        NUC.into_iter()
            .enumerate()
            .filter(move |&(i, _)| self.0 & (1 << i) != 0)
            .map(|(_, b)| b)
    }
}

/// Bit mask of the bases a symbol represents, or 0 for bytes outside the alphabet.
#[inline(always)]
pub fn base_mask(symbol: u8) -> u8 {
    MASK_LUT[symbol as usize]
}

/// The set of concrete bases a symbol represents.
pub fn bases_of(symbol: u8) -> Option<BaseSet> {
    match base_mask(symbol) {
        0 => None,
        m => Some(BaseSet(m)),
    }
}

pub fn is_valid_symbol(symbol: u8) -> bool {
    base_mask(symbol) != 0
}

/// Complement of a symbol, keeping its case.
pub fn complement(symbol: u8) -> Option<u8> {
    match COMP_LUT[symbol as usize] {
        0 => None,
        c => Some(c),
    }
}

pub fn reverse_complement(seq: &[u8]) -> Option<Vec<u8>> {
    seq.iter().rev().map(|&c| complement(c)).collect()
}

/// Check that a barcode is non-empty and uses only IUPAC symbols.
pub fn validate_barcode(barcode: &[u8]) -> Result<()> {
    if barcode.is_empty() {
        return Err(Error::InvalidBarcode {
            barcode: String::new(),
            reason: "barcode is empty".to_owned(),
        });
    }

    if let Some(&c) = barcode.iter().find(|&&c| !is_valid_symbol(c)) {
        return Err(Error::InvalidBarcode {
            barcode: utf8(barcode),
            reason: format!("unrecognized symbol '{}'", c.escape_ascii()),
        });
    }

    Ok(())
}
