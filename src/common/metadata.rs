use std::ops::{Deref, Not};

use super::{codec::Mode, error::QRError, mask::MaskPattern};

// Color
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Color {
    Light,
    Dark,
}

impl From<bool> for Color {
    fn from(is_dark: bool) -> Self {
        if is_dark {
            Self::Dark
        } else {
            Self::Light
        }
    }
}

impl Not for Color {
    type Output = Self;
    fn not(self) -> Self::Output {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

// Error correction level
//------------------------------------------------------------------------------

/// Error correction level, in ascending order of protection.
///
/// The ordering is load bearing: ECC boosting only ever moves a level forward.
#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub enum ECLevel {
    /// Recovers ~7% of codewords.
    L = 0,
    /// Recovers ~15% of codewords.
    M = 1,
    /// Recovers ~25% of codewords.
    Q = 2,
    /// Recovers ~30% of codewords.
    H = 3,
}

impl ECLevel {
    pub const ALL: [ECLevel; 4] = [ECLevel::L, ECLevel::M, ECLevel::Q, ECLevel::H];

    // 2-bit indicator stored in the format information
    pub fn format_bits(self) -> u32 {
        match self {
            Self::L => 0b01,
            Self::M => 0b00,
            Self::Q => 0b11,
            Self::H => 0b10,
        }
    }
}

impl TryFrom<u8> for ECLevel {
    type Error = QRError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL.get(value as usize).copied().ok_or(QRError::InvalidECLevel)
    }
}

// Version
//------------------------------------------------------------------------------

/// Symbol version, in the range 1 to 40.
#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub struct Version(u8);

impl Version {
    pub const MIN: Version = Version(1);
    pub const MAX: Version = Version(40);

    /// # Panics
    ///
    /// Panics if `version` is outside 1..=40.
    pub const fn new(version: u8) -> Self {
        assert!(version >= 1 && version <= 40, "Version out of range");
        Self(version)
    }

    /// Side length in modules: `4 * version + 17`.
    pub const fn width(self) -> usize {
        self.0 as usize * 4 + 17
    }

    pub(crate) fn next(self) -> Option<Self> {
        (self.0 < Self::MAX.0).then(|| Self(self.0 + 1))
    }

    /// Number of modules available for codewords once all function patterns are drawn,
    /// remainder bits included.
    pub fn raw_data_modules(self) -> usize {
        let v = self.0 as usize;
        let mut res = (16 * v + 128) * v + 64;
        if v >= 2 {
            let num_align = v / 7 + 2;
            res -= (25 * num_align - 10) * num_align - 55;
            if v >= 7 {
                res -= 36;
            }
        }
        debug_assert!((208..=29648).contains(&res), "Raw data modules out of range: {res}");
        res
    }

    pub fn total_codewords(self) -> usize {
        self.raw_data_modules() >> 3
    }

    pub fn remainder_bits(self) -> usize {
        self.raw_data_modules() & 7
    }

    pub fn ecc_per_block(self, ecl: ECLevel) -> usize {
        ECC_CODEWORDS_PER_BLOCK[ecl as usize][self.0 as usize] as usize
    }

    pub fn num_blocks(self, ecl: ECLevel) -> usize {
        NUM_ERROR_CORRECTION_BLOCKS[ecl as usize][self.0 as usize] as usize
    }

    pub fn data_codewords(self, ecl: ECLevel) -> usize {
        self.total_codewords() - self.ecc_per_block(ecl) * self.num_blocks(ecl)
    }

    pub fn data_bit_capacity(self, ecl: ECLevel) -> usize {
        self.data_codewords(ecl) << 3
    }

    // Width of the character count field, by version tier 1-9, 10-26, 27-40
    pub fn char_cnt_bits(self, mode: Mode) -> usize {
        let tier = (self.0 as usize + 7) / 17;
        let bits = match mode {
            Mode::Numeric => [10, 12, 14],
            Mode::Alphanumeric => [9, 11, 13],
            Mode::Byte => [8, 16, 16],
            Mode::Kanji => [8, 10, 12],
            Mode::Eci => [0, 0, 0],
        };
        bits[tier]
    }

    /// Ascending centre coordinates of alignment patterns along either axis.
    pub fn alignment_pattern(self) -> Vec<usize> {
        let v = self.0 as usize;
        if v == 1 {
            return Vec::new();
        }
        let num_align = v / 7 + 2;
        let step = if v == 32 { 26 } else { (v * 4 + num_align * 2 + 1) / (num_align * 2 - 2) * 2 };
        let last = self.width() - 7;
        let mut res = Vec::with_capacity(num_align);
        res.push(6);
        res.extend((0..num_align - 1).rev().map(|i| last - i * step));
        res
    }

    // 6-bit version number followed by a 12-bit BCH remainder
    pub fn info(self) -> u32 {
        let ver = self.0 as u32;
        let mut rem = ver;
        for _ in 0..12 {
            rem = (rem << 1) ^ ((rem >> 11) * VERSION_INFO_POLY);
        }
        let res = (ver << 12) | rem;
        debug_assert!(res >> 18 == 0, "Version info overflow: {res:#x}");
        res
    }
}

impl Deref for Version {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<u8> for Version {
    type Error = QRError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(QRError::InvalidVersion)
        }
    }
}

// Format info
//------------------------------------------------------------------------------

// EC level and mask followed by a 10-bit BCH remainder, XORed with a fixed pattern
pub fn format_info(ecl: ECLevel, mask: MaskPattern) -> u32 {
    let data = (ecl.format_bits() << 3) | *mask as u32;
    let mut rem = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * FORMAT_INFO_POLY);
    }
    let res = ((data << 10) | rem) ^ FORMAT_INFO_MASK;
    debug_assert!(res >> 15 == 0, "Format info overflow: {res:#x}");
    res
}


// Global constants
//------------------------------------------------------------------------------

static VERSION_INFO_POLY: u32 = 0x1F25;

static FORMAT_INFO_POLY: u32 = 0x537;

static FORMAT_INFO_MASK: u32 = 0x5412;

// Indexed by [ec level][version], version 0 unused
static ECC_CODEWORDS_PER_BLOCK: [[u8; 41]; 4] = [
    [
        0, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        0, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ],
    [
        0, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
    [
        0, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ],
];

static NUM_ERROR_CORRECTION_BLOCKS: [[u8; 41]; 4] = [
    [
        0, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12, 13,
        14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ],
    [
        0, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ],
    [
        0, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27,
        29, 34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ],
    [
        0, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ],
];
