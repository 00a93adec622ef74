use encoding_rs::SHIFT_JIS;

use crate::common::{
    bitstream::BitStream,
    error::{QRError, QRResult},
};

// Mode
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Mode {
    Numeric = 0b0001,
    Alphanumeric = 0b0010,
    Byte = 0b0100,
    Kanji = 0b1000,
    Eci = 0b0111,
}

impl Mode {
    #[inline]
    fn numeric_digit(char: u8) -> u16 {
        debug_assert!(Mode::Numeric.contains(char), "Invalid numeric data: {char}");
        (char - b'0') as u16
    }

    #[inline]
    fn alphanumeric_digit(char: u8) -> u16 {
        debug_assert!(Mode::Alphanumeric.contains(char), "Invalid alphanumeric data: {char}");
        match char {
            b'0'..=b'9' => (char - b'0') as u16,
            b'A'..=b'Z' => (char - b'A' + 10) as u16,
            b' ' => 36,
            b'$' => 37,
            b'%' => 38,
            b'*' => 39,
            b'+' => 40,
            b'-' => 41,
            b'.' => 42,
            b'/' => 43,
            b':' => 44,
            _ => unreachable!("Invalid alphanumeric {char}"),
        }
    }

    // Maps a two byte Shift_JIS code to its 13-bit kanji value
    #[inline]
    fn kanji_value(sjis: u16) -> Option<u16> {
        let offset = match sjis {
            0x8140..=0x9FFC => sjis - 0x8140,
            0xE040..=0xEBBF => sjis - 0xC140,
            _ => return None,
        };
        Some((offset >> 8) * 0xC0 + (offset & 0xFF))
    }

    /// Packs a chunk of raw characters into its encoded value.
    ///
    /// Chunks hold up to 3 digits in numeric mode, up to 2 characters in alphanumeric mode,
    /// a single byte in byte mode and a single two byte Shift_JIS code in kanji mode.
    pub fn encode_chunk(&self, data: &[u8]) -> u16 {
        let len = data.len();
        match self {
            Self::Numeric => {
                debug_assert!(len <= 3, "Data is too long for numeric conversion: {len}");
                data.iter().fold(0_u16, |n, b| n * 10 + Self::numeric_digit(*b))
            }
            Self::Alphanumeric => {
                debug_assert!(len <= 2, "Data is too long for alphanumeric conversion: {len}");
                data.iter().fold(0_u16, |n, b| n * 45 + Self::alphanumeric_digit(*b))
            }
            Self::Byte => {
                debug_assert!(len == 1, "Data is too long for byte conversion: {len}");
                data[0] as u16
            }
            Self::Kanji => {
                debug_assert!(len == 2, "Kanji chunk must be 2 bytes: {len}");
                let sjis = (data[0] as u16) << 8 | data[1] as u16;
                Self::kanji_value(sjis).unwrap_or_else(|| unreachable!("Invalid kanji {sjis:#x}"))
            }
            Self::Eci => unreachable!("Cannot encode chunk in ECI mode"),
        }
    }

    /// Whether `byte` belongs to the single byte charset of the mode. Kanji and ECI have none.
    pub fn contains(&self, byte: u8) -> bool {
        match self {
            Self::Numeric => byte.is_ascii_digit(),
            Self::Alphanumeric => {
                matches!(byte, b'0'..=b'9' | b'A'..=b'Z' | b' ' | b'$' | b'%' | b'*' | b'+' | b'-' | b'.' | b'/' | b':')
            }
            Self::Byte => true,
            Self::Kanji | Self::Eci => false,
        }
    }

    // Bit length of `len` characters. ECI is its 24 bit worst case.
    pub fn encoded_len(&self, len: usize) -> usize {
        match *self {
            Self::Numeric => (len * 10).div_ceil(3),
            Self::Alphanumeric => (len * 11).div_ceil(2),
            Self::Byte => len * 8,
            Self::Kanji => len * 13,
            Self::Eci => 24,
        }
    }
}


// Segment
//------------------------------------------------------------------------------

/// A run of characters encoded in one mode, ready to be framed with its mode indicator and
/// character count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    mode: Mode,
    num_chars: usize,
    bits: BitStream,
}

impl Segment {
    /// Wraps pre-encoded `bits`.
    ///
    /// The bit length must be exactly what `num_chars` characters cost in `mode`. ECI segments
    /// carry zero characters and an 8, 16 or 24 bit designator.
    pub fn new(mode: Mode, num_chars: usize, bits: BitStream) -> QRResult<Self> {
        let bit_len = bits.len();
        if bit_len > MAX_BIT_LEN {
            return Err(QRError::SegmentOverflow);
        }
        let valid_len = match mode {
            Mode::Eci if num_chars != 0 => return Err(QRError::InvalidEciDesignator),
            Mode::Eci => matches!(bit_len, 8 | 16 | 24),
            _ => Self::calc_bit_length(mode, num_chars) == Some(bit_len),
        };
        if !valid_len {
            return Err(QRError::InvalidSegmentLength);
        }
        Ok(Self { mode, num_chars, bits })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn num_chars(&self) -> usize {
        self.num_chars
    }

    pub fn bits(&self) -> &BitStream {
        &self.bits
    }

    /// Bit length of the payload for `num_chars` characters, or `None` past the 15-bit limit.
    pub fn calc_bit_length(mode: Mode, num_chars: usize) -> Option<usize> {
        if num_chars > MAX_BIT_LEN {
            return None;
        }
        let res = mode.encoded_len(num_chars);
        (res <= MAX_BIT_LEN).then_some(res)
    }

    pub fn calc_buffer_size(mode: Mode, num_chars: usize) -> Option<usize> {
        Self::calc_bit_length(mode, num_chars).map(|b| b.div_ceil(8))
    }

    pub fn is_numeric(text: &str) -> bool {
        text.bytes().all(|b| Mode::Numeric.contains(b))
    }

    pub fn is_alphanumeric(text: &str) -> bool {
        text.bytes().all(|b| Mode::Alphanumeric.contains(b))
    }

    pub fn is_kanji(text: &str) -> bool {
        text.chars().all(|c| to_sjis(c).and_then(Mode::kanji_value).is_some())
    }
}

// Two byte Shift_JIS code of `c`, if it has one
fn to_sjis(c: char) -> Option<u16> {
    let mut buf = [0; 4];
    let (bytes, _, had_errors) = SHIFT_JIS.encode(c.encode_utf8(&mut buf));
    match (had_errors, &*bytes) {
        (false, &[hi, lo]) => Some((hi as u16) << 8 | lo as u16),
        _ => None,
    }
}

// Segment factories
//------------------------------------------------------------------------------

impl Segment {
    pub fn make_bytes(data: &[u8]) -> QRResult<Self> {
        let bit_len =
            Self::calc_bit_length(Mode::Byte, data.len()).ok_or(QRError::SegmentOverflow)?;
        let mut bits = BitStream::new(bit_len);
        data.iter().for_each(|&b| bits.push_bits(Mode::Byte.encode_chunk(&[b]), 8));
        Self::new(Mode::Byte, data.len(), bits)
    }

    pub fn make_numeric(text: &str) -> QRResult<Self> {
        if !Self::is_numeric(text) {
            return Err(QRError::InvalidChar);
        }
        let bit_len =
            Self::calc_bit_length(Mode::Numeric, text.len()).ok_or(QRError::SegmentOverflow)?;
        let mut bits = BitStream::new(bit_len);
        for chunk in text.as_bytes().chunks(3) {
            let len = Mode::Numeric.encoded_len(chunk.len());
            bits.push_bits(Mode::Numeric.encode_chunk(chunk), len);
        }
        Self::new(Mode::Numeric, text.len(), bits)
    }

    pub fn make_alphanumeric(text: &str) -> QRResult<Self> {
        if !Self::is_alphanumeric(text) {
            return Err(QRError::InvalidChar);
        }
        let bit_len = Self::calc_bit_length(Mode::Alphanumeric, text.len())
            .ok_or(QRError::SegmentOverflow)?;
        let mut bits = BitStream::new(bit_len);
        for chunk in text.as_bytes().chunks(2) {
            let len = Mode::Alphanumeric.encoded_len(chunk.len());
            bits.push_bits(Mode::Alphanumeric.encode_chunk(chunk), len);
        }
        Self::new(Mode::Alphanumeric, text.len(), bits)
    }

    /// Encodes text whose every character is a double byte Shift_JIS kanji.
    pub fn make_kanji(text: &str) -> QRResult<Self> {
        let codes =
            text.chars().map(to_sjis).collect::<Option<Vec<_>>>().ok_or(QRError::InvalidChar)?;
        let bit_len =
            Self::calc_bit_length(Mode::Kanji, codes.len()).ok_or(QRError::SegmentOverflow)?;
        let mut bits = BitStream::new(bit_len);
        for sjis in codes.iter() {
            let value = Mode::kanji_value(*sjis).ok_or(QRError::InvalidChar)?;
            bits.push_bits(value, 13);
        }
        Self::new(Mode::Kanji, codes.len(), bits)
    }

    /// Extended Channel Interpretation designator, below 1 000 000.
    pub fn make_eci(assign_val: u32) -> QRResult<Self> {
        let mut bits = BitStream::new(Mode::Eci.encoded_len(0));
        if assign_val < 1 << 7 {
            bits.push_bits(assign_val as u8, 8);
        } else if assign_val < 1 << 14 {
            bits.push_bits(0b10_u8, 2);
            bits.push_bits(assign_val as u16, 14);
        } else if assign_val < 1_000_000 {
            bits.push_bits(0b110_u8, 3);
            bits.push_bits((assign_val >> 16) as u8, 5);
            bits.push_bits((assign_val & 0xFFFF) as u16, 16);
        } else {
            return Err(QRError::InvalidEciDesignator);
        }
        Self::new(Mode::Eci, 0, bits)
    }

    /// Classifies `text` into a single numeric, alphanumeric or byte segment. Empty text makes
    /// no segments.
    pub fn make_segments(text: &str) -> QRResult<Vec<Self>> {
        let seg = if text.is_empty() {
            return Ok(Vec::new());
        } else if Self::is_numeric(text) {
            Self::make_numeric(text)?
        } else if Self::is_alphanumeric(text) {
            Self::make_alphanumeric(text)?
        } else {
            Self::make_bytes(text.as_bytes())?
        };
        Ok(vec![seg])
    }
}

#[cfg(test)]
mod segment_tests {
    use test_case::test_case;

    use super::{Mode, Segment, MAX_BIT_LEN};
    use crate::common::{bitstream::BitStream, error::QRError};

    #[test_case(Mode::Numeric, 3, Some(10))]
    #[test_case(Mode::Numeric, 7, Some(24))]
    #[test_case(Mode::Alphanumeric, 5, Some(28))]
    #[test_case(Mode::Byte, 4095, Some(32760))]
    #[test_case(Mode::Byte, 4096, None)]
    #[test_case(Mode::Kanji, 2520, Some(32760))]
    #[test_case(Mode::Kanji, 2521, None)]
    #[test_case(Mode::Numeric, MAX_BIT_LEN + 1, None)]
    #[test_case(Mode::Eci, 0, Some(24))]
    fn test_calc_bit_length(mode: Mode, num_chars: usize, exp: Option<usize>) {
        assert_eq!(Segment::calc_bit_length(mode, num_chars), exp);
    }

    #[test]
    fn test_calc_buffer_size() {
        assert_eq!(Segment::calc_buffer_size(Mode::Numeric, 4), Some(2));
        assert_eq!(Segment::calc_buffer_size(Mode::Byte, 3), Some(3));
        assert_eq!(Segment::calc_buffer_size(Mode::Byte, 5000), None);
    }

    #[test]
    fn test_classifiers() {
        assert!(Segment::is_numeric("0123456789"));
        assert!(!Segment::is_numeric("12a"));
        assert!(Segment::is_alphanumeric("HELLO WORLD $%*+-./:"));
        assert!(!Segment::is_alphanumeric("hello"));
        assert!(Segment::is_kanji("点茗"));
        assert!(!Segment::is_kanji("点A"));
        assert!(!Segment::is_kanji("ｱ"));
        assert!(Segment::is_numeric(""));
    }

    #[test]
    fn test_make_numeric() {
        let seg = Segment::make_numeric("01234567").unwrap();
        assert_eq!(seg.mode(), Mode::Numeric);
        assert_eq!(seg.num_chars(), 8);
        assert_eq!(seg.bits().len(), 27);
        assert_eq!(seg.bits().data(), [0b00000011, 0b00010101, 0b10011000, 0b01100000]);
    }

    #[test]
    fn test_make_alphanumeric() {
        let seg = Segment::make_alphanumeric("AC-42").unwrap();
        assert_eq!(seg.num_chars(), 5);
        assert_eq!(seg.bits().len(), 28);
        assert_eq!(seg.bits().data(), [0b00111001, 0b11011100, 0b11100100, 0b00100000]);
    }

    #[test]
    fn test_make_bytes() {
        let seg = Segment::make_bytes(&[0x61, 0xFF]).unwrap();
        assert_eq!(seg.mode(), Mode::Byte);
        assert_eq!(seg.bits().data(), [0x61, 0xFF]);
        let seg = Segment::make_bytes(&[]).unwrap();
        assert!(seg.bits().is_empty());
    }

    #[test]
    fn test_make_kanji() {
        let seg = Segment::make_kanji("点茗").unwrap();
        assert_eq!(seg.mode(), Mode::Kanji);
        assert_eq!(seg.num_chars(), 2);
        assert_eq!(seg.bits().len(), 26);
        // 0x0D9F then 0x1AAA, 13 bits each
        assert_eq!(seg.bits().data(), [0b01101100, 0b11111110, 0b10101010, 0b10000000]);
    }

    #[test_case(0, &[0x00], 8)]
    #[test_case(127, &[0x7F], 8)]
    #[test_case(128, &[0b10000000, 0b10000000], 16)]
    #[test_case(16383, &[0b10111111, 0xFF], 16)]
    #[test_case(16384, &[0b11000000, 0b01000000, 0x00], 24)]
    #[test_case(999_999, &[0b11001111, 0b01000010, 0b00111111], 24)]
    fn test_make_eci(val: u32, exp: &[u8], exp_len: usize) {
        let seg = Segment::make_eci(val).unwrap();
        assert_eq!(seg.mode(), Mode::Eci);
        assert_eq!(seg.num_chars(), 0);
        assert_eq!(seg.bits().len(), exp_len);
        assert_eq!(seg.bits().data(), exp);
    }

    #[test]
    fn test_factory_errors() {
        assert_eq!(Segment::make_numeric("12a"), Err(QRError::InvalidChar));
        assert_eq!(Segment::make_alphanumeric("abc"), Err(QRError::InvalidChar));
        assert_eq!(Segment::make_kanji("abc"), Err(QRError::InvalidChar));
        assert_eq!(Segment::make_eci(1_000_000), Err(QRError::InvalidEciDesignator));
        assert_eq!(Segment::make_bytes(&[0; 4096]), Err(QRError::SegmentOverflow));
        assert_eq!(
            Segment::new(Mode::Eci, 1, BitStream::new(8)),
            Err(QRError::InvalidEciDesignator)
        );
    }

    #[test_case(Mode::Numeric, 5, 0; "numeric without data")]
    #[test_case(Mode::Numeric, 4, 13; "numeric short")]
    #[test_case(Mode::Alphanumeric, 3, 18; "alphanumeric long")]
    #[test_case(Mode::Byte, 2, 8; "byte short")]
    #[test_case(Mode::Kanji, 1, 16; "kanji long")]
    #[test_case(Mode::Eci, 0, 12; "eci odd width")]
    #[test_case(Mode::Eci, 0, 0; "eci empty")]
    fn test_new_rejects_length_mismatch(mode: Mode, num_chars: usize, bit_len: usize) {
        let mut bits = BitStream::new(bit_len);
        (0..bit_len).for_each(|_| bits.push(true));
        assert_eq!(Segment::new(mode, num_chars, bits), Err(QRError::InvalidSegmentLength));
    }

    #[test_case(Mode::Numeric, 4, 14)]
    #[test_case(Mode::Alphanumeric, 3, 17)]
    #[test_case(Mode::Byte, 2, 16)]
    #[test_case(Mode::Kanji, 1, 13)]
    #[test_case(Mode::Eci, 0, 16)]
    #[test_case(Mode::Byte, 0, 0)]
    fn test_new_accepts_exact_length(mode: Mode, num_chars: usize, bit_len: usize) {
        let mut bits = BitStream::new(bit_len);
        (0..bit_len).for_each(|_| bits.push(false));
        let seg = Segment::new(mode, num_chars, bits).unwrap();
        assert_eq!(seg.bits().len(), bit_len);
    }

    #[test]
    fn test_make_segments() {
        assert!(Segment::make_segments("").unwrap().is_empty());
        let modes = |t: &str| {
            Segment::make_segments(t).unwrap().iter().map(|s| s.mode()).collect::<Vec<_>>()
        };
        assert_eq!(modes("314159"), vec![Mode::Numeric]);
        assert_eq!(modes("HELLO WORLD"), vec![Mode::Alphanumeric]);
        assert_eq!(modes("Hello, world!"), vec![Mode::Byte]);
        assert_eq!(modes("点茗"), vec![Mode::Byte]);
    }
}

// Global constants
//------------------------------------------------------------------------------

// Largest bit length representable in the 15-bit budget
pub static MAX_BIT_LEN: usize = 32767;

pub static PADDING_CODEWORDS: [u8; 2] = [0b1110_1100, 0b0001_0001];
