use std::ops::Deref;

use crate::common::{
    bitstream::BitStream,
    iter::EncRegionIter,
    mask::MaskPattern,
    metadata::{format_info, Color, ECLevel, Version},
};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum Module {
    Empty,
    Func(Color),
    Version(Color),
    Format(Color),
    Data(Color),
}

impl Deref for Module {
    type Target = Color;
    fn deref(&self) -> &Self::Target {
        match self {
            Module::Empty => &Color::Light,
            Module::Func(c) => c,
            Module::Version(c) => c,
            Module::Format(c) => c,
            Module::Data(c) => c,
        }
    }
}

/// A finished QR Code symbol: a square grid of dark and light modules.
///
/// Values are produced by [`crate::QRBuilder`] or the `encode_*` functions and never change
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QR {
    grid: Box<[Module]>,
    w: usize,
    ver: Version,
    ecl: ECLevel,
    mask: Option<MaskPattern>,
}

// QR type for builder
//------------------------------------------------------------------------------

impl QR {
    pub(crate) fn new(ver: Version, ecl: ECLevel) -> Self {
        let w = ver.width();
        Self { grid: vec![Module::Empty; w * w].into_boxed_slice(), w, ver, ecl, mask: None }
    }

    pub fn version(&self) -> Version {
        self.ver
    }

    pub fn width(&self) -> usize {
        self.w
    }

    /// Side length in modules, from 21 to 177.
    pub fn size(&self) -> i32 {
        self.w as i32
    }

    pub fn ec_level(&self) -> ECLevel {
        self.ecl
    }

    pub fn mask(&self) -> Option<MaskPattern> {
        self.mask
    }

    /// Returns true for a dark module at column `x` and row `y`. Coordinates outside the
    /// symbol read as light.
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        let w = self.w as i32;
        if !(0..w).contains(&x) || !(0..w).contains(&y) {
            return false;
        }
        *self.grid[(y * w + x) as usize] == Color::Dark
    }

    pub fn count_dark_modules(&self) -> usize {
        self.grid.iter().filter(|&m| matches!(**m, Color::Dark)).count()
    }

    /// Packs the grid into bytes: the side length, then one bit per module in row-major order
    /// with module `i` at bit `i % 8` of byte `1 + i / 8`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut res = vec![0; 1 + (self.grid.len() + 7) / 8];
        res[0] = self.w as u8;
        for (i, m) in self.grid.iter().enumerate() {
            if **m == Color::Dark {
                res[1 + (i >> 3)] |= 1 << (i & 7);
            }
        }
        res
    }

    #[cfg(test)]
    pub fn to_debug_str(&self) -> String {
        let w = self.w as i16;
        let mut res = String::with_capacity((w * (w + 1)) as usize);
        res.push('\n');
        for i in 0..w {
            for j in 0..w {
                let c = match self.get(i, j) {
                    Module::Empty => '.',
                    Module::Func(Color::Dark) => 'f',
                    Module::Func(Color::Light) => 'F',
                    Module::Version(Color::Dark) => 'v',
                    Module::Version(Color::Light) => 'V',
                    Module::Format(Color::Dark) => 'm',
                    Module::Format(Color::Light) => 'M',
                    Module::Data(Color::Dark) => 'd',
                    Module::Data(Color::Light) => 'D',
                };
                res.push(c);
            }
            res.push('\n');
        }
        res
    }

    fn coord_to_index(&self, r: i16, c: i16) -> usize {
        let w = self.w as i16;
        debug_assert!(-w <= r && r < w, "Row out of bounds: {r}");
        debug_assert!(-w <= c && c < w, "Column out of bounds: {c}");

        let r = if r < 0 { r + w } else { r };
        let c = if c < 0 { c + w } else { c };
        (r as usize) * self.w + c as usize
    }

    pub(crate) fn get(&self, r: i16, c: i16) -> Module {
        self.grid[self.coord_to_index(r, c)]
    }

    pub(crate) fn get_mut(&mut self, r: i16, c: i16) -> &mut Module {
        let index = self.coord_to_index(r, c);
        &mut self.grid[index]
    }

    pub(crate) fn set(&mut self, r: i16, c: i16, module: Module) {
        *self.get_mut(r, c) = module;
    }
}


// Finder pattern
//------------------------------------------------------------------------------

impl QR {
    fn draw_finder_patterns(&mut self) {
        self.draw_finder_pattern_at(3, 3);
        self.draw_finder_pattern_at(3, -4);
        self.draw_finder_pattern_at(-4, 3);
    }

    // Includes the light separator on the sides facing the symbol
    fn draw_finder_pattern_at(&mut self, r: i16, c: i16) {
        let (dr_top, dr_bottom) = if r > 0 { (-3, 4) } else { (-4, 3) };
        let (dc_left, dc_right) = if c > 0 { (-3, 4) } else { (-4, 3) };
        for i in dr_top..=dr_bottom {
            for j in dc_left..=dc_right {
                self.set(
                    r + i,
                    c + j,
                    match (i, j) {
                        (4 | -4, _) | (_, 4 | -4) => Module::Func(Color::Light),
                        (3 | -3, _) | (_, 3 | -3) => Module::Func(Color::Dark),
                        (2 | -2, _) | (_, 2 | -2) => Module::Func(Color::Light),
                        _ => Module::Func(Color::Dark),
                    },
                );
            }
        }
    }
}


// Timing pattern
//------------------------------------------------------------------------------

impl QR {
    fn draw_timing_pattern(&mut self) {
        let last = self.w as i16 - 9;
        self.draw_line(6, 8, 6, last);
        self.draw_line(8, 6, last, 6);
    }

    fn draw_line(&mut self, r1: i16, c1: i16, r2: i16, c2: i16) {
        debug_assert!(r1 == r2 || c1 == c2, "Line is neither vertical nor horizontal");

        if r1 == r2 {
            for j in c1..=c2 {
                self.set(r1, j, Module::Func(Color::from(j & 1 == 0)));
            }
        } else {
            for i in r1..=r2 {
                self.set(i, c1, Module::Func(Color::from(i & 1 == 0)));
            }
        }
    }
}


// Alignment pattern
//------------------------------------------------------------------------------

impl QR {
    fn draw_alignment_patterns(&mut self) {
        let poses = self.ver.alignment_pattern();
        for &r in &poses {
            for &c in &poses {
                self.draw_alignment_pattern_at(r as i16, c as i16)
            }
        }
    }

    fn draw_alignment_pattern_at(&mut self, r: i16, c: i16) {
        let w = self.w as i16;
        // Overlaps a finder pattern
        if (r == 6 && (c == 6 || c - w == -7)) || (r - w == -7 && c == 6) {
            return;
        }
        for i in -2..=2 {
            for j in -2..=2 {
                self.set(
                    r + i,
                    c + j,
                    match (i, j) {
                        (-2 | 2, _) | (_, -2 | 2) | (0, 0) => Module::Func(Color::Dark),
                        _ => Module::Func(Color::Light),
                    },
                )
            }
        }
    }
}


// Format & version info
//------------------------------------------------------------------------------

impl QR {
    // Placeholder bits keep the area out of codeword placement until a mask is chosen
    fn reserve_format_area(&mut self) {
        let all_on = (1 << FORMAT_INFO_BIT_LEN) - 1;
        self.draw_number(
            all_on,
            FORMAT_INFO_BIT_LEN,
            Module::Format(Color::Light),
            Module::Format(Color::Dark),
            &FORMAT_INFO_COORDS_MAIN,
        );
        self.draw_number(
            all_on,
            FORMAT_INFO_BIT_LEN,
            Module::Format(Color::Light),
            Module::Format(Color::Dark),
            &FORMAT_INFO_COORDS_SIDE,
        );
        // Dark module
        self.set(-8, 8, Module::Func(Color::Dark));
    }

    pub(crate) fn draw_format_info(&mut self, mask: MaskPattern) {
        let info = format_info(self.ecl, mask);
        self.draw_number(
            info,
            FORMAT_INFO_BIT_LEN,
            Module::Format(Color::Light),
            Module::Format(Color::Dark),
            &FORMAT_INFO_COORDS_MAIN,
        );
        self.draw_number(
            info,
            FORMAT_INFO_BIT_LEN,
            Module::Format(Color::Light),
            Module::Format(Color::Dark),
            &FORMAT_INFO_COORDS_SIDE,
        );
    }

    fn draw_version_info(&mut self) {
        if *self.ver < 7 {
            return;
        }
        let ver_info = self.ver.info();
        self.draw_number(
            ver_info,
            VERSION_INFO_BIT_LEN,
            Module::Version(Color::Light),
            Module::Version(Color::Dark),
            &VERSION_INFO_COORDS_BL,
        );
        self.draw_number(
            ver_info,
            VERSION_INFO_BIT_LEN,
            Module::Version(Color::Light),
            Module::Version(Color::Dark),
            &VERSION_INFO_COORDS_TR,
        );
    }

    // Writes `number` MSB first, one bit per coordinate
    fn draw_number(
        &mut self,
        number: u32,
        bit_len: usize,
        off_clr: Module,
        on_clr: Module,
        coords: &[(i16, i16)],
    ) {
        debug_assert!(coords.len() == bit_len, "Coordinate count {} != {bit_len}", coords.len());

        let mut mask = 1 << (bit_len - 1);
        for (r, c) in coords {
            if number & mask == 0 {
                self.set(*r, *c, off_clr);
            } else {
                self.set(*r, *c, on_clr);
            }
            mask >>= 1;
        }
    }
}


// All function patterns
//------------------------------------------------------------------------------

impl QR {
    pub(crate) fn draw_all_function_patterns(&mut self) {
        self.draw_finder_patterns();
        self.draw_timing_pattern();
        self.draw_alignment_patterns();
        self.draw_version_info();
        self.reserve_format_area();
    }
}

// Encoding region
//------------------------------------------------------------------------------

impl QR {
    /// Places `payload` bits in zigzag order over every non-function module. Remainder modules
    /// past the payload stay light.
    pub(crate) fn draw_payload(&mut self, payload: BitStream) {
        let mut coords = EncRegionIter::new(self.ver);
        for bit in payload {
            let module = Module::Data(Color::from(bit));
            for (r, c) in coords.by_ref() {
                if matches!(self.get(r, c), Module::Empty) {
                    self.set(r, c, module);
                    break;
                }
            }
        }
        self.fill_remainder_bits(coords);

        debug_assert!(!self.grid.contains(&Module::Empty), "Empty module found after payload");
    }

    fn fill_remainder_bits(&mut self, coords: impl Iterator<Item = (i16, i16)>) {
        for (r, c) in coords {
            if matches!(self.get(r, c), Module::Empty) {
                self.set(r, c, Module::Data(Color::Light));
            }
        }
    }

    // Self inverse
    pub(crate) fn toggle_mask(&mut self, pattern: MaskPattern) {
        let mask_fn = pattern.mask_functions();
        let w = self.w as i16;
        for r in 0..w {
            for c in 0..w {
                if mask_fn(r, c) {
                    if let Module::Data(clr) = self.get_mut(r, c) {
                        *clr = !*clr;
                    }
                }
            }
        }
    }

    pub(crate) fn apply_mask(&mut self, pattern: MaskPattern) {
        debug_assert!(self.mask.is_none(), "Mask already applied: {:?}", self.mask);

        self.toggle_mask(pattern);
        self.draw_format_info(pattern);
        self.mask = Some(pattern);
    }
}

#[cfg(test)]
mod encoding_region_tests {
    use crate::builder::{ec::ecc_and_interleave, Module, QR};
    use crate::common::{
        bitstream::BitStream,
        iter::EncRegionIter,
        mask::{apply_best_mask, MaskPattern},
        metadata::{Color, ECLevel, Version},
    };

    fn numeric_01234567() -> Vec<u8> {
        let data = [
            0x10, 0x20, 0x0C, 0x56, 0x61, 0x80, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11,
            0xEC, 0x11,
        ];
        ecc_and_interleave(&data, Version::new(1), ECLevel::M)
    }

    // Unmasks the data modules and reads them back in placement order
    fn read_payload(qr: &QR) -> Vec<u8> {
        let mask_fn = qr.mask().map(|m| m.mask_functions());
        let bits = EncRegionIter::new(qr.version())
            .filter_map(|(r, c)| match qr.get(r, c) {
                Module::Data(clr) => {
                    let flip = mask_fn.is_some_and(|f| f(r, c));
                    Some((clr == Color::Dark) ^ flip)
                }
                _ => None,
            })
            .collect::<Vec<_>>();
        bits.chunks_exact(8).map(|b| b.iter().fold(0, |acc, &x| (acc << 1) | x as u8)).collect()
    }

    #[test]
    fn test_draw_payload() {
        let codewords = numeric_01234567();
        let mut qr = QR::new(Version::new(1), ECLevel::M);
        qr.draw_all_function_patterns();
        qr.draw_payload(BitStream::from(&codewords));
        assert_eq!(read_payload(&qr), codewords);
    }

    #[test]
    fn test_remainder_bits_are_light() {
        let ver = Version::new(2);
        let mut qr = QR::new(ver, ECLevel::L);
        qr.draw_all_function_patterns();
        qr.draw_payload(BitStream::from(&vec![0xFF; ver.total_codewords()]));
        let dark_data = EncRegionIter::new(ver)
            .filter(|(r, c)| qr.get(*r, *c) == Module::Data(Color::Dark))
            .count();
        assert_eq!(dark_data, ver.total_codewords() * 8);
        assert_eq!(ver.raw_data_modules() - dark_data, ver.remainder_bits());
    }

    #[test]
    fn test_mask_round_trip() {
        let codewords = numeric_01234567();
        for m in 0..8 {
            let mut qr = QR::new(Version::new(1), ECLevel::M);
            qr.draw_all_function_patterns();
            qr.draw_payload(BitStream::from(&codewords));
            let unmasked = qr.clone();

            let mask = MaskPattern::new(m);
            qr.toggle_mask(mask);
            assert_ne!(qr, unmasked, "Mask {m}");
            qr.toggle_mask(mask);
            assert_eq!(qr, unmasked, "Mask {m}");

            qr.apply_mask(mask);
            assert_eq!(qr.mask(), Some(mask));
            assert_eq!(read_payload(&qr), codewords, "Mask {m}");
        }
    }

    #[test]
    fn test_full_symbol_01234567_m() {
        let mut qr = QR::new(Version::new(1), ECLevel::M);
        qr.draw_all_function_patterns();
        qr.draw_payload(BitStream::from(&numeric_01234567()));
        assert_eq!(apply_best_mask(&mut qr), MaskPattern::new(0));
        assert_eq!(
            qr.to_debug_str(),
            "\n\
             fffffffFMDdddFfffffff\n\
             fFFFFFfFmddDDFfFFFFFf\n\
             fFfffFfFMddDDFfFfffFf\n\
             fFfffFfFMdDddFfFfffFf\n\
             fFfffFfFmdDddFfFfffFf\n\
             fFFFFFfFMDDdDFfFFFFFf\n\
             fffffffFfFfFfFfffffff\n\
             FFFFFFFFMDDDDFFFFFFFF\n\
             mMmMmMfMMDdDdMMMmMMmM\n\
             ddDdDDFDdDddDdDdDDDdD\n\
             DDDddDfddDddDdddDdddD\n\
             ddDDddFdDdDdddDddDDdD\n\
             DDdDDdfdDdddDdddDDDDd\n\
             FFFFFFFFfDdDDDdDDDDdD\n\
             fffffffFMDDDdDDDdDDDd\n\
             fFFFFFfFMDdDDDdDDdDdd\n\
             fFfffFfFmddDdDdDdddDd\n\
             fFfffFfFMdDdDdDdDdddD\n\
             fFfffFfFmdDdDdddDDdDd\n\
             fFFFFFfFMDDdddDdddDDD\n\
             fffffffFmDDdDdddDDdDd\n"
        );
    }
}

// Global constants
//------------------------------------------------------------------------------

static FORMAT_INFO_BIT_LEN: usize = 15;

static VERSION_INFO_BIT_LEN: usize = 18;

// (row, column) pairs, most significant bit first
static FORMAT_INFO_COORDS_MAIN: [(i16, i16); 15] = [
    (8, 0),
    (8, 1),
    (8, 2),
    (8, 3),
    (8, 4),
    (8, 5),
    (8, 7),
    (8, 8),
    (7, 8),
    (5, 8),
    (4, 8),
    (3, 8),
    (2, 8),
    (1, 8),
    (0, 8),
];

static FORMAT_INFO_COORDS_SIDE: [(i16, i16); 15] = [
    (-1, 8),
    (-2, 8),
    (-3, 8),
    (-4, 8),
    (-5, 8),
    (-6, 8),
    (-7, 8),
    (8, -8),
    (8, -7),
    (8, -6),
    (8, -5),
    (8, -4),
    (8, -3),
    (8, -2),
    (8, -1),
];

static VERSION_INFO_COORDS_BL: [(i16, i16); 18] = [
    (-9, 5),
    (-10, 5),
    (-11, 5),
    (-9, 4),
    (-10, 4),
    (-11, 4),
    (-9, 3),
    (-10, 3),
    (-11, 3),
    (-9, 2),
    (-10, 2),
    (-11, 2),
    (-9, 1),
    (-10, 1),
    (-11, 1),
    (-9, 0),
    (-10, 0),
    (-11, 0),
];

static VERSION_INFO_COORDS_TR: [(i16, i16); 18] = [
    (5, -9),
    (5, -10),
    (5, -11),
    (4, -9),
    (4, -10),
    (4, -11),
    (3, -9),
    (3, -10),
    (3, -11),
    (2, -9),
    (2, -10),
    (2, -11),
    (1, -9),
    (1, -10),
    (1, -11),
    (0, -9),
    (0, -10),
    (0, -11),
];
