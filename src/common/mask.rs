use std::ops::Deref;

use tracing::{debug, trace};

use super::{error::QRError, metadata::Color};
use crate::builder::QR;

// Mask pattern
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub struct MaskPattern(u8);

impl MaskPattern {
    /// # Panics
    ///
    /// Panics if `pattern` is 8 or more.
    pub const fn new(pattern: u8) -> Self {
        assert!(pattern < 8, "Invalid masking pattern");
        Self(pattern)
    }
}

impl Deref for MaskPattern {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<u8> for MaskPattern {
    type Error = QRError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value < 8 {
            Ok(Self(value))
        } else {
            Err(QRError::InvalidMaskingPattern)
        }
    }
}

// Each function takes (row, column) and returns true where the module is inverted
mod mask_functions {
    pub fn checkerboard(r: i16, c: i16) -> bool {
        (r + c) & 1 == 0
    }

    pub fn horizontal_lines(r: i16, _: i16) -> bool {
        r & 1 == 0
    }

    pub fn vertical_lines(_: i16, c: i16) -> bool {
        c % 3 == 0
    }

    pub fn diagonal_lines(r: i16, c: i16) -> bool {
        (r + c) % 3 == 0
    }

    pub fn large_checkerboard(r: i16, c: i16) -> bool {
        ((r >> 1) + (c / 3)) & 1 == 0
    }

    pub fn fields(r: i16, c: i16) -> bool {
        let p = r as i32 * c as i32;
        (p & 1) + (p % 3) == 0
    }

    pub fn diamonds(r: i16, c: i16) -> bool {
        let p = r as i32 * c as i32;
        ((p & 1) + (p % 3)) & 1 == 0
    }

    pub fn meadow(r: i16, c: i16) -> bool {
        let p = r as i32 * c as i32;
        (((r + c) as i32 & 1) + (p % 3)) & 1 == 0
    }
}

impl MaskPattern {
    pub fn mask_functions(self) -> fn(i16, i16) -> bool {
        match *self {
            0b000 => mask_functions::checkerboard,
            0b001 => mask_functions::horizontal_lines,
            0b010 => mask_functions::vertical_lines,
            0b011 => mask_functions::diagonal_lines,
            0b100 => mask_functions::large_checkerboard,
            0b101 => mask_functions::fields,
            0b110 => mask_functions::diamonds,
            0b111 => mask_functions::meadow,
            _ => unreachable!("Invalid pattern"),
        }
    }
}


// Mask selection
//------------------------------------------------------------------------------

/// Tries all 8 patterns and applies the one with the lowest penalty, lowest index on ties.
pub fn apply_best_mask(qr: &mut QR) -> MaskPattern {
    let mut best_mask = MaskPattern::new(0);
    let mut min_pen = u32::MAX;
    for m in 0..8 {
        let mask = MaskPattern::new(m);
        qr.toggle_mask(mask);
        qr.draw_format_info(mask);
        let pen = compute_total_penalty(qr);
        trace!("Mask {m} penalty {pen}");
        qr.toggle_mask(mask);
        if pen < min_pen {
            min_pen = pen;
            best_mask = mask;
        }
    }
    debug!("Selected mask {} with penalty {min_pen}", *best_mask);
    qr.apply_mask(best_mask);
    best_mask
}

// Penalty
//------------------------------------------------------------------------------

pub fn compute_total_penalty(qr: &QR) -> u32 {
    let w = qr.width() as i16;
    let mut line_pen = 0;
    for i in 0..w {
        line_pen += compute_line_penalty(w, |j| *qr.get(i, j));
        line_pen += compute_line_penalty(w, |j| *qr.get(j, i));
    }
    let blk_pen = compute_block_penalty(qr);
    let bal_pen = compute_balance_penalty(qr);
    line_pen + blk_pen + bal_pen
}

// Adjacent runs and finder-like patterns along one row or column
fn compute_line_penalty(w: i16, get: impl Fn(i16) -> Color) -> u32 {
    let mut pen = 0;
    let mut run_clr = Color::Light;
    let mut run_len = 0;
    let mut history = RunHistory::new(w as u32);
    for j in 0..w {
        let clr = get(j);
        if clr == run_clr {
            run_len += 1;
            if run_len == 5 {
                pen += PENALTY_N1;
            } else if run_len > 5 {
                pen += 1;
            }
        } else {
            history.push(run_len);
            if run_clr == Color::Light {
                pen += history.count_patterns() * PENALTY_N3;
            }
            run_clr = clr;
            run_len = 1;
        }
    }
    pen + history.terminate_and_count(run_clr, run_len) * PENALTY_N3
}

// Lengths of the last 7 runs of a line, most recent first. The quiet zone counts as light.
struct RunHistory {
    w: u32,
    runs: [u32; 7],
}

impl RunHistory {
    fn new(w: u32) -> Self {
        Self { w, runs: [0; 7] }
    }

    fn push(&mut self, mut run_len: u32) {
        if self.runs[0] == 0 {
            run_len += self.w;
        }
        self.runs.copy_within(0..6, 1);
        self.runs[0] = run_len;
    }

    // Finder-like 1:1:3:1:1 cores with a 4 module light run on either side
    fn count_patterns(&self) -> u32 {
        let n = self.runs[1];
        debug_assert!(n <= self.w * 3, "Run exceeds 3 line widths: {n}");
        let core = n > 0
            && self.runs[2] == n
            && self.runs[3] == n * 3
            && self.runs[4] == n
            && self.runs[5] == n;
        (core && self.runs[0] >= n * 4 && self.runs[6] >= n) as u32
            + (core && self.runs[6] >= n * 4 && self.runs[0] >= n) as u32
    }

    fn terminate_and_count(&mut self, run_clr: Color, mut run_len: u32) -> u32 {
        if run_clr == Color::Dark {
            self.push(run_len);
            run_len = 0;
        }
        self.push(run_len + self.w);
        self.count_patterns()
    }
}

fn compute_block_penalty(qr: &QR) -> u32 {
    let mut pen = 0;
    let w = qr.width() as i16;
    for r in 0..w - 1 {
        for c in 0..w - 1 {
            let clr = *qr.get(r, c);
            if clr == *qr.get(r + 1, c) && clr == *qr.get(r, c + 1) && clr == *qr.get(r + 1, c + 1)
            {
                pen += PENALTY_N2;
            }
        }
    }
    pen
}

// 10 points per 5% step away from an even dark/light split
fn compute_balance_penalty(qr: &QR) -> u32 {
    let dark_cnt = qr.count_dark_modules();
    let w = qr.width();
    let tot = w * w;
    let k = (dark_cnt * 20).abs_diff(tot * 10).div_ceil(tot).saturating_sub(1);
    k as u32 * PENALTY_N4
}


// Global constants
//------------------------------------------------------------------------------

static PENALTY_N1: u32 = 3;

static PENALTY_N2: u32 = 3;

static PENALTY_N3: u32 = 40;

static PENALTY_N4: u32 = 10;
