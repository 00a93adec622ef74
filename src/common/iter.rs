use super::metadata::Version;

// Iterator for placing data in encoding region of QR
//------------------------------------------------------------------------------

/// Walks every module outside the vertical timing column in codeword placement order.
///
/// Columns are consumed in pairs from the right edge, alternating upward and downward, right
/// column first within each row. Function modules are included; callers skip them.
pub struct EncRegionIter {
    // Right column of the current pair
    right: i16,
    // Rows visited in the current pair
    vert: i16,
    // 0 for the right column, 1 for the left
    j: i16,
    w: i16,
}

impl EncRegionIter {
    pub const fn new(version: Version) -> Self {
        let w = version.width() as i16;
        Self { right: w - 1, vert: 0, j: 0, w }
    }
}

impl Iterator for EncRegionIter {
    type Item = (i16, i16);
    fn next(&mut self) -> Option<Self::Item> {
        if self.right < 1 {
            return None;
        }

        let upward = (self.right + 1) & 2 == 0;
        let r = if upward { self.w - 1 - self.vert } else { self.vert };
        let res = (r, self.right - self.j);

        self.j += 1;
        if self.j == 2 {
            self.j = 0;
            self.vert += 1;
            if self.vert == self.w {
                self.vert = 0;
                self.right -= 2;
                // Skip vertical timing column
                if self.right == 6 {
                    self.right = 5;
                }
            }
        }
        Some(res)
    }
}
