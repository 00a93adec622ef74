pub use encode::*;

// Encoder
//------------------------------------------------------------------------------

pub mod encode {
    use tracing::debug;

    use super::writer::{pad_remaining_capacity, push_segment, push_terminator};
    use crate::common::{
        bitstream::BitStream,
        codec::{Segment, MAX_BIT_LEN},
        error::{QRError, QRResult},
        metadata::{ECLevel, Version},
    };

    /// Packs `segs` into the data codewords of the smallest fitting version in `min..=max`.
    ///
    /// Returns the padded bit stream with the chosen version and the possibly boosted level.
    pub fn encode(
        segs: &[Segment],
        ecl: ECLevel,
        min: Version,
        max: Version,
        boost_ecl: bool,
    ) -> QRResult<(BitStream, Version, ECLevel)> {
        if min > max {
            return Err(QRError::InvalidVersion);
        }

        let (ver, used_bits) = find_version(segs, ecl, min, max)?;
        let ecl = if boost_ecl { boost_ec_level(ecl, ver, used_bits) } else { ecl };
        debug!("Encoding {used_bits} bits into version {} at level {ecl:?}", *ver);

        let mut bs = BitStream::new(ver.data_bit_capacity(ecl));
        for seg in segs {
            push_segment(seg, ver, &mut bs);
        }
        debug_assert!(
            bs.len() == used_bits,
            "Pushed bits don't match the computed total: Pushed {}, Total {used_bits}",
            bs.len()
        );

        push_terminator(&mut bs);
        pad_remaining_capacity(&mut bs);
        Ok((bs, ver, ecl))
    }

    /// Total framed bit length of `segs` at `ver`: mode indicator, count field and payload.
    pub fn total_bits(segs: &[Segment], ver: Version) -> QRResult<usize> {
        let mut res = 0;
        for seg in segs {
            let cc_bits = ver.char_cnt_bits(seg.mode());
            if seg.num_chars() >= 1 << cc_bits {
                return Err(QRError::SegmentOverflow);
            }
            res += 4 + cc_bits + seg.bits().len();
            if res > MAX_BIT_LEN {
                return Err(QRError::BitBudgetExceeded);
            }
        }
        Ok(res)
    }

    // Smallest version in range whose data capacity holds every segment, with the bits used
    pub(crate) fn find_version(
        segs: &[Segment],
        ecl: ECLevel,
        min: Version,
        max: Version,
    ) -> QRResult<(Version, usize)> {
        let mut ver = min;
        loop {
            let capacity = ver.data_bit_capacity(ecl);
            let res = total_bits(segs, ver);
            match res {
                Ok(needed) if needed <= capacity => return Ok((ver, needed)),
                Ok(needed) if ver >= max => {
                    return Err(QRError::CapacityExceeded { needed, capacity })
                }
                Err(e) if ver >= max => return Err(e),
                _ => {}
            }
            ver = ver.next().ok_or(QRError::InvalidVersion)?;
        }
    }

    // Highest level at or above `ecl` that still holds `used_bits` at `ver`
    pub(crate) fn boost_ec_level(ecl: ECLevel, ver: Version, used_bits: usize) -> ECLevel {
        ECLevel::ALL
            .into_iter()
            .rev()
            .find(|&l| l >= ecl && used_bits <= ver.data_bit_capacity(l))
            .unwrap_or(ecl)
    }

}

// Writer for encoded data
//------------------------------------------------------------------------------

pub(super) mod writer {
    use crate::common::{
        bitstream::BitStream,
        codec::{Segment, PADDING_CODEWORDS},
        metadata::Version,
    };

    pub fn push_segment(seg: &Segment, ver: Version, out: &mut BitStream) {
        push_header(seg, ver, out);
        out.append(seg.bits());
    }

    fn push_header(seg: &Segment, ver: Version, out: &mut BitStream) {
        out.push_bits(seg.mode() as u8, 4);
        let len_bits = ver.char_cnt_bits(seg.mode());
        let char_cnt = seg.num_chars();
        debug_assert!(
            char_cnt < (1 << len_bits),
            "Char count exceeds bit length: Char count {char_cnt}, Char count bits {len_bits}"
        );
        out.push_bits(char_cnt as u16, len_bits);
    }

    pub fn push_terminator(out: &mut BitStream) {
        let bit_len = out.len();
        let bit_capacity = out.capacity();
        if bit_len < bit_capacity {
            let term_len = std::cmp::min(4, bit_capacity - bit_len);
            out.push_bits(0_u8, term_len);
        }
    }

    pub fn pad_remaining_capacity(out: &mut BitStream) {
        push_padding_bits(out);
        push_padding_codewords(out);
    }

    fn push_padding_bits(out: &mut BitStream) {
        let offset = out.len() & 7;
        if offset > 0 {
            let padding_bits_len = 8 - offset;
            out.push_bits(0_u8, padding_bits_len);
        }
    }

    fn push_padding_codewords(out: &mut BitStream) {
        let offset = out.len() & 7;
        debug_assert!(offset == 0, "Bit offset should be zero before padding codewords: {offset}");

        let remain_byte_capacity = (out.capacity() - out.len()) >> 3;
        PADDING_CODEWORDS.iter().copied().cycle().take(remain_byte_capacity).for_each(|pc| {
            out.push_bits(pc, 8);
        });
    }

    #[cfg(test)]
    mod writer_tests {
        use super::{
            push_header, push_padding_bits, push_padding_codewords, push_segment,
            push_terminator, PADDING_CODEWORDS,
        };
        use crate::common::{
            bitstream::BitStream,
            codec::Segment,
            metadata::{ECLevel, Version},
        };

        #[test]
        fn test_push_header_v1() {
            let ver = Version::new(1);
            let bit_capacity = ver.data_bit_capacity(ECLevel::L);
            let exp_vecs: Vec<Vec<u8>> = vec![
                vec![0b00011111, 0b11111100],
                vec![0b00101111, 0b11111000],
                vec![0b01001111, 0b11110000],
            ];
            let segs = [
                Segment::make_numeric(&"7".repeat(1023)).unwrap(),
                Segment::make_alphanumeric(&"Q".repeat(511)).unwrap(),
                Segment::make_bytes(&[0xA5; 255]).unwrap(),
            ];
            for (seg, exp_vec) in segs.iter().zip(exp_vecs.iter()) {
                let mut bs = BitStream::new(bit_capacity);
                push_header(seg, ver, &mut bs);
                assert_eq!(bs.data(), exp_vec);
            }
        }

        #[test]
        fn test_push_header_v27() {
            let ver = Version::new(27);
            let bit_capacity = ver.data_bit_capacity(ECLevel::L);
            let exp_vecs: Vec<Vec<u8>> = vec![
                vec![0b00010111, 0b11111111, 0b11000000],
                vec![0b00100111, 0b11111111, 0b10000000],
                vec![0b01000000, 0b11111111, 0b11110000],
                vec![0b10001001, 0b11011000],
            ];
            // Counts within the 15-bit segment budget
            let segs = [
                Segment::make_numeric(&"7".repeat(8191)).unwrap(),
                Segment::make_alphanumeric(&"Q".repeat(4095)).unwrap(),
                Segment::make_bytes(&[0xA5; 4095]).unwrap(),
                Segment::make_kanji(&"点".repeat(2520)).unwrap(),
            ];
            for (seg, exp_vec) in segs.iter().zip(exp_vecs.iter()) {
                let mut bs = BitStream::new(bit_capacity);
                push_header(seg, ver, &mut bs);
                assert_eq!(bs.data(), exp_vec);
            }
        }

        #[test]
        fn test_push_eci_segment() {
            let mut bs = BitStream::new(16);
            push_segment(&Segment::make_eci(26).unwrap(), Version::new(1), &mut bs);
            assert_eq!(bs.len(), 12);
            assert_eq!(bs.data(), [0b01110001, 0b10100000]);
        }

        #[test]
        fn test_push_terminator() {
            let bit_capacity = Version::new(1).data_bit_capacity(ECLevel::L);
            let capacity = bit_capacity >> 3;
            let mut bs = BitStream::new(bit_capacity);
            bs.push_bits(0b1_u8, 1);
            push_terminator(&mut bs);
            assert_eq!(bs.data(), [0b10000000]);
            assert_eq!(bs.len(), 5);
            let mut bs = BitStream::new(bit_capacity);
            for _ in 0..capacity - 1 {
                bs.push_bits(0xFF_u8, 8);
            }
            bs.push_bits(0b111111_u8, 6);
            push_terminator(&mut bs);
            assert_eq!(bs.len(), bit_capacity);
        }

        #[test]
        fn test_push_padding_bits() {
            let mut bs = BitStream::new(16);
            bs.push_bits(0b1_u8, 1);
            push_padding_bits(&mut bs);
            assert_eq!(bs.data(), [0b10000000]);
            assert_eq!(bs.len(), 8);
        }

        #[test]
        fn test_push_padding_codewords() {
            let bit_capacity = Version::new(1).data_bit_capacity(ECLevel::L);
            let mut bs = BitStream::new(bit_capacity);
            bs.push_bits(0b1_u8, 1);
            push_padding_bits(&mut bs);
            push_padding_codewords(&mut bs);
            let mut output = vec![0b10000000];
            output.extend(PADDING_CODEWORDS.iter().cycle().take(18));
            assert_eq!(bs.data(), output);
            assert_eq!(bs.len(), bit_capacity);
        }
    }
}
