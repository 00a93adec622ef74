use std::error::Error;
use std::io::{self, BufRead, BufWriter, Write};

use qrweave::{encode_binary, encode_text, ECLevel, MaskPattern, QRError, QRResult, Version, QR};

// Line oriented encoder driver: reads test vectors from stdin, prints symbols to stdout
fn main() -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut out = BufWriter::new(io::stdout().lock());

    let mut next_int = || -> Result<i32, Box<dyn Error>> {
        let line = lines.next().ok_or("Unexpected end of input")??;
        Ok(line.trim().parse()?)
    };

    loop {
        let len = next_int()?;
        if len == -1 {
            break;
        }

        let mut data = Vec::with_capacity(len.max(0) as usize);
        for _ in 0..len {
            data.push(u8::try_from(next_int()?)?);
        }
        let params = [next_int()?, next_int()?, next_int()?, next_int()?, next_int()?];

        match encode(&data, params) {
            Ok(qr) => {
                writeln!(out, "{}", (qr.size() - 17) / 4)?;
                for y in 0..qr.size() {
                    for x in 0..qr.size() {
                        writeln!(out, "{}", qr.get_module(x, y) as u8)?;
                    }
                }
            }
            Err(_) => writeln!(out, "-1")?,
        }
        out.flush()?;
    }
    Ok(())
}

// `params` holds ec level, min version, max version, mask (-1 for auto) and boost flag
fn encode(data: &[u8], params: [i32; 5]) -> QRResult<QR> {
    let [ecl, min, max, mask, boost] = params;
    let ecl = ECLevel::try_from(to_u8(ecl, QRError::InvalidECLevel)?)?;
    let min = Version::try_from(to_u8(min, QRError::InvalidVersion)?)?;
    let max = Version::try_from(to_u8(max, QRError::InvalidVersion)?)?;
    let mask = match mask {
        -1 => None,
        m => Some(MaskPattern::try_from(to_u8(m, QRError::InvalidMaskingPattern)?)?),
    };
    let boost = boost != 0;

    if data.iter().all(|b| (0x20..=0x7E).contains(b)) {
        // Printable ASCII is always valid UTF-8
        let text = std::str::from_utf8(data).unwrap_or_default();
        encode_text(text, ecl, min, max, mask, boost)
    } else {
        encode_binary(data, ecl, min, max, mask, boost)
    }
}

fn to_u8(n: i32, err: QRError) -> QRResult<u8> {
    u8::try_from(n).map_err(|_| err)
}

#[cfg(test)]
mod harness_tests {
    use qrweave::{encode_binary, encode_text, ECLevel, MaskPattern, QRError, Version};

    use super::encode;

    #[test]
    fn test_encode_single_digit() {
        let qr = encode(&[b'1'], [0, 1, 40, -1, 1]).unwrap();
        assert_eq!(qr.size(), 21);
        assert_eq!(qr.ec_level(), ECLevel::H);
        let exp = encode_text("1", ECLevel::L, Version::MIN, Version::MAX, None, true).unwrap();
        assert_eq!(qr, exp);
    }

    #[test]
    fn test_encode_non_printable_as_binary() {
        let data = [b'A', 0x0A, 0xC3];
        let qr = encode(&data, [1, 1, 40, 3, 0]).unwrap();
        let mask = Some(MaskPattern::new(3));
        let exp =
            encode_binary(&data, ECLevel::M, Version::MIN, Version::MAX, mask, false).unwrap();
        assert_eq!(qr, exp);
    }

    #[test]
    fn test_encode_invalid_params() {
        assert_eq!(encode(b"1", [4, 1, 40, -1, 1]), Err(QRError::InvalidECLevel));
        assert_eq!(encode(b"1", [0, 0, 40, -1, 1]), Err(QRError::InvalidVersion));
        assert_eq!(encode(b"1", [0, 1, 41, -1, 1]), Err(QRError::InvalidVersion));
        assert_eq!(encode(b"1", [0, 1, 40, 8, 1]), Err(QRError::InvalidMaskingPattern));
        assert_eq!(encode(b"1", [0, 1, 40, -2, 1]), Err(QRError::InvalidMaskingPattern));
        assert_eq!(encode(b"1", [0, 5, 4, -1, 1]), Err(QRError::InvalidVersion));
    }
}
