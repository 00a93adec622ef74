// Galois field GF(2^8) arithmetic
//------------------------------------------------------------------------------

// Reducing polynomial x^8 + x^4 + x^3 + x^2 + 1
static PRIMITIVE_POLY: u16 = 0x11D;

/// Product of `x` and `y` in GF(2^8) modulo 0x11D, by shift and add.
pub fn gf_mul(x: u8, y: u8) -> u8 {
    let mut z: u16 = 0;
    for i in (0..8).rev() {
        z <<= 1;
        if z & 0x100 != 0 {
            z ^= PRIMITIVE_POLY;
        }
        if (y >> i) & 1 == 1 {
            z ^= x as u16;
        }
    }
    debug_assert!(z >> 8 == 0, "Product escaped the field: {z:#x}");
    z as u8
}

#[cfg(test)]
mod galois_tests {
    use test_case::test_case;

    use super::gf_mul;

    #[test_case(0, 0x53, 0)]
    #[test_case(1, 0x53, 0x53)]
    #[test_case(2, 0x80, 0x1D)]
    #[test_case(2, 0x8E, 0x01)]
    #[test_case(0x53, 0xCA, 0x8F)]
    #[test_case(0xFF, 0xFF, 0xE2)]
    fn test_gf_mul(x: u8, y: u8, exp: u8) {
        assert_eq!(gf_mul(x, y), exp);
        assert_eq!(gf_mul(y, x), exp);
    }

    #[test]
    fn test_generator_cycles() {
        let mut alpha = 1;
        for i in 1..=255 {
            alpha = gf_mul(alpha, 2);
            assert_eq!(alpha == 1, i == 255, "alpha^{i} = {alpha}");
        }
    }
}

// Reed-Solomon polynomials
//------------------------------------------------------------------------------

/// Generator polynomial `(x - 2^0)(x - 2^1)...(x - 2^(degree-1))`, highest power first with the
/// leading 1 dropped.
pub fn compute_divisor(degree: usize) -> Vec<u8> {
    assert!((1..=MAX_EC_SIZE).contains(&degree), "Degree out of range: {degree}");

    let mut res = vec![0; degree];
    res[degree - 1] = 1;

    let mut root = 1;
    for _ in 0..degree {
        for j in 0..degree {
            res[j] = gf_mul(res[j], root);
            if j + 1 < degree {
                res[j] ^= res[j + 1];
            }
        }
        root = gf_mul(root, 2);
    }
    res
}

/// Remainder of `data * x^degree` divided by the generator `divisor`. These are the
/// error correction codewords of `data`.
pub fn compute_remainder(data: &[u8], divisor: &[u8]) -> Vec<u8> {
    let mut res = vec![0; divisor.len()];
    for b in data {
        let factor = b ^ res[0];
        res.rotate_left(1);
        if let Some(last) = res.last_mut() {
            *last = 0;
        }
        res.iter_mut().zip(divisor.iter()).for_each(|(r, d)| *r ^= gf_mul(*d, factor));
    }
    res
}


// Global constants
//------------------------------------------------------------------------------

pub static MAX_EC_SIZE: usize = 30;
