use std::{fmt::Display, mem};

use num_traits::PrimInt;

// Bit stream
//------------------------------------------------------------------------------

/// Append-only big-endian bit buffer with a fixed bit capacity.
///
/// Bits are packed MSB first. Reading through the [`Iterator`] impl starts at the first bit
/// and never passes [`BitStream::len`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitStream {
    data: Vec<u8>,
    // Bit length
    len: usize,
    // Max bit capacity
    capacity: usize,
    // Pointer to take bits
    cursor: usize,
}

impl BitStream {
    pub fn new(capacity: usize) -> Self {
        Self { data: vec![0; (capacity + 7) >> 3], len: 0, capacity, cursor: 0 }
    }

    pub fn from(inp: &[u8]) -> Self {
        let bit_len = inp.len() << 3;
        Self { data: inp.to_vec(), len: bit_len, capacity: bit_len, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn data(&self) -> &[u8] {
        &self.data[..(self.len + 7) >> 3]
    }

    /// Returns the bit at `pos`, counted from the first pushed bit.
    pub fn get(&self, pos: usize) -> bool {
        debug_assert!(pos < self.len, "Out of bitstream bounds: Len {}, Pos {}", self.len, pos);

        (self.data[pos >> 3] >> (7 - (pos & 7))) & 1 != 0
    }
}

// Push bits for bit stream
//------------------------------------------------------------------------------

impl BitStream {
    /// Appends the low `size` bits of `bits`, most significant first. `size` is at most 16.
    pub fn push_bits<T>(&mut self, bits: T, size: usize)
    where
        T: PrimInt + Display,
    {
        let max_bits = mem::size_of::<T>() * 8;
        assert!(size <= 16 && size <= max_bits, "Cannot push more than 16 bits: Size {size}");
        debug_assert!(
            size >= max_bits - bits.leading_zeros() as usize,
            "Bit count shouldn't exceed bit length: Length {size}, Bits {bits}"
        );
        debug_assert!(
            self.len + size <= self.capacity,
            "Insufficient capacity: Capacity {}, Size {}",
            self.capacity,
            self.len + size
        );

        for i in (0..size).rev() {
            self.push((bits >> i) & T::one() == T::one());
        }
    }

    pub fn push(&mut self, bit: bool) {
        debug_assert!(
            self.len < self.capacity,
            "Insufficient capacity: Capacity {}, Size {}",
            self.capacity,
            self.len + 1
        );

        if bit {
            let offset = self.len & 7;
            let pos = self.len >> 3;
            self.data[pos] |= 0b10000000 >> offset;
        }

        self.len += 1;
    }

    /// Appends every bit of `other`, which need not be byte aligned.
    pub fn append(&mut self, other: &BitStream) {
        debug_assert!(
            self.len + other.len <= self.capacity,
            "Append shouldn't overflow capacity: Capacity {}, Size {}",
            self.capacity,
            self.len + other.len
        );

        if self.len & 7 == 0 {
            let pos = self.len >> 3;
            let bytes = other.data();
            self.data[pos..pos + bytes.len()].copy_from_slice(bytes);
            self.len += other.len;
        } else {
            (0..other.len).for_each(|i| self.push(other.get(i)));
        }
    }
}


// Take bits for bit stream
//------------------------------------------------------------------------------

impl BitStream {
    pub fn take_bit(&mut self) -> Option<bool> {
        if self.cursor == self.len {
            return None;
        }

        let bit = self.get(self.cursor);
        self.cursor += 1;

        Some(bit)
    }
}

impl Iterator for BitStream {
    type Item = bool;
    fn next(&mut self) -> Option<Self::Item> {
        self.take_bit()
    }
}

#[cfg(test)]
mod bit_stream_take_tests {

    use super::BitStream;

    #[test]
    fn test_take() {
        let bs = BitStream::from(&[0b10110000]);
        let bits: Vec<bool> = bs.take(4).collect();
        assert_eq!(bits, vec![true, false, true, true]);
    }

    #[test]
    fn test_take_stops_at_len() {
        let mut bs = BitStream::new(8);
        bs.push_bits(0b11_u8, 2);
        assert_eq!(bs.take_bit(), Some(true));
        assert_eq!(bs.take_bit(), Some(true));
        assert_eq!(bs.take_bit(), None);
    }
}
