use std::ops::Deref;

use crate::common::{
    ec::{compute_divisor, compute_remainder},
    metadata::{ECLevel, Version},
};

// Error correction
//------------------------------------------------------------------------------

/// Splits the data codewords into blocks, appends the Reed-Solomon codewords of each block, and
/// interleaves the result into the final codeword sequence.
pub fn ecc_and_interleave(data: &[u8], version: Version, ec_level: ECLevel) -> Vec<u8> {
    let (data_blocks, ecc_blocks) = ecc(data, version, ec_level);

    let mut res = interleave(&data_blocks);
    res.extend(interleave(&ecc_blocks));

    debug_assert!(
        res.len() == version.total_codewords(),
        "Codeword count doesn't match version: Codewords {}, Expected {}",
        res.len(),
        version.total_codewords()
    );
    res
}

// ECC: Error Correction Codeword generator
pub(crate) fn ecc(data: &[u8], version: Version, ec_level: ECLevel) -> (Vec<&[u8]>, Vec<Vec<u8>>) {
    let data_blocks = blockify(data, version, ec_level);

    let divisor = compute_divisor(version.ecc_per_block(ec_level));
    let ecc_blocks = data_blocks.iter().map(|b| compute_remainder(b, &divisor)).collect::<Vec<_>>();

    (data_blocks, ecc_blocks)
}

// Short blocks first, long blocks carry one more data codeword
pub(crate) fn blockify(data: &[u8], version: Version, ec_level: ECLevel) -> Vec<&[u8]> {
    let num_blocks = version.num_blocks(ec_level);
    let raw_codewords = version.total_codewords();
    let num_short_blocks = num_blocks - raw_codewords % num_blocks;
    let short_block_size = raw_codewords / num_blocks - version.ecc_per_block(ec_level);

    let total_short_size = short_block_size * num_short_blocks;
    let total_size = total_short_size + (short_block_size + 1) * (num_blocks - num_short_blocks);

    debug_assert!(
        total_size == data.len(),
        "Data len doesn't match total size of blocks: Data len {}, Total block size {}",
        data.len(),
        total_size
    );

    let mut data_blocks = Vec::with_capacity(num_blocks);
    data_blocks.extend(data[..total_short_size].chunks(short_block_size));
    data_blocks.extend(data[total_short_size..].chunks(short_block_size + 1));
    data_blocks
}

// Column-wise merge; shorter blocks are skipped at their missing columns
pub(crate) fn interleave<T: Copy, V: Deref<Target = [T]>>(blocks: &[V]) -> Vec<T> {
    let max_block_size = blocks.iter().map(|b| b.len()).max().unwrap_or(0);
    let total_size = blocks.iter().map(|b| b.len()).sum::<usize>();
    let mut res = Vec::with_capacity(total_size);
    for i in 0..max_block_size {
        for b in blocks {
            if i < b.len() {
                res.push(b[i]);
            }
        }
    }
    res
}
