/// Block types as stored in the `BTYPE` field of a block header
pub const DEFLATE_BLOCKTYPE_UNCOMPRESSED: u32 = 0;
pub const DEFLATE_BLOCKTYPE_STATIC_HUFFMAN: u32 = 1;
pub const DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN: u32 = 2;

/// Number of symbols in each Huffman code.  Note: for the literal/length
/// and offset codes, these are actually the maximum values; a given block
/// might use fewer symbols.
pub const DEFLATE_NUM_PRECODE_SYMS: usize = 19;
pub const DEFLATE_NUM_LITLEN_SYMS: usize = 288;
pub const DEFLATE_NUM_OFFSET_SYMS: usize = 32;

/// Symbols a dynamic block may actually declare
pub const DEFLATE_MAX_USED_LITLEN_SYMS: usize = 286;
pub const DEFLATE_MAX_USED_OFFSET_SYMS: usize = 30;

/// Order which precode lengths are stored
pub static DEFLATE_PRECODE_LENS_PERMUTATION: [u8; DEFLATE_NUM_PRECODE_SYMS] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15
];

/// Maximum codeword length across all codes.
pub const DEFLATE_MAX_CODEWORD_LENGTH: u8 = 15;
/// Maximum codeword length of the precode
pub const DEFLATE_MAX_PRE_CODEWORD_LENGTH: u8 = 7;

pub const DEFLATE_END_OF_BLOCK: usize = 256;
pub const DEFLATE_FIRST_LEN_SYM: usize = 257;

pub const DEFLATE_MIN_MATCH_LEN: usize = 3;
pub const DEFLATE_MAX_MATCH_LEN: usize = 258;
pub const DEFLATE_WINDOW_SIZE: usize = 32768;

/// Largest payload a single stored block can carry
pub const DEFLATE_MAX_STORED_LEN: usize = u16::MAX as usize;

pub static LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258
];

pub static LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0
];

pub static OFFSET_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577
];

pub static OFFSET_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13
];
