/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use log::trace;

use crate::bitstream::BitStreamWriter;
use crate::constants::{
    DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN, DEFLATE_BLOCKTYPE_STATIC_HUFFMAN,
    DEFLATE_BLOCKTYPE_UNCOMPRESSED, DEFLATE_END_OF_BLOCK, DEFLATE_FIRST_LEN_SYM,
    DEFLATE_MAX_CODEWORD_LENGTH, DEFLATE_MAX_PRE_CODEWORD_LENGTH, DEFLATE_MAX_STORED_LEN,
    DEFLATE_MAX_USED_LITLEN_SYMS, DEFLATE_MAX_USED_OFFSET_SYMS,
    DEFLATE_NUM_LITLEN_SYMS, DEFLATE_NUM_OFFSET_SYMS, DEFLATE_NUM_PRECODE_SYMS,
    DEFLATE_PRECODE_LENS_PERMUTATION, LENGTH_BASE, LENGTH_EXTRA_BITS, OFFSET_BASE,
    OFFSET_EXTRA_BITS
};
use crate::huffman::HuffmanTable;
use crate::matcher::{tokenize, MatchMode, MatchParams, Token};
#[cfg(feature = "zlib")]
use crate::utils::calc_adler_hash;

/// Maximum number of tokens in a single compressed block
const MAX_BLOCK_TOKENS: usize = 16384;

/// Highest supported compression level
const MAX_LEVEL: u8 = 10;

/// How matches are searched for and which blocks may be emitted
///
/// These mirror the strategies zlib offers.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum DeflateEncodingStrategy {
    /// Only stored blocks, the data is copied as is
    NoCompression,
    /// Regular LZ77 with Huffman coding
    #[default]
    Default,
    /// LZ77 ignoring short matches, suits filtered image data
    Filtered,
    /// No string matching, only Huffman coding of literals
    HuffmanOnly,
    /// Only matches against the previous byte
    Rle,
    /// LZ77 with the fixed Huffman codes of the format
    Fixed
}

impl DeflateEncodingStrategy {
    fn match_mode(self) -> MatchMode {
        match self {
            Self::Default | Self::Fixed => MatchMode::Lz77 { min_len: 3 },
            Self::Filtered => MatchMode::Lz77 { min_len: 6 },
            Self::HuffmanOnly | Self::NoCompression => MatchMode::LiteralsOnly,
            Self::Rle => MatchMode::Rle
        }
    }
}

/// Options for the deflate encoder
///
/// Levels go from 0 (store) to 10, with 1 to 9 matching the effort of
/// zlib's levels and 10 searching harder than zlib's 9
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DeflateEncodingOptions {
    level:    u8,
    strategy: DeflateEncodingStrategy
}

impl Default for DeflateEncodingOptions {
    fn default() -> Self {
        DeflateEncodingOptions {
            level:    6,
            strategy: DeflateEncodingStrategy::Default
        }
    }
}

impl DeflateEncodingOptions {
    /// Set the compression level, values above 10 are clamped
    pub const fn set_level(mut self, level: u8) -> Self {
        self.level = if level > MAX_LEVEL { MAX_LEVEL } else { level };
        self
    }

    pub const fn set_strategy(mut self, strategy: DeflateEncodingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub const fn level(&self) -> u8 {
        self.level
    }

    pub const fn strategy(&self) -> DeflateEncodingStrategy {
        self.strategy
    }

    const fn stores_only(&self) -> bool {
        self.level == 0 || matches!(self.strategy, DeflateEncodingStrategy::NoCompression)
    }

    /// The two byte zlib header for a stream made with these options
    ///
    /// The `FLEVEL` field carries the same hint zlib writes.
    pub fn zlib_header(&self) -> [u8; 2] {
        const ZLIB_CM_DEFLATE: u16 = 8;
        const ZLIB_CINFO_32K_WINDOW: u16 = 7;

        let level_hint: u16 = match (self.level, self.strategy) {
            (_, DeflateEncodingStrategy::HuffmanOnly | DeflateEncodingStrategy::Rle) => 0,
            (_, DeflateEncodingStrategy::NoCompression) | (0 | 1, _) => 0,
            (2..=5, _) => 1,
            (6, _) => 2,
            _ => 3
        };

        let mut hdr = ZLIB_CM_DEFLATE | (ZLIB_CINFO_32K_WINDOW << 4);
        hdr = (hdr << 8) | (level_hint << 6);
        hdr |= 31 - (hdr % 31);

        hdr.to_be_bytes()
    }
}

/// A deflate encoder over an in memory buffer
pub struct DeflateEncoder<'a> {
    data:    &'a [u8],
    options: DeflateEncodingOptions
}

impl<'a> DeflateEncoder<'a> {
    /// Create a new deflate encoder with default options
    pub fn new(data: &'a [u8]) -> DeflateEncoder<'a> {
        DeflateEncoder::new_with_options(data, DeflateEncodingOptions::default())
    }

    pub fn new_with_options(data: &'a [u8], options: DeflateEncodingOptions) -> DeflateEncoder<'a> {
        DeflateEncoder { data, options }
    }

    /// Encode the data as a complete raw deflate stream
    pub fn encode_deflate(&self) -> Vec<u8> {
        self.encode_deflate_segment(true)
    }

    /// Encode the data as one segment of a larger deflate stream
    ///
    /// The segment never refers to data outside of the buffer given to
    /// this encoder. When `is_last` is false no block is marked final and
    /// the segment ends with a sync marker (an empty stored block), so it
    /// is byte aligned and can be followed by any other segment. When
    /// `is_last` is true the segment terminates the stream.
    pub fn encode_deflate_segment(&self, is_last: bool) -> Vec<u8> {
        let mut writer = BitStreamWriter::with_capacity(self.data.len() / 2 + 64);

        if self.data.is_empty() {
            if is_last {
                // an empty static block, just the end of block symbol
                writer.put_bits(1 | (DEFLATE_BLOCKTYPE_STATIC_HUFFMAN << 1), 3);
                let fixed = fixed_litlen_table();
                write_symbol(&mut writer, &fixed, DEFLATE_END_OF_BLOCK);
            }
        } else if self.options.stores_only() {
            write_stored(&mut writer, self.data, is_last);
        } else {
            self.encode_compressed(&mut writer, is_last);
        }

        if !is_last {
            write_sync_marker(&mut writer);
        }
        let output = writer.finish();

        trace!(
            "Deflated {} bytes into {} bytes (level {}, {:?}, last: {})",
            self.data.len(),
            output.len(),
            self.options.level,
            self.options.strategy,
            is_last
        );
        output
    }

    /// Encode the data as a zlib stream: header, deflate stream, Adler-32
    #[cfg(feature = "zlib")]
    pub fn encode_zlib(&self) -> Vec<u8> {
        let header = self.options.zlib_header();
        let deflated = self.encode_deflate();

        let mut output = Vec::with_capacity(deflated.len() + 6);
        output.extend_from_slice(&header);
        output.extend_from_slice(&deflated);
        output.extend_from_slice(&calc_adler_hash(self.data).to_be_bytes());

        output
    }

    fn encode_compressed(&self, writer: &mut BitStreamWriter, is_last: bool) {
        let params = MatchParams::from_level(self.options.level);
        let tokens = tokenize(self.data, params, self.options.strategy.match_mode());
        let allow_dynamic = !matches!(self.options.strategy, DeflateEncodingStrategy::Fixed);

        let num_blocks = tokens.len().div_ceil(MAX_BLOCK_TOKENS);
        let mut input_start = 0;

        for (i, block) in tokens.chunks(MAX_BLOCK_TOKENS).enumerate() {
            let input_len: usize = block.iter().map(|t| t.input_len()).sum();
            let input = &self.data[input_start..input_start + input_len];
            let is_final = is_last && i + 1 == num_blocks;

            write_block(writer, block, input, is_final, allow_dynamic);

            input_start += input_len;
        }
        debug_assert_eq!(input_start, self.data.len());
    }
}

/// Symbol frequencies of a block
struct BlockFrequencies {
    litlen:     [u32; DEFLATE_NUM_LITLEN_SYMS],
    offset:     [u32; DEFLATE_NUM_OFFSET_SYMS],
    /// Bits spent on length and distance extra bits
    extra_bits: u64
}

impl BlockFrequencies {
    fn gather(tokens: &[Token]) -> BlockFrequencies {
        let mut freqs = BlockFrequencies {
            litlen:     [0; DEFLATE_NUM_LITLEN_SYMS],
            offset:     [0; DEFLATE_NUM_OFFSET_SYMS],
            extra_bits: 0
        };
        for token in tokens {
            if token.is_literal() {
                freqs.litlen[usize::from(token.len)] += 1;
            } else {
                let len_slot = length_slot(token.len);
                let dist_slot = offset_slot(token.dist);

                freqs.litlen[DEFLATE_FIRST_LEN_SYM + len_slot] += 1;
                freqs.offset[dist_slot] += 1;
                freqs.extra_bits += u64::from(LENGTH_EXTRA_BITS[len_slot])
                    + u64::from(OFFSET_EXTRA_BITS[dist_slot]);
            }
        }
        freqs.litlen[DEFLATE_END_OF_BLOCK] = 1;

        freqs
    }
}

#[inline(always)]
fn length_slot(len: u16) -> usize {
    LENGTH_BASE.partition_point(|&base| base <= len) - 1
}

#[inline(always)]
fn offset_slot(dist: u16) -> usize {
    OFFSET_BASE.partition_point(|&base| base <= dist) - 1
}

fn fixed_litlen_table() -> HuffmanTable<DEFLATE_NUM_LITLEN_SYMS> {
    let mut lengths = [8; DEFLATE_NUM_LITLEN_SYMS];
    lengths[144..256].fill(9);
    lengths[256..280].fill(7);

    HuffmanTable::from_lengths(lengths)
}

fn fixed_offset_table() -> HuffmanTable<DEFLATE_NUM_OFFSET_SYMS> {
    HuffmanTable::from_lengths([5; DEFLATE_NUM_OFFSET_SYMS])
}

/// Code lengths of a dynamic block, run length encoded with the precode
struct DynamicHeader {
    num_litlen:  usize,
    num_offset:  usize,
    num_precode: usize,
    /// (precode symbol, extra bits value)
    items:       Vec<(u8, u8)>,
    precode:     HuffmanTable<DEFLATE_NUM_PRECODE_SYMS>
}

impl DynamicHeader {
    fn new(
        litlen: &HuffmanTable<DEFLATE_NUM_LITLEN_SYMS>,
        offset: &HuffmanTable<DEFLATE_NUM_OFFSET_SYMS>
    ) -> DynamicHeader {
        let num_litlen = 257.max(last_used(&litlen.lengths));
        let num_offset = 1.max(last_used(&offset.lengths));
        debug_assert!(num_litlen <= DEFLATE_MAX_USED_LITLEN_SYMS);
        debug_assert!(num_offset <= DEFLATE_MAX_USED_OFFSET_SYMS);

        let mut all_lengths = Vec::with_capacity(num_litlen + num_offset);
        all_lengths.extend_from_slice(&litlen.lengths[..num_litlen]);
        all_lengths.extend_from_slice(&offset.lengths[..num_offset]);

        let items = run_length_encode(&all_lengths);

        let mut precode_freqs = [0_u32; DEFLATE_NUM_PRECODE_SYMS];
        for &(sym, _) in &items {
            precode_freqs[usize::from(sym)] += 1;
        }
        let precode = HuffmanTable::from_frequencies(&precode_freqs, DEFLATE_MAX_PRE_CODEWORD_LENGTH);

        let num_precode = 4.max(
            DEFLATE_PRECODE_LENS_PERMUTATION
                .iter()
                .rposition(|&sym| precode.lengths[usize::from(sym)] != 0)
                .map_or(0, |p| p + 1)
        );

        DynamicHeader {
            num_litlen,
            num_offset,
            num_precode,
            items,
            precode
        }
    }

    fn cost(&self) -> u64 {
        let mut bits = 5 + 5 + 4 + 3 * self.num_precode as u64;

        for &(sym, _) in &self.items {
            bits += u64::from(self.precode.lengths[usize::from(sym)]) + extra_bits_of(sym);
        }
        bits
    }

    fn write(&self, writer: &mut BitStreamWriter) {
        writer.put_bits((self.num_litlen - 257) as u32, 5);
        writer.put_bits((self.num_offset - 1) as u32, 5);
        writer.put_bits((self.num_precode - 4) as u32, 4);

        for &sym in &DEFLATE_PRECODE_LENS_PERMUTATION[..self.num_precode] {
            writer.put_bits(u32::from(self.precode.lengths[usize::from(sym)]), 3);
        }
        for &(sym, extra) in &self.items {
            write_symbol(writer, &self.precode, usize::from(sym));
            writer.put_bits(u32::from(extra), extra_bits_of(sym) as u32);
        }
    }
}

fn extra_bits_of(precode_sym: u8) -> u64 {
    match precode_sym {
        16 => 2,
        17 => 3,
        18 => 7,
        _ => 0
    }
}

fn last_used(lengths: &[u8]) -> usize {
    lengths.iter().rposition(|&l| l != 0).map_or(0, |p| p + 1)
}

/// Run length encode code lengths into precode symbols
///
/// 16 repeats the previous length 3 to 6 times, 17 and 18 encode runs
/// of 3 to 10 and 11 to 138 zeros
fn run_length_encode(lengths: &[u8]) -> Vec<(u8, u8)> {
    let mut items = Vec::with_capacity(lengths.len());
    let mut i = 0;

    while i < lengths.len() {
        let len = lengths[i];
        let run = lengths[i..].iter().take_while(|&&l| l == len).count();
        let mut remaining = run;

        if len == 0 {
            while remaining >= 11 {
                let n = remaining.min(138);
                items.push((18, (n - 11) as u8));
                remaining -= n;
            }
            if remaining >= 3 {
                items.push((17, (remaining - 3) as u8));
                remaining = 0;
            }
        } else {
            items.push((len, 0));
            remaining -= 1;

            while remaining >= 3 {
                let n = remaining.min(6);
                items.push((16, (n - 3) as u8));
                remaining -= n;
            }
        }
        items.extend(core::iter::repeat((len, 0)).take(remaining));
        i += run;
    }
    items
}

#[inline(always)]
fn write_symbol<const N: usize>(writer: &mut BitStreamWriter, table: &HuffmanTable<N>, sym: usize) {
    writer.put_bits(u32::from(table.codes[sym]), u32::from(table.lengths[sym]));
}

fn write_tokens(
    writer: &mut BitStreamWriter, tokens: &[Token],
    litlen: &HuffmanTable<DEFLATE_NUM_LITLEN_SYMS>, offset: &HuffmanTable<DEFLATE_NUM_OFFSET_SYMS>
) {
    for token in tokens {
        if token.is_literal() {
            write_symbol(writer, litlen, usize::from(token.len));
            continue;
        }
        let len_slot = length_slot(token.len);
        let dist_slot = offset_slot(token.dist);

        write_symbol(writer, litlen, DEFLATE_FIRST_LEN_SYM + len_slot);
        writer.put_bits(
            u32::from(token.len - LENGTH_BASE[len_slot]),
            u32::from(LENGTH_EXTRA_BITS[len_slot])
        );
        write_symbol(writer, offset, dist_slot);
        writer.put_bits(
            u32::from(token.dist - OFFSET_BASE[dist_slot]),
            u32::from(OFFSET_EXTRA_BITS[dist_slot])
        );
    }
    write_symbol(writer, litlen, DEFLATE_END_OF_BLOCK);
}

/// Write one block, picking whichever block type is smallest
fn write_block(
    writer: &mut BitStreamWriter, tokens: &[Token], input: &[u8], is_final: bool,
    allow_dynamic: bool
) {
    let freqs = BlockFrequencies::gather(tokens);

    let fixed_litlen = fixed_litlen_table();
    let fixed_offset = fixed_offset_table();
    let fixed_cost = 3
        + fixed_litlen.cost(&freqs.litlen)
        + fixed_offset.cost(&freqs.offset)
        + freqs.extra_bits;

    // stored blocks pad to a byte after their header, only the first
    // one starts at an arbitrary bit position
    let num_stored = input.len().div_ceil(DEFLATE_MAX_STORED_LEN).max(1) as u64;
    let first_pad = (8 - (writer.bit_position() + 3) % 8) % 8;
    let stored_cost = first_pad + (num_stored - 1) * 5 + num_stored * (3 + 32) + 8 * input.len() as u64;

    let mut dynamic = None;
    let mut dynamic_cost = u64::MAX;

    if allow_dynamic {
        let litlen = HuffmanTable::from_frequencies(&freqs.litlen, DEFLATE_MAX_CODEWORD_LENGTH);
        let offset = HuffmanTable::from_frequencies(&freqs.offset, DEFLATE_MAX_CODEWORD_LENGTH);
        let header = DynamicHeader::new(&litlen, &offset);

        dynamic_cost = 3
            + header.cost()
            + litlen.cost(&freqs.litlen)
            + offset.cost(&freqs.offset)
            + freqs.extra_bits;
        dynamic = Some((header, litlen, offset));
    }
    let bfinal = u32::from(is_final);

    if stored_cost <= fixed_cost && stored_cost <= dynamic_cost {
        write_stored(writer, input, is_final);
    } else if let Some((header, litlen, offset)) = dynamic.filter(|_| dynamic_cost < fixed_cost) {
        writer.put_bits(bfinal | (DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN << 1), 3);
        header.write(writer);
        write_tokens(writer, tokens, &litlen, &offset);
    } else {
        writer.put_bits(bfinal | (DEFLATE_BLOCKTYPE_STATIC_HUFFMAN << 1), 3);
        write_tokens(writer, tokens, &fixed_litlen, &fixed_offset);
    }
}

/// Write `data` as stored blocks, only the last one final if `is_final`
fn write_stored(writer: &mut BitStreamWriter, data: &[u8], is_final: bool) {
    let num_chunks = data.len().div_ceil(DEFLATE_MAX_STORED_LEN).max(1);

    for (i, chunk) in data
        .chunks(DEFLATE_MAX_STORED_LEN)
        .chain(core::iter::once(&[][..]).take(usize::from(data.is_empty())))
        .enumerate()
    {
        let bfinal = u32::from(is_final && i + 1 == num_chunks);
        let len = chunk.len() as u16;

        writer.put_bits(bfinal | (DEFLATE_BLOCKTYPE_UNCOMPRESSED << 1), 3);
        writer.align_to_byte();
        writer.write_aligned_bytes(&len.to_le_bytes());
        writer.write_aligned_bytes(&(!len).to_le_bytes());
        writer.write_aligned_bytes(chunk);
    }
}

/// Write an empty, non final stored block: `00 00 FF FF` after alignment
fn write_sync_marker(writer: &mut BitStreamWriter) {
    write_stored(writer, &[], false);
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::{DeflateDecoder, ZlibDecoder};

    use super::{run_length_encode, DeflateEncoder, DeflateEncodingOptions, DeflateEncodingStrategy};

    const STRATEGIES: [DeflateEncodingStrategy; 6] = [
        DeflateEncodingStrategy::NoCompression,
        DeflateEncodingStrategy::Default,
        DeflateEncodingStrategy::Filtered,
        DeflateEncodingStrategy::HuffmanOnly,
        DeflateEncodingStrategy::Rle,
        DeflateEncodingStrategy::Fixed
    ];

    fn inflate_zlib(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        ZlibDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    fn inflate_raw(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        DeflateDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    fn image_like() -> Vec<u8> {
        let mut data = Vec::new();
        for y in 0..200_u32 {
            data.push((y % 5) as u8);
            for x in 0..300_u32 {
                data.push(((x * 3 + y) % 256) as u8);
                data.push(((x ^ y) & 0xF0) as u8);
                data.push(if x % 17 == 0 { 255 } else { 0 });
            }
        }
        data
    }

    #[test]
    fn zlib_roundtrip_all_levels_and_strategies() {
        let data = image_like();

        for level in 0..=10 {
            for strategy in STRATEGIES {
                let options = DeflateEncodingOptions::default()
                    .set_level(level)
                    .set_strategy(strategy);
                let encoded = DeflateEncoder::new_with_options(&data, options).encode_zlib();

                assert_eq!(inflate_zlib(&encoded), data, "level {level}, {strategy:?}");
            }
        }
    }

    #[test]
    fn compresses_redundant_data() {
        let data = b"the quick brown fox jumps over the lazy dog ".repeat(500);
        let encoded = DeflateEncoder::new(&data).encode_zlib();

        assert!(encoded.len() < data.len() / 10);
        assert_eq!(inflate_zlib(&encoded), data);
    }

    #[test]
    fn empty_input() {
        let encoded = DeflateEncoder::new(&[]).encode_deflate();
        assert_eq!(encoded, [0x03, 0x00]);
        assert!(inflate_raw(&encoded).is_empty());

        let zlib = DeflateEncoder::new(&[]).encode_zlib();
        assert_eq!(&zlib[2..], &[0x03, 0x00, 0x00, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn large_stored_input_is_split() {
        let data: Vec<u8> = (0..200_000_u32).map(|x| (x * 7919 % 251) as u8).collect();
        let options = DeflateEncodingOptions::default().set_level(0);
        let encoded = DeflateEncoder::new_with_options(&data, options).encode_deflate();

        // four stored blocks, five bytes of header each
        assert_eq!(encoded.len(), data.len() + 4 * 5);
        assert_eq!(inflate_raw(&encoded), data);
    }

    #[test]
    fn non_final_segment_ends_with_sync_marker() {
        let data = image_like();
        let segment = DeflateEncoder::new(&data).encode_deflate_segment(false);

        assert_eq!(&segment[segment.len() - 4..], &[0x00, 0x00, 0xFF, 0xFF]);

        let empty = DeflateEncoder::new(&[]).encode_deflate_segment(false);
        assert_eq!(empty, [0x00, 0x00, 0x00, 0xFF, 0xFF]);
    }

    #[test]
    fn concatenated_segments_form_one_stream() {
        let data = image_like();
        let pieces: Vec<&[u8]> = data.chunks(40_000).collect();

        for strategy in STRATEGIES {
            let options = DeflateEncodingOptions::default().set_strategy(strategy);
            let mut stream = Vec::new();

            for (i, piece) in pieces.iter().enumerate() {
                let encoder = DeflateEncoder::new_with_options(piece, options);
                stream.extend(encoder.encode_deflate_segment(i + 1 == pieces.len()));
            }
            assert_eq!(inflate_raw(&stream), data, "{strategy:?}");
        }
    }

    #[test]
    fn zlib_header_is_valid() {
        for level in 0..=10 {
            for strategy in STRATEGIES {
                let options = DeflateEncodingOptions::default()
                    .set_level(level)
                    .set_strategy(strategy);
                let [cmf, flg] = options.zlib_header();

                assert_eq!(cmf, 0x78);
                assert_eq!((u16::from(cmf) << 8 | u16::from(flg)) % 31, 0);
                assert_eq!(flg & 0x20, 0, "no preset dictionary");
            }
        }
        assert_eq!(DeflateEncodingOptions::default().zlib_header(), [0x78, 0x9C]);
        assert_eq!(
            DeflateEncodingOptions::default().set_level(1).zlib_header(),
            [0x78, 0x01]
        );
        assert_eq!(
            DeflateEncodingOptions::default().set_level(9).zlib_header(),
            [0x78, 0xDA]
        );
    }

    #[test]
    fn level_is_clamped() {
        assert_eq!(DeflateEncodingOptions::default().set_level(200).level(), 10);
    }

    #[test]
    fn code_length_runs() {
        let mut lengths = vec![8_u8; 10];
        lengths.extend([0; 20]);
        lengths.extend([5, 5]);

        let items = run_length_encode(&lengths);
        assert_eq!(items, [(8, 0), (16, 3), (16, 0), (18, 9), (5, 0), (5, 0)]);
    }
}
