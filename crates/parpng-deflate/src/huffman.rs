/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Length limited canonical Huffman codes
//!
//! Code lengths come from a regular Huffman tree built with the two queue
//! method over frequency sorted symbols. When the tree is deeper than the
//! format allows, lengths are folded back into range by repairing the
//! Kraft sum, the same approach miniz and zlib use.

/// A prefix code ready for writing, codes are already bit reversed
/// so they can be pushed LSB first
#[derive(Clone)]
pub struct HuffmanTable<const N: usize> {
    pub lengths: [u8; N],
    pub codes:   [u16; N]
}

impl<const N: usize> HuffmanTable<N> {
    /// Build an optimal code for `freqs` whose lengths never exceed `max_len`
    pub fn from_frequencies(freqs: &[u32; N], max_len: u8) -> HuffmanTable<N> {
        let mut lengths = [0; N];
        build_code_lengths(freqs, max_len, &mut lengths);

        HuffmanTable::from_lengths(lengths)
    }

    /// Build the canonical code for a set of lengths
    pub fn from_lengths(lengths: [u8; N]) -> HuffmanTable<N> {
        let mut codes = [0; N];
        build_canonical_codes(&lengths, &mut codes);

        HuffmanTable { lengths, codes }
    }

    /// Number of bits needed to write symbols with these frequencies
    pub fn cost(&self, freqs: &[u32; N]) -> u64 {
        freqs
            .iter()
            .zip(self.lengths.iter())
            .map(|(&f, &l)| u64::from(f) * u64::from(l))
            .sum()
    }
}

/// Compute length limited code lengths for the given frequencies
///
/// Every symbol with a non-zero frequency gets a length in `1..=max_len`,
/// all others get zero.
///
/// At least two symbols always receive a code, padding with unused symbols
/// if needed, so the resulting code is complete. Some inflaters reject
/// a code with a single one bit codeword.
pub fn build_code_lengths(freqs: &[u32], max_len: u8, lengths: &mut [u8]) {
    debug_assert_eq!(freqs.len(), lengths.len());
    debug_assert!(freqs.len() >= 2);

    lengths.iter_mut().for_each(|x| *x = 0);

    // (frequency, symbol) for all used symbols
    let mut symbols: Vec<(u32, u16)> = freqs
        .iter()
        .enumerate()
        .filter(|(_, &f)| f != 0)
        .map(|(sym, &f)| (f, sym as u16))
        .collect();

    let mut filler = 0;
    while symbols.len() < 2 {
        if !symbols.iter().any(|&(_, s)| usize::from(s) == filler) {
            symbols.push((1, filler as u16));
        }
        filler += 1;
    }
    symbols.sort_unstable();

    let num_leaves = symbols.len();
    let num_nodes = 2 * num_leaves - 1;

    let mut weight = vec![0_u64; num_nodes];
    let mut parent = vec![0_usize; num_nodes];

    for (w, &(f, _)) in weight.iter_mut().zip(symbols.iter()) {
        *w = u64::from(f);
    }
    // Leaves are consumed in sorted order, internal nodes are created
    // with non decreasing weights, so both queues stay sorted.
    let mut next_leaf = 0;
    let mut next_inner = num_leaves;

    for node in num_leaves..num_nodes {
        let mut children = [0; 2];

        for child in children.iter_mut() {
            let take_leaf = next_leaf < num_leaves
                && (next_inner >= node || weight[next_leaf] <= weight[next_inner]);

            if take_leaf {
                *child = next_leaf;
                next_leaf += 1;
            } else {
                *child = next_inner;
                next_inner += 1;
            }
        }
        weight[node] = weight[children[0]] + weight[children[1]];
        parent[children[0]] = node;
        parent[children[1]] = node;
    }

    // parents always have a higher index than their children
    let mut depth = vec![0_usize; num_nodes];
    for node in (0..num_nodes - 1).rev() {
        depth[node] = depth[parent[node]] + 1;
    }

    let max_len = usize::from(max_len);
    let mut num_codes = vec![0_u32; max_len + 1];

    for &d in &depth[..num_leaves] {
        num_codes[d.min(max_len)] += 1;
    }

    // Folding long codes into max_len over-subscribes the code,
    // push codes down until the Kraft sum is exactly one
    let mut total: u64 = (1..=max_len)
        .map(|len| u64::from(num_codes[len]) << (max_len - len))
        .sum();

    while total != 1 << max_len {
        num_codes[max_len] -= 1;

        for len in (1..max_len).rev() {
            if num_codes[len] != 0 {
                num_codes[len] -= 1;
                num_codes[len + 1] += 2;
                break;
            }
        }
        total -= 1;
    }

    // least frequent symbols get the longest codes
    let mut sym_iter = symbols.iter();

    for len in (1..=max_len).rev() {
        for _ in 0..num_codes[len] {
            if let Some(&(_, sym)) = sym_iter.next() {
                lengths[usize::from(sym)] = len as u8;
            }
        }
    }
}

/// Assign canonical codes for `lengths`, reversed for LSB first output
pub fn build_canonical_codes(lengths: &[u8], codes: &mut [u16]) {
    let mut len_counts = [0_u16; 16];

    for &len in lengths {
        len_counts[usize::from(len)] += 1;
    }
    len_counts[0] = 0;

    let mut next_code = [0_u16; 16];
    let mut code = 0_u16;

    for bits in 1..16 {
        code = (code + len_counts[bits - 1]) << 1;
        next_code[bits] = code;
    }

    for (&len, out) in lengths.iter().zip(codes.iter_mut()) {
        if len != 0 {
            let len = usize::from(len);
            *out = reverse_bits(next_code[len], len as u32);
            next_code[len] += 1;
        } else {
            *out = 0;
        }
    }
}

#[inline]
fn reverse_bits(code: u16, length: u32) -> u16 {
    code.reverse_bits() >> (16 - length)
}
