/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! LZ77 string matching
//!
//! Input is turned into a sequence of [`Token`]s, either literals or
//! back references into the previous 32 KiB. Matches never reach
//! before the start of the input handed to the matcher, which is what
//! makes compressed segments independent of each other.

use crate::constants::{DEFLATE_MAX_MATCH_LEN, DEFLATE_MIN_MATCH_LEN, DEFLATE_WINDOW_SIZE};

const HASH_BITS: u32 = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;
const NIL: u32 = u32::MAX;

/// Length 3 matches further away than this cost more than the literals
const TOO_FAR: usize = 4096;

/// A literal byte or a (length, distance) pair
///
/// `dist == 0` marks a literal stored in `len`
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Token {
    pub len:  u16,
    pub dist: u16
}

impl Token {
    #[inline(always)]
    pub const fn literal(byte: u8) -> Token {
        Token {
            len:  byte as u16,
            dist: 0
        }
    }

    #[inline(always)]
    pub const fn reference(len: usize, dist: usize) -> Token {
        Token {
            len:  len as u16,
            dist: dist as u16
        }
    }

    #[inline(always)]
    pub const fn is_literal(self) -> bool {
        self.dist == 0
    }

    /// Number of input bytes this token stands for
    #[inline(always)]
    pub const fn input_len(self) -> usize {
        if self.is_literal() {
            1
        } else {
            self.len as usize
        }
    }
}

/// Search effort, mirrors zlib's configuration table
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MatchParams {
    /// Reduce chain search once a match this long is in hand
    pub good_length: usize,
    /// Do not try a lazy match once a match this long is in hand
    pub max_lazy:    usize,
    /// Stop searching once a match this long is found
    pub nice_length: usize,
    /// Maximum number of chain entries visited per search
    pub max_chain:   usize,
    /// Whether to defer a match by one byte looking for a longer one
    pub lazy:        bool
}

impl MatchParams {
    pub const fn from_level(level: u8) -> MatchParams {
        #[rustfmt::skip]
        let (good_length, max_lazy, nice_length, max_chain, lazy) = match level {
            0 | 1 => (4,   4,   8,   4,    false),
            2     => (4,   5,   16,  8,    false),
            3     => (4,   6,   32,  32,   false),
            4     => (4,   4,   16,  16,   true),
            5     => (8,   16,  32,  32,   true),
            6     => (8,   16,  128, 128,  true),
            7     => (8,   32,  128, 256,  true),
            8     => (32,  128, 258, 1024, true),
            9     => (32,  258, 258, 4096, true),
            _     => (258, 258, 258, 8192, true)
        };
        MatchParams {
            good_length,
            max_lazy,
            nice_length,
            max_chain,
            lazy
        }
    }
}

/// Which kind of matches may be produced
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MatchMode {
    /// Regular LZ77, matches shorter than `min_len` are dropped
    Lz77 { min_len: usize },
    /// Only runs of the previous byte (distance one)
    Rle,
    /// No matches at all
    LiteralsOnly
}

/// Tokenize `data` with the given effort and mode
pub fn tokenize(data: &[u8], params: MatchParams, mode: MatchMode) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(data.len() / 2 + 16);

    match mode {
        MatchMode::LiteralsOnly => {
            tokens.extend(data.iter().map(|&b| Token::literal(b)));
        }
        MatchMode::Rle => tokenize_rle(data, &mut tokens),
        MatchMode::Lz77 { min_len } => {
            let mut chains = HashChains::new(data);

            if params.lazy {
                chains.parse_lazy(params, min_len, &mut tokens);
            } else {
                chains.parse_greedy(params, min_len, &mut tokens);
            }
        }
    }
    tokens
}

fn tokenize_rle(data: &[u8], tokens: &mut Vec<Token>) {
    let mut pos = 0;

    while pos < data.len() {
        if pos > 0 {
            let previous = data[pos - 1];
            let run = data[pos..]
                .iter()
                .take(DEFLATE_MAX_MATCH_LEN)
                .take_while(|&&b| b == previous)
                .count();

            if run >= DEFLATE_MIN_MATCH_LEN {
                tokens.push(Token::reference(run, 1));
                pos += run;
                continue;
            }
        }
        tokens.push(Token::literal(data[pos]));
        pos += 1;
    }
}

struct HashChains<'a> {
    data: &'a [u8],
    head: Vec<u32>,
    prev: Vec<u32>
}

impl<'a> HashChains<'a> {
    fn new(data: &'a [u8]) -> HashChains<'a> {
        HashChains {
            data,
            head: vec![NIL; HASH_SIZE],
            prev: vec![NIL; data.len()]
        }
    }

    #[inline(always)]
    fn hash(&self, pos: usize) -> usize {
        let bytes = [self.data[pos], self.data[pos + 1], self.data[pos + 2], 0];
        (u32::from_le_bytes(bytes).wrapping_mul(0x9E37_79B1) >> (32 - HASH_BITS)) as usize
    }

    /// Insert `pos` into its chain, returning the previous chain head
    #[inline(always)]
    fn insert(&mut self, pos: usize) -> u32 {
        if pos + DEFLATE_MIN_MATCH_LEN > self.data.len() {
            return NIL;
        }
        let h = self.hash(pos);
        let old_head = self.head[h];
        self.prev[pos] = old_head;
        self.head[h] = pos as u32;
        old_head
    }

    /// Find the longest match for `pos` starting the walk at `candidate`
    ///
    /// Only matches strictly longer than `prev_len` are reported.
    fn longest_match(
        &self, pos: usize, mut candidate: u32, prev_len: usize, params: MatchParams
    ) -> (usize, usize) {
        let max_len = DEFLATE_MAX_MATCH_LEN.min(self.data.len() - pos);
        let mut best_len = prev_len.max(DEFLATE_MIN_MATCH_LEN - 1);

        if best_len >= max_len {
            return (0, 0);
        }
        let nice_length = params.nice_length.min(max_len);
        let mut chain = params.max_chain;

        if prev_len >= params.good_length {
            chain >>= 2;
        }
        let current = &self.data[pos..pos + max_len];
        let mut best_dist = 0;

        while candidate != NIL && chain > 0 {
            let start = candidate as usize;
            let dist = pos - start;

            if dist > DEFLATE_WINDOW_SIZE {
                break;
            }
            let window = &self.data[start..start + max_len];

            // cheap reject, the byte that would make this match better
            if window[best_len] == current[best_len] {
                let len = window
                    .iter()
                    .zip(current.iter())
                    .take_while(|(a, b)| a == b)
                    .count();

                if len > best_len {
                    best_len = len;
                    best_dist = dist;

                    if len >= nice_length {
                        break;
                    }
                }
            }
            candidate = self.prev[start];
            chain -= 1;
        }

        if best_dist == 0 {
            (0, 0)
        } else {
            (best_len, best_dist)
        }
    }

    #[inline(always)]
    fn acceptable(len: usize, dist: usize, min_len: usize) -> bool {
        len >= min_len && !(len == DEFLATE_MIN_MATCH_LEN && dist > TOO_FAR)
    }

    fn parse_greedy(&mut self, params: MatchParams, min_len: usize, tokens: &mut Vec<Token>) {
        let data = self.data;
        let mut pos = 0;

        while pos < data.len() {
            let candidate = self.insert(pos);
            let (len, dist) = if candidate != NIL {
                self.longest_match(pos, candidate, 0, params)
            } else {
                (0, 0)
            };

            if Self::acceptable(len, dist, min_len) {
                tokens.push(Token::reference(len, dist));

                for p in pos + 1..pos + len {
                    self.insert(p);
                }
                pos += len;
            } else {
                tokens.push(Token::literal(data[pos]));
                pos += 1;
            }
        }
    }

    fn parse_lazy(&mut self, params: MatchParams, min_len: usize, tokens: &mut Vec<Token>) {
        let data = self.data;
        let mut pos = 0;
        // match found at pos - 1, waiting to see if pos does better
        let mut prev_len = 0;
        let mut prev_dist = 0;
        let mut match_available = false;

        while pos < data.len() {
            let candidate = self.insert(pos);

            let (mut len, mut dist) = if candidate != NIL && prev_len < params.max_lazy {
                self.longest_match(pos, candidate, prev_len, params)
            } else {
                (0, 0)
            };
            if !Self::acceptable(len, dist, min_len) {
                len = 0;
                dist = 0;
            }

            if prev_len >= DEFLATE_MIN_MATCH_LEN && len <= prev_len {
                // the deferred match wins, pos - 1 and pos are already hashed
                tokens.push(Token::reference(prev_len, prev_dist));

                let end = pos - 1 + prev_len;
                for p in pos + 1..end {
                    self.insert(p);
                }
                pos = end;
                prev_len = 0;
                prev_dist = 0;
                match_available = false;
            } else {
                if match_available {
                    tokens.push(Token::literal(data[pos - 1]));
                }
                match_available = true;
                prev_len = len;
                prev_dist = dist;
                pos += 1;
            }
        }
        if match_available {
            tokens.push(Token::literal(data[pos - 1]));
        }
    }
}
