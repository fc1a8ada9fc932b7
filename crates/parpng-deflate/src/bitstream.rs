/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Bit writer used by the deflate encoder
//!
//! Deflate packs bits starting from the least significant bit of each
//! byte, so bits are accumulated in a 64 bit buffer from the bottom
//! and whole bytes are moved out to the output vector.

pub struct BitStreamWriter {
    /// Bytes already flushed out of the buffer
    output:    Vec<u8>,
    /// Pending bits, lowest bits are written first
    buffer:    u64,
    /// Number of valid bits in `buffer`
    bits_left: u32
}

impl BitStreamWriter {
    pub fn with_capacity(capacity: usize) -> BitStreamWriter {
        BitStreamWriter {
            output:    Vec::with_capacity(capacity),
            buffer:    0,
            bits_left: 0
        }
    }

    /// Append the low `num_bits` bits of `value`
    ///
    /// `num_bits` must not exceed 32 and `value` must not have bits set
    /// above `num_bits`
    #[inline(always)]
    pub fn put_bits(&mut self, value: u32, num_bits: u32) {
        debug_assert!(num_bits <= 32);
        debug_assert!(num_bits == 32 || value >> num_bits == 0);

        self.buffer |= u64::from(value) << self.bits_left;
        self.bits_left += num_bits;

        if self.bits_left >= 32 {
            self.output
                .extend_from_slice(&(self.buffer as u32).to_le_bytes());
            self.buffer >>= 32;
            self.bits_left -= 32;
        }
    }

    /// Number of bits written so far, including pending ones
    pub fn bit_position(&self) -> u64 {
        (self.output.len() as u64) * 8 + u64::from(self.bits_left)
    }

    /// Pad the stream with zero bits up to the next byte boundary and
    /// move every pending byte into the output
    pub fn align_to_byte(&mut self) {
        let bytes = (self.bits_left + 7) / 8;

        for _ in 0..bytes {
            self.output.push(self.buffer as u8);
            self.buffer >>= 8;
        }
        self.buffer = 0;
        self.bits_left = 0;
    }

    /// Copy raw bytes into the stream, the stream must be byte aligned
    pub fn write_aligned_bytes(&mut self, bytes: &[u8]) {
        debug_assert_eq!(self.bits_left, 0, "stream not aligned");
        self.output.extend_from_slice(bytes);
    }

    /// Flush pending bits (zero padded) and return the bytes written
    pub fn finish(&mut self) -> Vec<u8> {
        self.align_to_byte();
        core::mem::take(&mut self.output)
    }
}
