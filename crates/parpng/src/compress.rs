/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Compressing filtered bands into deflate segments

use log::trace;
use parpng_core::options::{EncoderOptions, FilterMode, FilterType, Strategy};
use parpng_deflate::{
    adler32_combine, calc_adler_hash, DeflateEncoder, DeflateEncodingOptions,
    DeflateEncodingStrategy
};

use crate::band::Band;

/// A compressed band, ready to be placed in IDAT chunks
#[derive(Debug, Clone)]
pub struct CompressedBand {
    /// Position of the band in the image
    pub index:    usize,
    /// Raw deflate segment
    pub deflated: Vec<u8>,
    /// Adler-32 of the filtered input
    pub adler:    u32,
    /// Length of the filtered input
    pub raw_len:  usize
}

/// Compresses bands with settings derived from the encoder options
#[derive(Debug, Copy, Clone)]
pub struct BandCompressor {
    options: DeflateEncodingOptions
}

impl BandCompressor {
    pub fn new(options: &EncoderOptions) -> BandCompressor {
        let strategy = match options.strategy() {
            Strategy::Adaptive => match options.filter() {
                // unfiltered rows do better with plain matching
                FilterMode::Fixed(FilterType::None) => DeflateEncodingStrategy::Default,
                _ => DeflateEncodingStrategy::Filtered
            },
            Strategy::Default => DeflateEncodingStrategy::Default,
            Strategy::Filtered => DeflateEncodingStrategy::Filtered,
            Strategy::Huffman => DeflateEncodingStrategy::HuffmanOnly,
            Strategy::Rle => DeflateEncodingStrategy::Rle,
            Strategy::Fixed => DeflateEncodingStrategy::Fixed
        };
        let level = options.compression_level().to_deflate_level();

        BandCompressor {
            options: DeflateEncodingOptions::default()
                .set_level(level)
                .set_strategy(strategy)
        }
    }

    pub const fn deflate_options(&self) -> DeflateEncodingOptions {
        self.options
    }

    /// The zlib header of the stream the bands form
    pub fn zlib_header(&self) -> [u8; 2] {
        self.options.zlib_header()
    }

    /// Compress one band with a fresh dictionary
    ///
    /// Only the last band of an image terminates the deflate stream.
    pub fn compress(&self, band: &Band, is_last: bool) -> CompressedBand {
        let encoder = DeflateEncoder::new_with_options(&band.filtered, self.options);
        let deflated = encoder.encode_deflate_segment(is_last);

        trace!(
            "Band {}: {} filtered bytes -> {} compressed bytes",
            band.index,
            band.filtered.len(),
            deflated.len()
        );

        CompressedBand {
            index: band.index,
            deflated,
            adler: calc_adler_hash(&band.filtered),
            raw_len: band.filtered.len()
        }
    }
}

/// Adler-32 of all bands joined in order
pub fn combined_adler(bands: &[CompressedBand]) -> u32 {
    bands
        .iter()
        .fold(1, |acc, band| adler32_combine(acc, band.adler, band.raw_len))
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use parpng_core::options::{EncoderOptions, FilterMode, FilterType, Strategy};
    use parpng_deflate::{calc_adler_hash, DeflateEncodingStrategy};

    use super::{combined_adler, BandCompressor};
    use crate::band::Band;

    fn band(index: usize, filtered: Vec<u8>) -> Band {
        Band {
            index,
            start_row: index,
            row_count: 1,
            filtered
        }
    }

    #[test]
    fn adaptive_strategy_mapping() {
        let options = EncoderOptions::default();
        assert_eq!(
            BandCompressor::new(&options).deflate_options().strategy(),
            DeflateEncodingStrategy::Filtered
        );

        let options = options.set_filter(FilterMode::Fixed(FilterType::None));
        assert_eq!(
            BandCompressor::new(&options).deflate_options().strategy(),
            DeflateEncodingStrategy::Default
        );

        let options = options.set_strategy(Strategy::Huffman);
        assert_eq!(
            BandCompressor::new(&options).deflate_options().strategy(),
            DeflateEncodingStrategy::HuffmanOnly
        );
    }

    #[test]
    fn bands_join_into_one_zlib_stream() {
        let compressor = BandCompressor::new(&EncoderOptions::default());
        let bands: Vec<Band> = (0..4)
            .map(|i| band(i, (0..5000_u32).map(|x| ((x * (i as u32 + 1)) % 97) as u8).collect()))
            .collect();

        let compressed: Vec<_> = bands
            .iter()
            .map(|b| compressor.compress(b, b.index == 3))
            .collect();

        let mut stream = compressor.zlib_header().to_vec();
        for c in &compressed {
            stream.extend_from_slice(&c.deflated);
        }
        stream.extend_from_slice(&combined_adler(&compressed).to_be_bytes());

        let expected: Vec<u8> = bands.iter().flat_map(|b| b.filtered.clone()).collect();
        assert_eq!(combined_adler(&compressed), calc_adler_hash(&expected));

        let mut decoded = Vec::new();
        flate2::read::ZlibDecoder::new(stream.as_slice())
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, expected);
    }
}
