/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// Default amount of filtered input handed to a single compression band
pub const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

/// Smallest chunk size accepted, equal to the deflate window so
/// that restarting the dictionary at band edges stays cheap
pub const MIN_CHUNK_SIZE: usize = 32 * 1024;

/// How hard the compressor should look for matches
///
/// Levels are ordered, a higher level never searches less
/// than a lower one.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub enum CompressionLevel {
    /// Greedy matching with short hash chains
    Fast,
    /// Lazy matching, the usual zlib tradeoff
    #[default]
    Default,
    /// Lazy matching with long hash chains
    High,
    /// Exhaustive hash chain search, slow
    Max
}

impl CompressionLevel {
    /// The deflate level used by the compressor for this setting
    ///
    /// Levels follow zlib's meaning, `10` goes beyond zlib's level 9
    pub const fn to_deflate_level(self) -> u8 {
        match self {
            Self::Fast => 1,
            Self::Default => 6,
            Self::High => 9,
            Self::Max => 10
        }
    }
}

/// Pairing of the row filter heuristic and the compressor mode
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum Strategy {
    /// Filtered when rows get filtered, Default otherwise
    #[default]
    Adaptive,
    /// Plain LZ77 plus the cheapest block encoding
    Default,
    /// LZ77 which ignores short matches, tuned for filtered data
    Filtered,
    /// Huffman coding only, no string matching, rows are left unfiltered
    Huffman,
    /// Run length matches only, rows are left unfiltered
    Rle,
    /// LZ77 with the fixed huffman tables of the deflate spec
    Fixed
}

impl Strategy {
    /// Whether this strategy is defined to always use the `None` filter
    pub const fn skips_filtering(self) -> bool {
        matches!(self, Self::Huffman | Self::Rle)
    }
}

/// A png row filter type
///
/// Order of the variants matters, it is the tie-break order
/// used when two filters produce the same cost.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub enum FilterType {
    #[default]
    None,
    Sub,
    Up,
    Average,
    Paeth
}

impl FilterType {
    /// All filters in tie-break order
    pub const ALL: [FilterType; 5] = [
        FilterType::None,
        FilterType::Sub,
        FilterType::Up,
        FilterType::Average,
        FilterType::Paeth
    ];

    /// The byte prefixed to a filtered scanline
    pub const fn to_int(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Sub => 1,
            Self::Up => 2,
            Self::Average => 3,
            Self::Paeth => 4
        }
    }

    pub const fn from_int(int: u8) -> Option<FilterType> {
        match int {
            0 => Some(Self::None),
            1 => Some(Self::Sub),
            2 => Some(Self::Up),
            3 => Some(Self::Average),
            4 => Some(Self::Paeth),
            _ => None
        }
    }
}

/// How filters are chosen for each row
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum FilterMode {
    /// Let the strategy decide, trying all filters where it allows
    #[default]
    Adaptive,
    /// Use the same filter for every row
    Fixed(FilterType)
}

/// Options for the png encoder
///
/// Options are immutable for the duration of an encode call,
/// the setters consume and return the struct so they can be chained
///
/// # Example
/// ```
/// use parpng_core::options::{CompressionLevel, EncoderOptions, Strategy};
///
/// let options = EncoderOptions::default()
///     .set_compression_level(CompressionLevel::Fast)
///     .set_strategy(Strategy::Huffman)
///     .set_num_threads(2);
///
/// assert_eq!(options.strategy(), Strategy::Huffman);
/// ```
#[derive(Debug, Copy, Clone)]
pub struct EncoderOptions {
    compression_level: CompressionLevel,
    strategy:          Strategy,
    filter:            FilterMode,
    num_threads:       usize,
    chunk_size:        usize,
    band_rows:         Option<usize>
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            compression_level: CompressionLevel::Default,
            strategy:          Strategy::Adaptive,
            filter:            FilterMode::Adaptive,
            num_threads:       0,
            chunk_size:        DEFAULT_CHUNK_SIZE,
            band_rows:         None
        }
    }
}

impl EncoderOptions {
    /// Create options with the two settings every encode needs
    pub fn new(compression_level: CompressionLevel, strategy: Strategy) -> EncoderOptions {
        EncoderOptions {
            compression_level,
            strategy,
            ..Default::default()
        }
    }

    pub const fn compression_level(&self) -> CompressionLevel {
        self.compression_level
    }

    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub const fn filter(&self) -> FilterMode {
        self.filter
    }

    /// Return number of threads configured for encoding
    ///
    /// Zero means use whatever parallelism the machine reports
    pub const fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Number of filtered bytes a single band aims to hold
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Fixed number of rows per band, if one was set
    pub const fn band_rows(&self) -> Option<usize> {
        self.band_rows
    }

    /// Set compression effort
    pub fn set_compression_level(mut self, level: CompressionLevel) -> Self {
        self.compression_level = level;
        self
    }

    /// Set the filter and compressor strategy
    pub fn set_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set how row filters are picked
    pub fn set_filter(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }

    /// Set the number of threads allowed for encoding
    ///
    /// Zero means use the available parallelism
    pub fn set_num_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Set the number of filtered bytes compressed per band
    ///
    /// Each band restarts the deflate dictionary, so smaller bands
    /// mean more parallelism and a slightly worse ratio.
    /// Values below 32 KiB are rejected by the encoder.
    pub fn set_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Force a fixed number of rows per band, overriding the chunk size
    ///
    /// `None` restores the chunk size based partitioning
    pub fn set_band_rows(mut self, rows: Option<usize>) -> Self {
        self.band_rows = rows;
        self
    }
}
