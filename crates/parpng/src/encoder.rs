/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::borrow::Cow;

use log::{debug, trace};
use parpng_core::bytestream::ByteSink;
use parpng_core::options::{EncoderOptions, FilterMode, FilterType, MIN_CHUNK_SIZE};

use crate::assembler::{ChunkAssembler, ChunkRecord};
use crate::band::{partition, Band};
use crate::compress::{combined_adler, BandCompressor, CompressedBand};
use crate::error::PngEncodeErrors;
use crate::filters::FilterSelector;
use crate::headers::writers::{
    validate_gamma, write_exif, write_gamma, write_ihdr, AncillaryChunk
};
use crate::pool::WorkerPool;
use crate::raster::{ImageDescriptor, RasterView};

/// Where an encode currently is
///
/// `Failed` can be reached from every other state.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum EncodeState {
    /// Nothing done yet, or validating inputs
    #[default]
    Init,
    Filtering,
    Compressing,
    /// Writing chunks to the sink
    Assembling,
    Done,
    Failed
}

/// A png encoder that filters and compresses bands of rows in parallel
///
/// # Endianness
///
/// If you are encoding 16 bit data, it is expected that
/// the data is laid out in big endian, see [`encode_u16_png`]
/// for native endian input
///
/// # Example
/// ```
/// use parpng::{ImageDescriptor, PngEncoder};
/// use parpng_core::options::EncoderOptions;
///
/// let pixels = vec![128_u8; 16 * 16 * 3];
/// let descriptor = ImageDescriptor::new(16, 16, 8, 3);
///
/// let mut encoder = PngEncoder::new(&pixels, descriptor, EncoderOptions::default());
/// encoder.add_text("Software", "parpng");
///
/// let mut png = vec![];
/// encoder.encode(&mut png).unwrap();
/// assert_eq!(&png[1..4], b"PNG");
/// ```
pub struct PngEncoder<'a> {
    data:       &'a [u8],
    descriptor: ImageDescriptor,
    options:    EncoderOptions,
    pool:       Option<WorkerPool>,
    gamma:      Option<f32>,
    exif:       Option<&'a [u8]>,
    ancillary:  Vec<AncillaryChunk<'a>>,
    state:      EncodeState,
    chunks:     Vec<ChunkRecord>
}

impl<'a> PngEncoder<'a> {
    /// Create a new encoder for the pixels in `data`
    pub fn new(data: &'a [u8], descriptor: ImageDescriptor, options: EncoderOptions) -> PngEncoder<'a> {
        PngEncoder {
            data,
            descriptor,
            options,
            pool: None,
            gamma: None,
            exif: None,
            ancillary: Vec::new(),
            state: EncodeState::Init,
            chunks: Vec::new()
        }
    }

    /// Run on the given pool instead of one sized from the options
    pub fn set_pool(&mut self, pool: WorkerPool) {
        self.pool = Some(pool);
    }

    /// Add a gAMA chunk
    pub fn set_gamma(&mut self, gamma: f32) {
        self.gamma = Some(gamma);
    }

    /// Add exif data which will be encoded
    pub fn add_exif_segment(&mut self, exif: &'a [u8]) {
        self.exif = Some(exif);
    }

    /// Add a text entry, written as an uncompressed iTXt chunk
    pub fn add_text(&mut self, keyword: &str, text: &str) {
        self.ancillary.push(AncillaryChunk::Text {
            keyword: keyword.to_string(),
            text:    text.to_string()
        });
    }

    /// Add an arbitrary ancillary chunk
    ///
    /// The tag must be four ASCII letters with a lowercase first letter
    /// and an uppercase third letter, otherwise encoding fails.
    pub fn add_chunk(&mut self, tag: [u8; 4], data: &'a [u8]) {
        self.ancillary.push(AncillaryChunk::Custom { tag, data });
    }

    pub const fn state(&self) -> EncodeState {
        self.state
    }

    /// Chunks written by the last encode, in file order
    pub fn chunks(&self) -> &[ChunkRecord] {
        &self.chunks
    }

    /// Encode the image into `sink`, returning the number of bytes written
    ///
    /// # Errors
    /// Layout, option and chunk problems are reported before anything is
    /// written. Sink failures stop the encode, bytes already written stay.
    pub fn encode<T: ByteSink>(&mut self, sink: T) -> Result<usize, PngEncodeErrors> {
        self.state = EncodeState::Init;
        self.chunks.clear();

        let result = self.encode_inner(sink);

        if let Err(err) = &result {
            debug!("Encoding failed during {:?}: {err}", self.state);
            self.state = EncodeState::Failed;
        }
        result
    }

    fn validate_options(&self) -> Result<(), PngEncodeErrors> {
        let options = &self.options;

        if options.chunk_size() < MIN_CHUNK_SIZE {
            return Err(PngEncodeErrors::InvalidConfig(
                "Chunk size must be at least 32 KiB"
            ));
        }
        if options.band_rows() == Some(0) {
            return Err(PngEncodeErrors::InvalidConfig("Bands need at least one row"));
        }
        if options.strategy().skips_filtering() {
            if let FilterMode::Fixed(filter) = options.filter() {
                if filter != FilterType::None {
                    return Err(PngEncodeErrors::InvalidConfig(
                        "Huffman and Rle strategies cannot be combined with a filter"
                    ));
                }
            }
        }
        Ok(())
    }

    fn validate_chunks(&self) -> Result<(), PngEncodeErrors> {
        if let Some(gamma) = self.gamma {
            validate_gamma(gamma)?;
        }
        if let Some(exif) = self.exif {
            if exif.is_empty() {
                return Err(PngEncodeErrors::InvalidChunk(
                    "Empty eXIf payload".to_string()
                ));
            }
            AncillaryChunk::Custom {
                tag:  *b"eXIf",
                data: exif
            }
            .validate()?;
        }
        self.ancillary.iter().try_for_each(AncillaryChunk::validate)
    }

    fn encode_inner<T: ByteSink>(&mut self, sink: T) -> Result<usize, PngEncodeErrors> {
        let raster = RasterView::new(self.data, &self.descriptor)?;
        self.validate_options()?;
        self.validate_chunks()?;

        let pool = self
            .pool
            .unwrap_or_else(|| WorkerPool::new(self.options.num_threads()));

        trace!(
            "Encoding {}x{} {:?} {:?} image with {:?}",
            raster.width(),
            raster.height(),
            raster.colorspace(),
            raster.depth(),
            self.options
        );

        // filter
        self.state = EncodeState::Filtering;
        let bands = self.filter_bands(&raster, &pool)?;

        // compress
        self.state = EncodeState::Compressing;
        let compressor = BandCompressor::new(&self.options);
        let num_bands = bands.len();

        trace!(
            "Compressing {num_bands} bands with {:?}",
            compressor.deflate_options()
        );

        let compressed =
            pool.run(num_bands, |i| Ok(compressor.compress(&bands[i], i + 1 == num_bands)))?;
        drop(bands);

        // assemble
        self.state = EncodeState::Assembling;
        let mut assembler = ChunkAssembler::new(sink);

        let compressed_size = compressed.iter().map(|c| c.deflated.len()).sum::<usize>();
        assembler.reserve(compressed_size + 1024)?;

        let result = self.write_chunks(&mut assembler, &raster, &compressor, &compressed);
        // keep what was written even on failure
        self.chunks = assembler.records().to_vec();
        result?;

        let written = assembler.bytes_written();
        self.chunks = assembler.finish()?;
        self.state = EncodeState::Done;

        debug!("Wrote {written} bytes in {} chunks", self.chunks.len());
        Ok(written)
    }

    fn filter_bands(&self, raster: &RasterView, pool: &WorkerPool) -> Result<Vec<Band>, PngEncodeErrors> {
        let plan = partition(raster.height(), raster.row_bytes(), &self.options);

        pool.run(plan.len(), |i| {
            let mut band = plan[i].clone();
            let mut selector = FilterSelector::new(
                self.options.strategy(),
                self.options.filter(),
                raster.bpp(),
                raster.row_bytes()
            );
            band.filter(raster, &mut selector);
            Ok(band)
        })
    }

    fn write_chunks<T: ByteSink>(
        &self, assembler: &mut ChunkAssembler<T>, raster: &RasterView, compressor: &BandCompressor,
        compressed: &[CompressedBand]
    ) -> Result<(), PngEncodeErrors> {
        assembler.write_signature()?;
        assembler.write_header_fn(*b"IHDR", |w| write_ihdr(raster, w))?;

        if let Some(gamma) = self.gamma {
            assembler.write_header_fn(*b"gAMA", |w| write_gamma(gamma, w))?;
        }
        if let Some(exif) = self.exif {
            assembler.write_header_fn(*b"eXIf", |w| write_exif(exif, w))?;
        }
        for chunk in &self.ancillary {
            assembler.write_header_fn(chunk.tag(), |w| chunk.write(w))?;
        }

        let header = compressor.zlib_header();
        let trailer = combined_adler(compressed).to_be_bytes();
        let last = compressed.len() - 1;

        for (i, band) in compressed.iter().enumerate() {
            debug_assert_eq!(band.index, i, "bands out of order");

            let prefix: &[u8] = if i == 0 { &header } else { &[] };
            let suffix: &[u8] = if i == last { &trailer } else { &[] };

            assembler.write_idat_segment(&[prefix, &band.deflated, suffix])?;
        }
        assembler.write_iend()
    }
}

/// Encode 8 bit, or big endian 16 bit, pixels into `sink`
///
/// Returns the number of bytes written
pub fn encode_png<T: ByteSink>(
    data: &[u8], descriptor: ImageDescriptor, options: EncoderOptions, sink: T
) -> Result<usize, PngEncodeErrors> {
    PngEncoder::new(data, descriptor, options).encode(sink)
}

/// Encode native endian 16 bit samples into `sink`
///
/// The descriptor must have a bit depth of 16, its row stride
/// is measured in bytes.
pub fn encode_u16_png<T: ByteSink>(
    data: &[u16], descriptor: ImageDescriptor, options: EncoderOptions, sink: T
) -> Result<usize, PngEncodeErrors> {
    if descriptor.bit_depth() != 16 {
        return Err(PngEncodeErrors::InvalidLayout(format!(
            "16 bit samples given for a bit depth of {}",
            descriptor.bit_depth()
        )));
    }
    if descriptor.row_stride() % 2 != 0 {
        return Err(PngEncodeErrors::InvalidLayout(format!(
            "Row stride {} does not split into 16 bit samples",
            descriptor.row_stride()
        )));
    }
    let bytes: Cow<[u8]> = if cfg!(target_endian = "big") {
        Cow::Borrowed(bytemuck::cast_slice(data))
    } else {
        Cow::Owned(data.iter().flat_map(|x| x.to_be_bytes()).collect())
    };
    encode_png(&bytes, descriptor, options, sink)
}

/// Encode into a freshly allocated vector
pub fn encode_to_vec(
    data: &[u8], descriptor: ImageDescriptor, options: EncoderOptions
) -> Result<Vec<u8>, PngEncodeErrors> {
    let mut output = Vec::new();
    encode_png(data, descriptor, options, &mut output)?;
    Ok(output)
}
