/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Payload writers and validation for the chunks preceding image data

use parpng_core::bytestream::{ByteIoError, SinkWriter};
use parpng_core::colorspace::ColorSpace;

use crate::constants::{MAX_DIMENSION, MAX_KEYWORD_LEN};
use crate::error::PngEncodeErrors;
use crate::raster::RasterView;

/// An ancillary chunk queued on the encoder, kept in insertion order
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum AncillaryChunk<'a> {
    /// An uncompressed iTXt entry
    Text { keyword: String, text: String },
    /// Any other ancillary chunk, written as is
    Custom { tag: [u8; 4], data: &'a [u8] }
}

impl AncillaryChunk<'_> {
    pub const fn tag(&self) -> [u8; 4] {
        match self {
            Self::Text { .. } => *b"iTXt",
            Self::Custom { tag, .. } => *tag
        }
    }

    /// Check the chunk can be written
    pub fn validate(&self) -> Result<(), PngEncodeErrors> {
        match self {
            Self::Text { keyword, .. } => validate_keyword(keyword),
            Self::Custom { tag, data } => {
                validate_ancillary_tag(*tag)?;

                if data.len() > MAX_DIMENSION as usize {
                    return Err(PngEncodeErrors::InvalidChunk(format!(
                        "Chunk {} is too long ({} bytes)",
                        tag_name(*tag),
                        data.len()
                    )));
                }
                Ok(())
            }
        }
    }

    pub fn write(&self, output: &mut SinkWriter<&mut Vec<u8>>) -> Result<(), ByteIoError> {
        match self {
            Self::Text { keyword, text } => write_itxt(keyword, text, output),
            Self::Custom { data, .. } => output.write_all(data)
        }
    }
}

/// Printable version of a chunk tag for messages
pub fn tag_name(tag: [u8; 4]) -> String {
    String::from_utf8_lossy(&tag).into_owned()
}

/// Text keywords are 1 to 79 printable characters
///
/// Keywords are Latin-1 in the file, restricting them to printable
/// ASCII keeps them identical in UTF-8
pub fn validate_keyword(keyword: &str) -> Result<(), PngEncodeErrors> {
    if keyword.is_empty() || keyword.len() > MAX_KEYWORD_LEN {
        return Err(PngEncodeErrors::InvalidChunk(format!(
            "Keyword must be 1 to {MAX_KEYWORD_LEN} bytes long, found {} bytes",
            keyword.len()
        )));
    }
    if let Some(c) = keyword.chars().find(|c| !(' '..='~').contains(c)) {
        return Err(PngEncodeErrors::InvalidChunk(format!(
            "Keyword {keyword:?} contains the invalid character {c:?}"
        )));
    }
    Ok(())
}

/// User supplied chunks must be ancillary with a valid tag
///
/// Bit 5 of each byte is a property flag, the first byte marks the chunk
/// ancillary when set, the third (reserved) must be clear.
pub fn validate_ancillary_tag(tag: [u8; 4]) -> Result<(), PngEncodeErrors> {
    if !tag.iter().all(u8::is_ascii_alphabetic) {
        return Err(PngEncodeErrors::InvalidChunk(format!(
            "Chunk tag {tag:?} is not four ASCII letters"
        )));
    }
    if tag[0].is_ascii_uppercase() {
        return Err(PngEncodeErrors::InvalidChunk(format!(
            "Chunk {} is critical, only ancillary chunks can be added",
            tag_name(tag)
        )));
    }
    if tag[2].is_ascii_lowercase() {
        return Err(PngEncodeErrors::InvalidChunk(format!(
            "Chunk {} sets the reserved bit",
            tag_name(tag)
        )));
    }
    Ok(())
}

/// Gamma is stored times 100000 as a non zero u32
pub fn validate_gamma(gamma: f32) -> Result<(), PngEncodeErrors> {
    let scaled = f64::from(gamma) * 100000.0;

    if !scaled.is_finite() || scaled < 1.0 || scaled > f64::from(u32::MAX) {
        return Err(PngEncodeErrors::InvalidChunk(format!(
            "Gamma {gamma} cannot be stored"
        )));
    }
    Ok(())
}

pub fn write_ihdr(
    raster: &RasterView, output: &mut SinkWriter<&mut Vec<u8>>
) -> Result<(), ByteIoError> {
    // width and height were checked against the png limit
    output.write_u32_be_err(raster.width() as u32)?;
    output.write_u32_be_err(raster.height() as u32)?;
    // depth
    output.write_u8_err(raster.depth().bit_size())?;
    // color type
    let color_int = match raster.colorspace() {
        ColorSpace::Luma => 0,
        ColorSpace::RGB => 2,
        ColorSpace::LumaA => 4,
        ColorSpace::RGBA => 6
    };
    output.write_u8_err(color_int)?;
    // compression method
    output.write_u8_err(0)?;
    // filter method, adaptive filtering with five types
    output.write_u8_err(0)?;
    // interlace method, always none
    output.write_u8_err(0)
}

pub fn write_gamma(gamma: f32, output: &mut SinkWriter<&mut Vec<u8>>) -> Result<(), ByteIoError> {
    // scale by 100000.0
    let gamma_value = (f64::from(gamma) * 100000.0).round() as u32;
    output.write_u32_be_err(gamma_value)
}

pub fn write_exif(exif: &[u8], output: &mut SinkWriter<&mut Vec<u8>>) -> Result<(), ByteIoError> {
    output.write_all(exif)
}

/// Uncompressed iTXt with empty language tag and translated keyword
pub fn write_itxt(
    keyword: &str, text: &str, output: &mut SinkWriter<&mut Vec<u8>>
) -> Result<(), ByteIoError> {
    output.write_all(keyword.as_bytes())?;
    // keyword terminator, compression flag, compression method
    output.write_all(&[0, 0, 0])?;
    // empty language tag and translated keyword, both null terminated
    output.write_all(&[0, 0])?;
    output.write_all(text.as_bytes())
}
