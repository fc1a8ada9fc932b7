/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Writing png chunks to a sink

use parpng_core::bytestream::{ByteIoError, ByteSink, SinkWriter};

use crate::constants::{MAX_IDAT_LEN, PNG_SIGNATURE};
use crate::crc::calc_crc_with_bytes;
use crate::error::PngEncodeErrors;

/// What was written for a chunk
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ChunkRecord {
    pub tag:    [u8; 4],
    pub length: u32,
    pub crc:    u32
}

/// Frames data into chunks and writes them out in order
///
/// The assembler is the only writer of the sink during an encode,
/// nothing it has written is taken back on failure.
pub struct ChunkAssembler<T: ByteSink> {
    writer:  SinkWriter<T>,
    records: Vec<ChunkRecord>
}

impl<T: ByteSink> ChunkAssembler<T> {
    pub fn new(sink: T) -> ChunkAssembler<T> {
        ChunkAssembler {
            writer:  SinkWriter::new(sink),
            records: Vec::new()
        }
    }

    /// Forward the expected output size to the sink
    pub fn reserve(&mut self, size: usize) -> Result<(), PngEncodeErrors> {
        Ok(self.writer.reserve(size)?)
    }

    pub fn write_signature(&mut self) -> Result<(), PngEncodeErrors> {
        Ok(self.writer.write_u64_be_err(PNG_SIGNATURE)?)
    }

    /// Write a chunk whose data is spread over several slices
    ///
    /// Format is length, chunk type, data, crc of type and data
    pub fn write_chunk_parts(&mut self, tag: [u8; 4], parts: &[&[u8]]) -> Result<(), PngEncodeErrors> {
        let length = parts.iter().map(|p| p.len()).sum::<usize>();
        let length = u32::try_from(length)
            .map_err(|_| PngEncodeErrors::InvalidChunk(format!("Chunk of {length} bytes")))?;

        self.writer.write_u32_be_err(length)?;
        self.writer.write_all(&tag)?;

        // crc is a continuous function, so crc the tag first
        // and continue with every part
        let mut crc = calc_crc_with_bytes(&tag, u32::MAX);

        for part in parts {
            self.writer.write_all(part)?;
            crc = calc_crc_with_bytes(part, crc);
        }
        let crc = !crc;
        self.writer.write_u32_be_err(crc)?;

        self.records.push(ChunkRecord { tag, length, crc });
        Ok(())
    }

    pub fn write_chunk(&mut self, tag: [u8; 4], data: &[u8]) -> Result<(), PngEncodeErrors> {
        self.write_chunk_parts(tag, &[data])
    }

    /// Write a chunk whose data is produced by `func`
    ///
    /// Small chunks are built in a scratch buffer so their length is
    /// known before anything reaches the sink.
    pub fn write_header_fn<F>(&mut self, tag: [u8; 4], func: F) -> Result<(), PngEncodeErrors>
    where
        F: FnOnce(&mut SinkWriter<&mut Vec<u8>>) -> Result<(), ByteIoError>
    {
        let mut temp_space = Vec::with_capacity(32);
        func(&mut SinkWriter::new(&mut temp_space))?;

        self.write_chunk(tag, &temp_space)
    }

    /// Write the parts of the zlib stream belonging to one band
    ///
    /// The parts are written as one IDAT, or several when they exceed
    /// the IDAT size limit. Empty input writes nothing.
    pub fn write_idat_segment(&mut self, parts: &[&[u8]]) -> Result<(), PngEncodeErrors> {
        let mut left = parts.iter().map(|p| p.len()).sum::<usize>();
        let mut remaining = parts.iter().copied().filter(|p| !p.is_empty());
        let mut current: &[u8] = &[];

        while left > 0 {
            let chunk_len = left.min(MAX_IDAT_LEN);
            let mut pieces = Vec::with_capacity(parts.len());
            let mut needed = chunk_len;

            while needed > 0 {
                if current.is_empty() {
                    current = remaining.next().unwrap_or_default();
                }
                let take = needed.min(current.len());
                let (piece, rest) = current.split_at(take);

                pieces.push(piece);
                current = rest;
                needed -= take;
            }
            self.write_chunk_parts(*b"IDAT", &pieces)?;
            left -= chunk_len;
        }
        Ok(())
    }

    pub fn write_iend(&mut self) -> Result<(), PngEncodeErrors> {
        self.write_chunk(*b"IEND", &[])
    }

    pub fn bytes_written(&self) -> usize {
        self.writer.bytes_written()
    }

    pub fn records(&self) -> &[ChunkRecord] {
        &self.records
    }

    /// Flush the sink, returning the chunks written
    pub fn finish(mut self) -> Result<Vec<ChunkRecord>, PngEncodeErrors> {
        self.writer.flush()?;
        Ok(self.records)
    }
}
