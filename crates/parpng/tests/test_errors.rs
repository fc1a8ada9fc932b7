/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::io::Write;

use parpng::{encode_png, encode_u16_png, EncodeState, ImageDescriptor, PngEncodeErrors, PngEncoder};
use parpng_core::bytestream::{ByteIoError, ByteSink, WriteSink};
use parpng_core::options::EncoderOptions;

/// Accepts `budget` bytes, then reports zero progress
struct StallingSink {
    budget:  usize,
    written: Vec<u8>
}

impl ByteSink for StallingSink {
    fn write_bytes(&mut self, buf: &[u8]) -> Result<usize, ByteIoError> {
        let n = buf.len().min(self.budget);
        self.written.extend_from_slice(&buf[..n]);
        self.budget -= n;
        Ok(n)
    }

    fn flush_bytes(&mut self) -> Result<(), ByteIoError> {
        Ok(())
    }
}

/// A writer that fails every write
struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed"))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn short_stride_is_invalid_layout() {
    let data = vec![0_u8; 1000];
    let desc = ImageDescriptor::new(10, 10, 8, 3).set_row_stride(29);

    let mut out = Vec::new();
    let err = encode_png(&data, desc, EncoderOptions::default(), &mut out).unwrap_err();

    assert!(matches!(err, PngEncodeErrors::InvalidLayout(_)), "{err:?}");
    assert!(out.is_empty());
}

#[test]
fn short_buffer_is_invalid_layout() {
    let data = vec![0_u8; 10 * 10 * 3 - 1];
    let mut out = Vec::new();
    let err = encode_png(&data, ImageDescriptor::new(10, 10, 8, 3), EncoderOptions::default(), &mut out)
        .unwrap_err();

    assert!(matches!(err, PngEncodeErrors::InvalidLayout(_)));
    assert!(out.is_empty());
}

#[test]
fn u16_entry_needs_sixteen_bit_descriptor() {
    let samples = vec![0_u16; 16];
    let mut out = Vec::new();
    let err = encode_u16_png(&samples, ImageDescriptor::new(4, 4, 8, 1), EncoderOptions::default(), &mut out)
        .unwrap_err();

    assert!(matches!(err, PngEncodeErrors::InvalidLayout(_)));
}

#[test]
fn u16_entry_rejects_odd_stride() {
    // 7 bytes per row would split the first sample of row 1
    let samples = [0x0102_u16, 0x0304, 0x0506, 0x0700, 0x0809, 0x0A0B, 0x0C0D];
    let desc = ImageDescriptor::new(3, 2, 16, 1).set_row_stride(7);

    let mut out = Vec::new();
    let err = encode_u16_png(&samples, desc, EncoderOptions::default(), &mut out).unwrap_err();

    assert!(matches!(err, PngEncodeErrors::InvalidLayout(_)));
    assert!(out.is_empty());

    // the same samples with an even stride encode fine
    let desc = ImageDescriptor::new(3, 2, 16, 1).set_row_stride(8);
    let samples = [0x0102_u16, 0x0304, 0x0506, 0x0000, 0x0809, 0x0A0B, 0x0C0D, 0x0000];
    assert!(encode_u16_png(&samples, desc, EncoderOptions::default(), &mut out).is_ok());
}

#[test]
fn sink_accepting_nothing() {
    let data = vec![3_u8; 16 * 16];

    for budget in [0, 20, 60] {
        let mut sink = StallingSink {
            budget,
            written: Vec::new()
        };
        let mut encoder = PngEncoder::new(&data, ImageDescriptor::new(16, 16, 8, 1), EncoderOptions::default());
        let err = encoder.encode(&mut sink).unwrap_err();

        assert!(matches!(err, PngEncodeErrors::EncodeIoError(_)), "{err:?}");
        assert_eq!(encoder.state(), EncodeState::Failed);
        // what made it out stays there
        assert_eq!(sink.written.len(), budget);
    }
}

#[test]
fn fixed_buffer_too_small() {
    let data = vec![3_u8; 16 * 16];
    let mut storage = [0_u8; 40];
    let sink: &mut [u8] = &mut storage;

    let err = encode_png(&data, ImageDescriptor::new(16, 16, 8, 1), EncoderOptions::default(), sink)
        .unwrap_err();
    assert!(matches!(err, PngEncodeErrors::EncodeIoError(_)));
}

#[test]
fn failing_writer_is_sink_write_error() {
    let data = vec![3_u8; 16 * 16];
    let err = encode_png(
        &data,
        ImageDescriptor::new(16, 16, 8, 1),
        EncoderOptions::default(),
        WriteSink::new(FailingWriter)
    )
    .unwrap_err();

    assert!(matches!(err, PngEncodeErrors::SinkWriteError(_)), "{err:?}");
    assert!(err.to_string().contains("pipe closed"));
}

#[test]
fn write_sink_over_file_like_writer() {
    let data = vec![3_u8; 16 * 16];
    let mut sink = WriteSink::new(std::io::Cursor::new(Vec::new()));

    let written = encode_png(&data, ImageDescriptor::new(16, 16, 8, 1), EncoderOptions::default(), &mut sink)
        .unwrap();
    assert_eq!(written, sink.get_ref().get_ref().len());
}
