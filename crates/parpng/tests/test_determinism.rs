/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Output must not depend on the number of threads, and the band
//! layout must not change the decoded pixels

use nanorand::Rng;
use parpng::{encode_to_vec, ImageDescriptor, PngEncoder, WorkerPool};
use parpng_core::options::{CompressionLevel, EncoderOptions, Strategy};

fn decode_ref(data: &[u8]) -> Vec<u8> {
    let decoder = png::Decoder::new(data);
    let mut reader = decoder.read_info().unwrap();

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).unwrap();
    buf.truncate(info.buffer_size());
    buf
}

fn test_image() -> (Vec<u8>, ImageDescriptor) {
    let (width, height) = (257_usize, 301_usize);
    let mut rng = nanorand::WyRand::new_seed(2023);
    let mut pixels = vec![0_u8; width * height * 4];

    for (i, px) in pixels.iter_mut().enumerate() {
        let noise: u8 = rng.generate_range(0..16);
        *px = ((i / 4 % width) as u8 ^ (i / (4 * width)) as u8).wrapping_add(noise);
    }
    (pixels, ImageDescriptor::new(width as u32, height as u32, 8, 4))
}

#[test]
fn identical_bytes_for_any_thread_count() {
    let (pixels, desc) = test_image();

    for strategy in [Strategy::Adaptive, Strategy::Huffman, Strategy::Fixed] {
        let base = EncoderOptions::new(CompressionLevel::Default, strategy).set_chunk_size(32 * 1024);
        let reference = encode_to_vec(&pixels, desc, base.set_num_threads(1)).unwrap();

        for threads in [2, 3, 8, 0] {
            let png = encode_to_vec(&pixels, desc, base.set_num_threads(threads)).unwrap();
            assert!(png == reference, "{strategy:?} differs with {threads} threads");
        }
    }
}

#[test]
fn injected_pool_overrides_thread_option() {
    let (pixels, desc) = test_image();
    let options = EncoderOptions::default()
        .set_band_rows(Some(16))
        .set_num_threads(1);

    let reference = encode_to_vec(&pixels, desc, options).unwrap();

    let mut encoder = PngEncoder::new(&pixels, desc, options);
    encoder.set_pool(WorkerPool::new(5));

    let mut png = Vec::new();
    encoder.encode(&mut png).unwrap();
    assert!(png == reference);
}

#[test]
fn band_layout_does_not_change_pixels() {
    let (pixels, desc) = test_image();
    let mut sizes = Vec::new();

    for band_rows in [None, Some(1), Some(7), Some(64), Some(10_000)] {
        let options = EncoderOptions::default()
            .set_band_rows(band_rows)
            .set_num_threads(4);
        let png = encode_to_vec(&pixels, desc, options).unwrap();

        assert_eq!(decode_ref(&png), pixels, "band rows {band_rows:?}");
        sizes.push(png.len());
    }
    // one row per band restarts the dictionary on every row
    assert!(sizes[1] > sizes[4]);
}

#[test]
fn repeated_encodes_are_identical() {
    let (pixels, desc) = test_image();
    let options = EncoderOptions::default().set_num_threads(4);

    let mut encoder = PngEncoder::new(&pixels, desc, options);
    let mut first = Vec::new();
    let mut second = Vec::new();

    encoder.encode(&mut first).unwrap();
    encoder.encode(&mut second).unwrap();
    assert!(first == second);
}
