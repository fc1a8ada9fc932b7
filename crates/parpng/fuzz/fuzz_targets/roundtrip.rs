#![no_main]
use libfuzzer_sys::fuzz_target;
use parpng::ImageDescriptor;
use parpng_core::options::{CompressionLevel, EncoderOptions, FilterMode, FilterType, Strategy};

fuzz_target!(|data: &[u8]| {
    if let Some((raw, encoded)) = encode_png(data) {
        let raw_decoded = decode_png(&encoded);
        assert_eq!(raw, raw_decoded);
    }
});

const METADATA_BYTES: usize = 5;

fn encode_png(data: &[u8]) -> Option<(&[u8], Vec<u8>)> {
    // we use the first few bytes of the fuzzer input
    // to randomize the PNG encoding settings
    // so we need at least that much to be present
    if data.len() <= METADATA_BYTES {
        return None;
    }

    // randomize height
    let height = u32::from(data[0]); // max 255
    if height == 0 {
        return None;
    }
    // randomize channels and depth
    let channels = data[1] % 4 + 1;
    let depth = if data[1] & 0x80 != 0 { 16 } else { 8 };
    // randomize filter
    let filter = match data[2] % 6 {
        0 => FilterMode::Adaptive,
        n => FilterMode::Fixed(FilterType::from_int(n - 1)?)
    };
    // randomize compression
    let strategy = match data[3] % 6 {
        0 => Strategy::Adaptive,
        1 => Strategy::Default,
        2 => Strategy::Filtered,
        3 => Strategy::Huffman,
        4 => Strategy::Rle,
        _ => Strategy::Fixed
    };
    let level = match data[4] % 4 {
        0 => CompressionLevel::Fast,
        1 => CompressionLevel::Default,
        2 => CompressionLevel::High,
        _ => CompressionLevel::Max
    };
    if strategy.skips_filtering() && !matches!(filter, FilterMode::Adaptive) {
        return None;
    }

    // infer the rest of the parameters
    let bytes_per_pixel = u32::from(channels) * depth / 8;
    let data = &data[METADATA_BYTES..];
    let width = data.len() as u32 / height / bytes_per_pixel;
    if width == 0 {
        return None;
    }
    let total_bytes = height.checked_mul(width)?.checked_mul(bytes_per_pixel)?;

    let data_to_encode = &data[..total_bytes as usize];
    let options = EncoderOptions::new(level, strategy)
        .set_filter(filter)
        .set_band_rows(Some(data.len() % 7 + 1))
        .set_num_threads(2);
    let desc = ImageDescriptor::new(width, height, depth as u8, channels);

    let output = parpng::encode_to_vec(data_to_encode, desc, options).expect("Encoding failed");

    Some((data_to_encode, output))
}

fn decode_png(data: &[u8]) -> Vec<u8> {
    let mut decoder = png::Decoder::new(data);
    decoder.set_transformations(png::Transformations::IDENTITY);

    let mut reader = decoder.read_info().expect("Failed to decode valid input data!");
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).unwrap();
    buf.truncate(info.buffer_size());
    buf
}
