/// Largest prime below 2^16, the modulus of Adler-32
const ADLER_BASE: u64 = 65521;

/// Calculate the Adler-32 checksum of `data`
#[cfg(feature = "zlib")]
pub fn calc_adler_hash(data: &[u8]) -> u32 {
    use simd_adler32::Adler32;

    let mut hasher = Adler32::new();

    hasher.write(data);

    hasher.finish()
}

/// Combine the Adler-32 of two consecutive buffers
///
/// Given `adler1` of buffer `A` and `adler2` of buffer `B` (which is
/// `len2` bytes long), returns the Adler-32 of `A` followed by `B`
/// without touching the data again.
///
/// # Example
/// ```
/// use parpng_deflate::{adler32_combine, calc_adler_hash};
///
/// let (a, b) = (b"Hello ".as_slice(), b"world".as_slice());
/// let combined = adler32_combine(calc_adler_hash(a), calc_adler_hash(b), b.len());
/// assert_eq!(combined, calc_adler_hash(b"Hello world"));
/// ```
pub fn adler32_combine(adler1: u32, adler2: u32, len2: usize) -> u32 {
    let rem = (len2 as u64) % ADLER_BASE;

    let a1 = u64::from(adler1 & 0xFFFF);
    let b1 = u64::from(adler1 >> 16);
    let a2 = u64::from(adler2 & 0xFFFF);
    let b2 = u64::from(adler2 >> 16);

    // a = a1 + a2 - 1, b = b1 + b2 + rem * a1 - rem (all mod BASE)
    let sum1 = (a1 + a2 + ADLER_BASE - 1) % ADLER_BASE;
    let sum2 = (b1 + b2 + rem * a1 + ADLER_BASE - rem) % ADLER_BASE;

    (sum1 | (sum2 << 16)) as u32
}
