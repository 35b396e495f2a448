//! Binary (1024-based) scaling of byte counts into human-readable strings.

/// Scale a raw byte count into a `"<value><unit>B"` string.
///
/// The unit is the largest of `""`, `K`, `M`, `G`, `T`, `P` that keeps the
/// scaled value below 1024; values beyond the petabyte range stay in `P`.
pub fn scale_bytes(bytes: u64) -> String {
    const FACTOR: f64 = 1024.0;
    const UNITS: [&str; 6] = ["", "K", "M", "G", "T", "P"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= FACTOR && unit < UNITS.len() - 1 {
        value /= FACTOR;
        unit += 1;
    }

    format!("{value:.2}{}B", UNITS[unit])
}
