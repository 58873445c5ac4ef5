const UNITS: [&str; 8] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"];

/// Formats a byte count with binary (1024-based) units, e.g. "19.0B" or "1.5KiB".
pub fn pretty_byte_size(bytes: u64) -> String {
    let mut value = bytes as f64;

    for unit in UNITS {
        if value.abs() < 1024.0 {
            return format!("{:.1}{}B", value, unit);
        }
        value /= 1024.0;
    }

    format!("{:.1}YiB", value)
}
