//! Hex plus ASCII dump of message payloads.

use std::fmt::Write;

/// Bytes per row.
const WIDTH: usize = 16;

/// Render `bytes` as rows of `offset  xx xx ..  |ascii|`.
///
/// Offsets are 8 lowercase hex digits. Short final rows are padded so the
/// ASCII column stays aligned; non-printable bytes show as `.`.
///
/// # Examples
///
/// ```rust
/// use ufan_cli::presentation::format_hex_dump;
///
/// let dump = format_hex_dump(b"hi");
/// assert!(dump.starts_with("00000000  68 69 "));
/// assert!(dump.ends_with(" |hi|\n"));
/// ```
pub fn format_hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (row, chunk) in bytes.chunks(WIDTH).enumerate() {
        let _ = write!(out, "{:08x}  ", row * WIDTH);
        for column in 0..WIDTH {
            match chunk.get(column) {
                Some(b) => {
                    let _ = write!(out, "{b:02x} ");
                }
                None => out.push_str("   "),
            }
        }
        out.push_str(" |");
        out.extend(chunk.iter().map(|&b| {
            if b == b' ' || b.is_ascii_graphic() {
                char::from(b)
            } else {
                '.'
            }
        }));
        out.push_str("|\n");
    }
    out
}

/// Print one received message with its header line.
pub fn print_message(payload: &[u8]) {
    println!("---- message ({} bytes) ----", payload.len());
    print!("{}", format_hex_dump(payload));
}
