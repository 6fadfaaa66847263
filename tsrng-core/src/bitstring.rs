// Idempotent MSB-first bit-string export (C11): `output.bin` rendered as
// an ASCII '0'/'1' file, truncated to `output_bits`.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Writes `out_bytes` as an MSB-first bit string to `txt_path`, stopping
/// at `output_bits` bits (or `out_bytes.len() * 8` if `output_bits == 0`).
///
/// Preconditions: none.
///
/// Postconditions: if `txt_path` already exists and is at least
/// `output_bits` bytes long, it is left untouched and this is a no-op --
/// the export is idempotent, matching the producer's own re-entrant
/// `ensure_output_text`.
pub fn ensure_output_text(
    txt_path: &Path,
    out_bytes: &[u8],
    output_bits: u64,
) -> io::Result<()> {
    let output_bits = if output_bits == 0 {
        out_bytes.len() as u64 * 8
    } else {
        output_bits
    };

    if let Ok(metadata) = fs::metadata(txt_path) {
        if metadata.len() >= output_bits {
            return Ok(());
        }
    }

    let mut file = fs::File::create(txt_path)?;
    let mut written: u64 = 0;
    'outer: for byte in out_bytes {
        for bit in (0..8).rev() {
            if written >= output_bits {
                break 'outer;
            }
            let ch = if (byte >> bit) & 1 == 1 { b'1' } else { b'0' };
            file.write_all(&[ch])?;
            written += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile_path::temp_path;

    mod tempfile_path {
        use std::path::PathBuf;
        use std::sync::atomic::{AtomicU64, Ordering};

        static COUNTER: AtomicU64 = AtomicU64::new(0);

        pub fn temp_path(label: &str) -> PathBuf {
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            std::env::temp_dir().join(format!("tsrng-bitstring-test-{label}-{n}.txt"))
        }
    }

    #[test]
    fn renders_bytes_msb_first() {
        let path = temp_path("msb-first");
        ensure_output_text(&path, &[0b1010_0000], 4).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "1010");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn zero_output_bits_renders_all_bytes() {
        let path = temp_path("zero-bits");
        ensure_output_text(&path, &[0xff, 0x00], 0).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "1111111100000000");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn existing_long_enough_file_is_left_untouched() {
        let path = temp_path("idempotent");
        std::fs::write(&path, "0000").unwrap();
        ensure_output_text(&path, &[0xff], 4).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "0000");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn existing_short_file_is_regenerated() {
        let path = temp_path("regenerate");
        std::fs::write(&path, "0").unwrap();
        ensure_output_text(&path, &[0xff], 8).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "11111111");
        std::fs::remove_file(&path).ok();
    }
}
