//! Boolean formatters (spec §4.1 "Bool8", "Bool32AsString").
//!
//! `fwrite.c`'s `writeBool8` uses a branchless "write then retract"
//! trick (`*pch = ch - (x==INT8_MIN)`) to avoid a branch in the common
//! case. Rust's `Option<bool>` already removes the sentinel-comparison
//! entirely, so the direct `match` below is both simpler and behaves
//! identically: NA emits the NA token, otherwise `'0'`/`'1'`.

/// Write `'0'`/`'1'` for `Some`, the NA token for `None`.
pub fn write_bool8(x: Option<bool>, na: &[u8], buf: &mut Vec<u8>) {
    match x {
        Some(b) => buf.push(if b { b'1' } else { b'0' }),
        None => buf.extend_from_slice(na),
    }
}

/// Identical observable behavior to [`write_bool8`]; kept as a distinct
/// entry point because the upstream has two independent writer
/// functions (`writeBool8`/`writeBool32`) selectable per column.
pub fn write_bool32(x: Option<bool>, na: &[u8], buf: &mut Vec<u8>) {
    write_bool8(x, na, buf)
}

/// Write `TRUE`/`FALSE` for `Some`, the NA token for `None`.
pub fn write_bool32_as_string(x: Option<bool>, na: &[u8], buf: &mut Vec<u8>) {
    match x {
        Some(true) => buf.extend_from_slice(b"TRUE"),
        Some(false) => buf.extend_from_slice(b"FALSE"),
        None => buf.extend_from_slice(na),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl Fn(Option<bool>, &[u8], &mut Vec<u8>)) -> Vec<(Option<bool>, String)> {
        [Some(true), Some(false), None]
            .into_iter()
            .map(|v| {
                let mut buf = Vec::new();
                f(v, b"NA", &mut buf);
                (v, String::from_utf8(buf).unwrap())
            })
            .collect()
    }

    #[test]
    fn bool8_values() {
        assert_eq!(
            render(write_bool8),
            vec![
                (Some(true), "1".to_string()),
                (Some(false), "0".to_string()),
                (None, "NA".to_string()),
            ]
        );
    }

    #[test]
    fn bool32_as_string_values() {
        assert_eq!(
            render(write_bool32_as_string),
            vec![
                (Some(true), "TRUE".to_string()),
                (Some(false), "FALSE".to_string()),
                (None, "NA".to_string()),
            ]
        );
    }
}
