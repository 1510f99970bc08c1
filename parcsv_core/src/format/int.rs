//! Integer formatters (spec §4.1 "Integers").
//!
//! Ported from `fwrite.c`'s `writeInt32`/`writeInt64`: generate digits
//! by repeated `% 10` into a scratch window, then reverse, avoiding
//! `itoa`-style library calls and any `log10` width computation.

fn write_int(x: i64, buf: &mut Vec<u8>) {
    let negative = x < 0;
    // i64::MIN negated overflows i64; widen to i128 the way the C
    // original sidesteps this by operating on the unsigned magnitude.
    let mut mag = (x as i128).unsigned_abs();
    if negative {
        buf.push(b'-');
    }
    let start = buf.len();
    loop {
        buf.push(b'0' + (mag % 10) as u8);
        mag /= 10;
        if mag == 0 {
            break;
        }
    }
    buf[start..].reverse();
}

/// Write a signed 32-bit integer, or the NA token if `x` is `None`.
pub fn write_int32(x: Option<i32>, na: &[u8], buf: &mut Vec<u8>) {
    match x {
        Some(v) => write_int(v as i64, buf),
        None => buf.extend_from_slice(na),
    }
}

/// Write a signed 64-bit integer, or the NA token if `x` is `None`.
pub fn write_int64(x: Option<i64>, na: &[u8], buf: &mut Vec<u8>) {
    match x {
        Some(v) => write_int(v, buf),
        None => buf.extend_from_slice(na),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render32(x: Option<i32>) -> String {
        let mut buf = Vec::new();
        write_int32(x, b"NA", &mut buf);
        String::from_utf8(buf).unwrap()
    }

    fn render64(x: Option<i64>) -> String {
        let mut buf = Vec::new();
        write_int64(x, b"NA", &mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn int32_basic() {
        assert_eq!(render32(Some(0)), "0");
        assert_eq!(render32(Some(1)), "1");
        assert_eq!(render32(Some(-1)), "-1");
        assert_eq!(render32(Some(i32::MAX)), "2147483647");
        assert_eq!(render32(Some(i32::MIN + 1)), "-2147483647");
        assert_eq!(render32(None), "NA");
    }

    #[test]
    fn int64_basic() {
        assert_eq!(render64(Some(0)), "0");
        assert_eq!(render64(Some(i64::MAX)), "9223372036854775807");
        assert_eq!(render64(Some(i64::MIN + 1)), "-9223372036854775807");
        assert_eq!(render64(None), "NA");
    }

    #[test]
    fn scenario_1_two_int32_columns() {
        // spec.md §8 scenario 1
        let mut out = Vec::new();
        for (a, b) in [(Some(1), Some(2)), (Some(3), None)] {
            write_int32(a, b"NA", &mut out);
            out.push(b',');
            write_int32(b, b"NA", &mut out);
            out.push(b'\n');
        }
        assert_eq!(String::from_utf8(out).unwrap(), "1,2\n3,NA\n");
    }
}
