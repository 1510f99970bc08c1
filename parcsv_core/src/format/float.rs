//! Float64 and Complex formatters (spec §4.1 "Float64", "Complex").
//!
//! Shortest-round-trip decimal formatting with 15 significant figures,
//! without runtime `log`, `pow`, or `sprintf` — ported from
//! `fwrite.c`'s `writeFloat64`, which itself cites `base R`'s
//! `format.c:formatReal`/`printutils.c:EncodeReal0` as prior art. The
//! three lookup tables it depends on live in `crate::tables`.

use crate::tables::{EXPPOW, EXPSIG, SIGPARTS};

const NUM_SF: u32 = 15;
const SIZE_SF: u64 = 1_000_000_000_000_000; // 10^NUM_SF

/// Write a finite, non-zero, positive `x`'s significant digits and
/// decimal exponent, computed via the bit-level mantissa/exponent
/// reconstruction `writeFloat64` uses (no `log10`/`pow`).
///
/// Returns `(l, sf, exp)`: `l` holds `sf` decimal digits (no leading or
/// trailing zero), and `exp` is the power of ten such that `x ≈
/// l_as_0.d... * 10^(exp+1)` (i.e. `exp` is the exponent if `l` were
/// written with the decimal point after its first digit).
fn significant_digits(x: f64) -> (u64, u32, i32) {
    let bits = x.to_bits();
    let fraction = bits & 0xF_FFFF_FFFF_FFFF; // 52-bit mantissa
    let exponent = ((bits >> 52) & 0x7FF) as usize;

    let mut acc = 0.0_f64;
    let mut i: i32 = 52;
    let mut frac = fraction;
    if frac != 0 {
        while frac & 0xFF == 0 {
            frac >>= 8;
            i -= 8;
        }
        while frac != 0 {
            if frac & 1 == 1 {
                acc += SIGPARTS[i as usize];
            }
            i -= 1;
            frac >>= 1;
        }
    }

    let mut y = (1.0 + acc) * EXPSIG[exponent];
    let mut exp = EXPPOW[exponent];
    if y >= 9.99999999999999 {
        y /= 10.0;
        exp += 1;
    }
    let mut l = (y * SIZE_SF as f64) as u64;
    if l % 10 >= 5 {
        l += 10;
    }
    l /= 10;

    if l == 0 {
        return (0, 0, exp);
    }
    let mut trail_zero = 0u32;
    while l % 10 == 0 {
        l /= 10;
        trail_zero += 1;
    }
    let mut sf = NUM_SF - trail_zero;
    if sf == 0 {
        sf = 1;
        exp += 1;
    }
    (l, sf, exp)
}

/// Write `x` to `buf` per spec §4.1's Float64 algorithm: non-finite
/// values, zero, sign, decimal-vs-scientific choice, and digit
/// emission all handled in place, as `fwrite.c`'s `writeFloat64` does.
pub fn write_float64(x: f64, dec: u8, scipen: u16, na: &[u8], buf: &mut Vec<u8>) {
    if x.is_nan() {
        buf.extend_from_slice(na);
        return;
    }
    if x == 0.0 {
        // Checked before the sign branch, same as upstream: -0.0 also
        // lands here and writes a bare "0" with no sign.
        buf.push(b'0');
        return;
    }
    if x.is_infinite() {
        if x < 0.0 {
            buf.push(b'-');
        }
        buf.extend_from_slice(b"Inf");
        return;
    }

    let negative = x < 0.0;
    if negative {
        buf.push(b'-');
    }
    let (l, sf, exp) = significant_digits(x.abs());
    if l == 0 {
        // Rounded up past all significant digits (e.g. 0.99999999999999996).
        if buf.last() == Some(&b'-') {
            buf.pop();
        }
        buf.push(b'0');
        return;
    }

    let dr_signed = sf as i32 - exp - 1; // digits right of the decimal point
    let (dr, dl0, width): (u32, u32, u32) = if dr_signed <= 0 {
        let dl0 = (-dr_signed) as u32;
        (0, dl0, sf + dl0)
    } else if sf > dr_signed as u32 {
        (dr_signed as u32, 0, sf + 1)
    } else {
        (dr_signed as u32, 1, dr_signed as u32 + 1 + 1)
    };

    let sci_exp_digits = if exp.unsigned_abs() > 99 { 3 } else { 2 };
    let decimal_width_budget = sf + u32::from(sf > 1) + 2 + sci_exp_digits + scipen as u32;

    if width <= decimal_width_budget {
        write_decimal(l, sf, dr, dl0, width, dec, buf);
    } else {
        write_scientific(l, sf, exp, dec, buf);
    }
}

/// Emit the plain-decimal rendering, mirroring `writeFloat64`'s
/// backward fill into a fixed-width window.
fn write_decimal(mut l: u64, mut sf: u32, mut dr: u32, mut dl0: u32, width: u32, dec: u8, buf: &mut Vec<u8>) {
    let width = width as usize;
    let mut out = vec![0u8; width];
    let mut pos = width;
    if dr > 0 {
        while dr > 0 && sf > 0 {
            pos -= 1;
            out[pos] = b'0' + (l % 10) as u8;
            l /= 10;
            dr -= 1;
            sf -= 1;
        }
        while dr > 0 {
            pos -= 1;
            out[pos] = b'0';
            dr -= 1;
        }
        pos -= 1;
        out[pos] = dec;
    }
    while dl0 > 0 {
        pos -= 1;
        out[pos] = b'0';
        dl0 -= 1;
    }
    while sf > 0 {
        pos -= 1;
        out[pos] = b'0' + (l % 10) as u8;
        l /= 10;
        sf -= 1;
    }
    debug_assert_eq!(pos, 0);
    buf.extend_from_slice(&out);
}

/// Emit the scientific rendering: `d[.ddd]e[+-]NN[N]`.
fn write_scientific(l: u64, sf: u32, mut exp: i32, dec: u8, buf: &mut Vec<u8>) {
    let sf = sf as usize;
    let mut digits_rev = Vec::with_capacity(sf);
    let mut lt = l;
    for _ in 0..sf {
        digits_rev.push(b'0' + (lt % 10) as u8);
        lt /= 10;
    }
    buf.push(digits_rev[sf - 1]);
    if sf > 1 {
        buf.push(dec);
        for &d in digits_rev[..sf - 1].iter().rev() {
            buf.push(d);
        }
    }
    buf.push(b'e');
    if exp < 0 {
        buf.push(b'-');
        exp = -exp;
    } else {
        buf.push(b'+');
    }
    if exp < 100 {
        buf.push(b'0' + (exp / 10) as u8);
        buf.push(b'0' + (exp % 10) as u8);
    } else {
        buf.push(b'0' + (exp / 100) as u8);
        buf.push(b'0' + ((exp / 10) % 10) as u8);
        buf.push(b'0' + (exp % 10) as u8);
    }
}

/// Write a complex number as `re[+-]imi`, per spec §4.1 "Complex": the
/// imaginary part (and its sign/`i` suffix) is only emitted when it's
/// not NaN — not even as the NA token.
pub fn write_complex(re: f64, im: f64, dec: u8, scipen: u16, na: &[u8], buf: &mut Vec<u8>) {
    write_float64(re, dec, scipen, na, buf);
    if !im.is_nan() {
        if im >= 0.0 {
            buf.push(b'+');
        }
        write_float64(im, dec, scipen, na, buf);
        buf.push(b'i');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(x: f64) -> String {
        let mut buf = Vec::new();
        write_float64(x, b'.', 0, b"", &mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn scenario_2_values() {
        // spec.md §8 scenario 2 (na="")
        assert_eq!(render(0.5), "0.5");
        assert_eq!(render(3.1416), "3.1416");
        assert_eq!(render(30460.0), "30460");
        assert_eq!(render(0.0072), "0.0072");
        assert_eq!(render(-0.0), "0");
        assert_eq!(render(f64::NAN), "");
        assert_eq!(render(f64::INFINITY), "Inf");
    }

    #[test]
    fn exact_binary_fractions_have_no_noise() {
        assert_eq!(render(0.75), "0.75");
        assert_eq!(render(0.25), "0.25");
        assert_eq!(render(2.0), "2");
        assert_eq!(render(-1.5), "-1.5");
    }

    #[test]
    fn negative_infinity() {
        assert_eq!(render(f64::NEG_INFINITY), "-Inf");
    }

    #[test]
    fn scientific_crossover() {
        // Very small/large magnitudes must switch to scientific notation.
        assert_eq!(render(1e-10), "1e-10");
        assert_eq!(render(1.23456789012345e300), "1.23456789012345e+300");
    }

    #[test]
    fn scipen_biases_toward_decimal() {
        let mut buf = Vec::new();
        write_float64(1e-10, b'.', 20, b"", &mut buf);
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "0.0000000001",
            "large scipen should force decimal form"
        );
    }

    #[test]
    fn custom_decimal_mark() {
        let mut buf = Vec::new();
        write_float64(3.14, b',', 0, b"", &mut buf);
        assert_eq!(String::from_utf8(buf).unwrap(), "3,14");
    }

    #[test]
    fn complex_basic() {
        let mut buf = Vec::new();
        write_complex(1.5, -2.5, b'.', 0, b"NA", &mut buf);
        assert_eq!(String::from_utf8(buf).unwrap(), "1.5-2.5i");

        let mut buf = Vec::new();
        write_complex(1.0, 2.0, b'.', 0, b"NA", &mut buf);
        assert_eq!(String::from_utf8(buf).unwrap(), "1+2i");

        // NaN imaginary part: real-only, no "i" suffix at all.
        let mut buf = Vec::new();
        write_complex(1.0, f64::NAN, b'.', 0, b"NA", &mut buf);
        assert_eq!(String::from_utf8(buf).unwrap(), "1");
    }
}
