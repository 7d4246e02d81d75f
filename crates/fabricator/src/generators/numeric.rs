//! Numeric value generators.

use rand::Rng;
use rust_decimal::Decimal;

/// Generate a random integer in the given range (inclusive).
pub fn int_in_range<R: Rng + ?Sized>(rng: &mut R, min: i64, max: i64) -> i64 {
    rng.gen_range(min..=max)
}

/// Generate a random float in the given range (inclusive).
pub fn float_in_range<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    rng.gen_range(min..=max)
}

/// Generate a random decimal that fits the declared precision and scale:
/// at most `precision` total digits, of which `scale` are fractional.
///
/// Works by drawing an integer mantissa bounded to `precision` digits and
/// applying the scale. Precision is clamped to the 28 digits an exact
/// 96-bit decimal can carry; a scale larger than the precision is clamped
/// down to it.
pub fn decimal_with_precision<R: Rng + ?Sized>(rng: &mut R, precision: u8, scale: u8) -> Decimal {
    let precision = precision.clamp(1, 28) as u32;
    let scale = (scale as u32).min(precision);
    let max_mantissa: i128 = 10i128.pow(precision) - 1;
    let mantissa = rng.gen_range(-max_mantissa..=max_mantissa);
    Decimal::from_i128_with_scale(mantissa, scale)
}
