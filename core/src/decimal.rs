//! Fixed-point decimal engine
//!
//! On-chain answers are signed integers that routinely exceed 53 bits, so
//! every price, rate and unit conversion is carried as an integer mantissa
//! plus a power-of-ten scale. Nothing in here touches floating point except
//! [`ScaledDecimal::to_f64`], which exists for informational payloads only.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_bigint::{BigInt, Sign};
use num_traits::{Signed, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CoreError, Result};

/// Power-of-ten exponents accepted by [`convert_unit`]
pub const UNIT_EXPONENTS: [u32; 7] = [0, 3, 6, 9, 12, 15, 18];

/// Default number of fractional digits for derived cross rates
pub const DERIVED_RATE_SCALE: u32 = 8;

/// `10^exp` as a big integer
pub fn pow10(exp: u32) -> BigInt {
    BigInt::from(10u32).pow(exp)
}

/// Render `mantissa / 10^scale` with exactly `scale` fractional digits.
///
/// A zero mantissa at scale 8 renders as `"0.00000000"`; scale 0 renders a
/// plain integer without a decimal point.
pub fn format(mantissa: &BigInt, scale: u32) -> String {
    let digits = mantissa.magnitude().to_string();
    let scale = scale as usize;

    let mut out = String::with_capacity(digits.len() + scale + 3);
    if mantissa.sign() == Sign::Minus {
        out.push('-');
    }

    if scale == 0 {
        out.push_str(&digits);
        return out;
    }

    if digits.len() <= scale {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take(scale - digits.len()));
        out.push_str(&digits);
    } else {
        let (integer, fraction) = digits.split_at(digits.len() - scale);
        out.push_str(integer);
        out.push('.');
        out.push_str(fraction);
    }

    out
}

/// Compute `(A / 10^scale_a) / (B / 10^scale_b)` at `result_scale` digits.
///
/// Evaluated as `A * 10^result_scale * 10^scale_b / (B * 10^scale_a)` in
/// integer arithmetic, truncating toward zero.
pub fn derive_rate(
    mantissa_a: &BigInt,
    scale_a: u32,
    mantissa_b: &BigInt,
    scale_b: u32,
    result_scale: u32,
) -> Result<ScaledDecimal> {
    if mantissa_b.is_zero() {
        return Err(CoreError::DivisionByZero);
    }

    let numerator = mantissa_a * pow10(result_scale) * pow10(scale_b);
    let denominator = mantissa_b * pow10(scale_a);

    Ok(ScaledDecimal::new(numerator / denominator, result_scale))
}

/// Re-express a decimal string given at `from_exponent` at `to_exponent`.
///
/// The value is first floored to an integer count of base units
/// (`value * 10^from_exponent`), then divided back out at `to_exponent`.
/// The result is normalized, so `convert_unit("1", 18, 9)` is `"1000000000"`.
pub fn convert_unit(value: &str, from_exponent: u32, to_exponent: u32) -> Result<String> {
    let base_units = to_base_units(value, from_exponent)?;
    validate_exponent(to_exponent)?;

    Ok(ScaledDecimal::new(base_units, to_exponent)
        .normalized()
        .to_string())
}

/// Floor a decimal string to an integer number of base units at `exponent`
pub fn to_base_units(value: &str, exponent: u32) -> Result<BigInt> {
    validate_exponent(exponent)?;
    let parsed = ScaledDecimal::parse(value)?;
    Ok(parsed.floor_at_exponent(exponent))
}

fn validate_exponent(exponent: u32) -> Result<()> {
    if UNIT_EXPONENTS.contains(&exponent) {
        Ok(())
    } else {
        Err(CoreError::InvalidUnit(exponent.to_string()))
    }
}

/// Named denominations of the native token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EthUnit {
    Wei,
    Kwei,
    Mwei,
    Gwei,
    Szabo,
    Finney,
    Ether,
}

impl EthUnit {
    /// Power-of-ten exponent relative to wei
    pub fn exponent(&self) -> u32 {
        match self {
            EthUnit::Wei => 0,
            EthUnit::Kwei => 3,
            EthUnit::Mwei => 6,
            EthUnit::Gwei => 9,
            EthUnit::Szabo => 12,
            EthUnit::Finney => 15,
            EthUnit::Ether => 18,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EthUnit::Wei => "wei",
            EthUnit::Kwei => "kwei",
            EthUnit::Mwei => "mwei",
            EthUnit::Gwei => "gwei",
            EthUnit::Szabo => "szabo",
            EthUnit::Finney => "finney",
            EthUnit::Ether => "ether",
        }
    }
}

impl fmt::Display for EthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for EthUnit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "wei" => Ok(EthUnit::Wei),
            "kwei" => Ok(EthUnit::Kwei),
            "mwei" => Ok(EthUnit::Mwei),
            "gwei" => Ok(EthUnit::Gwei),
            "szabo" => Ok(EthUnit::Szabo),
            "finney" => Ok(EthUnit::Finney),
            "ether" | "eth" => Ok(EthUnit::Ether),
            _ => Err(CoreError::InvalidUnit(s.to_string())),
        }
    }
}

/// Result of a named unit conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitConversion {
    pub input_value: String,
    pub input_unit: EthUnit,
    pub output_value: String,
    pub output_unit: EthUnit,
    pub in_wei: String,
}

/// Convert between named units, keeping the intermediate wei amount
pub fn convert_units(value: &str, from: EthUnit, to: EthUnit) -> Result<UnitConversion> {
    let in_wei = to_base_units(value, from.exponent())?;
    let output_value = ScaledDecimal::new(in_wei.clone(), to.exponent())
        .normalized()
        .to_string();

    Ok(UnitConversion {
        input_value: value.to_string(),
        input_unit: from,
        output_value,
        output_unit: to,
        in_wei: in_wei.to_string(),
    })
}

/// Signed fixed-point number: `mantissa / 10^scale`.
///
/// Equality and ordering are numeric, so `1.0` equals `1.00`.
#[derive(Debug, Clone)]
pub struct ScaledDecimal {
    mantissa: BigInt,
    scale: u32,
}

impl ScaledDecimal {
    pub fn new(mantissa: impl Into<BigInt>, scale: u32) -> Self {
        Self {
            mantissa: mantissa.into(),
            scale,
        }
    }

    pub fn zero() -> Self {
        Self::new(BigInt::zero(), 0)
    }

    pub fn mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa.is_negative()
    }

    pub fn abs(&self) -> Self {
        Self::new(self.mantissa.abs(), self.scale)
    }

    /// Parse a plain decimal string such as `"-1234.5678"`
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (integer, fraction) = body.split_once('.').unwrap_or((body, ""));
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());

        if (integer.is_empty() && fraction.is_empty()) || !all_digits(integer) || !all_digits(fraction) {
            return Err(CoreError::invalid_decimal(input));
        }

        let digits = format!("{}{}", integer, fraction);
        let magnitude = BigInt::parse_bytes(digits.as_bytes(), 10)
            .ok_or_else(|| CoreError::invalid_decimal(input))?;
        let mantissa = if negative { -magnitude } else { magnitude };

        Ok(Self::new(mantissa, fraction.len() as u32))
    }

    /// Change the scale, truncating toward zero when digits are dropped
    pub fn rescale(&self, scale: u32) -> Self {
        let mantissa = match scale.cmp(&self.scale) {
            Ordering::Equal => self.mantissa.clone(),
            Ordering::Greater => &self.mantissa * pow10(scale - self.scale),
            Ordering::Less => &self.mantissa / pow10(self.scale - scale),
        };
        Self::new(mantissa, scale)
    }

    /// Drop trailing fractional zeros
    pub fn normalized(&self) -> Self {
        let ten = BigInt::from(10u32);
        let mut mantissa = self.mantissa.clone();
        let mut scale = self.scale;

        while scale > 0 && !mantissa.is_zero() && (&mantissa % &ten).is_zero() {
            mantissa /= &ten;
            scale -= 1;
        }
        if mantissa.is_zero() {
            scale = 0;
        }

        Self::new(mantissa, scale)
    }

    /// `floor(self * 10^exponent)` as an integer
    fn floor_at_exponent(&self, exponent: u32) -> BigInt {
        if exponent >= self.scale {
            return &self.mantissa * pow10(exponent - self.scale);
        }

        let divisor = pow10(self.scale - exponent);
        let quotient = &self.mantissa / &divisor;
        let remainder = &self.mantissa % &divisor;
        if self.mantissa.is_negative() && !remainder.is_zero() {
            quotient - 1
        } else {
            quotient
        }
    }

    /// Cross rate `self / quote` at `result_scale` digits
    pub fn derive_rate(&self, quote: &ScaledDecimal, result_scale: u32) -> Result<ScaledDecimal> {
        derive_rate(&self.mantissa, self.scale, &quote.mantissa, quote.scale, result_scale)
    }

    /// `|self - previous| / |previous| * 100` at `scale` digits, truncated
    pub fn percent_change(&self, previous: &ScaledDecimal, scale: u32) -> Result<ScaledDecimal> {
        if previous.is_zero() {
            return Err(CoreError::DivisionByZero);
        }

        let common = self.scale.max(previous.scale);
        let current = self.rescale(common).mantissa;
        let base = previous.rescale(common).mantissa;

        let difference = (current - &base).abs();
        let numerator = difference * 100 * pow10(scale);

        Ok(Self::new(numerator / base.abs(), scale))
    }

    /// Lossy conversion for display-only fields
    pub fn to_f64(&self) -> Option<f64> {
        self.to_string().parse::<f64>().ok()
    }
}

impl fmt::Display for ScaledDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format(&self.mantissa, self.scale))
    }
}

impl FromStr for ScaledDecimal {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl PartialEq for ScaledDecimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScaledDecimal {}

impl PartialOrd for ScaledDecimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScaledDecimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let common = self.scale.max(other.scale);
        self.rescale(common).mantissa.cmp(&other.rescale(common).mantissa)
    }
}

impl std::ops::Sub for &ScaledDecimal {
    type Output = ScaledDecimal;

    fn sub(self, rhs: &ScaledDecimal) -> ScaledDecimal {
        let common = self.scale.max(rhs.scale);
        ScaledDecimal::new(
            self.rescale(common).mantissa - rhs.rescale(common).mantissa,
            common,
        )
    }
}

impl Serialize for ScaledDecimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ScaledDecimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Self::parse(&text).map_err(serde::de::Error::custom),
            Raw::Integer(value) => Ok(Self::new(value, 0)),
            Raw::Float(value) => Self::parse(&value.to_string()).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> ScaledDecimal {
        ScaledDecimal::parse(s).unwrap()
    }

    #[test]
    fn test_format_pads_fraction() {
        assert_eq!(format(&BigInt::from(0), 8), "0.00000000");
        assert_eq!(format(&BigInt::from(5), 3), "0.005");
        assert_eq!(format(&BigInt::from(250_000_000_000i64), 8), "2500.00000000");
        assert_eq!(format(&BigInt::from(42), 0), "42");
    }

    #[test]
    fn test_format_negative() {
        assert_eq!(format(&BigInt::from(-5), 3), "-0.005");
        assert_eq!(format(&BigInt::from(-123456), 2), "-1234.56");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(ScaledDecimal::parse("").is_err());
        assert!(ScaledDecimal::parse(".").is_err());
        assert!(ScaledDecimal::parse("1.2.3").is_err());
        assert!(ScaledDecimal::parse("1e18").is_err());
        assert!(ScaledDecimal::parse("--1").is_err());
    }

    #[test]
    fn test_numeric_equality_ignores_scale() {
        assert_eq!(dec("1.0"), dec("1.00000"));
        assert!(dec("1.01") > dec("1.0099"));
        assert!(dec("-2") < dec("-1.5"));
    }

    #[test]
    fn test_derive_rate_identity() {
        let a = BigInt::from(123_456_789u64);
        let rate = derive_rate(&a, 0, &a, 0, 8).unwrap();
        assert_eq!(rate.to_string(), "1.00000000");
    }

    #[test]
    fn test_derive_rate_three() {
        let rate = derive_rate(
            &BigInt::from(300_000_000u64),
            8,
            &BigInt::from(100_000_000u64),
            8,
            8,
        )
        .unwrap();
        assert_eq!(rate.to_string(), "3.00000000");
    }

    #[test]
    fn test_derive_rate_mixed_scales_truncates() {
        // 2000.00000000 (8 dp) / 1.080000000000000000 (18 dp) = 1851.85185185...
        let rate = derive_rate(
            &BigInt::from(200_000_000_000i64),
            8,
            &BigInt::parse_bytes(b"1080000000000000000", 10).unwrap(),
            18,
            8,
        )
        .unwrap();
        assert_eq!(rate.to_string(), "1851.85185185");
    }

    #[test]
    fn test_derive_rate_division_by_zero() {
        let err = derive_rate(&BigInt::from(1), 8, &BigInt::zero(), 8, 8).unwrap_err();
        assert_eq!(err, CoreError::DivisionByZero);
    }

    #[test]
    fn test_convert_unit_ether_to_gwei() {
        assert_eq!(convert_unit("1", 18, 9).unwrap(), "1000000000");
        assert_eq!(convert_unit("1.5", 9, 18).unwrap(), "0.0000000015");
        assert_eq!(convert_unit("2", 18, 0).unwrap(), "2000000000000000000");
    }

    #[test]
    fn test_convert_unit_floors_to_wei() {
        // 0.0000000000000000015 ether is 1.5 wei -> floored to 1 wei
        assert_eq!(convert_unit("0.0000000000000000015", 18, 0).unwrap(), "1");
        assert_eq!(convert_unit("-0.0000000000000000015", 18, 0).unwrap(), "-2");
    }

    #[test]
    fn test_convert_unit_rejects_unknown_exponent() {
        assert_eq!(
            convert_unit("1", 17, 9).unwrap_err(),
            CoreError::InvalidUnit("17".to_string())
        );
        assert!(convert_unit("1", 18, 2).is_err());
    }

    #[test]
    fn test_convert_units_report() {
        let report = convert_units("1", EthUnit::Gwei, EthUnit::Ether).unwrap();
        assert_eq!(report.in_wei, "1000000000");
        assert_eq!(report.output_value, "0.000000001");
        assert!("lamports".parse::<EthUnit>().is_err());
    }

    #[test]
    fn test_percent_change() {
        let change = dec("106").percent_change(&dec("100"), 4).unwrap();
        assert_eq!(change.to_string(), "6.0000");

        let change = dec("95.5").percent_change(&dec("100"), 4).unwrap();
        assert_eq!(change.to_string(), "4.5000");

        assert_eq!(
            dec("1").percent_change(&dec("0.000"), 4).unwrap_err(),
            CoreError::DivisionByZero
        );
    }

    #[test]
    fn test_rescale_truncates_toward_zero() {
        assert_eq!(dec("1.239").rescale(2).to_string(), "1.23");
        assert_eq!(dec("-1.239").rescale(2).to_string(), "-1.23");
        assert_eq!(dec("1.2").rescale(4).to_string(), "1.2000");
    }

    #[test]
    fn test_normalized() {
        assert_eq!(dec("1000000000.000").normalized().to_string(), "1000000000");
        assert_eq!(dec("0.000").normalized().to_string(), "0");
        assert_eq!(dec("-1.50").normalized().to_string(), "-1.5");
    }

    #[test]
    fn test_serde_as_string() {
        let value = dec("-12.340");
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, "\"-12.340\"");
        let back: ScaledDecimal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);

        let from_number: ScaledDecimal = serde_json::from_str("1000").unwrap();
        assert_eq!(from_number, dec("1000"));
    }
}
