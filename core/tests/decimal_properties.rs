use num_bigint::{BigInt, Sign};
use proptest::prelude::*;
use sentinel_core::decimal::{self, ScaledDecimal};

fn mantissa_256() -> impl Strategy<Value = BigInt> {
    (any::<bool>(), prop::collection::vec(any::<u8>(), 0..=32)).prop_map(|(negative, bytes)| {
        let sign = if negative { Sign::Minus } else { Sign::Plus };
        BigInt::from_bytes_be(sign, &bytes)
    })
}

proptest! {
    #[test]
    fn format_then_parse_reproduces_value(mantissa in mantissa_256(), scale in 0u32..=18) {
        let rendered = decimal::format(&mantissa, scale);
        let parsed = ScaledDecimal::parse(&rendered).unwrap();

        prop_assert_eq!(parsed.mantissa(), &mantissa);
        prop_assert_eq!(parsed.scale(), scale);
    }

    #[test]
    fn format_has_exact_fraction_digits(mantissa in mantissa_256(), scale in 1u32..=18) {
        let rendered = decimal::format(&mantissa, scale);
        let fraction = rendered.split('.').nth(1).unwrap();

        prop_assert_eq!(fraction.len(), scale as usize);
        prop_assert!(rendered.matches('-').count() <= 1);
    }

    #[test]
    fn derive_rate_of_equal_values_is_one(value in 1i64..i64::MAX, scale in 0u32..=18) {
        let mantissa = BigInt::from(value);
        let rate = decimal::derive_rate(&mantissa, scale, &mantissa, scale, 8).unwrap();

        prop_assert_eq!(rate.to_string(), "1.00000000");
    }

    #[test]
    fn rescale_up_is_lossless(mantissa in mantissa_256(), scale in 0u32..=18, extra in 0u32..=18) {
        let value = ScaledDecimal::new(mantissa, scale);
        let widened = value.rescale(scale + extra);

        prop_assert_eq!(&widened, &value);
        let narrowed = widened.rescale(scale);
        prop_assert_eq!(narrowed.mantissa(), value.mantissa());
    }
}

#[test]
fn zero_renders_with_full_scale() {
    let zero = BigInt::from(0);
    assert_eq!(decimal::format(&zero, 0), "0");
    assert_eq!(decimal::format(&zero, 18), "0.000000000000000000");
    assert!(ScaledDecimal::parse("0.000000000000000000").unwrap().is_zero());
}
