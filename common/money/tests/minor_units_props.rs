use bigdecimal::BigDecimal;
use common_money::{from_minor_units, to_minor_units, MinorUnits};
use proptest::prelude::*;
use std::str::FromStr;

proptest! {
    // Any two-decimal major amount converts to exactly major*100 + cents.
    #[test]
    fn two_decimal_amounts_convert_exactly(major in 0i64..10_000_000, cents in 0i64..100) {
        let s = format!("{major}.{cents:02}");
        let bd = BigDecimal::from_str(&s).unwrap();
        prop_assert_eq!(to_minor_units(&bd).unwrap(), major * 100 + cents);
    }

    // Minor units survive a trip through the major representation used for invoice payments.
    #[test]
    fn minor_units_are_stable_through_major(minor in 0i64..1_000_000_000) {
        let major = from_minor_units(minor);
        prop_assert_eq!(MinorUnits::from_major(&major).unwrap().get(), minor);
    }

    // A non-zero third decimal is never silently dropped.
    #[test]
    fn third_decimal_is_rejected(major in 0i64..10_000, mills in 1i64..10) {
        let s = format!("{major}.00{mills}");
        let bd = BigDecimal::from_str(&s).unwrap();
        prop_assert!(to_minor_units(&bd).is_err());
    }
}
