use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use ua_forge::config::DEFAULT_FBRV_RANGE;
use ua_forge::fields::FbrvPrefix;

proptest! {
    #[test]
    fn prefixes_are_completed_to_nine_digits(prefix in "[0-9]{0,9}", seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let fbrv = FbrvPrefix::parse(Some(prefix.as_str()))
            .unwrap()
            .complete(&DEFAULT_FBRV_RANGE, &mut rng);

        prop_assert_eq!(fbrv.len(), 9);
        prop_assert!(fbrv.bytes().all(|b| b.is_ascii_digit()));
        prop_assert!(fbrv.starts_with(&prefix));
    }

    #[test]
    fn non_digit_values_are_rejected(raw in "[0-9]{0,4}[^0-9][0-9]{0,4}") {
        prop_assert!(FbrvPrefix::parse(Some(raw.as_str())).is_err());
    }
}

#[test]
fn complete_value_is_used_verbatim() {
    let mut rng = StdRng::seed_from_u64(0);
    let prefix = FbrvPrefix::parse(Some("123456789")).unwrap();

    for _ in 0..10 {
        assert_eq!(prefix.complete(&DEFAULT_FBRV_RANGE, &mut rng), "123456789");
    }
}

#[test]
fn leading_zeros_survive_completion() {
    let mut rng = StdRng::seed_from_u64(0);
    let fbrv = FbrvPrefix::parse(Some("00"))
        .unwrap()
        .complete(&DEFAULT_FBRV_RANGE, &mut rng);

    assert!(fbrv.starts_with("00"));
    assert_eq!(fbrv.len(), 9);
}
