//! Property tests for identifier normalization.

use proptest::prelude::*;

use microzoo::domain::value_objects::ComponentId;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: normalizing twice is the same as normalizing once.
    #[test]
    fn property_normalize_is_idempotent(name in "[A-Za-z0-9 _.\\t-]{0,40}") {
        let once = ComponentId::normalize(&name);
        let twice = ComponentId::normalize(once.as_str());
        prop_assert_eq!(once, twice);
    }

    /// PROPERTY: identifiers differing only in case normalize alike.
    #[test]
    fn property_normalize_ignores_ascii_case(name in "[A-Za-z][A-Za-z0-9_-]{0,20}") {
        prop_assert_eq!(
            ComponentId::normalize(&name.to_uppercase()),
            ComponentId::normalize(&name.to_lowercase())
        );
    }
}
