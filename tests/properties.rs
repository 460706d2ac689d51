//! Property-based tests for identifiers and distinguished names.

use ldap_schema::dn::Dn;
use ldap_schema::oid::is_oid;
use ldap_schema::{Oid, Registries, Value};
use proptest::prelude::*;

fn numeric_oid() -> impl Strategy<Value = String> {
    (0u32..3, prop::collection::vec(0u32..100_000, 1..8)).prop_map(|(root, arcs)| {
        std::iter::once(root)
            .chain(arcs)
            .map(|arc| arc.to_string())
            .collect::<Vec<_>>()
            .join(".")
    })
}

fn descriptor() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,15}"
}

proptest! {
    #[test]
    fn prop_name_bindings_round_trip(
        oid in numeric_oid(),
        names in prop::collection::btree_set(descriptor(), 1..4),
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let registries = Registries::new();
        let oids = registries.oids();
        for name in &names {
            oids.register(name, &oid).unwrap();
        }

        for name in &names {
            prop_assert_eq!(oids.get_oid(&name.to_uppercase()).unwrap(), oid.clone());
        }
        prop_assert_eq!(oids.get_primary_name(&oid).unwrap(), names[0].clone());
        prop_assert_eq!(oids.get_name_set(&oid).unwrap(), names.clone());
        prop_assert!(oids.unregister(&oid).unwrap());
        prop_assert!(!oids.has_oid(&names[0]));
    }

    #[test]
    fn prop_numeric_oids_validate(oid in numeric_oid()) {
        prop_assert!(is_oid(&oid));
        let parsed = Oid::new(oid.clone()).unwrap();
        prop_assert_eq!(parsed.as_str(), oid.as_str());
    }

    #[test]
    fn prop_leading_zero_arcs_are_rejected(oid in numeric_oid(), arc in 1u32..1000) {
        let padded = format!("{}.0{}", oid, arc);
        prop_assert!(!is_oid(&padded));
        prop_assert!(Oid::new(padded).is_err());
    }

    #[test]
    fn prop_dn_match_ignores_case_and_type_aliases(
        cn in "[a-z][a-z0-9]{0,9}",
        dc in "[a-z][a-z0-9]{0,9}",
    ) {
        let registries = Registries::bootstrap().unwrap();
        let rule = registries.matching_rules().lookup("distinguishedNameMatch").unwrap();

        let left = Value::from(format!("cn={},dc={}", cn, dc));
        let right = Value::from(format!(
            "commonName={} , DC={}",
            cn.to_uppercase(),
            dc.to_uppercase()
        ));
        prop_assert!(rule.matches(&left, &right).unwrap());

        let parsed = Dn::parse(&format!("cn={}x,dc={}", cn, dc)).unwrap();
        prop_assert!(!rule.matches(&left, &Value::Dn(parsed)).unwrap());
    }
}
