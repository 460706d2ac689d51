//! Catalog integration tests: registration, lookup, decoding and comparison through
//! the public API.

mod common;

use common::fixtures;
use ldap_schema::schema::{
    AttributeType, LazyComparator, MatchingRule, ObjectClass, SchemaObject,
};
use ldap_schema::{Registries, SchemaDecoder, SchemaError, Value, load_schema_document};
use std::cmp::Ordering;

const SHOE_SIZE: &str = "1.3.6.1.4.1.42.1";

#[test]
fn test_registered_attribute_type_round_trips() {
    common::init_logging();
    let registries = Registries::bootstrap().unwrap();
    let handle = registries.handle();

    let at = AttributeType::new(SHOE_SIZE, &handle)
        .with_names(["shoeSize", "footSize"])
        .with_syntax("1.3.6.1.4.1.1466.115.121.1.27")
        .with_equality("integerMatch")
        .with_schema("shop");
    registries.attribute_types().register(at).unwrap();

    let by_oid = registries.attribute_types().lookup(SHOE_SIZE).unwrap();
    let by_name = registries.attribute_types().lookup("FOOTSIZE").unwrap();
    assert_eq!(by_oid.oid(), by_name.oid());
    assert_eq!(by_name.name(), "shoeSize");
    assert_eq!(
        registries.attribute_types().get_schema_name("shoesize").unwrap(),
        "shop"
    );

    let oids = registries.oids();
    assert_eq!(oids.get_oid("footsize").unwrap(), SHOE_SIZE);
    assert_eq!(oids.get_primary_name(SHOE_SIZE).unwrap(), "shoeSize");
    assert_eq!(
        oids.get_name_set(SHOE_SIZE).unwrap(),
        vec!["shoeSize".to_string(), "footSize".to_string()]
    );
}

#[test]
fn test_oid_is_unique_across_attribute_types_and_object_classes() {
    let registries = Registries::bootstrap().unwrap();
    let handle = registries.handle();

    let result = registries
        .object_classes()
        .register(ObjectClass::new("2.5.4.3", &handle).with_names(["cnClass"]));
    assert!(matches!(result, Err(SchemaError::AlreadyRegistered { .. })));

    let result = registries.attribute_types().register(
        AttributeType::new(SHOE_SIZE, &handle)
            .with_names(["cn"])
            .with_superior("name"),
    );
    assert!(matches!(result, Err(SchemaError::NameConflict { .. })));
    assert!(!registries.attribute_types().has(SHOE_SIZE));
}

#[test]
fn test_forward_references_resolve_once_registered() {
    let registries = Registries::bootstrap().unwrap();
    let handle = registries.handle();

    registries
        .object_classes()
        .register(
            ObjectClass::new("1.3.6.1.4.1.42.10", &handle)
                .with_names(["shopper"])
                .with_superiors(["person"])
                .with_may(["shoeSize"]),
        )
        .unwrap();
    let shopper = registries.object_classes().lookup("shopper").unwrap();
    assert!(shopper.may_attribute_types().unwrap_err().is_not_found());

    registries
        .attribute_types()
        .register(
            AttributeType::new(SHOE_SIZE, &handle)
                .with_names(["shoeSize"])
                .with_superior("name"),
        )
        .unwrap();
    let may = shopper.may_attribute_types().unwrap();
    assert_eq!(may.len(), 1);
    assert_eq!(may[0].oid(), SHOE_SIZE);
}

#[test]
fn test_equality_rule_registered_after_attribute_type() {
    let registries = Registries::bootstrap().unwrap();
    let handle = registries.handle();
    let at = registries
        .attribute_types()
        .register(
            AttributeType::new(SHOE_SIZE, &handle)
                .with_names(["shoeSize"])
                .with_syntax("1.3.6.1.4.1.1466.115.121.1.27")
                .with_equality("shoeSizeMatch"),
        )
        .unwrap();
    assert!(at.equality().unwrap_err().is_not_found());

    registries
        .matching_rules()
        .register(
            MatchingRule::new("1.3.6.1.4.1.42.20", &handle)
                .with_names(["shoeSizeMatch"])
                .with_syntax("1.3.6.1.4.1.1466.115.121.1.27"),
        )
        .unwrap();
    let equality = at.equality().unwrap().expect("equality rule set");
    assert_eq!(equality.oid(), "1.3.6.1.4.1.42.20");
}

#[test]
fn test_decoder_reports_raw_text_and_defaults_schema() {
    let registries = Registries::bootstrap().unwrap();
    let decoder = SchemaDecoder::new(&registries);

    let raw = "( NAME 'shoeSize' SYNTAX 1.3.6.1.4.1.1466.115.121.1.27 )";
    match decoder.parse_attribute_type(raw) {
        Err(SchemaError::InvalidSyntax { raw: reported, .. }) => assert_eq!(reported, raw),
        other => panic!("expected invalid syntax, got {:?}", other),
    }

    let at = decoder
        .parse_attribute_type("( 1.3.6.1.4.1.42.1 NAME 'shoeSize' SUP name )")
        .unwrap();
    assert_eq!(at.schema_name(), "other");
    assert_eq!(at.superior_oid(), Some("name"));
}

#[test]
fn test_dns_compare_equal_under_distinguished_name_match() {
    let registries = Registries::bootstrap().unwrap();
    let rule = registries
        .matching_rules()
        .lookup("distinguishedNameMatch")
        .unwrap();

    let left: Value = "cn=Alice,dc=example".into();
    let right: Value = "CN=alice, DC=Example".into();
    assert!(rule.matches(&left, &right).unwrap());

    let other: Value = "cn=Bob,dc=example".into();
    assert!(!rule.matches(&left, &other).unwrap());
}

#[test]
fn test_lazy_comparator_revives_against_later_registries() {
    let lazy = LazyComparator::new("2.5.13.14");
    let json = serde_json::to_string(&lazy).unwrap();

    let empty = Registries::new();
    let restored: LazyComparator = serde_json::from_str(&json).unwrap();
    assert!(restored.resolve(&empty).unwrap_err().is_not_found());
    assert!(!restored.is_resolved());

    let populated = Registries::bootstrap().unwrap();
    let ordering = restored
        .compare(&populated, &"42".into(), &"7".into())
        .unwrap();
    assert_eq!(ordering, Ordering::Greater);
    assert!(restored.is_resolved());
}

#[test]
fn test_shop_document_loads_into_bootstrap_catalog() {
    common::init_logging();
    let registries = Registries::bootstrap().unwrap();

    let loaded = load_schema_document(&registries, &fixtures::shop_schema()).unwrap();
    assert_eq!(loaded.len(), 4);
    assert!(loaded.iter().all(|object| object.schema_name == "shop"));

    let shoe_size = registries.attribute_types().lookup("shoeSize").unwrap();
    assert!(shoe_size.is_single_valued());
    assert_eq!(shoe_size.ordering().unwrap().unwrap().name(), "integerOrderingMatch");
    assert_eq!(
        shoe_size.normalize(&" 4 2 ".into()).unwrap(),
        Value::from("42")
    );

    let colour = registries.attribute_types().lookup("shoeColour").unwrap();
    assert!(colour.is_descendant_of("name").unwrap());

    let shopper = registries.object_classes().lookup("shopper").unwrap();
    let may: Vec<String> = shopper
        .may_attribute_types()
        .unwrap()
        .iter()
        .map(|at| at.name().to_string())
        .collect();
    assert_eq!(may, ["shoeSize", "shoeColor"]);

    let usage = registries.matching_rule_uses().lookup("2.5.13.14").unwrap();
    assert_eq!(usage.matching_rule().unwrap().name(), "integerMatch");
    assert_eq!(usage.applicable_attribute_types().unwrap()[0].oid(), SHOE_SIZE);
}

#[test]
fn test_failed_document_leaves_catalog_untouched() {
    let registries = Registries::bootstrap().unwrap();
    let before = registries.attribute_types().len();

    let document = format!(
        "{}\nattributetype ( 1.3.6.1.4.1.42.99 NAME 'shoeSize' SUP name )",
        fixtures::shop_schema()
    );
    let result = load_schema_document(&registries, &document);
    assert!(matches!(result, Err(SchemaError::NameConflict { .. })));
    assert_eq!(registries.attribute_types().len(), before);
    assert!(!registries.oids().has_oid("shoeSize"));
}
