//! Property-based tests for the record writers and attribute cleanup.
//!
//! Arbitrary JSON must never panic a writer. Generated CycloneDX documents
//! check identity uniqueness, promoted-key removal and bom-ref resolution.

use proptest::prelude::*;
use proptest::sample::select;
use sbom_graph::{clean_attributes, detect_format, write_records, Attributes, BomFormat, Relation};
use serde_json::{json, Map, Value};
use std::collections::HashSet;

const TYPES: &[&str] = &["library", "framework", "application"];
const NAMES: &[&str] = &["foo", "bar", "baz", "qux"];
const LICENSES: &[&str] = &["MIT", "Apache-2.0", "GPL-3.0-only", "Custom License"];

/// Keys promoted to records or edges by some writer.
const PROMOTED_KEYS: &[&str] = &[
    "components",
    "dependencies",
    "licenses",
    "externalReferences",
    "externalRefs",
    "packages",
    "relationships",
    "dependsOn",
    "affects",
];

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        select(vec![
            "bomFormat", "SPDXID", "components", "name", "type", "bom-ref", "licenses",
            "dependencies", "dependsOn", "ref", "packages", "relationships", "metadata",
        ])
        .prop_map(str::to_string),
        "[a-zA-Z]{1,8}",
    ]
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 _.-]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::btree_map(arb_key(), inner, 0..5)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Nested attribute maps. Keys may contain `_`, one of the delimiters.
fn arb_attributes() -> impl Strategy<Value = Attributes> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        "[a-z0-9]{0,6}".prop_map(Value::String),
    ];
    let value = leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-zA-Z0-9_]{1,6}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    });
    prop::collection::btree_map("[a-zA-Z0-9_]{1,6}", value, 0..6)
        .prop_map(|m| m.into_iter().collect::<Map<_, _>>())
}

/// A generated component: indices into `TYPES`, `NAMES` and `LICENSES`.
type ComponentSpec = (usize, usize, Option<usize>);

fn arb_components() -> impl Strategy<Value = Vec<ComponentSpec>> {
    prop::collection::vec(
        (
            0..TYPES.len(),
            0..NAMES.len(),
            prop::option::of(0..LICENSES.len()),
        ),
        1..8,
    )
}

fn bom_ref(spec: &ComponentSpec) -> String {
    format!("{}/{}", TYPES[spec.0], NAMES[spec.1])
}

fn identity(spec: &ComponentSpec) -> String {
    format!("Component_{}_{}", TYPES[spec.0], NAMES[spec.1])
}

/// Build a CycloneDX document whose every bom-ref resolves.
fn cyclonedx_document(components: &[ComponentSpec], dependencies: &[(usize, usize)]) -> Value {
    let component_values: Vec<Value> = components
        .iter()
        .map(|spec| {
            let mut component = json!({
                "type": TYPES[spec.0],
                "name": NAMES[spec.1],
                "bom-ref": bom_ref(spec),
                "externalReferences": [{"type": "website", "url": format!("https://{}.example", NAMES[spec.1])}],
            });
            if let Some(license) = spec.2 {
                component["licenses"] = json!([{"license": {"id": LICENSES[license]}}]);
            }
            component
        })
        .collect();

    let dependency_values: Vec<Value> = dependencies
        .iter()
        .map(|(from, to)| {
            let from = &components[from % components.len()];
            let to = &components[to % components.len()];
            json!({"ref": bom_ref(from), "dependsOn": [bom_ref(to)]})
        })
        .collect();

    let affected = bom_ref(&components[0]);
    json!({
        "bomFormat": "CycloneDX",
        "specVersion": "1.5",
        "serialNumber": "urn:uuid:prop",
        "components": component_values,
        "dependencies": dependency_values,
        "vulnerabilities": [{"id": "CVE-2024-0001", "affects": [{"ref": affected}]}],
    })
}

proptest! {
    // Writers only have to fail gracefully on random input, so these assert
    // no-panic rather than a particular result.
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn write_records_doesnt_panic(value in arb_json()) {
        let _ = write_records(&value);
        let _ = detect_format(&value);
    }

    #[test]
    fn cyclonedx_like_input_doesnt_panic(value in arb_json()) {
        if let Value::Object(mut map) = value {
            map.insert("bomFormat".to_string(), json!("CycloneDX"));
            let _ = write_records(&Value::Object(map));
        }
    }

    #[test]
    fn spdx_like_input_doesnt_panic(value in arb_json()) {
        if let Value::Object(mut map) = value {
            map.insert("SPDXID".to_string(), json!("SPDXRef-DOCUMENT"));
            let _ = write_records(&Value::Object(map));
        }
    }

    #[test]
    fn documents_without_markers_are_skipped(value in arb_json()) {
        if let Value::Object(mut map) = value {
            map.remove("bomFormat");
            map.remove("SPDXID");
            let document = Value::Object(map);
            prop_assert!(detect_format(&document).is_none());
            prop_assert!(matches!(write_records(&document), Ok(None)));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn identities_are_unique(
        components in arb_components(),
        dependencies in prop::collection::vec((0..8usize, 0..8usize), 0..10),
    ) {
        let records = write_records(&cyclonedx_document(&components, &dependencies))
            .unwrap()
            .unwrap();
        let mut seen = HashSet::new();
        for record in &records {
            let identity = record.identity().unwrap();
            prop_assert!(seen.insert(identity.to_string()), "duplicate identity {}", identity);
        }
    }

    #[test]
    fn promoted_keys_never_leak(
        components in arb_components(),
        dependencies in prop::collection::vec((0..8usize, 0..8usize), 0..10),
    ) {
        let records = write_records(&cyclonedx_document(&components, &dependencies))
            .unwrap()
            .unwrap();
        for record in &records {
            for key in PROMOTED_KEYS {
                prop_assert!(
                    record.attribute(key).is_none(),
                    "{:?} kept '{}'", record.identity, key
                );
            }
        }
    }

    #[test]
    fn bom_refs_resolve_to_component_identities(
        components in arb_components(),
        dependencies in prop::collection::vec((0..8usize, 0..8usize), 0..10),
    ) {
        let records = write_records(&cyclonedx_document(&components, &dependencies))
            .unwrap()
            .unwrap();

        let expected: HashSet<(String, String)> = dependencies
            .iter()
            .map(|(from, to)| {
                (
                    identity(&components[from % components.len()]),
                    identity(&components[to % components.len()]),
                )
            })
            .collect();

        let mut actual = HashSet::new();
        for record in &records {
            if let Some(targets) = record.targets(Relation::DependsOn) {
                for target in targets {
                    let target = target.clone();
                    prop_assert!(target.is_some(), "unresolved target on {:?}", record.identity);
                    actual.insert((record.identity.clone().unwrap_or_default(), target.unwrap_or_default()));
                }
            }
            if let Some(targets) = record.targets(Relation::Affects) {
                prop_assert_eq!(targets, &[Some(identity(&components[0]))][..]);
            }
        }
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn dispatch_follows_markers(value in arb_json()) {
        if let Value::Object(map) = value {
            let mut cyclonedx = map.clone();
            cyclonedx.insert("bomFormat".to_string(), json!("CycloneDX"));
            let detected = detect_format(&Value::Object(cyclonedx)).unwrap();
            prop_assert_eq!(detected.format, BomFormat::CycloneDx);

            let mut spdx = map;
            spdx.remove("bomFormat");
            spdx.insert("SPDXID".to_string(), json!("SPDXRef-DOCUMENT"));
            let detected = detect_format(&Value::Object(spdx)).unwrap();
            prop_assert_eq!(detected.format, BomFormat::Spdx);
        }
    }

    #[test]
    fn cleanup_is_idempotent(
        attributes in arb_attributes(),
        delimiter in select(vec![".", "_"]),
    ) {
        if let Ok(once) = clean_attributes(&attributes, delimiter) {
            let twice = clean_attributes(&once, delimiter).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
