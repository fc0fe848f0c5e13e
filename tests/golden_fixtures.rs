use sbom_graph::{write_records, NodeKind, Record, Relation};
use serde_json::Value;
use std::path::Path;

fn load(path: &str) -> Value {
    let text = std::fs::read_to_string(Path::new(path))
        .unwrap_or_else(|e| panic!("failed to read {path}: {e}"));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("failed to parse {path}: {e}"))
}

fn write(path: &str) -> Vec<Record> {
    write_records(&load(path))
        .expect("fixture should write")
        .expect("fixture should be recognized")
}

fn find<'r>(records: &'r [Record], identity: &str) -> &'r Record {
    records
        .iter()
        .find(|r| r.identity() == Some(identity))
        .unwrap_or_else(|| panic!("no record {identity}"))
}

fn resolved(targets: &[Option<String>]) -> Vec<&str> {
    targets.iter().flatten().map(String::as_str).collect()
}

#[test]
fn golden_write_cyclonedx_minimal() {
    let records = write("tests/fixtures/cyclonedx/minimal.cdx.json");

    let identities: Vec<_> = records.iter().map(Record::identity).collect();
    assert_eq!(
        identities,
        vec![Some("Document_urn:uuid:1"), Some("Component_library_foo")]
    );
    assert_eq!(
        records[0].targets(Relation::Describes).unwrap(),
        &[Some("Component_library_foo".to_string())]
    );
    assert_eq!(records[0].attribute("specVersion"), Some(&Value::from("1.5")));
    assert!(records[1].edges.is_empty());
}

#[test]
fn golden_write_cyclonedx_full() {
    let records = write("tests/fixtures/cyclonedx/full.cdx.json");

    let identities: Vec<_> = records.iter().filter_map(Record::identity).collect();
    assert_eq!(
        identities,
        vec![
            "Component_application_acme-webapp",
            "Document_urn:uuid:3e671687-395b-41f5-a30f-a58921a69b79",
            "License_mit",
            "Reference_https://lodash.com",
            "Reference_https://github.com/lodash/lodash",
            "Component_library_lodash",
            "Reference_https://expressjs.com",
            "Component_library_express",
            "License_apache-2.0",
            "Component_library_openssl",
            "License_acme proprietary",
            "Component_framework_ui-kit",
            "Component_library_icons",
            "Vulnerability_CVE-2023-0286",
            "Vulnerability_GHSA-0000-0000-0000",
        ]
    );
    // Every record has an identity and none repeats
    assert_eq!(identities.len(), records.len());

    let document = &records[1];
    assert_eq!(document.kind, NodeKind::Document);
    assert_eq!(
        resolved(document.targets(Relation::Describes).unwrap()),
        vec![
            "Component_application_acme-webapp",
            "Component_library_lodash",
            "Component_library_express",
            "Component_library_openssl",
            "Component_framework_ui-kit",
        ]
    );
    assert_eq!(
        document.attribute("created_timestamp"),
        Some(&Value::from("2024-03-01T12:00:00Z"))
    );
    assert!(document.attribute("metadata").is_none());
    assert!(document.attribute("components").is_none());

    let mit = find(&records, "License_mit");
    assert_eq!(
        resolved(mit.targets(Relation::LicensedBy).unwrap()),
        vec!["Component_library_lodash", "Component_library_express"]
    );
    assert_eq!(mit.attribute("name"), Some(&Value::from("MIT")));
    assert_eq!(mit.attribute("spdx_valid"), Some(&Value::Bool(true)));
    assert_eq!(
        find(&records, "License_acme proprietary").attribute("spdx_valid"),
        Some(&Value::Bool(false))
    );

    let app = find(&records, "Component_application_acme-webapp");
    assert_eq!(
        resolved(app.targets(Relation::DependsOn).unwrap()),
        vec![
            "Component_library_express",
            "Component_library_lodash",
            "Component_framework_ui-kit",
        ]
    );

    // left-pad was never declared as a component
    let express = find(&records, "Component_library_express");
    assert_eq!(
        express.targets(Relation::DependsOn).unwrap(),
        &[Some("Component_library_openssl".to_string()), None]
    );
    assert_eq!(
        resolved(express.targets(Relation::References).unwrap()),
        vec!["Reference_https://expressjs.com"]
    );

    let lodash = find(&records, "Component_library_lodash");
    assert_eq!(lodash.targets(Relation::DependsOn), Some(&[][..]));
    assert!(lodash.attribute("licenses").is_none());
    assert!(lodash.attribute("externalReferences").is_none());

    // Entries without dependsOn produce no edges
    let ui_kit = find(&records, "Component_framework_ui-kit");
    assert!(ui_kit.targets(Relation::DependsOn).is_none());
    assert_eq!(
        resolved(ui_kit.targets(Relation::Contains).unwrap()),
        vec!["Component_library_icons"]
    );

    let cve = find(&records, "Vulnerability_CVE-2023-0286");
    assert_eq!(
        resolved(cve.targets(Relation::Affects).unwrap()),
        vec!["Component_library_openssl"]
    );
    assert_eq!(
        cve.attribute("ratings").and_then(|r| r.get("severity")),
        Some(&Value::from("high"))
    );

    let ghsa = find(&records, "Vulnerability_GHSA-0000-0000-0000");
    assert_eq!(ghsa.targets(Relation::Affects).unwrap(), &[None::<String>]);
}

#[test]
fn golden_write_spdx_minimal() {
    let records = write("tests/fixtures/spdx/minimal.spdx.json");

    assert_eq!(records.len(), 2);
    let document = &records[0];
    assert!(document.identity().unwrap().starts_with("Document_"));
    assert_eq!(document.attribute("bomFormat"), Some(&Value::from("SPDX")));
    assert_eq!(document.attribute("specVersion"), Some(&Value::from("SPDX-2.3")));
    assert_eq!(
        document.attribute("createdTimestamp"),
        Some(&Value::from("2024-01-01T00:00:00Z"))
    );
    assert_eq!(
        resolved(document.targets(Relation::Describes).unwrap()),
        vec!["Component_SPDXRef-1"]
    );
    assert_eq!(
        resolved(document.targets(Relation::Contains).unwrap()),
        vec!["Component_SPDXRef-1"]
    );
    assert_eq!(records[1].identity(), Some("Component_SPDXRef-1"));
}

#[test]
fn golden_write_spdx_github_export() {
    let records = write("tests/fixtures/spdx/github-export.spdx.json");

    assert_eq!(records.len(), 9);
    assert_eq!(records[0].kind, NodeKind::Document);

    let root = "Component_SPDXRef-com.github.octo-org-hello-world";
    let lodash = "Component_SPDXRef-npm-lodash-4.17.21";
    let express = "Component_SPDXRef-npm-express-4.18.2";

    let document = &records[0];
    assert_eq!(
        resolved(document.targets(Relation::Describes).unwrap()),
        vec![root, lodash, express, root, root]
    );
    assert_eq!(
        resolved(document.targets(Relation::RelationshipDependsOn).unwrap()),
        vec![lodash, express]
    );
    // DEV_DEPENDENCY_OF has no relation and is dropped
    assert_eq!(document.targets(Relation::DependencyOf), Some(&[][..]));

    let root_record = find(&records, root);
    assert_eq!(
        root_record.attribute("purl"),
        Some(&Value::from("pkg:github/octo-org/hello-world"))
    );
    assert!(root_record.attribute("licenseConcluded").is_none());
    assert_eq!(
        find(&records, "License_noassertion").attribute("spdx_valid"),
        Some(&Value::Bool(false))
    );

    // Declared and concluded both name MIT for lodash
    let mit = find(&records, "License_mit");
    assert_eq!(
        resolved(mit.targets(Relation::LicensedBy).unwrap()),
        vec![lodash, lodash, express]
    );

    assert_eq!(
        resolved(find(&records, express).targets(Relation::References).unwrap()),
        vec!["Reference_pkg:npm/express@4.18.2"]
    );
}

#[test]
fn golden_unrecognized_document() {
    let document = load("tests/fixtures/other/not-an-sbom.json");
    assert!(write_records(&document).unwrap().is_none());
}

#[test]
fn golden_missing_component_name() {
    let document = load("tests/fixtures/cyclonedx/missing-name.cdx.json");
    let err = write_records(&document).unwrap_err();
    assert!(err.is_structural());
    assert!(err.to_string().contains("component"));
}
