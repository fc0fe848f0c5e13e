//! SPDX SBOM writer.
//!
//! Supports SPDX 2.x JSON documents. Packages are keyed by their `SPDXID`;
//! relationships are expanded onto the Document record without checking
//! that the related element was emitted.

use super::fields::{
    expect_object, list, reference_record, rename_key, scalar_text, summarize, text_field,
    without_keys,
};
use super::license::license_record;
use super::traits::{RecordBuffer, SbomWriter};
use crate::error::{Result, SbomGraphError};
use crate::model::{Edges, NodeKind, Record, Relation};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Package fields that each produce License records.
const LICENSE_FIELDS: &[&str] = &["licenseDeclared", "licenseConcluded", "licenseInfoFromFiles"];

/// Relations every SPDX Document record carries, in order.
const DOCUMENT_RELATIONS: &[Relation] = &[
    Relation::Describes,
    Relation::RelationshipDependsOn,
    Relation::DependencyOf,
    Relation::DescribedBy,
    Relation::Contains,
];

/// Writer for SPDX documents.
pub struct SpdxWriter<'a> {
    bom: &'a Value,
    records: RecordBuffer,
}

impl<'a> SpdxWriter<'a> {
    /// Create a writer for one parsed SPDX document.
    #[must_use]
    pub fn new(bom: &'a Value) -> Self {
        Self {
            bom,
            records: RecordBuffer::new(),
        }
    }

    fn write_bom(&mut self, bom: &Map<String, Value>) -> Result<()> {
        let identity = NodeKind::Document.identity(&[&Uuid::new_v4().to_string()]);

        let mut attributes = without_keys(bom, &["creationInfo", "packages", "relationships"]);
        match bom.get("creationInfo") {
            Some(Value::Object(creation_info)) => {
                for (key, value) in creation_info {
                    attributes.insert(key.clone(), value.clone());
                }
            }
            Some(Value::Null) | None => {}
            Some(other) => tracing::warn!(
                "Ignoring creationInfo that is not an object: {}",
                summarize(other)
            ),
        }
        rename_key(&mut attributes, "spdxVersion", "specVersion");
        rename_key(&mut attributes, "created", "createdTimestamp");
        attributes.insert("bomFormat".to_string(), Value::String("SPDX".to_string()));

        let edges = if bom.contains_key("relationships") {
            relationship_edges(bom)?
        } else {
            Edges::new()
        };

        self.records
            .push(Record::new(NodeKind::Document, identity, attributes).with_edges(edges));
        Ok(())
    }

    fn write_packages(&mut self, packages: &[Value]) -> Result<()> {
        for package in packages {
            let fields = expect_object(package, "package")?;
            let identity = package_identity(fields)?;

            let mut attributes = without_keys(fields, &["externalRefs"]);
            let mut edges = Edges::new();

            if let Some(refs) = fields.get("externalRefs").and_then(Value::as_array) {
                edges.declare(Relation::References);
                for external_ref in refs {
                    let Some(record) = reference_record(external_ref, "referenceLocator") else {
                        continue;
                    };
                    let is_purl = external_ref.get("referenceType").and_then(Value::as_str)
                        == Some("purl");
                    if is_purl && !attributes.contains_key("purl") {
                        if let Some(locator) = external_ref.get("referenceLocator") {
                            attributes.insert("purl".to_string(), locator.clone());
                        }
                    }
                    edges.push(Relation::References, record.identity.clone());
                    self.records.push(record);
                }
            }

            for field in LICENSE_FIELDS {
                let Some(value) = attributes.shift_remove(*field) else {
                    continue;
                };
                for license in license_values(&value, field, &identity) {
                    let mut license_attributes = Map::new();
                    license_attributes.insert("name".to_string(), Value::String(license.clone()));
                    self.records
                        .push(license_record(&license, license_attributes, &identity));
                }
            }

            self.records.push(
                Record::new(NodeKind::Component, identity, attributes).with_edges(edges),
            );
        }
        Ok(())
    }
}

impl SbomWriter for SpdxWriter<'_> {
    fn format_name(&self) -> &'static str {
        "SPDX"
    }

    fn write_document(mut self) -> Result<Vec<Record>> {
        let bom = expect_object(self.bom, "SPDX document")?;

        tracing::info!("Writing SPDX document metadata");
        self.write_bom(bom)?;

        if let Some(packages) = list(bom, "packages")? {
            tracing::debug!("Writing {} SPDX packages", packages.len());
            self.write_packages(packages)?;
        }

        Ok(self.records.into_records())
    }
}

/// `Component_<SPDXID>`, failing when the package has no SPDXID.
fn package_identity(fields: &Map<String, Value>) -> Result<String> {
    let spdx_id = text_field(fields, "SPDXID").ok_or_else(|| {
        let context = match text_field(fields, "name") {
            Some(name) => format!("package '{name}'"),
            None => format!("package {}", summarize(&Value::Object(fields.clone()))),
        };
        SbomGraphError::missing_field("SPDXID", context)
    })?;
    Ok(NodeKind::Component.identity(&[&spdx_id]))
}

/// Build the Document edge set from packages, `documentDescribes` and
/// `relationships`.
fn relationship_edges(bom: &Map<String, Value>) -> Result<Edges> {
    let mut edges = Edges::new();
    for relation in DOCUMENT_RELATIONS {
        edges.declare(*relation);
    }

    for package in list(bom, "packages")?.unwrap_or_default() {
        let fields = expect_object(package, "package")?;
        edges.link(Relation::Describes, package_identity(fields)?);
    }

    for described in list(bom, "documentDescribes")?.unwrap_or_default() {
        match scalar_text(described) {
            Some(id) => edges.link(Relation::Describes, NodeKind::Component.identity(&[&id])),
            None => tracing::warn!(
                "Skipping documentDescribes entry that is not a string: {}",
                summarize(described)
            ),
        }
    }

    for relationship in list(bom, "relationships")?.unwrap_or_default() {
        let relationship_type = relationship
            .get("relationshipType")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let Some(relation) = Relation::from_spdx_relationship(relationship_type) else {
            tracing::warn!("Unrecognized relationship type: {}", relationship_type);
            continue;
        };
        let Some(related) = relationship.get("relatedSpdxElement").and_then(scalar_text) else {
            tracing::warn!(
                "Skipping {} relationship without relatedSpdxElement",
                relationship_type
            );
            continue;
        };
        edges.link(relation, NodeKind::Component.identity(&[&related]));
    }

    Ok(edges)
}

/// License strings held by a package license field.
///
/// SPDX 2.2 writes `licenseInfoFromFiles` as an array while the other fields
/// are single expressions; both shapes are accepted.
fn license_values(value: &Value, field: &str, owner: &str) -> Vec<String> {
    match value {
        Value::String(license) => vec![license.clone()],
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        Value::Null => Vec::new(),
        other => {
            tracing::info!(
                "Skipping {} of {} with unexpected value {}",
                field,
                owner,
                summarize(other)
            );
            Vec::new()
        }
    }
}
