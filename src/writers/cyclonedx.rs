//! CycloneDX SBOM writer.
//!
//! Supports CycloneDX 1.x JSON documents. Components are keyed by
//! `Component_<type>_<name>`; cross references inside the document use
//! `bom-ref` strings, which are resolved through an index filled as
//! components are written.

use super::fields::{
    expect_object, list, reference_record, scalar_text, summarize, text_field, without_keys,
};
use super::license::license_record;
use super::traits::{RecordBuffer, SbomWriter};
use crate::error::{Result, SbomGraphError};
use crate::model::{Attributes, Edges, NodeKind, Record, Relation};
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

/// Top-level keys that become records or edges instead of document attributes.
const DOCUMENT_PROMOTED_KEYS: &[&str] = &[
    "metadata",
    "component",
    "components",
    "dependencies",
    "vulnerabilities",
];

/// Component keys that become records or edges instead of attributes.
const COMPONENT_PROMOTED_KEYS: &[&str] =
    &["licenses", "externalReferences", "dependsOn", "components"];

/// Writer for CycloneDX documents.
pub struct CycloneDxWriter<'a> {
    bom: &'a Value,
    records: RecordBuffer,
    /// bom-ref -> component identity; first registration wins
    bom_refs: HashMap<String, String>,
}

impl<'a> CycloneDxWriter<'a> {
    /// Create a writer for one parsed CycloneDX document.
    #[must_use]
    pub fn new(bom: &'a Value) -> Self {
        Self {
            bom,
            records: RecordBuffer::new(),
            bom_refs: HashMap::new(),
        }
    }

    /// Write the Document record, the promoted metadata component and all
    /// top-level components.
    fn write_bom(&mut self, bom: &Map<String, Value>) -> Result<()> {
        let document_id = match text_field(bom, "serialNumber") {
            Some(serial) => NodeKind::Document.identity(&[&serial]),
            None => NodeKind::Document.identity(&[&Uuid::new_v4().to_string()]),
        };

        let metadata = bom.get("metadata").and_then(Value::as_object);

        let mut attributes = without_keys(bom, DOCUMENT_PROMOTED_KEYS);
        if let Some(meta) = metadata {
            for (key, value) in meta {
                if !DOCUMENT_PROMOTED_KEYS.contains(&key.as_str()) {
                    attributes.insert(key.clone(), value.clone());
                }
            }
            if let Some(timestamp) = meta.get("timestamp") {
                attributes.insert("created_timestamp".to_string(), timestamp.clone());
            }
        }

        let mut edges = Edges::new();
        edges.declare(Relation::Describes);

        if let Some(component) = metadata.and_then(|m| m.get("component")) {
            let identity = self.write_component(component)?;
            edges.link(Relation::Describes, identity);
        }

        let components = list(bom, "components")?.unwrap_or_default();
        for component in components {
            let fields = expect_object(component, "component")?;
            edges.link(Relation::Describes, component_identity(fields)?);
        }

        self.records
            .push(Record::new(NodeKind::Document, document_id, attributes).with_edges(edges));

        for component in components {
            self.write_component(component)?;
        }

        Ok(())
    }

    /// Write one component (and its nested components), returning its identity.
    fn write_component(&mut self, component: &Value) -> Result<String> {
        let fields = expect_object(component, "component")?;
        let identity = component_identity(fields)?;

        if let Some(bom_ref) = text_field(fields, "bom-ref") {
            self.bom_refs
                .entry(bom_ref)
                .or_insert_with(|| identity.clone());
        }

        let mut edges = Edges::new();

        if let Some(licenses) = fields.get("licenses") {
            match licenses.as_array() {
                Some(entries) => self.write_licenses(entries, &identity),
                None => tracing::warn!(
                    "Skipping licenses of {} that are not an array: {}",
                    identity,
                    summarize(licenses)
                ),
            }
        }

        if let Some(references) = fields.get("externalReferences").and_then(Value::as_array) {
            edges.declare(Relation::References);
            for reference in references {
                if let Some(record) = reference_record(reference, "url") {
                    edges.push(Relation::References, record.identity.clone());
                    self.records.push(record);
                }
            }
        }

        let nested = list(fields, "components")?.unwrap_or_default();
        for child in nested {
            let child_fields = expect_object(child, "component")?;
            edges.link(Relation::Contains, component_identity(child_fields)?);
        }

        let attributes = without_keys(fields, COMPONENT_PROMOTED_KEYS);
        self.records.push(
            Record::new(NodeKind::Component, identity.clone(), attributes).with_edges(edges),
        );

        for child in nested {
            self.write_component(child)?;
        }

        Ok(identity)
    }

    /// Write License records for a component's `licenses` entries.
    ///
    /// Entries that carry neither an id, a name nor an expression are skipped.
    fn write_licenses(&mut self, licenses: &[Value], owner: &str) {
        for entry in licenses {
            if let Some(license) = entry.get("license").and_then(Value::as_object) {
                if let Some(id) = text_field(license, "id") {
                    let mut attributes = without_keys(license, &["id"]);
                    attributes.insert("name".to_string(), Value::String(id.clone()));
                    self.records.push(license_record(&id, attributes, owner));
                } else if let Some(name) = text_field(license, "name") {
                    self.records
                        .push(license_record(&name, license.clone(), owner));
                } else {
                    tracing::info!(
                        "Skipping License node due to no id or name for {}",
                        summarize(entry)
                    );
                }
            } else if let Some(expression) = entry.get("expression").and_then(scalar_text) {
                let mut attributes: Attributes = entry
                    .as_object()
                    .map(|fields| without_keys(fields, &["expression"]))
                    .unwrap_or_default();
                attributes.insert("name".to_string(), Value::String(expression.clone()));
                self.records
                    .push(license_record(&expression, attributes, owner));
            } else {
                tracing::info!("Skipping License node due to no 'license' field for {}", owner);
            }
        }
    }

    /// Write dependency records for entries that declare `dependsOn`.
    fn write_dependencies(&mut self, dependencies: &[Value]) {
        for dependency in dependencies {
            let Some(fields) = dependency.as_object() else {
                tracing::warn!("Skipping dependency that is not an object: {}", summarize(dependency));
                continue;
            };
            let Some(depends_on) = fields.get("dependsOn") else {
                continue;
            };
            let Some(targets) = depends_on.as_array() else {
                tracing::warn!(
                    "Skipping dependency with non-array dependsOn: {}",
                    summarize(dependency)
                );
                continue;
            };

            let identity = self.resolve(fields.get("ref"));

            let mut edges = Edges::new();
            edges.declare(Relation::DependsOn);
            for target in targets {
                edges.push(Relation::DependsOn, self.resolve(Some(target)));
            }

            let attributes = without_keys(fields, &["dependsOn"]);
            self.records.push(
                Record::with_optional_identity(NodeKind::Component, identity, attributes)
                    .with_edges(edges),
            );
        }
    }

    /// Write Vulnerability records with `affects` edges to components.
    fn write_vulnerabilities(&mut self, vulnerabilities: &[Value]) -> Result<()> {
        for vulnerability in vulnerabilities {
            let fields = expect_object(vulnerability, "vulnerability")?;
            let id = text_field(fields, "id").ok_or_else(|| {
                SbomGraphError::missing_field("id", format!("vulnerability {}", summarize(vulnerability)))
            })?;

            let mut attributes = without_keys(fields, &["affects"]);
            // Only the first rating is kept.
            if let Some(first) = fields
                .get("ratings")
                .and_then(Value::as_array)
                .and_then(|ratings| ratings.first())
            {
                attributes.insert("ratings".to_string(), first.clone());
            }

            let mut edges = Edges::new();
            if let Some(affects) = fields.get("affects").and_then(Value::as_array) {
                edges.declare(Relation::Affects);
                for affected in affects {
                    edges.push(Relation::Affects, self.resolve(affected.get("ref")));
                }
            }

            self.records.push(
                Record::new(
                    NodeKind::Vulnerability,
                    NodeKind::Vulnerability.identity(&[&id]),
                    attributes,
                )
                .with_edges(edges),
            );
        }
        Ok(())
    }

    /// Resolve a bom-ref to the identity of the component that declared it.
    ///
    /// References are read as scalar text, the same way they are registered.
    fn resolve(&self, bom_ref: Option<&Value>) -> Option<String> {
        let bom_ref = bom_ref.and_then(scalar_text)?;
        let identity = self.bom_refs.get(&bom_ref).cloned();
        if identity.is_none() {
            tracing::debug!("bom-ref '{}' does not match any component", bom_ref);
        }
        identity
    }
}

impl SbomWriter for CycloneDxWriter<'_> {
    fn format_name(&self) -> &'static str {
        "CycloneDX"
    }

    fn write_document(mut self) -> Result<Vec<Record>> {
        let bom = expect_object(self.bom, "CycloneDX document")?;

        tracing::info!("Writing bom metadata");
        self.write_bom(bom)?;

        if let Some(dependencies) = list(bom, "dependencies")? {
            self.write_dependencies(dependencies);
        }

        if let Some(vulnerabilities) = list(bom, "vulnerabilities")? {
            self.write_vulnerabilities(vulnerabilities)?;
        }

        Ok(self.records.into_records())
    }
}

/// `Component_<type>_<name>`, failing when either field is missing.
fn component_identity(fields: &Map<String, Value>) -> Result<String> {
    let describe = || match text_field(fields, "name") {
        Some(name) => format!("component '{name}'"),
        None => format!("component {}", summarize(&Value::Object(fields.clone()))),
    };

    let component_type =
        text_field(fields, "type").ok_or_else(|| SbomGraphError::missing_field("type", describe()))?;
    let name =
        text_field(fields, "name").ok_or_else(|| SbomGraphError::missing_field("name", describe()))?;

    Ok(NodeKind::Component.identity(&[&component_type, &name]))
}
