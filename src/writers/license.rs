//! License node construction shared by both writers.
//!
//! License identities are case-insensitive: `MIT` and `mit` land on the same
//! `License_mit` node. Validity is checked with the `spdx` crate in lax mode so
//! common non-standard spellings (`Apache2`, `/` for `OR`) still count.

use crate::model::{Attributes, NodeKind, Record, Relation};
use serde_json::Value;

/// Attribute carrying whether the license name parses as an SPDX expression.
pub const SPDX_VALID_ATTRIBUTE: &str = "spdx_valid";

/// Identity of the License node for a license id, name or expression.
#[must_use]
pub fn license_identity(key: &str) -> String {
    NodeKind::License.identity(&[&key.to_lowercase()])
}

/// Whether `expr` is a usable SPDX license expression.
#[must_use]
pub fn is_valid_spdx(expr: &str) -> bool {
    if expr.is_empty() || expr.contains("NOASSERTION") || expr.contains("NONE") {
        return false;
    }
    spdx::Expression::parse_mode(expr, spdx::ParseMode::LAX).is_ok()
}

/// Build a License record keyed by `key` and linked to `owner`.
pub(crate) fn license_record(key: &str, mut attributes: Attributes, owner: &str) -> Record {
    attributes.insert(
        SPDX_VALID_ATTRIBUTE.to_string(),
        Value::Bool(is_valid_spdx(key)),
    );
    let mut record = Record::new(NodeKind::License, license_identity(key), attributes);
    record.edges.link(Relation::LicensedBy, owner);
    record
}
