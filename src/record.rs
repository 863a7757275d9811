//! Audit data model: rows and names flowing through the resolution stages, and the
//! count record each leaf produces.

use serde::{Deserialize, Serialize};

/// Suffix the platform appends to the developer name of a deleted field.
pub const DELETION_MARKER: &str = "_del";

/// Table identifier prefix for metadata-component tables that need an extra lookup hop.
pub const ENUM_TABLE_PREFIX: &str = "01I";

/// One eligible row of the deleted-fields query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedFieldRow {
    pub developer_name_raw: String,
    pub table_enum_or_id: String,
}

impl DeletedFieldRow {
    pub fn new(developer_name_raw: impl Into<String>, table_enum_or_id: impl Into<String>) -> Self {
        Self {
            developer_name_raw: developer_name_raw.into(),
            table_enum_or_id: table_enum_or_id.into(),
        }
    }

    /// True when the field name carries the deletion marker.
    pub fn is_deleted(&self) -> bool {
        self.developer_name_raw.ends_with(DELETION_MARKER)
    }

    /// True when the owning table is addressed through an enumeration-style identifier.
    pub fn uses_enum_table(&self) -> bool {
        self.table_enum_or_id.starts_with(ENUM_TABLE_PREFIX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeveloperName(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedApiName(pub String);

/// Count of records still present for one orphaned object/field combination.
///
/// Field names on the wire stay PascalCase so reports written by earlier runs load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteCountRecord {
    #[serde(rename = "DeveloperName")]
    pub developer_name: String,
    #[serde(rename = "TableEnumOrId")]
    pub table_enum_or_id: String,
    #[serde(rename = "QualifiedApiName")]
    pub qualified_api_name: String,
    #[serde(rename = "ApiName")]
    pub api_name: String,
    #[serde(rename = "Count")]
    pub count: u64,
    /// Unix seconds.
    #[serde(rename = "Timestamp")]
    pub timestamp: i64,
}
