//! Named query templates embedded at build time.

/// Placeholder replaced by the caller-supplied parameter.
pub const PLACEHOLDER: char = '#';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryTemplate {
    /// Custom fields carrying the deletion marker, with their owning table.
    DeletedFields,
    /// Developer names of the metadata component behind an enumeration-style table id.
    EnumToDeveloperName,
    /// Qualified API names of every entity sharing a developer name.
    DeveloperNameToApiName,
}

impl QueryTemplate {
    pub fn name(self) -> &'static str {
        match self {
            QueryTemplate::DeletedFields => "deleted_fields",
            QueryTemplate::EnumToDeveloperName => "enum_to_developer_name",
            QueryTemplate::DeveloperNameToApiName => "developer_name_to_api_name",
        }
    }

    pub fn source(self) -> &'static str {
        match self {
            QueryTemplate::DeletedFields => include_str!("soql/deleted_fields.soql"),
            QueryTemplate::EnumToDeveloperName => include_str!("soql/enum_to_developer_name.soql"),
            QueryTemplate::DeveloperNameToApiName => {
                include_str!("soql/developer_name_to_api_name.soql")
            }
        }
    }

    /// Render as a single-line query, substituting `param` for every placeholder when given.
    pub fn render(self, param: Option<&str>) -> String {
        let query = self.source().trim().replace('\n', " ");
        match param {
            Some(param) if !param.is_empty() => query.replace(PLACEHOLDER, param),
            _ => query,
        }
    }
}
