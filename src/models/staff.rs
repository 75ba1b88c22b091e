//! Teacher model.

use serde::{Deserialize, Serialize};

/// A teacher. Teaches at most one course per period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique teacher identifier.
    pub id: String,
    /// Owning organization.
    pub organization_id: String,
    /// Family name.
    pub last_name: String,
    /// Given name.
    pub first_name: String,
}

impl Teacher {
    /// Creates a teacher.
    pub fn new(
        id: impl Into<String>,
        organization_id: impl Into<String>,
        last_name: impl Into<String>,
        first_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            organization_id: organization_id.into(),
            last_name: last_name.into(),
            first_name: first_name.into(),
        }
    }

    /// Display name, `"Last, First"`.
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}
