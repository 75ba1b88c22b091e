//! Organization (tenant) model.

use serde::{Deserialize, Serialize};

/// A tenant. Every catalog entity and every solve belongs to exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Unique organization identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// City.
    #[serde(default)]
    pub city: String,
    /// State or region.
    #[serde(default)]
    pub state: String,
    /// Postal code.
    #[serde(default)]
    pub zipcode: String,
}

impl Organization {
    /// Creates an organization with the given ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            city: String::new(),
            state: String::new(),
            zipcode: String::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the postal address fields.
    pub fn with_address(
        mut self,
        city: impl Into<String>,
        state: impl Into<String>,
        zipcode: impl Into<String>,
    ) -> Self {
        self.city = city.into();
        self.state = state.into();
        self.zipcode = zipcode.into();
        self
    }
}
