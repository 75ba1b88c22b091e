//! Building and room models.
//!
//! Rooms are identified for display by building name and room number;
//! `(building, number)` is unique within an organization.

use serde::{Deserialize, Serialize};

/// A building containing rooms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    /// Unique building identifier.
    pub id: String,
    /// Owning organization.
    pub organization_id: String,
    /// Building name.
    pub name: String,
}

/// A room. Hosts at most one course per period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Owning organization.
    pub organization_id: String,
    /// Room number within its building.
    pub number: i32,
    /// Building this room belongs to.
    pub building_id: String,
}

impl Building {
    /// Creates a building.
    pub fn new(
        id: impl Into<String>,
        organization_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            organization_id: organization_id.into(),
            name: name.into(),
        }
    }
}

impl Room {
    /// Creates a room in a building.
    pub fn new(
        id: impl Into<String>,
        organization_id: impl Into<String>,
        number: i32,
        building_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            organization_id: organization_id.into(),
            number,
            building_id: building_id.into(),
        }
    }

    /// Display label, `"{building}, Room {number}"`.
    ///
    /// Falls back to the bare room number when the building is unknown.
    pub fn label(&self, building: Option<&Building>) -> String {
        match building {
            Some(b) => format!("{}, Room {}", b.name, self.number),
            None => format!("Room {}", self.number),
        }
    }
}
