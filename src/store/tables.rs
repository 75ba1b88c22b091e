//! redb table definitions for the schedule store.
//!
//! Both tables use `&str` keys and JSON-encoded `&[u8]` values. Keys lead
//! with the organization ID so every scan is tenant-scoped.

use redb::TableDefinition;

/// Solve attempts keyed by `{organization}/{schedule}`.
pub const SCHEDULES: TableDefinition<&str, &[u8]> = TableDefinition::new("solved_schedules");

/// Schedule rows keyed by `{organization}/{schedule}/{index:06}`.
pub const ITEMS: TableDefinition<&str, &[u8]> = TableDefinition::new("schedule_items");

pub(crate) fn schedule_key(organization_id: &str, schedule_id: &str) -> String {
    format!("{organization_id}/{schedule_id}")
}

pub(crate) fn items_prefix(organization_id: &str, schedule_id: &str) -> String {
    format!("{organization_id}/{schedule_id}/")
}

pub(crate) fn item_key(organization_id: &str, schedule_id: &str, index: usize) -> String {
    format!("{organization_id}/{schedule_id}/{index:06}")
}
