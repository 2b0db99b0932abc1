//! Diesel records for the saved_searches table.

use diesel::prelude::*;

use crate::schema;

/// Saved search row.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::saved_searches)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SavedSearchRecord {
    pub id: i32,
    pub name: String,
    pub params: String,
    pub created_at: String,
}

/// New saved search for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::saved_searches)]
pub struct NewSavedSearchRecord<'a> {
    pub name: &'a str,
    pub params: &'a str,
    pub created_at: &'a str,
}
