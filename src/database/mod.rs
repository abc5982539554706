/*!
 * Database module for persistent storage of vocabulary records.
 *
 * This module provides SQLite-based persistence for:
 * - Vocabulary rows with stable, never reused ids
 * - Bucketed queries and counts sharing a single selection definition
 * - Migration of the id-less legacy table layout
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::DatabaseConnection;
pub use repository::Repository;
