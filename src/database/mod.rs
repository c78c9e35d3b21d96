//! SQLite schema for the durable key-value store.

pub mod migrations;
