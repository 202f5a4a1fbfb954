// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Relaydesk support desk.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a
//! single-writer concurrency model via `tokio-rusqlite`. Every
//! read-modify-write runs in one IMMEDIATE transaction on that writer, so
//! status changes, turn commits and payment settlements never lose updates.

pub mod adapter;
mod cursor;
pub mod database;
pub mod migrations;
pub mod queries;
mod rows;

pub use adapter::SqliteStorage;
pub use database::Database;
