//! # SQLite Memory Store
//!
//! [`SqliteVectorStore`] keeps every collection in one SQLite database file. Rows are the
//! durable copy; at open the rows of the bound collection are loaded into an in-memory flat
//! index, which serves all queries.
//!
//! ## Database Schema
//!
//! ```sql
//! CREATE TABLE collections (
//!     name TEXT PRIMARY KEY,
//!     dimension INTEGER NOT NULL,
//!     metric TEXT NOT NULL,
//!     created_at TEXT NOT NULL
//! );
//!
//! CREATE TABLE memory_records (
//!     seq INTEGER PRIMARY KEY AUTOINCREMENT,
//!     id TEXT NOT NULL UNIQUE,
//!     collection TEXT NOT NULL,
//!     content TEXT NOT NULL,
//!     category TEXT NOT NULL,
//!     importance INTEGER NOT NULL,
//!     created_at TEXT NOT NULL,
//!     tags TEXT NOT NULL,
//!     embedding BLOB NOT NULL
//! );
//! ```
//!
//! Embeddings are stored as little-endian `f32` bytes. `seq` preserves insertion order, which
//! is the tie-break order for equal distances.

mod codec;
mod store;

pub use store::{SqliteStoreConfig, SqliteVectorStore};
