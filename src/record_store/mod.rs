//! Record Store Module
//!
//! Durable persistence for feeding records:
//! - `RecordStore`: append-only JSONL log with an in-memory, id-ordered view
//! - `RecordStoreConfig`: data directory and file layout
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//! ┌─────────┐    ┌──────────┐    ┌──────────────────┐    ┌──────────────┐
//! │ append  │───►│ validate │───►│ write + fsync to │───►│ push to view │
//! │ request │    │  input   │    │ feedings.jsonl   │    │ (write lock) │
//! └─────────┘    └──────────┘    └──────────────────┘    └──────────────┘
//!
//! Read Path (Startup):
//! ┌──────────────────┐    ┌──────────────────────┐
//! │ Replay log lines │───►│ Truncate torn tail   │───► Ready!
//! │ (ids increasing) │    │ (if any)             │
//! └──────────────────┘    └──────────────────────┘
//! ```

mod store;

pub use store::{RecordStore, RecordStoreConfig};
