//! JSONL and compact output rendering for chunk records.

mod compact;
mod jsonl;

pub use compact::CompactWriter;
pub use jsonl::{JsonlWriter, render_json};
