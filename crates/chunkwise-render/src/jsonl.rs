use std::io::Write;

use chunkwise_core::{ChunkRecord, Language, SizeWindow};
use serde::Serialize;

const FORMAT_VERSION: &str = "0.1";

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Header<'a> {
    version: &'static str,
    path: &'a str,
    language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    window: Option<WindowEntry>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct WindowEntry {
    min: usize,
    max: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ChunkEntry<'a> {
    index: usize,
    start_byte: usize,
    end_byte: usize,
    start_line: u32,
    end_line: u32,
    bytes: usize,
    backend: &'static str,
    content: &'a str,
}

impl<'a> From<&'a ChunkRecord> for ChunkEntry<'a> {
    fn from(record: &'a ChunkRecord) -> Self {
        Self {
            index: record.index,
            start_byte: record.start_byte,
            end_byte: record.end_byte,
            start_line: record.start_line,
            end_line: record.end_line,
            bytes: record.len(),
            backend: record.backend.as_str(),
            content: &record.content,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Footer {
    total_chunks: usize,
    total_bytes: usize,
}

/// Writes one JSON object per line: a header, one entry per chunk, a footer.
pub struct JsonlWriter {
    path: String,
    language: Language,
    window: Option<SizeWindow>,
}

impl JsonlWriter {
    pub fn new(path: impl Into<String>, language: Language) -> Self {
        Self {
            path: path.into(),
            language,
            window: None,
        }
    }

    pub fn window(mut self, window: Option<SizeWindow>) -> Self {
        self.window = window;
        self
    }

    pub fn render(&self, records: &[ChunkRecord]) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf, records)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn write_to(&self, writer: &mut dyn Write, records: &[ChunkRecord]) -> serde_json::Result<()> {
        let header = Header {
            version: FORMAT_VERSION,
            path: &self.path,
            language: self.language,
            window: self.window.map(|w| WindowEntry {
                min: w.min(),
                max: w.max(),
            }),
        };
        write_line(writer, &header)?;

        for record in records {
            write_line(writer, &ChunkEntry::from(record))?;
        }

        let footer = Footer {
            total_chunks: records.len(),
            total_bytes: records.iter().map(ChunkRecord::len).sum(),
        };
        write_line(writer, &footer)
    }
}

/// Render records as a pretty-printed JSON array using the JSONL entry shape.
pub fn render_json(records: &[ChunkRecord]) -> serde_json::Result<String> {
    let entries: Vec<ChunkEntry<'_>> = records.iter().map(ChunkEntry::from).collect();
    serde_json::to_string_pretty(&entries)
}

fn write_line<T: Serialize>(writer: &mut dyn Write, value: &T) -> serde_json::Result<()> {
    serde_json::to_writer(&mut *writer, value)?;
    writer.write_all(b"\n").map_err(serde_json::Error::io)
}
