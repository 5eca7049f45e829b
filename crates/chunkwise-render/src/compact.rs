use std::io::Write;

use chunkwise_core::ChunkRecord;

/// Writes chunk records in compact single-line format.
///
/// Output format: `path:start-end (N bytes, backend)`
/// Example: `src/auth.rs:1-42 (1180 bytes, treesitter)`
pub struct CompactWriter;

impl CompactWriter {
    pub fn new() -> Self {
        Self
    }

    /// Render records as compact single-line entries.
    pub fn render(&self, path: &str, records: &[ChunkRecord]) -> String {
        let mut buf = Vec::new();
        self.write_to(&mut buf, path, records)
            .expect("write to Vec failed");
        String::from_utf8(buf).expect("compact output is valid UTF-8")
    }

    /// Write compact output to a writer.
    pub fn write_to(
        &self,
        writer: &mut dyn Write,
        path: &str,
        records: &[ChunkRecord],
    ) -> std::io::Result<()> {
        for record in records {
            writeln!(
                writer,
                "{}:{}-{} ({} bytes, {})",
                path,
                record.start_line,
                record.end_line,
                record.len(),
                record.backend,
            )?;
        }
        Ok(())
    }
}

impl Default for CompactWriter {
    fn default() -> Self {
        Self::new()
    }
}
