use crate::Cli;
use anyhow::{Context, Result};
use chunkwise_core::{ChunkRecord, Language, SizeWindow};
use chunkwise_render::{CompactWriter, JsonlWriter, render_json};
use chunkwise_treesit::{Chunker, PlainTextChunker, default_chunker};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

pub fn run(
    cli: &Cli,
    file: &Path,
    language: Option<Language>,
    window: SizeWindow,
    plain: bool,
) -> Result<()> {
    let (language, records) = collect(file, language, window, plain)?;
    let path = file.display().to_string();

    if !cli.is_quiet() {
        eprintln!(
            "Chunking {} (language: {}, window: {})...",
            path, language, window
        );
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.effective_format() {
        crate::OutputFormat::Human => {
            CompactWriter::new().write_to(&mut out, &path, &records)?;
        }
        crate::OutputFormat::Json => {
            writeln!(out, "{}", render_json(&records)?)?;
        }
        _ => {
            JsonlWriter::new(&path, language)
                .window(Some(window))
                .write_to(&mut out, &records)?;
        }
    }

    if !cli.is_quiet() {
        let total: usize = records.iter().map(ChunkRecord::len).sum();
        eprintln!("{} chunks, {} bytes", records.len(), total);
    }

    Ok(())
}

/// Read `file` and split it into chunk records.
pub fn collect(
    file: &Path,
    language: Option<Language>,
    window: SizeWindow,
    plain: bool,
) -> Result<(Language, Vec<ChunkRecord>)> {
    let source = fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let language = language.unwrap_or_else(|| Language::from_path(file));

    let records = if plain {
        PlainTextChunker.chunk(&source, language, window)
    } else {
        default_chunker().chunk(&source, language, window)
    };
    debug!(
        chunks = records.len(),
        bytes = source.len(),
        %language,
        "chunked {}",
        file.display()
    );
    Ok((language, records))
}
