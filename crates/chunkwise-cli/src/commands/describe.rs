use crate::Cli;
use anyhow::Result;
use chunkwise_treesit::supported_languages;

pub fn run(cli: &Cli) -> Result<()> {
    let languages: Vec<&str> = supported_languages().iter().map(|l| l.as_str()).collect();
    let description = serde_json::json!({
        "name": "chunkwise",
        "version": env!("CARGO_PKG_VERSION"),
        "commands": ["chunk", "describe"],
        "formats": ["jsonl", "json", "human"],
        "languages": languages,
        "fallback": "plaintext",
        "presets": ["small", "medium", "large"],
    });

    match cli.effective_format() {
        crate::OutputFormat::Human => {
            println!("chunkwise v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Commands:  chunk, describe");
            println!("Formats:   jsonl, json, human");
            println!("Languages: {}", languages.join(", "));
            println!("Fallback:  plaintext (any other file)");
            println!("Presets:   small, medium, large");
        }
        _ => {
            println!("{}", serde_json::to_string_pretty(&description)?);
        }
    }

    Ok(())
}
