//! Grammar registry.
//!
//! Uses `LazyLock` to build the table once on first use.

use std::collections::HashMap;
use std::sync::LazyLock;

use chunkwise_core::Language;
use tree_sitter::{Parser, Tree};

use crate::ChunkError;

static GRAMMARS: LazyLock<HashMap<Language, tree_sitter::Language>> = LazyLock::new(init_grammars);

/// Look up the tree-sitter grammar for a language.
pub fn grammar_for(language: Language) -> Option<tree_sitter::Language> {
    GRAMMARS.get(&language).cloned()
}

/// Languages with a registered grammar, in declaration order.
pub fn supported_languages() -> Vec<Language> {
    Language::ALL
        .iter()
        .copied()
        .filter(|lang| GRAMMARS.contains_key(lang))
        .collect()
}

/// Parse `source` with `grammar`.
pub fn parse(grammar: &tree_sitter::Language, source: &[u8]) -> Result<Tree, ChunkError> {
    let mut parser = Parser::new();
    parser.set_language(grammar)?;
    parser.parse(source, None).ok_or(ChunkError::Parse)
}

fn init_grammars() -> HashMap<Language, tree_sitter::Language> {
    // Most grammars export `LANGUAGE: LanguageFn`
    type LangInit = (Language, fn() -> tree_sitter::Language);
    let entries: &[LangInit] = &[
        (Language::Rust, || tree_sitter_rust::LANGUAGE.into()),
        (Language::Go, || tree_sitter_go::LANGUAGE.into()),
        (Language::Python, || tree_sitter_python::LANGUAGE.into()),
        (Language::JavaScript, || {
            tree_sitter_javascript::LANGUAGE.into()
        }),
        (Language::TypeScript, || {
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
        }),
        (Language::Tsx, || tree_sitter_typescript::LANGUAGE_TSX.into()),
        (Language::Java, || tree_sitter_java::LANGUAGE.into()),
        (Language::Ruby, || tree_sitter_ruby::LANGUAGE.into()),
        (Language::C, || tree_sitter_c::LANGUAGE.into()),
        (Language::Cpp, || tree_sitter_cpp::LANGUAGE.into()),
        (Language::Shell, || tree_sitter_bash::LANGUAGE.into()),
        (Language::Json, || tree_sitter_json::LANGUAGE.into()),
        (Language::Toml, || tree_sitter_toml_ng::LANGUAGE.into()),
        (Language::Yaml, || tree_sitter_yaml::LANGUAGE.into()),
        (Language::Html, || tree_sitter_html::LANGUAGE.into()),
        (Language::Css, || tree_sitter_css::LANGUAGE.into()),
        (Language::Swift, || tree_sitter_swift::LANGUAGE.into()),
        (Language::Kotlin, || tree_sitter_kotlin_ng::LANGUAGE.into()),
        (Language::Scala, || tree_sitter_scala::LANGUAGE.into()),
        (Language::Haskell, || tree_sitter_haskell::LANGUAGE.into()),
        (Language::Elixir, || tree_sitter_elixir::LANGUAGE.into()),
        (Language::Lua, || tree_sitter_lua::LANGUAGE.into()),
        (Language::Php, || tree_sitter_php::LANGUAGE_PHP.into()),
        (Language::R, || tree_sitter_r::LANGUAGE.into()),
    ];

    entries
        .iter()
        .map(|&(lang, make_ts_lang)| (lang, make_ts_lang()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_languages_have_grammars() {
        for lang in [
            Language::Rust,
            Language::Go,
            Language::Python,
            Language::JavaScript,
            Language::TypeScript,
        ] {
            assert!(grammar_for(lang).is_some(), "missing grammar for {lang}");
        }
    }

    #[test]
    fn markdown_and_other_have_no_grammar() {
        assert!(grammar_for(Language::Markdown).is_none());
        assert!(grammar_for(Language::Other).is_none());
    }

    #[test]
    fn supported_languages_excludes_unregistered() {
        let langs = supported_languages();
        assert!(langs.contains(&Language::Rust));
        assert!(!langs.contains(&Language::Markdown));
        assert_eq!(langs.len(), Language::ALL.len() - 2);
    }

    #[test]
    fn every_registered_grammar_is_accepted_by_parser() {
        for lang in supported_languages() {
            let grammar = grammar_for(lang).unwrap();
            assert!(parse(&grammar, b"x").is_ok(), "parser rejected {lang}");
        }
    }

    #[test]
    fn parse_produces_root_spanning_source() {
        let grammar = grammar_for(Language::Rust).unwrap();
        let tree = parse(&grammar, b"fn main() {}\n").unwrap();
        assert_eq!(tree.root_node().kind(), "source_file");
        assert!(tree.root_node().child_count() > 0);
    }
}
