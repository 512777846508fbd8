//! Textual import extraction.
//!
//! Imports are found with a fixed battery of patterns over the file text,
//! not a parse. Comments are blanked first so commented-out imports are
//! invisible. Anything that is not a literal string target (computed
//! specifiers, template literals with substitutions) is not seen.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Quoted target in any of the three JS string delimiters
const TARGET: &str = r#"(?:'([^'\\\n]*)'|"([^"\\\n]*)"|`([^`\\]*)`)"#;

/// Which textual form produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import x from "t"`
    Static,
    /// `import "t"`
    SideEffect,
    /// `require("t")`
    Require,
    /// `require.resolve("t")`
    RequireResolve,
    /// `export { x } from "t"`
    ExportFrom,
    /// `import("t")`
    Dynamic,
}

struct Pattern {
    kind: ImportKind,
    regex: Regex,
}

fn compile(kind: ImportKind, prefix: &str, suffix: &str) -> Pattern {
    let source = format!("{prefix}{TARGET}{suffix}");
    Pattern { kind, regex: Regex::new(&source).expect("import pattern is valid") }
}

/// The four forms every extraction applies
fn core_patterns() -> &'static [Pattern] {
    static PATTERNS: OnceLock<Vec<Pattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            compile(ImportKind::Static, r"\bimport\s+(?:type\s+)?[\w$*{}\s,]+?\s*\bfrom\s*", ""),
            compile(ImportKind::SideEffect, r"\bimport\s*", ""),
            compile(ImportKind::Require, r"\brequire\s*\(\s*", r"\s*\)"),
            compile(ImportKind::RequireResolve, r"\brequire\s*\.\s*resolve\s*\(\s*", r"\s*\)"),
        ]
    })
}

/// Re-export and literal dynamic import forms, enabled by `extended_syntax`
fn extended_patterns() -> &'static [Pattern] {
    static PATTERNS: OnceLock<Vec<Pattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            compile(
                ImportKind::ExportFrom,
                r"\bexport\s+(?:type\s+)?[\w$*{}\s,]+?\s*\bfrom\s*",
                "",
            ),
            compile(ImportKind::Dynamic, r"\bimport\s*\(\s*", r"\s*\)"),
        ]
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Extractor {
    extended_syntax: bool,
}

impl Extractor {
    pub fn new(extended_syntax: bool) -> Self {
        Self { extended_syntax }
    }

    /// Distinct raw import targets in `source`, sorted, each with the first
    /// form that produced it
    pub fn extract(&self, source: &str) -> BTreeMap<String, ImportKind> {
        let code = strip_comments(source);
        let extended: &[Pattern] = if self.extended_syntax { extended_patterns() } else { &[] };

        let mut found = BTreeMap::new();
        for pattern in core_patterns().iter().chain(extended) {
            for caps in pattern.regex.captures_iter(&code) {
                let quoted = caps.get(1).or_else(|| caps.get(2));
                let target = match quoted {
                    Some(m) => m.as_str(),
                    None => match caps.get(3) {
                        // template literal with a substitution is computed
                        Some(m) if !m.as_str().contains("${") => m.as_str(),
                        _ => continue,
                    },
                };
                if target.is_empty() {
                    continue;
                }
                found.entry(target.to_string()).or_insert(pattern.kind);
            }
        }
        found
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Lex {
    Code,
    LineComment,
    BlockComment,
    Quoted(char),
    Template,
    Regex { in_class: bool },
}

/// Keywords after which a `/` starts a regex literal rather than a division
const REGEX_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case",
    "do", "else", "yield", "await",
];

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Whether a `/` in code position opens a regex literal, judged by the last
/// significant character (`None` at the start of a line) and the word it ends.
/// `<` and `}` are left out so JSX `</Tag>` and `{x} />` read as plain code.
fn starts_regex(prev: Option<char>, word: &str) -> bool {
    match prev {
        None => true,
        Some(c) if is_word_char(c) => REGEX_KEYWORDS.contains(&word),
        Some(c) => matches!(
            c,
            '(' | ',' | '=' | ':' | '[' | '!' | '&' | '|' | '?' | '{' | ';' | '+' | '-' | '*'
                | '%' | '>' | '~' | '^'
        ),
    }
}

/// Blank out `//` and `/* */` comments, keeping string, template and regex
/// literals intact and every newline in place.
pub fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut state = Lex::Code;
    let mut chars = source.chars().peekable();
    // last non-whitespace code character on the current line, and the word it ends
    let mut prev: Option<char> = None;
    let mut word = String::new();

    while let Some(c) = chars.next() {
        match state {
            Lex::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    out.push_str("  ");
                    state = Lex::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("  ");
                    state = Lex::BlockComment;
                }
                '/' if starts_regex(prev, &word) => {
                    out.push(c);
                    state = Lex::Regex { in_class: false };
                }
                // an apostrophe glued to a word is prose (JSX text like `Don't`)
                '\'' if out.chars().next_back().is_some_and(is_word_char) => {
                    out.push(c);
                    prev = Some(c);
                    word.clear();
                }
                '\'' | '"' => {
                    out.push(c);
                    state = Lex::Quoted(c);
                }
                '`' => {
                    out.push(c);
                    state = Lex::Template;
                }
                '\n' => {
                    out.push(c);
                    prev = None;
                    word.clear();
                }
                _ => {
                    out.push(c);
                    if c.is_whitespace() {
                        continue;
                    }
                    if is_word_char(c) {
                        if !prev.is_some_and(is_word_char) {
                            word.clear();
                        }
                        word.push(c);
                    } else {
                        word.clear();
                    }
                    prev = Some(c);
                }
            },
            Lex::LineComment => {
                if c == '\n' {
                    out.push('\n');
                    prev = None;
                    word.clear();
                    state = Lex::Code;
                } else {
                    out.push(' ');
                }
            }
            Lex::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = Lex::Code;
                } else if c == '\n' {
                    out.push('\n');
                    prev = None;
                    word.clear();
                } else {
                    out.push(' ');
                }
            }
            Lex::Quoted(quote) => {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == quote || c == '\n' {
                    // an unterminated quote ends at the line
                    prev = if c == '\n' { None } else { Some(c) };
                    word.clear();
                    state = Lex::Code;
                }
            }
            Lex::Template => {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == '`' {
                    prev = Some(c);
                    word.clear();
                    state = Lex::Code;
                }
            }
            Lex::Regex { in_class } => {
                out.push(c);
                match c {
                    '\\' => match chars.next() {
                        Some('\n') => {
                            out.push('\n');
                            prev = None;
                            word.clear();
                            state = Lex::Code;
                        }
                        Some(escaped) => out.push(escaped),
                        None => {}
                    },
                    '[' => state = Lex::Regex { in_class: true },
                    ']' => state = Lex::Regex { in_class: false },
                    '/' if !in_class => {
                        prev = Some(c);
                        word.clear();
                        state = Lex::Code;
                    }
                    // a regex never spans lines; a misread division ends here
                    '\n' => {
                        prev = None;
                        word.clear();
                        state = Lex::Code;
                    }
                    _ => {}
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Vec<String> {
        Extractor::default().extract(source).into_keys().collect()
    }

    #[test]
    fn test_core_patterns() {
        let source = r#"
import React, { useState } from 'react';
import './polyfills';
const api = require("./api/client");
const worker = require.resolve('./worker.js');
"#;
        assert_eq!(extract(source), vec!["./api/client", "./polyfills", "./worker.js", "react"]);
    }

    #[test]
    fn test_multiline_import_and_backticks() {
        let source = "import {\n  a,\n  b as c,\n} from\n  `./multi`;\nimport * as ns from \"../ns\";";
        assert_eq!(extract(source), vec!["../ns", "./multi"]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let source = "import a from './a';\nconst a2 = require('./a');\nimport './a';";
        assert_eq!(extract(source), vec!["./a"]);
    }

    #[test]
    fn test_commented_imports_are_ignored() {
        let source = r#"
// import Old from './components/exampleWidget';
/* const x = require('./legacy');
   import './also-legacy'; */
import Live from './live'; // trailing note about require('./nope')
"#;
        assert_eq!(extract(source), vec!["./live"]);
    }

    #[test]
    fn test_comment_markers_inside_strings_survive() {
        let source = r#"const url = "http://example.com/*x"; import a from './after';"#;
        assert_eq!(extract(source), vec!["./after"]);
    }

    #[test]
    fn test_jsx_apostrophe_does_not_hide_following_lines() {
        let source = "const t = <Text>Don't stop</Text>;\nimport b from './b';";
        assert_eq!(extract(source), vec!["./b"]);
    }

    #[test]
    fn test_computed_targets_are_invisible() {
        let source = "const m = require(`./locales/${lang}`);\nconst n = require(name);";
        assert!(extract(source).is_empty());
    }

    #[test]
    fn test_identifier_suffix_is_not_require() {
        assert!(extract("myrequire('./x'); reimport './y';").is_empty());
    }

    #[test]
    fn test_extended_syntax_is_opt_in() {
        let source = "export { a } from './reexport';\nconst lazy = import('./lazy');";
        assert!(extract(source).is_empty());

        let found: Vec<_> = Extractor::new(true).extract(source).into_keys().collect();
        assert_eq!(found, vec!["./lazy", "./reexport"]);
    }

    #[test]
    fn test_kinds_are_reported() {
        let found = Extractor::default().extract("require.resolve('./w');\nimport './s';");
        assert_eq!(found["./w"], ImportKind::RequireResolve);
        assert_eq!(found["./s"], ImportKind::SideEffect);
    }

    #[test]
    fn test_strip_comments_keeps_line_structure() {
        let stripped = strip_comments("a // b\n/* c\nd */ e");
        assert_eq!(stripped.lines().count(), 3);
        assert!(stripped.contains('a') && stripped.contains('e'));
        assert!(!stripped.contains('b') && !stripped.contains('c') && !stripped.contains('d'));
    }

    #[test]
    fn test_regex_literal_does_not_open_comment() {
        let source = "p.replace(/\\/*$/, '');\nconst live = require('./live');";
        assert_eq!(extract(source), vec!["./live"]);
    }

    #[test]
    fn test_regex_after_keyword_and_class() {
        let source = "function trim(p) {\n  return /[/*]+$/.test(p);\n}\nimport a from './a';";
        assert_eq!(extract(source), vec!["./a"]);
    }

    #[test]
    fn test_division_still_allows_comments() {
        let source = "const half = total / 2; // require('./dead')\nimport a from './a';";
        assert_eq!(extract(source), vec!["./a"]);
    }

    #[test]
    fn test_jsx_apostrophe_before_line_comment() {
        let source = "const t = <Text>Don't</Text>; // import X from './dead'\nimport b from './b';";
        assert_eq!(extract(source), vec!["./b"]);
    }

    #[test]
    fn test_jsx_closing_tags_are_not_regex() {
        let source = "const v = <View>{x} /></View>; // require('./dead')\nrequire('./b');";
        assert_eq!(extract(source), vec!["./b"]);
    }
}
