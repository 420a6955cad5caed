//! AST extraction
//!
//! Parses one JavaScript/TypeScript source into a JSON-serializable tree.
//! The result is an envelope: `{"ok":true,"ast":{..}}` when the source parsed
//! cleanly, `{"ok":false,"error":".."}` when it contains a syntax error.
//! Syntax errors are data, not `Err`; only failing to read the file is.

pub mod tree;

use crate::{Error, Result};
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use std::path::Path;
use tree_sitter::{Language, Parser};

pub use tree::{AstNode, Position};

/// Grammar used for a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// TypeScript with decorators
    TypeScript,
    /// TypeScript with JSX
    Tsx,
    /// JavaScript with JSX and decorators
    JavaScript,
}

impl Syntax {
    /// Pick a grammar from the file extension. Unknown extensions fall back
    /// to TypeScript, which accepts most plain JavaScript too.
    pub fn for_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "tsx" => Self::Tsx,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            _ => Self::TypeScript,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
            Self::JavaScript => "javascript",
        }
    }

    fn language(&self) -> Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        }
    }
}

/// Outcome of parsing a single source
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Parsed(AstNode),
    Failed(String),
}

impl Extraction {
    pub fn ast(&self) -> Option<&AstNode> {
        match self {
            Self::Parsed(ast) => Some(ast),
            Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Parsed(_) => None,
            Self::Failed(msg) => Some(msg),
        }
    }

    /// Single-line JSON envelope
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Serialize for Extraction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Extraction", 2)?;
        match self {
            Self::Parsed(ast) => {
                state.serialize_field("ok", &true)?;
                state.serialize_field("ast", ast)?;
            }
            Self::Failed(error) => {
                state.serialize_field("ok", &false)?;
                state.serialize_field("error", error)?;
            }
        }
        state.end()
    }
}

/// Tree conversion options
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Keep anonymous tokens (punctuation, keywords) in the tree
    pub anonymous_tokens: bool,
}

/// Parses sources with tree-sitter and converts the tree to `AstNode`
#[derive(Debug, Clone, Default)]
pub struct AstExtractor {
    options: ExtractOptions,
}

impl AstExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// Read and parse a file. Read failures are returned as `Err`; bytes
    /// that are not valid UTF-8 are replaced rather than rejected.
    pub fn extract_file(&self, path: &Path) -> Result<Extraction> {
        let bytes = std::fs::read(path)?;
        let source = String::from_utf8_lossy(&bytes);
        let syntax = Syntax::for_path(path);
        tracing::debug!("Parsing {} as {}", path.display(), syntax.as_str());
        self.extract_source(syntax, &source)
    }

    /// Parse source text with the given grammar
    pub fn extract_source(&self, syntax: Syntax, source: &str) -> Result<Extraction> {
        let mut parser = Parser::new();
        parser
            .set_language(&syntax.language())
            .map_err(|e| Error::Parse(format!("Failed to set language: {}", e)))?;

        let Some(parsed) = parser.parse(source, None) else {
            return Ok(Extraction::Failed("parser produced no tree".to_string()));
        };

        let root = parsed.root_node();
        if let Some(message) = tree::first_syntax_error(root, source) {
            return Ok(Extraction::Failed(message));
        }

        match tree::convert(root, source, &self.options) {
            Ok(ast) => Ok(Extraction::Parsed(ast)),
            Err(too_deep) => Ok(Extraction::Failed(too_deep.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn extract(syntax: Syntax, source: &str) -> Extraction {
        AstExtractor::new().extract_source(syntax, source).unwrap()
    }

    #[test]
    fn test_syntax_for_path() {
        assert_eq!(Syntax::for_path(Path::new("a.ts")), Syntax::TypeScript);
        assert_eq!(Syntax::for_path(Path::new("a.TSX")), Syntax::Tsx);
        assert_eq!(Syntax::for_path(Path::new("a.jsx")), Syntax::JavaScript);
        assert_eq!(Syntax::for_path(Path::new("a.mjs")), Syntax::JavaScript);
        assert_eq!(Syntax::for_path(Path::new("Makefile")), Syntax::TypeScript);
    }

    #[test]
    fn test_valid_typescript_parses() {
        let result = extract(Syntax::TypeScript, "const x: number = 1;\nexport function f(a: string) { return a; }\n");
        let ast = result.ast().expect("should parse");
        assert_eq!(ast.kind, "program");
        assert!(!ast.children.is_empty());
    }

    #[test]
    fn test_decorators_parse() {
        let source = "@Component({ selector: 'app' })\nclass App {\n  @Input() name: string;\n}\n";
        assert!(extract(Syntax::TypeScript, source).ast().is_some());
    }

    #[test]
    fn test_jsx_parses() {
        let source = "const el = <div className=\"x\">{value}</div>;\n";
        assert!(extract(Syntax::Tsx, source).ast().is_some());
        assert!(extract(Syntax::JavaScript, source).ast().is_some());
    }

    #[test]
    fn test_syntax_error_is_reported_in_band() {
        let result = extract(Syntax::TypeScript, "function (( {");
        let message = result.error().expect("should fail");
        assert!(!message.is_empty());
        assert!(message.contains("line 1"), "message: {message}");
    }

    #[test]
    fn test_envelope_shape() {
        let ok = extract(Syntax::JavaScript, "let a = 1;").to_json_line().unwrap();
        assert!(ok.starts_with("{\"ok\":true,\"ast\":{"));
        assert!(!ok.contains('\n'));

        let failed = Extraction::Failed("boom".into()).to_json_line().unwrap();
        assert_eq!(failed, "{\"ok\":false,\"error\":\"boom\"}");
    }

    #[test]
    fn test_extract_file_reads_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".ts").tempfile().unwrap();
        writeln!(file, "import {{ createHash }} from 'crypto';").unwrap();

        let result = AstExtractor::new().extract_file(file.path()).unwrap();
        assert!(result.ast().is_some());
    }

    #[test]
    fn test_extract_file_accepts_latin1() {
        let mut file = tempfile::Builder::new().suffix(".js").tempfile().unwrap();
        file.write_all(b"// caf\xE9 secret\nconst x = 1;").unwrap();

        let result = AstExtractor::new().extract_file(file.path()).unwrap();
        let ast = result.ast().expect("latin-1 source should parse");
        let comment = ast.walk().find(|n| n.kind == "comment").unwrap();
        assert_eq!(comment.text.as_deref(), Some("// caf\u{FFFD} secret"));
    }

    #[test]
    fn test_extract_missing_file_is_err() {
        let err = AstExtractor::new().extract_file(Path::new("/definitely/not/here.ts"));
        assert!(matches!(err, Err(Error::Io(_))));
    }
}
