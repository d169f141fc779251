//! HTML Document Loader Implementation
//!
//! DocumentLoaderのHTML実装
//!
//! 1. 先頭バイトでバイナリ（PDF, ZIP, NUL を含むもの）を除外
//! 2. UTF-8 として寛容にデコードし、タグらしき記述がなければ除外
//! 3. html5ever で寛容にパースし、文書順にテキスト・テーブル行・XBRLファクトを取り出す

use log::debug;
use scraper::{ElementRef, Html, Node};

use crate::adapter::config::LoaderConfig;
use crate::domain::entities::parsed_document::{normalize_whitespace, ParsedDocument, TextBlock};
use crate::domain::errors::DocumentError;
use crate::domain::repositories::document_loader::DocumentLoader;

/// バイナリ判定に使う先頭バイト数
const SNIFF_WINDOW: usize = 1024;
/// これより深い要素は構造を見ずにテキストだけ取り出す
const MAX_DEPTH: usize = 256;

const HTML_EXTENSIONS: [&str; 3] = [".htm", ".html", ".xhtml"];

const SKIPPED_ELEMENTS: [&str; 5] = ["script", "style", "noscript", "template", "head"];

const BLOCK_ELEMENTS: [&str; 32] = [
    "address", "article", "aside", "blockquote", "body", "caption", "center", "dd", "div", "dl",
    "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "html", "li", "main", "nav", "ol", "p", "pre", "section",
];

const FACT_ELEMENT: &str = "ix:nonfraction";

/// HTMLドキュメントローダー
#[derive(Debug, Clone, Default)]
pub struct HtmlDocumentLoader {
    require_html_extension: bool,
}

impl HtmlDocumentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// ファイル名の拡張子チェックを有効にする
    pub fn with_extension_filter(mut self, enabled: bool) -> Self {
        self.require_html_extension = enabled;
        self
    }

    fn check_extension(&self, filename: &str) -> Result<(), DocumentError> {
        if !self.require_html_extension {
            return Ok(());
        }
        let lower = filename.to_ascii_lowercase();
        if HTML_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            Ok(())
        } else {
            Err(DocumentError::unsupported(filename, "not an .html file"))
        }
    }
}

impl From<&LoaderConfig> for HtmlDocumentLoader {
    fn from(config: &LoaderConfig) -> Self {
        Self::new().with_extension_filter(config.require_html_extension)
    }
}

impl DocumentLoader for HtmlDocumentLoader {
    fn load(&self, bytes: &[u8], filename: &str) -> Result<ParsedDocument, DocumentError> {
        if bytes.is_empty() {
            return Err(DocumentError::EmptyInput {
                filename: filename.to_string(),
            });
        }
        self.check_extension(filename)?;
        sniff_binary(bytes, filename)?;

        let decoded = String::from_utf8_lossy(bytes);
        let text = decoded.trim_start_matches('\u{feff}');
        if text.trim().is_empty() {
            return Err(DocumentError::EmptyInput {
                filename: filename.to_string(),
            });
        }
        if !has_markup(text) {
            return Err(DocumentError::unsupported(filename, "no HTML markup"));
        }

        let html = Html::parse_document(text);
        let mut walker = Walker::default();
        walker.visit(html.root_element(), 0);
        walker.flush();

        debug!(
            "Parsed {}: {} blocks, {} tables",
            filename,
            walker.blocks.len(),
            walker.table_count
        );
        Ok(ParsedDocument::new(filename, walker.blocks))
    }
}

fn sniff_binary(bytes: &[u8], filename: &str) -> Result<(), DocumentError> {
    let window = &bytes[..bytes.len().min(SNIFF_WINDOW)];
    if window.starts_with(b"%PDF") {
        return Err(DocumentError::unsupported(filename, "PDF document"));
    }
    if window.starts_with(b"PK\x03\x04") {
        return Err(DocumentError::unsupported(filename, "ZIP archive"));
    }
    if window.contains(&0) {
        return Err(DocumentError::unsupported(filename, "binary content"));
    }
    Ok(())
}

/// `<` の直後に英字・`!`・`/` が続く箇所があるか
fn has_markup(text: &str) -> bool {
    text.as_bytes()
        .windows(2)
        .any(|w| w[0] == b'<' && (w[1].is_ascii_alphabetic() || w[1] == b'!' || w[1] == b'/'))
}

fn is_block(name: &str) -> bool {
    BLOCK_ELEMENTS.contains(&name) || name == "br"
}

/// 最も近い祖先の `<table>` が `table` か
fn belongs_to(element: ElementRef<'_>, table: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "table")
        .is_some_and(|nearest| nearest.id() == table.id())
}

/// 要素内のテキスト（入れ子のテーブルとスキップ対象を除く）
fn inline_text(element: ElementRef<'_>, out: &mut String, depth: usize) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = child.value().name();
                if SKIPPED_ELEMENTS.contains(&name) || name == "table" {
                    continue;
                }
                if is_block(name) {
                    out.push(' ');
                }
                if depth >= MAX_DEPTH {
                    out.extend(child.text());
                } else {
                    inline_text(child, out, depth + 1);
                }
                if is_block(name) {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

fn fact_block(element: ElementRef<'_>) -> Option<TextBlock> {
    let concept = element.value().attr("name")?;
    let negative = element.value().attr("sign") == Some("-");
    let text = normalize_whitespace(&element.text().collect::<String>());
    Some(TextBlock::fact(concept, negative, text))
}

#[derive(Default)]
struct Walker {
    blocks: Vec<TextBlock>,
    buffer: String,
    table_count: usize,
}

impl Walker {
    fn flush(&mut self) {
        let text = normalize_whitespace(&self.buffer);
        self.buffer.clear();
        if !text.is_empty() {
            self.blocks.push(TextBlock::text(text));
        }
    }

    fn visit(&mut self, element: ElementRef<'_>, depth: usize) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.buffer.push_str(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.visit_element(child, depth + 1);
                    }
                }
                _ => {}
            }
        }
    }

    fn visit_element(&mut self, element: ElementRef<'_>, depth: usize) {
        let name = element.value().name();
        if SKIPPED_ELEMENTS.contains(&name) {
            return;
        }
        if name == "table" {
            self.flush();
            self.visit_table(element, depth);
            return;
        }
        if name == FACT_ELEMENT {
            if let Some(block) = fact_block(element) {
                self.blocks.push(block);
            }
        }

        let block = is_block(name);
        if block {
            self.flush();
        }
        if depth >= MAX_DEPTH {
            self.buffer.extend(element.text());
            self.buffer.push(' ');
        } else {
            self.visit(element, depth);
        }
        if block {
            self.flush();
        }
    }

    fn visit_table(&mut self, table: ElementRef<'_>, depth: usize) {
        let table_index = self.table_count;
        self.table_count += 1;

        let mut nested = Vec::new();
        let mut row_index = 0;

        for descendant in table.descendants().skip(1).filter_map(ElementRef::wrap) {
            let name = descendant.value().name();
            if !belongs_to(descendant, table) {
                continue;
            }
            match name {
                "tr" => {
                    let cells: Vec<String> = descendant
                        .children()
                        .filter_map(ElementRef::wrap)
                        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                        .map(|cell| {
                            let mut text = String::new();
                            inline_text(cell, &mut text, depth + 1);
                            normalize_whitespace(&text)
                        })
                        .collect();
                    if cells.iter().any(|cell| !cell.is_empty()) {
                        self.blocks
                            .push(TextBlock::table_row(table_index, row_index, cells));
                        row_index += 1;
                    }
                }
                "table" => nested.push(descendant),
                FACT_ELEMENT => {
                    if let Some(block) = fact_block(descendant) {
                        self.blocks.push(block);
                    }
                }
                _ => {}
            }
        }

        for inner in nested {
            if depth < MAX_DEPTH {
                self.visit_table(inner, depth + 1);
            }
        }
    }
}
