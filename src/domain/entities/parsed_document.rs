//! # ParsedDocument Entity
//!
//! パース済みドキュメントのドメイン表現
//!
//! HTMLパーサーに依存しないよう、ドキュメントは文書順のテキストブロック列として表現する。

/// テキストブロックの種類
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    /// ブロック要素の境界で区切られた本文テキスト
    Text,
    /// テーブルの1行
    TableRow {
        /// ドキュメント内のテーブル番号
        table: usize,
        /// テーブル内の行番号
        row: usize,
        /// セルのテキスト（空セルを含む）
        cells: Vec<String>,
    },
    /// inline XBRL の数値ファクト（`ix:nonFraction`）
    Fact {
        /// コンセプト名（例: `us-gaap:EarningsPerShareDiluted`）
        concept: String,
        /// `sign="-"` 属性の有無
        negative: bool,
    },
}

/// テキストブロック
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub kind: BlockKind,
    /// 空白正規化済みのテキスト（テーブル行はセルを空白で連結）
    pub text: String,
}

impl TextBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Text,
            text: text.into(),
        }
    }

    pub fn table_row(table: usize, row: usize, cells: Vec<String>) -> Self {
        let text = cells
            .iter()
            .filter(|cell| !cell.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            kind: BlockKind::TableRow { table, row, cells },
            text,
        }
    }

    pub fn fact(concept: impl Into<String>, negative: bool, text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Fact {
                concept: concept.into(),
                negative,
            },
            text: text.into(),
        }
    }
}

/// パース済みドキュメント
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedDocument {
    pub filename: String,
    /// 文書順のブロック
    pub blocks: Vec<TextBlock>,
}

impl ParsedDocument {
    pub fn new(filename: impl Into<String>, blocks: Vec<TextBlock>) -> Self {
        Self {
            filename: filename.into(),
            blocks,
        }
    }
}

/// 空白を正規化する
///
/// NBSP などの Unicode 空白を含む連続空白を1つのスペースにまとめ、前後を除去する
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() || ch == '\u{200b}' {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace_collapses_nbsp() {
        assert_eq!(
            normalize_whitespace("  Diluted\u{a0}\u{a0}EPS\n\t$1.23  "),
            "Diluted EPS $1.23"
        );
    }

    #[test]
    fn test_normalize_whitespace_empty() {
        assert_eq!(normalize_whitespace(" \n\u{a0} "), "");
    }

    #[test]
    fn test_table_row_text_skips_empty_cells() {
        let block = TextBlock::table_row(
            0,
            3,
            vec![
                "Diluted".to_string(),
                String::new(),
                "$".to_string(),
                "(0.12)".to_string(),
            ],
        );
        assert_eq!(block.text, "Diluted $ (0.12)");
        match block.kind {
            BlockKind::TableRow { table, row, cells } => {
                assert_eq!(table, 0);
                assert_eq!(row, 3);
                assert_eq!(cells.len(), 4);
            }
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn test_fact_block() {
        let block = TextBlock::fact("us-gaap:EarningsPerShareBasic", true, "0.45");
        assert_eq!(block.text, "0.45");
        assert_eq!(
            block.kind,
            BlockKind::Fact {
                concept: "us-gaap:EarningsPerShareBasic".to_string(),
                negative: true
            }
        );
    }
}
