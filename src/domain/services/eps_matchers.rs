//! # EPS Matcher Strategies
//!
//! EPS 候補を探す独立した戦略群
//!
//! 各戦略はドキュメント全体から候補を列挙するだけで、最終的な選択は
//! `EpsExtractor` が優先度（区分 → 出現箇所 → 文書順）に従って行う。
//!
//! - **TaggedFactMatcher**: inline XBRL の `ix:nonFraction` ファクト
//! - **TableRowMatcher**: テーブル行（ラベル行 / 「Basic」「Diluted」小見出し行）
//! - **FreeTextMatcher**: 本文中の「ラベル → 金額」
//! - **TrailingLabelMatcher**: 本文中の「金額 per diluted share」

use crate::domain::entities::parsed_document::{BlockKind, ParsedDocument};
use crate::domain::services::amount::{find_amount, parse_amount};
use crate::domain::services::eps_label::{
    find_labels, has_earnings_context, leading_clause, trailing_label_len, Qualifier,
};

/// ラベル直前で区分語を探す文字数
const QUALIFIER_LOOKBEHIND_CHARS: usize = 40;
/// 「金額 per share」の前で利益を示す語を探す文字数
const EARNINGS_LOOKBEHIND_CHARS: usize = 80;
/// 「Basic」「Diluted」小見出しセルとみなす最大文字数
const SECTION_CELL_MAX_LEN: usize = 60;

/// 候補の出現箇所
///
/// 順序は優先度を表す（タグ付きファクトが最優先）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Origin {
    FreeText,
    TableCell,
    TaggedFact,
}

/// EPS 候補
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub value: f64,
    pub qualifier: Qualifier,
    pub origin: Origin,
    /// ラベルが金額より前に明示されていたか
    pub explicit_label: bool,
    /// ブロック番号（文書順）
    pub block: usize,
    /// ブロック内の位置（バイト位置またはセル番号）
    pub offset: usize,
    pub matcher: &'static str,
}

/// EPS 候補を探す戦略
pub trait EpsMatcher: Send + Sync {
    /// 戦略名（ログ・診断用）
    fn name(&self) -> &'static str;

    /// ドキュメントから候補を列挙する
    ///
    /// # Arguments
    ///
    /// * `doc` - パース済みドキュメント
    /// * `window_chars` - ラベルから金額を探す最大文字数
    fn find_candidates(&self, doc: &ParsedDocument, window_chars: usize) -> Vec<Candidate>;
}

/// 既定の戦略リスト（優先度順）
pub fn default_matchers() -> Vec<Box<dyn EpsMatcher>> {
    vec![
        Box::new(TaggedFactMatcher),
        Box::new(TableRowMatcher),
        Box::new(FreeTextMatcher),
        Box::new(TrailingLabelMatcher),
    ]
}

/// 先頭 `max_chars` 文字に切り詰める
fn bounded(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// 最初のラベルより前で切り詰める
fn before_next_label(text: &str) -> &str {
    match find_labels(text).first() {
        Some(label) => &text[..label.start],
        None => text,
    }
}

/// inline XBRL の EPS ファクト
pub struct TaggedFactMatcher;

impl TaggedFactMatcher {
    fn is_eps_concept(concept: &str) -> bool {
        let lower = concept.to_ascii_lowercase();
        let local = lower.rsplit(':').next().unwrap_or(&lower);
        local.contains("earningspershare")
            || (local.starts_with("incomeloss") && local.contains("per") && local.ends_with("share"))
    }
}

impl EpsMatcher for TaggedFactMatcher {
    fn name(&self) -> &'static str {
        "tagged_fact"
    }

    fn find_candidates(&self, doc: &ParsedDocument, _window_chars: usize) -> Vec<Candidate> {
        doc.blocks
            .iter()
            .enumerate()
            .filter_map(|(index, block)| {
                let BlockKind::Fact { concept, negative } = &block.kind else {
                    return None;
                };
                if !Self::is_eps_concept(concept) {
                    return None;
                }
                let magnitude = parse_amount(&block.text)?;
                let value = if *negative {
                    -magnitude.abs()
                } else {
                    magnitude
                };
                Some(Candidate {
                    value,
                    qualifier: Qualifier::detect(concept),
                    origin: Origin::TaggedFact,
                    explicit_label: true,
                    block: index,
                    offset: 0,
                    matcher: self.name(),
                })
            })
            .collect()
    }
}

/// テーブル行
///
/// 1. ラベルを含むセルの残り、または後続セルの最初の金額
/// 2. 金額のないラベル行は小見出しとして扱い、同じテーブルで続く
///    「Basic」「Diluted」行の金額を候補にする
pub struct TableRowMatcher;

impl TableRowMatcher {
    fn section_qualifier(cell: &str) -> Option<Qualifier> {
        if cell.len() > SECTION_CELL_MAX_LEN {
            return None;
        }
        let lower = cell
            .trim_start_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if lower.starts_with("diluted") {
            Some(Qualifier::Diluted)
        } else if lower.starts_with("basic") {
            Some(Qualifier::Basic)
        } else {
            None
        }
    }

    fn join_cells(cells: &[String]) -> String {
        cells
            .iter()
            .filter(|cell| !cell.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl EpsMatcher for TableRowMatcher {
    fn name(&self) -> &'static str {
        "table_row"
    }

    fn find_candidates(&self, doc: &ParsedDocument, window_chars: usize) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        let mut open_section: Option<usize> = None;

        for (index, block) in doc.blocks.iter().enumerate() {
            let BlockKind::TableRow { table, cells, .. } = &block.kind else {
                continue;
            };
            if open_section.is_some_and(|t| t != *table) {
                open_section = None;
            }

            let labelled = cells
                .iter()
                .enumerate()
                .find_map(|(ci, cell)| find_labels(cell).first().map(|label| (ci, *label)));

            if let Some((ci, label)) = labelled {
                let cell = &cells[ci];
                let rest = format!(
                    "{} {}",
                    &cell[label.end..],
                    Self::join_cells(&cells[ci + 1..])
                );
                let window = bounded(before_next_label(&rest), window_chars);
                match find_amount(window) {
                    Some(found) => candidates.push(Candidate {
                        value: found.amount.value,
                        qualifier: Qualifier::detect(&format!(
                            "{} {}",
                            cell,
                            &window[..found.start]
                        )),
                        origin: Origin::TableCell,
                        explicit_label: true,
                        block: index,
                        offset: ci,
                        matcher: self.name(),
                    }),
                    None => open_section = Some(*table),
                }
                continue;
            }

            if open_section.is_none() {
                continue;
            }
            let Some(first) = cells.iter().position(|cell| !cell.is_empty()) else {
                continue;
            };
            match Self::section_qualifier(&cells[first]) {
                Some(qualifier) => {
                    let rest = Self::join_cells(&cells[first + 1..]);
                    if let Some(found) = find_amount(bounded(&rest, window_chars)) {
                        candidates.push(Candidate {
                            value: found.amount.value,
                            qualifier,
                            origin: Origin::TableCell,
                            explicit_label: true,
                            block: index,
                            offset: first,
                            matcher: self.name(),
                        });
                    }
                }
                None => open_section = None,
            }
        }

        candidates
    }
}

/// 本文中の「ラベル → 金額」
pub struct FreeTextMatcher;

impl EpsMatcher for FreeTextMatcher {
    fn name(&self) -> &'static str {
        "free_text"
    }

    fn find_candidates(&self, doc: &ParsedDocument, window_chars: usize) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for (index, block) in doc.blocks.iter().enumerate() {
            if block.kind != BlockKind::Text {
                continue;
            }
            let text = block.text.as_str();
            let labels = find_labels(text);

            for (i, label) in labels.iter().enumerate() {
                let limit = labels.get(i + 1).map_or(text.len(), |next| next.start);
                let window = bounded(&text[label.end..limit], window_chars);
                let Some(found) = find_amount(window) else {
                    continue;
                };
                let clause = leading_clause(text, label.start, QUALIFIER_LOOKBEHIND_CHARS);
                let context = format!("{}{}", clause, &text[label.start..label.end + found.start]);
                candidates.push(Candidate {
                    value: found.amount.value,
                    qualifier: Qualifier::detect(&context),
                    origin: Origin::FreeText,
                    explicit_label: true,
                    block: index,
                    offset: label.start,
                    matcher: self.name(),
                });
            }
        }

        candidates
    }
}

/// 本文中の「金額 per (diluted) share」
///
/// 直前に利益を示す語（earnings, net income など）がある場合のみ候補にする
pub struct TrailingLabelMatcher;

impl EpsMatcher for TrailingLabelMatcher {
    fn name(&self) -> &'static str {
        "trailing_label"
    }

    fn find_candidates(&self, doc: &ParsedDocument, _window_chars: usize) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for (index, block) in doc.blocks.iter().enumerate() {
            if block.kind != BlockKind::Text {
                continue;
            }
            let text = block.text.as_str();
            let mut pos = 0;

            while let Some(found) = find_amount(&text[pos..]) {
                let start = pos + found.start;
                let end = pos + found.end;
                pos = end;

                let Some(label_len) = trailing_label_len(&text[end..]) else {
                    continue;
                };
                let before = leading_clause(text, start, EARNINGS_LOOKBEHIND_CHARS);
                if !has_earnings_context(before) {
                    continue;
                }
                candidates.push(Candidate {
                    value: found.amount.value,
                    qualifier: Qualifier::detect(&text[end..end + label_len]),
                    origin: Origin::FreeText,
                    explicit_label: false,
                    block: index,
                    offset: start,
                    matcher: self.name(),
                });
            }
        }

        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::parsed_document::TextBlock;

    fn row(table: usize, row: usize, cells: &[&str]) -> TextBlock {
        TextBlock::table_row(table, row, cells.iter().map(|c| c.to_string()).collect())
    }

    fn doc(blocks: Vec<TextBlock>) -> ParsedDocument {
        ParsedDocument::new("test.html", blocks)
    }

    #[test]
    fn test_bounded_respects_char_boundaries() {
        assert_eq!(bounded("€1.00 abc", 3), "€1.");
        assert_eq!(bounded("ab", 10), "ab");
    }

    #[test]
    fn test_tagged_fact_matcher() {
        let document = doc(vec![
            TextBlock::fact("us-gaap:EarningsPerShareDiluted", true, "0.45"),
            TextBlock::fact("us-gaap:Revenues", false, "1,234"),
            TextBlock::fact("us-gaap:EarningsPerShareBasic", false, "0.47"),
        ]);

        let candidates = TaggedFactMatcher.find_candidates(&document, 120);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].value, -0.45);
        assert_eq!(candidates[0].qualifier, Qualifier::Diluted);
        assert_eq!(candidates[0].origin, Origin::TaggedFact);
        assert_eq!(candidates[1].value, 0.47);
        assert_eq!(candidates[1].qualifier, Qualifier::Basic);
        assert_eq!(candidates[1].block, 2);
    }

    #[test]
    fn test_tagged_fact_concepts() {
        assert!(TaggedFactMatcher::is_eps_concept("us-gaap:EarningsPerShareBasicAndDiluted"));
        assert!(TaggedFactMatcher::is_eps_concept(
            "us-gaap:IncomeLossFromContinuingOperationsPerDilutedShare"
        ));
        assert!(!TaggedFactMatcher::is_eps_concept(
            "us-gaap:CommonStockDividendsPerShareDeclared"
        ));
    }

    #[test]
    fn test_table_row_label_and_amount_in_same_row() {
        let document = doc(vec![
            row(0, 0, &["", "Three Months Ended", ""]),
            row(0, 1, &["Diluted earnings per share", "", "$", "(0.12", ")", "$", "0.30"]),
        ]);

        let candidates = TableRowMatcher.find_candidates(&document, 120);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].value, -0.12);
        assert_eq!(candidates[0].qualifier, Qualifier::Diluted);
        assert_eq!(candidates[0].origin, Origin::TableCell);
        assert_eq!(candidates[0].block, 1);
    }

    #[test]
    fn test_table_row_section_layout() {
        let document = doc(vec![
            row(0, 0, &["Earnings per share:", "", ""]),
            row(0, 1, &["Basic", "$", "1.25"]),
            row(0, 2, &["Diluted", "$", "1.20"]),
            row(0, 3, &["Weighted average shares", "1,000"]),
            row(0, 4, &["Basic", "1,000,000"]),
        ]);

        let candidates = TableRowMatcher.find_candidates(&document, 120);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].value, 1.25);
        assert_eq!(candidates[0].qualifier, Qualifier::Basic);
        assert_eq!(candidates[1].value, 1.20);
        assert_eq!(candidates[1].qualifier, Qualifier::Diluted);
    }

    #[test]
    fn test_table_row_section_closes_on_new_table() {
        let document = doc(vec![
            row(0, 0, &["Earnings per share"]),
            row(1, 0, &["Basic", "$", "9.99"]),
        ]);

        let candidates = TableRowMatcher.find_candidates(&document, 120);

        assert!(candidates.is_empty());
    }

    #[test]
    fn test_free_text_matcher() {
        let document = doc(vec![
            TextBlock::text("Revenue was $10.5 million."),
            TextBlock::text("Basic EPS for the quarter ended June 30, 2024 was -1.23."),
        ]);

        let candidates = FreeTextMatcher.find_candidates(&document, 120);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].value, -1.23);
        assert_eq!(candidates[0].qualifier, Qualifier::Basic);
        assert_eq!(candidates[0].block, 1);
    }

    #[test]
    fn test_free_text_window_is_bounded() {
        let filler = "x".repeat(200);
        let document = doc(vec![TextBlock::text(format!("EPS {} 1.23", filler))]);

        assert!(FreeTextMatcher.find_candidates(&document, 120).is_empty());
        assert_eq!(FreeTextMatcher.find_candidates(&document, 400).len(), 1);
    }

    #[test]
    fn test_free_text_window_stops_at_next_label() {
        let document = doc(vec![TextBlock::text(
            "Basic EPS and Diluted EPS were $0.98",
        )]);

        let candidates = FreeTextMatcher.find_candidates(&document, 120);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].value, 0.98);
        assert_eq!(candidates[0].qualifier, Qualifier::Diluted);
    }

    #[test]
    fn test_trailing_label_matcher() {
        let document = doc(vec![
            TextBlock::text("Net income was $1.2 million, or $0.05 per diluted share."),
            TextBlock::text("The board declared a dividend of $0.25 per share."),
        ]);

        let candidates = TrailingLabelMatcher.find_candidates(&document, 120);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].value, 0.05);
        assert_eq!(candidates[0].qualifier, Qualifier::Diluted);
        assert!(!candidates[0].explicit_label);
    }

    #[test]
    fn test_default_matchers_order() {
        let names: Vec<&str> = default_matchers().iter().map(|m| m.name()).collect();
        assert_eq!(
            names,
            vec!["tagged_fact", "table_row", "free_text", "trailing_label"]
        );
    }
}
