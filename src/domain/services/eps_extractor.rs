//! # EPS Extractor
//!
//! パース済みドキュメントから EPS を1つ抽出するドメインサービス
//!
//! 1. 全戦略の候補を集める
//! 2. 区分（Diluted > Basic > 区分なし）→ 出現箇所（タグ > テーブル > 本文）→ 文書順で選択
//! 3. 範囲外の値は「見つからない」に格下げ（警告付き）
//! 4. 信頼度が閾値未満でも値は返し、警告を付ける

use serde::{Deserialize, Serialize};

use crate::domain::entities::extraction_result::ExtractionResult;
use crate::domain::entities::parsed_document::ParsedDocument;
use crate::domain::services::eps_matchers::{default_matchers, Candidate, EpsMatcher, Origin};

const SCORE_TOLERANCE: f64 = 1e-9;

/// 抽出設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorSettings {
    /// ラベルから金額を探す最大文字数
    pub window_chars: usize,
    /// EPS として妥当な絶対値の上限
    pub max_abs_eps: f64,
    /// これ未満の信頼度は警告付きで返す
    pub min_confidence: f64,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            window_chars: 120,
            max_abs_eps: 1000.0,
            min_confidence: 0.3,
        }
    }
}

/// 抽出結果
#[derive(Debug, Clone, PartialEq)]
pub enum EpsOutcome {
    Found {
        value: f64,
        confidence: f64,
        matcher: &'static str,
    },
    /// 値は採用するが信頼度が低い
    LowConfidence {
        value: f64,
        confidence: f64,
        matcher: &'static str,
    },
    NotFound,
    /// 候補が妥当な範囲外（誤抽出の可能性）
    OutOfRange { value: f64, limit: f64 },
}

impl EpsOutcome {
    pub fn eps(&self) -> Option<f64> {
        match self {
            Self::Found { value, .. } | Self::LowConfidence { value, .. } => Some(*value),
            Self::NotFound | Self::OutOfRange { .. } => None,
        }
    }

    pub fn warning(&self) -> Option<String> {
        match self {
            Self::Found { .. } => None,
            Self::NotFound => Some("EPS not found".to_string()),
            Self::LowConfidence { confidence, .. } => Some(format!(
                "low-confidence EPS match (confidence {:.2})",
                confidence
            )),
            Self::OutOfRange { value, limit } => Some(format!(
                "discarded EPS candidate {}: outside sanity range ±{}",
                value, limit
            )),
        }
    }

    /// ファイル名を付けて抽出結果に変換
    pub fn into_result(self, filename: impl Into<String>) -> ExtractionResult {
        ExtractionResult {
            filename: filename.into(),
            eps: self.eps(),
            warning: self.warning(),
        }
    }
}

/// EPS 抽出サービス
pub struct EpsExtractor {
    matchers: Vec<Box<dyn EpsMatcher>>,
    settings: ExtractorSettings,
}

impl EpsExtractor {
    /// 既定の戦略で作成
    pub fn new(settings: ExtractorSettings) -> Self {
        Self::with_matchers(settings, default_matchers())
    }

    /// 戦略を指定して作成
    ///
    /// # Arguments
    ///
    /// * `settings` - 抽出設定
    /// * `matchers` - 優先度順の戦略リスト
    pub fn with_matchers(settings: ExtractorSettings, matchers: Vec<Box<dyn EpsMatcher>>) -> Self {
        Self { matchers, settings }
    }

    /// ドキュメントから EPS を抽出する
    ///
    /// 同じドキュメントに対して常に同じ結果を返す
    pub fn extract(&self, doc: &ParsedDocument) -> EpsOutcome {
        let candidates: Vec<Candidate> = self
            .matchers
            .iter()
            .flat_map(|matcher| matcher.find_candidates(doc, self.settings.window_chars))
            .collect();

        let Some(best) = select_best(&candidates) else {
            return EpsOutcome::NotFound;
        };

        if best.value.abs() > self.settings.max_abs_eps {
            return EpsOutcome::OutOfRange {
                value: best.value,
                limit: self.settings.max_abs_eps,
            };
        }

        let confidence = confidence(best, &candidates);
        if confidence + SCORE_TOLERANCE < self.settings.min_confidence {
            return EpsOutcome::LowConfidence {
                value: best.value,
                confidence,
                matcher: best.matcher,
            };
        }

        EpsOutcome::Found {
            value: best.value,
            confidence,
            matcher: best.matcher,
        }
    }
}

impl Default for EpsExtractor {
    fn default() -> Self {
        Self::new(ExtractorSettings::default())
    }
}

/// 優先度が最も高い候補
///
/// 同順位の場合は先に現れたものを返す
fn select_best(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates.iter().min_by(|a, b| {
        b.qualifier
            .cmp(&a.qualifier)
            .then(b.origin.cmp(&a.origin))
            .then(a.block.cmp(&b.block))
            .then(a.offset.cmp(&b.offset))
    })
}

/// 候補の信頼度（0.0〜1.0）
fn confidence(best: &Candidate, candidates: &[Candidate]) -> f64 {
    let mut score: f64 = match best.origin {
        Origin::TaggedFact => 0.5,
        Origin::TableCell => 0.4,
        Origin::FreeText => 0.0,
    };

    score += if best.explicit_label { 0.3 } else { 0.2 };

    if best.qualifier.is_qualified() {
        score += 0.2;
    }

    let corroborating = candidates
        .iter()
        .filter(|c| c.value == best.value)
        .count();
    if corroborating > 1 {
        score += 0.1;
    }

    if (-50.0..=50.0).contains(&best.value) {
        score += 0.1;
    } else {
        score -= 0.4;
    }

    if best.value > 10.0 && best.value.fract() == 0.0 {
        score -= 0.2;
    }

    score.clamp(0.0, 1.0)
}
