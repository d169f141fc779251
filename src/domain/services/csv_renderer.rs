//! # CSV Renderer
//!
//! バッチを `filename,eps` 形式の CSV に変換するドメインサービス
//!
//! - ヘッダー行は常に出力
//! - 行はバッチの順序どおり
//! - `,` `"` 改行を含むフィールドはダブルクォートで囲み、内部の `"` は `""` にする
//! - EPS がない行は空フィールド

use crate::domain::entities::batch::Batch;
use crate::domain::entities::extraction_result::ExtractionResult;

const HEADER: [&str; 2] = ["filename", "eps"];

/// CSV レンダラー
pub struct CsvRenderer;

impl CsvRenderer {
    /// バッチを CSV バイト列に変換する
    pub fn render(batch: &Batch) -> Vec<u8> {
        Self::render_rows(batch.rows()).into_bytes()
    }

    /// 抽出結果の列を CSV 文字列に変換する
    pub fn render_rows(rows: &[ExtractionResult]) -> String {
        let mut out = String::new();
        push_record(&mut out, &HEADER);
        for row in rows {
            let eps = row.eps.map(format_eps).unwrap_or_default();
            push_record(&mut out, &[row.filename.as_str(), eps.as_str()]);
        }
        out
    }
}

/// 数値を再パース可能な最短表記にする
fn format_eps(value: f64) -> String {
    value.to_string()
}

fn push_record(out: &mut String, fields: &[&str]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
    out.push('\n');
}

fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\r', '\n']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}
