//! # EPS Label Detection
//!
//! 「1株当たり利益」を示すラベルと Basic / Diluted 区分の検出

use std::sync::LazyLock;

use regex::Regex;

static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        \b(?:
            (?:net\s+)?(?:earnings|income|loss)(?:\s*\((?:loss|deficit)\))?
            (?:\s+from\s+continuing\s+operations)?
            \s+per\s+(?:basic\s+|diluted\s+)?(?:common\s+|ordinary\s+)?share\b
          | (?:basic\s+|diluted\s+)?eps\b
        )",
    )
    .expect("label pattern is valid")
});

/// 金額の後ろに来る「per (diluted) share」表記
static TRAILING_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*per\s+(?:basic\s+|diluted\s+)?(?:common\s+|ordinary\s+)?share\b")
        .expect("trailing label pattern is valid")
});

/// 「per share」が利益を指していると判断するための語
static EARNINGS_CONTEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:earnings|net\s+income|net\s+loss|eps)\b")
        .expect("earnings context pattern is valid")
});

/// Basic / Diluted 区分
///
/// 順序は優先度を表す（Diluted が最優先）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Qualifier {
    Unqualified,
    Basic,
    Diluted,
}

impl Qualifier {
    /// テキスト中の区分語から判定する
    ///
    /// 「basic and diluted」のように両方ある場合は Diluted とする
    pub fn detect(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("diluted") {
            Self::Diluted
        } else if lower.contains("basic") {
            Self::Basic
        } else {
            Self::Unqualified
        }
    }

    pub fn is_qualified(self) -> bool {
        self != Self::Unqualified
    }
}

/// テキスト中のラベル位置（バイト位置）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelMatch {
    pub start: usize,
    pub end: usize,
}

/// テキスト中の EPS ラベルをすべて返す
pub fn find_labels(text: &str) -> Vec<LabelMatch> {
    LABEL_RE
        .find_iter(text)
        .map(|m| LabelMatch {
            start: m.start(),
            end: m.end(),
        })
        .collect()
}

/// 金額の直後が「per share」ラベルなら、そのラベルの長さを返す
pub fn trailing_label_len(rest: &str) -> Option<usize> {
    TRAILING_LABEL_RE.find(rest).map(|m| m.end())
}

/// 直前の文脈に利益を示す語があるか
pub fn has_earnings_context(text: &str) -> bool {
    EARNINGS_CONTEXT_RE.is_match(text)
}

/// ラベル直前の区分語を探す範囲
///
/// `max_chars` 文字以内で、文の区切り（空白が続く `.`、または `;`）より後ろの部分を返す。
/// 小数点は区切りとみなさない。
pub fn leading_clause(text: &str, end: usize, max_chars: usize) -> &str {
    let head = &text[..end];
    let start = head
        .char_indices()
        .rev()
        .nth(max_chars.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let window = &head[start..];
    let boundary = window.char_indices().rev().find(|&(i, c)| {
        c == ';' || (c == '.' && window[i + 1..].starts_with(char::is_whitespace))
    });
    match boundary {
        Some((pos, _)) => &window[pos + 1..],
        None => window,
    }
}
