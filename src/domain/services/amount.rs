//! # Amount Parsing
//!
//! 決算書テキスト中の金額表記の解析
//!
//! - 括弧は負数: `(0.12)` → -0.12
//! - 先頭の通貨記号・桁区切りカンマを許容: `$1,234.56` → 1234.56
//! - ASCII `-` と U+2212 のマイナス記号を許容（数値・通貨記号・括弧に密着している場合のみ）

use std::sync::LazyLock;

use regex::{Captures, Regex};

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        (?P<sign>[-\x{2212}])?
        (?P<cur1>[$€£¥])?\s*
        (?P<open>\()?\s*
        (?P<sign2>[-\x{2212}])?
        (?P<cur2>[$€£¥])?\s*
        (?P<num>\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+\.\d+|\d+|\.\d+)
        (?P<close>\s*\))?",
    )
    .expect("amount pattern is valid")
});

/// 金額の直後に来ると EPS ではないと判断する単位語
const SCALE_WORDS: [&str; 5] = ["million", "billion", "thousand", "percent", "bps"];

/// 解析済みの金額
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Amount {
    pub value: f64,
    /// 小数部を持つか
    pub has_decimal: bool,
    /// 通貨記号が付いているか
    pub has_currency: bool,
}

impl Amount {
    /// EPS として扱える表記か
    ///
    /// 小数部も通貨記号もない整数（年、日付、注記番号）は対象外
    pub fn is_money_like(&self) -> bool {
        self.has_decimal || self.has_currency
    }
}

/// テキスト中で見つかった金額
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountMatch {
    pub amount: Amount,
    /// テキスト内のバイト位置
    pub start: usize,
    pub end: usize,
}

/// 金額文字列を数値に変換する
///
/// 文字列全体が1つの金額表記である場合のみ `Some` を返す
pub fn parse_amount(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let caps = AMOUNT_RE.captures(trimmed)?;
    let whole = caps.get(0)?;
    if whole.start() != 0 || whole.end() != trimmed.len() {
        return None;
    }
    amount_from_captures(trimmed, &caps).map(|amount| amount.value)
}

/// テキスト中の最初の EPS らしい金額を探す
///
/// パーセント・単位語付きの数値、英数字に続く数値、整数のみの表記は読み飛ばす
pub fn find_amount(text: &str) -> Option<AmountMatch> {
    AMOUNT_RE.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        let num = caps.name("num")?;

        let preceded_by_word = text[..num.start()]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '.');
        if preceded_by_word || is_followed_by_unit(&text[whole.end()..]) {
            return None;
        }

        let amount = amount_from_captures(text, &caps)?;
        amount.is_money_like().then_some(AmountMatch {
            amount,
            start: whole.start(),
            end: whole.end(),
        })
    })
}

fn amount_from_captures(text: &str, caps: &Captures<'_>) -> Option<Amount> {
    let num = caps.name("num")?.as_str();
    let magnitude: f64 = num.replace(',', "").parse().ok()?;

    let parenthesized = caps.name("open").is_some() && caps.name("close").is_some();
    let signed = ["sign", "sign2"]
        .iter()
        .filter_map(|name| caps.name(name))
        .any(|sign| is_attached_sign(text, sign.start(), sign.end()));
    let value = if parenthesized || signed {
        -magnitude
    } else {
        magnitude
    };

    Some(Amount {
        value,
        has_decimal: num.contains('.'),
        has_currency: caps.name("cur1").is_some() || caps.name("cur2").is_some(),
    })
}

/// マイナス記号として扱えるか
///
/// 区切りとして置かれた `-`（前後が空白、または英数字に続くもの）は符号ではない
fn is_attached_sign(text: &str, start: usize, end: usize) -> bool {
    let after_word = text[..start]
        .chars()
        .next_back()
        .is_some_and(char::is_alphanumeric);
    let attached = text[end..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '.' | '(' | '$' | '€' | '£' | '¥'));
    attached && !after_word
}

fn is_followed_by_unit(rest: &str) -> bool {
    let rest = rest.trim_start();
    if rest.starts_with('%') {
        return true;
    }
    let word: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_lowercase();
    SCALE_WORDS.contains(&word.as_str())
}
