//! Canonicalisation of counterparty and department names.
//!
//! A single pass runs, in order: NFKC, full-width alphanumerics to half-width,
//! katakana to hiragana, lower-casing, legal-entity form removal, noise symbol
//! removal, then stripping of a leading `×` marker. Removing text can splice
//! new boilerplate together (`h-d` becomes `hd`), so the pass is repeated until
//! the output stops changing.

use nayose_core::NormalizedName;
use regex::{Regex, RegexBuilder};
use std::borrow::Cow;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

/// Legal-entity forms, applied in this order, matched case-insensitively
/// anywhere in the name.
const LEGAL_PATTERNS: &[&str] = &[
    r"株式会社",
    r"\(株\)",
    r"㈱",
    r"有限会社",
    r"\(有\)",
    r"㈲",
    r"合名会社",
    r"合資会社",
    r"合同会社",
    r"LLC",
    r"Co\.,?\s*Ltd\.?",
    r"Holdings?",
    r"HD",
    r"Corporation",
    r"Corp\.?",
    r"Inc\.?",
    r"Limited",
    r"Ltd\.?",
];

static LEGAL_REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();

fn legal_regexes() -> &'static [Regex] {
    LEGAL_REGEXES.get_or_init(|| {
        LEGAL_PATTERNS
            .iter()
            .filter_map(|p| RegexBuilder::new(p).case_insensitive(true).build().ok())
            .collect()
    })
}

/// Normalizes a raw name. Total over all input; empty in, empty out.
pub fn normalize(text: &str) -> NormalizedName {
    let mut current = normalize_once(text);
    // A repeat pass that changes anything makes the text shorter.
    let max_passes = current.chars().count() + 1;
    for _ in 0..max_passes {
        let next = normalize_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    NormalizedName::new(current)
}

/// Missing cells normalize to the empty name.
pub fn normalize_opt(text: Option<&str>) -> NormalizedName {
    normalize(text.unwrap_or_default())
}

fn normalize_once(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let unified: String = text
        .nfkc()
        .map(fullwidth_alnum_to_halfwidth)
        .map(katakana_to_hiragana)
        .collect();

    let mut s = unified.to_lowercase();
    for re in legal_regexes() {
        if let Cow::Owned(replaced) = re.replace_all(&s, "") {
            s = replaced;
        }
    }

    let stripped: String = s.chars().filter(|&c| !is_noise_symbol(c)).collect();
    stripped.trim_start_matches('×').trim().to_string()
}

/// Full-width Latin letters and digits only; punctuation is left to the
/// symbol filter.
fn fullwidth_alnum_to_halfwidth(c: char) -> char {
    match c {
        '０'..='９' | 'Ａ'..='Ｚ' | 'ａ'..='ｚ' => {
            char::from_u32(c as u32 - 0xFEE0).unwrap_or(c)
        }
        _ => c,
    }
}

/// ァ..ヶ map onto ぁ..ゖ, and the iteration marks ヽヾ onto ゝゞ. The
/// prolonged sound mark ー and the ヷ..ヺ row have no hiragana form.
fn katakana_to_hiragana(c: char) -> char {
    match c {
        'ァ'..='ヶ' | 'ヽ' | 'ヾ' => char::from_u32(c as u32 - 0x60).unwrap_or(c),
        _ => c,
    }
}

fn is_noise_symbol(c: char) -> bool {
    matches!(
        c,
        '×' | '・' | '/' | '／' | '-' | '.' | ',' | '(' | ')' | '（' | '）'
    ) || c.is_whitespace()
}
