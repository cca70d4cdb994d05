use unicode_normalization::UnicodeNormalization;

use crate::options::TextOptions;

/// Character emitted by lossy decoders in place of malformed input.
pub const REPLACEMENT_CHAR: char = '\u{FFFD}';

/// Replacements applied before ASCII folding.
const ASCII_FOLDS: &[(char, &str)] = &[
    ('\u{2264}', "<="),
    ('\u{2265}', ">="),
    ('\u{2260}', "!="),
    ('\u{00B1}', "+-"),
    ('\u{00D7}', "x"),
    ('\u{00F7}', "/"),
    ('\u{2212}', "-"),
    ('\u{2013}', "-"),
    ('\u{2014}', "--"),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2022}', "*"),
    ('\u{00A0}', " "),
];

/// Normalized text plus what the normalizer noticed on the way.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextOutcome {
    pub text: String,
    /// Number of U+FFFD characters in the input.
    pub replacement_chars: usize,
}

impl TextOutcome {
    pub fn is_malformed(&self) -> bool {
        self.replacement_chars > 0
    }
}

/// NFC, trim, and collapse whitespace and control characters. Case is kept.
pub fn normalize_text(raw: &str) -> String {
    normalize_text_with(raw, &TextOptions::default()).text
}

pub fn normalize_text_with(raw: &str, options: &TextOptions) -> TextOutcome {
    let replacement_chars = raw.chars().filter(|ch| *ch == REPLACEMENT_CHAR).count();
    let composed: String = raw.nfc().collect();
    let mut text = collapse_whitespace(&composed);
    if options.ascii_fold {
        text = collapse_whitespace(&fold_to_ascii(&text));
    }
    TextOutcome {
        text,
        replacement_chars,
    }
}

fn collapse_whitespace(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_space = false;
    for ch in value.chars() {
        if ch.is_whitespace() || ch.is_control() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(ch);
    }
    out
}

fn fold_to_ascii(value: &str) -> String {
    let mut replaced = String::with_capacity(value.len());
    for ch in value.chars() {
        match ASCII_FOLDS.iter().find(|(from, _)| *from == ch) {
            Some((_, to)) => replaced.push_str(to),
            None => replaced.push(ch),
        }
    }
    replaced.nfkd().filter(char::is_ascii).collect()
}
