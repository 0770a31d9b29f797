//! Text normalization shared by the fallback path, cache keys and suggestion inputs
//!
//! Mirrors the `persian_normalized` analyzer installed on the index (lowercase,
//! Arabic/Persian letter folding, diacritic and tatweel removal, decimal digit
//! folding, ZWNJ as a word break) so that degraded-mode matching behaves close
//! to what the index would return.

/// Fold a single character the way the index analyzers do.
///
/// Returns `None` for characters the analyzers strip entirely.
fn fold_char(ch: char) -> Option<char> {
    match ch {
        // Alef variants
        'أ' | 'إ' | 'آ' | 'ٱ' => Some('ا'),
        // Arabic yeh and alef maksura to Persian yeh
        'ي' | 'ى' | 'ئ' => Some('ی'),
        'ك' => Some('ک'),
        'ة' | 'ۀ' => Some('ه'),
        'ؤ' => Some('و'),
        // Tatweel, harakat and superscript alef
        '\u{0640}' | '\u{064B}'..='\u{065F}' | '\u{0670}' => None,
        // ZWNJ separates words in Persian compounds
        '\u{200C}' => Some(' '),
        // Zero width joiner and BOM
        '\u{200D}' | '\u{FEFF}' => None,
        // Persian and Arabic-Indic digits
        '۰'..='۹' => char::from_digit(ch as u32 - '۰' as u32, 10),
        '٠'..='٩' => char::from_digit(ch as u32 - '٠' as u32, 10),
        _ => Some(ch),
    }
}

/// Normalize text for case- and script-insensitive comparison.
///
/// Whitespace runs collapse to a single space and the result is trimmed.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars().filter_map(fold_char).flat_map(char::to_lowercase) {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }

    out
}

/// Case-insensitive substring test. `needle` must already be normalized.
pub fn contains_normalized(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || normalize(haystack).contains(needle)
}

/// Byte offset in `text` where a normalized match of `prefix` ends.
///
/// Returns `None` if `text` does not start with `prefix` after folding.
pub fn matched_prefix_end(text: &str, prefix: &str) -> Option<usize> {
    let wanted: Vec<char> = normalize(prefix).chars().collect();
    if wanted.is_empty() {
        return None;
    }

    let mut matched = 0;
    let mut previous_space = true;

    for (idx, ch) in text.char_indices() {
        for folded in fold_char(ch).into_iter().flat_map(char::to_lowercase) {
            // Collapse whitespace runs the same way `normalize` does
            if folded.is_whitespace() {
                if previous_space {
                    continue;
                }
                previous_space = true;
                if wanted.get(matched) == Some(&' ') {
                    matched += 1;
                    continue;
                }
                return None;
            }
            previous_space = false;

            if wanted.get(matched) == Some(&folded) {
                matched += 1;
            } else {
                return None;
            }
        }

        if matched == wanted.len() {
            return Some(idx + ch.len_utf8());
        }
    }

    None
}
