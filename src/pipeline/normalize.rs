//! Text normalization for matching.
//!
//! Vietnamese input arrives with tone marks in both precomposed and
//! combining form ("ăn sáng", "a\u{0306}n sa\u{0301}ng"). Every matcher
//! downstream works on the folded form, so folding must be idempotent
//! and cover both encodings.

/// Lowercase the input and strip Vietnamese diacritics.
///
/// `normalize(normalize(s)) == normalize(s)` holds for any input; callers
/// may fold defensively without double-mangling.
pub fn normalize(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(fold_char)
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Word-bounded containment check on normalized text. Boundaries are
/// non-alphanumeric ASCII, so "mai" does not match inside "email" and
/// "an" does not match inside "sang".
pub fn contains_word(text: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }

    let bytes = text.as_bytes();
    let mut search_from = 0;
    while let Some(pos) = text[search_from..].find(phrase) {
        let start = search_from + pos;
        let end = start + phrase.len();
        let before_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
        let after_ok = end == text.len() || !bytes[end].is_ascii_alphanumeric();
        if before_ok && after_ok {
            return true;
        }
        search_from = start + char_width(text, start);
    }
    false
}

/// Replace word-bounded occurrences of `phrase` with a space. Used by
/// title cleanup to drop consumed temporal phrases without touching
/// words that merely contain them.
pub fn remove_word(text: &str, phrase: &str) -> String {
    if phrase.is_empty() {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut cursor = 0;
    while let Some(pos) = text[cursor..].find(phrase) {
        let start = cursor + pos;
        let end = start + phrase.len();
        let before_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
        let after_ok = end == text.len() || !bytes[end].is_ascii_alphanumeric();
        if before_ok && after_ok {
            result.push_str(&text[cursor..start]);
            result.push(' ');
            cursor = end;
        } else {
            // keep this occurrence's first character and continue scanning
            let step = char_width(text, start);
            result.push_str(&text[cursor..start + step]);
            cursor = start + step;
        }
    }
    result.push_str(&text[cursor..]);
    result
}

fn char_width(text: &str, at: usize) -> usize {
    text[at..].chars().next().map_or(1, char::len_utf8)
}

fn is_combining_mark(c: char) -> bool {
    // Combining Diacritical Marks block; covers decomposed tone marks
    ('\u{0300}'..='\u{036f}').contains(&c)
}

fn fold_char(c: char) -> char {
    match c {
        'à' | 'á' | 'ả' | 'ã' | 'ạ' | 'ă' | 'ằ' | 'ắ' | 'ẳ' | 'ẵ' | 'ặ' | 'â' | 'ầ' | 'ấ'
        | 'ẩ' | 'ẫ' | 'ậ' => 'a',
        'è' | 'é' | 'ẻ' | 'ẽ' | 'ẹ' | 'ê' | 'ề' | 'ế' | 'ể' | 'ễ' | 'ệ' => 'e',
        'ì' | 'í' | 'ỉ' | 'ĩ' | 'ị' => 'i',
        'ò' | 'ó' | 'ỏ' | 'õ' | 'ọ' | 'ô' | 'ồ' | 'ố' | 'ổ' | 'ỗ' | 'ộ' | 'ơ' | 'ờ' | 'ớ'
        | 'ở' | 'ỡ' | 'ợ' => 'o',
        'ù' | 'ú' | 'ủ' | 'ũ' | 'ụ' | 'ư' | 'ừ' | 'ứ' | 'ử' | 'ữ' | 'ự' => 'u',
        'ỳ' | 'ý' | 'ỷ' | 'ỹ' | 'ỵ' => 'y',
        'đ' => 'd',
        _ => c,
    }
}
