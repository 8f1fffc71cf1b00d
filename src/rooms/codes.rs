//! Room Code Normalization
//!
//! Invite codes are short Latin strings, but users type them on whatever
//! keyboard layout happens to be active. Cyrillic and Greek capitals that
//! look identical to Latin ones are folded onto the Latin alphabet before
//! comparison, so "РОСК" and "POCK" name the same room.

/// Maximum length of a room code after normalization
pub const MAX_CODE_LEN: usize = 10;

/// Normalize a human-entered room code.
///
/// Strips all whitespace, folds homoglyphs onto the Latin alphabet,
/// upper-cases, and truncates to [`MAX_CODE_LEN`] characters.
/// Deterministic and idempotent.
pub fn normalize_code(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(fold_homoglyph)
        .flat_map(char::to_uppercase)
        .take(MAX_CODE_LEN)
        .collect()
}

/// Map a Cyrillic or Greek letter that renders identically to a Latin
/// capital onto that Latin capital. Everything else passes through.
fn fold_homoglyph(c: char) -> char {
    match c {
        // Cyrillic capitals
        'А' => 'A',
        'В' => 'B',
        'Е' => 'E',
        'З' => '3',
        'К' => 'K',
        'М' => 'M',
        'Н' => 'H',
        'О' => 'O',
        'Р' => 'P',
        'С' => 'C',
        'Т' => 'T',
        'У' => 'Y',
        'Х' => 'X',
        // Cyrillic lowercase (upper-casing happens after the fold)
        'а' => 'a',
        'в' => 'b',
        'е' => 'e',
        'з' => '3',
        'к' => 'k',
        'м' => 'm',
        'н' => 'h',
        'о' => 'o',
        'р' => 'p',
        'с' => 'c',
        'т' => 't',
        'у' => 'y',
        'х' => 'x',
        // Greek capitals
        'Α' => 'A',
        'Β' => 'B',
        'Ε' => 'E',
        'Ζ' => 'Z',
        'Η' => 'H',
        'Ι' => 'I',
        'Κ' => 'K',
        'Μ' => 'M',
        'Ν' => 'N',
        'Ο' => 'O',
        'Ρ' => 'P',
        'Τ' => 'T',
        'Υ' => 'Y',
        'Χ' => 'X',
        other => other,
    }
}
