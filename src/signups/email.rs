//! Email normalization and validation.

/// Longest address accepted, in Unicode scalar values. This is the unit the
/// database's `char_length` check counts, not UTF-16 code units.
pub const MAX_EMAIL_LEN: usize = 255;

/// Whitespace as browsers see it: Unicode `White_Space` plus the byte-order
/// mark, which form pastes sometimes carry along.
fn is_blank(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

/// Canonical form used for storage and comparison: trimmed and lowercased.
pub fn normalize(raw: &str) -> String {
    raw.trim_matches(is_blank).to_lowercase()
}

/// Check that `email` looks like `local@domain.tld`.
///
/// Local and domain parts are non-empty and contain neither whitespace nor
/// `@`; the domain holds a `.` with at least one character on each side.
/// This is a plausibility check, not RFC 5322. Length is counted in `char`s,
/// so an astral-plane character counts once.
pub fn is_valid(email: &str) -> bool {
    if email.chars().count() > MAX_EMAIL_LEN {
        return false;
    }
    if email.chars().any(is_blank) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    // Some dot must have a non-empty label before and after it.
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Normalize then validate; returns the normalized address when valid.
pub fn validate(raw: &str) -> Option<String> {
    let email = normalize(raw);
    is_valid(&email).then_some(email)
}
