//! Category ordering
//!
//! Categories and shops are named in Polish, so plain byte order puts `ż`
//! after every ASCII letter and `Ł` before `a`. [`compare_pl`] orders strings
//! by the Polish alphabet, case-insensitively, with punctuation before digits
//! before letters.

use std::cmp::Ordering;
use std::collections::HashMap;

const POLISH_ALPHABET: [char; 35] = [
    'a', 'ą', 'b', 'c', 'ć', 'd', 'e', 'ę', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'ł', 'm', 'n', 'ń',
    'o', 'ó', 'p', 'q', 'r', 's', 'ś', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'ź', 'ż',
];

/// Collation weight of one character: (class, position within class)
fn weight(c: char) -> (u8, u32) {
    let lower = c.to_lowercase().next().unwrap_or(c);
    if let Some(pos) = POLISH_ALPHABET.iter().position(|&l| l == lower) {
        return (2, pos as u32);
    }
    if lower.is_ascii_digit() {
        return (1, lower as u32);
    }
    if lower.is_alphabetic() {
        return (3, lower as u32);
    }
    (0, lower as u32)
}

/// Compare two strings in Polish alphabetical order
pub fn compare_pl(a: &str, b: &str) -> Ordering {
    let primary = a.chars().map(weight).cmp(b.chars().map(weight));
    primary.then_with(|| a.cmp(b))
}

/// Sort strings in place in Polish alphabetical order
pub fn sort_pl(values: &mut [String]) {
    values.sort_by(|a, b| compare_pl(a, b));
}

/// Order categories by a preferred list, appending the rest by display label
///
/// Listed categories keep their list position (first occurrence wins when the
/// list repeats a key). Unlisted ones follow, ordered by `label` in Polish
/// collation with the key itself as the final tie-break, so the order is total.
pub fn sort_categories_by_preferred_order<F>(
    categories: &[String],
    preferred: Option<&[String]>,
    label: F,
) -> Vec<String>
where
    F: Fn(&str) -> String,
{
    let mut rank: HashMap<&str, usize> = HashMap::new();
    for (idx, key) in preferred.unwrap_or_default().iter().enumerate() {
        rank.entry(key.as_str()).or_insert(idx);
    }

    let mut keyed: Vec<(Option<usize>, String, &String)> = categories
        .iter()
        .map(|c| (rank.get(c.as_str()).copied(), label(c.as_str()), c))
        .collect();

    keyed.sort_by(|(ra, la, ka), (rb, lb, kb)| match (ra, rb) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => compare_pl(la, lb).then_with(|| ka.cmp(kb)),
    });

    keyed.into_iter().map(|(_, _, key)| key.clone()).collect()
}
