//! String similarity and phonetic encoding primitives.
//!
//! All functions are pure and operate on Unicode scalar values, so lengths
//! and positions are counted in `char`s rather than bytes.

use crate::core::features::count_to_f64;

/// Default Winkler prefix scaling factor
pub const DEFAULT_PREFIX_WEIGHT: f64 = 0.1;

/// Longest common prefix considered by the Winkler boost
const MAX_PREFIX: usize = 4;

/// Length of a Soundex code
const SOUNDEX_LEN: usize = 4;

/// Maximum length of a Metaphone code
const METAPHONE_LEN: usize = 4;

/// Jaro-Winkler similarity with the default prefix weight of 0.1.
///
/// # Examples
///
/// ```
/// use roll_dedup::matching::strings::jaro_winkler;
///
/// assert!((jaro_winkler("Asha", "ASHA ") - 1.0).abs() < 1e-12);
/// assert!(jaro_winkler("martha", "marhta") > 0.96);
/// assert_eq!(jaro_winkler("", ""), 0.0);
/// ```
#[must_use]
pub fn jaro_winkler(a: &str, b: &str) -> f64 {
    jaro_winkler_with_weight(a, b, DEFAULT_PREFIX_WEIGHT)
}

/// Jaro-Winkler similarity in [0, 1].
///
/// Both inputs are lower-cased and trimmed first. Identical non-empty inputs
/// score 1.0; if either input is empty (including when both are) the score
/// is 0.0.
#[must_use]
pub fn jaro_winkler_with_weight(a: &str, b: &str, prefix_weight: f64) -> f64 {
    let a: Vec<char> = a.trim().to_lowercase().chars().collect();
    let b: Vec<char> = b.trim().to_lowercase().chars().collect();

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let jaro = jaro(&a, &b);
    let prefix = a
        .iter()
        .zip(&b)
        .take(MAX_PREFIX)
        .take_while(|(x, y)| x == y)
        .count();

    (jaro + prefix_weight * count_to_f64(prefix) * (1.0 - jaro)).min(1.0)
}

/// Jaro similarity of two non-empty character sequences
fn jaro(a: &[char], b: &[char]) -> f64 {
    let window = (a.len().max(b.len()) / 2).saturating_sub(1);

    let mut a_matched = vec![false; a.len()];
    let mut b_matched = vec![false; b.len()];
    let mut matches = 0usize;

    // Greedy left-to-right: the first unmatched equal character in the window wins
    for (i, ca) in a.iter().enumerate() {
        let start = i.saturating_sub(window);
        let end = (i + window + 1).min(b.len());
        for j in start..end {
            if !b_matched[j] && b[j] == *ca {
                a_matched[i] = true;
                b_matched[j] = true;
                matches += 1;
                break;
            }
        }
    }

    if matches == 0 {
        return 0.0;
    }

    let a_seq = a.iter().zip(&a_matched).filter(|(_, m)| **m).map(|(c, _)| c);
    let b_seq = b.iter().zip(&b_matched).filter(|(_, m)| **m).map(|(c, _)| c);
    let transpositions = a_seq.zip(b_seq).filter(|(x, y)| x != y).count();

    let m = count_to_f64(matches);
    let t = count_to_f64(transpositions);
    (m / count_to_f64(a.len()) + m / count_to_f64(b.len()) + (m - t / 2.0) / m) / 3.0
}

/// Levenshtein edit distance (unit cost insert/delete/substitute).
///
/// Uses a single rolling row sized to the shorter input.
///
/// # Examples
///
/// ```
/// use roll_dedup::matching::strings::levenshtein;
///
/// assert_eq!(levenshtein("kitten", "sitting"), 3);
/// assert_eq!(levenshtein("", "abc"), 3);
/// ```
#[must_use]
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return long.len();
    }

    let mut row: Vec<usize> = (0..=short.len()).collect();
    for (i, cl) in long.iter().enumerate() {
        // `diagonal` holds row[j] from the previous iteration of i
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cs) in short.iter().enumerate() {
            let substitution = diagonal + usize::from(cl != cs);
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(row[j + 1] + 1);
        }
    }

    row[short.len()]
}

/// Normalized Levenshtein similarity in [0, 1]; 0.0 if either input is empty
#[must_use]
pub fn levenshtein_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let max_len = a.chars().count().max(b.chars().count());
    let distance = levenshtein(a, b);
    (1.0 - count_to_f64(distance) / count_to_f64(max_len)).clamp(0.0, 1.0)
}

/// Soundex digit for an uppercase letter; None for vowels and H, W, Y
fn soundex_digit(c: char) -> Option<char> {
    match c {
        'B' | 'F' | 'P' | 'V' => Some('1'),
        'C' | 'G' | 'J' | 'K' | 'Q' | 'S' | 'X' | 'Z' => Some('2'),
        'D' | 'T' => Some('3'),
        'L' => Some('4'),
        'M' | 'N' => Some('5'),
        'R' => Some('6'),
        _ => None,
    }
}

/// Four character Soundex code.
///
/// Non-letters are ignored. The first letter is kept; each following letter's
/// digit is appended unless it repeats the previous letter's digit. Uncoded
/// letters (vowels, H, W, Y) break a run, so a digit separated by one from an
/// identical digit is appended again. Returns an empty string when the input
/// has no letters.
///
/// # Examples
///
/// ```
/// use roll_dedup::matching::strings::soundex;
///
/// assert_eq!(soundex("Robert"), "R163");
/// assert_eq!(soundex("Rupert"), "R163");
/// assert_eq!(soundex("Lee"), "L000");
/// ```
#[must_use]
pub fn soundex(word: &str) -> String {
    let mut letters = word
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_uppercase);

    let Some(first) = letters.next() else {
        return String::new();
    };

    let mut code = String::with_capacity(SOUNDEX_LEN);
    code.push(first);

    let mut previous: Option<char> = None;
    for c in letters {
        if code.chars().count() >= SOUNDEX_LEN {
            break;
        }
        let digit = soundex_digit(c);
        if let Some(d) = digit {
            if digit != previous {
                code.push(d);
            }
        }
        previous = digit;
    }

    while code.chars().count() < SOUNDEX_LEN {
        code.push('0');
    }
    code
}

/// True if both inputs produce the same Soundex code
#[must_use]
pub fn soundex_match(a: &str, b: &str) -> bool {
    soundex(a) == soundex(b)
}

/// Simplified Metaphone code of at most four characters.
///
/// Uppercases, rewrites PH→F, CK→K, C→K, Q→K, Z→S and X→KS (in that order),
/// drops every vowel except a leading one, then truncates.
///
/// # Examples
///
/// ```
/// use roll_dedup::matching::strings::metaphone;
///
/// assert_eq!(metaphone("Phillip"), "FLLP");
/// assert_eq!(metaphone("Anand"), "ANND");
/// ```
#[must_use]
pub fn metaphone(word: &str) -> String {
    let word = word
        .to_uppercase()
        .replace("PH", "F")
        .replace("CK", "K")
        .replace('C', "K")
        .replace('Q', "K")
        .replace('Z', "S")
        .replace('X', "KS");

    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    std::iter::once(first)
        .chain(chars.filter(|c| !matches!(c, 'A' | 'E' | 'I' | 'O' | 'U')))
        .take(METAPHONE_LEN)
        .collect()
}

/// True if both inputs produce the same Metaphone code
#[must_use]
pub fn metaphone_match(a: &str, b: &str) -> bool {
    metaphone(a) == metaphone(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_jaro_winkler_reference_values() {
        // Classic Winkler reference pairs
        assert_close(jaro_winkler("MARTHA", "MARHTA"), 0.9611);
        assert_close(jaro_winkler("DWAYNE", "DUANE"), 0.84);
        assert_close(jaro_winkler("DIXON", "DICKSONX"), 0.8133);
    }

    #[test]
    fn test_jaro_winkler_identity_and_empty() {
        assert_close(jaro_winkler("Rajesh Kumar", "rajesh kumar"), 1.0);
        assert_close(jaro_winkler("", ""), 0.0);
        assert_close(jaro_winkler("abc", ""), 0.0);
        assert_close(jaro_winkler("   ", "   "), 0.0);
    }

    #[test]
    fn test_jaro_winkler_no_common_characters() {
        assert_close(jaro_winkler("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_jaro_winkler_single_characters() {
        // Window is zero: only same-position characters may match
        assert_close(jaro_winkler("a", "a"), 1.0);
        assert_close(jaro_winkler("a", "b"), 0.0);
        assert_close(jaro_winkler("ab", "ba"), 0.0);
    }

    #[test]
    fn test_jaro_winkler_symmetric() {
        let pairs = [
            ("martha", "marhta"),
            ("Priya Sharma", "Priyanka Sharma"),
            ("abcdef", "fedcba"),
            ("Suresh", "Sures"),
        ];
        for (a, b) in pairs {
            assert_close(jaro_winkler(a, b), jaro_winkler(b, a));
        }
    }

    #[test]
    fn test_jaro_winkler_custom_weight() {
        let plain = jaro_winkler_with_weight("MARTHA", "MARHTA", 0.0);
        assert_close(plain, 0.9444);
        assert!(jaro_winkler_with_weight("MARTHA", "MARHTA", 0.25) <= 1.0);
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("sitting", "kitten"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("same", "same"), 0);
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("गणेश", "गणेष"), 1);
    }

    #[test]
    fn test_levenshtein_similarity() {
        assert_close(levenshtein_similarity("kitten", "sitting"), 1.0 - 3.0 / 7.0);
        assert_close(levenshtein_similarity("same", "same"), 1.0);
        assert_close(levenshtein_similarity("", "abc"), 0.0);
        assert_close(levenshtein_similarity("abc", "xyz"), 0.0);
        assert!(levenshtein_similarity("Same", "same") < 1.0);
    }

    #[test]
    fn test_soundex() {
        assert_eq!(soundex("Robert"), "R163");
        assert_eq!(soundex("Rupert"), "R163");
        assert_eq!(soundex("Rubin"), "R150");
        assert_eq!(soundex("Tymczak"), "T522");
        assert_eq!(soundex("Lee"), "L000");
        assert_eq!(soundex("rajesh"), "R220");
        assert_eq!(soundex("O'Brien"), "O165");
        assert_eq!(soundex(""), "");
        assert_eq!(soundex("123"), "");
    }

    #[test]
    fn test_soundex_collapses_adjacent_digits() {
        // B and P share digit 1 but are adjacent, so only one is kept
        assert_eq!(soundex("Abby"), "A100");
        assert_eq!(soundex("Jackson"), "J250");
    }

    #[test]
    fn test_soundex_match() {
        assert!(soundex_match("Robert", "Rupert"));
        assert!(soundex_match("Smith", "Smyth"));
        assert!(!soundex_match("Robert", "Rubin"));
    }

    #[test]
    fn test_metaphone() {
        assert_eq!(metaphone("Phillip"), "FLLP");
        assert_eq!(metaphone("Jackson"), "JKSN");
        assert_eq!(metaphone("Quentin"), "KNTN");
        assert_eq!(metaphone("Xavier"), "KSVR");
        assert_eq!(metaphone("Zara"), "SR");
        assert_eq!(metaphone("Anand"), "ANND");
        assert_eq!(metaphone("a"), "A");
        assert_eq!(metaphone(""), "");
    }

    #[test]
    fn test_metaphone_match() {
        assert!(metaphone_match("Catherine", "Katherine"));
        assert!(metaphone_match("Philip", "Filip"));
        assert!(!metaphone_match("Mohan", "Rohan"));
    }
}
