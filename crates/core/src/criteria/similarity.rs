//! Fuzzy string similarity used by the criteria engine.
//!
//! The ratio is `2 * lcs(a, b) / (|a| + |b|)` over lowercased characters,
//! in `[0, 1]`. Two words are considered similar at ratio >= 0.75, which
//! tolerates minor spelling and diacritic differences ("Gdansk" vs
//! "gdańsk") without requiring exact equality. Matching behavior at the
//! 0.75 boundary is load-bearing; do not swap the metric.

/// Minimum similarity ratio for two words to count as a match.
pub const SIMILARITY_THRESHOLD: f64 = 0.75;

/// Case-insensitive similarity ratio in `[0, 1]`.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    if a.is_empty() && b.is_empty() {
        return 1.0;
    }

    2.0 * lcs_len(&a, &b) as f64 / (a.len() + b.len()) as f64
}

/// Whether two words are similar enough to count as the same term.
pub fn words_are_similar(a: &str, b: &str) -> bool {
    similarity_ratio(a, b) >= SIMILARITY_THRESHOLD
}

/// Longest common subsequence length, rolling single-row DP.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diagonal = 0;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb { diagonal + 1 } else { above.max(row[j]) };
            diagonal = above;
        }
    }
    row[b.len()]
}
