//! N-gram hash fingerprints for fuzzy entity grouping.
//!
//! A name is normalized (lowercased, non-alphanumerics removed), cut into
//! length-n sliding windows, and each window hashed with a fast 64-bit
//! hash. Jaccard similarity over the hash sets groups name variants without
//! quadratic string comparison. Edit-distance ratio remains as the
//! fallback.

use rapidhash::rapidhash;

/// Sorted hash fingerprint of one normalized string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fingerprint(Vec<u64>);

impl Fingerprint {
    pub fn of(text: &str, ngram: usize) -> Self {
        let normalized: String = text
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        let chars: Vec<char> = normalized.chars().collect();

        let mut hashes: Vec<u64> = if chars.len() < ngram {
            if chars.is_empty() {
                Vec::new()
            } else {
                vec![rapidhash(normalized.as_bytes())]
            }
        } else {
            chars
                .windows(ngram)
                .map(|w| {
                    let gram: String = w.iter().collect();
                    rapidhash(gram.as_bytes())
                })
                .collect()
        };
        hashes.sort_unstable();
        hashes.dedup();
        Self(hashes)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Jaccard similarity of the two hash sets.
    pub fn similarity(&self, other: &Fingerprint) -> f64 {
        if self.0.is_empty() || other.0.is_empty() {
            return 0.0;
        }
        let mut intersection = 0usize;
        let (mut i, mut j) = (0usize, 0usize);
        while i < self.0.len() && j < other.0.len() {
            match self.0[i].cmp(&other.0[j]) {
                std::cmp::Ordering::Equal => {
                    intersection += 1;
                    i += 1;
                    j += 1;
                }
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
            }
        }
        let union = self.0.len() + other.0.len() - intersection;
        intersection as f64 / union as f64
    }
}

/// Normalized Levenshtein ratio in `[0, 1]`; 1 means equal.
pub fn edit_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let max_len = a.len().max(b.len());
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    1.0 - prev[b.len()] as f64 / max_len as f64
}
