use std::cmp::Ordering;
use strsim::{normalized_levenshtein, sorensen_dice};

pub const DEFAULT_CUTOFF: f64 = 0.6;

#[derive(Clone, Debug)]
pub struct Matched {
    pub index: usize,
    pub title: String,
    pub similarity: f64,
}

impl PartialOrd for Matched {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// higher similarity first, then lower index
impl Ord for Matched {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .similarity
            .partial_cmp(&self.similarity)
            .unwrap_or(Ordering::Equal)
            .then(self.index.cmp(&other.index))
    }
}

impl PartialEq for Matched {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Matched {}

/// Case-insensitive ratio in [0, 1]: the better of the edit-distance ratio,
/// which scores typos, and the bigram overlap ratio, which scores partial
/// titles such as "Dark Knight" for "The Dark Knight Rises".
pub fn text_similarity(s1: &str, s2: &str) -> f64 {
    let (s1, s2) = (s1.to_lowercase(), s2.to_lowercase());
    normalized_levenshtein(&s1, &s2).max(sorensen_dice(&s1, &s2))
}

/// Up to `n` candidates scoring at least `cutoff`, best first.
pub fn close_matches<'a>(
    query: &str,
    candidates: impl Iterator<Item = &'a str>,
    n: usize,
    cutoff: f64,
) -> Vec<Matched> {
    let mut matched = candidates
        .enumerate()
        .filter_map(|(index, title)| {
            let similarity = text_similarity(query, title);
            debug!(
                "query: {}, candidate: {}, similarity: {}",
                query, title, similarity
            );
            (similarity >= cutoff).then(|| Matched {
                index,
                title: title.to_string(),
                similarity,
            })
        })
        .collect::<Vec<_>>();
    matched.sort_unstable();
    matched.truncate(n);

    matched
}

pub fn best_match<'a>(
    query: &str,
    candidates: impl Iterator<Item = &'a str>,
    cutoff: f64,
) -> Option<Matched> {
    close_matches(query, candidates, 1, cutoff).into_iter().next()
}
