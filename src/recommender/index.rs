use super::error::RecommendError;
use super::matching::{best_match, close_matches, DEFAULT_CUTOFF};
use super::similarity::{rank_similar, SimilarityMatrix};
use super::vectorize::{TermWeightMatrix, TfidfVectorizer};
use crate::catalog::Catalog;
use serde::Serialize;
use std::time::Instant;

pub const DEFAULT_TOP_K: usize = 14;

// above this many entries the dense matrix is worth a warning
const LARGE_CATALOG: usize = 20_000;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Recommended {
    pub title: String,
    pub score: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct Recommendation {
    pub query: String,
    pub matched: String,
    pub items: Vec<Recommended>,
}

/// Fitted vectorizer, term weights and pairwise similarity over one catalog.
/// Every structure is indexed by catalog row and nothing is mutable once
/// built, so a `Recommender` can be shared freely behind an `Arc`.
pub struct Recommender {
    catalog: Catalog,
    vectorizer: TfidfVectorizer,
    weights: TermWeightMatrix,
    similarity: SimilarityMatrix,
    cutoff: f64,
}

impl Recommender {
    pub fn build(catalog: Catalog) -> Result<Self, RecommendError> {
        if catalog.len() < 2 {
            return Err(RecommendError::Configuration(format!(
                "catalog {} has {} entries, at least 2 are required",
                catalog.name,
                catalog.len()
            )));
        }

        let start = Instant::now();
        let documents = catalog.documents();
        let mut vectorizer = TfidfVectorizer::new();
        let weights = vectorizer.fit_transform(&documents)?;
        let elapsed = start.elapsed().as_secs_f64();
        info!(
            "vectorize {}: {} documents, {} terms, {} non-zero weights, spends {}s",
            catalog.name,
            weights.n_rows(),
            weights.n_terms,
            weights.rows.iter().map(|r| r.nnz()).sum::<usize>(),
            elapsed
        );
        let blank = weights.rows.iter().filter(|r| r.is_zero()).count();
        if blank > 0 {
            warn!(
                "catalog {} has {} entries without any text, they score 0 against everything",
                catalog.name, blank
            );
        }

        if catalog.len() > LARGE_CATALOG {
            warn!(
                "catalog {} has {} entries, full similarity matrix needs {} MiB",
                catalog.name,
                catalog.len(),
                catalog.len() * catalog.len() * 8 / (1024 * 1024)
            );
        }
        let start = Instant::now();
        let similarity = SimilarityMatrix::from_term_weights(&weights);
        let elapsed = start.elapsed().as_secs_f64();
        info!(
            "similarity {}: {}x{} ({} bytes), spends {}s",
            catalog.name,
            similarity.size(),
            similarity.size(),
            similarity.footprint(),
            elapsed
        );

        Ok(Self {
            catalog,
            vectorizer,
            weights,
            similarity,
            cutoff: DEFAULT_CUTOFF,
        })
    }

    /// Minimum title similarity for a query to resolve, clamped to [0, 1].
    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff.clamp(0.0, 1.0);
        self
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn weights(&self) -> &TermWeightMatrix {
        &self.weights
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    pub fn titles(&self) -> Vec<String> {
        let mut titles = self
            .catalog
            .titles()
            .map(|t| t.to_string())
            .collect::<Vec<_>>();
        titles.sort();
        titles
    }

    /// Titles close to `query`, best first, for "did you mean" hints.
    pub fn suggestions(&self, query: &str, n: usize) -> Vec<String> {
        close_matches(query, self.catalog.titles(), n, self.cutoff)
            .into_iter()
            .map(|m| m.title)
            .collect()
    }

    pub fn recommend(&self, query: &str, k: usize) -> Result<Recommendation, RecommendError> {
        let start = Instant::now();
        let matched = best_match(query, self.catalog.titles(), self.cutoff).ok_or_else(|| {
            RecommendError::NotFound {
                query: query.to_string(),
            }
        })?;
        // first row with that title wins when titles repeat
        let index = self.catalog.position(&matched.title).unwrap_or(matched.index);
        debug!(
            "query: {} resolved to {} (row {}, similarity {})",
            query, matched.title, index, matched.similarity
        );

        let items = rank_similar(&self.similarity, index, k)
            .into_iter()
            .map(|(i, score)| Recommended {
                title: self.catalog.entries[i].title.clone(),
                score,
            })
            .collect::<Vec<_>>();
        let elapsed = start.elapsed().as_secs_f64();
        info!(
            "recommend {} for {}: {} items, spends {}s",
            matched.title,
            query,
            items.len(),
            elapsed
        );

        Ok(Recommendation {
            query: query.to_string(),
            matched: matched.title,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;

    fn abc() -> Catalog {
        Catalog::new(
            "abc",
            vec![
                CatalogEntry::new("A").genres("action").keywords("hero"),
                CatalogEntry::new("B").genres("action").keywords("hero"),
                CatalogEntry::new("C").genres("romance").keywords("love"),
            ],
        )
    }

    fn movies() -> Catalog {
        Catalog::new(
            "movies",
            vec![
                CatalogEntry::new("Avatar")
                    .genres("Action Adventure Fantasy Science Fiction")
                    .keywords("culture clash future space war space colony")
                    .tagline("Enter the World of Pandora.")
                    .cast("Sam Worthington Zoe Saldana Sigourney Weaver")
                    .director("James Cameron"),
                CatalogEntry::new("Titanic")
                    .genres("Drama Romance Thriller")
                    .keywords("shipwreck iceberg ship love")
                    .tagline("Nothing on Earth could come between them.")
                    .cast("Kate Winslet Leonardo DiCaprio")
                    .director("James Cameron"),
                CatalogEntry::new("Aliens")
                    .genres("Horror Action Thriller Science Fiction")
                    .keywords("android space marine alien")
                    .tagline("This time it's war.")
                    .cast("Sigourney Weaver Michael Biehn")
                    .director("James Cameron"),
                CatalogEntry::new("The Notebook")
                    .genres("Romance Drama")
                    .keywords("love letter")
                    .cast("Rachel McAdams Ryan Gosling")
                    .director("Nick Cassavetes"),
                CatalogEntry::new("Interstellar")
                    .genres("Adventure Drama Science Fiction")
                    .keywords("space travel wormhole future")
                    .cast("Matthew McConaughey Anne Hathaway")
                    .director("Christopher Nolan"),
                CatalogEntry::new("Untitled"),
            ],
        )
    }

    #[test]
    fn single_entry_catalog_is_rejected() {
        let catalog = Catalog::new("one", vec![CatalogEntry::new("Solo").genres("drama")]);
        assert!(matches!(
            Recommender::build(catalog),
            Err(RecommendError::Configuration(_))
        ));
        let empty = Catalog::new("empty", vec![]);
        assert!(matches!(
            Recommender::build(empty),
            Err(RecommendError::Configuration(_))
        ));
    }

    #[test]
    fn shared_vocabulary_ranks_first() {
        let recommender = Recommender::build(abc()).unwrap();
        let recommendation = recommender.recommend("A", 2).unwrap();
        assert_eq!(recommendation.matched, "A");
        let items = recommendation.items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "B");
        assert!((items[0].score - 1.0).abs() < 1e-9);
        assert_eq!(items[1].title, "C");
        assert_eq!(items[1].score, 0.0);
    }

    #[test]
    fn typo_resolves_and_recommends() {
        let recommender = Recommender::build(movies()).unwrap();
        let recommendation = recommender.recommend("Avater", DEFAULT_TOP_K).unwrap();
        assert_eq!(recommendation.matched, "Avatar");
        assert_eq!(recommendation.query, "Avater");
        assert!(!recommendation.items.is_empty());
        assert_eq!(recommendation.items[0].title, "Aliens");
    }

    #[test]
    fn partial_titles_resolve() {
        let catalog = Catalog::new(
            "partial",
            vec![
                CatalogEntry::new("The Dark Knight Rises").genres("Action Crime"),
                CatalogEntry::new("Avatar").genres("Action Science Fiction"),
                CatalogEntry::new("Spectre").genres("Action Crime"),
                CatalogEntry::new("Pirates of the Caribbean: At World's End").genres("Adventure"),
            ],
        );
        let recommender = Recommender::build(catalog).unwrap();

        let recommendation = recommender.recommend("Dark Knight", 2).unwrap();
        assert_eq!(recommendation.matched, "The Dark Knight Rises");
        assert_eq!(recommendation.items.len(), 2);
        assert_eq!(recommendation.items[0].title, "Spectre");

        let recommendation = recommender.recommend("Pirates of Caribbean", 2).unwrap();
        assert_eq!(
            recommendation.matched,
            "Pirates of the Caribbean: At World's End"
        );
    }

    #[test]
    fn gibberish_is_not_found() {
        let recommender = Recommender::build(movies()).unwrap();
        let err = recommender.recommend("xqzv wkpj", 5).unwrap_err();
        assert_eq!(
            err,
            RecommendError::NotFound {
                query: "xqzv wkpj".to_string()
            }
        );
        // the index still answers afterwards
        assert!(recommender.recommend("Titanic", 5).is_ok());
    }

    #[test]
    fn result_length_is_min_of_k_and_others() {
        let recommender = Recommender::build(movies()).unwrap();
        let n = recommender.catalog().len();
        for k in [0, 1, 3, n - 1, n, DEFAULT_TOP_K] {
            let items = recommender.recommend("Titanic", k).unwrap().items;
            assert_eq!(items.len(), k.min(n - 1));
        }
    }

    #[test]
    fn never_returns_query_and_sorted_descending() {
        let recommender = Recommender::build(movies()).unwrap();
        for title in recommender.titles() {
            let recommendation = recommender.recommend(&title, DEFAULT_TOP_K).unwrap();
            assert!(recommendation
                .items
                .iter()
                .all(|r| r.title != recommendation.matched));
            assert!(recommendation
                .items
                .windows(2)
                .all(|w| w[0].score >= w[1].score));
        }
    }

    #[test]
    fn blank_entry_is_indexed_with_zero_scores() {
        let recommender = Recommender::build(movies()).unwrap();
        let row = recommender.catalog().position("Untitled").unwrap();
        assert!(recommender.similarity().row(row).iter().all(|s| *s == 0.0));

        let items = recommender.recommend("Untitled", 3).unwrap().items;
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|r| r.title != "Untitled"));
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let recommender = Recommender::build(movies()).unwrap();
        let sim = recommender.similarity();
        let blank = recommender.catalog().position("Untitled").unwrap();
        for i in 0..sim.size() {
            if i != blank {
                assert!((sim.get(i, i) - 1.0).abs() < 1e-9);
            }
            for j in 0..sim.size() {
                assert_eq!(sim.get(i, j), sim.get(j, i));
            }
        }
    }

    #[test]
    fn structures_stay_aligned_with_catalog() {
        let recommender = Recommender::build(movies()).unwrap();
        let n = recommender.catalog().len();
        assert_eq!(recommender.weights().n_rows(), n);
        assert_eq!(recommender.similarity().size(), n);
        assert_eq!(
            recommender.weights().n_terms,
            recommender.vectorizer().vocabulary_size()
        );
    }

    #[test]
    fn duplicate_titles_resolve_to_first_row() {
        let catalog = Catalog::new(
            "dupes",
            vec![
                CatalogEntry::new("Heat").genres("crime"),
                CatalogEntry::new("Heat").genres("crime heist"),
                CatalogEntry::new("Ronin").genres("crime heist"),
            ],
        );
        let recommender = Recommender::build(catalog).unwrap();
        let items = recommender.recommend("Heat", 2).unwrap().items;
        // row 0 is the query, so row 1 may appear
        assert_eq!(items[0].title, "Heat");
        assert_eq!(items[1].title, "Ronin");
    }

    #[test]
    fn cutoff_is_configurable_and_clamped() {
        let recommender = Recommender::build(abc()).unwrap().with_cutoff(1.5);
        assert_eq!(recommender.cutoff(), 1.0);
        assert!(recommender.recommend("a", 1).is_ok());

        let strict = Recommender::build(movies()).unwrap().with_cutoff(1.0);
        assert!(matches!(
            strict.recommend("Avater", 1),
            Err(RecommendError::NotFound { .. })
        ));
    }

    #[test]
    fn titles_are_sorted() {
        let recommender = Recommender::build(movies()).unwrap();
        let titles = recommender.titles();
        assert_eq!(titles.first().map(String::as_str), Some("Aliens"));
        assert!(titles.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn suggestions_list_close_titles() {
        let recommender = Recommender::build(movies()).unwrap();
        let suggestions = recommender.suggestions("Alien", 3);
        assert_eq!(suggestions[0], "Aliens");
        assert!(recommender.suggestions("zzzzzzzz", 3).is_empty());
    }
}
