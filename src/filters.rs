//! The filter chain: ordered predicates narrowing an article set.
//!
//! Three predicates run in a fixed order (source, date range, keyword),
//! composed with short-circuit AND: an article survives only if every
//! predicate admits it. [`apply_filters`] runs the chain over a whole set,
//! preserving input order; it never re-sorts.
//!
//! Each predicate treats its empty criterion as vacuously true, so an
//! unconstrained [`FilterCriteria`] admits everything.

use tracing::debug;

use crate::dates;
use crate::models::{Article, FilterCriteria};

type FilterFn = fn(&Article, &FilterCriteria) -> bool;

/// The chain, in its fixed execution order.
const FILTER_CHAIN: [FilterFn; 3] = [source_filter, date_range_filter, keyword_filter];

/// Narrow `articles` to those every predicate admits, preserving input
/// order.
pub fn apply_filters(articles: Vec<Article>, criteria: &FilterCriteria) -> Vec<Article> {
    let before = articles.len();
    let kept: Vec<Article> = articles
        .into_iter()
        .filter(|article| FILTER_CHAIN.iter().all(|filter| filter(article, criteria)))
        .collect();
    debug!(before, after = kept.len(), "Applied filter chain");
    kept
}

/// Admit the article when no sources are named, or when its publisher is
/// one of them.
fn source_filter(article: &Article, criteria: &FilterCriteria) -> bool {
    criteria.sources.is_empty() || criteria.sources.iter().any(|s| *s == article.publisher)
}

/// Admit the article when its publication date falls inclusively within
/// whichever bounds are set.
///
/// With neither bound set the article passes whether or not its date
/// parses. With a bound set, a date no accepted layout can interpret
/// excludes the article: "unknown" does not satisfy a constraint. This
/// is a deliberate policy, not an accident of parsing.
fn date_range_filter(article: &Article, criteria: &FilterCriteria) -> bool {
    if criteria.start_bound.is_none() && criteria.end_bound.is_none() {
        return true;
    }
    let Some(date) = dates::parse_article_date(&article.publication_date) else {
        return false;
    };
    if let Some(start) = criteria.start_bound {
        if date < start {
            return false;
        }
    }
    if let Some(end) = criteria.end_bound {
        if date > end {
            return false;
        }
    }
    true
}

/// Admit the article when any comma-separated keyword is a substring
/// (case-sensitive) of its title or description.
///
/// An empty keyword list splits to one empty keyword, and the empty
/// string is a substring of everything, so the vacuous case falls out of
/// the ordinary match path with no special-cased early return.
fn keyword_filter(article: &Article, criteria: &FilterCriteria) -> bool {
    criteria
        .keywords
        .split(',')
        .any(|keyword| article.title.contains(keyword) || article.description.contains(keyword))
}
