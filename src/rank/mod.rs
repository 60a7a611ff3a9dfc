//! Relevance scoring and ranking of offers against a search query.
//!
//! Scoring runs an ordered chain of small rules over a precomputed view
//! of the offer. Rules add (or subtract) points; any rule can reject the
//! offer outright, which short-circuits the chain.

pub mod rules;

use crate::category::Category;
use crate::model::{Offer, RankedOffer};
use crate::text::{normalize, query_tokens, token_set};
use std::collections::HashSet;
use tracing::debug;

/// Precomputed view of one offer against one query.
pub struct ScoreContext<'a> {
    pub full_query: String,
    pub tokens: &'a [String],
    pub haystack: String,
    pub haystack_tokens: HashSet<String>,
    pub name: String,
    pub name_tokens: HashSet<String>,
    pub category: Category,
    pub food_intent: bool,
    pub non_grocery: bool,
    pub drink_pack: bool,
}

impl<'a> ScoreContext<'a> {
    pub fn new(offer: &Offer, query: &str, tokens: &'a [String]) -> Self {
        let haystack = normalize(&offer.search_text());
        let haystack_tokens = token_set(&haystack);
        let name = normalize(&offer.product_name);
        let name_tokens = token_set(&name);
        let size = normalize(offer.product_size.as_deref().unwrap_or(""));

        let food_intent =
            tokens.iter().any(|token| rules::FOOD_INTENT_TOKENS.contains(&token.as_str()));
        let non_grocery =
            rules::NON_GROCERY_TOKENS.iter().any(|token| haystack_tokens.contains(*token));
        let drink_pack = rules::DRINK_PACK.is_match(&format!(" {} ", size));

        Self {
            full_query: normalize(query),
            tokens,
            haystack,
            haystack_tokens,
            name,
            name_tokens,
            category: offer.category,
            food_intent,
            non_grocery,
            drink_pack,
        }
    }

    /// True when the query asks for this token.
    pub fn wants(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// The query token, when there is exactly one.
    pub fn single_token(&self) -> Option<&str> {
        match self.tokens {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }
}

/// Outcome of one scoring rule.
pub enum Verdict {
    Add(i64),
    Reject,
    Skip,
}

/// A single relevance heuristic.
pub trait ScoreRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn evaluate(&self, ctx: &ScoreContext) -> Verdict;
}

/// Ordered chain of scoring rules.
pub struct ScoreChain {
    rules: Vec<Box<dyn ScoreRule>>,
}

impl ScoreChain {
    /// The standard relevance chain.
    pub fn standard() -> Self {
        Self { rules: rules::standard_rules() }
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Scores one offer context. Any rejection yields -1.
    pub fn score(&self, ctx: &ScoreContext) -> i64 {
        let mut score = 0;
        for rule in &self.rules {
            match rule.evaluate(ctx) {
                Verdict::Add(points) => score += points,
                Verdict::Reject => return -1,
                Verdict::Skip => {}
            }
        }
        score
    }
}

/// Scores every offer, drops the irrelevant, and sorts the rest by score
/// (highest first) with price breaking ties.
pub fn rank_and_filter(offers: Vec<Offer>, query: &str) -> Vec<RankedOffer> {
    let tokens = query_tokens(query);
    let chain = ScoreChain::standard();
    debug!("Ranking {} offers against '{}'", offers.len(), query);

    let mut ranked: Vec<RankedOffer> = offers
        .into_iter()
        .filter_map(|offer| {
            let ctx = ScoreContext::new(&offer, query, &tokens);
            let score = chain.score(&ctx);
            if score < 0 {
                None
            } else {
                Some(RankedOffer { offer, relevance_score: score })
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.relevance_score
            .cmp(&a.relevance_score)
            .then_with(|| a.offer.sort_price().total_cmp(&b.offer.sort_price()))
    });

    ranked
}
