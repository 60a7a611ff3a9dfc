//! The standard relevance rules, in scoring precedence order.

use super::{ScoreContext, ScoreRule, Verdict};
use crate::category::Category;
use regex_lite::Regex;
use std::sync::LazyLock;

/// Query tokens that signal the shopper wants food, not homewares.
pub(super) const FOOD_INTENT_TOKENS: [&str; 13] = [
    "milk", "cheese", "yoghurt", "yogurt", "butter", "cream", "banana", "apple", "bread",
    "rice", "eggs", "oat", "oatmilk",
];

/// Product words that mark an offer as non-grocery or snack-aisle noise
/// when the shopper searched for a staple.
pub(super) const NON_GROCERY_TOKENS: [&str; 27] = [
    "bag",
    "bags",
    "slider",
    "resealable",
    "freezer",
    "garbage",
    "bin",
    "bottle",
    "bottles",
    "cleaner",
    "detergent",
    "soap",
    "shampoo",
    "toilet",
    "tissue",
    "foil",
    "wrap",
    "biscuit",
    "biscuits",
    "cookie",
    "cookies",
    "cracker",
    "crackers",
    "arrowroot",
    "lolly",
    "lollies",
    "candy",
];

/// Matches size text shaped like drinkable milk (volumes, not sachets).
pub(super) static DRINK_PACK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("ml| l | litre| liter|1l|2l|3l").unwrap());

pub(super) fn standard_rules() -> Vec<Box<dyn ScoreRule>> {
    vec![
        Box::new(RequireTokens),
        Box::new(AllTokensPresent),
        Box::new(ExactName),
        Box::new(NamePrefix),
        Box::new(FirstTokenInName),
        Box::new(PhraseMatch),
        Box::new(TokenCount),
        Box::new(SingleTokenCategoryGuard),
        Box::new(MilkNonGroceryGuard),
        Box::new(FoodIntentDairyBonus),
        Box::new(FoodIntentHouseholdPenalty),
        Box::new(FoodIntentNonGroceryPenalty),
        Box::new(MilkInNameGate),
        Box::new(MilkDrinkPackBonus),
        Box::new(MilkDryGoodsPenalty),
    ]
}

struct RequireTokens;

impl ScoreRule for RequireTokens {
    fn name(&self) -> &'static str {
        "require-tokens"
    }

    fn evaluate(&self, ctx: &ScoreContext) -> Verdict {
        if ctx.tokens.is_empty() {
            Verdict::Reject
        } else {
            Verdict::Skip
        }
    }
}

/// Every query token must appear somewhere in the offer text.
struct AllTokensPresent;

impl ScoreRule for AllTokensPresent {
    fn name(&self) -> &'static str {
        "all-tokens-present"
    }

    fn evaluate(&self, ctx: &ScoreContext) -> Verdict {
        if ctx.tokens.iter().all(|token| ctx.haystack_tokens.contains(token.as_str())) {
            Verdict::Skip
        } else {
            Verdict::Reject
        }
    }
}

struct ExactName;

impl ScoreRule for ExactName {
    fn name(&self) -> &'static str {
        "exact-name"
    }

    fn evaluate(&self, ctx: &ScoreContext) -> Verdict {
        if ctx.name == ctx.full_query {
            Verdict::Add(200)
        } else {
            Verdict::Skip
        }
    }
}

struct NamePrefix;

impl ScoreRule for NamePrefix {
    fn name(&self) -> &'static str {
        "name-prefix"
    }

    fn evaluate(&self, ctx: &ScoreContext) -> Verdict {
        if ctx.name == ctx.full_query || ctx.name.starts_with(&format!("{} ", ctx.full_query)) {
            Verdict::Add(90)
        } else {
            Verdict::Skip
        }
    }
}

struct FirstTokenInName;

impl ScoreRule for FirstTokenInName {
    fn name(&self) -> &'static str {
        "first-token-in-name"
    }

    fn evaluate(&self, ctx: &ScoreContext) -> Verdict {
        match ctx.tokens.first() {
            Some(token) if ctx.name_tokens.contains(token.as_str()) => Verdict::Add(45),
            _ => Verdict::Skip,
        }
    }
}

/// The whole query appearing as a phrase beats scattered tokens.
struct PhraseMatch;

impl ScoreRule for PhraseMatch {
    fn name(&self) -> &'static str {
        "phrase-match"
    }

    fn evaluate(&self, ctx: &ScoreContext) -> Verdict {
        if ctx.haystack.contains(&ctx.full_query) {
            Verdict::Add(40)
        } else {
            Verdict::Skip
        }
    }
}

struct TokenCount;

impl ScoreRule for TokenCount {
    fn name(&self) -> &'static str {
        "token-count"
    }

    fn evaluate(&self, ctx: &ScoreContext) -> Verdict {
        Verdict::Add((ctx.tokens.len() * 10) as i64)
    }
}

/// Staple single-word queries must land in their home categories, or the
/// offer is an accessory that merely mentions the word.
struct SingleTokenCategoryGuard;

impl ScoreRule for SingleTokenCategoryGuard {
    fn name(&self) -> &'static str {
        "single-token-category"
    }

    fn evaluate(&self, ctx: &ScoreContext) -> Verdict {
        let Some(token) = ctx.single_token() else {
            return Verdict::Skip;
        };

        let misplaced = match token {
            "milk" => !matches!(ctx.category, Category::Dairy | Category::Beverages),
            "banana" => ctx.category != Category::FruitVeg,
            "rice" => !matches!(ctx.category, Category::Pantry | Category::Beverages),
            _ => false,
        };

        if misplaced {
            Verdict::Reject
        } else {
            Verdict::Skip
        }
    }
}

struct MilkNonGroceryGuard;

impl ScoreRule for MilkNonGroceryGuard {
    fn name(&self) -> &'static str {
        "milk-non-grocery"
    }

    fn evaluate(&self, ctx: &ScoreContext) -> Verdict {
        if ctx.wants("milk") && ctx.non_grocery {
            Verdict::Reject
        } else {
            Verdict::Skip
        }
    }
}

struct FoodIntentDairyBonus;

impl ScoreRule for FoodIntentDairyBonus {
    fn name(&self) -> &'static str {
        "food-intent-dairy"
    }

    fn evaluate(&self, ctx: &ScoreContext) -> Verdict {
        if ctx.food_intent && ctx.category == Category::Dairy {
            Verdict::Add(60)
        } else {
            Verdict::Skip
        }
    }
}

struct FoodIntentHouseholdPenalty;

impl ScoreRule for FoodIntentHouseholdPenalty {
    fn name(&self) -> &'static str {
        "food-intent-household"
    }

    fn evaluate(&self, ctx: &ScoreContext) -> Verdict {
        if ctx.food_intent && ctx.category == Category::Household {
            Verdict::Add(-120)
        } else {
            Verdict::Skip
        }
    }
}

struct FoodIntentNonGroceryPenalty;

impl ScoreRule for FoodIntentNonGroceryPenalty {
    fn name(&self) -> &'static str {
        "food-intent-non-grocery"
    }

    fn evaluate(&self, ctx: &ScoreContext) -> Verdict {
        if ctx.food_intent && ctx.non_grocery {
            Verdict::Add(-140)
        } else {
            Verdict::Skip
        }
    }
}

/// Milk searches only accept products actually named milk.
struct MilkInNameGate;

impl ScoreRule for MilkInNameGate {
    fn name(&self) -> &'static str {
        "milk-in-name"
    }

    fn evaluate(&self, ctx: &ScoreContext) -> Verdict {
        if ctx.wants("milk") && !ctx.name_tokens.contains("milk") {
            Verdict::Reject
        } else {
            Verdict::Skip
        }
    }
}

struct MilkDrinkPackBonus;

impl ScoreRule for MilkDrinkPackBonus {
    fn name(&self) -> &'static str {
        "milk-drink-pack"
    }

    fn evaluate(&self, ctx: &ScoreContext) -> Verdict {
        let dairyish = ctx.category == Category::Dairy || ctx.name_tokens.contains("milk");
        if ctx.wants("milk") && dairyish && ctx.drink_pack {
            Verdict::Add(80)
        } else {
            Verdict::Skip
        }
    }
}

// The milk-non-grocery guard above rejects these offers before the
// penalty can apply; kept so the precedence order stays explicit.
struct MilkDryGoodsPenalty;

impl ScoreRule for MilkDryGoodsPenalty {
    fn name(&self) -> &'static str {
        "milk-dry-goods"
    }

    fn evaluate(&self, ctx: &ScoreContext) -> Verdict {
        if ctx.wants("milk") && ctx.non_grocery && !ctx.drink_pack {
            Verdict::Add(-180)
        } else {
            Verdict::Skip
        }
    }
}
