//! Grocery category tags with keyword-based classification.

use crate::text::normalize;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Keyword rules for classification. Order matters: the first matching
// rule wins, so "chocolate milk" lands in snacks and "milk frother" in
// household.
mod rules {
    use regex_lite::Regex;
    use std::sync::LazyLock;

    pub static HOUSEHOLD: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\b(frother|machine|maker|vacuum|detergent|cleaner|toilet|tissue|soap|shampoo|household|foil|wrap|bag)\b").unwrap()
    });

    pub static SNACKS: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\b(chips|chocolate|biscuit|cookie|snack|cracker|bar)\b").unwrap()
    });

    pub static DAIRY: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\b(milk|cheese|yoghurt|yogurt|butter|cream)\b").unwrap()
    });

    pub static FRUIT_VEG: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\b(apple|banana|orange|grape|pear|berry|fruit|vegetable|veg|tomato|potato|onion|carrot|avocado)\b").unwrap()
    });

    pub static BAKERY: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\b(bread|bun|roll|croissant|muffin|bakery|cake|bagel|crumpet)\b").unwrap()
    });

    pub static PANTRY: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\b(rice|pasta|flour|oil|sauce|salt|sugar|spice|cereal|beans|pantry|soup)\b").unwrap()
    });

    pub static BEVERAGES: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\b(water|juice|drink|soda|coffee|tea|cola)\b").unwrap()
    });
}

/// Product category tags. `All` is a filter sentinel only; classification
/// never assigns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    All,
    Dairy,
    FruitVeg,
    Bakery,
    Pantry,
    Beverages,
    Snacks,
    Household,
    Other,
}

impl Category {
    /// Classifies product text into a category by ordered keyword rules.
    pub fn classify(text: &str) -> Category {
        let normalized = normalize(text);

        let ordered: [(&regex_lite::Regex, Category); 7] = [
            (&rules::HOUSEHOLD, Category::Household),
            (&rules::SNACKS, Category::Snacks),
            (&rules::DAIRY, Category::Dairy),
            (&rules::FRUIT_VEG, Category::FruitVeg),
            (&rules::BAKERY, Category::Bakery),
            (&rules::PANTRY, Category::Pantry),
            (&rules::BEVERAGES, Category::Beverages),
        ];

        for (rule, category) in ordered {
            if rule.is_match(&normalized) {
                return category;
            }
        }

        Category::Other
    }

    /// Maps arbitrary caller input onto a known tag, falling back to `All`.
    pub fn sanitize(input: &str) -> Category {
        let tag = normalize(input).replace(' ', "_");
        tag.parse().unwrap_or(Category::All)
    }

    /// Returns true if an offer in `other` passes this category filter.
    pub fn includes(&self, other: Category) -> bool {
        *self == Category::All || *self == other
    }

    /// Returns the wire tag for this category.
    pub fn tag(&self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Dairy => "dairy",
            Category::FruitVeg => "fruit_veg",
            Category::Bakery => "bakery",
            Category::Pantry => "pantry",
            Category::Beverages => "beverages",
            Category::Snacks => "snacks",
            Category::Household => "household",
            Category::Other => "other",
        }
    }

    /// Returns every known tag, the `all` sentinel included.
    pub fn all() -> &'static [Category] {
        &[
            Category::All,
            Category::Dairy,
            Category::FruitVeg,
            Category::Bakery,
            Category::Pantry,
            Category::Beverages,
            Category::Snacks,
            Category::Household,
            Category::Other,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Category::All),
            "dairy" => Ok(Category::Dairy),
            "fruit_veg" | "fruit veg" => Ok(Category::FruitVeg),
            "bakery" => Ok(Category::Bakery),
            "pantry" => Ok(Category::Pantry),
            "beverages" => Ok(Category::Beverages),
            "snacks" => Ok(Category::Snacks),
            "household" => Ok(Category::Household),
            "other" => Ok(Category::Other),
            _ => Err(CategoryParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryParseError(String);

impl fmt::Display for CategoryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown category '{}'. Valid categories: all, dairy, fruit_veg, bakery, pantry, beverages, snacks, household, other",
            self.0
        )
    }
}

impl std::error::Error for CategoryParseError {}
