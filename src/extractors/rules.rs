use scraper::Selector;
use serde::Deserialize;

use crate::error::RelayError;

/// CSS selectors for every field of a recipe page.
///
/// Defaults match the layout of the recipe site the relay was written
/// for; any selector can be replaced through the `extractor` config section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractionRules {
    pub name: String,
    pub featured_in: String,
    pub description: String,
    pub prep_time: String,
    pub cook_time: String,
    pub ingredient: String,
    /// Looked up inside each matched ingredient
    pub ingredient_amount: String,
    /// Looked up inside each matched ingredient
    pub ingredient_item: String,
    pub instruction: String,
    pub calories: String,
    pub protein: String,
    pub fat: String,
    pub carbs: String,
    pub servings: String,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            name: "h1".to_string(),
            featured_in: "a.featured-category".to_string(),
            description: "div.recipe-description".to_string(),
            prep_time: "span.prep-time".to_string(),
            cook_time: "span.cook-time".to_string(),
            ingredient: "li.ingredient".to_string(),
            ingredient_amount: ".ingredient-amount".to_string(),
            ingredient_item: ".ingredient-item".to_string(),
            instruction: "li.instruction-step".to_string(),
            calories: "span.nutrition-calories".to_string(),
            protein: "span.nutrition-protein".to_string(),
            fat: "span.nutrition-fat".to_string(),
            carbs: "span.nutrition-carbs".to_string(),
            servings: "span.servings".to_string(),
        }
    }
}

/// Parsed form of [`ExtractionRules`]
#[derive(Debug, Clone)]
pub struct CompiledRules {
    pub(crate) name: Selector,
    pub(crate) featured_in: Selector,
    pub(crate) description: Selector,
    pub(crate) prep_time: Selector,
    pub(crate) cook_time: Selector,
    pub(crate) ingredient: Selector,
    pub(crate) ingredient_amount: Selector,
    pub(crate) ingredient_item: Selector,
    pub(crate) instruction: Selector,
    pub(crate) calories: Selector,
    pub(crate) protein: Selector,
    pub(crate) fat: Selector,
    pub(crate) carbs: Selector,
    pub(crate) servings: Selector,
}

fn compile(field: &'static str, selector: &str) -> Result<Selector, RelayError> {
    Selector::parse(selector).map_err(|_| RelayError::InvalidSelector {
        field,
        selector: selector.to_string(),
    })
}

impl ExtractionRules {
    pub fn compile(&self) -> Result<CompiledRules, RelayError> {
        Ok(CompiledRules {
            name: compile("name", &self.name)?,
            featured_in: compile("featured_in", &self.featured_in)?,
            description: compile("description", &self.description)?,
            prep_time: compile("prep_time", &self.prep_time)?,
            cook_time: compile("cook_time", &self.cook_time)?,
            ingredient: compile("ingredient", &self.ingredient)?,
            ingredient_amount: compile("ingredient_amount", &self.ingredient_amount)?,
            ingredient_item: compile("ingredient_item", &self.ingredient_item)?,
            instruction: compile("instruction", &self.instruction)?,
            calories: compile("calories", &self.calories)?,
            protein: compile("protein", &self.protein)?,
            fat: compile("fat", &self.fat)?,
            carbs: compile("carbs", &self.carbs)?,
            servings: compile("servings", &self.servings)?,
        })
    }
}
