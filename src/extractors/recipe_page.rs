use log::debug;
use scraper::{ElementRef, Html, Selector};

use crate::error::RelayError;
use crate::extractors::{CompiledRules, ExtractionRules};
use crate::model::{Ingredient, Nutrition, RecipeDocument};

/// Applies a fixed set of selector rules to a recipe page.
///
/// Output mirrors the page text verbatim: nothing is trimmed, parsed or
/// validated, and a field whose element is missing stays empty.
#[derive(Debug, Clone)]
pub struct RecipePageExtractor {
    rules: CompiledRules,
}

/// Concatenated text of every descendant text node, as authored
fn raw_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

fn first_text(root: ElementRef<'_>, selector: &Selector) -> String {
    root.select(selector).next().map(raw_text).unwrap_or_default()
}

impl RecipePageExtractor {
    pub fn new(rules: &ExtractionRules) -> Result<Self, RelayError> {
        Ok(Self {
            rules: rules.compile()?,
        })
    }

    pub fn parse(&self, document: &Html) -> RecipeDocument {
        let root = document.root_element();
        let rules = &self.rules;

        let ingredients: Vec<Ingredient> = root
            .select(&rules.ingredient)
            .map(|entry| Ingredient {
                amount: first_text(entry, &rules.ingredient_amount),
                item: first_text(entry, &rules.ingredient_item),
            })
            .collect();

        let instructions: Vec<String> = root.select(&rules.instruction).map(raw_text).collect();

        let recipe = RecipeDocument {
            name: first_text(root, &rules.name),
            featured_in: first_text(root, &rules.featured_in),
            description: first_text(root, &rules.description),
            prep_time: first_text(root, &rules.prep_time),
            cook_time: first_text(root, &rules.cook_time),
            ingredients,
            instructions,
            nutrition: Nutrition {
                calories: first_text(root, &rules.calories),
                protein: first_text(root, &rules.protein),
                fat: first_text(root, &rules.fat),
                carbs: first_text(root, &rules.carbs),
            },
            servings: first_text(root, &rules.servings),
        };

        debug!("Recipe name: {}", recipe.name);
        debug!("Ingredients count: {}", recipe.ingredients.len());
        debug!("Instructions count: {}", recipe.instructions.len());

        recipe
    }

    pub fn extract(&self, html: &str) -> RecipeDocument {
        self.parse(&Html::parse_document(html))
    }

    /// Like [`extract`](Self::extract), for an undecoded byte stream.
    /// Fails only when the bytes are not valid UTF-8.
    pub fn extract_bytes(&self, html: &[u8]) -> Result<RecipeDocument, RelayError> {
        let text = std::str::from_utf8(html).map_err(|e| RelayError::ParseError(e.to_string()))?;
        Ok(self.extract(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> RecipePageExtractor {
        RecipePageExtractor::new(&ExtractionRules::default()).unwrap()
    }

    #[test]
    fn test_text_is_not_trimmed() {
        let recipe = extractor().extract("<html><body><h1>  Soup \n</h1></body></html>");
        assert_eq!(recipe.name, "  Soup \n");
    }

    #[test]
    fn test_nested_markup_is_flattened() {
        let html = r#"<div class="recipe-description">A <b>very</b> <i>good</i> pie</div>"#;
        let recipe = extractor().extract(html);
        assert_eq!(recipe.description, "A very good pie");
    }

    #[test]
    fn test_entities_are_decoded() {
        let html = r#"<span class="servings">4 &amp; more</span>"#;
        let recipe = extractor().extract(html);
        assert_eq!(recipe.servings, "4 & more");
    }

    #[test]
    fn test_sub_selectors_stay_inside_their_ingredient() {
        let html = r#"
            <ul>
                <li class="ingredient"><span class="ingredient-item">salt</span></li>
                <li class="ingredient"><span class="ingredient-amount">1 tsp</span><span class="ingredient-item">pepper</span></li>
            </ul>
        "#;
        let recipe = extractor().extract(html);
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.ingredients[0].amount, "");
        assert_eq!(recipe.ingredients[0].item, "salt");
        assert_eq!(recipe.ingredients[1].amount, "1 tsp");
    }

    #[test]
    fn test_invalid_utf8_is_a_parse_error() {
        let result = extractor().extract_bytes(&[0x3c, 0x68, 0x31, 0xff, 0xfe]);
        assert!(matches!(result, Err(RelayError::ParseError(_))));
    }

    #[test]
    fn test_custom_rules() {
        let rules = ExtractionRules {
            name: "h2.title".to_string(),
            ..ExtractionRules::default()
        };
        let extractor = RecipePageExtractor::new(&rules).unwrap();
        let recipe = extractor.extract("<h1>Site name</h1><h2 class=\"title\">Stew</h2>");
        assert_eq!(recipe.name, "Stew");
    }
}
