pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod fetchers;
pub mod model;
pub mod notifications;
pub mod server;

pub use error::RelayError;
pub use model::{Ingredient, Nutrition, RecipeDocument};

use log::debug;

use crate::extractors::{ExtractionRules, RecipePageExtractor};
use crate::fetchers::RequestFetcher;

/// Extract a recipe from an HTML document using the default rules.
///
/// Missing elements leave their fields empty; this never fails on a
/// page that merely lacks recipe markup.
///
/// # Example
/// ```
/// let recipe = recipe_relay::extract_recipe("<h1>Lemon Cake</h1>").unwrap();
/// assert_eq!(recipe.name, "Lemon Cake");
/// assert!(recipe.ingredients.is_empty());
/// ```
pub fn extract_recipe(html: &str) -> Result<RecipeDocument, RelayError> {
    let extractor = RecipePageExtractor::new(&ExtractionRules::default())?;
    Ok(extractor.extract(html))
}

/// Same as [`extract_recipe`] for raw bytes; fails with
/// [`RelayError::ParseError`] when they are not valid UTF-8.
pub fn extract_recipe_bytes(html: &[u8]) -> Result<RecipeDocument, RelayError> {
    RecipePageExtractor::new(&ExtractionRules::default())?.extract_bytes(html)
}

/// Download a page and extract the recipe from it
pub async fn fetch_recipe_with(
    fetcher: &RequestFetcher,
    extractor: &RecipePageExtractor,
    url: &str,
) -> Result<RecipeDocument, RelayError> {
    let html = fetcher.fetch(url).await?;
    let recipe = extractor.extract(&html);
    debug!("{:#?}", recipe);
    Ok(recipe)
}

/// [`fetch_recipe_with`] using the default fetcher and rules
pub async fn fetch_recipe(url: &str) -> Result<RecipeDocument, RelayError> {
    let fetcher = RequestFetcher::new(None, None)?;
    let extractor = RecipePageExtractor::new(&ExtractionRules::default())?;
    fetch_recipe_with(&fetcher, &extractor, url).await
}
