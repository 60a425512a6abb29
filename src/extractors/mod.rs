mod recipe_page;
mod rules;

pub use self::recipe_page::RecipePageExtractor;
pub use self::rules::{CompiledRules, ExtractionRules};
