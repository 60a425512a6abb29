use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Recipe fields scraped from a single page.
/// Every field is empty when the page has no matching element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDocument {
    pub name: String,
    pub featured_in: String,
    pub description: String,
    pub prep_time: String,
    pub cook_time: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    pub nutrition: Nutrition,
    pub servings: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub amount: String,
    pub item: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: String,
    pub protein: String,
    pub fat: String,
    pub carbs: String,
}

/// A push notification addressed to one device token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub token: String,
    pub title: String,
    pub body: String,
    pub image: Option<String>,
    pub data: HashMap<String, String>,
}

/// Result of a delayed delivery, published once the provider has answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub token: String,
    /// Provider message id on success, error text on failure
    pub result: Result<String, String>,
}
