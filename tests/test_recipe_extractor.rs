use recipe_relay::{extract_recipe, extract_recipe_bytes, Ingredient, Nutrition, RecipeDocument};

const FULL_PAGE: &str = r#"
<!DOCTYPE html>
<html>
<head><title>Shakshuka | Test Kitchen</title></head>
<body>
    <h1>Shakshuka</h1>
    <a class="featured-category" href="/c/breakfast">Breakfast</a>
    <div class="recipe-description">Eggs poached in a spiced tomato sauce.</div>
    <span class="prep-time">10 mins</span>
    <span class="cook-time">25 mins</span>
    <span class="servings">4</span>

    <ul>
        <li class="ingredient"><span class="ingredient-amount">2 tbsp</span> <span class="ingredient-item">olive oil</span></li>
        <li class="ingredient"><span class="ingredient-amount">1</span> <span class="ingredient-item">onion</span></li>
        <li class="ingredient"><span class="ingredient-amount">800 g</span> <span class="ingredient-item">tomatoes</span></li>
        <li class="ingredient"><span class="ingredient-amount">6</span> <span class="ingredient-item">eggs</span></li>
    </ul>

    <ol>
        <li class="instruction-step">Soften the onion in the oil.</li>
        <li class="instruction-step">Add tomatoes and simmer 15 minutes.</li>
        <li class="instruction-step">Crack in the eggs, cover and cook until set.</li>
    </ol>

    <div class="nutrition">
        <span class="nutrition-calories">310 kcal</span>
        <span class="nutrition-protein">17 g</span>
        <span class="nutrition-fat">20 g</span>
        <span class="nutrition-carbs">15 g</span>
    </div>
</body>
</html>
"#;

#[test]
fn test_all_fields_populated() {
    let recipe = extract_recipe(FULL_PAGE).unwrap();

    assert_eq!(recipe.name, "Shakshuka");
    assert_eq!(recipe.featured_in, "Breakfast");
    assert_eq!(recipe.description, "Eggs poached in a spiced tomato sauce.");
    assert_eq!(recipe.prep_time, "10 mins");
    assert_eq!(recipe.cook_time, "25 mins");
    assert_eq!(recipe.servings, "4");
    assert_eq!(recipe.ingredients.len(), 4);
    assert_eq!(recipe.instructions.len(), 3);
    assert_eq!(
        recipe.nutrition,
        Nutrition {
            calories: "310 kcal".to_string(),
            protein: "17 g".to_string(),
            fat: "20 g".to_string(),
            carbs: "15 g".to_string(),
        }
    );
}

#[test]
fn test_ingredient_order_is_preserved() {
    let recipe = extract_recipe(FULL_PAGE).unwrap();
    let items: Vec<&str> = recipe.ingredients.iter().map(|i| i.item.as_str()).collect();
    assert_eq!(items, vec!["olive oil", "onion", "tomatoes", "eggs"]);
    assert_eq!(recipe.ingredients[2].amount, "800 g");
    assert_eq!(
        recipe.instructions[1],
        "Add tomatoes and simmer 15 minutes."
    );
}

#[test]
fn test_lemon_cake_example() {
    let html = r#"
        <html><body>
            <h1>Lemon Cake</h1>
            <ul>
                <li class="ingredient"><span class="ingredient-amount">2</span><span class="ingredient-item">eggs</span></li>
            </ul>
            <ol>
                <li class="instruction-step">Mix</li>
                <li class="instruction-step">Bake</li>
            </ol>
        </body></html>
    "#;

    let recipe = extract_recipe(html).unwrap();

    assert_eq!(
        recipe,
        RecipeDocument {
            name: "Lemon Cake".to_string(),
            ingredients: vec![Ingredient {
                amount: "2".to_string(),
                item: "eggs".to_string(),
            }],
            instructions: vec!["Mix".to_string(), "Bake".to_string()],
            ..RecipeDocument::default()
        }
    );
}

#[test]
fn test_no_nutrition_elements() {
    let recipe = extract_recipe("<html><body><h1>Toast</h1></body></html>").unwrap();
    assert_eq!(recipe.nutrition, Nutrition::default());
    assert_eq!(recipe.nutrition.calories, "");
    assert_eq!(recipe.nutrition.carbs, "");
}

#[test]
fn test_page_without_recipe_markup() {
    let recipe = extract_recipe("<html><body><p>404 - page not found</p></body></html>").unwrap();
    assert_eq!(recipe, RecipeDocument::default());
}

#[test]
fn test_empty_input() {
    let recipe = extract_recipe("").unwrap();
    assert_eq!(recipe, RecipeDocument::default());
}

#[test]
fn test_ingredient_rows_kept_without_sub_elements() {
    let html = r#"
        <ul>
            <li class="ingredient">a pinch of salt</li>
            <li class="ingredient"><span class="ingredient-amount">3</span></li>
        </ul>
    "#;

    let recipe = extract_recipe(html).unwrap();
    assert_eq!(
        recipe.ingredients,
        vec![
            Ingredient::default(),
            Ingredient {
                amount: "3".to_string(),
                item: String::new(),
            },
        ]
    );
}

#[test]
fn test_first_heading_wins() {
    let recipe = extract_recipe("<h1>Pancakes</h1><div><h1>Related recipes</h1></div>").unwrap();
    assert_eq!(recipe.name, "Pancakes");
}

#[test]
fn test_instruction_text_includes_nested_markup() {
    let html = r#"<li class="instruction-step">Heat to <strong>180°C</strong>, then <em>wait</em>.</li>"#;
    let recipe = extract_recipe(html).unwrap();
    assert_eq!(recipe.instructions, vec!["Heat to 180°C, then wait.".to_string()]);
}

#[test]
fn test_extraction_is_idempotent() {
    let first = extract_recipe(FULL_PAGE).unwrap();
    let second = extract_recipe(FULL_PAGE).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_malformed_markup_still_extracts() {
    // Unclosed tags are repaired by the HTML parser rather than rejected
    let html = "<h1>Broth<div class=\"recipe-description\">Clear and light";
    let recipe = extract_recipe(html).unwrap();
    assert!(recipe.name.starts_with("Broth"));
    assert_eq!(recipe.description, "Clear and light");
}

#[test]
fn test_bytes_entry_point() {
    let recipe = extract_recipe_bytes(FULL_PAGE.as_bytes()).unwrap();
    assert_eq!(recipe.name, "Shakshuka");

    let err = extract_recipe_bytes(b"<h1>Caf\xe9</h1>").unwrap_err();
    assert!(err.to_string().starts_with("Failed to parse HTML"));
}

#[test]
fn test_json_shape() {
    let recipe = extract_recipe(FULL_PAGE).unwrap();
    let value = serde_json::to_value(&recipe).unwrap();

    assert_eq!(value["featuredIn"], "Breakfast");
    assert_eq!(value["prepTime"], "10 mins");
    assert_eq!(value["cookTime"], "25 mins");
    assert_eq!(value["ingredients"][0]["amount"], "2 tbsp");
    assert_eq!(value["ingredients"][0]["item"], "olive oil");
    assert_eq!(value["nutrition"]["calories"], "310 kcal");
    assert!(value.get("featured_in").is_none());
}
