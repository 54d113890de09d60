use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// A named category and its item labels, e.g. "Drink": [Tea, Coffee, Milk].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub items: Vec<String>,
}

impl Category {
    pub fn new(name: &str, items: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            items: items.iter().map(|item| item.to_string()).collect(),
        }
    }
}

/// The content a puzzle is built from. Categories may carry more items than a
/// puzzle needs; the generator samples from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub categories: Vec<Category>,
}

impl Theme {
    pub fn new(name: &str, categories: Vec<Category>) -> Self {
        Self {
            name: name.to_string(),
            categories,
        }
    }

    pub fn from_json(contents: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn load(path: &std::path::Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Theme used by the demo binary and tests.
    pub fn sample() -> Self {
        Theme::new(
            "Office",
            vec![
                Category::new(
                    "Employee",
                    &["Alice", "Bruno", "Chen", "Dalia", "Emeka", "Farah", "Goran", "Hana"],
                ),
                Category::new(
                    "Department",
                    &[
                        "Sales", "Legal", "Finance", "Support", "Design", "Research", "Ops",
                        "Marketing",
                    ],
                ),
                Category::new(
                    "Drink",
                    &["Tea", "Coffee", "Milk", "Juice", "Water", "Cocoa", "Soda", "Kefir"],
                ),
                Category::new(
                    "Pet",
                    &["Cat", "Dog", "Parrot", "Turtle", "Hamster", "Rabbit", "Snake", "Fish"],
                ),
                Category::new(
                    "Car",
                    &["Audi", "Fiat", "Ford", "Kia", "Mazda", "Opel", "Seat", "Volvo"],
                ),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let theme = Theme::from_json(
            r#"{"name": "Street", "categories": [
                {"name": "Color", "items": ["Red", "Blue"]},
                {"name": "Pet", "items": ["Cat", "Dog"]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(theme.categories.len(), 2);
        assert_eq!(theme.categories[1].items, vec!["Cat", "Dog"]);
    }

    #[test]
    fn test_from_json_rejects_missing_items() {
        let result = Theme::from_json(r#"{"name": "Broken", "categories": [{"name": "Color"}]}"#);
        assert!(matches!(result, Err(SettingsError::Json(_))));
    }
}
