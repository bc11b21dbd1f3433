//! Score range derivation for `llm_detection` events.
//!
//! `min`/`max` are never taken from user input. They follow from the score type:
//!
//! | score_type | min | max               | categories        |
//! |------------|-----|-------------------|-------------------|
//! | confidence | 0   | 1                 | empty             |
//! | range      | 1   | 5                 | empty             |
//! | category   | 1   | number of labels  | 1 to 9 labels     |

use serde::{Deserialize, Serialize};

use crate::error::EventKitError;
use crate::types::{ScoreRangeSettings, ScoreType};

pub const MIN_CATEGORIES: usize = 1;
pub const MAX_CATEGORIES: usize = 9;

pub const CATEGORY_COUNT_MESSAGE: &str = "Categories must be between 1 and 9.";

/// Raw categories as typed in a form: either a list or a comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoriesInput {
    List(Vec<String>),
    Text(String),
}

impl Default for CategoriesInput {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<Vec<String>> for CategoriesInput {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<&str> for CategoriesInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl CategoriesInput {
    /// Normalize into labels. Text is split on commas and trimmed; list entries are
    /// kept verbatim. Empty entries are dropped in both cases. Duplicates are kept.
    pub fn normalize(&self) -> Vec<String> {
        match self {
            Self::List(items) => items.iter().filter(|c| !c.is_empty()).cloned().collect(),
            Self::Text(text) => text
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.normalize().is_empty()
    }
}

impl ScoreRangeSettings {
    pub fn confidence() -> Self {
        Self {
            score_type: ScoreType::Confidence,
            min: 0,
            max: 1,
            categories: Vec::new(),
        }
    }

    pub fn range() -> Self {
        Self {
            score_type: ScoreType::Range,
            min: 1,
            max: 5,
            categories: Vec::new(),
        }
    }

    /// Derive the settings for `score_type`. Categories are only read for
    /// `ScoreType::Category` and dropped for every other type.
    pub fn derive(
        score_type: ScoreType,
        categories: &CategoriesInput,
    ) -> Result<Self, EventKitError> {
        match score_type {
            ScoreType::Confidence => Ok(Self::confidence()),
            ScoreType::Range => Ok(Self::range()),
            ScoreType::Category => {
                let labels = categories.normalize();
                if !(MIN_CATEGORIES..=MAX_CATEGORIES).contains(&labels.len()) {
                    return Err(EventKitError::Derivation(CATEGORY_COUNT_MESSAGE.to_string()));
                }
                Ok(Self {
                    score_type: ScoreType::Category,
                    min: 1,
                    max: labels.len() as i64,
                    categories: labels,
                })
            }
        }
    }

    /// Initial settings shown in a fresh form. A new category form starts with no
    /// labels yet, which the validator rejects until some are typed in.
    pub fn initial(score_type: ScoreType) -> Self {
        match score_type {
            ScoreType::Confidence => Self::confidence(),
            ScoreType::Range => Self::range(),
            ScoreType::Category => Self {
                score_type: ScoreType::Category,
                min: 1,
                max: 1,
                categories: Vec::new(),
            },
        }
    }

    /// Check that `min`/`max`/`categories` agree with the derivation table.
    pub fn is_consistent(&self) -> bool {
        match Self::derive(self.score_type, &CategoriesInput::List(self.categories.clone())) {
            Ok(derived) => derived == *self,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_bounds_per_score_type() {
        let empty = CategoriesInput::default();

        let c = ScoreRangeSettings::derive(ScoreType::Confidence, &empty).unwrap();
        assert_eq!((c.min, c.max), (0, 1));

        let r = ScoreRangeSettings::derive(ScoreType::Range, &empty).unwrap();
        assert_eq!((r.min, r.max), (1, 5));

        let cat = ScoreRangeSettings::derive(ScoreType::Category, &"a,b,c".into()).unwrap();
        assert_eq!((cat.min, cat.max), (1, 3));
    }

    #[test]
    fn text_categories_are_split_trimmed_and_filtered() {
        let input: CategoriesInput = " happy , sad,,neutral , ".into();
        assert_eq!(input.normalize(), vec!["happy", "sad", "neutral"]);
    }

    #[test]
    fn list_categories_only_drop_empty_entries() {
        let input = CategoriesInput::List(vec![" spaced ".into(), String::new(), "x".into()]);
        assert_eq!(input.normalize(), vec![" spaced ", "x"]);
    }

    #[test]
    fn category_count_must_be_between_one_and_nine() {
        assert!(ScoreRangeSettings::derive(ScoreType::Category, &" , ,".into()).is_err());

        let nine = (1..=9).map(|i| i.to_string()).collect::<Vec<_>>().join(",");
        let ok = ScoreRangeSettings::derive(ScoreType::Category, &nine.as_str().into()).unwrap();
        assert_eq!(ok.max, 9);

        let ten = (1..=10).map(|i| i.to_string()).collect::<Vec<_>>().join(",");
        let err = ScoreRangeSettings::derive(ScoreType::Category, &ten.as_str().into()).unwrap_err();
        assert!(err.to_string().contains("between 1 and 9"));
    }

    #[test]
    fn duplicates_are_kept_in_order() {
        let s = ScoreRangeSettings::derive(ScoreType::Category, &"b,a,b".into()).unwrap();
        assert_eq!(s.categories, vec!["b", "a", "b"]);
        assert_eq!(s.max, 3);
    }

    #[test]
    fn non_category_types_discard_supplied_categories() {
        let stale: CategoriesInput = "happy,sad".into();
        for score_type in [ScoreType::Confidence, ScoreType::Range] {
            let s = ScoreRangeSettings::derive(score_type, &stale).unwrap();
            assert!(s.categories.is_empty());
        }
    }

    #[test]
    fn consistency_check_catches_hand_edited_bounds() {
        assert!(ScoreRangeSettings::range().is_consistent());

        let mut off = ScoreRangeSettings::confidence();
        off.max = 5;
        assert!(!off.is_consistent());

        // an untouched category form has no labels yet
        assert!(!ScoreRangeSettings::initial(ScoreType::Category).is_consistent());
    }

    #[test]
    fn categories_input_deserializes_from_list_or_string() {
        let list: CategoriesInput = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(list, CategoriesInput::List(vec!["a".into(), "b".into()]));

        let text: CategoriesInput = serde_json::from_str(r#""a, b""#).unwrap();
        assert_eq!(text.normalize(), vec!["a", "b"]);
    }
}
