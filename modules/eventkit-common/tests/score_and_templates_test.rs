//! Black-box checks of score derivation and the onboarding catalog.

use eventkit_common::templates::OnboardingTemplate;
use eventkit_common::{
    expand_template, validate, CategoriesInput, DetectionScope, EventFormValues, FormField,
    ScoreRangeInput, ScoreRangeSettings, ScoreType,
};

#[test]
fn derived_bounds_follow_the_table() {
    let labels: CategoriesInput = "low,mid,high".into();
    let cases = [
        (ScoreType::Confidence, 0, 1),
        (ScoreType::Range, 1, 5),
        (ScoreType::Category, 1, 3),
    ];
    for (score_type, min, max) in cases {
        let s = ScoreRangeSettings::derive(score_type, &labels).unwrap();
        assert_eq!((s.min, s.max), (min, max), "{score_type:?}");
    }
}

#[test]
fn category_min_is_always_one() {
    for n in 1..=9 {
        let labels: Vec<String> = (0..n).map(|i| format!("label{i}")).collect();
        let s = ScoreRangeSettings::derive(ScoreType::Category, &labels.into()).unwrap();
        assert_eq!(s.min, 1);
        assert_eq!(s.max, n as i64);
    }
}

#[test]
fn every_template_yields_four_valid_definitions() {
    for template in OnboardingTemplate::ALL {
        let defs = expand_template(template.name(), "p", "o");
        assert_eq!(defs.len(), 4);
        for def in &defs {
            let values = EventFormValues::from_definition(def);
            assert!(validate(&values, "p", "o").is_ok(), "{}", def.event_name);
        }
    }
}

#[test]
fn text_generation_positive_sentiment_is_a_range_score() {
    let defs = expand_template("Text generation", "p", "o");
    let positive = defs
        .iter()
        .find(|d| d.event_name == "Positive sentiment")
        .unwrap();
    assert_eq!(positive.detection_scope, DetectionScope::TaskOutputOnly);
    assert_eq!(positive.score_range_settings, Some(ScoreRangeSettings::range()));
}

#[test]
fn templates_are_deterministic() {
    assert_eq!(
        expand_template("Customer support", "p", "o"),
        expand_template("Customer support", "p", "o")
    );
    assert_eq!(
        expand_template("", "p", "o"),
        expand_template("Writing assistant", "p", "o")
    );
}

#[test]
fn stale_categories_never_leak_into_non_category_scores() {
    let values = EventFormValues {
        event_name: "Tone".into(),
        description: "The assistant keeps a polite tone.".into(),
        score_range_settings: Some(ScoreRangeInput {
            score_type: ScoreType::Range,
            categories: "polite,rude".into(),
        }),
        ..Default::default()
    };
    let def = validate(&values, "p", "o").unwrap();
    assert!(def.score_range_settings.unwrap().categories.is_empty());
}

#[test]
fn too_many_categories_is_a_field_error() {
    let values = EventFormValues {
        event_name: "Topic".into(),
        description: "Which topic is the user asking about?".into(),
        score_range_settings: Some(ScoreRangeInput {
            score_type: ScoreType::Category,
            categories: "a,b,c,d,e,f,g,h,i,j".into(),
        }),
        ..Default::default()
    };
    let errors = validate(&values, "p", "o").unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, FormField::Categories);
}
