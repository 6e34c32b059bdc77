//! Property-based tests for implementation profile validation.
//!
//! Uses proptest to verify that:
//! - Validating the same profile twice gives the same outcome
//! - Conflicting tags never include a selected value

use ccl_test_compiler::config::profile::{ProfileDocument, Selections};
use ccl_test_compiler::model::TagCategory;
use ccl_test_compiler::validation::{ProfileValidator, behavior_groups};
use proptest::prelude::*;
use std::collections::BTreeMap;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn profile_validation_is_deterministic(
        picks in proptest::collection::vec((0usize..2, any::<bool>()), 8)
    ) {
        let mut behaviors = BTreeMap::new();
        let mut variants = BTreeMap::new();
        for (group, (index, set_optional)) in behavior_groups().iter().zip(&picks) {
            if !group.required && !set_optional {
                continue;
            }
            let value = Some(group.options[*index].to_string());
            if group.category == TagCategory::Variant {
                variants.insert(group.id.to_string(), value);
            } else {
                behaviors.insert(group.id.to_string(), value);
            }
        }
        let doc = ProfileDocument {
            functions: vec!["parse".to_string()],
            behaviors: Selections::ByGroup(behaviors),
            variants: Selections::ByGroup(variants),
            ..ProfileDocument::default()
        };

        let first = ProfileValidator::validate(&doc);
        let second = ProfileValidator::validate(&doc);
        prop_assert_eq!(&first, &second);

        let profile = first.expect("every required group is set");
        let conflicting = profile.conflicting_tags();
        for choice in &profile.choices {
            let selected = format!("{}:{}", choice.category, choice.value);
            prop_assert!(!conflicting.contains(&selected));
        }
        let expected: usize = profile
            .choices
            .iter()
            .filter_map(|choice| behavior_groups().iter().find(|g| g.id == choice.group))
            .map(|group| group.options.len() - 1)
            .sum();
        prop_assert_eq!(conflicting.len(), expected);
    }
}
