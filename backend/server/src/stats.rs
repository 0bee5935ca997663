//! # Statistics
//!
//! Aggregates over stored responses, computed on request.
//!
//! - Distributions: one value-to-count map per single-choice, multi-choice and tag field
//! - Averages: ratings and slider, rounded to 2 decimals, `None` without data
use std::collections::BTreeMap;

use questions::{AnswerValue, FieldKind, StoredResponse, catalog};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Stats {
    pub total_responses: usize,
    pub distributions: BTreeMap<&'static str, BTreeMap<String, usize>>,
    pub averages: BTreeMap<&'static str, Option<f64>>,
}

pub fn compute(responses: &[StoredResponse]) -> Stats {
    let records: Vec<_> = responses.iter().map(|r| r.answers.to_record()).collect();

    let mut distributions = BTreeMap::new();
    let mut averages = BTreeMap::new();

    for field in catalog::fields() {
        match field.kind {
            FieldKind::SingleChoice(_) | FieldKind::MultiChoice(_) | FieldKind::TagPicker(_) => {
                let mut counts: BTreeMap<String, usize> = BTreeMap::new();

                for value in records.iter().filter_map(|record| record.get(field.name)) {
                    match value {
                        AnswerValue::Text(choice) => *counts.entry(choice.clone()).or_default() += 1,
                        AnswerValue::List(choices) => {
                            for choice in choices {
                                *counts.entry(choice.clone()).or_default() += 1;
                            }
                        }
                        AnswerValue::Number(_) => {}
                    }
                }

                distributions.insert(field.name, counts);
            }
            FieldKind::Slider { .. } | FieldKind::StarRating => {
                let values: Vec<i64> = records
                    .iter()
                    .filter_map(|record| record.get(field.name).and_then(AnswerValue::as_number))
                    .collect();

                averages.insert(field.name, average(&values));
            }
            FieldKind::FreeText => {}
        }
    }

    Stats {
        total_responses: responses.len(),
        distributions,
        averages,
    }
}

fn average(values: &[i64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mean = values.iter().sum::<i64>() as f64 / values.len() as f64;

    Some((mean * 100.0).round() / 100.0)
}
