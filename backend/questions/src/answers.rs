use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single answer: one string or number, or the ordered values of a multi-select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(i64),
    Text(String),
    List(Vec<String>),
}

impl AnswerValue {
    pub fn as_number(&self) -> Option<i64> {
        match self {
            AnswerValue::Number(number) => Some(*number),
            _ => None,
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Text(value)
    }
}

impl From<i64> for AnswerValue {
    fn from(value: i64) -> Self {
        AnswerValue::Number(value)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(value: Vec<String>) -> Self {
        AnswerValue::List(value)
    }
}

/// Flat field-name to value mapping accumulated across steps.
///
/// Keys are only ever inserted or overwritten. There is no removal API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerRecord(BTreeMap<String, AnswerValue>);

impl AnswerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<AnswerValue>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&AnswerValue> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_keeps_single_entry() {
        let mut record = AnswerRecord::new();
        record.set("q1", "menos_1_mes");
        record.set("q1", "1_6_meses");

        assert_eq!(record.len(), 1);
        assert_eq!(record.get("q1"), Some(&AnswerValue::from("1_6_meses")));
    }

    #[test]
    fn test_json_shape() {
        let mut record = AnswerRecord::new();
        record.set("q1", "1_6_meses");
        record.set("q4", vec!["productos".to_string(), "garantia".to_string()]);
        record.set("q6", 5);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "q1": "1_6_meses",
                "q4": ["productos", "garantia"],
                "q6": 5
            })
        );

        let back: AnswerRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
