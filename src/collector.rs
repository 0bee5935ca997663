use questions::{AnswerRecord, catalog};

use crate::form::{Control, Form};

/// Reads the controls of the active step into `answers`.
///
/// - single choice: overwritten by the selection, untouched without one
/// - multi choice: replaced by the checked values, possibly empty
/// - free text: trimmed, written only when non-empty
/// - slider: always overwritten
/// - hidden rating: overwritten once a star was clicked
pub fn flush(controls: &[Control], answers: &mut AnswerRecord) {
    for control in controls {
        match control {
            Control::SingleChoice { field, selected } => {
                if let Some(value) = selected {
                    answers.set(*field, value.as_str());
                }
            }
            Control::MultiChoice { field, checked } => {
                answers.set(*field, checked.clone());
            }
            Control::FreeText { field, value } => {
                let value = value.trim();
                if !value.is_empty() {
                    answers.set(*field, value);
                }
            }
            Control::Slider { field, value } => {
                answers.set(*field, *value);
            }
            Control::HiddenRating { field, value } => {
                if let Some(value) = value {
                    answers.set(*field, *value);
                }
            }
        }
    }
}

/// Tag pickers live outside the step sections, so they are read once at the end.
pub fn collect_tags(form: &impl Form, answers: &mut AnswerRecord) {
    for def in catalog::tag_fields() {
        answers.set(def.name, form.selected_tags(def.name));
    }
}

#[cfg(test)]
mod tests {
    use questions::{AnswerValue, Step};

    use super::*;
    use crate::form::MemoryForm;

    fn list(values: &[&str]) -> AnswerValue {
        AnswerValue::List(values.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn test_unselected_radio_keeps_previous_answer() {
        let mut answers = AnswerRecord::new();
        answers.set("q1", "mas_1_ano");

        flush(
            &[Control::SingleChoice {
                field: "q1",
                selected: None,
            }],
            &mut answers,
        );

        assert_eq!(answers.get("q1"), Some(&AnswerValue::from("mas_1_ano")));
    }

    #[test]
    fn test_multi_choice_is_recomputed() {
        let mut answers = AnswerRecord::new();
        let mut form = MemoryForm::new();
        let step = Step::new(5).unwrap();

        form.set_checked("q5", "stock", true).unwrap();
        form.set_checked("q5", "precios", true).unwrap();
        flush(&form.controls(step), &mut answers);
        assert_eq!(answers.get("q5"), Some(&list(&["precios", "stock"])));

        form.set_checked("q5", "stock", false).unwrap();
        form.set_checked("q5", "precios", false).unwrap();
        flush(&form.controls(step), &mut answers);
        assert_eq!(answers.get("q5"), Some(&list(&[])));
    }

    #[test]
    fn test_free_text_is_trimmed_and_never_cleared() {
        let mut answers = AnswerRecord::new();

        flush(
            &[Control::FreeText {
                field: "q2",
                value: "  muy buena tienda \n".to_string(),
            }],
            &mut answers,
        );
        assert_eq!(answers.get("q2"), Some(&AnswerValue::from("muy buena tienda")));

        flush(
            &[Control::FreeText {
                field: "q2",
                value: "   ".to_string(),
            }],
            &mut answers,
        );
        assert_eq!(answers.get("q2"), Some(&AnswerValue::from("muy buena tienda")));
    }

    #[test]
    fn test_slider_always_written_rating_only_when_set() {
        let mut answers = AnswerRecord::new();
        let form = MemoryForm::new();

        flush(&form.controls(Step::new(7).unwrap()), &mut answers);
        flush(&form.controls(Step::new(6).unwrap()), &mut answers);

        assert_eq!(answers.get("q7_slider"), Some(&AnswerValue::Number(3)));
        assert!(!answers.contains("q7"));
        assert!(!answers.contains("q6"));
    }

    #[test]
    fn test_collect_tags_writes_every_picker() {
        let mut answers = AnswerRecord::new();
        let mut form = MemoryForm::new();
        form.toggle_tag("q8_tags", "gaming").unwrap();

        collect_tags(&form, &mut answers);

        assert_eq!(answers.get("q8_tags"), Some(&list(&["gaming"])));
        assert_eq!(answers.get("q2_tags"), Some(&list(&[])));
        assert_eq!(answers.get("q9_tags"), Some(&list(&[])));
    }
}
