//! # Kiosk
//!
//! Terminal front end for the survey, for stands without a browser.
//!
//! Each step prints its questions; answers are typed as option numbers or
//! names (comma separated for multi-select), numbers for sliders and stars,
//! or plain text. An empty line leaves a question as it was.
//!
//! After the questions of a step:
//! - Enter: next, or submit on the last step
//! - `n` / `p`: next / previous
//! - `s`: submit
use questions::{
    FieldDef, FieldKind,
    catalog::{RATING_MAX, RATING_MIN},
};
use survey::{
    MemoryForm, ViewModel,
    controller::{Button, Input, Key},
    form::FormError,
    view::PrimaryAction,
};

/// One line describing how to answer `def`.
pub fn prompt(def: &FieldDef) -> String {
    let hint = match def.kind {
        FieldKind::SingleChoice(options) => numbered(options),
        FieldKind::MultiChoice(options) | FieldKind::TagPicker(options) => {
            format!("{} (comma separated)", numbered(options))
        }
        FieldKind::FreeText => "free text".to_string(),
        FieldKind::Slider { min, max, default } => format!("{min}-{max}, default {default}"),
        FieldKind::StarRating => format!("{RATING_MIN}-{RATING_MAX} stars"),
    };

    format!("{} [{hint}]", def.label)
}

fn numbered(options: &[&str]) -> String {
    options
        .iter()
        .enumerate()
        .map(|(i, option)| format!("{}) {option}", i + 1))
        .collect::<Vec<_>>()
        .join("  ")
}

/// Option by 1-based number or by name.
fn resolve<'a>(options: &[&'a str], token: &str) -> Option<&'a str> {
    match token.parse::<usize>() {
        Ok(n) => n.checked_sub(1).and_then(|i| options.get(i)).copied(),
        Err(_) => options.iter().find(|option| **option == token).copied(),
    }
}

fn resolve_all<'a>(def: &FieldDef, options: &[&'a str], line: &str) -> Result<Vec<&'a str>, FormError> {
    line.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            resolve(options, token).ok_or_else(|| FormError::UnknownOption {
                field: def.name,
                value: token.to_string(),
            })
        })
        .collect()
}

fn number(def: &FieldDef, line: &str) -> Result<i64, FormError> {
    line.parse().map_err(|_| FormError::UnknownOption {
        field: def.name,
        value: line.to_string(),
    })
}

/// Applies a typed answer to the form. Empty input changes nothing.
pub fn apply_answer(form: &mut MemoryForm, def: &FieldDef, line: &str) -> Result<(), FormError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }

    match def.kind {
        FieldKind::SingleChoice(options) => {
            let value = resolve(options, line).ok_or_else(|| FormError::UnknownOption {
                field: def.name,
                value: line.to_string(),
            })?;
            form.select(def.name, value)
        }
        FieldKind::MultiChoice(options) => {
            let chosen = resolve_all(def, options, line)?;
            for option in options {
                form.set_checked(def.name, option, chosen.contains(option))?;
            }
            Ok(())
        }
        FieldKind::TagPicker(options) => {
            let chosen = resolve_all(def, options, line)?;
            for option in options {
                form.set_tag(def.name, option, chosen.contains(option))?;
            }
            Ok(())
        }
        FieldKind::FreeText => form.type_text(def.name, line),
        FieldKind::Slider { .. } => form.slide(def.name, number(def, line)?),
        FieldKind::StarRating => form.rate(def.name, number(def, line)?),
    }
}

/// Status line shown next to the progress bar, e.g. `4 / 11 Experiencia de compra`.
pub fn status(view: &ViewModel, title: &str) -> String {
    match view.progress_label() {
        Some(label) => format!("{label} {title}"),
        None => title.to_string(),
    }
}

/// Navigation keys available on the current screen.
pub fn hint(view: &ViewModel) -> String {
    let primary = match view.primary {
        Some(PrimaryAction::Start) => Some("[Enter] comenzar"),
        Some(PrimaryAction::Next) => Some("[Enter] siguiente"),
        Some(PrimaryAction::Submit) => Some("[Enter] enviar"),
        None => None,
    };
    let prev = view.prev_enabled.then_some("[p] anterior");

    primary.into_iter().chain(prev).collect::<Vec<_>>().join("  ")
}

/// Navigation line typed after a step's questions.
pub fn parse_command(line: &str) -> Input {
    match line.trim().to_lowercase().as_str() {
        "" => Input::Key(Key::Enter),
        "n" | "next" | ">" => Input::Key(Key::ArrowRight),
        "p" | "prev" | "<" => Input::Key(Key::ArrowLeft),
        "s" | "submit" => Input::Click(Button::Submit),
        _ => Input::Key(Key::Other),
    }
}

#[cfg(test)]
mod tests {
    use questions::{AnswerRecord, AnswerValue, Step, catalog};
    use survey::{Form, SurveyController, collector};

    use super::*;

    fn def(name: &str) -> &'static FieldDef {
        catalog::field(name).unwrap()
    }

    fn flushed(form: &MemoryForm, step: u8) -> AnswerRecord {
        let mut answers = AnswerRecord::new();
        collector::flush(&form.controls(Step::new(step).unwrap()), &mut answers);
        answers
    }

    #[test]
    fn test_choice_by_number_or_name() {
        let mut form = MemoryForm::new();

        apply_answer(&mut form, def("q1"), "2").unwrap();
        assert_eq!(flushed(&form, 1).get("q1"), Some(&AnswerValue::from("1_6_meses")));

        apply_answer(&mut form, def("q1"), "mas_1_ano").unwrap();
        assert_eq!(flushed(&form, 1).get("q1"), Some(&AnswerValue::from("mas_1_ano")));

        assert!(apply_answer(&mut form, def("q1"), "9").is_err());
    }

    #[test]
    fn test_multi_choice_replaces_selection() {
        let mut form = MemoryForm::new();

        apply_answer(&mut form, def("q4"), "1, 3").unwrap();
        apply_answer(&mut form, def("q4"), "garantia").unwrap();

        assert_eq!(
            flushed(&form, 4).get("q4"),
            Some(&AnswerValue::List(vec!["garantia".to_string()]))
        );
    }

    #[test]
    fn test_tags_and_numbers() {
        let mut form = MemoryForm::new();

        apply_answer(&mut form, def("q8_tags"), "gaming,audio").unwrap();
        apply_answer(&mut form, def("q6"), "5").unwrap();
        apply_answer(&mut form, def("q7_slider"), "1").unwrap();

        assert_eq!(
            form.selected_tags("q8_tags"),
            vec!["gaming".to_string(), "audio".to_string()]
        );
        assert_eq!(flushed(&form, 6).get("q6"), Some(&AnswerValue::Number(5)));
        assert_eq!(flushed(&form, 7).get("q7_slider"), Some(&AnswerValue::Number(1)));
        assert!(apply_answer(&mut form, def("q6"), "muchas").is_err());
    }

    #[test]
    fn test_empty_line_changes_nothing() {
        let mut form = MemoryForm::new();
        apply_answer(&mut form, def("q2"), "precio justo").unwrap();
        apply_answer(&mut form, def("q2"), "   ").unwrap();

        assert_eq!(flushed(&form, 2).get("q2"), Some(&AnswerValue::from("precio justo")));
    }

    #[test]
    fn test_commands() {
        assert_eq!(parse_command(""), Input::Key(Key::Enter));
        assert_eq!(parse_command("N"), Input::Key(Key::ArrowRight));
        assert_eq!(parse_command("p"), Input::Key(Key::ArrowLeft));
        assert_eq!(parse_command("submit"), Input::Click(Button::Submit));
        assert_eq!(parse_command("?"), Input::Key(Key::Other));
    }

    #[test]
    fn test_hint_follows_view() {
        let mut controller = SurveyController::new();
        assert_eq!(hint(&controller.view()), "[Enter] comenzar");

        controller.start().unwrap();
        let view = controller.view();
        assert_eq!(hint(&view), "[Enter] siguiente");
        assert_eq!(status(&view, "Frecuencia"), "1 / 11 Frecuencia");

        let form = MemoryForm::new();
        while controller.state().phase() != survey::Phase::Step(Step::LAST) {
            controller.advance(&form).unwrap();
        }
        let view = controller.view();
        assert_eq!(hint(&view), "[Enter] enviar  [p] anterior");
        assert_eq!(status(&view, "Final"), "11 / 11 Final");
    }

    #[test]
    fn test_prompt_lists_options() {
        assert_eq!(
            prompt(def("q3")),
            "Experiencia de compra [1) excelente  2) buena  3) regular  4) mala]"
        );
    }
}
