//! Form controls as the collector sees them.
//!
//! A [`Form`] is whatever displays the questionnaire: the browser page, a
//! terminal prompt, or an in-memory [`MemoryForm`]. It only has to report the
//! current state of the controls on a step, plus the selected tags of the
//! secondary pickers.
use std::collections::{BTreeSet, HashMap};

use questions::{
    FieldKind, Step,
    catalog::{self, RATING_MAX, RATING_MIN},
};
use thiserror::Error;

/// Snapshot of one control on the active step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    SingleChoice {
        field: &'static str,
        selected: Option<String>,
    },
    /// Checked values in display order.
    MultiChoice {
        field: &'static str,
        checked: Vec<String>,
    },
    FreeText {
        field: &'static str,
        value: String,
    },
    Slider {
        field: &'static str,
        value: i64,
    },
    /// Star widget mirrored into a hidden input, `None` until clicked.
    HiddenRating {
        field: &'static str,
        value: Option<i64>,
    },
}

impl Control {
    pub fn field(&self) -> &'static str {
        match self {
            Control::SingleChoice { field, .. }
            | Control::MultiChoice { field, .. }
            | Control::FreeText { field, .. }
            | Control::Slider { field, .. }
            | Control::HiddenRating { field, .. } => field,
        }
    }
}

pub trait Form {
    /// Controls rendered on `step`. Tag pickers are not included.
    fn controls(&self, step: Step) -> Vec<Control>;

    /// Selected tags of a picker, in display order.
    fn selected_tags(&self, field: &'static str) -> Vec<String>;
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("Unknown field {0}")]
    UnknownField(String),

    #[error("Field {field} does not accept this input")]
    WrongKind { field: &'static str },

    #[error("{value:?} is not an option of {field}")]
    UnknownOption { field: &'static str, value: String },

    #[error("{value} is out of range for {field}")]
    OutOfRange { field: &'static str, value: i64 },
}

#[derive(Debug, Clone)]
enum Widget {
    Radio(Option<String>),
    Checkboxes(BTreeSet<String>),
    Text(String),
    Range(i64),
    Stars(Option<i64>),
    Tags(BTreeSet<String>),
}

/// Form state held in memory, built from the catalog.
///
/// Starts the way the page does: nothing selected, empty text, sliders at
/// their default.
#[derive(Debug, Clone)]
pub struct MemoryForm {
    widgets: HashMap<&'static str, Widget>,
}

impl Default for MemoryForm {
    fn default() -> Self {
        let widgets = catalog::fields()
            .map(|def| {
                let widget = match def.kind {
                    FieldKind::SingleChoice(_) => Widget::Radio(None),
                    FieldKind::MultiChoice(_) => Widget::Checkboxes(BTreeSet::new()),
                    FieldKind::FreeText => Widget::Text(String::new()),
                    FieldKind::Slider { default, .. } => Widget::Range(default),
                    FieldKind::StarRating => Widget::Stars(None),
                    FieldKind::TagPicker(_) => Widget::Tags(BTreeSet::new()),
                };

                (def.name, widget)
            })
            .collect();

        Self { widgets }
    }
}

impl MemoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    fn widget(&mut self, field: &str) -> Result<(&'static questions::FieldDef, &mut Widget), FormError> {
        let def = catalog::field(field).ok_or_else(|| FormError::UnknownField(field.to_string()))?;
        let widget = self
            .widgets
            .get_mut(def.name)
            .ok_or_else(|| FormError::UnknownField(field.to_string()))?;

        Ok((def, widget))
    }

    fn option(def: &questions::FieldDef, value: &str) -> Result<String, FormError> {
        if def.kind.options().contains(&value) {
            Ok(value.to_string())
        } else {
            Err(FormError::UnknownOption {
                field: def.name,
                value: value.to_string(),
            })
        }
    }

    /// Selects a radio option, replacing the previous one.
    pub fn select(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        let (def, widget) = self.widget(field)?;
        match widget {
            Widget::Radio(selected) => {
                *selected = Some(Self::option(def, value)?);
                Ok(())
            }
            _ => Err(FormError::WrongKind { field: def.name }),
        }
    }

    pub fn set_checked(&mut self, field: &str, value: &str, checked: bool) -> Result<(), FormError> {
        let (def, widget) = self.widget(field)?;
        match widget {
            Widget::Checkboxes(boxes) => {
                let value = Self::option(def, value)?;
                if checked {
                    boxes.insert(value);
                } else {
                    boxes.remove(&value);
                }
                Ok(())
            }
            _ => Err(FormError::WrongKind { field: def.name }),
        }
    }

    pub fn type_text(&mut self, field: &str, text: &str) -> Result<(), FormError> {
        let (def, widget) = self.widget(field)?;
        match widget {
            Widget::Text(value) => {
                *value = text.to_string();
                Ok(())
            }
            _ => Err(FormError::WrongKind { field: def.name }),
        }
    }

    pub fn slide(&mut self, field: &str, value: i64) -> Result<(), FormError> {
        let (def, widget) = self.widget(field)?;
        match (widget, def.kind) {
            (Widget::Range(current), FieldKind::Slider { min, max, .. }) => {
                if !(min..=max).contains(&value) {
                    return Err(FormError::OutOfRange {
                        field: def.name,
                        value,
                    });
                }
                *current = value;
                Ok(())
            }
            _ => Err(FormError::WrongKind { field: def.name }),
        }
    }

    /// Clicking a star fills the hidden input with its rating.
    pub fn rate(&mut self, field: &str, stars: i64) -> Result<(), FormError> {
        let (def, widget) = self.widget(field)?;
        match widget {
            Widget::Stars(rating) => {
                if !(RATING_MIN..=RATING_MAX).contains(&stars) {
                    return Err(FormError::OutOfRange {
                        field: def.name,
                        value: stars,
                    });
                }
                *rating = Some(stars);
                Ok(())
            }
            _ => Err(FormError::WrongKind { field: def.name }),
        }
    }

    pub fn toggle_tag(&mut self, field: &str, tag: &str) -> Result<(), FormError> {
        let (def, selected) = self.selected_tags_mut(field)?;
        if !selected.remove(tag) {
            selected.insert(Self::option(def, tag)?);
        }
        Ok(())
    }

    pub fn set_tag(&mut self, field: &str, tag: &str, on: bool) -> Result<(), FormError> {
        let (def, selected) = self.selected_tags_mut(field)?;
        let tag = Self::option(def, tag)?;
        if on {
            selected.insert(tag);
        } else {
            selected.remove(&tag);
        }
        Ok(())
    }

    fn selected_tags_mut(
        &mut self,
        field: &str,
    ) -> Result<(&'static questions::FieldDef, &mut BTreeSet<String>), FormError> {
        let (def, widget) = self.widget(field)?;
        match widget {
            Widget::Tags(selected) => Ok((def, selected)),
            _ => Err(FormError::WrongKind { field: def.name }),
        }
    }
}

/// Values of `set` in the order the options are displayed.
fn in_display_order(options: &[&str], set: &BTreeSet<String>) -> Vec<String> {
    options
        .iter()
        .filter(|option| set.contains(**option))
        .map(|option| option.to_string())
        .collect()
}

impl Form for MemoryForm {
    fn controls(&self, step: Step) -> Vec<Control> {
        step.def()
            .fields
            .iter()
            .filter_map(|def| {
                let field = def.name;
                let control = match self.widgets.get(field)? {
                    Widget::Radio(selected) => Control::SingleChoice {
                        field,
                        selected: selected.clone(),
                    },
                    Widget::Checkboxes(boxes) => Control::MultiChoice {
                        field,
                        checked: in_display_order(def.kind.options(), boxes),
                    },
                    Widget::Text(value) => Control::FreeText {
                        field,
                        value: value.clone(),
                    },
                    Widget::Range(value) => Control::Slider {
                        field,
                        value: *value,
                    },
                    Widget::Stars(value) => Control::HiddenRating {
                        field,
                        value: *value,
                    },
                    Widget::Tags(_) => return None,
                };

                Some(control)
            })
            .collect()
    }

    fn selected_tags(&self, field: &'static str) -> Vec<String> {
        match (self.widgets.get(field), catalog::field(field)) {
            (Some(Widget::Tags(selected)), Some(def)) => in_display_order(def.kind.options(), selected),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(index: u8) -> Step {
        Step::new(index).unwrap()
    }

    #[test]
    fn test_fresh_form_matches_page_defaults() {
        let form = MemoryForm::new();

        assert_eq!(
            form.controls(step(7)),
            vec![
                Control::Slider {
                    field: "q7_slider",
                    value: 3
                },
                Control::FreeText {
                    field: "q7",
                    value: String::new()
                },
            ]
        );
        assert_eq!(
            form.controls(step(6)),
            vec![Control::HiddenRating {
                field: "q6",
                value: None
            }]
        );
    }

    #[test]
    fn test_tag_pickers_are_not_step_controls() {
        let form = MemoryForm::new();

        let fields: Vec<_> = form.controls(step(2)).iter().map(Control::field).collect();
        assert_eq!(fields, vec!["q2"]);
    }

    #[test]
    fn test_checked_values_follow_display_order() {
        let mut form = MemoryForm::new();
        form.set_checked("q4", "garantia", true).unwrap();
        form.set_checked("q4", "productos", true).unwrap();
        form.set_checked("q4", "precios", true).unwrap();
        form.set_checked("q4", "precios", false).unwrap();

        assert_eq!(
            form.controls(step(4))[0],
            Control::MultiChoice {
                field: "q4",
                checked: vec!["productos".to_string(), "garantia".to_string()]
            }
        );
    }

    #[test]
    fn test_toggle_tag_twice_deselects() {
        let mut form = MemoryForm::new();
        form.toggle_tag("q9_tags", "moderna").unwrap();
        form.toggle_tag("q9_tags", "cercana").unwrap();
        form.toggle_tag("q9_tags", "moderna").unwrap();

        assert_eq!(form.selected_tags("q9_tags"), vec!["cercana".to_string()]);
    }

    #[test]
    fn test_rejects_invalid_input() {
        let mut form = MemoryForm::new();

        assert_eq!(
            form.select("q1", "siempre"),
            Err(FormError::UnknownOption {
                field: "q1",
                value: "siempre".to_string()
            })
        );
        assert_eq!(form.rate("q6", 6), Err(FormError::OutOfRange { field: "q6", value: 6 }));
        assert_eq!(form.slide("q7", 2), Err(FormError::WrongKind { field: "q7" }));
        assert_eq!(form.type_text("q12", "x"), Err(FormError::UnknownField("q12".to_string())));
    }
}
