//! # Catalog
//!
//! The questionnaire is fixed at 11 steps. Each step owns one or more fields,
//! and every field has a [`FieldKind`] that decides how its control is read and
//! how a submitted value is validated.
//!
//! | Step | Fields |
//! |------|--------|
//! | 1 | `q1` |
//! | 2 | `q2`, `q2_tags` |
//! | 3 | `q3` |
//! | 4 | `q4`, `q4_why` |
//! | 5 | `q5`, `q5_comment` |
//! | 6 | `q6` |
//! | 7 | `q7_slider`, `q7` |
//! | 8 | `q8_tags`, `q8` |
//! | 9 | `q9`, `q9_tags` |
//! | 10 | `q10_trust`, `q10` |
//! | 11 | `q11`, `q11_other` |
use std::fmt;

use serde::{Deserialize, Serialize};

pub const STEP_COUNT: u8 = 11;

/// Client-side submission timestamp, stamped when the survey is finalized.
pub const TIMESTAMP_FIELD: &str = "timestamp";

pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 5;

/// Ordinal position of a screen, always within `1..=STEP_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Step(u8);

impl Step {
    pub const FIRST: Step = Step(1);
    pub const LAST: Step = Step(STEP_COUNT);

    pub fn new(index: u8) -> Option<Self> {
        (1..=STEP_COUNT).contains(&index).then_some(Self(index))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn is_first(self) -> bool {
        self == Self::FIRST
    }

    pub fn is_last(self) -> bool {
        self == Self::LAST
    }

    pub fn next(self) -> Option<Self> {
        Self::new(self.0 + 1)
    }

    pub fn prev(self) -> Option<Self> {
        Self::new(self.0.checked_sub(1)?)
    }

    /// Fraction of the survey reached, `current / STEP_COUNT`.
    pub fn progress(self) -> f32 {
        f32::from(self.0) / f32::from(STEP_COUNT)
    }

    pub fn all() -> impl Iterator<Item = Step> {
        (1..=STEP_COUNT).map(Step)
    }

    pub fn def(self) -> &'static StepDef {
        &STEPS[usize::from(self.0 - 1)]
    }
}

impl TryFrom<u8> for Step {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Step::new(value).ok_or_else(|| format!("step {value} is outside 1..={STEP_COUNT}"))
    }
}

impl From<Step> for u8 {
    fn from(step: Step) -> Self {
        step.0
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, STEP_COUNT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    SingleChoice(&'static [&'static str]),
    MultiChoice(&'static [&'static str]),
    FreeText,
    /// Numeric range input, always has a value.
    Slider { min: i64, max: i64, default: i64 },
    /// Star widget backed by a hidden input, empty until a star is clicked.
    StarRating,
    /// Word/tag picker outside the regular form controls.
    TagPicker(&'static [&'static str]),
}

impl FieldKind {
    pub fn options(self) -> &'static [&'static str] {
        match self {
            FieldKind::SingleChoice(options)
            | FieldKind::MultiChoice(options)
            | FieldKind::TagPicker(options) => options,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

#[derive(Debug)]
pub struct StepDef {
    pub title: &'static str,
    pub fields: &'static [FieldDef],
}

pub const TIME_KNOWN: &[&str] = &["menos_1_mes", "1_6_meses", "6_12_meses", "mas_1_ano"];
pub const EXPERIENCE: &[&str] = &["excelente", "buena", "regular", "mala"];
pub const FIRST_THOUGHT_TAGS: &[&str] = &[
    "tecnologia",
    "calidad",
    "innovacion",
    "precio",
    "confianza",
    "variedad",
];
pub const LIKES: &[&str] = &[
    "productos",
    "atencion",
    "precios",
    "ubicacion",
    "garantia",
    "variedad",
];
pub const IMPROVEMENTS: &[&str] = &[
    "precios",
    "stock",
    "tiempos_entrega",
    "atencion",
    "redes_sociales",
    "promociones",
];
pub const DESIRED_PRODUCTS: &[&str] = &[
    "smartphones",
    "laptops",
    "gaming",
    "audio",
    "accesorios",
    "smart_home",
];
pub const PERSONALITY_TAGS: &[&str] = &[
    "moderna",
    "confiable",
    "cercana",
    "innovadora",
    "profesional",
    "divertida",
];
pub const COMMUNICATE: &[&str] = &[
    "novedades",
    "promociones",
    "tutoriales",
    "garantias",
    "eventos",
];

pub static STEPS: [StepDef; STEP_COUNT as usize] = [
    StepDef {
        title: "¿Hace cuánto conoces Nanotronics?",
        fields: &[FieldDef {
            name: "q1",
            label: "Tiempo conociéndonos",
            kind: FieldKind::SingleChoice(TIME_KNOWN),
        }],
    },
    StepDef {
        title: "¿Qué es lo primero que piensas al escuchar Nanotronics?",
        fields: &[
            FieldDef {
                name: "q2",
                label: "Primera impresión",
                kind: FieldKind::FreeText,
            },
            FieldDef {
                name: "q2_tags",
                label: "Palabras asociadas",
                kind: FieldKind::TagPicker(FIRST_THOUGHT_TAGS),
            },
        ],
    },
    StepDef {
        title: "¿Cómo fue tu experiencia comprando con nosotros?",
        fields: &[FieldDef {
            name: "q3",
            label: "Experiencia de compra",
            kind: FieldKind::SingleChoice(EXPERIENCE),
        }],
    },
    StepDef {
        title: "¿Qué te gusta más de Nanotronics?",
        fields: &[
            FieldDef {
                name: "q4",
                label: "Lo que más te gusta",
                kind: FieldKind::MultiChoice(LIKES),
            },
            FieldDef {
                name: "q4_why",
                label: "¿Por qué?",
                kind: FieldKind::FreeText,
            },
        ],
    },
    StepDef {
        title: "¿Qué podríamos mejorar?",
        fields: &[
            FieldDef {
                name: "q5",
                label: "Aspectos a mejorar",
                kind: FieldKind::MultiChoice(IMPROVEMENTS),
            },
            FieldDef {
                name: "q5_comment",
                label: "Comentario",
                kind: FieldKind::FreeText,
            },
        ],
    },
    StepDef {
        title: "¿Cómo calificarías la atención del personal?",
        fields: &[FieldDef {
            name: "q6",
            label: "Atención del personal",
            kind: FieldKind::StarRating,
        }],
    },
    StepDef {
        title: "¿Sientes que nuestros productos están actualizados?",
        fields: &[
            FieldDef {
                name: "q7_slider",
                label: "Productos actualizados",
                kind: FieldKind::Slider {
                    min: RATING_MIN,
                    max: RATING_MAX,
                    default: 3,
                },
            },
            FieldDef {
                name: "q7",
                label: "Comentario",
                kind: FieldKind::FreeText,
            },
        ],
    },
    StepDef {
        title: "¿Qué productos te gustaría encontrar?",
        fields: &[
            FieldDef {
                name: "q8_tags",
                label: "Productos deseados",
                kind: FieldKind::TagPicker(DESIRED_PRODUCTS),
            },
            FieldDef {
                name: "q8",
                label: "Otros",
                kind: FieldKind::FreeText,
            },
        ],
    },
    StepDef {
        title: "Si Nanotronics fuera una persona, ¿cómo sería?",
        fields: &[
            FieldDef {
                name: "q9",
                label: "Personalidad de la marca",
                kind: FieldKind::FreeText,
            },
            FieldDef {
                name: "q9_tags",
                label: "Rasgos",
                kind: FieldKind::TagPicker(PERSONALITY_TAGS),
            },
        ],
    },
    StepDef {
        title: "¿Cuánto confías en Nanotronics?",
        fields: &[
            FieldDef {
                name: "q10_trust",
                label: "Nivel de confianza",
                kind: FieldKind::StarRating,
            },
            FieldDef {
                name: "q10",
                label: "Comentario",
                kind: FieldKind::FreeText,
            },
        ],
    },
    StepDef {
        title: "¿Qué te gustaría que comuniquemos más?",
        fields: &[
            FieldDef {
                name: "q11",
                label: "Temas",
                kind: FieldKind::MultiChoice(COMMUNICATE),
            },
            FieldDef {
                name: "q11_other",
                label: "Otros",
                kind: FieldKind::FreeText,
            },
        ],
    },
];

pub fn fields() -> impl Iterator<Item = &'static FieldDef> {
    STEPS.iter().flat_map(|step| step.fields.iter())
}

pub fn field(name: &str) -> Option<&'static FieldDef> {
    fields().find(|field| field.name == name)
}

/// Fields read by the secondary tag/word pickers rather than the step collector.
pub fn tag_fields() -> impl Iterator<Item = &'static FieldDef> {
    fields().filter(|field| matches!(field.kind, FieldKind::TagPicker(_)))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_step_bounds() {
        assert!(Step::new(0).is_none());
        assert!(Step::new(STEP_COUNT + 1).is_none());
        assert_eq!(Step::FIRST.prev(), None);
        assert_eq!(Step::LAST.next(), None);
        assert_eq!(Step::FIRST.next(), Step::new(2));
    }

    #[test]
    fn test_progress() {
        assert!((Step::LAST.progress() - 1.0).abs() < f32::EPSILON);
        assert!((Step::FIRST.progress() - 1.0 / 11.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_field_names_unique() {
        let names: Vec<_> = fields().map(|field| field.name).collect();
        let unique: HashSet<_> = names.iter().collect();

        assert_eq!(names.len(), unique.len());
        assert!(!names.contains(&TIMESTAMP_FIELD));
    }

    #[test]
    fn test_every_step_has_fields() {
        assert_eq!(Step::all().count(), usize::from(STEP_COUNT));
        assert!(Step::all().all(|step| !step.def().fields.is_empty()));
    }

    #[test]
    fn test_tag_fields() {
        let tags: Vec<_> = tag_fields().map(|field| field.name).collect();
        assert_eq!(tags, ["q2_tags", "q8_tags", "q9_tags"]);
    }
}
