//! # Survey page
//!
//! `GET /` is rendered from the question catalog, field names and options
//! included.
//!
//! Every step is a `<section data-step="N">`; the script served at
//! `/static/survey.js` shows one at a time and posts the answers.
use questions::{FieldDef, FieldKind, STEP_COUNT, Step};

pub const SCRIPT: &str = include_str!("../static/survey.js");

pub fn render() -> String {
    let mut html = String::with_capacity(16 * 1024);

    html.push_str(HEAD);

    html.push_str(
        r#"<section id="welcome" class="screen">
<h1>Encuesta Nanotronics</h1>
<p>Tu opinión nos ayuda a mejorar. Son 11 preguntas rápidas.</p>
<button type="button" id="start">Comenzar</button>
</section>
<form id="survey" class="screen" hidden>
<div class="progress"><div id="progress-bar"></div></div>
<p id="progress-label"></p>
"#,
    );

    for step in Step::all() {
        render_step(&mut html, step);
    }

    html.push_str(&format!(
        r#"<nav>
<button type="button" id="prev" disabled>Anterior</button>
<button type="button" id="next">Siguiente</button>
<button type="button" id="submit" hidden>Enviar</button>
</nav>
</form>
<section id="thanks" class="screen" hidden>
<h1>¡Gracias!</h1>
<p>Tus respuestas fueron registradas.</p>
</section>
<script>window.SURVEY_STEPS = {STEP_COUNT};</script>
<script src="/static/survey.js"></script>
</body>
</html>
"#
    ));

    html
}

fn render_step(html: &mut String, step: Step) {
    let def = step.def();

    html.push_str(&format!(
        "<section class=\"step\" data-step=\"{}\" hidden>\n<h2>{}</h2>\n",
        step.index(),
        escape(def.title)
    ));

    for field in def.fields {
        render_field(html, field);
    }

    html.push_str("</section>\n");
}

fn render_field(html: &mut String, field: &FieldDef) {
    let name = escape(field.name);
    let label = escape(field.label);

    html.push_str(&format!("<fieldset data-field=\"{name}\"><legend>{label}</legend>\n"));

    match field.kind {
        FieldKind::SingleChoice(options) => render_options(html, &name, "radio", options),
        FieldKind::MultiChoice(options) => render_options(html, &name, "checkbox", options),
        FieldKind::FreeText => {
            html.push_str(&format!("<textarea name=\"{name}\" rows=\"3\"></textarea>\n"));
        }
        FieldKind::Slider { min, max, default } => {
            html.push_str(&format!(
                "<input type=\"range\" name=\"{name}\" min=\"{min}\" max=\"{max}\" value=\"{default}\">\n"
            ));
        }
        FieldKind::StarRating => {
            html.push_str(r#"<div class="stars">"#);
            for star in 1..=5 {
                html.push_str(&format!(
                    r#"<button type="button" class="star" data-rating="{star}">★</button>"#
                ));
            }
            html.push_str(&format!("</div><input type=\"hidden\" name=\"{name}\" value=\"\">\n"));
        }
        FieldKind::TagPicker(options) => {
            html.push_str(&format!(r#"<div class="tags" data-tags="{name}">"#));
            for option in options {
                let value = escape(option);
                html.push_str(&format!(
                    r#"<button type="button" class="tag" data-value="{value}">{}</button>"#,
                    escape(&option.replace('_', " "))
                ));
            }
            html.push_str("</div>\n");
        }
    }

    html.push_str("</fieldset>\n");
}

fn render_options(html: &mut String, name: &str, input: &str, options: &[&str]) {
    for option in options {
        let value = escape(option);
        html.push_str(&format!(
            "<label><input type=\"{input}\" name=\"{name}\" value=\"{value}\"> {}</label>\n",
            escape(&option.replace('_', " "))
        ));
    }
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());

    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }

    escaped
}

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Encuesta Nanotronics</title>
<style>
body { font-family: system-ui, sans-serif; max-width: 640px; margin: 0 auto; padding: 1rem; }
.progress { height: 6px; background: #eee; border-radius: 3px; }
#progress-bar { height: 100%; width: 0; background: #0a7cff; border-radius: 3px; transition: width .2s; }
fieldset { border: 0; padding: 0; margin: 1rem 0; }
label { display: block; margin: .25rem 0; }
textarea { width: 100%; }
.star, .tag { font-size: 1rem; margin: .2rem; cursor: pointer; }
.star.active, .tag.selected { background: #0a7cff; color: #fff; }
nav { display: flex; justify-content: space-between; margin-top: 1rem; }
</style>
</head>
<body>
"#;

#[cfg(test)]
mod tests {
    use questions::catalog;

    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_page_has_every_step_and_field() {
        let html = render();

        for step in Step::all() {
            assert!(html.contains(&format!(r#"data-step="{}""#, step.index())));
        }
        for field in catalog::fields() {
            assert!(html.contains(&format!(r#"data-field="{}""#, field.name)), "{}", field.name);
        }
        assert!(html.contains(r#"value="1_6_meses""#));
        assert!(html.contains("/static/survey.js"));
        assert!(html.contains(r#"<input type="range" name="q7_slider" min="1" max="5" value="3">"#));
        assert!(html.contains("window.SURVEY_STEPS = 11;"));
    }

    #[test]
    fn test_script_locks_navigation_while_submitting() {
        assert!(SCRIPT.contains("submitting: false"));
        assert!(SCRIPT.contains("state.submitting = true;"));
        assert!(SCRIPT.contains("return state.submitting || state.finished;"));

        for function in ["advance", "retreat", "finalize"] {
            let guard = format!("function {function}() {{\n    if (locked()");
            assert!(SCRIPT.contains(&guard), "{guard}");
        }

        let set = SCRIPT.find("state.submitting = true;").unwrap();
        let fetch = SCRIPT.find("fetch(\"/api/submit\"").unwrap();
        assert!(set < fetch);
    }
}
