use std::fmt::Write as _;

use crate::spec::{Question, TemplateForm};

const PREVIEW_QUESTIONS: usize = 3;

/// Plain-text preview card of a template.
pub fn render_text(form: &TemplateForm) -> String {
    let mut out = String::new();
    let title = if form.title.trim().is_empty() {
        "(untitled)"
    } else {
        form.title.as_str()
    };
    let _ = writeln!(out, "{title}");
    if !form.test_key.is_empty() {
        let _ = writeln!(out, "Key: {}", form.test_key);
    }
    let status = if form.is_active { "active" } else { "inactive" };
    let _ = writeln!(out, "Status: {status}");
    let _ = writeln!(out, "Price: {}", price_label(form));

    if !form.carousel_title.is_empty() || !form.carousel_subtitle.is_empty() {
        let _ = writeln!(
            out,
            "Carousel: {} / {}",
            form.carousel_title, form.carousel_subtitle
        );
    }
    if !form.description.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", form.description);
    }

    let benefits: Vec<&str> = form
        .benefits
        .iter()
        .map(|benefit| benefit.trim())
        .filter(|benefit| !benefit.is_empty())
        .collect();
    if !benefits.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Benefits:");
        for benefit in benefits {
            let _ = writeln!(out, "  - {benefit}");
        }
    }

    if !form.doctors.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Doctors:");
        for doctor in &form.doctors {
            let _ = write!(out, "  - {} ({})", doctor.name, doctor.role);
            if !doctor.instagram.is_empty() {
                let _ = write!(out, " @{}", doctor.instagram.trim_start_matches('@'));
            }
            let _ = writeln!(out);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Questions: {}", form.questions.len());
    for question in form.questions.iter().take(PREVIEW_QUESTIONS) {
        let _ = writeln!(out, "  {}", question_line(question));
    }
    if form.questions.len() > PREVIEW_QUESTIONS {
        let _ = writeln!(
            out,
            "  ... and {} more",
            form.questions.len() - PREVIEW_QUESTIONS
        );
    }

    out
}

fn price_label(form: &TemplateForm) -> String {
    match (form.free, form.price) {
        (true, _) | (false, None) => "free".to_string(),
        (false, Some(price)) => format!("{price}"),
    }
}

fn question_line(question: &Question) -> String {
    let detail = if question.kind.is_choice() {
        format!("{} variants", question.variants.len())
    } else {
        format!("{} fields", question.fields.len())
    };
    let mut line = format!(
        "{}. {} [{}, {detail}]",
        question.index,
        question.text,
        question.kind.as_str()
    );
    if let Some(condition) = &question.condition {
        let _ = write!(line, " if #{}", condition.question_id);
    }
    line
}
