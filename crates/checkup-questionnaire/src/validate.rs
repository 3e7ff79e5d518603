use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::conditions::check_invariants;
use crate::spec::{Question, TemplateForm};

static TEST_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("test key pattern"));

/// One problem found in a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// JSON-pointer-ish location, e.g. `/questions/2/variants`.
    pub path: String,
    pub message: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn codes(&self) -> Vec<&str> {
        self.errors.iter().map(|error| error.code.as_str()).collect()
    }
}

/// Checks that `form` can be submitted.
///
/// One rule set covers both flows: the carousel title and subtitle are
/// required even for a new template, as the edit form requires them and a
/// created template is published through that form.
pub fn validate(form: &TemplateForm) -> ValidationResult {
    let mut errors = Vec::new();

    if form.test_key.trim().is_empty() {
        errors.push(error("/testKey", "test key is required", "test_key_required"));
    } else if !TEST_KEY.is_match(&form.test_key) {
        errors.push(error(
            "/testKey",
            "test key may only contain latin letters, digits, '_' and '-'",
            "test_key_format",
        ));
    }
    for (path, value, code) in [
        ("/title", &form.title, "title_required"),
        ("/carouselTitle", &form.carousel_title, "carousel_title_required"),
        ("/carouselSubtitle", &form.carousel_subtitle, "carousel_subtitle_required"),
        ("/description", &form.description, "description_required"),
    ] {
        if value.trim().is_empty() {
            errors.push(error(path, "value is required", code));
        }
    }
    if form.questions.is_empty() {
        errors.push(error(
            "/questions",
            "at least one question is required",
            "questions_required",
        ));
    }

    for (position, question) in form.questions.iter().enumerate() {
        validate_question(&form.questions, position, question, &mut errors);
    }

    if let Err(violation) = check_invariants(&form.questions) {
        errors.push(error("/questions", violation.to_string(), "question_structure"));
    }

    ValidationResult {
        valid: errors.is_empty(),
        errors,
    }
}

fn validate_question(
    questions: &[Question],
    position: usize,
    question: &Question,
    errors: &mut Vec<ValidationError>,
) {
    let base = format!("/questions/{position}");

    if question.text.trim().is_empty() {
        errors.push(error(
            format!("{base}/question"),
            "question text is required",
            "question_text_required",
        ));
    }

    if question.kind.is_choice() {
        let mut seen = BTreeSet::new();
        if question.variants.is_empty() {
            errors.push(error(
                format!("{base}/variants"),
                "choice question needs at least one variant",
                "variants_required",
            ));
        } else if let Some(duplicate) = question
            .variants
            .iter()
            .map(|variant| variant.value.as_str())
            .find(|value| !seen.insert(*value))
        {
            errors.push(error(
                format!("{base}/variants"),
                format!("variant value '{duplicate}' is used more than once"),
                "variant_value_duplicate",
            ));
        }
    } else if !question.fields.iter().any(|field| !field.name.trim().is_empty()) {
        errors.push(error(
            format!("{base}/fields"),
            "form question needs at least one named field",
            "fields_required",
        ));
    }

    let Some(condition) = &question.condition else {
        return;
    };
    let path = format!("{base}/condition");
    if condition.values.is_empty() {
        errors.push(error(
            path.clone(),
            "condition has no accepted values",
            "condition_values_required",
        ));
    }
    match questions[..position]
        .iter()
        .find(|candidate| candidate.id == condition.question_id)
    {
        None => errors.push(error(
            path,
            format!(
                "condition must reference an earlier question, got '{}'",
                condition.question_id
            ),
            "condition_target_invalid",
        )),
        Some(target) if !target.has_variants() => errors.push(error(
            path,
            format!("question {} has no variants to depend on", target.id),
            "condition_target_invalid",
        )),
        Some(target) => {
            let known: BTreeSet<&str> = target.variant_values().collect();
            if let Some(unknown) = condition
                .values
                .iter()
                .find(|value| !known.contains(value.as_str()))
            {
                errors.push(error(
                    path,
                    format!("'{unknown}' is not a variant of question {}", target.id),
                    "condition_value_unknown",
                ));
            }
        }
    }
}

fn error(path: impl Into<String>, message: impl Into<String>, code: &str) -> ValidationError {
    ValidationError {
        path: path.into(),
        message: message.into(),
        code: code.to_string(),
    }
}
