use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Supported question kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum QuestionKind {
    /// One answer out of the variants.
    #[serde(rename = "single")]
    Single,
    /// Checkbox style, any number of variants.
    #[serde(rename = "multi")]
    Multi,
    /// Multiple choice with a limited selection.
    #[serde(rename = "multiple")]
    Multiple,
    /// Structured input fields instead of variants.
    #[serde(rename = "form")]
    Form,
    #[serde(rename = "single-with-input")]
    SingleWithInput,
    #[serde(rename = "multiple-with-input")]
    MultipleWithInput,
}

impl QuestionKind {
    pub const ALL: [QuestionKind; 6] = [
        QuestionKind::Single,
        QuestionKind::Multi,
        QuestionKind::Multiple,
        QuestionKind::Form,
        QuestionKind::SingleWithInput,
        QuestionKind::MultipleWithInput,
    ];

    /// Every kind except `form` is answered by picking variants.
    pub fn is_choice(self) -> bool {
        !matches!(self, QuestionKind::Form)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::Single => "single",
            QuestionKind::Multi => "multi",
            QuestionKind::Multiple => "multiple",
            QuestionKind::Form => "form",
            QuestionKind::SingleWithInput => "single-with-input",
            QuestionKind::MultipleWithInput => "multiple-with-input",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }
}

/// Free-text input attached to a variant of a `*-with-input` question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InputConfig {
    pub label: String,
    pub name: String,
    #[serde(rename = "type")]
    pub input_type: InputType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    Text,
    Number,
}

/// One selectable answer option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerVariant {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_input: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_config: Option<InputConfig>,
}

impl AnswerVariant {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            has_input: None,
            input_config: None,
        }
    }

    /// Empty-label variant whose value is the letter for `position` (`a`, `b`, ...).
    pub fn lettered(position: usize) -> Self {
        Self::new("", variant_letter(position))
    }
}

/// Letter assigned to the `position`-th variant, counting from `a`.
///
/// Past `z` the sequence keeps walking the code points (`{`, `|`, ...), which is
/// what the dashboard has always stored.
pub fn variant_letter(position: usize) -> String {
    let code = 97u32.saturating_add(u32::try_from(position).unwrap_or(u32::MAX));
    char::from_u32(code)
        .map(String::from)
        .unwrap_or_else(|| format!("v{position}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number,
    Email,
    Tel,
}

/// Input field of a `form` question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub label: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl FormField {
    pub fn empty_text() -> Self {
        Self {
            label: String::new(),
            name: String::new(),
            field_type: FieldType::Text,
            required: None,
            placeholder: None,
            min: None,
            max: None,
        }
    }
}

/// "Show if" rule: the question is shown only when the answer captured for
/// `question_id` contains one of `values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub question_id: String,
    #[serde(default)]
    pub values: BTreeSet<String>,
}

impl Condition {
    pub fn new<I, V>(question_id: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            question_id: question_id.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Disclaimer {
    pub title: String,
    pub text: String,
}

/// One item of the questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// 1-based display position.
    pub index: usize,
    /// Positional identity, always `index.to_string()` once a mutation settles.
    pub id: String,
    #[serde(rename = "question", default)]
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<AnswerVariant>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FormField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<Disclaimer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_other_answer: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_no_selected_answer: bool,
}

impl Question {
    fn blank(index: usize, kind: QuestionKind) -> Self {
        Self {
            index,
            id: index.to_string(),
            text: String::new(),
            kind,
            variants: Vec::new(),
            fields: Vec::new(),
            condition: None,
            disclaimer: None,
            image: None,
            has_other_answer: false,
            has_no_selected_answer: false,
        }
    }

    /// Fresh single-choice question with the two variants `a` and `b`.
    pub fn new_choice(index: usize) -> Self {
        let mut question = Self::blank(index, QuestionKind::Single);
        question.variants = default_variants();
        question
    }

    /// Fresh form question with one empty text field.
    pub fn new_form(index: usize) -> Self {
        let mut question = Self::blank(index, QuestionKind::Form);
        question.fields = default_fields();
        question
    }

    /// Switches the kind, seeding the variant or field defaults the new kind
    /// needs when the question has none yet.
    pub fn with_defaults_for_kind(mut self, kind: QuestionKind) -> Self {
        self.kind = kind;
        if kind.is_choice() {
            if self.variants.is_empty() {
                self.variants = default_variants();
            }
        } else if self.fields.is_empty() {
            self.fields = default_fields();
        }
        self
    }

    /// Values of the question's variants, in order.
    pub fn variant_values(&self) -> impl Iterator<Item = &str> {
        self.variants.iter().map(|variant| variant.value.as_str())
    }

    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }
}

fn default_variants() -> Vec<AnswerVariant> {
    vec![AnswerVariant::lettered(0), AnswerVariant::lettered(1)]
}

fn default_fields() -> Vec<FormField> {
    vec![FormField::empty_text()]
}
