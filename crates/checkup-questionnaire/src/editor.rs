use std::collections::BTreeSet;

use thiserror::Error;

use crate::conditions::{self, Mutation};
use crate::spec::{
    AnswerVariant, Condition, Disclaimer, FieldType, FormField, InputConfig, Question,
    QuestionKind,
};

/// Direction for [`QuestionnaireEditor::move_question`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Single-field update of a question.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionField {
    Text(String),
    /// Re-seeds variants or fields for the new kind when the question has none.
    Kind(QuestionKind),
    Image(Option<String>),
    Disclaimer(Option<Disclaimer>),
    HasOtherAnswer(bool),
    HasNoSelectedAnswer(bool),
}

/// Single-field update of an answer variant.
#[derive(Debug, Clone, PartialEq)]
pub enum VariantField {
    Label(String),
    Value(String),
    HasInput(bool),
    InputConfig(Option<InputConfig>),
}

/// Single-field update of a form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FormFieldPatch {
    Label(String),
    Name(String),
    FieldType(FieldType),
    Required(bool),
    Placeholder(Option<String>),
    Min(Option<f64>),
    Max(Option<f64>),
}

/// Rejected editor call. The list is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("no question at position {position} (list has {len})")]
    QuestionOutOfRange { position: usize, len: usize },
    #[error("question {question} has no variant at position {variant}")]
    VariantOutOfRange { question: usize, variant: usize },
    #[error("question {question} has no form field at position {field}")]
    FieldOutOfRange { question: usize, field: usize },
    #[error("question {question} must keep at least one answer variant")]
    LastVariant { question: usize },
    #[error("question {question} cannot depend on '{dependency}': it is not an earlier question")]
    DependencyNotEarlier { question: usize, dependency: String },
    #[error("question {question} cannot depend on '{dependency}': it has no answer variants")]
    DependencyWithoutVariants { question: usize, dependency: String },
    #[error("'{value}' is not an answer value of question '{dependency}'")]
    UnknownConditionValue { dependency: String, value: String },
}

/// Editing operations over an owned question list.
///
/// Every structural operation runs the condition maintainer before returning,
/// so callers always observe a list whose indices, ids and conditions are
/// consistent.
#[derive(Debug)]
pub struct QuestionnaireEditor<'a> {
    questions: &'a mut Vec<Question>,
}

impl<'a> QuestionnaireEditor<'a> {
    pub fn new(questions: &'a mut Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn questions(&self) -> &[Question] {
        self.questions.as_slice()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    fn mutate(&mut self, mutation: Mutation) -> &[Question] {
        let current = std::mem::take(self.questions);
        *self.questions = conditions::apply(current, mutation);
        self.questions.as_slice()
    }

    fn check_position(&self, position: usize) -> Result<(), EditorError> {
        if position < self.questions.len() {
            Ok(())
        } else {
            Err(EditorError::QuestionOutOfRange {
                position,
                len: self.questions.len(),
            })
        }
    }

    fn question_mut(&mut self, position: usize) -> Result<&mut Question, EditorError> {
        let len = self.questions.len();
        self.questions
            .get_mut(position)
            .ok_or(EditorError::QuestionOutOfRange { position, len })
    }

    /// Appends a default single-choice question.
    pub fn add_question(&mut self) -> &[Question] {
        let next = self.questions.len() + 1;
        self.mutate(Mutation::Append(Question::new_choice(next)))
    }

    pub fn remove_question(&mut self, position: usize) -> Result<&[Question], EditorError> {
        self.check_position(position)?;
        Ok(self.mutate(Mutation::Remove(position)))
    }

    /// Appends a deep copy of the question at `position`.
    pub fn duplicate_question(&mut self, position: usize) -> Result<&[Question], EditorError> {
        self.check_position(position)?;
        Ok(self.mutate(Mutation::Duplicate(position)))
    }

    /// Swaps with the neighbour in `direction`; a no-op at the boundary.
    pub fn move_question(
        &mut self,
        position: usize,
        direction: Direction,
    ) -> Result<&[Question], EditorError> {
        self.check_position(position)?;
        let target = match direction {
            Direction::Up => position.checked_sub(1),
            Direction::Down => Some(position + 1).filter(|next| *next < self.questions.len()),
        };
        match target {
            Some(target) => Ok(self.mutate(Mutation::Swap(position, target))),
            None => Ok(self.questions.as_slice()),
        }
    }

    /// Appends already-built questions (bulk import) after the existing ones.
    pub fn import_questions(&mut self, imported: Vec<Question>) -> &[Question] {
        self.mutate(Mutation::AppendMany(imported))
    }

    pub fn set_question_field(
        &mut self,
        position: usize,
        field: QuestionField,
    ) -> Result<&[Question], EditorError> {
        let question = self.question_mut(position)?;
        match field {
            QuestionField::Text(text) => question.text = text,
            QuestionField::Kind(kind) => {
                let current = question.clone();
                *question = current.with_defaults_for_kind(kind);
            }
            QuestionField::Image(image) => question.image = image,
            QuestionField::Disclaimer(disclaimer) => question.disclaimer = disclaimer,
            QuestionField::HasOtherAnswer(flag) => question.has_other_answer = flag,
            QuestionField::HasNoSelectedAnswer(flag) => question.has_no_selected_answer = flag,
        }
        Ok(self.questions.as_slice())
    }

    /// Appends a variant whose value is the next letter after the current count.
    pub fn add_answer_variant(&mut self, position: usize) -> Result<&[Question], EditorError> {
        let question = self.question_mut(position)?;
        let next = AnswerVariant::lettered(question.variants.len());
        question.variants.push(next);
        Ok(self.questions.as_slice())
    }

    pub fn remove_answer_variant(
        &mut self,
        position: usize,
        variant: usize,
    ) -> Result<&[Question], EditorError> {
        let question = self.question_mut(position)?;
        if variant >= question.variants.len() {
            return Err(EditorError::VariantOutOfRange {
                question: position,
                variant,
            });
        }
        if question.variants.len() == 1 {
            return Err(EditorError::LastVariant { question: position });
        }
        question.variants.remove(variant);
        Ok(self.questions.as_slice())
    }

    pub fn update_answer_variant(
        &mut self,
        position: usize,
        variant: usize,
        field: VariantField,
    ) -> Result<&[Question], EditorError> {
        let question = self.question_mut(position)?;
        let target = question
            .variants
            .get_mut(variant)
            .ok_or(EditorError::VariantOutOfRange {
                question: position,
                variant,
            })?;
        match field {
            VariantField::Label(label) => target.label = label,
            VariantField::Value(value) => target.value = value,
            VariantField::HasInput(flag) => target.has_input = Some(flag),
            VariantField::InputConfig(config) => target.input_config = config,
        }
        Ok(self.questions.as_slice())
    }

    pub fn add_form_field(&mut self, position: usize) -> Result<&[Question], EditorError> {
        let question = self.question_mut(position)?;
        question.fields.push(FormField::empty_text());
        Ok(self.questions.as_slice())
    }

    pub fn remove_form_field(
        &mut self,
        position: usize,
        field: usize,
    ) -> Result<&[Question], EditorError> {
        let question = self.question_mut(position)?;
        if field >= question.fields.len() {
            return Err(EditorError::FieldOutOfRange {
                question: position,
                field,
            });
        }
        question.fields.remove(field);
        Ok(self.questions.as_slice())
    }

    pub fn update_form_field(
        &mut self,
        position: usize,
        field: usize,
        patch: FormFieldPatch,
    ) -> Result<&[Question], EditorError> {
        let question = self.question_mut(position)?;
        let target = question
            .fields
            .get_mut(field)
            .ok_or(EditorError::FieldOutOfRange {
                question: position,
                field,
            })?;
        match patch {
            FormFieldPatch::Label(label) => target.label = label,
            FormFieldPatch::Name(name) => target.name = name,
            FormFieldPatch::FieldType(field_type) => target.field_type = field_type,
            FormFieldPatch::Required(flag) => target.required = Some(flag),
            FormFieldPatch::Placeholder(placeholder) => target.placeholder = placeholder,
            FormFieldPatch::Min(min) => target.min = min,
            FormFieldPatch::Max(max) => target.max = max,
        }
        Ok(self.questions.as_slice())
    }

    /// Makes the question at `position` depend on an earlier question with variants.
    ///
    /// `values` must be variant values of the dependency; an empty set is
    /// accepted while editing and reported by validation at save time.
    pub fn set_condition<I, V>(
        &mut self,
        position: usize,
        dependency_id: &str,
        values: I,
    ) -> Result<&[Question], EditorError>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.check_position(position)?;
        let own_index = self.questions[position].index;
        let dependency = self
            .questions
            .iter()
            .find(|candidate| candidate.id == dependency_id)
            .filter(|candidate| candidate.index < own_index)
            .ok_or_else(|| EditorError::DependencyNotEarlier {
                question: position,
                dependency: dependency_id.to_string(),
            })?;
        if !dependency.has_variants() {
            return Err(EditorError::DependencyWithoutVariants {
                question: position,
                dependency: dependency_id.to_string(),
            });
        }

        let known: BTreeSet<&str> = dependency.variant_values().collect();
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if let Some(unknown) = values.iter().find(|value| !known.contains(value.as_str())) {
            return Err(EditorError::UnknownConditionValue {
                dependency: dependency_id.to_string(),
                value: unknown.clone(),
            });
        }

        self.questions[position].condition = Some(Condition {
            question_id: dependency_id.to_string(),
            values,
        });
        Ok(self.questions.as_slice())
    }

    pub fn clear_condition(&mut self, position: usize) -> Result<&[Question], EditorError> {
        self.question_mut(position)?.condition = None;
        Ok(self.questions.as_slice())
    }
}
