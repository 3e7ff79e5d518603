pub mod question;
pub mod template;

pub use question::{
    AnswerVariant, Condition, Disclaimer, FieldType, FormField, InputConfig, InputType, Question,
    QuestionKind, variant_letter,
};
pub use template::{CheckupTemplate, Doctor, TemplateForm};
