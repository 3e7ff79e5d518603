#![allow(missing_docs)]

pub mod conditions;
pub mod draft;
pub mod editor;
pub mod import;
pub mod render;
pub mod spec;
pub mod validate;
pub mod visibility;

pub use conditions::{InvariantViolation, Mutation, apply, check_invariants, normalize};
pub use draft::{
    AuthEvent, AuthEvents, AutosaveTask, Clock, DraftError, DraftSession, DraftStore,
    FsDraftStore, MemoryDraftStore, MountOutcome, RestoreSource, SessionPhase, SharedSession,
    Subscription, SystemClock,
};
pub use editor::{
    Direction, EditorError, FormFieldPatch, QuestionField, QuestionnaireEditor, VariantField,
};
pub use import::{ImportError, ImportFormat, import_bytes, import_file};
pub use render::render_text;
pub use spec::{
    AnswerVariant, CheckupTemplate, Condition, Disclaimer, Doctor, FieldType, FormField,
    InputConfig, InputType, Question, QuestionKind, TemplateForm,
};
pub use validate::{ValidationError, ValidationResult, validate};
pub use visibility::{Answers, VisibilityMap, resolve_visibility, visible_questions};
