//! Line grammar for plain-text question lists.
//!
//! ```text
//! 1. Question text?
//! - first answer
//! - second answer
//!
//! 2) Next question
//! a. answer
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::spec::{AnswerVariant, Question, QuestionKind};

static QUESTION_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+[.)\-\s]+\s*(.+)").expect("question start pattern"));
static SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-=_]+$").expect("separator pattern"));
static BULLET_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[*\-•○●◦▪▸►>→·⁃‣⦿⦾]+\s*").expect("bullet prefix pattern")
});
static LETTER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Zа-яА-Я][.)]\s*").expect("letter prefix pattern"));

/// Question recognised in the source text, before it becomes a [`Question`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuestion {
    pub question: String,
    pub variants: Vec<String>,
}

/// Splits `text` into questions and their answer lines.
///
/// Lines before the first numbered line are ignored.
pub fn parse_questions(text: &str) -> Vec<ParsedQuestion> {
    let mut questions = Vec::new();
    let mut current: Option<ParsedQuestion> = None;

    for line in text.split('\n').map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(captures) = QUESTION_START.captures(line) {
            if let Some(done) = current.take() {
                questions.push(done);
            }
            let text = captures.get(1).map_or("", |m| m.as_str()).trim();
            current = Some(ParsedQuestion {
                question: text.to_string(),
                variants: Vec::new(),
            });
        } else if let Some(question) = current.as_mut() {
            if SEPARATOR.is_match(line) {
                continue;
            }
            let cleaned = clean_variant(line);
            if !cleaned.is_empty() {
                question.variants.push(cleaned);
            }
        }
    }

    if let Some(done) = current {
        questions.push(done);
    }
    questions.retain(|question| !question.question.is_empty());
    questions
}

/// Strips list markers (`* `, `- `, `• `, ...) and letter prefixes (`a)`, `Б.`).
pub fn clean_variant(line: &str) -> String {
    let without_bullet = BULLET_PREFIX.replace(line, "");
    let without_letter = LETTER_PREFIX.replace(&without_bullet, "");
    without_letter.trim().to_string()
}

/// Builds single-choice questions numbered from `start_index`.
///
/// A question without answer lines gets the `Да`/`Нет` pair.
pub fn into_questions(parsed: Vec<ParsedQuestion>, start_index: usize) -> Vec<Question> {
    parsed
        .into_iter()
        .enumerate()
        .map(|(offset, parsed)| {
            let index = start_index + offset;
            let mut question = Question::new_choice(index);
            question.kind = QuestionKind::Single;
            question.text = parsed.question;
            question.variants = if parsed.variants.is_empty() {
                vec![AnswerVariant::new("Да", "a"), AnswerVariant::new("Нет", "b")]
            } else {
                parsed
                    .variants
                    .into_iter()
                    .enumerate()
                    .map(|(position, label)| {
                        let mut variant = AnswerVariant::lettered(position);
                        variant.label = label;
                        variant
                    })
                    .collect()
            };
            question
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bullets_and_letters() {
        assert_eq!(clean_variant("• Да"), "Да");
        assert_eq!(clean_variant("-- Нет"), "Нет");
        assert_eq!(clean_variant("b) Maybe"), "Maybe");
        assert_eq!(clean_variant("Б. Иногда"), "Иногда");
        assert_eq!(clean_variant("→ a. nested"), "nested");
        assert_eq!(clean_variant("Plain answer"), "Plain answer");
    }

    #[test]
    fn numbered_line_variants_are_all_question_starts() {
        let parsed = parse_questions("1) One\n2 - Two\n3 Three");
        let texts: Vec<_> = parsed.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(texts, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn separators_and_preamble_are_ignored() {
        let parsed = parse_questions("Intro line\n1. Q\n-----\n===\nyes\n___\n");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].variants, vec!["yes"]);
    }

    #[test]
    fn crlf_input_is_trimmed() {
        let parsed = parse_questions("1. Q?\r\n* A\r\n* B\r\n");
        assert_eq!(parsed[0].question, "Q?");
        assert_eq!(parsed[0].variants, vec!["A", "B"]);
    }
}
