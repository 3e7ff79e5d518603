//! Keeps "show if" references consistent while the question list mutates.
//!
//! Every structural change goes through [`apply`]: the mutation is performed on
//! a working list whose entries remember the id they had before the change,
//! positions are reassigned, and each condition is either rewritten to the new
//! id of its dependency or dropped when the dependency vanished or no longer
//! precedes the question.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::spec::Question;

/// Structural change applied to a question list.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Append(Question),
    AppendMany(Vec<Question>),
    Remove(usize),
    Swap(usize, usize),
    Duplicate(usize),
}

/// Working-list entry: the question plus the id it carried before the mutation.
/// Entries created by the mutation itself have no prior id.
#[derive(Debug)]
struct Slot {
    prior_id: Option<String>,
    question: Question,
}

/// Applies `mutation` and repairs indices, ids and conditions.
///
/// Out-of-range positions leave the list as it was (apart from normalisation);
/// the editor rejects them before they get here.
pub fn apply(questions: Vec<Question>, mutation: Mutation) -> Vec<Question> {
    let mut slots: Vec<Slot> = questions
        .into_iter()
        .map(|question| Slot {
            prior_id: Some(question.id.clone()),
            question,
        })
        .collect();

    match mutation {
        Mutation::Append(question) => slots.push(fresh(question)),
        Mutation::AppendMany(questions) => slots.extend(questions.into_iter().map(fresh)),
        Mutation::Remove(position) => {
            if position < slots.len() {
                let removed = slots.remove(position);
                drop_references_to(&mut slots, &removed.question.id);
            }
        }
        Mutation::Swap(a, b) => {
            if a < slots.len() && b < slots.len() {
                slots.swap(a, b);
            }
        }
        Mutation::Duplicate(position) => {
            if let Some(slot) = slots.get(position) {
                let copy = slot.question.clone();
                slots.push(fresh(copy));
            }
        }
    }

    reconcile(slots)
}

/// Reassigns positions on an already ordered list, treating the current ids as
/// the pre-mutation ids. Used to normalise lists loaded from outside.
pub fn normalize(questions: Vec<Question>) -> Vec<Question> {
    let slots = questions
        .into_iter()
        .map(|question| Slot {
            prior_id: Some(question.id.clone()),
            question,
        })
        .collect();
    reconcile(slots)
}

fn fresh(question: Question) -> Slot {
    Slot {
        prior_id: None,
        question,
    }
}

fn drop_references_to(slots: &mut [Slot], removed_id: &str) {
    for slot in slots.iter_mut() {
        if slot
            .question
            .condition
            .as_ref()
            .is_some_and(|condition| condition.question_id == removed_id)
        {
            debug!(
                question = %slot.question.id,
                dependency = removed_id,
                "dropping condition on removed question"
            );
            slot.question.condition = None;
        }
    }
}

fn reconcile(slots: Vec<Slot>) -> Vec<Question> {
    let mut prior_to_new: BTreeMap<String, usize> = BTreeMap::new();
    for (position, slot) in slots.iter().enumerate() {
        if let Some(prior) = &slot.prior_id {
            prior_to_new.entry(prior.clone()).or_insert(position + 1);
        }
    }

    let mut out = Vec::with_capacity(slots.len());
    for (position, slot) in slots.into_iter().enumerate() {
        let mut question = slot.question;
        question.index = position + 1;
        question.id = question.index.to_string();

        if let Some(mut condition) = question.condition.take() {
            match prior_to_new.get(&condition.question_id) {
                None => {
                    debug!(
                        question = %question.id,
                        dependency = %condition.question_id,
                        "dropping condition with unknown dependency"
                    );
                }
                Some(&dependency_index) if dependency_index >= question.index => {
                    debug!(
                        question = %question.id,
                        dependency = dependency_index,
                        "dropping condition that no longer points backwards"
                    );
                }
                Some(&dependency_index) => {
                    condition.question_id = dependency_index.to_string();
                    question.condition = Some(condition);
                }
            }
        }
        out.push(question);
    }
    out
}

/// Broken structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("question at position {position} has index {index}")]
    IndexMismatch { position: usize, index: usize },
    #[error("question {index} has id '{id}'")]
    IdMismatch { index: usize, id: String },
    #[error("question {index} depends on unknown question '{dependency}'")]
    DanglingCondition { index: usize, dependency: String },
    #[error("question {index} depends on question {dependency} which is not earlier")]
    ForwardCondition { index: usize, dependency: usize },
}

/// Checks index/id consistency and that every condition points strictly earlier.
pub fn check_invariants(questions: &[Question]) -> Result<(), InvariantViolation> {
    for (position, question) in questions.iter().enumerate() {
        if question.index != position + 1 {
            return Err(InvariantViolation::IndexMismatch {
                position,
                index: question.index,
            });
        }
        if question.id != question.index.to_string() {
            return Err(InvariantViolation::IdMismatch {
                index: question.index,
                id: question.id.clone(),
            });
        }
    }

    for question in questions {
        let Some(condition) = &question.condition else {
            continue;
        };
        let dependency = questions
            .iter()
            .find(|candidate| candidate.id == condition.question_id)
            .ok_or_else(|| InvariantViolation::DanglingCondition {
                index: question.index,
                dependency: condition.question_id.clone(),
            })?;
        if dependency.index >= question.index {
            return Err(InvariantViolation::ForwardCondition {
                index: question.index,
                dependency: dependency.index,
            });
        }
    }

    Ok(())
}
