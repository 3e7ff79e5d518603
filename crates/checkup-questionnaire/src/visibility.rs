use std::collections::BTreeMap;

use crate::spec::Question;

pub type VisibilityMap = BTreeMap<String, bool>;

/// Captured answers: question id to the selected variant values.
pub type Answers = BTreeMap<String, Vec<String>>;

/// Resolves which questions a respondent sees given `answers`.
///
/// A question is visible when it has no condition, or when its dependency is
/// itself visible and one of the captured values for it is accepted. Hiding
/// cascades because dependencies always precede their dependents.
pub fn resolve_visibility(questions: &[Question], answers: &Answers) -> VisibilityMap {
    let mut map = VisibilityMap::new();

    for question in questions {
        let visible = match &question.condition {
            None => true,
            Some(condition) => {
                let dependency_visible = map
                    .get(&condition.question_id)
                    .copied()
                    .unwrap_or(false);
                dependency_visible
                    && answers.get(&condition.question_id).is_some_and(|captured| {
                        captured
                            .iter()
                            .any(|value| condition.values.contains(value))
                    })
            }
        };
        map.insert(question.id.clone(), visible);
    }

    map
}

/// Visible questions, in questionnaire order.
pub fn visible_questions<'a>(questions: &'a [Question], answers: &Answers) -> Vec<&'a Question> {
    let map = resolve_visibility(questions, answers);
    questions
        .iter()
        .filter(|question| map.get(&question.id).copied().unwrap_or(true))
        .collect()
}
