use checkup_questionnaire::{
    Condition, Question, QuestionKind, QuestionnaireEditor, TemplateForm, validate,
};
use insta::assert_json_snapshot;

fn complete_form() -> TemplateForm {
    let mut first = Question::new_choice(1);
    first.text = "Do you smoke?".into();
    first.variants[0].label = "Yes".into();
    first.variants[1].label = "No".into();
    let mut second = Question::new_form(2);
    second.text = "How many per day?".into();
    second.fields[0].name = "per_day".into();
    second.condition = Some(Condition::new("1", ["a"]));

    TemplateForm {
        test_key: "smoking-2024".into(),
        title: "Smoking checkup".into(),
        carousel_title: "Lungs".into(),
        carousel_subtitle: "Five minutes".into(),
        description: "Short survey".into(),
        questions: vec![first, second],
        ..TemplateForm::default()
    }
}

#[test]
fn complete_template_is_valid() {
    let result = validate(&complete_form());
    assert!(result.valid, "{:?}", result.errors);
    assert!(result.errors.is_empty());
}

#[test]
fn empty_template_reports_every_required_field() {
    let result = validate(&TemplateForm::default());
    assert!(!result.valid);
    assert_json_snapshot!(result.codes(), @r#"
    [
      "test_key_required",
      "title_required",
      "carousel_title_required",
      "carousel_subtitle_required",
      "description_required",
      "questions_required"
    ]
    "#);
}

#[test]
fn test_key_must_be_latin_word_characters() {
    let mut form = complete_form();
    form.test_key = "чекап 1".into();
    let result = validate(&form);
    assert_eq!(result.codes(), vec!["test_key_format"]);
    assert_eq!(result.errors[0].path, "/testKey");
}

#[test]
fn question_level_problems_carry_their_path() {
    let mut form = complete_form();
    form.questions[0].text = "  ".into();
    form.questions[1].fields[0].name.clear();
    form.questions[1].condition = Some(Condition::new("1", Vec::<String>::new()));

    let result = validate(&form);
    assert!(!result.valid);
    let pairs: Vec<(&str, &str)> = result
        .errors
        .iter()
        .map(|error| (error.path.as_str(), error.code.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("/questions/0/question", "question_text_required"),
            ("/questions/1/fields", "fields_required"),
            ("/questions/1/condition", "condition_values_required"),
        ]
    );
}

#[test]
fn broken_references_are_reported() {
    let mut form = complete_form();
    form.questions[0].kind = QuestionKind::Form;
    form.questions[0].variants.clear();
    form.questions[0].fields = Question::new_form(1).fields;
    form.questions[0].fields[0].name = "x".into();

    let result = validate(&form);
    assert_eq!(result.codes(), vec!["condition_target_invalid"]);

    let mut form = complete_form();
    form.questions[1].condition = Some(Condition::new("2", ["a"]));
    let codes = validate(&form).codes().join(",");
    assert!(codes.contains("condition_target_invalid"), "{codes}");
    assert!(codes.contains("question_structure"), "{codes}");

    let mut form = complete_form();
    form.questions[1].condition = Some(Condition::new("1", ["zzz"]));
    assert_eq!(validate(&form).codes(), vec!["condition_value_unknown"]);
}

#[test]
fn reused_variant_letters_are_caught_before_saving() {
    let mut form = complete_form();
    // [a, b] -> [b] -> [b, b]: the new variant takes the letter for its position.
    let mut editor = QuestionnaireEditor::new(&mut form.questions);
    editor.remove_answer_variant(0, 0).expect("remove a");
    editor.add_answer_variant(0).expect("add variant");
    form.questions[1].condition = Some(Condition::new("1", ["b"]));

    let result = validate(&form);
    assert_eq!(result.codes(), vec!["variant_value_duplicate"]);
    assert_eq!(result.errors[0].path, "/questions/0/variants");
}
