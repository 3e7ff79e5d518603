use checkup_questionnaire::{Condition, Doctor, Question, QuestionKind, TemplateForm, render_text};

#[test]
fn preview_lists_the_first_questions() {
    let mut questions: Vec<Question> = (1..=4)
        .map(|index| {
            let mut question = Question::new_choice(index);
            question.text = format!("Question {index}");
            question
        })
        .collect();
    questions[1] = questions[1].clone().with_defaults_for_kind(QuestionKind::Form);
    questions[2].condition = Some(Condition::new("1", ["a"]));

    let form = TemplateForm {
        test_key: "heart".into(),
        title: "Heart checkup".into(),
        description: "Ten questions about your heart".into(),
        benefits: vec!["Early signs".into(), String::new()],
        doctors: vec![Doctor {
            role: "Cardiologist".into(),
            name: "Anna".into(),
            instagram: "@anna.md".into(),
        }],
        price: Some(1490.0),
        questions,
        ..TemplateForm::default()
    };

    let text = render_text(&form);
    let expected = "\
Heart checkup
Key: heart
Status: active
Price: 1490

Ten questions about your heart

Benefits:
  - Early signs

Doctors:
  - Anna (Cardiologist) @anna.md

Questions: 4
  1. Question 1 [single, 2 variants]
  2. Question 2 [form, 1 fields]
  3. Question 3 [single, 2 variants] if #1
  ... and 1 more
";
    assert_eq!(text, expected);
}

#[test]
fn free_inactive_template() {
    let form = TemplateForm {
        free: true,
        price: Some(10.0),
        is_active: false,
        ..TemplateForm::default()
    };
    let text = render_text(&form);
    assert!(text.starts_with("(untitled)\nStatus: inactive\nPrice: free\n"));
    assert!(text.ends_with("Questions: 0\n"));
}
