use checkup_admin::cmd::i18n::resolved_catalog;
use checkup_questionnaire::{Condition, Question, TemplateForm, validate};

const CATALOG_LOCALES: &[&str] = &["en", "ru"];

fn assert_everywhere(key: &str) {
    for locale in CATALOG_LOCALES {
        assert!(
            resolved_catalog(locale).contains_key(key),
            "{locale} catalog is missing {key}"
        );
    }
}

#[test]
fn catalogs_share_the_same_keys() {
    let en: Vec<String> = resolved_catalog("en").into_keys().collect();
    let ru: Vec<String> = resolved_catalog("ru").into_keys().collect();
    assert_eq!(en, ru);
}

#[test]
fn every_validation_code_is_translated() {
    let mut orphan = Question::new_form(1);
    orphan.condition = Some(Condition::new("9", ["z"]));
    let mut second = Question::new_choice(2);
    second.variants.clear();
    let mut third = Question::new_choice(3);
    third.variants[1].value = "a".into();
    let broken = TemplateForm {
        test_key: "bad key!".into(),
        questions: vec![orphan, second, third],
        ..TemplateForm::default()
    };

    for form in [TemplateForm::default(), broken] {
        for error in validate(&form).errors {
            assert_everywhere(&format!("validation.{}", error.code));
        }
    }
}

#[test]
fn import_and_upload_failures_are_translated() {
    for code in [
        "import_unsupported_format",
        "import_too_large",
        "import_no_questions",
        "import_extraction_failed",
        "import_io",
    ] {
        assert_everywhere(&format!("cli.import.{code}"));
    }
    for code in ["upload_not_image", "upload_too_large", "upload_io"] {
        assert_everywhere(&format!("cli.upload.{code}"));
    }
}

#[test]
fn russian_catalog_is_actually_translated() {
    let en = resolved_catalog("en");
    let ru = resolved_catalog("ru");
    let untranslated: Vec<&String> = en
        .iter()
        .filter(|(key, value)| ru.get(*key) == Some(*value) && !key.starts_with("cli.edit.help"))
        .map(|(key, _)| key)
        .collect();
    assert!(untranslated.is_empty(), "untranslated: {untranslated:?}");
}
