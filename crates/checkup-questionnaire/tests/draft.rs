use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use checkup_questionnaire::draft::{
    AUTH_BACKUP_KEY, AUTOSAVE_PERIOD, AuthBackupEntry, AutosaveEntry, autosave_key, route_path,
};
use checkup_questionnaire::{
    AuthEvent, AuthEvents, AutosaveTask, Clock, Condition, DraftSession, DraftStore,
    FsDraftStore, MemoryDraftStore, MountOutcome, Question, QuestionField, RestoreSource,
    SessionPhase, TemplateForm,
};
use tempfile::TempDir;

const HOUR_MS: i64 = 60 * 60 * 1000;
const NOW: i64 = 1_760_000_000_000;

#[derive(Debug)]
struct TestClock(AtomicI64);

impl TestClock {
    fn at(millis: i64) -> Arc<Self> {
        Arc::new(Self(AtomicI64::new(millis)))
    }
}

impl Clock for TestClock {
    fn now_millis(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

fn sample_form(title: &str) -> TemplateForm {
    let mut form = TemplateForm {
        test_key: "heart_check".into(),
        title: title.into(),
        ..TemplateForm::default()
    };
    let mut first = Question::new_choice(1);
    first.text = "Smoker?".into();
    let mut second = Question::new_form(2);
    second.text = "Contacts".into();
    second.condition = Some(Condition::new("1", ["a"]));
    form.questions = vec![first, second];
    form
}

fn put<T: serde::Serialize>(store: &dyn DraftStore, key: &str, entry: &T) {
    store
        .save(key, &serde_json::to_string(entry).expect("encode"))
        .expect("save");
}

fn session(store: Arc<dyn DraftStore>, id: Option<&str>) -> DraftSession {
    DraftSession::new(store, TestClock::at(NOW), id.map(str::to_string))
}

#[test]
fn stale_autosave_is_discarded_and_removed() {
    let store = Arc::new(MemoryDraftStore::new());
    let key = autosave_key(Some("t1"));
    put(
        store.as_ref(),
        &key,
        &AutosaveEntry {
            data: sample_form("Old"),
            timestamp: NOW - 25 * HOUR_MS,
        },
    );

    let mut session = session(store.clone(), Some("t1"));
    assert_eq!(session.mount().expect("mount"), MountOutcome::NeedsAuthoritative);
    assert!(store.load(&key).expect("load").is_none());
    assert!(!session.is_data_loaded());
    assert_eq!(session.phase(), SessionPhase::Loading);
}

#[test]
fn fresh_autosave_is_restored() {
    let store = Arc::new(MemoryDraftStore::new());
    let saved_at = NOW - 2 * HOUR_MS;
    put(
        store.as_ref(),
        &autosave_key(Some("t1")),
        &AutosaveEntry {
            data: sample_form("Draft"),
            timestamp: saved_at,
        },
    );

    let mut session = session(store, Some("t1"));
    assert_eq!(
        session.mount().expect("mount"),
        MountOutcome::Restored(RestoreSource::Autosave { saved_at })
    );
    assert_eq!(session.form().title, "Draft");
    assert_eq!(session.phase(), SessionPhase::Editing);
}

#[test]
fn auth_backup_wins_over_autosave_for_the_same_route() {
    let store = Arc::new(MemoryDraftStore::new());
    put(
        store.as_ref(),
        &autosave_key(Some("t1")),
        &AutosaveEntry {
            data: sample_form("Autosaved"),
            timestamp: NOW - HOUR_MS / 2,
        },
    );
    put(
        store.as_ref(),
        AUTH_BACKUP_KEY,
        &AuthBackupEntry {
            data: sample_form("Backup"),
            path: route_path(Some("t1")),
            timestamp: NOW - 60_000,
        },
    );

    let mut session = session(store.clone(), Some("t1"));
    assert_eq!(
        session.mount().expect("mount"),
        MountOutcome::Restored(RestoreSource::AuthBackup)
    );
    assert_eq!(session.form().title, "Backup");
    assert!(store.load(AUTH_BACKUP_KEY).expect("load").is_none());
    assert!(store.load(&autosave_key(Some("t1"))).expect("load").is_some());
}

#[test]
fn auth_backup_for_another_route_is_left_alone() {
    let store = Arc::new(MemoryDraftStore::new());
    put(
        store.as_ref(),
        AUTH_BACKUP_KEY,
        &AuthBackupEntry {
            data: sample_form("Elsewhere"),
            path: route_path(Some("other")),
            timestamp: NOW - 60_000,
        },
    );

    let mut session = session(store.clone(), None);
    assert_eq!(session.mount().expect("mount"), MountOutcome::NeedsAuthoritative);
    assert!(store.load(AUTH_BACKUP_KEY).expect("load").is_some());
}

#[test]
fn expired_auth_backup_is_removed() {
    let store = Arc::new(MemoryDraftStore::new());
    put(
        store.as_ref(),
        AUTH_BACKUP_KEY,
        &AuthBackupEntry {
            data: sample_form("Late"),
            path: route_path(None),
            timestamp: NOW - 2 * HOUR_MS,
        },
    );

    let mut session = session(store.clone(), None);
    assert_eq!(session.mount().expect("mount"), MountOutcome::NeedsAuthoritative);
    assert!(store.load(AUTH_BACKUP_KEY).expect("load").is_none());
}

#[test]
fn corrupt_and_trivial_drafts_are_dropped() {
    let store = Arc::new(MemoryDraftStore::new());
    store.save(AUTH_BACKUP_KEY, "{not json").expect("save");
    put(
        store.as_ref(),
        &autosave_key(None),
        &AutosaveEntry {
            data: TemplateForm::default(),
            timestamp: NOW,
        },
    );

    let mut session = session(store.clone(), None);
    assert_eq!(session.mount().expect("mount"), MountOutcome::NeedsAuthoritative);
    assert!(store.keys().is_empty());
}

#[test]
fn autosave_waits_for_loaded_data_and_round_trips() {
    let store = Arc::new(MemoryDraftStore::new());
    let mut first = session(store.clone(), Some("t1"));
    assert_eq!(first.mount().expect("mount"), MountOutcome::NeedsAuthoritative);
    assert!(!first.autosave().expect("autosave"), "nothing loaded yet");

    let form = sample_form("Round trip");
    first.load_authoritative(form.clone());
    assert!(first.autosave().expect("autosave"));

    let mut second = session(store, Some("t1"));
    second.mount().expect("mount");
    assert_eq!(second.form().questions, form.questions);
    assert_eq!(second.form(), &form);
}

#[test]
fn discarding_a_restored_autosave_returns_to_loading() {
    let store = Arc::new(MemoryDraftStore::new());
    put(
        store.as_ref(),
        &autosave_key(Some("t1")),
        &AutosaveEntry {
            data: sample_form("Draft"),
            timestamp: NOW,
        },
    );
    let mut session = session(store.clone(), Some("t1"));
    session.mount().expect("mount");

    session.discard_restored().expect("discard");
    assert_eq!(session.phase(), SessionPhase::Loading);
    assert!(store.keys().is_empty());

    session.load_authoritative(sample_form("Server"));
    assert_eq!(session.form().title, "Server");
}

#[test]
fn auth_failure_backup_is_restored_after_relogin() {
    let store = Arc::new(MemoryDraftStore::new());
    let events = AuthEvents::new();
    let shared = Arc::new(Mutex::new(session(store.clone(), Some("t1"))));
    {
        let mut guard = shared.lock().expect("lock");
        guard.load_authoritative(sample_form("Before"));
        guard
            .editor()
            .set_question_field(0, QuestionField::Text("Edited".into()))
            .expect("edit");
    }

    let target = Arc::clone(&shared);
    let subscription = events.subscribe(move |event| {
        assert!(matches!(event, AuthEvent::SessionExpired { .. }));
        let guard = target.lock().expect("lock");
        guard.on_auth_failure().expect("backup");
    });
    assert_eq!(
        events.emit(&AuthEvent::SessionExpired {
            request_path: "/checkup-template/t1".into()
        }),
        1
    );
    drop(subscription);

    let mut restored = session(store, Some("t1"));
    assert_eq!(
        restored.mount().expect("mount"),
        MountOutcome::Restored(RestoreSource::AuthBackup)
    );
    assert_eq!(restored.form().questions[0].text, "Edited");
}

#[test]
fn successful_save_clears_both_slots() {
    let store = Arc::new(MemoryDraftStore::new());
    let mut session = session(store.clone(), None);
    session.load_authoritative(sample_form("New"));
    session.autosave().expect("autosave");
    session.on_auth_failure().expect("backup");
    assert_eq!(store.keys().len(), 2);

    session.on_save_success().expect("saved");
    assert!(store.keys().is_empty());
    assert_eq!(session.phase(), SessionPhase::Closed);
    assert!(!session.autosave().expect("closed"));
}

#[test]
fn file_store_survives_a_new_process() {
    let dir = TempDir::new().expect("tempdir");
    let store: Arc<dyn DraftStore> = Arc::new(FsDraftStore::new(dir.path().join("drafts")));

    let mut first = session(store.clone(), Some("abc"));
    first.load_authoritative(sample_form("On disk"));
    first.on_unload();
    assert!(dir.path().join("drafts/checkup-template-draft-abc.json").exists());

    let reopened: Arc<dyn DraftStore> = Arc::new(FsDraftStore::new(dir.path().join("drafts")));
    let mut second = session(reopened, Some("abc"));
    assert!(matches!(
        second.mount().expect("mount"),
        MountOutcome::Restored(RestoreSource::Autosave { .. })
    ));
    assert_eq!(second.form().title, "On disk");
}

#[tokio::test(start_paused = true)]
async fn autosave_task_ticks_until_cancelled() {
    let store = Arc::new(MemoryDraftStore::new());
    let clock = TestClock::at(NOW);
    let mut draft = DraftSession::new(store.clone(), clock.clone(), Some("t1".into()));
    draft.load_authoritative(sample_form("Timer"));
    let shared = Arc::new(Mutex::new(draft));

    let task = AutosaveTask::spawn(
        &tokio::runtime::Handle::current(),
        Arc::clone(&shared),
        AUTOSAVE_PERIOD,
    );

    tokio::time::sleep(AUTOSAVE_PERIOD - Duration::from_secs(1)).await;
    assert!(store.keys().is_empty(), "first write waits one full period");

    tokio::time::sleep(Duration::from_secs(2)).await;
    let raw = store
        .load(&autosave_key(Some("t1")))
        .expect("load")
        .expect("written");
    let entry: AutosaveEntry = serde_json::from_str(&raw).expect("decode");
    assert_eq!(entry.timestamp, NOW);

    task.cancel();
    assert!(task.is_cancelled());
    store.remove(&autosave_key(Some("t1"))).expect("remove");
    tokio::time::sleep(AUTOSAVE_PERIOD * 3).await;
    assert!(store.keys().is_empty(), "no writes after cancel");
    assert!(task.is_finished());
}
