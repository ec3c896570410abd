use promptzapp::api::PromptzApi;
use promptzapp::config::PromptzConfig;
use promptzapp::error::ErrorKind;
use promptzapp::model::{Category, LibraryDocument, PromptDraft, Settings};
use promptzapp::selection::WidgetState;
use promptzapp::store::fs_backend::{FsBackend, LIBRARY_FILE, WIDGET_FILE};
use promptzapp::store::PersistenceBridge;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn setup() -> (TempDir, FsBackend) {
    let dir = TempDir::new().unwrap();
    let backend = FsBackend::new(dir.path().join("data"));
    (dir, backend)
}

fn open(root: &Path) -> PromptzApi<FsBackend> {
    PromptzApi::load(FsBackend::new(root.to_path_buf()), &PromptzConfig::default()).unwrap()
}

fn texts(api: &PromptzApi<FsBackend>, path: &str) -> Vec<String> {
    api.library()
        .category(path)
        .map(|c| c.prompts.iter().map(|p| p.prompt.clone()).collect())
        .unwrap_or_default()
}

fn assert_no_tmp_files(root: &Path) {
    for entry in fs::read_dir(root).unwrap() {
        let path = entry.unwrap().path();
        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
    }
}

#[test]
fn test_empty_dir_loads_nothing() {
    let (_dir, backend) = setup();
    assert!(backend.load_library().unwrap().is_none());
    assert!(backend.load_widget_state().unwrap().is_none());
}

#[test]
fn test_save_creates_dir_and_round_trips() {
    let (_dir, backend) = setup();
    let document = LibraryDocument {
        categories: vec![Category::new("default"), Category::new("art")],
        settings: Settings::default(),
    };

    backend.save_library(&document).unwrap();

    assert!(backend.library_path().exists());
    assert_eq!(backend.load_library().unwrap(), Some(document));
    assert_no_tmp_files(backend.root());
}

#[test]
fn test_widget_state_uses_camel_case_on_disk() {
    let (_dir, backend) = setup();
    let mut state = WidgetState::default();
    state
        .selections
        .insert("art".to_string(), vec!["x".to_string()]);
    state.selected_category = "art".to_string();

    backend.save_widget_state(&state).unwrap();

    let raw = fs::read_to_string(backend.root().join(WIDGET_FILE)).unwrap();
    assert!(raw.contains("\"selectedCategory\""));
    assert_eq!(backend.load_widget_state().unwrap(), Some(state));
}

#[test]
fn test_corrupt_library_is_persistence_error() {
    let (_dir, backend) = setup();
    fs::create_dir_all(backend.root()).unwrap();
    fs::write(backend.root().join(LIBRARY_FILE), "{ not json").unwrap();

    let err = backend.load_library().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Persistence);
}

#[test]
fn test_legacy_prompt_records_load() {
    let (_dir, backend) = setup();
    fs::create_dir_all(backend.root()).unwrap();
    fs::write(
        backend.root().join(LIBRARY_FILE),
        r#"{"categories": [{"name": "default", "prompts": [
            {"alias": "a", "prompt": "hello", "image": ""}
        ]}]}"#,
    )
    .unwrap();

    let document = backend.load_library().unwrap().unwrap();
    let prompt = &document.categories[0].prompts[0];
    assert!(!prompt.id.is_empty());
    assert_eq!(prompt.image, None);
    assert_eq!(document.settings, Settings::default());
}

#[test]
fn test_api_changes_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let mut api = open(dir.path());
        api.create_category("art/sketch").unwrap();
        api.add_prompt("art/sketch", PromptDraft::new("x", "x"))
            .unwrap();
        api.add_prompt("art/sketch", PromptDraft::new("y", "y"))
            .unwrap();
        api.toggle("art/sketch", "y").unwrap();
        api.toggle("art/sketch", "x").unwrap();
        api.select_category("art/sketch").unwrap();
    }

    let api = open(dir.path());
    assert_eq!(texts(&api, "art/sketch"), vec!["x", "y"]);
    assert_eq!(api.selected_category(), "art/sketch");
    assert_eq!(api.render_output(), "x, y");
    assert_no_tmp_files(dir.path());
}

#[test]
fn test_delta_operations_reach_disk() {
    let dir = TempDir::new().unwrap();
    let mut api = open(dir.path());
    api.create_category("a").unwrap();
    api.create_category("a/b").unwrap();
    for text in ["1", "2", "3"] {
        api.add_prompt("a", PromptDraft::new(text, text)).unwrap();
    }
    let ids: Vec<String> = api.library().category("a").unwrap().prompts
        .iter()
        .map(|p| p.id.clone())
        .collect();

    api.reorder_prompt("a", 2, 0).unwrap();
    api.move_prompt("a", "moved", &ids[1]).unwrap();
    api.delete_prompt("a", &ids[0]).unwrap();
    api.delete_category("a/b").unwrap();

    let reopened = open(dir.path());
    assert_eq!(texts(&reopened, "a"), vec!["3"]);
    assert_eq!(texts(&reopened, "moved"), vec!["2"]);
    assert!(!reopened.library().contains("a/b"));
    assert_eq!(reopened.library(), api.library());
}

#[test]
fn test_rename_rebases_persisted_selection() {
    let dir = TempDir::new().unwrap();
    {
        let mut api = open(dir.path());
        api.add_prompt("art/paint", PromptDraft::new("oil", "oil"))
            .unwrap();
        api.toggle("art/paint", "oil").unwrap();
        api.rename_category("art", "craft").unwrap();
    }

    let api = open(dir.path());
    assert!(api.selection().is_selected("craft/paint", "oil"));
    assert_eq!(api.render_output(), "oil");
}

#[test]
fn test_reload_picks_up_external_writes() {
    let dir = TempDir::new().unwrap();
    let mut first = open(dir.path());
    first.create_category("shared").unwrap();

    let mut second = open(dir.path());
    second
        .add_prompt("shared", PromptDraft::new("hi", "hi"))
        .unwrap();

    assert!(texts(&first, "shared").is_empty());
    first.reload().unwrap();
    assert_eq!(texts(&first, "shared"), vec!["hi"]);
}
