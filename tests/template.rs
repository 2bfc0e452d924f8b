use git2::{IndexAddOption, Repository, Signature};
use pwagh::{CloneRequest, ErrorSink, Outcome, SiteSettings, clone_template};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

#[derive(Default)]
struct RecordingSink(RefCell<Vec<String>>);

impl ErrorSink for RecordingSink {
    fn log_error(&self, _trace: &str, title: &str) {
        self.0.borrow_mut().push(title.to_string());
    }
}

/// Create a template repository with a couple of files and one commit.
fn make_template(dir: &Path) {
    fs::create_dir_all(dir.join("src")).unwrap();
    fs::write(dir.join("manifest.json"), r#"{"name":"pwa"}"#).unwrap();
    fs::write(dir.join("src").join("main.js"), "export {}").unwrap();

    let repo = Repository::init(dir).unwrap();
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"], IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::now("Template", "template@example.com").unwrap();
    repo.commit(Some("HEAD"), &sig, &sig, "template", &tree, &[])
        .unwrap();
}

fn site(root: &Path, template: &Path) -> SiteSettings {
    SiteSettings {
        path: root.join("site"),
        template_url: template.to_str().unwrap().to_string(),
    }
}

fn entries(dir: &Path) -> Vec<String> {
    let mut v: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    v.sort();
    v
}

#[test]
fn clones_into_project_public_dir() {
    let td = tempdir().unwrap();
    let template = td.path().join("template");
    make_template(&template);

    let sink = RecordingSink::default();
    let outcome = clone_template(&site(td.path(), &template), &CloneRequest::new("shop"), &sink);

    let expected: PathBuf = td.path().join("site/public/files/shop");
    assert_eq!(
        outcome,
        Outcome::Success {
            message: Some("Repository cloned successfully.".to_string()),
            file_path: Some(expected.clone()),
        }
    );
    assert!(expected.join("manifest.json").is_file());
    assert!(Repository::open(&expected).is_ok());
    assert!(sink.0.borrow().is_empty());
}

#[test]
fn leftover_files_are_replaced_by_clone() {
    let td = tempdir().unwrap();
    let template = td.path().join("template");
    make_template(&template);

    let target = td.path().join("site/public/files/shop");
    fs::create_dir_all(target.join("old")).unwrap();
    fs::write(target.join("stale.txt"), "leftover").unwrap();
    fs::write(target.join("old").join("junk.bin"), [0u8; 4]).unwrap();

    let outcome = clone_template(
        &site(td.path(), &template),
        &CloneRequest::new("shop"),
        &RecordingSink::default(),
    );

    assert!(outcome.is_success(), "{:?}", outcome);
    assert_eq!(entries(&target), vec![".git", "manifest.json", "src"]);
}

#[test]
fn explicit_url_overrides_configured_template() {
    let td = tempdir().unwrap();
    let other = td.path().join("other");
    make_template(&other);
    fs::write(other.join("extra.txt"), "x").unwrap();

    let settings = SiteSettings {
        path: td.path().join("site"),
        template_url: td.path().join("missing").to_str().unwrap().to_string(),
    };
    let req = CloneRequest::new("shop").with_url(other.to_str().unwrap());
    let outcome = clone_template(&settings, &req, &RecordingSink::default());

    assert!(outcome.is_success(), "{:?}", outcome);
    // untracked in the source, so not part of the clone
    assert!(!outcome.file_path().unwrap().join("extra.txt").exists());
}

#[test]
fn unreachable_source_fails_without_path() {
    let td = tempdir().unwrap();
    let missing = td.path().join("no-such-template");

    let sink = RecordingSink::default();
    let outcome = clone_template(&site(td.path(), &missing), &CloneRequest::new("shop"), &sink);

    assert!(!outcome.is_success());
    assert!(outcome.file_path().is_none());
    assert!(!outcome.error().unwrap().is_empty());
    assert_eq!(*sink.0.borrow(), vec!["Template Clone Failed".to_string()]);
}

#[test]
fn target_occupied_by_file_is_not_a_repository() {
    let td = tempdir().unwrap();
    let template = td.path().join("template");
    make_template(&template);

    let target = td.path().join("site/public/files/shop");
    fs::create_dir_all(target.parent().unwrap()).unwrap();
    fs::write(&target, "not a directory").unwrap();

    let outcome = clone_template(
        &site(td.path(), &template),
        &CloneRequest::new("shop"),
        &RecordingSink::default(),
    );

    assert_eq!(
        outcome.error(),
        Some(
            format!(
                "Directory {} exists but is not a valid Git repository.",
                target.display()
            )
            .as_str()
        )
    );
}

#[test]
fn traversal_in_project_name_is_rejected() {
    let td = tempdir().unwrap();
    let outcome = clone_template(
        &site(td.path(), td.path()),
        &CloneRequest::new("../../etc"),
        &RecordingSink::default(),
    );
    assert_eq!(outcome.error(), Some(r#"Invalid project name: "../../etc""#));
}
