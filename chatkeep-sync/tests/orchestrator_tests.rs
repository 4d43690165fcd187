use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chatkeep_core::{
    registry, store, CommitOutcome, CoreError, Layout, NoVcs, ProjectRoot, Vcs,
};
use chatkeep_sync::{
    backup, AlwaysDecline, LoadOptions, Orchestrator, ProjectStatus, ResetOutcome, SaveOptions,
    SwitchScope, SyncError,
};
use tempfile::TempDir;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct Fixture {
    _home: TempDir,
    workspace: TempDir,
    layout: Layout,
}

impl Fixture {
    fn new() -> Self {
        init_logging();
        let home = TempDir::new().expect("home");
        let workspace = TempDir::new().expect("workspace");
        let layout = Layout::defaults_at(home.path());
        Fixture {
            _home: home,
            workspace,
            layout,
        }
    }

    fn global(&self) -> &Path {
        &self.layout.global_root
    }

    fn project(&self, name: &str) -> PathBuf {
        let dir = self.workspace.path().join(name);
        fs::create_dir_all(&dir).expect("create project dir");
        dir.canonicalize().expect("canonical project dir")
    }

    fn archive(&self, project: &Path) -> PathBuf {
        project.join(&self.layout.archive_dir)
    }

    fn seed_global(&self, files: &[(&str, &str)]) {
        seed(self.global(), files);
    }

    fn orchestrator(&self, vcs: Box<dyn Vcs>, answer: bool) -> Orchestrator {
        Orchestrator::new(
            self.layout.clone(),
            vcs,
            Box::new(move |_: &str| answer),
        )
        .expect("orchestrator")
    }

    fn snapshots(&self) -> Vec<PathBuf> {
        backup::list_snapshots(self.global()).expect("list snapshots")
    }
}

fn seed(root: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, content).expect("write");
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read")
}

/// Every file under `root` with its content, for byte-level comparisons.
fn snapshot_tree(root: &Path) -> Vec<(PathBuf, String)> {
    store::list(root)
        .expect("list")
        .into_iter()
        .map(|f| (f.relative, read(&f.path)))
        .collect()
}

/// Treats every directory as its own working tree and records commits.
#[derive(Clone, Default)]
struct RecordingVcs {
    commits: Arc<Mutex<Vec<(PathBuf, Vec<PathBuf>, String)>>>,
}

impl Vcs for RecordingVcs {
    fn toplevel(&self, path: &Path) -> Option<PathBuf> {
        Some(path.to_path_buf())
    }

    fn commit_paths(&self, repo: &Path, paths: &[PathBuf], message: &str) -> CommitOutcome {
        self.commits
            .lock()
            .expect("lock")
            .push((repo.to_path_buf(), paths.to_vec(), message.to_string()));
        CommitOutcome::Committed
    }
}

const THREE: &[(&str, &str)] = &[
    ("a.json", r#"{"id":"a"}"#),
    ("b.json", r#"{"id":"b"}"#),
    ("nested/c.JSON", r#"{"id":"c"}"#),
];

// ---------------------------------------------------------------------------
// Save
// ---------------------------------------------------------------------------

#[test]
fn save_copies_global_into_archive_and_leaves_global_alone() {
    let fx = Fixture::new();
    fx.seed_global(THREE);
    let webshop = fx.project("webshop");
    let before = snapshot_tree(fx.global());

    let report = fx
        .orchestrator(Box::new(NoVcs), false)
        .save(&[webshop.clone()], fx.workspace.path(), SaveOptions::default())
        .expect("save");

    assert_eq!(report.succeeded(), 1);
    assert_eq!(snapshot_tree(&fx.archive(&webshop)), before);
    assert_eq!(snapshot_tree(fx.global()), before, "global untouched");
    let saved = read(&fx.archive(&webshop).join("SAVED.md"));
    assert!(saved.contains("- **Files:** 3"), "got: {saved}");
    assert!(report.reset.is_none());
    assert!(fx.snapshots().is_empty());
}

#[test]
fn save_twice_is_idempotent() {
    let fx = Fixture::new();
    fx.seed_global(THREE);
    let webshop = fx.project("webshop");
    let orch = fx.orchestrator(Box::new(NoVcs), false);

    orch.save(&[webshop.clone()], fx.workspace.path(), SaveOptions::default())
        .expect("first save");
    let first = snapshot_tree(&fx.archive(&webshop));
    orch.save(&[webshop.clone()], fx.workspace.path(), SaveOptions::default())
        .expect("second save");
    assert_eq!(snapshot_tree(&fx.archive(&webshop)), first);
}

#[test]
fn save_with_empty_global_is_a_no_op() {
    let fx = Fixture::new();
    let webshop = fx.project("webshop");

    let report = fx
        .orchestrator(Box::new(NoVcs), true)
        .save(
            &[webshop.clone()],
            fx.workspace.path(),
            SaveOptions {
                reset: true,
                ..Default::default()
            },
        )
        .expect("save");

    assert!(report.nothing_to_save());
    assert!(report.projects.is_empty());
    assert!(!fx.archive(&webshop).exists());
}

#[test]
fn save_reports_missing_projects_and_continues() {
    let fx = Fixture::new();
    fx.seed_global(&[("a.json", "A")]);
    let webshop = fx.project("webshop");
    let gone = fx.workspace.path().join("gone");

    let report = fx
        .orchestrator(Box::new(NoVcs), false)
        .save(
            &[gone, webshop.clone()],
            fx.workspace.path(),
            SaveOptions::default(),
        )
        .expect("save");

    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 1);
    assert!(matches!(
        report.projects[0].status,
        ProjectStatus::Failed { .. }
    ));
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(store::count(&fx.archive(&webshop)).unwrap(), 1);
}

#[test]
fn save_commits_only_the_archive() {
    let fx = Fixture::new();
    fx.seed_global(&[("a.json", "A"), ("b.json", "B")]);
    let webshop = fx.project("webshop");
    let vcs = RecordingVcs::default();

    let report = fx
        .orchestrator(Box::new(vcs.clone()), false)
        .save(&[webshop.clone()], fx.workspace.path(), SaveOptions::default())
        .expect("save");

    let commits = vcs.commits.lock().unwrap();
    assert_eq!(commits.len(), 1);
    let (repo, paths, message) = &commits[0];
    assert_eq!(repo, &webshop);
    assert_eq!(paths, &vec![fx.archive(&webshop)]);
    assert!(message.contains("2 transcript(s)"), "got: {message}");
    assert!(matches!(
        report.projects[0].status,
        ProjectStatus::Saved {
            commit: CommitOutcome::Committed,
            ..
        }
    ));
}

#[test]
fn save_no_git_never_commits() {
    let fx = Fixture::new();
    fx.seed_global(&[("a.json", "A")]);
    let webshop = fx.project("webshop");
    let vcs = RecordingVcs::default();

    fx.orchestrator(Box::new(vcs.clone()), false)
        .save(
            &[webshop],
            fx.workspace.path(),
            SaveOptions {
                no_git: true,
                ..Default::default()
            },
        )
        .expect("save");
    assert!(vcs.commits.lock().unwrap().is_empty());
}

#[test]
fn save_with_reset_backs_up_then_clears() {
    let fx = Fixture::new();
    fx.seed_global(THREE);
    let webshop = fx.project("webshop");
    let before = snapshot_tree(fx.global());

    let report = fx
        .orchestrator(Box::new(NoVcs), true)
        .save(
            &[webshop],
            fx.workspace.path(),
            SaveOptions {
                reset: true,
                ..Default::default()
            },
        )
        .expect("save");

    let Some(ResetOutcome::Cleared {
        backup: Some(snap),
        removed,
    }) = report.reset
    else {
        panic!("expected a cleared reset, got {:?}", report.reset);
    };
    assert_eq!(removed, 3);
    assert_eq!(snapshot_tree(&snap), before);
    assert_eq!(store::count(fx.global()).unwrap(), 0);
}

#[test]
fn save_reset_declined_keeps_global() {
    let fx = Fixture::new();
    fx.seed_global(&[("a.json", "A")]);
    let webshop = fx.project("webshop");

    let report = fx
        .orchestrator(Box::new(NoVcs), false)
        .save(
            &[webshop],
            fx.workspace.path(),
            SaveOptions {
                reset: true,
                ..Default::default()
            },
        )
        .expect("save");

    assert!(report.declined());
    assert_eq!(store::count(fx.global()).unwrap(), 1);
    assert!(fx.snapshots().is_empty());
}

#[test]
fn save_reset_is_skipped_when_every_project_failed() {
    let fx = Fixture::new();
    fx.seed_global(&[("a.json", "A")]);

    let report = fx
        .orchestrator(Box::new(NoVcs), true)
        .save(
            &[fx.workspace.path().join("gone")],
            fx.workspace.path(),
            SaveOptions {
                reset: true,
                force: true,
                ..Default::default()
            },
        )
        .expect("save");

    assert!(matches!(report.reset, Some(ResetOutcome::Skipped { .. })));
    assert_eq!(store::count(fx.global()).unwrap(), 1);
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

#[test]
fn load_restores_after_manual_clear() {
    let fx = Fixture::new();
    fx.seed_global(THREE);
    let webshop = fx.project("webshop");
    let before = snapshot_tree(fx.global());
    let orch = fx.orchestrator(Box::new(NoVcs), false);
    orch.save(&[webshop.clone()], fx.workspace.path(), SaveOptions::default())
        .expect("save");

    fs::remove_dir_all(fx.global()).expect("manual clear");
    let report = orch
        .load(Some(&webshop), fx.workspace.path(), LoadOptions::default())
        .expect("load");

    assert_eq!(report.loaded, 3);
    assert!(report.backup.is_none());
    assert!(report.last_saved.is_some());
    assert_eq!(snapshot_tree(fx.global()), before);
    let context = read(report.record.as_deref().expect("load-record written"));
    assert!(context.contains("- **Loaded files:** 3"), "got: {context}");
}

#[test]
fn load_with_empty_archive_fails_without_touching_global() {
    let fx = Fixture::new();
    fx.seed_global(&[("keep.json", "K")]);
    let webshop = fx.project("webshop");

    let err = fx
        .orchestrator(Box::new(NoVcs), true)
        .load(Some(&webshop), fx.workspace.path(), LoadOptions::default())
        .unwrap_err();

    assert!(matches!(err, SyncError::NoSavedTranscripts { .. }));
    assert_eq!(read(&fx.global().join("keep.json")), "K");
    assert!(fx.snapshots().is_empty());
}

#[test]
fn load_replaces_global_after_backup() {
    let fx = Fixture::new();
    let webshop = fx.project("webshop");
    seed(&fx.archive(&webshop), &[("saved.json", "S")]);
    fx.seed_global(&[("other.json", "O")]);

    let report = fx
        .orchestrator(Box::new(NoVcs), true)
        .load(Some(&webshop), fx.workspace.path(), LoadOptions::default())
        .expect("load");

    let snap = report.backup.expect("backup taken");
    assert_eq!(read(&snap.join("other.json")), "O");
    assert_eq!(report.cleared, 1);
    assert!(!fx.global().join("other.json").exists());
    assert_eq!(read(&fx.global().join("saved.json")), "S");
}

#[test]
fn load_declined_changes_nothing() {
    let fx = Fixture::new();
    let webshop = fx.project("webshop");
    seed(&fx.archive(&webshop), &[("saved.json", "S")]);
    fx.seed_global(&[("other.json", "O")]);

    let err = Orchestrator::new(fx.layout.clone(), Box::new(NoVcs), Box::new(AlwaysDecline))
        .expect("orchestrator")
        .load(Some(&webshop), fx.workspace.path(), LoadOptions::default())
        .unwrap_err();

    assert!(matches!(err, SyncError::Declined));
    assert_eq!(snapshot_tree(fx.global()).len(), 1);
    assert!(fx.snapshots().is_empty());
    assert!(!fx.archive(&webshop).join("CONTEXT.md").exists());
}

#[test]
fn load_no_clear_merges_and_overwrites() {
    let fx = Fixture::new();
    let webshop = fx.project("webshop");
    seed(&fx.archive(&webshop), &[("a.json", "archived"), ("b.json", "B")]);
    fx.seed_global(&[("a.json", "live")]);

    let report = fx
        .orchestrator(Box::new(NoVcs), false)
        .load(
            Some(&webshop),
            fx.workspace.path(),
            LoadOptions {
                no_clear: true,
                ..Default::default()
            },
        )
        .expect("load");

    assert!(report.merged);
    assert_eq!(read(&fx.global().join("a.json")), "archived");
    assert_eq!(read(&fx.global().join("b.json")), "B");
    assert!(fx.snapshots().is_empty());
}

// ---------------------------------------------------------------------------
// Switch
// ---------------------------------------------------------------------------

#[test]
fn switch_all_saves_everywhere_then_resets_once() {
    let fx = Fixture::new();
    let vcs = RecordingVcs::default();
    let api = fx.project("api");
    let web = fx.project("web");
    registry::add_at(&fx.layout, &api, fx.workspace.path(), &NoVcs).expect("add api");
    registry::add_at(&fx.layout, &web, fx.workspace.path(), &NoVcs).expect("add web");
    fx.seed_global(&[("one.json", "1"), ("two.json", "2")]);
    let before = snapshot_tree(fx.global());

    let report = fx
        .orchestrator(Box::new(vcs.clone()), false)
        .switch(SwitchScope::All, fx.workspace.path())
        .expect("switch");

    assert_eq!(report.processed(), 2);
    assert_eq!(snapshot_tree(&fx.archive(&api)), before);
    assert_eq!(snapshot_tree(&fx.archive(&web)), before);
    assert_eq!(store::count(fx.global()).unwrap(), 0);
    let snapshots = fx.snapshots();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshot_tree(&snapshots[0]), before);
    assert!(vcs.commits.lock().unwrap().is_empty(), "switch never commits");
}

#[test]
fn switch_all_skips_vanished_projects() {
    let fx = Fixture::new();
    let api = fx.project("api");
    let gone = fx.project("gone");
    registry::add_at(&fx.layout, &api, fx.workspace.path(), &NoVcs).expect("add api");
    registry::add_at(&fx.layout, &gone, fx.workspace.path(), &NoVcs).expect("add gone");
    fs::remove_dir_all(&gone).expect("remove project");
    fx.seed_global(&[("one.json", "1")]);

    let report = fx
        .orchestrator(Box::new(NoVcs), false)
        .switch(SwitchScope::All, fx.workspace.path())
        .expect("switch");

    assert_eq!(report.processed(), 1);
    assert_eq!(report.failed(), 1);
    assert!(matches!(report.reset, Some(ResetOutcome::Cleared { .. })));
}

#[test]
fn switch_with_empty_global_does_nothing() {
    let fx = Fixture::new();
    let api = fx.project("api");
    registry::add_at(&fx.layout, &api, fx.workspace.path(), &NoVcs).expect("add api");

    let report = fx
        .orchestrator(Box::new(NoVcs), false)
        .switch(SwitchScope::All, fx.workspace.path())
        .expect("switch");

    assert!(report.projects.is_empty());
    assert!(report.reset.is_none());
    assert!(!fx.archive(&api).exists());
}

#[test]
fn switch_all_without_registry_fails() {
    let fx = Fixture::new();
    fx.seed_global(&[("one.json", "1")]);
    let err = fx
        .orchestrator(Box::new(NoVcs), false)
        .switch(SwitchScope::All, fx.workspace.path())
        .unwrap_err();
    assert!(err.to_string().contains("switch --init"), "got: {err}");
    assert_eq!(store::count(fx.global()).unwrap(), 1);
}

#[test]
fn switch_single_saves_unregistered_path() {
    let fx = Fixture::new();
    let api = fx.project("api");
    fx.seed_global(&[("one.json", "1")]);

    let report = fx
        .orchestrator(Box::new(NoVcs), false)
        .switch(SwitchScope::Single(api.clone()), fx.workspace.path())
        .expect("switch");

    assert_eq!(report.processed(), 1);
    assert_eq!(read(&fx.archive(&api).join("one.json")), "1");
    assert_eq!(store::count(fx.global()).unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Reset / Status
// ---------------------------------------------------------------------------

#[test]
fn reset_declined_and_forced() {
    let fx = Fixture::new();
    fx.seed_global(&[("a.json", "A")]);

    let declined = fx
        .orchestrator(Box::new(NoVcs), false)
        .reset(false)
        .expect("reset");
    assert_eq!(declined, ResetOutcome::Declined);
    assert_eq!(store::count(fx.global()).unwrap(), 1);

    let forced = fx
        .orchestrator(Box::new(NoVcs), false)
        .reset(true)
        .expect("reset");
    assert!(matches!(forced, ResetOutcome::Cleared { removed: 1, .. }));

    let again = fx
        .orchestrator(Box::new(NoVcs), false)
        .reset(true)
        .expect("reset");
    assert_eq!(again, ResetOutcome::NothingToReset);
}

#[test]
fn status_derives_owner_from_latest_load() {
    let fx = Fixture::new();
    let api = fx.project("api");
    let web = fx.project("web");
    registry::add_at(&fx.layout, &api, fx.workspace.path(), &NoVcs).expect("add api");
    registry::add_at(&fx.layout, &web, fx.workspace.path(), &NoVcs).expect("add web");
    seed(&fx.archive(&api), &[("a.json", "A")]);
    seed(&fx.archive(&web), &[("w.json", "W")]);
    let orch = fx.orchestrator(Box::new(NoVcs), true);

    orch.load(Some(&api), fx.workspace.path(), LoadOptions::default())
        .expect("load api");
    std::thread::sleep(std::time::Duration::from_millis(1100));
    orch.load(Some(&web), fx.workspace.path(), LoadOptions::default())
        .expect("load web");

    let status = orch.status(Some(&api), fx.workspace.path()).expect("status");
    assert_eq!(status.owner.map(|o| o.project), Some(web));
    assert_eq!(status.registered, Some(2));
    assert_eq!(status.snapshots, 1);
    let summary = status.project.expect("project summary");
    assert_eq!(summary.archived.file_count(), 1);
    assert!(summary.last_loaded.is_some());
    assert!(summary.last_saved.is_none());
}

// ---------------------------------------------------------------------------
// Backup before clear
// ---------------------------------------------------------------------------

const NESTED: &[(&str, &str)] = &[
    ("a.json", "A"),
    ("2026/10/b.json", "B"),
    ("2026/11/c.json", "C"),
];

#[test]
fn load_clear_produces_one_complete_snapshot() {
    let fx = Fixture::new();
    let webshop = fx.project("webshop");
    seed(&fx.archive(&webshop), &[("saved.json", "S")]);
    fx.seed_global(NESTED);
    let before = snapshot_tree(fx.global());

    let report = fx
        .orchestrator(Box::new(NoVcs), true)
        .load(Some(&webshop), fx.workspace.path(), LoadOptions::default())
        .expect("load");

    let snapshots = fx.snapshots();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(report.backup.as_ref(), Some(&snapshots[0]));
    assert_eq!(snapshot_tree(&snapshots[0]), before);
    assert_eq!(report.cleared, before.len());
}

#[test]
fn forced_reset_produces_one_complete_snapshot() {
    let fx = Fixture::new();
    fx.seed_global(NESTED);
    let before = snapshot_tree(fx.global());

    let outcome = fx
        .orchestrator(Box::new(NoVcs), false)
        .reset(true)
        .expect("reset");

    let snapshots = fx.snapshots();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(
        outcome,
        ResetOutcome::Cleared {
            backup: Some(snapshots[0].clone()),
            removed: before.len(),
        }
    );
    assert_eq!(snapshot_tree(&snapshots[0]), before);
    assert_eq!(store::count(fx.global()).unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Path identity
// ---------------------------------------------------------------------------

/// Reports the wrapped directory as the working tree of everything beneath it.
struct ParentRepo(PathBuf);

impl Vcs for ParentRepo {
    fn toplevel(&self, path: &Path) -> Option<PathBuf> {
        path.starts_with(&self.0).then(|| self.0.clone())
    }

    fn commit_paths(&self, _: &Path, _: &[PathBuf], _: &str) -> CommitOutcome {
        CommitOutcome::Skipped
    }
}

#[test]
fn switch_all_saves_into_the_registered_entry_archive() {
    let fx = Fixture::new();
    let mono = fx.project("mono");
    let app = fx.project("mono/app");
    registry::add_at(&fx.layout, &app, fx.workspace.path(), &NoVcs).expect("add app");
    fx.seed_global(&[("one.json", "1")]);

    let report = fx
        .orchestrator(Box::new(ParentRepo(mono.clone())), false)
        .switch(SwitchScope::All, fx.workspace.path())
        .expect("switch");

    assert_eq!(report.processed(), 1);
    assert_eq!(store::count(&fx.archive(&app)).unwrap(), 1);
    assert!(!fx.archive(&mono).exists());
    let listed = registry::list_at(&fx.layout).expect("list");
    assert_eq!(listed[0].tracked_files, 1);
}

#[cfg(unix)]
#[test]
fn archive_inside_symlinked_global_is_refused() {
    let fx = Fixture::new();
    let real = fx.workspace.path().join("real");
    fs::create_dir_all(real.join("conversations/proj")).expect("mkdir");
    std::os::unix::fs::symlink(&real, fx.workspace.path().join("link")).expect("symlink");
    let mut layout = fx.layout.clone();
    layout.global_root = fx.workspace.path().join("link").join("conversations");
    seed(&layout.global_root, &[("a.json", "A"), ("b.json", "B")]);
    let project = real.join("conversations/proj");

    let orch = Orchestrator::new(layout.clone(), Box::new(NoVcs), Box::new(|_: &str| true))
        .expect("orchestrator");
    let report = orch
        .save(&[project.clone()], fx.workspace.path(), SaveOptions::default())
        .expect("save");
    assert_eq!(report.succeeded(), 0);
    let archive = layout.archive_root(&ProjectRoot(project.clone()));
    assert!(!archive.exists());

    seed(&archive, &[("c.json", "C")]);
    let err = orch
        .load(Some(&project), fx.workspace.path(), LoadOptions::default())
        .unwrap_err();
    assert!(matches!(err, SyncError::Core(CoreError::SameRoot { .. })), "got: {err}");
    assert_eq!(store::count(&layout.global_root).unwrap(), 3);
    assert!(backup::list_snapshots(&layout.global_root).unwrap().is_empty());
}

#[test]
fn load_record_failure_is_a_warning() {
    let fx = Fixture::new();
    let webshop = fx.project("webshop");
    seed(&fx.archive(&webshop), &[("saved.json", "S")]);
    seed(&fx.archive(&webshop).join("CONTEXT.md"), &[("blocker.txt", "x")]);

    let report = fx
        .orchestrator(Box::new(NoVcs), true)
        .load(Some(&webshop), fx.workspace.path(), LoadOptions::default())
        .expect("load");

    assert_eq!(report.loaded, 1);
    assert!(report.record.is_none());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(read(&fx.global().join("saved.json")), "S");
}
