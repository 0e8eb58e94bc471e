//! Snapshots under concurrent edits and reads

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use haxe_syntax::{
    Document, DocumentError, GrammarKind, ParseConfig, ReparseError, SyntaxKind, TextEdit, TextSize, Workspace,
};

use crate::helpers::source_fixtures::{BUILD_FILE, FULL_MODULE, SIMPLE_CLASS};
use crate::helpers::tree_assertions::{assert_equivalent, tree_of};

fn host_document(text: &str) -> Document {
    Document::new(GrammarKind::Host, text, ParseConfig::default())
}

/// Offset just before the final `}`
fn before_last_brace(text: &str) -> TextSize {
    TextSize::new(text.rfind('}').unwrap() as u32)
}

#[test]
fn test_readers_see_consistent_snapshots() {
    let document = Arc::new(host_document("class Foo {}"));
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let document = document.clone();
            let done = done.clone();
            thread::spawn(move || {
                let mut last_generation = 0;
                let mut seen = 0usize;
                while !done.load(Ordering::Acquire) {
                    let snapshot = document.snapshot();
                    assert!(snapshot.generation >= last_generation);
                    assert_eq!(snapshot.tree.render_text(), &*snapshot.text);
                    last_generation = snapshot.generation;
                    seen += 1;
                }
                seen
            })
        })
        .collect();

    for i in 0..50 {
        let text = document.latest_text();
        let edit = TextEdit::insert(before_last_brace(&text), format!("var f{i}; "));
        document.apply_edit(&edit).unwrap();
    }
    done.store(true, Ordering::Release);
    for reader in readers {
        assert!(reader.join().unwrap() > 0);
    }

    let snapshot = document.snapshot();
    assert_eq!(snapshot.generation, 50);
    let fields = snapshot
        .tree
        .preorder()
        .filter(|n| snapshot.tree.kind(*n) == SyntaxKind::FIELD_DECL)
        .count();
    assert_eq!(fields, 50);
    assert_equivalent(&snapshot.tree, &tree_of(&snapshot.text, GrammarKind::Host));
}

#[test]
fn test_held_snapshot_outlives_edits() {
    let document = host_document(SIMPLE_CLASS);
    let held = document.snapshot();
    for _ in 0..5 {
        let text = document.latest_text();
        document
            .apply_edit(&TextEdit::insert(before_last_brace(&text), "var y; "))
            .unwrap();
    }
    assert_eq!(&*held.text, SIMPLE_CLASS);
    assert_eq!(held.tree.render_text(), SIMPLE_CLASS);
    assert_eq!(held.generation, 0);
    assert_eq!(document.snapshot().generation, 5);
}

#[test]
fn test_only_the_newest_task_publishes() {
    let document = host_document("class Foo { var x; }");
    let tasks: Vec<_> = (0..8)
        .map(|i| {
            document
                .submit(&TextEdit::insert(TextSize::new(17 + i), "y"))
                .unwrap()
        })
        .collect();
    assert!(tasks[..7].iter().all(|t| t.is_cancelled()));
    assert!(!tasks[7].is_cancelled());

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = tasks
            .into_iter()
            .map(|task| {
                let document = &document;
                scope.spawn(move || task.run(document))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let published: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(published.len(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| *e == ReparseError::Cancelled)
    );

    let snapshot = document.snapshot();
    assert_eq!(&*snapshot.text, "class Foo { var xyyyyyyyy; }");
    assert_eq!(snapshot.generation, 1);
}

#[test]
fn test_submit_folds_pending_edits() {
    let document = host_document("class Foo { var x; }");
    let _stale = document.submit(&TextEdit::insert(TextSize::new(12), "var a; ")).unwrap();
    let latest = document.submit(&TextEdit::insert(TextSize::new(19), "var b; ")).unwrap();
    assert_eq!(latest.version(), 2);

    let snapshot = latest.run(&document).unwrap();
    assert_eq!(&*snapshot.text, "class Foo { var a; var b; var x; }");
    assert_equivalent(&snapshot.tree, &tree_of(&snapshot.text, GrammarKind::Host));
}

#[test]
fn test_workspace_opens_in_parallel() {
    let files: Vec<(String, String)> = (0..32)
        .map(|i| match i % 3 {
            0 => (format!("build{i}.hxml"), BUILD_FILE.to_string()),
            1 => (format!("Module{i}.hx"), FULL_MODULE.to_string()),
            _ => (format!("Broken{i}.hx"), format!("class Broken{i} {{ var x:Int")),
        })
        .collect();

    let mut workspace = Workspace::new(ParseConfig::default());
    workspace.open_all(files.clone());
    assert_eq!(workspace.len(), files.len());

    // Documents keep the order they were given in
    let names: Vec<_> = workspace.iter().map(|(name, _)| name.to_string()).collect();
    let expected: Vec<_> = files.iter().map(|(name, _)| name.clone()).collect();
    assert_eq!(names, expected);

    for (name, document) in workspace.iter() {
        let snapshot = document.snapshot();
        let expected = if name.ends_with(".hxml") {
            GrammarKind::Hxml
        } else {
            GrammarKind::Host
        };
        assert_eq!(document.grammar(), expected);
        assert_eq!(snapshot.tree.render_text(), &*snapshot.text);
    }

    for (name, diagnostics) in workspace.diagnostics() {
        assert_eq!(name.starts_with("Broken"), !diagnostics.is_empty(), "{name}");
    }
}

#[test]
fn test_workspace_edits_by_name() {
    let mut workspace = Workspace::default();
    workspace.open("Main.hx", GrammarKind::Host, SIMPLE_CLASS);

    let snapshot = workspace
        .apply_edit("Main.hx", &TextEdit::insert(TextSize::new(24), "y"))
        .unwrap();
    assert_eq!(&*snapshot.text, "class Foo { public var xy:Int; }");

    let err = workspace
        .apply_edit("Other.hx", &TextEdit::insert(TextSize::new(0), "x"))
        .unwrap_err();
    assert!(matches!(err, DocumentError::NotOpen(_)));
}
