//! End-to-end parses of representative documents through the typed views

use haxe_syntax::tree::ast::{AstNode, ClassDecl, HxmlFile, SourceFile};
use haxe_syntax::{GrammarKind, SyntaxKind};

use crate::helpers::source_fixtures::{
    BUILD_FILE, BUILD_FILE_FULL, CLASS_WITH_METADATA, FULL_MODULE, SIMPLE_CLASS, TRUNCATED_CLASS,
};
use crate::helpers::tree_assertions::{assert_lossless, assert_no_errors, host_tree, nodes_of_kind, tree_of};

fn only_class<'t>(file: &SourceFile<'t>) -> ClassDecl<'t> {
    let decls: Vec<_> = file.declarations().collect();
    assert_eq!(decls.len(), 1, "expected one declaration");
    decls[0]
}

#[test]
fn test_simple_class() {
    let tree = host_tree(SIMPLE_CLASS);
    assert_lossless(&tree, SIMPLE_CLASS);
    assert_no_errors(&tree, SIMPLE_CLASS);

    let file = SourceFile::cast(tree.root_node()).unwrap();
    let class = only_class(&file);
    assert_eq!(class.decl_kind(), SyntaxKind::CLASS_DECL);
    assert_eq!(class.name().unwrap().text(), "Foo");

    let fields: Vec<_> = class.fields().collect();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name().unwrap().text(), "x");
    assert!(fields[0].type_annotation().is_some());
    assert!(!fields[0].is_static());
    assert!(!fields[0].is_final());
}

#[test]
fn test_leading_metadata_is_an_embedding() {
    let tree = host_tree(CLASS_WITH_METADATA);
    assert_lossless(&tree, CLASS_WITH_METADATA);
    assert_no_errors(&tree, CLASS_WITH_METADATA);

    let file = SourceFile::cast(tree.root_node()).unwrap();
    let class = only_class(&file);
    assert_eq!(class.name().unwrap().text(), "Foo");

    let span = class.leading_embedding().expect("metadata region");
    assert_eq!(span.grammar(), GrammarKind::Metadata);
    let entries: Vec<_> = span.entries().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name().as_deref(), Some("meta"));
    assert!(entries[0].is_compiler());

    let args: Vec<_> = entries[0].arguments().collect();
    assert_eq!(args.len(), 1);
    assert_eq!(args[0].kind(), SyntaxKind::META_LITERAL);
    let literal = args[0].find_token(SyntaxKind::STRING).unwrap();
    assert_eq!(literal.text(), "'abc'");
}

#[test]
fn test_truncated_class_keeps_its_name() {
    let tree = host_tree(TRUNCATED_CLASS);
    assert_lossless(&tree, TRUNCATED_CLASS);
    assert_eq!(tree.errors().len(), 1);

    let file = SourceFile::cast(tree.root_node()).unwrap();
    let class = only_class(&file);
    assert_eq!(class.name().unwrap().text(), "Foo");
    assert_eq!(class.fields().count(), 1);
}

#[test]
fn test_build_file_lines() {
    let tree = tree_of(BUILD_FILE, GrammarKind::Hxml);
    assert_lossless(&tree, BUILD_FILE);
    assert_no_errors(&tree, BUILD_FILE);

    let file = HxmlFile::cast(tree.root_node()).unwrap();
    let kinds: Vec<_> = file.lines().map(|n| n.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::HXML_OPTION,
            SyntaxKind::HXML_OPTION,
            SyntaxKind::HXML_COMMENT_LINE,
            SyntaxKind::HXML_OPTION,
        ]
    );

    let options: Vec<_> = file.options().collect();
    let flags: Vec<_> = options.iter().map(|o| o.flag().unwrap().text()).collect();
    assert_eq!(flags, vec!["-cp", "-main", "-lib"]);
    for option in &options {
        assert_eq!(option.args().count(), 1);
    }
    assert_eq!(file.comments().next().unwrap().text(), Some("note"));
}

#[test]
fn test_full_module() {
    let tree = host_tree(FULL_MODULE);
    assert_lossless(&tree, FULL_MODULE);
    assert_no_errors(&tree, FULL_MODULE);
    assert!(!nodes_of_kind(&tree, SyntaxKind::EMBEDDING).is_empty());
    assert!(!nodes_of_kind(&tree, SyntaxKind::METHOD_DECL).is_empty());
}

#[test]
fn test_full_build_file() {
    let tree = tree_of(BUILD_FILE_FULL, GrammarKind::Hxml);
    assert_lossless(&tree, BUILD_FILE_FULL);
    assert_no_errors(&tree, BUILD_FILE_FULL);

    let file = HxmlFile::cast(tree.root_node()).unwrap();
    let flags: Vec<_> = file.options().filter_map(|o| o.flag()).map(|t| t.text()).collect();
    assert_eq!(flags, vec!["-cp", "-cp", "-lib", "-D", "--macro", "-main", "-js"]);
}

#[test]
fn test_methods_and_params() {
    let text = "class A { function f(a:Int, ?b) { return a; } }";
    let tree = host_tree(text);
    assert_no_errors(&tree, text);

    let file = SourceFile::cast(tree.root_node()).unwrap();
    let method = only_class(&file).methods().next().unwrap();
    assert_eq!(method.name().unwrap().text(), "f");
    let params: Vec<_> = method.params().collect();
    assert_eq!(params.len(), 2);
    assert!(!params[0].is_optional());
    assert!(params[1].is_optional());
    assert_eq!(method.body().unwrap().statements().count(), 1);
}

#[test]
fn test_macro_reification() {
    let text = "class A { function f() { \
        var e = macro $v{1}; \
        var t = macro : Int; \
        var c = macro class $name { var x:Int; }; \
        var l = macro for ($i in 0...3) trace($i); \
        trace(macro $e{x} + $name); \
    } }";
    let tree = host_tree(text);
    assert_lossless(&tree, text);
    assert_no_errors(&tree, text);

    assert_eq!(nodes_of_kind(&tree, SyntaxKind::MACRO_EXPR).len(), 5);
    assert_eq!(nodes_of_kind(&tree, SyntaxKind::REIFICATION).len(), 2);
    // Declared names stay plain tokens, only references become nodes
    assert_eq!(nodes_of_kind(&tree, SyntaxKind::REIFIED_NAME).len(), 2);

    // The reified class is nested in the method, not a module declaration
    let file = SourceFile::cast(tree.root_node()).unwrap();
    assert_eq!(file.declarations().count(), 1);
    assert_eq!(nodes_of_kind(&tree, SyntaxKind::CLASS_DECL).len(), 2);
}
