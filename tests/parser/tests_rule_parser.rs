//! Rule-level parser tests
//!
//! Each case parses a fragment with one named rule of its grammar and
//! checks it is accepted without diagnostics.

use haxe_syntax::SyntaxKind;
use haxe_syntax::parser::rule_parser::{Rule, parse_rule};
use rstest::rstest;

/// Helper to assert that a rule parses successfully
fn assert_rule_parses(rule: Rule, input: &str, desc: &str) {
    let result = parse_rule(rule, input);
    assert!(
        result.is_ok(),
        "Failed to parse {} as {:?}: {:?}\nInput: {}",
        desc,
        rule,
        result.errors(),
        input
    );
}

// =============================================================================
// Expressions
// =============================================================================

#[rstest]
#[case("a + b * c", "precedence")]
#[case("a = b = c", "right associative assignment")]
#[case("a >>= 2", "composed shift assignment")]
#[case("a >>>= 2", "composed unsigned shift assignment")]
#[case("a >> 1 >>> 2", "composed shifts")]
#[case("a >= b", "composed comparison")]
#[case("x ? y : z", "ternary")]
#[case("a ?? b ?? c", "null coalescing")]
#[case("obj?.field", "safe navigation")]
#[case("0...10", "interval")]
#[case("-x++", "prefix and postfix")]
#[case("!done && ~mask != 0", "unary operators")]
#[case("f(1, 'two', [3])", "call with arguments")]
#[case("a.b[c](d)", "postfix chain")]
#[case("new Map<String, Int>()", "constructor call")]
#[case("cast(value, Int)", "checked cast")]
#[case("cast value", "unchecked cast")]
#[case("untyped __js__('x')", "untyped")]
#[case("function(a, b) return a + b", "function literal")]
#[case("[1 => 'a', 2 => 'b']", "map literal")]
#[case("{ x: 1, \"y\": 2 }", "object literal")]
#[case("(value : Int)", "type check")]
#[case("'a $b ${c + 1} $$'", "interpolated string")]
#[case("if (a) b else c", "if expression")]
#[case("switch (x) { case 1, 2: a; case _ if (b): c; default: }", "switch")]
#[case("try f() catch (e:String) g() catch (e:Dynamic) h()", "try with catches")]
#[case("for (k => v in map) trace(k)", "key value for")]
#[case("do x++ while (x < 10)", "do while")]
#[case("macro $v{1}", "value reification")]
#[case("macro : Array<Int>", "type reification")]
#[case("macro var x:Int = $v{1}", "variable reification")]
#[case("macro class $name { var x:Int; }", "class reification")]
#[case("macro $e{left} + $i{field}(1)", "expression splices")]
#[case("macro f($a{args}, ${rest})", "array and shorthand splices")]
#[case("macro $b{body}", "block splice")]
#[case("macro $p{path}.value", "path splice")]
fn test_expression(#[case] input: &str, #[case] desc: &str) {
    assert_rule_parses(Rule::Expression, input, desc);
}

// =============================================================================
// Types
// =============================================================================

#[rstest]
#[case("Int", "simple")]
#[case("haxe.ds.StringMap<Int>", "dotted with arguments")]
#[case("Array<Array<Int>>", "nested generics close with adjacent >")]
#[case("Int->String->Void", "function type")]
#[case("?Int", "optional")]
#[case("{ x:Int, ?y:Float }", "anonymous structure")]
#[case("(Int->Int)->Int", "parenthesized function type")]
fn test_type(#[case] input: &str, #[case] desc: &str) {
    assert_rule_parses(Rule::Type, input, desc);
}

// =============================================================================
// Members and statements
// =============================================================================

#[rstest]
#[case("var x:Int;", "field")]
#[case("public static var count(default, null):Int = 0;", "property")]
#[case("final limit = 10;", "final field")]
#[case("static final MAX = 10;", "static final field")]
#[case("function new() {}", "constructor")]
#[case("public function get<T>(key:String, ?fallback:T):T return fallback;", "expression body")]
#[case("function abstractLike():Void;", "no body")]
#[case("@:keep @native('x') override function f() {}", "metadata before member")]
fn test_class_member(#[case] input: &str, #[case] desc: &str) {
    assert_rule_parses(Rule::ClassMember, input, desc);
}

#[rstest]
#[case("var x = 1;", "local var")]
#[case("final y:String = 'a';", "local final")]
#[case("f();", "expression statement")]
#[case("if (a) b; else c;", "semicolon before else")]
#[case("while (true) { break; }", "no semicolon after block")]
#[case(";", "empty statement")]
#[case("return;", "bare return")]
#[case("throw 'boom';", "throw")]
fn test_statement(#[case] input: &str, #[case] desc: &str) {
    assert_rule_parses(Rule::Statement, input, desc);
}

#[rstest]
#[case("<T>", "single")]
#[case("<K, V:Comparable<V>>", "constrained")]
fn test_type_params(#[case] input: &str, #[case] desc: &str) {
    assert_rule_parses(Rule::TypeParams, input, desc);
}

// =============================================================================
// Metadata and build lines
// =============================================================================

#[rstest]
#[case("@:keep", "compiler flag")]
#[case("@author('me')", "user metadata")]
#[case("@:native('a.b.C')", "string argument")]
#[case("@:build(tools.Builder.build())", "call argument")]
#[case("@:meta([1, 2], { a: true }, -1, 2 * 3 + 1)", "composite arguments")]
#[case("@:ns.sub.name", "dotted name")]
fn test_metadata_entry(#[case] input: &str, #[case] desc: &str) {
    assert_rule_parses(Rule::MetadataEntry, input, desc);
}

#[rstest]
#[case("-cp src\n", "flag with argument")]
#[case("--no-traces\n", "bare flag")]
#[case("-D key=value", "no trailing newline")]
#[case("-cp \"dir with spaces\"\n", "quoted argument")]
fn test_hxml_line(#[case] input: &str, #[case] desc: &str) {
    assert_rule_parses(Rule::HxmlLine, input, desc);
}

#[rstest]
#[case(Rule::Expression, "a + b", SyntaxKind::BINARY_EXPR)]
#[case(Rule::Expression, "a ? b : c", SyntaxKind::TERNARY_EXPR)]
#[case(Rule::Expression, "{ a: 1 }", SyntaxKind::OBJECT_LITERAL)]
#[case(Rule::Expression, "{ a; }", SyntaxKind::BLOCK)]
#[case(Rule::Expression, "macro x", SyntaxKind::MACRO_EXPR)]
#[case(Rule::Expression, "$v{x}", SyntaxKind::REIFICATION)]
#[case(Rule::Expression, "$name", SyntaxKind::REIFIED_NAME)]
#[case(Rule::Type, "A->B", SyntaxKind::FUNCTION_TYPE)]
#[case(Rule::ClassMember, "var a;", SyntaxKind::MEMBER)]
#[case(Rule::MetadataEntry, "@:a(1)", SyntaxKind::META_ENTRY)]
#[case(Rule::HxmlLine, "-cp src\n", SyntaxKind::HXML_LINE)]
fn test_rule_node_kind(#[case] rule: Rule, #[case] input: &str, #[case] expected: SyntaxKind) {
    let result = parse_rule(rule, input);
    assert_eq!(result.node_kind(), Some(expected), "{:?}", result.errors());
}

#[rstest]
#[case(Rule::Expression, "a +")]
#[case(Rule::Type, "Array<")]
#[case(Rule::ClassMember, "var;")]
#[case(Rule::MetadataEntry, "@:a(1,,)")]
#[case(Rule::Expression, "macro")]
#[case(Rule::Expression, "$v{1")]
fn test_rule_rejects(#[case] rule: Rule, #[case] input: &str) {
    let result = parse_rule(rule, input);
    assert!(!result.is_ok(), "{input:?} should not parse as {rule:?}");
}
