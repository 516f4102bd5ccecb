//! End-to-end scenarios (spec §8): each checks both the diagnostic list
//! and the resolved type annotation on the relevant node.

use source_typeck::parser::ast::{ExprKind, StatementKind, Typability};
use source_typeck::parser::parse;
use source_typeck::typeck::types::Term;
use source_typeck::typeck::{type_check, DiagnosticKind};

fn run(src: &str) -> (source_typeck::parser::ast::Program, Vec<source_typeck::typeck::Diagnostic>) {
    let mut program = parse(src).expect("source should parse");
    let diagnostics = type_check(&mut program);
    (program, diagnostics)
}

fn decl_init_type(program: &source_typeck::parser::ast::Program, index: usize) -> Term {
    match &program.body.statements[index].kind {
        StatementKind::VariableDeclaration { init, .. } => init.meta.inferred_type.clone(),
        other => panic!("statement {index} is not a variable declaration: {other:?}"),
    }
}

#[test]
fn scenario_1_arithmetic_is_sound() {
    let (program, diagnostics) = run("const x = 5; const y = 6; const z = x + y;");
    assert!(diagnostics.is_empty());
    assert_eq!(decl_init_type(&program, 2), Term::number());
}

#[test]
fn scenario_2_mismatched_addable_operands() {
    let (program, diagnostics) = run("const x = 5; const y = 'bob'; const z = x + y;");
    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(diagnostics[0].kind, DiagnosticKind::InvalidArgumentTypes { .. }));
    assert_eq!(decl_init_type(&program, 0), Term::number());
    assert_eq!(decl_init_type(&program, 1), Term::string());
}

#[test]
fn scenario_3_polymorphic_identity_generalises() {
    let (_, diagnostics) = run("const f = x => x; f(1); f(true);");
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[test]
fn scenario_4_recursive_factorial() {
    let (program, diagnostics) =
        run("function fact(n) { return n === 0 ? 1 : n * fact(n - 1); }");
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    let StatementKind::FunctionDeclaration { function_inferred_type, .. } = &program.body.statements[0].kind
    else {
        panic!("expected function declaration");
    };
    assert_eq!(
        *function_inferred_type,
        Term::function(vec![Term::number()], Term::number())
    );
}

#[test]
fn scenario_5_pair_list_folds_to_canonical_list() {
    let (program, diagnostics) = run("const p = pair(1, pair(2, null));");
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(decl_init_type(&program, 0), Term::pair(Term::number(), Term::list(Term::number())));
}

#[test]
fn scenario_6_array_literal_element_mismatch() {
    let (program, diagnostics) = run("const a = [1, 2, 'x'];");
    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(diagnostics[0].kind, DiagnosticKind::ArrayAssignment { .. }));
    assert_eq!(decl_init_type(&program, 0), Term::array(Term::number()));
}

#[test]
fn every_resolved_node_is_marked_typed() {
    let (program, _) = run("const x = 5; function f(n) { return n + 1; } f(x);");
    for stmt in &program.body.statements {
        assert_eq!(stmt.meta.typability, Typability::Typed);
    }
    let StatementKind::Expression(call) = &program.body.statements[2].kind else {
        panic!("expected expression statement");
    };
    assert_eq!(call.meta.typability, Typability::Typed);
    let ExprKind::Call { .. } = &call.kind else {
        panic!("expected call expression");
    };
}

#[test]
fn generalisation_is_idempotent() {
    let src = "const f = x => x; const a = f(1); const b = f('x');";
    let (program_a, diagnostics_a) = run(src);
    let (program_b, diagnostics_b) = run(src);
    assert_eq!(diagnostics_a.len(), diagnostics_b.len());
    assert_eq!(decl_init_type(&program_a, 1), decl_init_type(&program_b, 1));
    assert_eq!(decl_init_type(&program_a, 2), decl_init_type(&program_b, 2));
}

#[test]
fn undefined_identifier_does_not_abort_rest_of_program() {
    let (program, diagnostics) = run("const x = y; const z = 1 + 1;");
    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(diagnostics[0].kind, DiagnosticKind::UndefinedIdentifier { .. }));
    assert_eq!(decl_init_type(&program, 1), Term::number());
}

#[test]
fn for_loop_binds_init_name_in_test_update_and_body() {
    let (_, diagnostics) =
        run("let total = 0; for (let i = 0; i < 10; i = i + 1) { total = total + i; }");
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}
