//! Property-based checks (spec §8): generated programs built entirely
//! from numeric declarations and additions must always type-check clean
//! and resolve every declared name to `number`.

use proptest::prelude::*;
use source_typeck::parser::ast::StatementKind;
use source_typeck::parser::parse;
use source_typeck::typeck::types::Term;
use source_typeck::typeck::type_check;

fn numeric_chain_source(depth: usize) -> String {
    let mut src = String::from("const v0 = 0;\n");
    for i in 1..=depth {
        src.push_str(&format!("const v{i} = v{prev} + {i};\n", prev = i - 1));
    }
    src
}

proptest! {
    #[test]
    fn numeric_chains_always_resolve_to_number(depth in 1usize..20) {
        let src = numeric_chain_source(depth);
        let mut program = parse(&src).expect("generated source should parse");
        let diagnostics = type_check(&mut program);
        prop_assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
        for stmt in &program.body.statements {
            let StatementKind::VariableDeclaration { init, .. } = &stmt.kind else {
                panic!("expected only variable declarations");
            };
            prop_assert_eq!(&init.meta.inferred_type, &Term::number());
        }
    }

    #[test]
    fn type_checking_is_deterministic_across_runs(depth in 1usize..10) {
        let src = numeric_chain_source(depth);
        let mut a = parse(&src).unwrap();
        let mut b = parse(&src).unwrap();
        let diags_a = type_check(&mut a);
        let diags_b = type_check(&mut b);
        prop_assert_eq!(diags_a.len(), diags_b.len());
        for (sa, sb) in a.body.statements.iter().zip(b.body.statements.iter()) {
            let (StatementKind::VariableDeclaration { init: ia, .. }, StatementKind::VariableDeclaration { init: ib, .. }) =
                (&sa.kind, &sb.kind)
            else {
                panic!("expected variable declarations");
            };
            prop_assert_eq!(&ia.meta.inferred_type, &ib.meta.inferred_type);
        }
    }
}
