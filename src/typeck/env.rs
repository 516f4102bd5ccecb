//! Type environment (§3) and the initial/builtin environment (§6).

use crate::parser::ast::DeclKind;
use crate::typeck::types::{ForAll, KindConstraint, Term, VarGen};
use std::collections::HashMap;

/// A binding is either still a raw (un-generalised) variable — visible to
/// recursive uses inside its own declaration's scope — or a generalised
/// schema, visible to every later use (§4.4 generalisation policy).
#[derive(Debug, Clone)]
pub enum Binding {
    Raw(Term),
    Schema(ForAll),
}

impl Binding {
    /// Produces a usable monotype: a raw binding as-is, a schema freshly
    /// instantiated.
    pub fn resolve(&self, gen: &VarGen) -> Term {
        match self {
            Binding::Raw(t) => t.clone(),
            Binding::Schema(s) => crate::typeck::types::instantiate(s, gen),
        }
    }
}

/// Immutable-by-contract: entering a new lexical scope clones the
/// environment rather than mutating a shared one in place.
#[derive(Debug, Clone, Default)]
pub struct TypeEnvironment {
    types: HashMap<String, Binding>,
    decl_kinds: HashMap<String, DeclKind>,
}

impl TypeEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, binding: Binding, kind: DeclKind) {
        let name = name.into();
        self.decl_kinds.insert(name.clone(), kind);
        self.types.insert(name, binding);
    }

    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.types.get(name)
    }

    pub fn decl_kind(&self, name: &str) -> Option<DeclKind> {
        self.decl_kinds.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.types.keys()
    }
}

/// Builds the predeclared environment: math constants, `math_*`
/// functions, pair/list/array builtins, and the overloadable operator
/// family (§6).
pub fn initial_environment(gen: &VarGen) -> TypeEnvironment {
    let mut env = TypeEnvironment::new();

    env.bind("math_PI", Binding::Raw(Term::number()), DeclKind::Const);
    env.bind("math_E", Binding::Raw(Term::number()), DeclKind::Const);
    env.bind("math_LN2", Binding::Raw(Term::number()), DeclKind::Const);
    env.bind("math_LN10", Binding::Raw(Term::number()), DeclKind::Const);
    env.bind("math_SQRT2", Binding::Raw(Term::number()), DeclKind::Const);
    env.bind("undefined", Binding::Raw(Term::undefined()), DeclKind::Const);

    for name in [
        "math_sin", "math_cos", "math_tan", "math_sqrt", "math_abs", "math_log", "math_exp",
        "math_floor", "math_ceil", "math_round", "math_trunc", "math_sign", "math_cbrt",
        "math_log2", "math_log10",
    ] {
        env.bind(
            name,
            Binding::Schema(ForAll::mono(Term::function(vec![Term::number()], Term::number()))),
            DeclKind::Const,
        );
    }

    // math_pow(base, exponent)
    env.bind(
        "math_pow",
        Binding::Schema(ForAll::mono(Term::function(
            vec![Term::number(), Term::number()],
            Term::number(),
        ))),
        DeclKind::Const,
    );

    // math_hypot / math_max / math_min: resolved as `∀A:addable. A -> A -> A`
    // rather than the ambiguous bare `∀T. T` (Open Question, resolved in
    // DESIGN.md) — the same shape as the overloaded binary `+`.
    for name in ["math_hypot", "math_max", "math_min"] {
        env.bind(name, Binding::Schema(addable_binary_to_self(gen)), DeclKind::Const);
    }

    // Arithmetic/comparison operators: ∀A:addable. A -> A -> A (or bool).
    for name in ["+"] {
        env.bind(name, Binding::Schema(addable_binary_to_self(gen)), DeclKind::Const);
    }
    for name in ["-", "*", "/", "%"] {
        env.bind(name, Binding::Schema(numeric_binary_to_self()), DeclKind::Const);
    }
    for name in ["===", "!==", "<", "<=", ">", ">="] {
        env.bind(name, Binding::Schema(addable_binary_to_bool(gen)), DeclKind::Const);
    }
    // Unary minus, renamed internally to avoid colliding with binary `-`.
    env.bind(
        "-_1",
        Binding::Schema(ForAll::mono(Term::function(vec![Term::number()], Term::number()))),
        DeclKind::Const,
    );
    env.bind(
        "!",
        Binding::Schema(ForAll::mono(Term::function(vec![Term::boolean()], Term::boolean()))),
        DeclKind::Const,
    );

    // Logical operators: ∀T. bool -> T -> T
    for name in ["&&", "||"] {
        let t = gen.fresh();
        env.bind(
            name,
            Binding::Schema(ForAll {
                quantified: vec![t],
                body: Term::function(vec![Term::boolean(), Term::Variable(t)], Term::Variable(t)),
            }),
            DeclKind::Const,
        );
    }

    // Pair / list builtins.
    bind_pair_list_builtins(&mut env, gen);

    // Array builtin: array_length.
    let elem = gen.fresh();
    env.bind(
        "array_length",
        Binding::Schema(ForAll {
            quantified: vec![elem],
            body: Term::function(vec![Term::array(Term::Variable(elem))], Term::number()),
        }),
        DeclKind::Const,
    );

    env
}

fn addable_binary_to_self(gen: &VarGen) -> ForAll {
    let a = gen.fresh_with_kind(KindConstraint::Addable);
    ForAll {
        quantified: vec![a],
        body: Term::function(vec![Term::Variable(a), Term::Variable(a)], Term::Variable(a)),
    }
}

fn numeric_binary_to_self() -> ForAll {
    // -, *, /, % are numeric-only; modelled as a monotype over `number`
    // rather than the full addable family, since `string` does not admit
    // subtraction/multiplication in Source.
    ForAll::mono(Term::function(vec![Term::number(), Term::number()], Term::number()))
}

fn addable_binary_to_bool(gen: &VarGen) -> ForAll {
    let a = gen.fresh_with_kind(KindConstraint::Addable);
    ForAll {
        quantified: vec![a],
        body: Term::function(vec![Term::Variable(a), Term::Variable(a)], Term::boolean()),
    }
}

fn bind_pair_list_builtins(env: &mut TypeEnvironment, gen: &VarGen) {
    // pair: ∀H, T. H -> T -> pair<H, T>
    let h = gen.fresh();
    let t = gen.fresh();
    env.bind(
        "pair",
        Binding::Schema(ForAll {
            quantified: vec![h, t],
            body: Term::function(
                vec![Term::Variable(h), Term::Variable(t)],
                Term::pair(Term::Variable(h), Term::Variable(t)),
            ),
        }),
        DeclKind::Const,
    );

    // head: ∀H, T. pair<H, T> -> H
    let h = gen.fresh();
    let t = gen.fresh();
    env.bind(
        "head",
        Binding::Schema(ForAll {
            quantified: vec![h, t],
            body: Term::function(
                vec![Term::pair(Term::Variable(h), Term::Variable(t))],
                Term::Variable(h),
            ),
        }),
        DeclKind::Const,
    );

    // tail: ∀H, T. pair<H, T> -> T
    let h = gen.fresh();
    let t = gen.fresh();
    env.bind(
        "tail",
        Binding::Schema(ForAll {
            quantified: vec![h, t],
            body: Term::function(
                vec![Term::pair(Term::Variable(h), Term::Variable(t))],
                Term::Variable(t),
            ),
        }),
        DeclKind::Const,
    );

    // is_pair / is_null / is_list: ∀T. T -> bool
    for name in ["is_pair", "is_null", "is_list", "is_number", "is_string", "is_boolean", "is_function"] {
        let t = gen.fresh();
        env.bind(
            name,
            Binding::Schema(ForAll {
                quantified: vec![t],
                body: Term::function(vec![Term::Variable(t)], Term::boolean()),
            }),
            DeclKind::Const,
        );
    }

    // list_to_string / display / error: ∀T. T -> string / T -> T / string -> undefined
    let t = gen.fresh();
    env.bind(
        "display",
        Binding::Schema(ForAll {
            quantified: vec![t],
            body: Term::function(vec![Term::Variable(t)], Term::Variable(t)),
        }),
        DeclKind::Const,
    );
    env.bind(
        "error",
        Binding::Schema(ForAll::mono(Term::function(vec![Term::string()], Term::undefined()))),
        DeclKind::Const,
    );

    // `set_head`/`set_tail` intentionally omitted — Open Question,
    // resolved in DESIGN.md.
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_environment_has_operators() {
        let gen = VarGen::new();
        let env = initial_environment(&gen);
        assert!(env.contains("+"));
        assert!(env.contains("==="));
        assert!(env.contains("pair"));
        assert!(env.contains("math_PI"));
        assert!(!env.contains("set_head"));
    }

    #[test]
    fn scopes_clone_independently() {
        let gen = VarGen::new();
        let mut env = initial_environment(&gen);
        let mut inner = env.clone();
        inner.bind("x", Binding::Raw(Term::number()), DeclKind::Let);
        assert!(!env.contains("x"));
        assert!(inner.contains("x"));
        env.bind("y", Binding::Raw(Term::string()), DeclKind::Const);
        assert!(!inner.contains("y"));
    }
}
