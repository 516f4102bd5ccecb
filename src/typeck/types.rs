//! Type term representation (§3, §4.1): the algebraic definition of type
//! terms, kind-constrained type variables, and quantified schemas.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Restricts a type variable's possible resolutions. `Addable` admits
/// only `number`, `string`, or another (widening) variable — the
/// mechanism behind overloaded `+`, `===`, `<`, etc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindConstraint {
    None,
    Addable,
}

impl KindConstraint {
    /// Widening transfer: `none` tightens to `addable`, never the reverse.
    pub fn tighten(self, other: KindConstraint) -> KindConstraint {
        match (self, other) {
            (KindConstraint::Addable, _) | (_, KindConstraint::Addable) => KindConstraint::Addable,
            _ => KindConstraint::None,
        }
    }
}

/// `kind` is the constraint assigned at creation time and never mutated
/// in place; tightening an `addable` constraint onto an existing
/// `none`-kinded variable during unification is recorded out-of-band in
/// [`crate::typeck::store::ConstraintStore`]'s kind overrides, keyed by
/// `id`, since `id` alone already uniquely identifies a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeVar {
    pub id: usize,
    pub kind: KindConstraint,
}

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Number,
    String,
    Undefined,
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Primitive::Boolean => "boolean",
            Primitive::Number => "number",
            Primitive::String => "string",
            Primitive::Undefined => "undefined",
        };
        write!(f, "{s}")
    }
}

/// A type term: the sum type every node's `inferredType` and every
/// constraint's sides are drawn from.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Primitive(Primitive),
    Variable(TypeVar),
    Function {
        params: Vec<Term>,
        ret: Box<Term>,
    },
    Pair {
        head: Box<Term>,
        tail: Box<Term>,
    },
    List(Box<Term>),
    Array(Box<Term>),
}

impl Term {
    pub fn boolean() -> Term {
        Term::Primitive(Primitive::Boolean)
    }
    pub fn number() -> Term {
        Term::Primitive(Primitive::Number)
    }
    pub fn string() -> Term {
        Term::Primitive(Primitive::String)
    }
    pub fn undefined() -> Term {
        Term::Primitive(Primitive::Undefined)
    }

    pub fn function(params: Vec<Term>, ret: Term) -> Term {
        Term::Function { params, ret: Box::new(ret) }
    }

    pub fn pair(head: Term, tail: Term) -> Term {
        Term::Pair { head: Box::new(head), tail: Box::new(tail) }
    }

    pub fn list(elem: Term) -> Term {
        Term::List(Box::new(elem))
    }

    pub fn array(elem: Term) -> Term {
        Term::Array(Box::new(elem))
    }

    pub fn as_variable(&self) -> Option<TypeVar> {
        match self {
            Term::Variable(v) => Some(*v),
            _ => None,
        }
    }

    /// Free type variables occurring anywhere inside this term.
    pub fn free_variables(&self) -> HashSet<TypeVar> {
        let mut set = HashSet::new();
        self.collect_free_variables(&mut set);
        set
    }

    fn collect_free_variables(&self, set: &mut HashSet<TypeVar>) {
        match self {
            Term::Primitive(_) => {}
            Term::Variable(v) => {
                set.insert(*v);
            }
            Term::Function { params, ret } => {
                for p in params {
                    p.collect_free_variables(set);
                }
                ret.collect_free_variables(set);
            }
            Term::Pair { head, tail } => {
                head.collect_free_variables(set);
                tail.collect_free_variables(set);
            }
            Term::List(e) | Term::Array(e) => e.collect_free_variables(set),
        }
    }

    /// Structural `contains` used by the occurs-check: does `self` contain
    /// `var` anywhere inside it (not counting `self` itself being exactly
    /// that variable, which callers check separately)?
    pub fn contains(&self, var: TypeVar) -> bool {
        match self {
            Term::Primitive(_) => false,
            Term::Variable(v) => *v == var,
            Term::Function { params, ret } => {
                params.iter().any(|p| p.contains(var)) || ret.contains(var)
            }
            Term::Pair { head, tail } => head.contains(var) || tail.contains(var),
            Term::List(e) | Term::Array(e) => e.contains(var),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Primitive(p) => write!(f, "{p}"),
            Term::Variable(v) => write!(f, "{v}"),
            Term::Function { params, ret } => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ") -> {ret}")
            }
            Term::Pair { head, tail } => write!(f, "pair<{head}, {tail}>"),
            Term::List(e) => write!(f, "list<{e}>"),
            Term::Array(e) => write!(f, "{e}[]"),
        }
    }
}

/// A universally quantified type schema. Schemas never nest, and a bare
/// schema must never be handed to the unifier — it is consumed only by
/// `instantiate`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForAll {
    pub quantified: Vec<TypeVar>,
    pub body: Term,
}

impl ForAll {
    /// Wraps a term with no quantified variables (a monotype schema),
    /// used for builtins and bindings that never generalise.
    pub fn mono(term: Term) -> ForAll {
        ForAll { quantified: Vec::new(), body: term }
    }

    pub fn is_mono(&self) -> bool {
        self.quantified.is_empty()
    }
}

impl fmt::Display for ForAll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quantified.is_empty() {
            return write!(f, "{}", self.body);
        }
        write!(f, "forall ")?;
        for (i, v) in self.quantified.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, ". {}", self.body)
    }
}

/// Process-wide-looking but thread-confined fresh-variable counter.
/// Reset at the start of every top-level `type_check` invocation so two
/// independent runs over the same program produce byte-identical names
/// (§5 determinism guarantee).
#[derive(Debug)]
pub struct VarGen {
    next: AtomicUsize,
}

impl VarGen {
    pub fn new() -> Self {
        Self { next: AtomicUsize::new(0) }
    }

    pub fn fresh(&self) -> TypeVar {
        self.fresh_with_kind(KindConstraint::None)
    }

    pub fn fresh_with_kind(&self, kind: KindConstraint) -> TypeVar {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        TypeVar { id, kind }
    }

    pub fn fresh_term(&self) -> Term {
        Term::Variable(self.fresh())
    }
}

impl Default for VarGen {
    fn default() -> Self {
        Self::new()
    }
}

/// Replaces every free variable of `schema` with a freshly minted
/// variable of the same kind, producing a monotype (§4.1 `instantiate`).
pub fn instantiate(schema: &ForAll, gen: &VarGen) -> Term {
    if schema.quantified.is_empty() {
        return schema.body.clone();
    }
    let mapping: std::collections::HashMap<TypeVar, Term> = schema
        .quantified
        .iter()
        .map(|v| (*v, Term::Variable(gen.fresh_with_kind(v.kind))))
        .collect();
    substitute_vars(&schema.body, &mapping)
}

fn substitute_vars(term: &Term, mapping: &std::collections::HashMap<TypeVar, Term>) -> Term {
    match term {
        Term::Primitive(_) => term.clone(),
        Term::Variable(v) => mapping.get(v).cloned().unwrap_or_else(|| term.clone()),
        Term::Function { params, ret } => Term::Function {
            params: params.iter().map(|p| substitute_vars(p, mapping)).collect(),
            ret: Box::new(substitute_vars(ret, mapping)),
        },
        Term::Pair { head, tail } => Term::Pair {
            head: Box::new(substitute_vars(head, mapping)),
            tail: Box::new(substitute_vars(tail, mapping)),
        },
        Term::List(e) => Term::List(Box::new(substitute_vars(e, mapping))),
        Term::Array(e) => Term::Array(Box::new(substitute_vars(e, mapping))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_vars_are_unique_and_sequential() {
        let gen = VarGen::new();
        let a = gen.fresh();
        let b = gen.fresh();
        assert_eq!(a.id, 0);
        assert_eq!(b.id, 1);
    }

    #[test]
    fn addable_tighten_is_one_directional() {
        assert_eq!(
            KindConstraint::None.tighten(KindConstraint::Addable),
            KindConstraint::Addable
        );
        assert_eq!(
            KindConstraint::Addable.tighten(KindConstraint::None),
            KindConstraint::Addable
        );
        assert_eq!(KindConstraint::None.tighten(KindConstraint::None), KindConstraint::None);
    }

    #[test]
    fn free_variables_collects_nested() {
        let gen = VarGen::new();
        let a = gen.fresh_term();
        let b = gen.fresh_term();
        let f = Term::function(vec![a.clone()], b.clone());
        let vars = f.free_variables();
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn instantiate_replaces_quantified_with_fresh() {
        let gen = VarGen::new();
        let v = gen.fresh();
        let schema = ForAll { quantified: vec![v], body: Term::function(vec![Term::Variable(v)], Term::Variable(v)) };
        let t1 = instantiate(&schema, &gen);
        let t2 = instantiate(&schema, &gen);
        assert_ne!(t1, t2);
    }

    #[test]
    fn mono_schema_instantiates_to_itself() {
        let gen = VarGen::new();
        let schema = ForAll::mono(Term::number());
        assert_eq!(instantiate(&schema, &gen), Term::number());
    }

    #[test]
    fn occurs_in_detects_nested_variable() {
        let gen = VarGen::new();
        let v = gen.fresh();
        let t = Term::list(Term::Variable(v));
        assert!(t.contains(v));
        assert!(!Term::number().contains(v));
    }
}
