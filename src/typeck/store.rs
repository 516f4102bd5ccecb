//! Constraint store and unifier (§4.2).
//!
//! The store is an append-only ordered sequence, not a map: the
//! pair/list-folding rewrite in [`crate::typeck::subst`] depends on
//! earlier entries being visible before later ones, and first-wins
//! insertion is part of the contract (§3 invariants, §9 design note).

use crate::typeck::errors::{ArityError, CyclicError, StoreError, UnifyError};
use crate::typeck::types::{KindConstraint, Primitive, Term, TypeVar, VarGen};

#[derive(Debug, Default)]
pub struct ConstraintStore {
    /// `(lhs variable, resolved-ish rhs term)`, in insertion order.
    entries: Vec<(TypeVar, Term)>,
    /// Kind-tightening overrides applied to a variable's baseline kind
    /// during unification, keyed by variable id.
    kind_overrides: std::collections::HashMap<usize, KindConstraint>,
}

impl ConstraintStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// First store entry whose left side is `v`, the only lookup the
    /// store's contract permits (§3: a variable never appears on the
    /// left of two distinct entries, so "first" and "only" coincide once
    /// an entry exists).
    pub fn lookup(&self, v: TypeVar) -> Option<&Term> {
        self.entries.iter().find(|(lhs, _)| *lhs == v).map(|(_, rhs)| rhs)
    }

    pub fn entries(&self) -> impl Iterator<Item = &(TypeVar, Term)> {
        self.entries.iter()
    }

    pub fn effective_kind(&self, v: TypeVar) -> KindConstraint {
        self.kind_overrides.get(&v.id).copied().unwrap_or(v.kind)
    }

    fn tighten(&mut self, v: TypeVar, kind: KindConstraint) {
        let current = self.effective_kind(v);
        self.kind_overrides.insert(v.id, current.tighten(kind));
    }

    fn push(&mut self, lhs: TypeVar, rhs: Term) {
        debug_assert!(self.lookup(lhs).is_none(), "first-wins invariant violated");
        tracing::trace!(var = %lhs, term = %rhs, "constraint store entry");
        self.entries.push((lhs, rhs));
    }

    /// Attempts to extend the store with `lhs = rhs`. On failure the
    /// store is left unchanged, so the caller can convert the error to a
    /// diagnostic and continue inferring the rest of the program (§7).
    pub fn add_constraint(&mut self, lhs: Term, rhs: Term, gen: &VarGen) -> Result<(), StoreError> {
        let snapshot_len = self.entries.len();
        match self.unify(lhs, rhs, gen) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.entries.truncate(snapshot_len);
                Err(e)
            }
        }
    }

    fn unify(&mut self, lhs: Term, rhs: Term, gen: &VarGen) -> Result<(), StoreError> {
        use Term::*;
        match (lhs, rhs) {
            // Rule 1: identical primitives.
            (Primitive(a), Primitive(b)) if a == b => Ok(()),

            // Rule 2: two Arrays.
            (Array(e1), Array(e2)) => self.unify(*e1, *e2, gen),

            // Rule 3: two Lists.
            (List(e1), List(e2)) => self.unify(*e1, *e2, gen),

            // Rules 4-5: Pair vs List folds to `head = element`,
            // `tail = List(element)`.
            (Pair { head, tail }, List(e)) | (List(e), Pair { head, tail }) => {
                self.unify(*head, (*e).clone(), gen)?;
                self.unify(*tail, Term::List(e), gen)
            }

            // Rule 6: two Pairs.
            (Pair { head: h1, tail: t1 }, Pair { head: h2, tail: t2 }) => {
                self.unify(*h1, *h2, gen)?;
                self.unify(*t1, *t2, gen)
            }

            // Rule 7: variable on the left.
            (Variable(v), rhs) => self.unify_var(v, rhs, gen),

            // Rule 8: variable on the right only.
            (lhs, Variable(v)) => self.unify_var(v, lhs, gen),

            // Rule 9: two Functions.
            (Function { params: p1, ret: r1 }, Function { params: p2, ret: r2 }) => {
                if p1.len() != p2.len() {
                    return Err(ArityError { expected: p1.len(), found: p2.len() }.into());
                }
                for (a, b) in p1.into_iter().zip(p2.into_iter()) {
                    self.unify(a, b, gen)?;
                }
                self.unify(*r1, *r2, gen)
            }

            // Rule 10: anything else.
            (lhs, rhs) => Err(UnifyError::Mismatch { expected: lhs, found: rhs }.into()),
        }
    }

    fn unify_var(&mut self, v: TypeVar, rhs: Term, gen: &VarGen) -> Result<(), StoreError> {
        if let Term::Variable(v2) = &rhs {
            if *v2 == v {
                return Ok(());
            }
        }

        if rhs.contains(v) {
            return self.rescue_cyclic(v, rhs);
        }

        if self.effective_kind(v) == KindConstraint::Addable {
            if let Term::Primitive(p) = &rhs {
                if !matches!(p, Primitive::Number | Primitive::String) {
                    return Err(UnifyError::NotAddable { found: rhs }.into());
                }
            }
        }

        if let Some(existing) = self.lookup(v).cloned() {
            return self.unify(rhs, existing, gen);
        }

        if let Term::Variable(v2) = &rhs {
            if self.effective_kind(v) == KindConstraint::Addable {
                self.tighten(*v2, KindConstraint::Addable);
            }
        }

        let resolved_rhs = crate::typeck::subst::apply(&rhs, self, gen)?;
        self.push(v, resolved_rhs);
        Ok(())
    }

    /// Occurs-check failed; legalise if the shape is a cyclic list
    /// (`Pair(h, v)` or `Pair(h, Pair(_, v))`) by rewriting
    /// `v = List(h)` instead of raising [`CyclicError`].
    fn rescue_cyclic(&mut self, v: TypeVar, rhs: Term) -> Result<(), StoreError> {
        let head = match &rhs {
            Term::Pair { head, tail } => match tail.as_ref() {
                Term::Variable(t) if *t == v => Some((**head).clone()),
                Term::Pair { tail: inner_tail, .. } => match inner_tail.as_ref() {
                    Term::Variable(t) if *t == v => Some((**head).clone()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        };

        match head {
            Some(h) => {
                self.push(v, Term::list(h));
                Ok(())
            }
            None => Err(CyclicError { var: Term::Variable(v), in_term: rhs }.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unifies_identical_primitives() {
        let gen = VarGen::new();
        let mut store = ConstraintStore::new();
        assert!(store.add_constraint(Term::number(), Term::number(), &gen).is_ok());
    }

    #[test]
    fn rejects_mismatched_primitives() {
        let gen = VarGen::new();
        let mut store = ConstraintStore::new();
        assert!(store.add_constraint(Term::number(), Term::boolean(), &gen).is_err());
    }

    #[test]
    fn variable_resolves_to_primitive() {
        let gen = VarGen::new();
        let mut store = ConstraintStore::new();
        let v = gen.fresh();
        store.add_constraint(Term::Variable(v), Term::number(), &gen).unwrap();
        assert_eq!(store.lookup(v), Some(&Term::number()));
    }

    #[test]
    fn first_wins_redirects_to_unify() {
        let gen = VarGen::new();
        let mut store = ConstraintStore::new();
        let v = gen.fresh();
        store.add_constraint(Term::Variable(v), Term::number(), &gen).unwrap();
        // second constraint on the same var must not overwrite; it should
        // unify against the existing resolution instead.
        assert!(store.add_constraint(Term::Variable(v), Term::number(), &gen).is_ok());
        assert!(store.add_constraint(Term::Variable(v), Term::boolean(), &gen).is_err());
        assert_eq!(store.lookup(v), Some(&Term::number()));
    }

    #[test]
    fn occurs_check_rejects_non_list_cycle() {
        let gen = VarGen::new();
        let mut store = ConstraintStore::new();
        let v = gen.fresh();
        let cyclic = Term::function(vec![Term::Variable(v)], Term::number());
        assert!(store.add_constraint(Term::Variable(v), cyclic, &gen).is_err());
    }

    #[test]
    fn occurs_check_rescues_cyclic_list() {
        let gen = VarGen::new();
        let mut store = ConstraintStore::new();
        let v = gen.fresh();
        let h = gen.fresh_term();
        let cyclic_pair = Term::pair(h.clone(), Term::Variable(v));
        assert!(store.add_constraint(Term::Variable(v), cyclic_pair, &gen).is_ok());
        assert_eq!(store.lookup(v), Some(&Term::list(h)));
    }

    #[test]
    fn addable_rejects_boolean() {
        let gen = VarGen::new();
        let mut store = ConstraintStore::new();
        let v = gen.fresh_with_kind(KindConstraint::Addable);
        assert!(store.add_constraint(Term::Variable(v), Term::boolean(), &gen).is_err());
        assert!(store.add_constraint(Term::Variable(v), Term::number(), &gen).is_ok());
    }

    #[test]
    fn function_arity_mismatch() {
        let gen = VarGen::new();
        let mut store = ConstraintStore::new();
        let f1 = Term::function(vec![Term::number()], Term::number());
        let f2 = Term::function(vec![Term::number(), Term::number()], Term::number());
        assert!(store.add_constraint(f1, f2, &gen).is_err());
    }

    #[test]
    fn pair_list_fold() {
        let gen = VarGen::new();
        let mut store = ConstraintStore::new();
        // pair(1, pair(2, null)) against List(number) — null is List(fresh).
        let inner_list_var = gen.fresh_term();
        let inner = Term::pair(Term::number(), Term::list(inner_list_var.clone()));
        let outer = Term::pair(Term::number(), inner);
        assert!(store.add_constraint(outer, Term::list(Term::number()), &gen).is_ok());
    }
}
