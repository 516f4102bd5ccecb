//! Substitution walker (§4.3): `apply` is the canonical-form operator,
//! followed by two post-order normalisation rewrites that collapse
//! pair-of-list / list-of-pair shapes into canonical `list<T>` forms.

use crate::typeck::errors::{CyclicError, StoreError};
use crate::typeck::store::ConstraintStore;
use crate::typeck::types::{Term, VarGen};
use std::collections::HashSet;

/// Recursively rewrites `term` by following every variable to its
/// store-resolved value, then applies the two normalisation rewrites.
pub fn apply(term: &Term, store: &mut ConstraintStore, gen: &VarGen) -> Result<Term, StoreError> {
    let mut seen = HashSet::new();
    let structural = apply_structural(term, store, gen, &mut seen)?;
    normalize(structural, store, gen)
}

fn apply_structural(
    term: &Term,
    store: &mut ConstraintStore,
    gen: &VarGen,
    seen: &mut HashSet<usize>,
) -> Result<Term, StoreError> {
    match term {
        Term::Primitive(_) => Ok(term.clone()),
        Term::Variable(v) => {
            let Some(resolved) = store.lookup(*v).cloned() else {
                return Ok(term.clone());
            };
            if !seen.insert(v.id) {
                return Err(CyclicError { var: term.clone(), in_term: resolved }.into());
            }
            let result = apply_structural(&resolved, store, gen, seen);
            seen.remove(&v.id);
            result
        }
        Term::Function { params, ret } => Ok(Term::Function {
            params: params
                .iter()
                .map(|p| apply_structural(p, store, gen, seen))
                .collect::<Result<_, _>>()?,
            ret: Box::new(apply_structural(ret, store, gen, seen)?),
        }),
        Term::Pair { head, tail } => Ok(Term::pair(
            apply_structural(head, store, gen, seen)?,
            apply_structural(tail, store, gen, seen)?,
        )),
        Term::List(e) => Ok(Term::list(apply_structural(e, store, gen, seen)?)),
        Term::Array(e) => Ok(Term::array(apply_structural(e, store, gen, seen)?)),
    }
}

/// Post-order normalisation: unrolls a bare `list<e>` one step for
/// display-friendliness, and folds `pair(h1, pair(h2, list(h3)))` by
/// recording that every element of a list must be identical.
fn normalize(term: Term, store: &mut ConstraintStore, gen: &VarGen) -> Result<Term, StoreError> {
    match term {
        Term::List(e) => {
            let e = normalize(*e, store, gen)?;
            Ok(Term::pair(e.clone(), Term::list(e)))
        }
        Term::Pair { head: h1, tail } => {
            let h1 = normalize(*h1, store, gen)?;
            let tail = normalize(*tail, store, gen)?;
            if let Term::Pair { head: h2, tail: inner_tail } = &tail {
                if let Term::List(h3) = inner_tail.as_ref() {
                    store.add_constraint((**h2).clone(), (**h3).clone(), gen)?;
                    store.add_constraint((**h2).clone(), h1.clone(), gen)?;
                    return Ok(Term::pair((**h2).clone(), (**inner_tail).clone()));
                }
            }
            Ok(Term::pair(h1, tail))
        }
        Term::Function { params, ret } => Ok(Term::Function {
            params: params
                .into_iter()
                .map(|p| normalize(p, store, gen))
                .collect::<Result<_, _>>()?,
            ret: Box::new(normalize(*ret, store, gen)?),
        }),
        Term::Array(e) => Ok(Term::array(normalize(*e, store, gen)?)),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeck::types::Term;

    #[test]
    fn apply_follows_chain_of_variables() {
        let gen = VarGen::new();
        let mut store = ConstraintStore::new();
        let a = gen.fresh();
        let b = gen.fresh();
        store.add_constraint(Term::Variable(a), Term::Variable(b), &gen).unwrap();
        store.add_constraint(Term::Variable(b), Term::number(), &gen).unwrap();
        let resolved = apply(&Term::Variable(a), &mut store, &gen).unwrap();
        assert_eq!(resolved, Term::number());
    }

    #[test]
    fn bare_list_unrolls_to_pair() {
        let gen = VarGen::new();
        let mut store = ConstraintStore::new();
        let resolved = apply(&Term::list(Term::number()), &mut store, &gen).unwrap();
        assert_eq!(resolved, Term::pair(Term::number(), Term::list(Term::number())));
    }

    #[test]
    fn unapplied_variable_is_identity() {
        let gen = VarGen::new();
        let mut store = ConstraintStore::new();
        let v = gen.fresh_term();
        assert_eq!(apply(&v, &mut store, &gen).unwrap(), v);
    }
}
