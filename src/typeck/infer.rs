//! The inferencer (§4.4): a three-pass tree traversal over the typed AST.
//!
//! Pass A decorates every node with a fresh type variable. Pass B walks
//! the tree with a lexically scoped environment, emitting constraints per
//! syntactic form and converting unification failures into diagnostics
//! without aborting traversal. Pass C re-walks the tree substituting
//! solved types back onto every node.

use crate::parser::ast::*;
use crate::typeck::diagnostics::{Diagnostic, DiagnosticKind};
use crate::typeck::env::{Binding, TypeEnvironment};
use crate::typeck::errors::StoreError;
use crate::typeck::store::ConstraintStore;
use crate::typeck::types::{ForAll, Term, VarGen};
use crate::span::Span;

pub struct Inferencer {
    store: ConstraintStore,
    gen: VarGen,
    diagnostics: Vec<Diagnostic>,
}

impl Inferencer {
    pub fn new() -> Self {
        Self { store: ConstraintStore::new(), gen: VarGen::new(), diagnostics: Vec::new() }
    }

    /// Runs all three passes over `program` and returns the ordered
    /// diagnostic list. The program's nodes are mutated in place with
    /// resolved types (Pass C).
    pub fn check_program(&mut self, program: &mut Program, base_env: &TypeEnvironment) -> Vec<Diagnostic> {
        let _span = tracing::debug_span!("type_check").entered();

        {
            let _span = tracing::debug_span!("pass_a_decoration").entered();
            self.decorate_block(&mut program.body);
        }

        {
            let _span = tracing::debug_span!("pass_b_constraint_emission").entered();
            self.infer_block(&mut program.body, base_env, true);
        }

        {
            let _span = tracing::debug_span!("pass_c_resolution").entered();
            self.resolve_block(&mut program.body);
        }

        std::mem::take(&mut self.diagnostics)
    }

    fn apply(&mut self, term: &Term) -> Term {
        match crate::typeck::subst::apply(term, &mut self.store, &self.gen) {
            Ok(t) => t,
            Err(_) => term.clone(),
        }
    }

    fn unify(&mut self, lhs: Term, rhs: Term) -> Result<(), StoreError> {
        self.store.add_constraint(lhs, rhs, &self.gen)
    }

    fn push_diagnostic(&mut self, kind: DiagnosticKind, span: Span) {
        self.diagnostics.push(Diagnostic::new(kind, span));
    }

    // ---- Pass A: decoration ----

    fn decorate_block(&mut self, block: &mut Block) {
        for stmt in &mut block.statements {
            self.decorate_stmt(stmt);
        }
    }

    fn decorate_stmt(&mut self, stmt: &mut Statement) {
        stmt.meta.inferred_type = self.gen.fresh_term();
        stmt.meta.typability = Typability::NotYetTyped;
        match &mut stmt.kind {
            StatementKind::VariableDeclaration { init, .. } => self.decorate_expr(init),
            StatementKind::FunctionDeclaration { body, function_inferred_type, .. } => {
                *function_inferred_type = self.gen.fresh_term();
                self.decorate_block(body);
            }
            StatementKind::Expression(e) => self.decorate_expr(e),
            StatementKind::Return(Some(e)) => self.decorate_expr(e),
            StatementKind::Return(None) => {}
            StatementKind::If { test, consequent, alternate } => {
                self.decorate_expr(test);
                self.decorate_block(consequent);
                if let Some(alt) = alternate {
                    self.decorate_block(alt);
                }
            }
            StatementKind::While { test, body } => {
                self.decorate_expr(test);
                self.decorate_block(body);
            }
            StatementKind::For { init, test, update, body } => {
                self.decorate_stmt(init);
                self.decorate_expr(test);
                self.decorate_expr(update);
                self.decorate_block(body);
            }
            StatementKind::Block(b) => self.decorate_block(b),
        }
    }

    fn decorate_expr(&mut self, expr: &mut Expr) {
        expr.meta.inferred_type = self.gen.fresh_term();
        expr.meta.typability = Typability::NotYetTyped;
        match &mut expr.kind {
            ExprKind::Literal(_) | ExprKind::Identifier(_) => {}
            ExprKind::Unary { operand, .. } => self.decorate_expr(operand),
            ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
                self.decorate_expr(left);
                self.decorate_expr(right);
            }
            ExprKind::Conditional { test, consequent, alternate } => {
                self.decorate_expr(test);
                self.decorate_expr(consequent);
                self.decorate_expr(alternate);
            }
            ExprKind::Call { callee, args } => {
                self.decorate_expr(callee);
                for a in args {
                    self.decorate_expr(a);
                }
            }
            ExprKind::Arrow { body, .. } => match body {
                ArrowBody::Expr(e) => self.decorate_expr(e),
                ArrowBody::Block(b) => self.decorate_block(b),
            },
            ExprKind::Assignment { target, value } => {
                if let AssignTarget::Member { object, index } = target {
                    self.decorate_expr(object);
                    self.decorate_expr(index);
                }
                self.decorate_expr(value);
            }
            ExprKind::Member { object, index } => {
                self.decorate_expr(object);
                self.decorate_expr(index);
            }
            ExprKind::Array(elems) => {
                for e in elems {
                    self.decorate_expr(e);
                }
            }
        }
    }

    // ---- Pass B: constraint emission ----

    fn infer_block(&mut self, block: &mut Block, parent_env: &TypeEnvironment, tail_context: bool) -> Term {
        let mut env = parent_env.clone();

        let mut decl_names: Vec<String> = Vec::new();
        for stmt in &block.statements {
            match &stmt.kind {
                StatementKind::VariableDeclaration { kind, name, .. } => {
                    env.bind(name.clone(), Binding::Raw(self.gen.fresh_term()), *kind);
                    decl_names.push(name.clone());
                }
                StatementKind::FunctionDeclaration { name, function_inferred_type, .. } => {
                    env.bind(name.clone(), Binding::Raw(function_inferred_type.clone()), DeclKind::Const);
                    decl_names.push(name.clone());
                }
                _ => {}
            }
        }

        let last_index = block.statements.len().checked_sub(1);
        for (i, stmt) in block.statements.iter_mut().enumerate() {
            let is_tail = tail_context && last_index == Some(i);
            self.infer_stmt(stmt, &mut env, is_tail);
        }

        for name in &decl_names {
            self.generalize_binding(&mut env, parent_env, name);
        }

        self.compute_block_value(block, tail_context)
    }

    fn generalize_binding(&mut self, env: &mut TypeEnvironment, parent_env: &TypeEnvironment, name: &str) {
        let Some(Binding::Raw(t)) = env.lookup(name).cloned() else { return };
        let applied = self.apply(&t);
        let free = applied.free_variables();
        let env_free = self.free_vars_of_env(parent_env);
        let quantified: Vec<_> = free.into_iter().filter(|v| !env_free.contains(v)).collect();
        let kind = env.decl_kind(name).unwrap_or(DeclKind::Const);
        env.bind(name.to_string(), Binding::Schema(ForAll { quantified, body: applied }), kind);
    }

    fn free_vars_of_env(&mut self, env: &TypeEnvironment) -> std::collections::HashSet<crate::typeck::types::TypeVar> {
        // Schemas' own quantified variables are already bound, so only a
        // raw binding's applied free variables are "free in the
        // environment" for generalisation-safety purposes.
        let mut set = std::collections::HashSet::new();
        for name in env.names() {
            if let Some(Binding::Raw(t)) = env.lookup(name) {
                let applied = self.apply(t);
                set.extend(applied.free_variables());
            }
        }
        set
    }

    fn infer_stmt(&mut self, stmt: &mut Statement, env: &mut TypeEnvironment, is_tail: bool) {
        let span = stmt.meta.span;
        match &mut stmt.kind {
            StatementKind::VariableDeclaration { name, init, .. } => {
                self.infer_expr(init, env);
                let init_applied = self.apply(&init.meta.inferred_type);
                if let Some(Binding::Raw(raw)) = env.lookup(name).cloned() {
                    let _ = self.unify(raw, init_applied);
                }
                let _ = self.unify(stmt.meta.inferred_type.clone(), Term::undefined());
            }
            StatementKind::FunctionDeclaration { params, body, function_inferred_type, .. } => {
                let mut fn_env = env.clone();
                let param_vars: Vec<Term> = params
                    .iter()
                    .map(|p| {
                        let v = self.gen.fresh_term();
                        fn_env.bind(p.clone(), Binding::Raw(v.clone()), DeclKind::Let);
                        v
                    })
                    .collect();
                let body_value = self.infer_block(body, &fn_env, false);
                let fn_type = Term::function(param_vars, body_value);
                let _ = self.unify(function_inferred_type.clone(), fn_type);
                let _ = self.unify(stmt.meta.inferred_type.clone(), Term::undefined());
            }
            StatementKind::Expression(e) => {
                self.infer_expr(e, env);
                let _ = self.unify(stmt.meta.inferred_type.clone(), Term::undefined());
            }
            StatementKind::Return(value) => {
                let t = match value {
                    Some(e) => {
                        self.infer_expr(e, env);
                        self.apply(&e.meta.inferred_type)
                    }
                    None => Term::undefined(),
                };
                let _ = self.unify(stmt.meta.inferred_type.clone(), t);
            }
            StatementKind::If { test, consequent, alternate } => {
                self.infer_expr(test, env);
                let test_applied = self.apply(&test.meta.inferred_type);
                if self.unify(test_applied.clone(), Term::boolean()).is_err() {
                    self.push_diagnostic(
                        DiagnosticKind::InvalidTestCondition { received: test_applied },
                        test.meta.span,
                    );
                }
                let consequent_value = self.infer_block(consequent, env, is_tail);
                let _ = self.unify(stmt.meta.inferred_type.clone(), consequent_value.clone());
                if let Some(alt) = alternate {
                    let alternate_value = self.infer_block(alt, env, is_tail);
                    if self.unify(consequent_value.clone(), alternate_value.clone()).is_err() {
                        self.push_diagnostic(
                            DiagnosticKind::ConsequentAlternateMismatch {
                                consequent: consequent_value,
                                alternate: alternate_value,
                            },
                            span,
                        );
                    }
                }
            }
            StatementKind::While { test, body } => {
                self.infer_expr(test, env);
                let test_applied = self.apply(&test.meta.inferred_type);
                if self.unify(test_applied.clone(), Term::boolean()).is_err() {
                    self.push_diagnostic(
                        DiagnosticKind::InvalidTestCondition { received: test_applied },
                        test.meta.span,
                    );
                }
                let body_value = self.infer_block(body, env, false);
                let _ = self.unify(stmt.meta.inferred_type.clone(), body_value);
            }
            StatementKind::For { init, test, update, body } => {
                let mut loop_env = env.clone();
                if let StatementKind::VariableDeclaration { kind, name, .. } = &init.kind {
                    loop_env.bind(name.clone(), Binding::Raw(self.gen.fresh_term()), *kind);
                }
                self.infer_stmt(init, &mut loop_env, false);
                if let StatementKind::VariableDeclaration { name, .. } = &init.kind {
                    self.generalize_binding(&mut loop_env, env, name);
                }
                self.infer_expr(test, &loop_env);
                let test_applied = self.apply(&test.meta.inferred_type);
                if self.unify(test_applied.clone(), Term::boolean()).is_err() {
                    self.push_diagnostic(
                        DiagnosticKind::InvalidTestCondition { received: test_applied },
                        test.meta.span,
                    );
                }
                self.infer_expr(update, &loop_env);
                let body_value = self.infer_block(body, &loop_env, false);
                let _ = self.unify(stmt.meta.inferred_type.clone(), body_value);
            }
            StatementKind::Block(inner) => {
                let value = self.infer_block(inner, env, is_tail);
                let _ = self.unify(stmt.meta.inferred_type.clone(), value);
            }
        }
    }

    fn infer_expr(&mut self, expr: &mut Expr, env: &TypeEnvironment) {
        let span = expr.meta.span;
        match &mut expr.kind {
            ExprKind::Literal(lit) => {
                let t = match lit {
                    Literal::Number(_) => Term::number(),
                    Literal::Str(_) => Term::string(),
                    Literal::Bool(_) => Term::boolean(),
                    Literal::Null => Term::list(self.gen.fresh_term()),
                    Literal::Undefined => Term::undefined(),
                };
                let _ = self.unify(expr.meta.inferred_type.clone(), t);
            }
            ExprKind::Identifier(name) => match env.lookup(name).cloned() {
                Some(binding) => {
                    let t = binding.resolve(&self.gen);
                    let _ = self.unify(expr.meta.inferred_type.clone(), t);
                }
                None => {
                    self.push_diagnostic(
                        DiagnosticKind::UndefinedIdentifier { name: name.clone() },
                        span,
                    );
                }
            },
            ExprKind::Unary { op, operand } => {
                self.infer_expr(operand, env);
                let operand_applied = self.apply(&operand.meta.inferred_type);
                let op_name = match op {
                    UnaryOp::Neg => "-_1",
                    UnaryOp::Not => "!",
                };
                self.apply_operator(op_name, vec![operand_applied], &expr.meta.inferred_type.clone(), env, span);
            }
            ExprKind::Binary { op, left, right } => {
                self.infer_expr(left, env);
                self.infer_expr(right, env);
                let l = self.apply(&left.meta.inferred_type);
                let r = self.apply(&right.meta.inferred_type);
                self.apply_operator(op.env_name(), vec![l, r], &expr.meta.inferred_type.clone(), env, span);
            }
            ExprKind::Logical { op, left, right } => {
                self.infer_expr(left, env);
                self.infer_expr(right, env);
                let l = self.apply(&left.meta.inferred_type);
                let r = self.apply(&right.meta.inferred_type);
                self.apply_operator(op.env_name(), vec![l, r], &expr.meta.inferred_type.clone(), env, span);
            }
            ExprKind::Conditional { test, consequent, alternate } => {
                self.infer_expr(test, env);
                let test_applied = self.apply(&test.meta.inferred_type);
                if self.unify(test_applied.clone(), Term::boolean()).is_err() {
                    self.push_diagnostic(
                        DiagnosticKind::InvalidTestCondition { received: test_applied },
                        test.meta.span,
                    );
                }
                self.infer_expr(consequent, env);
                self.infer_expr(alternate, env);
                let c = self.apply(&consequent.meta.inferred_type);
                let a = self.apply(&alternate.meta.inferred_type);
                let _ = self.unify(expr.meta.inferred_type.clone(), c.clone());
                if self.unify(c.clone(), a.clone()).is_err() {
                    self.push_diagnostic(
                        DiagnosticKind::ConsequentAlternateMismatch { consequent: c, alternate: a },
                        span,
                    );
                }
            }
            ExprKind::Call { callee, args } => {
                self.infer_expr(callee, env);
                for a in args.iter_mut() {
                    self.infer_expr(a, env);
                }
                let callee_applied = self.apply(&callee.meta.inferred_type);
                let arg_spans: Vec<Span> = args.iter().map(|a| a.meta.span).collect();
                let arg_types: Vec<Term> = args.iter().map(|a| self.apply(&a.meta.inferred_type)).collect();
                let actual_fn = Term::function(arg_types.clone(), expr.meta.inferred_type.clone());
                match self.unify(actual_fn, callee_applied.clone()) {
                    Ok(()) => {}
                    Err(StoreError::Arity(e)) => {
                        self.push_diagnostic(
                            DiagnosticKind::DifferentNumberArguments { expected: e.expected, received: e.found },
                            span,
                        );
                    }
                    Err(_) => {
                        let expected = match &callee_applied {
                            Term::Function { params, .. } => params.clone(),
                            _ => Vec::new(),
                        };
                        self.push_diagnostic(
                            DiagnosticKind::InvalidArgumentTypes {
                                expected,
                                received: arg_types,
                                argument_spans: arg_spans,
                            },
                            span,
                        );
                    }
                }
            }
            ExprKind::Arrow { params, body } => {
                let mut fn_env = env.clone();
                let param_vars: Vec<Term> = params
                    .iter()
                    .map(|p| {
                        let v = self.gen.fresh_term();
                        fn_env.bind(p.clone(), Binding::Raw(v.clone()), DeclKind::Let);
                        v
                    })
                    .collect();
                let body_value = match body {
                    ArrowBody::Expr(e) => {
                        self.infer_expr(e, &fn_env);
                        self.apply(&e.meta.inferred_type)
                    }
                    ArrowBody::Block(b) => self.infer_block(b, &fn_env, false),
                };
                let fn_type = Term::function(param_vars, body_value);
                let _ = self.unify(expr.meta.inferred_type.clone(), fn_type);
            }
            ExprKind::Assignment { target, value } => {
                self.infer_expr(value, env);
                let value_applied = self.apply(&value.meta.inferred_type);
                match target {
                    AssignTarget::Identifier(name) => {
                        if env.decl_kind(name) == Some(DeclKind::Const) {
                            self.push_diagnostic(
                                DiagnosticKind::ReassignConst { name: name.clone() },
                                span,
                            );
                        } else if let Some(binding) = env.lookup(name).cloned() {
                            let target_type = binding.resolve(&self.gen);
                            if self.unify(target_type.clone(), value_applied.clone()).is_err() {
                                self.push_diagnostic(
                                    DiagnosticKind::DifferentAssignment {
                                        name: name.clone(),
                                        expected: target_type,
                                        received: value_applied.clone(),
                                    },
                                    span,
                                );
                            }
                        } else {
                            self.push_diagnostic(
                                DiagnosticKind::UndefinedIdentifier { name: name.clone() },
                                span,
                            );
                        }
                    }
                    AssignTarget::Member { object, index } => {
                        self.infer_expr(object, env);
                        self.infer_expr(index, env);
                        let index_applied = self.apply(&index.meta.inferred_type);
                        if self.unify(index_applied.clone(), Term::number()).is_err() {
                            self.push_diagnostic(
                                DiagnosticKind::InvalidArrayIndexType { received: index_applied },
                                index.meta.span,
                            );
                        }
                        let elem = self.gen.fresh_term();
                        let object_applied = self.apply(&object.meta.inferred_type);
                        if self.unify(object_applied, Term::array(elem.clone())).is_ok()
                            && self.unify(elem.clone(), value_applied.clone()).is_err()
                        {
                            self.push_diagnostic(
                                DiagnosticKind::ArrayAssignment { expected: elem, received: value_applied.clone() },
                                span,
                            );
                        }
                    }
                }
                let _ = self.unify(expr.meta.inferred_type.clone(), value_applied);
            }
            ExprKind::Member { object, index } => {
                self.infer_expr(object, env);
                self.infer_expr(index, env);
                let index_applied = self.apply(&index.meta.inferred_type);
                if self.unify(index_applied.clone(), Term::number()).is_err() {
                    self.push_diagnostic(
                        DiagnosticKind::InvalidArrayIndexType { received: index_applied },
                        index.meta.span,
                    );
                }
                let elem = self.gen.fresh_term();
                let object_applied = self.apply(&object.meta.inferred_type);
                let _ = self.unify(object_applied, Term::array(elem.clone()));
                let _ = self.unify(expr.meta.inferred_type.clone(), elem);
            }
            ExprKind::Array(elems) => {
                let elem_var = self.gen.fresh_term();
                for e in elems.iter_mut() {
                    self.infer_expr(e, env);
                    let e_applied = self.apply(&e.meta.inferred_type);
                    if self.unify(elem_var.clone(), e_applied.clone()).is_err() {
                        self.push_diagnostic(
                            DiagnosticKind::ArrayAssignment { expected: elem_var.clone(), received: e_applied },
                            e.meta.span,
                        );
                    }
                }
                let _ = self.unify(expr.meta.inferred_type.clone(), Term::array(elem_var));
            }
        }
    }

    /// Shared plumbing for unary/binary/logical operator application:
    /// look up the operator's (always-present) schema, instantiate it,
    /// and unify the actual call shape against it.
    fn apply_operator(
        &mut self,
        op_name: &str,
        arg_types: Vec<Term>,
        result_var: &Term,
        env: &TypeEnvironment,
        span: Span,
    ) {
        let Some(binding) = env.lookup(op_name).cloned() else {
            self.push_diagnostic(
                DiagnosticKind::InternalTypeError { message: format!("operator `{op_name}` is not bound") },
                span,
            );
            return;
        };
        let op_type = binding.resolve(&self.gen);
        let actual_fn = Term::function(arg_types.clone(), result_var.clone());
        if self.unify(actual_fn, op_type.clone()).is_err() {
            let expected = match &op_type {
                Term::Function { params, .. } => params.clone(),
                _ => Vec::new(),
            };
            self.push_diagnostic(
                DiagnosticKind::InvalidArgumentTypes { expected, received: arg_types, argument_spans: Vec::new() },
                span,
            );
        }
    }

    fn compute_block_value(&mut self, block: &Block, tail_context: bool) -> Term {
        match self.designated_statement_index(block, tail_context) {
            None => Term::undefined(),
            Some(i) => {
                let stmt = &block.statements[i];
                match &stmt.kind {
                    StatementKind::Expression(e) => self.apply(&e.meta.inferred_type),
                    StatementKind::Return(Some(e)) => self.apply(&e.meta.inferred_type),
                    StatementKind::Return(None) => Term::undefined(),
                    _ => self.apply(&stmt.meta.inferred_type),
                }
            }
        }
    }

    fn designated_statement_index(&self, block: &Block, tail_context: bool) -> Option<usize> {
        if tail_context {
            block.statements.iter().enumerate().rev().find_map(|(i, stmt)| {
                matches!(
                    stmt.kind,
                    StatementKind::Expression(_)
                        | StatementKind::Block(_)
                        | StatementKind::If { .. }
                        | StatementKind::Return(_)
                )
                .then_some(i)
            })
        } else {
            let first_return = block
                .statements
                .iter()
                .position(|s| matches!(s.kind, StatementKind::Return(_)));
            first_return.or_else(|| block.statements.len().checked_sub(1))
        }
    }

    // ---- Pass C: resolution ----

    fn resolve_block(&mut self, block: &mut Block) {
        for stmt in &mut block.statements {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_stmt(&mut self, stmt: &mut Statement) {
        match &mut stmt.kind {
            StatementKind::VariableDeclaration { init, .. } => self.resolve_expr(init),
            StatementKind::FunctionDeclaration { name, body, function_inferred_type, .. } => {
                match crate::typeck::subst::apply(function_inferred_type, &mut self.store, &self.gen) {
                    Ok(t) => *function_inferred_type = t,
                    Err(_) => {
                        // Cancellation of subtrees (§4.4): a cyclic
                        // function type aborts only this declaration.
                        let name = name.clone();
                        self.diagnostics.push(Diagnostic::new(
                            DiagnosticKind::CyclicReference { name },
                            stmt.meta.span,
                        ));
                        stmt.meta.typability = Typability::Typed;
                        return;
                    }
                }
                self.resolve_block(body);
            }
            StatementKind::Expression(e) => self.resolve_expr(e),
            StatementKind::Return(Some(e)) => self.resolve_expr(e),
            StatementKind::Return(None) => {}
            StatementKind::If { test, consequent, alternate } => {
                self.resolve_expr(test);
                self.resolve_block(consequent);
                if let Some(alt) = alternate {
                    self.resolve_block(alt);
                }
            }
            StatementKind::While { test, body } => {
                self.resolve_expr(test);
                self.resolve_block(body);
            }
            StatementKind::For { init, test, update, body } => {
                self.resolve_stmt(init);
                self.resolve_expr(test);
                self.resolve_expr(update);
                self.resolve_block(body);
            }
            StatementKind::Block(b) => self.resolve_block(b),
        }
        stmt.meta.inferred_type = self.apply(&stmt.meta.inferred_type);
        stmt.meta.typability = Typability::Typed;
    }

    fn resolve_expr(&mut self, expr: &mut Expr) {
        match &mut expr.kind {
            ExprKind::Literal(_) | ExprKind::Identifier(_) => {}
            ExprKind::Unary { operand, .. } => self.resolve_expr(operand),
            ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            ExprKind::Conditional { test, consequent, alternate } => {
                self.resolve_expr(test);
                self.resolve_expr(consequent);
                self.resolve_expr(alternate);
            }
            ExprKind::Call { callee, args } => {
                self.resolve_expr(callee);
                for a in args {
                    self.resolve_expr(a);
                }
            }
            ExprKind::Arrow { body, .. } => match body {
                ArrowBody::Expr(e) => self.resolve_expr(e),
                ArrowBody::Block(b) => self.resolve_block(b),
            },
            ExprKind::Assignment { target, value } => {
                if let AssignTarget::Member { object, index } = target {
                    self.resolve_expr(object);
                    self.resolve_expr(index);
                }
                self.resolve_expr(value);
            }
            ExprKind::Member { object, index } => {
                self.resolve_expr(object);
                self.resolve_expr(index);
            }
            ExprKind::Array(elems) => {
                for e in elems {
                    self.resolve_expr(e);
                }
            }
        }
        expr.meta.inferred_type = self.apply(&expr.meta.inferred_type);
        expr.meta.typability = Typability::Typed;
    }
}

impl Default for Inferencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry point: type-checks a freshly parsed program against the initial
/// environment, resetting the fresh-variable counter for this invocation
/// (§5 determinism guarantee — a new [`Inferencer`] owns its own
/// [`VarGen`], so two independent calls never share state).
pub fn type_check(program: &mut Program) -> Vec<Diagnostic> {
    let mut inferencer = Inferencer::new();
    let env = crate::typeck::env::initial_environment(&inferencer.gen);
    inferencer.check_program(program, &env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn check(src: &str) -> Vec<Diagnostic> {
        let mut program = parse(src).expect("parse should succeed");
        type_check(&mut program)
    }

    #[test]
    fn scenario_1_no_diagnostics() {
        let diags = check("const x = 5; const y = 6; const z = x + y;");
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn scenario_2_invalid_argument_types() {
        let diags = check("const x = 5; const y = 'bob'; const z = x + y;");
        assert_eq!(diags.len(), 1);
        assert!(matches!(diags[0].kind, DiagnosticKind::InvalidArgumentTypes { .. }));
    }

    #[test]
    fn scenario_3_polymorphic_identity() {
        let diags = check("const f = x => x; f(1); f(true);");
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn scenario_4_recursive_function() {
        let diags = check("function fact(n) { return n === 0 ? 1 : n * fact(n - 1); }");
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn undefined_identifier_reported() {
        let diags = check("const x = y;");
        assert_eq!(diags.len(), 1);
        assert!(matches!(diags[0].kind, DiagnosticKind::UndefinedIdentifier { .. }));
    }

    #[test]
    fn reassigning_const_reported() {
        let diags = check("const x = 1; x = 2;");
        assert!(diags.iter().any(|d| matches!(d.kind, DiagnosticKind::ReassignConst { .. })));
    }

    #[test]
    fn array_literal_mismatch_reported() {
        let diags = check("const a = [1, 2, 'x'];");
        assert!(diags.iter().any(|d| matches!(d.kind, DiagnosticKind::ArrayAssignment { .. })));
    }

    #[test]
    fn if_test_must_be_boolean() {
        let diags = check("if (5) { 1; } else { 2; }");
        assert!(diags.iter().any(|d| matches!(d.kind, DiagnosticKind::InvalidTestCondition { .. })));
    }
}
