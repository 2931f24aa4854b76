mod common;

use pretty_assertions::assert_eq;

use rlox::ast::{Expr, Stmt};
use rlox::error::RuntimeError;
use rlox::Lox;

use common::{compile_errors, messages, runtime_error};

/// `(name, depth)` for every variable read, in source order.
fn depths(source: &str) -> Vec<(String, Option<usize>)> {
    let mut lox = Lox::new();
    let statements = lox.compile(source).expect("source should compile");

    let mut found = Vec::new();
    for stmt in &statements {
        collect_stmt(&lox, stmt, &mut found);
    }
    found
}

fn collect_stmt(lox: &Lox, stmt: &Stmt, found: &mut Vec<(String, Option<usize>)>) {
    match stmt {
        Stmt::Expression(expr) | Stmt::Print(expr) => collect_expr(lox, expr, found),
        Stmt::Var {
            initializer: Some(expr),
            ..
        } => collect_expr(lox, expr, found),
        Stmt::Return {
            value: Some(expr), ..
        } => collect_expr(lox, expr, found),
        Stmt::Block(statements) => {
            for s in statements {
                collect_stmt(lox, s, found);
            }
        }
        Stmt::Function(decl) => {
            for s in &decl.body {
                collect_stmt(lox, s, found);
            }
        }
        _ => {}
    }
}

fn collect_expr(lox: &Lox, expr: &Expr, found: &mut Vec<(String, Option<usize>)>) {
    match expr {
        Expr::Variable { id, name } => {
            found.push((name.lexeme.clone(), lox.interpreter().resolved_depth(*id)));
        }
        Expr::Binary { left, right, .. } => {
            collect_expr(lox, left, found);
            collect_expr(lox, right, found);
        }
        Expr::Call {
            callee, arguments, ..
        } => {
            collect_expr(lox, callee, found);
            for arg in arguments {
                collect_expr(lox, arg, found);
            }
        }
        _ => {}
    }
}

fn depth(name: &str, d: Option<usize>) -> (String, Option<usize>) {
    (name.to_string(), d)
}

#[test]
fn locals_get_their_scope_distance_and_globals_none() {
    assert_eq!(
        depths("var g = 1; { var a = 1; { var b = 2; print a + b + g; } }"),
        vec![depth("a", Some(1)), depth("b", Some(0)), depth("g", None)]
    );
}

#[test]
fn parameters_and_captured_variables() {
    assert_eq!(
        depths("fun f(x) { fun g() { return x; } return x + g(); }"),
        vec![
            depth("x", Some(1)),
            depth("x", Some(0)),
            depth("g", Some(0)),
        ]
    );
}

#[test]
fn binding_is_fixed_when_the_function_is_declared() {
    // `a` inside showA binds to the global, even after the block declares
    // its own `a`.
    assert_eq!(
        depths("var a = 1; { fun showA() { print a; } var a = 2; showA(); }"),
        vec![depth("a", None), depth("showA", Some(0))]
    );
}

#[test]
fn local_read_in_own_initializer() {
    let errors = compile_errors("{ var a = 1; { var a = a; } }");

    assert_eq!(
        errors[0].to_string(),
        "[line 1] Error at 'a': Can't read local variable in its own initializer."
    );
}

#[test]
fn global_self_reference_is_a_runtime_error() {
    let (_, error) = runtime_error("var a = a;");

    assert!(matches!(error, RuntimeError::UndefinedVariable { ref name, .. } if name == "a"));
}

#[test]
fn duplicate_local_declarations() {
    let errors = compile_errors("{ var a = 1; var a = 2; }\nfun f(x, x) {}");

    assert_eq!(
        messages(&errors),
        vec![
            "Already a variable with this name in this scope.",
            "Already a variable with this name in this scope.",
        ]
    );
    assert_eq!(errors[1].line(), 2);
}

#[test]
fn global_redeclaration_is_allowed() {
    assert_eq!(common::output("var a = 1; var a = 2; print a;"), "2\n");
}

#[test]
fn return_outside_a_function() {
    let errors = compile_errors("return 1;");

    assert_eq!(
        errors[0].to_string(),
        "[line 1] Error at 'return': Can't return from top-level code."
    );
}

#[test]
fn misplaced_this_and_super() {
    let errors = compile_errors(
        "print this;\n\
         fun f() { return super.x; }\n\
         class A { m() { return super.m(); } }",
    );

    assert_eq!(
        messages(&errors),
        vec![
            "Can't use 'this' outside of a class.",
            "Can't use 'super' outside of a class.",
            "Can't use 'super' in a class with no superclass.",
        ]
    );
}

#[test]
fn class_inheriting_from_itself() {
    let errors = compile_errors("class A < A {}");

    assert_eq!(messages(&errors), vec!["A class can't inherit from itself."]);
}

#[test]
fn initializer_cannot_return_a_value() {
    let errors = compile_errors("class A { init() { return 1; } }");
    assert_eq!(
        messages(&errors),
        vec!["Can't return a value from an initializer."]
    );

    // A bare `return` is fine.
    common::output("class B { init() { return; } } B();");
}

#[test]
fn all_resolution_errors_are_collected() {
    let errors = compile_errors("{ var a = a; }\nreturn;\nprint this;");

    let lines: Vec<usize> = errors.iter().map(|e| e.line()).collect();
    assert_eq!(lines, vec![1, 2, 3]);
}

#[test]
fn nothing_runs_when_resolution_fails() {
    let (out, result) = common::run("print \"before\";\nreturn;");

    assert_eq!(out, "");
    assert_eq!(result.unwrap_err().exit_code(), 65);
}
