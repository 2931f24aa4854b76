use pretty_assertions::assert_eq;

use rlox::ast_printer::AstPrinter;
use rlox::parser::ParserOptions;

fn printed(source: &str) -> Vec<String> {
    let (statements, diagnostics) = rlox::parse(source, ParserOptions::default());

    assert!(
        !diagnostics.had_error(),
        "unexpected errors: {:?}",
        diagnostics.errors()
    );

    statements.iter().map(AstPrinter::print_stmt).collect()
}

fn error_lines(source: &str) -> Vec<String> {
    let (_, diagnostics) = rlox::parse(source, ParserOptions::default());

    diagnostics.errors().iter().map(|e| e.to_string()).collect()
}

#[test]
fn arithmetic_precedence() {
    assert_eq!(
        printed("print 1 + 2 * 3 - 4 / 2;"),
        vec!["(print (- (+ 1.0 (* 2.0 3.0)) (/ 4.0 2.0)))"]
    );
}

#[test]
fn unary_binds_tighter_than_equality() {
    assert_eq!(
        printed("print !true == -1 < 2;"),
        vec!["(print (== (! true) (< (- 1.0) 2.0)))"]
    );
}

#[test]
fn grouping_overrides_precedence() {
    assert_eq!(
        printed("print (1 + 2) * 3;"),
        vec!["(print (* (group (+ 1.0 2.0)) 3.0))"]
    );
}

#[test]
fn and_binds_tighter_than_or() {
    assert_eq!(
        printed("print a or b and c;"),
        vec!["(print (or a (and b c)))"]
    );
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(printed("a = b = c;"), vec!["(; (= a (= b c)))"]);
}

#[test]
fn calls_and_properties_chain() {
    assert_eq!(
        printed("f(1)(2, \"x\"); a.b.c = 1;"),
        vec![
            "(; (call (call f 1.0) 2.0 x))",
            "(; (.= (. a b) c 1.0))",
        ]
    );
}

#[test]
fn for_loop_is_desugared_into_while() {
    assert_eq!(
        printed("for (var i = 0; i < 2; i = i + 1) print i;"),
        vec!["(block (var i 0.0) (while (< i 2.0) (block (print i) (; (= i (+ i 1.0))))))"]
    );
}

#[test]
fn for_loop_without_clauses_loops_on_true() {
    assert_eq!(printed("for (;;) print 1;"), vec!["(while true (print 1.0))"]);
}

#[test]
fn declarations() {
    assert_eq!(
        printed(
            "var x; fun add(a, b) { return a + b; } \
             class B < A { init(x) { this.x = x; } m() { return super.m(); } }"
        ),
        vec![
            "(var x)",
            "(fun add (a b) (return (+ a b)))",
            "(class B < A (fun init (x) (; (.= this x x))) (fun m () (return (call (super m)))))",
        ]
    );
}

#[test]
fn control_flow() {
    assert_eq!(
        printed("if (x) print 1; else { print 2; } while (false) return;"),
        vec![
            "(if x (print 1.0) (block (print 2.0)))",
            "(while false (return))",
        ]
    );
}

#[test]
fn error_message_format() {
    assert_eq!(
        error_lines("print 1 +;"),
        vec!["[line 1] Error at ';': Expected expression."]
    );

    assert_eq!(
        error_lines("print 1"),
        vec!["[line 1] Error at end: Expected ';' after value."]
    );
}

#[test]
fn recovers_and_reports_every_bad_statement() {
    let source = "print 1 +;\nvar = 3;\nprint 2;";
    let (statements, diagnostics) = rlox::parse(source, ParserOptions::default());

    let lines: Vec<usize> = diagnostics.errors().iter().map(|e| e.line()).collect();
    assert_eq!(lines, vec![1, 2]);

    assert_eq!(diagnostics.errors()[1].message(), "Expected variable name.");

    // Only the well-formed statement survives.
    let printed: Vec<String> = statements.iter().map(AstPrinter::print_stmt).collect();
    assert_eq!(printed, vec!["(print 2.0)"]);
}

#[test]
fn recovers_inside_a_block() {
    let (statements, diagnostics) =
        rlox::parse("{ print 1 +; print 2; }", ParserOptions::default());

    assert_eq!(diagnostics.errors().len(), 1);

    let printed: Vec<String> = statements.iter().map(AstPrinter::print_stmt).collect();
    assert_eq!(printed, vec!["(block (print 2.0))"]);
}

#[test]
fn unclosed_block() {
    assert_eq!(
        error_lines("{ print 1;"),
        vec!["[line 1] Error at end: Expected '}' after block."]
    );
}

#[test]
fn invalid_assignment_target() {
    assert_eq!(
        error_lines("1 = 2;\n(a) = 3;"),
        vec![
            "[line 1] Error at '=': Invalid assignment target.",
            "[line 2] Error at '=': Invalid assignment target.",
        ]
    );
}

#[test]
fn lexical_errors_surface_with_parse_errors() {
    let lines = error_lines("print @;");

    assert_eq!(lines[0], "[line 1] Error: Unexpected character: @");
    assert_eq!(lines[1], "[line 1] Error at ';': Expected expression.");
}

#[test]
fn missing_initializer_defaults_to_nil() {
    assert_eq!(printed("var x;"), vec!["(var x)"]);
}

#[test]
fn missing_initializer_can_be_rejected() {
    let options = ParserOptions {
        require_initializer: true,
    };

    let (statements, diagnostics) = rlox::parse("var x;\nvar y = 1;", options);

    assert_eq!(
        diagnostics.errors()[0].to_string(),
        "[line 1] Error at 'x': Variable can not be empty. Try 'var x = nil;'."
    );
    assert_eq!(statements.len(), 1);
}

#[test]
fn too_many_arguments() {
    let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
    let source = format!("f({});", args.join(", "));

    let lines = error_lines(&source);

    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("Can't have more than 255 arguments."));
}
