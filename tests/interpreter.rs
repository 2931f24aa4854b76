mod common;

use pretty_assertions::assert_eq;

use rlox::error::{LoxError, RuntimeError};
use rlox::parser::ParserOptions;
use rlox::Lox;

use common::{output, run, runtime_error, session};

#[test]
fn block_scoping_and_shadowing() {
    let source = r#"
        var a = "global a";
        var b = "global b";
        {
            var a = "outer a";
            {
                var a = "inner a";
                print a;
                print b;
            }
            print a;
        }
        print a;
    "#;

    assert_eq!(output(source), "inner a\nglobal b\nouter a\nglobal a\n");
}

#[test]
fn assignment_updates_the_nearest_binding() {
    let source = r#"
        var a = 1;
        { var a = 2; a = 3; print a; }
        a = a + 10;
        print a;
    "#;

    assert_eq!(output(source), "3\n11\n");
}

#[test]
fn closures_keep_their_own_state() {
    let source = r#"
        fun makeCounter() {
            var i = 0;
            fun count() {
                i = i + 1;
                return i;
            }
            return count;
        }

        var a = makeCounter();
        var b = makeCounter();
        print a();
        print a();
        print b();
        print a();
    "#;

    assert_eq!(output(source), "1\n2\n1\n3\n");
}

#[test]
fn closures_share_captured_variables() {
    let source = r#"
        fun pair() {
            var n = 0;
            fun inc() { n = n + 1; }
            fun get() { return n; }
            inc();
            inc();
            return get;
        }
        print pair()();
    "#;

    assert_eq!(output(source), "2\n");
}

#[test]
fn closure_binding_is_static() {
    let source = r#"
        var a = "global";
        {
            fun showA() { print a; }
            showA();
            var a = "block";
            showA();
        }
    "#;

    assert_eq!(output(source), "global\nglobal\n");
}

#[test]
fn recursion() {
    let source = r#"
        fun fib(n) {
            if (n < 2) return n;
            return fib(n - 1) + fib(n - 2);
        }
        print fib(15);

        fun outer() {
            fun fact(n) {
                if (n <= 1) return 1;
                return n * fact(n - 1);
            }
            return fact(6);
        }
        print outer();
    "#;

    assert_eq!(output(source), "610\n720\n");
}

#[test]
fn return_unwinds_nested_loops() {
    let source = r#"
        fun find() {
            while (true) {
                for (var i = 0; ; i = i + 1) {
                    if (i == 3) return i;
                }
            }
        }
        print find();

        fun noValue() { return; }
        print noValue();

        fun fallsOff() { 1; }
        print fallsOff();
    "#;

    assert_eq!(output(source), "3\nnil\nnil\n");
}

#[test]
fn loops() {
    let source = r#"
        for (var i = 0; i < 3; i = i + 1) print i;

        var n = 3;
        while (n > 0) {
            print n;
            n = n - 1;
        }
    "#;

    assert_eq!(output(source), "0\n1\n2\n3\n2\n1\n");
}

#[test]
fn number_formatting() {
    assert_eq!(
        output("print 3; print 2.5; print 1 / 2; print 10 / 4; print -0.25; print 1.0;"),
        "3\n2.5\n0.5\n2.5\n-0.25\n1\n"
    );
}

#[test]
fn truthiness() {
    let source = r#"
        if (0) print "zero is truthy";
        if ("") print "empty string is truthy";
        if (nil) print "unreachable"; else print "nil is falsy";
        print !nil;
        print !0;
        print !!false;
    "#;

    assert_eq!(
        output(source),
        "zero is truthy\nempty string is truthy\nnil is falsy\ntrue\nfalse\nfalse\n"
    );
}

#[test]
fn logical_operators_return_an_operand() {
    let source = r#"
        print nil or "fallback";
        print "left" or "right";
        print "a" and "b";
        print nil and "never";
        print false and undefinedName;
        print true or undefinedName;
    "#;

    assert_eq!(output(source), "fallback\nleft\nb\nnil\nfalse\ntrue\n");
}

#[test]
fn comparisons() {
    let source = r#"
        print 1 < 2;
        print 2 <= 2;
        print 3 > 4;
        print "apple" < "banana";
        print 1 == 1;
        print "a" != "b";
        print "a" == "a";
    "#;

    assert_eq!(output(source), "true\ntrue\nfalse\ntrue\ntrue\ntrue\ntrue\n");
}

#[test]
fn string_concatenation_coerces_the_other_operand() {
    let source = r#"
        print "a" + "b";
        print "a" + 1;
        print 1 + "a";
        print "n=" + 2.5;
        print "x" + true;
        print "v" + nil;
    "#;

    assert_eq!(output(source), "ab\na1\n1a\nn=2.5\nxtrue\nvnil\n");
}

#[test]
fn division_by_zero() {
    for source in ["print 1 / 0;", "print 0 / 5;", "print 0 / 0;"] {
        let (out, error) = runtime_error(source);

        assert_eq!(out, "");
        assert!(matches!(error, RuntimeError::ZeroDivision { .. }), "{}", source);
    }

    let (_, error) = runtime_error("var x = 0;\nprint 4 / x;");
    assert_eq!(error.report(), "[line 2] ZeroDivisionError: Can not divide by zero.");
}

#[test]
fn type_errors() {
    let cases = [
        "print \"a\" - 1;",
        "print -\"a\";",
        "print true * 2;",
        "print nil + 1;",
        "print 1 < \"2\";",
        "print 1 == \"1\";",
        "print nil == nil;",
    ];

    for source in cases {
        let (_, error) = runtime_error(source);
        assert!(matches!(error, RuntimeError::Type { .. }), "{}", source);
    }

    let (_, error) = runtime_error("print \"a\" - 1;");
    assert_eq!(error.to_string(), "TypeError: Operands must be numbers.");
}

#[test]
fn undefined_variables() {
    let (_, error) = runtime_error("print missing;");
    assert_eq!(
        error.to_string(),
        "UndefinedVariableError: Undefined variable 'missing'."
    );

    // Assignment never creates a variable.
    let (_, error) = runtime_error("missing = 1;");
    assert!(matches!(error, RuntimeError::UndefinedVariable { .. }));
}

#[test]
fn calling_non_callables() {
    for source in ["\"text\"();", "var x = 1; x();", "nil();"] {
        let (_, error) = runtime_error(source);
        assert!(matches!(error, RuntimeError::NotCallable { .. }), "{}", source);
    }
}

#[test]
fn arity_is_checked() {
    let (_, error) = runtime_error("fun f(a, b) {}\nf(1);");

    assert!(matches!(error, RuntimeError::Arity { expected: 2, got: 1, .. }));
    assert_eq!(error.report(), "[line 2] Expected 2 arguments but got 1.");

    let (_, error) = runtime_error("clock(1);");
    assert!(matches!(error, RuntimeError::Arity { expected: 0, got: 1, .. }));
}

#[test]
fn runtime_error_keeps_earlier_output() {
    let (out, result) = run("print \"first\";\nprint 1 / 0;\nprint \"never\";");

    assert_eq!(out, "first\n");
    assert_eq!(result.unwrap_err().exit_code(), 70);
}

#[test]
fn compile_errors_prevent_execution() {
    let (out, result) = run("print \"before\";\nprint 1 +;");

    assert_eq!(out, "");
    assert!(matches!(result, Err(LoxError::Compile(ref errors)) if errors.len() == 1));
}

#[test]
fn functions_and_natives_print_their_names() {
    assert_eq!(
        output("fun foo() {} print foo; print clock;"),
        "<fn foo>\n<native fn>\n"
    );
}

#[test]
fn clock_returns_seconds() {
    assert_eq!(output("var t = clock(); print t > 1000000000;"), "true\n");
}

#[test]
fn runs_are_deterministic() {
    let source = r#"
        fun f(n) { if (n == 0) return "done"; return f(n - 1); }
        var s = "";
        for (var i = 0; i < 5; i = i + 1) s = s + i;
        print s;
        print f(20);
    "#;

    assert_eq!(output(source), output(source));
    assert_eq!(output(source), "01234\ndone\n");
}

#[test]
fn session_keeps_globals_between_runs() {
    let (mut lox, capture) = session();

    lox.run("var count = 1; fun bump() { count = count + 1; }").unwrap();
    lox.run("bump(); bump();").unwrap();
    lox.run("print count;").unwrap();

    assert_eq!(capture.text(), "3\n");
}

#[test]
fn session_recovers_after_a_runtime_error_in_a_block() {
    let (mut lox, capture) = session();

    assert!(lox
        .run("var a = \"global\"; { var a = \"local\"; print 1 / 0; }")
        .is_err());

    // New top-level definitions still land in the global scope.
    lox.run("var b = \"after\"; print b; print a;").unwrap();

    assert_eq!(capture.text(), "after\nglobal\n");
}

#[test]
fn session_recovers_after_a_compile_error() {
    let (mut lox, capture) = session();

    assert!(lox.run("var x = ;").is_err());
    lox.run("{ var y = 1; print y; }").unwrap();

    assert_eq!(capture.text(), "1\n");
}

#[test]
fn require_initializer_option() {
    let options = ParserOptions {
        require_initializer: true,
    };

    let mut strict = Lox::new().with_options(options);
    assert!(matches!(strict.run("var x;"), Err(LoxError::Compile(_))));

    assert_eq!(output("var x; print x;"), "nil\n");
}
