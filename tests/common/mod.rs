#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rlox::error::{CompileError, LoxError, RuntimeError};
use rlox::Lox;

/// `print` sink that keeps everything written to it.
#[derive(Clone, Default)]
pub struct Capture(Rc<RefCell<Vec<u8>>>);

impl Capture {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Session printing into a fresh [`Capture`].
pub fn session() -> (Lox, Capture) {
    let capture = Capture::default();
    (Lox::with_output(capture.clone()), capture)
}

pub fn run(source: &str) -> (String, Result<(), LoxError>) {
    let (mut lox, capture) = session();
    let result = lox.run(source);
    (capture.text(), result)
}

/// Output of a program that must succeed.
pub fn output(source: &str) -> String {
    let (out, result) = run(source);

    if let Err(e) = result {
        panic!("program failed: {:?}\noutput so far:\n{}", e, out);
    }

    out
}

pub fn runtime_error(source: &str) -> (String, RuntimeError) {
    match run(source) {
        (out, Err(LoxError::Runtime(e))) => (out, e),
        (out, other) => panic!("expected a runtime error, got {:?}\noutput:\n{}", other, out),
    }
}

pub fn compile_errors(source: &str) -> Vec<CompileError> {
    match run(source) {
        (_, Err(LoxError::Compile(errors))) => errors,
        (out, other) => panic!("expected compile errors, got {:?}\noutput:\n{}", other, out),
    }
}

pub fn messages(errors: &[CompileError]) -> Vec<&str> {
    errors.iter().map(|e| e.message()).collect()
}
