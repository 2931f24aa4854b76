use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Environments are shared: every closure and every inner scope created
/// while one is active keeps it alive.
pub type EnvRef = Rc<RefCell<Environment>>;

pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    pub fn enclosing(&self) -> Option<EnvRef> {
        self.enclosing.clone()
    }

    /// Binds `name` in this scope only, overwriting any previous binding.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(RuntimeError::undefined_variable(name))
        }
    }

    /// Rebinds an existing name somewhere in the chain; never creates one.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(RuntimeError::undefined_variable(name))
        }
    }

    /// Reads `name` exactly `distance` scopes out, without searching.
    pub fn get_at(&self, distance: usize, name: &Token) -> Result<Value, RuntimeError> {
        if distance == 0 {
            return self
                .values
                .get(&name.lexeme)
                .cloned()
                .ok_or_else(|| RuntimeError::undefined_variable(name));
        }

        match &self.enclosing {
            Some(enclosing) => enclosing.borrow().get_at(distance - 1, name),
            None => Err(RuntimeError::undefined_variable(name)),
        }
    }

    pub fn assign_at(
        &mut self,
        distance: usize,
        name: &Token,
        value: Value,
    ) -> Result<(), RuntimeError> {
        if distance == 0 {
            return match self.values.get_mut(&name.lexeme) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(RuntimeError::undefined_variable(name)),
            };
        }

        match &self.enclosing {
            Some(enclosing) => enclosing.borrow_mut().assign_at(distance - 1, name, value),
            None => Err(RuntimeError::undefined_variable(name)),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

// Values may hold closures over this very environment, so only names are shown.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.values.keys().collect();
        names.sort();

        f.debug_struct("Environment")
            .field("names", &names)
            .field("has_enclosing", &self.enclosing.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;

    fn ident(name: &str) -> Token {
        Token::new(TokenType::IDENTIFIER, name, 1, 1)
    }

    fn chain(depth: usize) -> (EnvRef, EnvRef) {
        let globals = Environment::new().into_ref();
        let mut current = globals.clone();

        for _ in 0..depth {
            current = Environment::with_enclosing(current).into_ref();
        }

        (globals, current)
    }

    #[test]
    fn get_at_skips_shadowing_bindings() {
        let (globals, inner) = chain(2);
        globals.borrow_mut().define("x", Value::Number(1.0));
        inner.borrow_mut().define("x", Value::Number(3.0));

        let x = ident("x");
        let env = inner.borrow();

        assert!(matches!(env.get_at(2, &x), Ok(Value::Number(n)) if n == 1.0));
        assert!(matches!(env.get_at(0, &x), Ok(Value::Number(n)) if n == 3.0));
        assert!(env.get_at(1, &x).is_err());
    }

    #[test]
    fn assign_at_writes_the_exact_scope() {
        let (globals, inner) = chain(1);
        globals.borrow_mut().define("x", Value::Number(1.0));

        inner
            .borrow_mut()
            .assign_at(1, &ident("x"), Value::Number(9.0))
            .unwrap();

        assert!(matches!(globals.borrow().get(&ident("x")), Ok(Value::Number(n)) if n == 9.0));
    }

    #[test]
    fn assign_never_creates_a_binding() {
        let (_, inner) = chain(1);

        let err = inner
            .borrow_mut()
            .assign(&ident("missing"), Value::Nil)
            .unwrap_err();

        assert!(matches!(err, RuntimeError::UndefinedVariable { .. }));
    }
}
