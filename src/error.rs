use std::error;
use std::fmt;

/// An error of some `kind`, optionally pinned to the derivation line it was found on, with a
/// trail of what the compiler was doing when it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error<T> {
    pub kind: T,
    line: Option<usize>,
    contexts: Vec<&'static str>,
}

impl<T> Error<T> {
    pub const fn new(kind: T) -> Self {
        Self {
            kind,
            line: None,
            contexts: Vec::new(),
        }
    }
    pub fn map_kind<F, U>(self, mapper: F) -> Error<U>
    where
        F: Fn(T) -> U,
    {
        Error {
            kind: mapper(self.kind),
            line: self.line,
            contexts: self.contexts,
        }
    }
    /// The line given is only applied if there was no line already
    #[must_use]
    pub fn with_backup_line(self, line: usize) -> Self {
        if self.line.is_some() {
            self
        } else {
            self.with_line(line)
        }
    }
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
    #[must_use]
    pub fn add_context(mut self, ctx: &'static str) -> Self {
        self.contexts.push(ctx);
        self
    }
    pub const fn line(&self) -> Option<usize> {
        self.line
    }
    pub fn contexts(&self) -> &[&'static str] {
        &self.contexts
    }
}

impl<T: error::Error + 'static> error::Error for Error<T> {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl<T: fmt::Display> fmt::Display for Error<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let whiles = self
            .contexts
            .iter()
            .copied()
            .fold(String::new(), |acc, next| acc + "\nwhile " + next);
        match self.line {
            Some(line) => write!(
                f,
                "{kind}\n   --> derivation line {line}{whiles}",
                kind = self.kind,
                line = line,
                whiles = whiles,
            ),
            None => write!(f, "{}(no location info){}", self.kind, whiles),
        }
    }
}
