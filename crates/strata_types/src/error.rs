//! Error types for the Strata type and value layers.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Every [`ErrorKind`] belongs to exactly one [`ErrorCategory`], so callers
//! can tell a bad schema from a bad value from a writer used out of phase.

use std::fmt;

use thiserror::Error;

use crate::types::Type;

/// The main error type for Strata operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Records the operation that failed, keeping any existing frames.
    #[must_use]
    pub fn in_operation(self, operation: &str) -> Self {
        let context = match self.context {
            Some(ctx) => ctx.with_frame(operation),
            None => ErrorContext::new().with_operation(operation),
        };
        Self {
            kind: self.kind,
            context: Some(context),
        }
    }

    /// Returns the family this error belongs to.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Returns true for schema-level (type store) errors.
    #[must_use]
    pub fn is_declaration(&self) -> bool {
        self.category() == ErrorCategory::Declaration
    }

    /// Returns true for value-level type or structure errors.
    #[must_use]
    pub fn is_use(&self) -> bool {
        self.category() == ErrorCategory::Use
    }

    /// Returns true for writer lifecycle violations.
    #[must_use]
    pub fn is_illegal_state(&self) -> bool {
        self.category() == ErrorCategory::IllegalState
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: Type, actual: Type) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Creates an incomparable types error.
    #[must_use]
    pub fn incomparable(left: Type, right: Type) -> Self {
        Self::new(ErrorKind::IncomparableTypes { left, right })
    }

    /// Creates an arity mismatch error.
    #[must_use]
    pub fn arity_mismatch(expected: usize, actual: usize) -> Self {
        Self::new(ErrorKind::ArityMismatch { expected, actual })
    }

    /// Creates an index out of bounds error.
    #[must_use]
    pub fn index_out_of_bounds(index: usize, length: usize) -> Self {
        Self::new(ErrorKind::IndexOutOfBounds { index, length })
    }

    /// Creates a redeclaration error.
    #[must_use]
    pub fn redeclaration(name: impl Into<String>, existing: Type) -> Self {
        Self::new(ErrorKind::Redeclaration {
            name: name.into(),
            existing,
        })
    }

    /// Creates an undeclared annotation error.
    #[must_use]
    pub fn undeclared_annotation(on: Type, label: impl Into<String>) -> Self {
        Self::new(ErrorKind::UndeclaredAnnotation {
            on,
            label: label.into(),
        })
    }

    /// Creates a closed writer error.
    #[must_use]
    pub fn writer_closed() -> Self {
        Self::new(ErrorKind::WriterClosed)
    }
}

/// The three error families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Schema errors raised by the type store.
    Declaration,
    /// Type or structure errors raised by value operations.
    Use,
    /// A writer used outside of its open phase.
    IllegalState,
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A declared name or label is not an identifier, or is a type keyword.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A name or label was declared again with a different signature.
    #[error("redeclaration of {name} (already declared as {existing})")]
    Redeclaration {
        /// The name or label being declared.
        name: String,
        /// The type it is already bound to.
        existing: Type,
    },

    /// A name is already used by a declaration of another kind.
    #[error("name clash: {name} is already declared as {existing}")]
    NameClash {
        /// The conflicting name.
        name: String,
        /// The existing declaration.
        existing: Type,
    },

    /// An abstract data type was used as an anonymous alternative of another.
    #[error("cannot nest {nested} as an alternative of {adt}")]
    NestedAdt {
        /// The receiving data type.
        adt: Type,
        /// The data type that was nested.
        nested: Type,
    },

    /// Annotations cannot be declared on this type.
    #[error("annotations cannot be declared on {on}")]
    AnnotationNotAllowed {
        /// The type that was annotated.
        on: Type,
    },

    /// An abstract data type was required.
    #[error("not an abstract data type: {0}")]
    NotAnAdt(Type),

    /// Constructor fields must be given as a tuple type.
    #[error("constructor fields must be a tuple type, got {0}")]
    NotATuple(Type),

    /// Type mismatch during runtime type checking.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type.
        expected: Type,
        /// The actual type encountered.
        actual: Type,
    },

    /// Two types were required to be comparable.
    #[error("incomparable types: {left} and {right}")]
    IncomparableTypes {
        /// Left operand type.
        left: Type,
        /// Right operand type.
        right: Type,
    },

    /// A relation (set of tuples) was required.
    #[error("not a relation: {0}")]
    NotARelation(Type),

    /// Wrong number of fields or columns.
    #[error("arity mismatch: expected {expected}, got {actual}")]
    ArityMismatch {
        /// Expected arity.
        expected: usize,
        /// Actual arity.
        actual: usize,
    },

    /// Composing relations of these arities leaves no column.
    #[error("composing arities {left} and {right} leaves no columns")]
    EmptyComposition {
        /// Arity of the left relation.
        left: usize,
        /// Arity of the right relation.
        right: usize,
    },

    /// Index out of bounds.
    #[error("index out of bounds: {index} (length {length})")]
    IndexOutOfBounds {
        /// The index that was accessed.
        index: usize,
        /// The actual length of the collection.
        length: usize,
    },

    /// No field carries the requested label.
    #[error("no field labeled {label} in {on}")]
    UnknownLabel {
        /// The tuple or constructor type.
        on: Type,
        /// The label that was requested.
        label: String,
    },

    /// Instantiation hit a parameter with no binding.
    #[error("undefined type parameter: {0}")]
    UndefinedParameter(Type),

    /// The annotation label is not declared for the type.
    #[error("undeclared annotation {label} on {on}")]
    UndeclaredAnnotation {
        /// The annotated type.
        on: Type,
        /// The label that was requested.
        label: String,
    },

    /// A set used as a universe does not contain the inverted set.
    #[error("universe of type {universe} is not a superset")]
    NotASubset {
        /// The universe's type.
        universe: Type,
    },

    /// The type has no empty value to make.
    #[error("cannot make an empty value of type {0}")]
    NotMakeable(Type),

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Integer arithmetic overflowed.
    #[error("arithmetic overflow")]
    Overflow,

    /// A writer was used after `done()`.
    #[error("writer is closed")]
    WriterClosed,
}

impl ErrorKind {
    /// Returns the family this kind belongs to.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidName { .. }
            | Self::Redeclaration { .. }
            | Self::NameClash { .. }
            | Self::NestedAdt { .. }
            | Self::AnnotationNotAllowed { .. }
            | Self::NotAnAdt(_)
            | Self::NotATuple(_) => ErrorCategory::Declaration,
            Self::WriterClosed => ErrorCategory::IllegalState,
            _ => ErrorCategory::Use,
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that failed.
    pub operation: Option<String>,
    /// Enclosing operations, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the failing operation.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(operation) = &self.operation {
            write!(f, "in {operation}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}

/// Result type for Strata operations.
pub type Result<T> = std::result::Result<T, Error>;
