//! Error codes for all compiler diagnostics.
//!
//! The first digit of each code names the phase that reports it.

use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### / W#### where the first digit indicates phase:
/// - E0xxx: Lexer errors
/// - E1xxx: Parser errors
/// - E2xxx: Lowering (semantic) errors
/// - E3xxx: Package / import errors
/// - E9xxx: Internal compiler errors
/// - W2xxx: Lowering warnings
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexer Errors (E0xxx)
    /// Unterminated string literal
    E0001,
    /// Invalid character in source
    E0002,
    /// Invalid number literal
    E0003,
    /// Invalid character literal or escape sequence
    E0004,

    // Parser Errors (E1xxx)
    /// Unexpected token
    E1001,
    /// Expected expression
    E1002,
    /// Expected identifier
    E1003,
    /// Expected type
    E1004,
    /// Unclosed delimiter
    E1005,

    // Lowering Errors (E2xxx)
    /// Undefined identifier
    E2001,
    /// Unknown field on a struct or class
    E2002,
    /// Type name used as a value
    E2003,
    /// Wrong number of call arguments
    E2004,
    /// Assignment to a constant
    E2005,
    /// `break` outside of a loop
    E2006,
    /// `continue` outside of a loop
    E2007,
    /// Dereference of a non-pointer value
    E2008,
    /// Unknown type name (falls back to a 64-bit integer)
    E2009,
    /// Variable without type annotation or initializer
    E2010,
    /// Constant without initializer
    E2011,
    /// Call of a value that is not a function
    E2012,
    /// Expression is not addressable
    E2013,
    /// Range expression outside a for-in header
    E2014,
    /// Unknown struct or class in a literal
    E2015,
    /// Function not found in namespace
    E2016,
    /// Field access on a value that is not a struct or class instance
    E2017,
    /// Function defined twice
    E2018,
    /// Invalid intrinsic arguments
    E2019,
    /// Top-level initializer is not a constant
    E2020,
    /// Invalid operand types for an operator
    E2021,

    // Package Errors (E3xxx)
    /// Circular package import
    E3001,
    /// Files in one directory declare different namespaces
    E3002,
    /// Imported package failed to compile
    E3003,
    /// Directory contains no source files
    E3004,
    /// File could not be read
    E3005,

    // Internal Errors (E9xxx)
    /// Internal compiler error
    E9001,

    // Lowering Warnings (W2xxx)
    /// `defer` evaluated in place
    W2001,
    /// for-in over a non-range iterable
    W2002,
    /// Collection types (vector, map) are not supported
    W2003,
    /// `deinit` is not lowered
    W2004,
    /// Range bounds have different types
    W2005,
}

impl ErrorCode {
    /// The code as it appears in output, e.g. `"E2001"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E2013 => "E2013",
            ErrorCode::E2014 => "E2014",
            ErrorCode::E2015 => "E2015",
            ErrorCode::E2016 => "E2016",
            ErrorCode::E2017 => "E2017",
            ErrorCode::E2018 => "E2018",
            ErrorCode::E2019 => "E2019",
            ErrorCode::E2020 => "E2020",
            ErrorCode::E2021 => "E2021",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E9001 => "E9001",
            ErrorCode::W2001 => "W2001",
            ErrorCode::W2002 => "W2002",
            ErrorCode::W2003 => "W2003",
            ErrorCode::W2004 => "W2004",
            ErrorCode::W2005 => "W2005",
        }
    }

    /// Check if this is a lexer error (E0xxx).
    pub fn is_lexer_error(&self) -> bool {
        self.as_str().starts_with("E0")
    }

    /// Check if this is a parser error (E1xxx).
    pub fn is_parser_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    /// Check if this is a lowering error (E2xxx).
    pub fn is_lowering_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    /// Check if this is a package/import error (E3xxx).
    pub fn is_package_error(&self) -> bool {
        self.as_str().starts_with("E3")
    }

    /// Check if this is a warning code (W-prefix).
    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with('W')
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E1001.to_string(), "E1001");
        assert_eq!(ErrorCode::E2001.as_str(), "E2001");
        assert_eq!(ErrorCode::W2002.to_string(), "W2002");
    }

    #[test]
    fn test_phase_classification() {
        assert!(ErrorCode::E0002.is_lexer_error());
        assert!(ErrorCode::E1004.is_parser_error());
        assert!(ErrorCode::E2005.is_lowering_error());
        assert!(ErrorCode::E3001.is_package_error());
        assert!(ErrorCode::W2001.is_warning());

        assert!(!ErrorCode::E2005.is_warning());
        assert!(!ErrorCode::W2001.is_lowering_error());
        assert!(!ErrorCode::E3001.is_parser_error());
    }
}
