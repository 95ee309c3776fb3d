//! Opcode Definitions
//!
//! Defines the Sust opcode set, its textual names and argument counts.
//! This file contains no execution semantics.

use std::fmt;

/// Number of argument tokens an opcode accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many tokens
    Exact(usize),
    /// At least this many tokens; the tail is free-form
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

macro_rules! opcodes {
    ($( $(#[$doc:meta])* $variant:ident = $name:literal, $arity:expr; )*) => {
        /// Sust opcodes
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum OpCode {
            $( $(#[$doc])* $variant, )*
        }

        impl OpCode {
            /// Every opcode, in declaration order
            pub const ALL: &'static [OpCode] = &[$( OpCode::$variant, )*];

            /// Resolve a textual opcode
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( $name => Some(OpCode::$variant), )*
                    _ => None,
                }
            }

            /// Textual name as written in programs
            pub fn name(&self) -> &'static str {
                match self {
                    $( OpCode::$variant => $name, )*
                }
            }

            pub fn arity(&self) -> Arity {
                use Arity::*;
                match self {
                    $( OpCode::$variant => $arity, )*
                }
            }
        }
    };
}

opcodes! {
    // Variables
    /// `type name`
    InitVar = "INIT_VAR", Exact(2);
    /// `name literal...`
    SetVar = "SET_VAR", AtLeast(1);
    /// `type name literal...`, dropped after the next command
    TempVar = "TEMP_VAR", AtLeast(2);
    MoveVar = "MOVE_VAR", Exact(2);
    CopyVar = "COPY_VAR", Exact(2);
    DropVar = "DROP_VAR", Exact(1);
    HasVar = "HAS_VAR", Exact(2);

    // Conversions
    ToString = "TO_STRING", Exact(2);
    ToChars = "TO_CHARS", Exact(2);
    ToChar = "TO_CHAR", Exact(2);
    ToInteger = "TO_INTEGER", Exact(2);
    ToFloat = "TO_FLOAT", Exact(2);
    ToBool = "TO_BOOL", Exact(2);

    // Accessors
    GetSymbol = "GET_SYMBOL", Exact(3);
    GetItem = "GET_ITEM", Exact(3);
    GetValue = "GET_VALUE", Exact(3);
    SubStr = "SUB_STR", Exact(3);
    SubList = "SUB_LIST", Exact(3);
    ListSize = "LIST_SIZE", Exact(2);
    MapSize = "MAP_SIZE", Exact(2);
    StringSize = "STRING_SIZE", Exact(2);

    // Arithmetic
    AddInt = "ADD_INT", Exact(2);
    AddFloat = "ADD_FLOAT", Exact(2);
    AddStr = "ADD_STR", Exact(2);
    Random = "RANDOM", Exact(3);

    // Comparison & logic
    Equals = "EQUALS", Exact(3);
    More = "MORE", Exact(3);
    Less = "LESS", Exact(3);
    And = "AND", Exact(3);
    Or = "OR", Exact(3);
    Not = "NOT", Exact(2);

    // Predicates
    HasStr = "HAS_STR", Exact(3);
    HasItem = "HAS_ITEM", Exact(3);
    HasEntry = "HAS_ENTRY", Exact(4);
    HasKey = "HAS_KEY", Exact(3);
    HasValue = "HAS_VALUE", Exact(3);
    HasOptional = "HAS_OPTIONAL", Exact(2);

    // Optionals
    UnpackOptional = "UNPACK_OPTIONAL", Exact(2);
    PackOptional = "PACK_OPTIONAL", Exact(2);
    NoneOptional = "NONE_OPTIONAL", Exact(1);

    // Streams
    Write = "WRITE", Exact(2);
    Read = "READ", Exact(3);
    ReadAll = "READ_ALL", Exact(2);
    OpenFileIn = "OPEN_FILE_IN", Exact(2);
    OpenFileOut = "OPEN_FILE_OUT", Exact(2);
    OpenTcpConnection = "OPEN_TCP_CONNECTION", Exact(4);
    OpenTcpListener = "OPEN_TCP_LISTENER", Exact(3);

    // Control flow
    If = "IF", Exact(2);
    For = "FOR", Exact(3);
    ForList = "FOR_LIST", Exact(2);
    ForMap = "FOR_MAP", Exact(2);
    ForString = "FOR_STRING", Exact(2);
    While = "WHILE", Exact(1);
    /// `func result args...`
    UseFunc = "USE_FUNC", AtLeast(2);
    Return = "RETURN", Exact(0);

    // Definitions, consumed by the loader
    /// `result_type name [param type]...`
    Func = "FUNC", AtLeast(2);
    FuncEnd = "FUNC_END", Exact(0);

    // Contexts
    Sleep = "SLEEP", Exact(1);
    NewThread = "NEW_THREAD", Exact(1);
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
