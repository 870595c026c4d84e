//! The lachs token definition.
//!
//! `#[lachs::token]` brings `Regex`, `Match` and one struct per variant into
//! the enclosing module, so nothing else lives here. `match` is spelled
//! `KwMatch` to stay clear of `Match`.

#[lachs::token]
pub enum Lexeme {
    #[terminal("and")]
    And,
    #[terminal("array")]
    Array,
    #[terminal("begin")]
    Begin,
    #[terminal("bool")]
    Bool,
    #[terminal("char")]
    Char,
    #[terminal("delete")]
    Delete,
    #[terminal("dim")]
    Dim,
    #[terminal("do")]
    Do,
    #[terminal("done")]
    Done,
    #[terminal("downto")]
    Downto,
    #[terminal("else")]
    Else,
    #[terminal("end")]
    End,
    #[terminal("false")]
    False,
    #[terminal("float")]
    Float,
    #[terminal("for")]
    For,
    #[terminal("if")]
    If,
    #[terminal("in")]
    In,
    #[terminal("int")]
    Int,
    #[terminal("let")]
    Let,
    #[terminal("match")]
    KwMatch,
    #[terminal("mod")]
    Mod,
    #[terminal("mutable")]
    Mutable,
    #[terminal("new")]
    New,
    #[terminal("not")]
    Not,
    #[terminal("of")]
    Of,
    #[terminal("rec")]
    Rec,
    #[terminal("ref")]
    Ref,
    #[terminal("then")]
    Then,
    #[terminal("to")]
    To,
    #[terminal("true")]
    True,
    #[terminal("type")]
    Type,
    #[terminal("unit")]
    Unit,
    #[terminal("while")]
    While,
    #[terminal("with")]
    With,
    #[terminal("->")]
    Arrow,
    #[terminal("=")]
    Equals,
    #[terminal("|")]
    Pipe,
    #[terminal("+")]
    Plus,
    #[terminal("-")]
    Minus,
    #[terminal("*")]
    Times,
    #[terminal("/")]
    Divide,
    #[terminal("+.")]
    FPlus,
    #[terminal("-.")]
    FMinus,
    #[terminal("*.")]
    FTimes,
    #[terminal("/.")]
    FDivide,
    #[terminal("**")]
    FPow,
    #[terminal("!")]
    Bang,
    #[terminal(";")]
    Semicolon,
    #[terminal("&&")]
    BAnd,
    #[terminal("||")]
    BOr,
    #[terminal("<>")]
    Neq,
    #[terminal("<")]
    Lt,
    #[terminal(">")]
    Gt,
    #[terminal("<=")]
    Le,
    #[terminal(">=")]
    Ge,
    #[terminal("==")]
    NatEq,
    #[terminal("!=")]
    NatNeq,
    #[terminal(":=")]
    Assign,
    #[terminal("(")]
    LParen,
    #[terminal(")")]
    RParen,
    #[terminal("[")]
    LBracket,
    #[terminal("]")]
    RBracket,
    #[terminal(",")]
    Comma,
    #[terminal(":")]
    Colon,
    #[literal("[a-z][A-Za-z0-9_']*")]
    Genid,
    #[literal("[A-Z][A-Za-z0-9_']*")]
    Conid,
    #[literal("[0-9]+")]
    IntLiteral,
    #[literal(r"[0-9]+\.[0-9]+([eE][+\-]?[0-9]+)?")]
    FloatLiteral,
    #[literal(r"'([^'\\\n]|\\(x[0-9a-fA-F]{2}|.))'")]
    CharLiteral,
    #[literal(r#""([^"\\\n]|\\(x[0-9a-fA-F]{2}|.))*""#)]
    StringLiteral,
}
