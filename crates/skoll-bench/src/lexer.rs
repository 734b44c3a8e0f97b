//! Lexer for `.bench` lines.

use logos::Logos;

/// Tokens of one `.bench` line.
///
/// Comments (`#` to end of line) and whitespace are skipped; the parser
/// splits the file into lines before lexing, so newlines never reach the
/// lexer.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    #[token("=")]
    Equals,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,

    /// Gate labels and operator names. `.bench` identifiers in the wild
    /// carry dots, brackets and primes from netlist flattening.
    #[regex(r"[A-Za-z0-9_\.\[\]'\$<>-]+", |lex| lex.slice().to_string())]
    Ident(String),
}

/// Tokenize one line; `None` on a lex error.
pub fn tokenize(line: &str) -> Option<Vec<Token>> {
    Token::lexer(line).collect::<Result<Vec<_>, _>>().ok()
}
