//! Module defining the lexer.
//!
//! The tokenizer is a maximal-munch scanner: at every position the longest
//! matching rule wins, and identifier lexemes that spell a reserved keyword
//! are retagged. Interpolated strings are split *here*, not in the parser:
//! `"a{expr}b"` becomes `Str("a") InteStart …expr-tokens… InteEnd Str("b")`,
//! which keeps the parser a plain token-stream Pratt parser.

use crate::{ImmutableString, ScriptError};
use std::fmt;

/// A Teeny language token kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A number constant.
    Number,
    /// A string constant (escapes already decoded).
    Str,
    /// A backtick-delimited regex literal.
    Regex,
    /// An identifier.
    Name,
    /// Start of an interpolated segment inside a string.
    InteStart,
    /// End of an interpolated segment inside a string.
    InteEnd,

    /// `if`
    If,
    /// `then`
    Then,
    /// `else`
    Else,
    /// `elif`
    Elif,
    /// `fn`
    Fn,
    /// `while`
    While,
    /// `for`
    For,
    /// `in`
    In,
    /// `match`
    Match,
    /// `try`
    Try,
    /// `catch`
    Catch,
    /// `as`
    As,
    /// `return`
    Return,
    /// `break`
    Break,
    /// `continue`
    Continue,

    /// `:=`
    Define,
    /// `=`
    Assign,
    /// `?=`
    DefAssign,
    /// `+=`
    PlusAssign,
    /// `-=`
    MinusAssign,
    /// `*=`
    StarAssign,
    /// `/=`
    SlashAssign,
    /// `%=`
    PercentAssign,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `>=`
    GreaterEq,
    /// `<=`
    LessEq,
    /// `>`
    Greater,
    /// `<`
    Less,
    /// `=~`
    RegexMatch,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `!`
    Bang,
    /// `|>`
    PipeTo,
    /// `=>`
    Arrow,
    /// `??`
    Coalesce,
    /// `?:`
    Elvis,
    /// `...`
    Spread,
    /// `..`
    Range,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `;`
    SemiColon,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `.`
    Period,
    /// `@`
    At,
}

impl TokenKind {
    /// Can a token of this kind start an expression?
    #[must_use]
    pub fn starts_expression(self) -> bool {
        use TokenKind::*;

        matches!(
            self,
            Number
                | Str
                | Regex
                | Name
                | LeftParen
                | LeftBracket
                | LeftBrace
                | If
                | While
                | For
                | Fn
                | Match
                | Try
                | Plus
                | Minus
                | Bang
                | Spread
        )
    }
}

/// A single token: kind, original lexeme and 1-based source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: ImmutableString,
    pub line: usize,
    pub col: usize,
}

impl Token {
    #[inline]
    #[must_use]
    pub fn new(kind: TokenKind, lexeme: impl Into<ImmutableString>, line: usize, col: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            col,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::InteStart => f.write_str("{"),
            TokenKind::InteEnd => f.write_str("}"),
            _ => write!(f, "{}", self.lexeme),
        }
    }
}

/// Retag an identifier lexeme that spells a reserved keyword.
fn keyword(name: &str) -> Option<TokenKind> {
    Some(match name {
        "if" => TokenKind::If,
        "then" => TokenKind::Then,
        "else" => TokenKind::Else,
        "elif" => TokenKind::Elif,
        "fn" => TokenKind::Fn,
        "while" => TokenKind::While,
        "for" => TokenKind::For,
        "in" => TokenKind::In,
        "match" => TokenKind::Match,
        "try" => TokenKind::Try,
        "catch" => TokenKind::Catch,
        "as" => TokenKind::As,
        "return" => TokenKind::Return,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        _ => return None,
    })
}

/// Two-character operators, longest-match first where they overlap with a
/// single-character rule.
const OPERATORS_2: &[(&str, TokenKind)] = &[
    (":=", TokenKind::Define),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::NotEq),
    (">=", TokenKind::GreaterEq),
    ("<=", TokenKind::LessEq),
    ("=~", TokenKind::RegexMatch),
    ("&&", TokenKind::And),
    ("||", TokenKind::Or),
    ("|>", TokenKind::PipeTo),
    ("=>", TokenKind::Arrow),
    ("?=", TokenKind::DefAssign),
    ("??", TokenKind::Coalesce),
    ("?:", TokenKind::Elvis),
    ("..", TokenKind::Range),
    ("+=", TokenKind::PlusAssign),
    ("-=", TokenKind::MinusAssign),
    ("*=", TokenKind::StarAssign),
    ("/=", TokenKind::SlashAssign),
    ("%=", TokenKind::PercentAssign),
];

/// Tokenize a source string.
///
/// # Errors
///
/// Returns [`ScriptError::Lexical`] on the first character no rule matches,
/// and on unterminated string/regex literals.
pub fn tokenize(src: &str) -> Result<Vec<Token>, ScriptError> {
    Lexer::new(src, 1, 1).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(src: &str, line: usize, col: usize) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
            line,
            col,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, ScriptError> {
        while self.pos < self.chars.len() {
            let c = self.chars[self.pos];

            if c.is_whitespace() {
                self.advance();
                continue;
            }
            if c == '#' {
                while self.pos < self.chars.len() && self.chars[self.pos] != '\n' {
                    self.advance();
                }
                continue;
            }
            if c == '"' || c == '\'' {
                self.scan_string(c)?;
                continue;
            }
            if c == '`' {
                self.scan_regex()?;
                continue;
            }
            if c.is_ascii_digit() || (c == '.' && self.peek(1).is_some_and(|n| n.is_ascii_digit())) {
                self.scan_number();
                continue;
            }
            if c.is_ascii_alphabetic() || c == '_' {
                self.scan_name();
                continue;
            }
            if self.scan_operator() {
                continue;
            }

            return Err(ScriptError::Lexical {
                message: format!("Unknown Character {}", c),
                line: self.line,
                col: self.col,
            });
        }
        Ok(self.tokens)
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    /// Consume one character, tracking line and column.
    fn advance(&mut self) {
        if self.chars[self.pos] == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        self.pos += 1;
    }

    fn push(&mut self, kind: TokenKind, lexeme: impl Into<ImmutableString>, line: usize, col: usize) {
        self.tokens.push(Token::new(kind, lexeme, line, col));
    }

    fn scan_operator(&mut self) -> bool {
        let (line, col) = (self.line, self.col);

        // `...` first, then the two-character table, then single characters.
        if self.peek(0) == Some('.') && self.peek(1) == Some('.') && self.peek(2) == Some('.') {
            self.advance();
            self.advance();
            self.advance();
            self.push(TokenKind::Spread, "...", line, col);
            return true;
        }

        if let Some(next) = self.peek(1) {
            let pair: String = [self.chars[self.pos], next].iter().collect();
            if let Some(&(sym, kind)) = OPERATORS_2.iter().find(|(sym, _)| *sym == pair) {
                self.advance();
                self.advance();
                self.push(kind, sym, line, col);
                return true;
            }
        }

        let kind = match self.chars[self.pos] {
            '=' => TokenKind::Assign,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '>' => TokenKind::Greater,
            '<' => TokenKind::Less,
            '!' => TokenKind::Bang,
            ':' => TokenKind::Colon,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Period,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            ';' => TokenKind::SemiColon,
            '@' => TokenKind::At,
            _ => return false,
        };
        let lexeme: ImmutableString = self.chars[self.pos].into();
        self.advance();
        self.push(kind, lexeme, line, col);
        true
    }

    fn scan_number(&mut self) {
        let (line, col) = (self.line, self.col);
        let mut text = String::new();

        while self.peek(0).is_some_and(|c| c.is_ascii_digit()) {
            text.push(self.chars[self.pos]);
            self.advance();
        }
        // A fractional dot is only consumed when it cannot be the start of a
        // range (`1..3`) or a method call (`3.times()`).
        if self.peek(0) == Some('.')
            && !self
                .peek(1)
                .is_some_and(|c| c == '.' || c.is_ascii_alphabetic() || c == '_')
        {
            text.push('.');
            self.advance();
            while self.peek(0).is_some_and(|c| c.is_ascii_digit()) {
                text.push(self.chars[self.pos]);
                self.advance();
            }
        }
        // Optional exponent.
        if self.peek(0).is_some_and(|c| c == 'e' || c == 'E') {
            let digits_at = if self.peek(1).is_some_and(|c| c == '+' || c == '-') {
                2
            } else {
                1
            };
            if self.peek(digits_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digits_at {
                    text.push(self.chars[self.pos]);
                    self.advance();
                }
                while self.peek(0).is_some_and(|c| c.is_ascii_digit()) {
                    text.push(self.chars[self.pos]);
                    self.advance();
                }
            }
        }

        self.push(TokenKind::Number, text, line, col);
    }

    fn scan_name(&mut self) {
        let (line, col) = (self.line, self.col);
        let mut text = String::new();

        while self
            .peek(0)
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            text.push(self.chars[self.pos]);
            self.advance();
        }

        match keyword(&text) {
            Some(kind) => self.push(kind, text, line, col),
            None => self.push(TokenKind::Name, text, line, col),
        }
    }

    /// Scan a string literal, splitting `{expr}` interpolations into
    /// bracketed sub-token streams.
    fn scan_string(&mut self, quote: char) -> Result<(), ScriptError> {
        let (line, col) = (self.line, self.col);
        self.advance(); // opening quote

        let mut fragment = String::new();
        let mut emitted = false;

        loop {
            let Some(c) = self.peek(0) else {
                return Err(ScriptError::Lexical {
                    message: "unterminated string".into(),
                    line,
                    col,
                });
            };

            if c == quote {
                self.advance();
                break;
            }

            if c == '\\' {
                self.advance();
                let Some(esc) = self.peek(0) else {
                    return Err(ScriptError::Lexical {
                        message: "unterminated string".into(),
                        line,
                        col,
                    });
                };
                match esc {
                    'n' => fragment.push('\n'),
                    't' => fragment.push('\t'),
                    '\\' => fragment.push('\\'),
                    '"' => fragment.push('"'),
                    '\'' => fragment.push('\''),
                    '{' => fragment.push('{'),
                    '}' => fragment.push('}'),
                    other => {
                        fragment.push('\\');
                        fragment.push(other);
                    }
                }
                self.advance();
                continue;
            }

            if c == '{' {
                let (frag_line, frag_col) = (self.line, self.col);
                self.push(TokenKind::Str, std::mem::take(&mut fragment), line, col);
                self.push(TokenKind::InteStart, "", frag_line, frag_col);

                let end = self.matching_brace().ok_or_else(|| ScriptError::Lexical {
                    message: "unterminated interpolation".into(),
                    line: frag_line,
                    col: frag_col,
                })?;
                let inner: String = self.chars[self.pos + 1..end].iter().collect();
                let inner_tokens = Lexer::new(&inner, frag_line, frag_col + 1).run()?;
                self.tokens.extend(inner_tokens);
                self.push(TokenKind::InteEnd, "", frag_line, frag_col);

                while self.pos <= end {
                    self.advance();
                }
                emitted = true;
                continue;
            }

            fragment.push(c);
            self.advance();
        }

        if !fragment.is_empty() || !emitted {
            self.push(TokenKind::Str, fragment, line, col);
        }
        Ok(())
    }

    /// Find the index of the `}` matching the `{` at the current position.
    /// Brace balance is tracked with an explicit counter that respects
    /// backslash escapes.
    fn matching_brace(&self) -> Option<usize> {
        let mut depth = 1;
        let mut escaped = false;
        let mut at = self.pos + 1;

        while at < self.chars.len() {
            let c = self.chars[at];
            if !escaped {
                match c {
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            return Some(at);
                        }
                    }
                    _ => (),
                }
            }
            escaped = c == '\\' && !escaped;
            at += 1;
        }
        None
    }

    fn scan_regex(&mut self) -> Result<(), ScriptError> {
        let (line, col) = (self.line, self.col);
        self.advance(); // opening backtick

        let mut pattern = String::new();
        loop {
            let Some(c) = self.peek(0) else {
                return Err(ScriptError::Lexical {
                    message: "unterminated regex".into(),
                    line,
                    col,
                });
            };
            if c == '`' {
                self.advance();
                break;
            }
            if c == '\\' && self.peek(1) == Some('`') {
                pattern.push('`');
                self.advance();
                self.advance();
                continue;
            }
            pattern.push(c);
            self.advance();
        }

        self.push(TokenKind::Regex, pattern, line, col);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_operators_longest_match() {
        assert_eq!(
            kinds("a := 1 .. 3"),
            vec![
                TokenKind::Name,
                TokenKind::Define,
                TokenKind::Number,
                TokenKind::Range,
                TokenKind::Number
            ]
        );
        assert_eq!(kinds("... .. ."), vec![TokenKind::Spread, TokenKind::Range, TokenKind::Period]);
        assert_eq!(kinds("?= ?? ?:"), vec![TokenKind::DefAssign, TokenKind::Coalesce, TokenKind::Elvis]);
    }

    #[test]
    fn test_number_forms() {
        let tokens = tokenize("1 1.5 .5 2e3 1.5e-2 1..3").unwrap();
        let numbers: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Number)
            .map(|t| t.lexeme.as_str())
            .collect();
        assert_eq!(numbers, vec!["1", "1.5", ".5", "2e3", "1.5e-2", "1", "3"]);
    }

    #[test]
    fn test_number_method_call_keeps_dot() {
        assert_eq!(
            kinds("3.times()"),
            vec![
                TokenKind::Number,
                TokenKind::Period,
                TokenKind::Name,
                TokenKind::LeftParen,
                TokenKind::RightParen
            ]
        );
    }

    #[test]
    fn test_keywords_retagged() {
        assert_eq!(
            kinds("if x then else elif"),
            vec![TokenKind::If, TokenKind::Name, TokenKind::Then, TokenKind::Else, TokenKind::Elif]
        );
    }

    #[test]
    fn test_interpolated_string_splits() {
        assert_eq!(
            kinds(r#""a{name}b""#),
            vec![
                TokenKind::Str,
                TokenKind::InteStart,
                TokenKind::Name,
                TokenKind::InteEnd,
                TokenKind::Str
            ]
        );
        // Escaped braces stay literal.
        assert_eq!(kinds(r#""a\{name\}b""#), vec![TokenKind::Str]);
        // Empty strings still produce one token.
        assert_eq!(kinds(r#""""#), vec![TokenKind::Str]);
    }

    #[test]
    fn test_string_escapes_decoded() {
        let tokens = tokenize(r#""a\tb\nc""#).unwrap();
        assert_eq!(tokens[0].lexeme.as_str(), "a\tb\nc");
    }

    #[test]
    fn test_regex_literal() {
        let tokens = tokenize(r"`\d+`").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Regex);
        assert_eq!(tokens[0].lexeme.as_str(), r"\d+");
    }

    #[test]
    fn test_unknown_character() {
        assert!(matches!(
            tokenize("a $ b"),
            Err(ScriptError::Lexical { line: 1, col: 3, .. })
        ));
    }

    #[test]
    fn test_comment_discarded() {
        assert_eq!(kinds("1 # comment\n2"), vec![TokenKind::Number, TokenKind::Number]);
    }
}
