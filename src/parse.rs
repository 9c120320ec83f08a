//! Module implementing the Pratt expression parser.
//!
//! Every grammar form is an expression. `parse` consumes tokens starting at
//! `pos` with a minimum binding power and returns `(ast, pos)`; it always
//! advances `pos` on success, and the runner treats "no progress" as a syntax
//! error so the parse loop is guaranteed to terminate.

use crate::ast::{Ast, AstKind, AstPayload, MatchHead, ParamSpec};
use crate::token::{Token, TokenKind};
use crate::ScriptError;

/// Left/right binding powers of the infix operators.
///
/// Assignments and the pipe sit at the bottom so that a pipeline chains
/// left-to-right; member access binds tightest, above call/index suffixes.
fn infix_binding_power(kind: TokenKind) -> Option<(u8, u8)> {
    use TokenKind::*;

    Some(match kind {
        Assign | Define | DefAssign | PlusAssign | MinusAssign | StarAssign | SlashAssign
        | PercentAssign | PipeTo => (1, 2),
        Or => (5, 6),
        And => (7, 8),
        EqEq | NotEq | Greater | Less | GreaterEq | LessEq | RegexMatch | Coalesce | Elvis => {
            (9, 10)
        }
        Plus | Minus | Range => (13, 14),
        Star | Slash | Percent => (15, 16),
        Period => (19, 20),
        _ => return None,
    })
}

/// Binding power of prefix `+ - ! ...`.
const PREFIX_BP: u8 = 15;
/// Binding power of the `!`, `[…]` and `(…)` suffixes.
const SUFFIX_BP: u8 = 17;
/// Binding power of a bare identifier used as a custom infix operator.
const CUSTOM_INFIX_BP: (u8, u8) = (13, 14);
/// Binding power of the `name => body` arrow on its parameter side.
const ARROW_BP: u8 = 17;

fn syntax_error(tokens: &[Token], pos: usize, message: impl Into<String>) -> ScriptError {
    let (line, col) = tokens
        .get(pos)
        .or_else(|| tokens.last())
        .map_or((1, 1), |t| (t.line, t.col));
    ScriptError::Syntax {
        message: message.into(),
        line,
        col,
    }
}

fn kind_at(tokens: &[Token], pos: usize) -> Option<TokenKind> {
    tokens.get(pos).map(|t| t.kind)
}

/// Consume a token of the expected kind or fail.
fn expect(tokens: &[Token], pos: usize, kind: TokenKind, what: &str) -> Result<usize, ScriptError> {
    match tokens.get(pos) {
        Some(t) if t.kind == kind => Ok(pos + 1),
        Some(t) => Err(syntax_error(
            tokens,
            pos,
            format!("Unexpected token: found {}, expected {}", t.lexeme, what),
        )),
        None => Err(syntax_error(
            tokens,
            pos,
            format!("Unexpected end of input, expected {}", what),
        )),
    }
}

/// Parse one expression with the given minimum binding power.
///
/// # Errors
///
/// Returns [`ScriptError::Syntax`] on the first unexpected token; there is no
/// recovery.
pub fn parse(tokens: &[Token], pos: usize, min_bp: u8) -> Result<(Ast, usize), ScriptError> {
    let mut p = pos;
    while kind_at(tokens, p) == Some(TokenKind::SemiColon) {
        p += 1;
    }

    let (mut lhs, mut p) = parse_primary(tokens, p)?;

    loop {
        let Some(token) = tokens.get(p) else { break };

        match token.kind {
            // Suffixes.
            TokenKind::Bang => {
                if SUFFIX_BP < min_bp {
                    break;
                }
                p += 1;
                lhs = Ast::with_str(AstKind::SufOp, vec![lhs], "!");
            }
            TokenKind::LeftBracket => {
                if SUFFIX_BP < min_bp {
                    break;
                }
                let (index, next) = parse(tokens, p + 1, 0)?;
                p = expect(tokens, next, TokenKind::RightBracket, "]")?;
                lhs = Ast::with_str(AstKind::Op, vec![lhs, index], "[]");
            }
            TokenKind::LeftParen => {
                if SUFFIX_BP < min_bp {
                    break;
                }
                let (call, next) = parse_call(tokens, p + 1, lhs)?;
                lhs = call;
                p = next;
            }

            // `name => body` and `name @=> body` lambdas.
            TokenKind::Arrow | TokenKind::At => {
                let dynamic = token.kind == TokenKind::At;
                if dynamic && kind_at(tokens, p + 1) != Some(TokenKind::Arrow) {
                    break;
                }
                if ARROW_BP < min_bp {
                    break;
                }
                if lhs.kind != AstKind::Name {
                    return Err(syntax_error(tokens, p, "invalid lambda parameter"));
                }
                let params = vec![ParamSpec {
                    name: lhs.op().into(),
                    default: None,
                    rest: false,
                }];
                let (body, next) = parse(tokens, p + if dynamic { 2 } else { 1 }, 0)?;
                let kind = if dynamic {
                    AstKind::FnDynamic
                } else {
                    AstKind::Fn
                };
                lhs = Ast::new(kind, vec![body], AstPayload::Params(params));
                p = next;
            }

            // A bare identifier in operator position is a custom infix
            // operator, but only on the same line as its left operand so
            // newline-separated statements do not glue together.
            TokenKind::Name => {
                if p == 0 || token.line != tokens[p - 1].line {
                    break;
                }
                let (l_bp, r_bp) = CUSTOM_INFIX_BP;
                if l_bp < min_bp {
                    break;
                }
                let op = token.lexeme.clone();
                let (rhs, next) = parse(tokens, p + 1, r_bp)?;
                lhs = Ast::new(AstKind::Op, vec![lhs, rhs], AstPayload::Str(op));
                p = next;
            }

            kind => {
                let Some((l_bp, r_bp)) = infix_binding_power(kind) else {
                    break;
                };
                if l_bp < min_bp {
                    break;
                }
                let op = token.lexeme.clone();
                let (rhs, next) = parse(tokens, p + 1, r_bp)?;
                lhs = Ast::new(AstKind::Op, vec![lhs, rhs], AstPayload::Str(op));
                p = next;
            }
        }
    }

    Ok((lhs, p))
}

fn parse_primary(tokens: &[Token], p: usize) -> Result<(Ast, usize), ScriptError> {
    let Some(token) = tokens.get(p) else {
        return Err(syntax_error(tokens, p, "Unexpected end of input"));
    };

    match token.kind {
        TokenKind::Number => {
            let value: f64 = token
                .lexeme
                .parse()
                .map_err(|_| syntax_error(tokens, p, "malformed number literal"))?;
            Ok((
                Ast::new(AstKind::Number, vec![], AstPayload::Number(value)),
                p + 1,
            ))
        }
        TokenKind::Str => parse_string(tokens, p),
        TokenKind::Regex => Ok((
            Ast::with_str(AstKind::Regex, vec![], token.lexeme.clone()),
            p + 1,
        )),
        TokenKind::Name => Ok((
            Ast::with_str(AstKind::Name, vec![], token.lexeme.clone()),
            p + 1,
        )),
        TokenKind::LeftParen => parse_paren(tokens, p),
        TokenKind::LeftBrace => parse_block(tokens, p),
        TokenKind::LeftBracket => parse_table(tokens, p),
        TokenKind::If => parse_if(tokens, p),
        TokenKind::While => {
            let (cond, next) = parse(tokens, p + 1, 0)?;
            let (body, next) = parse(tokens, next, 0)?;
            Ok((Ast::bare(AstKind::While, vec![cond, body]), next))
        }
        TokenKind::For => {
            let (binder, next) = parse(tokens, p + 1, 0)?;
            let next = expect(tokens, next, TokenKind::In, "in")?;
            let (iterable, next) = parse(tokens, next, 0)?;
            let (body, next) = parse(tokens, next, 0)?;
            Ok((Ast::bare(AstKind::For, vec![binder, iterable, body]), next))
        }
        TokenKind::Fn => parse_fn(tokens, p),
        TokenKind::Match => parse_match(tokens, p),
        TokenKind::Try => {
            let (guarded, next) = parse(tokens, p + 1, 0)?;
            let next = expect(tokens, next, TokenKind::Catch, "catch")?;
            let (handler, next) = parse(tokens, next, 0)?;
            Ok((Ast::bare(AstKind::Try, vec![guarded, handler]), next))
        }
        TokenKind::Return => parse_jump(tokens, p, AstKind::Return),
        TokenKind::Break => parse_jump(tokens, p, AstKind::Break),
        TokenKind::Continue => parse_jump(tokens, p, AstKind::Continue),
        TokenKind::Plus | TokenKind::Minus | TokenKind::Bang | TokenKind::Spread => {
            let op = token.lexeme.clone();
            let (rhs, next) = parse(tokens, p + 1, PREFIX_BP)?;
            Ok((Ast::new(AstKind::PreOp, vec![rhs], AstPayload::Str(op)), next))
        }
        _ => Err(syntax_error(
            tokens,
            p,
            format!("Unexpected token: found {}", token.lexeme),
        )),
    }
}

/// A string literal, gathering any `InteStart … InteEnd` segments the lexer
/// spliced in. A single fragment with no interpolation stays a scalar
/// `Str` node; anything else becomes a `Str` node whose children are the
/// fragments and embedded expressions in order.
fn parse_string(tokens: &[Token], p: usize) -> Result<(Ast, usize), ScriptError> {
    let mut parts = vec![Ast::with_str(AstKind::Str, vec![], tokens[p].lexeme.clone())];
    let mut p = p + 1;
    let mut interpolated = false;

    loop {
        match kind_at(tokens, p) {
            Some(TokenKind::InteStart) => {
                let (expr, next) = parse(tokens, p + 1, 0)?;
                p = expect(tokens, next, TokenKind::InteEnd, "end of interpolation")?;
                parts.push(expr);
                interpolated = true;
            }
            Some(TokenKind::Str) if interpolated => {
                parts.push(Ast::with_str(AstKind::Str, vec![], tokens[p].lexeme.clone()));
                p += 1;
            }
            _ => break,
        }
    }

    if !interpolated {
        let lit = parts.pop().expect("at least one fragment");
        return Ok((lit, p));
    }
    Ok((Ast::bare(AstKind::Str, parts), p))
}

/// Either a parenthesized group or a `(params) => body` lambda; decided by
/// scanning ahead to the matching `)` and peeking for an arrow.
fn parse_paren(tokens: &[Token], p: usize) -> Result<(Ast, usize), ScriptError> {
    let mut depth = 1;
    let mut scan = p + 1;
    while scan < tokens.len() && depth > 0 {
        match tokens[scan].kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => depth -= 1,
            _ => (),
        }
        scan += 1;
    }
    if depth != 0 {
        return Err(syntax_error(tokens, p, "unbalanced parenthesis"));
    }

    let is_lambda = matches!(kind_at(tokens, scan), Some(TokenKind::Arrow))
        || (matches!(kind_at(tokens, scan), Some(TokenKind::At))
            && matches!(kind_at(tokens, scan + 1), Some(TokenKind::Arrow)));

    if is_lambda {
        let (params, next) = parse_params(tokens, p + 1)?;
        let mut next = expect(tokens, next, TokenKind::RightParen, ")")?;
        let dynamic = kind_at(tokens, next) == Some(TokenKind::At);
        if dynamic {
            next += 1;
        }
        let next = expect(tokens, next, TokenKind::Arrow, "=>")?;
        let (body, next) = parse(tokens, next, 0)?;
        let kind = if dynamic {
            AstKind::FnDynamic
        } else {
            AstKind::Fn
        };
        return Ok((Ast::new(kind, vec![body], AstPayload::Params(params)), next));
    }

    let (inner, next) = parse(tokens, p + 1, 0)?;
    let next = expect(tokens, next, TokenKind::RightParen, ")")?;
    Ok((inner, next))
}

/// `fn [@] ( params ) body`
fn parse_fn(tokens: &[Token], p: usize) -> Result<(Ast, usize), ScriptError> {
    let mut next = p + 1;
    let dynamic = kind_at(tokens, next) == Some(TokenKind::At);
    if dynamic {
        next += 1;
    }
    let next = expect(tokens, next, TokenKind::LeftParen, "(")?;
    let (params, next) = parse_params(tokens, next)?;
    let next = expect(tokens, next, TokenKind::RightParen, ")")?;
    let (body, next) = parse(tokens, next, 0)?;
    let kind = if dynamic {
        AstKind::FnDynamic
    } else {
        AstKind::Fn
    };
    Ok((Ast::new(kind, vec![body], AstPayload::Params(params)), next))
}

/// Parameters up to (not including) the closing `)`. Each is `name`,
/// `name = default` or `name...` (rest).
fn parse_params(tokens: &[Token], p: usize) -> Result<(Vec<ParamSpec>, usize), ScriptError> {
    let mut params = Vec::new();
    let mut p = p;

    while kind_at(tokens, p) != Some(TokenKind::RightParen) {
        let Some(token) = tokens.get(p) else {
            return Err(syntax_error(tokens, p, "Unexpected end of input, expected )"));
        };
        if token.kind != TokenKind::Name {
            return Err(syntax_error(
                tokens,
                p,
                format!("Unexpected token: found {}, expected parameter name", token.lexeme),
            ));
        }
        let name = token.lexeme.clone();
        p += 1;

        let mut rest = false;
        let mut default = None;
        if kind_at(tokens, p) == Some(TokenKind::Spread) {
            rest = true;
            p += 1;
        } else if kind_at(tokens, p) == Some(TokenKind::Assign) {
            let (expr, next) = parse(tokens, p + 1, 0)?;
            default = Some(expr);
            p = next;
        }
        params.push(ParamSpec { name, default, rest });

        if kind_at(tokens, p) == Some(TokenKind::Comma) {
            p += 1;
        }
    }
    Ok((params, p))
}

/// `{ expr* }` — a block scope.
fn parse_block(tokens: &[Token], p: usize) -> Result<(Ast, usize), ScriptError> {
    let mut p = p + 1;
    let mut children = Vec::new();

    loop {
        while kind_at(tokens, p) == Some(TokenKind::SemiColon) {
            p += 1;
        }
        match kind_at(tokens, p) {
            Some(TokenKind::RightBrace) => {
                p += 1;
                break;
            }
            Some(_) => {
                let (stmt, next) = parse(tokens, p, 0)?;
                children.push(stmt);
                p = next;
            }
            None => return Err(syntax_error(tokens, p, "Unexpected end of input, expected }")),
        }
    }
    Ok((Ast::bare(AstKind::Block, children), p))
}

/// `[ … ]` — table literal. Elements are bare expressions (appended),
/// `key : value` pairs, anonymous `: value` pairs, or `... expr` spreads.
fn parse_table(tokens: &[Token], p: usize) -> Result<(Ast, usize), ScriptError> {
    let mut p = p + 1;
    let mut children = Vec::new();

    while kind_at(tokens, p) != Some(TokenKind::RightBracket) {
        if tokens.get(p).is_none() {
            return Err(syntax_error(tokens, p, "Unexpected end of input, expected ]"));
        }

        if kind_at(tokens, p) == Some(TokenKind::Colon) {
            // Anonymous pair, appended like a bare element.
            let (value, next) = parse(tokens, p + 1, 0)?;
            children.push(value);
            p = next;
        } else {
            let (element, next) = parse(tokens, p, 0)?;
            p = next;
            if kind_at(tokens, p) == Some(TokenKind::Colon) {
                let (value, next) = parse(tokens, p + 1, 0)?;
                children.push(Ast::bare(AstKind::Pair, vec![element, value]));
                p = next;
            } else {
                children.push(element);
            }
        }

        if kind_at(tokens, p) == Some(TokenKind::Comma) {
            p += 1;
        }
    }
    Ok((Ast::bare(AstKind::Table, children), p + 1))
}

/// `if cond block (elif cond block)* (else block)?`
fn parse_if(tokens: &[Token], p: usize) -> Result<(Ast, usize), ScriptError> {
    let (cond, mut next) = parse(tokens, p + 1, 0)?;
    if kind_at(tokens, next) == Some(TokenKind::Then) {
        next += 1;
    }
    let (then_branch, mut next) = parse(tokens, next, 0)?;
    let mut children = vec![cond, then_branch];

    while kind_at(tokens, next) == Some(TokenKind::Elif) {
        let (cond, n) = parse(tokens, next + 1, 0)?;
        let mut n = n;
        if kind_at(tokens, n) == Some(TokenKind::Then) {
            n += 1;
        }
        let (body, n) = parse(tokens, n, 0)?;
        children.push(Ast::bare(AstKind::Elif, vec![cond, body]));
        next = n;
    }
    if kind_at(tokens, next) == Some(TokenKind::Else) {
        let (body, n) = parse(tokens, next + 1, 0)?;
        children.push(Ast::bare(AstKind::Else, vec![body]));
        next = n;
    }
    Ok((Ast::bare(AstKind::If, children), next))
}

/// `match scrutinee (as binder)? { pattern : body (, pattern : body)* }`
fn parse_match(tokens: &[Token], p: usize) -> Result<(Ast, usize), ScriptError> {
    let (scrutinee, mut next) = parse(tokens, p + 1, 0)?;

    let mut binder = None;
    if kind_at(tokens, next) == Some(TokenKind::As) {
        next += 1;
        match tokens.get(next) {
            Some(t) if t.kind == TokenKind::Name => {
                binder = Some(t.lexeme.clone());
                next += 1;
            }
            _ => return Err(syntax_error(tokens, next, "expected binder name after as")),
        }
    }

    let mut p = expect(tokens, next, TokenKind::LeftBrace, "{")?;
    let mut arms = Vec::new();
    while kind_at(tokens, p) != Some(TokenKind::RightBrace) {
        if tokens.get(p).is_none() {
            return Err(syntax_error(tokens, p, "Unexpected end of input, expected }"));
        }
        let (pattern, next) = parse(tokens, p, 0)?;
        let next = expect(tokens, next, TokenKind::Colon, ":")?;
        let (body, next) = parse(tokens, next, 0)?;
        arms.push(Ast::bare(AstKind::Opt, vec![pattern, body]));
        p = next;
        if kind_at(tokens, p) == Some(TokenKind::Comma) {
            p += 1;
        }
    }

    Ok((
        Ast::new(
            AstKind::Match,
            arms,
            AstPayload::Match(Box::new(MatchHead { scrutinee, binder })),
        ),
        p + 1,
    ))
}

/// `return/break/continue [expr]` — the expression is taken when the next
/// token can start one.
fn parse_jump(tokens: &[Token], p: usize, kind: AstKind) -> Result<(Ast, usize), ScriptError> {
    match kind_at(tokens, p + 1) {
        Some(k) if k.starts_expression() => {
            let (value, next) = parse(tokens, p + 1, 0)?;
            Ok((Ast::bare(kind, vec![value]), next))
        }
        _ => Ok((Ast::bare(kind, vec![]), p + 1)),
    }
}

/// Call arguments after the opening `(`: positional expressions,
/// `name = expr` keyword arguments (rewritten to `Kwarg`), `_` placeholders
/// and `... expr` spreads.
fn parse_call(tokens: &[Token], p: usize, callee: Ast) -> Result<(Ast, usize), ScriptError> {
    let mut p = p;
    let mut children = vec![callee];

    while kind_at(tokens, p) != Some(TokenKind::RightParen) {
        if tokens.get(p).is_none() {
            return Err(syntax_error(tokens, p, "Unexpected end of input, expected )"));
        }
        let (arg, next) = parse(tokens, p, 0)?;
        p = next;

        let is_kwarg = arg.kind == AstKind::Op
            && arg.op() == "="
            && arg.children[0].kind == AstKind::Name;
        if is_kwarg {
            let name = arg.children[0].op().to_string();
            let value = arg.children.into_iter().nth(1).expect("binary op has two children");
            children.push(Ast::with_str(AstKind::Kwarg, vec![value], name));
        } else {
            children.push(arg);
        }

        if kind_at(tokens, p) == Some(TokenKind::Comma) {
            p += 1;
        }
    }
    Ok((Ast::bare(AstKind::Call, children), p + 1))
}
