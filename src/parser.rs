//! The parser (C4, ): precedence-climbing recursive descent
//! over RUNPARSE's (C3) flat token stream, producing the AST the evaluator
//! (C7) walks.
//!
//! Grammar (lowest to highest precedence), matching UCBLogo's documented
//! behavior that an unparenthesized operation's own arguments are gathered
//! by the *same* full-expression grammar, not a restricted "term" grammar —
//! `sum 1 2 * 3` parses as `sum(1, 2 * 3)`, not `(sum 1 2) * 3`:
//!
//! ```text
//! Exp -> Sum ( ('<'|'>'|'='|'<='|'>='|'<>') Sum )*
//! Sum -> Product ( ('+'|'-') Product )*
//! Product -> Unary ( ('*'|'/') Unary )*
//! Unary -> '-' Unary | Term
//! Term -> number | ':'name | '"'word | [list] | {array}
//! | '(' Exp ')' | '(' command Exp* ')' | command Exp*
//! ```

use std::collections::HashMap;
use std::rc::Rc;

use crate::catalogue::Catalogue;
use crate::datum::ast::{AstNode, AstOp, CallTarget, PrimitiveRef};
use crate::datum::procedure::ProcedureRef;
use crate::datum::{Datum, List, Word};
use crate::error::{self, ErrorCode, LogoError};
use crate::runparse;

struct Cursor {
    tokens: Vec<Datum>,
    pos: usize,
}

impl Cursor {
    fn new(tokens: Vec<Datum>) -> Cursor {
        Cursor { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Datum> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Datum> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// The current token's raw text, if it is a recognized operator symbol.
    fn peek_operator(&self) -> Option<String> {
        match self.peek() {
            Some(Datum::Word(w)) => {
                let raw = w.raw();
                if matches!(raw.as_str(), "<=" | ">=" | "<>" | "<" | ">" | "=" | "+" | "-" | "*" | "/") {
                    Some(raw)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

const OPERATOR_PRIMITIVE_NAMES: &[(&str, &str)] = &[
    ("<=", "NOTGREATERP"),
    (">=", "NOTLESSP"),
    ("<>", "NOTEQUALP"),
    ("<", "LESSP"),
    (">", "GREATERP"),
    ("=", "EQUALP"),
    ("+", "SUM"),
    ("-", "DIFFERENCE"),
    ("*", "PRODUCT"),
    ("/", "QUOTIENT"),
];

fn operator_primitive_name(op: &str) -> &'static str {
for &(sym, name) in OPERATOR_PRIMITIVE_NAMES {
    if sym == op {
        return name;
    }
}
unreachable!("unrecognized operator symbol {}", op)
}

/// RUNPARSE + parse a full procedure body: each element of `body_lines` is
/// one source line (itself a List of reader tokens). Returns the flattened
/// statement list, the `TAG`-name-to-statement-index table GOTO resolves
/// against, and the source line each statement came from (parallel to the
/// statement list), so an error raised while parsing or running a given
/// statement can report the exact line it came from (spec.md §3's `Error`
/// datum `line` slot).
pub fn parse_body(
    body_lines: &List,
    catalogue: &Catalogue,
    allow_get_set: bool,
) -> error::Result<(Vec<AstNode>, HashMap<String, usize>, Vec<List>)> {
    let mut statements = Vec::new();
    let mut tags = HashMap::new();
    let mut lines = Vec::new();
    let timestamp = catalogue.timestamp();

    for line in body_lines.to_vec() {
        let line_list = line
        .as_list()
        .cloned()
        .unwrap_or_else(|| List::from_vec(vec![line.clone()]));

        let line_statements = parse_instruction_list_at(&line_list, catalogue, timestamp, allow_get_set)
        .map_err(|e| attach_line(e, &line_list))?;

        for statement in line_statements {
            if let AstOp::Call(CallTarget::Primitive(p)) = &statement.op {
                if p.name.eq_ignore_ascii_case("TAG") {
                    if let Some(Datum::Word(tag_name)) = statement.children.first() {
                        tags.insert(ascii_upper(&tag_name.printable()), statements.len());
                    }
                }
            }
            statements.push(statement);
            lines.push(line_list.clone());
        }
    }

    Ok((statements, tags, lines))
}

/// Attach `line` to `err` as the offending instruction line, unless the
/// error already carries one (an inner `parse_body`/`parse_instruction_list`
/// call closer to the actual fault already set it).
fn attach_line(err: LogoError, line: &List) -> LogoError {
    if err.line().is_some() {
        err
    } else {
        err.with_line(line.clone())
    }
}

/// Parse one already-tokenized line (no further runparse) into its
/// top-level statements, consulting (and populating) its own AST cache.
pub fn parse_instruction_list(list: &List, catalogue: &Catalogue, allow_get_set: bool) -> error::Result<Vec<AstNode>> {
    parse_instruction_list_at(list, catalogue, catalogue.timestamp(), allow_get_set).map_err(|e| attach_line(e, list))
}

fn parse_instruction_list_at(
    list: &List,
    catalogue: &Catalogue,
    timestamp: u64,
    allow_get_set: bool,
) -> error::Result<Vec<AstNode>> {
    if let Some(cached) = list.cached_ast(timestamp) {
        return Ok((*cached).clone());
    }

    let tokens = runparse::runparse(list, timestamp);
    let mut cursor = Cursor::new(tokens.to_vec());
    let mut statements = Vec::new();

    while !cursor.at_end() {
        statements.push(parse_statement(&mut cursor, catalogue, allow_get_set)?);
    }

    list.store_ast_cache(timestamp, Rc::new(statements.clone()));
    Ok(statements)
}

/// A statement is exactly one command call, its arguments gathered by the
/// full expression grammar.
fn parse_statement(cursor: &mut Cursor, catalogue: &Catalogue, allow_get_set: bool) -> error::Result<AstNode> {
    let node = parse_command(cursor, catalogue, allow_get_set)?;
    Ok(wrap_trailing_stop(cursor, node))
}

/// "Trailing STOP" (spec §4.4): a bare `STOP` immediately following an
/// already-parsed command on the same line discards that command's value
/// and exits the enclosing procedure, rather than the value surfacing as
/// an unconsumed statement result ("you don't say what to do with ...").
/// This lets an operation's value be thrown away deliberately, e.g.
/// `sum 1 2 stop`.
fn wrap_trailing_stop(cursor: &mut Cursor, node: AstNode) -> AstNode {
    let is_stop = matches!(cursor.peek(), Some(Datum::Word(w)) if w.printable().eq_ignore_ascii_case("STOP"));
    if !is_stop {
        return node;
    }
    cursor.advance();
    let handler: crate::datum::ast::PrimitiveHandler = Rc::new(|interp, node| {
        crate::evaluator::eval_arg(interp, node, 0)?;
        Ok(crate::evaluator::StepResult::Stop)
    });
    let primitive = Rc::new(crate::datum::ast::Primitive {
        name: "STOP".to_string(),
        min_args: 1,
        default_args: 1,
        max_args: 1,
        handler,
    });
    AstNode::new(
        Word::from_str("STOP"),
        AstOp::Call(CallTarget::Primitive(primitive)),
        vec![Datum::Ast(Rc::new(node))],
    )
}

fn parse_exp(cursor: &mut Cursor, catalogue: &Catalogue, allow_get_set: bool) -> error::Result<AstNode> {
    parse_comparison(cursor, catalogue, allow_get_set)
}

fn parse_comparison(cursor: &mut Cursor, catalogue: &Catalogue, allow_get_set: bool) -> error::Result<AstNode> {
    let mut left = parse_sum(cursor, catalogue, allow_get_set)?;
    while let Some(op) = cursor.peek_operator() {
        if matches!(op.as_str(), "<=" | ">=" | "<>" | "<" | ">" | "=") {
            cursor.advance();
            let right = parse_sum(cursor, catalogue, allow_get_set)?;
            left = binary_node(catalogue, &op, left, right)?;
        } else {
            break;
        }
    }
    Ok(left)
}

fn parse_sum(cursor: &mut Cursor, catalogue: &Catalogue, allow_get_set: bool) -> error::Result<AstNode> {
    let mut left = parse_product(cursor, catalogue, allow_get_set)?;
    while let Some(op) = cursor.peek_operator() {
        if matches!(op.as_str(), "+" | "-") {
            cursor.advance();
            let right = parse_product(cursor, catalogue, allow_get_set)?;
            left = binary_node(catalogue, &op, left, right)?;
        } else {
            break;
        }
    }
    Ok(left)
}

fn parse_product(cursor: &mut Cursor, catalogue: &Catalogue, allow_get_set: bool) -> error::Result<AstNode> {
    let mut left = parse_unary(cursor, catalogue, allow_get_set)?;
    while let Some(op) = cursor.peek_operator() {
        if matches!(op.as_str(), "*" | "/") {
            cursor.advance();
            let right = parse_unary(cursor, catalogue, allow_get_set)?;
            left = binary_node(catalogue, &op, left, right)?;
        } else {
            break;
        }
    }
    Ok(left)
}

fn parse_unary(cursor: &mut Cursor, catalogue: &Catalogue, allow_get_set: bool) -> error::Result<AstNode> {
    if let Some(Datum::Word(w)) = cursor.peek() {
        if w.raw() == "-" {
            cursor.advance();
            let operand = parse_unary(cursor, catalogue, allow_get_set)?;
            return unary_minus_node(catalogue, operand);
        }
    }
    parse_term(cursor, catalogue, allow_get_set)
}

fn binary_node(catalogue: &Catalogue, op: &str, left: AstNode, right: AstNode) -> error::Result<AstNode> {
    let name = operator_primitive_name(op);
    let primitive = catalogue
    .lookup_primitive(name)
    .ok_or(())
    .map_err(|_| LogoError::new(ErrorCode::NoHow, None, format!("I don't know how to {}", name)))?;

    Ok(AstNode::new(
            Word::from_str(name),
            AstOp::Call(CallTarget::Primitive(primitive)),
            vec![Datum::Ast(Rc::new(left)), Datum::Ast(Rc::new(right))],
        ))
}

fn unary_minus_node(catalogue: &Catalogue, operand: AstNode) -> error::Result<AstNode> {
    if let AstOp::Literal(Datum::Word(w)) = &operand.op {
        if let Some(n) = w.numeric_value() {
            return Ok(AstNode::literal(Datum::number(-n)));
        }
    }

    let primitive = catalogue
    .lookup_primitive("MINUS")
    .ok_or(())
    .map_err(|_| LogoError::new(ErrorCode::NoHow, None, "I don't know how to MINUS".to_string()))?;

    Ok(AstNode::new(
            Word::from_str("MINUS"),
            AstOp::Call(CallTarget::Primitive(primitive)),
            vec![Datum::Ast(Rc::new(operand))],
        ))
}

fn parse_term(cursor: &mut Cursor, catalogue: &Catalogue, allow_get_set: bool) -> error::Result<AstNode> {
    let token = cursor
    .advance()
    .ok_or(())
    .map_err(|_| LogoError::new(ErrorCode::NotEnough, None, "unexpected end of instruction".to_string()))?;

    match token {
        Datum::List(_) | Datum::Array(_) => Ok(AstNode::literal(token)),

        Datum::Word(w) => {
            let raw = w.raw();

            if raw == "(" {
                return parse_paren_group(cursor, catalogue, allow_get_set);
            }

            if let Some(stripped) = raw.strip_prefix('"') {
                return Ok(AstNode::literal(Datum::Word(Word::from_raw_text(
                                stripped.to_string(),
                                w.is_forever_special(),
                            ))));
            }

            if let Some(stripped) = raw.strip_prefix(':') {
                return Ok(AstNode::new(w.clone(), AstOp::ValueOf(stripped.to_string()), Vec::new()));
            }

            if raw == "?" {
                return Ok(AstNode::new(w.clone(), AstOp::NamedSlot(1), Vec::new()));
            }
            if let Some(digits) = raw.strip_prefix('?') {
                if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                    let n: usize = digits.parse().unwrap_or(1);
                    return Ok(AstNode::new(w.clone(), AstOp::NamedSlot(n), Vec::new()));
                }
            }

            if w.numeric_value().is_some() {
                return Ok(AstNode::literal(Datum::Word(w)));
            }

            parse_command_named(cursor, catalogue, &w, allow_get_set)
        }

        other => Ok(AstNode::literal(other)),
    }
}

/// `(` already consumed. Either `( Exp )` grouping, or `( command Exp* )`
/// explicit-arity invocation.
fn parse_paren_group(cursor: &mut Cursor, catalogue: &Catalogue, allow_get_set: bool) -> error::Result<AstNode> {
    let is_command_form = matches!(
        cursor.peek(),
        Some(Datum::Word(w)) if is_known_command(catalogue, &w.printable())
    );

    if !is_command_form {
        let inner = parse_exp(cursor, catalogue, allow_get_set)?;
        expect_close_paren(cursor)?;
        return Ok(inner);
    }

    let name_token = match cursor.advance() {
        Some(Datum::Word(w)) => w,
        _ => unreachable!("peeked a word above"),
    };

    let (target, max_args) = resolve_target_with_bounds(catalogue, &name_token, allow_get_set)?;
    let mut args = Vec::new();

    loop {
        match cursor.peek() {
            Some(Datum::Word(w)) if w.raw() == ")" => {
                cursor.advance();
                break;
            }
            None => {
                return LogoError::new_as_result(
                    ErrorCode::ParenNotFound,
                    None,
                    "expected ) to close explicit-arity call".to_string(),
                )
            }
            _ => {
                if max_args >= 0 && args.len() as i32 >= max_args {
                    return error::too_many(None, &name_token.printable());
                }
                let arg = parse_exp(cursor, catalogue, allow_get_set)?;
                args.push(Datum::Ast(Rc::new(arg)));
            }
        }
    }

    Ok(AstNode::new(name_token, AstOp::Call(target), args))
}

fn expect_close_paren(cursor: &mut Cursor) -> error::Result<()> {
    match cursor.advance() {
        Some(Datum::Word(w)) if w.raw() == ")" => Ok(()),
        _ => LogoError::new_as_result(ErrorCode::ParenNotFound, None, "expected )".to_string()),
    }
}

fn is_known_command(catalogue: &Catalogue, name: &str) -> bool {
    catalogue.is_defined(name)
}

fn resolve_target(catalogue: &Catalogue, name: &str) -> Option<CallTarget> {
    if let Some(p) = catalogue.lookup_primitive(name) {
        return Some(CallTarget::Primitive(p));
    }
    if let Some(p) = catalogue.lookup_procedure(name) {
        return Some(CallTarget::Procedure(p));
    }
    None
}

fn resolve_target_with_bounds(
    catalogue: &Catalogue,
    name_token: &Word,
    allow_get_set: bool,
) -> error::Result<(CallTarget, i32)> {
    let name = name_token.printable();
    match resolve_target(catalogue, &name) {
        Some(target) => {
            let (_, _, max) = catalogue.arity(&name).unwrap_or((0, 0, -1));
            Ok((target, max))
        }
        None if allow_get_set => Ok((allow_get_set_target(&name), -1)),
        None => error::no_how(None, &name),
    }
}

/// A bare name with no catalogue entry is either a getter (no further
/// tokens consumed) or, when prefixed `SET`, a setter of one argument.
/// Preserves the name's original typed case: only the `SET` prefix test
/// is case-insensitive, the name itself (getter name, or setter's target
/// name with `SET` stripped) is not folded.
fn allow_get_set_target(name: &str) -> CallTarget {
    let upper = ascii_upper(name);
    if upper.starts_with("SET") && upper.len() > 3 {
        return CallTarget::Setter(name[3..].to_string());
    }
    CallTarget::Getter(name.to_string())
}

/// A bare word that didn't match any literal prefix form: it names a
/// command. Gather its arguments via the full expression grammar, per
/// documented `sum 1 2 * 3` example.
fn parse_command_named(
    cursor: &mut Cursor,
    catalogue: &Catalogue,
    name_token: &Word,
    allow_get_set: bool,
) -> error::Result<AstNode> {
    parse_command_with_name(cursor, catalogue, name_token.clone(), allow_get_set)
}

fn parse_command(cursor: &mut Cursor, catalogue: &Catalogue, allow_get_set: bool) -> error::Result<AstNode> {
    let token = cursor
    .advance()
    .ok_or(())
    .map_err(|_| LogoError::new(ErrorCode::NotEnough, None, "unexpected end of instruction".to_string()))?;

    match token {
        Datum::Word(w) if w.raw() == "(" => parse_paren_group(cursor, catalogue, allow_get_set),
        Datum::Word(w) => parse_command_with_name(cursor, catalogue, w, allow_get_set),
        other => LogoError::new_as_result(
            ErrorCode::DoesntLike,
            None,
            format!("a statement cannot begin with {}", other.show(true, -1, -1)),
        ),
    }
}

/// Unknown-name fallback (spec.md §4.4's `ALLOWGETSET`): a bare name not
/// found in the catalogue is a getter/setter call when `allow_get_set` is
/// set, otherwise it is an unresolvable call and raises `NoHow` immediately
/// — the offending name keeps its original case so the error message
/// matches what was typed.
fn parse_command_with_name(
    cursor: &mut Cursor,
    catalogue: &Catalogue,
    name_token: Word,
    allow_get_set: bool,
) -> error::Result<AstNode> {
    let name = name_token.printable();

    let (target, default_args) = match resolve_target(catalogue, &name) {
        Some(target) => {
            let (_, default, _) = catalogue.arity(&name).unwrap_or((0, 0, 0));
            (target, default)
        }
        None if allow_get_set => {
            let target = allow_get_set_target(&name);
            let default = if matches!(target, CallTarget::Setter(_)) { 1 } else { 0 };
            (target, default)
        }
        None => return error::no_how(None, &name),
    };

    let mut args = Vec::with_capacity(default_args.max(0) as usize);
    for _ in 0..default_args.max(0) {
        let arg = parse_exp(cursor, catalogue, allow_get_set)?;
        args.push(Datum::Ast(Rc::new(arg)));
    }

    Ok(AstNode::new(name_token, AstOp::Call(target), args))
}

fn ascii_upper(s: &str) -> String {
    s.chars()
    .map(|c| if c.is_ascii() { c.to_ascii_uppercase() } else { c })
    .collect()
}

#[allow(dead_code)]
fn unused(_p: PrimitiveRef, _q: ProcedureRef) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::ast::Primitive;
    use crate::evaluator::StepResult;

    fn dummy_primitive(name: &str, min: i32, default: i32, max: i32) -> Primitive {
        Primitive {
            name: name.to_string(),
            min_args: min,
            default_args: default,
            max_args: max,
            handler: Rc::new(|_interp, _node| Ok(StepResult::Value(Datum::NoValue))),
        }
    }

    fn catalogue_with_arithmetic() -> Catalogue {
        let mut cat = Catalogue::new();
        cat.register_primitive(dummy_primitive("SUM", 2, 2, -1));
        cat.register_primitive(dummy_primitive("DIFFERENCE", 2, 2, 2));
        cat.register_primitive(dummy_primitive("PRODUCT", 2, 2, -1));
        cat.register_primitive(dummy_primitive("QUOTIENT", 1, 2, 2));
        cat.register_primitive(dummy_primitive("MINUS", 1, 1, 1));
        cat.register_primitive(dummy_primitive("PRINT", 1, 1, -1));
        cat
    }

    fn line(texts: &[&str]) -> List {
        List::from_vec(texts.iter().map(|t| Datum::word(t)).collect())
    }

    #[test]
    fn sum_greedily_consumes_product() {
        let cat = catalogue_with_arithmetic();
        let instr = line(&["sum", "1", "2*3"]);
        let statements = parse_instruction_list(&instr, &cat, true).unwrap();
        assert_eq!(statements.len(), 1);
        if let AstOp::Call(CallTarget::Primitive(p)) = &statements[0].op {
            assert_eq!(p.name, "SUM");
        } else {
            panic!("expected SUM call");
        }
    }

    #[test]
    fn print_plus_is_one_statement() {
        let cat = catalogue_with_arithmetic();
        let instr = line(&["print", "1+2"]);
        let statements = parse_instruction_list(&instr, &cat, true).unwrap();
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn unknown_bare_name_is_getter() {
        let cat = catalogue_with_arithmetic();
        let instr = line(&["shape"]);
        let statements = parse_instruction_list(&instr, &cat, true).unwrap();
        assert_eq!(statements.len(), 1);
        assert!(matches!(statements[0].op, AstOp::Call(CallTarget::Getter(_))));
    }

    #[test]
    fn unknown_set_prefixed_name_is_setter() {
        let cat = catalogue_with_arithmetic();
        let instr = line(&["setshape", "1"]);
        let statements = parse_instruction_list(&instr, &cat, true).unwrap();
        assert_eq!(statements.len(), 1);
        assert!(matches!(statements[0].op, AstOp::Call(CallTarget::Setter(_))));
    }

    #[test]
    fn unknown_bare_name_raises_no_how_when_get_set_disallowed() {
        let cat = catalogue_with_arithmetic();
        let instr = line(&["shape"]);
        let err = parse_instruction_list(&instr, &cat, false).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoHow);
        assert!(err.message().to_ascii_lowercase().contains("shape"));
    }

    #[test]
    fn getter_name_preserves_original_case() {
        let cat = catalogue_with_arithmetic();
        let instr = line(&["Shape"]);
        let statements = parse_instruction_list(&instr, &cat, true).unwrap();
        match &statements[0].op {
            AstOp::Call(CallTarget::Getter(name)) => assert_eq!(name, "Shape"),
            _ => panic!("expected Getter call"),
        }
    }
}
