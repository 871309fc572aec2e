//! Expression parsing: the full precedence cascade from assignment down
//! through the binary-operator ladder to unary, postfix, and primary
//! expressions.

use kushc_lex::TokenKind;
use kushc_util::span::Span;
use kushc_util::Symbol;

use crate::ast::*;
use crate::Parser;

/// Binary precedence levels, loosest-binding first. [`Parser::parse_binary`]
/// walks this list to build the cascade; the same order is mirrored in
/// [`BinaryLevel`] for the analyzer's chained-comparison check.
const BINARY_LEVELS: &[BinaryLevel] = &[
    BinaryLevel::LogicalOr,
    BinaryLevel::LogicalAnd,
    BinaryLevel::InclusiveOr,
    BinaryLevel::ExclusiveOr,
    BinaryLevel::And,
    BinaryLevel::Equality,
    BinaryLevel::Relational,
    BinaryLevel::Shift,
    BinaryLevel::Additive,
    BinaryLevel::Multiplicative,
];

fn level_operators(level: BinaryLevel) -> &'static [TokenKind] {
    match level {
        BinaryLevel::LogicalOr => &[TokenKind::Pipe2],
        BinaryLevel::LogicalAnd => &[TokenKind::Amp2],
        BinaryLevel::InclusiveOr => &[TokenKind::Pipe],
        BinaryLevel::ExclusiveOr => &[TokenKind::Caret],
        BinaryLevel::And => &[TokenKind::Amp],
        BinaryLevel::Equality => &[TokenKind::Equal2, TokenKind::BangEqual],
        BinaryLevel::Relational => &[
            TokenKind::LAngle,
            TokenKind::RAngle,
            TokenKind::LAngleEqual,
            TokenKind::RAngleEqual,
        ],
        BinaryLevel::Shift => &[TokenKind::LAngle2, TokenKind::RAngle2, TokenKind::RAngle3],
        BinaryLevel::Additive => &[TokenKind::Plus, TokenKind::Minus],
        BinaryLevel::Multiplicative => &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
    }
}

impl<'a> Parser<'a> {
    pub(crate) fn parse_expr(&mut self) -> Expr {
        self.parse_assignment()
    }

    /// Assignment is right-associative: `a = b = c` parses as `a = (b = c)`.
    fn parse_assignment(&mut self) -> Expr {
        let target = self.parse_conditional();

        let op = match self.tokens.la(1) {
            TokenKind::Equal => Some(AssignOp::Assign),
            TokenKind::PercentEqual => Some(AssignOp::Percent),
            TokenKind::AmpEqual => Some(AssignOp::Amp),
            TokenKind::Star2Equal => Some(AssignOp::Star2),
            TokenKind::StarEqual => Some(AssignOp::Star),
            TokenKind::PlusEqual => Some(AssignOp::Plus),
            TokenKind::MinusEqual => Some(AssignOp::Minus),
            TokenKind::LAngle2Equal => Some(AssignOp::LShift),
            TokenKind::RAngle2Equal => Some(AssignOp::RShift),
            TokenKind::RAngle3Equal => Some(AssignOp::RShift3),
            TokenKind::PipeEqual => Some(AssignOp::Pipe),
            TokenKind::CaretEqual => Some(AssignOp::Caret),
            TokenKind::SlashEqual => Some(AssignOp::Slash),
            _ => None,
        };
        let Some(op) = op else {
            return target;
        };

        let op_tok = self.tokens.lt(1).clone();
        self.tokens.consume();
        let op_span = self.span_of(&op_tok);
        let value = self.parse_assignment();
        let span = target.span().merge(value.span());
        Expr::Assignment(Box::new(AssignmentExpr {
            target,
            op,
            op_span,
            value,
            span,
        }))
    }

    fn parse_conditional(&mut self) -> Expr {
        let cond = self.parse_binary(BinaryLevel::LogicalOr);
        if !self.check(TokenKind::Hook) {
            return cond;
        }
        self.tokens.consume();
        let then_expr = self.parse_assignment();
        self.expect(TokenKind::Colon);
        let else_expr = self.parse_conditional();
        let span = cond.span().merge(else_expr.span());
        Expr::Conditional(Box::new(ConditionalExpr {
            cond,
            then_expr,
            else_expr,
            span,
        }))
    }

    /// Parses one level of the binary-operator cascade, recursing to the
    /// next-tighter level for operands. Builds a single flat [`BinaryExpr`]
    /// per level so left-to-right order survives unreordered for the
    /// analyzer's chained-comparison rule.
    fn parse_binary(&mut self, level: BinaryLevel) -> Expr {
        let idx = BINARY_LEVELS.iter().position(|&l| l == level).unwrap();
        let next = |parser: &mut Self| {
            if idx + 1 < BINARY_LEVELS.len() {
                parser.parse_binary(BINARY_LEVELS[idx + 1])
            } else {
                parser.parse_unary()
            }
        };

        let left = next(self);
        let ops = level_operators(level);
        let mut others = Vec::new();
        while ops.contains(&self.tokens.la(1)) {
            let op_tok = self.tokens.lt(1).clone();
            self.tokens.consume();
            let rhs = next(self);
            others.push((op_tok, rhs));
        }

        if others.is_empty() {
            return left;
        }
        let span = left.span().merge(others.last().unwrap().1.span());
        Expr::Binary(Box::new(BinaryExpr {
            level,
            left,
            others,
            span,
        }))
    }

    fn parse_unary(&mut self) -> Expr {
        let op = match self.tokens.la(1) {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Tilde => Some(UnaryOp::Tilde),
            TokenKind::Bang => Some(UnaryOp::Bang),
            _ => None,
        };
        let Some(op) = op else {
            return self.parse_postfix();
        };

        let op_tok = self.tokens.lt(1).clone();
        self.tokens.consume();
        let op_span = self.span_of(&op_tok);
        let operand = self.parse_unary();
        let span = op_span.merge(operand.span());
        Expr::Unary(Box::new(UnaryExpr {
            op,
            op_span,
            operand,
            span,
        }))
    }

    fn parse_postfix(&mut self) -> Expr {
        let primary = self.parse_primary();
        let start_span = self.primary_span(&primary);
        let mut parts: Vec<PostfixPart> = Vec::new();

        loop {
            match self.tokens.la(1) {
                TokenKind::LBracket => {
                    self.tokens.consume();
                    let index = self.parse_expr();
                    let end = self.expect(TokenKind::RBracket);
                    parts.push(PostfixPart::Subscript(index, self.span_of(&end)));
                }
                TokenKind::LParen => {
                    self.tokens.consume();
                    let mut args = Vec::new();
                    if !self.check(TokenKind::RParen) {
                        loop {
                            args.push(self.parse_assignment());
                            if self.check(TokenKind::Comma) {
                                self.tokens.consume();
                                continue;
                            }
                            break;
                        }
                    }
                    let end = self.expect(TokenKind::RParen);
                    parts.push(PostfixPart::Call(args, self.span_of(&end)));
                }
                TokenKind::Dot => {
                    self.tokens.consume();
                    let name_tok = self.expect(TokenKind::Identifier);
                    parts.push(PostfixPart::Member(
                        Symbol::intern(&name_tok.text),
                        self.span_of(&name_tok),
                    ));
                }
                _ => break,
            }
        }

        let span = match parts.last() {
            Some(PostfixPart::Subscript(_, s))
            | Some(PostfixPart::Call(_, s))
            | Some(PostfixPart::Member(_, s)) => start_span.merge(*s),
            None => start_span,
        };
        Expr::Postfix(Box::new(PostfixExpr {
            primary,
            parts,
            span,
        }))
    }

    fn primary_span(&self, primary: &Primary) -> Span {
        match primary {
            Primary::Terminal(tok) => self.span_of(tok),
            Primary::Nested(expr) => expr.span(),
        }
    }

    fn parse_primary(&mut self) -> Primary {
        match self.tokens.la(1) {
            TokenKind::Identifier
            | TokenKind::IntegerLiteral
            | TokenKind::FloatingPointLiteral
            | TokenKind::StringLiteral
            | TokenKind::KeywordTrue
            | TokenKind::KeywordFalse
            | TokenKind::KeywordNull
            | TokenKind::KeywordThis => {
                let tok = self.tokens.lt(1).clone();
                self.tokens.consume();
                Primary::Terminal(tok)
            }
            TokenKind::LParen => {
                self.tokens.consume();
                let inner = self.parse_expr();
                self.expect(TokenKind::RParen);
                Primary::Nested(Box::new(inner))
            }
            TokenKind::KeywordNew => Primary::Nested(Box::new(self.parse_new_expr())),
            TokenKind::LBracket => Primary::Nested(Box::new(self.parse_array_literal())),
            TokenKind::LBrace => Primary::Nested(Box::new(self.parse_initializer())),
            _ => {
                self.error_unexpected(TokenKind::Identifier);
                let tok = self.tokens.lt(1).clone();
                self.tokens.consume();
                Primary::Terminal(tok)
            }
        }
    }

    fn parse_new_expr(&mut self) -> Expr {
        let start = self.expect(TokenKind::KeywordNew);
        let name_tok = self.expect(TokenKind::Identifier);
        self.expect(TokenKind::LParen);
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.parse_assignment());
                if self.check(TokenKind::Comma) {
                    self.tokens.consume();
                    continue;
                }
                break;
            }
        }
        let end = self.expect(TokenKind::RParen);
        Expr::New(Box::new(NewExpr {
            type_name: Symbol::intern(&name_tok.text),
            type_name_span: self.span_of(&name_tok),
            args,
            span: self.span_between(&start, &end),
        }))
    }

    fn parse_array_literal(&mut self) -> Expr {
        let start = self.expect(TokenKind::LBracket);
        let mut elements = Vec::new();
        if !self.check(TokenKind::RBracket) {
            loop {
                elements.push(self.parse_assignment());
                if self.check(TokenKind::Comma) {
                    self.tokens.consume();
                    continue;
                }
                break;
            }
        }
        let end = self.expect(TokenKind::RBracket);
        Expr::ArrayLiteral(ArrayLiteralExpr {
            elements,
            span: self.span_between(&start, &end),
        })
    }

    /// Parses a structure initializer: `{ field: expr, ... }`.
    fn parse_initializer(&mut self) -> Expr {
        let start = self.expect(TokenKind::LBrace);
        let mut entries = Vec::new();
        if !self.check(TokenKind::RBrace) {
            loop {
                let name_tok = self.expect(TokenKind::Identifier);
                let name_span = self.span_of(&name_tok);
                self.expect(TokenKind::Colon);
                let value = self.parse_assignment();
                entries.push((Symbol::intern(&name_tok.text), name_span, value));
                if self.check(TokenKind::Comma) {
                    self.tokens.consume();
                    continue;
                }
                break;
            }
        }
        let end = self.expect(TokenKind::RBrace);
        Expr::Initializer(InitializerExpr {
            entries,
            span: self.span_between(&start, &end),
        })
    }
}

#[cfg(test)]
mod tests {
    use kushc_util::Handler;

    use super::*;
    use kushc_lex::TokenStream;

    fn parse_expr(source: &str) -> (Expr, bool) {
        let handler = Handler::new();
        let tokens = TokenStream::new(source, &handler);
        let mut parser = Parser::new(tokens, &handler);
        let expr = parser.parse_expr();
        (expr, handler.has_errors())
    }

    #[test]
    fn precedence_binds_multiplication_tighter_than_addition() {
        let (expr, has_errors) = parse_expr("1 + 2 * 3");
        assert!(!has_errors);
        let Expr::Binary(b) = &expr else {
            panic!("expected a binary expression");
        };
        assert_eq!(b.level, BinaryLevel::Additive);
        assert_eq!(b.others.len(), 1);
        assert!(matches!(b.others[0].1, Expr::Binary(_)));
    }

    #[test]
    fn chained_relational_operators_stay_in_one_flat_node() {
        let (expr, has_errors) = parse_expr("a < b < c");
        assert!(!has_errors);
        let Expr::Binary(b) = &expr else {
            panic!("expected a binary expression");
        };
        assert_eq!(b.level, BinaryLevel::Relational);
        assert_eq!(b.others.len(), 2);
    }

    #[test]
    fn ternary_is_right_associative() {
        let (expr, has_errors) = parse_expr("a ? b : c ? d : e");
        assert!(!has_errors);
        let Expr::Conditional(cond) = &expr else {
            panic!("expected a conditional expression");
        };
        assert!(matches!(cond.else_expr, Expr::Conditional(_)));
    }

    #[test]
    fn postfix_chain_preserves_call_then_member_then_subscript() {
        let (expr, has_errors) = parse_expr("f(1, 2).field[0]");
        assert!(!has_errors);
        let Expr::Postfix(p) = &expr else {
            panic!("expected a postfix expression");
        };
        assert_eq!(p.parts.len(), 3);
        assert!(matches!(p.parts[0], PostfixPart::Call(_, _)));
        assert!(matches!(p.parts[1], PostfixPart::Member(_, _)));
        assert!(matches!(p.parts[2], PostfixPart::Subscript(_, _)));
    }

    #[test]
    fn new_expr_parses_constructor_arguments() {
        let (expr, has_errors) = parse_expr("new Point(1, 2)");
        assert!(!has_errors);
        let Expr::New(n) = &expr else {
            panic!("expected a new expression");
        };
        assert_eq!(n.type_name.as_str(), "Point");
        assert_eq!(n.args.len(), 2);
    }

    #[test]
    fn initializer_parses_named_fields() {
        let (expr, has_errors) = parse_expr("{ x: 1, y: 2 }");
        assert!(!has_errors);
        let Expr::Initializer(init) = &expr else {
            panic!("expected an initializer expression");
        };
        assert_eq!(init.entries.len(), 2);
        assert_eq!(init.entries[0].0.as_str(), "x");
    }

    #[test]
    fn unary_bang_nests_right_associatively() {
        let (expr, has_errors) = parse_expr("!!a");
        assert!(!has_errors);
        let Expr::Unary(u) = &expr else {
            panic!("expected a unary expression");
        };
        assert_eq!(u.op, UnaryOp::Bang);
        assert!(matches!(u.operand, Expr::Unary(_)));
    }
}
