use std::rc::Rc;

use skein_syntax::{Diagnostic, DiagnosticKind, Span, TokenKind, unquote};

use super::Parser;
use super::parser::{AND_BP, OR_BP, infix_binding_power, parse_number_literal};
use crate::{
    AssignOp, BinaryOp, Expr, ExprKind, LogicalOp, Name, PropInit, UnaryOp, UpdateOp,
};

enum Infix {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

impl<'a> Parser<'a> {
    /// Comma-separated expression list; a single item is returned as-is.
    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        let first = self.parse_assign()?;
        if !self.at(TokenKind::Comma) {
            return Some(first);
        }
        let start = first.span.start.0;
        let mut items = vec![first];
        while self.at(TokenKind::Comma) {
            self.bump();
            items.push(self.parse_assign()?);
        }
        Some(Expr::new(
            ExprKind::Sequence(items.into_boxed_slice()),
            Span::new(start, self.prev_end()),
        ))
    }

    pub(crate) fn parse_assign(&mut self) -> Option<Expr> {
        self.skip_trivia();
        if !self.descend() {
            return None;
        }
        let expr = self.parse_assign_inner();
        self.ascend();
        expr
    }

    fn parse_assign_inner(&mut self) -> Option<Expr> {
        let target = self.parse_conditional()?;
        let Some(op) = assign_op(self.peek_kind()) else {
            return Some(target);
        };
        if !is_assignable(&target) {
            self.diagnostics.push(Diagnostic::error_kind(
                DiagnosticKind::InvalidAssignmentTarget,
                Some(target.span),
            ));
            return None;
        }
        self.bump();
        let value = self.parse_assign()?;
        let span = target.span.merge(value.span);
        Some(Expr::new(
            ExprKind::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
            span,
        ))
    }

    fn parse_conditional(&mut self) -> Option<Expr> {
        let test = self.parse_binary(0)?;
        if !self.at(TokenKind::Question) {
            return Some(test);
        }
        self.bump();
        let prev_no_in = std::mem::replace(&mut self.no_in, false);
        let then = self.parse_assign();
        self.no_in = prev_no_in;
        let then = then?;
        self.expect(TokenKind::Colon)?;
        let otherwise = self.parse_assign()?;
        let span = test.span.merge(otherwise.span);
        Some(Expr::new(
            ExprKind::Conditional {
                test: Box::new(test),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            },
            span,
        ))
    }

    fn parse_binary(&mut self, min_bp: u8) -> Option<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let Some(op) = self.infix_op() else { break };
            let (lbp, rbp) = match op {
                Infix::Logical(LogicalOp::Or) => OR_BP,
                Infix::Logical(LogicalOp::And) => AND_BP,
                Infix::Binary(op) => infix_binding_power(op),
            };
            if lbp < min_bp {
                break;
            }
            self.bump();
            self.skip_trivia();
            let rhs = self.parse_binary(rbp)?;
            let span = lhs.span.merge(rhs.span);
            let kind = match op {
                Infix::Logical(op) => ExprKind::Logical {
                    op,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                },
                Infix::Binary(op) => ExprKind::Binary {
                    op,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                },
            };
            lhs = Expr::new(kind, span);
        }
        Some(lhs)
    }

    fn infix_op(&self) -> Option<Infix> {
        let op = match self.peek_kind() {
            TokenKind::PipePipe => return Some(Infix::Logical(LogicalOp::Or)),
            TokenKind::AmpAmp => return Some(Infix::Logical(LogicalOp::And)),
            TokenKind::Pipe => BinaryOp::BitOr,
            TokenKind::Caret => BinaryOp::BitXor,
            TokenKind::Amp => BinaryOp::BitAnd,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::Ne => BinaryOp::Ne,
            TokenKind::EqEqEq => BinaryOp::StrictEq,
            TokenKind::NeEq => BinaryOp::StrictNe,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::Le => BinaryOp::Le,
            TokenKind::Ge => BinaryOp::Ge,
            TokenKind::KwIn if !self.no_in => BinaryOp::In,
            TokenKind::KwInstanceof => BinaryOp::Instanceof,
            TokenKind::Shl => BinaryOp::Shl,
            TokenKind::Shr => BinaryOp::Shr,
            TokenKind::UShr => BinaryOp::UShr,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            _ => return None,
        };
        Some(Infix::Binary(op))
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        let start = self.cur_span();
        let op = match self.peek_kind() {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Tilde => UnaryOp::BitNot,
            TokenKind::KwTypeof => UnaryOp::Typeof,
            TokenKind::KwVoid => UnaryOp::Void,
            TokenKind::KwDelete => UnaryOp::Delete,
            TokenKind::PlusPlus | TokenKind::MinusMinus => return self.parse_prefix_update(),
            _ => return self.parse_postfix(),
        };
        self.bump();
        if !self.descend() {
            return None;
        }
        let operand = self.parse_unary();
        self.ascend();
        let operand = operand?;
        let span = start.merge(operand.span);
        Some(Expr::new(
            ExprKind::Unary {
                op,
                expr: Box::new(operand),
            },
            span,
        ))
    }

    fn parse_prefix_update(&mut self) -> Option<Expr> {
        let t = self.bumped();
        let op = if t.kind == TokenKind::PlusPlus {
            UpdateOp::Inc
        } else {
            UpdateOp::Dec
        };
        let target = self.parse_unary()?;
        self.check_update_target(&target)?;
        let span = t.span.merge(target.span);
        Some(Expr::new(
            ExprKind::Update {
                op,
                prefix: true,
                target: Box::new(target),
            },
            span,
        ))
    }

    fn parse_postfix(&mut self) -> Option<Expr> {
        let expr = self.parse_call_member()?;
        let op = match self.peek_kind() {
            TokenKind::PlusPlus => UpdateOp::Inc,
            TokenKind::MinusMinus => UpdateOp::Dec,
            _ => return Some(expr),
        };
        self.check_update_target(&expr)?;
        let t = self.bumped();
        let span = expr.span.merge(t.span);
        Some(Expr::new(
            ExprKind::Update {
                op,
                prefix: false,
                target: Box::new(expr),
            },
            span,
        ))
    }

    fn check_update_target(&mut self, target: &Expr) -> Option<()> {
        if is_assignable(target) {
            return Some(());
        }
        self.diagnostics.push(Diagnostic::error(
            "Invalid left-hand side expression in update operation",
            Some(target.span),
        ));
        None
    }

    fn parse_call_member(&mut self) -> Option<Expr> {
        let mut expr = if self.at(TokenKind::KwNew) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        loop {
            expr = match self.peek_kind() {
                TokenKind::Dot | TokenKind::LBracket => self.parse_member_suffix(expr)?,
                TokenKind::LParen => {
                    let args = self.parse_args()?;
                    let span = Span::new(expr.span.start.0, self.prev_end());
                    Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    )
                }
                _ => return Some(expr),
            };
        }
    }

    /// `new Callee(args)`; the argument list is optional.
    fn parse_new(&mut self) -> Option<Expr> {
        let t = self.bumped();
        let mut callee = if self.at(TokenKind::KwNew) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        while matches!(self.peek_kind(), TokenKind::Dot | TokenKind::LBracket) {
            callee = self.parse_member_suffix(callee)?;
        }
        let args = if self.at(TokenKind::LParen) {
            self.parse_args()?
        } else {
            Box::default()
        };
        Some(Expr::new(
            ExprKind::New {
                callee: Box::new(callee),
                args,
            },
            Span::new(t.span.start.0, self.prev_end()),
        ))
    }

    fn parse_member_suffix(&mut self, object: Expr) -> Option<Expr> {
        let start = object.span.start.0;
        if self.at(TokenKind::Dot) {
            self.bump();
            let property = self.expect_property_name()?;
            return Some(Expr::new(
                ExprKind::Member {
                    object: Box::new(object),
                    property,
                },
                Span::new(start, self.prev_end()),
            ));
        }
        self.expect(TokenKind::LBracket)?;
        let prev_no_in = std::mem::replace(&mut self.no_in, false);
        let index = self.parse_expression();
        self.no_in = prev_no_in;
        let index = index?;
        self.expect(TokenKind::RBracket)?;
        Some(Expr::new(
            ExprKind::Index {
                object: Box::new(object),
                index: Box::new(index),
            },
            Span::new(start, self.prev_end()),
        ))
    }

    /// Identifier after `.`; reserved words are allowed here.
    fn expect_property_name(&mut self) -> Option<Name> {
        self.skip_trivia();
        let kind = self.peek_kind();
        if kind == TokenKind::Ident || kind.is_keyword() {
            let t = self.bumped();
            return Some(Name::from(self.token_text(&t)));
        }
        self.unexpected();
        None
    }

    fn parse_args(&mut self) -> Option<Box<[Expr]>> {
        self.expect(TokenKind::LParen)?;
        let prev_no_in = std::mem::replace(&mut self.no_in, false);
        let args = self.parse_list(TokenKind::RParen);
        self.no_in = prev_no_in;
        let args = args?;
        self.expect(TokenKind::RParen)?;
        Some(args)
    }

    /// Comma-separated assignment expressions up to (not including) `close`.
    fn parse_list(&mut self, close: TokenKind) -> Option<Box<[Expr]>> {
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            if self.at(close) {
                break;
            }
            items.push(self.parse_assign()?);
            self.skip_trivia();
            if self.at(TokenKind::Comma) {
                self.bump();
                continue;
            }
            break;
        }
        Some(items.into_boxed_slice())
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        self.skip_trivia();
        let span = self.cur_span();
        let kind = match self.peek_kind() {
            TokenKind::Number => {
                let t = self.bumped();
                ExprKind::Number(parse_number_literal(self.token_text(&t)))
            }
            TokenKind::Str => {
                let t = self.bumped();
                ExprKind::Str(Name::from(unquote(self.token_text(&t))))
            }
            TokenKind::True => {
                self.bump();
                ExprKind::Bool(true)
            }
            TokenKind::False => {
                self.bump();
                ExprKind::Bool(false)
            }
            TokenKind::Null => {
                self.bump();
                ExprKind::Null
            }
            TokenKind::KwThis => {
                self.bump();
                ExprKind::This
            }
            TokenKind::Ident => {
                let t = self.bumped();
                ExprKind::Ident(Name::from(self.token_text(&t)))
            }
            TokenKind::LParen => {
                self.bump();
                let prev_no_in = std::mem::replace(&mut self.no_in, false);
                let inner = self.parse_expression();
                self.no_in = prev_no_in;
                let inner = inner?;
                self.expect(TokenKind::RParen)?;
                return Some(Expr::new(
                    inner.kind,
                    Span::new(span.start.0, self.prev_end()),
                ));
            }
            TokenKind::LBracket => {
                self.bump();
                let prev_no_in = std::mem::replace(&mut self.no_in, false);
                let items = self.parse_list(TokenKind::RBracket);
                self.no_in = prev_no_in;
                let items = items?;
                self.expect(TokenKind::RBracket)?;
                ExprKind::Array(items)
            }
            TokenKind::LBrace => ExprKind::Object(self.parse_object_literal()?),
            TokenKind::KwFunction => {
                let prev_no_in = std::mem::replace(&mut self.no_in, false);
                let func = self.parse_function(false);
                self.no_in = prev_no_in;
                ExprKind::Function(Rc::new(func?))
            }
            _ => {
                self.unexpected();
                return None;
            }
        };
        Some(Expr::new(kind, Span::new(span.start.0, self.prev_end())))
    }

    fn parse_object_literal(&mut self) -> Option<Box<[PropInit]>> {
        self.expect(TokenKind::LBrace)?;
        let prev_no_in = std::mem::replace(&mut self.no_in, false);
        let props = self.parse_object_props();
        self.no_in = prev_no_in;
        let props = props?;
        self.skip_trivia();
        self.expect(TokenKind::RBrace)?;
        Some(props)
    }

    fn parse_object_props(&mut self) -> Option<Box<[PropInit]>> {
        let mut props = Vec::new();
        loop {
            self.skip_trivia();
            if self.at(TokenKind::RBrace) {
                break;
            }
            let key = match self.peek_kind() {
                TokenKind::Str => {
                    let t = self.bumped();
                    Name::from(unquote(self.token_text(&t)))
                }
                TokenKind::Number => {
                    let t = self.bumped();
                    let n = parse_number_literal(self.token_text(&t));
                    Name::from(number_key(n))
                }
                _ => self.expect_property_name()?,
            };
            self.skip_trivia();
            self.expect(TokenKind::Colon)?;
            let value = self.parse_assign()?;
            props.push(PropInit { key, value });
            self.skip_trivia();
            if self.at(TokenKind::Comma) {
                self.bump();
                continue;
            }
            break;
        }
        Some(props.into_boxed_slice())
    }
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    Some(match kind {
        TokenKind::Eq => AssignOp::Set,
        TokenKind::PlusEq => AssignOp::Add,
        TokenKind::MinusEq => AssignOp::Sub,
        TokenKind::StarEq => AssignOp::Mul,
        TokenKind::SlashEq => AssignOp::Div,
        TokenKind::PercentEq => AssignOp::Mod,
        TokenKind::AmpEq => AssignOp::BitAnd,
        TokenKind::PipeEq => AssignOp::BitOr,
        TokenKind::CaretEq => AssignOp::BitXor,
        TokenKind::ShlEq => AssignOp::Shl,
        TokenKind::ShrEq => AssignOp::Shr,
        TokenKind::UShrEq => AssignOp::UShr,
        _ => return None,
    })
}

fn is_assignable(expr: &Expr) -> bool {
    matches!(
        expr.kind,
        ExprKind::Ident(_) | ExprKind::Member { .. } | ExprKind::Index { .. }
    )
}

/// Numeric object keys use the canonical integer spelling where one exists.
fn number_key(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
