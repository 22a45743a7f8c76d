use std::rc::Rc;

use skein_syntax::{Diagnostic, DiagnosticKind, Span, TokenKind};

use super::Parser;
use crate::{
    CatchClause, Expr, ExprKind, ForInStmt, ForInit, ForStmt, FunctionNode, IfStmt, Stmt,
    TryStmt, VarDecl, VarDeclarator, VarKind, WhileStmt,
};

impl<'a> Parser<'a> {
    /// Parse a single statement.
    pub(super) fn parse_stmt(&mut self) -> Option<Stmt> {
        self.skip_trivia();
        if !self.descend() {
            return None;
        }
        let stmt = self.parse_stmt_inner();
        self.ascend();
        stmt
    }

    fn parse_stmt_inner(&mut self) -> Option<Stmt> {
        match self.peek_kind() {
            TokenKind::LBrace => self.parse_block().map(Stmt::Block),
            TokenKind::StmtEnd => {
                self.bump();
                Some(Stmt::Empty)
            }
            TokenKind::KwVar | TokenKind::KwLet | TokenKind::KwConst => {
                let decl = self.parse_var_decl()?;
                self.expect_stmt_terminator()?;
                Some(Stmt::Var(decl))
            }
            TokenKind::KwFunction => self.parse_function_decl(),
            TokenKind::KwIf => self.parse_if(),
            TokenKind::KwWhile => self.parse_while(),
            TokenKind::KwDo => self.parse_do_while(),
            TokenKind::KwFor => self.parse_for(),
            TokenKind::KwReturn => self.parse_return(),
            TokenKind::KwBreak | TokenKind::KwContinue => self.parse_jump(),
            TokenKind::KwThrow => self.parse_throw(),
            TokenKind::KwTry => self.parse_try(),
            _ => {
                let expr = self.parse_expression()?;
                self.expect_stmt_terminator()?;
                Some(Stmt::Expr(expr))
            }
        }
    }

    /// Parse `{ stmts... }`.
    pub(crate) fn parse_block(&mut self) -> Option<Box<[Stmt]>> {
        self.skip_trivia();
        self.expect(TokenKind::LBrace)?;
        let mut stmts: Vec<Stmt> = Vec::with_capacity(8);
        loop {
            self.skip_trivia();
            if self.at(TokenKind::RBrace) || self.at(TokenKind::Eof) {
                break;
            }
            let before = self.i;
            match self.parse_stmt() {
                Some(s) => stmts.push(s),
                None => stmts.push(self.recover_stmt()),
            }
            if self.i == before {
                self.bump();
            }
        }
        self.expect(TokenKind::RBrace)?;
        Some(stmts.into_boxed_slice())
    }

    /// Parse a statement used as the body of a control construct.
    fn parse_body(&mut self) -> Option<Stmt> {
        self.skip_trivia();
        match self.parse_stmt() {
            Some(s) => Some(s),
            None => Some(self.recover_stmt()),
        }
    }

    fn parse_loop_body(&mut self) -> Option<Stmt> {
        self.scope().loop_depth += 1;
        let body = self.parse_body();
        self.scope().loop_depth -= 1;
        body
    }

    pub(crate) fn parse_var_decl(&mut self) -> Option<VarDecl> {
        let kind = match self.bumped().kind {
            TokenKind::KwLet => VarKind::Let,
            TokenKind::KwConst => VarKind::Const,
            _ => VarKind::Var,
        };
        let mut decls = Vec::with_capacity(1);
        loop {
            let (name, name_span) = self.expect_ident()?;
            let init = if self.at(TokenKind::Eq) {
                self.bump();
                Some(self.parse_assign()?)
            } else {
                None
            };
            if kind == VarKind::Const && init.is_none() && !(self.no_in && self.at(TokenKind::KwIn))
            {
                self.diagnostics.push(Diagnostic::error_kind(
                    DiagnosticKind::MissingInitializer(name.to_string()),
                    Some(name_span),
                ));
                return None;
            }
            if kind == VarKind::Var {
                self.declare_var(&name);
            }
            let span = Span::new(name_span.start.0, self.prev_end());
            decls.push(VarDeclarator { name, init, span });
            if self.at(TokenKind::Comma) {
                self.bump();
                continue;
            }
            break;
        }
        Some(VarDecl {
            kind,
            decls: decls.into_boxed_slice(),
        })
    }

    fn parse_function_decl(&mut self) -> Option<Stmt> {
        let func = Rc::new(self.parse_function(true)?);
        self.declare_function(func.clone());
        Some(Stmt::Function(func))
    }

    /// Parse `function name?(params) { body }`; the `function` keyword is current.
    pub(crate) fn parse_function(&mut self, require_name: bool) -> Option<FunctionNode> {
        let start = self.expect(TokenKind::KwFunction)?.span;
        let name = if self.at(TokenKind::Ident) || require_name {
            Some(self.expect_ident()?.0)
        } else {
            None
        };
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                params.push(self.expect_ident()?.0);
                if self.at(TokenKind::Comma) {
                    self.bump();
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        self.enter_function();
        let body = self.parse_block();
        let scope = self.exit_function();
        let body = body?;
        Some(FunctionNode {
            name,
            params: params.into_boxed_slice(),
            body,
            scope,
            span: Span::new(start.start.0, self.prev_end()),
        })
    }

    fn parse_paren_cond(&mut self) -> Option<Expr> {
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        Some(cond)
    }

    fn parse_if(&mut self) -> Option<Stmt> {
        self.bump();
        let cond = self.parse_paren_cond()?;
        let then_branch = self.parse_body()?;
        let else_branch = if self.peek_past_newlines() == TokenKind::KwElse {
            self.skip_trivia();
            self.bump();
            Some(self.parse_body()?)
        } else {
            None
        };
        Some(Stmt::If(Box::new(IfStmt {
            cond,
            then_branch,
            else_branch,
        })))
    }

    fn parse_while(&mut self) -> Option<Stmt> {
        self.bump();
        let cond = self.parse_paren_cond()?;
        let body = self.parse_loop_body()?;
        Some(Stmt::While(Box::new(WhileStmt { cond, body })))
    }

    fn parse_do_while(&mut self) -> Option<Stmt> {
        self.bump();
        let body = self.parse_loop_body()?;
        self.skip_trivia();
        self.expect(TokenKind::KwWhile)?;
        let cond = self.parse_paren_cond()?;
        if self.at(TokenKind::StmtEnd) || self.at(TokenKind::Newline) {
            self.bump();
        }
        Some(Stmt::DoWhile(Box::new(WhileStmt { cond, body })))
    }

    fn parse_for(&mut self) -> Option<Stmt> {
        self.bump();
        self.expect(TokenKind::LParen)?;
        let prev_no_in = std::mem::replace(&mut self.no_in, true);
        let init = match self.peek_kind() {
            TokenKind::StmtEnd => None,
            TokenKind::KwVar | TokenKind::KwLet | TokenKind::KwConst => {
                self.parse_var_decl().map(ForInit::Var)
            }
            _ => self.parse_expression().map(ForInit::Expr),
        };
        self.no_in = prev_no_in;

        if self.at(TokenKind::KwIn) {
            let in_span = self.cur_span();
            let target = match init {
                Some(ForInit::Var(decl)) if decl.decls.len() == 1 && decl.decls[0].init.is_none() => {
                    Some((Some(decl.kind), decl.decls[0].name.clone()))
                }
                Some(ForInit::Expr(Expr {
                    kind: ExprKind::Ident(name),
                    ..
                })) => Some((None, name)),
                _ => None,
            };
            let Some((decl, name)) = target else {
                self.diagnostics.push(Diagnostic::error_kind(
                    DiagnosticKind::InvalidAssignmentTarget,
                    Some(in_span),
                ));
                return None;
            };
            self.bump();
            let object = self.parse_expression()?;
            self.expect(TokenKind::RParen)?;
            let body = self.parse_loop_body()?;
            return Some(Stmt::ForIn(Box::new(ForInStmt {
                decl,
                name,
                object,
                body,
            })));
        }

        let init = match init {
            Some(init) => Some(init),
            None if self.at(TokenKind::StmtEnd) => None,
            None => return None,
        };
        self.expect(TokenKind::StmtEnd)?;
        let test = if self.at(TokenKind::StmtEnd) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::StmtEnd)?;
        let update = if self.at(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::RParen)?;
        let body = self.parse_loop_body()?;
        Some(Stmt::For(Box::new(ForStmt {
            init,
            test,
            update,
            body,
        })))
    }

    fn parse_return(&mut self) -> Option<Stmt> {
        let t = self.bumped();
        if !self.scope().in_function {
            self.diagnostics.push(Diagnostic::error_kind(
                DiagnosticKind::IllegalReturn,
                Some(t.span),
            ));
            return None;
        }
        let value = if self.at_terminator() {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let span = Span::new(t.span.start.0, self.prev_end());
        self.expect_stmt_terminator()?;
        Some(Stmt::Return(value, span))
    }

    fn parse_jump(&mut self) -> Option<Stmt> {
        let t = self.bumped();
        if self.scope().loop_depth == 0 {
            let kind = if t.kind == TokenKind::KwBreak {
                DiagnosticKind::IllegalBreak
            } else {
                DiagnosticKind::IllegalContinue
            };
            self.diagnostics
                .push(Diagnostic::error_kind(kind, Some(t.span)));
            return None;
        }
        self.expect_stmt_terminator()?;
        if t.kind == TokenKind::KwBreak {
            Some(Stmt::Break(t.span))
        } else {
            Some(Stmt::Continue(t.span))
        }
    }

    fn parse_throw(&mut self) -> Option<Stmt> {
        let t = self.bumped();
        if self.at(TokenKind::Newline) {
            self.diagnostics.push(Diagnostic::error(
                "Illegal newline after throw",
                Some(t.span),
            ));
            return None;
        }
        let value = self.parse_expression()?;
        let span = Span::new(t.span.start.0, value.span.end.0);
        self.expect_stmt_terminator()?;
        Some(Stmt::Throw(value, span))
    }

    fn parse_try(&mut self) -> Option<Stmt> {
        let t = self.bumped();
        let block = self.parse_block()?;
        let catch = if self.peek_past_newlines() == TokenKind::KwCatch {
            self.skip_trivia();
            self.bump();
            let param = if self.at(TokenKind::LParen) {
                self.bump();
                let (name, _) = self.expect_ident()?;
                self.expect(TokenKind::RParen)?;
                Some(name)
            } else {
                None
            };
            let body = self.parse_block()?;
            Some(CatchClause { param, body })
        } else {
            None
        };
        let finally = if self.peek_past_newlines() == TokenKind::KwFinally {
            self.skip_trivia();
            self.bump();
            Some(self.parse_block()?)
        } else {
            None
        };
        if catch.is_none() && finally.is_none() {
            self.diagnostics.push(Diagnostic::error_kind(
                DiagnosticKind::MissingCatchOrFinally,
                Some(t.span),
            ));
            return None;
        }
        Some(Stmt::Try(Box::new(TryStmt {
            block,
            catch,
            finally,
        })))
    }

    fn at_terminator(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::StmtEnd | TokenKind::Newline | TokenKind::RBrace | TokenKind::Eof
        )
    }
}
