//! Token definitions.
//!
//! Keywords, punctuators, literals and the layout-sensitive `Newline` token used for automatic
//! statement termination.
use crate::Span;

/// Token kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Line break that may terminate a statement.
    Newline,

    /// Identifier.
    Ident,
    /// Numeric literal (decimal, hex, octal, binary, float).
    Number,
    /// String literal (single or double quoted).
    Str,

    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,

    KwVar,
    KwLet,
    KwConst,
    KwFunction,
    KwReturn,
    KwIf,
    KwElse,
    KwWhile,
    KwDo,
    KwFor,
    KwIn,
    KwBreak,
    KwContinue,
    KwThrow,
    KwTry,
    KwCatch,
    KwFinally,
    KwNew,
    KwThis,
    KwTypeof,
    KwVoid,
    KwDelete,
    KwInstanceof,

    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `.`
    Dot,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `?`
    Question,
    /// Statement terminator (`;`).
    StmtEnd,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Bang,
    AmpAmp,
    PipePipe,
    Shl,
    Shr,
    UShr,

    Lt,
    Gt,
    Le,
    Ge,
    /// `==`
    EqEq,
    /// `!=`
    Ne,
    /// `===`
    EqEqEq,
    /// `!==`
    NeEq,

    /// `=`
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    ShlEq,
    ShrEq,
    UShrEq,

    /// End of file.
    Eof,
}

impl TokenKind {
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::KwVar
                | TokenKind::KwLet
                | TokenKind::KwConst
                | TokenKind::KwFunction
                | TokenKind::KwReturn
                | TokenKind::KwIf
                | TokenKind::KwElse
                | TokenKind::KwWhile
                | TokenKind::KwDo
                | TokenKind::KwFor
                | TokenKind::KwIn
                | TokenKind::KwBreak
                | TokenKind::KwContinue
                | TokenKind::KwThrow
                | TokenKind::KwTry
                | TokenKind::KwCatch
                | TokenKind::KwFinally
                | TokenKind::KwNew
                | TokenKind::KwThis
                | TokenKind::KwTypeof
                | TokenKind::KwVoid
                | TokenKind::KwDelete
                | TokenKind::KwInstanceof
        )
    }

    /// Tokens after which a line break never ends the statement.
    pub fn continues_expression(self) -> bool {
        matches!(
            self,
            TokenKind::Dot
                | TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::Question
                | TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Percent
                | TokenKind::Amp
                | TokenKind::Pipe
                | TokenKind::Caret
                | TokenKind::Tilde
                | TokenKind::Bang
                | TokenKind::AmpAmp
                | TokenKind::PipePipe
                | TokenKind::Shl
                | TokenKind::Shr
                | TokenKind::UShr
                | TokenKind::Lt
                | TokenKind::Gt
                | TokenKind::Le
                | TokenKind::Ge
                | TokenKind::EqEq
                | TokenKind::Ne
                | TokenKind::EqEqEq
                | TokenKind::NeEq
                | TokenKind::Eq
                | TokenKind::PlusEq
                | TokenKind::MinusEq
                | TokenKind::StarEq
                | TokenKind::SlashEq
                | TokenKind::PercentEq
                | TokenKind::AmpEq
                | TokenKind::PipeEq
                | TokenKind::CaretEq
                | TokenKind::ShlEq
                | TokenKind::ShrEq
                | TokenKind::UShrEq
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::LBrace
                | TokenKind::KwIn
                | TokenKind::KwInstanceof
                | TokenKind::KwNew
                | TokenKind::KwTypeof
                | TokenKind::KwVoid
                | TokenKind::KwDelete
        )
    }
}

/// Token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// Token kind.
    pub kind: TokenKind,
    /// Span in source text.
    pub span: Span,
}
