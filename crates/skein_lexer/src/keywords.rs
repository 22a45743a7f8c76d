use phf::phf_map;
use skein_syntax::TokenKind;

pub(crate) static KEYWORDS: phf::Map<&'static str, TokenKind> = phf_map! {
    "true" => TokenKind::True,
    "false" => TokenKind::False,
    "null" => TokenKind::Null,
    "var" => TokenKind::KwVar,
    "let" => TokenKind::KwLet,
    "const" => TokenKind::KwConst,
    "function" => TokenKind::KwFunction,
    "return" => TokenKind::KwReturn,
    "if" => TokenKind::KwIf,
    "else" => TokenKind::KwElse,
    "while" => TokenKind::KwWhile,
    "do" => TokenKind::KwDo,
    "for" => TokenKind::KwFor,
    "in" => TokenKind::KwIn,
    "break" => TokenKind::KwBreak,
    "continue" => TokenKind::KwContinue,
    "throw" => TokenKind::KwThrow,
    "try" => TokenKind::KwTry,
    "catch" => TokenKind::KwCatch,
    "finally" => TokenKind::KwFinally,
    "new" => TokenKind::KwNew,
    "this" => TokenKind::KwThis,
    "typeof" => TokenKind::KwTypeof,
    "void" => TokenKind::KwVoid,
    "delete" => TokenKind::KwDelete,
    "instanceof" => TokenKind::KwInstanceof,
};
