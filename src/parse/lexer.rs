use crate::common::*;
use logos::Logos;
use std::fmt;

#[derive(Logos, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TokenKind {
    #[regex(r"[0-9]+")]
    Integer,
    #[regex(r"[0-9]+\.[0-9]+")]
    Decimal,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r#"'([^'\\\n]|\\.)*'"#)]
    String,

    // The modifier chain is parsed separately by `parse::dice`
    #[regex(
        r"[0-9]*d([0-9]+|%)((kh|kl|dh|dl|k|p|rr|ro|ra|r|e|mi|ma|sa|sd|s|!)(h|l)?(<=|>=|<|>|=)?[0-9]*)*",
        priority = 10
    )]
    Dice,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,

    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("return")]
    Return,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("and")]
    #[token("&&")]
    And,
    #[token("or")]
    #[token("||")]
    Or,
    #[token("not")]
    #[token("!")]
    Not,

    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("..")]
    DotDot,

    #[token("=")]
    Assign,
    #[token("+=")]
    PlusAssign,
    #[token("-=")]
    MinusAssign,
    #[token("*=")]
    StarAssign,
    #[token("/=")]
    SlashAssign,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("//")]
    SlashSlash,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("==")]
    EqualEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("<=")]
    LessEqual,
    #[token("!=")]
    BangEqual,
    #[token("<")]
    LessThan,
    #[token(">")]
    GreaterThan,

    #[regex(r"\[[^\]\n]+\]")]
    Annotation,
    #[token("[]")]
    ErrEmptyAnnotation,

    #[regex(r"\r?\n")]
    Newline,

    #[regex(r"#[^\n]*", logos::skip)]
    #[regex(r"[ \t\r\f]+", logos::skip)]
    #[error]
    Error,
}

impl TokenKind {
    pub const UNARY_OPS: &'static [Self] = &[Self::Plus, Self::Minus];

    pub const COMPARISON_OPS: &'static [Self] = &[
        Self::LessThan,
        Self::GreaterThan,
        Self::LessEqual,
        Self::GreaterEqual,
        Self::EqualEqual,
        Self::BangEqual,
    ];

    pub const ADDITION_OPS: &'static [Self] = &[Self::Plus, Self::Minus];

    pub const MULTIPLICATION_OPS: &'static [Self] =
        &[Self::Star, Self::Slash, Self::SlashSlash, Self::Percent];

    pub const ASSIGNMENT_OPS: &'static [Self] = &[
        Self::Assign,
        Self::PlusAssign,
        Self::MinusAssign,
        Self::StarAssign,
        Self::SlashAssign,
    ];

    pub const ATOMS: &'static [Self] = &[
        Self::Integer,
        Self::Decimal,
        Self::String,
        Self::Dice,
        Self::Identifier,
        Self::True,
        Self::False,
        Self::LeftParen,
        Self::LeftBrace,
        Self::If,
    ];

    pub fn as_str(&self) -> &'static str {
        use TokenKind::*;

        match self {
            Integer => "<integer>",
            Decimal => "<decimal>",
            String => "<string>",
            Dice => "<dice>",
            Identifier => "<identifier>",
            If => "'if'",
            Else => "'else'",
            While => "'while'",
            For => "'for'",
            In => "'in'",
            Break => "'break'",
            Continue => "'continue'",
            Return => "'return'",
            True => "'true'",
            False => "'false'",
            And => "'and'",
            Or => "'or'",
            Not => "'not'",
            LeftParen => "'('",
            RightParen => "')'",
            LeftBrace => "'{'",
            RightBrace => "'}'",
            Comma => "','",
            Semicolon => "';'",
            DotDot => "'..'",
            Assign => "'='",
            PlusAssign => "'+='",
            MinusAssign => "'-='",
            StarAssign => "'*='",
            SlashAssign => "'/='",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            SlashSlash => "'//'",
            Slash => "'/'",
            Percent => "'%'",
            EqualEqual => "'=='",
            GreaterEqual => "'>='",
            LessEqual => "'<='",
            BangEqual => "'!='",
            LessThan => "'<'",
            GreaterThan => "'>'",
            Annotation => "<annotation>",
            Newline => "<newline>",
            ErrEmptyAnnotation | Error => "<error>",
        }
    }

    pub fn as_unary_op(&self) -> Option<UnaryOperator> {
        use UnaryOperator::*;
        Some(match self {
            Self::Plus => Pos,
            Self::Minus => Neg,
            Self::Not => Not,
            _ => return None,
        })
    }

    pub fn as_binary_op(&self) -> Option<BinaryOperator> {
        use BinaryOperator::*;
        Some(match self {
            Self::Plus | Self::PlusAssign => Add,
            Self::Minus | Self::MinusAssign => Sub,
            Self::Star | Self::StarAssign => Mul,
            Self::Slash | Self::SlashAssign => Div,
            Self::SlashSlash => Flr,
            Self::Percent => Rem,
            Self::LessThan => Lt,
            Self::GreaterThan => Gt,
            Self::LessEqual => Le,
            Self::GreaterEqual => Ge,
            Self::EqualEqual => Eq,
            Self::BangEqual => Ne,
            Self::And => And,
            Self::Or => Or,
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Splits `source` into tokens. Lexical errors are kept as
/// [`TokenKind::Error`] tokens and reported by the parser when reached.
pub fn tokenize(source: &str) -> Vec<Token> {
    TokenKind::lexer(source)
        .spanned()
        .map(|(kind, span)| Token { kind, span })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn kinds(s: &str) -> Vec<TokenKind> {
        tokenize(s).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lex_dice_and_identifiers() {
        assert_eq!(kinds("4d6kh3"), vec![Dice]);
        assert_eq!(kinds("d20"), vec![Dice]);
        assert_eq!(kinds("2d%"), vec![Dice]);
        assert_eq!(kinds("damage"), vec![Identifier]);
        assert_eq!(kinds("d20x"), vec![Identifier]);
        assert_eq!(kinds("dh"), vec![Identifier]);
        assert_eq!(kinds("3d6!"), vec![Dice]);
        assert_eq!(kinds("2d4r<3"), vec![Dice]);
        assert_eq!(kinds("2d6ra6rr1"), vec![Dice]);
    }

    #[test]
    fn test_lex_dice_stops_before_comparison() {
        assert_eq!(kinds("1d20>=15"), vec![Dice, GreaterEqual, Integer]);
        assert_eq!(kinds("2d6+3"), vec![Dice, Plus, Integer]);
    }

    #[test]
    fn test_lex_keywords_and_operators() {
        assert_eq!(
            kinds("if x >= 3 { y += 1 } else { y = 0 }"),
            vec![
                If, Identifier, GreaterEqual, Integer, LeftBrace, Identifier, PlusAssign, Integer,
                RightBrace, Else, LeftBrace, Identifier, Assign, Integer, RightBrace
            ]
        );
        assert_eq!(kinds("a && !b || c"), vec![Identifier, And, Not, Identifier, Or, Identifier]);
        assert_eq!(kinds("7 // 2"), vec![Integer, SlashSlash, Integer]);
    }

    #[test]
    fn test_lex_ranges_and_decimals() {
        assert_eq!(kinds("1..3"), vec![Integer, DotDot, Integer]);
        assert_eq!(kinds("1.5"), vec![Decimal]);
    }

    #[test]
    fn test_lex_comments_newlines_annotations() {
        assert_eq!(
            kinds("x = 1 # set x\ny"),
            vec![Identifier, Assign, Integer, Newline, Identifier]
        );
        assert_eq!(kinds("1d20 [fire]"), vec![Dice, Annotation]);
        assert_eq!(kinds("1d20 []"), vec![Dice, ErrEmptyAnnotation]);
    }

    #[test]
    fn test_lex_strings() {
        assert_eq!(kinds(r#""hello \"there\"""#), vec![String]);
        assert_eq!(kinds("'single'"), vec![String]);
        assert_eq!(kinds("@"), vec![Error]);
    }

    #[test]
    fn test_spans() {
        let tokens = tokenize("x = 2d6");
        assert_eq!(tokens[2].span, 4..7);
    }
}
