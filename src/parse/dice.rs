//! Parser for a single dice-notation token, e.g. `4d6kh3` or `2d20r<3!`.

use super::ast::DiceTerm;
use super::error::ParseErrorKind;
use crate::common::*;
use crate::roll::ops::{
    Drop, Explode, ExplodeOnce, Keep, Maximum, Minimum, Reroll, RerollOnce, Sort,
};
use crate::roll::Modifier;
use logos::Logos;

#[derive(Logos, Debug, Copy, Clone, Eq, PartialEq)]
enum DiceToken {
    #[regex(r"[0-9]+")]
    Integer,
    #[token("d")]
    D,
    #[token("%")]
    Percent,

    #[token("kh")]
    KeepHighest,
    #[token("kl")]
    KeepLowest,
    #[token("dh")]
    DropHighest,
    #[token("dl")]
    DropLowest,
    #[token("k")]
    Keep,
    #[token("p")]
    Drop,
    #[token("r")]
    #[token("rr")]
    Reroll,
    #[token("ro")]
    RerollOnce,
    #[token("ra")]
    ExplodeOnce,
    #[token("!")]
    #[token("e")]
    Explode,
    #[token("mi")]
    Minimum,
    #[token("ma")]
    Maximum,
    #[token("s")]
    #[token("sa")]
    SortAscending,
    #[token("sd")]
    SortDescending,

    #[token("h")]
    Highest,
    #[token("l")]
    Lowest,

    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("=")]
    Eq,

    #[error]
    Error,
}

type DResult<T> = Result<T, ParseErrorKind>;

struct DiceParser<'a> {
    source: &'a str,
    tokens: Vec<(DiceToken, Span)>,
    pos: usize,
}

/// Parse one dice token as produced by the script lexer.
pub(crate) fn parse_dice(source: &str) -> DResult<DiceTerm> {
    let tokens = DiceToken::lexer(source).spanned().collect();
    DiceParser {
        source,
        tokens,
        pos: 0,
    }
    .parse()
}

impl<'a> DiceParser<'a> {
    fn peek(&self) -> Option<DiceToken> {
        self.tokens.get(self.pos).map(|(kind, _)| *kind)
    }

    fn advance(&mut self) -> Option<(DiceToken, &'a str)> {
        let (kind, span) = self.tokens.get(self.pos)?.clone();
        let source = self.source;
        self.pos += 1;
        Some((kind, &source[span]))
    }

    fn invalid<T>(&self, why: impl Into<String>) -> DResult<T> {
        Err(ParseErrorKind::InvalidDiceNotation(why.into()))
    }

    fn parse(mut self) -> DResult<DiceTerm> {
        let count = if self.peek() == Some(DiceToken::Integer) {
            self.integer()?
        } else {
            1
        };

        if self.advance().map(|(kind, _)| kind) != Some(DiceToken::D) {
            return self.invalid("expected 'd'");
        }

        let sides = match self.peek() {
            Some(DiceToken::Integer) => self.integer()?,
            Some(DiceToken::Percent) => {
                self.advance();
                100
            }
            _ => return self.invalid("expected a number of sides"),
        };

        let mut modifiers = Vec::new();
        while let Some((kind, slice)) = self.advance() {
            modifiers.push(self.modifier(kind, slice)?);
        }

        Ok(DiceTerm::new(count, sides, modifiers))
    }

    fn modifier(&mut self, kind: DiceToken, slice: &str) -> DResult<Modifier> {
        use DiceToken as T;

        Ok(match kind {
            T::KeepHighest => Keep(Selector::Highest(self.count_or_one()?)).into(),
            T::KeepLowest => Keep(Selector::Lowest(self.count_or_one()?)).into(),
            T::DropHighest => Drop(Selector::Highest(self.count_or_one()?)).into(),
            T::DropLowest => Drop(Selector::Lowest(self.count_or_one()?)).into(),
            T::Keep => Keep(self.selector(slice)?).into(),
            T::Drop => Drop(self.selector(slice)?).into(),
            T::Reroll => Reroll(self.condition()?).into(),
            T::RerollOnce => RerollOnce(self.condition()?).into(),
            T::Explode => Explode(self.condition()?).into(),
            T::ExplodeOnce => ExplodeOnce(self.condition()?).into(),
            T::Minimum => Minimum(self.required_integer(slice)?).into(),
            T::Maximum => Maximum(self.required_integer(slice)?).into(),
            T::SortAscending => Sort(SortOrder::Ascending).into(),
            T::SortDescending => Sort(SortOrder::Descending).into(),
            _ => return self.invalid(format!("unexpected {:?}", slice)),
        })
    }

    fn integer(&mut self) -> DResult<Int> {
        match self.advance() {
            Some((DiceToken::Integer, slice)) => {
                slice.parse().map_err(|_| ParseErrorKind::NumberOutOfRange)
            }
            _ => self.invalid("expected a number"),
        }
    }

    fn required_integer(&mut self, after: &str) -> DResult<Int> {
        if self.peek() == Some(DiceToken::Integer) {
            self.integer()
        } else {
            self.invalid(format!("{:?} needs a number", after))
        }
    }

    fn count_or_one(&mut self) -> DResult<usize> {
        if self.peek() == Some(DiceToken::Integer) {
            let n = self.integer()?;
            usize::try_from(n).map_err(|_| ParseErrorKind::NumberOutOfRange)
        } else {
            Ok(1)
        }
    }

    fn selector(&mut self, after: &str) -> DResult<Selector> {
        match self.peek() {
            Some(DiceToken::Highest) => {
                self.advance();
                Ok(Selector::Highest(self.count_or_one()?))
            }
            Some(DiceToken::Lowest) => {
                self.advance();
                Ok(Selector::Lowest(self.count_or_one()?))
            }
            _ => match self.condition()? {
                Some(cond) => Ok(Selector::Matching(cond)),
                None => self.invalid(format!("{:?} needs a selector", after)),
            },
        }
    }

    fn condition(&mut self) -> DResult<Option<Condition>> {
        let cmp = match self.peek() {
            Some(DiceToken::Lt) => Comparison::Lt,
            Some(DiceToken::Gt) => Comparison::Gt,
            Some(DiceToken::Le) => Comparison::Le,
            Some(DiceToken::Ge) => Comparison::Ge,
            Some(DiceToken::Eq) => Comparison::Eq,
            Some(DiceToken::Integer) => return Ok(Some(Condition::equal_to(self.integer()?))),
            _ => return Ok(None),
        };
        self.advance();
        Ok(Some(Condition::new(cmp, self.integer()?)))
    }
}
