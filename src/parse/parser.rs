use super::{ast::*, dice::parse_dice, error::*, lexer::*, visit::is_dice_expression};
use crate::common::*;

type PResult<T = Node> = Result<T, ParseError>;

/// Deepest expression nesting the parser accepts.
pub const MAX_NESTING: usize = 64;

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    last_end: usize,
    // Open parentheses since the innermost block; newlines inside are ignored
    parens: usize,
    depth: usize,
    loops: usize,
    comment: Option<String>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: tokenize(source),
            pos: 0,
            last_end: 0,
            parens: 0,
            depth: 0,
            loops: 0,
            comment: None,
        }
    }

    pub fn parse(mut self) -> PResult<Program> {
        let body = self.parse_statements(None)?;
        Ok(Program::new(self.source, body).with_comment(self.comment))
    }

    fn skip_ignored(&mut self) {
        if self.parens > 0 {
            self.skip_newlines();
        }
    }

    fn skip_newlines(&mut self) {
        while self.tokens.get(self.pos).map(|t| t.kind) == Some(TokenKind::Newline) {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<TokenKind> {
        self.skip_ignored();
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn peek_second(&mut self) -> Option<TokenKind> {
        self.skip_ignored();
        self.tokens.get(self.pos + 1).map(|t| t.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        self.skip_ignored();
        let token = self.tokens.get(self.pos)?.clone();
        self.pos += 1;
        self.last_end = token.span.end;
        Some(token)
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn matches_any(&mut self, options: &[TokenKind]) -> bool {
        self.peek().map_or(false, |peeked| options.contains(&peeked))
    }

    fn consume(&mut self, expected: TokenKind) -> PResult<Token> {
        if self.matches(expected) {
            self.advance().ok_or_else(|| self.end_error(vec![expected]))
        } else {
            self.unexpected_token(vec![expected])
        }
    }

    fn slice(&self, span: &Span) -> &'a str {
        let source = self.source;
        source.get(span.clone()).unwrap_or_default()
    }

    fn error_at(&self, kind: ParseErrorKind, span: Span) -> ParseError {
        ParseError {
            slice: self.slice(&span).to_string(),
            kind,
            span,
        }
    }

    fn end_error(&self, expected: Vec<TokenKind>) -> ParseError {
        let end = self.source.len();
        self.error_at(ParseErrorKind::UnexpectedEnd { expected }, end..end)
    }

    fn unexpected_token<T>(&mut self, expected: Vec<TokenKind>) -> PResult<T> {
        let token = match self.peek() {
            Some(_) => self.tokens[self.pos].clone(),
            None => return Err(self.end_error(expected)),
        };
        let kind = match token.kind {
            TokenKind::Error => ParseErrorKind::InvalidToken,
            TokenKind::ErrEmptyAnnotation => ParseErrorKind::EmptyAnnotation,
            found => ParseErrorKind::UnexpectedToken { found, expected },
        };
        Err(self.error_at(kind, token.span))
    }

    fn deepen(&mut self) -> PResult<()> {
        if self.depth >= MAX_NESTING {
            let span = self
                .tokens
                .get(self.pos)
                .map_or(self.last_end..self.last_end, |t| t.span.clone());
            return Err(self.error_at(ParseErrorKind::NestingTooDeep { limit: MAX_NESTING }, span));
        }
        self.depth += 1;
        Ok(())
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        self.deepen()?;
        let ret = f(self);
        self.depth -= 1;
        ret
    }

    fn parse_statements(&mut self, terminator: Option<TokenKind>) -> PResult<Vec<Node>> {
        let mut body = Vec::new();
        loop {
            while self.matches_any(&[TokenKind::Newline, TokenKind::Semicolon]) {
                self.advance();
            }
            match self.peek() {
                None if terminator.is_none() => break,
                None => return Err(self.end_error(terminator.into_iter().collect())),
                kind if kind == terminator => break,
                _ => {}
            }

            body.push(self.parse_statement()?);

            match self.peek() {
                None | Some(TokenKind::Newline | TokenKind::Semicolon) => {}
                kind if kind == terminator => {}
                _ if terminator.is_none() && self.trailing_comment(&body) => break,
                _ => {
                    let mut expected = vec![TokenKind::Newline, TokenKind::Semicolon];
                    expected.extend(terminator);
                    return self.unexpected_token(expected);
                }
            }
        }
        Ok(body)
    }

    /// A lone dice expression may be followed by free text on the same
    /// line, e.g. `1d20 + 5 to hit`. Takes the rest of the source as the
    /// roll's comment.
    fn trailing_comment(&mut self, body: &[Node]) -> bool {
        let token = match self.tokens.get(self.pos) {
            Some(token) => token,
            None => return false,
        };
        let rolls_dice = self.tokens[..self.pos].iter().any(|t| t.kind == TokenKind::Dice);
        if !rolls_dice
            || matches!(token.kind, TokenKind::Error | TokenKind::ErrEmptyAnnotation)
            || !matches!(body, [node] if is_dice_expression(node))
        {
            return false;
        }

        let source = self.source;
        let comment = source[token.span.start..].trim();
        self.comment = Some(comment.to_string());
        self.pos = self.tokens.len();
        self.last_end = source.len();
        true
    }

    fn parse_statement(&mut self) -> PResult {
        match self.peek() {
            Some(TokenKind::While) => self.parse_while(),
            Some(TokenKind::For) => self.parse_for(),
            Some(kind @ (TokenKind::Break | TokenKind::Continue)) => self.parse_loop_control(kind),
            Some(TokenKind::Return) => self.parse_return(),
            Some(TokenKind::Identifier)
                if self
                    .peek_second()
                    .map_or(false, |k| TokenKind::ASSIGNMENT_OPS.contains(&k)) =>
            {
                self.parse_assignment()
            }
            _ => self.parse_expression(),
        }
    }

    fn parse_while(&mut self) -> PResult {
        let start = self.consume(TokenKind::While)?.span.start;
        let condition = self.parse_expression()?;
        let body = self.parse_loop_body()?;
        Ok(Node::new(
            NodeKind::While {
                condition: Box::new(condition),
                body,
            },
            start..self.last_end,
        ))
    }

    fn parse_for(&mut self) -> PResult {
        let start = self.consume(TokenKind::For)?.span.start;
        let var = self.consume(TokenKind::Identifier)?;
        let var = self.slice(&var.span).to_string();
        self.consume(TokenKind::In)?;
        let from = self.parse_expression()?;
        self.consume(TokenKind::DotDot)?;
        let to = self.parse_expression()?;
        let body = self.parse_loop_body()?;
        Ok(Node::new(
            NodeKind::For {
                var,
                start: Box::new(from),
                end: Box::new(to),
                body,
            },
            start..self.last_end,
        ))
    }

    fn parse_loop_body(&mut self) -> PResult<Block> {
        self.loops += 1;
        let body = self.parse_block();
        self.loops -= 1;
        Ok(body?.0)
    }

    fn parse_loop_control(&mut self, kind: TokenKind) -> PResult {
        let token = self.consume(kind)?;
        if self.loops == 0 {
            return Err(self.error_at(ParseErrorKind::LoopControlOutsideLoop(kind), token.span));
        }
        let node = if kind == TokenKind::Break {
            NodeKind::Break
        } else {
            NodeKind::Continue
        };
        Ok(Node::new(node, token.span))
    }

    fn parse_return(&mut self) -> PResult {
        let token = self.consume(TokenKind::Return)?;
        let value = match self.peek() {
            None
            | Some(TokenKind::Newline | TokenKind::Semicolon | TokenKind::RightBrace) => None,
            Some(_) => Some(Box::new(self.parse_expression()?)),
        };
        Ok(Node::new(
            NodeKind::Return(value),
            token.span.start..self.last_end,
        ))
    }

    fn parse_assignment(&mut self) -> PResult {
        let name = self.consume(TokenKind::Identifier)?;
        let op = self.advance().ok_or_else(|| self.end_error(TokenKind::ASSIGNMENT_OPS.to_vec()))?;
        let op = match op.kind {
            TokenKind::Assign => None,
            kind => kind.as_binary_op(),
        };
        self.skip_newlines();
        let value = self.parse_expression()?;
        Ok(Node::new(
            NodeKind::Assign {
                target: self.slice(&name.span).to_string(),
                op,
                value: Box::new(value),
            },
            name.span.start..self.last_end,
        ))
    }

    fn parse_expression(&mut self) -> PResult {
        self.nested(Self::parse_or)
    }

    fn parse_binary(&mut self, ops: &[TokenKind], operand: impl FnMut(&mut Self) -> PResult) -> PResult {
        let depth = self.depth;
        let ret = self.fold_binary(ops, operand);
        self.depth = depth;
        ret
    }

    // Every folded operator adds a level to the left spine of the tree
    fn fold_binary(
        &mut self,
        ops: &[TokenKind],
        mut operand: impl FnMut(&mut Self) -> PResult,
    ) -> PResult {
        let mut lhs = operand(self)?;

        while self.matches_any(ops) {
            self.deepen()?;
            let op = self.advance().and_then(|t| t.kind.as_binary_op());
            self.skip_newlines();
            let rhs = operand(self)?;
            if let Some(op) = op {
                lhs = Node::new_binary(lhs, op, rhs);
            }
        }

        Ok(lhs)
    }

    fn parse_or(&mut self) -> PResult {
        self.parse_binary(&[TokenKind::Or], Self::parse_and)
    }

    fn parse_and(&mut self) -> PResult {
        self.parse_binary(&[TokenKind::And], Self::parse_not)
    }

    fn parse_not(&mut self) -> PResult {
        if self.matches(TokenKind::Not) {
            let start = self.consume(TokenKind::Not)?.span.start;
            let operand = self.nested(Self::parse_not)?;
            Ok(Node::new_unary(UnaryOperator::Not, operand, start..self.last_end))
        } else {
            self.parse_comparison()
        }
    }

    fn parse_comparison(&mut self) -> PResult {
        self.parse_binary(TokenKind::COMPARISON_OPS, Self::parse_additive)
    }

    fn parse_additive(&mut self) -> PResult {
        self.parse_binary(TokenKind::ADDITION_OPS, Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> PResult {
        self.parse_binary(TokenKind::MULTIPLICATION_OPS, Self::parse_unary)
    }

    fn parse_unary(&mut self) -> PResult {
        if self.matches_any(TokenKind::UNARY_OPS) {
            let token = self.advance().ok_or_else(|| self.end_error(TokenKind::ATOMS.to_vec()))?;
            let operand = self.nested(Self::parse_unary)?;
            let op = token.kind.as_unary_op().unwrap_or(UnaryOperator::Pos);
            Ok(Node::new_unary(op, operand, token.span.start..self.last_end))
        } else {
            self.parse_postfix()
        }
    }

    fn parse_postfix(&mut self) -> PResult {
        let atom = self.parse_atom()?;

        let mut annotations = Vec::new();
        while self.matches(TokenKind::Annotation) {
            let token = self.consume(TokenKind::Annotation)?;
            let slice = self.slice(&token.span);
            annotations.push(slice[1..slice.len() - 1].trim().to_string());
        }

        Ok(if annotations.is_empty() {
            atom
        } else {
            let span = atom.span.start..self.last_end;
            Node::new_annotated(atom, annotations, span)
        })
    }

    fn parse_atom(&mut self) -> PResult {
        match self.peek() {
            Some(TokenKind::Integer) => self.parse_integer(),
            Some(TokenKind::Decimal) => self.parse_decimal(),
            Some(TokenKind::String) => self.parse_string(),
            Some(TokenKind::True | TokenKind::False) => self.parse_boolean(),
            Some(TokenKind::Dice) => self.parse_dice(),
            Some(TokenKind::Identifier) => self.parse_identifier_or_call(),
            Some(TokenKind::LeftParen) => self.parse_grouping(),
            Some(TokenKind::LeftBrace) => {
                let (block, span) = self.parse_block()?;
                Ok(Node::new(NodeKind::Block(block), span))
            }
            Some(TokenKind::If) => self.parse_if(),
            _ => self.unexpected_token(TokenKind::ATOMS.to_vec()),
        }
    }

    fn parse_integer(&mut self) -> PResult {
        let token = self.consume(TokenKind::Integer)?;
        let x: Int = self
            .slice(&token.span)
            .parse()
            .map_err(|_| self.error_at(ParseErrorKind::NumberOutOfRange, token.span.clone()))?;
        Ok(Node::new_literal(x, token.span))
    }

    fn parse_decimal(&mut self) -> PResult {
        let token = self.consume(TokenKind::Decimal)?;
        let x: Float = self
            .slice(&token.span)
            .parse()
            .map_err(|_| self.error_at(ParseErrorKind::NumberOutOfRange, token.span.clone()))?;
        Ok(Node::new_literal(x, token.span))
    }

    fn parse_string(&mut self) -> PResult {
        let token = self.consume(TokenKind::String)?;
        let slice = self.slice(&token.span);
        let value = unescape(&slice[1..slice.len() - 1]);
        Ok(Node::new_literal(Literal::String(value), token.span))
    }

    fn parse_boolean(&mut self) -> PResult {
        let token = self
            .advance()
            .ok_or_else(|| self.end_error(vec![TokenKind::True, TokenKind::False]))?;
        Ok(Node::new_literal(token.kind == TokenKind::True, token.span))
    }

    fn parse_dice(&mut self) -> PResult {
        let token = self.consume(TokenKind::Dice)?;
        let term = parse_dice(self.slice(&token.span))
            .map_err(|kind| self.error_at(kind, token.span.clone()))?;
        Ok(Node::new(NodeKind::Dice(term), token.span))
    }

    fn parse_identifier_or_call(&mut self) -> PResult {
        let token = self.consume(TokenKind::Identifier)?;
        let name = self.slice(&token.span).to_string();
        if !self.matches(TokenKind::LeftParen) {
            return Ok(Node::new(NodeKind::Identifier(name), token.span));
        }

        self.consume(TokenKind::LeftParen)?;
        self.parens += 1;
        let mut args = Vec::new();
        while !self.matches(TokenKind::RightParen) {
            args.push(self.parse_expression()?);
            if !self.matches(TokenKind::Comma) {
                break;
            }
            self.consume(TokenKind::Comma)?;
        }
        self.consume(TokenKind::RightParen)?;
        self.parens -= 1;

        Ok(Node::new(
            NodeKind::Call { name, args },
            token.span.start..self.last_end,
        ))
    }

    fn parse_grouping(&mut self) -> PResult {
        let start = self.consume(TokenKind::LeftParen)?.span.start;
        self.parens += 1;
        let inner = self.parse_expression()?;
        self.consume(TokenKind::RightParen)?;
        self.parens -= 1;
        Ok(Node::new_grouping(inner, start..self.last_end))
    }

    fn parse_block(&mut self) -> PResult<(Block, Span)> {
        let start = self.consume(TokenKind::LeftBrace)?.span.start;
        let parens = std::mem::replace(&mut self.parens, 0);
        let body = self.nested(|p| p.parse_statements(Some(TokenKind::RightBrace)))?;
        self.consume(TokenKind::RightBrace)?;
        self.parens = parens;
        Ok((Block { body }, start..self.last_end))
    }

    fn parse_if(&mut self) -> PResult {
        let start = self.consume(TokenKind::If)?.span.start;
        let condition = self.parse_expression()?;
        let (then, _) = self.parse_block()?;

        // `else` may start on a later line
        let mut lookahead = self.pos;
        while self.tokens.get(lookahead).map(|t| t.kind) == Some(TokenKind::Newline) {
            lookahead += 1;
        }
        let otherwise = if self.tokens.get(lookahead).map(|t| t.kind) == Some(TokenKind::Else) {
            self.pos = lookahead;
            self.consume(TokenKind::Else)?;
            if self.matches(TokenKind::If) {
                Some(Box::new(self.nested(Self::parse_if)?))
            } else {
                let (block, span) = self.parse_block()?;
                Some(Box::new(Node::new(NodeKind::Block(block), span)))
            }
        } else {
            None
        };

        Ok(Node::new(
            NodeKind::If {
                condition: Box::new(condition),
                then,
                otherwise,
            },
            start..self.last_end,
        ))
    }
}

fn unescape(s: &str) -> String {
    let mut ret = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            ret.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => ret.push('\n'),
            Some('t') => ret.push('\t'),
            Some(c @ ('\\' | '"' | '\'')) => ret.push(c),
            Some(c) => {
                ret.push('\\');
                ret.push(c);
            }
            None => ret.push('\\'),
        }
    }
    ret
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roll::ops::Keep;

    fn parse(s: &str) -> PResult<Program> {
        Parser::new(s).parse()
    }

    fn check(s: &str, expected: Node) {
        let parsed = parse(s).unwrap();
        assert_eq!(parsed.body, vec![expected]);
    }

    fn check_err(s: &str, expected: ParseErrorKind) {
        assert_eq!(parse(s).unwrap_err().kind, expected);
    }

    fn lit(x: impl Into<Literal>, span: Span) -> Node {
        Node::new_literal(x, span)
    }

    fn dice(count: Int, sides: Int, span: Span) -> Node {
        Node::new(NodeKind::Dice(DiceTerm::new(count, sides, vec![])), span)
    }

    #[test]
    fn test_parse_nums() {
        check("32", lit(32, 0..2));
        check("3.2", lit(3.2, 0..3));
        check("'hi\\n'", lit("hi\n", 0..6));
        check("true", lit(true, 0..4));
    }

    #[test]
    fn test_parse_dice() {
        check("1d20", dice(1, 20, 0..4));
        check(
            "2d20kh1",
            Node::new(
                NodeKind::Dice(DiceTerm::new(2, 20, vec![Keep(Selector::Highest(1)).into()])),
                0..7,
            ),
        );
    }

    #[test]
    fn test_parse_unary() {
        check(
            "-1d20",
            Node::new_unary(UnaryOperator::Neg, dice(1, 20, 1..5), 0..5),
        );
        check(
            "not true",
            Node::new_unary(UnaryOperator::Not, lit(true, 4..8), 0..8),
        );
    }

    #[test]
    fn test_parse_binary_precedence() {
        check(
            "1 + 2 * 3",
            Node::new_binary(
                lit(1, 0..1),
                BinaryOperator::Add,
                Node::new_binary(lit(2, 4..5), BinaryOperator::Mul, lit(3, 8..9)),
            ),
        );
        check(
            "1 - 2 - 3",
            Node::new_binary(
                Node::new_binary(lit(1, 0..1), BinaryOperator::Sub, lit(2, 4..5)),
                BinaryOperator::Sub,
                lit(3, 8..9),
            ),
        );
        check(
            "1d20 + 5 >= 15",
            Node::new_binary(
                Node::new_binary(dice(1, 20, 0..4), BinaryOperator::Add, lit(5, 7..8)),
                BinaryOperator::Ge,
                lit(15, 12..14),
            ),
        );
    }

    #[test]
    fn test_parse_logical_precedence() {
        let parsed = parse("a or b and not c").unwrap();
        match &parsed.body[0].kind {
            NodeKind::Binary(_, BinaryOperator::Or, rhs) => {
                assert!(matches!(rhs.kind, NodeKind::Binary(_, BinaryOperator::And, _)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_grouping_and_annotations() {
        check(
            "(1d20) [fire]",
            Node::new_annotated(
                Node::new_grouping(dice(1, 20, 1..5), 0..6),
                vec!["fire".to_string()],
                0..13,
            ),
        );
    }

    #[test]
    fn test_newlines_inside_parens_and_after_operators() {
        let parsed = parse("x = (1 +\n 2\n)\ny = 3 *\n 4").unwrap();
        assert_eq!(parsed.body.len(), 2);
        assert!(parse("(1\n+ 2)").is_ok());
        assert!(parse("1\n+ 2").unwrap().body.len() == 2);
    }

    #[test]
    fn test_parse_statements() {
        let parsed = parse("hp = 10; hp -= 2d6\nhp").unwrap();
        assert_eq!(parsed.body.len(), 3);
        assert!(matches!(
            &parsed.body[1].kind,
            NodeKind::Assign { target, op: Some(BinaryOperator::Sub), .. } if target == "hp"
        ));
        assert!(matches!(&parsed.body[2].kind, NodeKind::Identifier(name) if name == "hp"));
    }

    #[test]
    fn test_parse_control_flow() {
        let parsed = parse(
            "total = 0
            for i in 0..3 {
                if i == 1 { continue }
                total += 1d6
            }
            while total < 10 { total += 1; if total > 8 { break } }
            if total > 5 {
                'big'
            }
            else if total > 2 { 'medium' } else { 'small' }",
        )
        .unwrap();
        assert_eq!(parsed.body.len(), 4);
        assert!(matches!(parsed.body[1].kind, NodeKind::For { .. }));
        assert!(matches!(parsed.body[2].kind, NodeKind::While { .. }));
        match &parsed.body[3].kind {
            NodeKind::If {
                otherwise: Some(otherwise),
                ..
            } => assert!(matches!(otherwise.kind, NodeKind::If { .. })),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_calls() {
        let parsed = parse("max(1d4, 2,\n 3)").unwrap();
        match &parsed.body[0].kind {
            NodeKind::Call { name, args } => {
                assert_eq!(name, "max");
                assert_eq!(args.len(), 3);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(parse("roll()").is_ok());
    }

    #[test]
    fn test_parse_determinism() {
        let source = "x = 4d6kh3 + 2 [str]\nif x > 10 { x } else { 0 }";
        assert_eq!(parse(source), parse(source));
    }

    #[test]
    fn test_parse_errors() {
        check_err(
            "1 +",
            ParseErrorKind::UnexpectedEnd {
                expected: TokenKind::ATOMS.to_vec(),
            },
        );
        check_err(
            "(1",
            ParseErrorKind::UnexpectedEnd {
                expected: vec![TokenKind::RightParen],
            },
        );
        check_err("1 @ 2", ParseErrorKind::InvalidToken);
        check_err("1d20 []", ParseErrorKind::EmptyAnnotation);
        check_err("break", ParseErrorKind::LoopControlOutsideLoop(TokenKind::Break));
        check_err("if true { continue }", ParseErrorKind::LoopControlOutsideLoop(TokenKind::Continue));
        check_err("99999999999999999999", ParseErrorKind::NumberOutOfRange);
        assert!(matches!(
            parse("4d6k").unwrap_err().kind,
            ParseErrorKind::InvalidDiceNotation(_)
        ));
        assert!(matches!(
            parse("1 2").unwrap_err().kind,
            ParseErrorKind::UnexpectedToken {
                found: TokenKind::Integer,
                ..
            }
        ));
    }

    #[test]
    fn test_roll_comments() {
        let program = parse("1d20 + 5 to hit the goblin").unwrap();
        assert_eq!(program.comment.as_deref(), Some("to hit the goblin"));
        assert_eq!(
            program.body,
            vec![Node::new_binary(dice(1, 20, 0..4), BinaryOperator::Add, lit(5, 7..8))]
        );

        let program = parse("4d6kh3 (strength) for the fighter\nand more").unwrap();
        assert_eq!(program.comment.as_deref(), Some("(strength) for the fighter\nand more"));
        assert_eq!(parse("1d20 [fire]").unwrap().comment, None);

        // Only after a dice expression
        assert!(parse("x = 1d20 hello").is_err());
        assert!(parse("x + 1d20 hello").is_err());
        check_err("1d20 []", ParseErrorKind::EmptyAnnotation);
        check_err("1d20 @ x", ParseErrorKind::InvalidToken);
    }

    #[test]
    fn test_error_positions() {
        let err = parse("1 + * 2").unwrap_err();
        assert_eq!(err.span, 4..5);
        assert_eq!(err.slice, "*");
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        check_err(&deep, ParseErrorKind::NestingTooDeep { limit: MAX_NESTING });
        let unary = format!("{}1", "-".repeat(300));
        check_err(&unary, ParseErrorKind::NestingTooDeep { limit: MAX_NESTING });
        let fine = format!("{}1{}", "(".repeat(50), ")".repeat(50));
        assert!(parse(&fine).is_ok());
    }

    #[test]
    fn test_long_operator_chains_count_as_nesting() {
        let chain = format!("1{}", "+1".repeat(9_000));
        check_err(&chain, ParseErrorKind::NestingTooDeep { limit: MAX_NESTING });
        let mixed = format!("1{}", " * 2 - 1".repeat(100));
        check_err(&mixed, ParseErrorKind::NestingTooDeep { limit: MAX_NESTING });
        let logical = format!("true{}", " or false".repeat(100));
        check_err(&logical, ParseErrorKind::NestingTooDeep { limit: MAX_NESTING });

        assert!(parse(&format!("1{}", "+1".repeat(40))).is_ok());
        // Siblings do not add up: each statement starts from the top
        let lines = format!("1{}\n", "+1".repeat(40)).repeat(20);
        assert!(parse(&lines).is_ok());
    }
}
