use crate::common::*;
use crate::parse::ast::*;

pub trait Visitor {
    type Output;

    fn visit(&mut self, node: &Node) -> Self::Output {
        node.accept(self)
    }

    fn visit_literal(&mut self, lit: &Literal, span: &Span) -> Self::Output;

    fn visit_dice(&mut self, term: &DiceTerm, span: &Span) -> Self::Output;

    fn visit_unary(&mut self, op: UnaryOperator, operand: &Node, span: &Span) -> Self::Output;

    fn visit_binary(&mut self, lhs: &Node, op: BinaryOperator, rhs: &Node, span: &Span)
        -> Self::Output;

    fn visit_grouping(&mut self, inner: &Node, span: &Span) -> Self::Output;

    fn visit_annotated(&mut self, inner: &Node, annotations: &[String], span: &Span)
        -> Self::Output;

    fn visit_identifier(&mut self, name: &str, span: &Span) -> Self::Output;

    fn visit_call(&mut self, name: &str, args: &[Node], span: &Span) -> Self::Output;

    fn visit_if(
        &mut self,
        condition: &Node,
        then: &Block,
        otherwise: Option<&Node>,
        span: &Span,
    ) -> Self::Output;

    fn visit_while(&mut self, condition: &Node, body: &Block, span: &Span) -> Self::Output;

    fn visit_for(
        &mut self,
        var: &str,
        start: &Node,
        end: &Node,
        body: &Block,
        span: &Span,
    ) -> Self::Output;

    fn visit_assign(
        &mut self,
        target: &str,
        op: Option<BinaryOperator>,
        value: &Node,
        span: &Span,
    ) -> Self::Output;

    fn visit_block(&mut self, block: &Block, span: &Span) -> Self::Output;

    fn visit_break(&mut self, span: &Span) -> Self::Output;

    fn visit_continue(&mut self, span: &Span) -> Self::Output;

    fn visit_return(&mut self, value: Option<&Node>, span: &Span) -> Self::Output;
}

pub trait Accept<V: Visitor + ?Sized> {
    fn accept(&self, v: &mut V) -> V::Output;
}

impl<V: Visitor + ?Sized> Accept<V> for Node {
    fn accept(&self, v: &mut V) -> V::Output {
        let span = &self.span;
        match &self.kind {
            NodeKind::Literal(x) => v.visit_literal(x, span),
            NodeKind::Dice(x) => v.visit_dice(x, span),
            NodeKind::Unary(op, x) => v.visit_unary(*op, x, span),
            NodeKind::Binary(l, op, r) => v.visit_binary(l, *op, r, span),
            NodeKind::Grouping(x) => v.visit_grouping(x, span),
            NodeKind::Annotated(x, a) => v.visit_annotated(x, a, span),
            NodeKind::Identifier(name) => v.visit_identifier(name, span),
            NodeKind::Call { name, args } => v.visit_call(name, args, span),
            NodeKind::If {
                condition,
                then,
                otherwise,
            } => v.visit_if(condition, then, otherwise.as_deref(), span),
            NodeKind::While { condition, body } => v.visit_while(condition, body, span),
            NodeKind::For {
                var,
                start,
                end,
                body,
            } => v.visit_for(var, start, end, body, span),
            NodeKind::Assign { target, op, value } => v.visit_assign(target, *op, value, span),
            NodeKind::Block(block) => v.visit_block(block, span),
            NodeKind::Break => v.visit_break(span),
            NodeKind::Continue => v.visit_continue(span),
            NodeKind::Return(value) => v.visit_return(value.as_deref(), span),
        }
    }
}

/// Accepts only the pure dice subset of the language: no names, calls,
/// assignments or control flow.
struct DiceOnly;

pub(crate) fn is_dice_expression(node: &Node) -> bool {
    DiceOnly.visit(node)
}

impl Visitor for DiceOnly {
    type Output = bool;

    fn visit_literal(&mut self, _: &Literal, _: &Span) -> bool {
        true
    }

    fn visit_dice(&mut self, _: &DiceTerm, _: &Span) -> bool {
        true
    }

    fn visit_unary(&mut self, op: UnaryOperator, operand: &Node, _: &Span) -> bool {
        op != UnaryOperator::Not && self.visit(operand)
    }

    fn visit_binary(&mut self, lhs: &Node, op: BinaryOperator, rhs: &Node, _: &Span) -> bool {
        !op.is_logical() && self.visit(lhs) && self.visit(rhs)
    }

    fn visit_grouping(&mut self, inner: &Node, _: &Span) -> bool {
        self.visit(inner)
    }

    fn visit_annotated(&mut self, inner: &Node, _: &[String], _: &Span) -> bool {
        self.visit(inner)
    }

    fn visit_identifier(&mut self, _: &str, _: &Span) -> bool {
        false
    }

    fn visit_call(&mut self, _: &str, _: &[Node], _: &Span) -> bool {
        false
    }

    fn visit_if(&mut self, _: &Node, _: &Block, _: Option<&Node>, _: &Span) -> bool {
        false
    }

    fn visit_while(&mut self, _: &Node, _: &Block, _: &Span) -> bool {
        false
    }

    fn visit_for(&mut self, _: &str, _: &Node, _: &Node, _: &Block, _: &Span) -> bool {
        false
    }

    fn visit_assign(&mut self, _: &str, _: Option<BinaryOperator>, _: &Node, _: &Span) -> bool {
        false
    }

    fn visit_block(&mut self, _: &Block, _: &Span) -> bool {
        false
    }

    fn visit_break(&mut self, _: &Span) -> bool {
        false
    }

    fn visit_continue(&mut self, _: &Span) -> bool {
        false
    }

    fn visit_return(&mut self, _: Option<&Node>, _: &Span) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use crate::parse::parse;

    fn dice_only(s: &str) -> bool {
        parse(s).unwrap().is_dice_expression()
    }

    #[test]
    fn test_dice_only() {
        assert!(dice_only("4d6kh3 + 2"));
        assert!(dice_only("(1d20 + 5) [to hit] >= 15"));
        assert!(dice_only("-1d4 * 2"));
        assert!(!dice_only("x + 1d4"));
        assert!(!dice_only("max(1d4, 2)"));
        assert!(!dice_only("1d4; 1d6"));
        assert!(!dice_only("1d4 and 1d6"));
        assert!(!dice_only(""));
    }
}
