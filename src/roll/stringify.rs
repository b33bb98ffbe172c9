use super::result::{Die, DieRoll, RollRecord, RollResult};
use crate::common::*;
use crate::parse::ast::*;
use crate::parse::visit::{Accept, Visitor};
use crate::sandbox::Value;

/// Formats roll breakdowns. Every method has a plain-text default;
/// implementors override the pieces they decorate.
pub trait Stringify {
    fn str_expression(&mut self, tree: String, value: &Value) -> String {
        let total = self.str_total(value);
        format!("{} = {}", tree, total)
    }

    fn str_comment(&mut self, breakdown: String, comment: &str) -> String {
        format!("{} # {}", breakdown, comment)
    }

    fn str_script(&mut self, mut lines: Vec<String>, value: &Value) -> String {
        let total = self.str_total(value);
        lines.push(format!("= {}", total));
        lines.join("\n")
    }

    fn str_roll_record(&mut self, record: &RollRecord) -> String {
        let dice = self.str_dice(&record.notation, &record.result);
        format!("{} = {}", dice, record.result.total)
    }

    fn str_total(&mut self, value: &Value) -> String {
        value.to_string()
    }

    fn str_dice(&mut self, notation: &str, result: &RollResult) -> String {
        let dice = result
            .dice
            .iter()
            .map(|die| self.str_die(die))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} ({})", notation, dice)
    }

    fn str_die(&mut self, die: &Die) -> String {
        die.rolls
            .iter()
            .map(|roll| self.str_die_roll(die, roll))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn str_die_roll(&mut self, _die: &Die, roll: &DieRoll) -> String {
        let mut ret = roll
            .values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ");
        if roll.exploded {
            ret.push('!');
        }
        ret
    }

    fn str_literal(&mut self, slice: &str) -> String {
        slice.to_string()
    }

    fn str_unary(&mut self, op: UnaryOperator, operand: String) -> String {
        format!("{}{}", op, operand)
    }

    fn str_binary(&mut self, lhs: String, op: BinaryOperator, rhs: String) -> String {
        format!("{} {} {}", lhs, op, rhs)
    }

    fn str_grouping(&mut self, inner: String) -> String {
        format!("({})", inner)
    }

    fn str_annotated(&mut self, inner: String, annotations: &[String]) -> String {
        let annotations = annotations
            .iter()
            .map(|s| format!("[{}]", s))
            .collect::<Vec<_>>()
            .join(" ");
        format!("{} {}", inner, annotations)
    }
}

#[derive(Debug, Default)]
pub struct SimpleStringifier;

impl SimpleStringifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stringify for SimpleStringifier {}

/// Discord-flavoured markdown: dropped dice and rerolled values are struck
/// through, ones and max faces are bold, the total is code.
#[derive(Debug, Default)]
pub struct MarkdownStringifier {
    in_dropped: bool,
}

impl MarkdownStringifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stringify for MarkdownStringifier {
    fn str_total(&mut self, value: &Value) -> String {
        format!("`{}`", value)
    }

    fn str_comment(&mut self, breakdown: String, comment: &str) -> String {
        format!("**{}**: {}", comment, breakdown)
    }

    fn str_roll_record(&mut self, record: &RollRecord) -> String {
        let dice = self.str_dice(&record.notation, &record.result);
        format!("{} = `{}`", dice, record.result.total)
    }

    fn str_die(&mut self, die: &Die) -> String {
        let kept = die.kept;
        self.in_dropped = !kept;
        let ret = die
            .rolls
            .iter()
            .map(|roll| self.str_die_roll(die, roll))
            .collect::<Vec<_>>()
            .join(", ");
        self.in_dropped = false;
        if kept {
            ret
        } else {
            format!("~~{}~~", ret)
        }
    }

    fn str_die_roll(&mut self, die: &Die, roll: &DieRoll) -> String {
        let init = &roll.values.as_slice()[..roll.values.len() - 1];
        let mut ret: String = init.iter().map(|x| format!("{} -> ", x)).collect();

        let mut last = roll.values.last().to_string();
        if roll.exploded {
            last.push('!');
        }
        let value = roll.value();
        if value == 1 || value == die.sides {
            ret = format!("{}**{}**", ret, last);
        } else {
            ret.push_str(&last);
        }

        if !roll.kept && !self.in_dropped {
            ret = format!("~~{}~~", ret);
        }
        ret
    }
}

/// Rebuilds a dice expression from its source, splicing in the breakdown
/// of every dice term.
struct Renderer<'a, S: ?Sized> {
    program: &'a Program,
    rolls: &'a [RollRecord],
    stringifier: &'a mut S,
}

impl<S: Stringify + ?Sized> Renderer<'_, S> {
    fn verbatim(&mut self, span: &Span) -> String {
        self.program.slice(span).to_string()
    }
}

impl<S: Stringify + ?Sized> Visitor for Renderer<'_, S> {
    type Output = String;

    fn visit_literal(&mut self, _: &Literal, span: &Span) -> String {
        let slice = self.program.slice(span);
        self.stringifier.str_literal(slice)
    }

    fn visit_dice(&mut self, _: &DiceTerm, span: &Span) -> String {
        match self.rolls.iter().find(|r| r.span == *span) {
            Some(record) => self.stringifier.str_dice(&record.notation, &record.result),
            None => self.verbatim(span),
        }
    }

    fn visit_unary(&mut self, op: UnaryOperator, operand: &Node, _: &Span) -> String {
        let operand = operand.accept(self);
        self.stringifier.str_unary(op, operand)
    }

    fn visit_binary(&mut self, lhs: &Node, op: BinaryOperator, rhs: &Node, _: &Span) -> String {
        let lhs = lhs.accept(self);
        let rhs = rhs.accept(self);
        self.stringifier.str_binary(lhs, op, rhs)
    }

    fn visit_grouping(&mut self, inner: &Node, _: &Span) -> String {
        let inner = inner.accept(self);
        self.stringifier.str_grouping(inner)
    }

    fn visit_annotated(&mut self, inner: &Node, annotations: &[String], _: &Span) -> String {
        let inner = inner.accept(self);
        self.stringifier.str_annotated(inner, annotations)
    }

    fn visit_identifier(&mut self, _: &str, span: &Span) -> String {
        self.verbatim(span)
    }

    fn visit_call(&mut self, _: &str, _: &[Node], span: &Span) -> String {
        self.verbatim(span)
    }

    fn visit_if(&mut self, _: &Node, _: &Block, _: Option<&Node>, span: &Span) -> String {
        self.verbatim(span)
    }

    fn visit_while(&mut self, _: &Node, _: &Block, span: &Span) -> String {
        self.verbatim(span)
    }

    fn visit_for(&mut self, _: &str, _: &Node, _: &Node, _: &Block, span: &Span) -> String {
        self.verbatim(span)
    }

    fn visit_assign(&mut self, _: &str, _: Option<BinaryOperator>, _: &Node, span: &Span) -> String {
        self.verbatim(span)
    }

    fn visit_block(&mut self, _: &Block, span: &Span) -> String {
        self.verbatim(span)
    }

    fn visit_break(&mut self, span: &Span) -> String {
        self.verbatim(span)
    }

    fn visit_continue(&mut self, span: &Span) -> String {
        self.verbatim(span)
    }

    fn visit_return(&mut self, _: Option<&Node>, span: &Span) -> String {
        self.verbatim(span)
    }
}

/// Render the breakdown of one evaluation. A lone dice expression renders
/// inline; anything else lists each roll on its own line, then the value.
pub fn render<S: Stringify + ?Sized>(
    program: &Program,
    rolls: &[RollRecord],
    value: &Value,
    stringifier: &mut S,
) -> String {
    match program.body.as_slice() {
        [node] if program.is_dice_expression() => {
            let tree = Renderer {
                program,
                rolls,
                stringifier: &mut *stringifier,
            }
            .visit(node);
            let breakdown = stringifier.str_expression(tree, value);
            match &program.comment {
                Some(comment) => stringifier.str_comment(breakdown, comment),
                None => breakdown,
            }
        }
        _ => {
            let lines = rolls
                .iter()
                .map(|record| stringifier.str_roll_record(record))
                .collect();
            stringifier.str_script(lines, value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AutomationContext;
    use crate::roll::ScriptedRoller;
    use crate::ExecutionLimits;
    use std::sync::Arc;

    macro_rules! check {
        ($cls:ident, $input:expr, $script:expr, $expected:expr) => {
            let program = Arc::new(crate::parse::parse($input).unwrap());
            let mut roller = ScriptedRoller::new($script.iter().copied());
            let eval = crate::sandbox::run(
                &program,
                &AutomationContext::standard(),
                &mut roller,
                &ExecutionLimits::default(),
            )
            .unwrap();
            assert_eq!(eval.render(&mut $cls::new()), $expected);
        };
    }

    #[test]
    fn test_simple_stringify() {
        check!(SimpleStringifier, "2 + 3", [0u32; 0], "2 + 3 = 5");
        check!(SimpleStringifier, "2d20", [10, 11], "2d20 (10, 11) = 21");
        check!(SimpleStringifier, "2d20kh1", [10, 11], "2d20kh1 (10, 11) = 11");
        check!(SimpleStringifier, "2d4r1 + 3", [1, 2, 4], "2d4r1 (1, 4, 2) + 3 = 9");
        check!(SimpleStringifier, "1d6! [fire]", [6, 2], "1d6! (6!, 2) [fire] = 8");
        check!(SimpleStringifier, "-(1d4 * 2.50)", [3], "-(1d4 (3) * 2.50) = -7.5");
        check!(SimpleStringifier, "2d6mi3", [1, 5], "2d6mi3 (1 -> 3, 5) = 8");
    }

    #[test]
    fn test_markdown_stringify() {
        check!(MarkdownStringifier, "2 + 3", [0u32; 0], "2 + 3 = `5`");
        check!(MarkdownStringifier, "2d20kh1", [10, 11], "2d20kh1 (~~10~~, 11) = `11`");
        check!(MarkdownStringifier, "2d4r1", [1, 2, 4], "2d4r1 (~~**1**~~, **4**, 2) = `6`");
        check!(MarkdownStringifier, "4d6kh3", [1, 6, 3, 5], "4d6kh3 (~~**1**~~, **6**, 3, 5) = `14`");
        check!(MarkdownStringifier, "1d12mi12", [10], "1d12mi12 (10 -> **12**) = `12`");
        check!(MarkdownStringifier, "1d6!", [6, 6, 1], "1d6! (**6!**, **6!**, **1**) = `13`");
    }

    #[test]
    fn test_roll_comment() {
        check!(SimpleStringifier, "1d20 + 5 to hit", [12], "1d20 (12) + 5 = 17 # to hit");
        check!(MarkdownStringifier, "2d6ra6 fire bolt", [6, 3, 6], "**fire bolt**: 2d6ra6 (**6!**, 3, **6**) = `15`");
    }

    #[test]
    fn test_script_stringify() {
        check!(
            MarkdownStringifier,
            "a = 1d20\nb = 1d4\na + b",
            [20, 2],
            "1d20 (**20**) = `20`\n1d4 (2) = `2`\n= `22`"
        );
        check!(SimpleStringifier, "x = 3\nx * 2", [0u32; 0], "= 6");
    }
}
