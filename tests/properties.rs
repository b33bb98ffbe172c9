use dicescript::{parse, AutomationContext, Engine, ExecutionLimits, ScriptedRoller, Value};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn modifier() -> impl Strategy<Value = String> {
    prop_oneof![
        (1..4u32).prop_map(|n| format!("kh{}", n)),
        (1..4u32).prop_map(|n| format!("kl{}", n)),
        (1..4u32).prop_map(|n| format!("dh{}", n)),
        (1..4u32).prop_map(|n| format!("dl{}", n)),
        Just("ro1".to_string()),
        Just("r<2".to_string()),
        Just("!".to_string()),
        Just("sa".to_string()),
        (1..3u32).prop_map(|n| format!("mi{}", n)),
    ]
}

fn dice() -> impl Strategy<Value = (u32, u32, Vec<String>)> {
    (1..20u32, 2..30u32, prop::collection::vec(modifier(), 0..3))
}

fn notation(count: u32, sides: u32, modifiers: &[String]) -> String {
    format!("{}d{}{}", count, sides, modifiers.concat())
}

proptest! {
    #[test]
    fn outcomes_in_range_and_total_is_kept_sum((count, sides, mods) in dice(), seed: u64) {
        let source = notation(count, sides, &mods);
        let engine = Engine::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let eval = engine.evaluate_with(&source, &mut rng, &ExecutionLimits::default()).unwrap();

        prop_assert_eq!(eval.rolls.len(), 1);
        let result = &eval.rolls[0].result;
        for outcome in result.outcomes() {
            prop_assert!((1..=sides as i64).contains(&outcome.value), "{}: {:?}", source, outcome);
        }
        prop_assert_eq!(result.total, result.kept().map(|o| o.value).sum::<i64>());
        prop_assert_eq!(eval.value, Value::from(result.total));
    }

    #[test]
    fn parsing_is_deterministic((count, sides, mods) in dice(), bonus in 0..100i64) {
        let source = format!("{} + {} [bonus]", notation(count, sides, &mods), bonus);
        prop_assert_eq!(parse(&source).unwrap(), parse(&source).unwrap());
    }

    #[test]
    fn fixed_rolls_reproduce((count, sides, mods) in dice(), script in prop::collection::vec(1..=2u32, 200)) {
        let source = notation(count, sides, &mods);
        let engine = Engine::default();
        let limits = ExecutionLimits::default();

        let mut first = ScriptedRoller::new(script.clone());
        let mut second = ScriptedRoller::new(script);
        let a = engine.evaluate_with(&source, &mut first, &limits);
        let b = engine.evaluate_with(&source, &mut second, &limits);
        match (a, b) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.rolls, b.rolls);
                prop_assert_eq!(a.value, b.value);
            }
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            (a, b) => prop_assert!(false, "diverged: {:?} vs {:?}", a.map(|e| e.value), b.map(|e| e.value)),
        }
        prop_assert_eq!(first.calls(), second.calls());
    }

    #[test]
    fn arithmetic_never_panics(a in any::<i64>(), b in any::<i64>(), op in prop::sample::select(vec!["+", "-", "*", "/", "//", "%"])) {
        let source = format!("({}) {} ({})", a, op, b);
        let mut rng = StdRng::seed_from_u64(0);
        let _ = Engine::new(AutomationContext::default()).evaluate_with(&source, &mut rng, &ExecutionLimits::default());
    }
}

#[test]
fn keep_highest_oracle() {
    let engine = Engine::default();
    let mut roller = ScriptedRoller::new([1, 6, 3, 5]);
    let eval = engine
        .evaluate_with("4d6kh2", &mut roller, &ExecutionLimits::default())
        .unwrap();
    let result = &eval.rolls[0].result;
    let kept: Vec<_> = result.kept().map(|o| o.value).collect();
    let dropped: Vec<_> = result.dropped().map(|o| o.value).collect();
    assert_eq!(kept, [6, 5]);
    assert_eq!(dropped, [1, 3]);
    assert_eq!(result.total, 11);
}

#[test]
fn reroll_oracle() {
    // left to right, one reroll per offending die per pass
    let engine = Engine::default();
    let mut roller = ScriptedRoller::new([1, 1, 3, 2]);
    let eval = engine
        .evaluate_with("2d4r1", &mut roller, &ExecutionLimits::default())
        .unwrap();
    let kept: Vec<_> = eval.rolls[0].result.kept().map(|o| o.value).collect();
    assert_eq!(kept, [3, 2]);
    assert_eq!(roller.calls(), 4);
}

#[test]
fn reroll_and_explode_follow_written_order() {
    let engine = Engine::default();
    let limits = ExecutionLimits::default();
    let script = [1, 6, 6, 3, 2];

    // Reroll first: the 1 becomes a 6 and explodes
    let mut roller = ScriptedRoller::new(script);
    let eval = engine.evaluate_with("2d6r1!", &mut roller, &limits).unwrap();
    let kept: Vec<_> = eval.rolls[0].result.kept().map(|o| o.value).collect();
    assert_eq!(kept, [6, 6, 3, 2]);
    assert_eq!(roller.calls(), 5);

    // Explode first: the 6 chains, then the 1 is rerolled
    let mut roller = ScriptedRoller::new(script);
    let eval = engine.evaluate_with("2d6!r1", &mut roller, &limits).unwrap();
    let kept: Vec<_> = eval.rolls[0].result.kept().map(|o| o.value).collect();
    assert_eq!(kept, [2, 6, 6, 3]);
    assert_eq!(roller.calls(), 5);
}

#[test]
fn oversized_dice_fail_before_rolling() {
    let engine = Engine::default();
    let mut roller = ScriptedRoller::new([]);
    let e = engine
        .evaluate_with("999999d6", &mut roller, &ExecutionLimits::default())
        .unwrap_err();
    assert_eq!(e.kind(), dicescript::ErrorKind::InvalidDice);
    assert_eq!(roller.calls(), 0);
}

#[test]
fn infinite_loops_terminate() {
    let engine = Engine::default();
    let mut roller = ScriptedRoller::new([]);
    let started = std::time::Instant::now();
    let e = engine
        .evaluate_with("n = 0\nwhile true { n += 1 }", &mut roller, &ExecutionLimits::default())
        .unwrap_err();
    assert_eq!(e.kind(), dicescript::ErrorKind::BudgetExceeded);
    assert!(started.elapsed() < std::time::Duration::from_secs(5));
}
