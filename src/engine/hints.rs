use crate::engine::rng::NumberSource;

/// All hints that apply to `a x b`, most specific first. Tens and ones
/// have a single rule that always wins.
pub fn candidate_hints(a: u32, b: u32) -> Vec<String> {
    let product = a * b;

    if a == 10 {
        return vec![format!("Easy! Just add a zero to {b}: {b}0 = {product}")];
    }
    if b == 10 {
        return vec![format!("Easy! Just add a zero to {a}: {a}0 = {product}")];
    }
    if a == 1 {
        return vec![format!("Any number \u{00d7} 1 = that same number: {b} \u{00d7} 1 = {b}")];
    }
    if b == 1 {
        return vec![format!("Any number \u{00d7} 1 = that same number: {a} \u{00d7} 1 = {a}")];
    }

    let mut hints = Vec::new();

    if a > 1 {
        let steps: Vec<String> = (1..=b.min(8)).map(|i| (a * i).to_string()).collect();
        let more = if b > 8 { "..." } else { "" };
        hints.push(format!("Try skip counting by {a}: {}{more}", steps.join(", ")));
    }
    if b > 5 {
        let partial = a * (b - 1);
        hints.push(format!(
            "Break it down: {a} \u{00d7} {} + {a} = {partial} + {a} = {product}",
            b - 1
        ));
    }
    if b % 2 == 0 && b > 2 {
        let half = b / 2;
        hints.push(format!(
            "Double it: {a} \u{00d7} {half} \u{00d7} 2 = {} \u{00d7} 2 = {product}",
            a * half
        ));
    }
    if a != b {
        hints.push(format!("Remember: {a} \u{00d7} {b} = {b} \u{00d7} {a}"));
    }
    if a <= 4 && b <= 4 {
        hints.push(format!("Think of {a} groups of {b} things each"));
    }
    if a == b {
        hints.push(format!(
            "Make a {a} by {a} square! Count all the dots: {a} rows of {a} = {product}"
        ));
    }
    if a == 2 {
        hints.push(format!("{b} \u{00d7} 2 means double {b}: {b} + {b} = {product}"));
    }
    if b == 2 {
        hints.push(format!("{a} \u{00d7} 2 means double {a}: {a} + {a} = {product}"));
    }
    if a == 5 {
        hints.push(format!("5 \u{00d7} {b} = count by 5s: {b} times"));
    }
    if b == 5 {
        hints.push(format!("{a} \u{00d7} 5 = count by 5s: {a} times"));
    }

    hints
}

/// Pick one teaching hint for a missed `a x b`.
pub fn learning_hint(a: u32, b: u32, source: &mut impl NumberSource) -> Option<String> {
    let mut hints = candidate_hints(a, b);
    if hints.is_empty() {
        return None;
    }
    let pick = source.index_below(hints.len());
    Some(hints.swap_remove(pick))
}

const CHEERS: [&str; 11] = [
    "\u{1f31f}", "\u{2728}", "\u{1f389}", "\u{1f44f}", "\u{1f4aa}", "\u{1f525}",
    "Great!", "Awesome!", "Perfect!", "Excellent!", "Well done!",
];

const PERSONAL_CHEERS: [&str; 9] = [
    "Great job", "Excellent", "Perfect", "Way to go", "Outstanding", "Amazing",
    "Fantastic", "Brilliant", "Superb",
];

/// Praise for a correct answer, sometimes addressed to the player.
pub fn encouragement(user_name: Option<&str>, source: &mut impl NumberSource) -> String {
    let personal = match user_name {
        Some(name) if !name.is_empty() => PERSONAL_CHEERS.len(),
        _ => 0,
    };
    let pick = source.index_below(personal + CHEERS.len());
    match user_name {
        Some(name) if pick < personal => format!("{}, {name}!", PERSONAL_CHEERS[pick]),
        _ => CHEERS[pick - personal].to_string(),
    }
}
