//! Deterministic copy clean-up applied to model narratives before storage.

use regex::Regex;
use std::sync::OnceLock;

/// Known brand misspellings seen in model output, as (pattern, replacement).
/// Patterns are case-insensitive and must not match their own replacement.
const BRAND_FIXES: &[(&str, &str)] = &[
    (r"(?i)\bgrant\s+brueg\b", "Grant Burge"),
    (r"(?i)\bgrant\s+burg\b", "Grant Burge"),
    (r"(?i)\bcoca\s+cola\b", "Coca-Cola"),
    (r"(?i)\bjacobs\s+creek\b", "Jacob's Creek"),
    (r"(?i)\bpenfold's\b", "Penfolds"),
    (r"(?i)\bmc\s?donalds\b", "McDonald's"),
    (r"(?i)\bcadburys\b", "Cadbury"),
    (r"(?i)\bwoolworth\b", "Woolworths"),
];

/// Upper bound on clean-up passes; real input settles in one or two.
const MAX_PASSES: usize = 6;

struct Rules {
    brands: Vec<(Regex, &'static str)>,
    inner_spaces: Regex,
    space_before_punct: Regex,
    repeated_bang: Regex,
    repeated_question: Regex,
    repeated_comma: Regex,
    trailing_spaces: Regex,
    blank_runs: Regex,
}

static RULES: OnceLock<Rules> = OnceLock::new();

fn rules() -> &'static Rules {
    RULES.get_or_init(|| {
        let compile = |pattern: &str| Regex::new(pattern).expect("static polish pattern");
        Rules {
            brands: BRAND_FIXES
                .iter()
                .map(|(pattern, replacement)| (compile(pattern), *replacement))
                .collect(),
            inner_spaces: compile(r"(\S)[ \t]{2,}"),
            space_before_punct: compile(r"(\S)[ \t]+([,;!?])"),
            repeated_bang: compile(r"!{2,}"),
            repeated_question: compile(r"\?{2,}"),
            repeated_comma: compile(r",{2,}"),
            trailing_spaces: compile(r"(?m)[ \t]+$"),
            blank_runs: compile(r"\n{3,}"),
        }
    })
}

/// Clean model copy: straight quotes, brand spellings, whitespace and
/// punctuation runs. Repeats until stable, so `polish_text` is idempotent.
pub fn polish_text(text: &str) -> String {
    let mut current = single_pass(text);
    for _ in 1..MAX_PASSES {
        let next = single_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn single_pass(text: &str) -> String {
    let rules = rules();

    let mut out: String = text
        .replace("\r\n", "\n")
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201B}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201F}' => '"',
            '\u{00A0}' | '\u{2007}' | '\u{202F}' => ' ',
            _ => c,
        })
        .collect();
    out = out.replace('\u{2026}', "...");

    for (pattern, replacement) in &rules.brands {
        out = pattern.replace_all(&out, *replacement).into_owned();
    }

    out = rules.inner_spaces.replace_all(&out, "$1 ").into_owned();
    out = rules.space_before_punct.replace_all(&out, "$1$2").into_owned();
    out = rules.repeated_bang.replace_all(&out, "!").into_owned();
    out = rules.repeated_question.replace_all(&out, "?").into_owned();
    out = rules.repeated_comma.replace_all(&out, ",").into_owned();
    out = rules.trailing_spaces.replace_all(&out, "").into_owned();
    out = rules.blank_runs.replace_all(&out, "\n\n").into_owned();

    out.trim().to_string()
}
