//! Spintax rendering — `{option a|option b}` templates with a random pick
//! per occurrence.
//!
//! The follow-up templates embed interchangeable phrasings so repeated
//! reminders do not read as copy-paste. The choice is cosmetic; callers
//! inject the `Rng` so tests can fix the seed.

use std::sync::OnceLock;

use rand::Rng;
use regex::{Captures, Regex};

/// Matches one non-nested `{...}` group.
fn pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^{}]+)\}").unwrap())
}

/// Expand every `{a|b|c}` group in `template`, choosing one alternative
/// uniformly at random, independently per occurrence. Text outside groups
/// passes through unchanged; a group with a single alternative is just
/// unwrapped.
pub fn render<R: Rng + ?Sized>(template: &str, rng: &mut R) -> String {
    pattern()
        .replace_all(template, |caps: &Captures<'_>| {
            let choices: Vec<&str> = caps[1].split('|').collect();
            choices[rng.gen_range(0..choices.len())].to_string()
        })
        .into_owned()
}
