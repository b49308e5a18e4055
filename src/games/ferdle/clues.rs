//! Per-letter feedback for a guess, and the keyboard summary built from it.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Feedback for one guessed letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clue {
    /// Right letter, right position.
    Correct,
    /// Letter occurs elsewhere in the answer.
    Present,
    /// Letter does not occur (or all its occurrences are already claimed).
    Absent,
}

impl Clue {
    const fn priority(self) -> u8 {
        match self {
            Self::Correct => 2,
            Self::Present => 1,
            Self::Absent => 0,
        }
    }
}

/// Scores `guess` against `target`.
///
/// Exact matches are claimed first, then remaining guess letters are marked
/// present while unclaimed copies of that letter are left in the target.
/// Both words must have the same number of characters; extra characters in
/// either are ignored.
#[must_use]
pub fn generate_clues(guess: &[char], target: &[char]) -> Vec<Clue> {
    let mut clues = vec![Clue::Absent; guess.len()];
    let mut available: HashMap<char, usize> = HashMap::new();
    for &c in target {
        *available.entry(c).or_insert(0) += 1;
    }

    for ((clue, g), t) in clues.iter_mut().zip(guess).zip(target) {
        if g == t {
            *clue = Clue::Correct;
            if let Some(n) = available.get_mut(g) {
                *n = n.saturating_sub(1);
            }
        }
    }

    for (clue, g) in clues.iter_mut().zip(guess) {
        if *clue == Clue::Correct {
            continue;
        }
        if let Some(n) = available.get_mut(g).filter(|n| **n > 0) {
            *clue = Clue::Present;
            *n -= 1;
        }
    }

    clues
}

/// Folds one scored guess into the keyboard map.
///
/// A letter keeps its best clue ever seen: `correct` beats `present` beats
/// `absent`, and nothing is downgraded.
pub fn update_letter_states(
    states: &mut BTreeMap<String, Clue>,
    guess: &[char],
    clues: &[Clue],
) {
    for (letter, &clue) in guess.iter().zip(clues) {
        states
            .entry(letter.to_string())
            .and_modify(|current| {
                if clue.priority() > current.priority() {
                    *current = clue;
                }
            })
            .or_insert(clue);
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::Clue::{Absent, Correct, Present};
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn score(guess: &str, target: &str) -> Vec<Clue> {
        generate_clues(&chars(guess), &chars(target))
    }

    #[test]
    fn exact_match_claims_letter_before_present() {
        // The O in position 3 is an exact match and is claimed first; the
        // remaining O in ROBOT still makes the earlier O present.
        assert_eq!(
            score("floor", "robot"),
            vec![Absent, Absent, Present, Correct, Present]
        );
    }

    #[test]
    fn repeated_guess_letters_limited_by_target_count() {
        assert_eq!(
            score("erase", "speed"),
            vec![Present, Absent, Absent, Present, Present]
        );
        assert_eq!(
            score("bbaaa", "abbey"),
            vec![Present, Correct, Present, Absent, Absent]
        );
    }

    #[test]
    fn exact_matches_exhaust_repeated_letter() {
        assert_eq!(
            score("eeeee", "speed"),
            vec![Absent, Absent, Correct, Correct, Absent]
        );
    }

    #[test]
    fn winning_guess_is_all_correct() {
        assert_eq!(score("crane", "crane"), vec![Correct; 5]);
    }

    #[test]
    fn cyrillic_is_scored_per_character() {
        assert_eq!(
            score("рука", "кура"),
            vec![Present, Correct, Present, Correct]
        );
    }

    #[test]
    fn clue_counts_never_exceed_target_counts() {
        let pairs = [
            ("floor", "robot"),
            ("erase", "speed"),
            ("bbaaa", "abbey"),
            ("eeeee", "speed"),
            ("llama", "hello"),
            ("otter", "totem"),
            ("sassy", "essay"),
        ];
        for (guess, target) in pairs {
            let g = chars(guess);
            let t = chars(target);
            let clues = generate_clues(&g, &t);
            for letter in &g {
                let marked = g
                    .iter()
                    .zip(&clues)
                    .filter(|(c, clue)| *c == letter && **clue != Absent)
                    .count();
                let in_target = t.iter().filter(|c| *c == letter).count();
                assert!(marked <= in_target, "{guess}/{target} over-marks {letter}");
            }
            for ((gc, tc), clue) in g.iter().zip(&t).zip(&clues) {
                assert_eq!(*clue == Correct, gc == tc, "{guess}/{target}");
            }
        }
    }

    #[test]
    fn letter_states_never_downgrade() {
        let mut states = BTreeMap::new();
        update_letter_states(&mut states, &chars("ab"), &[Correct, Present]);
        update_letter_states(&mut states, &chars("ab"), &[Absent, Absent]);
        assert_eq!(states.get("a"), Some(&Correct));
        assert_eq!(states.get("b"), Some(&Present));

        update_letter_states(&mut states, &chars("bc"), &[Correct, Absent]);
        assert_eq!(states.get("b"), Some(&Correct));
        assert_eq!(states.get("c"), Some(&Absent));
    }

    #[test]
    fn repeated_letter_in_one_guess_keeps_best() {
        let mut states = BTreeMap::new();
        let guess = chars("floor");
        let clues = generate_clues(&guess, &chars("robot"));
        update_letter_states(&mut states, &guess, &clues);
        assert_eq!(states.get("o"), Some(&Correct));
        assert_eq!(states.get("f"), Some(&Absent));
    }
}
