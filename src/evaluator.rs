use crate::dictionary::{Word, WORD_LENGTH};
use crate::error::GameError;

/// Outcome of one guessed letter against the target.
///
/// Ordered by strength, so the best known verdict for a letter is the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verdict {
    Absent,
    Misplaced,
    Correct,
}

pub type Verdicts = [Verdict; WORD_LENGTH];

/// Scores `guess` against `target`, validating both as five-letter words first.
pub fn evaluate(guess: &str, target: &str) -> Result<Verdicts, GameError> {
    let guess = Word::parse(guess)?;
    let target = Word::parse(target)?;
    Ok(score(&guess, &target))
}

/// Two-pass scoring with an explicit consumed marker per target position.
///
/// Exact matches claim their target letter first; remaining guess letters then
/// claim the leftmost unconsumed occurrence, left to right. A guessed letter is
/// never credited more often than it occurs in the target.
pub fn score(guess: &Word, target: &Word) -> Verdicts {
    let guess = guess.letters();
    let target = target.letters();
    let mut verdicts = [Verdict::Absent; WORD_LENGTH];
    let mut consumed = [false; WORD_LENGTH];

    for i in 0..WORD_LENGTH {
        if guess[i] == target[i] {
            verdicts[i] = Verdict::Correct;
            consumed[i] = true;
        }
    }

    for i in 0..WORD_LENGTH {
        if verdicts[i] == Verdict::Correct {
            continue;
        }
        let unused = (0..WORD_LENGTH).find(|&j| !consumed[j] && target[j] == guess[i]);
        if let Some(j) = unused {
            consumed[j] = true;
            verdicts[i] = Verdict::Misplaced;
        }
    }

    verdicts
}
