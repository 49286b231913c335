use rand::seq::SliceRandom;
use rand::Rng;

use crate::quiz::dictionary::{Field, WordDictionary, WordPair};
use crate::quiz::{self, DISTRACTORS_PER_QUESTION};

/// Orientation of a quiz question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Show the word, expect its translation.
    Forward,
    /// Show the translation, expect the word.
    Reverse,
}

impl Direction {
    pub fn answer_field(self) -> Field {
        match self {
            Direction::Forward => Field::Translation,
            Direction::Reverse => Field::Word,
        }
    }

    pub fn prompt_field(self) -> Field {
        match self {
            Direction::Forward => Field::Word,
            Direction::Reverse => Field::Translation,
        }
    }

    fn prompt_text(self, prompt: &str) -> String {
        match self {
            Direction::Forward => format!("Как переводится «{}»?", prompt),
            Direction::Reverse => format!("Как по-английски «{}»?", prompt),
        }
    }
}

/// Builds a question about `pair`: the correct answer plus up to
/// [`DISTRACTORS_PER_QUESTION`] wrong ones drawn from the dictionary, shuffled.
pub fn build_question<R: Rng + ?Sized>(
    pair: &WordPair,
    direction: Direction,
    dictionary: &WordDictionary,
    rng: &mut R,
) -> quiz::Question {
    let prompt = pair.get(direction.prompt_field());
    let correct = pair.get(direction.answer_field());

    // Entries sharing the prompt (e.g. "kitty" for «кот») are right answers too.
    let prompt_lower = prompt.to_lowercase();
    let mut exclude = vec![correct];
    exclude.extend(
        dictionary
            .pairs()
            .iter()
            .filter(|other| other.get(direction.prompt_field()).to_lowercase() == prompt_lower)
            .map(|other| other.get(direction.answer_field())),
    );

    // We shuffle the answers so the correct one isn't always the first one
    let answers = {
        let mut answers = vec![quiz::Answer::new(correct.to_string(), true)];
        answers.extend(
            dictionary
                .sample_distinct(
                    direction.answer_field(),
                    &exclude,
                    DISTRACTORS_PER_QUESTION,
                    rng,
                )
                .into_iter()
                .map(|wrong| quiz::Answer::new(wrong, false)),
        );
        answers.shuffle(rng);
        answers
    };

    quiz::Question::new(direction.prompt_text(prompt), answers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn forward_question_offers_translation_and_three_distractors() {
        let dictionary = WordDictionary::default();
        let pair = WordPair::new("cat", "кот");
        let mut rng = StdRng::seed_from_u64(3);

        let question = build_question(&pair, Direction::Forward, &dictionary, &mut rng);

        assert_eq!(question.text, "Как переводится «cat»?");
        assert_eq!(question.answers.len(), 4);
        assert_eq!(question.correct_answer().unwrap().text, "кот");
        assert_eq!(question.answers.iter().filter(|a| a.is_correct).count(), 1);
        assert!(question
            .answers
            .iter()
            .filter(|a| !a.is_correct)
            .all(|a| a.text != "кот"));
    }

    #[test]
    fn reverse_question_asks_for_the_word() {
        let dictionary = WordDictionary::default();
        let pair = WordPair::new("sun", "солнце");
        let mut rng = StdRng::seed_from_u64(4);

        let question = build_question(&pair, Direction::Reverse, &dictionary, &mut rng);

        assert_eq!(question.text, "Как по-английски «солнце»?");
        assert_eq!(question.correct_answer().unwrap().text, "sun");
        assert!(question.options().iter().all(|o| o.is_ascii()));
    }

    #[test]
    fn small_dictionary_gives_fewer_options() {
        let dictionary = WordDictionary::from_pairs(vec![
            WordPair::new("cat", "кот"),
            WordPair::new("dog", "собака"),
        ]);
        let mut rng = StdRng::seed_from_u64(5);
        let question = build_question(
            &WordPair::new("cat", "кот"),
            Direction::Forward,
            &dictionary,
            &mut rng,
        );
        assert_eq!(question.answers.len(), 2);

        let lonely = WordDictionary::from_pairs(vec![WordPair::new("cat", "кот")]);
        let question = build_question(
            &WordPair::new("cat", "кот"),
            Direction::Forward,
            &lonely,
            &mut rng,
        );
        assert_eq!(question.options(), vec!["кот".to_string()]);
    }

    #[test]
    fn words_sharing_the_prompt_are_never_distractors() {
        let dictionary = WordDictionary::from_pairs(vec![
            WordPair::new("cat", "кот"),
            WordPair::new("kitty", "Кот"),
            WordPair::new("dog", "собака"),
            WordPair::new("apple", "яблоко"),
            WordPair::new("book", "книга"),
            WordPair::new("sun", "солнце"),
        ]);
        let pair = WordPair::new("cat", "кот");

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let question = build_question(&pair, Direction::Reverse, &dictionary, &mut rng);
            assert_eq!(question.answers.len(), 4);
            assert!(!question.options().contains(&"kitty".to_string()));
        }
    }
}
