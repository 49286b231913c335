//! Learn/test state machine for a single user.
//!
//! [`step`] applies one [`Action`] to a [`SessionState`] and returns what
//! should be shown to the user. Nothing here blocks or fails: rejected
//! actions leave the session untouched and come back as plain messages.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::quiz::dictionary::WordDictionary;
use crate::quiz::distractors::{self, Direction};
use crate::quiz::session::{PendingAnswer, Phase, SessionState};
use crate::quiz::WORDS_PER_CYCLE;

pub const COMMAND_MARKER: char = '/';

pub const NEW_WORD_BUTTON: &str = "Новое слово";
pub const START_TEST_BUTTON: &str = "Начать тест";
pub const CLEAR_BUTTON: &str = "Очистить";

const GREETING_TEXT: &str = "Привет! Я твой English Bot! Я помогу тебе выучить английские слова.";
const HELP_TEXT: &str = "Бери новые слова по одному, пока их не станет пять, а потом проходи тест: \
сначала переводишь с английского на русский, затем обратно.\n\n\
/word - новое слово\n\
/test - начать тест\n\
/clear - начать заново\n\
/reload - перечитать словарь";
const CORRECT_TEXT: &str = "Правильно!";
const CLEARED_TEXT: &str = "Всё очищено. Начнём сначала!";
const ALL_WORDS_LEARNED_TEXT: &str = "Ты уже выучил все слова из словаря!";
const FINISH_TEST_FIRST_TEXT: &str = "Сначала закончи тест. Если хочешь начать заново: /clear";
const USE_MENU_TEXT: &str = "Не понимаю. Используй кнопки меню или /help";
const REVERSE_DIRECTION_TEXT: &str = "Отлично! Теперь наоборот: переводи с русского на английский.";
const TEST_STARTED_TEXT: &str = "Начинаем тест! Сначала переводи с английского на русский.";
pub const PERFECT_SCORE_TEXT: &str = "Идеально! Все ответы правильные!";

/// An inbound user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Start,
    Help,
    RequestWord,
    StartTest,
    SubmitAnswer(String),
    Clear,
    Reload,
}

impl Action {
    /// Interprets free text. During a quiz all of it is an answer; otherwise
    /// menu buttons map to their actions.
    pub fn from_text(text: &str, phase: Phase) -> Self {
        if phase.in_quiz() {
            return Action::SubmitAnswer(text.to_string());
        }
        match text.trim() {
            NEW_WORD_BUTTON => Action::RequestWord,
            START_TEST_BUTTON => Action::StartTest,
            CLEAR_BUTTON => Action::Clear,
            _ => Action::SubmitAnswer(text.to_string()),
        }
    }
}

/// An instruction for the chat front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Message(String),
    Options { text: String, options: Vec<String> },
    /// Pronunciation of the word should be attached.
    Audio(String),
}

fn message(text: impl Into<String>) -> Outbound {
    Outbound::Message(text.into())
}

/// Confirmation sent once a session has been wiped.
pub fn cleared() -> Outbound {
    message(CLEARED_TEXT)
}

pub fn step<R: Rng + ?Sized>(
    session: &mut SessionState,
    dictionary: &WordDictionary,
    action: Action,
    rng: &mut R,
) -> Vec<Outbound> {
    match action {
        Action::Start => vec![message(format!("{}\n\n{}", GREETING_TEXT, HELP_TEXT))],
        Action::Help => vec![message(HELP_TEXT)],
        Action::RequestWord => request_word(session, dictionary, rng),
        Action::StartTest => start_test(session, dictionary, rng),
        Action::SubmitAnswer(text) => submit_answer(session, dictionary, &text, rng),
        Action::Clear => {
            session.reset();
            vec![cleared()]
        }
        // Swapping the dictionary is the caller's job; sessions are untouched.
        Action::Reload => Vec::new(),
    }
}

fn request_word<R: Rng + ?Sized>(
    session: &mut SessionState,
    dictionary: &WordDictionary,
    rng: &mut R,
) -> Vec<Outbound> {
    if session.phase.in_quiz() {
        return vec![message(FINISH_TEST_FIRST_TEXT)];
    }
    if session.learned_words.len() >= WORDS_PER_CYCLE {
        return vec![message(format!(
            "У тебя уже {} слов. Пора пройти тест: /test",
            WORDS_PER_CYCLE
        ))];
    }

    let unused = dictionary
        .pairs()
        .iter()
        .filter(|p| !session.has_learned(&p.word))
        .collect::<Vec<_>>();
    let pair = match unused.choose(rng) {
        Some(pair) => (*pair).clone(),
        None => return vec![message(ALL_WORDS_LEARNED_TEXT)],
    };

    session.learned_words.push(pair.clone());
    session.phase = Phase::Learning;

    let learned = session.learned_words.len();
    let mut text = format!(
        "Новое слово ({}/{}):\n{} - {}",
        learned, WORDS_PER_CYCLE, pair.word, pair.translation
    );
    if learned == WORDS_PER_CYCLE {
        text.push_str("\n\nВсе слова набраны, начинай тест: /test");
    }
    vec![message(text), Outbound::Audio(pair.word)]
}

fn start_test<R: Rng + ?Sized>(
    session: &mut SessionState,
    dictionary: &WordDictionary,
    rng: &mut R,
) -> Vec<Outbound> {
    if session.phase.in_quiz() {
        return vec![message(FINISH_TEST_FIRST_TEXT)];
    }
    let learned = session.learned_words.len();
    if learned != WORDS_PER_CYCLE {
        return vec![message(format!(
            "Для теста нужно {} слов, а у тебя {}. Возьми ещё: /word",
            WORDS_PER_CYCLE, learned
        ))];
    }

    let mut quiz_words = session.learned_words.clone();
    quiz_words.shuffle(rng);
    session.quiz_words = quiz_words;
    session.quiz_index = 0;
    session.correct_count = 0;
    session.pending_answer = None;
    session.phase = Phase::QuizForward;

    let mut out = vec![message(TEST_STARTED_TEXT)];
    ask_next_question(session, dictionary, rng, &mut out);
    out
}

fn submit_answer<R: Rng + ?Sized>(
    session: &mut SessionState,
    dictionary: &WordDictionary,
    text: &str,
    rng: &mut R,
) -> Vec<Outbound> {
    if !session.phase.in_quiz() {
        return vec![message(USE_MENU_TEXT)];
    }
    if text.trim_start().starts_with(COMMAND_MARKER) {
        return Vec::new();
    }

    let mut out = Vec::new();
    if let Some(pending) = session.pending_answer.take() {
        if pending.matches(text) {
            session.correct_count += 1;
            out.push(message(CORRECT_TEXT));
        } else {
            out.push(message(format!(
                "Неправильно! Правильный ответ: {}",
                pending.answer
            )));
        }
        session.quiz_index += 1;
    }
    ask_next_question(session, dictionary, rng, &mut out);
    out
}

/// Asks the question under the cursor, switching to the reverse pass or
/// finishing the quiz when the current pass is exhausted.
fn ask_next_question<R: Rng + ?Sized>(
    session: &mut SessionState,
    dictionary: &WordDictionary,
    rng: &mut R,
    out: &mut Vec<Outbound>,
) {
    loop {
        let Some(direction) = session.phase.direction() else {
            return;
        };

        let Some(pair) = session.quiz_words.get(session.quiz_index) else {
            match direction {
                Direction::Forward => {
                    session.quiz_index = 0;
                    session.phase = Phase::QuizReverse;
                    out.push(message(REVERSE_DIRECTION_TEXT));
                    continue;
                }
                Direction::Reverse => {
                    finish_quiz(session, out);
                    return;
                }
            }
        };

        let question = distractors::build_question(pair, direction, dictionary, rng);
        let number = match direction {
            Direction::Forward => session.quiz_index + 1,
            Direction::Reverse => session.quiz_words.len() + session.quiz_index + 1,
        };

        out.push(Outbound::Options {
            text: format!(
                "Вопрос {}/{}\n{}",
                number,
                session.total_questions(),
                question.text
            ),
            options: question.options(),
        });
        session.pending_answer = question
            .correct_answer()
            .map(|a| PendingAnswer::new(&a.text));
        return;
    }
}

fn finish_quiz(session: &mut SessionState, out: &mut Vec<Outbound>) {
    let total = session.total_questions();
    let correct = session.correct_count;
    let score = if correct == total {
        format!("{} {} из {}.", PERFECT_SCORE_TEXT, correct, total)
    } else {
        format!("Тест окончен! Правильных ответов: {} из {}.", correct, total)
    };
    log::info!("Quiz finished with {}/{}", correct, total);

    session.reset();
    out.push(message(format!(
        "{}\nЖми «{}», чтобы начать новый круг.",
        score, NEW_WORD_BUTTON
    )));
}
