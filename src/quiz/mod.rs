pub mod dictionary;
pub mod distractors;
pub mod engine;
pub mod session;

/// Words a user studies before the test unlocks.
pub const WORDS_PER_CYCLE: usize = 5;

/// Wrong options offered next to the correct one, when the dictionary has enough.
pub const DISTRACTORS_PER_QUESTION: usize = 3;

/// A multiple-choice question ready to be shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub answers: Vec<Answer>,
}
impl Question {
    pub fn new(text: String, answers: Vec<Answer>) -> Self {
        Self { text, answers }
    }

    pub fn correct_answer(&self) -> Option<&Answer> {
        self.answers.iter().find(|a| a.is_correct)
    }

    pub fn options(&self) -> Vec<String> {
        self.answers.iter().map(|a| a.text.clone()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub is_correct: bool,
}
impl Answer {
    pub fn new(text: String, is_correct: bool) -> Self {
        Self { text, is_correct }
    }
}
