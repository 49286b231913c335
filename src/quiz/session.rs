use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::warn;

use crate::quiz::dictionary::WordPair;
use crate::quiz::distractors::Direction;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Learning,
    QuizForward,
    QuizReverse,
}

impl Phase {
    /// Question orientation for the quiz phases, `None` outside a quiz.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Phase::QuizForward => Some(Direction::Forward),
            Phase::QuizReverse => Some(Direction::Reverse),
            Phase::Idle | Phase::Learning => None,
        }
    }

    pub fn in_quiz(self) -> bool {
        self.direction().is_some()
    }
}

/// Answer to the question currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAnswer {
    pub answer: String,
    pub lowercase: String,
}

impl PendingAnswer {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            lowercase: answer.to_lowercase(),
        }
    }

    pub fn matches(&self, reply: &str) -> bool {
        reply.trim().to_lowercase() == self.lowercase
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub phase: Phase,
    pub learned_words: Vec<WordPair>,
    pub quiz_words: Vec<WordPair>,
    pub quiz_index: usize,
    pub correct_count: usize,
    pub pending_answer: Option<PendingAnswer>,
}

impl SessionState {
    pub fn has_learned(&self, word: &str) -> bool {
        let word = word.to_lowercase();
        self.learned_words
            .iter()
            .any(|p| p.word.to_lowercase() == word)
    }

    /// Questions in a full quiz run, both directions.
    pub fn total_questions(&self) -> usize {
        2 * self.quiz_words.len()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Owns every user's [`SessionState`].
///
/// Each session has its own lock, so one user's actions are applied one at a
/// time while different users proceed independently.
pub struct SessionStore<K> {
    sessions: Mutex<HashMap<K, Arc<Mutex<SessionState>>>>,
}

impl<K> Default for SessionStore<K> {
    fn default() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash> SessionStore<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&self, id: K) -> Arc<Mutex<SessionState>> {
        lock(&self.sessions).entry(id).or_default().clone()
    }

    /// Runs `f` inside the user's critical section.
    pub fn with_session<T>(&self, id: K, f: impl FnOnce(&mut SessionState) -> T) -> T {
        let session = self.get_or_create(id);
        let mut state = lock(&*session);
        f(&mut state)
    }

    pub fn reset(&self, id: K) {
        self.with_session(id, SessionState::reset);
    }

    /// Current phase, without creating a session for unknown users.
    pub fn phase(&self, id: K) -> Phase {
        let session = lock(&self.sessions).get(&id).cloned();
        match session {
            Some(session) => {
                let state = lock(&*session);
                state.phase
            }
            None => Phase::default(),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
        warn!("Recovering a poisoned session lock");
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_are_created_lazily_and_kept_per_user() {
        let store: SessionStore<i64> = SessionStore::new();
        assert_eq!(store.phase(1), Phase::Idle);
        assert!(lock(&store.sessions).is_empty());

        store.with_session(1, |s| {
            s.phase = Phase::Learning;
            s.learned_words.push(WordPair::new("cat", "кот"));
        });

        assert_eq!(store.phase(1), Phase::Learning);
        assert_eq!(store.phase(2), Phase::Idle);
        assert_eq!(lock(&store.sessions).len(), 1);
    }

    #[test]
    fn reset_returns_to_idle() {
        let store: SessionStore<i64> = SessionStore::new();
        store.with_session(7, |s| {
            s.phase = Phase::QuizReverse;
            s.quiz_index = 3;
            s.correct_count = 4;
            s.learned_words.push(WordPair::new("cat", "кот"));
        });

        store.reset(7);

        let session = store.get_or_create(7);
        assert_eq!(*session.lock().unwrap(), SessionState::default());
    }

    #[test]
    fn learned_lookup_ignores_case() {
        let state = SessionState {
            learned_words: vec![WordPair::new("Apple", "яблоко")],
            ..Default::default()
        };
        assert!(state.has_learned("aPPLE"));
        assert!(!state.has_learned("apples"));
    }

    #[test]
    fn pending_answer_ignores_case_and_padding() {
        let pending = PendingAnswer::new("Собака");
        assert!(pending.matches(" собака "));
        assert!(pending.matches("СОБАКА"));
        assert!(!pending.matches("кот"));
        assert_eq!(pending.answer, "Собака");
    }
}
