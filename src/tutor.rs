use std::sync::Arc;

use log::{debug, info};
use teloxide::types::ChatId;
use tokio::task::JoinError;

use crate::quiz::dictionary::{SharedDictionary, WordDictionary};
use crate::quiz::engine::{self, Action, Outbound};
use crate::quiz::session::{Phase, SessionState, SessionStore};

/// Result of handling one action for one chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub outbound: Vec<Outbound>,
    /// Phase the session is in after the action.
    pub phase: Phase,
}

/// Glues the shared dictionary, per-chat sessions and the quiz engine together.
pub struct Tutor {
    sessions: SessionStore<ChatId>,
    dictionary: SharedDictionary,
}

impl Tutor {
    pub fn new(dictionary: SharedDictionary) -> Self {
        Self {
            sessions: SessionStore::new(),
            dictionary,
        }
    }

    pub fn phase(&self, chat: ChatId) -> Phase {
        self.sessions.phase(chat)
    }

    pub fn handle(&self, chat: ChatId, action: Action) -> Reply {
        debug!("Chat {}: {:?}", chat.0, action);

        match action {
            Action::Reload => self.reload(chat),
            Action::Clear => {
                self.sessions.reset(chat);
                Reply {
                    outbound: vec![engine::cleared()],
                    phase: Phase::Idle,
                }
            }
            action => {
                let dictionary = self.dictionary.snapshot();
                self.sessions
                    .with_session(chat, |session| apply(session, &dictionary, action))
            }
        }
    }

    /// Same as [`Tutor::handle`], but runs on the blocking pool so file reads
    /// behind [`Action::Reload`] stay off the async workers.
    pub async fn handle_blocking(
        self: Arc<Self>,
        chat: ChatId,
        action: Action,
    ) -> Result<Reply, JoinError> {
        tokio::task::spawn_blocking(move || self.handle(chat, action)).await
    }

    fn reload(&self, chat: ChatId) -> Reply {
        let dictionary = self.dictionary.reload();
        info!("Chat {} reloaded {}", chat.0, self.dictionary.source().display());
        Reply {
            outbound: vec![Outbound::Message(format!(
                "Словарь перезагружен: {} слов.",
                dictionary.len()
            ))],
            phase: self.phase(chat),
        }
    }

    /// Handles free text. The text is interpreted against the phase seen
    /// inside the same critical section that applies it.
    pub fn handle_text(&self, chat: ChatId, text: &str) -> Reply {
        let dictionary = self.dictionary.snapshot();
        self.sessions.with_session(chat, |session| {
            let action = Action::from_text(text, session.phase);
            debug!("Chat {}: {:?}", chat.0, action);
            apply(session, &dictionary, action)
        })
    }
}

fn apply(session: &mut SessionState, dictionary: &WordDictionary, action: Action) -> Reply {
    let outbound = engine::step(session, dictionary, action, &mut rand::thread_rng());
    Reply {
        outbound,
        phase: session.phase,
    }
}
