use log::warn;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, InputFile, KeyboardButton, KeyboardMarkup};
use teloxide::RequestError;

use crate::quiz::engine::{Outbound, CLEAR_BUTTON, NEW_WORD_BUTTON, START_TEST_BUTTON};
use crate::speech::{Speech, SpeechError};
use crate::tutor::Reply;
use crate::HandlerResult;

#[derive(Debug, thiserror::Error)]
pub enum PronunciationError {
    #[error(transparent)]
    Speech(#[from] SpeechError),
    #[error("failed to send audio: {0}")]
    Send(#[from] RequestError),
}

pub fn main_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new(NEW_WORD_BUTTON),
            KeyboardButton::new(START_TEST_BUTTON),
        ],
        vec![KeyboardButton::new(CLEAR_BUTTON)],
    ])
}

fn options_keyboard(options: &[String]) -> KeyboardMarkup {
    KeyboardMarkup::new(
        options
            .iter()
            .map(|o| vec![KeyboardButton::new(o.clone())])
            .collect::<Vec<_>>(),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Markup {
    MainMenu,
    Options(Vec<String>),
    /// Leave whatever keyboard the chat already shows.
    Keep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Delivery {
    Text { text: String, markup: Markup },
    Audio(String),
}

/// Orders a reply for sending: every text first, pronunciations last.
///
/// Plain messages carry the main menu unless the reply also asks a question,
/// in which case the question's own keyboard takes over.
fn plan(reply: Reply) -> Vec<Delivery> {
    let asks_question = reply
        .outbound
        .iter()
        .any(|o| matches!(o, Outbound::Options { .. }));

    let mut texts = Vec::new();
    let mut audio = Vec::new();
    for outbound in reply.outbound {
        match outbound {
            Outbound::Message(text) => texts.push(Delivery::Text {
                text,
                markup: if asks_question {
                    Markup::Keep
                } else {
                    Markup::MainMenu
                },
            }),
            Outbound::Options { text, options } => texts.push(Delivery::Text {
                text,
                markup: Markup::Options(options),
            }),
            Outbound::Audio(word) => audio.push(Delivery::Audio(word)),
        }
    }
    texts.extend(audio);
    texts
}

/// Sends the engine's instructions to the chat.
///
/// A failed text message fails the handler; a failed pronunciation is only logged.
pub async fn render(bot: &Bot, chat: ChatId, reply: Reply, speech: &Speech) -> HandlerResult {
    for delivery in plan(reply) {
        match delivery {
            Delivery::Text { text, markup } => {
                let request = bot.send_message(chat, text);
                match markup {
                    Markup::MainMenu => request.reply_markup(main_menu()).await?,
                    Markup::Options(options) => {
                        request.reply_markup(options_keyboard(&options)).await?
                    }
                    Markup::Keep => request.await?,
                };
            }
            Delivery::Audio(word) => {
                if let Err(err) = send_pronunciation(bot, chat, speech, &word).await {
                    warn!("No pronunciation for {:?}: {}", word, err);
                }
            }
        }
    }
    Ok(())
}

async fn send_pronunciation(
    bot: &Bot,
    chat: ChatId,
    speech: &Speech,
    word: &str,
) -> Result<(), PronunciationError> {
    if !speech.is_enabled() {
        return Ok(());
    }

    // Nice to have, not worth failing over
    let _ = bot.send_chat_action(chat, ChatAction::UploadVoice).await;

    let file = audio_file(speech, word).await?;
    bot.send_audio(chat, file).title(word.to_string()).await?;
    Ok(())
}

async fn audio_file(speech: &Speech, word: &str) -> Result<InputFile, SpeechError> {
    let audio = speech.synthesize(word).await?;
    Ok(InputFile::memory(audio).file_name(format!("{}.mp3", word)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpeechConfig;
    use crate::quiz::session::Phase;
    use std::time::Duration;

    fn text(text: &str, markup: Markup) -> Delivery {
        Delivery::Text {
            text: text.to_string(),
            markup,
        }
    }

    #[test]
    fn word_text_goes_out_before_its_audio() {
        let reply = Reply {
            outbound: vec![
                Outbound::Audio("cat".to_string()),
                Outbound::Message("cat - кот".to_string()),
            ],
            phase: Phase::Learning,
        };
        assert_eq!(
            plan(reply),
            vec![
                text("cat - кот", Markup::MainMenu),
                Delivery::Audio("cat".to_string()),
            ]
        );
    }

    #[test]
    fn questions_keep_their_own_keyboard() {
        let options = vec!["кот".to_string(), "собака".to_string()];
        let reply = Reply {
            outbound: vec![
                Outbound::Message("Правильно!".to_string()),
                Outbound::Options {
                    text: "Вопрос 2/10".to_string(),
                    options: options.clone(),
                },
            ],
            phase: Phase::QuizForward,
        };
        assert_eq!(
            plan(reply),
            vec![
                text("Правильно!", Markup::Keep),
                text("Вопрос 2/10", Markup::Options(options)),
            ]
        );
    }

    #[tokio::test]
    async fn unreachable_speech_service_is_an_error_not_a_failure() {
        let config = SpeechConfig {
            enabled: true,
            api_key: None,
            language: "en-US".to_string(),
            voice: "en-US-Standard-C".to_string(),
            timeout: Duration::from_secs(1),
        };
        // Nothing listens on the discard port.
        let speech = Speech::new(config)
            .unwrap()
            .with_endpoint("http://127.0.0.1:9/translate_tts");

        let result = audio_file(&speech, "cat").await;
        assert!(matches!(
            result,
            Err(SpeechError::Http(_)) | Err(SpeechError::Status(_))
        ));

        let err = PronunciationError::from(result.unwrap_err());
        assert!(matches!(err, PronunciationError::Speech(_)));
    }
}
