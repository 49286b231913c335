use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::config::SpeechConfig;

const CLOUD_TTS_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";
const TRANSLATE_TTS_URL: &str = "https://translate.google.com/translate_tts";

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("speech synthesis is disabled")]
    Disabled,
    #[error("speech request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("speech service answered {0}")]
    Status(reqwest::StatusCode),
    #[error("speech service sent invalid audio: {0}")]
    Decode(#[from] base64::DecodeError),
}

#[derive(Serialize)]
struct GoogleTtsRequest<'a> {
    input: GoogleTtsInput<'a>,
    voice: GoogleTtsVoice<'a>,
    #[serde(rename = "audioConfig")]
    audio_config: GoogleTtsAudioConfig,
}

#[derive(Serialize)]
struct GoogleTtsInput<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GoogleTtsVoice<'a> {
    #[serde(rename = "languageCode")]
    language_code: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct GoogleTtsAudioConfig {
    #[serde(rename = "audioEncoding")]
    audio_encoding: &'static str,
}

#[derive(Deserialize)]
struct GoogleTtsResponse {
    #[serde(rename = "audioContent")]
    audio_content: String,
}

/// Pronounces single words as MP3. Every call hits the service; nothing is cached.
pub struct Speech {
    client: reqwest::Client,
    config: SpeechConfig,
    cloud_url: String,
    translate_url: String,
}

impl Speech {
    pub fn new(config: SpeechConfig) -> Result<Self, SpeechError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            config,
            cloud_url: CLOUD_TTS_URL.to_string(),
            translate_url: TRANSLATE_TTS_URL.to_string(),
        })
    }

    /// Sends every request to `url` instead of Google.
    #[cfg(test)]
    pub fn with_endpoint(mut self, url: &str) -> Self {
        self.cloud_url = url.to_string();
        self.translate_url = url.to_string();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub async fn synthesize(&self, word: &str) -> Result<Vec<u8>, SpeechError> {
        if !self.config.enabled {
            return Err(SpeechError::Disabled);
        }
        match &self.config.api_key {
            Some(api_key) => self.cloud_tts(word, api_key).await,
            None => self.translate_tts(word).await,
        }
    }

    async fn cloud_tts(&self, word: &str, api_key: &str) -> Result<Vec<u8>, SpeechError> {
        let request = GoogleTtsRequest {
            input: GoogleTtsInput { text: word },
            voice: GoogleTtsVoice {
                language_code: &self.config.language,
                name: &self.config.voice,
            },
            audio_config: GoogleTtsAudioConfig {
                audio_encoding: "MP3",
            },
        };

        let response = self
            .client
            .post(&self.cloud_url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SpeechError::Status(response.status()));
        }

        let response: GoogleTtsResponse = response.json().await?;
        // Google returns the audio base64-encoded
        Ok(base64::engine::general_purpose::STANDARD.decode(response.audio_content)?)
    }

    async fn translate_tts(&self, word: &str) -> Result<Vec<u8>, SpeechError> {
        let response = self
            .client
            .get(&self.translate_url)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language_tag(&self.config.language)),
                ("q", word),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SpeechError::Status(response.status()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// `en-US` -> `en`
fn language_tag(language: &str) -> &str {
    language.split(['-', '_']).next().unwrap_or(language)
}
