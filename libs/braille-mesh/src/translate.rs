//! # Translation Boundary
//!
//! Text becomes braille cells outside this crate. The engine is reached
//! through [`BrailleTranslator`]; [`TranslationClient`] talks to it over a
//! channel with a per-request timeout and a correlation id.
//!
//! When the engine times out, disconnects, errors or answers the wrong
//! request, the client falls back to [`passthrough`]: an uncontracted
//! letter-by-letter mapping. The result is flagged so callers can report
//! that the plate was not properly translated.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::cell::{DotPattern, BRAILLE_BASE, BRAILLE_LAST};

/// Default time to wait for the engine.
pub const DEFAULT_TRANSLATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Cell prefixed to every run of digits (dots 3-4-5-6).
pub const NUMBER_SIGN: DotPattern = DotPattern::from_mask(0b11_1100);

// =============================================================================
// PASS-THROUGH MAPPING
// =============================================================================

/// Cell for one character, letters case-insensitive. Digits map to the
/// letters a–j; unknown characters map to a blank cell.
pub fn passthrough_cell(c: char) -> DotPattern {
    let dots: &[u8] = match c.to_ascii_lowercase() {
        'a' | '1' => &[1],
        'b' | '2' => &[1, 2],
        'c' | '3' => &[1, 4],
        'd' | '4' => &[1, 4, 5],
        'e' | '5' => &[1, 5],
        'f' | '6' => &[1, 2, 4],
        'g' | '7' => &[1, 2, 4, 5],
        'h' | '8' => &[1, 2, 5],
        'i' | '9' => &[2, 4],
        'j' | '0' => &[2, 4, 5],
        'k' => &[1, 3],
        'l' => &[1, 2, 3],
        'm' => &[1, 3, 4],
        'n' => &[1, 3, 4, 5],
        'o' => &[1, 3, 5],
        'p' => &[1, 2, 3, 4],
        'q' => &[1, 2, 3, 4, 5],
        'r' => &[1, 2, 3, 5],
        's' => &[2, 3, 4],
        't' => &[2, 3, 4, 5],
        'u' => &[1, 3, 6],
        'v' => &[1, 2, 3, 6],
        'w' => &[2, 4, 5, 6],
        'x' => &[1, 3, 4, 6],
        'y' => &[1, 3, 4, 5, 6],
        'z' => &[1, 3, 5, 6],
        '#' => &[3, 4, 5, 6],
        ',' => &[5],
        '!' => &[3, 5],
        '?' => &[3, 6],
        '-' | '_' => &[5, 6],
        '(' | ')' | '[' | ']' | '{' | '}' => &[3, 4, 5],
        '/' | '\\' | '|' => &[4, 6],
        '.' | '\'' | '"' | '@' | '$' | '%' | '^' | '&' | '*' | '+' | '=' | '<' | '>' | '~'
        | '`' => &[6],
        _ => &[],
    };
    DotPattern::from_dots(dots)
}

/// Uncontracted letter-by-letter transliteration.
///
/// Braille cells already in the input are kept as they are.
///
/// # Example
///
/// ```rust
/// use braille_mesh::translate::passthrough;
///
/// assert_eq!(passthrough("Ab 12"), "⠁⠃⠀⠼⠁⠃");
/// ```
pub fn passthrough(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 3);
    let mut in_number = false;
    for c in text.chars() {
        if (BRAILLE_BASE..=BRAILLE_LAST).contains(&(c as u32)) {
            out.push(c);
            in_number = false;
            continue;
        }
        let digit = c.is_ascii_digit();
        if digit && !in_number {
            out.push(NUMBER_SIGN.encode());
        }
        in_number = digit;
        out.push(passthrough_cell(c).encode());
    }
    out
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Translation grade requested from the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    /// Uncontracted.
    #[default]
    Grade1,
    /// Contracted.
    Grade2,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Correlation id, echoed in the response.
    pub id: u64,
    pub text: String,
    pub grade: Grade,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub id: u64,
    /// Braille cells, or the engine's error message.
    pub result: Result<String, String>,
}

/// A request and the slot its answer goes to.
#[derive(Debug)]
pub struct Envelope {
    pub request: TranslationRequest,
    pub reply: oneshot::Sender<TranslationResponse>,
}

/// Cells for one line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub cells: String,
    /// The pass-through mapping was used because the engine failed.
    pub fallback: bool,
}

// =============================================================================
// TRANSLATORS
// =============================================================================

/// Anything that turns text into braille cells.
///
/// Translation never fails outright: implementations degrade to
/// [`passthrough`] and set [`Translation::fallback`].
pub trait BrailleTranslator: Send + Sync {
    fn translate(&self, text: &str, grade: Grade) -> impl Future<Output = Translation> + Send;
}

/// Always uses the pass-through mapping. Not a fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTranslator;

impl BrailleTranslator for PassthroughTranslator {
    fn translate(&self, text: &str, _grade: Grade) -> impl Future<Output = Translation> + Send {
        let cells = passthrough(text);
        async move {
            Translation {
                cells,
                fallback: false,
            }
        }
    }
}

#[derive(Debug, Error)]
enum ExchangeError {
    #[error("engine did not answer within {0:?}")]
    Timeout(Duration),
    #[error("engine channel closed")]
    Disconnected,
    #[error("response id {got} does not match request id {expected}")]
    Mismatch { expected: u64, got: u64 },
    #[error("engine error: {0}")]
    Engine(String),
}

/// Channel client for an external translation engine.
#[derive(Debug)]
pub struct TranslationClient {
    sender: mpsc::Sender<Envelope>,
    timeout: Duration,
    next_id: AtomicU64,
}

impl TranslationClient {
    pub fn new(sender: mpsc::Sender<Envelope>, timeout: Duration) -> Self {
        Self {
            sender,
            timeout,
            next_id: AtomicU64::new(1),
        }
    }

    /// Creates a client and the receiving end the engine should drain.
    pub fn channel(capacity: usize, timeout: Duration) -> (Self, mpsc::Receiver<Envelope>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self::new(sender, timeout), receiver)
    }

    async fn exchange(&self, text: &str, grade: Grade) -> Result<String, ExchangeError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply, answer) = oneshot::channel();
        let envelope = Envelope {
            request: TranslationRequest {
                id,
                text: text.to_string(),
                grade,
            },
            reply,
        };

        let round_trip = async {
            self.sender
                .send(envelope)
                .await
                .map_err(|_| ExchangeError::Disconnected)?;
            answer.await.map_err(|_| ExchangeError::Disconnected)
        };
        let response = tokio::time::timeout(self.timeout, round_trip)
            .await
            .map_err(|_| ExchangeError::Timeout(self.timeout))??;

        if response.id != id {
            return Err(ExchangeError::Mismatch {
                expected: id,
                got: response.id,
            });
        }
        response.result.map_err(ExchangeError::Engine)
    }
}

impl BrailleTranslator for TranslationClient {
    fn translate(&self, text: &str, grade: Grade) -> impl Future<Output = Translation> + Send {
        async move {
            match self.exchange(text, grade).await {
                Ok(cells) => {
                    debug!(chars = text.chars().count(), "line translated");
                    Translation {
                        cells,
                        fallback: false,
                    }
                }
                Err(err) => {
                    warn!(error = %err, "translation failed, using pass-through mapping");
                    Translation {
                        cells: passthrough(text),
                        fallback: true,
                    }
                }
            }
        }
    }
}

/// Answers every request on `receiver` with `engine` until all clients
/// are dropped.
pub async fn serve<F>(mut receiver: mpsc::Receiver<Envelope>, mut engine: F)
where
    F: FnMut(&TranslationRequest) -> Result<String, String>,
{
    while let Some(Envelope { request, reply }) = receiver.recv().await {
        let result = engine(&request);
        // The client may have timed out and gone away.
        let _ = reply.send(TranslationResponse {
            id: request.id,
            result,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::decode_line;

    fn spawn_engine<F>(engine: F) -> TranslationClient
    where
        F: FnMut(&TranslationRequest) -> Result<String, String> + Send + 'static,
    {
        let (client, receiver) = TranslationClient::channel(4, Duration::from_millis(200));
        tokio::spawn(serve(receiver, engine));
        client
    }

    // =========================================================================
    // PASS-THROUGH
    // =========================================================================

    #[test]
    fn test_passthrough_letters() {
        assert_eq!(passthrough("abc"), "⠁⠃⠉");
        assert_eq!(passthrough("XYZ"), "⠭⠽⠵");
        assert_eq!(passthrough("w"), "⠺");
    }

    #[test]
    fn test_passthrough_number_sign_per_run() {
        assert_eq!(passthrough("1a23"), "⠼⠁⠁⠼⠃⠉");
        assert_eq!(passthrough("10"), "⠼⠁⠚");
    }

    #[test]
    fn test_passthrough_unknown_is_blank() {
        let cells = decode_line(&passthrough("é ~"));
        assert_eq!(cells.len(), 3);
        assert!(cells[0].is_empty());
        assert!(cells[1].is_empty());
        assert_eq!(cells[2].dots().collect::<Vec<_>>(), vec![6]);
    }

    #[test]
    fn test_passthrough_keeps_braille() {
        assert_eq!(passthrough("⠓⠊"), "⠓⠊");
    }

    #[test]
    fn test_number_sign_glyph() {
        assert_eq!(NUMBER_SIGN.encode(), '⠼');
        assert_eq!(passthrough_cell('#'), NUMBER_SIGN);
    }

    // =========================================================================
    // CLIENT
    // =========================================================================

    #[tokio::test]
    async fn test_client_round_trip() {
        let client = spawn_engine(|request| Ok(format!("<{}>", request.text)));
        let translation = client.translate("hello", Grade::Grade2).await;
        assert_eq!(translation.cells, "<hello>");
        assert!(!translation.fallback);
    }

    #[tokio::test]
    async fn test_client_ids_increase() {
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let record = seen.clone();
        let client = spawn_engine(move |request| {
            record.lock().unwrap().push(request.id);
            Ok(String::new())
        });
        client.translate("a", Grade::Grade1).await;
        client.translate("b", Grade::Grade1).await;
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_timeout_falls_back() {
        let (client, mut receiver) = TranslationClient::channel(4, Duration::from_secs(1));
        // Engine that accepts requests and never answers
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Some(envelope) = receiver.recv().await {
                held.push(envelope);
            }
        });

        let translation = client.translate("ab", Grade::Grade1).await;
        assert!(translation.fallback);
        assert_eq!(translation.cells, "⠁⠃");
    }

    #[tokio::test]
    async fn test_client_disconnected_falls_back() {
        let (client, receiver) = TranslationClient::channel(4, Duration::from_secs(1));
        drop(receiver);
        let translation = client.translate("c", Grade::Grade1).await;
        assert!(translation.fallback);
        assert_eq!(translation.cells, "⠉");
    }

    #[tokio::test]
    async fn test_client_engine_error_falls_back() {
        let client = spawn_engine(|_| Err("no table".to_string()));
        let translation = client.translate("d", Grade::Grade1).await;
        assert!(translation.fallback);
        assert_eq!(translation.cells, "⠙");
    }

    #[tokio::test]
    async fn test_client_mismatched_id_falls_back() {
        let (client, mut receiver) = TranslationClient::channel(4, Duration::from_secs(1));
        tokio::spawn(async move {
            while let Some(Envelope { request, reply }) = receiver.recv().await {
                let _ = reply.send(TranslationResponse {
                    id: request.id + 100,
                    result: Ok("⠿".to_string()),
                });
            }
        });

        let translation = client.translate("e", Grade::Grade1).await;
        assert!(translation.fallback);
        assert_eq!(translation.cells, "⠑");
    }

    #[tokio::test]
    async fn test_passthrough_translator() {
        let translation = PassthroughTranslator.translate("hi", Grade::Grade2).await;
        assert_eq!(translation.cells, "⠓⠊");
        assert!(!translation.fallback);
    }

    #[test]
    fn test_request_json() {
        let request = TranslationRequest {
            id: 7,
            text: "hi".into(),
            grade: Grade::Grade2,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"id":7,"text":"hi","grade":"grade2"}"#);
    }
}
