//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{ChatMessage, View};
use crate::forms::LoginForm;
use crate::orchestrator::ViewOrchestrator;
use crate::quiz::{OptionState, QuizEngine};
use crate::state::Session;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    GetView,
    SelectView {
        selected: i64,
    },
    GetQuiz,
    SelectAnswer {
        #[serde(rename = "questionIndex")]
        question_index: usize,
        #[serde(rename = "answerIndex")]
        answer_index: usize,
    },
    SubmitQuiz,
    RetakeQuiz,
    Chat {
        text: String,
    },
    ClearChat,
    Upload {
        #[serde(rename = "fileName")]
        file_name: String,
        #[serde(rename = "fileBase64")]
        file_base64: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Session { session: SessionOut },
    View { view: ViewOut },
    Quiz { quiz: QuizOut },
    Chat { messages: Vec<ChatMessage> },
    Uploaded { upload: UploadOut },
    Error { message: String },
}

#[derive(Debug, Serialize)]
pub struct SessionOut {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub selected: u8,
    pub view: &'static str,
    #[serde(rename = "hasDocument")]
    pub has_document: bool,
    pub generation: u64,
    pub user: Option<String>,
}

pub fn to_session_out(s: &Session) -> SessionOut {
    SessionOut {
        session_id: s.id.clone(),
        selected: s.views.selected().index(),
        view: s.views.selected().label(),
        has_document: s.views.payload().is_some(),
        generation: s.views.generation(),
        user: s.user.clone(),
    }
}

/// Content of the currently selected view.
#[derive(Debug, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewOut {
    Summary { summary: String },
    Flashcards { cards: Vec<serde_json::Value> },
    Quiz { quiz: QuizOut },
}

pub fn to_view_out(v: &ViewOrchestrator) -> ViewOut {
    let payload = v.payload();
    match v.selected() {
        View::Summary => ViewOut::Summary {
            summary: payload.map(|p| p.summary.clone()).unwrap_or_default(),
        },
        View::Flashcards => ViewOut::Flashcards {
            cards: payload.map(|p| p.flashcards.clone()).unwrap_or_default(),
        },
        View::Quiz => ViewOut::Quiz { quiz: to_quiz_out(v.quiz()) },
    }
}

#[derive(Debug, Serialize)]
pub struct QuizOut {
    pub questions: Vec<QuestionOut>,
    pub submitted: bool,
    pub score: Option<usize>,
    pub total: usize,
    pub answered: usize,
}

#[derive(Debug, Serialize)]
pub struct QuestionOut {
    pub question: String,
    pub options: Vec<OptionOut>,
    pub selected: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct OptionOut {
    pub text: String,
    pub state: OptionState,
}

pub fn to_quiz_out(q: &QuizEngine) -> QuizOut {
    let questions = q
        .questions()
        .iter()
        .enumerate()
        .map(|(qi, question)| QuestionOut {
            question: question.prompt.clone(),
            options: question
                .possible_answers
                .iter()
                .enumerate()
                .map(|(ai, text)| OptionOut { text: text.clone(), state: q.option_state(qi, ai) })
                .collect(),
            selected: q.user_answers()[qi],
        })
        .collect();
    QuizOut {
        questions,
        submitted: q.is_submitted(),
        score: q.score(),
        total: q.total(),
        answered: q.answered_count(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ViewIn {
    pub selected: i64,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
    #[serde(rename = "questionIndex")]
    pub question_index: usize,
    #[serde(rename = "answerIndex")]
    pub answer_index: usize,
}

#[derive(Debug, Deserialize)]
pub struct ExportIn {
    pub selected: i64,
}

#[derive(Debug, Deserialize)]
pub struct ChatIn {
    pub text: String,
}
#[derive(Debug, Serialize)]
pub struct ChatOut {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct UploadOut {
    /// False when a newer upload superseded this one.
    pub applied: bool,
    pub generation: u64,
    pub flashcards: usize,
    pub questions: usize,
}

#[derive(Debug, Deserialize)]
pub struct LoginIn {
    #[serde(flatten)]
    pub form: LoginForm,
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OkOut {
    pub ok: bool,
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
