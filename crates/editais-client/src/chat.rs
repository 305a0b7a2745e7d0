//! Chat widget state machine.
//!
//! `Idle` talks to the general endpoint; `Scoped` talks about one notice.
//! Picking an option from a bot reply enters `Scoped`; typing `sair` or
//! `voltar` leaves it without a request.
//!
//! A send is split in two so no lock is held across the network call:
//! `begin_send` records the user message and returns a `PendingTurn`,
//! `dispatch` performs the request, `complete` installs the reply.

use thiserror::Error;
use tracing::{debug, error};

use editais_common::{RequestSequence, Ticket};

use crate::api::EditaisApi;
use crate::error::ClientError;
use crate::models::{ChatOption, ChatReply};

pub const EXIT_KEYWORDS: &[&str] = &["sair", "voltar"];
pub const PROCESSING_TEXT: &str = "Processando…";
pub const APOLOGY_TEXT: &str = "Desculpe, não consegui responder agora. Tente novamente em instantes.";
pub const GREETING_TEXT: &str = "Olá! Pergunte sobre editais abertos ou escolha um edital para conversar sobre ele.";
/// Entries kept per widget; older ones are dropped first.
pub const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChatContext {
    #[default]
    Idle,
    Scoped { notice_id: String, title: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub speaker: Speaker,
    pub text: String,
    pub options: Vec<ChatOption>,
    /// The transient "processing" line.
    pub pending: bool,
}

impl ChatEntry {
    fn user(text: &str) -> Self {
        Self { speaker: Speaker::User, text: text.to_string(), options: Vec::new(), pending: false }
    }

    fn bot(text: impl Into<String>) -> Self {
        Self { speaker: Speaker::Bot, text: text.into(), options: Vec::new(), pending: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatRoute {
    General,
    Notice(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    pub ticket: Ticket,
    pub route: ChatRoute,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Dispatch(PendingTurn),
    ExitedScope,
    Ignored,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendRejected {
    #[error("a message is already being processed")]
    Busy,
}

fn is_exit_keyword(input: &str) -> bool {
    let lowered = input.trim().to_lowercase();
    EXIT_KEYWORDS.contains(&lowered.as_str())
}

#[derive(Debug, Default)]
pub struct ChatWidget {
    context: ChatContext,
    entries: Vec<ChatEntry>,
    sequence: RequestSequence,
    in_flight: Option<Ticket>,
}

impl ChatWidget {
    pub fn new() -> Self {
        Self { entries: vec![ChatEntry::bot(GREETING_TEXT)], ..Default::default() }
    }

    /// A widget opened from a notice's detail view.
    pub fn scoped(notice_id: &str, title: &str) -> Self {
        let mut widget = Self::new();
        widget.enter_scope(notice_id, title);
        widget
    }

    pub fn context(&self) -> &ChatContext {
        &self.context
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    fn push(&mut self, entry: ChatEntry) {
        self.entries.push(entry);
        if self.entries.len() > HISTORY_LIMIT {
            let excess = self.entries.len() - HISTORY_LIMIT;
            self.entries.drain(..excess);
        }
    }

    pub fn begin_send(&mut self, input: &str) -> Result<SendOutcome, SendRejected> {
        let message = input.trim();
        if message.is_empty() {
            return Ok(SendOutcome::Ignored);
        }
        if self.is_busy() {
            return Err(SendRejected::Busy);
        }

        if matches!(self.context, ChatContext::Scoped { .. }) && is_exit_keyword(message) {
            self.push(ChatEntry::user(message));
            self.exit_scope();
            return Ok(SendOutcome::ExitedScope);
        }

        let route = match &self.context {
            ChatContext::Idle => ChatRoute::General,
            ChatContext::Scoped { notice_id, .. } => ChatRoute::Notice(notice_id.clone()),
        };
        let ticket = self.sequence.issue();
        self.in_flight = Some(ticket);
        self.push(ChatEntry::user(message));
        self.push(ChatEntry { pending: true, ..ChatEntry::bot(PROCESSING_TEXT) });

        Ok(SendOutcome::Dispatch(PendingTurn { ticket, route, message: message.to_string() }))
    }

    /// Install the outcome of a dispatched turn. Returns `false` when the
    /// ticket is not the one in flight.
    pub fn complete(&mut self, ticket: Ticket, result: Result<ChatReply, ClientError>) -> bool {
        if self.in_flight != Some(ticket) || !self.sequence.is_current(ticket) {
            debug!(ticket = ticket.value(), "Discarding stale chat reply");
            return false;
        }
        self.in_flight = None;
        self.entries.retain(|e| !e.pending);

        let entry = match result {
            Ok(reply) => ChatEntry { options: reply.options, ..ChatEntry::bot(reply.reply) },
            Err(e) => {
                error!(error = %e, "Chat request failed");
                ChatEntry::bot(APOLOGY_TEXT)
            }
        };
        self.push(entry);
        true
    }

    /// Enter `Scoped` through an option offered by the bot.
    pub fn select_option(&mut self, option_id: &str) -> bool {
        let picked = self
            .entries
            .iter()
            .rev()
            .flat_map(|e| e.options.iter())
            .find(|o| o.id == option_id)
            .cloned();
        match picked {
            Some(option) => {
                self.enter_scope(&option.id, &option.titulo);
                true
            }
            None => false,
        }
    }

    pub fn enter_scope(&mut self, notice_id: &str, title: &str) {
        self.context = ChatContext::Scoped {
            notice_id: notice_id.to_string(),
            title: title.to_string(),
        };
        self.push(ChatEntry::bot(format!(
            "Agora estamos falando sobre o edital \"{title}\". Digite \"sair\" para voltar."
        )));
    }

    pub fn exit_scope(&mut self) {
        if let ChatContext::Scoped { title, .. } = std::mem::take(&mut self.context) {
            self.push(ChatEntry::bot(format!(
                "Você saiu do edital \"{title}\". Pode perguntar sobre qualquer edital."
            )));
        }
    }
}

/// Perform the request for a turn.
pub async fn dispatch(api: &dyn EditaisApi, turn: &PendingTurn) -> Result<ChatReply, ClientError> {
    match &turn.route {
        ChatRoute::General => api.chat(&turn.message).await,
        ChatRoute::Notice(id) => api.chat_about(id, &turn.message).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatched(outcome: Result<SendOutcome, SendRejected>) -> PendingTurn {
        match outcome {
            Ok(SendOutcome::Dispatch(turn)) => turn,
            other => panic!("expected a dispatch, got {other:?}"),
        }
    }

    fn reply(text: &str) -> ChatReply {
        ChatReply { reply: text.into(), options: vec![] }
    }

    #[test]
    fn test_exit_keyword_returns_to_general() {
        let mut widget = ChatWidget::scoped("7", "Inovação Tech");
        let turn = dispatched(widget.begin_send("qual o prazo?"));
        assert_eq!(turn.route, ChatRoute::Notice("7".into()));
        assert!(widget.complete(turn.ticket, Ok(reply("Até 10/03."))));

        assert_eq!(widget.begin_send("  SAIR "), Ok(SendOutcome::ExitedScope));
        assert_eq!(widget.context(), &ChatContext::Idle);

        let turn = dispatched(widget.begin_send("e agora?"));
        assert_eq!(turn.route, ChatRoute::General);
    }

    #[test]
    fn test_second_send_while_busy_is_rejected() {
        let mut widget = ChatWidget::new();
        let turn = dispatched(widget.begin_send("oi"));
        assert!(widget.is_busy());
        assert_eq!(widget.begin_send("tem alguém?"), Err(SendRejected::Busy));
        assert_eq!(widget.entries().iter().filter(|e| e.pending).count(), 1);

        widget.complete(turn.ticket, Ok(reply("Olá!")));
        assert!(!widget.is_busy());
        assert!(widget.entries().iter().all(|e| !e.pending));
        assert_eq!(widget.entries().last().map(|e| e.text.as_str()), Some("Olá!"));
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let mut widget = ChatWidget::new();
        let before = widget.entries().len();
        assert_eq!(widget.begin_send("   "), Ok(SendOutcome::Ignored));
        assert_eq!(widget.entries().len(), before);
        assert!(!widget.is_busy());
    }

    #[test]
    fn test_error_appends_apology() {
        let mut widget = ChatWidget::new();
        let turn = dispatched(widget.begin_send("oi"));
        let err = ClientError::Status { status: 500, detail: "boom".into() };
        assert!(widget.complete(turn.ticket, Err(err)));
        let last = widget.entries().last().unwrap();
        assert_eq!(last.text, APOLOGY_TEXT);
        assert_eq!(last.speaker, Speaker::Bot);
    }

    #[test]
    fn test_option_selection_enters_scope() {
        let mut widget = ChatWidget::new();
        let turn = dispatched(widget.begin_send("editais de inovação"));
        widget.complete(
            turn.ticket,
            Ok(ChatReply {
                reply: "Encontrei:".into(),
                options: vec![ChatOption { id: "7".into(), titulo: "Inovação Tech".into() }],
            }),
        );

        assert!(!widget.select_option("99"));
        assert!(widget.select_option("7"));
        assert_eq!(
            widget.context(),
            &ChatContext::Scoped { notice_id: "7".into(), title: "Inovação Tech".into() }
        );
    }

    #[test]
    fn test_completed_ticket_is_not_applied_twice() {
        let mut widget = ChatWidget::new();
        let turn = dispatched(widget.begin_send("oi"));
        assert!(widget.complete(turn.ticket, Ok(reply("1"))));
        assert!(!widget.complete(turn.ticket, Ok(reply("2"))));
        assert_eq!(widget.entries().last().map(|e| e.text.as_str()), Some("1"));
    }

    #[test]
    fn test_history_is_capped() {
        let mut widget = ChatWidget::new();
        for i in 0..HISTORY_LIMIT {
            let turn = dispatched(widget.begin_send(&format!("pergunta {i}")));
            widget.complete(turn.ticket, Ok(reply(&format!("resposta {i}"))));
        }

        assert_eq!(widget.entries().len(), HISTORY_LIMIT);
        assert_ne!(widget.entries()[0].text, GREETING_TEXT);
        assert_eq!(
            widget.entries().last().map(|e| e.text.clone()),
            Some(format!("resposta {}", HISTORY_LIMIT - 1))
        );
    }

    #[test]
    fn test_exit_keyword_when_idle_is_a_normal_message() {
        let mut widget = ChatWidget::new();
        let turn = dispatched(widget.begin_send("voltar"));
        assert_eq!(turn.route, ChatRoute::General);
    }
}
