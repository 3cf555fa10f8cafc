//! Chat session state.
//!
//! [`SessionStore`] owns everything a chat keeps between interactions: the
//! transcript, the named snapshots saved during this process, the request
//! configuration, and the attachment waiting to go out with the next request.

use std::collections::BTreeMap;

use time::OffsetDateTime;

use crate::error::{Error, Result};
use crate::types::{Attachment, Message, MessageRole, Model};

/// Settings applied to the next outgoing request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionConfig {
    /// The model to call.
    pub model: Model,

    /// Reasoning token budget. Zero disables thinking.
    pub thinking_budget: u32,

    /// Text placed ahead of every prompt.
    pub system_prompt: Option<String>,
}

/// The state of one chat session.
///
/// Saved chats are deep copies; later edits to the live transcript never
/// reach them, and loading one never aliases it.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    messages: Vec<Message>,
    saved: BTreeMap<String, Vec<Message>>,
    config: SessionConfig,
    attachment: Option<Attachment>,
}

impl SessionStore {
    /// Creates an empty session with the given configuration.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The transcript, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Adds a message to the end of the transcript, stamped with the current UTC time.
    pub fn append(&mut self, message: Message) -> &Message {
        let message = message.with_timestamp(OffsetDateTime::now_utc());
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Removes the most recent message with the given role.
    ///
    /// Returns the removed message, or `None` (leaving the transcript
    /// untouched) if no message has that role.
    pub fn remove_last(&mut self, role: MessageRole) -> Option<Message> {
        let idx = self.messages.iter().rposition(|m| m.role == role)?;
        Some(self.messages.remove(idx))
    }

    /// The most recent user message, if any.
    pub fn last_user_message(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
    }

    /// Clears the conversation history and drops any pending attachment.
    ///
    /// Saved chats and configuration are kept.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.attachment = None;
    }

    /// Replaces the whole transcript, e.g. after an import.
    pub fn replace_history(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    /// Saves a copy of the transcript under `name`, replacing any earlier save
    /// with the same name.
    ///
    /// # Errors
    ///
    /// Returns a validation error, and changes nothing, if `name` is blank.
    pub fn save(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation(
                "chat name must not be empty",
                Some("name".to_string()),
            ));
        }
        self.saved.insert(name.to_string(), self.messages.clone());
        Ok(())
    }

    /// Replaces the transcript with a copy of the chat saved under `name`.
    ///
    /// Returns `false`, leaving the transcript untouched, when no such chat exists.
    pub fn load(&mut self, name: &str) -> bool {
        match self.saved.get(name.trim()) {
            Some(snapshot) => {
                self.messages = snapshot.clone();
                true
            }
            None => false,
        }
    }

    /// Names of saved chats, sorted.
    pub fn saved_names(&self) -> impl Iterator<Item = &str> {
        self.saved.keys().map(String::as_str)
    }

    /// The active request configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Changes the model used for the next request.
    pub fn set_model(&mut self, model: Model) {
        self.config.model = model;
    }

    /// Sets the thinking budget for the next request.
    pub fn set_thinking_budget(&mut self, budget: u32) {
        self.config.thinking_budget = budget;
    }

    /// Sets or clears the system prompt.
    pub fn set_system_prompt(&mut self, prompt: Option<String>) {
        self.config.system_prompt = prompt.filter(|p| !p.trim().is_empty());
    }

    /// Holds an attachment for the next request, returning any it replaces.
    pub fn attach(&mut self, attachment: Attachment) -> Option<Attachment> {
        self.attachment.replace(attachment)
    }

    /// The pending attachment, if any.
    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Removes and returns the pending attachment.
    pub fn take_attachment(&mut self) -> Option<Attachment> {
        self.attachment.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ImageMediaType, KnownModel};

    fn contents(store: &SessionStore) -> Vec<(MessageRole, &str)> {
        store
            .messages()
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect()
    }

    #[test]
    fn new_session_empty() {
        let store = SessionStore::new(SessionConfig::default());
        assert_eq!(store.message_count(), 0);
        assert!(store.attachment().is_none());
        assert_eq!(store.saved_names().count(), 0);
    }

    #[test]
    fn append_preserves_order_and_stamps() {
        let mut store = SessionStore::default();
        store.append(Message::user("one"));
        store.append(Message::assistant("two"));
        store.append(Message::user("three"));
        assert_eq!(
            contents(&store),
            vec![
                (MessageRole::User, "one"),
                (MessageRole::Assistant, "two"),
                (MessageRole::User, "three"),
            ]
        );
        assert!(store.messages().iter().all(|m| m.ts.is_some()));
    }

    #[test]
    fn remove_last_assistant() {
        let mut store = SessionStore::default();
        store.append(Message::user("q1"));
        store.append(Message::assistant("a1"));
        store.append(Message::user("q2"));
        store.append(Message::assistant("a2"));

        let removed = store.remove_last(MessageRole::Assistant).unwrap();
        assert_eq!(removed.content, "a2");
        assert_eq!(store.message_count(), 3);
        assert_eq!(store.last_user_message().unwrap().content, "q2");
    }

    #[test]
    fn remove_last_skips_trailing_other_role() {
        let mut store = SessionStore::default();
        store.append(Message::assistant("a1"));
        store.append(Message::user("q2"));
        store.remove_last(MessageRole::Assistant);
        assert_eq!(contents(&store), vec![(MessageRole::User, "q2")]);
    }

    #[test]
    fn remove_last_without_match_is_noop() {
        let mut store = SessionStore::default();
        store.append(Message::user("only"));
        assert!(store.remove_last(MessageRole::Assistant).is_none());
        assert_eq!(contents(&store), vec![(MessageRole::User, "only")]);
    }

    #[test]
    fn clear_drops_history_and_attachment() {
        let mut store = SessionStore::default();
        store.append(Message::user("x"));
        store.attach(Attachment::Image {
            bytes: vec![0],
            media_type: ImageMediaType::Gif,
        });
        store.save("kept").unwrap();
        store.clear();
        assert_eq!(store.message_count(), 0);
        assert!(store.attachment().is_none());
        assert_eq!(store.saved_names().collect::<Vec<_>>(), vec!["kept"]);
    }

    #[test]
    fn save_rejects_blank_name() {
        let mut store = SessionStore::default();
        store.append(Message::user("x"));
        let err = store.save("   ").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.saved_names().count(), 0);
    }

    #[test]
    fn save_then_load_is_isolated() {
        let mut store = SessionStore::default();
        store.append(Message::user("q"));
        store.append(Message::assistant("a"));
        store.save("first").unwrap();
        let saved = store.messages().to_vec();

        store.append(Message::user("later"));
        store.messages.get_mut(0).unwrap().content = "mutated".to_string();

        assert!(store.load("first"));
        assert_eq!(store.messages(), saved.as_slice());

        // Mutating the loaded copy must not reach the snapshot
        store.append(Message::user("after load"));
        assert!(store.load("first"));
        assert_eq!(store.messages(), saved.as_slice());
    }

    #[test]
    fn save_overwrites_same_name() {
        let mut store = SessionStore::default();
        store.append(Message::user("v1"));
        store.save("chat").unwrap();
        store.append(Message::user("v2"));
        store.save("chat").unwrap();
        store.clear();
        assert!(store.load("chat"));
        assert_eq!(store.message_count(), 2);
        assert_eq!(store.saved_names().count(), 1);
    }

    #[test]
    fn load_unknown_is_noop() {
        let mut store = SessionStore::default();
        store.append(Message::user("x"));
        assert!(!store.load("missing"));
        assert_eq!(store.message_count(), 1);
    }

    #[test]
    fn saved_names_are_sorted() {
        let mut store = SessionStore::default();
        store.save("zeta").unwrap();
        store.save("alpha").unwrap();
        assert_eq!(store.saved_names().collect::<Vec<_>>(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn config_setters() {
        let mut store = SessionStore::default();
        assert_eq!(store.config().model, Model::Known(KnownModel::Gemini25Flash));
        assert_eq!(store.config().thinking_budget, 0);

        store.set_model(Model::Known(KnownModel::Gemini25Pro));
        store.set_thinking_budget(2048);
        store.set_system_prompt(Some("Be helpful".to_string()));
        assert_eq!(store.config().model, Model::Known(KnownModel::Gemini25Pro));
        assert_eq!(store.config().thinking_budget, 2048);
        assert_eq!(store.config().system_prompt.as_deref(), Some("Be helpful"));

        store.set_system_prompt(Some("  ".to_string()));
        assert!(store.config().system_prompt.is_none());
    }

    #[test]
    fn attachment_is_taken_once() {
        let mut store = SessionStore::default();
        assert!(store.attach(Attachment::Text("a".to_string())).is_none());
        let previous = store.attach(Attachment::Text("b".to_string()));
        assert_eq!(previous, Some(Attachment::Text("a".to_string())));
        assert_eq!(store.take_attachment(), Some(Attachment::Text("b".to_string())));
        assert!(store.take_attachment().is_none());
    }
}
