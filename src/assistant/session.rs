use super::conversation::Conversation;
use super::profile::Profile;
use super::prompt::build_system_prompt;
use crate::knowledge::KnowledgeBase;
use crate::llm::provider::ChatRequest;
use time::OffsetDateTime;

/// Conversation bookkeeping for one running assistant.
#[derive(Debug, Clone)]
pub struct ChatSession {
    profile: Profile,
    knowledge: KnowledgeBase,
    conversation: Conversation,
}

impl ChatSession {
    pub fn new(profile: Profile, knowledge: KnowledgeBase) -> Self {
        Self {
            profile,
            knowledge,
            conversation: Conversation::new(),
        }
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn system_prompt(&self, now: OffsetDateTime) -> String {
        build_system_prompt(self.profile, self.knowledge.text(), now)
    }

    /// Records the question and returns the request replaying the full history.
    pub fn prepare_turn(&mut self, question: &str, now: OffsetDateTime) -> ChatRequest {
        self.conversation.push_user(question);
        ChatRequest {
            system: self.system_prompt(now),
            messages: self.conversation.messages().to_vec(),
        }
    }

    pub fn record_answer(&mut self, text: &str) {
        self.conversation.push_assistant(text);
    }

    pub fn clear(&mut self) {
        self.conversation.clear();
    }

    /// Returns `true` when the profile changed. A change starts a fresh conversation.
    pub fn switch_profile(&mut self, profile: Profile) -> bool {
        if self.profile == profile {
            return false;
        }

        self.profile = profile;
        self.conversation.clear();
        true
    }
}
