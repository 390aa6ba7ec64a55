//! History policy: system-turn placement and length trimming.
//!
//! Every dialogue sent to the completion engine starts with exactly one
//! system turn and holds at most `max_length` turns in total. The system
//! turn is never counted against the dialogue portion of the cap and is
//! never trimmed; when the dialogue overflows, the oldest turns go first.
//!
//! [`HistoryPolicy::normalize`] applies these rules to an arbitrary turn
//! sequence. [`History`] is the bounded container used by the session store;
//! its `push` applies the same rules incrementally, so a stored history is
//! always normalized.

use crate::error::HistoryPolicyError;
use crate::message::Turn;
use std::collections::VecDeque;

/// Rules applied to a dialogue whenever it is extended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPolicy {
    max_length: usize,
    system_instruction: String,
}

impl HistoryPolicy {
    /// Creates a policy.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_length` is zero or the instruction is blank.
    pub fn new(
        max_length: usize,
        system_instruction: impl Into<String>,
    ) -> Result<Self, HistoryPolicyError> {
        let system_instruction = system_instruction.into();
        if max_length == 0 {
            return Err(HistoryPolicyError::ZeroMaxLength);
        }
        if system_instruction.trim().is_empty() {
            return Err(HistoryPolicyError::EmptySystemInstruction);
        }
        Ok(Self {
            max_length,
            system_instruction,
        })
    }

    /// Maximum number of turns, system turn included.
    #[must_use]
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Maximum number of non-system turns.
    #[must_use]
    pub fn dialogue_capacity(&self) -> usize {
        self.max_length - 1
    }

    /// The canonical system instruction text.
    #[must_use]
    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// Builds the canonical system turn.
    #[must_use]
    pub fn system_turn(&self) -> Turn {
        Turn::system(self.system_instruction.clone())
    }

    /// Normalizes a turn sequence.
    ///
    /// A leading system turn is kept as-is; otherwise the canonical one is
    /// inserted. System turns found after index 0 are dropped. The remaining
    /// turns are trimmed oldest-first to the dialogue capacity, keeping
    /// their relative order.
    #[must_use]
    pub fn normalize(&self, turns: Vec<Turn>) -> Vec<Turn> {
        let mut iter = turns.into_iter().peekable();
        let system = iter
            .next_if(Turn::is_system)
            .unwrap_or_else(|| self.system_turn());

        let rest: Vec<Turn> = iter.filter(|turn| !turn.is_system()).collect();
        let skip = rest.len().saturating_sub(self.dialogue_capacity());

        let mut normalized = Vec::with_capacity(1 + rest.len() - skip);
        normalized.push(system);
        normalized.extend(rest.into_iter().skip(skip));
        normalized
    }
}

/// A length-bounded dialogue that is normalized by construction.
///
/// An empty history has no turns at all. The first push installs the
/// canonical system turn ahead of the pushed turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    system: Option<Turn>,
    dialogue: VecDeque<Turn>,
}

impl History {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a history from an arbitrary turn sequence by normalizing it.
    #[must_use]
    pub fn from_turns(turns: Vec<Turn>, policy: &HistoryPolicy) -> Self {
        let mut normalized = policy.normalize(turns).into_iter();
        Self {
            system: normalized.next(),
            dialogue: normalized.collect(),
        }
    }

    /// Appends a turn and trims the dialogue to the policy's capacity.
    ///
    /// System turns are not appended: the history keeps the single system
    /// turn it already has. Returns the number of turns evicted.
    pub fn push(&mut self, turn: Turn, policy: &HistoryPolicy) -> usize {
        if self.system.is_none() {
            self.system = Some(policy.system_turn());
        }

        if turn.is_system() {
            tracing::debug!("dropping system turn appended after index 0");
            return 0;
        }

        self.dialogue.push_back(turn);

        let mut evicted = 0;
        while self.dialogue.len() > policy.dialogue_capacity() {
            self.dialogue.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// Returns the turns in order, system turn first.
    #[must_use]
    pub fn turns(&self) -> Vec<Turn> {
        self.system
            .iter()
            .chain(self.dialogue.iter())
            .cloned()
            .collect()
    }

    /// Returns the total number of turns.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.system.is_some()) + self.dialogue.len()
    }

    /// Returns true if the history holds no turns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.system.is_none()
    }
}
