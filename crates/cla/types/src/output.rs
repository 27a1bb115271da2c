//! Per-event output handed back to the hosting process.

use crate::check::Check;
use crate::key::ClaKey;
use crate::record::SignedCla;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Overall outcome of handling one event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conclusion {
    Success,
    #[default]
    Neutral,
    Failure,
}

impl Conclusion {
    /// Combine outcomes of several handlers; a failure dominates, then success.
    pub fn combine(self, other: Conclusion) -> Conclusion {
        match (self, other) {
            (Conclusion::Failure, _) | (_, Conclusion::Failure) => Conclusion::Failure,
            (Conclusion::Success, _) | (_, Conclusion::Success) => Conclusion::Success,
            _ => Conclusion::Neutral,
        }
    }
}

impl std::fmt::Display for Conclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Conclusion::Success => write!(f, "success"),
            Conclusion::Neutral => write!(f, "neutral"),
            Conclusion::Failure => write!(f, "failure"),
        }
    }
}

/// Rendered markdown plus whether earlier bot comments in the thread stay.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedComment {
    pub markdown: String,
    pub keep_history: bool,
}

impl RenderedComment {
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            keep_history: false,
        }
    }

    /// Marker telling the host to leave the existing thread untouched.
    pub fn keep_history_marker() -> Self {
        Self {
            markdown: String::new(),
            keep_history: true,
        }
    }

    pub fn keeping_history(mut self) -> Self {
        self.keep_history = true;
        self
    }
}

/// Check output attached to the event's own commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRequest {
    pub title: String,
    pub summary: String,
    pub conclusion: Conclusion,
}

/// Value persisted under a [`ClaKey`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Cla(SignedCla),
    Checks(Vec<Check>),
}

/// Batch of key/value writes produced by one event.
///
/// Later writes to the same key replace earlier ones, mirroring the
/// last-writer-wins store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateMutations(BTreeMap<ClaKey, StateValue>);

impl StateMutations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_cla(&mut self, key: ClaKey, cla: SignedCla) {
        self.0.insert(key, StateValue::Cla(cla));
    }

    pub fn put_checks(&mut self, key: ClaKey, checks: Vec<Check>) {
        self.0.insert(key, StateValue::Checks(checks));
    }

    pub fn get(&self, key: &ClaKey) -> Option<&StateValue> {
        self.0.get(key)
    }

    pub fn cla(&self, key: &ClaKey) -> Option<&SignedCla> {
        match self.0.get(key) {
            Some(StateValue::Cla(cla)) => Some(cla),
            _ => None,
        }
    }

    pub fn checks(&self, key: &ClaKey) -> Option<&[Check]> {
        match self.0.get(key) {
            Some(StateValue::Checks(checks)) => Some(checks),
            _ => None,
        }
    }

    /// Append `other`, its writes taking precedence.
    pub fn extend(&mut self, other: StateMutations) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ClaKey, &StateValue)> {
        self.0.iter()
    }
}

impl IntoIterator for StateMutations {
    type Item = (ClaKey, StateValue);
    type IntoIter = std::collections::btree_map::IntoIter<ClaKey, StateValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Output of one event: conclusion, optional comment and check, and writes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppOutput {
    pub conclusion: Conclusion,
    pub comment: Option<RenderedComment>,
    pub check_request: Option<CheckRequest>,
    pub state_mutations: StateMutations,
}

impl AppOutput {
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn success() -> Self {
        Self {
            conclusion: Conclusion::Success,
            ..Self::default()
        }
    }

    /// Fold the output of another handler for the same event into this one.
    pub fn merge(&mut self, other: AppOutput) {
        self.conclusion = self.conclusion.combine(other.conclusion);
        if other.comment.is_some() {
            self.comment = other.comment;
        }
        if other.check_request.is_some() {
            self.check_request = other.check_request;
        }
        self.state_mutations.extend(other.state_mutations);
    }
}
