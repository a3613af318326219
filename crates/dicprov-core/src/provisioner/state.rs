//! Per-language provisioning state.

use crate::downloads::DownloadId;
use std::collections::{HashMap, VecDeque};

/// Where one external dictionary stands.
///
/// ```text
/// NotRequested --request--> Downloading{id} --completed--> Storing{id} --> Stored
///      ^                         |                             |
///      +------ superseded -------+---------- copy failed ------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionaryState {
    NotRequested,
    /// The tracked download. At most one language is in this state.
    Downloading { id: DownloadId },
    /// Payload is being copied into the store; no new download may start.
    Storing { id: DownloadId },
    Stored,
}

/// Session state guarded by the provisioner's lock.
#[derive(Debug, Default)]
pub(super) struct Session {
    states: HashMap<String, DictionaryState>,
    /// Most recent jobs this provisioner asked the subsystem to remove.
    /// Events queued before the removal may still mention them.
    retired: VecDeque<DownloadId>,
}

/// Removed job ids remembered for filtering late events.
const RETIRED_CAPACITY: usize = 64;

impl Session {
    pub(super) fn state(&self, lang: &str) -> DictionaryState {
        self.states
            .get(lang)
            .copied()
            .unwrap_or(DictionaryState::NotRequested)
    }

    /// Moves `lang` to `state`. Entering `Downloading` demotes whichever
    /// other language was tracked, keeping a single tracked download.
    pub(super) fn set(&mut self, lang: &str, state: DictionaryState) {
        if let DictionaryState::Downloading { .. } = state {
            self.states.retain(|other, s| {
                other == lang || !matches!(s, DictionaryState::Downloading { .. })
            });
        }
        match state {
            DictionaryState::NotRequested => {
                self.states.remove(lang);
            }
            state => {
                self.states.insert(lang.to_string(), state);
            }
        }
    }

    /// Language and id of the tracked download, if any.
    pub(super) fn tracked(&self) -> Option<(&str, DownloadId)> {
        self.states.iter().find_map(|(lang, state)| match state {
            DictionaryState::Downloading { id } => Some((lang.as_str(), *id)),
            _ => None,
        })
    }

    pub(super) fn retire(&mut self, id: DownloadId) {
        if self.retired.contains(&id) {
            return;
        }
        if self.retired.len() == RETIRED_CAPACITY {
            self.retired.pop_front();
        }
        self.retired.push_back(id);
    }

    pub(super) fn is_retired(&self, id: DownloadId) -> bool {
        self.retired.contains(&id)
    }

    /// Forgets the tracked download, returning its id.
    pub(super) fn clear_tracked(&mut self) -> Option<DownloadId> {
        let (lang, id) = self.tracked().map(|(lang, id)| (lang.to_string(), id))?;
        self.states.remove(&lang);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_language_is_not_requested() {
        let session = Session::default();
        assert_eq!(session.state("nl"), DictionaryState::NotRequested);
        assert!(session.tracked().is_none());
    }

    #[test]
    fn only_one_download_is_tracked() {
        let mut session = Session::default();
        session.set("nl", DictionaryState::Downloading { id: DownloadId(1) });
        session.set("fr", DictionaryState::Downloading { id: DownloadId(2) });
        assert_eq!(session.state("nl"), DictionaryState::NotRequested);
        assert_eq!(session.tracked(), Some(("fr", DownloadId(2))));
    }

    #[test]
    fn stored_and_storing_survive_new_tracking() {
        let mut session = Session::default();
        session.set("de", DictionaryState::Stored);
        session.set("nl", DictionaryState::Storing { id: DownloadId(3) });
        session.set("fr", DictionaryState::Downloading { id: DownloadId(4) });
        assert_eq!(session.state("de"), DictionaryState::Stored);
        assert_eq!(session.state("nl"), DictionaryState::Storing { id: DownloadId(3) });
    }

    #[test]
    fn clear_tracked_returns_id() {
        let mut session = Session::default();
        assert_eq!(session.clear_tracked(), None);
        session.set("nl", DictionaryState::Downloading { id: DownloadId(9) });
        assert_eq!(session.clear_tracked(), Some(DownloadId(9)));
        assert_eq!(session.state("nl"), DictionaryState::NotRequested);
        assert!(session.tracked().is_none());
    }

    #[test]
    fn retired_ids_are_remembered() {
        let mut session = Session::default();
        assert!(!session.is_retired(DownloadId(5)));
        session.retire(DownloadId(5));
        assert!(session.is_retired(DownloadId(5)));
        assert!(!session.is_retired(DownloadId(6)));
    }

    #[test]
    fn retired_ids_are_bounded() {
        let mut session = Session::default();
        for n in 0..(RETIRED_CAPACITY as u64 + 10) {
            session.retire(DownloadId(n));
            session.retire(DownloadId(n));
        }
        assert_eq!(session.retired.len(), RETIRED_CAPACITY);
        assert!(!session.is_retired(DownloadId(0)));
        assert!(!session.is_retired(DownloadId(9)));
        assert!(session.is_retired(DownloadId(10)));
        assert!(session.is_retired(DownloadId(RETIRED_CAPACITY as u64 + 9)));
    }
}
