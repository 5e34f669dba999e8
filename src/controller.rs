// Coordinates the selected date, the in-flight fetch, results and favorites
use crate::feed::FetchError;
use crate::model::Entry;
use crate::storage::FavoritesStore;
use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use tracing::{debug, info, warn};

/// A fetch the caller must run and report back through [`Controller::complete_fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub seq: u64,
    pub month: u32,
    pub day: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    Failed,
    /// The response belonged to a superseded selection and was dropped.
    Stale,
}

#[derive(Debug)]
pub struct Controller {
    store: FavoritesStore,
    selected: Option<NaiveDate>,
    results: Vec<Entry>,
    favorites: Vec<Entry>,
    loading: bool,
    seq: u64,
    error: Option<FetchError>,
}

impl Controller {
    /// Loads favorites from `store`. Missing or unreadable data starts empty.
    pub fn new(store: FavoritesStore) -> Self {
        let mut favorites: Vec<Entry> = Vec::new();
        for entry in store.load().unwrap_or_default() {
            if !favorites.contains(&entry) {
                favorites.push(entry);
            }
        }
        info!(count = favorites.len(), "favorites loaded");
        Self {
            store,
            selected: None,
            results: vec![],
            favorites,
            loading: false,
            seq: 0,
            error: None,
        }
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected
    }

    pub fn results(&self) -> &[Entry] {
        &self.results
    }

    pub fn favorites(&self) -> &[Entry] {
        &self.favorites
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_favorite(&self, entry: &Entry) -> bool {
        self.favorites.contains(entry)
    }

    pub fn pending_error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Changes the selection. Any fetch still in flight is superseded.
    pub fn select_date(&mut self, date: Option<NaiveDate>) -> Option<FetchRequest> {
        self.selected = date;
        self.results.clear();
        self.seq += 1;

        let Some(d) = date else {
            self.loading = false;
            return None;
        };
        self.loading = true;
        let req = FetchRequest {
            seq: self.seq,
            month: d.month(),
            day: d.day(),
        };
        debug!(?req, "date selected");
        Some(req)
    }

    pub fn complete_fetch(
        &mut self,
        seq: u64,
        outcome: Result<Vec<Entry>, FetchError>,
    ) -> FetchOutcome {
        if seq != self.seq {
            debug!(seq, current = self.seq, "dropping stale fetch result");
            return FetchOutcome::Stale;
        }
        self.loading = false;
        match outcome {
            Ok(entries) => {
                self.results = entries;
                FetchOutcome::Applied
            }
            Err(e) => {
                warn!(error = %e, "fetching births failed");
                self.results.clear();
                self.error = Some(e);
                FetchOutcome::Failed
            }
        }
    }

    /// Flips membership of `entry` and writes the set through to the store.
    /// Returns the new membership. On a write error the in-memory change stands.
    pub fn toggle_favorite(&mut self, entry: &Entry) -> Result<bool> {
        let now_favorite = if let Some(pos) = self.favorites.iter().position(|f| f == entry) {
            self.favorites.remove(pos);
            false
        } else {
            self.favorites.push(entry.clone());
            true
        };
        self.store.save(&self.favorites)?;
        Ok(now_favorite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn controller() -> (tempfile::TempDir, Controller) {
        let dir = tempfile::tempdir().unwrap();
        let ctl = Controller::new(FavoritesStore::in_dir(dir.path()));
        (dir, ctl)
    }

    #[test]
    fn test_initial_state() {
        let (_dir, ctl) = controller();
        assert_eq!(ctl.selected_date(), None);
        assert!(ctl.results().is_empty());
        assert!(ctl.favorites().is_empty());
        assert!(!ctl.is_loading());
    }

    #[test]
    fn test_select_date_starts_loading() {
        let (_dir, mut ctl) = controller();
        let req = ctl.select_date(Some(date(2022, 1, 1))).unwrap();
        assert_eq!((req.month, req.day), (1, 1));
        assert!(ctl.is_loading());
        assert!(ctl.results().is_empty());

        let entries = vec![Entry::new("A", 1900), Entry::new("B", 1950)];
        assert_eq!(
            ctl.complete_fetch(req.seq, Ok(entries.clone())),
            FetchOutcome::Applied
        );
        assert!(!ctl.is_loading());
        assert_eq!(ctl.results(), entries.as_slice());
    }

    #[test]
    fn test_reselect_clears_results() {
        let (_dir, mut ctl) = controller();
        let req = ctl.select_date(Some(date(2022, 1, 1))).unwrap();
        ctl.complete_fetch(req.seq, Ok(vec![Entry::new("A", 1)]));
        ctl.select_date(Some(date(2022, 1, 2)));
        assert!(ctl.results().is_empty());
        assert!(ctl.is_loading());
    }

    #[test]
    fn test_late_response_for_superseded_date_is_ignored() {
        let (_dir, mut ctl) = controller();
        let first = ctl.select_date(Some(date(2022, 1, 1))).unwrap();
        let second = ctl.select_date(Some(date(2022, 3, 4))).unwrap();

        let d2 = vec![Entry::new("March", 2000)];
        assert_eq!(ctl.complete_fetch(second.seq, Ok(d2.clone())), FetchOutcome::Applied);
        assert_eq!(
            ctl.complete_fetch(first.seq, Ok(vec![Entry::new("January", 1999)])),
            FetchOutcome::Stale
        );
        assert_eq!(ctl.results(), d2.as_slice());
        assert!(!ctl.is_loading());
    }

    #[test]
    fn test_early_stale_response_keeps_loading() {
        let (_dir, mut ctl) = controller();
        let first = ctl.select_date(Some(date(2022, 1, 1))).unwrap();
        let second = ctl.select_date(Some(date(2022, 3, 4))).unwrap();

        assert_eq!(
            ctl.complete_fetch(first.seq, Err(FetchError::Status(500))),
            FetchOutcome::Stale
        );
        assert!(ctl.is_loading());
        assert!(ctl.pending_error().is_none());

        ctl.complete_fetch(second.seq, Ok(vec![Entry::new("March", 2000)]));
        assert!(!ctl.is_loading());
        assert_eq!(ctl.results(), &[Entry::new("March", 2000)]);
    }

    #[test]
    fn test_failure_clears_loading_and_records_error() {
        let (_dir, mut ctl) = controller();
        let req = ctl.select_date(Some(date(2022, 1, 1))).unwrap();
        let outcome = ctl.complete_fetch(req.seq, Err(FetchError::Network("down".into())));
        assert_eq!(outcome, FetchOutcome::Failed);
        assert!(!ctl.is_loading());
        assert!(ctl.results().is_empty());
        assert!(ctl.pending_error().is_some());
        ctl.dismiss_error();
        assert!(ctl.pending_error().is_none());
    }

    #[test]
    fn test_empty_feed_is_not_an_error() {
        let (_dir, mut ctl) = controller();
        let req = ctl.select_date(Some(date(2024, 2, 29))).unwrap();
        assert_eq!((req.month, req.day), (2, 29));
        assert_eq!(ctl.complete_fetch(req.seq, Ok(vec![])), FetchOutcome::Applied);
        assert!(ctl.results().is_empty());
        assert!(ctl.pending_error().is_none());
    }

    #[test]
    fn test_clearing_selection_supersedes_fetch() {
        let (_dir, mut ctl) = controller();
        let req = ctl.select_date(Some(date(2022, 1, 1))).unwrap();
        assert_eq!(ctl.select_date(None), None);
        assert!(!ctl.is_loading());
        assert_eq!(
            ctl.complete_fetch(req.seq, Ok(vec![Entry::new("A", 1)])),
            FetchOutcome::Stale
        );
        assert!(ctl.results().is_empty());
    }

    #[test]
    fn test_toggle_twice_is_identity() {
        let dir = tempfile::tempdir().unwrap();
        let store = FavoritesStore::in_dir(dir.path());
        store.save(&[Entry::new("Kept", 10)]).unwrap();
        let mut ctl = Controller::new(store.clone());

        let e = Entry::new("Ada", 1815);
        assert!(ctl.toggle_favorite(&e).unwrap());
        assert!(ctl.is_favorite(&e));
        assert_eq!(store.load().unwrap(), ctl.favorites());

        assert!(!ctl.toggle_favorite(&e).unwrap());
        assert_eq!(ctl.favorites(), &[Entry::new("Kept", 10)]);
        assert_eq!(store.load().unwrap(), vec![Entry::new("Kept", 10)]);
    }

    #[test]
    fn test_favorites_keep_insertion_order() {
        let (_dir, mut ctl) = controller();
        for (t, y) in [("c", 3), ("a", 1), ("b", 2)] {
            ctl.toggle_favorite(&Entry::new(t, y)).unwrap();
        }
        let texts: Vec<&str> = ctl.favorites().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_identity_is_text_and_year() {
        let (_dir, mut ctl) = controller();
        ctl.toggle_favorite(&Entry::new("Same", 1900)).unwrap();
        assert!(ctl.is_favorite(&Entry::new("Same", 1900)));
        assert!(!ctl.is_favorite(&Entry::new("Same", 1901)));
        assert!(!ctl.is_favorite(&Entry::new("Other", 1900)));
    }

    #[test]
    fn test_toggle_commutes_with_select_date() {
        let (_dir, mut ctl) = controller();
        let req = ctl.select_date(Some(date(2022, 1, 1))).unwrap();
        let e = Entry::new("A", 1);
        ctl.toggle_favorite(&e).unwrap();
        ctl.complete_fetch(req.seq, Ok(vec![e.clone()]));
        assert!(ctl.is_favorite(&ctl.results()[0]));
        ctl.select_date(Some(date(2022, 1, 2)));
        assert!(ctl.is_favorite(&e));
    }

    #[test]
    fn test_init_restores_saved_favorites() {
        let dir = tempfile::tempdir().unwrap();
        let e = Entry::new("Reloaded", 1900);
        {
            let mut ctl = Controller::new(FavoritesStore::in_dir(dir.path()));
            ctl.toggle_favorite(&e).unwrap();
        }
        let ctl = Controller::new(FavoritesStore::in_dir(dir.path()));
        assert_eq!(ctl.favorites(), &[e]);
    }

    #[test]
    fn test_init_ignores_corrupt_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FavoritesStore::in_dir(dir.path());
        std::fs::write(store.path(), "garbage").unwrap();
        let ctl = Controller::new(store);
        assert!(ctl.favorites().is_empty());
    }

    #[test]
    fn test_init_collapses_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let store = FavoritesStore::in_dir(dir.path());
        store
            .save(&[Entry::new("A", 1), Entry::new("A", 1), Entry::new("B", 2)])
            .unwrap();
        let ctl = Controller::new(store);
        assert_eq!(ctl.favorites(), &[Entry::new("A", 1), Entry::new("B", 2)]);
    }

    #[test]
    fn test_write_failure_keeps_memory_toggle() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the favorites file should be makes the rename fail.
        let store = FavoritesStore::in_dir(dir.path());
        std::fs::create_dir_all(store.path()).unwrap();
        let mut ctl = Controller::new(store);
        let e = Entry::new("A", 1);
        assert!(ctl.toggle_favorite(&e).is_err());
        assert!(ctl.is_favorite(&e));
    }
}
