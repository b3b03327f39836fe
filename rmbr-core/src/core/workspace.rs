//! The in-memory workspace store: pages, boards and cards plus UI scalars.

use crate::{
    Board, Card, CardUpdate, Column, ColumnColor, DeleteResult, Document, Ignored, Outcome, Page,
    PageUpdate, Result, Snapshot, Storage, StoreSettings,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use uuid::Uuid;

/// A broken cross-reference found by [`WorkspaceStore::check_integrity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IntegrityViolation {
    /// A page names a parent that does not exist.
    #[serde(rename_all = "camelCase")]
    DanglingParent { page_id: String, parent_id: String },
    /// A page names a parent whose `children` does not list it.
    #[serde(rename_all = "camelCase")]
    NotListedByParent { page_id: String, parent_id: String },
    /// A parent lists a child that is missing or points elsewhere.
    #[serde(rename_all = "camelCase")]
    StrayChild { parent_id: String, child_id: String },
    /// A parent lists the same child more than once.
    #[serde(rename_all = "camelCase")]
    DuplicateChild { parent_id: String, child_id: String },
    /// Following parent links from this page loops back on itself.
    #[serde(rename_all = "camelCase")]
    PageCycle { page_id: String },
    /// A board is attached to a page that no longer exists.
    #[serde(rename_all = "camelCase")]
    OrphanedBoard { board_id: String, page_id: String },
    /// More than one board is attached to the same page.
    #[serde(rename_all = "camelCase")]
    DuplicateBoard { page_id: String, board_ids: Vec<String> },
    /// A column lists a card that does not exist.
    #[serde(rename_all = "camelCase")]
    UnknownCard { column_id: String, card_id: String },
    /// A column lists a card whose `column_id` or `board_id` names somewhere else.
    #[serde(rename_all = "camelCase")]
    MisplacedCard { column_id: String, card_id: String },
    /// A card appears more than once across the columns of its board.
    #[serde(rename_all = "camelCase")]
    CardListedTwice { card_id: String, occurrences: usize },
    /// A card whose board exists is not listed by any of its columns.
    #[serde(rename_all = "camelCase")]
    UnlistedCard { card_id: String },
    /// A card references a board that does not exist.
    #[serde(rename_all = "camelCase")]
    CardWithoutBoard { card_id: String, board_id: String },
}

struct Persistence {
    storage: Storage,
    key: String,
}

/// The single owner of every page, board and card in a workspace.
///
/// All mutations go through `&mut self` methods, so each one runs to
/// completion before anything else can observe the store. Mutations that
/// address an unknown id leave the store untouched and report
/// [`Outcome::Ignored`].
///
/// When opened over a [`Storage`], the store writes its [`Snapshot`] after
/// every applied mutation. Write failures are logged, never returned.
pub struct WorkspaceStore {
    pages: BTreeMap<String, Page>,
    boards: BTreeMap<String, Board>,
    cards: BTreeMap<String, Card>,
    active_page: Option<String>,
    sidebar_open: bool,
    persistence: Option<Persistence>,
}

impl Default for WorkspaceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceStore {
    /// Creates an empty, unpersisted store with the sidebar open.
    pub fn new() -> Self {
        Self::from_snapshot(Snapshot::default())
    }

    /// Creates an unpersisted store holding `snapshot`.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            pages: snapshot.pages,
            boards: snapshot.boards,
            cards: snapshot.cards,
            active_page: snapshot.active_page,
            sidebar_open: snapshot.sidebar_open,
            persistence: None,
        }
    }

    /// Opens a store persisted in `storage` under `key`.
    ///
    /// Starts empty if nothing has been saved under `key` yet.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RmbrError::Database`] if the stored value cannot be
    /// read, or [`crate::RmbrError::Json`] /
    /// [`crate::RmbrError::UnsupportedSnapshotVersion`] if it does not match
    /// the current snapshot schema.
    pub fn open(storage: Storage, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let snapshot = match storage.load_snapshot(&key)? {
            Some(snapshot) => {
                log::info!(
                    "Loaded workspace '{key}' ({} pages, {} boards, {} cards)",
                    snapshot.pages.len(),
                    snapshot.boards.len(),
                    snapshot.cards.len()
                );
                snapshot
            }
            None => {
                log::info!("No saved workspace under '{key}', starting empty");
                Snapshot::default()
            }
        };
        let mut store = Self::from_snapshot(snapshot);
        store.persistence = Some(Persistence { storage, key });
        Ok(store)
    }

    /// Opens the store described by `settings`, creating the storage file
    /// and its directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RmbrError::Io`] if the directory cannot be created,
    /// plus everything [`WorkspaceStore::open`] can return.
    pub fn from_settings(settings: &StoreSettings) -> Result<Self> {
        let path = Path::new(&settings.storage_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let storage = Storage::create(path)?;
        let fresh = storage.load_snapshot(&settings.persist_key)?.is_none();
        let mut store = Self::open(storage, settings.persist_key.clone())?;
        if fresh {
            store.sidebar_open = settings.sidebar_open_by_default;
        }
        Ok(store)
    }

    /// Returns a copy of the complete store state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pages: self.pages.clone(),
            boards: self.boards.clone(),
            cards: self.cards.clone(),
            active_page: self.active_page.clone(),
            sidebar_open: self.sidebar_open,
        }
    }

    /// Replaces the whole store state with `snapshot`.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.pages = snapshot.pages;
        self.boards = snapshot.boards;
        self.cards = snapshot.cards;
        self.active_page = snapshot.active_page;
        self.sidebar_open = snapshot.sidebar_open;

        let violations = self.check_integrity();
        if !violations.is_empty() {
            log::warn!("Restored snapshot has {} integrity violations", violations.len());
        }
        self.persist();
    }

    // Queries

    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.get(id)
    }

    pub fn board(&self, id: &str) -> Option<&Board> {
        self.boards.get(id)
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.get(id)
    }

    pub fn pages(&self) -> &BTreeMap<String, Page> {
        &self.pages
    }

    pub fn boards(&self) -> &BTreeMap<String, Board> {
        &self.boards
    }

    pub fn cards(&self) -> &BTreeMap<String, Card> {
        &self.cards
    }

    pub fn active_page(&self) -> Option<&str> {
        self.active_page.as_deref()
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    /// Returns the pages with no parent, oldest first.
    pub fn root_pages(&self) -> Vec<&Page> {
        let mut roots: Vec<&Page> = self
            .pages
            .values()
            .filter(|p| p.parent_id.is_none())
            .collect();
        roots.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        roots
    }

    /// Returns the children of `parent_id` in order, skipping ids that no
    /// longer resolve. Empty if the parent is unknown.
    pub fn child_pages(&self, parent_id: &str) -> Vec<&Page> {
        self.pages
            .get(parent_id)
            .map(|parent| {
                parent
                    .children
                    .iter()
                    .filter_map(|id| self.pages.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the board attached to `page_id`, if any.
    pub fn board_for_page(&self, page_id: &str) -> Option<&Board> {
        self.boards.values().find(|b| b.page_id == page_id)
    }

    /// Returns the cards of one column in display order, skipping ids that
    /// no longer resolve.
    pub fn column_cards(&self, board_id: &str, column_id: &str) -> Vec<&Card> {
        self.boards
            .get(board_id)
            .and_then(|b| b.column(column_id))
            .map(|column| {
                column
                    .card_ids
                    .iter()
                    .filter_map(|id| self.cards.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    // Pages

    /// Creates an "Untitled" page and makes it the active page.
    ///
    /// With a `parent_id` that resolves, the new page is appended to that
    /// parent's children. An unresolved `parent_id` yields a root page.
    pub fn create_page(&mut self, parent_id: Option<&str>) -> String {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let parent_id = match parent_id {
            Some(pid) if self.pages.contains_key(pid) => Some(pid.to_string()),
            Some(pid) => {
                log::warn!("create_page: parent {pid} not found, creating {id} as a root page");
                None
            }
            None => None,
        };

        if let Some(parent) = parent_id.as_deref().and_then(|pid| self.pages.get_mut(pid)) {
            parent.children.push(id.clone());
        }
        self.pages
            .insert(id.clone(), Page::new(id.clone(), parent_id, now));
        self.active_page = Some(id.clone());

        log::debug!("create_page: {id}");
        self.persist();
        id
    }

    /// Merges `update` into page `id` and refreshes `updated_at`.
    pub fn update_page(&mut self, id: &str, update: PageUpdate) -> Outcome {
        let Some(page) = self.pages.get_mut(id) else {
            return ignore("update_page", Ignored::MissingPage(id.to_string()));
        };
        page.apply(update, Utc::now());
        self.applied("update_page", id, ())
    }

    /// Replaces the content of page `id` wholesale.
    pub fn update_page_content(&mut self, id: &str, content: Document) -> Outcome {
        self.update_page(id, PageUpdate::default().with_content(content))
    }

    /// Deletes page `id` and all of its descendants.
    ///
    /// The page is first unlinked from its parent. Descendants are removed
    /// depth-first; each page's child list is taken as it is removed, so no
    /// lookup ever runs against an already removed entry. Boards and cards are
    /// not touched. If the active page was among the removed pages, the
    /// active page is cleared.
    pub fn delete_page(&mut self, id: &str) -> Outcome<DeleteResult> {
        let Some(parent_id) = self.pages.get(id).map(|p| p.parent_id.clone()) else {
            return ignore("delete_page", Ignored::MissingPage(id.to_string()));
        };

        if let Some(parent) = parent_id.and_then(|pid| self.pages.get_mut(&pid)) {
            parent.children.retain(|c| c != id);
        }

        let mut affected_ids = Vec::new();
        remove_subtree(&mut self.pages, id, &mut affected_ids);

        if self
            .active_page
            .as_ref()
            .is_some_and(|active| affected_ids.contains(active))
        {
            self.active_page = None;
        }

        let result = DeleteResult {
            deleted_count: affected_ids.len(),
            affected_ids,
        };
        self.applied("delete_page", id, result)
    }

    /// Moves page `id` under `new_parent` (or to the root level) at `index`.
    ///
    /// `index` is clamped to the end of the new parent's children and is
    /// ignored at the root level, where pages are ordered by creation time.
    /// Moving a page under itself or one of its descendants is rejected.
    pub fn move_page(&mut self, id: &str, new_parent: Option<&str>, index: usize) -> Outcome {
        let Some(old_parent) = self.pages.get(id).map(|p| p.parent_id.clone()) else {
            return ignore("move_page", Ignored::MissingPage(id.to_string()));
        };

        if let Some(pid) = new_parent {
            if !self.pages.contains_key(pid) {
                return ignore("move_page", Ignored::MissingPage(pid.to_string()));
            }
            if self.is_self_or_descendant(pid, id) {
                return ignore(
                    "move_page",
                    Ignored::WouldCreateCycle {
                        page_id: id.to_string(),
                        parent_id: pid.to_string(),
                    },
                );
            }
        }

        if let Some(parent) = old_parent.and_then(|pid| self.pages.get_mut(&pid)) {
            parent.children.retain(|c| c != id);
        }
        if let Some(parent) = new_parent.and_then(|pid| self.pages.get_mut(pid)) {
            let at = index.min(parent.children.len());
            parent.children.insert(at, id.to_string());
        }

        let now = Utc::now();
        if let Some(page) = self.pages.get_mut(id) {
            page.parent_id = new_parent.map(str::to_string);
            page.updated_at = now;
        }
        self.applied("move_page", id, ())
    }

    /// Walks parent links up from `candidate`; true if `ancestor` is reached.
    fn is_self_or_descendant(&self, candidate: &str, ancestor: &str) -> bool {
        let mut current = Some(candidate);
        // Bounded so a corrupted (cyclic) snapshot cannot loop forever.
        for _ in 0..=self.pages.len() {
            match current {
                Some(pid) if pid == ancestor => return true,
                Some(pid) => current = self.pages.get(pid).and_then(|p| p.parent_id.as_deref()),
                None => return false,
            }
        }
        true
    }

    // Boards

    /// Attaches a board with the "To Do" / "In Progress" / "Done" columns to
    /// `page_id`. A page carries at most one board.
    pub fn create_board(&mut self, page_id: &str) -> Outcome<String> {
        if !self.pages.contains_key(page_id) {
            return ignore("create_board", Ignored::MissingPage(page_id.to_string()));
        }
        if let Some(existing) = self.board_for_page(page_id) {
            let reason = Ignored::BoardAlreadyAttached {
                page_id: page_id.to_string(),
                board_id: existing.id.clone(),
            };
            return ignore("create_board", reason);
        }

        let id = Uuid::new_v4().to_string();
        self.boards
            .insert(id.clone(), Board::seeded(id.clone(), page_id.to_string()));
        self.applied("create_board", &id, id.clone())
    }

    /// Appends an empty gray column titled `title`; returns its id.
    pub fn add_column(&mut self, board_id: &str, title: &str) -> Outcome<String> {
        let Some(board) = self.boards.get_mut(board_id) else {
            return ignore("add_column", Ignored::MissingBoard(board_id.to_string()));
        };
        let column = Column::new(title, ColumnColor::default());
        let column_id = column.id.clone();
        board.columns.push(column);
        self.applied("add_column", board_id, column_id)
    }

    /// Moves a card from `from_column_id` into `to_column_id` at `new_index`.
    ///
    /// An index past the end appends. Both columns must belong to the card's
    /// board, and the source column must currently hold the card; otherwise
    /// nothing changes. Moving within one column reorders it.
    pub fn move_card(
        &mut self,
        card_id: &str,
        from_column_id: &str,
        to_column_id: &str,
        new_index: usize,
    ) -> Outcome {
        let Some(card) = self.cards.get_mut(card_id) else {
            return ignore("move_card", Ignored::MissingCard(card_id.to_string()));
        };
        let Some(board) = self.boards.get_mut(&card.board_id) else {
            return ignore("move_card", Ignored::MissingBoard(card.board_id.clone()));
        };
        if board.column(to_column_id).is_none() {
            return ignore("move_card", Ignored::MissingColumn(to_column_id.to_string()));
        }
        let Some(from) = board.column_mut(from_column_id) else {
            return ignore("move_card", Ignored::MissingColumn(from_column_id.to_string()));
        };
        if !from.contains(card_id) {
            let reason = Ignored::CardNotInColumn {
                card_id: card_id.to_string(),
                column_id: from_column_id.to_string(),
            };
            return ignore("move_card", reason);
        }

        from.card_ids.retain(|id| id != card_id);
        if let Some(to) = board.column_mut(to_column_id) {
            let at = new_index.min(to.card_ids.len());
            to.card_ids.insert(at, card_id.to_string());
        }
        card.column_id = to_column_id.to_string();

        self.applied("move_card", card_id, ())
    }

    // Cards

    /// Creates a card titled `title` at the end of `column_id` on `board_id`.
    pub fn create_card(&mut self, board_id: &str, column_id: &str, title: &str) -> Outcome<String> {
        let Some(board) = self.boards.get_mut(board_id) else {
            return ignore("create_card", Ignored::MissingBoard(board_id.to_string()));
        };
        let Some(column) = board.column_mut(column_id) else {
            return ignore("create_card", Ignored::MissingColumn(column_id.to_string()));
        };

        let id = Uuid::new_v4().to_string();
        column.card_ids.push(id.clone());
        self.cards.insert(
            id.clone(),
            Card::new(
                id.clone(),
                board_id.to_string(),
                column_id.to_string(),
                title.to_string(),
                Utc::now(),
            ),
        );
        self.applied("create_card", &id, id.clone())
    }

    /// Merges `update` into card `id` and refreshes `updated_at`.
    pub fn update_card(&mut self, id: &str, update: CardUpdate) -> Outcome {
        let Some(card) = self.cards.get_mut(id) else {
            return ignore("update_card", Ignored::MissingCard(id.to_string()));
        };
        card.apply(update, Utc::now());
        self.applied("update_card", id, ())
    }

    /// Removes card `id` and strips it from every column of its board.
    ///
    /// All columns are scanned rather than trusting `column_id`. The card is
    /// removed even when its board no longer exists.
    pub fn delete_card(&mut self, id: &str) -> Outcome {
        let Some(card) = self.cards.remove(id) else {
            return ignore("delete_card", Ignored::MissingCard(id.to_string()));
        };

        match self.boards.get_mut(&card.board_id) {
            Some(board) => {
                for column in &mut board.columns {
                    column.card_ids.retain(|cid| cid != id);
                }
            }
            None => log::warn!("delete_card: board {} of card {id} not found", card.board_id),
        }
        self.applied("delete_card", id, ())
    }

    // UI state

    pub fn set_active_page(&mut self, id: Option<&str>) {
        self.active_page = id.map(str::to_string);
        self.persist();
    }

    /// Flips the sidebar flag and returns the new value.
    pub fn toggle_sidebar(&mut self) -> bool {
        self.sidebar_open = !self.sidebar_open;
        self.persist();
        self.sidebar_open
    }

    // Integrity

    /// Lists every cross-reference that breaks the page forest or board
    /// membership rules. An empty list means the store is consistent.
    pub fn check_integrity(&self) -> Vec<IntegrityViolation> {
        let mut violations = Vec::new();
        self.check_pages(&mut violations);
        self.check_boards(&mut violations);
        violations
    }

    fn check_pages(&self, violations: &mut Vec<IntegrityViolation>) {
        for page in self.pages.values() {
            if let Some(pid) = &page.parent_id {
                match self.pages.get(pid) {
                    None => violations.push(IntegrityViolation::DanglingParent {
                        page_id: page.id.clone(),
                        parent_id: pid.clone(),
                    }),
                    Some(parent) if !parent.children.contains(&page.id) => {
                        violations.push(IntegrityViolation::NotListedByParent {
                            page_id: page.id.clone(),
                            parent_id: pid.clone(),
                        });
                    }
                    Some(_) => {}
                }
            }

            let mut seen = HashSet::new();
            for child_id in &page.children {
                if !seen.insert(child_id) {
                    violations.push(IntegrityViolation::DuplicateChild {
                        parent_id: page.id.clone(),
                        child_id: child_id.clone(),
                    });
                    continue;
                }
                let points_back = self
                    .pages
                    .get(child_id)
                    .is_some_and(|c| c.parent_id.as_deref() == Some(page.id.as_str()));
                if !points_back {
                    violations.push(IntegrityViolation::StrayChild {
                        parent_id: page.id.clone(),
                        child_id: child_id.clone(),
                    });
                }
            }

            if let Some(pid) = page.parent_id.as_deref() {
                if self.is_self_or_descendant(pid, &page.id) {
                    violations.push(IntegrityViolation::PageCycle {
                        page_id: page.id.clone(),
                    });
                }
            }
        }
    }

    fn check_boards(&self, violations: &mut Vec<IntegrityViolation>) {
        let mut boards_by_page: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        let mut occurrences: HashMap<&str, usize> = HashMap::new();

        for board in self.boards.values() {
            if !self.pages.contains_key(&board.page_id) {
                violations.push(IntegrityViolation::OrphanedBoard {
                    board_id: board.id.clone(),
                    page_id: board.page_id.clone(),
                });
            }
            boards_by_page
                .entry(board.page_id.as_str())
                .or_default()
                .push(board.id.clone());

            for column in &board.columns {
                for card_id in &column.card_ids {
                    *occurrences.entry(card_id.as_str()).or_default() += 1;
                    match self.cards.get(card_id) {
                        None => violations.push(IntegrityViolation::UnknownCard {
                            column_id: column.id.clone(),
                            card_id: card_id.clone(),
                        }),
                        Some(card) if card.column_id != column.id || card.board_id != board.id => {
                            violations.push(IntegrityViolation::MisplacedCard {
                                column_id: column.id.clone(),
                                card_id: card_id.clone(),
                            });
                        }
                        Some(_) => {}
                    }
                }
            }
        }

        for (page_id, board_ids) in boards_by_page {
            if board_ids.len() > 1 {
                violations.push(IntegrityViolation::DuplicateBoard {
                    page_id: page_id.to_string(),
                    board_ids,
                });
            }
        }

        for card in self.cards.values() {
            if !self.boards.contains_key(&card.board_id) {
                violations.push(IntegrityViolation::CardWithoutBoard {
                    card_id: card.id.clone(),
                    board_id: card.board_id.clone(),
                });
                continue;
            }
            match occurrences.get(card.id.as_str()).copied().unwrap_or(0) {
                0 => violations.push(IntegrityViolation::UnlistedCard {
                    card_id: card.id.clone(),
                }),
                1 => {}
                n => violations.push(IntegrityViolation::CardListedTwice {
                    card_id: card.id.clone(),
                    occurrences: n,
                }),
            }
        }
    }

    // Persistence

    /// Logs the mutation, writes the snapshot, and wraps `value`.
    fn applied<T>(&self, op: &str, id: &str, value: T) -> Outcome<T> {
        log::debug!("{op}: {id}");
        self.persist();
        Outcome::Applied(value)
    }

    /// Best-effort write of the current snapshot to the attached storage.
    fn persist(&self) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        if let Err(e) = persistence
            .storage
            .save_snapshot(&persistence.key, &self.snapshot())
        {
            log::error!("Failed to persist workspace '{}': {e}", persistence.key);
        }
    }
}

fn ignore<T>(op: &str, reason: Ignored) -> Outcome<T> {
    log::warn!("{op} ignored: {reason}");
    Outcome::Ignored(reason)
}

/// Removes `id` and every page below it, recording removed ids depth-first.
fn remove_subtree(pages: &mut BTreeMap<String, Page>, id: &str, affected: &mut Vec<String>) {
    let Some(page) = pages.remove(id) else {
        return;
    };
    affected.push(page.id);
    for child_id in &page.children {
        remove_subtree(pages, child_id, affected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CardProperty, PropertyType};
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn board_with_columns(store: &mut WorkspaceStore) -> (String, String, [String; 3]) {
        let page_id = store.create_page(None);
        let board_id = store.create_board(&page_id).applied().unwrap();
        let cols = store.board(&board_id).unwrap().columns.clone();
        (
            page_id,
            board_id,
            [cols[0].id.clone(), cols[1].id.clone(), cols[2].id.clone()],
        )
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = WorkspaceStore::new();
        assert!(store.pages().is_empty());
        assert!(store.boards().is_empty());
        assert!(store.cards().is_empty());
        assert!(store.active_page().is_none());
        assert!(store.sidebar_open());
    }

    #[test]
    fn test_create_page_sets_active_and_defaults() {
        let mut store = WorkspaceStore::new();
        let id = store.create_page(None);

        let page = store.page(&id).unwrap();
        assert_eq!(page.title, "Untitled");
        assert!(page.parent_id.is_none());
        assert!(page.children.is_empty());
        assert!(page.content.is_empty());
        assert_eq!(store.active_page(), Some(id.as_str()));
    }

    #[test]
    fn test_create_child_page_links_both_ways() {
        let mut store = WorkspaceStore::new();
        let a = store.create_page(None);
        let b = store.create_page(Some(&a));

        assert_eq!(store.page(&a).unwrap().children, vec![b.clone()]);
        assert_eq!(store.page(&b).unwrap().parent_id.as_deref(), Some(a.as_str()));
        assert!(store.check_integrity().is_empty());
    }

    #[test]
    fn test_create_page_with_unknown_parent_becomes_root() {
        let mut store = WorkspaceStore::new();
        let id = store.create_page(Some("ghost"));
        assert!(store.page(&id).unwrap().parent_id.is_none());
        assert_eq!(store.root_pages().len(), 1);
        assert!(store.check_integrity().is_empty());
    }

    #[test]
    fn test_update_page_merges_and_stamps() {
        let mut store = WorkspaceStore::new();
        let id = store.create_page(None);
        let before = store.page(&id).unwrap().updated_at;

        let outcome = store.update_page(&id, PageUpdate::title("Roadmap").with_icon(Some("🗺️".into())));
        assert_eq!(outcome, Outcome::Applied(()));

        let page = store.page(&id).unwrap();
        assert_eq!(page.title, "Roadmap");
        assert_eq!(page.icon.as_deref(), Some("🗺️"));
        assert!(page.updated_at >= before);
    }

    #[test]
    fn test_update_missing_page_is_ignored_and_inserts_nothing() {
        let mut store = WorkspaceStore::new();
        let outcome = store.update_page("nope", PageUpdate::title("x"));
        assert_eq!(outcome, Outcome::Ignored(Ignored::MissingPage("nope".to_string())));
        assert!(store.pages().is_empty());

        let outcome = store.update_page_content("nope", Document::empty());
        assert!(outcome.is_ignored());
        assert!(store.pages().is_empty());
    }

    #[test]
    fn test_update_page_content_replaces_wholesale() {
        let mut store = WorkspaceStore::new();
        let id = store.create_page(None);
        let first = Document::from_value(json!([{ "type": "paragraph", "content": [] }]));
        let second = Document::from_value(json!([{ "type": "heading" }]));

        assert!(store.update_page_content(&id, first).is_applied());
        assert!(store.update_page_content(&id, second.clone()).is_applied());
        assert_eq!(store.page(&id).unwrap().content, second);
    }

    #[test]
    fn test_delete_page_removes_subtree_and_unlinks_parent() {
        let mut store = WorkspaceStore::new();
        let root = store.create_page(None);
        let child1 = store.create_page(Some(&root));
        let child2 = store.create_page(Some(&root));
        let grandchild = store.create_page(Some(&child1));

        let result = store.delete_page(&child1).applied().unwrap();
        assert_eq!(result.deleted_count, 2);
        assert_eq!(result.affected_ids, vec![child1.clone(), grandchild.clone()]);

        assert!(store.page(&child1).is_none());
        assert!(store.page(&grandchild).is_none());
        assert_eq!(store.page(&root).unwrap().children, vec![child2]);
        assert!(store.check_integrity().is_empty());
    }

    #[test]
    fn test_delete_page_clears_active_when_removed() {
        let mut store = WorkspaceStore::new();
        let a = store.create_page(None);
        let b = store.create_page(Some(&a));
        assert_eq!(store.active_page(), Some(b.as_str()));

        assert!(store.delete_page(&a).is_applied());
        assert!(store.active_page().is_none());
        assert!(store.pages().is_empty());
    }

    #[test]
    fn test_delete_page_keeps_unrelated_active_page() {
        let mut store = WorkspaceStore::new();
        let a = store.create_page(None);
        let b = store.create_page(None);
        assert!(store.delete_page(&a).is_applied());
        assert_eq!(store.active_page(), Some(b.as_str()));
    }

    #[test]
    fn test_delete_missing_page_is_ignored() {
        let mut store = WorkspaceStore::new();
        store.create_page(None);
        let outcome = store.delete_page("missing");
        assert_eq!(outcome, Outcome::Ignored(Ignored::MissingPage("missing".to_string())));
        assert_eq!(store.pages().len(), 1);
    }

    #[test]
    fn test_delete_page_leaves_board_in_place() {
        let mut store = WorkspaceStore::new();
        let (page_id, board_id, cols) = board_with_columns(&mut store);
        let card_id = store.create_card(&board_id, &cols[0], "x").applied().unwrap();

        assert!(store.delete_page(&page_id).is_applied());
        assert!(store.board(&board_id).is_some());
        assert!(store.card(&card_id).is_some());
        assert_eq!(
            store.check_integrity(),
            vec![IntegrityViolation::OrphanedBoard { board_id, page_id }]
        );
    }

    #[test]
    fn test_move_page_to_new_parent_at_index() {
        let mut store = WorkspaceStore::new();
        let a = store.create_page(None);
        let b = store.create_page(None);
        let b1 = store.create_page(Some(&b));
        let b2 = store.create_page(Some(&b));

        assert!(store.move_page(&a, Some(&b), 1).is_applied());
        assert_eq!(store.page(&b).unwrap().children, vec![b1, a.clone(), b2]);
        assert_eq!(store.page(&a).unwrap().parent_id.as_deref(), Some(b.as_str()));
        assert!(store.check_integrity().is_empty());
    }

    #[test]
    fn test_move_page_to_root() {
        let mut store = WorkspaceStore::new();
        let a = store.create_page(None);
        let b = store.create_page(Some(&a));

        assert!(store.move_page(&b, None, 0).is_applied());
        assert!(store.page(&a).unwrap().children.is_empty());
        assert!(store.page(&b).unwrap().parent_id.is_none());
        assert_eq!(store.root_pages().len(), 2);
    }

    #[test]
    fn test_move_page_reorders_siblings_with_clamped_index() {
        let mut store = WorkspaceStore::new();
        let p = store.create_page(None);
        let c1 = store.create_page(Some(&p));
        let c2 = store.create_page(Some(&p));
        let c3 = store.create_page(Some(&p));

        assert!(store.move_page(&c1, Some(&p), 99).is_applied());
        assert_eq!(store.page(&p).unwrap().children, vec![c2, c3, c1]);
    }

    #[test]
    fn test_move_page_rejects_cycles() {
        let mut store = WorkspaceStore::new();
        let a = store.create_page(None);
        let b = store.create_page(Some(&a));
        let c = store.create_page(Some(&b));

        let outcome = store.move_page(&a, Some(&c), 0);
        assert_eq!(
            outcome,
            Outcome::Ignored(Ignored::WouldCreateCycle { page_id: a.clone(), parent_id: c.clone() })
        );
        assert!(store.move_page(&a, Some(&a), 0).is_ignored());
        assert_eq!(store.page(&a).unwrap().children, vec![b]);
        assert!(store.check_integrity().is_empty());
    }

    #[test]
    fn test_child_pages_skips_dangling_ids() {
        let mut snapshot = Snapshot::default();
        let now = Utc::now();
        let mut parent = Page::new("p".to_string(), None, now);
        parent.children = vec!["c".to_string(), "gone".to_string()];
        snapshot.pages.insert("p".to_string(), parent);
        snapshot
            .pages
            .insert("c".to_string(), Page::new("c".to_string(), Some("p".to_string()), now));
        let store = WorkspaceStore::from_snapshot(snapshot);

        let ids: Vec<&str> = store.child_pages("p").iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["c"]);
        assert!(store.child_pages("nobody").is_empty());
        assert_eq!(
            store.check_integrity(),
            vec![IntegrityViolation::StrayChild {
                parent_id: "p".to_string(),
                child_id: "gone".to_string()
            }]
        );
    }

    #[test]
    fn test_create_board_seeds_columns() {
        let mut store = WorkspaceStore::new();
        let (page_id, board_id, _) = board_with_columns(&mut store);

        let board = store.board(&board_id).unwrap();
        assert_eq!(board.page_id, page_id);
        assert_eq!(board.columns.len(), 3);
        assert_eq!(board.columns[0].title, "To Do");
        assert_eq!(board.columns[0].color, ColumnColor::Gray);
        assert_eq!(board.columns[1].title, "In Progress");
        assert_eq!(board.columns[1].color, ColumnColor::Blue);
        assert_eq!(board.columns[2].title, "Done");
        assert_eq!(board.columns[2].color, ColumnColor::Green);
        assert!(board.columns.iter().all(|c| c.card_ids.is_empty()));
        assert_eq!(store.board_for_page(&page_id).map(|b| b.id.as_str()), Some(board_id.as_str()));
    }

    #[test]
    fn test_create_board_enforces_one_per_page() {
        let mut store = WorkspaceStore::new();
        let (page_id, board_id, _) = board_with_columns(&mut store);

        let outcome = store.create_board(&page_id);
        assert_eq!(
            outcome,
            Outcome::Ignored(Ignored::BoardAlreadyAttached { page_id, board_id })
        );
        assert_eq!(store.boards().len(), 1);
    }

    #[test]
    fn test_create_board_for_missing_page_is_ignored() {
        let mut store = WorkspaceStore::new();
        let outcome = store.create_board("ghost");
        assert_eq!(outcome, Outcome::Ignored(Ignored::MissingPage("ghost".to_string())));
        assert!(store.boards().is_empty());
    }

    #[test]
    fn test_add_column_appends_gray_column() {
        let mut store = WorkspaceStore::new();
        let (_, board_id, _) = board_with_columns(&mut store);

        let column_id = store.add_column(&board_id, "Blocked").applied().unwrap();
        let board = store.board(&board_id).unwrap();
        let last = board.columns.last().unwrap();
        assert_eq!(board.columns.len(), 4);
        assert_eq!(last.id, column_id);
        assert_eq!(last.title, "Blocked");
        assert_eq!(last.color, ColumnColor::Gray);
        assert!(last.card_ids.is_empty());

        assert!(store.add_column("missing", "x").is_ignored());
    }

    #[test]
    fn test_create_cards_keep_creation_order() {
        let mut store = WorkspaceStore::new();
        let (_, board_id, cols) = board_with_columns(&mut store);

        let x = store.create_card(&board_id, &cols[0], "x").applied().unwrap();
        let y = store.create_card(&board_id, &cols[0], "y").applied().unwrap();

        assert_eq!(store.board(&board_id).unwrap().columns[0].card_ids, vec![x.clone(), y.clone()]);
        let titles: Vec<&str> = store
            .column_cards(&board_id, &cols[0])
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(titles, ["x", "y"]);
        assert_eq!(store.card(&x).unwrap().column_id, cols[0]);
        assert_eq!(store.card(&x).unwrap().board_id, board_id);
    }

    #[test]
    fn test_create_card_on_missing_board_or_column_inserts_nothing() {
        let mut store = WorkspaceStore::new();
        let (_, board_id, _) = board_with_columns(&mut store);

        let outcome = store.create_card("ghost", "col", "x");
        assert_eq!(outcome, Outcome::Ignored(Ignored::MissingBoard("ghost".to_string())));
        let outcome = store.create_card(&board_id, "ghost-col", "x");
        assert_eq!(outcome, Outcome::Ignored(Ignored::MissingColumn("ghost-col".to_string())));
        assert!(store.cards().is_empty());
    }

    #[test]
    fn test_move_card_across_columns() {
        let mut store = WorkspaceStore::new();
        let (_, board_id, cols) = board_with_columns(&mut store);
        let existing = store.create_card(&board_id, &cols[1], "existing").applied().unwrap();
        let card = store.create_card(&board_id, &cols[0], "task").applied().unwrap();

        assert!(store.move_card(&card, &cols[0], &cols[1], 0).is_applied());

        let board = store.board(&board_id).unwrap();
        assert!(board.columns[0].card_ids.is_empty());
        assert_eq!(board.columns[1].card_ids, vec![card.clone(), existing]);
        assert_eq!(store.card(&card).unwrap().column_id, cols[1]);
        assert!(store.check_integrity().is_empty());
    }

    #[test]
    fn test_move_card_past_end_appends() {
        let mut store = WorkspaceStore::new();
        let (_, board_id, cols) = board_with_columns(&mut store);
        let a = store.create_card(&board_id, &cols[2], "a").applied().unwrap();
        let card = store.create_card(&board_id, &cols[0], "task").applied().unwrap();

        assert!(store.move_card(&card, &cols[0], &cols[2], 50).is_applied());
        assert_eq!(store.board(&board_id).unwrap().columns[2].card_ids, vec![a, card]);
    }

    #[test]
    fn test_move_card_within_same_column_reorders() {
        let mut store = WorkspaceStore::new();
        let (_, board_id, cols) = board_with_columns(&mut store);
        let a = store.create_card(&board_id, &cols[0], "a").applied().unwrap();
        let b = store.create_card(&board_id, &cols[0], "b").applied().unwrap();
        let c = store.create_card(&board_id, &cols[0], "c").applied().unwrap();

        assert!(store.move_card(&c, &cols[0], &cols[0], 0).is_applied());
        assert_eq!(store.board(&board_id).unwrap().columns[0].card_ids, vec![c, a, b]);
        assert!(store.check_integrity().is_empty());
    }

    #[test]
    fn test_move_card_from_wrong_column_is_rejected() {
        let mut store = WorkspaceStore::new();
        let (_, board_id, cols) = board_with_columns(&mut store);
        let card = store.create_card(&board_id, &cols[0], "task").applied().unwrap();
        let before = store.snapshot();

        let outcome = store.move_card(&card, &cols[1], &cols[2], 0);
        assert_eq!(
            outcome,
            Outcome::Ignored(Ignored::CardNotInColumn {
                card_id: card.clone(),
                column_id: cols[1].clone()
            })
        );
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_move_card_to_unknown_column_is_rejected() {
        let mut store = WorkspaceStore::new();
        let (_, board_id, cols) = board_with_columns(&mut store);
        let card = store.create_card(&board_id, &cols[0], "task").applied().unwrap();

        let outcome = store.move_card(&card, &cols[0], "nowhere", 0);
        assert_eq!(outcome, Outcome::Ignored(Ignored::MissingColumn("nowhere".to_string())));
        assert_eq!(store.card(&card).unwrap().column_id, cols[0]);
    }

    #[test]
    fn test_update_card_merges_fields() {
        let mut store = WorkspaceStore::new();
        let (_, board_id, cols) = board_with_columns(&mut store);
        let card = store.create_card(&board_id, &cols[0], "task").applied().unwrap();

        let props = vec![CardProperty {
            id: "prop".to_string(),
            name: "Points".to_string(),
            kind: PropertyType::Number,
            value: json!(3),
        }];
        let outcome = store.update_card(&card, CardUpdate::title("Ship it").with_properties(props.clone()));
        assert!(outcome.is_applied());

        let updated = store.card(&card).unwrap();
        assert_eq!(updated.title, "Ship it");
        assert_eq!(updated.properties, props);
        assert_eq!(updated.column_id, cols[0]);

        assert!(store.update_card("ghost", CardUpdate::title("x")).is_ignored());
        assert_eq!(store.cards().len(), 1);
    }

    #[test]
    fn test_delete_card_strips_every_column() {
        let mut store = WorkspaceStore::new();
        let (_, board_id, cols) = board_with_columns(&mut store);
        let card = store.create_card(&board_id, &cols[0], "task").applied().unwrap();

        // Simulate a stray duplicate left behind by an older client.
        let mut snapshot = store.snapshot();
        snapshot.boards.get_mut(&board_id).unwrap().columns[2]
            .card_ids
            .push(card.clone());
        store.restore(snapshot);

        assert!(store.delete_card(&card).is_applied());
        assert!(store.card(&card).is_none());
        let board = store.board(&board_id).unwrap();
        assert!(board.columns.iter().all(|c| !c.contains(&card)));

        let before = store.snapshot();
        assert_eq!(
            store.move_card(&card, &cols[0], &cols[1], 0),
            Outcome::Ignored(Ignored::MissingCard(card.clone()))
        );
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_delete_card_without_board_still_removes_card() {
        let mut store = WorkspaceStore::new();
        let (_, board_id, cols) = board_with_columns(&mut store);
        let card = store.create_card(&board_id, &cols[0], "task").applied().unwrap();

        let mut snapshot = store.snapshot();
        snapshot.boards.clear();
        store.restore(snapshot);

        assert!(store.delete_card(&card).is_applied());
        assert!(store.cards().is_empty());
        assert!(store.delete_card(&card).is_ignored());
    }

    #[test]
    fn test_ui_state_setters() {
        let mut store = WorkspaceStore::new();
        let id = store.create_page(None);
        store.set_active_page(None);
        assert!(store.active_page().is_none());
        store.set_active_page(Some(&id));
        assert_eq!(store.active_page(), Some(id.as_str()));

        assert!(!store.toggle_sidebar());
        assert!(!store.sidebar_open());
        assert!(store.toggle_sidebar());
    }

    #[test]
    fn test_root_pages_ordered_by_creation() {
        let mut store = WorkspaceStore::new();
        let a = store.create_page(None);
        let _child = store.create_page(Some(&a));
        let b = store.create_page(None);

        let roots: Vec<&str> = store.root_pages().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(roots.len(), 2);
        assert!(roots.contains(&a.as_str()));
        assert!(roots.contains(&b.as_str()));
    }

    #[test]
    fn test_integrity_detects_duplicate_card_listing() {
        let mut store = WorkspaceStore::new();
        let (_, board_id, cols) = board_with_columns(&mut store);
        let card = store.create_card(&board_id, &cols[0], "task").applied().unwrap();

        let mut snapshot = store.snapshot();
        snapshot.boards.get_mut(&board_id).unwrap().columns[1]
            .card_ids
            .push(card.clone());
        let store = WorkspaceStore::from_snapshot(snapshot);

        let violations = store.check_integrity();
        assert!(violations.contains(&IntegrityViolation::CardListedTwice {
            card_id: card.clone(),
            occurrences: 2
        }));
        assert!(violations.contains(&IntegrityViolation::MisplacedCard {
            column_id: cols[1].clone(),
            card_id: card
        }));
    }

    #[test]
    fn test_snapshot_restore_round_trip_through_json() {
        let mut store = WorkspaceStore::new();
        let root = store.create_page(None);
        store.create_page(Some(&root));
        let (_, board_id, cols) = board_with_columns(&mut store);
        store.create_card(&board_id, &cols[1], "card").applied().unwrap();
        store.toggle_sidebar();

        let json = serde_json::to_string(&store.snapshot()).unwrap();
        let parsed: Snapshot = serde_json::from_str(&json).unwrap();

        let mut restored = WorkspaceStore::new();
        restored.restore(parsed);
        assert_eq!(restored.snapshot(), store.snapshot());
    }

    #[test]
    fn test_open_persists_after_each_mutation() {
        let temp = NamedTempFile::new().unwrap();
        let page_id;
        {
            let storage = Storage::create(temp.path()).unwrap();
            let mut store = WorkspaceStore::open(storage, "rmbr-workspace").unwrap();
            page_id = store.create_page(None);
            assert!(store.update_page(&page_id, PageUpdate::title("Saved")).is_applied());
        }

        let storage = Storage::open(temp.path()).unwrap();
        let store = WorkspaceStore::open(storage, "rmbr-workspace").unwrap();
        assert_eq!(store.page(&page_id).unwrap().title, "Saved");
        assert_eq!(store.active_page(), Some(page_id.as_str()));
    }

    #[test]
    fn test_from_settings_uses_default_sidebar_for_fresh_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let settings = StoreSettings {
            storage_path: dir.path().join("data").join("ws.db").to_string_lossy().to_string(),
            persist_key: "test-key".to_string(),
            sidebar_open_by_default: false,
        };

        let mut store = WorkspaceStore::from_settings(&settings).unwrap();
        assert!(!store.sidebar_open());
        assert!(store.toggle_sidebar());
        drop(store);

        let store = WorkspaceStore::from_settings(&settings).unwrap();
        assert!(store.sidebar_open());
    }
}
