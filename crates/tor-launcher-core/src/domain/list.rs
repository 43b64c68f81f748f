//! Ordered in-memory bookmark collection.
//!
//! [`BookmarkList`] keeps bookmarks in insertion order.  There is no sorting:
//! a new bookmark goes to the end and an edited bookmark keeps its position.
//! Mutations are keyed on [`BookmarkId`]; a missing id is reported as
//! [`ListError::NotFound`] and leaves the list untouched.
//!
//! A list read from disk goes through [`BookmarkList::from_stored`], which
//! gives every record without an id, or with an id already used earlier in
//! the file, a fresh one.  Ids are unique within a list from then on.

use std::collections::HashSet;

use thiserror::Error;

use super::bookmark::{fresh_id, Bookmark, BookmarkId, StoredBookmark};

/// Errors from id-keyed list mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListError {
    #[error("bookmark not found: {0}")]
    NotFound(BookmarkId),
}

/// Ids [`BookmarkList::from_stored`] had to assign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdRepairs {
    /// Records that had no id.
    pub missing: usize,
    /// Records whose id was already taken by an earlier record.
    pub duplicated: usize,
}

impl IdRepairs {
    /// `true` if every stored id was kept, so the file needs no rewrite.
    pub fn is_empty(&self) -> bool {
        self.missing == 0 && self.duplicated == 0
    }
}

/// Insertion-ordered list of bookmarks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkList {
    items: Vec<Bookmark>,
}

impl BookmarkList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing vector, keeping its order.
    pub fn from_vec(items: Vec<Bookmark>) -> Self {
        Self { items }
    }

    /// Builds a list from records read from disk, keeping their order.
    ///
    /// The first record carrying a given id keeps it.  Records with no id,
    /// and later records repeating an id, get a fresh one; the returned
    /// [`IdRepairs`] counts both.
    pub fn from_stored(records: Vec<StoredBookmark>) -> (Self, IdRepairs) {
        let mut seen = HashSet::with_capacity(records.len());
        let mut repairs = IdRepairs::default();
        let mut items = Vec::with_capacity(records.len());

        for record in records {
            let id = match record.id {
                Some(id) if !seen.contains(&id) => id,
                Some(_) => {
                    repairs.duplicated += 1;
                    fresh_id()
                }
                None => {
                    repairs.missing += 1;
                    fresh_id()
                }
            };
            seen.insert(id);
            items.push(record.into_bookmark(id));
        }

        (Self { items }, repairs)
    }

    /// Returns all bookmarks in order.
    pub fn as_slice(&self) -> &[Bookmark] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Bookmark> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bookmark> {
        self.items.iter()
    }

    /// Returns the bookmark with `id`, if any.
    pub fn get(&self, id: BookmarkId) -> Option<&Bookmark> {
        self.items.iter().find(|b| b.id == id)
    }

    /// Returns the position of the bookmark with `id`, if any.
    pub fn position(&self, id: BookmarkId) -> Option<usize> {
        self.items.iter().position(|b| b.id == id)
    }

    /// Appends a bookmark.  Duplicates are allowed.
    pub fn push(&mut self, bookmark: Bookmark) {
        self.items.push(bookmark);
    }

    /// Replaces the bookmark with `id` in place and returns the old record.
    ///
    /// The replacement keeps `id` even if `updated` carries another one.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::NotFound`] if no bookmark has `id`.
    pub fn replace(&mut self, id: BookmarkId, mut updated: Bookmark) -> Result<Bookmark, ListError> {
        let index = self.position(id).ok_or(ListError::NotFound(id))?;
        updated.id = id;
        Ok(std::mem::replace(&mut self.items[index], updated))
    }

    /// Removes the bookmark with `id` and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::NotFound`] if no bookmark has `id`.
    pub fn remove(&mut self, id: BookmarkId) -> Result<Bookmark, ListError> {
        let index = self.position(id).ok_or(ListError::NotFound(id))?;
        Ok(self.items.remove(index))
    }

    /// Returns the bookmarks whose name or URL contains `query`,
    /// case-insensitively, in list order.
    ///
    /// An empty query returns every bookmark.
    pub fn find_matching(&self, query: &str) -> Vec<&Bookmark> {
        let needle = query.to_lowercase();
        self.items
            .iter()
            .filter(|b| b.matches_lowercase(&needle))
            .collect()
    }

    /// Returns one visibility flag per bookmark, in list order.
    ///
    /// Same matching rule as [`find_matching`](Self::find_matching).  A UI
    /// that shows every bookmark as a fixed row can hide the `false` ones
    /// instead of rebuilding its widgets.
    pub fn visibility_mask(&self, query: &str) -> Vec<bool> {
        let needle = query.to_lowercase();
        self.items
            .iter()
            .map(|b| b.matches_lowercase(&needle))
            .collect()
    }

    /// Looks up a bookmark by id string or, failing that, by exact name.
    ///
    /// Name lookup is case-insensitive and returns the first match in list
    /// order.  This is a convenience for command-line use where typing a
    /// UUID is awkward.
    pub fn resolve(&self, id_or_name: &str) -> Option<&Bookmark> {
        if let Ok(id) = id_or_name.parse::<BookmarkId>() {
            if let Some(found) = self.get(id) {
                return Some(found);
            }
        }
        let wanted = id_or_name.to_lowercase();
        self.items.iter().find(|b| b.name.to_lowercase() == wanted)
    }
}

impl<'a> IntoIterator for &'a BookmarkList {
    type Item = &'a Bookmark;
    type IntoIter = std::slice::Iter<'a, Bookmark>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::ValidatedFields;

    fn make(name: &str, url: &str) -> Bookmark {
        Bookmark::new(ValidatedFields {
            name: name.to_string(),
            url: url.to_string(),
            icon_path: None,
        })
    }

    fn sample_list() -> BookmarkList {
        BookmarkList::from_vec(vec![
            make("Foo Forum", "http://forum.onion"),
            make("Mail", "http://mail.onion"),
            make("Library", "http://bigfoot.onion"),
            make("News", "http://news.onion"),
        ])
    }

    #[test]
    fn test_new_list_is_empty() {
        let list = BookmarkList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn test_push_keeps_insertion_order() {
        let mut list = BookmarkList::new();
        list.push(make("b", "u1"));
        list.push(make("a", "u2"));
        let names: Vec<&str> = list.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_push_allows_duplicate_values() {
        let mut list = BookmarkList::new();
        list.push(make("same", "http://same.onion"));
        list.push(make("same", "http://same.onion"));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_replace_keeps_position_and_id() {
        // Arrange
        let mut list = sample_list();
        let target = list.as_slice()[1].clone();

        // Act
        let old = list
            .replace(target.id, make("Webmail", "http://webmail.onion"))
            .expect("replace");

        // Assert
        assert_eq!(old, target);
        let now = &list.as_slice()[1];
        assert_eq!(now.id, target.id);
        assert_eq!(now.name, "Webmail");
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_replace_unknown_id_fails_and_leaves_list_unchanged() {
        // Arrange
        let mut list = sample_list();
        let before = list.clone();
        let unknown = BookmarkId::new_v4();

        // Act
        let result = list.replace(unknown, make("x", "y"));

        // Assert
        assert_eq!(result, Err(ListError::NotFound(unknown)));
        assert_eq!(list, before);
    }

    #[test]
    fn test_replace_distinguishes_identical_records() {
        // Two value-identical bookmarks; editing the second must not touch the first.
        let mut list = BookmarkList::new();
        let first = make("Twin", "http://twin.onion");
        let second = make("Twin", "http://twin.onion");
        let second_id = second.id;
        list.push(first.clone());
        list.push(second);

        list.replace(second_id, make("Twin B", "http://twin.onion"))
            .expect("replace");

        assert_eq!(list.as_slice()[0], first);
        assert_eq!(list.as_slice()[1].name, "Twin B");
    }

    #[test]
    fn test_add_then_remove_restores_prior_state() {
        // Arrange
        let mut list = sample_list();
        let before = list.clone();
        let added = make("Temp", "http://temp.onion");
        let id = added.id;

        // Act
        list.push(added.clone());
        let removed = list.remove(id).expect("remove");

        // Assert
        assert_eq!(removed, added);
        assert_eq!(list, before);
    }

    #[test]
    fn test_remove_unknown_id_fails() {
        let mut list = sample_list();
        let unknown = BookmarkId::new_v4();
        assert_eq!(list.remove(unknown), Err(ListError::NotFound(unknown)));
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_find_matching_is_case_insensitive_and_ordered() {
        // Arrange
        let list = sample_list();

        // Act
        let hits = list.find_matching("FOO");

        // Assert: "Foo Forum" by name, "Library" by url (bigfoot), in list order
        let names: Vec<&str> = hits.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Foo Forum", "Library"]);
    }

    #[test]
    fn test_find_matching_empty_query_returns_all() {
        let list = sample_list();
        assert_eq!(list.find_matching("").len(), 4);
    }

    #[test]
    fn test_find_matching_no_hits_returns_empty() {
        let list = sample_list();
        assert!(list.find_matching("zzz").is_empty());
    }

    #[test]
    fn test_visibility_mask_matches_find_matching() {
        let list = sample_list();
        assert_eq!(list.visibility_mask("mail"), vec![false, true, false, false]);
        assert_eq!(list.visibility_mask(""), vec![true; 4]);
    }

    fn stored(id: Option<BookmarkId>, name: &str) -> StoredBookmark {
        StoredBookmark {
            id,
            name: name.to_string(),
            url: format!("http://{}.onion", name.to_lowercase()),
            icon_path: None,
        }
    }

    #[test]
    fn test_from_stored_keeps_present_ids_and_order() {
        let a = BookmarkId::new_v4();
        let b = BookmarkId::new_v4();

        let (list, repairs) = BookmarkList::from_stored(vec![stored(Some(a), "A"), stored(Some(b), "B")]);

        assert!(repairs.is_empty());
        let ids: Vec<BookmarkId> = list.iter().map(|bm| bm.id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn test_from_stored_assigns_ids_to_records_without_one() {
        // Arrange
        let kept = BookmarkId::new_v4();

        // Act
        let (list, repairs) = BookmarkList::from_stored(vec![
            stored(None, "Old"),
            stored(Some(kept), "New"),
            stored(None, "Older"),
        ]);

        // Assert
        assert_eq!(repairs, IdRepairs { missing: 2, duplicated: 0 });
        let ids: HashSet<BookmarkId> = list.iter().map(|bm| bm.id).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(list.as_slice()[1].id, kept);
    }

    #[test]
    fn test_from_stored_gives_repeated_id_a_fresh_one() {
        // Arrange: a hand-copied entry repeats the first record's id
        let shared = BookmarkId::new_v4();

        // Act
        let (mut list, repairs) =
            BookmarkList::from_stored(vec![stored(Some(shared), "Original"), stored(Some(shared), "Copy")]);

        // Assert
        assert_eq!(repairs, IdRepairs { missing: 0, duplicated: 1 });
        assert_eq!(list.as_slice()[0].id, shared);
        let copy_id = list.as_slice()[1].id;
        assert_ne!(copy_id, shared);

        // Both records are now reachable on their own
        let removed = list.remove(copy_id).expect("remove copy");
        assert_eq!(removed.name, "Copy");
        assert_eq!(list.get(shared).map(|bm| bm.name.as_str()), Some("Original"));
    }

    #[test]
    fn test_resolve_by_id_then_by_name() {
        let list = sample_list();
        let news = list.as_slice()[3].clone();

        assert_eq!(list.resolve(&news.id.to_string()), Some(&news));
        assert_eq!(list.resolve("news"), Some(&news));
        assert_eq!(list.resolve("nothing"), None);
    }
}
