//! Free-text search over the locally cached library.
//!
//! Scoring is additive per matched field, matching a case-insensitive
//! substring of the term. A record scoring zero is excluded. The sort is
//! stable descending on relevance, so equal scores keep enumeration order:
//! documents before folders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::library::{Document, Folder};
use crate::store::{LocalStore, StoreError};

/// Score contribution of a title match
const WEIGHT_TITLE: u32 = 50;
/// Score contribution of a description match
const WEIGHT_DESCRIPTION: u32 = 30;
/// Score contribution of a category match
const WEIGHT_CATEGORY: u32 = 20;
/// Score contribution of a tag match, counted once however many tags match
const WEIGHT_TAG: u32 = 25;
/// Score contribution of a folder name match
const WEIGHT_FOLDER_NAME: u32 = 40;

/// Maximum number of remembered search terms
pub const RECENT_SEARCH_CAP: usize = 10;

/// Kind of record a search hit refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchHitKind {
    Document,
    Folder,
    /// Kept for interface completeness; this ranker never emits it
    User,
}

/// A ranked search hit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SearchHitKind,
    pub title: String,
    pub description: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<String>,
    pub relevance: u32,
}

/// Rank documents and folders against a free-text term.
///
/// Documents are enumerated before folders, and the sort is stable, so a
/// tied score keeps that order.
pub fn rank(documents: &[Document], folders: &[Folder], term: &str) -> Vec<SearchResult> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return Vec::new();
    }

    let mut results = Vec::new();

    for doc in documents {
        let relevance = score_document(doc, &term);
        if relevance > 0 {
            results.push(SearchResult {
                id: doc.id.clone(),
                kind: SearchHitKind::Document,
                title: doc.title.clone(),
                description: doc.description.clone(),
                content: doc.description.clone(),
                author: None,
                created_at: doc.created_at,
                tags: doc.tags.clone(),
                relevance,
            });
        }
    }

    for folder in folders {
        let relevance = score_folder(folder, &term);
        if relevance > 0 {
            results.push(SearchResult {
                id: folder.id.clone(),
                kind: SearchHitKind::Folder,
                title: folder.name.clone(),
                description: String::new(),
                content: folder.path.clone(),
                author: None,
                created_at: folder.created_at,
                tags: Vec::new(),
                relevance,
            });
        }
    }

    results.sort_by(|a, b| b.relevance.cmp(&a.relevance));
    results
}

fn score_document(doc: &Document, term: &str) -> u32 {
    let mut score = 0;
    if doc.title.to_lowercase().contains(term) {
        score += WEIGHT_TITLE;
    }
    if doc.description.to_lowercase().contains(term) {
        score += WEIGHT_DESCRIPTION;
    }
    if doc.category.to_lowercase().contains(term) {
        score += WEIGHT_CATEGORY;
    }
    if doc.tags.iter().any(|tag| tag.to_lowercase().contains(term)) {
        score += WEIGHT_TAG;
    }
    score
}

fn score_folder(folder: &Folder, term: &str) -> u32 {
    if folder.name.to_lowercase().contains(term) {
        WEIGHT_FOLDER_NAME
    } else {
        0
    }
}

/// Search over the locally cached library
#[derive(Clone)]
pub struct SearchEngine {
    store: LocalStore,
}

impl SearchEngine {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Rank cached documents and stored folders against a term
    pub fn search(&self, term: &str) -> Vec<SearchResult> {
        rank(&self.store.documents(), &self.store.folders(), term)
    }

    /// Push a term onto the recent-search list: deduplicated, newest
    /// first, capped
    pub fn remember_search(&self, term: &str) -> Result<(), StoreError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(());
        }

        let mut recent = self.store.recent_searches();
        recent.retain(|t| t != term);
        recent.insert(0, term.to_string());
        recent.truncate(RECENT_SEARCH_CAP);
        self.store.save_recent_searches(&recent)
    }

    /// Recently submitted terms, newest first
    pub fn recent_searches(&self) -> Vec<String> {
        self.store.recent_searches()
    }
}
