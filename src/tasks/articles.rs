// ==================== ARTICLES ====================
// Task 8 owns the whole lifecycle of the collection: seed one article per
// type, then retag in four strictly ordered steps. Task 9 searches it.

use crate::{
    database::{MongoDB, ARTICLES},
    models::{Article, ARTICLE_TYPES},
    utils::AppError,
};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Document};
use serde::Serialize;
use std::fmt;

pub const SEARCH_TAGS: [&str; 2] = ["super", "tag2-a"];

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ArticleSeedSummary {
    pub inserted: usize,
    pub retagged_type_a: u64,
    pub retagged_others: u64,
    pub pulled: u64,
}

impl fmt::Display for ArticleSeedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "inserted {}, type a retagged {}, others retagged {}, pulled from {}",
            self.inserted, self.retagged_type_a, self.retagged_others, self.pulled
        )
    }
}

// ==================== WRITE DOCUMENTS ====================

pub fn type_a_tags_update() -> Document {
    doc! { "$set": { "tags": ["tag1-a", "tag2-a", "tag3"] } }
}

pub fn other_types_filter() -> Document {
    doc! { "type": { "$ne": "a" } }
}

pub fn other_types_tags_update() -> Document {
    doc! { "$set": { "tags": ["tag2", "tag3", "super"] } }
}

pub fn pull_tags_update() -> Document {
    doc! { "$pull": { "tags": { "$in": ["tag2", "tag1-a"] } } }
}

pub fn search_filter() -> Document {
    doc! { "tags": { "$in": SEARCH_TAGS.to_vec() } }
}

/// One article per type, inserted in a single batch.
pub fn seed_articles() -> Vec<Article> {
    ARTICLE_TYPES.iter().map(|kind| Article::new(kind)).collect()
}

// ==================== TASKS ====================

/// Task 8. Steps run in order (a) -> (d) and are not atomic as a unit: a
/// failure part way leaves the earlier steps applied.
///
/// Net result: type a -> `["tag2-a", "tag3"]`, types b/c -> `["tag3", "super"]`.
pub async fn seed_and_retag_articles(db: &MongoDB) -> Result<ArticleSeedSummary, AppError> {
    let articles = db.collection::<Article>(ARTICLES);
    let mut summary = ArticleSeedSummary::default();

    // (a) one article per type, single batched round trip
    let inserted = articles.insert_many(seed_articles()).await?;
    summary.inserted = inserted.inserted_ids.len();
    log::debug!("   task8 (a): inserted {} articles", summary.inserted);

    // (b) overwrite tags on type a
    let result = articles
        .update_many(doc! { "type": "a" }, type_a_tags_update())
        .await?;
    summary.retagged_type_a = result.modified_count;

    // (c) overwrite tags on everything else
    let result = articles
        .update_many(other_types_filter(), other_types_tags_update())
        .await?;
    summary.retagged_others = result.modified_count;

    // (d) drop tag2 / tag1-a everywhere
    let result = articles.update_many(doc! {}, pull_tags_update()).await?;
    summary.pulled = result.modified_count;

    Ok(summary)
}

/// Task 9: articles tagged "super" or "tag2-a"
pub async fn search_articles(db: &MongoDB) -> Result<Vec<Article>, AppError> {
    let articles = db.collection::<Article>(ARTICLES);

    let cursor = articles.find(search_filter()).await?;
    Ok(cursor.try_collect().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pull_removes_both_tags_in_one_update() {
        assert_eq!(
            pull_tags_update(),
            doc! { "$pull": { "tags": { "$in": ["tag2", "tag1-a"] } } }
        );
    }

    #[test]
    fn test_search_filter() {
        assert_eq!(
            search_filter(),
            doc! { "tags": { "$in": ["super", "tag2-a"] } }
        );
    }

    #[test]
    fn test_updates_overwrite_rather_than_merge() {
        assert!(type_a_tags_update().contains_key("$set"));
        assert!(other_types_tags_update().contains_key("$set"));
        assert_eq!(
            other_types_filter(),
            doc! { "type": { "$ne": "a" } }
        );
    }

    #[test]
    fn test_seed_articles_one_per_type() {
        let kinds: Vec<String> = seed_articles().into_iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec!["a", "b", "c"]);
        assert!(seed_articles().iter().all(|a| a.tags.is_none() && a.id.is_none()));
    }

    #[test]
    fn test_summary_display() {
        let summary = ArticleSeedSummary {
            inserted: 3,
            retagged_type_a: 1,
            retagged_others: 2,
            pulled: 3,
        };
        assert_eq!(
            summary.to_string(),
            "inserted 3, type a retagged 1, others retagged 2, pulled from 3"
        );
    }

    // ==================== LIVE ====================

    use crate::database::testing::{drop_test_database, test_database};
    use std::collections::HashMap;

    fn has_any_tag(article: &Article, wanted: &[&str]) -> bool {
        article
            .tags
            .as_ref()
            .map(|tags| tags.iter().any(|t| wanted.contains(&t.as_str())))
            .unwrap_or(false)
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_seed_and_retag_net_result() {
        let db = test_database().await;

        let summary = seed_and_retag_articles(&db).await.unwrap();
        assert_eq!(summary.inserted, 3);

        let all: Vec<Article> = db
            .collection::<Article>(ARTICLES)
            .find(doc! {})
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let by_type: HashMap<String, Vec<String>> = all
            .into_iter()
            .map(|a| (a.kind, a.tags.unwrap_or_default()))
            .collect();
        assert_eq!(by_type["a"], vec!["tag2-a", "tag3"]);
        assert_eq!(by_type["b"], vec!["tag3", "super"]);
        assert_eq!(by_type["c"], vec!["tag3", "super"]);
        assert_eq!(summary.retagged_type_a, 1);
        assert_eq!(summary.retagged_others, 2);
        assert_eq!(summary.pulled, 3);

        drop_test_database(db).await;
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_search_partitions_articles() {
        let db = test_database().await;
        db.collection::<Document>(ARTICLES)
            .insert_many(vec![
                doc! { "type": "a", "tags": ["tag2-a", "tag3"] },
                doc! { "type": "b", "tags": ["tag3", "super"] },
                doc! { "type": "c", "tags": ["tag3"] },
                doc! { "type": "d" },
            ])
            .await
            .unwrap();

        let found = search_articles(&db).await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|a| has_any_tag(a, &SEARCH_TAGS)));

        let kinds: Vec<&str> = found.iter().map(|a| a.kind.as_str()).collect();
        assert!(!kinds.contains(&"c"));
        assert!(!kinds.contains(&"d"));

        drop_test_database(db).await;
    }
}
