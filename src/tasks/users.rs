// ==================== USERS ====================
// Tasks 1-7 plus the concurrent overview helper. Filters and update
// documents are built by small functions so they can be checked offline.

use crate::{
    database::{MongoDB, USERS},
    models::User,
    utils::AppError,
};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::ReturnDocument;
use serde::Serialize;

use super::UpdateCounts;

const YOUNGEST_LIMIT: i64 = 5;
const SUPPORT_DEPARTMENT: &str = "Support";

// ==================== QUERY DOCUMENTS ====================

pub fn youngest_projection() -> Document {
    doc! {
        "_id": 0,
        "firstName": 1,
        "lastName": 1,
        "age": 1,
    }
}

/// Age in [25, 30) or tagged Engineering, and no `skills` yet so existing
/// skill lists survive.
pub fn skilled_users_filter() -> Document {
    doc! {
        "$or": [
            { "age": { "$gte": 25, "$lt": 30 } },
            { "tags": "Engineering" },
        ],
        "skills": { "$exists": false },
    }
}

pub fn seed_skills_projection() -> Document {
    doc! { "skills": 1 }
}

pub fn seed_skills_update() -> Document {
    doc! { "$addToSet": { "skills": { "$each": ["js", "git"] } } }
}

/// Email starting with "john" (any case) living in CA
pub fn replaceable_user_filter() -> Document {
    doc! {
        "email": { "$regex": "^john", "$options": "i" },
        "address.state": "CA",
    }
}

pub fn replacement_user() -> User {
    User {
        first_name: Some("Jason".to_string()),
        last_name: Some("Wood".to_string()),
        tags: Some(vec!["a".to_string(), "b".to_string(), "c".to_string()]),
        department: Some(SUPPORT_DEPARTMENT.to_string()),
        ..Default::default()
    }
}

pub fn jason_wood_filter() -> Document {
    doc! { "firstName": "Jason", "lastName": "Wood" }
}

pub fn support_filter() -> Document {
    doc! { "department": SUPPORT_DEPARTMENT }
}

// ==================== TASKS ====================

/// Task 1: five youngest users, ascending by age. Users are schemaless, so
/// the rows come back as raw documents.
pub async fn youngest_users(db: &MongoDB) -> Result<Vec<Document>, AppError> {
    let users = db.collection::<Document>(USERS);

    let cursor = users
        .find(doc! {})
        .projection(youngest_projection())
        .sort(doc! { "age": 1 })
        .limit(YOUNGEST_LIMIT)
        .await?;

    Ok(cursor.try_collect().await?)
}

/// Task 2: give matching users an empty `skills` list
pub async fn tag_skilled_users(db: &MongoDB) -> Result<UpdateCounts, AppError> {
    let users = db.collection::<Document>(USERS);

    let result = users
        .update_many(skilled_users_filter(), doc! { "$set": { "skills": [] } })
        .await?;

    Ok(UpdateCounts::from(&result))
}

/// Task 3: add "js" and "git" to the first user that has `skills`, returning
/// `_id` and `skills` as they are after the update. The write is already
/// applied when the reply arrives, so the reply is kept as a raw document.
pub async fn seed_skills(db: &MongoDB) -> Result<Option<Document>, AppError> {
    let users = db.collection::<Document>(USERS);

    let updated = users
        .find_one_and_update(doc! { "skills": { "$exists": true } }, seed_skills_update())
        .projection(seed_skills_projection())
        .return_document(ReturnDocument::After)
        .await?;

    if updated.is_none() {
        log::warn!("⚠️  task3: no user has a skills field yet");
    }

    Ok(updated)
}

/// String entries of a document's `skills` array
pub fn skills_of(user: &Document) -> Vec<&str> {
    user.get_array("skills")
        .map(|skills| skills.iter().filter_map(Bson::as_str).collect())
        .unwrap_or_default()
}

/// Task 4: replace the first matching user wholesale (only `_id` survives)
pub async fn replace_matched_user(db: &MongoDB) -> Result<UpdateCounts, AppError> {
    let users = db.collection::<User>(USERS);

    let result = users
        .replace_one(replaceable_user_filter(), replacement_user())
        .await?;

    if result.matched_count == 0 {
        log::warn!("⚠️  task4: no user with a john* email in CA");
    }

    Ok(UpdateCounts::from(&result))
}

/// Task 5: pull tag "c" from Jason Wood
pub async fn remove_tag(db: &MongoDB) -> Result<UpdateCounts, AppError> {
    update_jason_wood(db, doc! { "$pull": { "tags": "c" } }, "task5").await
}

/// Task 6: add tag "b" to Jason Wood unless already present
pub async fn add_tag(db: &MongoDB) -> Result<UpdateCounts, AppError> {
    update_jason_wood(db, doc! { "$addToSet": { "tags": "b" } }, "task6").await
}

async fn update_jason_wood(
    db: &MongoDB,
    update: Document,
    task_id: &str,
) -> Result<UpdateCounts, AppError> {
    let users = db.collection::<Document>(USERS);

    let result = users.update_one(jason_wood_filter(), update).await?;

    if result.matched_count == 0 {
        log::warn!("⚠️  {}: Jason Wood not found", task_id);
    }

    Ok(UpdateCounts::from(&result))
}

/// Task 7: delete every Support user
pub async fn delete_support_users(db: &MongoDB) -> Result<u64, AppError> {
    let users = db.collection::<Document>(USERS);

    let result = users.delete_many(support_filter()).await?;
    log::info!("🗑️  task7: deletedCount = {}", result.deleted_count);

    Ok(result.deleted_count)
}

// ==================== OVERVIEW ====================

/// Full user documents, unknown fields included
#[derive(Debug, Serialize)]
pub struct UsersOverview {
    pub all_users: Vec<Document>,
    pub first_user: Option<Document>,
}

/// Reads all users and the first user concurrently. Not part of the numbered
/// sequence.
pub async fn users_overview(db: &MongoDB) -> Result<UsersOverview, AppError> {
    let users = db.collection::<Document>(USERS);

    let all = async {
        let cursor = users.find(doc! {}).await?;
        cursor.try_collect::<Vec<Document>>().await
    };
    let first = async { users.find_one(doc! {}).await };

    let (all_users, first_user) = futures::try_join!(all, first)?;

    Ok(UsersOverview {
        all_users,
        first_user,
    })
}
