// ==================== OPERATION CATALOG ====================
// Twelve independent operations over `users`, `articles` and `students`,
// run strictly one after another. A failing operation is logged and the
// sequence carries on; nothing is retried.

pub mod articles;
pub mod students;
pub mod users;

use crate::{
    database::MongoDB,
    models::{Article, HomeworkAverage, StudentTypeAverages, WorstHomework},
    utils::AppError,
};
use chrono::{DateTime, Utc};
use mongodb::bson::Document;
use mongodb::results::UpdateResult;
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub use articles::ArticleSeedSummary;

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct UpdateCounts {
    pub matched: u64,
    pub modified: u64,
}

impl From<&UpdateResult> for UpdateCounts {
    fn from(result: &UpdateResult) -> Self {
        Self {
            matched: result.matched_count,
            modified: result.modified_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    YoungestUsers,
    TagSkilledUsers,
    SeedSkills,
    ReplaceMatchedUser,
    RemoveTag,
    AddTag,
    DeleteSupportUsers,
    SeedArticles,
    SearchArticles,
    WorstHomework,
    HomeworkAverage,
    TypeAverages,
}

impl Task {
    /// Execution order. Tasks 4-7 rely on documents left by the earlier ones.
    pub const ALL: [Task; 12] = [
        Task::YoungestUsers,
        Task::TagSkilledUsers,
        Task::SeedSkills,
        Task::ReplaceMatchedUser,
        Task::RemoveTag,
        Task::AddTag,
        Task::DeleteSupportUsers,
        Task::SeedArticles,
        Task::SearchArticles,
        Task::WorstHomework,
        Task::HomeworkAverage,
        Task::TypeAverages,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Task::YoungestUsers => "task1",
            Task::TagSkilledUsers => "task2",
            Task::SeedSkills => "task3",
            Task::ReplaceMatchedUser => "task4",
            Task::RemoveTag => "task5",
            Task::AddTag => "task6",
            Task::DeleteSupportUsers => "task7",
            Task::SeedArticles => "task8",
            Task::SearchArticles => "task9",
            Task::WorstHomework => "task10",
            Task::HomeworkAverage => "task11",
            Task::TypeAverages => "task12",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Task::YoungestUsers => "five youngest users (firstName, lastName, age)",
            Task::TagSkilledUsers => "add empty skills to users aged 25-29 or tagged Engineering",
            Task::SeedSkills => "add js and git to the first user with skills",
            Task::ReplaceMatchedUser => "replace first john* user in CA with Jason Wood",
            Task::RemoveTag => "pull tag c from Jason Wood",
            Task::AddTag => "add tag b to Jason Wood if missing",
            Task::DeleteSupportUsers => "delete all Support users",
            Task::SeedArticles => "seed articles a, b, c and retag them",
            Task::SearchArticles => "find articles tagged super or tag2-a",
            Task::WorstHomework => "student with the worst homework score",
            Task::HomeworkAverage => "average homework score",
            Task::TypeAverages => "average score per type for each student",
        }
    }

    pub async fn execute(self, db: &MongoDB) -> Result<TaskOutput, AppError> {
        let output = match self {
            Task::YoungestUsers => TaskOutput::Users(users::youngest_users(db).await?),
            Task::TagSkilledUsers => TaskOutput::Updated(users::tag_skilled_users(db).await?),
            Task::SeedSkills => TaskOutput::SkillsSeeded(users::seed_skills(db).await?),
            Task::ReplaceMatchedUser => TaskOutput::Updated(users::replace_matched_user(db).await?),
            Task::RemoveTag => TaskOutput::Updated(users::remove_tag(db).await?),
            Task::AddTag => TaskOutput::Updated(users::add_tag(db).await?),
            Task::DeleteSupportUsers => TaskOutput::Deleted(users::delete_support_users(db).await?),
            Task::SeedArticles => {
                TaskOutput::ArticlesSeeded(articles::seed_and_retag_articles(db).await?)
            }
            Task::SearchArticles => TaskOutput::Articles(articles::search_articles(db).await?),
            Task::WorstHomework => TaskOutput::WorstHomework(students::worst_homework(db).await?),
            Task::HomeworkAverage => {
                TaskOutput::HomeworkAverage(students::homework_average(db).await?)
            }
            Task::TypeAverages => TaskOutput::TypeAverages(students::type_averages(db).await?),
        };

        Ok(output)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id(), self.description())
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum TaskOutput {
    Users(Vec<Document>),
    Updated(UpdateCounts),
    SkillsSeeded(Option<Document>),
    Deleted(u64),
    ArticlesSeeded(ArticleSeedSummary),
    Articles(Vec<Article>),
    WorstHomework(Option<WorstHomework>),
    HomeworkAverage(Option<HomeworkAverage>),
    TypeAverages(Vec<StudentTypeAverages>),
}

impl fmt::Display for TaskOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskOutput::Users(users) => write!(f, "{} users", users.len()),
            TaskOutput::Updated(counts) => {
                write!(f, "matched {}, modified {}", counts.matched, counts.modified)
            }
            TaskOutput::SkillsSeeded(Some(user)) => {
                write!(f, "skills now {:?}", users::skills_of(user))
            }
            TaskOutput::SkillsSeeded(None) => write!(f, "no user updated"),
            TaskOutput::Deleted(count) => write!(f, "deleted {}", count),
            TaskOutput::ArticlesSeeded(summary) => write!(f, "{}", summary),
            TaskOutput::Articles(articles) => write!(f, "{} articles", articles.len()),
            TaskOutput::WorstHomework(Some(worst)) => {
                write!(f, "{} scored {}", worst.name, worst.worst_homework_score)
            }
            TaskOutput::WorstHomework(None) => write!(f, "no homework scores"),
            TaskOutput::HomeworkAverage(Some(avg)) => write!(f, "avg_score {:.2}", avg.avg_score),
            TaskOutput::HomeworkAverage(None) => write!(f, "no homework scores"),
            TaskOutput::TypeAverages(students) => match students.first().and_then(|s| s.best_average()) {
                Some(top) => write!(f, "{} students, top average {:.2}", students.len(), top),
                None => write!(f, "{} students", students.len()),
            },
        }
    }
}

// ==================== RUNNER ====================

#[derive(Debug)]
pub struct TaskOutcome {
    pub task: Task,
    pub error: Option<String>,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<TaskOutcome>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_none()).count()
    }

    pub fn failed(&self) -> Vec<&TaskOutcome> {
        self.outcomes.iter().filter(|o| o.error.is_some()).collect()
    }
}

/// Runs `tasks` in order. Every task is attempted exactly once whatever
/// happened to the previous ones.
pub async fn run_catalog(db: &MongoDB, tasks: &[Task]) -> RunReport {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    log::info!("🚀 Catalog run {} started ({} operations)", run_id, tasks.len());

    let mut outcomes = Vec::with_capacity(tasks.len());

    for &task in tasks {
        log::info!("▶️  {}", task);
        let start = Instant::now();

        let error = match task.execute(db).await {
            Ok(output) => {
                log::info!("   ✅ {}: {}", task.id(), output);
                match serde_json::to_string(&output) {
                    Ok(json) => log::debug!("   {} result: {}", task.id(), json),
                    Err(e) => log::debug!("   {} result not serializable: {}", task.id(), e),
                }
                None
            }
            Err(e) => {
                log::error!("   ❌ {}: {}", task.id(), e);
                Some(e.to_string())
            }
        };

        outcomes.push(TaskOutcome {
            task,
            error,
            elapsed: start.elapsed(),
        });
    }

    let report = RunReport {
        run_id,
        started_at,
        outcomes,
    };

    let elapsed = Utc::now().signed_duration_since(report.started_at);
    log::info!(
        "📊 Catalog run {} finished: {} succeeded, {} failed in {} ms",
        report.run_id,
        report.succeeded(),
        report.failed().len(),
        elapsed.num_milliseconds()
    );
    for outcome in report.failed() {
        log::warn!(
            "   {} failed after {} ms: {}",
            outcome.task.id(),
            outcome.elapsed.as_millis(),
            outcome.error.as_deref().unwrap_or_default()
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_order_and_ids() {
        let ids: Vec<&str> = Task::ALL.iter().map(|t| t.id()).collect();
        let expected: Vec<String> = (1..=12).map(|n| format!("task{}", n)).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_descriptions_are_distinct() {
        let descriptions: HashSet<&str> = Task::ALL.iter().map(|t| t.description()).collect();
        assert_eq!(descriptions.len(), Task::ALL.len());
    }

    #[test]
    fn test_task_display() {
        assert_eq!(
            Task::DeleteSupportUsers.to_string(),
            "task7 (delete all Support users)"
        );
    }

    #[test]
    fn test_output_summaries() {
        let updated = TaskOutput::Updated(UpdateCounts { matched: 3, modified: 2 });
        assert_eq!(updated.to_string(), "matched 3, modified 2");

        assert_eq!(TaskOutput::Deleted(4).to_string(), "deleted 4");
        assert_eq!(TaskOutput::WorstHomework(None).to_string(), "no homework scores");
        assert_eq!(
            TaskOutput::HomeworkAverage(Some(HomeworkAverage { avg_score: 40.0 })).to_string(),
            "avg_score 40.00"
        );

        let seeded = TaskOutput::SkillsSeeded(Some(doc! {
            "_id": 1,
            "skills": ["js", "git"],
        }));
        assert_eq!(seeded.to_string(), "skills now [\"js\", \"git\"]");
        assert_eq!(TaskOutput::TypeAverages(vec![]).to_string(), "0 students");
    }

    #[test]
    fn test_output_serializes_with_kind_tag() {
        let json = serde_json::to_value(TaskOutput::Deleted(2)).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "deleted", "result": 2 }));
    }

    #[test]
    fn test_report_counts() {
        let report = RunReport {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            outcomes: vec![
                TaskOutcome { task: Task::YoungestUsers, error: None, elapsed: Duration::ZERO },
                TaskOutcome {
                    task: Task::TagSkilledUsers,
                    error: Some("Database error: boom".into()),
                    elapsed: Duration::ZERO,
                },
                TaskOutcome { task: Task::SeedSkills, error: None, elapsed: Duration::ZERO },
            ],
        };

        assert_eq!(report.succeeded(), 2);
        let failed = report.failed();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].task, Task::TagSkilledUsers);
    }

    // ==================== LIVE ====================

    use crate::database::testing::{drop_test_database, test_database};
    use crate::database::{ARTICLES, USERS};
    use crate::seeds::sample_data_seed::seed_sample_data;
    use mongodb::bson::{doc, Document};

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_full_catalog_on_sample_data() {
        let db = test_database().await;
        seed_sample_data(&db).await.unwrap();

        let report = run_catalog(&db, &Task::ALL).await;
        assert_eq!(report.outcomes.len(), 12);
        assert!(report.failed().is_empty(), "failures: {:?}", report.failed());

        let support = db
            .collection::<Document>(USERS)
            .count_documents(doc! { "department": "Support" })
            .await
            .unwrap();
        assert_eq!(support, 0);

        let articles = db
            .collection::<Document>(ARTICLES)
            .count_documents(doc! {})
            .await
            .unwrap();
        assert_eq!(articles, 3);

        drop_test_database(db).await;
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_failure_does_not_stop_sequence() {
        let db = test_database().await;
        // A non-array `tags` makes $pull fail on the server
        db.collection::<Document>(USERS)
            .insert_one(doc! { "firstName": "Jason", "lastName": "Wood", "tags": "not-an-array" })
            .await
            .unwrap();

        let tasks = [Task::RemoveTag, Task::YoungestUsers, Task::HomeworkAverage];
        let report = run_catalog(&db, &tasks).await;

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.failed().len(), 1);
        assert_eq!(report.failed()[0].task, Task::RemoveTag);

        drop_test_database(db).await;
    }
}
