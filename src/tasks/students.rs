// ==================== STUDENTS STATISTICS ====================
// Read-only aggregations over `students` (tasks 10-12).

use crate::{
    database::{MongoDB, STUDENTS},
    models::{HomeworkAverage, Student, StudentTypeAverages, WorstHomework, HOMEWORK},
    pipeline::{field, Accumulator, Pipeline, SortOrder},
    utils::AppError,
};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Bson};
use serde::de::DeserializeOwned;

/// Lowest homework score across every student. Each student's entries are
/// sorted first so `$first` picks that student's worst; the global sort and
/// limit then keep the single lowest one.
pub fn worst_homework_pipeline() -> Pipeline {
    Pipeline::new()
        .unwind("scores")
        .filter(doc! { "scores.type": HOMEWORK })
        .sort(&[("scores.score", SortOrder::Ascending)])
        .group(
            field("_id"),
            vec![
                ("name", Accumulator::First(field("name").into())),
                ("worst_homework_score", Accumulator::First(field("scores.score").into())),
            ],
        )
        .sort(&[("worst_homework_score", SortOrder::Ascending)])
        .limit(1)
}

pub fn homework_average_pipeline() -> Pipeline {
    Pipeline::new()
        .unwind("scores")
        .filter(doc! { "scores.type": HOMEWORK })
        .group(
            Bson::Null,
            vec![
                ("totalHomeworkScores", Accumulator::Sum(field("scores.score").into())),
                ("count", Accumulator::Count),
            ],
        )
        .project(doc! {
            "_id": 0,
            "avg_score": { "$divide": ["$totalHomeworkScores", "$count"] },
        })
}

/// Per student, the average of each score type. Each `scores` list is pushed
/// in descending order; students are sorted by their best average (a
/// descending sort on an array field uses its largest element).
pub fn type_averages_pipeline() -> Pipeline {
    Pipeline::new()
        .unwind("scores")
        .group(
            doc! { "studentId": field("_id"), "scoreType": field("scores.type") },
            vec![("avg_score", Accumulator::Avg(field("scores.score").into()))],
        )
        .sort(&[("avg_score", SortOrder::Descending)])
        .group(
            field("_id.studentId"),
            vec![(
                "scores",
                Accumulator::Push(
                    doc! { "type": field("_id.scoreType"), "avg_score": field("avg_score") }.into(),
                ),
            )],
        )
        .project(doc! { "_id": 0, "studentId": field("_id"), "scores": 1 })
        .sort(&[("scores.avg_score", SortOrder::Descending)])
}

async fn aggregate<T>(db: &MongoDB, pipeline: Pipeline) -> Result<Vec<T>, AppError>
where
    T: DeserializeOwned + Send + Sync + Unpin,
{
    let students = db.collection::<Student>(STUDENTS);
    log::debug!("   aggregating students through {} stages", pipeline.stages().len());

    let cursor = students
        .aggregate(pipeline.to_documents())
        .with_type::<T>()
        .await?;

    Ok(cursor.try_collect().await?)
}

/// Task 10
pub async fn worst_homework(db: &MongoDB) -> Result<Option<WorstHomework>, AppError> {
    let results = aggregate::<WorstHomework>(db, worst_homework_pipeline()).await?;
    Ok(results.into_iter().next())
}

/// Task 11. `None` when no student has a homework entry.
pub async fn homework_average(db: &MongoDB) -> Result<Option<HomeworkAverage>, AppError> {
    let results = aggregate::<HomeworkAverage>(db, homework_average_pipeline()).await?;
    Ok(results.into_iter().next())
}

/// Task 12
pub async fn type_averages(db: &MongoDB) -> Result<Vec<StudentTypeAverages>, AppError> {
    aggregate(db, type_averages_pipeline()).await
}
