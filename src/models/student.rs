use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

pub const HOMEWORK: &str = "homework";
pub const EXAM: &str = "exam";
pub const QUIZ: &str = "quiz";

/// Document in the "students" collection (read-only for the catalog)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Student {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<Bson>,
    pub name: String,
    #[serde(default)]
    pub scores: Vec<Score>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Score {
    #[serde(rename = "type")]
    pub kind: String,
    pub score: f64,
}

impl Score {
    pub fn new(kind: &str, score: f64) -> Self {
        Self {
            kind: kind.to_string(),
            score,
        }
    }
}

// ==================== AGGREGATION RESULTS ====================

/// Student holding the lowest homework score of the whole collection
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WorstHomework {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub student_id: Option<Bson>,
    pub name: String,
    pub worst_homework_score: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HomeworkAverage {
    pub avg_score: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TypeAverage {
    #[serde(rename = "type")]
    pub kind: String,
    pub avg_score: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StudentTypeAverages {
    #[serde(rename = "studentId")]
    pub student_id: Bson,
    pub scores: Vec<TypeAverage>,
}

impl StudentTypeAverages {
    /// Highest per-type average; the key students are ordered by.
    pub fn best_average(&self) -> Option<f64> {
        self.scores
            .iter()
            .filter_map(|s| s.avg_score)
            .fold(None, |best, v| Some(best.map_or(v, |b: f64| b.max(v))))
    }
}
