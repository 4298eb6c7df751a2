// ==================== AGGREGATION PIPELINE DESCRIPTORS ====================
// Typed description of the stages the catalog sends to `aggregate`.
// Stages are rendered to BSON and evaluated by the server; nothing here
// executes a pipeline locally.

use mongodb::bson::{doc, Bson, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_i32(self) -> i32 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

/// `$group` accumulator. Expressions are plain BSON so field paths
/// (`"$scores.score"`) and sub-documents can be mixed.
#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    First(Bson),
    Sum(Bson),
    Avg(Bson),
    Push(Bson),
    /// `{ $sum: 1 }`
    Count,
}

impl Accumulator {
    fn to_document(&self) -> Document {
        match self {
            Accumulator::First(expr) => doc! { "$first": expr.clone() },
            Accumulator::Sum(expr) => doc! { "$sum": expr.clone() },
            Accumulator::Avg(expr) => doc! { "$avg": expr.clone() },
            Accumulator::Push(expr) => doc! { "$push": expr.clone() },
            Accumulator::Count => doc! { "$sum": 1 },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Field name without the leading `$`
    Unwind(String),
    Match(Document),
    Sort(Vec<(String, SortOrder)>),
    Group {
        id: Bson,
        fields: Vec<(String, Accumulator)>,
    },
    Project(Document),
    Limit(i64),
}

impl Stage {
    pub fn to_document(&self) -> Document {
        match self {
            Stage::Unwind(path) => doc! { "$unwind": field(path) },
            Stage::Match(filter) => doc! { "$match": filter.clone() },
            Stage::Sort(keys) => {
                let mut spec = Document::new();
                for (key, order) in keys {
                    spec.insert(key.clone(), order.as_i32());
                }
                doc! { "$sort": spec }
            }
            Stage::Group { id, fields } => {
                let mut spec = doc! { "_id": id.clone() };
                for (name, accumulator) in fields {
                    spec.insert(name.clone(), accumulator.to_document());
                }
                doc! { "$group": spec }
            }
            Stage::Project(spec) => doc! { "$project": spec.clone() },
            Stage::Limit(n) => doc! { "$limit": *n },
        }
    }
}

/// Ordered list of stages, built fluently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unwind(mut self, path: &str) -> Self {
        self.stages.push(Stage::Unwind(path.to_string()));
        self
    }

    pub fn filter(mut self, filter: Document) -> Self {
        self.stages.push(Stage::Match(filter));
        self
    }

    pub fn sort(mut self, keys: &[(&str, SortOrder)]) -> Self {
        let keys = keys.iter().map(|(k, o)| (k.to_string(), *o)).collect();
        self.stages.push(Stage::Sort(keys));
        self
    }

    pub fn group(mut self, id: impl Into<Bson>, fields: Vec<(&str, Accumulator)>) -> Self {
        let fields = fields.into_iter().map(|(n, a)| (n.to_string(), a)).collect();
        self.stages.push(Stage::Group {
            id: id.into(),
            fields,
        });
        self
    }

    pub fn project(mut self, spec: Document) -> Self {
        self.stages.push(Stage::Project(spec));
        self
    }

    pub fn limit(mut self, n: i64) -> Self {
        self.stages.push(Stage::Limit(n));
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn to_documents(&self) -> Vec<Document> {
        self.stages.iter().map(Stage::to_document).collect()
    }
}

/// Field path reference: `field("scores.score")` -> `"$scores.score"`.
pub fn field(path: &str) -> String {
    format!("${}", path)
}
