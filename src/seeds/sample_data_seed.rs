use crate::database::{MongoDB, STUDENTS, USERS};
use crate::models::{Address, Score, Student, User, EXAM, HOMEWORK, QUIZ};
use crate::utils::AppError;
use mongodb::bson::doc;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub students: usize,
}

/// Seeds `users` and `students` with a small fixed data set.
/// A collection that already holds documents is left alone.
pub async fn seed_sample_data(db: &MongoDB) -> Result<SeedSummary, AppError> {
    let mut summary = SeedSummary::default();

    let users = db.collection::<User>(USERS);
    let count = users.count_documents(doc! {}).await?;
    if count > 0 {
        log::info!("🌱 users: {} documents already present, skipping seed", count);
    } else {
        let result = users.insert_many(build_sample_users()).await?;
        summary.users = result.inserted_ids.len();
        log::info!("   ✅ Inserted {} sample users", summary.users);
    }

    let students = db.collection::<Student>(STUDENTS);
    let count = students.count_documents(doc! {}).await?;
    if count > 0 {
        log::info!("🌱 students: {} documents already present, skipping seed", count);
    } else {
        let result = students.insert_many(build_sample_students()).await?;
        summary.students = result.inserted_ids.len();
        log::info!("   ✅ Inserted {} sample students", summary.students);
    }

    Ok(summary)
}

fn user(first: &str, last: &str, age: i64, email: &str, state: &str, tags: &[&str]) -> User {
    User {
        first_name: Some(first.into()),
        last_name: Some(last.into()),
        age: Some(age),
        email: Some(email.into()),
        address: Some(Address {
            state: Some(state.into()),
        }),
        tags: Some(tags.iter().map(|t| t.to_string()).collect()),
        ..Default::default()
    }
}

/// Covers every user operation: the 25-29 age window, an Engineering tag,
/// a john* user in CA, an existing skills list and a Support member.
fn build_sample_users() -> Vec<User> {
    vec![
        user("Ava", "Young", 22, "ava.young@example.com", "NY", &["Sales"]),
        user("Ben", "Carter", 26, "ben.carter@example.com", "TX", &["Marketing"]),
        user("Cleo", "Diaz", 34, "cleo.diaz@example.com", "WA", &["Engineering"]),
        user("John", "Miller", 41, "John.Miller@example.com", "CA", &["Engineering", "Ops"]),
        User {
            skills: Some(vec!["python".into()]),
            ..user("Dana", "Lee", 29, "dana.lee@example.com", "OR", &["Design"])
        },
        User {
            department: Some("Support".into()),
            ..user("Eli", "Moss", 38, "eli.moss@example.com", "FL", &["Helpdesk"])
        },
        user("Fay", "Nolan", 52, "johnny.fay@example.com", "NV", &["Finance"]),
    ]
}

fn build_sample_students() -> Vec<Student> {
    let student = |name: &str, scores: Vec<Score>| Student {
        id: None,
        name: name.to_string(),
        scores,
    };

    vec![
        student(
            "Aimee Zank",
            vec![
                Score::new(EXAM, 1.46),
                Score::new(QUIZ, 11.78),
                Score::new(HOMEWORK, 35.87),
            ],
        ),
        student(
            "Aurelia Menendez",
            vec![
                Score::new(EXAM, 60.06),
                Score::new(QUIZ, 52.79),
                Score::new(HOMEWORK, 71.76),
            ],
        ),
        student(
            "Corliss Zuk",
            vec![
                Score::new(EXAM, 67.03),
                Score::new(QUIZ, 6.3),
                Score::new(HOMEWORK, 66.28),
                Score::new(HOMEWORK, 12.45),
            ],
        ),
        student(
            "Bao Ziglar",
            vec![
                Score::new(EXAM, 71.64),
                Score::new(QUIZ, 24.8),
                Score::new(HOMEWORK, 42.26),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_users_cover_every_operation() {
        let users = build_sample_users();

        assert!(users
            .iter()
            .any(|u| matches!(u.age, Some(a) if (25..30).contains(&a)) && u.skills.is_none()));
        assert!(users.iter().any(|u| {
            u.email.as_deref().map_or(false, |e| e.to_lowercase().starts_with("john"))
                && u.address.as_ref().and_then(|a| a.state.as_deref()) == Some("CA")
        }));
        assert!(users.iter().any(|u| u.skills.is_some()));
        assert!(users.iter().any(|u| u.department.as_deref() == Some("Support")));
    }

    #[test]
    fn test_every_sample_student_has_homework() {
        for student in build_sample_students() {
            assert!(student.scores.iter().any(|s| s.kind == HOMEWORK), "{}", student.name);
        }
    }

    use crate::database::testing::{drop_test_database, test_database};

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_seed_only_fills_empty_collections() {
        let db = test_database().await;

        let first = seed_sample_data(&db).await.unwrap();
        assert_eq!(first.users, build_sample_users().len());
        assert_eq!(first.students, build_sample_students().len());

        let second = seed_sample_data(&db).await.unwrap();
        assert_eq!(second, SeedSummary::default());

        drop_test_database(db).await;
    }
}
