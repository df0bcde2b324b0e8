//! crates/tutor_core/src/roster.rs
//!
//! The student directory (the `students` map in the key-value store) and the
//! credential checks that gate the student and teacher views.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::{locale_date_today, NewStudent, Student};
use crate::ports::{get_typed, set_typed, KeyValueStore, PortError, PortResult};

pub const STUDENTS_KEY: &str = "students";

type StudentMap = BTreeMap<String, Student>;

/// Teacher-managed student accounts.
pub struct Roster {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl Roster {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> PortResult<StudentMap> {
        Ok(get_typed(self.store.as_ref(), STUDENTS_KEY)
            .await?
            .unwrap_or_default())
    }

    /// All students, ordered by id (which is creation order).
    pub async fn list(&self) -> PortResult<Vec<Student>> {
        Ok(self.load().await?.into_values().collect())
    }

    pub async fn get(&self, id: &str) -> PortResult<Student> {
        self.load()
            .await?
            .remove(id)
            .ok_or_else(|| PortError::NotFound(format!("Student {} not found", id)))
    }

    /// Registers a student. Numbers must be unique so a login names one account.
    pub async fn create(&self, new: NewStudent) -> PortResult<Student> {
        let name = new.name.trim();
        let number = new.number.trim();
        if name.is_empty() || number.is_empty() || new.password.is_empty() {
            return Err(PortError::Validation(
                "Name, number and password are all required.".to_string(),
            ));
        }

        let _guard = self.write_lock.lock().await;
        let mut students = self.load().await?;
        if students.values().any(|s| s.number == number) {
            return Err(PortError::Validation(format!(
                "Student number {} is already in use.",
                number
            )));
        }

        let mut millis = Utc::now().timestamp_millis();
        while students.contains_key(&format!("st_{}", millis)) {
            millis += 1;
        }
        let student = Student {
            id: format!("st_{}", millis),
            name: name.to_string(),
            number: number.to_string(),
            password: new.password,
            grade: new.grade,
            created_at: locale_date_today(),
        };
        students.insert(student.id.clone(), student.clone());
        set_typed(self.store.as_ref(), STUDENTS_KEY, &students).await?;
        info!("Created student {} ({})", student.id, student.grade.label());
        Ok(student)
    }

    /// Removes the account. The student's results stay in the store.
    pub async fn delete(&self, id: &str) -> PortResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut students = self.load().await?;
        if students.remove(id).is_none() {
            return Err(PortError::NotFound(format!("Student {} not found", id)));
        }
        set_typed(self.store.as_ref(), STUDENTS_KEY, &students).await?;
        info!("Deleted student {}", id);
        Ok(())
    }
}

//=========================================================================================
// Auth Gate
//=========================================================================================

/// Who a login session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Principal {
    Student { student_id: String },
    Teacher,
}

/// Flat credential checks: no hashing, lockout or expiry.
pub struct AuthGate {
    roster: Arc<Roster>,
    teacher_passphrase: String,
}

impl AuthGate {
    pub fn new(roster: Arc<Roster>, teacher_passphrase: String) -> Self {
        Self {
            roster,
            teacher_passphrase,
        }
    }

    pub async fn login_student(&self, number: &str, password: &str) -> PortResult<Student> {
        let found = self
            .roster
            .list()
            .await?
            .into_iter()
            .find(|s| s.number == number && s.password == password);
        match found {
            Some(student) => {
                info!("Student {} logged in", student.id);
                Ok(student)
            }
            None => {
                warn!("Rejected student login for number {}", number);
                Err(PortError::Validation(
                    "Incorrect student number or password.".to_string(),
                ))
            }
        }
    }

    pub fn login_teacher(&self, passphrase: &str) -> PortResult<()> {
        if bool::from(
            passphrase
                .as_bytes()
                .ct_eq(self.teacher_passphrase.as_bytes()),
        ) {
            info!("Teacher logged in");
            Ok(())
        } else {
            warn!("Rejected teacher login");
            Err(PortError::Validation(
                "Incorrect teacher passphrase.".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GradeBand;
    use crate::store::InMemoryStore;

    fn kim() -> NewStudent {
        NewStudent {
            name: "Kim".to_string(),
            number: "001".to_string(),
            password: "abcd".to_string(),
            grade: GradeBand::El56,
        }
    }

    fn gate() -> (Arc<Roster>, AuthGate) {
        let roster = Arc::new(Roster::new(Arc::new(InMemoryStore::new())));
        let gate = AuthGate::new(roster.clone(), "madl1234".to_string());
        (roster, gate)
    }

    #[tokio::test]
    async fn created_student_can_log_in() {
        let (roster, gate) = gate();
        let created = roster.create(kim()).await.unwrap();
        assert!(created.id.starts_with("st_"));

        let student = gate.login_student("001", "abcd").await.unwrap();
        assert_eq!(student, created);
        assert_eq!(student.grade, GradeBand::El56);
    }

    #[tokio::test]
    async fn wrong_password_is_a_validation_error() {
        let (roster, gate) = gate();
        roster.create(kim()).await.unwrap();
        let err = gate.login_student("001", "wrong").await.unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));
    }

    #[tokio::test]
    async fn duplicate_number_is_rejected() {
        let (roster, _) = gate();
        roster.create(kim()).await.unwrap();
        let err = roster
            .create(NewStudent {
                name: "Lee".to_string(),
                ..kim()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));
        assert_eq!(roster.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_fields_are_rejected() {
        let (roster, _) = gate();
        let err = roster
            .create(NewStudent {
                name: "  ".to_string(),
                ..kim()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));
    }

    #[tokio::test]
    async fn consecutive_creates_get_distinct_ids() {
        let (roster, _) = gate();
        let a = roster.create(kim()).await.unwrap();
        let b = roster
            .create(NewStudent {
                number: "002".to_string(),
                ..kim()
            })
            .await
            .unwrap();
        assert_ne!(a.id, b.id);
        let listed: Vec<_> = roster.list().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(listed, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn taken_millisecond_ids_are_skipped() {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now().timestamp_millis();
        let taken: StudentMap = (now..now + 1000)
            .enumerate()
            .map(|(n, millis)| {
                let id = format!("st_{}", millis);
                let student = Student {
                    id: id.clone(),
                    name: format!("Seed {}", n),
                    number: format!("s{}", n),
                    password: "pw".to_string(),
                    grade: GradeBand::Mid1,
                    created_at: "2026. 10. 18.".to_string(),
                };
                (id, student)
            })
            .collect();
        set_typed(store.as_ref(), STUDENTS_KEY, &taken).await.unwrap();
        let roster = Roster::new(store);

        let created = roster.create(kim()).await.unwrap();
        assert!(!taken.contains_key(&created.id));
        let millis: i64 = created.id.trim_start_matches("st_").parse().unwrap();
        assert!(millis >= now);

        let listed = roster.list().await.unwrap();
        assert_eq!(listed.len(), taken.len() + 1);
        assert_eq!(roster.get(&created.id).await.unwrap().number, "001");
    }

    #[tokio::test]
    async fn deleted_student_cannot_log_in() {
        let (roster, gate) = gate();
        let student = roster.create(kim()).await.unwrap();
        roster.delete(&student.id).await.unwrap();
        assert!(gate.login_student("001", "abcd").await.is_err());
        assert!(matches!(
            roster.delete(&student.id).await,
            Err(PortError::NotFound(_))
        ));
    }

    #[test]
    fn teacher_passphrase_must_match_exactly() {
        let (_, gate) = gate();
        assert!(gate.login_teacher("madl1234").is_ok());
        assert!(gate.login_teacher("madl123").is_err());
        assert!(gate.login_teacher("").is_err());
    }
}
