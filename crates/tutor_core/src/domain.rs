//! crates/tutor_core/src/domain.rs
//!
//! Defines the core data structures for the tutoring application: students,
//! grade bands, the attempt records kept in the ledger and the parameters a
//! student picks before an exercise is generated.
//!
//! Field names on the persisted types follow the stored JSON layout, so a
//! record written by one version can be read back by the next.

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Students
//=========================================================================================

/// The school year band a student belongs to. Drives passage length and tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeBand {
    El34,
    El56,
    Mid1,
    Mid2,
    High,
}

impl GradeBand {
    /// Level description embedded in generation prompts.
    pub fn description(self) -> &'static str {
        match self {
            GradeBand::El34 => "elementary grade 3-4 (simple sentences, 80-100 words)",
            GradeBand::El56 => "elementary grade 5-6 (moderate sentences, 120-150 words)",
            GradeBand::Mid1 => "middle school grade 1 (compound sentences, 150-180 words)",
            GradeBand::Mid2 => "middle school grade 2-3 (complex sentences, 180-220 words)",
            GradeBand::High => "high school level (advanced, 200-250 words)",
        }
    }

    /// Human-readable label shown to teachers and guardians.
    pub fn label(self) -> &'static str {
        match self {
            GradeBand::El34 => "초등 3-4학년",
            GradeBand::El56 => "초등 5-6학년",
            GradeBand::Mid1 => "중등 1학년",
            GradeBand::Mid2 => "중등 2-3학년",
            GradeBand::High => "고등학생",
        }
    }

    /// Expected essay length for this band.
    pub fn essay_length(self) -> &'static str {
        match self {
            GradeBand::El34 => "3-5 sentences",
            GradeBand::El56 => "5-8 sentences",
            GradeBand::Mid1 => "1 paragraph",
            GradeBand::Mid2 => "2-3 paragraphs",
            GradeBand::High => "3-4 paragraphs",
        }
    }
}

/// A student account created by the teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub number: String,
    pub password: String,
    pub grade: GradeBand,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// The fields a teacher supplies when registering a student.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub number: String,
    pub password: String,
    pub grade: GradeBand,
}

//=========================================================================================
// Attempt Records
//=========================================================================================

/// The kinds of records a ledger can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptKind {
    Reading,
    Essay,
    Naesin,
    Classcard,
}

/// Scores from the external drilling product, typed in by the teacher as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClasscardScores {
    #[serde(default)]
    pub vocab: String,
    #[serde(default)]
    pub grammar: String,
    #[serde(default)]
    pub listening: String,
}

/// The type-specific part of an attempt record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AttemptDetail {
    // A missing score counts as 0.
    Reading {
        #[serde(default)]
        score: u8,
        topic: String,
    },
    Essay {
        #[serde(default)]
        score: u8,
        topic: String,
    },
    Naesin {
        #[serde(default)]
        score: u8,
        difficulty: ExamDifficulty,
    },
    Classcard(ClasscardScores),
}

/// One scored exercise outcome stored permanently against a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    #[serde(flatten)]
    pub detail: AttemptDetail,
    pub date: String,
}

impl AttemptRecord {
    /// Stamps `detail` with today's date.
    pub fn today(detail: AttemptDetail) -> Self {
        Self {
            detail,
            date: locale_date_today(),
        }
    }

    pub fn kind(&self) -> AttemptKind {
        match self.detail {
            AttemptDetail::Reading { .. } => AttemptKind::Reading,
            AttemptDetail::Essay { .. } => AttemptKind::Essay,
            AttemptDetail::Naesin { .. } => AttemptKind::Naesin,
            AttemptDetail::Classcard(_) => AttemptKind::Classcard,
        }
    }

    /// The 0-100 score, absent for classcard entries.
    pub fn score(&self) -> Option<u8> {
        match self.detail {
            AttemptDetail::Reading { score, .. }
            | AttemptDetail::Essay { score, .. }
            | AttemptDetail::Naesin { score, .. } => Some(score),
            AttemptDetail::Classcard(_) => None,
        }
    }
}

/// Formats today's date the way the ko-KR locale does (`2026. 10. 18.`).
pub fn locale_date_today() -> String {
    let now = Local::now();
    format!("{}. {}. {}.", now.year(), now.month(), now.day())
}

//=========================================================================================
// Generation Parameters
//=========================================================================================

/// Which generator an exercise session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseKind {
    Reading,
    Essay,
    Exam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingTopic {
    Animals,
    Science,
    Culture,
    Health,
    Environment,
    Sports,
    History,
}

impl ReadingTopic {
    pub fn as_str(self) -> &'static str {
        match self {
            ReadingTopic::Animals => "animals",
            ReadingTopic::Science => "science",
            ReadingTopic::Culture => "culture",
            ReadingTopic::Health => "health",
            ReadingTopic::Environment => "environment",
            ReadingTopic::Sports => "sports",
            ReadingTopic::History => "history",
        }
    }
}

fn default_reading_count() -> u8 {
    4
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadingParams {
    pub topic: ReadingTopic,
    #[serde(default = "default_reading_count")]
    pub question_count: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EssayTopicType {
    Opinion,
    Description,
    Narrative,
    Argument,
}

impl EssayTopicType {
    pub fn as_str(self) -> &'static str {
        match self {
            EssayTopicType::Opinion => "opinion",
            EssayTopicType::Description => "description",
            EssayTopicType::Narrative => "narrative",
            EssayTopicType::Argument => "argument",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EssayParams {
    pub topic_type: EssayTopicType,
    #[serde(default)]
    pub custom_topic: Option<String>,
}

/// How hard the essay grader should be on the student.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackLevel {
    Gentle,
    #[default]
    Balanced,
    Strict,
}

impl FeedbackLevel {
    pub fn instruction(self) -> &'static str {
        match self {
            FeedbackLevel::Gentle => "Be very encouraging.",
            FeedbackLevel::Balanced => "Be balanced.",
            FeedbackLevel::Strict => "Be thorough.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamQuestionType {
    Mixed,
    Blank,
    Grammar,
    Writing,
}

impl ExamQuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ExamQuestionType::Mixed => "mixed",
            ExamQuestionType::Blank => "blank",
            ExamQuestionType::Grammar => "grammar",
            ExamQuestionType::Writing => "writing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamDifficulty {
    Easy,
    Mid,
    Hard,
}

impl ExamDifficulty {
    pub fn description(self) -> &'static str {
        match self {
            ExamDifficulty::Easy => "중간고사 기본",
            ExamDifficulty::Mid => "기말고사 표준",
            ExamDifficulty::Hard => "고난도 1등급",
        }
    }
}

fn default_exam_count() -> u8 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExamParams {
    pub passage: String,
    pub question_type: ExamQuestionType,
    pub difficulty: ExamDifficulty,
    #[serde(default = "default_exam_count")]
    pub question_count: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn attempt_record_uses_flat_stored_layout() {
        let record = AttemptRecord {
            detail: AttemptDetail::Reading {
                score: 75,
                topic: "animals".to_string(),
            },
            date: "2026. 10. 18.".to_string(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({"type": "reading", "score": 75, "topic": "animals", "date": "2026. 10. 18."})
        );
    }

    #[test]
    fn classcard_record_has_no_score() {
        let value = json!({
            "type": "classcard",
            "date": "2026. 10. 1.",
            "vocab": "92/100",
            "grammar": "B+",
            "listening": "18/20"
        });
        let record: AttemptRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.kind(), AttemptKind::Classcard);
        assert_eq!(record.score(), None);
    }

    #[test]
    fn student_keeps_camel_case_created_at() {
        let student = Student {
            id: "st_1".to_string(),
            name: "Kim".to_string(),
            number: "001".to_string(),
            password: "abcd".to_string(),
            grade: GradeBand::El56,
            created_at: "2026. 10. 18.".to_string(),
        };
        let value = serde_json::to_value(&student).unwrap();
        assert_eq!(value["createdAt"], "2026. 10. 18.");
        assert_eq!(value["grade"], "el56");
    }
}
