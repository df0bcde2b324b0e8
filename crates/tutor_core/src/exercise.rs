//! crates/tutor_core/src/exercise.rs
//!
//! The exercise pipeline shared by the reading, essay and exam-drill generators.
//!
//! A session moves through `Idle → Generating → Ready → Grading → Graded`.
//! The transitions are plain methods on `ExerciseSession` so the caller can
//! release its lock while the model is working: `begin_*` moves the session
//! into a busy phase and hands back what the slow step needs, `finish_*`
//! applies the result. A failed step puts the session back where it was.

use std::collections::{BTreeMap, HashMap};

use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::domain::{
    AttemptDetail, AttemptRecord, EssayParams, ExamDifficulty, ExamParams, ExerciseKind,
    FeedbackLevel, GradeBand, ReadingParams, ReadingTopic,
};
use crate::ledger::ResultLedger;
use crate::ports::{complete_as, LanguageModelService, PortError, PortResult};
use crate::prompts;

pub const READING_QUESTION_COUNTS: [u8; 3] = [3, 4, 5];
pub const EXAM_QUESTION_COUNTS: [u8; 3] = [3, 5, 7];
pub const MIN_EXAM_PASSAGE_CHARS: usize = 50;
pub const MIN_ESSAY_WORDS: usize = 10;

//=========================================================================================
// Model Response Shapes
//=========================================================================================

/// A single generated question. `kind` is the model's `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "type")]
    pub kind: String,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(deserialize_with = "answer_text")]
    pub answer: String,
    #[serde(default)]
    pub explanation_kr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passage_modified: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingSet {
    pub title: String,
    #[serde(default)]
    pub topic_kr: String,
    #[serde(rename = "wordCount", default, deserialize_with = "lenient_count")]
    pub word_count: Option<u32>,
    pub passage: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassageAnalysis {
    #[serde(default)]
    pub key_vocab: Vec<String>,
    #[serde(default)]
    pub grammar_points: Vec<String>,
    #[serde(default)]
    pub exam_tip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamDrill {
    #[serde(default)]
    pub passage_analysis: PassageAnalysis,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EssayTopic {
    pub topic_en: String,
    #[serde(default)]
    pub topic_kr: String,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub target: String,
}

impl EssayTopic {
    /// The topic used when the student types their own instead of asking the model.
    pub fn custom(topic: &str) -> Self {
        Self {
            topic_en: topic.to_string(),
            topic_kr: "직접 입력".to_string(),
            tips: vec![
                "자유롭게 써보세요!".to_string(),
                "영어로 생각을 표현해보세요".to_string(),
            ],
            target: "자유롭게".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EssayScores {
    #[serde(default, deserialize_with = "score")]
    pub grammar: u8,
    #[serde(default, deserialize_with = "score")]
    pub vocabulary: u8,
    #[serde(default, deserialize_with = "score")]
    pub content: u8,
    #[serde(default, deserialize_with = "score")]
    pub structure: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    #[serde(default)]
    pub original: String,
    #[serde(default)]
    pub corrected: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetterExpression {
    #[serde(default)]
    pub original: String,
    #[serde(default)]
    pub better: String,
    #[serde(default)]
    pub reason: String,
}

/// The rubric the essay grader returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EssayFeedback {
    #[serde(deserialize_with = "score")]
    pub score_total: u8,
    #[serde(default)]
    pub scores: EssayScores,
    #[serde(default)]
    pub good_points: Vec<String>,
    #[serde(default)]
    pub corrections: Vec<Correction>,
    #[serde(default)]
    pub better_expressions: Vec<BetterExpression>,
    #[serde(default)]
    pub overall_comment: String,
}

/// One entry of the free-text judge's reply.
#[derive(Debug, Deserialize)]
struct Judgment {
    #[serde(alias = "index", deserialize_with = "judgment_index")]
    i: usize,
    #[serde(default)]
    correct: bool,
}

/// Rounds and clamps a model-supplied score into 0..=100.
pub fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

fn score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let raw = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    raw.map(clamp_score)
        .ok_or_else(|| D::Error::custom(format!("expected a numeric score, found {}", value)))
}

fn answer_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!("expected an answer, found {}", other))),
    }
}

/// Models sometimes quote the index (`"i": "0"`).
fn judgment_index<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| D::Error::custom(format!("expected a question index, found {}", value)))
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

//=========================================================================================
// Generation
//=========================================================================================

/// Everything a student can ask a generator for.
#[derive(Debug, Clone)]
pub enum GenerationRequest {
    Reading(ReadingParams),
    Essay(EssayParams),
    Exam(ExamParams),
}

impl GenerationRequest {
    pub fn kind(&self) -> ExerciseKind {
        match self {
            GenerationRequest::Reading(_) => ExerciseKind::Reading,
            GenerationRequest::Essay(_) => ExerciseKind::Essay,
            GenerationRequest::Exam(_) => ExerciseKind::Exam,
        }
    }

    /// Checks the preconditions that must hold before any network call.
    pub fn validate(&self) -> PortResult<()> {
        match self {
            GenerationRequest::Reading(params) => {
                if !READING_QUESTION_COUNTS.contains(&params.question_count) {
                    return Err(PortError::Validation(format!(
                        "Reading sets have 3, 4 or 5 questions, not {}.",
                        params.question_count
                    )));
                }
            }
            GenerationRequest::Essay(_) => {}
            GenerationRequest::Exam(params) => {
                if params.passage.trim().chars().count() < MIN_EXAM_PASSAGE_CHARS {
                    return Err(PortError::Validation(format!(
                        "Please enter a passage of at least {} characters.",
                        MIN_EXAM_PASSAGE_CHARS
                    )));
                }
                if !EXAM_QUESTION_COUNTS.contains(&params.question_count) {
                    return Err(PortError::Validation(format!(
                        "Exam drills have 3, 5 or 7 questions, not {}.",
                        params.question_count
                    )));
                }
            }
        }
        Ok(())
    }

    /// Builds the prompt, calls the model and checks the reply's shape.
    pub async fn generate(
        &self,
        model: &dyn LanguageModelService,
        grade: GradeBand,
    ) -> PortResult<ExerciseContent> {
        match self {
            GenerationRequest::Reading(params) => {
                let prompt = prompts::reading_prompt(grade, params.topic, params.question_count);
                let set: ReadingSet =
                    complete_as(model, prompts::EDUCATION_EXPERT_SYSTEM, &prompt).await?;
                ensure_questions(&set.questions)?;
                if let Some(q) = set.questions.iter().find(|q| q.kind != "mc" && q.kind != "short") {
                    return Err(PortError::ModelResponse(format!(
                        "unknown reading question type '{}'",
                        q.kind
                    )));
                }
                Ok(ExerciseContent::Reading {
                    topic: params.topic,
                    set,
                })
            }
            GenerationRequest::Essay(params) => {
                if let Some(custom) = params
                    .custom_topic
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                {
                    return Ok(ExerciseContent::Essay {
                        topic: EssayTopic::custom(custom),
                    });
                }
                let prompt = prompts::essay_topic_prompt(grade, params.topic_type);
                let topic: EssayTopic =
                    complete_as(model, prompts::EDUCATION_EXPERT_SYSTEM, &prompt).await?;
                Ok(ExerciseContent::Essay { topic })
            }
            GenerationRequest::Exam(params) => {
                let prompt = prompts::exam_prompt(
                    &params.passage,
                    params.question_type,
                    params.difficulty,
                    params.question_count,
                );
                let drill: ExamDrill =
                    complete_as(model, prompts::EXAM_EXPERT_SYSTEM, &prompt).await?;
                ensure_questions(&drill.questions)?;
                Ok(ExerciseContent::Exam {
                    difficulty: params.difficulty,
                    drill,
                })
            }
        }
    }
}

fn ensure_questions(questions: &[Question]) -> PortResult<()> {
    if questions.is_empty() {
        return Err(PortError::ModelResponse(
            "the generated exercise has no questions".to_string(),
        ));
    }
    Ok(())
}

/// What a generator produced, ready to be answered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExerciseContent {
    Reading { topic: ReadingTopic, set: ReadingSet },
    Essay { topic: EssayTopic },
    Exam { difficulty: ExamDifficulty, drill: ExamDrill },
}

impl ExerciseContent {
    /// Number of answer slots: one per question, a single slot for an essay.
    pub fn answer_slots(&self) -> usize {
        match self {
            ExerciseContent::Reading { set, .. } => set.questions.len(),
            ExerciseContent::Essay { .. } => 1,
            ExerciseContent::Exam { drill, .. } => drill.questions.len(),
        }
    }
}

//=========================================================================================
// Grading
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GradingMode {
    Choice,
    FreeText,
}

/// How an option is displayed once results are frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionMark {
    Correct,
    WrongSelection,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionResult {
    pub index: usize,
    pub mode: GradingMode,
    pub is_correct: bool,
    pub given: Option<String>,
    pub answer: String,
    pub explanation_kr: String,
    pub option_marks: Vec<OptionMark>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GradeOutcome {
    Questions {
        results: Vec<QuestionResult>,
        correct: usize,
        total: usize,
        score: u8,
    },
    Essay {
        feedback: EssayFeedback,
        word_count: usize,
        score: u8,
    },
}

impl GradeOutcome {
    pub fn score(&self) -> u8 {
        match self {
            GradeOutcome::Questions { score, .. } | GradeOutcome::Essay { score, .. } => *score,
        }
    }
}

/// Parses the leading integer of an option label ("2", " 3.", "4번").
pub fn parse_option_index(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Compares a selected option with the 1-based answer key.
pub fn grade_choice(question: &Question, given: Option<&str>) -> (bool, Vec<OptionMark>) {
    let key = parse_option_index(&question.answer);
    let selected = given.and_then(parse_option_index);
    let is_correct = key.is_some() && selected == key;
    let marks = (1..=question.options.len() as i64)
        .map(|position| {
            if Some(position) == key {
                OptionMark::Correct
            } else if Some(position) == selected {
                OptionMark::WrongSelection
            } else {
                OptionMark::Neutral
            }
        })
        .collect();
    (is_correct, marks)
}

/// Rounds `correct / total` to a whole percentage.
pub fn percentage(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    clamp_score(correct as f64 / total as f64 * 100.0)
}

/// Asks the model to judge every free-text answer in one call.
///
/// Any failure marks the whole batch wrong: questions missing from the
/// returned map count as incorrect.
async fn judge_free_text(
    model: &dyn LanguageModelService,
    items: &[(usize, &str, &str)],
) -> HashMap<usize, bool> {
    let prompt = prompts::judge_prompt(items.iter().copied());
    match model.complete(prompts::JUDGE_SYSTEM, &prompt).await {
        Ok(Value::Array(entries)) => entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value::<Judgment>(entry).ok())
            .map(|j| (j.i, j.correct))
            .collect(),
        Ok(other) => {
            warn!("Judge reply was not an array, marking {} answers wrong: {}", items.len(), other);
            HashMap::new()
        }
        Err(e) => {
            warn!("Judge call failed, marking {} answers wrong: {}", items.len(), e);
            HashMap::new()
        }
    }
}

/// Grades a question list: choices locally, free text through one judge call.
pub async fn grade_questions(
    model: &dyn LanguageModelService,
    questions: &[Question],
    mode_of: impl Fn(&Question) -> GradingMode,
    answers: &BTreeMap<usize, String>,
) -> GradeOutcome {
    let free_text: Vec<(usize, &str, &str)> = questions
        .iter()
        .enumerate()
        .filter(|(_, q)| mode_of(q) == GradingMode::FreeText)
        .map(|(i, q)| {
            let given = answers.get(&i).map(String::as_str).unwrap_or("");
            (i, q.answer.as_str(), given)
        })
        .collect();

    let judged = if free_text.is_empty() {
        HashMap::new()
    } else {
        judge_free_text(model, &free_text).await
    };

    let results: Vec<QuestionResult> = questions
        .iter()
        .enumerate()
        .map(|(index, q)| {
            let given = answers.get(&index).cloned();
            let mode = mode_of(q);
            let (is_correct, option_marks) = match mode {
                GradingMode::Choice => grade_choice(q, given.as_deref()),
                GradingMode::FreeText => (judged.get(&index).copied().unwrap_or(false), Vec::new()),
            };
            QuestionResult {
                index,
                mode,
                is_correct,
                given,
                answer: q.answer.clone(),
                explanation_kr: q.explanation_kr.clone(),
                option_marks,
            }
        })
        .collect();

    let correct = results.iter().filter(|r| r.is_correct).count();
    let total = results.len();
    GradeOutcome::Questions {
        score: percentage(correct, total),
        results,
        correct,
        total,
    }
}

fn reading_mode(question: &Question) -> GradingMode {
    if question.kind == "mc" {
        GradingMode::Choice
    } else {
        GradingMode::FreeText
    }
}

fn exam_mode(question: &Question) -> GradingMode {
    if question.kind == "writing" {
        GradingMode::FreeText
    } else {
        GradingMode::Choice
    }
}

/// A frozen copy of a session taken when grading starts.
#[derive(Debug, Clone)]
pub struct GradingJob {
    pub content: ExerciseContent,
    pub answers: BTreeMap<usize, String>,
    pub grade: GradeBand,
}

impl GradingJob {
    pub async fn grade(
        &self,
        model: &dyn LanguageModelService,
        level: FeedbackLevel,
    ) -> PortResult<GradeOutcome> {
        match &self.content {
            ExerciseContent::Reading { set, .. } => {
                Ok(grade_questions(model, &set.questions, reading_mode, &self.answers).await)
            }
            ExerciseContent::Exam { drill, .. } => {
                Ok(grade_questions(model, &drill.questions, exam_mode, &self.answers).await)
            }
            ExerciseContent::Essay { topic } => {
                let essay = self.answers.get(&0).map(String::as_str).unwrap_or("");
                let feedback: EssayFeedback = complete_as(
                    model,
                    &prompts::essay_grade_system(self.grade, level),
                    &prompts::essay_grade_prompt(&topic.topic_en, essay),
                )
                .await?;
                Ok(GradeOutcome::Essay {
                    score: feedback.score_total,
                    word_count: essay.split_whitespace().count(),
                    feedback,
                })
            }
        }
    }

    /// The ledger entry for a finished grading pass.
    pub fn attempt_record(&self, outcome: &GradeOutcome) -> AttemptRecord {
        let score = outcome.score();
        let detail = match &self.content {
            ExerciseContent::Reading { topic, .. } => AttemptDetail::Reading {
                score,
                topic: topic.as_str().to_string(),
            },
            ExerciseContent::Essay { topic } => AttemptDetail::Essay {
                score,
                topic: topic.topic_en.chars().take(20).collect(),
            },
            ExerciseContent::Exam { difficulty, .. } => AttemptDetail::Naesin {
                score,
                difficulty: *difficulty,
            },
        };
        AttemptRecord::today(detail)
    }

    /// Grades the job and appends exactly one record to the student's ledger.
    pub async fn grade_and_record(
        &self,
        model: &dyn LanguageModelService,
        ledger: &ResultLedger,
        student_id: &str,
        level: FeedbackLevel,
    ) -> PortResult<GradeOutcome> {
        let outcome = self.grade(model, level).await?;
        ledger
            .append(student_id, self.attempt_record(&outcome))
            .await?;
        info!(
            "Graded {:?} exercise for student {}: {}",
            self.content_kind(),
            student_id,
            outcome.score()
        );
        Ok(outcome)
    }

    /// A session in `Grading` for this job, for when the live session was
    /// dropped while the model call was running.
    pub fn detached_session(&self) -> ExerciseSession {
        ExerciseSession {
            kind: self.content_kind(),
            grade: self.grade,
            phase: ExercisePhase::Grading,
            content: Some(self.content.clone()),
            answers: self.answers.clone(),
            outcome: None,
        }
    }

    fn content_kind(&self) -> ExerciseKind {
        match self.content {
            ExerciseContent::Reading { .. } => ExerciseKind::Reading,
            ExerciseContent::Essay { .. } => ExerciseKind::Essay,
            ExerciseContent::Exam { .. } => ExerciseKind::Exam,
        }
    }
}

//=========================================================================================
// Session State Machine
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExercisePhase {
    Idle,
    Generating,
    Ready,
    Grading,
    Graded,
}

/// One generate → answer → grade cycle for a single generator.
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseSession {
    pub kind: ExerciseKind,
    pub grade: GradeBand,
    pub phase: ExercisePhase,
    pub content: Option<ExerciseContent>,
    pub answers: BTreeMap<usize, String>,
    pub outcome: Option<GradeOutcome>,
}

fn in_progress() -> PortError {
    PortError::Validation("A request for this exercise is already in progress.".to_string())
}

impl ExerciseSession {
    pub fn new(kind: ExerciseKind, grade: GradeBand) -> Self {
        Self {
            kind,
            grade,
            phase: ExercisePhase::Idle,
            content: None,
            answers: BTreeMap::new(),
            outcome: None,
        }
    }

    /// `Idle | Ready | Graded → Generating`. A rejected request leaves the session untouched.
    pub fn begin_generation(&mut self, request: &GenerationRequest) -> PortResult<()> {
        if request.kind() != self.kind {
            return Err(PortError::Validation(format!(
                "A {:?} request cannot start a {:?} exercise.",
                request.kind(),
                self.kind
            )));
        }
        if matches!(self.phase, ExercisePhase::Generating | ExercisePhase::Grading) {
            return Err(in_progress());
        }
        request.validate()?;
        self.content = None;
        self.answers.clear();
        self.outcome = None;
        self.phase = ExercisePhase::Generating;
        Ok(())
    }

    /// `Generating → Ready` on success, `Generating → Idle` on failure.
    pub fn finish_generation(
        &mut self,
        result: PortResult<ExerciseContent>,
    ) -> PortResult<&ExerciseContent> {
        if self.phase != ExercisePhase::Generating {
            return Err(PortError::Unexpected(format!(
                "generation finished while session was {:?}",
                self.phase
            )));
        }
        match result {
            Ok(content) => {
                self.phase = ExercisePhase::Ready;
                Ok(&*self.content.insert(content))
            }
            Err(e) => {
                self.phase = ExercisePhase::Idle;
                Err(e)
            }
        }
    }

    pub fn record_answer(&mut self, index: usize, answer: String) -> PortResult<()> {
        if self.phase != ExercisePhase::Ready {
            return Err(PortError::Validation(
                "Answers can only be changed while the exercise is open.".to_string(),
            ));
        }
        let slots = self.content.as_ref().map_or(0, ExerciseContent::answer_slots);
        if index >= slots {
            return Err(PortError::Validation(format!(
                "Question {} does not exist.",
                index
            )));
        }
        self.answers.insert(index, answer);
        Ok(())
    }

    /// `Ready → Grading`. A session is graded at most once.
    pub fn begin_grading(&mut self) -> PortResult<GradingJob> {
        match self.phase {
            ExercisePhase::Ready => {}
            ExercisePhase::Graded => {
                return Err(PortError::Validation(
                    "This exercise has already been graded.".to_string(),
                ))
            }
            ExercisePhase::Generating | ExercisePhase::Grading => return Err(in_progress()),
            ExercisePhase::Idle => {
                return Err(PortError::Validation(
                    "Generate an exercise before grading.".to_string(),
                ))
            }
        }
        let content = self
            .content
            .clone()
            .ok_or_else(|| PortError::Unexpected("ready session without content".to_string()))?;
        if matches!(content, ExerciseContent::Essay { .. }) {
            let words = self
                .answers
                .get(&0)
                .map_or(0, |text| text.split_whitespace().count());
            if words == 0 {
                return Err(PortError::Validation(
                    "Write your essay before submitting.".to_string(),
                ));
            }
            if words < MIN_ESSAY_WORDS {
                return Err(PortError::Validation(format!(
                    "Essays need at least {} words; this one has {}.",
                    MIN_ESSAY_WORDS, words
                )));
            }
        }
        self.phase = ExercisePhase::Grading;
        Ok(GradingJob {
            content,
            answers: self.answers.clone(),
            grade: self.grade,
        })
    }

    /// `Grading → Graded` on success, `Grading → Ready` on failure.
    pub fn finish_grading(&mut self, result: PortResult<GradeOutcome>) -> PortResult<&GradeOutcome> {
        if self.phase != ExercisePhase::Grading {
            return Err(PortError::Unexpected(format!(
                "grading finished while session was {:?}",
                self.phase
            )));
        }
        match result {
            Ok(outcome) => {
                self.phase = ExercisePhase::Graded;
                Ok(&*self.outcome.insert(outcome))
            }
            Err(e) => {
                self.phase = ExercisePhase::Ready;
                Err(e)
            }
        }
    }

    /// Discards the exercise and returns to `Idle`.
    pub fn reset(&mut self) -> PortResult<()> {
        if matches!(self.phase, ExercisePhase::Generating | ExercisePhase::Grading) {
            return Err(in_progress());
        }
        *self = Self::new(self.kind, self.grade);
        Ok(())
    }
}
