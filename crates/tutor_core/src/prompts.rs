//! crates/tutor_core/src/prompts.rs
//!
//! Prompt templates for every model call the tutor makes. Each template ends
//! with a literal example of the JSON shape the caller will deserialize.

use crate::domain::{
    AttemptRecord, EssayTopicType, ExamDifficulty, ExamQuestionType, FeedbackLevel, GradeBand,
    ReadingTopic, Student,
};

pub const EDUCATION_EXPERT_SYSTEM: &str =
    "You are an English education expert. Respond ONLY with valid JSON.";

pub const EXAM_EXPERT_SYSTEM: &str =
    "You are a Korean high school English exam expert. Respond ONLY with valid JSON.";

pub const JUDGE_SYSTEM: &str =
    r#"Judge answers. Return ONLY JSON array like [{"i":0,"correct":true}]"#;

pub const REPORT_SYSTEM: &str = "You are a Korean English tutor writing a parent report. Write in warm, professional Korean. Respond ONLY with valid JSON.";

const READING_TEMPLATE: &str = r#"Create an English reading passage for {grade} students. Topic: {topic}. Make {count} questions (mix mc and short).
Return ONLY: {"title":"...","topic_kr":"...","wordCount":120,"passage":"...","questions":[{"type":"mc","question":"?","options":["① A","② B","③ C","④ D"],"answer":"2","explanation_kr":"..."},{"type":"short","question":"?","answer":"...","explanation_kr":"..."}]}"#;

const ESSAY_TOPIC_TEMPLATE: &str = r#"Create essay topic for {grade} students. Type: {kind}.
Return ONLY: {"topic_en":"...","topic_kr":"...","tips":["팁1","팁2","팁3"],"target":"{target}"}"#;

const ESSAY_GRADE_SHAPE: &str = r#"Return ONLY: {"score_total":85,"scores":{"grammar":80,"vocabulary":85,"content":90,"structure":85},"good_points":["...","..."],"corrections":[{"original":"...","corrected":"...","reason":"..."}],"better_expressions":[{"original":"...","better":"...","reason":"..."}],"overall_comment":"..."}"#;

const EXAM_TEMPLATE: &str = r#"Create {count} exam questions. Difficulty: {difficulty}. Type: {kind}.
Passage: """{passage}"""
Return ONLY: {"passage_analysis":{"key_vocab":["word(뜻)"],"grammar_points":["..."],"exam_tip":"..."},"questions":[{"type":"blank","question":"지시문","passage_modified":"빈칸지문","options":["① ","② ","③ ","④ ","⑤ "],"answer":"3","explanation_kr":"..."}]}"#;

const REPORT_SHAPE: &str = r#"Return ONLY: {"report": "학부모님께\n\n[이번 주 요약]\n...\n\n[잘한 점]\n...\n\n[보완할 점]\n...\n\n[다음 주 방향]\n...\n\nAI 영어 학습 툴 드림"}"#;

pub fn reading_prompt(grade: GradeBand, topic: ReadingTopic, count: u8) -> String {
    READING_TEMPLATE
        .replace("{grade}", grade.description())
        .replace("{topic}", topic.as_str())
        .replace("{count}", &count.to_string())
}

pub fn essay_topic_prompt(grade: GradeBand, kind: EssayTopicType) -> String {
    ESSAY_TOPIC_TEMPLATE
        .replace("{grade}", grade.description())
        .replace("{kind}", kind.as_str())
        .replace("{target}", grade.essay_length())
}

pub fn essay_grade_system(grade: GradeBand, level: FeedbackLevel) -> String {
    format!(
        "English essay teacher for {}. {} Respond ONLY with valid JSON.",
        grade.label(),
        level.instruction()
    )
}

pub fn essay_grade_prompt(topic: &str, essay: &str) -> String {
    format!(
        "Grade: Topic:\"{}\" Essay:\"{}\"\n{}",
        topic, essay, ESSAY_GRADE_SHAPE
    )
}

pub fn exam_prompt(
    passage: &str,
    kind: ExamQuestionType,
    difficulty: ExamDifficulty,
    count: u8,
) -> String {
    EXAM_TEMPLATE
        .replace("{count}", &count.to_string())
        .replace("{difficulty}", difficulty.description())
        .replace("{kind}", kind.as_str())
        .replacen("{passage}", passage, 1)
}

/// One line per free-text question: `Q{i}: expected="...", student="..."`.
pub fn judge_prompt<'a>(items: impl IntoIterator<Item = (usize, &'a str, &'a str)>) -> String {
    items
        .into_iter()
        .map(|(index, expected, given)| {
            format!("Q{}: expected=\"{}\", student=\"{}\"", index, expected, given)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn report_prompt(student: &Student, recent: &[AttemptRecord]) -> String {
    let results = serde_json::to_string(recent).unwrap_or_else(|_| "[]".to_string());
    format!(
        "Write a weekly parent report for {} ({}).\nRecent results: {}\n{}",
        student.name,
        student.grade.label(),
        results,
        REPORT_SHAPE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_prompt_embeds_band_topic_and_count() {
        let prompt = reading_prompt(GradeBand::El56, ReadingTopic::Science, 4);
        assert!(prompt.starts_with(
            "Create an English reading passage for elementary grade 5-6 (moderate sentences, 120-150 words) students. Topic: science. Make 4 questions"
        ));
        assert!(prompt.contains(r#""wordCount":120"#));
    }

    #[test]
    fn essay_topic_prompt_seeds_target_length() {
        let prompt = essay_topic_prompt(GradeBand::High, EssayTopicType::Argument);
        assert!(prompt.contains("Type: argument."));
        assert!(prompt.contains(r#""target":"3-4 paragraphs""#));
    }

    #[test]
    fn essay_grade_system_uses_label_and_level() {
        assert_eq!(
            essay_grade_system(GradeBand::Mid1, FeedbackLevel::Strict),
            "English essay teacher for 중등 1학년. Be thorough. Respond ONLY with valid JSON."
        );
    }

    #[test]
    fn essay_text_is_not_reinterpreted_as_placeholder() {
        let prompt = essay_grade_prompt("My Dog", "I wrote {topic} here.");
        assert!(prompt.starts_with(r#"Grade: Topic:"My Dog" Essay:"I wrote {topic} here.""#));
    }

    #[test]
    fn judge_prompt_lists_one_line_per_question() {
        let prompt = judge_prompt(vec![(1, "cats", "Cats"), (3, "rain", "")]);
        assert_eq!(
            prompt,
            "Q1: expected=\"cats\", student=\"Cats\"\nQ3: expected=\"rain\", student=\"\""
        );
    }

    #[test]
    fn report_template_keeps_escaped_newlines_for_the_model() {
        let student = Student {
            id: "st_1".to_string(),
            name: "Kim".to_string(),
            number: "001".to_string(),
            password: "abcd".to_string(),
            grade: GradeBand::El56,
            created_at: "2026. 10. 18.".to_string(),
        };
        let prompt = report_prompt(&student, &[]);
        assert!(prompt.starts_with("Write a weekly parent report for Kim (초등 5-6학년)."));
        assert!(prompt.contains("Recent results: []"));
        assert!(prompt.contains(r"학부모님께\n\n[이번 주 요약]"));
    }
}
