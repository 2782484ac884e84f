// src/services/scoring.rs

use crate::{
    error::AppError,
    models::{attempt::AttemptAnswer, test_series::Question},
};

/// Scores a normalized answer sheet against a question list.
///
/// Position i of the sheet is compared with question i by EXACT string
/// equality, no trimming or case folding; historical score parity
/// depends on the comparison staying exact. Positions with no answer
/// earn nothing, as do questions beyond the end of the sheet.
pub fn score_answers(questions: &[Question], answers: &[Option<String>]) -> i64 {
    questions
        .iter()
        .zip(answers.iter())
        .filter(|(question, answer)| answer.as_deref() == Some(question.correct_answer.as_str()))
        .map(|(question, _)| question.marks)
        .sum()
}

/// Builds the per-question trail persisted on a scored attempt.
/// Unanswered positions produce no entry.
pub fn build_answer_trail(
    questions: &[Question],
    answers: &[Option<String>],
) -> Vec<AttemptAnswer> {
    questions
        .iter()
        .zip(answers.iter())
        .filter_map(|(question, answer)| {
            answer.as_ref().map(|answer| AttemptAnswer {
                question_id: question.id,
                kind: "MCQ".to_string(),
                answer: answer.clone(),
                score: if *answer == question.correct_answer {
                    question.marks
                } else {
                    0
                },
            })
        })
        .collect()
}

/// Percentage (two decimals, rendered "NN.NN%") and letter grade for a
/// score. Zero total marks is rejected up front so the division can
/// never produce NaN or infinity.
pub fn grade_of(score: i64, total_marks: i64) -> Result<(String, &'static str), AppError> {
    if total_marks <= 0 {
        return Err(AppError::Validation(
            "Total marks must be greater than zero".to_string(),
        ));
    }

    // Round to two decimals first; the thresholds apply to the rounded
    // value, so 89.996 grades as 90.00 -> A+.
    let raw = score as f64 / total_marks as f64 * 100.0;
    let percentage = (raw * 100.0).round() / 100.0;

    let grade = if percentage >= 90.0 {
        "A+"
    } else if percentage >= 80.0 {
        "A"
    } else if percentage >= 70.0 {
        "B+"
    } else if percentage >= 60.0 {
        "B"
    } else if percentage >= 50.0 {
        "C"
    } else {
        "F"
    };

    Ok((format!("{:.2}%", percentage), grade))
}
