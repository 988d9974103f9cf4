use crate::models::exam::Question;

/// Outcome of one question after submission.
#[derive(Debug, Clone, PartialEq)]
pub struct GradedAnswer {
    pub question_id: String,
    pub prompt: String,
    pub selected: Option<usize>,
    pub selected_text: Option<String>,
    pub correct: Option<usize>,
    pub correct_text: Option<String>,
    pub is_correct: bool,
    pub points_earned: f64,
    pub max_points: f64,
    pub explanation: Option<String>,
}

pub struct GradingService;

impl GradingService {
    /// Local score in whole percent. Each question weighs its `points`
    /// (1 when absent), so an unweighted exam splits 100% evenly. A question
    /// without a known correct answer can never be earned. An empty exam
    /// scores 0.
    pub fn compute_score(questions: &[Question], answers: &[Option<usize>]) -> u32 {
        let graded = Self::grade(questions, answers);
        let max: f64 = graded.iter().map(|g| g.max_points).sum();
        if max <= 0.0 {
            return 0;
        }
        let earned: f64 = graded.iter().map(|g| g.points_earned).sum();
        ((earned / max) * 100.0).round().clamp(0.0, 100.0) as u32
    }

    pub fn is_passing(score: u32, passing_score: u32) -> bool {
        score >= passing_score
    }

    pub fn grade(questions: &[Question], answers: &[Option<usize>]) -> Vec<GradedAnswer> {
        questions
            .iter()
            .enumerate()
            .map(|(idx, q)| {
                let selected = answers.get(idx).copied().flatten();
                let is_correct = matches!((selected, q.correct_answer), (Some(s), Some(c)) if s == c);
                let max_points = q.weight();
                GradedAnswer {
                    question_id: q.id.clone(),
                    prompt: q.prompt.clone(),
                    selected,
                    selected_text: selected.and_then(|i| q.options.get(i).cloned()),
                    correct: q.correct_answer,
                    correct_text: q.correct_answer.and_then(|i| q.options.get(i).cloned()),
                    is_correct,
                    points_earned: if is_correct { max_points } else { 0.0 },
                    max_points,
                    explanation: q.explanation.clone(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(id: &str, correct: Option<usize>, points: Option<f64>) -> Question {
        Question {
            id: id.to_string(),
            prompt: format!("Question {}", id),
            options: vec!["A".into(), "B".into(), "C".into()],
            correct_answer: correct,
            explanation: Some("Because".into()),
            points,
        }
    }

    #[test]
    fn all_correct_scores_100_and_none_scores_0() {
        let questions = vec![q("1", Some(0), None), q("2", Some(2), None), q("3", Some(1), None)];
        assert_eq!(GradingService::compute_score(&questions, &[Some(0), Some(2), Some(1)]), 100);
        assert_eq!(GradingService::compute_score(&questions, &[Some(1), Some(0), Some(0)]), 0);
        assert_eq!(GradingService::compute_score(&questions, &[None, None, None]), 0);
    }

    #[test]
    fn empty_exam_scores_zero() {
        assert_eq!(GradingService::compute_score(&[], &[]), 0);
    }

    #[test]
    fn uniform_weighting_rounds_to_nearest() {
        let questions = vec![q("1", Some(0), None), q("2", Some(0), None), q("3", Some(0), None)];
        assert_eq!(GradingService::compute_score(&questions, &[Some(0), Some(0), None]), 67);
        assert_eq!(GradingService::compute_score(&questions, &[Some(0), None, None]), 33);
    }

    #[test]
    fn point_weights_shift_the_score() {
        let questions = vec![q("1", Some(0), Some(3.0)), q("2", Some(0), Some(1.0))];
        assert_eq!(GradingService::compute_score(&questions, &[Some(0), None]), 75);
    }

    #[test]
    fn short_answer_array_counts_missing_as_unanswered() {
        let questions = vec![q("1", Some(0), None), q("2", Some(0), None)];
        assert_eq!(GradingService::compute_score(&questions, &[Some(0)]), 50);
    }

    #[test]
    fn passing_threshold_is_inclusive() {
        assert!(GradingService::is_passing(70, 70));
        assert!(GradingService::is_passing(71, 70));
        assert!(!GradingService::is_passing(69, 70));
    }

    #[test]
    fn grade_reports_texts_and_explanations() {
        let graded = GradingService::grade(&[q("1", Some(2), None)], &[Some(1)]);
        assert_eq!(graded[0].selected_text.as_deref(), Some("B"));
        assert_eq!(graded[0].correct_text.as_deref(), Some("C"));
        assert!(!graded[0].is_correct);
        assert_eq!(graded[0].explanation.as_deref(), Some("Because"));
    }
}
