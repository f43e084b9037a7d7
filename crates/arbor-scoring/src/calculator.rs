use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use arbor_core::models::answer::Answer;
use arbor_core::models::question::Question;
use arbor_core::models::response::{Response, ResponseStatus};

use crate::error::ScoringError;
use crate::protocol;
use crate::rules::ScoringRules;

/// The authoritative scores for one completed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScoreOutcome {
    pub response_id: Uuid,
    pub total_score: i64,
    pub max_possible_score: i64,
    /// Scorable questions that could not contribute. Callers audit rule
    /// coverage from these; they are never silently dropped.
    pub gaps: Vec<CoverageGap>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CoverageGap {
    pub question_id: Uuid,
    pub kind: GapKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum GapKind {
    /// The question carries no scoring logic at all.
    MissingRules,
    /// No age band covers the child's age.
    NoBandForAge,
    /// The answer has no normalized bucket to look up.
    MissingBucket,
    /// The resolved mapping has no score for the answer's bucket.
    UnscoredBucket { bucket: String },
}

/// Compute `total_score` and `max_possible_score` for one completed
/// response.
///
/// `questions` is the full form structure of the response's section — the
/// maximum ranges over every scorable question, answered or not. A stored
/// answer score is used as-is; only unresolved answers go through the
/// protocol resolver. Coverage gaps contribute zero to both sums and are
/// flagged in the outcome.
pub fn score_response(
    response: &Response,
    answers: &[Answer],
    questions: &HashMap<Uuid, Question>,
    age_months: u32,
) -> Result<ScoreOutcome, ScoringError> {
    if response.status != ResponseStatus::Completed {
        return Err(ScoringError::NotCompleted {
            response_id: response.id,
            status: response.status,
        });
    }

    let mut gaps: Vec<CoverageGap> = Vec::new();

    // Validate every scorable question's rules up front. A question with no
    // logic at all is a coverage gap; malformed logic is an error.
    let mut rules_by_question: HashMap<Uuid, Option<ScoringRules>> = HashMap::new();
    for question in questions.values() {
        if !question.is_scorable {
            continue;
        }
        match &question.scoring_logic {
            Some(raw) => {
                rules_by_question.insert(question.id, Some(ScoringRules::from_value(raw)?));
            }
            None => {
                gaps.push(CoverageGap {
                    question_id: question.id,
                    kind: GapKind::MissingRules,
                });
                rules_by_question.insert(question.id, None);
            }
        }
    }

    let mut total_score = 0i64;
    for answer in answers {
        let question = questions
            .get(&answer.question_id)
            .ok_or(ScoringError::MissingQuestion {
                question_id: answer.question_id,
            })?;
        if !question.is_scorable {
            continue;
        }
        if let Some(stored) = answer.score {
            // A stored score is authoritative; later rule edits never
            // rewrite it implicitly.
            total_score += stored;
            continue;
        }
        let Some(Some(rules)) = rules_by_question.get(&question.id) else {
            continue; // flagged as MissingRules above
        };
        match protocol::resolve_band(rules, age_months) {
            None => gaps.push(CoverageGap {
                question_id: question.id,
                kind: GapKind::NoBandForAge,
            }),
            Some(band) => match &answer.answer_bucket {
                None => gaps.push(CoverageGap {
                    question_id: question.id,
                    kind: GapKind::MissingBucket,
                }),
                Some(bucket) => match band.score_for(bucket) {
                    Some(score) => total_score += score,
                    None => gaps.push(CoverageGap {
                        question_id: question.id,
                        kind: GapKind::UnscoredBucket {
                            bucket: bucket.clone(),
                        },
                    }),
                },
            },
        }
    }

    let mut max_possible_score = 0i64;
    for question in questions.values() {
        if !question.is_scorable {
            continue;
        }
        let Some(Some(rules)) = rules_by_question.get(&question.id) else {
            continue;
        };
        match protocol::resolve_band(rules, age_months) {
            Some(band) => max_possible_score += band.max_score(),
            None => {
                let already_flagged = gaps
                    .iter()
                    .any(|g| g.question_id == question.id && g.kind == GapKind::NoBandForAge);
                if !already_flagged {
                    gaps.push(CoverageGap {
                        question_id: question.id,
                        kind: GapKind::NoBandForAge,
                    });
                }
            }
        }
    }

    // Present gaps in form order.
    gaps.sort_by_key(|gap| {
        questions
            .get(&gap.question_id)
            .map(|q| q.order_number)
            .unwrap_or(i32::MAX)
    });

    Ok(ScoreOutcome {
        response_id: response.id,
        total_score,
        max_possible_score,
        gaps,
    })
}
