use serde::Serialize;

use exam_core::ledger::AnswerEntry;
use exam_core::session::ExamSession;

/// Display state of one cell in the question palette.
///
/// Precedence when states overlap: an answered question that is also
/// marked renders as `AnsweredMarked`, answers beat marks, marks beat
/// plain visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PaletteStatus {
    NotVisited,
    Visited,
    Answered,
    Marked,
    AnsweredMarked,
}

impl PaletteStatus {
    #[must_use]
    pub fn for_entry(entry: &AnswerEntry) -> Self {
        match (entry.selected().is_some(), entry.is_marked_for_review()) {
            (true, true) => PaletteStatus::AnsweredMarked,
            (true, false) => PaletteStatus::Answered,
            (false, true) => PaletteStatus::Marked,
            (false, false) if entry.is_visited() => PaletteStatus::Visited,
            (false, false) => PaletteStatus::NotVisited,
        }
    }
}

/// Palette states for every question in display order.
#[must_use]
pub fn palette(session: &ExamSession) -> Vec<PaletteStatus> {
    session
        .ledger()
        .entries()
        .iter()
        .map(PaletteStatus::for_entry)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::ledger::ExamMode;
    use exam_core::model::{DepartmentId, ExamBlueprint, ExamId, OptionIndex, Question, QuestionId};
    use exam_core::time::fixed_now;

    fn build_session(n: u64) -> ExamSession {
        let blueprint = ExamBlueprint::new(
            ExamId::new(1),
            DepartmentId::new(1),
            "Palette Exam",
            600,
            u32::try_from(n).unwrap(),
        )
        .unwrap();
        let questions = (0..n)
            .map(|i| {
                Question::new(
                    QuestionId::new(i + 1),
                    format!("Q{}", i + 1),
                    None,
                    ["A", "B", "C", "D"].map(String::from),
                    OptionIndex::new(0).unwrap(),
                )
                .unwrap()
            })
            .collect();
        ExamSession::begin(blueprint, questions, ExamMode::Exam, fixed_now()).unwrap()
    }

    #[test]
    fn palette_covers_all_states_with_precedence() {
        let mut session = build_session(5);
        // 0: visited on begin, then answered + marked
        session.select_option(0, OptionIndex::new(2).unwrap()).unwrap();
        session.toggle_review(0).unwrap();
        // 1: answered only
        session.select_option(1, OptionIndex::new(1).unwrap()).unwrap();
        // 2: marked only
        session.toggle_review(2).unwrap();
        // 3: visited only
        session.jump_to(3).unwrap();
        // 4: untouched

        assert_eq!(
            palette(&session),
            vec![
                PaletteStatus::AnsweredMarked,
                PaletteStatus::Answered,
                PaletteStatus::Marked,
                PaletteStatus::Visited,
                PaletteStatus::NotVisited,
            ]
        );
    }

    #[test]
    fn unmarking_falls_back_to_answered_or_visited() {
        let mut session = build_session(2);
        session.select_option(0, OptionIndex::new(0).unwrap()).unwrap();
        session.toggle_review(0).unwrap();
        session.toggle_review(0).unwrap();
        assert_eq!(palette(&session)[0], PaletteStatus::Answered);

        session.toggle_review(1).unwrap();
        session.toggle_review(1).unwrap();
        // never visited, so it drops back to not visited rather than visited
        assert_eq!(palette(&session)[1], PaletteStatus::NotVisited);
    }

    #[test]
    fn serializes_as_camel_case_tags() {
        let json = serde_json::to_value(PaletteStatus::AnsweredMarked).unwrap();
        assert_eq!(json, "answeredMarked");
    }
}
