use time::PrimitiveDateTime;

use crate::db::models::Exam;

/// Where `now` falls relative to an exam's window. All values are UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExamWindow {
    NotStarted,
    Open,
    Closed,
}

/// Both bounds are inclusive.
pub(crate) fn window(
    start: PrimitiveDateTime,
    end: PrimitiveDateTime,
    now: PrimitiveDateTime,
) -> ExamWindow {
    if now < start {
        ExamWindow::NotStarted
    } else if now > end {
        ExamWindow::Closed
    } else {
        ExamWindow::Open
    }
}

pub(crate) fn exam_window(exam: &Exam, now: PrimitiveDateTime) -> ExamWindow {
    window(exam.start_time, exam.end_time, now)
}

pub(crate) fn is_available(exam: &Exam, now: PrimitiveDateTime) -> bool {
    exam_window(exam, now) == ExamWindow::Open
}

/// Questions may be added or removed only while the exam has not started.
pub(crate) fn is_editable(exam: &Exam, now: PrimitiveDateTime) -> bool {
    now < exam.start_time
}

#[cfg(test)]
mod tests {
    use time::Duration;

    use super::*;
    use crate::test_support;

    #[test]
    fn window_is_closed_on_both_ends() {
        let exam = test_support::exam("exam-1", "course-1", 30.0);
        let second = Duration::seconds(1);

        assert!(is_available(&exam, exam.start_time));
        assert!(is_available(&exam, exam.end_time));
        assert!(!is_available(&exam, exam.start_time - second));
        assert!(!is_available(&exam, exam.end_time + second));
    }

    #[test]
    fn window_reports_which_side_now_is_on() {
        let exam = test_support::exam("exam-1", "course-1", 30.0);

        assert_eq!(exam_window(&exam, exam.start_time - Duration::hours(2)), ExamWindow::NotStarted);
        assert_eq!(exam_window(&exam, exam.start_time + Duration::minutes(1)), ExamWindow::Open);
        assert_eq!(exam_window(&exam, exam.end_time + Duration::days(1)), ExamWindow::Closed);
    }

    #[test]
    fn offset_input_is_compared_in_utc() {
        let exam = test_support::exam("exam-1", "course-1", 30.0);
        let start_in_istanbul = crate::core::time::parse_utc("2025-03-01T12:00:00+03:00").unwrap();

        assert_eq!(start_in_istanbul, exam.start_time);
        assert!(is_available(&exam, start_in_istanbul));
    }

    #[test]
    fn questions_lock_once_the_exam_starts() {
        let exam = test_support::exam("exam-1", "course-1", 30.0);

        assert!(is_editable(&exam, exam.start_time - Duration::seconds(1)));
        assert!(!is_editable(&exam, exam.start_time));
    }
}
