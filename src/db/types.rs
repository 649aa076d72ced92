use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "userrole", rename_all = "snake_case")]
pub(crate) enum UserRole {
    Admin,
    Student,
    Instructor,
    DepartmentHead,
}

impl UserRole {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Student => "student",
            Self::Instructor => "instructor",
            Self::DepartmentHead => "department_head",
        }
    }
}

/// Option labels a multiple-choice question offers, in display order.
pub(crate) const OPTION_LABELS: [&str; 5] = ["A", "B", "C", "D", "E"];

/// Uppercases `raw` and returns it when it names one of [`OPTION_LABELS`].
pub(crate) fn normalize_option_label(raw: &str) -> Option<String> {
    let label = raw.trim().to_ascii_uppercase();
    OPTION_LABELS.contains(&label.as_str()).then_some(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_labels_are_case_insensitive() {
        assert_eq!(normalize_option_label("c").as_deref(), Some("C"));
        assert_eq!(normalize_option_label(" E ").as_deref(), Some("E"));
        assert_eq!(normalize_option_label("F"), None);
        assert_eq!(normalize_option_label(""), None);
    }

    #[test]
    fn role_serializes_snake_case() {
        let value = serde_json::to_value(UserRole::DepartmentHead).unwrap();
        assert_eq!(value, serde_json::json!("department_head"));
        assert_eq!(UserRole::DepartmentHead.as_str(), "department_head");
    }
}
