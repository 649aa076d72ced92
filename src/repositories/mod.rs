pub(crate) mod answers;
pub(crate) mod attempts;
pub(crate) mod courses;
pub(crate) mod department_heads;
pub(crate) mod enrollments;
pub(crate) mod exams;
pub(crate) mod health;
pub(crate) mod instructors;
pub(crate) mod questions;
pub(crate) mod students;
pub(crate) mod users;
