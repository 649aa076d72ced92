use sqlx::PgPool;
use uuid::Uuid;

use crate::core::security;
use crate::core::time::primitive_now_utc;
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;

const DEPARTMENT: &str = "Computer Engineering";
const STUDENT_PASSWORD: &str = "student123";
const INSTRUCTOR_PASSWORD: &str = "inst123";

const INSTRUCTORS: [(&str, &str); 2] =
    [("instructor1", "Prof. Dr. Mehmet Demir"), ("instructor2", "Doç. Dr. Ayşe Kaya")];

const STUDENTS: [(&str, &str, &str); 10] = [
    ("student1", "Ali Yılmaz", "20210001"),
    ("student2", "Zeynep Şahin", "20210002"),
    ("student3", "Burak Öztürk", "20210003"),
    ("student4", "Elif Aydın", "20210004"),
    ("student5", "Can Yıldız", "20210005"),
    ("student6", "Selin Arslan", "20210006"),
    ("student7", "Emre Doğan", "20210007"),
    ("student8", "Deniz Çelik", "20210008"),
    ("student9", "Berk Koç", "20210009"),
    ("student10", "Merve Acar", "20210010"),
];

/// Course code, name and the index of the teaching instructor.
const COURSES: [(&str, &str, usize); 4] = [
    ("CS101", "Introduction to Programming", 0),
    ("CS102", "Data Structures and Algorithms", 0),
    ("CS201", "Database Management Systems", 1),
    ("CS202", "Web Development", 1),
];

/// Counts of rows inserted by one seeding run.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct SeedReport {
    pub(crate) users: usize,
    pub(crate) courses: usize,
    pub(crate) enrollments: usize,
}

/// Student and course indexes for the demo enrollments.
pub(crate) fn demo_enrollments() -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for student in 0..5 {
        pairs.push((student, 0));
        pairs.push((student, 2));
    }
    for student in 5..10 {
        pairs.push((student, 1));
        pairs.push((student, 3));
    }
    pairs.extend([(0, 1), (5, 0), (2, 3)]);
    pairs
}

/// Inserts the demo data set. Rows whose username or course code already
/// exist are reused, so the seed can run repeatedly.
pub(crate) async fn seed_demo_data(pool: &PgPool) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();

    ensure_user(pool, &mut report, "admin", "System Administrator", "admin123", UserRole::Admin)
        .await?;

    let head = ensure_user(
        pool,
        &mut report,
        "depthead",
        "Dr. Ahmet Yılmaz",
        "dept123",
        UserRole::DepartmentHead,
    )
    .await?;
    if repositories::department_heads::find_by_user_id(pool, &head.id).await?.is_none() {
        repositories::department_heads::create(
            pool,
            repositories::department_heads::CreateDepartmentHead {
                id: &Uuid::new_v4().to_string(),
                user_id: &head.id,
                department: DEPARTMENT,
                created_at: primitive_now_utc(),
            },
        )
        .await?;
    }

    let mut instructor_ids = Vec::with_capacity(INSTRUCTORS.len());
    for (username, full_name) in INSTRUCTORS {
        let user = ensure_user(
            pool,
            &mut report,
            username,
            full_name,
            INSTRUCTOR_PASSWORD,
            UserRole::Instructor,
        )
        .await?;
        let instructor = match repositories::instructors::find_by_user_id(pool, &user.id).await? {
            Some(instructor) => instructor,
            None => {
                repositories::instructors::create(
                    pool,
                    repositories::instructors::CreateInstructor {
                        id: &Uuid::new_v4().to_string(),
                        user_id: &user.id,
                        department: DEPARTMENT,
                        created_at: primitive_now_utc(),
                    },
                )
                .await?
            }
        };
        instructor_ids.push(instructor.id);
    }

    let mut student_ids = Vec::with_capacity(STUDENTS.len());
    for (username, full_name, number) in STUDENTS {
        let user =
            ensure_user(pool, &mut report, username, full_name, STUDENT_PASSWORD, UserRole::Student)
                .await?;
        let student = match repositories::students::find_by_user_id(pool, &user.id).await? {
            Some(student) => student,
            None => {
                repositories::students::create(
                    pool,
                    repositories::students::CreateStudent {
                        id: &Uuid::new_v4().to_string(),
                        user_id: &user.id,
                        student_number: number,
                        created_at: primitive_now_utc(),
                    },
                )
                .await?
            }
        };
        student_ids.push(student.id);
    }

    let mut course_ids = Vec::with_capacity(COURSES.len());
    for (code, name, instructor) in COURSES {
        let course = match repositories::courses::find_by_code(pool, code).await? {
            Some(course) => course,
            None => {
                let created = repositories::courses::create(
                    pool,
                    repositories::courses::CreateCourse {
                        id: &Uuid::new_v4().to_string(),
                        code,
                        name,
                        instructor_id: &instructor_ids[instructor],
                        created_at: primitive_now_utc(),
                    },
                )
                .await?;
                match created {
                    Some(course) => {
                        report.courses += 1;
                        course
                    }
                    None => repositories::courses::find_by_code(pool, code)
                        .await?
                        .ok_or_else(|| anyhow::anyhow!("course {code} vanished during seeding"))?,
                }
            }
        };
        course_ids.push(course.id);
    }

    for (student, course) in demo_enrollments() {
        let created = repositories::enrollments::create(
            pool,
            repositories::enrollments::CreateEnrollment {
                id: &Uuid::new_v4().to_string(),
                student_id: &student_ids[student],
                course_id: &course_ids[course],
                enrolled_at: primitive_now_utc(),
            },
        )
        .await?;
        if created {
            report.enrollments += 1;
        }
    }

    Ok(report)
}

async fn ensure_user(
    pool: &PgPool,
    report: &mut SeedReport,
    username: &str,
    full_name: &str,
    password: &str,
    role: UserRole,
) -> anyhow::Result<User> {
    if let Some(user) = repositories::users::find_by_username(pool, username).await? {
        if user.role != role {
            anyhow::bail!("existing user {username} has role {}", user.role.as_str());
        }
        tracing::debug!(username, "Seed user already present");
        return Ok(user);
    }

    let user = repositories::users::create(
        pool,
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            username,
            hashed_password: security::hash_password(password)?,
            full_name,
            role,
            created_at: primitive_now_utc(),
        },
    )
    .await?;
    report.users += 1;
    tracing::info!(username, role = role.as_str(), "Seeded user");
    Ok(user)
}
