//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod assignments;
mod consultations;
mod courses;
mod enrollments;
mod files;
mod lessons;
mod submissions;
mod users;

#[cfg(test)]
pub(crate) mod tests;

use crate::config::AppConfig;
use crate::errors::{LmsError, Result};
use crate::utils::escape_like_pattern;
use migration::{Migrator, MigratorTrait};
use sea_orm::sea_query::LikeExpr;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| LmsError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// 使用已有连接构建存储（连接需已完成迁移）
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| LmsError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| LmsError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| LmsError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(LmsError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

/// 包含匹配的 LIKE 表达式，通配符已转义
pub(crate) fn contains_pattern(search: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like_pattern(search))).escape('\\')
}

/// 当前 unix 时间戳（秒）
pub(crate) fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

// Storage trait 实现
use crate::models::{
    assignments::{
        entities::Assignment,
        requests::{CreateAssignmentRequest, SubmitAssignmentRequest, UpdateAssignmentRequest},
        responses::SubmissionCounts,
    },
    consultations::{
        entities::Consultation,
        requests::{ConsultationFilter, NewConsultation},
        responses::ConsultationItem,
    },
    courses::{
        entities::{Course, CourseVisibility},
        requests::{CourseListQuery, CreateCourseRequest, UpdateCourseRequest},
        responses::{CourseCounts, CourseListResponse},
    },
    enrollments::{
        entities::Enrollment,
        responses::{EnrolledStudent, EnrollmentWithCourse},
    },
    files::entities::FileReferences,
    lessons::{
        entities::Lesson,
        requests::{CreateLessonRequest, UpdateLessonRequest},
    },
    submissions::{
        entities::Submission,
        requests::UpdateSubmissionRequest,
        responses::{SubmissionWithAssignment, SubmissionWithStudent},
    },
    users::{
        entities::User,
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::{UserListResponse, UserRoleCounts},
    },
};
use crate::storage::Storage;
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn list_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        self.list_users_by_ids_impl(ids).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn count_users_by_role(&self) -> Result<UserRoleCounts> {
        self.count_users_by_role_impl().await
    }

    async fn set_reset_token(&self, user_id: i64, token: &str, expires_at: i64) -> Result<bool> {
        self.set_reset_token_impl(user_id, token, expires_at).await
    }

    async fn reset_password_with_token(
        &self,
        token: &str,
        password_hash: &str,
        now: i64,
    ) -> Result<Option<User>> {
        self.reset_password_with_token_impl(token, password_hash, now)
            .await
    }

    // 课程模块
    async fn create_course(&self, teacher_id: i64, course: CreateCourseRequest) -> Result<Course> {
        self.create_course_impl(teacher_id, course).await
    }

    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(id).await
    }

    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse> {
        self.list_courses_with_pagination_impl(query).await
    }

    async fn list_course_categories(&self, visibility: CourseVisibility) -> Result<Vec<String>> {
        self.list_course_categories_impl(visibility).await
    }

    async fn list_courses_by_teacher(&self, teacher_id: i64) -> Result<Vec<Course>> {
        self.list_courses_by_teacher_impl(teacher_id).await
    }

    async fn list_enrolled_courses(&self, student_id: i64) -> Result<Vec<Course>> {
        self.list_enrolled_courses_impl(student_id).await
    }

    async fn list_all_courses(&self) -> Result<Vec<Course>> {
        self.list_all_courses_impl().await
    }

    async fn update_course(&self, id: i64, update: UpdateCourseRequest) -> Result<Option<Course>> {
        self.update_course_impl(id, update).await
    }

    async fn delete_course(&self, id: i64) -> Result<bool> {
        self.delete_course_impl(id).await
    }

    async fn set_course_approval(&self, id: i64, is_approved: bool) -> Result<Option<Course>> {
        self.set_course_approval_impl(id, is_approved).await
    }

    async fn get_course_counts(&self, course_id: i64) -> Result<CourseCounts> {
        self.get_course_counts_impl(course_id).await
    }

    // 课时模块
    async fn create_lesson(&self, course_id: i64, lesson: CreateLessonRequest) -> Result<Lesson> {
        self.create_lesson_impl(course_id, lesson).await
    }

    async fn get_lesson_by_id(&self, course_id: i64, id: i64) -> Result<Option<Lesson>> {
        self.get_lesson_by_id_impl(course_id, id).await
    }

    async fn list_lessons_by_course(&self, course_id: i64) -> Result<Vec<Lesson>> {
        self.list_lessons_by_course_impl(course_id).await
    }

    async fn update_lesson(
        &self,
        course_id: i64,
        id: i64,
        update: UpdateLessonRequest,
    ) -> Result<Option<Lesson>> {
        self.update_lesson_impl(course_id, id, update).await
    }

    async fn delete_lesson(&self, course_id: i64, id: i64) -> Result<bool> {
        self.delete_lesson_impl(course_id, id).await
    }

    async fn reorder_lessons(&self, course_id: i64, lesson_ids: Vec<i64>) -> Result<Vec<Lesson>> {
        self.reorder_lessons_impl(course_id, lesson_ids).await
    }

    // 作业模块
    async fn create_assignment(
        &self,
        course_id: i64,
        assignment: CreateAssignmentRequest,
    ) -> Result<Assignment> {
        self.create_assignment_impl(course_id, assignment).await
    }

    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(id).await
    }

    async fn list_assignments_by_course(&self, course_id: i64) -> Result<Vec<Assignment>> {
        self.list_assignments_by_course_impl(course_id).await
    }

    async fn list_assignments_by_courses(&self, course_ids: &[i64]) -> Result<Vec<Assignment>> {
        self.list_assignments_by_courses_impl(course_ids).await
    }

    async fn update_assignment(
        &self,
        id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>> {
        self.update_assignment_impl(id, update).await
    }

    async fn delete_assignment(&self, id: i64) -> Result<bool> {
        self.delete_assignment_impl(id).await
    }

    async fn count_submissions_by_course(
        &self,
        course_id: i64,
    ) -> Result<HashMap<i64, SubmissionCounts>> {
        self.count_submissions_by_course_impl(course_id).await
    }

    // 提交模块
    async fn create_submission(
        &self,
        assignment: &Assignment,
        student_id: i64,
        submission: SubmitAssignmentRequest,
    ) -> Result<Submission> {
        self.create_submission_impl(assignment, student_id, submission)
            .await
    }

    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
        self.get_submission_by_id_impl(id).await
    }

    async fn get_submission_by_assignment_and_student(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>> {
        self.get_submission_by_assignment_and_student_impl(assignment_id, student_id)
            .await
    }

    async fn list_submissions_by_assignment(
        &self,
        assignment_id: i64,
    ) -> Result<Vec<SubmissionWithStudent>> {
        self.list_submissions_by_assignment_impl(assignment_id).await
    }

    async fn list_submissions_by_assignments(
        &self,
        assignment_ids: &[i64],
    ) -> Result<Vec<Submission>> {
        self.list_submissions_by_assignments_impl(assignment_ids)
            .await
    }

    async fn list_submissions_by_student(
        &self,
        student_id: i64,
        course_id: Option<i64>,
    ) -> Result<Vec<SubmissionWithAssignment>> {
        self.list_submissions_by_student_impl(student_id, course_id)
            .await
    }

    async fn update_submission(
        &self,
        id: i64,
        update: UpdateSubmissionRequest,
    ) -> Result<Option<Submission>> {
        self.update_submission_impl(id, update).await
    }

    async fn delete_submission(&self, id: i64) -> Result<bool> {
        self.delete_submission_impl(id).await
    }

    async fn grade_submission(
        &self,
        id: i64,
        score: f64,
        feedback: Option<String>,
        grader_id: i64,
    ) -> Result<Option<Submission>> {
        self.grade_submission_impl(id, score, feedback, grader_id)
            .await
    }

    async fn count_ungraded_submissions_by_courses(&self, course_ids: &[i64]) -> Result<u64> {
        self.count_ungraded_submissions_by_courses_impl(course_ids)
            .await
    }

    // 选课模块
    async fn enroll_student(&self, student_id: i64, course_id: i64) -> Result<Enrollment> {
        self.enroll_student_impl(student_id, course_id).await
    }

    async fn get_enrollment(&self, student_id: i64, course_id: i64) -> Result<Option<Enrollment>> {
        self.get_enrollment_impl(student_id, course_id).await
    }

    async fn list_enrollments_by_student(
        &self,
        student_id: i64,
    ) -> Result<Vec<EnrollmentWithCourse>> {
        self.list_enrollments_by_student_impl(student_id).await
    }

    async fn update_enrollment_progress(
        &self,
        student_id: i64,
        course_id: i64,
        progress: i32,
    ) -> Result<Option<Enrollment>> {
        self.update_enrollment_progress_impl(student_id, course_id, progress)
            .await
    }

    async fn unenroll_student(&self, student_id: i64, course_id: i64) -> Result<bool> {
        self.unenroll_student_impl(student_id, course_id).await
    }

    async fn list_course_students(&self, course_id: i64) -> Result<Vec<EnrolledStudent>> {
        self.list_course_students_impl(course_id).await
    }

    async fn list_enrollments(&self, course_ids: Option<&[i64]>) -> Result<Vec<Enrollment>> {
        self.list_enrollments_impl(course_ids).await
    }

    // 答疑预约模块
    async fn create_consultation(&self, consultation: NewConsultation) -> Result<Consultation> {
        self.create_consultation_impl(consultation).await
    }

    async fn get_consultation_by_id(&self, id: i64) -> Result<Option<Consultation>> {
        self.get_consultation_by_id_impl(id).await
    }

    async fn list_consultations(
        &self,
        filter: ConsultationFilter,
    ) -> Result<Vec<ConsultationItem>> {
        self.list_consultations_impl(filter).await
    }

    async fn delete_consultation(&self, id: i64) -> Result<bool> {
        self.delete_consultation_impl(id).await
    }

    // 文件模块
    async fn find_file_references(&self, relative_path: &str) -> Result<FileReferences> {
        self.find_file_references_impl(relative_path).await
    }
}
