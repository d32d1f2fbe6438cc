use std::collections::HashMap;
use std::sync::Arc;

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

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（password 字段为已哈希的密码）
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 批量获取用户
    async fn list_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;
    // 分页列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 更新用户信息（password 字段为已哈希的密码）
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    // 删除用户
    async fn delete_user(&self, id: i64) -> Result<bool>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 按角色统计用户数
    async fn count_users_by_role(&self) -> Result<UserRoleCounts>;
    // 保存密码重置令牌
    async fn set_reset_token(&self, user_id: i64, token: &str, expires_at: i64) -> Result<bool>;
    // 使用重置令牌设置新密码，成功时返回用户并清除令牌
    async fn reset_password_with_token(
        &self,
        token: &str,
        password_hash: &str,
        now: i64,
    ) -> Result<Option<User>>;

    /// 课程管理方法
    async fn create_course(&self, teacher_id: i64, course: CreateCourseRequest) -> Result<Course>;
    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>>;
    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse>;
    // 可见课程的分类（去重、排序）
    async fn list_course_categories(&self, visibility: CourseVisibility) -> Result<Vec<String>>;
    async fn list_courses_by_teacher(&self, teacher_id: i64) -> Result<Vec<Course>>;
    // 学生当前有效选课的课程
    async fn list_enrolled_courses(&self, student_id: i64) -> Result<Vec<Course>>;
    async fn list_all_courses(&self) -> Result<Vec<Course>>;
    async fn update_course(&self, id: i64, update: UpdateCourseRequest) -> Result<Option<Course>>;
    async fn delete_course(&self, id: i64) -> Result<bool>;
    async fn set_course_approval(&self, id: i64, is_approved: bool) -> Result<Option<Course>>;
    // 课时数、作业数、有效选课人数
    async fn get_course_counts(&self, course_id: i64) -> Result<CourseCounts>;

    /// 课时管理方法
    async fn create_lesson(&self, course_id: i64, lesson: CreateLessonRequest) -> Result<Lesson>;
    async fn get_lesson_by_id(&self, course_id: i64, id: i64) -> Result<Option<Lesson>>;
    async fn list_lessons_by_course(&self, course_id: i64) -> Result<Vec<Lesson>>;
    async fn update_lesson(
        &self,
        course_id: i64,
        id: i64,
        update: UpdateLessonRequest,
    ) -> Result<Option<Lesson>>;
    async fn delete_lesson(&self, course_id: i64, id: i64) -> Result<bool>;
    // 按给定顺序重排课时，必须是课程全部课时的排列
    async fn reorder_lessons(&self, course_id: i64, lesson_ids: Vec<i64>) -> Result<Vec<Lesson>>;

    /// 作业管理方法
    async fn create_assignment(
        &self,
        course_id: i64,
        assignment: CreateAssignmentRequest,
    ) -> Result<Assignment>;
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    async fn list_assignments_by_course(&self, course_id: i64) -> Result<Vec<Assignment>>;
    async fn list_assignments_by_courses(&self, course_ids: &[i64]) -> Result<Vec<Assignment>>;
    async fn update_assignment(
        &self,
        id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>>;
    async fn delete_assignment(&self, id: i64) -> Result<bool>;
    // 课程下每个作业的提交数与已批改数
    async fn count_submissions_by_course(
        &self,
        course_id: i64,
    ) -> Result<HashMap<i64, SubmissionCounts>>;

    /// 提交管理方法
    // 创建提交；同一学生重复提交返回 Conflict
    async fn create_submission(
        &self,
        assignment: &Assignment,
        student_id: i64,
        submission: SubmitAssignmentRequest,
    ) -> Result<Submission>;
    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>>;
    async fn get_submission_by_assignment_and_student(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>>;
    async fn list_submissions_by_assignment(
        &self,
        assignment_id: i64,
    ) -> Result<Vec<SubmissionWithStudent>>;
    async fn list_submissions_by_assignments(&self, assignment_ids: &[i64])
    -> Result<Vec<Submission>>;
    async fn list_submissions_by_student(
        &self,
        student_id: i64,
        course_id: Option<i64>,
    ) -> Result<Vec<SubmissionWithAssignment>>;
    // 更新未批改的提交；已批改返回 Conflict
    async fn update_submission(
        &self,
        id: i64,
        update: UpdateSubmissionRequest,
    ) -> Result<Option<Submission>>;
    async fn delete_submission(&self, id: i64) -> Result<bool>;
    // 批改；分数超出 [0, max_score] 返回 Validation
    async fn grade_submission(
        &self,
        id: i64,
        score: f64,
        feedback: Option<String>,
        grader_id: i64,
    ) -> Result<Option<Submission>>;
    async fn count_ungraded_submissions_by_courses(&self, course_ids: &[i64]) -> Result<u64>;

    /// 选课管理方法
    // 选课；已有有效选课返回 Conflict，已退课则重新激活原记录
    async fn enroll_student(&self, student_id: i64, course_id: i64) -> Result<Enrollment>;
    async fn get_enrollment(&self, student_id: i64, course_id: i64) -> Result<Option<Enrollment>>;
    async fn list_enrollments_by_student(
        &self,
        student_id: i64,
    ) -> Result<Vec<EnrollmentWithCourse>>;
    // 更新有效选课的学习进度
    async fn update_enrollment_progress(
        &self,
        student_id: i64,
        course_id: i64,
        progress: i32,
    ) -> Result<Option<Enrollment>>;
    // 退课（软删除）
    async fn unenroll_student(&self, student_id: i64, course_id: i64) -> Result<bool>;
    async fn list_course_students(&self, course_id: i64) -> Result<Vec<EnrolledStudent>>;
    // 全部选课记录（含已退课），可按课程过滤
    async fn list_enrollments(&self, course_ids: Option<&[i64]>) -> Result<Vec<Enrollment>>;

    /// 答疑预约方法
    async fn create_consultation(&self, consultation: NewConsultation) -> Result<Consultation>;
    async fn get_consultation_by_id(&self, id: i64) -> Result<Option<Consultation>>;
    async fn list_consultations(&self, filter: ConsultationFilter) -> Result<Vec<ConsultationItem>>;
    async fn delete_consultation(&self, id: i64) -> Result<bool>;

    /// 文件方法
    // 查找引用指定上传文件的课时、作业与提交
    async fn find_file_references(&self, relative_path: &str) -> Result<FileReferences>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
