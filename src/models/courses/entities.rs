use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::users::entities::{User, UserRole};

// 课程状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub enum CourseStatus {
    Draft,     // 草稿
    Published, // 已发布
}

impl CourseStatus {
    pub const DRAFT: &'static str = "DRAFT";
    pub const PUBLISHED: &'static str = "PUBLISHED";
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CourseStatus::Draft => write!(f, "{}", CourseStatus::DRAFT),
            CourseStatus::Published => write!(f, "{}", CourseStatus::PUBLISHED),
        }
    }
}

impl std::str::FromStr for CourseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            CourseStatus::DRAFT => Ok(CourseStatus::Draft),
            CourseStatus::PUBLISHED => Ok(CourseStatus::Published),
            _ => Err(format!("Invalid course status: {s}")),
        }
    }
}

// 课程实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub teacher_id: i64,
    pub category: String,
    /// 课程时长（小时）
    pub duration: i32,
    pub price: f64,
    pub thumbnail_url: Option<String>,
    pub status: CourseStatus,
    pub is_approved: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Course {
    /// 已发布且已审核的课程对所有登录用户可见
    pub fn is_publicly_visible(&self) -> bool {
        self.status == CourseStatus::Published && self.is_approved
    }

    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.teacher_id == user_id
    }

    /// 课程详情的可见性：公开、本人课程、管理员或已选课学生
    pub fn is_visible_to(&self, user: &User, is_enrolled: bool) -> bool {
        self.is_publicly_visible() || user.is_admin() || self.is_owned_by(user.id) || is_enrolled
    }

    /// 课程管理权限：本人课程或管理员
    pub fn can_be_managed_by(&self, user: &User) -> bool {
        user.is_admin() || self.is_owned_by(user.id)
    }
}

/// 课程列表的可见范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseVisibility {
    /// 全部课程（管理员）
    All,
    /// 仅公开课程（学生）
    Public,
    /// 公开课程或指定教师自己的课程
    PublicOrOwnedBy(i64),
}

impl CourseVisibility {
    pub fn for_user(user: &User) -> Self {
        match user.role {
            UserRole::Admin => CourseVisibility::All,
            UserRole::Teacher => CourseVisibility::PublicOrOwnedBy(user.id),
            UserRole::Student => CourseVisibility::Public,
        }
    }

    pub fn allows(&self, course: &Course) -> bool {
        match self {
            CourseVisibility::All => true,
            CourseVisibility::Public => course.is_publicly_visible(),
            CourseVisibility::PublicOrOwnedBy(id) => {
                course.is_publicly_visible() || course.is_owned_by(*id)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;

    pub(crate) fn course(teacher_id: i64, status: CourseStatus, is_approved: bool) -> Course {
        Course {
            id: 1,
            title: "Rust".into(),
            description: None,
            teacher_id,
            category: "programming".into(),
            duration: 10,
            price: 99.0,
            thumbnail_url: None,
            status,
            is_approved,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub(crate) fn user(id: i64, role: UserRole) -> User {
        User {
            id,
            email: format!("u{id}@example.com"),
            password_hash: String::new(),
            name: format!("user {id}"),
            role,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_listing_visibility_by_role() {
        let draft = course(7, CourseStatus::Draft, false);
        let unapproved = course(7, CourseStatus::Published, false);
        let public = course(7, CourseStatus::Published, true);

        let admin = CourseVisibility::for_user(&user(1, UserRole::Admin));
        let owner = CourseVisibility::for_user(&user(7, UserRole::Teacher));
        let other_teacher = CourseVisibility::for_user(&user(8, UserRole::Teacher));
        let student = CourseVisibility::for_user(&user(9, UserRole::Student));

        assert!(admin.allows(&draft));
        assert!(owner.allows(&draft));
        assert!(!other_teacher.allows(&draft));
        assert!(!other_teacher.allows(&unapproved));
        assert!(other_teacher.allows(&public));
        assert!(!student.allows(&unapproved));
        assert!(student.allows(&public));
    }

    #[test]
    fn test_detail_visibility_for_enrolled_student() {
        let hidden = course(7, CourseStatus::Draft, true);
        let student = user(9, UserRole::Student);
        assert!(!hidden.is_visible_to(&student, false));
        assert!(hidden.is_visible_to(&student, true));
        assert!(hidden.is_visible_to(&user(1, UserRole::Admin), false));
    }

    #[test]
    fn test_manage_permission() {
        let c = course(7, CourseStatus::Published, true);
        assert!(c.can_be_managed_by(&user(7, UserRole::Teacher)));
        assert!(c.can_be_managed_by(&user(1, UserRole::Admin)));
        assert!(!c.can_be_managed_by(&user(8, UserRole::Teacher)));
        assert!(!c.can_be_managed_by(&user(9, UserRole::Student)));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("published".parse::<CourseStatus>(), Ok(CourseStatus::Published));
        assert_eq!(CourseStatus::Draft.to_string(), "DRAFT");
        assert!("archived".parse::<CourseStatus>().is_err());
    }
}
