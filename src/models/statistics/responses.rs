use serde::Serialize;
use ts_rs::TS;

use crate::models::users::responses::UserRoleCounts;

/// 课程数量统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/statistics.ts")]
pub struct CourseCountStats {
    pub total: u64,
    pub published: u64,
    pub approved: u64,
    pub pending_approval: u64,
}

/// 选课数量统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/statistics.ts")]
pub struct EnrollmentCountStats {
    pub total: u64,
    pub active: u64,
    pub completed: u64,
}

/// 管理员总览
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/statistics.ts")]
pub struct AdminOverview {
    pub users: UserRoleCounts,
    pub courses: CourseCountStats,
    pub enrollments: EnrollmentCountStats,
    pub completion_rate: f64,
    pub total_revenue: f64,
}

/// 月度收入
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/statistics.ts")]
pub struct MonthlyRevenue {
    /// YYYY-MM
    pub month: String,
    pub enrollments: u64,
    pub revenue: f64,
}

/// 教师收入排行
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/statistics.ts")]
pub struct TeacherRevenue {
    pub teacher_id: i64,
    pub teacher_name: String,
    pub course_count: u64,
    pub enrollments: u64,
    pub revenue: f64,
}

/// 分类收入
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/statistics.ts")]
pub struct CategoryRevenue {
    pub category: String,
    pub course_count: u64,
    pub enrollments: u64,
    pub revenue: f64,
}

/// 单门课程的选课表现
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/statistics.ts")]
pub struct CoursePerformance {
    pub course_id: i64,
    pub title: String,
    pub enrollments: u64,
    pub active_enrollments: u64,
    pub completed: u64,
    pub completion_rate: f64,
    pub average_progress: f64,
    pub revenue: f64,
}

/// 教师总览
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/statistics.ts")]
pub struct TeacherOverview {
    pub course_count: u64,
    pub total_students: u64,
    pub total_revenue: f64,
    pub pending_grading: u64,
    pub courses: Vec<CoursePerformance>,
}

/// 学生总览
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/statistics.ts")]
pub struct StudentOverview {
    pub enrolled_courses: u64,
    pub completed_courses: u64,
    pub average_progress: f64,
    pub pending_assignments: u64,
    pub submitted_assignments: u64,
    pub average_score_percentage: Option<f64>,
}

/// 分数统计
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/statistics.ts")]
pub struct ScoreStats {
    pub average: f64,
    pub max: f64,
    pub min: f64,
}

/// 分数区间
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/statistics.ts")]
pub struct ScoreRange {
    pub range: String,
    pub count: u64,
}

/// 单个作业的提交统计
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/statistics.ts")]
pub struct AssignmentStatistics {
    pub assignment_id: i64,
    pub title: String,
    pub max_score: f64,
    pub submitted_count: u64,
    pub graded_count: u64,
    pub late_count: u64,
    pub submission_rate: f64,
    pub score_stats: Option<ScoreStats>,
    pub score_distribution: Vec<ScoreRange>,
}

/// 课程统计
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/statistics.ts")]
pub struct CourseStatistics {
    #[serde(flatten)]
    #[ts(flatten)]
    pub performance: CoursePerformance,
    pub assignments: Vec<AssignmentStatistics>,
}
