//! 统计聚合
//!
//! 纯函数，输入为存储层查询结果。收入按选课记录累计课程价格，
//! 重新激活的选课是同一条记录，不会重复计算。

use chrono::{DateTime, Datelike, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::{
    assignments::entities::Assignment,
    courses::entities::{Course, CourseStatus},
    enrollments::{entities::Enrollment, responses::EnrollmentWithCourse},
    statistics::responses::{
        AssignmentStatistics, CategoryRevenue, CourseCountStats, CoursePerformance,
        EnrollmentCountStats, MonthlyRevenue, ScoreRange, ScoreStats, StudentOverview,
        TeacherRevenue,
    },
    submissions::{entities::Submission, responses::SubmissionWithAssignment},
};

/// 保留两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 百分比，分母为 0 时返回 0
pub fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(part as f64 / total as f64 * 100.0)
}

fn average(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0u64), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

pub fn price_map(courses: &[Course]) -> HashMap<i64, f64> {
    courses.iter().map(|c| (c.id, c.price)).collect()
}

pub fn course_counts(courses: &[Course]) -> CourseCountStats {
    CourseCountStats {
        total: courses.len() as u64,
        published: courses
            .iter()
            .filter(|c| c.status == CourseStatus::Published)
            .count() as u64,
        approved: courses.iter().filter(|c| c.is_approved).count() as u64,
        pending_approval: courses.iter().filter(|c| !c.is_approved).count() as u64,
    }
}

pub fn enrollment_counts(enrollments: &[Enrollment]) -> EnrollmentCountStats {
    EnrollmentCountStats {
        total: enrollments.len() as u64,
        active: enrollments.iter().filter(|e| e.is_active).count() as u64,
        completed: enrollments.iter().filter(|e| e.is_completed()).count() as u64,
    }
}

/// 完成率 = 已完成 / 全部选课 × 100
pub fn completion_rate(counts: &EnrollmentCountStats) -> f64 {
    percentage(counts.completed, counts.total)
}

pub fn total_revenue(enrollments: &[Enrollment], prices: &HashMap<i64, f64>) -> f64 {
    round2(
        enrollments
            .iter()
            .filter_map(|e| prices.get(&e.course_id))
            .sum(),
    )
}

/// 最近 `months` 个自然月（UTC，含当月）的收入，按时间升序，无数据的月份补 0
pub fn monthly_revenue(
    enrollments: &[Enrollment],
    prices: &HashMap<i64, f64>,
    now: DateTime<Utc>,
    months: u32,
) -> Vec<MonthlyRevenue> {
    let current = now.year() as i64 * 12 + now.month0() as i64;
    let first = current - months.saturating_sub(1) as i64;

    let mut buckets: BTreeMap<i64, (u64, f64)> = (first..=current).map(|m| (m, (0, 0.0))).collect();

    for enrollment in enrollments {
        let at = enrollment.enrolled_at;
        let key = at.year() as i64 * 12 + at.month0() as i64;
        if let Some(bucket) = buckets.get_mut(&key) {
            bucket.0 += 1;
            bucket.1 += prices.get(&enrollment.course_id).copied().unwrap_or(0.0);
        }
    }

    buckets
        .into_iter()
        .map(|(key, (count, revenue))| MonthlyRevenue {
            month: format!("{:04}-{:02}", key.div_euclid(12), key.rem_euclid(12) + 1),
            enrollments: count,
            revenue: round2(revenue),
        })
        .collect()
}

fn enrollments_per_course(enrollments: &[Enrollment]) -> HashMap<i64, u64> {
    let mut counts = HashMap::new();
    for enrollment in enrollments {
        *counts.entry(enrollment.course_id).or_insert(0) += 1;
    }
    counts
}

/// 按教师汇总，收入降序
pub fn revenue_by_teacher(
    courses: &[Course],
    enrollments: &[Enrollment],
    teacher_names: &HashMap<i64, String>,
) -> Vec<TeacherRevenue> {
    let per_course = enrollments_per_course(enrollments);
    let mut by_teacher: HashMap<i64, TeacherRevenue> = HashMap::new();

    for course in courses {
        let count = per_course.get(&course.id).copied().unwrap_or(0);
        let entry = by_teacher
            .entry(course.teacher_id)
            .or_insert_with(|| TeacherRevenue {
                teacher_id: course.teacher_id,
                teacher_name: teacher_names
                    .get(&course.teacher_id)
                    .cloned()
                    .unwrap_or_default(),
                course_count: 0,
                enrollments: 0,
                revenue: 0.0,
            });
        entry.course_count += 1;
        entry.enrollments += count;
        entry.revenue += course.price * count as f64;
    }

    let mut result: Vec<TeacherRevenue> = by_teacher
        .into_values()
        .map(|mut t| {
            t.revenue = round2(t.revenue);
            t
        })
        .collect();
    result.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then(a.teacher_id.cmp(&b.teacher_id))
    });
    result
}

/// 按分类汇总，收入降序
pub fn revenue_by_category(courses: &[Course], enrollments: &[Enrollment]) -> Vec<CategoryRevenue> {
    let per_course = enrollments_per_course(enrollments);
    let mut by_category: HashMap<&str, CategoryRevenue> = HashMap::new();

    for course in courses {
        let count = per_course.get(&course.id).copied().unwrap_or(0);
        let entry = by_category
            .entry(course.category.as_str())
            .or_insert_with(|| CategoryRevenue {
                category: course.category.clone(),
                course_count: 0,
                enrollments: 0,
                revenue: 0.0,
            });
        entry.course_count += 1;
        entry.enrollments += count;
        entry.revenue += course.price * count as f64;
    }

    let mut result: Vec<CategoryRevenue> = by_category
        .into_values()
        .map(|mut c| {
            c.revenue = round2(c.revenue);
            c
        })
        .collect();
    result.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.category.cmp(&b.category))
    });
    result
}

/// 单门课程的选课表现；平均进度只统计有效选课
pub fn course_performance(course: &Course, enrollments: &[Enrollment]) -> CoursePerformance {
    let own: Vec<&Enrollment> = enrollments
        .iter()
        .filter(|e| e.course_id == course.id)
        .collect();
    let total = own.len() as u64;
    let active = own.iter().filter(|e| e.is_active).count() as u64;
    let completed = own.iter().filter(|e| e.is_completed()).count() as u64;
    let average_progress = average(
        own.iter()
            .filter(|e| e.is_active)
            .map(|e| e.progress as f64),
    )
    .map(round2)
    .unwrap_or(0.0);

    CoursePerformance {
        course_id: course.id,
        title: course.title.clone(),
        enrollments: total,
        active_enrollments: active,
        completed,
        completion_rate: percentage(completed, total),
        average_progress,
        revenue: round2(course.price * total as f64),
    }
}

/// 有效选课的不同学生数
pub fn distinct_active_students(enrollments: &[Enrollment]) -> u64 {
    enrollments
        .iter()
        .filter(|e| e.is_active)
        .map(|e| e.student_id)
        .collect::<HashSet<_>>()
        .len() as u64
}

/// 学生总览：`enrollments` 为有效选课，`assignments` 为这些课程的作业
pub fn student_overview(
    enrollments: &[EnrollmentWithCourse],
    assignments: &[Assignment],
    submissions: &[SubmissionWithAssignment],
) -> StudentOverview {
    let enrolled_courses: HashSet<i64> = enrollments.iter().map(|e| e.course.id).collect();
    let submitted: HashSet<i64> = submissions
        .iter()
        .map(|s| s.submission.assignment_id)
        .collect();

    let relevant_assignments: Vec<&Assignment> = assignments
        .iter()
        .filter(|a| enrolled_courses.contains(&a.course_id))
        .collect();

    let pending_assignments = relevant_assignments
        .iter()
        .filter(|a| !submitted.contains(&a.id))
        .count() as u64;
    let submitted_assignments = relevant_assignments
        .iter()
        .filter(|a| submitted.contains(&a.id))
        .count() as u64;

    let average_score_percentage = average(submissions.iter().filter_map(|s| {
        let score = s.submission.score?;
        (s.max_score > 0.0).then(|| score / s.max_score * 100.0)
    }))
    .map(round2);

    StudentOverview {
        enrolled_courses: enrolled_courses.len() as u64,
        completed_courses: enrollments
            .iter()
            .filter(|e| e.enrollment.is_completed())
            .count() as u64,
        average_progress: average(enrollments.iter().map(|e| e.enrollment.progress as f64))
            .map(round2)
            .unwrap_or(0.0),
        pending_assignments,
        submitted_assignments,
        average_score_percentage,
    }
}

const SCORE_BUCKETS: [(&str, f64, f64); 5] = [
    ("0-59", 0.0, 60.0),
    ("60-69", 60.0, 70.0),
    ("70-79", 70.0, 80.0),
    ("80-89", 80.0, 90.0),
    ("90-100", 90.0, f64::INFINITY),
];

/// 按得分率分段（满分 100 落在最后一段）
pub fn score_distribution(percentages: &[f64]) -> Vec<ScoreRange> {
    SCORE_BUCKETS
        .iter()
        .map(|(label, low, high)| ScoreRange {
            range: label.to_string(),
            count: percentages
                .iter()
                .filter(|p| **p >= *low && **p < *high)
                .count() as u64,
        })
        .collect()
}

/// 单个作业的提交统计；提交率以有效选课人数为分母
pub fn assignment_statistics(
    assignment: &Assignment,
    submissions: &[Submission],
    enrolled_students: u64,
) -> AssignmentStatistics {
    let own: Vec<&Submission> = submissions
        .iter()
        .filter(|s| s.assignment_id == assignment.id)
        .collect();
    let scores: Vec<f64> = own.iter().filter_map(|s| s.score).collect();

    let score_stats = average(scores.iter().copied()).map(|avg| ScoreStats {
        average: round2(avg),
        max: scores.iter().copied().fold(f64::MIN, f64::max),
        min: scores.iter().copied().fold(f64::MAX, f64::min),
    });

    let percentages: Vec<f64> = if assignment.max_score > 0.0 {
        scores
            .iter()
            .map(|s| s / assignment.max_score * 100.0)
            .collect()
    } else {
        Vec::new()
    };

    AssignmentStatistics {
        assignment_id: assignment.id,
        title: assignment.title.clone(),
        max_score: assignment.max_score,
        submitted_count: own.len() as u64,
        graded_count: own.iter().filter(|s| s.is_graded()).count() as u64,
        late_count: own.iter().filter(|s| s.is_late).count() as u64,
        submission_rate: percentage(own.len() as u64, enrolled_students),
        score_stats,
        score_distribution: score_distribution(&percentages),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::entities::tests::course;
    use chrono::TimeZone;

    fn enrollment(id: i64, course_id: i64, student_id: i64, at: DateTime<Utc>) -> Enrollment {
        Enrollment {
            id,
            student_id,
            course_id,
            is_active: true,
            progress: 0,
            enrolled_at: at,
            updated_at: at,
            completed_at: None,
        }
    }

    fn priced_course(id: i64, teacher_id: i64, category: &str, price: f64) -> Course {
        let mut c = course(teacher_id, CourseStatus::Published, true);
        c.id = id;
        c.category = category.to_string();
        c.price = price;
        c
    }

    fn submission(id: i64, assignment_id: i64, score: Option<f64>, is_late: bool) -> Submission {
        let now = Utc::now();
        Submission {
            id,
            assignment_id,
            student_id: id,
            content: Some("answer".into()),
            attachments: vec![],
            is_late,
            score,
            feedback: None,
            submitted_at: now,
            updated_at: now,
            graded_at: score.map(|_| now),
            graded_by_teacher_id: score.map(|_| 7),
        }
    }

    fn assignment(id: i64, course_id: i64, max_score: f64) -> Assignment {
        let now = Utc::now();
        Assignment {
            id,
            course_id,
            title: format!("hw {id}"),
            description: None,
            due_date: None,
            max_score,
            attachments: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_completion_rate_rounds_and_handles_zero() {
        let empty = EnrollmentCountStats::default();
        assert_eq!(completion_rate(&empty), 0.0);
        let counts = EnrollmentCountStats {
            total: 3,
            active: 3,
            completed: 1,
        };
        assert_eq!(completion_rate(&counts), 33.33);
    }

    #[test]
    fn test_enrollment_counts() {
        let at = Utc::now();
        let mut inactive = enrollment(1, 1, 1, at);
        inactive.is_active = false;
        let mut done = enrollment(2, 1, 2, at);
        done.progress = 100;
        done.completed_at = Some(at);
        let counts = enrollment_counts(&[inactive, done, enrollment(3, 1, 3, at)]);
        assert_eq!(
            counts,
            EnrollmentCountStats {
                total: 3,
                active: 2,
                completed: 1,
            }
        );
    }

    #[test]
    fn test_revenue_counts_every_enrollment_row_once() {
        let courses = vec![priced_course(1, 7, "art", 10.0), priced_course(2, 7, "art", 2.5)];
        let prices = price_map(&courses);
        let at = Utc::now();
        let mut inactive = enrollment(3, 2, 1, at);
        inactive.is_active = false;
        let enrollments = vec![enrollment(1, 1, 1, at), enrollment(2, 1, 2, at), inactive];
        assert_eq!(total_revenue(&enrollments, &prices), 22.5);
    }

    #[test]
    fn test_monthly_revenue_is_zero_filled_and_ordered() {
        let prices = price_map(&[priced_course(1, 7, "art", 5.0)]);
        let now = Utc.with_ymd_and_hms(2025, 2, 15, 12, 0, 0).unwrap();
        let enrollments = vec![
            enrollment(1, 1, 1, Utc.with_ymd_and_hms(2024, 12, 31, 23, 0, 0).unwrap()),
            enrollment(2, 1, 2, Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()),
            enrollment(3, 1, 3, Utc.with_ymd_and_hms(2025, 2, 10, 0, 0, 0).unwrap()),
            // 窗口之外
            enrollment(4, 1, 4, Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap()),
        ];

        let months = monthly_revenue(&enrollments, &prices, now, 3);
        let labels: Vec<&str> = months.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(labels, vec!["2024-12", "2025-01", "2025-02"]);
        assert_eq!(months[0].revenue, 5.0);
        assert_eq!(months[1].enrollments, 0);
        assert_eq!(months[1].revenue, 0.0);
        assert_eq!(months[2].enrollments, 2);
        assert_eq!(months[2].revenue, 10.0);
    }

    #[test]
    fn test_revenue_by_teacher_and_category() {
        let courses = vec![
            priced_course(1, 7, "art", 10.0),
            priced_course(2, 8, "math", 30.0),
            priced_course(3, 7, "math", 0.0),
        ];
        let at = Utc::now();
        let enrollments = vec![
            enrollment(1, 1, 1, at),
            enrollment(2, 1, 2, at),
            enrollment(3, 2, 1, at),
        ];
        let names = HashMap::from([(7, "Ann".to_string()), (8, "Bob".to_string())]);

        let teachers = revenue_by_teacher(&courses, &enrollments, &names);
        assert_eq!(teachers[0].teacher_name, "Bob");
        assert_eq!(teachers[0].revenue, 30.0);
        assert_eq!(teachers[1].teacher_id, 7);
        assert_eq!(teachers[1].course_count, 2);
        assert_eq!(teachers[1].enrollments, 2);
        assert_eq!(teachers[1].revenue, 20.0);

        let categories = revenue_by_category(&courses, &enrollments);
        assert_eq!(categories[0].category, "math");
        assert_eq!(categories[0].course_count, 2);
        assert_eq!(categories[0].revenue, 30.0);
        assert_eq!(categories[1].category, "art");
        assert_eq!(categories[1].enrollments, 2);
    }

    #[test]
    fn test_course_performance() {
        let c = priced_course(1, 7, "art", 4.0);
        let at = Utc::now();
        let mut done = enrollment(1, 1, 1, at);
        done.progress = 100;
        done.completed_at = Some(at);
        let mut halfway = enrollment(2, 1, 2, at);
        halfway.progress = 50;
        let mut left = enrollment(3, 1, 3, at);
        left.is_active = false;
        left.progress = 10;
        let other = enrollment(4, 2, 1, at);

        let perf = course_performance(&c, &[done, halfway, left, other]);
        assert_eq!(perf.enrollments, 3);
        assert_eq!(perf.active_enrollments, 2);
        assert_eq!(perf.completed, 1);
        assert_eq!(perf.completion_rate, 33.33);
        assert_eq!(perf.average_progress, 75.0);
        assert_eq!(perf.revenue, 12.0);
    }

    #[test]
    fn test_assignment_statistics() {
        let a = assignment(1, 1, 50.0);
        let submissions = vec![
            submission(1, 1, Some(50.0), false),
            submission(2, 1, Some(20.0), true),
            submission(3, 1, None, false),
            submission(4, 2, Some(1.0), false),
        ];
        let stats = assignment_statistics(&a, &submissions, 4);
        assert_eq!(stats.submitted_count, 3);
        assert_eq!(stats.graded_count, 2);
        assert_eq!(stats.late_count, 1);
        assert_eq!(stats.submission_rate, 75.0);
        let score_stats = stats.score_stats.unwrap();
        assert_eq!(score_stats.average, 35.0);
        assert_eq!(score_stats.max, 50.0);
        assert_eq!(score_stats.min, 20.0);
        let counts: Vec<u64> = stats.score_distribution.iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![1, 0, 0, 0, 1]);
    }

    #[test]
    fn test_assignment_without_submissions() {
        let stats = assignment_statistics(&assignment(1, 1, 100.0), &[], 0);
        assert_eq!(stats.submission_rate, 0.0);
        assert!(stats.score_stats.is_none());
        assert!(stats.score_distribution.iter().all(|r| r.count == 0));
    }

    #[test]
    fn test_student_overview() {
        let at = Utc::now();
        let c1 = priced_course(1, 7, "art", 0.0);
        let c2 = priced_course(2, 7, "art", 0.0);
        let mut done = enrollment(1, 1, 9, at);
        done.progress = 100;
        done.completed_at = Some(at);
        let mut partial = enrollment(2, 2, 9, at);
        partial.progress = 40;
        let enrollments = vec![
            EnrollmentWithCourse {
                enrollment: done,
                course: c1,
            },
            EnrollmentWithCourse {
                enrollment: partial,
                course: c2,
            },
        ];
        let assignments = vec![
            assignment(1, 1, 10.0),
            assignment(2, 2, 20.0),
            assignment(3, 2, 20.0),
        ];
        let submissions = vec![
            SubmissionWithAssignment {
                submission: submission(1, 1, Some(8.0), false),
                assignment_title: "hw 1".into(),
                course_id: 1,
                max_score: 10.0,
            },
            SubmissionWithAssignment {
                submission: submission(2, 2, None, false),
                assignment_title: "hw 2".into(),
                course_id: 2,
                max_score: 20.0,
            },
        ];

        let overview = student_overview(&enrollments, &assignments, &submissions);
        assert_eq!(overview.enrolled_courses, 2);
        assert_eq!(overview.completed_courses, 1);
        assert_eq!(overview.average_progress, 70.0);
        assert_eq!(overview.pending_assignments, 1);
        assert_eq!(overview.submitted_assignments, 2);
        assert_eq!(overview.average_score_percentage, Some(80.0));
    }

    #[test]
    fn test_distinct_active_students() {
        let at = Utc::now();
        let mut inactive = enrollment(3, 2, 5, at);
        inactive.is_active = false;
        let list = vec![enrollment(1, 1, 1, at), enrollment(2, 2, 1, at), inactive];
        assert_eq!(distinct_active_students(&list), 1);
    }
}
