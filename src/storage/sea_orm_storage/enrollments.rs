use std::collections::HashMap;

use super::{SeaOrmStorage, now_ts};
use crate::entity::courses::{Column as CourseColumn, Entity as Courses};
use crate::entity::enrollments::{ActiveModel, Column, Entity as Enrollments};
use crate::errors::{LmsError, Result};
use crate::models::{
    courses::entities::Course,
    enrollments::{
        entities::{Enrollment, apply_progress},
        responses::{EnrolledStudent, EnrollmentWithCourse},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
    sea_query::Expr,
};

impl SeaOrmStorage {
    /// 选课；已退课的记录重新激活并保留进度
    pub async fn enroll_student_impl(&self, student_id: i64, course_id: i64) -> Result<Enrollment> {
        self.db
            .transaction::<_, Enrollment, LmsError>(|txn| {
                Box::pin(async move {
                    let now = now_ts();
                    let existing = Enrollments::find()
                        .filter(Column::StudentId.eq(student_id))
                        .filter(Column::CourseId.eq(course_id))
                        .one(txn)
                        .await?;

                    let model = match existing {
                        Some(row) if row.is_active => {
                            return Err(LmsError::conflict("已选修该课程"));
                        }
                        Some(row) => {
                            let mut model: ActiveModel = row.into();
                            model.is_active = Set(true);
                            model.updated_at = Set(now);
                            model.update(txn).await?
                        }
                        None => {
                            ActiveModel {
                                student_id: Set(student_id),
                                course_id: Set(course_id),
                                is_active: Set(true),
                                progress: Set(0),
                                enrolled_at: Set(now),
                                updated_at: Set(now),
                                completed_at: Set(None),
                                ..Default::default()
                            }
                            .insert(txn)
                            .await?
                        }
                    };

                    Ok(model.into_enrollment())
                })
            })
            .await
            .map_err(LmsError::from)
    }

    /// 获取选课记录（含已退课）
    pub async fn get_enrollment_impl(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>> {
        let result = Enrollments::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::CourseId.eq(course_id))
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询选课记录失败: {e}")))?;

        Ok(result.map(|m| m.into_enrollment()))
    }

    /// 学生的有效选课及课程信息
    pub async fn list_enrollments_by_student_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<EnrollmentWithCourse>> {
        let enrollments = Enrollments::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::IsActive.eq(true))
            .order_by_desc(Column::EnrolledAt)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询选课记录失败: {e}")))?;

        if enrollments.is_empty() {
            return Ok(Vec::new());
        }

        let course_ids: Vec<i64> = enrollments.iter().map(|e| e.course_id).collect();
        let courses: HashMap<i64, Course> = Courses::find()
            .filter(CourseColumn::Id.is_in(course_ids))
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程失败: {e}")))?
            .into_iter()
            .map(|m| (m.id, m.into_course()))
            .collect();

        Ok(enrollments
            .into_iter()
            .filter_map(|m| {
                let course = courses.get(&m.course_id)?.clone();
                Some(EnrollmentWithCourse {
                    enrollment: m.into_enrollment(),
                    course,
                })
            })
            .collect())
    }

    /// 更新学习进度，仅对有效选课生效
    pub async fn update_enrollment_progress_impl(
        &self,
        student_id: i64,
        course_id: i64,
        progress: i32,
    ) -> Result<Option<Enrollment>> {
        self.db
            .transaction::<_, Option<Enrollment>, LmsError>(|txn| {
                Box::pin(async move {
                    let Some(row) = Enrollments::find()
                        .filter(Column::StudentId.eq(student_id))
                        .filter(Column::CourseId.eq(course_id))
                        .filter(Column::IsActive.eq(true))
                        .one(txn)
                        .await?
                    else {
                        return Ok(None);
                    };

                    let now = now_ts();
                    let update = apply_progress(progress, row.completed_at, now);

                    let mut model: ActiveModel = row.into();
                    model.progress = Set(update.progress);
                    model.completed_at = Set(update.completed_at);
                    model.updated_at = Set(now);

                    Ok(Some(model.update(txn).await?.into_enrollment()))
                })
            })
            .await
            .map_err(LmsError::from)
    }

    /// 退课：保留记录，仅标记为无效
    pub async fn unenroll_student_impl(&self, student_id: i64, course_id: i64) -> Result<bool> {
        let result = Enrollments::update_many()
            .col_expr(Column::IsActive, Expr::value(false))
            .col_expr(Column::UpdatedAt, Expr::value(now_ts()))
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::IsActive.eq(true))
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("退课失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 课程的有效学生名单
    pub async fn list_course_students_impl(&self, course_id: i64) -> Result<Vec<EnrolledStudent>> {
        let enrollments = Enrollments::find()
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::IsActive.eq(true))
            .order_by_asc(Column::EnrolledAt)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询学生名单失败: {e}")))?;

        let student_ids: Vec<i64> = enrollments.iter().map(|e| e.student_id).collect();
        let students: HashMap<i64, (String, String)> = self
            .list_users_by_ids_impl(&student_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, (u.name, u.email)))
            .collect();

        Ok(enrollments
            .into_iter()
            .map(|m| {
                let (student_name, student_email) =
                    students.get(&m.student_id).cloned().unwrap_or_default();
                EnrolledStudent {
                    enrollment: m.into_enrollment(),
                    student_name,
                    student_email,
                }
            })
            .collect())
    }

    /// 全部选课记录，可按课程过滤
    pub async fn list_enrollments_impl(
        &self,
        course_ids: Option<&[i64]>,
    ) -> Result<Vec<Enrollment>> {
        let mut select = Enrollments::find();
        if let Some(course_ids) = course_ids {
            if course_ids.is_empty() {
                return Ok(Vec::new());
            }
            select = select.filter(Column::CourseId.is_in(course_ids.iter().copied()));
        }

        let enrollments = select
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询选课记录失败: {e}")))?;

        Ok(enrollments.into_iter().map(|m| m.into_enrollment()).collect())
    }
}
