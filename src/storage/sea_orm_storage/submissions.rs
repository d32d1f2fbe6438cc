use std::collections::HashMap;

use super::{SeaOrmStorage, now_ts};
use crate::entity::assignments::{Column as AssignmentColumn, Entity as Assignments};
use crate::entity::submissions::{ActiveModel, Column, Entity as Submissions};
use crate::entity::to_datetime;
use crate::errors::{LmsError, Result};
use crate::models::{
    assignments::{entities::Assignment, requests::SubmitAssignmentRequest},
    common::attachments::encode_attachments,
    submissions::{
        entities::{Submission, validate_score},
        requests::UpdateSubmissionRequest,
        responses::{SubmissionWithAssignment, SubmissionWithStudent},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建提交，逾期提交会被标记
    pub async fn create_submission_impl(
        &self,
        assignment: &Assignment,
        student_id: i64,
        req: SubmitAssignmentRequest,
    ) -> Result<Submission> {
        let assignment_id = assignment.id;
        let now = now_ts();
        let is_late = assignment.is_late_at(to_datetime(now));

        self.db
            .transaction::<_, Submission, LmsError>(|txn| {
                Box::pin(async move {
                    let existing = Submissions::find()
                        .filter(Column::AssignmentId.eq(assignment_id))
                        .filter(Column::StudentId.eq(student_id))
                        .count(txn)
                        .await?;
                    if existing > 0 {
                        return Err(LmsError::conflict("该作业已提交"));
                    }

                    let model = ActiveModel {
                        assignment_id: Set(assignment_id),
                        student_id: Set(student_id),
                        content: Set(req.content),
                        attachments: Set(encode_attachments(
                            req.attachments.as_deref().unwrap_or_default(),
                        )),
                        is_late: Set(is_late),
                        submitted_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    };

                    Ok(model.insert(txn).await?.into_submission())
                })
            })
            .await
            .map_err(LmsError::from)
    }

    /// 通过 ID 获取提交
    pub async fn get_submission_by_id_impl(&self, id: i64) -> Result<Option<Submission>> {
        let result = Submissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    pub async fn get_submission_by_assignment_and_student_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>> {
        let result = Submissions::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 作业的全部提交，附带学生信息
    pub async fn list_submissions_by_assignment_impl(
        &self,
        assignment_id: i64,
    ) -> Result<Vec<SubmissionWithStudent>> {
        let submissions = Submissions::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .order_by_asc(Column::SubmittedAt)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询提交列表失败: {e}")))?;

        let student_ids: Vec<i64> = submissions.iter().map(|s| s.student_id).collect();
        let students: HashMap<i64, (String, String)> = self
            .list_users_by_ids_impl(&student_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, (u.name, u.email)))
            .collect();

        Ok(submissions
            .into_iter()
            .map(|m| {
                let (student_name, student_email) =
                    students.get(&m.student_id).cloned().unwrap_or_default();
                SubmissionWithStudent {
                    submission: m.into_submission(),
                    student_name,
                    student_email,
                }
            })
            .collect())
    }

    /// 多个作业的全部提交
    pub async fn list_submissions_by_assignments_impl(
        &self,
        assignment_ids: &[i64],
    ) -> Result<Vec<Submission>> {
        if assignment_ids.is_empty() {
            return Ok(Vec::new());
        }

        let submissions = Submissions::find()
            .filter(Column::AssignmentId.is_in(assignment_ids.iter().copied()))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询提交列表失败: {e}")))?;

        Ok(submissions.into_iter().map(|m| m.into_submission()).collect())
    }

    /// 学生自己的提交，可按课程过滤
    pub async fn list_submissions_by_student_impl(
        &self,
        student_id: i64,
        course_id: Option<i64>,
    ) -> Result<Vec<SubmissionWithAssignment>> {
        let submissions = Submissions::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::SubmittedAt)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询提交列表失败: {e}")))?;

        if submissions.is_empty() {
            return Ok(Vec::new());
        }

        let assignment_ids: Vec<i64> = submissions.iter().map(|s| s.assignment_id).collect();
        let mut select = Assignments::find().filter(AssignmentColumn::Id.is_in(assignment_ids));
        if let Some(course_id) = course_id {
            select = select.filter(AssignmentColumn::CourseId.eq(course_id));
        }
        let assignments: HashMap<i64, Assignment> = select
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询作业失败: {e}")))?
            .into_iter()
            .map(|m| (m.id, m.into_assignment()))
            .collect();

        Ok(submissions
            .into_iter()
            .filter_map(|m| {
                let assignment = assignments.get(&m.assignment_id)?;
                Some(SubmissionWithAssignment {
                    submission: m.into_submission(),
                    assignment_title: assignment.title.clone(),
                    course_id: assignment.course_id,
                    max_score: assignment.max_score,
                })
            })
            .collect())
    }

    /// 修改未批改的提交
    pub async fn update_submission_impl(
        &self,
        id: i64,
        update: UpdateSubmissionRequest,
    ) -> Result<Option<Submission>> {
        self.db
            .transaction::<_, Option<Submission>, LmsError>(|txn| {
                Box::pin(async move {
                    let Some(existing) = Submissions::find_by_id(id).one(txn).await? else {
                        return Ok(None);
                    };
                    if existing.graded_at.is_some() {
                        return Err(LmsError::conflict("已批改的提交不能修改"));
                    }

                    let due_date = Assignments::find_by_id(existing.assignment_id)
                        .one(txn)
                        .await?
                        .and_then(|a| a.due_date);

                    let now = now_ts();
                    let mut model: ActiveModel = existing.into();
                    if let Some(content) = update.content {
                        model.content = Set(Some(content));
                    }
                    if let Some(attachments) = update.attachments {
                        model.attachments = Set(encode_attachments(&attachments));
                    }
                    if due_date.is_some_and(|due| now > due) {
                        model.is_late = Set(true);
                    }
                    model.updated_at = Set(now);

                    Ok(Some(model.update(txn).await?.into_submission()))
                })
            })
            .await
            .map_err(LmsError::from)
    }

    /// 删除提交
    pub async fn delete_submission_impl(&self, id: i64) -> Result<bool> {
        let result = Submissions::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("删除提交失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 批改提交，分数按作业满分校验
    pub async fn grade_submission_impl(
        &self,
        id: i64,
        score: f64,
        feedback: Option<String>,
        grader_id: i64,
    ) -> Result<Option<Submission>> {
        self.db
            .transaction::<_, Option<Submission>, LmsError>(|txn| {
                Box::pin(async move {
                    let Some(existing) = Submissions::find_by_id(id).one(txn).await? else {
                        return Ok(None);
                    };
                    let Some(assignment) =
                        Assignments::find_by_id(existing.assignment_id).one(txn).await?
                    else {
                        return Ok(None);
                    };

                    validate_score(score, assignment.max_score).map_err(LmsError::validation)?;

                    let mut model: ActiveModel = existing.into();
                    model.score = Set(Some(score));
                    model.feedback = Set(feedback);
                    model.graded_at = Set(Some(now_ts()));
                    model.graded_by_teacher_id = Set(Some(grader_id));

                    Ok(Some(model.update(txn).await?.into_submission()))
                })
            })
            .await
            .map_err(LmsError::from)
    }

    /// 指定课程中待批改的提交数
    pub async fn count_ungraded_submissions_by_courses_impl(
        &self,
        course_ids: &[i64],
    ) -> Result<u64> {
        if course_ids.is_empty() {
            return Ok(0);
        }

        let assignment_ids: Vec<i64> = Assignments::find()
            .select_only()
            .column(AssignmentColumn::Id)
            .filter(AssignmentColumn::CourseId.is_in(course_ids.iter().copied()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询作业失败: {e}")))?;

        if assignment_ids.is_empty() {
            return Ok(0);
        }

        Submissions::find()
            .filter(Column::AssignmentId.is_in(assignment_ids))
            .filter(Column::GradedAt.is_null())
            .count(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("统计待批改提交失败: {e}")))
    }
}
