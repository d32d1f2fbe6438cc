use std::collections::HashMap;

use super::{SeaOrmStorage, now_ts};
use crate::entity::assignments::{ActiveModel, Column, Entity as Assignments};
use crate::entity::submissions::{Column as SubmissionColumn, Entity as Submissions};
use crate::errors::{LmsError, Result};
use crate::models::{
    assignments::{
        entities::Assignment,
        requests::{CreateAssignmentRequest, UpdateAssignmentRequest},
        responses::SubmissionCounts,
    },
    common::attachments::encode_attachments,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 创建作业
    pub async fn create_assignment_impl(
        &self,
        course_id: i64,
        req: CreateAssignmentRequest,
    ) -> Result<Assignment> {
        let now = now_ts();

        let model = ActiveModel {
            course_id: Set(course_id),
            title: Set(req.title.trim().to_string()),
            description: Set(req.description),
            due_date: Set(req.due_date.map(|d| d.timestamp())),
            max_score: Set(req.max_score),
            attachments: Set(encode_attachments(req.attachments.as_deref().unwrap_or_default())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建作业失败: {e}")))?;

        Ok(result.into_assignment())
    }

    /// 通过 ID 获取作业
    pub async fn get_assignment_by_id_impl(&self, id: i64) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询作业失败: {e}")))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    /// 课程下的作业，按截止时间排序，无截止时间的排在最后
    pub async fn list_assignments_by_course_impl(&self, course_id: i64) -> Result<Vec<Assignment>> {
        self.list_assignments_by_courses_impl(&[course_id]).await
    }

    pub async fn list_assignments_by_courses_impl(
        &self,
        course_ids: &[i64],
    ) -> Result<Vec<Assignment>> {
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }

        let assignments = Assignments::find()
            .filter(Column::CourseId.is_in(course_ids.iter().copied()))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询作业列表失败: {e}")))?;

        let mut assignments: Vec<Assignment> =
            assignments.into_iter().map(|m| m.into_assignment()).collect();
        assignments.sort_by_key(|a| (a.due_date.is_none(), a.due_date));
        Ok(assignments)
    }

    /// 更新作业
    pub async fn update_assignment_impl(
        &self,
        id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>> {
        if self.get_assignment_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now_ts()),
            ..Default::default()
        };

        if let Some(title) = update.title {
            model.title = Set(title.trim().to_string());
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        if let Some(due_date) = update.due_date {
            model.due_date = Set(Some(due_date.timestamp()));
        }
        if let Some(max_score) = update.max_score {
            model.max_score = Set(max_score);
        }
        if let Some(attachments) = update.attachments {
            model.attachments = Set(encode_attachments(&attachments));
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新作业失败: {e}")))?;

        Ok(Some(updated.into_assignment()))
    }

    /// 删除作业，提交级联删除
    pub async fn delete_assignment_impl(&self, id: i64) -> Result<bool> {
        let result = Assignments::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("删除作业失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 课程下每个作业的提交数与已批改数
    pub async fn count_submissions_by_course_impl(
        &self,
        course_id: i64,
    ) -> Result<HashMap<i64, SubmissionCounts>> {
        let assignment_ids: Vec<i64> = Assignments::find()
            .select_only()
            .column(Column::Id)
            .filter(Column::CourseId.eq(course_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询作业失败: {e}")))?;

        let mut counts: HashMap<i64, SubmissionCounts> = assignment_ids
            .iter()
            .map(|id| (*id, SubmissionCounts::default()))
            .collect();

        if assignment_ids.is_empty() {
            return Ok(counts);
        }

        let rows: Vec<(i64, Option<i64>)> = Submissions::find()
            .select_only()
            .column(SubmissionColumn::AssignmentId)
            .column(SubmissionColumn::GradedAt)
            .filter(SubmissionColumn::AssignmentId.is_in(assignment_ids))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("统计提交失败: {e}")))?;

        for (assignment_id, graded_at) in rows {
            let entry = counts.entry(assignment_id).or_default();
            entry.submission_count += 1;
            if graded_at.is_some() {
                entry.graded_count += 1;
            }
        }

        Ok(counts)
    }
}
