use super::{SeaOrmStorage, now_ts};
use crate::entity::lessons::{ActiveModel, Column, Entity as Lessons};
use crate::errors::{LmsError, Result};
use crate::models::common::attachments::encode_attachments;
use crate::models::lessons::{
    entities::Lesson,
    requests::{CreateLessonRequest, UpdateLessonRequest, is_full_permutation},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, sea_query::Expr,
};

/// 课程内课时按顺序排列
async fn ordered_lessons<C: ConnectionTrait>(conn: &C, course_id: i64) -> Result<Vec<Lesson>> {
    let lessons = Lessons::find()
        .filter(Column::CourseId.eq(course_id))
        .order_by_asc(Column::OrderIndex)
        .order_by_asc(Column::Id)
        .all(conn)
        .await
        .map_err(|e| LmsError::database_operation(format!("查询课时列表失败: {e}")))?;

    Ok(lessons.into_iter().map(|m| m.into_lesson()).collect())
}

impl SeaOrmStorage {
    /// 创建课时，未指定顺序时排在最后
    pub async fn create_lesson_impl(
        &self,
        course_id: i64,
        req: CreateLessonRequest,
    ) -> Result<Lesson> {
        self.db
            .transaction::<_, Lesson, LmsError>(|txn| {
                Box::pin(async move {
                    let order_index = match req.order_index {
                        Some(index) => index,
                        None => {
                            let max_order = Lessons::find()
                                .select_only()
                                .column_as(Column::OrderIndex.max(), "max_order")
                                .filter(Column::CourseId.eq(course_id))
                                .into_tuple::<Option<i32>>()
                                .one(txn)
                                .await?
                                .flatten();
                            max_order.map_or(0, |max| max + 1)
                        }
                    };

                    let now = now_ts();
                    let model = ActiveModel {
                        course_id: Set(course_id),
                        title: Set(req.title.trim().to_string()),
                        content: Set(req.content),
                        video_url: Set(req.video_url),
                        attachments: Set(encode_attachments(
                            req.attachments.as_deref().unwrap_or_default(),
                        )),
                        order_index: Set(order_index),
                        duration_minutes: Set(req.duration_minutes),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    };

                    Ok(model.insert(txn).await?.into_lesson())
                })
            })
            .await
            .map_err(LmsError::from)
    }

    /// 获取课程下的课时
    pub async fn get_lesson_by_id_impl(&self, course_id: i64, id: i64) -> Result<Option<Lesson>> {
        let result = Lessons::find_by_id(id)
            .filter(Column::CourseId.eq(course_id))
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课时失败: {e}")))?;

        Ok(result.map(|m| m.into_lesson()))
    }

    pub async fn list_lessons_by_course_impl(&self, course_id: i64) -> Result<Vec<Lesson>> {
        ordered_lessons(&self.db, course_id).await
    }

    /// 更新课时
    pub async fn update_lesson_impl(
        &self,
        course_id: i64,
        id: i64,
        update: UpdateLessonRequest,
    ) -> Result<Option<Lesson>> {
        if self.get_lesson_by_id_impl(course_id, id).await?.is_none() {
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
        if let Some(content) = update.content {
            model.content = Set(Some(content));
        }
        if let Some(video_url) = update.video_url {
            model.video_url = Set(Some(video_url));
        }
        if let Some(attachments) = update.attachments {
            model.attachments = Set(encode_attachments(&attachments));
        }
        if let Some(order_index) = update.order_index {
            model.order_index = Set(order_index);
        }
        if let Some(duration_minutes) = update.duration_minutes {
            model.duration_minutes = Set(Some(duration_minutes));
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新课时失败: {e}")))?;

        Ok(Some(updated.into_lesson()))
    }

    /// 删除课时
    pub async fn delete_lesson_impl(&self, course_id: i64, id: i64) -> Result<bool> {
        let result = Lessons::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::CourseId.eq(course_id))
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("删除课时失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 按给定 ID 顺序将 order_index 重写为 0..n
    pub async fn reorder_lessons_impl(
        &self,
        course_id: i64,
        lesson_ids: Vec<i64>,
    ) -> Result<Vec<Lesson>> {
        self.db
            .transaction::<_, Vec<Lesson>, LmsError>(|txn| {
                Box::pin(async move {
                    let existing: Vec<i64> = Lessons::find()
                        .select_only()
                        .column(Column::Id)
                        .filter(Column::CourseId.eq(course_id))
                        .into_tuple()
                        .all(txn)
                        .await?;

                    if !is_full_permutation(&existing, &lesson_ids) {
                        return Err(LmsError::validation(
                            "lesson_ids must list every lesson of the course exactly once",
                        ));
                    }

                    let now = now_ts();
                    for (index, lesson_id) in lesson_ids.iter().enumerate() {
                        Lessons::update_many()
                            .col_expr(Column::OrderIndex, Expr::value(index as i32))
                            .col_expr(Column::UpdatedAt, Expr::value(now))
                            .filter(Column::Id.eq(*lesson_id))
                            .exec(txn)
                            .await?;
                    }

                    ordered_lessons(txn, course_id).await
                })
            })
            .await
            .map_err(LmsError::from)
    }
}
