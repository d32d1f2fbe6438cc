use std::collections::HashMap;

use super::{SeaOrmStorage, now_ts};
use crate::entity::consultations::{ActiveModel, Column, Entity as Consultations};
use crate::entity::courses::{Column as CourseColumn, Entity as Courses};
use crate::errors::{LmsError, Result};
use crate::models::consultations::{
    entities::Consultation,
    requests::{ConsultationFilter, NewConsultation},
    responses::ConsultationItem,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 创建答疑预约
    pub async fn create_consultation_impl(&self, new: NewConsultation) -> Result<Consultation> {
        let model = ActiveModel {
            teacher_id: Set(new.teacher_id),
            student_id: Set(new.student_id),
            course_id: Set(new.course_id),
            scheduled_at: Set(new.scheduled_at.timestamp()),
            duration_minutes: Set(new.duration_minutes),
            topic: Set(new.topic),
            notes: Set(new.notes),
            created_at: Set(now_ts()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建答疑预约失败: {e}")))?;

        Ok(result.into_consultation())
    }

    pub async fn get_consultation_by_id_impl(&self, id: i64) -> Result<Option<Consultation>> {
        let result = Consultations::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询答疑预约失败: {e}")))?;

        Ok(result.map(|m| m.into_consultation()))
    }

    /// 按参与者筛选答疑预约，按预约时间排序
    pub async fn list_consultations_impl(
        &self,
        filter: ConsultationFilter,
    ) -> Result<Vec<ConsultationItem>> {
        let mut select = Consultations::find();
        if let Some(teacher_id) = filter.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }
        if let Some(student_id) = filter.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }

        let consultations = select
            .order_by_asc(Column::ScheduledAt)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询答疑预约失败: {e}")))?;

        if consultations.is_empty() {
            return Ok(Vec::new());
        }

        let course_ids: Vec<i64> = consultations.iter().map(|c| c.course_id).collect();
        let titles: HashMap<i64, String> = Courses::find()
            .select_only()
            .column(CourseColumn::Id)
            .column(CourseColumn::Title)
            .filter(CourseColumn::Id.is_in(course_ids))
            .into_tuple::<(i64, String)>()
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程失败: {e}")))?
            .into_iter()
            .collect();

        Ok(consultations
            .into_iter()
            .map(|m| {
                let course_title = titles.get(&m.course_id).cloned().unwrap_or_default();
                ConsultationItem {
                    consultation: m.into_consultation(),
                    course_title,
                }
            })
            .collect())
    }

    pub async fn delete_consultation_impl(&self, id: i64) -> Result<bool> {
        let result = Consultations::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("删除答疑预约失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
