//! 答疑预约实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "consultations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub teacher_id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub scheduled_at: i64,
    pub duration_minutes: i32,
    pub topic: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_consultation(self) -> crate::models::consultations::entities::Consultation {
        use super::to_datetime;
        use crate::models::consultations::entities::Consultation;

        Consultation {
            id: self.id,
            teacher_id: self.teacher_id,
            student_id: self.student_id,
            course_id: self.course_id,
            scheduled_at: to_datetime(self.scheduled_at),
            duration_minutes: self.duration_minutes,
            topic: self.topic,
            notes: self.notes,
            created_at: to_datetime(self.created_at),
        }
    }
}
