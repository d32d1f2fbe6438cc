use std::collections::HashMap;

use super::{SeaOrmStorage, contains_pattern, now_ts};
use crate::entity::assignments::{Column as AssignmentColumn, Entity as Assignments};
use crate::entity::courses::{ActiveModel, Column, Entity as Courses};
use crate::entity::enrollments::{Column as EnrollmentColumn, Entity as Enrollments};
use crate::entity::lessons::{Column as LessonColumn, Entity as Lessons};
use crate::errors::{LmsError, Result};
use crate::models::{
    PaginationInfo,
    common::pagination::normalize_page,
    courses::{
        entities::{Course, CourseStatus, CourseVisibility},
        requests::{CourseListQuery, CreateCourseRequest, UpdateCourseRequest},
        responses::{CourseCounts, CourseListItem, CourseListResponse},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set,
};

/// 按可见范围过滤课程查询
fn apply_visibility(select: Select<Courses>, visibility: CourseVisibility) -> Select<Courses> {
    let public = Condition::all()
        .add(Column::Status.eq(CourseStatus::PUBLISHED))
        .add(Column::IsApproved.eq(true));

    match visibility {
        CourseVisibility::All => select,
        CourseVisibility::Public => select.filter(public),
        CourseVisibility::PublicOrOwnedBy(teacher_id) => select.filter(
            Condition::any()
                .add(public)
                .add(Column::TeacherId.eq(teacher_id)),
        ),
    }
}

impl SeaOrmStorage {
    /// 创建课程，新课程为草稿且未审核
    pub async fn create_course_impl(
        &self,
        teacher_id: i64,
        req: CreateCourseRequest,
    ) -> Result<Course> {
        let now = now_ts();

        let model = ActiveModel {
            title: Set(req.title.trim().to_string()),
            description: Set(req.description),
            teacher_id: Set(teacher_id),
            category: Set(req.category.trim().to_string()),
            duration: Set(req.duration.unwrap_or(0)),
            price: Set(req.price.unwrap_or(0.0)),
            thumbnail_url: Set(req.thumbnail_url),
            status: Set(CourseStatus::Draft.to_string()),
            is_approved: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建课程失败: {e}")))?;

        Ok(result.into_course())
    }

    /// 通过 ID 获取课程
    pub async fn get_course_by_id_impl(&self, id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 分页列出课程，附带教师姓名
    pub async fn list_courses_with_pagination_impl(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = apply_visibility(Courses::find(), query.visibility);

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let search = search.trim();
            select = select.filter(
                Condition::any()
                    .add(Column::Title.like(contains_pattern(search)))
                    .add(Column::Description.like(contains_pattern(search))),
            );
        }

        if let Some(ref category) = query.category
            && !category.trim().is_empty()
        {
            select = select.filter(Column::Category.eq(category.trim()));
        }

        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        let paginator = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程总数失败: {e}")))?;

        let courses = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程列表失败: {e}")))?;

        let mut teacher_ids: Vec<i64> = courses.iter().map(|c| c.teacher_id).collect();
        teacher_ids.sort_unstable();
        teacher_ids.dedup();
        let names: HashMap<i64, String> = self
            .list_users_by_ids_impl(&teacher_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();

        let items = courses
            .into_iter()
            .map(|m| {
                let teacher_name = names.get(&m.teacher_id).cloned();
                CourseListItem {
                    course: m.into_course(),
                    teacher_name,
                }
            })
            .collect();

        Ok(CourseListResponse {
            items,
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    /// 可见课程的分类
    pub async fn list_course_categories_impl(
        &self,
        visibility: CourseVisibility,
    ) -> Result<Vec<String>> {
        let categories: Vec<String> = apply_visibility(Courses::find(), visibility)
            .select_only()
            .column(Column::Category)
            .distinct()
            .order_by_asc(Column::Category)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程分类失败: {e}")))?;

        Ok(categories)
    }

    /// 教师自己的课程
    pub async fn list_courses_by_teacher_impl(&self, teacher_id: i64) -> Result<Vec<Course>> {
        let courses = Courses::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询教师课程失败: {e}")))?;

        Ok(courses.into_iter().map(|m| m.into_course()).collect())
    }

    /// 学生有效选课的课程
    pub async fn list_enrolled_courses_impl(&self, student_id: i64) -> Result<Vec<Course>> {
        let course_ids: Vec<i64> = Enrollments::find()
            .select_only()
            .column(EnrollmentColumn::CourseId)
            .filter(EnrollmentColumn::StudentId.eq(student_id))
            .filter(EnrollmentColumn::IsActive.eq(true))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询选课记录失败: {e}")))?;

        if course_ids.is_empty() {
            return Ok(Vec::new());
        }

        let courses = Courses::find()
            .filter(Column::Id.is_in(course_ids))
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询已选课程失败: {e}")))?;

        Ok(courses.into_iter().map(|m| m.into_course()).collect())
    }

    /// 全部课程
    pub async fn list_all_courses_impl(&self) -> Result<Vec<Course>> {
        let courses = Courses::find()
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(courses.into_iter().map(|m| m.into_course()).collect())
    }

    /// 更新课程
    pub async fn update_course_impl(
        &self,
        id: i64,
        update: UpdateCourseRequest,
    ) -> Result<Option<Course>> {
        if self.get_course_by_id_impl(id).await?.is_none() {
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
        if let Some(category) = update.category {
            model.category = Set(category.trim().to_string());
        }
        if let Some(duration) = update.duration {
            model.duration = Set(duration);
        }
        if let Some(price) = update.price {
            model.price = Set(price);
        }
        if let Some(thumbnail_url) = update.thumbnail_url {
            model.thumbnail_url = Set(Some(thumbnail_url));
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新课程失败: {e}")))?;

        Ok(Some(updated.into_course()))
    }

    /// 删除课程，课时、作业、提交与选课级联删除
    pub async fn delete_course_impl(&self, id: i64) -> Result<bool> {
        let result = Courses::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("删除课程失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 设置课程审核状态
    pub async fn set_course_approval_impl(
        &self,
        id: i64,
        is_approved: bool,
    ) -> Result<Option<Course>> {
        if self.get_course_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let model = ActiveModel {
            id: Set(id),
            is_approved: Set(is_approved),
            updated_at: Set(now_ts()),
            ..Default::default()
        };

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新课程审核状态失败: {e}")))?;

        Ok(Some(updated.into_course()))
    }

    /// 课程的课时数、作业数与有效选课人数
    pub async fn get_course_counts_impl(&self, course_id: i64) -> Result<CourseCounts> {
        let lesson_count = Lessons::find()
            .filter(LessonColumn::CourseId.eq(course_id))
            .count(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("统计课时失败: {e}")))?;

        let assignment_count = Assignments::find()
            .filter(AssignmentColumn::CourseId.eq(course_id))
            .count(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("统计作业失败: {e}")))?;

        let student_count = Enrollments::find()
            .filter(EnrollmentColumn::CourseId.eq(course_id))
            .filter(EnrollmentColumn::IsActive.eq(true))
            .count(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("统计选课人数失败: {e}")))?;

        Ok(CourseCounts {
            lesson_count,
            assignment_count,
            student_count,
        })
    }
}
