use super::{SeaOrmStorage, contains_pattern};
use crate::entity::assignments::{Column as AssignmentColumn, Entity as Assignments};
use crate::entity::lessons::{Column as LessonColumn, Entity as Lessons};
use crate::entity::submissions::{Column as SubmissionColumn, Entity as Submissions};
use crate::errors::{LmsError, Result};
use crate::models::common::attachments::decode_attachments;
use crate::models::files::entities::FileReferences;
use crate::utils::upload_path::relative_from_reference;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter};

/// 引用串是否精确指向该文件
fn refers_to(reference: &str, relative_path: &str) -> bool {
    relative_from_reference(reference) == Some(relative_path)
}

fn any_attachment_refers_to(raw: Option<&str>, relative_path: &str) -> bool {
    decode_attachments(raw)
        .iter()
        .any(|r| refers_to(r, relative_path))
}

impl SeaOrmStorage {
    /// 查找引用上传文件的课时、作业与提交
    ///
    /// 先用 LIKE 粗筛，再解码附件列表逐项精确比对。
    pub async fn find_file_references_impl(&self, relative_path: &str) -> Result<FileReferences> {
        let mut refs = FileReferences::default();

        let lessons = Lessons::find()
            .filter(
                Condition::any()
                    .add(LessonColumn::VideoUrl.like(contains_pattern(relative_path)))
                    .add(LessonColumn::Attachments.like(contains_pattern(relative_path))),
            )
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课时附件失败: {e}")))?;

        for lesson in lessons {
            let video_match = lesson
                .video_url
                .as_deref()
                .is_some_and(|v| refers_to(v, relative_path));
            if video_match || any_attachment_refers_to(lesson.attachments.as_deref(), relative_path)
            {
                refs.course_ids.push(lesson.course_id);
            }
        }

        let assignments = Assignments::find()
            .filter(AssignmentColumn::Attachments.like(contains_pattern(relative_path)))
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询作业附件失败: {e}")))?;

        for assignment in assignments {
            if any_attachment_refers_to(assignment.attachments.as_deref(), relative_path) {
                refs.course_ids.push(assignment.course_id);
            }
        }

        let submissions = Submissions::find()
            .filter(SubmissionColumn::Attachments.like(contains_pattern(relative_path)))
            .find_also_related(Assignments)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询提交附件失败: {e}")))?;

        for (submission, assignment) in submissions {
            if let Some(assignment) = assignment
                && any_attachment_refers_to(submission.attachments.as_deref(), relative_path)
            {
                refs.submissions
                    .push((submission.student_id, assignment.course_id));
            }
        }

        refs.course_ids.sort_unstable();
        refs.course_ids.dedup();
        Ok(refs)
    }
}
