use serde::Deserialize;
use ts_rs::TS;

// 创建作业请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct CreateAssignmentRequest {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default = "default_max_score")]
    pub max_score: f64,
    pub attachments: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct UpdateAssignmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub max_score: Option<f64>,
    pub attachments: Option<Vec<String>>,
}

// 学生提交作业
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct SubmitAssignmentRequest {
    pub content: Option<String>,
    pub attachments: Option<Vec<String>>,
}

fn default_max_score() -> f64 {
    100.0
}

fn validate_assignment_fields(
    title: Option<&str>,
    max_score: Option<f64>,
) -> Result<(), &'static str> {
    if let Some(title) = title
        && (title.trim().is_empty() || title.chars().count() > 200)
    {
        return Err("Assignment title must be between 1 and 200 characters");
    }
    if let Some(max_score) = max_score
        && (!max_score.is_finite() || max_score <= 0.0)
    {
        return Err("Assignment max_score must be greater than 0");
    }
    Ok(())
}

impl CreateAssignmentRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_assignment_fields(Some(&self.title), Some(self.max_score))
    }
}

impl UpdateAssignmentRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_assignment_fields(self.title.as_deref(), self.max_score)
    }
}

impl SubmitAssignmentRequest {
    /// 内容和附件至少要有一项
    pub fn validate(&self) -> Result<(), &'static str> {
        let has_content = self
            .content
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty());
        let has_attachments = self
            .attachments
            .as_ref()
            .is_some_and(|a| a.iter().any(|s| !s.trim().is_empty()));
        if has_content || has_attachments {
            Ok(())
        } else {
            Err("Submission must contain content or attachments")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_score_must_be_positive() {
        let mut req: CreateAssignmentRequest =
            serde_json::from_str(r#"{"title":"Essay"}"#).unwrap();
        assert_eq!(req.max_score, 100.0);
        assert!(req.validate().is_ok());
        req.max_score = 0.0;
        assert!(req.validate().is_err());
        req.max_score = -5.0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_empty_submission_rejected() {
        let empty = SubmitAssignmentRequest {
            content: Some("   ".into()),
            attachments: Some(vec!["".into()]),
        };
        assert!(empty.validate().is_err());
        let ok = SubmitAssignmentRequest {
            content: None,
            attachments: Some(vec!["attachment/3/a.zip".into()]),
        };
        assert!(ok.validate().is_ok());
    }
}
