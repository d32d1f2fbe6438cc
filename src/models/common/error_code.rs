use serde::Serialize;

/// 业务错误码，随响应信封中的 `code` 字段返回
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    // 认证
    AuthFailed = 2000,
    RegisterFailed = 2001,
    ResetTokenInvalid = 2002,
    CurrentPasswordIncorrect = 2003,

    // 用户
    UserNotFound = 3000,
    UserEmailAlreadyExists = 3001,
    UserEmailInvalid = 3002,
    UserNameInvalid = 3003,
    UserPasswordInvalid = 3004,
    UserRoleInvalid = 3005,
    CanNotDeleteCurrentUser = 3006,

    // 课程
    CourseNotFound = 4000,
    CoursePermissionDenied = 4001,
    CourseNotAvailable = 4002,
    CourseInvalid = 4003,

    // 课时
    LessonNotFound = 4100,
    LessonInvalid = 4101,
    LessonOrderInvalid = 4102,

    // 作业
    AssignmentNotFound = 4200,
    AssignmentInvalid = 4201,

    // 提交
    SubmissionNotFound = 4300,
    SubmissionAlreadyExists = 4301,
    SubmissionAlreadyGraded = 4302,
    ScoreOutOfRange = 4303,

    // 选课
    EnrollmentNotFound = 4400,
    AlreadyEnrolled = 4401,
    NotEnrolled = 4402,

    // 答疑
    ConsultationNotFound = 4500,
    ConsultationInvalid = 4501,

    // 文件
    FileNotFound = 5000,
    FileUploadFailed = 5001,
    FileTypeNotAllowed = 5002,
    FileSizeExceeded = 5003,
    MultifileUploadNotAllowed = 5004,
    FileCategoryInvalid = 5005,
    FileEmpty = 5006,
    FileReferenceDenied = 5007,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ErrorCode::Success as i32, 0);
        assert_eq!(ErrorCode::Unauthorized as i32, 1001);
        assert_eq!(ErrorCode::ScoreOutOfRange as i32, 4303);
        assert_eq!(ErrorCode::FileSizeExceeded as i32, 5003);
    }
}
