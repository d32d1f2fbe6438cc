use super::entities::{User, UserRole};
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

// 用户列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UserListResponse {
    pub items: Vec<User>,
    pub pagination: PaginationInfo,
}

// 各角色用户数量
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UserRoleCounts {
    pub admins: u64,
    pub teachers: u64,
    pub students: u64,
}

impl UserRoleCounts {
    pub fn add(&mut self, role: UserRole, count: u64) {
        match role {
            UserRole::Admin => self.admins += count,
            UserRole::Teacher => self.teachers += count,
            UserRole::Student => self.students += count,
        }
    }

    pub fn total(&self) -> u64 {
        self.admins + self.teachers + self.students
    }
}
