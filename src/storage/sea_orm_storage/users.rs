use super::{SeaOrmStorage, contains_pattern, now_ts};
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{LmsError, Result};
use crate::models::{
    PaginationInfo,
    common::pagination::normalize_page,
    users::{
        entities::{User, UserRole},
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::{UserListResponse, UserRoleCounts},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, sea_query::Expr,
};

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = now_ts();

        let model = ActiveModel {
            email: Set(req.email),
            password_hash: Set(req.password),
            name: Set(req.name),
            role: Set(req.role.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建用户失败: {e}")))?;

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过邮箱获取用户
    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 批量获取用户
    pub async fn list_users_by_ids_impl(&self, ids: &[i64]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = Users::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("批量查询用户失败: {e}")))?;

        Ok(users.into_iter().map(|m| m.into_user()).collect())
    }

    /// 分页列出用户
    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListQuery,
    ) -> Result<UserListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = Users::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let search = search.trim();
            select = select.filter(
                Condition::any()
                    .add(Column::Email.like(contains_pattern(search)))
                    .add(Column::Name.like(contains_pattern(search))),
            );
        }

        if let Some(role) = query.role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }

        let paginator = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| LmsError::database_operation(format!("查询用户总数失败: {e}")))?;

        let users = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询用户列表失败: {e}")))?;

        Ok(UserListResponse {
            items: users.into_iter().map(|m| m.into_user()).collect(),
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    /// 更新用户最后登录时间
    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(Column::LastLogin, Expr::value(now_ts()))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新最后登录时间失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 更新用户信息
    pub async fn update_user_impl(
        &self,
        id: i64,
        update: UpdateUserRequest,
    ) -> Result<Option<User>> {
        if self.get_user_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now_ts()),
            ..Default::default()
        };

        if let Some(email) = update.email {
            model.email = Set(email);
        }

        if let Some(password) = update.password {
            model.password_hash = Set(password);
        }

        if let Some(name) = update.name {
            model.name = Set(name);
        }

        if let Some(role) = update.role {
            model.role = Set(role.to_string());
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新用户失败: {e}")))?;

        Ok(Some(updated.into_user()))
    }

    /// 删除用户
    pub async fn delete_user_impl(&self, id: i64) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("删除用户失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 按角色统计用户数量
    pub async fn count_users_by_role_impl(&self) -> Result<UserRoleCounts> {
        let rows: Vec<(String, i64)> = Users::find()
            .select_only()
            .column(Column::Role)
            .column_as(Column::Id.count(), "count")
            .group_by(Column::Role)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("统计用户数量失败: {e}")))?;

        let mut counts = UserRoleCounts::default();
        for (role, count) in rows {
            if let Ok(role) = role.parse::<UserRole>() {
                counts.add(role, count.max(0) as u64);
            }
        }
        Ok(counts)
    }

    /// 保存密码重置令牌
    pub async fn set_reset_token_impl(
        &self,
        user_id: i64,
        token: &str,
        expires_at: i64,
    ) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(Column::ResetToken, Expr::value(token.to_string()))
            .col_expr(Column::ResetTokenExpiresAt, Expr::value(expires_at))
            .filter(Column::Id.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("保存重置令牌失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 使用重置令牌设置新密码
    pub async fn reset_password_with_token_impl(
        &self,
        token: &str,
        password_hash: &str,
        now: i64,
    ) -> Result<Option<User>> {
        let token = token.to_string();
        let password_hash = password_hash.to_string();

        self.db
            .transaction::<_, Option<User>, LmsError>(|txn| {
                Box::pin(async move {
                    let Some(user) = Users::find()
                        .filter(Column::ResetToken.eq(token))
                        .filter(Column::ResetTokenExpiresAt.gt(now))
                        .one(txn)
                        .await?
                    else {
                        return Ok(None);
                    };

                    let mut model: ActiveModel = user.into();
                    model.password_hash = Set(password_hash);
                    model.reset_token = Set(None);
                    model.reset_token_expires_at = Set(None);
                    model.updated_at = Set(now);
                    let updated = model.update(txn).await?;

                    Ok(Some(updated.into_user()))
                })
            })
            .await
            .map_err(LmsError::from)
    }
}
