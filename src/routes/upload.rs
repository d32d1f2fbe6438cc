use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::services::FileService;
use crate::utils::SafeFilePath;

// 懒加载的全局 FileService 实例
static FILE_SERVICE: Lazy<FileService> = Lazy::new(FileService::new_lazy);

pub async fn handle_upload(
    request: HttpRequest,
    category: web::Path<String>,
    payload: actix_multipart::Multipart,
) -> ActixResult<HttpResponse> {
    FILE_SERVICE
        .handle_upload(&request, category.into_inner(), payload)
        .await
}

pub async fn handle_download(
    request: HttpRequest,
    file: SafeFilePath,
) -> ActixResult<HttpResponse> {
    FILE_SERVICE.handle_download(&request, file).await
}

pub async fn handle_delete(request: HttpRequest, file: SafeFilePath) -> ActixResult<HttpResponse> {
    FILE_SERVICE.handle_delete(&request, file).await
}

// 配置路由
pub fn configure_upload_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/upload")
            .wrap(middlewares::RequireJWT)
            .route(
                "/files/{category}/{user_id}/{file}",
                web::get().to(handle_download),
            )
            .route(
                "/files/{category}/{user_id}/{file}",
                web::delete().to(handle_delete),
            )
            .route("/{category}", web::post().to(handle_upload)),
    );
}
