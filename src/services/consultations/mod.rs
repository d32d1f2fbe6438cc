pub mod create;
pub mod delete;
pub mod my;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::consultations::requests::CreateConsultationRequest;
use crate::storage::Storage;

pub struct ConsultationService {
    storage: Option<Arc<dyn Storage>>,
}

impl ConsultationService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    // 预约答疑
    pub async fn create_consultation(
        &self,
        consultation: CreateConsultationRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_consultation(self, consultation, request).await
    }

    // 我的答疑
    pub async fn list_my_consultations(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        my::list_my_consultations(self, request).await
    }

    // 取消答疑
    pub async fn delete_consultation(
        &self,
        consultation_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_consultation(self, consultation_id, request).await
    }
}
