use serde::Serialize;
use ts_rs::TS;

use super::entities::Consultation;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/consultation.ts")]
pub struct ConsultationItem {
    #[serde(flatten)]
    #[ts(flatten)]
    pub consultation: Consultation,
    pub course_title: String,
}
