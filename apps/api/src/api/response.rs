use axum::{http::StatusCode, Json};
use serde::Serialize;

use crate::domain::pagination::{Page, PageMeta};

/// Success envelope: `{data, message, success}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub message: String,
    pub success: bool,
}

/// List envelope: `{data, meta, message, success}`
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
    pub message: String,
    pub success: bool,
}

pub fn ok<T: Serialize>(data: T, message: impl Into<String>) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        data,
        message: message.into(),
        success: true,
    })
}

pub fn created<T: Serialize>(data: T, message: impl Into<String>) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, ok(data, message))
}

pub fn list<T: Serialize>(page: Page<T>, message: impl Into<String>) -> Json<ListResponse<T>> {
    Json(ListResponse {
        data: page.data,
        meta: page.meta,
        message: message.into(),
        success: true,
    })
}
