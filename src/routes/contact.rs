use std::fmt::Debug;

use actix_web::{
    error::JsonPayloadError, http::StatusCode, web, HttpRequest, HttpResponse, ResponseError,
};
use anyhow::Context;

use crate::{
    domain::{ContactSubmission, ValidationError},
    email_client::EmailClient,
    util::error_chain_fmt,
};

/// 四个字段缺一不可，缺失或类型不符按解析错误处理
#[derive(serde::Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub topic: String,
    pub message: String,
}

#[derive(serde::Serialize)]
struct SentBody {
    ok: bool,
    message: &'static str,
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

#[tracing::instrument(
    name = "relaying a contact submission",
    skip_all,
    fields(topic = %body.topic)
)]
pub async fn contact(
    body: web::Json<ContactRequest>,
    email_client: web::Data<EmailClient>,
) -> Result<HttpResponse, ContactError> {
    // 不信任客户端校验，重新校验全部字段
    let submission: ContactSubmission = body.0.try_into()?;
    let html_body = submission
        .html_body()
        .context("failed to render the contact email body.")?;

    email_client
        .send(
            submission.email.as_ref(),
            &submission.subject(),
            &submission.text_body(),
            &html_body,
        )
        .await
        .context("failed to relay the contact submission.")
        .map_err(|e| {
            tracing::error!(error.cause_chain = ?e, error.message = %e, "email delivery failed.");
            e
        })?;

    Ok(HttpResponse::Ok().json(SentBody {
        ok: true,
        message: "Email sent",
    }))
}

/// 请求体无法解析为`ContactRequest`时走500通道
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let kind = payload_error_kind(&err);
    tracing::error!(error.kind = %kind, "rejected an unparsable contact request.");
    ContactError::UnexpectedError(anyhow::anyhow!(
        "failed to parse the contact request body: {kind}"
    ))
    .into()
}

// serde_json的错误信息会引用提交的值，日志里只记录类别和位置
fn payload_error_kind(err: &JsonPayloadError) -> String {
    match err {
        JsonPayloadError::ContentType => "unsupported content type".into(),
        JsonPayloadError::Deserialize(e) => format!(
            "{:?} error at line {} column {}",
            e.classify(),
            e.line(),
            e.column()
        ),
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            "payload too large".into()
        }
        JsonPayloadError::Payload(_) => "failed to read payload".into(),
        _ => "unknown payload error".into(),
    }
}

#[derive(thiserror::Error)]
pub enum ContactError {
    #[error(transparent)]
    ValidationError(#[from] ValidationError),
    #[error("Internal server error")]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for ContactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ContactError {
    fn status_code(&self) -> StatusCode {
        match self {
            ContactError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ContactError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // 内部错误只返回通用信息
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}
