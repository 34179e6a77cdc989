use rocket::http::Status;
use rocket::response::{self, Responder, Response};
use rocket::serde::json::Json;
use rocket::Request;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub message: String,
}

/// Upstream or request failure rendered as a JSON response
#[derive(Debug)]
pub struct ApiError {
    status: Status,
    body: ErrorBody,
}

impl From<anime_info::Error> for ApiError {
    fn from(err: anime_info::Error) -> Self {
        let status = Status::from_code(err.status()).unwrap_or(Status::InternalServerError);
        let message = match &err {
            anime_info::Error::Proxy(inner) => inner.message().clone(),
            other => other.to_string(),
        };
        Self {
            status,
            body: ErrorBody {
                error: err.label(),
                endpoint: err.endpoint().map(str::to_owned),
                message,
            },
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        if self.status.code >= 500 {
            log::warn!("Request {} failed: {:?}", request.uri(), self.body);
        }
        Response::build_from(Json(self.body).respond_to(request)?)
            .status(self.status)
            .ok()
    }
}
