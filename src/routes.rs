mod contact;
mod contact_form;

pub use contact::*;
pub use contact_form::*;

use actix_web::{HttpResponse, Responder};

pub async fn health_check() -> impl Responder {
    HttpResponse::Ok()
}
