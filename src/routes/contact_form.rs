use actix_web::{http::header::ContentType, HttpResponse, Responder};

use crate::domain::ContactTopic;

pub async fn contact_form() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(format!(
            include_str!("contact_form/contact.html"),
            topic_options = topic_options()
        ))
}

pub async fn contact_script() -> impl Responder {
    HttpResponse::Ok()
        .content_type("application/javascript; charset=utf-8")
        .body(include_str!("contact_form/contact.js"))
}

pub async fn contact_stylesheet() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/css; charset=utf-8")
        .body(include_str!("contact_form/contact.css"))
}

fn topic_options() -> String {
    // 选项来自常量，无需转义
    ContactTopic::SUGGESTIONS
        .iter()
        .map(|topic| format!("<option>{topic}</option>\n"))
        .collect()
}
