use std::net::TcpListener;

use actix_web::{
    dev::Server,
    http::header::{CacheControl, CacheDirective},
    middleware::DefaultHeaders,
    web, App, HttpServer,
};
use tracing_actix_web::TracingLogger;

use crate::{email_client::EmailClient, routes};

pub fn run(
    listener: TcpListener,
    email_client: web::Data<EmailClient>,
) -> Result<Server, std::io::Error> {
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(email_client.clone())
            .route("/", web::get().to(routes::contact_form))
            .route("/health_check", web::get().to(routes::health_check))
            .service(
                web::scope("/assets")
                    .route("/contact.js", web::get().to(routes::contact_script))
                    .route("/contact.css", web::get().to(routes::contact_stylesheet)),
            )
            .service(
                // 每次请求都会发送邮件，禁止缓存
                web::scope("/api")
                    .wrap(DefaultHeaders::new().add(CacheControl(vec![CacheDirective::NoStore])))
                    .app_data(web::JsonConfig::default().error_handler(routes::json_error_handler))
                    .route("/contact", web::post().to(routes::contact)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
