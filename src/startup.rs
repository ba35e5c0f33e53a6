use std::net::TcpListener;

use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};

use crate::{
    routes::{default_route, webhook_route},
    services::{ExtractionClient, SheetWriter},
};

// Inbound relays post whole emails, attachments included.
const MAX_INBOUND_EMAIL_BYTES: usize = 30 * 1024 * 1024;

pub fn run(
    listener: TcpListener,
    extraction_client: ExtractionClient,
    sheet_writer: SheetWriter,
) -> Result<Server, std::io::Error> {
    let extraction_client = web::Data::new(extraction_client);
    let sheet_writer = web::Data::new(sheet_writer);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(default_route::default)
            .service(webhook_route::handle_email)
            .app_data(web::PayloadConfig::new(MAX_INBOUND_EMAIL_BYTES))
            .app_data(web::FormConfig::default().limit(MAX_INBOUND_EMAIL_BYTES))
            .app_data(extraction_client.clone())
            .app_data(sheet_writer.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
