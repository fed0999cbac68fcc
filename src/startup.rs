use std::net::TcpListener;

use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};

use crate::{
    configuration::Settings,
    routes::{default_route, process_route},
    services::UrlProcessor,
};

pub fn run(
    listener: TcpListener,
    settings: Settings,
    url_processor: UrlProcessor,
) -> Result<Server, std::io::Error> {
    let settings = web::Data::new(settings);
    let url_processor = web::Data::new(url_processor);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::JsonConfig::default().error_handler(process_route::json_error_handler))
            .service(default_route::ping)
            .service(process_route::process_url)
            .service(web::scope("/api").service(process_route::process_url))
            .app_data(settings.clone())
            .app_data(url_processor.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
