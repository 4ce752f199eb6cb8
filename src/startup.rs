use std::{net::TcpListener, sync::Arc};

use actix_web::{dev::Server, error, middleware::Logger, web, App, HttpServer};

use crate::{
    dal::ResultStore,
    routes::{
        api_key_route, default_route, export_route, protected_route, result_route, scrape_route,
        ApiError,
    },
    services::{ApiKeyAuthority, BatchProcessor, ScrapeExecutor},
};

pub fn run(
    listener: TcpListener,
    executor: ScrapeExecutor,
    batch: BatchProcessor,
    results: Arc<dyn ResultStore>,
    authority: ApiKeyAuthority,
) -> Result<Server, std::io::Error> {
    let executor = web::Data::new(executor);
    let batch = web::Data::new(batch);
    let results: web::Data<dyn ResultStore> = web::Data::from(results);
    let authority = web::Data::new(authority);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                error::Error::from(ApiError::BadRequest(err.to_string()))
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                error::Error::from(ApiError::BadRequest(err.to_string()))
            }))
            .service(
                web::scope("/api")
                    .service(default_route::default)
                    .service(result_route::stats)
                    .service(
                        web::scope("/scrape")
                            .service(scrape_route::scrape)
                            .service(scrape_route::scrape_bulk)
                            .service(scrape_route::upload_csv),
                    )
                    .service(
                        web::scope("/results")
                            .service(result_route::list_results)
                            .service(result_route::get_result),
                    )
                    .service(web::scope("/export").service(export_route::export_results))
                    .service(
                        web::scope("/api-keys")
                            .service(api_key_route::list_api_keys)
                            .service(api_key_route::create_api_key)
                            .service(api_key_route::deactivate_api_key),
                    )
                    .service(
                        web::scope("/protected")
                            .service(protected_route::protected_scrape)
                            .service(protected_route::protected_scrape_bulk),
                    ),
            )
            .app_data(executor.clone())
            .app_data(batch.clone())
            .app_data(results.clone())
            .app_data(authority.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
