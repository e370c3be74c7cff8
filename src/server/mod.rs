pub mod builder;
pub mod handler;
pub mod listener;
pub mod routes;

pub use builder::ServerBuilder;
pub use handler::RequestHandler;

use tower::ServiceBuilder;
use tower_http::cors::{Any, Cors, CorsLayer};

/// Any origin, any method, any header.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// The full HTTP stack: CORS in front of the request handler.
pub fn app(handler: RequestHandler) -> Cors<RequestHandler> {
    ServiceBuilder::new().layer(cors_layer()).service(handler)
}
