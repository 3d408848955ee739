pub mod game_handler;

use actix_web::web;

pub use game_handler::{check_answer, create_game, end_game, get_game, health_check};

/// Registers every route of the service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(create_game)
        .service(get_game)
        .service(check_answer)
        .service(end_game);
}
