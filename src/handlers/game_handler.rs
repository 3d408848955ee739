use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::request::{CheckAnswerRequest, CreateGameRequest, EndGameRequest},
};

#[post("/api/game")]
async fn create_game(
    state: web::Data<AppState>,
    request: web::Json<CreateGameRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state.quiz_service.create_game(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

#[get("/api/game/{id}")]
async fn get_game(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let game = state.quiz_service.get_game(&id).await?;
    Ok(HttpResponse::Ok().json(game))
}

#[post("/api/checkAnswer")]
async fn check_answer(
    state: web::Data<AppState>,
    request: web::Json<CheckAnswerRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state.quiz_service.check_answer(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/endGame")]
async fn end_game(
    state: web::Data<AppState>,
    request: web::Json<EndGameRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state.quiz_service.end_game(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/health")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use super::*;
    use crate::config::Config;
    use crate::handlers::configure;
    use crate::repositories::{InMemoryGameRepository, InMemoryQuestionRepository};
    use crate::services::model_service::MockCompletionClient;
    use crate::test_utils::{fixtures::mcq_response, test_helpers::assert_error_status};

    fn state_with(model: MockCompletionClient) -> AppState {
        AppState::from_parts(
            Config::test_config(),
            Arc::new(InMemoryGameRepository::new()),
            Arc::new(InMemoryQuestionRepository::new()),
            Arc::new(model),
        )
    }

    fn answering(raw: String) -> MockCompletionClient {
        let mut model = MockCompletionClient::new();
        model.expect_complete().returning(move |_| Ok(raw.clone()));
        model
    }

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(App::new().service(health_check)).await;

        let req = test::TestRequest::get().uri("/health").to_request();

        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_create_then_fetch_game() {
        let state = state_with(answering(mcq_response(2)));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/game")
            .set_json(json!({ "amount": 2, "quizType": "mcq", "topic": "rust" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let game_id = body["gameId"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri(&format!("/api/game/{}", game_id))
            .to_request();
        let game: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(game["topic"], "rust");
        assert_eq!(game["gameType"], "mcq");
        assert_eq!(game["questions"].as_array().unwrap().len(), 2);
        assert!(game["questions"][0].get("answer").is_none());
    }

    #[actix_web::test]
    async fn test_invalid_amount_is_bad_request() {
        let mut model = MockCompletionClient::new();
        model.expect_complete().times(0);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state_with(model)))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/game")
            .set_json(json!({ "amount": 11, "quizType": "open_ended", "topic": "rust" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[actix_web::test]
    async fn test_generation_failure_is_generic_503() {
        let mut model = MockCompletionClient::new();
        model
            .expect_complete()
            .returning(|_| Err(AppError::ProviderError("invalid api key sk-live-123".to_string())));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state_with(model)))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/game")
            .set_json(json!({ "amount": 3, "quizType": "mcq", "topic": "rust" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = test::read_body_json(resp).await;
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("try again later"));
        assert!(!message.contains("sk-live-123"));
    }

    #[actix_web::test]
    async fn test_check_answer_and_end_game() {
        let state = state_with(answering(mcq_response(1)));
        let service = state.quiz_service.clone();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/game")
            .set_json(json!({ "amount": 1, "quizType": "mcq", "topic": "rust" }))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let game_id = created["gameId"].as_str().unwrap().to_string();
        let question_id = service.get_game(&game_id).await.unwrap().questions[0].id.clone();

        let req = test::TestRequest::post()
            .uri("/api/checkAnswer")
            .set_json(json!({ "questionId": question_id, "userInput": "answer 0" }))
            .to_request();
        let checked: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(checked["isCorrect"], true);
        assert!(checked.get("percentageSimilar").is_none());

        let req = test::TestRequest::post()
            .uri("/api/endGame")
            .set_json(json!({ "gameId": game_id }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_unknown_ids_are_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state_with(MockCompletionClient::new())))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/game/missing").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri("/api/endGame")
            .set_json(json!({ "gameId": "missing" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_error_status(resp.status());
    }
}
