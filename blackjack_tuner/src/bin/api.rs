use actix_web::{
    body::BoxBody,
    error,
    http::{header::ContentType, StatusCode},
    post, web, App, HttpResponse, HttpServer,
};
use blackjack_tuner::prelude::*;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

const MAX_GENERATIONS: usize = 1000;
const MAX_POPULATION: usize = 500;
const MAX_HAND_LIMIT: u64 = 1_000_000;
/// Rounds played by `/simulate` when the request names no hand limit.
const DEFAULT_HAND_LIMIT: u64 = 10_000;
/// A missing cash limit is this many times the starting bankroll.
const DEFAULT_CASH_MULTIPLE: i64 = 100;

fn check_hand_limit(hands: u64) -> Result<u64, UserError> {
    if hands > MAX_HAND_LIMIT {
        return Err(UserError::BadInput(format!(
            "a hand limit of at most {} may be requested",
            MAX_HAND_LIMIT
        )));
    }
    Ok(hands)
}

/// A struct for the parameters of a single game. Meant to be deserialized from JSON, every field is optional.
#[derive(Debug, Deserialize)]
struct SimulateParams {
    seed: Option<u64>,
    num_decks: Option<u32>,
    counting_scheme: Option<String>,
    hit_soft_seventeen: Option<bool>,
    bankroll: Option<i64>,
    base_wager: Option<u32>,
    count_scalar: Option<f32>,
    count_cap: Option<f32>,
    hand_limit: Option<u64>,
    cash_limit: Option<i64>,
}

impl TryFrom<SimulateParams> for SessionConfig {
    type Error = UserError;

    fn try_from(value: SimulateParams) -> Result<Self, Self::Error> {
        let mut table = TableConfig::new();
        if let Some(decks) = value.num_decks {
            table.num_decks(decks);
        }
        if let Some(name) = value.counting_scheme {
            let scheme = name
                .parse::<CountingScheme>()
                .map_err(|e| UserError::BadInput(e.to_string()))?;
            table.counting_scheme(scheme);
        }
        if let Some(hit) = value.hit_soft_seventeen {
            table.hit_soft_seventeen(hit);
        }

        let mut session = SessionConfig::new();
        session.table(table.build());
        if let Some(bankroll) = value.bankroll {
            session.bankroll(bankroll);
        }
        if let Some(wager) = value.base_wager {
            session.base_wager(wager);
        }
        if let Some(scalar) = value.count_scalar {
            session.count_scalar(scalar);
        }
        if let Some(cap) = value.count_cap {
            session.count_cap(cap);
        }
        session.hand_limit(check_hand_limit(
            value.hand_limit.unwrap_or(DEFAULT_HAND_LIMIT),
        )?);
        let mut config = session.build();
        config.cash_limit = value
            .cash_limit
            .unwrap_or_else(|| config.bankroll.saturating_mul(DEFAULT_CASH_MULTIPLE));
        Ok(config)
    }
}

/// A struct for the parameters of a genetic search, deserialized from JSON.
#[derive(Debug, Deserialize)]
struct OptimizeParams {
    seed: Option<u64>,
    generations: usize,
    population_size: Option<usize>,
    bankroll: Option<i64>,
    hand_limit: Option<u64>,
    mutation_rate: Option<f64>,
    num_decks: Option<u32>,
    parallel: Option<bool>,
}

impl TryFrom<&OptimizeParams> for OptimizerConfig {
    type Error = UserError;

    fn try_from(value: &OptimizeParams) -> Result<Self, Self::Error> {
        if value.generations > MAX_GENERATIONS {
            return Err(UserError::BadInput(format!(
                "at most {} generations may be requested",
                MAX_GENERATIONS
            )));
        }
        let mut config = OptimizerConfig::new();
        if let Some(size) = value.population_size {
            if size > MAX_POPULATION {
                return Err(UserError::BadInput(format!(
                    "a population of at most {} may be requested",
                    MAX_POPULATION
                )));
            }
            config.population_size(size);
        }
        if let Some(bankroll) = value.bankroll {
            config.bankroll(bankroll);
        }
        if let Some(hands) = value.hand_limit {
            config.hand_limit(check_hand_limit(hands)?);
        }
        if let Some(rate) = value.mutation_rate {
            config.mutation_rate(rate);
        }
        if let Some(decks) = value.num_decks {
            config.table(TableConfig::new().num_decks(decks).build());
        }
        Ok(config.parallel(value.parallel.unwrap_or(false)).build())
    }
}

/// Response body of `/optimize`: the seed used, one summary per generation and the fittest chromosome seen.
#[derive(Serialize)]
struct OptimizeResponse {
    seed: u64,
    summaries: Vec<GenerationSummary>,
    fittest: Chromosome,
}

#[derive(Serialize)]
struct SimulateResponse {
    seed: u64,
    report: GameReport,
}

/// An enum that will handle user facing errors
#[derive(Debug)]
enum UserError {
    InternalError,
    BadInput(String),
}

impl std::fmt::Display for UserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserError::InternalError => write!(f, "an internal error occured"),
            UserError::BadInput(s) => write!(f, "{}", s),
        }
    }
}

impl std::error::Error for UserError {}

impl From<TunerError> for UserError {
    fn from(value: TunerError) -> Self {
        match value {
            TunerError::Config(e) => UserError::BadInput(e.to_string()),
            TunerError::Game(e) => {
                log::error!("simulation failed: {}", e);
                UserError::InternalError
            }
        }
    }
}

impl error::ResponseError for UserError {
    fn error_response(&self) -> HttpResponse<BoxBody> {
        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .body(self.to_string())
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            UserError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            UserError::BadInput(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// A handler that plays one bounded game with the given parameters and returns its report.
#[post("/simulate")]
async fn simulate(params: web::Json<SimulateParams>) -> Result<HttpResponse, UserError> {
    let params = params.into_inner();
    let seed = params.seed.unwrap_or_else(rand::random);
    let config = SessionConfig::try_from(params)?;

    let report = web::block(move || run_session(&config, SimRng::seed_from_u64(seed)))
        .await
        .map_err(|_| UserError::InternalError)??;
    Ok(HttpResponse::Ok().json(SimulateResponse { seed, report }))
}

/// A handler that breeds the requested number of generations and returns every generation's summary.
#[post("/optimize")]
async fn optimize(params: web::Json<OptimizeParams>) -> Result<HttpResponse, UserError> {
    let params = params.into_inner();
    let seed = params.seed.unwrap_or_else(rand::random);
    let config = OptimizerConfig::try_from(&params)?;
    let generations = params.generations;

    let response = web::block(move || -> Result<OptimizeResponse, TunerError> {
        let mut optimizer = Optimizer::seeded(config, seed)?;
        let mut summaries = vec![optimizer.summary()];
        for summary in optimizer.generations().take(generations) {
            summaries.push(summary?);
        }
        Ok(OptimizeResponse {
            seed,
            summaries,
            fittest: optimizer.fittest().clone(),
        })
    })
    .await
    .map_err(|_| UserError::InternalError)??;
    Ok(HttpResponse::Ok().json(response))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let address = "127.0.0.1";
    let port = 8080;
    log::info!("listening at {}:{}", address, port);

    HttpServer::new(|| App::new().service(simulate).service(optimize))
        .bind((address, port))?
        .run()
        .await
}

#[cfg(test)]
mod test {
    use super::*;
    use actix_web::test::{call_service, init_service, read_body, TestRequest};

    fn simulate_params(body: &str) -> SimulateParams {
        serde_json::from_str(body).unwrap()
    }

    fn optimize_params(body: &str) -> OptimizeParams {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_empty_simulate_request_is_bounded() {
        let config = SessionConfig::try_from(simulate_params("{}")).unwrap();
        assert_eq!(config.hand_limit, DEFAULT_HAND_LIMIT);
        assert_eq!(config.cash_limit, config.bankroll * DEFAULT_CASH_MULTIPLE);
    }

    #[test]
    fn test_simulate_limits_are_kept() {
        let config = SessionConfig::try_from(simulate_params(
            r#"{"bankroll": 500, "hand_limit": 25, "cash_limit": 900}"#,
        ))
        .unwrap();
        assert_eq!(config.hand_limit, 25);
        assert_eq!(config.cash_limit, 900);

        let config =
            SessionConfig::try_from(simulate_params(r#"{"bankroll": 500}"#)).unwrap();
        assert_eq!(config.cash_limit, 50_000);
    }

    #[test]
    fn test_simulate_rejects_large_hand_limit() {
        let body = format!(r#"{{"hand_limit": {}}}"#, MAX_HAND_LIMIT + 1);
        let result = SessionConfig::try_from(simulate_params(&body));
        assert!(matches!(result, Err(UserError::BadInput(_))));
    }

    #[test]
    fn test_simulate_rejects_unknown_scheme() {
        let result = SessionConfig::try_from(simulate_params(r#"{"counting_scheme": "Nope"}"#));
        assert!(matches!(result, Err(UserError::BadInput(_))));
    }

    #[test]
    fn test_optimize_rejects_oversized_requests() {
        let too_many_generations = format!(r#"{{"generations": {}}}"#, MAX_GENERATIONS + 1);
        let too_large_population = format!(
            r#"{{"generations": 1, "population_size": {}}}"#,
            MAX_POPULATION + 1
        );
        let too_many_hands = format!(
            r#"{{"generations": 1, "hand_limit": {}}}"#,
            MAX_HAND_LIMIT + 1
        );
        for body in [too_many_generations, too_large_population, too_many_hands] {
            let result = OptimizerConfig::try_from(&optimize_params(&body));
            assert!(matches!(result, Err(UserError::BadInput(_))), "{}", body);
        }

        let config = OptimizerConfig::try_from(&optimize_params(
            r#"{"generations": 3, "population_size": 8, "hand_limit": 200}"#,
        ))
        .unwrap();
        assert_eq!(config.population_size, 8);
        assert_eq!(config.hand_limit, 200);
    }

    #[actix_web::test]
    async fn test_simulate_handler_rejects_large_hand_limit() {
        let app = init_service(App::new().service(simulate)).await;
        let req = TestRequest::post()
            .uri("/simulate")
            .set_json(serde_json::json!({ "hand_limit": MAX_HAND_LIMIT + 1 }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_simulate_handler_plays_bounded_game() {
        let app = init_service(App::new().service(simulate)).await;
        let req = TestRequest::post()
            .uri("/simulate")
            .set_json(serde_json::json!({ "seed": 7, "hand_limit": 20 }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body = read_body(resp).await;
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["seed"], 7);
        assert!(value["report"]["hands_played"].as_u64().unwrap() <= 20);
    }
}
