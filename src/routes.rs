use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};
use rocket::fairing::AdHoc;
use rocket::http::Status;
use rocket::request::{self, FromRequest, Outcome, Request};
use rocket::response::{self, status, Responder};
use rocket::serde::json::Json;
use rocket::{catch, catchers, get, routes, State};
use serde_json::{json, Value};

use crate::catalog::{AppType, CatalogSnapshot};
use crate::error::SynthError;
use crate::session::{AuthError, Session};
use crate::store::{AccessKeyStore, CatalogProvider, Generation, GenerationLog};
use crate::synth::{GeneratedUserAgent, Synthesizer};

pub static ACCESS_KEY_HEADER: &str = "X-Access-Key";
const DEFAULT_HISTORY_LIMIT: usize = 50;
const PLATFORM: &str = "ios";

/// Everything the routes need, managed by rocket.
pub struct AppState {
    pub catalog: Arc<dyn CatalogProvider>,
    pub history: Arc<dyn GenerationLog>,
    pub keys: Arc<dyn AccessKeyStore>,
    pub synthesizer: Synthesizer,
}

impl AppState {
    /// One backend serving all three roles, as the hosted database does.
    pub fn new<S>(store: Arc<S>, synthesizer: Synthesizer) -> Self
    where
        S: CatalogProvider + GenerationLog + AccessKeyStore + 'static,
    {
        Self {
            catalog: store.clone(),
            history: store.clone(),
            keys: store,
            synthesizer,
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Synth(SynthError),
    Backend(anyhow::Error),
}

impl From<SynthError> for ApiError {
    fn from(err: SynthError) -> Self {
        ApiError::Synth(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Backend(err)
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let (code, message) = match self {
            ApiError::BadRequest(msg) => (Status::BadRequest, msg),
            ApiError::Synth(err) => (Status::UnprocessableEntity, err.to_string()),
            ApiError::Backend(err) => {
                warn!("Backend failure: {err:#}");
                (Status::BadGateway, err.to_string())
            }
        };

        status::Custom(code, Json(json!({ "error": message }))).respond_to(req)
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Session {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let Some(state) = req.rocket().state::<AppState>() else {
            let err = AuthError::Backend("application state not mounted".into());
            return Outcome::Error((Status::InternalServerError, err));
        };
        let Some(key) = req.headers().get_one(ACCESS_KEY_HEADER) else {
            req.local_cache(|| Some(AuthError::MissingKey));
            return Outcome::Error((Status::Unauthorized, AuthError::MissingKey));
        };

        let err = match Session::authenticate(state.keys.as_ref(), key, Utc::now()).await {
            Ok(session) => return Outcome::Success(session),
            Err(err) => err,
        };
        let status = match err {
            AuthError::Backend(_) => Status::BadGateway,
            _ => {
                info!("Rejected access key: {err}");
                Status::Unauthorized
            }
        };
        req.local_cache(|| Some(err.clone()));

        Outcome::Error((status, err))
    }
}

#[get("/ios?<app>&<count>&<seed>")]
async fn generate_ios(
    session: Session,
    app: Option<&str>,
    count: Option<usize>,
    seed: Option<u64>,
    state: &State<AppState>,
) -> Result<Json<Vec<GeneratedUserAgent>>, ApiError> {
    let app_type: AppType = app
        .unwrap_or("instagram")
        .parse()
        .map_err(ApiError::BadRequest)?;
    let max_batch = state.synthesizer.config().max_batch;
    let count = count.unwrap_or(1);
    if count == 0 || count > max_batch {
        return Err(ApiError::BadRequest(format!(
            "count must be between 1 and {max_batch}"
        )));
    }

    let locale_key = &state.synthesizer.config().locale_key;
    let snapshot = CatalogSnapshot::fetch(state.catalog.as_ref(), app_type, locale_key).await?;
    let generated = state.synthesizer.generate_batch(&snapshot, count, seed)?;
    info!(
        "{} generated {} {app_type} user agent(s)",
        session.user_name,
        generated.len()
    );

    for ua in &generated {
        let generation = Generation {
            access_key: session.access_key.clone(),
            user_name: session.user_name.clone(),
            generated_data: json!(ua),
            platform: PLATFORM.into(),
            created_at: Utc::now(),
        };
        if let Err(err) = state.history.record(generation).await {
            warn!("Failed to record generation for {}: {err:#}", session.user_name);
        }
    }

    Ok(Json(generated))
}

#[get("/history?<limit>")]
async fn history(
    session: Session,
    limit: Option<usize>,
    state: &State<AppState>,
) -> Result<Json<Vec<Generation>>, ApiError> {
    let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let rows = state.history.history(&session.access_key, limit).await?;

    Ok(Json(rows))
}

/// Keeps error bodies in the same `{"error": ...}` shape as handler errors.
#[catch(default)]
fn api_error(status: Status, req: &Request<'_>) -> Json<Value> {
    let message = match req.local_cache(|| None::<AuthError>) {
        Some(err) => err.to_string(),
        None => status.reason_lossy().to_string(),
    };

    Json(json!({ "error": message }))
}

pub fn stage(state: AppState) -> AdHoc {
    AdHoc::on_ignite("UA Generator", move |rocket| async move {
        rocket
            .mount("/ua", routes![generate_ios, history])
            .register("/ua", catchers![api_error])
            .manage(state)
    })
}
