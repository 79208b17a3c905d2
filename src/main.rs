use anyhow::Result;
use cinerec::catalog::{match_file, Catalog};
use cinerec::recommender::matching::DEFAULT_CUTOFF;
use cinerec::recommender::{RecommendError, Recommender, DEFAULT_TOP_K};
use dotenv::dotenv;
use env_logger::Builder;
use lazy_static::lazy_static;
use log::LevelFilter;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

#[macro_use]
extern crate log;

lazy_static! {
    static ref CATALOG_PATH: String =
        std::env::var("CATALOG_PATH").unwrap_or_else(|_| "./movies.csv".to_string());
    static ref PORT: u16 = env_or("PORT", 8080);
    static ref TOP_K: usize = env_or("TOP_K", DEFAULT_TOP_K);
    static ref MATCH_CUTOFF: f64 = env_or("MATCH_CUTOFF", DEFAULT_CUTOFF);
}

// number of "did you mean" titles sent alongside a result
const ALTERNATIVES: usize = 3;

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(value) => value.parse::<T>().unwrap_or_else(|_| {
            warn!("invalid {}: {}, use default", key, value);
            default
        }),
        Err(_) => default,
    }
}

#[derive(Deserialize, Serialize, Debug)]
struct RecommendRequest {
    title: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    k: Option<usize>,
}

// a cleared form field arrives as `k=`
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(k) if !k.trim().is_empty() => k
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

#[derive(Serialize)]
struct RankedItem {
    rank: usize,
    title: String,
    score: f64,
}

#[derive(Serialize)]
struct RecommendResponse {
    query: String,
    matched: String,
    alternatives: Vec<String>,
    recommendations: Vec<RankedItem>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    query: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // read .env
    dotenv().ok();

    // init logger
    let log_level = std::env::var("RUST_LOG").unwrap_or_default();

    if log_level == "debug" {
        Builder::new()
            .filter(None, LevelFilter::Off)
            .filter(Some("cinerec::recommender"), LevelFilter::Debug)
            .filter(Some("cinerec"), LevelFilter::Debug)
            .init();
    } else if log_level == "info" {
        Builder::new()
            .filter(None, LevelFilter::Off)
            .filter(Some("cinerec::recommender"), LevelFilter::Info)
            .filter(Some("cinerec"), LevelFilter::Info)
            .init();
    } else {
        env_logger::init();
    }

    // load and index once, before serving
    let file = match_file(PathBuf::from(&*CATALOG_PATH));
    info!("load catalog: {}", file);
    let catalog: Result<Catalog> = file.into();
    let catalog = catalog?;
    info!("catalog {} loaded, len: {}", catalog.name, catalog.len());

    let recommender = Arc::new(Recommender::build(catalog)?.with_cutoff(*MATCH_CUTOFF));
    info!(
        "index built, top_k: {}, match cutoff: {}",
        *TOP_K,
        recommender.cutoff()
    );

    info!("server running at port: {}", *PORT);
    warp::serve(routes(recommender))
        .run(([0, 0, 0, 0], *PORT))
        .await;

    Ok(())
}

fn routes(
    recommender: Arc<Recommender>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let recommender_for_titles = Arc::clone(&recommender);
    let recommender_for_catalog = Arc::clone(&recommender);

    let index_route = warp::path::end().and(warp::get()).and_then(index);

    let titles_route = warp::path("titles")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::any().map(move || Arc::clone(&recommender_for_titles)))
        .and_then(handle_titles);

    let catalog_route = warp::path("catalog")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::any().map(move || Arc::clone(&recommender_for_catalog)))
        .and_then(handle_catalog);

    let recommend_route = warp::path("recommend")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<RecommendRequest>())
        .and(warp::any().map(move || Arc::clone(&recommender)))
        .and_then(handle_recommend);

    index_route
        .or(titles_route)
        .or(catalog_route)
        .or(recommend_route)
}

async fn index() -> Result<impl Reply, Rejection> {
    let index_html = include_str!("../index.html");
    Ok(warp::reply::html(index_html))
}

async fn handle_titles(recommender: Arc<Recommender>) -> Result<impl Reply, Rejection> {
    let titles = recommender.titles();
    info!("get titles request return: {} titles", titles.len());
    Ok(warp::reply::json(&titles))
}

async fn handle_catalog(recommender: Arc<Recommender>) -> Result<impl Reply, Rejection> {
    let catalog = recommender.catalog();
    info!(
        "get catalog request return: {} entries of {}",
        catalog.len(),
        catalog.name
    );
    Ok(warp::reply::json(&catalog.entries))
}

async fn handle_recommend(
    request: RecommendRequest,
    recommender: Arc<Recommender>,
) -> Result<impl Reply, Rejection> {
    info!("get recommend request: {:?}", request);
    let k = request.k.unwrap_or(*TOP_K);

    match recommender.recommend(&request.title, k) {
        Ok(recommendation) => {
            let alternatives = recommender
                .suggestions(&request.title, ALTERNATIVES + 1)
                .into_iter()
                .filter(|t| *t != recommendation.matched)
                .take(ALTERNATIVES)
                .collect();
            let recommendations = recommendation
                .items
                .into_iter()
                .enumerate()
                .map(|(i, r)| RankedItem {
                    rank: i + 1,
                    title: r.title,
                    score: r.score,
                })
                .collect();
            let response = RecommendResponse {
                query: recommendation.query,
                matched: recommendation.matched,
                alternatives,
                recommendations,
            };
            Ok(warp::reply::with_status(
                warp::reply::json(&response),
                StatusCode::OK,
            ))
        }
        Err(e) => {
            warn!("handle recommend request failed: {}", e);
            let status = match e {
                RecommendError::NotFound { .. } => StatusCode::NOT_FOUND,
                RecommendError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let response = ErrorResponse {
                error: e.to_string(),
                query: request.title,
            };
            Ok(warp::reply::with_status(
                warp::reply::json(&response),
                status,
            ))
        }
    }
}
