use std::sync::Mutex;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{get, post, put, web, App, HttpResponse, HttpServer, Responder};

use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rs_mimic_core::config::LearningConfig;
use rs_mimic_core::io::{list_datasets, normalize_folder, read_datasets};
use rs_mimic_core::learning::{Learner, Progress};
use rs_mimic_core::model::imitation_input::ImitationInput;
use rs_mimic_core::model::imitator::Imitator;
use rs_mimic_core::random::undeterministic_seed;
use rs_mimic_core::scheduler::FixedBudgetHost;

const DATA_FOLDER: &str = "./data";

/// Largest `count` accepted by `/v1/imitate`.
const MAX_IMITATION_COUNT: usize = 1000;

/// Time a learning tick may hold the worker before yielding back to actix.
const TICK_BUDGET: Duration = Duration::from_millis(4);

/// Struct representing query parameters for the `/v1/imitate` endpoint
#[derive(Deserialize)]
struct ImitateParams {
	count: Option<usize>,
	min_len: Option<usize>,
	max_len: Option<usize>,
}

/// Struct representing query parameters for the `/v1/learn` endpoints
#[derive(Deserialize)]
struct LearnQuery {
	names: Option<String>,
	seed: Option<u32>,
}

struct SharedData {
	/// Only set once a learning run has completed successfully.
	imitator: Option<Imitator>,
	progress: Progress,
	/// Identifies the latest learning run; older runs stop publishing.
	run: u64,
}

impl ImitateParams {
	/// Builds the generation input, falling back to defaults for missing values.
	fn imitation_input(&self) -> Result<ImitationInput, String> {
		let mut input = ImitationInput::default();
		if let Some(count) = self.count {
			if count > MAX_IMITATION_COUNT {
				return Err(format!("count must be at most {MAX_IMITATION_COUNT}"));
			}
			input.imitation_count = count;
		}
		let min = self.min_len.unwrap_or(input.word_length_min());
		let max = self.max_len.unwrap_or(input.word_length_max());
		input.set_word_lengths(min, max).map_err(|e| e.to_string())?;
		Ok(input)
	}
}

/// Starts a background learning run over `text`.
///
/// The current imitator is withdrawn right away and replaced only if the run
/// succeeds. The run executes on the worker's event loop, yielding between ticks.
fn start_learning(data: web::Data<Mutex<SharedData>>, text: String, seed: u32) -> Result<u64, String> {
	let run = {
		let mut shared_data = data.lock().map_err(|_| "Model lock failed".to_owned())?;
		shared_data.run += 1;
		shared_data.imitator = None;
		shared_data.progress = Progress { percent_complete: 0.0, label: "Queued".to_owned(), is_completed: false };
		shared_data.run
	};

	actix_web::rt::spawn(async move {
		let mut host = FixedBudgetHost::new(TICK_BUDGET, Duration::ZERO);
		let publish_to = data.clone();

		let result = Learner::new(LearningConfig::default())
			.learn_async(
				&text,
				&mut host,
				|progress| {
					if let Ok(mut shared_data) = publish_to.lock() {
						if shared_data.run == run {
							shared_data.progress = progress.clone();
						}
					}
				},
				actix_web::rt::task::yield_now,
			)
			.await;

		let Ok(mut shared_data) = data.lock() else {
			warn!(run, "model lock failed, dropping learning result");
			return;
		};
		if shared_data.run != run {
			return;
		}
		match result {
			Ok(learned) => {
				info!(run, lines = learned.lines, matches = learned.matches, "chain learned");
				shared_data.imitator = Some(Imitator::new(learned.chain, seed));
			}
			Err(e) => {
				warn!(run, error = %e, "learning failed");
				shared_data.progress = Progress::completed(format!("Learning failed: {e}"));
			}
		}
	});

	Ok(run)
}

/// HTTP GET endpoint `/v1/imitate`
///
/// Generates `count` words from the current imitator, one per line.
/// Answers 409 while no successfully learned chain is available.
#[get("/v1/imitate")]
async fn get_imitations(data: web::Data<Mutex<SharedData>>, query: web::Query<ImitateParams>) -> impl Responder {
	let input = match query.imitation_input() {
		Ok(input) => input,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let Some(imitator) = shared_data.imitator.as_mut() else {
		return HttpResponse::Conflict().body("No learned chain available, see /v1/progress");
	};

	match imitator.imitate_many(input.imitation_count, input.word_length_min(), input.word_length_max()) {
		Ok(words) => HttpResponse::Ok().body(words.join("\n")),
		Err(e) => HttpResponse::BadRequest().body(e.to_string()),
	}
}

#[get("/v1/progress")]
async fn get_progress(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	match data.lock() {
		Ok(shared_data) => HttpResponse::Ok().json(&shared_data.progress),
		Err(_) => HttpResponse::InternalServerError().body("Model lock failed"),
	}
}

#[get("/v1/chain")]
async fn get_chain(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match &shared_data.imitator {
		Some(imitator) => HttpResponse::Ok().json(imitator.chain()),
		None => HttpResponse::Conflict().body("No learned chain available, see /v1/progress"),
	}
}

#[get("/v1/datasets")]
async fn get_datasets() -> impl Responder {
	match list_datasets(normalize_folder(DATA_FOLDER)) {
		Ok(names) => HttpResponse::Ok().body(names.join("\n")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list datasets"),
	}
}

/// HTTP PUT endpoint `/v1/learn?names=a,b`
///
/// Learns from the named datasets of the data folder.
#[put("/v1/learn")]
async fn put_learn(data: web::Data<Mutex<SharedData>>, query: web::Query<LearnQuery>) -> impl Responder {
	let query_names = match &query.names {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty dataset name"),
	};

	let names: Vec<&str> = query_names
		.split(',')
		.map(|s| s.trim())
		.filter(|s| !s.is_empty())
		.collect();

	let text = match read_datasets(normalize_folder(DATA_FOLDER), &names) {
		Ok(text) => text,
		Err(e) => return HttpResponse::BadRequest().body(format!("Failed to read datasets: {e}")),
	};

	let seed = query.seed.unwrap_or_else(undeterministic_seed);
	match start_learning(data, text, seed) {
		Ok(run) => HttpResponse::Accepted().body(format!("Learning run {run} started")),
		Err(e) => HttpResponse::InternalServerError().body(e),
	}
}

/// HTTP POST endpoint `/v1/learn`
///
/// Learns from the request body, one example per line.
#[post("/v1/learn")]
async fn post_learn(data: web::Data<Mutex<SharedData>>, query: web::Query<LearnQuery>, body: String) -> impl Responder {
	let seed = query.seed.unwrap_or_else(undeterministic_seed);
	match start_learning(data, body, seed) {
		Ok(run) => HttpResponse::Accepted().body(format!("Learning run {run} started")),
		Err(e) => HttpResponse::InternalServerError().body(e),
	}
}

/// Main entry point for the server.
///
/// Holds the current imitator and learning progress behind a `Mutex`,
/// and starts an Actix-web HTTP server.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - Datasets are `.txt` files read from `./data`.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let shared_data = SharedData {
		imitator: None,
		progress: Progress { percent_complete: 0.0, label: "Nothing learned yet".to_owned(), is_completed: false },
		run: 0,
	};
	let shared_data = web::Data::new(Mutex::new(shared_data));

	info!("listening on 127.0.0.1:5000");
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.service(get_imitations)
			.service(get_progress)
			.service(get_chain)
			.service(get_datasets)
			.service(put_learn)
			.service(post_learn)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn imitate_params_fall_back_to_defaults() {
		let params = ImitateParams { count: None, min_len: None, max_len: Some(8) };
		let input = params.imitation_input().unwrap();
		assert_eq!(input.imitation_count, 10);
		assert_eq!((input.word_length_min(), input.word_length_max()), (4, 8));
	}

	#[test]
	fn imitate_params_cap_count() {
		let at_cap = ImitateParams { count: Some(MAX_IMITATION_COUNT), min_len: None, max_len: None };
		assert_eq!(at_cap.imitation_input().unwrap().imitation_count, MAX_IMITATION_COUNT);

		let huge = ImitateParams { count: Some(usize::MAX), min_len: None, max_len: None };
		assert!(huge.imitation_input().is_err());
	}

	#[test]
	fn imitate_params_reject_inverted_bounds() {
		let params = ImitateParams { count: Some(3), min_len: Some(9), max_len: Some(2) };
		assert!(params.imitation_input().is_err());
	}
}
