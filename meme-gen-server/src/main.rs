use std::io::Cursor;
use std::path::PathBuf;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware, web};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use serde::Deserialize;

use meme_gen_core::caption::captioner::generate_caption;
use meme_gen_core::caption::model::CaptionModel;
use meme_gen_core::compose::compose;
use meme_gen_core::error::Error;
use meme_gen_core::template::registry::{TemplateClass, TemplateRegistry};
use meme_gen_core::template::selector::{Mode, select};

/// Caption corpus the model is built from at startup.
const CORPUS_PATH: &str = "./data/captions.txt";

/// Template catalog loaded at startup.
const CATALOG_PATH: &str = "./templates/catalog.toml";

/// Well-known output path, overwritten on every successful generation.
///
/// Single-user constraint: two concurrent requests would race on this
/// file. Accepted for local single-user use; a multi-user deployment
/// would need per-request output paths.
const OUTPUT_PATH: &str = "output_generated.png";

/// Suggested filename for the download.
const DOWNLOAD_FILE_NAME: &str = "AI_Generated_Image.png";

const IMAGE_MIME: &str = "image/png";

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	topic: String,
	mode: Option<Mode>,
}

/// Read-only state shared across request handlers.
///
/// Constructed once at startup; the caption model and the registry are
/// never mutated afterwards, so no locking is needed.
struct SharedData {
	model: CaptionModel,
	registry: TemplateRegistry,
	output_path: PathBuf,
}

const FORM_HTML: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>AI Meme &amp; Poster Creator</title></head>
<body>
<h1>🎨 AI Meme &amp; Poster Creator</h1>
<p>Smart AI-based meme and poster generator</p>
<form action="/v1/generate" method="get">
	<label>Enter Topic: <input type="text" name="topic"></label>
	<label>Select Generation Mode:
		<select name="mode">
			<option value="auto">Auto (Smart Selection)</option>
			<option value="random">Random</option>
			<option value="meme">Manual - Meme Only</option>
			<option value="poster">Manual - Poster Only</option>
		</select>
	</label>
	<button type="submit">Generate</button>
</form>
</body>
</html>
"#;

/// HTTP GET endpoint `/`
///
/// Serves the topic/mode form.
#[get("/")]
async fn index() -> impl Responder {
	HttpResponse::Ok()
		.content_type("text/html; charset=utf-8")
		.body(FORM_HTML)
}

/// HTTP GET endpoint `/v1/generate`
///
/// Runs the full pipeline synchronously: caption → template selection →
/// compositing → output file. Responds with a result page showing the
/// caption and the composed image inline, plus a download link.
///
/// An empty topic is rejected before any other component runs: no
/// caption is generated and no file is written. Every pipeline failure
/// is terminal for the request and surfaced in the response body.
#[get("/v1/generate")]
async fn get_generated(
	data: web::Data<SharedData>,
	query: web::Query<GenerateParams>,
) -> impl Responder {
	let topic = query.topic.trim();
	if topic.is_empty() {
		return HttpResponse::BadRequest().body(Error::EmptyTopic.to_string());
	}
	let mode = query.mode.unwrap_or(Mode::Auto);

	let caption = match generate_caption(&data.model, topic) {
		Ok(caption) => caption,
		Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
	};

	let template = match select(&data.registry, topic, mode, &mut rand::rng()) {
		Ok(path) => path,
		Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
	};

	let image = match compose(template, &caption) {
		Ok(image) => image,
		Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
	};

	let mut png: Vec<u8> = Vec::new();
	if let Err(e) = image.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png) {
		return HttpResponse::InternalServerError().body(format!("Failed to encode image: {e}"));
	}

	if let Err(e) = std::fs::write(&data.output_path, &png) {
		return HttpResponse::InternalServerError().body(format!("Failed to write output: {e}"));
	}

	let page = format!(
		r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>AI Meme &amp; Poster Creator</title></head>
<body>
<h1>Caption Generated!</h1>
<p>👉 {caption}</p>
<img src="data:{IMAGE_MIME};base64,{data}" alt="generated image">
<p><a href="/v1/download" download>Download Image</a> — <a href="/">Generate another</a></p>
</body>
</html>
"#,
		data = BASE64_ENGINE.encode(&png),
	);

	HttpResponse::Ok()
		.content_type("text/html; charset=utf-8")
		.body(page)
}

/// HTTP GET endpoint `/v1/download`
///
/// Streams the last generated image as an attachment with a fixed
/// suggested filename.
#[get("/v1/download")]
async fn get_download(data: web::Data<SharedData>) -> impl Responder {
	match std::fs::read(&data.output_path) {
		Ok(bytes) => HttpResponse::Ok()
			.content_type(IMAGE_MIME)
			.insert_header((
				"Content-Disposition",
				format!("attachment; filename=\"{DOWNLOAD_FILE_NAME}\""),
			))
			.body(bytes),
		Err(_) => HttpResponse::NotFound().body("No image has been generated yet."),
	}
}

/// HTTP GET endpoint `/v1/templates`
///
/// Lists the configured catalog, one `class: path` line per template.
#[get("/v1/templates")]
async fn get_templates(data: web::Data<SharedData>) -> impl Responder {
	let mut listing = String::new();
	for path in data.registry.collection(TemplateClass::Meme) {
		listing.push_str(&format!("meme: {}\n", path.display()));
	}
	for path in data.registry.collection(TemplateClass::Poster) {
		listing.push_str(&format!("poster: {}\n", path.display()));
	}
	HttpResponse::Ok().body(listing)
}

/// Main entry point for the server.
///
/// Loads the caption model and the template catalog once, wraps them in
/// read-only shared state, and starts an Actix-web HTTP server.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - Model, catalog and output paths are fixed; startup fails fast if
///   the corpus or the catalog cannot be loaded.
#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::init();

	log::info!("loading caption model from {CORPUS_PATH}");
	let model = CaptionModel::new(CORPUS_PATH)?;

	log::info!("loading template catalog from {CATALOG_PATH}");
	let registry = TemplateRegistry::from_file(CATALOG_PATH)?;

	let shared_data = web::Data::new(SharedData {
		model,
		registry,
		output_path: PathBuf::from(OUTPUT_PATH),
	});

	log::info!("listening on 127.0.0.1:5000");
	HttpServer::new(move || {
		App::new()
			.app_data(shared_data.clone())
			.wrap(middleware::Logger::default())
			.wrap(Cors::permissive())
			.service(index)
			.service(get_generated)
			.service(get_download)
			.service(get_templates)
	})
	.bind(("127.0.0.1", 5000))?
	.run()
	.await?;

	Ok(())
}
