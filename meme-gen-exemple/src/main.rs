use meme_gen_core::caption::captioner::generate_caption;
use meme_gen_core::caption::model::CaptionModel;
use meme_gen_core::compose::compose;
use meme_gen_core::template::registry::TemplateRegistry;
use meme_gen_core::template::selector::{Mode, select};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Build the caption model from the corpus (one caption per line).
    // A postcard .bin cache is written next to it and reused on the next run.
    let model = CaptionModel::new("./data/captions.txt")?;

    // Load the static template catalog: two disjoint collections,
    // meme and poster. Duplicate paths are rejected at load time.
    let registry = TemplateRegistry::from_file("./templates/catalog.toml")?;

    let topic = "funny cats";

    // The caption generator builds the fixed prompt, invokes the model
    // once and strips the echoed prompt from the result.
    let caption = generate_caption(&model, topic)?;
    println!("Topic:   {topic}");
    println!("Caption: {caption}");

    // Mode can be set to
    // 'Auto' for keyword-driven selection (event keywords beat humor keywords)
    // 'Random' for a uniform draw from the full union
    // 'ManualMeme' / 'ManualPoster' to pin one collection
    let template = select(&registry, topic, Mode::Auto, &mut rand::rng())?;
    println!("Template: {}", template.display());

    // Overlay the caption: wrapped to 30 columns, centered, white,
    // anchored 80 px above the bottom edge.
    let image = compose(template, &caption)?;
    image.save("output_generated.png")?;
    println!("Saved output_generated.png");

    Ok(())
}
