use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Instant;

use voice_cloner::batch::{self, BatchOptions, BatchReport};
use voice_cloner::cloner::{VoiceCloner, VoiceClonerConfig};
use voice_cloner::engines::xtts::Language;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let (csv_path, json_path) = batch::create_sample_data(Path::new("."))?;
    println!(
        "Sample data: {} and {}",
        csv_path.display(),
        json_path.display()
    );

    let mut cloner = VoiceCloner::new(VoiceClonerConfig::default());
    let load_start = Instant::now();
    if let Err(err) = cloner.initialize() {
        eprintln!("Engine initialization failed: {err}");
        std::process::exit(1);
    }
    println!(
        "Engine ready in {:.2?}: {} ({})",
        load_start.elapsed(),
        cloner.engine_name().unwrap_or("none"),
        cloner
            .model_description()
            .unwrap_or_else(|| "no model".to_string()),
    );

    println!("\nSimple synthesis");
    let simple_text =
        "Привіт! Це приклад простої генерації мовлення з використанням штучного інтелекту.";
    match cloner.simple_text_to_speech(simple_text, Path::new("simple_example.wav")) {
        Ok(()) => println!("  simple_example.wav"),
        Err(err) => println!("  simple_example.wav failed: {err}"),
    }

    println!("\nBatch from CSV");
    let csv_options = BatchOptions {
        output_dir: PathBuf::from("csv_output"),
        ..Default::default()
    };
    print_report(&cloner.process_csv_file(&csv_path, &csv_options)?);

    println!("\nBatch from JSON");
    let json_options = BatchOptions {
        output_dir: PathBuf::from("json_output"),
        ..Default::default()
    };
    print_report(&cloner.process_json_file(&json_path, &json_options)?);

    println!("\nVoice cloning");
    // The reference voice needs 6-15 seconds of speech, so the sample text is
    // long enough to cross the lower bound at normal speaking rate.
    let sample_text = "Hello, this is a voice sample for cloning demonstration. \
                       My name is Test Speaker, and I am recording a short passage \
                       so the model has enough audio to capture how I sound.";
    let speaker_sample = Path::new("speaker_sample.wav");
    match cloner.simple_text_to_speech(sample_text, speaker_sample) {
        Ok(()) if cloner.cloning_available() => {
            let clones: [(&str, &str, Language, f32); 4] = [
                (
                    "This is cloned voice speaking English with the same characteristics.",
                    "cloned_voice_en.wav",
                    Language::En,
                    1.0,
                ),
                (
                    "This is the same voice but speaking faster than normal.",
                    "cloned_voice_fast.wav",
                    Language::En,
                    1.3,
                ),
                (
                    "This is the same voice speaking slowly and clearly.",
                    "cloned_voice_slow.wav",
                    Language::En,
                    0.8,
                ),
                (
                    // English sample, Russian output: cross-lingual cloning.
                    "Это тот же голос, но говорящий по-русски.",
                    "cloned_voice_ru.wav",
                    Language::Ru,
                    1.0,
                ),
            ];
            for (text, file, language, speed) in clones {
                let clone_start = Instant::now();
                match cloner.clone_voice_from_sample(
                    text,
                    speaker_sample,
                    Path::new(file),
                    language,
                    speed,
                ) {
                    Ok(()) => println!(
                        "  {file} [{language}, {speed}x] in {:.2?}",
                        clone_start.elapsed()
                    ),
                    Err(err) => println!("  {file} failed: {err}"),
                }
            }
        }
        Ok(()) => println!(
            "  Cloning unavailable on the {} engine; skipping",
            cloner.engine_name().unwrap_or("current")
        ),
        Err(err) => println!("  Could not record a speaker sample: {err}"),
    }

    println!("\nGenerated files:");
    for path in [
        "sample_texts.csv",
        "sample_texts.json",
        "simple_example.wav",
        "csv_output",
        "json_output",
        "speaker_sample.wav",
        "cloned_voice_en.wav",
        "cloned_voice_fast.wav",
        "cloned_voice_slow.wav",
        "cloned_voice_ru.wav",
    ] {
        if Path::new(path).exists() {
            println!("  {path}");
        }
    }

    Ok(())
}

fn print_report(report: &BatchReport) {
    println!(
        "  {} rendered, {} failed",
        report.succeeded.len(),
        report.failed.len()
    );
    for failure in &report.failed {
        println!(
            "  row {}: {} ({})",
            failure.index, failure.text, failure.error
        );
    }
}
