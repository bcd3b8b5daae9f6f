use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use facelens_core::report::NO_FACES_WARNING;
use facelens_core::report::NO_MATCH_WARNING;
use facelens_core::{
    ComparisonReport, EmotionReport, FaceAnalyzer, Overlay, DEFAULT_SIMILARITY_THRESHOLD,
};
use facelens_rekognition::{ClientSettings, RekognitionAnalyzer};
use std::fmt::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "facelens", about = "facelens face analysis CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect faces and report age, gender and emotions
    Detect {
        /// Image file (jpg or png)
        image: PathBuf,
        /// Write an annotated copy of the image here (PNG)
        #[arg(short, long)]
        annotate: Option<PathBuf>,
        /// TrueType font for annotation labels
        #[arg(long)]
        font: Option<PathBuf>,
        /// Print the raw service response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compare the largest face in SOURCE with the faces in TARGET
    Compare {
        source: PathBuf,
        target: PathBuf,
        /// Minimum similarity (percent) for a reported match
        #[arg(short, long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
        threshold: f32,
        /// Print the raw service response as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let settings = ClientSettings::from_env()?;
    let analyzer = RekognitionAnalyzer::connect(&settings).await;
    tracing::debug!(region = %settings.region, "rekognition client ready");

    match cli.command {
        Commands::Detect {
            image,
            annotate,
            font,
            json,
        } => {
            let bytes = read_image(&image)?;
            let response = analyzer
                .detect_faces(&bytes)
                .await
                .context("face detection failed")?;

            if json {
                println!("{}", response.raw_json());
                return Ok(());
            }

            let report = EmotionReport::from_response(&response);
            print!("{}", format_emotion_report(&report));

            if let (Some(out), EmotionReport::Faces(_)) = (annotate, &report) {
                let overlay = Overlay::load_or_bitmap(font.as_deref());
                overlay
                    .annotate(&bytes, &response.face_details)?
                    .save(&out)
                    .with_context(|| format!("failed to write {}", out.display()))?;
                println!("Annotated image written to {}", out.display());
            }
        }
        Commands::Compare {
            source,
            target,
            threshold,
            json,
        } => {
            let source_bytes = read_image(&source)?;
            let target_bytes = read_image(&target)?;
            let response = analyzer
                .compare_faces(&source_bytes, &target_bytes, threshold)
                .await
                .context("face comparison failed")?;

            if json {
                println!("{}", response.raw_json());
                return Ok(());
            }

            print!(
                "{}",
                format_comparison_report(&ComparisonReport::from_response(&response))
            );
        }
    }

    Ok(())
}

fn read_image(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn format_emotion_report(report: &EmotionReport) -> String {
    let faces = match report {
        EmotionReport::NoFaces => return format!("{NO_FACES_WARNING}\n"),
        EmotionReport::Faces(faces) => faces,
    };

    let mut out = String::new();
    for face in faces {
        let _ = writeln!(out, "Face {}", face.number);
        let _ = writeln!(out, "  Gender:           {}", face.gender_text());
        let _ = writeln!(out, "  Estimated age:    {}", face.age_text());
        let _ = writeln!(out, "  Dominant emotion: {}", face.top_emotion_text());
        if !face.emotions.is_empty() {
            let _ = writeln!(out, "  Emotions:");
            for e in &face.emotions {
                let _ = writeln!(out, "    {:<10} {:5.1}%", e.kind, e.confidence);
            }
        }
        for row in &face.traits {
            let _ = writeln!(
                out,
                "  {}: {} ({:.1}%)",
                row.label,
                if row.present { "yes" } else { "no" },
                row.confidence
            );
        }
    }
    out
}

fn format_comparison_report(report: &ComparisonReport) -> String {
    match report {
        ComparisonReport::NoMatch => format!("{NO_MATCH_WARNING}\n"),
        ComparisonReport::Match(m) => {
            format!("Face similarity: {}\n{}\n", m.similarity_text(), m.band.message())
        }
    }
}
