//! HTML for the single-page UI: sidebar mode selector, upload form, results.

use crate::controller::{ComparisonView, EmotionView, Mode, Outcome};
use crate::intake::{IntakeError, Upload, ALLOWED_EXTENSIONS};
use base64::Engine;
use facelens_core::report::{FaceSummary, Severity, NO_FACES_WARNING, NO_MATCH_WARNING};
use facelens_core::{ComparisonReport, EmotionReport};
use std::fmt::Write;

const STYLE: &str = r#"
body { margin: 0; font-family: sans-serif; display: flex; min-height: 100vh; }
nav { width: 220px; background: #f0f2f6; padding: 1rem; }
main { flex: 1; padding: 1rem 2rem; max-width: 1100px; }
.columns { display: flex; gap: 1rem; }
.columns > * { flex: 1; }
figure { margin: 0; }
figure img { width: 100%; }
figcaption { color: #666; font-size: 0.9rem; text-align: center; }
.notice { padding: 0.75rem 1rem; border-radius: 0.4rem; margin: 0.75rem 0; }
.success { background: #dff5e3; } .info { background: #e0ecfb; }
.warning { background: #fff6d6; } .error { background: #fde2e2; }
.metric { font-size: 1.4rem; } .metric small { display: block; font-size: 0.8rem; color: #666; }
.bar { background: #e6e6e6; border-radius: 0.3rem; height: 0.6rem; margin: 0.1rem 0 0.6rem; }
.bar > div { background: #ff4b4b; height: 100%; border-radius: 0.3rem; }
pre { background: #f6f6f6; padding: 0.75rem; overflow-x: auto; }
"#;

/// Escape text for HTML element and attribute content.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn data_uri(bytes: &[u8], mime: &str) -> String {
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

fn figure(src: &str, caption: &str) -> String {
    format!(
        "<figure><img src=\"{src}\" alt=\"{cap}\"><figcaption>{cap}</figcaption></figure>",
        cap = escape(caption)
    )
}

fn upload_figure(upload: &Upload, caption: &str) -> String {
    figure(&data_uri(&upload.bytes, upload.mime()), caption)
}

pub fn notice(severity: Severity, text: &str) -> String {
    let class = match severity {
        Severity::Success => "success",
        Severity::Info => "info",
        Severity::Warning => "warning",
        Severity::Error => "error",
    };
    format!("<div class=\"notice {class}\">{}</div>", escape(text))
}

fn progress(percent: u8, label: &str) -> String {
    format!(
        "<div>{}</div><div class=\"bar\"><div style=\"width: {percent}%\"></div></div>",
        escape(label)
    )
}

fn metric(label: &str, value: &str) -> String {
    format!(
        "<div class=\"metric\"><small>{}</small>{}</div>",
        escape(label),
        escape(value)
    )
}

fn raw_dump(json: &str) -> String {
    format!(
        "<details><summary>Technical details</summary><pre>{}</pre></details>",
        escape(json)
    )
}

/// Full HTML document with the sidebar and `content` in the main area.
pub fn render(mode: Mode, content: &str) -> String {
    let mut options = String::new();
    for m in Mode::ALL {
        let selected = if m == mode { " selected" } else { "" };
        let _ = write!(
            options,
            "<option value=\"{}\"{selected}>{}</option>",
            m.as_str(),
            escape(m.title())
        );
    }
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title>\
         <style>{STYLE}</style></head><body>\
         <nav><h3>Menu</h3><form method=\"get\" action=\"/\">\
         <label>Choose a feature<br><select name=\"mode\" onchange=\"this.form.submit()\">{options}</select></label>\
         <noscript><button type=\"submit\">Go</button></noscript></form></nav>\
         <main><h1>{title}</h1>{form}{content}</main></body></html>",
        title = escape(mode.title()),
        form = upload_form(mode),
    )
}

fn upload_form(mode: Mode) -> String {
    let accept = ALLOWED_EXTENSIONS
        .iter()
        .map(|e| format!(".{e}"))
        .collect::<Vec<_>>()
        .join(",");
    let inputs = match mode {
        Mode::Emotion => format!(
            "<label>Upload an image with a visible face<br>\
             <input type=\"file\" name=\"image\" accept=\"{accept}\"></label>"
        ),
        Mode::Compare => format!(
            "<h3>Upload two face photos to compare</h3><div class=\"columns\">\
             <label>Image 1<br><input type=\"file\" name=\"source\" accept=\"{accept}\"></label>\
             <label>Image 2<br><input type=\"file\" name=\"target\" accept=\"{accept}\"></label></div>"
        ),
    };
    format!(
        "<form method=\"post\" action=\"/?mode={}\" enctype=\"multipart/form-data\">{inputs}\
         <p><button type=\"submit\">Analyze</button></p></form>",
        mode.as_str()
    )
}

/// Warnings for files the extension filter refused.
pub fn rejected_notices(rejected: &[IntakeError]) -> String {
    rejected
        .iter()
        .map(|e| notice(Severity::Warning, &e.to_string()))
        .collect()
}

fn face_section(face: &FaceSummary) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<section><h3>Face {n}</h3><hr style=\"border: 2px solid {color}\"><div class=\"columns\">{}{}{}</div>",
        metric("Gender", &face.gender_text()),
        metric("Estimated age", &face.age_text()),
        metric("Dominant emotion", &face.top_emotion_text()),
        n = face.number,
        color = face.color.css(),
    );

    html.push_str("<p><strong>Emotions:</strong></p>");
    for emotion in &face.emotions {
        html.push_str(&progress(
            facelens_core::report::progress_percent(emotion.confidence),
            &format!("{}: {:.1}%", emotion.kind, emotion.confidence),
        ));
    }

    html.push_str("<details><summary>Additional face attributes</summary><ul>");
    for row in &face.traits {
        let _ = write!(
            html,
            "<li>{}: {} ({:.1}%)</li>",
            escape(row.label),
            if row.present { "Yes" } else { "No" },
            row.confidence
        );
    }
    html.push_str("</ul></details></section>");
    html
}

/// Results area for the emotion page.
pub fn emotion_results(outcome: &Outcome<EmotionView>) -> String {
    let view = match outcome {
        Outcome::Idle => return String::new(),
        Outcome::Failed(msg) => return notice(Severity::Error, msg),
        Outcome::Done(view) => view,
    };

    let mut html = String::new();
    match &view.report {
        EmotionReport::NoFaces => {
            html.push_str(&notice(Severity::Warning, NO_FACES_WARNING));
            html.push_str(&upload_figure(&view.image, "Uploaded image"));
        }
        EmotionReport::Faces(faces) => {
            html.push_str("<div class=\"columns\">");
            html.push_str(&upload_figure(&view.image, "Original image"));
            if let Some(png) = &view.annotated_png {
                html.push_str(&figure(&data_uri(png, "image/png"), "Face analysis result"));
            }
            html.push_str("</div><h2>Detailed face analysis</h2>");
            for face in faces {
                html.push_str(&face_section(face));
            }
        }
    }
    html.push_str(&raw_dump(&view.raw_json));
    html
}

/// Results area for the comparison page.
pub fn comparison_results(outcome: &Outcome<ComparisonView>) -> String {
    let view = match outcome {
        Outcome::Idle => return String::new(),
        Outcome::Failed(msg) => return notice(Severity::Error, msg),
        Outcome::Done(view) => view,
    };

    let mut html = String::from("<h2>Comparison result</h2><div class=\"columns\">");
    html.push_str(&upload_figure(&view.source, "Image 1"));
    html.push_str(&upload_figure(&view.target, "Image 2"));
    html.push_str("</div>");

    match &view.report {
        ComparisonReport::NoMatch => html.push_str(&notice(Severity::Warning, NO_MATCH_WARNING)),
        ComparisonReport::Match(summary) => {
            let _ = write!(
                html,
                "<p><strong>Face similarity:</strong> {}</p>",
                summary.similarity_text()
            );
            html.push_str(&progress(
                summary.progress,
                &format!("Similarity {}", summary.similarity_text()),
            ));
            html.push_str(&notice(summary.band.severity(), summary.band.message()));
        }
    }
    html.push_str(&raw_dump(&view.raw_json));
    html
}
