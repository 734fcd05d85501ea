//! `scribe ask`: one-shot and streaming invocation.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use futures_util::StreamExt;

use scribe_core::llm::registry::ModelRegistry;
use scribe_types::image::ImageData;
use scribe_types::llm::InvocationRequest;

/// Arguments of `scribe ask`, gathered from the command line.
pub struct AskArgs {
    pub model: String,
    pub text: String,
    pub system: Option<String>,
    pub images: Vec<PathBuf>,
    pub temperature: Option<f64>,
    pub json_mode: bool,
    pub stream: bool,
}

/// Media type for an image path, from its extension.
pub fn media_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Read an image file from disk.
pub async fn load_image(path: &Path) -> Result<ImageData> {
    let Some(media_type) = media_type_for(path) else {
        bail!(
            "unsupported image type for '{}' (expected png, jpg, gif or webp)",
            path.display()
        );
    };
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read image '{}'", path.display()))?;
    Ok(ImageData::new(media_type, bytes)?)
}

pub async fn build_request(args: &AskArgs) -> Result<InvocationRequest> {
    let mut images = Vec::with_capacity(args.images.len());
    for path in &args.images {
        images.push(load_image(path).await?);
    }

    let mut request = InvocationRequest::new(args.text.clone())
        .with_images(images)
        .with_json(args.json_mode);
    if let Some(system) = &args.system {
        request = request.with_system_prompt(system.clone());
    }
    if let Some(temperature) = args.temperature {
        request = request.with_temperature(temperature);
    }
    request.validate()?;
    Ok(request)
}

pub async fn ask(registry: &ModelRegistry, args: AskArgs, json: bool) -> Result<()> {
    let request = build_request(&args).await?;

    // JSON output needs the whole response, so streaming only changes how
    // plain output is printed.
    if args.stream && !json {
        let mut stream = registry.stream(&args.model, request);
        let mut stdout = std::io::stdout();
        let mut wrote_any = false;
        while let Some(fragment) = stream.next().await {
            let fragment = fragment?;
            write!(stdout, "{fragment}")?;
            stdout.flush()?;
            wrote_any = true;
        }
        if wrote_any {
            writeln!(stdout)?;
        }
        return Ok(());
    }

    let response = registry.invoke(&args.model, &request).await?;
    if json {
        let output = serde_json::json!({
            "model": args.model,
            "response": response,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{response}");
    }
    Ok(())
}
