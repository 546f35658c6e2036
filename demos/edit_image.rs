//! Image editing example - restyles a photo, optionally after a reference image.
//!
//! Run with: `cargo run --example edit_image -- <input_image> [reference_image]`
//!
//! Requires `API_KEY` (or `GOOGLE_API_KEY`) environment variable.

use restyle::{Config, EditAdapter, EditRequest, ImagePayload};

#[tokio::main]
async fn main() -> restyle::Result<()> {
    let mut args = std::env::args().skip(1);
    let input_path = args
        .next()
        .expect("Usage: edit_image <input_image> [reference_image]");

    let config = Config::from_env()?;
    let adapter = EditAdapter::new(&config)?;

    let mut request = EditRequest::new(
        ImagePayload::from_path(&input_path)?,
        "Dress the person in a bright pickleball outfit with a matching visor",
    );
    if let Some(reference_path) = args.next() {
        request = request.with_reference(ImagePayload::from_path(&reference_path)?);
    }

    let result = adapter.edit(&request).await?;
    let extension = result.format().unwrap_or_default().extension();
    let output = format!("edited.{extension}");
    result.save(&output)?;
    println!("Edited image saved to {output} ({})", result.mime_type);

    Ok(())
}
