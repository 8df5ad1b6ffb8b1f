//! Print the OpenAPI document of the album theme service as pretty JSON.

use album_theme_back::services::documentation::ApiDoc;
use anyhow::Context;
use utoipa::OpenApi;

fn main() -> anyhow::Result<()> {
    let doc = ApiDoc::openapi();
    let json = doc
        .to_pretty_json()
        .context("serializing OpenAPI document")?;
    println!("{json}");
    Ok(())
}
