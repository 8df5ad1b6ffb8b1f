//! Development aid: render the light and dark schemes derived from an image (or a seed)
//! into an HTML page, next to the swatches the quantizer found.
//!
//! ```text
//! scheme-preview path/to/cover.jpg
//! scheme-preview --seed '#6200EE'
//! ```

#![forbid(unsafe_code)]

mod html;

use std::{env, fs, path::PathBuf};

use album_theme_back::{
    color::{
        Argb, DEFAULT_FALLBACK_SEED,
        quantizer::{QuantizerOptions, Swatch, extract_seed_color, extract_swatches},
        scheme::derive_scheme,
        tonal::build_palettes,
    },
    decode::decode_file,
};
use anyhow::{Context, Result, bail};

enum Input {
    Image(PathBuf),
    Seed(Argb),
}

fn parse_args() -> Result<Input> {
    let mut args = env::args().skip(1);
    match (args.next().as_deref(), args.next()) {
        (Some("--seed"), Some(seed)) => Ok(Input::Seed(
            seed.parse().with_context(|| format!("parsing seed `{seed}`"))?,
        )),
        (Some(path), None) if !path.starts_with("--") => Ok(Input::Image(PathBuf::from(path))),
        _ => bail!("usage: scheme-preview <image> | scheme-preview --seed <#RRGGBB>"),
    }
}

fn main() -> Result<()> {
    let input = parse_args()?;

    let target_dir = env::var("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("target"));
    let out_dir = target_dir.join("scheme-preview");
    fs::create_dir_all(&out_dir)?;

    let options = QuantizerOptions::default();
    let (name, seed, swatches): (String, Argb, Vec<Swatch>) = match input {
        Input::Image(path) => {
            let pixels =
                decode_file(&path).with_context(|| format!("decoding {}", path.display()))?;
            let seed = extract_seed_color(&pixels, &options, DEFAULT_FALLBACK_SEED);
            let name = path
                .file_stem()
                .map_or_else(|| "image".to_string(), |stem| stem.to_string_lossy().into_owned());
            (name, seed, extract_swatches(&pixels, &options))
        }
        Input::Seed(seed) => {
            let name = format!("seed-{}", seed.to_hex().trim_start_matches('#'));
            (name, seed, Vec::new())
        }
    };

    let palettes = build_palettes(seed);
    let light = derive_scheme(&palettes, false);
    let dark = derive_scheme(&palettes, true);

    let page = html::write_preview(
        &format!("{name} (seed {seed})"),
        &swatches,
        &light,
        &dark,
        out_dir.join(format!("{name}.html")),
    )?;
    let json_path = out_dir.join(format!("{name}.json"));
    let json = serde_json::json!({ "seed": seed, "light": light, "dark": dark });
    fs::write(&json_path, serde_json::to_string_pretty(&json)?)?;

    println!(
        "Generated scheme preview in {}:\n  - {}\n  - {}",
        out_dir.display(),
        page.display(),
        json_path.display()
    );
    Ok(())
}
