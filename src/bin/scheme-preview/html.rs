use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use album_theme_back::color::{
    Argb,
    hct::lstar_from_argb,
    quantizer::Swatch,
    scheme::ColorScheme,
};
use anyhow::Result;

/// Black or white, whichever reads better on `background`.
#[inline]
fn label_color(background: Argb) -> &'static str {
    if lstar_from_argb(background) > 60.0 { "#000" } else { "#fff" }
}

fn write_scheme<W: Write>(w: &mut W, title: &str, scheme: &ColorScheme) -> Result<()> {
    writeln!(w, r#"<h2>{title}</h2><div class="g">"#)?;
    for (role, color) in scheme.iter() {
        let hex = color.to_hex();
        writeln!(
            w,
            r#"<div class="s" style="background:{hex};color:{}">{role} | {hex}</div>"#,
            label_color(color)
        )?;
    }
    writeln!(w, "</div>")?;
    Ok(())
}

pub fn write_preview(
    title: &str,
    swatches: &[Swatch],
    light: &ColorScheme,
    dark: &ColorScheme,
    path: impl AsRef<Path>,
) -> Result<PathBuf> {
    let path = path.as_ref();
    let f = File::create(path)?;
    let mut w = BufWriter::new(f);
    writeln!(
        w,
        r#"<!doctype html><meta charset="utf-8">
<style>
  body{{margin:0;background:#111;color:#eee;font-family:system-ui}}
  h1,h2{{margin:12px}}
  .g{{display:grid;grid-template-columns:repeat(4,1fr);gap:6px;padding:8px}}
  .s{{aspect-ratio:3/1;border-radius:10px;display:flex;align-items:center;justify-content:center;
      font-weight:700}}
</style>
<h1>{title}</h1>"#
    )?;

    if !swatches.is_empty() {
        writeln!(w, r#"<h2>Swatches</h2><div class="g">"#)?;
        for swatch in swatches {
            let hex = swatch.color.to_hex();
            let role = swatch
                .role
                .map_or_else(|| "-".to_string(), |role| format!("{role:?}"));
            writeln!(
                w,
                r#"<div class="s" style="background:{hex};color:{}">{role} | {hex} | {}</div>"#,
                label_color(swatch.color),
                swatch.population
            )?;
        }
        writeln!(w, "</div>")?;
    }

    write_scheme(&mut w, "Light", light)?;
    write_scheme(&mut w, "Dark", dark)?;
    w.flush()?;
    Ok(path.to_path_buf())
}
