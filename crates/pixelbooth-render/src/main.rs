//! Render booth viewport frames outside the browser.
//!
//! Without `--upstream` the input photo is drawn the way the booth shows
//! it in the chosen state. With `--upstream` the photo is sent through
//! the detect and convert service first and the finished portrait is
//! rendered.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use pixelbooth_core::compose::{decode_image, encode_png};
use pixelbooth_core::data_url::media_type_for_filename;
use pixelbooth_core::layout::scene;
use pixelbooth_core::{
    Booth, BoothVariant, Compositor, DEFAULT_VIEWPORT, DataUrl, Dimensions, RgbaImage,
    WorkflowState,
};
use pixelbooth_proxy::upstream::PixelMeClient;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

/// Render a pixelbooth viewport frame to a PNG.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Input photo.
    input: PathBuf,

    /// Output image path (PNG).
    #[arg(short, long)]
    output: PathBuf,

    /// Workflow state to draw. Ignored with `--upstream`.
    #[arg(long, value_enum, default_value_t = StateArg::Complete)]
    state: StateArg,

    /// Booth flavour.
    #[arg(long, default_value_t = BoothVariant::Passport)]
    variant: BoothVariant,

    /// Viewport side length in pixels.
    #[arg(long, default_value_t = DEFAULT_VIEWPORT)]
    size: u32,

    /// Background image. Defaults to the built-in orb.
    #[arg(long)]
    background: Option<PathBuf>,

    /// Conversion service base URL. When set, the photo is converted
    /// before rendering.
    #[arg(long, env = "PIXELME_API_URL")]
    upstream: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StateArg {
    Selected,
    Detecting,
    Converting,
    Complete,
}

impl From<StateArg> for WorkflowState {
    fn from(arg: StateArg) -> Self {
        match arg {
            StateArg::Selected => Self::Selected,
            StateArg::Detecting => Self::Detecting,
            StateArg::Converting => Self::Converting,
            StateArg::Complete => Self::Complete,
        }
    }
}

/// Read a photo from disk as a data URL.
fn load_photo(path: &Path) -> anyhow::Result<DataUrl> {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let Some(media_type) = media_type_for_filename(name) else {
        bail!("{} is not a supported image type", path.display());
    };
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(DataUrl::encode(media_type, &bytes)?)
}

/// Draw `photo` as the booth shows it in `state`.
fn preview(
    compositor: &Compositor,
    photo: &DataUrl,
    state: WorkflowState,
    variant: BoothVariant,
    size: u32,
) -> anyhow::Result<RgbaImage> {
    let face = decode_image(photo)?;
    let view = scene(
        state,
        Dimensions::new(face.width(), face.height()),
        size,
        variant,
    );
    Ok(compositor.render(&view, &face)?)
}

/// Run the photo through the service and draw the finished portrait.
async fn convert(
    compositor: &Compositor,
    client: &PixelMeClient,
    photo: DataUrl,
    variant: BoothVariant,
    size: u32,
) -> anyhow::Result<RgbaImage> {
    let mut booth = Booth::new(variant);
    booth.acquire(photo)?;

    if variant.previews_selection() {
        let snapshot = compositor
            .snapshot(&booth, size)?
            .context("booth has no photo")?;
        booth.advance_with(snapshot, client).await?;
    } else {
        booth.advance(client).await?;
    }

    compositor
        .render_booth(&booth, size)?
        .context("booth has no portrait")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let variant = args.variant;

    let compositor = match &args.background {
        Some(path) => {
            let background = image::open(path)
                .with_context(|| format!("reading background {}", path.display()))?
                .to_rgba8();
            Compositor::new(&background)?
        }
        None => Compositor::with_default_background(args.size)?,
    };

    info!(input = %args.input.display(), "reading photo");
    let photo = load_photo(&args.input)?;

    let frame = if let Some(upstream) = &args.upstream {
        info!(%upstream, %variant, "converting");
        let client = PixelMeClient::new(upstream.as_str());
        convert(&compositor, &client, photo, variant, args.size).await?
    } else {
        let state = WorkflowState::from(args.state);
        info!(%state, %variant, size = args.size, "rendering preview");
        preview(&compositor, &photo, state, variant, args.size)?
    };

    info!(output = %args.output.display(), "saving");
    std::fs::write(&args.output, encode_png(&frame)?)
        .with_context(|| format!("writing {}", args.output.display()))?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::Rgba;
    use pixelbooth_core::compose::png_data_url;

    use super::*;

    #[test]
    fn defaults_render_a_complete_passport_frame() {
        let args = Args::try_parse_from(["pixelbooth-render", "me.png", "-o", "out.png"]).unwrap();
        assert_eq!(args.state, StateArg::Complete);
        assert_eq!(args.variant, BoothVariant::Passport);
        assert_eq!(args.size, 256);
    }

    #[test]
    fn state_and_variant_parse_lowercase() {
        let args = Args::try_parse_from([
            "pixelbooth-render",
            "me.png",
            "-o",
            "out.png",
            "--state",
            "converting",
            "--variant",
            "sing",
        ])
        .unwrap();
        assert_eq!(WorkflowState::from(args.state), WorkflowState::Converting);
        assert_eq!(args.variant, BoothVariant::Sing);
    }

    #[test]
    fn unknown_variant_is_rejected() {
        let result = Args::try_parse_from([
            "pixelbooth-render",
            "me.png",
            "-o",
            "out.png",
            "--variant",
            "kiosk",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(load_photo(Path::new("notes.txt")).is_err());
    }

    #[test]
    fn preview_has_viewport_size() {
        let photo = png_data_url(&RgbaImage::from_pixel(6, 4, Rgba([9, 9, 9, 255]))).unwrap();
        let compositor = Compositor::with_default_background(32).unwrap();
        let frame = preview(
            &compositor,
            &photo,
            WorkflowState::Detecting,
            BoothVariant::Passport,
            32,
        )
        .unwrap();
        assert_eq!(frame.dimensions(), (32, 32));
    }
}
