use anyhow::Context;
use clap::Parser;
use mandelbridge::{Bridge, BridgeConfig, DataUriStyle, FormFields, MemoryDocument, Outcome};
use std::path::PathBuf;

/// Submit Mandelbrot parameters to the image generator and collect the PNG.
#[derive(Parser, Debug)]
#[command(name = "mandelbridge", version, about)]
struct Args {
    /// Real part of the view center
    #[arg(long, default_value = "-0.5", allow_hyphen_values = true)]
    real: String,

    /// Imaginary part of the view center
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    imaginary: String,

    /// Zoom level
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    zoom: String,

    /// Iteration limit
    #[arg(long, default_value = "256", allow_hyphen_values = true)]
    iterations: String,

    /// Generator endpoint
    #[arg(long, default_value = mandelbridge::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Request timeout in milliseconds (0 => none)
    #[arg(long, default_value_t = 0)]
    timeout_ms: u64,

    /// Emit `data:image/png;base64,` without the trailing space
    #[arg(long)]
    standard_uri: bool,

    /// Write the decoded PNG to this path
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print the resulting data URI to stdout
    #[arg(long)]
    print_uri: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = BridgeConfig {
        endpoint: args.endpoint.clone(),
        timeout_ms: args.timeout_ms,
        uri_style: if args.standard_uri {
            DataUriStyle::Standard
        } else {
            DataUriStyle::Compatible
        },
        ..Default::default()
    };

    let fields = FormFields::new(args.real, args.imaginary, args.zoom, args.iterations);
    let mut page = MemoryDocument::with_fields(config.element_ids.clone(), &fields);
    page.on_console(|m| match m.level.as_str() {
        "error" => log::error!("console: {}", m.text),
        _ => log::info!("console: {}", m.text),
    });

    let bridge = Bridge::with_http(config, page).context("failed to set up bridge")?;
    let src = match bridge.click()? {
        Outcome::Rendered { src, .. } => src,
        Outcome::Superseded { seq, latest } => {
            anyhow::bail!("response #{} superseded by #{}", seq, latest)
        }
    };

    if let Some(path) = &args.out {
        let png = mandelbridge::data_uri::decode_payload(&src)?;
        std::fs::write(path, &png).with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("Wrote {} bytes to {}", png.len(), path.display());
    }

    if args.print_uri {
        println!("{}", src);
    }

    Ok(())
}
