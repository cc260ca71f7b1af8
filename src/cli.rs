use clap::Parser;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Parser, Debug)]
#[command(name = "rendergate")]
#[command(
    version,
    about = "URL-to-document rendering gateway - render any page to HTML, PDF, or image",
    long_about = "rendergate\n\nAn HTTP gateway that drives headless Chromium to render a live page as\nraw HTML, a PDF document, or a screenshot image.\n\nEvery request launches its own browser instance and tears it down when\nthe response is written; there is no pooling and no caching.\n\nEXAMPLES:\n  # Render a page to PDF\n  curl 'http://localhost:3000/?url=example.com&type=pdf' -o page.pdf\n\n  # Screenshot at a custom viewport\n  curl 'http://localhost:3000/?url=example.com&type=screenshot&width=400&height=300' -o page.png"
)]
pub struct Args {
    /// Port to listen on (falls back to the PORT environment variable)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Tolerate TLS certificate errors during outbound navigation
    #[arg(long)]
    pub ignore_https_errors: bool,

    /// Node.js command used to run the engine helper
    #[arg(long, default_value = "node")]
    pub node_command: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Flag first, then the PORT environment variable, then 3000.
    pub fn resolved_port(&self) -> u16 {
        self.port
            .or_else(|| {
                std::env::var("PORT")
                    .ok()
                    .and_then(|value| value.parse().ok())
            })
            .unwrap_or(DEFAULT_PORT)
    }

    /// The flag wins; a non-empty IGNORE_HTTPS_ERRORS variable also enables
    /// it.
    pub fn resolved_ignore_https_errors(&self) -> bool {
        self.ignore_https_errors
            || std::env::var("IGNORE_HTTPS_ERRORS")
                .map(|value| !value.is_empty())
                .unwrap_or(false)
    }
}

pub fn parse() -> Args {
    Args::parse()
}
