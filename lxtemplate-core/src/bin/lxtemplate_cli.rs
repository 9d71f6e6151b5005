//! LX Template CLI - Render helper fragments from JSON
//!
//! Commands: get, escape, img, responsive-img, advanced-img, class-list, css
//! Outputs JSON to stdout
//! Returns non-zero on bad input

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use lxtemplate_core::{
    class_list, Attrs, EscapeContext, MediaLibrary, RenderOptions, TemplateHelper, ADVANCED_IMG_CSS,
};

#[derive(Parser)]
#[command(name = "lxtemplate-cli")]
#[command(version)]
#[command(about = "LX Template CLI - template helper fragments")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a media library JSON file (array of attachments)
    #[arg(short, long, global = true)]
    library: Option<PathBuf>,

    /// Path to a render options JSON file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a dotted path
    Get {
        /// JSON object (data bag)
        #[arg(short, long)]
        data: String,

        #[arg(short, long)]
        key: String,
    },

    /// Escape a value for an output context
    Escape {
        #[arg(short, long)]
        data: String,

        #[arg(short, long)]
        key: String,

        #[arg(long, value_enum, default_value = "html")]
        context: ContextArg,
    },

    /// Render a plain image
    Img {
        #[arg(short, long)]
        data: String,

        #[arg(short, long)]
        key: String,

        /// Size name handed to the media library
        #[arg(short, long)]
        size: Option<String>,

        /// JSON object of extra attributes
        #[arg(short, long)]
        attrs: Option<String>,
    },

    /// Render a responsive <picture>
    ResponsiveImg {
        #[arg(short, long)]
        data: String,

        #[arg(short, long)]
        key: String,
    },

    /// Render an advanced image container
    AdvancedImg {
        #[arg(short, long)]
        data: String,

        #[arg(short, long)]
        key: String,
    },

    /// Compose a class list from a JSON array of descriptors
    ClassList {
        #[arg(short, long)]
        args: String,
    },

    /// Print the advanced image stylesheet
    Css,
}

#[derive(Clone, Copy, ValueEnum)]
enum ContextArg {
    Attr,
    Url,
    Html,
    SafeHtml,
    Js,
    Xml,
}

impl From<ContextArg> for EscapeContext {
    fn from(arg: ContextArg) -> Self {
        match arg {
            ContextArg::Attr => EscapeContext::Attr,
            ContextArg::Url => EscapeContext::Url,
            ContextArg::Html => EscapeContext::Html,
            ContextArg::SafeHtml => EscapeContext::SafeHtml,
            ContextArg::Js => EscapeContext::Js,
            ContextArg::Xml => EscapeContext::Xml,
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("logging already initialised");
    }
}

fn failure(error: impl std::fmt::Display) -> ExitCode {
    println!("{}", json!({"success": false, "error": error.to_string()}));
    ExitCode::FAILURE
}

fn success(field: &str, value: Value) -> ExitCode {
    let mut output = json!({"success": true});
    output[field] = value;
    println!("{}", output);
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let options = match &cli.config {
        Some(path) => match RenderOptions::load(path) {
            Ok(o) => o,
            Err(e) => return failure(format!("Failed to load options: {}", e)),
        },
        None => RenderOptions::default(),
    };

    let library = match &cli.library {
        Some(path) => match MediaLibrary::load(path) {
            Ok(l) => l,
            Err(e) => return failure(format!("Failed to load media library: {}", e)),
        },
        None => MediaLibrary::new(),
    };

    let build = |data: &str| -> Result<TemplateHelper, String> {
        let value: Value = serde_json::from_str(data).map_err(|e| format!("Invalid data: {}", e))?;
        TemplateHelper::from_value(value)
            .map(|helper| helper.with_options(options.clone()))
            .map_err(|e| e.to_string())
    };

    match cli.command {
        Commands::Css => success("css", json!(ADVANCED_IMG_CSS)),

        Commands::ClassList { args } => match serde_json::from_str::<Vec<Value>>(&args) {
            Ok(args) => success("html", json!(class_list(&args))),
            Err(e) => failure(format!("Invalid args: {}", e)),
        },

        Commands::Get { data, key } => match build(&data) {
            Ok(helper) => match helper.lookup(&key) {
                Some(value) => success("value", value.clone()),
                None => success("value", json!("")),
            },
            Err(e) => failure(e),
        },

        Commands::Escape { data, key, context } => match build(&data) {
            Ok(helper) => success("html", json!(helper.escape(context.into(), &key))),
            Err(e) => failure(e),
        },

        Commands::Img { data, key, size, attrs } => {
            let attrs = match attrs.as_deref().map(serde_json::from_str::<Value>) {
                Some(Ok(value)) => Attrs::from_value(value),
                Some(Err(e)) => return failure(format!("Invalid attrs: {}", e)),
                None => Attrs::default(),
            };
            match build(&data) {
                Ok(helper) => {
                    let helper = helper.with_media(library);
                    let size = size.unwrap_or_else(|| helper.options().image_size.clone());
                    success("html", json!(helper.img_sized(&key, &size, &attrs)))
                }
                Err(e) => failure(e),
            }
        }

        Commands::ResponsiveImg { data, key } => match build(&data) {
            Ok(helper) => {
                let helper = helper.with_media(library);
                success("html", json!(helper.responsive_img(&key)))
            }
            Err(e) => failure(e),
        },

        Commands::AdvancedImg { data, key } => match build(&data) {
            Ok(helper) => {
                let helper = helper.with_media(library);
                success("html", json!(helper.advanced_img(&key)))
            }
            Err(e) => failure(e),
        },
    }
}
