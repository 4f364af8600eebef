use clap::{Parser, Subcommand};
use plume_render::{Context, Engine, EngineConfig};
use std::path::Path;
use tracing::{debug, Level};

#[derive(Parser)]
#[command(name = "plume")]
#[command(about = "plume: template expressions with filters and source diagnostics")]
#[command(version)]
struct Cli {
    /// Log level for diagnostics on stderr
    #[arg(long, global = true, default_value = "warn")]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a template to stdout
    Render {
        /// Template file
        path: String,

        /// JSON object with the template variables
        #[arg(long)]
        context: Option<String>,

        /// JSON engine config (`autoescape`, `string_if_invalid`)
        #[arg(long)]
        config: Option<String>,

        /// Do not HTML-escape output
        #[arg(long)]
        no_autoescape: bool,
    },

    /// Check a template for syntax errors without rendering it
    Check {
        /// Template file
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Render {
            path,
            context,
            config,
            no_autoescape,
        } => cmd_render(&path, context.as_deref(), config.as_deref(), no_autoescape),
        Command::Check { path } => cmd_check(&path),
    }
}

fn read_file(path: &str) -> String {
    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match std::fs::read_to_string(p) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn load_context(path: Option<&str>) -> Context {
    let Some(path) = path else {
        return Context::new();
    };
    let json: serde_json::Value = match serde_json::from_str(&read_file(path)) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error parsing {path}: {e}");
            std::process::exit(1);
        }
    };
    match Context::from_json(json) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("Error in {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn load_config(path: Option<&str>) -> EngineConfig {
    let Some(path) = path else {
        return EngineConfig::default();
    };
    match EngineConfig::from_json_str(&read_file(path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error parsing {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn compile(path: &str, engine: &Engine) -> plume_render::Template {
    let source = read_file(path);
    match engine.compile(&source) {
        Ok(template) => template,
        Err(e) => {
            eprint!("{e}");
            std::process::exit(1);
        }
    }
}

fn cmd_render(path: &str, context: Option<&str>, config: Option<&str>, no_autoescape: bool) {
    let mut config = load_config(config);
    if no_autoescape {
        config.autoescape = false;
    }
    debug!(?config, "engine config");

    let engine = Engine::builder().config(config).build();
    let template = compile(path, &engine);
    let context = load_context(context);

    match template.render(&context) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprint!("{e}");
            std::process::exit(1);
        }
    }
}

fn cmd_check(path: &str) {
    let engine = Engine::new();
    let template = compile(path, &engine);
    eprintln!(
        "OK: {path} ({} expressions)",
        template.ast().expression_count()
    );
}
