//! llm-cli: model listing, cost estimates, model selection, cached one-shot
//! questions, interactive chat and cache maintenance.
//!
//! Usage:
//!   llm-cli list-models
//!   llm-cli cost-estimate <model> <input_tokens> <output_tokens>
//!   llm-cli select <task_type> <input_length> [--priority <p>] [--budget <usd>]
//!   llm-cli ask <model> <prompt...> [--max-tokens <n>] [--temperature <t>]
//!   llm-cli chat <model> [--stream] [--system <prompt>]
//!   llm-cli cache-clear [--older-than-hours <n>]

use anyhow::{anyhow, bail, Context};
use futures::StreamExt;
use llm_api_interface::models::SelectionRequest;
use llm_api_interface::{
    CacheStore, CachedClient, GenerationOptions, Message, ModelCatalog, ModelId, ModelSelector,
    Settings, StreamEvent,
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let config_path = take_option(&mut args, "--config").map(PathBuf::from);

    if args.is_empty() {
        print_usage();
        std::process::exit(1);
    }

    let command = args.remove(0);
    let result = match command.as_str() {
        "list-models" => cmd_list_models(),
        "cost-estimate" => cmd_cost_estimate(&args),
        "select" => cmd_select(args),
        "version" | "--version" | "-V" => {
            cmd_version();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        "ask" | "chat" | "cache-clear" => match load_settings(config_path.as_deref()) {
            Ok(settings) => match command.as_str() {
                "ask" => cmd_ask(&settings, args).await,
                "chat" => cmd_chat(&settings, args).await,
                _ => cmd_cache_clear(&settings, args).await,
            },
            Err(e) => Err(e),
        },
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"llm-cli: unified Anthropic / OpenAI client with response cache

USAGE:
    llm-cli [--config <settings.yaml>] <COMMAND> [OPTIONS]

COMMANDS:
    list-models                                   List supported models
    cost-estimate <model> <input> <output>        Estimate the cost of a call
    select <task> <input_len> [--priority <p>] [--budget <usd>]
                                                  Recommend a model for a task
    ask <model> <prompt...> [--max-tokens <n>] [--temperature <t>]
                                                  One-shot question (cached)
    chat <model> [--stream] [--system <prompt>]   Interactive chat
    cache-clear [--older-than-hours <n>]          Remove cached responses
    version                                       Show version information
    help                                          Show this help message

ENVIRONMENT:
    ANTHROPIC_API_KEY, OPENAI_API_KEY             Provider credentials
    ANTHROPIC_BASE_URL, OPENAI_BASE_URL           Endpoint overrides
    CACHE_DIR, CACHE_ENABLED, CACHE_TTL           Cache settings
    API_TIMEOUT, LOG_LEVEL, DEBUG                 Runtime settings"#
    );
}

fn cmd_version() {
    println!("llm-cli {}", env!("CARGO_PKG_VERSION"));
}

fn load_settings(path: Option<&std::path::Path>) -> anyhow::Result<Settings> {
    let settings = Settings::load(path).context("failed to load settings")?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(settings)
}

/// Remove `--name <value>` from `args` and return the value.
fn take_option(args: &mut Vec<String>, name: &str) -> Option<String> {
    let idx = args.iter().position(|a| a == name)?;
    if idx + 1 >= args.len() {
        args.remove(idx);
        return None;
    }
    let value = args.remove(idx + 1);
    args.remove(idx);
    Some(value)
}

fn take_flag(args: &mut Vec<String>, name: &str) -> bool {
    match args.iter().position(|a| a == name) {
        Some(idx) => {
            args.remove(idx);
            true
        }
        None => false,
    }
}

fn parse_arg<T>(value: Option<&String>, what: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let value = value.ok_or_else(|| anyhow!("missing {what}"))?;
    value
        .parse()
        .map_err(|e| anyhow!("invalid {what} `{value}`: {e}"))
}

fn cmd_list_models() -> anyhow::Result<()> {
    println!(
        "{:<28} {:<10} {:>10} {:>10} {:>12} {:>12}",
        "MODEL", "PROVIDER", "MAX TOK", "CONTEXT", "IN $/1K", "OUT $/1K"
    );
    for spec in ModelCatalog::builtin().list() {
        println!(
            "{:<28} {:<10} {:>10} {:>10} {:>12.4} {:>12.4}",
            spec.id.as_str(),
            spec.provider.name(),
            spec.max_tokens,
            spec.context_window,
            spec.pricing.input_cost_per_1k,
            spec.pricing.output_cost_per_1k,
        );
    }
    Ok(())
}

fn cmd_cost_estimate(args: &[String]) -> anyhow::Result<()> {
    let model = args.first().ok_or_else(|| anyhow!("missing model"))?;
    let input: u64 = parse_arg(args.get(1), "input token count")?;
    let output: u64 = parse_arg(args.get(2), "output token count")?;
    let estimate = ModelCatalog::builtin().estimate(model, input, output)?;
    println!("{}", estimate.format_detailed());
    Ok(())
}

fn cmd_select(mut args: Vec<String>) -> anyhow::Result<()> {
    let priority = take_option(&mut args, "--priority");
    let budget = take_option(&mut args, "--budget");

    let task = args.first().ok_or_else(|| anyhow!("missing task type"))?;
    let input_length: usize = parse_arg(args.get(1), "input length")?;
    let mut request = SelectionRequest::new(task, input_length);
    if let Some(p) = priority {
        request = request.with_priority(&p);
    }
    if let Some(b) = budget {
        request = request.with_budget(parse_arg(Some(&b), "budget")?);
    }

    let model = ModelSelector::try_select(&request)?;
    let spec = model.spec();
    println!("{} ({})", model, spec.provider);
    println!(
        "  context window: {}  typical latency: {:.1}s",
        spec.context_window,
        spec.typical_latency.as_secs_f64()
    );
    Ok(())
}

fn generation_options(args: &mut Vec<String>) -> anyhow::Result<GenerationOptions> {
    let mut options = GenerationOptions::default();
    if let Some(v) = take_option(args, "--max-tokens") {
        options = options.with_max_tokens(parse_arg(Some(&v), "max tokens")?);
    }
    if let Some(v) = take_option(args, "--temperature") {
        options = options.with_temperature(parse_arg(Some(&v), "temperature")?);
    }
    Ok(options)
}

async fn cmd_ask(settings: &Settings, mut args: Vec<String>) -> anyhow::Result<()> {
    let options = generation_options(&mut args)?;
    if args.len() < 2 {
        bail!("usage: llm-cli ask <model> <prompt...>");
    }
    let model: ModelId = args[0].parse()?;
    let prompt = args[1..].join(" ");

    let client = CachedClient::from_settings(settings).await?;
    let completion = client
        .complete(model, &[Message::user(prompt)], &options)
        .await?;
    println!("{}", completion.text()?);
    if completion.cached {
        eprintln!("(served from cache)");
    }
    Ok(())
}

async fn cmd_chat(settings: &Settings, mut args: Vec<String>) -> anyhow::Result<()> {
    let stream = take_flag(&mut args, "--stream");
    let system = take_option(&mut args, "--system");
    let options = generation_options(&mut args)?;
    let model: ModelId = args
        .first()
        .ok_or_else(|| anyhow!("missing model"))?
        .parse()?;

    let client = CachedClient::from_settings(settings).await?;
    let mut history: Vec<Message> = system.into_iter().map(Message::system).collect();

    println!("Chatting with {model}. Type 'exit' or 'quit' to leave.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }
        history.push(Message::user(line));

        let reply = if stream {
            let mut events = client.stream(model, &history, &options).await?;
            let mut reply = String::new();
            while let Some(event) = events.next().await {
                match event? {
                    StreamEvent::TextDelta { text } => {
                        print!("{text}");
                        std::io::stdout().flush()?;
                        reply.push_str(&text);
                    }
                    StreamEvent::Done => break,
                }
            }
            println!();
            reply
        } else {
            let text = client.complete_text(model, &history, &options).await?;
            println!("{text}");
            text
        };
        history.push(Message::assistant(reply));
    }

    let total = client.usage().total_cost();
    if total > 0.0 {
        println!("Session cost: ${total:.4}");
    }
    Ok(())
}

fn parse_max_age(value: &str) -> anyhow::Result<Duration> {
    let hours: f64 = parse_arg(Some(&value.to_string()), "hour count")?;
    if !hours.is_finite() || hours < 0.0 {
        bail!("hour count must be a non-negative number");
    }
    Duration::try_from_secs_f64(hours * 3600.0)
        .map_err(|_| anyhow!("hour count `{value}` is too large"))
}

async fn cmd_cache_clear(settings: &Settings, mut args: Vec<String>) -> anyhow::Result<()> {
    let max_age = match take_option(&mut args, "--older-than-hours") {
        Some(v) => Some(parse_max_age(&v)?),
        None => None,
    };

    let cache = CacheStore::open(settings.cache_config()).await?;
    if !cache.is_enabled() {
        println!("Cache is disabled; nothing to clear.");
        return Ok(());
    }
    let removed = cache.clear(max_age).await?;
    println!(
        "Removed {removed} cached response(s) from {}",
        settings.cache_dir.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_age_accepts_fractional_hours() {
        assert_eq!(parse_max_age("1.5").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_max_age("0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn max_age_rejects_bad_values_without_panicking() {
        assert!(parse_max_age("1e300").is_err());
        assert!(parse_max_age("-2").is_err());
        assert!(parse_max_age("inf").is_err());
        assert!(parse_max_age("soon").is_err());
    }
}
