use dicescript::{Engine, ExecutionLimits, MarkdownStringifier};
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

const LIMITS_VAR: &str = "DICESCRIPT_LIMITS";

fn limits_from_env() -> Result<ExecutionLimits, Box<dyn std::error::Error>> {
    match std::env::var(LIMITS_VAR) {
        Ok(json) => Ok(ExecutionLimits::from_json(&json)?),
        Err(std::env::VarError::NotPresent) => Ok(ExecutionLimits::default()),
        Err(e) => Err(e.into()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let limits = limits_from_env()?;
    tracing::debug!(?limits, "starting repl");
    let engine = Engine::default().with_limits(limits);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut buf = String::new();
    print!("> ");
    io::stdout().flush()?;
    while let Some(Ok(line)) = lines.next() {
        if line.is_empty() {
            match engine.evaluate(&buf) {
                Ok(eval) => println!("{}", eval.render(&mut MarkdownStringifier::new())),
                Err(why) => eprintln!("Error: {}", why),
            }
            print!("> ");
            io::stdout().flush()?;
            buf.clear();
        } else {
            buf.push_str(&line);
            buf.push('\n');
            print!("... ");
            io::stdout().flush()?;
        }
    }
    Ok(())
}
