use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use kiosk::{apply_answer, hint, parse_command, prompt, status};
use questions::STEP_COUNT;
use survey::{
    LocalCache, MemoryForm, Outcome, SubmissionClient, SurveyController, Transition, view::Screen,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin, stdin};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Runs the Nanotronics survey in a terminal")]
struct Args {
    /// Backend base URL
    #[arg(long, env = "SURVEY_SERVER", default_value = "http://127.0.0.1:5000")]
    server: String,

    /// Where submissions are kept when the backend is unreachable
    #[arg(long, env = "SURVEY_CACHE", default_value = "pending_responses.json")]
    cache: PathBuf,
}

async fn read_line(lines: &mut Lines<BufReader<Stdin>>) -> Result<String> {
    lines
        .next_line()
        .await
        .context("Failed to read stdin")?
        .context("Input closed")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let client = SubmissionClient::new(&args.server, LocalCache::new(&args.cache))
        .context("Failed to build HTTP client")?;
    let mut lines = BufReader::new(stdin()).lines();
    let mut form = MemoryForm::new();
    let mut controller = SurveyController::new();

    println!("Encuesta Nanotronics\n{}", hint(&controller.view()));
    read_line(&mut lines).await?;
    controller.start()?;

    let pb = ProgressBar::new(u64::from(STEP_COUNT));
    pb.set_style(ProgressStyle::with_template("[{bar:40.cyan/blue}] {msg}")?.progress_chars("=> "));

    let outcome = loop {
        let view = controller.view();
        let Screen::Step(step) = view.screen else {
            break None;
        };

        let def = step.def();
        pb.set_position(u64::from(step.index()));
        pb.set_message(status(&view, def.title));

        for field in def.fields {
            loop {
                pb.suspend(|| println!("{}", prompt(field)));
                let line = read_line(&mut lines).await?;

                match apply_answer(&mut form, field, &line) {
                    Ok(()) => break,
                    Err(e) => pb.suspend(|| println!("{e}")),
                }
            }
        }

        pb.suspend(|| println!("{}", hint(&view)));
        let input = parse_command(&read_line(&mut lines).await?);

        match controller.handle(input, &form, &client).await {
            Ok(Some(Transition::Submitted(outcome))) => break Some(outcome),
            Ok(_) => {}
            Err(e) => pb.suspend(|| println!("{e}")),
        }
    };

    pb.finish_and_clear();

    match outcome {
        Some(Outcome::Sent { id }) => println!("¡Gracias! Respuesta {id} guardada."),
        Some(Outcome::CachedLocally { .. } | Outcome::Unsaved) | None => {
            println!("¡Gracias por tu tiempo!")
        }
    }

    Ok(())
}
