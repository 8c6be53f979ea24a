use anyhow::{Result, anyhow};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

use super::render::{prompt_help, render};
use crate::assistant::{AssistantClient, CalendarAssistant};
use crate::core::AppConfig;
use crate::intake::{IntakeSource, SelectedImage, pick_pasted};
use crate::origin::resolve_endpoints;
use crate::workflow::{Workflow, WorkflowPhase, WorkflowState};

#[derive(Debug, PartialEq, Eq)]
enum ReviewCommand {
    Toggle(usize),
    ToggleAll,
    SelectNone,
    Commit,
    Retry,
    Quit,
}

/// Events are numbered from 1 on screen
fn parse_command(line: &str) -> Option<ReviewCommand> {
    match line.trim() {
        "a" => Some(ReviewCommand::ToggleAll),
        "n" => Some(ReviewCommand::SelectNone),
        "c" => Some(ReviewCommand::Commit),
        "r" => Some(ReviewCommand::Retry),
        "q" => Some(ReviewCommand::Quit),
        other => other
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map(|n| ReviewCommand::Toggle(n - 1)),
    }
}

async fn read_pasted_image(media_type: &str) -> Result<SelectedImage> {
    let mut content = Vec::new();
    tokio::io::stdin().read_to_end(&mut content).await?;
    pick_pasted(vec![SelectedImage::new(content, media_type, "pasted-image")])
        .ok_or_else(|| anyhow!("Nothing on standard input is an image"))
}

async fn review_loop<A>(workflow: &mut Workflow, assistant: &A) -> Result<()>
where
    A: CalendarAssistant + ?Sized,
{
    let mut rl = DefaultEditor::new()?;

    loop {
        let view = workflow.view();
        if view.phase == WorkflowPhase::Done {
            break;
        }
        println!("{}", prompt_help(&view));

        let line = match rl.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        };

        let Some(command) = parse_command(&line) else {
            println!("Unknown command {:?}", line.trim());
            continue;
        };

        let outcome = match command {
            ReviewCommand::Toggle(index) => workflow.toggle_event(index).map(|_| ()),
            ReviewCommand::ToggleAll => workflow.toggle_all(),
            ReviewCommand::SelectNone => workflow.select_none(),
            ReviewCommand::Commit => workflow.run_commit(assistant).await,
            ReviewCommand::Retry => match workflow.retry() {
                // The image is still here, so go straight back to the backend
                Ok(()) if workflow.phase() == WorkflowPhase::Selected => {
                    workflow.run_extraction(assistant).await
                }
                other => other,
            },
            ReviewCommand::Quit => break,
        };

        match outcome {
            Ok(()) => print!("{}", render(&workflow.view())),
            Err(err) => println!("{}", err),
        }
    }

    Ok(())
}

pub async fn run(
    file: Option<PathBuf>,
    stdin: bool,
    media_type: &str,
    calendar_id: Option<String>,
    yes: bool,
) -> Result<()> {
    super::init_tracing();

    let config = AppConfig::default();
    let calendar_id = calendar_id.unwrap_or(config.calendar_id.clone());
    let endpoints = resolve_endpoints(&config).await;
    let assistant = AssistantClient::from_endpoints(&endpoints);
    let mut workflow = Workflow::new(&calendar_id);

    let (source, image) = match (stdin, file) {
        (true, _) => (IntakeSource::Clipboard, read_pasted_image(media_type).await?),
        (false, Some(path)) => (IntakeSource::FilePicker, SelectedImage::from_path(&path).await?),
        (false, None) => return Err(anyhow!("Missing image file or \"--stdin\"")),
    };

    workflow.select(source, image)?;
    print!("{}", render(&workflow.view()));

    println!("Analyzing calendar image...");
    workflow.run_extraction(&assistant).await?;
    print!("{}", render(&workflow.view()));

    if yes {
        // An empty extraction has nothing to add
        if workflow.review().is_some_and(|review| review.can_commit()) {
            workflow.run_commit(&assistant).await?;
            print!("{}", render(&workflow.view()));
        }
        return match workflow.state() {
            WorkflowState::Error { message, .. } => Err(anyhow!("{}", message)),
            _ => Ok(()),
        };
    }

    review_loop(&mut workflow, &assistant).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_review_commands() {
        assert_eq!(parse_command("1"), Some(ReviewCommand::Toggle(0)));
        assert_eq!(parse_command(" 12 "), Some(ReviewCommand::Toggle(11)));
        assert_eq!(parse_command("a"), Some(ReviewCommand::ToggleAll));
        assert_eq!(parse_command("n"), Some(ReviewCommand::SelectNone));
        assert_eq!(parse_command("c"), Some(ReviewCommand::Commit));
        assert_eq!(parse_command("r"), Some(ReviewCommand::Retry));
        assert_eq!(parse_command("q"), Some(ReviewCommand::Quit));
    }

    #[test]
    fn it_rejects_unknown_commands() {
        assert_eq!(parse_command("0"), None);
        assert_eq!(parse_command("-1"), None);
        assert_eq!(parse_command("commit"), None);
        assert_eq!(parse_command(""), None);
    }
}
