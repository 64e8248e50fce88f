//! Interactive question loop.

use std::sync::Arc;

use anyhow::Result;
use ragqa_core::{Conversation, QaPipeline};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{error, warn};

use crate::render::{render_analysis, render_turn};

/// What a line of input asks the console to do.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Skip,
    Quit,
    Sources,
    Ask(&'a str),
}

fn parse(line: &str) -> Command<'_> {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "" => Command::Skip,
        "quit" | "exit" => Command::Quit,
        "sources" => Command::Sources,
        _ => Command::Ask(line),
    }
}

/// Run the question loop until the user quits or a fatal error occurs.
pub async fn run(pipeline: Arc<QaPipeline>, show_full_sources: bool) -> Result<()> {
    let mut conversation = Conversation::new(pipeline);
    let mut rl = DefaultEditor::new()?;

    println!(
        "Ask a question about the document. \
         Type 'sources' to inspect the last answer, 'quit' to exit."
    );

    loop {
        let line = match rl.readline("\n? ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        match parse(&line) {
            Command::Skip => continue,
            Command::Quit => break,
            Command::Sources => match conversation.memory().last() {
                Some(turn) => print!("{}", render_analysis(turn)),
                None => println!("No answers yet."),
            },
            Command::Ask(question) => {
                let _ = rl.add_history_entry(question);
                match conversation.ask(question).await {
                    Ok(turn) => {
                        print!("{}", render_turn(&turn, show_full_sources));
                        conversation.commit(turn);
                    }
                    Err(e) if e.is_fatal() => {
                        error!(error = %e, "aborting session");
                        return Err(e.into());
                    }
                    Err(e) => {
                        warn!(error = %e, "turn failed");
                        println!("Error: {e}");
                    }
                }
            }
        }
    }

    println!("Goodbye.");
    Ok(())
}
