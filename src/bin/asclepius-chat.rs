//! Interactive consultation with a medical specialist persona.
//!
//! This binary provides a REPL for describing symptoms, attaching medical
//! images and reading the specialist's structured analysis.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! GEMINI_API_KEY=... asclepius-chat
//!
//! # Start with a specific specialist
//! asclepius-chat --specialist derma
//!
//! # Use a cheaper model with a smaller thinking budget
//! asclepius-chat --model gemini-2.5-flash --thinking-budget 2048
//!
//! # Disable colors (useful for piping output)
//! asclepius-chat --no-color
//! ```
//!
//! Diagnostics go to stderr and are filtered with `RUST_LOG` (default `warn`).

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use asclepius::chat::{
    ChatArgs, ChatCommand, ChatConfig, PlainTextRenderer, Renderer, help_text, parse_command,
};
use asclepius::{Gemini, InteractionController, SessionManager, specialist};

type Controller = InteractionController<Gemini>;

/// Main entry point for the asclepius-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (args, _) = ChatArgs::from_command_line_relaxed("asclepius-chat [OPTIONS]");
    let config = match ChatConfig::try_from(args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("asclepius-chat: {err}");
            std::process::exit(2);
        }
    };

    let client = Gemini::with_options(
        config.api_key.clone(),
        Some(config.base_url.clone()),
        Some(config.timeout),
    )?;
    let sessions = SessionManager::new(client)
        .with_model(config.model.clone())
        .with_thinking(Some(config.thinking()));
    let mut controller = InteractionController::with_specialist(sessions, config.specialist);
    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let mut rl = DefaultEditor::new()?;

    println!("Asclepius (model: {})", config.model);
    println!("Type /help for commands, /quit to exit\n");
    renderer.print_welcome(controller.specialist());

    loop {
        let readline = rl.readline("Pasien: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                let Some(cmd) = parse_command(line) else {
                    controller.set_input(line);
                    send(&mut controller, &mut renderer).await;
                    continue;
                };
                match cmd {
                    ChatCommand::Quit => {
                        println!("Sampai jumpa!");
                        break;
                    }
                    ChatCommand::Help => {
                        for line in help_text().lines() {
                            println!("    {}", line);
                        }
                    }
                    ChatCommand::Specialists => {
                        renderer.print_specialists(specialist::all(), controller.specialist());
                    }
                    ChatCommand::Specialist(id) => match specialist::find(&id) {
                        Some(next) => {
                            controller.change_specialist(next);
                            renderer.print_welcome(next);
                        }
                        None => renderer.print_error(&format!(
                            "Unknown specialist: {id} (see /specialists)"
                        )),
                    },
                    ChatCommand::Attach(paths) => attach(&mut controller, &mut renderer, &paths),
                    ChatCommand::Detach(position) => match controller.detach(position - 1) {
                        Ok(_) => renderer.print_info(&format!("Removed attachment {position}.")),
                        Err(err) => renderer.print_error(&err.to_string()),
                    },
                    ChatCommand::Attachments => {
                        renderer.print_attachments(controller.attachments());
                    }
                    ChatCommand::Send => {
                        controller.set_input("");
                        send(&mut controller, &mut renderer).await;
                    }
                    ChatCommand::Reset => {
                        if controller.needs_confirmation() && !confirm_reset(&mut rl) {
                            renderer.print_info("Reset cancelled.");
                            continue;
                        }
                        controller.reset();
                        renderer.print_welcome(controller.specialist());
                    }
                    ChatCommand::History => {
                        for turn in controller.turns() {
                            renderer.print_turn(turn);
                        }
                    }
                    ChatCommand::Stats => {
                        renderer.print_stats(&controller.stats());
                    }
                    ChatCommand::Invalid(message) => {
                        renderer.print_error(&message);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt clears the line
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nSampai jumpa!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

async fn send(controller: &mut Controller, renderer: &mut impl Renderer) {
    let Some(outgoing) = controller.begin_send() else {
        renderer.print_info("Nothing to send.");
        return;
    };
    if let Some(turn) = controller.turns().last() {
        renderer.print_turn(turn);
    }
    renderer.print_pending(outgoing.specialist);
    let outcome = controller.dispatch(&outgoing).await;
    controller.finish_send(outcome);
    if let Some(turn) = controller.turns().last() {
        renderer.print_turn(turn);
    }
}

fn attach(controller: &mut Controller, renderer: &mut impl Renderer, paths: &[String]) {
    for path in paths {
        match controller.attach_path(path) {
            Ok(true) => renderer.print_info(&format!("Attached {path}.")),
            Ok(false) if controller.attachments().len() >= asclepius::MAX_ATTACHMENTS => {
                renderer.print_error(&format!(
                    "Skipped {path}: at most {} images per message.",
                    asclepius::MAX_ATTACHMENTS
                ))
            }
            Ok(false) => renderer.print_error(&format!("Skipped {path}: not an image file.")),
            Err(err) => renderer.print_error(&err.to_string()),
        }
    }
}

fn confirm_reset(rl: &mut DefaultEditor) -> bool {
    match rl.readline("Mulai konsultasi baru? Riwayat saat ini akan dihapus. [y/N] ") {
        Ok(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "ya"),
        Err(_) => false,
    }
}
