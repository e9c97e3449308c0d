//! Interactive Mode - menu-driven session
//!
//! Keeps one [`App`] alive across actions so the dashboard accumulates
//! every batch run in the session.

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use tracing::debug;

use crate::app::App;
use crate::cli::{HistoryCommand, ModelsCommand, ThemeAction};
use crate::client::ClassifierApi;
use crate::spinner::print_header;
use crate::ui::dates;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    Detect,
    Dashboard,
    Models,
    History,
    Settings,
    Theme,
    Exit,
}

impl MenuItem {
    const ALL: [MenuItem; 7] = [
        MenuItem::Detect,
        MenuItem::Dashboard,
        MenuItem::Models,
        MenuItem::History,
        MenuItem::Settings,
        MenuItem::Theme,
        MenuItem::Exit,
    ];

    fn label(self) -> &'static str {
        match self {
            MenuItem::Detect => "📷 Detect images",
            MenuItem::Dashboard => "📈 Dashboard",
            MenuItem::Models => "🧠 Models",
            MenuItem::History => "🗂  History",
            MenuItem::Settings => "⚙  Settings",
            MenuItem::Theme => "🎨 Toggle theme",
            MenuItem::Exit => "🚪 Exit",
        }
    }
}

/// Run interactive session
pub async fn run_interactive_session<A: ClassifierApi>(app: &mut App<A>) -> Result<()> {
    print_header(&format!("🌱 LacakTani · {}", dates::today()));

    loop {
        let labels: Vec<&str> = MenuItem::ALL.iter().map(|m| m.label()).collect();
        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("What next?")
            .items(&labels)
            .default(0)
            .interact_opt()?;

        let item = match choice {
            Some(idx) => MenuItem::ALL[idx],
            None => MenuItem::Exit,
        };

        let outcome = match item {
            MenuItem::Detect => detect(app).await,
            MenuItem::Dashboard => app.show_dashboard().await,
            MenuItem::Models => models(app).await,
            MenuItem::History => history(app).await,
            MenuItem::Settings => settings(app).await,
            MenuItem::Theme => app.theme(ThemeAction::Toggle),
            MenuItem::Exit => break,
        };

        // Failures were already reported as notifications
        if let Err(e) = outcome {
            debug!("Action failed: {:#}", e);
        }
    }

    println!("\n{}\n", "Sampai jumpa! 🌱".bright_green());
    Ok(())
}

async fn detect<A: ClassifierApi>(app: &mut App<A>) -> Result<()> {
    let raw: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Images or folders (separate with ;)")
        .interact_text()?;

    let paths: Vec<PathBuf> = raw
        .split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect();
    app.detect(&paths, None).await.map(|_| ())
}

async fn models<A: ClassifierApi>(app: &mut App<A>) -> Result<()> {
    let actions = ["List", "Use a model", "Delete a model", "Upload a .pt file", "Back"];
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Models")
        .items(&actions)
        .default(0)
        .interact()?;

    let command = match choice {
        0 => ModelsCommand::List,
        1 => match pick_model(app, "Model to use").await? {
            Some(name) => ModelsCommand::Use { name },
            None => return Ok(()),
        },
        2 => match pick_model(app, "Model to delete").await? {
            Some(name) => ModelsCommand::Delete { name, yes: false },
            None => return Ok(()),
        },
        3 => {
            let file: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt("Weights file")
                .interact_text()?;
            ModelsCommand::Upload {
                file: PathBuf::from(file.trim()),
            }
        }
        _ => return Ok(()),
    };
    app.models(command).await
}

/// Choose among the models on the server; the active one is marked
async fn pick_model<A: ClassifierApi>(app: &App<A>, prompt: &str) -> Result<Option<String>> {
    let catalog = match app.api().list_models().await {
        Ok(catalog) => catalog,
        Err(e) => {
            app.notifier().error(&format!("Cannot load models: {}", e));
            return Err(e.into());
        }
    };
    if catalog.models.is_empty() {
        app.notifier().info("No models on the server");
        return Ok(None);
    }

    let labels: Vec<String> = catalog
        .models
        .iter()
        .map(|name| {
            if catalog.is_active(name) {
                format!("{} (active)", name)
            } else {
                name.clone()
            }
        })
        .collect();
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact_opt()?;
    Ok(choice.map(|idx| catalog.models[idx].clone()))
}

async fn history<A: ClassifierApi>(app: &mut App<A>) -> Result<()> {
    let actions = ["List", "Delete a record", "Export", "Back"];
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("History")
        .items(&actions)
        .default(0)
        .interact()?;

    let command = match choice {
        0 => HistoryCommand::List,
        1 => {
            let id: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt("Record id")
                .interact_text()?;
            HistoryCommand::Delete {
                id: id.trim().to_string(),
                yes: false,
            }
        }
        2 => HistoryCommand::Export {
            dest: None,
            open: false,
        },
        _ => return Ok(()),
    };
    app.history(command).await
}

async fn settings<A: ClassifierApi>(app: &mut App<A>) -> Result<()> {
    let confidence: f32 = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Minimum confidence (0 - 1)")
        .default(0.25)
        .interact_text()?;
    app.save_confidence(confidence).await
}
