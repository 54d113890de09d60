use std::path::Path;
use std::process::ExitCode;

use gridlogic::{model::Puzzle, model::Theme, GeneratorSettings, PuzzleGenerator};
use log::error;

fn init_logging() {
    env_logger::init();
}

fn load_inputs() -> Result<(GeneratorSettings, Theme), gridlogic::error::SettingsError> {
    let mut settings = match std::env::var("SETTINGS_FILE") {
        Ok(path) => GeneratorSettings::load(Path::new(&path))?,
        Err(_) => GeneratorSettings::default(),
    };
    settings.apply_env();

    let theme = match std::env::var("THEME_FILE") {
        Ok(path) => Theme::load(Path::new(&path))?,
        Err(_) => Theme::sample(),
    };
    Ok((settings, theme))
}

fn print_puzzle(puzzle: &Puzzle) {
    println!("Seed {} ({:?}, {:?})", puzzle.seed, puzzle.difficulty, puzzle.solution.shape.geometry);
    println!();
    for (c, category) in puzzle.categories.iter().enumerate() {
        let labels: Vec<String> = category
            .items
            .iter()
            .enumerate()
            .map(|(i, label)| format!("{}{}={}", c, gridlogic::model::Item::index_to_letter(i), label))
            .collect();
        println!("{}: {}", category.name, labels.join(", "));
    }
    println!();
    for (i, clue) in puzzle.clues.iter().enumerate() {
        let marker = if puzzle.is_anchor(clue) { "*" } else { " " };
        println!("{}{:>3}. {}", marker, i + 1, clue);
    }
    let question = puzzle.question;
    println!();
    println!(
        "Which {} belongs to {}?",
        puzzle.category_name(question.attribute_category),
        puzzle.label(question.subject)
    );
    if std::env::var("SHOW_SOLUTION").is_ok() {
        println!();
        println!("{}", puzzle.solution);
        println!("Answer: {}", puzzle.label(question.answer));
    }
}

fn main() -> ExitCode {
    init_logging();

    let (settings, theme) = match load_inputs() {
        Ok(inputs) => inputs,
        Err(e) => {
            error!("Could not load inputs: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match PuzzleGenerator::new(settings).generate(&theme) {
        Ok(puzzle) => {
            if std::env::var("JSON").is_ok() {
                match serde_json::to_string_pretty(&puzzle) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        error!("Could not serialize puzzle: {}", e);
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print_puzzle(&puzzle);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
