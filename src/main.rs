use indicatif::ProgressBar;
use inquire::{InquireError, Select, Text};
use printing_resolver::deck::{self, DeckEntry};
use printing_resolver::printing::Printing;
use printing_resolver::session::DeckSession;
use printing_resolver::{
    CandidateFetcher, Config, HttpCatalogClient, ResolutionContext, Resolver, SearchFilters,
};
use std::error::Error;
use std::fs;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::from_env()?;
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    let client = HttpCatalogClient::new(&config)?;
    let resolver = Resolver::new(client, config.fetch_config());
    let session = DeckSession::new(Vec::new());

    let user_name = whoami::username();
    println!("Hi, {}! Catalog: {}", user_name, resolver.client().base_url());

    loop {
        let menu_options: Vec<&str> = vec![
            "Search cards",
            "Resolve deck list",
            "Import printings by set and number",
            "Show deck",
            "Exit",
        ];
        let menu_ans: Result<&str, InquireError> =
            Select::new("What would you like to do?", menu_options).prompt();

        let choice = match menu_ans {
            Ok(choice) => choice,
            Err(_) => {
                println!("There was an error, please try again");
                continue;
            }
        };
        let outcome: Result<(), Box<dyn Error>> = match choice {
            "Search cards" => search_cards(&resolver, &config).await,
            "Resolve deck list" => resolve_deck(&resolver, &config, &session).await,
            "Import printings by set and number" => import_printings(&resolver, &config).await,
            "Show deck" => {
                show_deck(&session.entries());
                Ok(())
            }
            "Exit" => break,
            _ => {
                println!("Invalid choice");
                Ok(())
            }
        };
        if let Err(e) = outcome {
            println!("{}", describe_failure(e.as_ref()));
        }
    }

    Ok(())
}

fn prompt_context(config: &Config) -> Result<ResolutionContext, InquireError> {
    let set = Text::new("Target set code (blank for any):").prompt()?;
    let lang = Text::new("Target language:").with_default("en").prompt()?;
    let mut ctx = ResolutionContext::new(Some(set.as_str()), &lang);
    if let Some(evergreen) = &config.evergreen_set {
        ctx = ctx.with_fallback_set(evergreen);
    }
    Ok(ctx)
}

fn spinner(message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.enable_steady_tick(Duration::from_millis(120));
    bar.set_message(message);
    bar
}

/// A failed menu action returns to the menu; Esc and Ctrl-C just cancel it.
fn describe_failure(error: &(dyn Error + 'static)) -> String {
    match error.downcast_ref::<InquireError>() {
        Some(InquireError::OperationCanceled) | Some(InquireError::OperationInterrupted) => {
            "Cancelled.".to_string()
        }
        _ => format!("Error: {}", error),
    }
}

fn describe(printing: &Printing) -> String {
    format!(
        "{} [{} #{} {}]",
        printing.display_name(),
        printing.set.to_uppercase(),
        printing.collector_number,
        printing.lang
    )
}

async fn search_cards(
    resolver: &Resolver<HttpCatalogClient>,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let text = Text::new("Search:").prompt()?;
    let ctx = prompt_context(config)?;
    let filters = SearchFilters::default().with_sets(ctx.target_set.iter().cloned().collect());

    let bar = spinner("Searching...");
    let result = resolver.resolve_search(&text, &filters, &ctx).await;
    bar.finish_and_clear();

    match result {
        Ok(printings) if printings.is_empty() => println!("No cards found."),
        Ok(printings) => {
            for printing in &printings {
                println!("{}", describe(printing));
            }
        }
        Err(e) => println!("Nothing to search for: {}", e),
    }
    Ok(())
}

async fn resolve_deck(
    resolver: &Resolver<HttpCatalogClient>,
    config: &Config,
    session: &DeckSession,
) -> Result<(), Box<dyn Error>> {
    let path = Text::new("Deck list file:").prompt()?;
    let text = fs::read_to_string(path.trim())?;
    let entries = deck::parse_deck_list(&text);
    if entries.is_empty() {
        println!("The deck list is empty.");
        return Ok(());
    }
    let ctx = prompt_context(config)?;

    session.replace_entries(entries.clone());
    let token = session.begin();
    let bar = spinner("Resolving printings...");
    let resolution = resolver.resolve_deck_list(&deck::names(&entries), &ctx).await;
    bar.finish_and_clear();

    match session.commit(token, &resolution) {
        Some(updated) => println!("Matched {} of {} cards.", updated, entries.len()),
        None => println!("A newer request replaced this one."),
    }
    if resolution.not_found_count() > 0 {
        println!("{} cards not found:", resolution.not_found_count());
        for name in &resolution.unresolved {
            println!("  {}", name);
        }
    }
    show_deck(&session.entries());
    Ok(())
}

async fn import_printings(
    resolver: &Resolver<HttpCatalogClient>,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let path = Text::new("File with `set number` lines:").prompt()?;
    let text = fs::read_to_string(path.trim())?;
    let identifiers: Vec<_> = text.lines().filter_map(deck::parse_printing_line).collect();
    if identifiers.is_empty() {
        println!("No `set number` lines found.");
        return Ok(());
    }

    let fetcher = CandidateFetcher::new(resolver.client(), config.fetch_config());
    let bar = spinner("Importing printings...");
    let response = fetcher.fetch_collection(&identifiers).await;
    bar.finish_and_clear();

    for printing in &response.data {
        println!("{}", describe(printing));
    }
    if !response.not_found.is_empty() {
        println!("{} cards not found.", response.not_found.len());
    }
    Ok(())
}

fn show_deck(entries: &[DeckEntry]) {
    if entries.is_empty() {
        println!("No deck loaded.");
        return;
    }
    for entry in entries {
        match &entry.printing {
            Some(printing) => println!("{} {}", entry.quantity, describe(printing)),
            None => println!("{} {} (not found)", entry.quantity, entry.name),
        }
    }
}
