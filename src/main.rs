mod cli;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use cli::{Cli, Command};
use rental_listings::store::{RemoteStore, RestStore, UnconfiguredStore};
use rental_listings::{
    ListingError, Property, PropertyDraft, PropertyRepository, PropertyState, StoreConfig,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    info!("🏠 Rental Listings");

    match StoreConfig::load() {
        Ok(config) => {
            info!("Using store at {}", config.url);
            let store = RestStore::new(&config).context("Failed to create store client")?;
            run(cli, store).await
        }
        Err(e) => {
            // Keep going so the problem shows up as the listing error
            warn!("{}", e);
            let reason = match e {
                ListingError::Configuration(reason) => reason,
                other => other.to_string(),
            };
            run(cli, UnconfiguredStore::new(reason)).await
        }
    }
}

async fn run<S: RemoteStore>(cli: Cli, store: S) -> anyhow::Result<()> {
    let mut state = PropertyState::mount(PropertyRepository::new(store)).await;

    match cli.command.unwrap_or(Command::List { json: false }) {
        Command::List { json } => {
            if let Some(e) = state.error() {
                bail!("Could not load listings: {e}");
            }

            if json {
                println!("{}", serde_json::to_string_pretty(state.properties())?);
                return Ok(());
            }

            info!("✅ Loaded {} properties\n", state.properties().len());
            for (i, property) in state.properties().iter().enumerate() {
                print_summary(i + 1, property, state.is_saved(&property.id));
            }
        }
        Command::Show { id } => {
            if let Some(e) = state.error() {
                bail!("Could not load listings: {e}");
            }
            let property = state
                .get_by_id(&id)
                .ok_or_else(|| anyhow!("Property {id} not found"))?;
            print_details(property);
        }
        Command::Add(args) => {
            let new = PropertyDraft::from(args).into_new_property()?;
            if !state.add(new).await {
                return Err(failure(&state, "add property"));
            }
            // The insert went through, but the reload after it may not have
            if let Some(e) = state.error() {
                bail!("Listed the property, but could not reload listings: {e}");
            }
            match state.last_added() {
                Some(property) => {
                    info!("💾 Listed property {}", property.id);
                    print_details(property);
                }
                None => info!("💾 Listed property; run `list` to see it"),
            }
        }
        Command::Update { id, fields } => {
            if !state.update(&id, &fields.into()).await {
                return Err(failure(&state, "update property"));
            }
            if let Some(property) = state.get_by_id(&id) {
                info!("💾 Saved changes to property {}", id);
                print_details(property);
            }
        }
        Command::Delete { id } => {
            if !state.remove(&id).await {
                return Err(failure(&state, "delete property"));
            }
            info!("🗑️  Deleted property {}", id);
        }
        Command::Saved { ids } => {
            for id in &ids {
                state.toggle_saved(id);
            }
            let saved = state.saved_properties();
            info!("Saved {} of {} properties", saved.len(), state.properties().len());
            for (i, property) in saved.into_iter().enumerate() {
                print_summary(i + 1, property, true);
            }
        }
    }

    Ok(())
}

fn failure<S: RemoteStore>(state: &PropertyState<S>, action: &str) -> anyhow::Error {
    match state.error() {
        Some(e) => anyhow!("Could not {action}: {e}"),
        None => anyhow!("Could not {action}"),
    }
}

fn print_summary(position: usize, property: &Property, saved: bool) {
    let marker = if saved { " ★" } else { "" };
    println!(
        "{}. {} ({}) ${}/month{}",
        position, property.title, property.location, property.price, marker
    );
    println!(
        "   {} bed, {} bath, {} sqm",
        property.bedrooms, property.bathrooms, property.area
    );
    println!("   ID: {}", property.id);
    println!();
}

fn print_details(property: &Property) {
    println!("{} ({})", property.title, property.location);
    println!("   ${}/month", property.price);
    println!(
        "   {} bed, {} bath, {} sqm",
        property.bedrooms, property.bathrooms, property.area
    );
    if !property.amenities.is_empty() {
        println!("   Amenities: {}", property.amenities.join(", "));
    }
    if !property.description.is_empty() {
        println!("   {}", property.description);
    }
    if !property.image.is_empty() {
        println!("   Image: {}", property.image);
    }
    println!(
        "   Rating: {} ({} reviews){}{}{}",
        property.rating,
        property.reviews,
        if property.verified { ", verified" } else { "" },
        if property.virtual_tour { ", virtual tour" } else { "" },
        if property.featured { ", featured" } else { "" },
    );
    if property.agent.is_empty() {
        println!("   Agent: unassigned");
    } else {
        println!(
            "   Agent: {}{} (rating {}, {} listings)",
            property.agent.name,
            if property.agent.is_verified { " ✔" } else { "" },
            property.agent.rating,
            property.agent.properties_listed
        );
    }
    println!("   ID: {}", property.id);
}
