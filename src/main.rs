use anyhow::{bail, Context, Result};
use nade_catalog::{
    cli::{validate_input, Cli, Commands, MapsAction},
    commands::{serve, CommandFacade},
    config::Config,
    models::{CatalogExport, Nade},
    store::{CatalogStore, NadeFilters},
    ui::Browser,
};
use std::io;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = Config::resolve(cli.db)?;

    // Export only reads; it must not create a catalog as a side effect
    let store = match &cli.command {
        Commands::Export { .. } => CatalogStore::open_existing(config.db_path())?,
        _ => CatalogStore::open(config.db_path())
            .with_context(|| format!("Failed to open catalog {:?}", config.db_path()))?,
    };
    let mut facade = CommandFacade::new(store);

    match cli.command {
        Commands::Maps { action } => match action {
            MapsAction::List => {
                for map in facade.list_maps()? {
                    println!("{}", map.name);
                }
            }
            MapsAction::Add { name } => {
                let name = name.trim();
                if name.is_empty() {
                    bail!("Map name must not be empty");
                }
                let maps = facade.add_map(name)?;
                println!("Added map {} ({} maps total)", name, maps.len());
            }
        },

        Commands::List { filters, json } => {
            let nades = facade.list_nades(&NadeFilters::from(filters))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&nades)?);
            } else {
                print_table(&nades);
            }
        }

        Commands::Show { id, json } => {
            let Some(nade) = facade.get_nade(id)? else {
                bail!("No nade with id {}", id);
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&nade)?);
            } else {
                print_details(&nade, &facade);
            }
        }

        Commands::Add { nade } => {
            let input = nade.into_new_input();
            validate_input(&input)?;
            let id = facade.create_nade(&input)?;
            println!("Created nade {}", id);
        }

        Commands::Edit { id, nade } => {
            let Some(existing) = facade.get_nade(id)? else {
                bail!("No nade with id {}", id);
            };
            let input = nade.apply_to(existing.to_input());
            validate_input(&input)?;
            facade.update_nade(id, &input)?;
            println!("Updated nade {}", id);
        }

        Commands::Delete { id } => {
            if facade.get_nade(id)?.is_none() {
                bail!("No nade with id {}", id);
            }
            facade.delete_nade(id)?;
            println!("Deleted nade {}", id);
        }

        Commands::Export { output } => {
            let json = serde_json::to_string_pretty(&facade.export_json()?)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Exported catalog to {:?}", path);
                }
                None => println!("{}", json),
            }
        }

        Commands::Import { input } => {
            let text = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {:?}", input))?;
            let payload: CatalogExport =
                serde_json::from_str(&text).context("Import file is not a catalog export")?;
            facade.import_json(&payload)?;
            println!(
                "Imported {} maps and {} nades",
                payload.maps.len(),
                payload.nades.len()
            );
        }

        Commands::Open { id } => {
            let Some(nade) = facade.get_nade(id)? else {
                bail!("No nade with id {}", id);
            };
            if let Some(url) = &nade.video_url {
                facade.open_external_link(url)?;
            } else if let Some(path) = &nade.local_video_path {
                if !facade.check_file_exists(path) {
                    bail!("Video file not found: {}", path);
                }
                facade.open_external_link(path)?;
            } else {
                bail!("Nade {} has no video", id);
            }
        }

        Commands::CheckFile { path } => {
            let path = path.to_string_lossy();
            if facade.check_file_exists(&path) {
                println!("File found");
            } else {
                println!("File not found");
            }
        }

        Commands::Browse { filters } => {
            let mut browser = Browser::new(&facade, filters.into())?;
            browser.run()?;
            browser.restore()?;
        }

        Commands::Serve => {
            let stdin = io::stdin();
            let handled = serve(&mut facade, stdin.lock(), io::stdout().lock())?;
            log::info!("Served {} requests", handled);
        }
    }

    Ok(())
}

fn print_table(nades: &[Nade]) {
    if nades.is_empty() {
        println!("No nades found");
        return;
    }

    println!(
        "{:>4}  {:<10} {:<4} {:<8} {:<16} TITLE",
        "ID", "MAP", "SIDE", "TYPE", "FROM"
    );
    for nade in nades {
        println!(
            "{:>4}  {:<10} {:<4} {:<8} {:<16} {}",
            nade.id, nade.map, nade.side, nade.nade_type, nade.start_position, nade.title
        );
    }
}

fn print_details(nade: &Nade, facade: &CommandFacade) {
    println!("#{} {}", nade.id, nade.title);
    println!("  Map:      {} ({})", nade.map, nade.side);
    println!("  Type:     {}", nade.nade_type);
    println!("  From:     {}", nade.start_position);
    println!("  To:       {}", nade.target_position);
    if !nade.description.is_empty() {
        println!("  Notes:    {}", nade.description);
    }
    if !nade.tags.is_empty() {
        println!("  Tags:     {}", nade.tag_list().join(", "));
    }
    if let Some(url) = &nade.video_url {
        println!("  Video:    {}", url);
    }
    if let Some(path) = &nade.local_video_path {
        let status = if facade.check_file_exists(path) {
            "found"
        } else {
            "missing"
        };
        println!("  File:     {} ({})", path, status);
    }
    println!("  Created:  {}", nade.created_at);
    println!("  Updated:  {}", nade.updated_at);
}
