#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::Result;
use clap::Parser;
use mapty::app::App;
use mapty::cli::{self, Cmd};
use mapty::config::Config;
use mapty::console::{ConsoleRenderer, format_row};
use mapty::database::SqliteStore;
use mapty::persistence::{MemoryStore, Persistence};
use mapty::store::WorkoutStore;
use mapty::utils;
use mapty::workout::WorkoutId;

#[macro_use]
extern crate mapty;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);
    let config = Config::from_cli(&cli);
    dlog!(
        "db={} zoom={} origin={}",
        config.db_path.display(),
        config.zoom,
        config.origin
    );

    let persistence = match SqliteStore::open(&config.db_path) {
        Ok(db) => Persistence::new(db),
        Err(e) => {
            tracing::warn!(
                path = %config.db_path.display(),
                err = %e,
                "workout database unavailable; changes will not be saved"
            );
            Persistence::new(MemoryStore::new())
        }
    };

    let mut app = App::new(
        WorkoutStore::open(persistence),
        ConsoleRenderer::new(),
        config.zoom,
    );
    app.map_ready(config.origin);

    match cli.cmd.unwrap_or(Cmd::List) {
        Cmd::List => {}
        Cmd::Add { workout } => {
            let (coords, form) = workout.into_parts();
            app.map_clicked(coords)?;
            app.submit(&form)?;
        }
        Cmd::Edit(args) => {
            let id = WorkoutId::from(args.id.as_str());
            let current = app.edit(&id)?;
            let form = args.merge(current)?;
            app.submit(&form)?;
        }
        Cmd::Show { id } => {
            let workout = app.select(&WorkoutId::from(id))?;
            println!("{}", format_row(workout));
            if let Some((center, zoom)) = app.renderer().view() {
                println!("map centered on {center} (zoom {zoom})");
            }
            return Ok(());
        }
        Cmd::Delete { id, yes } => {
            let deleted = app.delete(&WorkoutId::from(id), |w| {
                yes || utils::confirm(&format!("Delete \"{}\"?", w.description()))
                    .unwrap_or(false)
            })?;
            if !deleted {
                println!("You canceled!");
            }
        }
        Cmd::Reset { yes } => {
            if yes || utils::confirm("Delete ALL workouts? This cannot be undone.")? {
                app.reset();
            } else {
                println!("You canceled!");
            }
        }
    }

    let rows = app.renderer().rows();
    if rows.is_empty() {
        println!("No workouts yet. Add one with `mapty add running|cycling ...`.");
    }
    for row in rows {
        println!("{row}");
    }

    Ok(())
}
