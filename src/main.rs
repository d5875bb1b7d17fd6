mod api;
mod cli;
mod core;
mod prelude;
mod quantity;
mod repository;
mod store;
mod tables;
mod watch;

use chrono::{Local, Utc};
use clap::{Parser, crate_version};

use crate::{
    cli::{Args, Command},
    prelude::*,
    repository::Repository,
    tables::{build_prices_table, build_statistics_table, build_summary_table},
};

#[tokio::main]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().with_writer(std::io::stderr).init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();
    let repository = args.repository.try_new_repository()?;
    let now = Utc::now();

    match args.command {
        Command::Current => match repository.current_price(now).await {
            Some(price) => println!("{price}"),
            None => println!("unavailable"),
        },
        Command::Today => {
            println!("{}", build_statistics_table(repository.today_statistics(now).await));
        }
        Command::Tomorrow => {
            println!("{}", build_statistics_table(repository.tomorrow_statistics(now).await));
        }
        Command::Next => match repository.next_sample_at(now).await {
            Some(timestamp) => println!("{}", timestamp.to_rfc3339()),
            None => println!("unavailable"),
        },
        Command::Prices(args) => {
            let on = if args.tomorrow {
                repository.tomorrow_of(now).context("date overflow")?
            } else {
                repository.date_of(now)
            };
            let prices = repository.prices_on(now, on).await;
            info!(%on, n_prices = prices.len(), "gotcha");
            println!("{}", build_prices_table(&prices, &Local));
        }
        Command::Summary => {
            print_summary(&repository, now).await;
        }
        Command::Refresh => {
            repository.force_refresh().await;
            print_summary(&repository, Utc::now()).await;
        }
        Command::Watch => {
            watch::watch(&repository).await?;
        }
    }

    info!("done!");
    Ok(())
}

async fn print_summary(repository: &Repository<Local>, now: chrono::DateTime<Utc>) {
    let current_price = repository.current_price(now).await;
    let today = repository.today_statistics(now).await;
    let tomorrow = repository.tomorrow_statistics(now).await;
    println!("{}", build_summary_table(current_price, today, tomorrow));
}
