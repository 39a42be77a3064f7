pub mod commands;
pub mod config;
pub mod crafting;
pub mod currency;
pub mod db;
pub mod error;
pub mod news;
pub mod services;
pub mod text;

/// Custom data passed to all commands
pub struct Data {
    pub config: config::Config,
    pub db: db::Database,
    pub currency: currency::CurrencyService,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
