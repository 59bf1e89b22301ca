// src/api/mod.rs

pub mod games;
pub mod health;
pub mod stats;

use crate::collector::Collector;
use crate::config::Config;
use crate::db::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub collector: Collector,
    pub config: Config,
}
