use std::path::PathBuf;

use clap::Parser;
use stageload_db::config::{
    DEFAULT_DATABASE, DEFAULT_HOST, DEFAULT_PASSWORD, DEFAULT_PORT, DEFAULT_USER,
};
use stageload_db::ConnectionParams;

use crate::datasets::DatasetChoice;

/// Command-line arguments for `stageload`.
///
/// Every connection flag falls back to an environment variable, which in
/// turn may come from a `.env` file.
///
/// | Flag            | Env           | Default           |
/// |-----------------|---------------|-------------------|
/// | `--data-dir`    | `DATA_DIR`    | `data`            |
/// | `--db-name`     | `DB_NAME`     | `olist_ecommerce` |
/// | `--db-user`     | `DB_USER`     | `postgres`        |
/// | `--db-password` | `DB_PASSWORD` | `postgres`        |
/// | `--db-host`     | `DB_HOST`     | `localhost`       |
/// | `--db-port`     | `DB_PORT`     | `5432`            |
#[derive(Debug, Parser)]
#[command(name = "stageload")]
#[command(about = "Load the Olist e-commerce and marketing datasets into PostgreSQL")]
#[command(version)]
pub struct Args {
    /// Directory containing the dataset subdirectories
    #[arg(long, env = "DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Database name
    #[arg(long, env = "DB_NAME", default_value = DEFAULT_DATABASE)]
    pub db_name: String,

    /// Database user
    #[arg(long, env = "DB_USER", default_value = DEFAULT_USER)]
    pub db_user: String,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", default_value = DEFAULT_PASSWORD, hide_env_values = true)]
    pub db_password: String,

    /// Database host
    #[arg(long, env = "DB_HOST", default_value = DEFAULT_HOST)]
    pub db_host: String,

    /// Database port
    #[arg(long, env = "DB_PORT", default_value_t = DEFAULT_PORT)]
    pub db_port: u16,

    /// Load only this dataset (default: all, in dependency order)
    #[arg(long, value_enum)]
    pub dataset: Option<DatasetChoice>,

    /// Load into existing tables instead of recreating the namespaces first
    #[arg(long)]
    pub skip_schema: bool,

    /// Print the load reports as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl Args {
    pub fn connection_params(&self) -> ConnectionParams {
        ConnectionParams {
            host: self.db_host.clone(),
            port: self.db_port,
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            database: self.db_name.clone(),
        }
    }

    /// Datasets to load, in load order.
    pub fn selected(&self) -> Vec<DatasetChoice> {
        match self.dataset {
            Some(choice) => vec![choice],
            None => DatasetChoice::ALL.to_vec(),
        }
    }
}
