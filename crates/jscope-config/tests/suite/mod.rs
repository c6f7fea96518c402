mod config_path;
mod discovery;
