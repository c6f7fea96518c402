mod config;
mod incremental;
mod properties;
mod proptests;
mod scaling;
