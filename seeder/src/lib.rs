pub mod config;
pub mod distribution;
pub mod fixture;
pub mod models;
pub mod random;
pub mod runner;
pub mod seed;
pub mod seeds;
pub mod token;
pub mod transport;
